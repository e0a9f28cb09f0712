use glam::Vec3;

/// Per-element targets, resolved once from the batch configuration and an
/// index. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementConfig {
    pub index: usize,
    /// Stagger delay in ms.
    pub appear_offset: f32,
    /// Target scale S.
    pub scale: f32,
    /// Target opacity O.
    pub opacity: f32,
    /// Multiplies the appear-to-disappear window.
    pub lifetime_multiplier: f32,
    /// Random extra delay in ms, drawn from `variance.delay`.
    pub delay_offset: f32,
    pub color: Option<Vec3>,
    /// Stable per-element seed in [0, 1) for phase-shifted kernels.
    pub seed: f32,
}

impl ElementConfig {
    /// Targets with no variance applied.
    pub fn uniform(index: usize) -> Self {
        Self {
            index,
            appear_offset: 0.0,
            scale: 1.0,
            opacity: 1.0,
            lifetime_multiplier: 1.0,
            delay_offset: 0.0,
            color: None,
            seed: 0.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale.max(0.0);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.max(0.0);
        self
    }

    /// Total delay before first appearance, in ms.
    pub fn start_delay(&self) -> f32 {
        self.appear_offset + self.delay_offset
    }
}

/// An element's appear and disappear thresholds on its local clock, in ms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementWindow {
    pub appear: f32,
    pub disappear: f32,
}

impl ElementWindow {
    /// Length of the visible window. Negative when disappear precedes appear.
    pub fn span(&self) -> f32 {
        self.disappear - self.appear
    }

    /// Same span, moved to start at `appear`.
    pub fn shifted_to(&self, appear: f32) -> Self {
        Self {
            appear,
            disappear: appear + self.span(),
        }
    }
}
