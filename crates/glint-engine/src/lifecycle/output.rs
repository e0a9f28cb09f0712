use glam::Vec3;

/// What a lifecycle hands the renderer each tick.
///
/// Offsets are relative to the element's externally stored original
/// position and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementOutput {
    pub visible: bool,
    pub opacity: f32,
    /// Uniform scale.
    pub scale: f32,
    /// Per-axis multipliers on top of `scale`.
    pub scale_axes: Vec3,
    pub emissive: f32,
    /// 0 before exit, exit progress while exiting, 1 once dead.
    pub fade_progress: f32,
    pub drift_offset: Vec3,
    /// Euler radians.
    pub rotation_offset: Vec3,
    /// Velocity-aligned axis for stretch re-orientation.
    pub align_axis: Option<Vec3>,
    /// The host should draw a fresh surface sample for this element.
    pub resample: bool,
}

impl Default for ElementOutput {
    fn default() -> Self {
        Self {
            visible: false,
            opacity: 0.0,
            scale: 0.0,
            scale_axes: Vec3::ONE,
            emissive: 0.0,
            fade_progress: 0.0,
            drift_offset: Vec3::ZERO,
            rotation_offset: Vec3::ZERO,
            align_axis: None,
            resample: false,
        }
    }
}

impl ElementOutput {
    /// Final per-axis scale.
    pub fn world_scale(&self) -> Vec3 {
        self.scale_axes * self.scale
    }
}
