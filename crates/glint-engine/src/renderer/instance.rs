use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::lifecycle::ElementOutput;

/// Per-element render data for the host renderer's instance buffer.
/// 16 floats = 64 bytes stride.
///
/// Position and rotation are the element's original transform with the
/// lifecycle offsets applied.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ElementInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Euler rotation in radians.
    pub rot_x: f32,
    pub rot_y: f32,
    pub rot_z: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub scale_z: f32,
    /// Opacity (0.0 = invisible, >1.0 for flash overdrive).
    pub opacity: f32,
    pub emissive: f32,
    /// 1.0 when visible, 0.0 otherwise.
    pub visible: f32,
    /// Stretch alignment axis, zero when unaligned.
    pub align_x: f32,
    pub align_y: f32,
    pub align_z: f32,
    pub render_order: f32,
}

impl ElementInstance {
    pub const FLOATS: usize = 16;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    /// Apply a tick's output to the stored original transform.
    pub fn compose(base_position: Vec3, base_rotation: Vec3, output: &ElementOutput, render_order: i32) -> Self {
        let position = base_position + output.drift_offset;
        let rotation = base_rotation + output.rotation_offset;
        let scale = output.world_scale();
        let align = output.align_axis.unwrap_or(Vec3::ZERO);
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            rot_x: rotation.x,
            rot_y: rotation.y,
            rot_z: rotation.z,
            scale_x: scale.x,
            scale_y: scale.y,
            scale_z: scale.z,
            opacity: output.opacity,
            emissive: output.emissive,
            visible: if output.visible { 1.0 } else { 0.0 },
            align_x: align.x,
            align_y: align.y,
            align_z: align.z,
            render_order: render_order as f32,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Instances for one frame, uploaded as a flat float array.
pub struct InstanceBuffer {
    pub instances: Vec<ElementInstance>,
}

impl InstanceBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(256),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: ElementInstance) {
        self.instances.push(instance);
    }

    /// Push only visible instances; returns whether it was pushed.
    pub fn push_visible(&mut self, instance: ElementInstance) -> bool {
        if instance.visible > 0.0 {
            self.instances.push(instance);
            true
        } else {
            false
        }
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Raw pointer to instance data for shared-buffer reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for InstanceBuffer {
    fn default() -> Self {
        Self::new()
    }
}
