//! The contract this engine consumes from the surrounding document layer.

use crate::bound::Bound2D;

/// Owner of the surfaces being edited.
///
/// The engine does not know about scene graphs, picking, or GPU textures;
/// it asks the provider to project a world-space hit point into pixel
/// coordinates and tells it which pixels changed. Surfaces themselves are
/// handed to the engine as explicit borrows, so mask and companion height
/// buffers can be used side by side.
pub trait SurfaceProvider {
    /// Project a world-space hit point to integer pixel coordinates on the
    /// edited surface, accounting for cell size and any mask-to-height
    /// resolution ratio.
    fn world_to_surface(&self, world: [f32; 3]) -> (i32, i32);

    /// Pixels inside `bound` changed; re-upload and mark the document
    /// dirty as needed.
    fn apply_dirty_region(&mut self, bound: Bound2D);
}
