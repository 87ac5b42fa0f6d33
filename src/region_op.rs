//! Reversible records of one brush edit over a rectangular region.

use crate::bound::Bound2D;
use crate::surface::{PixelBuf, Surface};

/// Snapshot of the pixels a brush edit replaced.
///
/// Created by capturing the region *before* the edit; once the surface
/// holds the post-edit values, each [`RegionOp::toggle`] swaps the live
/// region with the snapshot, so the same call implements both undo and
/// redo. Freeing discards the snapshot to reclaim memory; a freed op
/// toggles as a silent no-op — by then the edit has been superseded in the
/// permanent document state, so losing the toggle is the documented
/// undo-depth tradeoff, not an error.
#[derive(Debug)]
pub struct RegionOp {
    bound: Bound2D,
    snapshot: Option<PixelBuf>,
    size_in_bytes: usize,
}

impl RegionOp {
    /// Capture the current contents of `bound` on `surface`. Call before
    /// mutating the region; the op then holds the "before" image.
    pub fn capture(surface: &Surface, bound: Bound2D) -> Self {
        let bound = bound.clip_to(surface.width(), surface.height());
        let snapshot = surface.copy_region(bound);
        let size_in_bytes = snapshot.size_in_bytes();
        Self {
            bound,
            snapshot: Some(snapshot),
            size_in_bytes,
        }
    }

    /// Swap the snapshot with the live region. Returns true if the surface
    /// changed; freed ops and mismatched surfaces (dimensions or format no
    /// longer matching the snapshot) are no-ops.
    pub fn toggle(&mut self, surface: &mut Surface) -> bool {
        let Some(snapshot) = self.snapshot.as_mut() else {
            return false;
        };
        surface.swap_region(self.bound, snapshot)
    }

    /// Discard the snapshot. Subsequent toggles are no-ops.
    pub fn free(&mut self) {
        self.snapshot = None;
    }

    pub fn is_freed(&self) -> bool {
        self.snapshot.is_none()
    }

    pub fn bound(&self) -> Bound2D {
        self.bound
    }

    /// Footprint of the snapshot, fixed at creation; unchanged by freeing.
    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}
