//! Drag-gesture state machine driving brush application.
//!
//! A gesture produces a sequence of pointer samples; each sample applies
//! the active brush once. The session accumulates the resulting undo
//! handles and the union of their dirty bounds, then settles up at gesture
//! end: one dirty-region notification to the provider and one ledger quota
//! pass (never per-sample, to avoid thrashing).

use crate::bound::Bound2D;
use crate::brush::Brush;
use crate::error::EditError;
use crate::ledger::{OpHandle, OperationLedger};
use crate::provider::SurfaceProvider;
use crate::surface::Surface;

/// Current phase of a stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StrokePhase {
    #[default]
    Idle,
    Painting,
}

/// One drag gesture's worth of brush edits.
#[derive(Default)]
pub struct StrokeSession {
    phase: StrokePhase,
    ops: Vec<OpHandle>,
    dirty: Option<Bound2D>,
}

impl StrokeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.phase == StrokePhase::Painting
    }

    /// Number of edits recorded so far in this gesture.
    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    /// Union of the bounds edited so far, if any pixel changed.
    pub fn dirty(&self) -> Option<Bound2D> {
        self.dirty
    }

    /// Start a gesture. Returns false if one is already in progress.
    pub fn begin(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.phase = StrokePhase::Painting;
        self.ops.clear();
        self.dirty = None;
        log::debug!("stroke begin");
        true
    }

    /// Apply `brush` at one sampled pointer position. Returns whether the
    /// sample changed any pixel. Inactive sessions ignore samples.
    pub fn sample(
        &mut self,
        brush: &Brush,
        target: &mut Surface,
        heightfield: Option<&Surface>,
        ledger: &mut OperationLedger,
        px: i32,
        py: i32,
    ) -> Result<bool, EditError> {
        if !self.is_active() {
            return Ok(false);
        }
        let Some(op) = brush.apply(target, heightfield, px, py)? else {
            return Ok(false);
        };
        let bound = op.bound();
        self.ops.push(ledger.record(op));
        self.dirty = Some(match self.dirty {
            Some(dirty) => dirty.union_with(bound),
            None => bound,
        });
        Ok(true)
    }

    /// Like [`StrokeSession::sample`], but projects a world-space hit point
    /// through the provider first.
    pub fn sample_world<P: SurfaceProvider>(
        &mut self,
        brush: &Brush,
        target: &mut Surface,
        heightfield: Option<&Surface>,
        ledger: &mut OperationLedger,
        provider: &P,
        world: [f32; 3],
    ) -> Result<bool, EditError> {
        let (px, py) = provider.world_to_surface(world);
        self.sample(brush, target, heightfield, ledger, px, py)
    }

    /// Commit the gesture: notify the provider of the dirty union, enforce
    /// the ledger quota once, and hand the accumulated handles to the
    /// caller's transaction log. Idle sessions return nothing.
    pub fn finish<P: SurfaceProvider>(
        &mut self,
        ledger: &mut OperationLedger,
        quota_bytes: usize,
        provider: &mut P,
    ) -> Vec<OpHandle> {
        if !self.is_active() {
            return Vec::new();
        }
        self.phase = StrokePhase::Idle;
        if let Some(dirty) = self.dirty.take() {
            provider.apply_dirty_region(dirty);
        }
        ledger.reclaim_if_over_quota(quota_bytes);
        log::debug!("stroke finish: {} ops recorded", self.ops.len());
        std::mem::take(&mut self.ops)
    }

    /// Abort the gesture: roll the applied edits back (newest first) and
    /// release their ledger entries instead of committing them.
    pub fn cancel(&mut self, ledger: &mut OperationLedger, target: &mut Surface) {
        if !self.is_active() {
            return;
        }
        self.phase = StrokePhase::Idle;
        for handle in self.ops.drain(..).rev() {
            ledger.toggle(handle, target);
            ledger.release(handle);
        }
        self.dirty = None;
        log::debug!("stroke cancelled");
    }
}
