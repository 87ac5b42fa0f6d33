//! Bounded-memory history of region operations.
//!
//! The ledger owns every [`RegionOp`] recorded through it and hands out
//! generation-tagged [`OpHandle`]s as non-owning references for the
//! surrounding transaction log. When the tracked snapshot bytes exceed a
//! quota, the oldest live snapshots are freed (not deleted) down to a low
//! watermark, trading undo depth for memory. A freed or stale handle
//! toggles as a silent no-op.

use crate::region_op::RegionOp;
use crate::surface::Surface;

/// Non-owning reference to a recorded operation. Stale after `clear`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpHandle {
    index: usize,
    generation: u32,
}

struct LedgerEntry {
    op: RegionOp,
    generation: u32,
    /// External owner has dropped its handle; the snapshot is reclaimed on
    /// the next quota pass.
    released: bool,
    /// Counted in `tracked_bytes`. Cleared when the snapshot is reclaimed.
    tracked: bool,
}

/// Ordered, bounded-memory store of region operations.
#[derive(Default)]
pub struct OperationLedger {
    entries: Vec<LedgerEntry>,
    generation: u32,
    tracked_bytes: usize,
}

impl OperationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `op` and return a handle for the transaction log.
    pub fn record(&mut self, op: RegionOp) -> OpHandle {
        self.tracked_bytes += op.size_in_bytes();
        let index = self.entries.len();
        self.entries.push(LedgerEntry {
            op,
            generation: self.generation,
            released: false,
            tracked: true,
        });
        OpHandle {
            index,
            generation: self.generation,
        }
    }

    fn entry_mut(&mut self, handle: OpHandle) -> Option<&mut LedgerEntry> {
        self.entries
            .get_mut(handle.index)
            .filter(|entry| entry.generation == handle.generation)
    }

    /// Toggle the referenced operation against `surface`. Returns true if
    /// the surface changed; freed, released-and-reclaimed, or stale
    /// handles are silent no-ops.
    pub fn toggle(&mut self, handle: OpHandle, surface: &mut Surface) -> bool {
        match self.entry_mut(handle) {
            Some(entry) => entry.op.toggle(surface),
            None => false,
        }
    }

    /// Mark the operation as no longer referenced by its external owner.
    /// Its snapshot is reclaimed on the next `reclaim_if_over_quota`.
    pub fn release(&mut self, handle: OpHandle) {
        if let Some(entry) = self.entry_mut(handle) {
            entry.released = true;
        }
    }

    /// Whether the referenced operation can still be toggled.
    pub fn is_live(&self, handle: OpHandle) -> bool {
        self.entries
            .get(handle.index)
            .filter(|entry| entry.generation == handle.generation)
            .map(|entry| !entry.op.is_freed())
            .unwrap_or(false)
    }

    /// Bytes of snapshot data currently counted against the quota.
    pub fn tracked_bytes(&self) -> usize {
        self.tracked_bytes
    }

    /// Number of recorded operations whose snapshots are still intact.
    pub fn live_ops(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.op.is_freed())
            .count()
    }

    /// Enforce the memory quota. No-op while at or under `quota_bytes`;
    /// otherwise externally released snapshots are reclaimed first, then
    /// the oldest remaining live snapshots are freed one at a time until
    /// the total drops to the low watermark `quota - quota/5`.
    pub fn reclaim_if_over_quota(&mut self, quota_bytes: usize) {
        if self.tracked_bytes <= quota_bytes {
            return;
        }

        // Pass 1: drop tracking for operations the transaction log no
        // longer references, and recompute the total from the remainder.
        let mut reclaimed = 0usize;
        for entry in &mut self.entries {
            if entry.tracked && entry.released {
                entry.tracked = false;
                entry.op.free();
                reclaimed += 1;
            }
        }
        self.tracked_bytes = self
            .entries
            .iter()
            .filter(|entry| entry.tracked && !entry.op.is_freed())
            .map(|entry| entry.op.size_in_bytes())
            .sum();

        // Pass 2: FIFO eviction of live snapshots down to the watermark.
        let watermark = quota_bytes - quota_bytes / 5;
        let mut evicted = 0usize;
        for entry in &mut self.entries {
            if self.tracked_bytes <= watermark {
                break;
            }
            if entry.tracked && !entry.op.is_freed() {
                self.tracked_bytes -= entry.op.size_in_bytes();
                entry.tracked = false;
                entry.op.free();
                evicted += 1;
            }
        }

        log::debug!(
            "undo quota reclaim: {reclaimed} released dropped, {evicted} evicted, \
             {} bytes tracked (quota {quota_bytes})",
            self.tracked_bytes
        );
    }

    /// Drop every entry. Outstanding handles become stale no-ops.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
        self.tracked_bytes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::Bound2D;

    /// One op covering `pixels` mask pixels (1 byte each).
    fn mask_op(surface: &mut Surface, origin: i32, pixels: i32) -> RegionOp {
        let bound = Bound2D::new(origin, 0, origin + pixels, 1);
        let op = RegionOp::capture(surface, bound);
        for x in origin..origin + pixels {
            surface.set_u8(x, 0, 200);
        }
        op
    }

    #[test]
    fn test_record_tracks_bytes() {
        let mut surface = Surface::new_mask(64, 1);
        let mut ledger = OperationLedger::new();
        assert_eq!(ledger.tracked_bytes(), 0);

        ledger.record(mask_op(&mut surface, 0, 10));
        ledger.record(mask_op(&mut surface, 10, 6));
        assert_eq!(ledger.tracked_bytes(), 16);
        assert_eq!(ledger.live_ops(), 2);
    }

    #[test]
    fn test_toggle_through_handle() {
        let mut surface = Surface::new_mask(8, 1);
        let mut ledger = OperationLedger::new();
        let handle = ledger.record(mask_op(&mut surface, 0, 4));
        assert_eq!(surface.get_u8(0, 0), Some(200));

        assert!(ledger.toggle(handle, &mut surface));
        assert_eq!(surface.get_u8(0, 0), Some(0));
        assert!(ledger.toggle(handle, &mut surface));
        assert_eq!(surface.get_u8(0, 0), Some(200));
    }

    #[test]
    fn test_under_quota_is_noop() {
        let mut surface = Surface::new_mask(64, 1);
        let mut ledger = OperationLedger::new();
        ledger.record(mask_op(&mut surface, 0, 10));
        ledger.reclaim_if_over_quota(100);
        assert_eq!(ledger.tracked_bytes(), 10);
        assert_eq!(ledger.live_ops(), 1);
    }

    #[test]
    fn test_reclaim_converges_to_watermark() {
        let mut surface = Surface::new_mask(64, 1);
        let mut ledger = OperationLedger::new();
        for i in 0..6 {
            ledger.record(mask_op(&mut surface, i * 10, 10));
        }
        assert_eq!(ledger.tracked_bytes(), 60);

        // Quota 35 -> watermark 28: oldest ops evicted until <= 28
        ledger.reclaim_if_over_quota(35);
        assert!(ledger.tracked_bytes() <= 28);
        assert_eq!(ledger.tracked_bytes(), 20);
        assert_eq!(ledger.live_ops(), 2);
    }

    #[test]
    fn test_reclaim_evicts_oldest_first() {
        let mut surface = Surface::new_mask(64, 1);
        let mut ledger = OperationLedger::new();
        let oldest = ledger.record(mask_op(&mut surface, 0, 10));
        let middle = ledger.record(mask_op(&mut surface, 10, 10));
        let newest = ledger.record(mask_op(&mut surface, 20, 10));

        ledger.reclaim_if_over_quota(25);
        // watermark 20: exactly the oldest goes
        assert!(!ledger.is_live(oldest));
        assert!(ledger.is_live(middle));
        assert!(ledger.is_live(newest));
    }

    #[test]
    fn test_released_ops_reclaimed_before_eviction() {
        let mut surface = Surface::new_mask(64, 1);
        let mut ledger = OperationLedger::new();
        let first = ledger.record(mask_op(&mut surface, 0, 10));
        let second = ledger.record(mask_op(&mut surface, 10, 10));
        let third = ledger.record(mask_op(&mut surface, 20, 10));

        // The log dropped the middle op; dropping its 10 bytes is enough
        // to reach the watermark, so the oldest live op survives.
        ledger.release(second);
        ledger.reclaim_if_over_quota(25);
        assert!(ledger.is_live(first));
        assert!(!ledger.is_live(second));
        assert!(ledger.is_live(third));
        assert_eq!(ledger.tracked_bytes(), 20);
    }

    #[test]
    fn test_freed_handle_toggles_as_noop() {
        let mut surface = Surface::new_mask(64, 1);
        let mut ledger = OperationLedger::new();
        let old = ledger.record(mask_op(&mut surface, 0, 30));
        ledger.record(mask_op(&mut surface, 30, 30));

        ledger.reclaim_if_over_quota(40);
        assert!(!ledger.is_live(old));

        let before = surface.clone();
        assert!(!ledger.toggle(old, &mut surface));
        assert_eq!(surface, before);
    }

    #[test]
    fn test_stale_handle_after_clear() {
        let mut surface = Surface::new_mask(8, 1);
        let mut ledger = OperationLedger::new();
        let handle = ledger.record(mask_op(&mut surface, 0, 4));
        ledger.clear();
        assert_eq!(ledger.tracked_bytes(), 0);
        assert!(!ledger.is_live(handle));
        assert!(!ledger.toggle(handle, &mut surface));

        // A new generation reuses index 0; the old handle must not alias it
        let fresh = ledger.record(mask_op(&mut surface, 4, 4));
        assert!(!ledger.toggle(handle, &mut surface));
        assert!(ledger.is_live(fresh));
    }

    #[test]
    fn test_reclaim_with_fewer_live_ops_than_needed() {
        // Everything released: pass 1 empties the ledger and pass 2 has
        // nothing left to evict; total is the sum of remaining live ops (0)
        let mut surface = Surface::new_mask(64, 1);
        let mut ledger = OperationLedger::new();
        let a = ledger.record(mask_op(&mut surface, 0, 30));
        let b = ledger.record(mask_op(&mut surface, 30, 30));
        ledger.release(a);
        ledger.release(b);

        ledger.reclaim_if_over_quota(10);
        assert_eq!(ledger.tracked_bytes(), 0);
        assert_eq!(ledger.live_ops(), 0);
    }
}
