//! Broad Phase (Sweep and Prune)
//!
//! Cheaply discards body pairs that cannot be touching and classifies the
//! surviving pairs across frames:
//!
//! - **added**: overlapping this frame, not tracked last frame
//! - **persisted**: overlapping this frame and last frame
//! - **removed**: tracked last frame, no longer overlapping
//!
//! The sweep sorts AABB endpoints along the x axis once per frame and scans
//! left to right; only endpoint intervals that overlap on x get the full
//! two-axis AABB test. Cross-frame classification is a linear co-scan of two
//! sorted pair lists, so a frame costs O(n log n + m) with no quadratic
//! re-scan of previous pairs.

use crate::aabb::Aabb;
use crate::body::BodyId;
use crate::filter::CollisionFilter;
use crate::pair::BodyPair;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// ============================================================================
// Input / Output
// ============================================================================

/// Per-body input to the sweep: id, fattened world AABB, filter, mobility
#[derive(Clone, Copy, Debug)]
pub struct BroadPhaseEntry {
    /// Owning body id
    pub id: BodyId,
    /// Fattened world-space AABB
    pub aabb: Aabb,
    /// Collision filter tag
    pub filter: CollisionFilter,
    /// True for bodies that never receive solved impulses
    pub is_static: bool,
}

/// Pair classification for one frame
#[derive(Clone, Debug, Default)]
pub struct PairTransitions {
    /// Pairs overlapping now that were not tracked last frame
    pub added: Vec<BodyPair>,
    /// Pairs overlapping now and last frame
    pub persisted: Vec<BodyPair>,
    /// Pairs tracked last frame that no longer overlap
    pub removed: Vec<BodyPair>,
}

// ============================================================================
// Sweep and Prune
// ============================================================================

/// One AABB endpoint (interval min or max) projected onto the sweep axis
#[derive(Clone, Copy, Debug)]
struct Endpoint {
    x: f32,
    entry: usize,
}

/// Incremental sweep-and-prune broad phase.
///
/// Keeps the tracked pair set between frames; scratch buffers are reused so
/// steady-state frames allocate nothing.
#[derive(Debug, Default)]
pub struct BroadPhase {
    /// Sorted pair set carried over from the previous frame
    tracked: Vec<BodyPair>,
    endpoints: Vec<Endpoint>,
    consumed: Vec<bool>,
    row_seen: Vec<usize>,
    current: Vec<BodyPair>,
}

impl BroadPhase {
    /// Create an empty broad phase
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs tracked as overlapping after the last update (sorted)
    #[must_use]
    pub fn tracked_pairs(&self) -> &[BodyPair] {
        &self.tracked
    }

    /// Drop all tracked pairs (next update reports everything as added)
    pub fn clear(&mut self) {
        self.tracked.clear();
    }

    /// Drop tracked pairs touching `id`.
    ///
    /// Must run when a body is removed: ids are recycled, and a stale tracked
    /// pair would otherwise classify the recycled body's first overlap as
    /// `persisted` instead of `added`.
    pub fn forget_body(&mut self, id: BodyId) {
        self.tracked.retain(|pair| !pair.contains(id));
    }

    /// Run one frame of the sweep and classify pairs against the last frame.
    ///
    /// Entries carry AABBs already fattened by the caller's margin. Bodies
    /// absent from `entries` (removed from the world) drop out of the tracked
    /// set and surface in `removed`.
    pub fn update(&mut self, entries: &[BroadPhaseEntry]) -> PairTransitions {
        self.sweep(entries);

        self.current.sort_unstable();
        self.current.dedup();

        // Linear co-scan of the old and new sorted pair lists. Matches are
        // persisted, old-only pairs are removed, new-only pairs are added.
        let mut out = PairTransitions::default();
        let (old, new) = (&self.tracked, &self.current);
        let (mut i, mut j) = (0, 0);
        while i < old.len() && j < new.len() {
            match old[i].cmp(&new[j]) {
                core::cmp::Ordering::Equal => {
                    out.persisted.push(new[j]);
                    i += 1;
                    j += 1;
                }
                core::cmp::Ordering::Less => {
                    out.removed.push(old[i]);
                    i += 1;
                }
                core::cmp::Ordering::Greater => {
                    out.added.push(new[j]);
                    j += 1;
                }
            }
        }
        out.removed.extend_from_slice(&old[i..]);
        out.added.extend_from_slice(&new[j..]);

        core::mem::swap(&mut self.tracked, &mut self.current);
        out
    }

    /// Collect overlapping pairs into `self.current` (unsorted, may repeat)
    fn sweep(&mut self, entries: &[BroadPhaseEntry]) {
        self.current.clear();
        self.endpoints.clear();
        for (index, entry) in entries.iter().enumerate() {
            self.endpoints.push(Endpoint {
                x: entry.aabb.min().x,
                entry: index,
            });
            self.endpoints.push(Endpoint {
                x: entry.aabb.max().x,
                entry: index,
            });
        }
        // Stable sort keeps a body's min endpoint ahead of its max when the
        // interval is degenerate.
        self.endpoints.sort_by(|a, b| a.x.total_cmp(&b.x));

        self.consumed.clear();
        self.consumed.resize(self.endpoints.len(), false);

        for i in 0..self.endpoints.len() {
            if self.consumed[i] {
                continue;
            }
            let a = &entries[self.endpoints[i].entry];
            self.row_seen.clear();

            for j in (i + 1)..self.endpoints.len() {
                let b_index = self.endpoints[j].entry;
                if b_index == self.endpoints[i].entry {
                    // Interval for body `a` closes here; stop this row.
                    self.consumed[i] = true;
                    self.consumed[j] = true;
                    break;
                }
                if self.row_seen.contains(&b_index) {
                    continue;
                }
                self.row_seen.push(b_index);

                let b = &entries[b_index];
                if !CollisionFilter::can_collide(a.filter, b.filter) {
                    continue;
                }
                if a.is_static && b.is_static {
                    continue;
                }
                if a.aabb.overlaps(&b.aabb) {
                    self.current.push(BodyPair::new(a.id, b.id));
                }
            }
        }
    }
}
