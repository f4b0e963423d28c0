//! Contact Events
//!
//! Frame-to-frame classification of narrow-phase results into begin, persist
//! and end events. The collector keeps the previous frame's contact pairs as
//! a sorted vector and diffs the current frame against it with a linear
//! co-scan, mirroring how the broad phase classifies its pair sets.
//!
//! Events accumulate until drained, so a caller stepping several times
//! between reads still sees every transition.

use crate::body::BodyId;
use crate::pair::BodyPair;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Contact transition kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContactEventKind {
    /// The pair produced a contact this frame but not last frame
    Begin,
    /// The pair produced a contact this frame and last frame
    Persist,
    /// The pair produced a contact last frame but not this frame
    End,
}

/// One contact transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactEvent {
    /// The bodies involved
    pub pair: BodyPair,
    /// Transition kind
    pub kind: ContactEventKind,
}

/// Collects narrow-phase pairs each frame and emits transitions
#[derive(Debug, Default)]
pub struct EventCollector {
    previous: Vec<BodyPair>,
    current: Vec<BodyPair>,
    events: Vec<ContactEvent>,
}

impl EventCollector {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame
    pub fn begin_frame(&mut self) {
        self.current.clear();
    }

    /// Record a pair that produced a contact this frame
    pub fn push_contact(&mut self, pair: BodyPair) {
        self.current.push(pair);
    }

    /// Close the frame: diff against the previous frame and emit events
    pub fn end_frame(&mut self) {
        self.current.sort_unstable();
        self.current.dedup();

        let (mut i, mut j) = (0, 0);
        while i < self.previous.len() && j < self.current.len() {
            match self.previous[i].cmp(&self.current[j]) {
                core::cmp::Ordering::Equal => {
                    self.events.push(ContactEvent {
                        pair: self.current[j],
                        kind: ContactEventKind::Persist,
                    });
                    i += 1;
                    j += 1;
                }
                core::cmp::Ordering::Less => {
                    self.events.push(ContactEvent {
                        pair: self.previous[i],
                        kind: ContactEventKind::End,
                    });
                    i += 1;
                }
                core::cmp::Ordering::Greater => {
                    self.events.push(ContactEvent {
                        pair: self.current[j],
                        kind: ContactEventKind::Begin,
                    });
                    j += 1;
                }
            }
        }
        for &pair in &self.previous[i..] {
            self.events.push(ContactEvent {
                pair,
                kind: ContactEventKind::End,
            });
        }
        for &pair in &self.current[j..] {
            self.events.push(ContactEvent {
                pair,
                kind: ContactEventKind::Begin,
            });
        }

        core::mem::swap(&mut self.previous, &mut self.current);
    }

    /// Drop tracking for a removed body so no stale end event fires later
    pub fn forget_body(&mut self, id: BodyId) {
        self.previous.retain(|pair| !pair.contains(id));
    }

    /// Events accumulated since the last drain
    #[must_use]
    pub fn events(&self) -> &[ContactEvent] {
        &self.events
    }

    /// Take all accumulated events
    pub fn drain(&mut self) -> Vec<ContactEvent> {
        core::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_for(collector: &EventCollector, pair: BodyPair) -> Vec<ContactEventKind> {
        collector
            .events()
            .iter()
            .filter(|e| e.pair == pair)
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_begin_persist_end_sequence() {
        let pair = BodyPair::new(0, 1);
        let mut collector = EventCollector::new();

        collector.begin_frame();
        collector.push_contact(pair);
        collector.end_frame();

        collector.begin_frame();
        collector.push_contact(pair);
        collector.end_frame();

        collector.begin_frame();
        collector.end_frame();

        assert_eq!(
            kinds_for(&collector, pair),
            [
                ContactEventKind::Begin,
                ContactEventKind::Persist,
                ContactEventKind::End,
            ]
        );
    }

    #[test]
    fn test_duplicate_push_emits_one_event() {
        let pair = BodyPair::new(2, 3);
        let mut collector = EventCollector::new();
        collector.begin_frame();
        collector.push_contact(pair);
        collector.push_contact(pair);
        collector.end_frame();

        assert_eq!(collector.events().len(), 1);
    }

    #[test]
    fn test_drain_clears_backlog() {
        let mut collector = EventCollector::new();
        collector.begin_frame();
        collector.push_contact(BodyPair::new(0, 1));
        collector.end_frame();

        assert_eq!(collector.drain().len(), 1);
        assert!(collector.events().is_empty());
    }

    #[test]
    fn test_forget_body_suppresses_end_event() {
        let pair = BodyPair::new(0, 1);
        let mut collector = EventCollector::new();
        collector.begin_frame();
        collector.push_contact(pair);
        collector.end_frame();

        collector.forget_body(1);
        collector.begin_frame();
        collector.end_frame();

        assert_eq!(collector.drain().len(), 1, "only the begin event remains");
    }

    #[test]
    fn test_independent_pairs() {
        let ab = BodyPair::new(0, 1);
        let cd = BodyPair::new(2, 3);
        let mut collector = EventCollector::new();

        collector.begin_frame();
        collector.push_contact(ab);
        collector.push_contact(cd);
        collector.end_frame();

        collector.begin_frame();
        collector.push_contact(cd);
        collector.end_frame();

        assert_eq!(kinds_for(&collector, ab), [ContactEventKind::Begin, ContactEventKind::End]);
        assert_eq!(
            kinds_for(&collector, cd),
            [ContactEventKind::Begin, ContactEventKind::Persist]
        );
    }
}
