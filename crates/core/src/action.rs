// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work-queue item types. The queue itself (a min-heap ordered by
//! `not_before`, deduplicated by `(process_id, action)`) lives in the engine
//! crate, which is the only crate allowed to touch a scheduler.

use crate::ids::ProcessId;
use std::time::Instant;

/// An action the reconciler may perform against a single process record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Start (or restart) the child process.
    Spawn,
    /// Run a single health probe against a running child.
    Probe,
    /// Send a graceful-then-forceful stop sequence.
    Stop,
    /// Re-enqueue a `Spawn` after a backoff delay following a crash.
    Retry,
    /// Drop a terminal record that has outlived its retention window.
    Gc,
}

/// A scheduled unit of work. Ordered for the queue's min-heap by
/// `not_before` (earliest first); `Ord`/`PartialOrd` are reversed relative to
/// the natural tuple order so that a `BinaryHeap` — normally a max-heap —
/// pops the soonest-due item first.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub process_id: ProcessId,
    pub action: Action,
    pub not_before: Instant,
}

impl WorkItem {
    pub fn new(process_id: ProcessId, action: Action, not_before: Instant) -> Self {
        Self { process_id, action, not_before }
    }

    /// Dedup key: only one pending work item per `(process_id, action)` pair
    /// is ever queued at a time.
    pub fn dedup_key(&self) -> (ProcessId, Action) {
        (self.process_id.clone(), self.action)
    }
}

impl PartialEq for WorkItem {
    fn eq(&self, other: &Self) -> bool {
        self.not_before == other.not_before
    }
}

impl Eq for WorkItem {}

impl PartialOrd for WorkItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WorkItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest deadline first.
        other.not_before.cmp(&self.not_before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;
    use std::time::Duration;

    #[test]
    fn heap_pops_earliest_deadline_first() {
        let base = Instant::now();
        let mut heap = BinaryHeap::new();
        heap.push(WorkItem::new(
            ProcessId::new("shared:a"),
            Action::Spawn,
            base + Duration::from_secs(5),
        ));
        heap.push(WorkItem::new(
            ProcessId::new("shared:b"),
            Action::Spawn,
            base + Duration::from_secs(1),
        ));
        heap.push(WorkItem::new(
            ProcessId::new("shared:c"),
            Action::Spawn,
            base + Duration::from_secs(3),
        ));

        let order: Vec<_> = std::iter::from_fn(|| heap.pop())
            .map(|item| item.process_id.as_str().to_string())
            .collect();
        assert_eq!(order, vec!["shared:b", "shared:c", "shared:a"]);
    }

    #[test]
    fn dedup_key_ignores_not_before() {
        let pid = ProcessId::new("shared:a");
        let a = WorkItem::new(pid.clone(), Action::Probe, Instant::now());
        let b = WorkItem::new(pid.clone(), Action::Probe, Instant::now() + Duration::from_secs(9));
        assert_eq!(a.dedup_key(), b.dedup_key());
    }
}
