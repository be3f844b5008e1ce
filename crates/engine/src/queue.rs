// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciler work queue: a min-heap ordered by `not_before`, deduplicated
//! by `(process_id, action)` so a process can never have two pending
//! `Spawn`s (or two pending `Stop`s) racing each other. Per spec, a second
//! enqueue under the same key doesn't just get dropped unconditionally —
//! whichever of the two carries the earlier deadline wins, so an urgent
//! reschedule (e.g. `Terminate(grace=0)` superseding an in-flight graceful
//! stop) can still pull a pending action's deadline in. A `HashMap` tracks
//! each key's current authoritative deadline; stale heap entries left behind
//! by a superseded push are discarded lazily when popped.

use patsup_core::{Action, ProcessId, WorkItem};
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

#[derive(Default)]
pub struct WorkQueue {
    heap: BinaryHeap<WorkItem>,
    pending: HashMap<(ProcessId, Action), Instant>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a work item. If one with the same dedup key is already
    /// pending, keep whichever of the two has the earlier `not_before` and
    /// drop the other. Returns `true` if this item became (or stays) the
    /// authoritative one for its key.
    pub fn push(&mut self, item: WorkItem) -> bool {
        let key = item.dedup_key();
        if let Some(&existing) = self.pending.get(&key) {
            if item.not_before >= existing {
                return false;
            }
        }
        self.pending.insert(key, item.not_before);
        self.heap.push(item);
        true
    }

    /// Pop the earliest-due item that is actually ready (`not_before <=
    /// now`); items not yet due stay queued. Heap entries superseded by a
    /// later `push` for the same key are skipped transparently.
    pub fn pop_ready(&mut self, now: Instant) -> Option<WorkItem> {
        loop {
            let ready = self.heap.peek().map(|item| item.not_before <= now).unwrap_or(false);
            if !ready {
                return None;
            }
            let item = self.heap.pop()?;
            let key = item.dedup_key();
            match self.pending.get(&key) {
                Some(&authoritative) if authoritative == item.not_before => {
                    self.pending.remove(&key);
                    return Some(item);
                }
                _ => continue,
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|item| item.not_before)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn dedups_same_process_and_action() {
        let mut queue = WorkQueue::new();
        let pid = ProcessId::new("shared:hello");
        let now = Instant::now();
        assert!(queue.push(WorkItem::new(pid.clone(), Action::Spawn, now)));
        assert!(!queue.push(WorkItem::new(pid.clone(), Action::Spawn, now + Duration::from_secs(1))));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn earlier_deadline_supersedes_a_later_pending_item() {
        let mut queue = WorkQueue::new();
        let pid = ProcessId::new("shared:hello");
        let now = Instant::now();
        assert!(queue.push(WorkItem::new(pid.clone(), Action::Stop, now + Duration::from_secs(10))));
        // A graceless terminate arrives after a graceful one is already
        // pending: the earlier deadline (now) should win, not be dropped.
        assert!(queue.push(WorkItem::new(pid.clone(), Action::Stop, now)));

        let item = queue.pop_ready(now).expect("earlier item should be ready immediately");
        assert_eq!(item.not_before, now);

        // The superseded later entry is still physically in the heap but is
        // discarded as stale rather than returned a second time.
        assert!(queue.pop_ready(now + Duration::from_secs(10)).is_none());
    }

    #[test]
    fn distinct_actions_on_same_process_both_queue() {
        let mut queue = WorkQueue::new();
        let pid = ProcessId::new("shared:hello");
        let now = Instant::now();
        assert!(queue.push(WorkItem::new(pid.clone(), Action::Spawn, now)));
        assert!(queue.push(WorkItem::new(pid.clone(), Action::Probe, now)));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn pop_ready_respects_not_before() {
        let mut queue = WorkQueue::new();
        let now = Instant::now();
        queue.push(WorkItem::new(ProcessId::new("shared:a"), Action::Spawn, now + Duration::from_secs(10)));
        assert!(queue.pop_ready(now).is_none());
        assert!(queue.pop_ready(now + Duration::from_secs(10)).is_some());
    }

    #[test]
    fn popped_item_can_be_requeued() {
        let mut queue = WorkQueue::new();
        let pid = ProcessId::new("shared:a");
        let now = Instant::now();
        queue.push(WorkItem::new(pid.clone(), Action::Retry, now));
        let item = queue.pop_ready(now).unwrap();
        assert_eq!(item.process_id, pid);
        assert!(queue.push(WorkItem::new(pid, Action::Retry, now)));
    }
}
