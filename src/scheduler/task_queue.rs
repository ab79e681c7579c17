use std::{cmp::Ordering, collections::BinaryHeap};

use super::PendingTask;

/// Tasks ordered by due time, FIFO among equal due times.
///
/// Generic over the clock so the same queue serves wall-clock workers
/// (`Instant`) and the virtual clock of `TestScheduler` (`Duration`).
pub(crate) struct TaskQueue<T> {
  heap: BinaryHeap<Entry<T>>,
  next_seq: u64,
}

struct Entry<T> {
  due: T,
  seq: u64,
  task: PendingTask,
}

impl<T: Ord> PartialEq for Entry<T> {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl<T: Ord> Eq for Entry<T> {}

impl<T: Ord> PartialOrd for Entry<T> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl<T: Ord> Ord for Entry<T> {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by seq
    other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
  }
}

impl<T> Default for TaskQueue<T> {
  fn default() -> Self { TaskQueue { heap: BinaryHeap::new(), next_seq: 0 } }
}

impl<T: Ord + Copy> TaskQueue<T> {
  pub fn push(&mut self, due: T, task: PendingTask) {
    let seq = self.next_seq;
    self.next_seq += 1;
    self.heap.push(Entry { due, seq, task });
  }

  /// Due time of the earliest task, cancelled or not.
  pub fn next_due(&self) -> Option<T> { self.heap.peek().map(|e| e.due) }

  /// Removes the earliest task if it is due at `now`.
  ///
  /// Cancelled tasks are returned too; callers drop them outside any lock
  /// since dropping a task may release the scheduler itself.
  pub fn pop_due(&mut self, now: T) -> Option<(T, PendingTask)> {
    if self.next_due()? <= now {
      self.pop()
    } else {
      None
    }
  }

  pub fn pop(&mut self) -> Option<(T, PendingTask)> { self.heap.pop().map(|e| (e.due, e.task)) }

  #[inline]
  pub fn len(&self) -> usize { self.heap.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.heap.is_empty() }
}
