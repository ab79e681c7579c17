use super::{subject_flavor_impl, Retention, Subject};
use crate::observable::Payload;

/// Replays retained items, oldest first, to every new subscriber.
///
/// After completing or failing it still replays them, followed by the
/// terminal notification.
pub struct ReplaySubject<Item>(Subject<Item>);

impl<Item: Payload> ReplaySubject<Item> {
  /// Retains every item.
  pub fn new() -> Self { ReplaySubject(Subject::with_retention(Retention::Last(None), None)) }

  /// Retains the last `capacity` items.
  pub fn with_capacity(capacity: usize) -> Self {
    ReplaySubject(Subject::with_retention(Retention::Last(Some(capacity)), None))
  }
}

impl<Item: Payload> Default for ReplaySubject<Item> {
  fn default() -> Self { Self::new() }
}

subject_flavor_impl!(ReplaySubject);

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxvar_macro::test]
  fn evicts_oldest_beyond_capacity() {
    let subject = ReplaySubject::with_capacity(4);
    for v in [1, 2, 7, 28, 3, 6] {
      subject.next(v);
    }
    subject.complete();
    assert_eq!(subject.to_vec(), Ok(vec![7, 28, 3, 6]));
    assert_eq!(subject.latest_item(), Some(6));
  }

  #[rxvar_macro::test]
  fn replays_history_before_the_error() {
    let subject = ReplaySubject::new();
    subject.next("a");
    subject.error(RxError::new("failed"));
    assert_eq!(subject.to_vec(), Err(RxError::new("failed")));
  }

  #[rxvar_macro::test]
  fn zero_capacity_retains_nothing() {
    let subject = ReplaySubject::with_capacity(0);
    subject.next(1);
    subject.complete();
    assert_eq!(subject.to_vec(), Ok(vec![]));
  }
}
