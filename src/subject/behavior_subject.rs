use super::{subject_flavor_impl, Retention, Subject};
use crate::observable::Payload;

/// Holds a current value: subscribers receive it synchronously on
/// subscribe, then every later push.
pub struct BehaviorSubject<Item>(Subject<Item>);

impl<Item: Payload> BehaviorSubject<Item> {
  pub fn new(initial: Item) -> Self {
    BehaviorSubject(Subject::with_retention(Retention::Latest, Some(initial)))
  }

  /// The current value: the seed, or the latest push.
  pub fn value(&self) -> Item {
    match self.0.latest_item() {
      Some(v) => v,
      None => unreachable!("a behavior subject always holds a value"),
    }
  }
}

subject_flavor_impl!(BehaviorSubject);
