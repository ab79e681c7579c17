use super::{subject_flavor_impl, Retention, Subject};
use crate::observable::Payload;

/// Emits to subscribers only what is pushed after they subscribed.
///
/// ```rust
/// use rxvar::prelude::*;
///
/// let subject = PublishSubject::new();
/// subject.next(1);
/// subject.next(2);
/// let late = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
/// let l = late.clone();
/// let _d = subject.subscribe(move |v: i32| l.lock().push(v));
/// assert!(late.lock().is_empty());
/// ```
pub struct PublishSubject<Item>(Subject<Item>);

impl<Item: Payload> PublishSubject<Item> {
  pub fn new() -> Self { PublishSubject(Subject::with_retention(Retention::Nothing, None)) }
}

impl<Item: Payload> Default for PublishSubject<Item> {
  fn default() -> Self { Self::new() }
}

subject_flavor_impl!(PublishSubject);
