use std::sync::Arc;

use crate::{
  observable::{Observable, Payload, Subscribable},
  subscriber::Subscriber,
};

struct FromIter<Item>(Arc<[Item]>);

impl<Item: Payload> Subscribable<Item> for FromIter<Item> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    for v in self.0.iter() {
      if subscriber.is_closed() {
        return;
      }
      subscriber.next(v.clone());
    }
    subscriber.complete();
  }
}

impl<Item: Payload> Observable<Item> {
  /// Emits every element of `iter`, in order, then completes.
  ///
  /// The elements are collected up front, so `iter` must be finite; see
  /// [`repeat`](Self::repeat) for endless sources.
  pub fn from_iter(iter: impl IntoIterator<Item = Item>) -> Self {
    Observable::new(FromIter(iter.into_iter().collect()))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn emits_in_order() {
    assert_eq!(Observable::from_iter(vec!["Hello", "World"]).to_vec(), Ok(vec!["Hello", "World"]));
    assert_eq!(Observable::from_iter(0..0).to_vec(), Ok(vec![]));
  }

  #[rxvar_macro::test]
  fn stops_when_closed() {
    let seen = Arc::new(Mutex::new(0));
    let s = seen.clone();
    let result = Observable::from_iter(0..100)
      .map(move |v| {
        *s.lock() += 1;
        v
      })
      .take(3)
      .to_vec();
    assert_eq!(result, Ok(vec![0, 1, 2]));
    assert_eq!(*seen.lock(), 3);
  }
}
