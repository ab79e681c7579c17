use std::sync::Arc;

use crate::{
  observable::{Observable, Payload, Subscribable},
  observer::{complete_proxy_impl, error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct TakeWhileOp<Item, F> {
  source: Observable<Item>,
  predicate: Arc<F>,
}

impl<Item, F> Subscribable<Item> for TakeWhileOp<Item, F>
where
  Item: Payload,
  F: Fn(&Item) -> bool + Send + Sync + 'static,
{
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let observer = TakeWhileObserver { downstream: subscriber.clone(), predicate: self.predicate.clone() };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct TakeWhileObserver<Item, F> {
  downstream: Subscriber<Item>,
  predicate: Arc<F>,
}

impl<Item, F> Observer<Item> for TakeWhileObserver<Item, F>
where
  Item: Payload,
  F: Fn(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.predicate)(&value) {
      self.downstream.next(value);
    } else {
      self.downstream.complete();
    }
  }

  error_proxy_impl!(downstream);
  complete_proxy_impl!(downstream);
}

impl<Item: Payload> Observable<Item> {
  /// Emits items while `predicate` holds, and completes at the first item
  /// that fails it.
  pub fn take_while<F>(&self, predicate: F) -> Observable<Item>
  where
    F: Fn(&Item) -> bool + Send + Sync + 'static,
  {
    Observable::new(TakeWhileOp { source: self.clone(), predicate: Arc::new(predicate) })
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxvar_macro::test]
  fn stops_at_first_failure() {
    let o = Observable::from_iter([1, 2, 5, 1]).take_while(|v| *v < 3);
    assert_eq!(o.to_vec(), Ok(vec![1, 2]));
  }

  #[rxvar_macro::test]
  fn endless_source() {
    let o = Observable::interval_on(Duration::from_millis(1), SchedulerRef::new_thread())
      .take_while(|v| *v <= 3);
    assert_eq!(o.to_vec(), Ok(vec![1, 2, 3]));
  }
}
