use crate::{
  observable::{Observable, Payload, Subscribable},
  observer::{complete_proxy_impl, error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct SkipOp<Item> {
  source: Observable<Item>,
  count: usize,
}

impl<Item: Payload> Subscribable<Item> for SkipOp<Item> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let observer = SkipObserver { downstream: subscriber.clone(), remaining: self.count };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct SkipObserver<Item> {
  downstream: Subscriber<Item>,
  remaining: usize,
}

impl<Item: Payload> Observer<Item> for SkipObserver<Item> {
  fn next(&mut self, value: Item) {
    if self.remaining == 0 {
      self.downstream.next(value);
    } else {
      self.remaining -= 1;
    }
  }

  error_proxy_impl!(downstream);
  complete_proxy_impl!(downstream);
}

impl<Item: Payload> Observable<Item> {
  /// Ignores the first `count` items.
  pub fn skip(&self, count: usize) -> Observable<Item> {
    Observable::new(SkipOp { source: self.clone(), count })
  }
}
