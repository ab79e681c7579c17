use crate::{
  observable::{Observable, Payload, Subscribable},
  observer::{complete_proxy_impl, error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct TakeOp<Item> {
  source: Observable<Item>,
  count: usize,
}

impl<Item: Payload> Subscribable<Item> for TakeOp<Item> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    if self.count == 0 {
      return subscriber.complete();
    }
    let observer = TakeObserver { downstream: subscriber.clone(), remaining: self.count };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct TakeObserver<Item> {
  downstream: Subscriber<Item>,
  remaining: usize,
}

impl<Item: Payload> Observer<Item> for TakeObserver<Item> {
  fn next(&mut self, value: Item) {
    if self.remaining == 0 {
      return;
    }
    self.remaining -= 1;
    self.downstream.next(value);
    if self.remaining == 0 {
      self.downstream.complete();
    }
  }

  error_proxy_impl!(downstream);
  complete_proxy_impl!(downstream);
}

impl<Item: Payload> Observable<Item> {
  /// Emits the first `count` items, then completes and unsubscribes from
  /// the source.
  pub fn take(&self, count: usize) -> Observable<Item> {
    Observable::new(TakeOp { source: self.clone(), count })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn bounds_endless_sources() {
    let produced = Arc::new(AtomicUsize::new(0));
    let p = produced.clone();
    let o = Observable::create(move |s: Subscriber<usize>| {
      let mut i = 0;
      while !s.is_closed() {
        p.fetch_add(1, Ordering::SeqCst);
        s.next(i);
        i += 1;
      }
    })
    .take(3);
    assert_eq!(o.to_vec(), Ok(vec![0, 1, 2]));
    assert_eq!(produced.load(Ordering::SeqCst), 3);
  }

  #[rxvar_macro::test]
  fn take_zero_completes_without_subscribing() {
    let subject = PublishSubject::<i32>::new();
    assert_eq!(subject.take(0).to_vec(), Ok(vec![]));
    assert_eq!(subject.subscriber_count(), 0);
  }

  #[rxvar_macro::test]
  fn unsubscribes_from_the_source() {
    let subject = PublishSubject::<i32>::new();
    let d = subject.take(1).subscribe(|_| {});
    assert_eq!(subject.subscriber_count(), 1);
    subject.next(1);
    assert_eq!(subject.subscriber_count(), 0);
    assert!(!d.is_subscribed());
  }
}
