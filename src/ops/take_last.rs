use std::collections::VecDeque;

use crate::{
  observable::{Observable, Payload, Subscribable},
  observer::{error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct TakeLastOp<Item> {
  source: Observable<Item>,
  count: usize,
}

impl<Item: Payload> Subscribable<Item> for TakeLastOp<Item> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let observer =
      TakeLastObserver { downstream: subscriber.clone(), count: self.count, buffer: VecDeque::new() };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct TakeLastObserver<Item> {
  downstream: Subscriber<Item>,
  count: usize,
  buffer: VecDeque<Item>,
}

impl<Item: Payload> Observer<Item> for TakeLastObserver<Item> {
  fn next(&mut self, value: Item) {
    if self.count == 0 {
      return;
    }
    if self.buffer.len() == self.count {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  error_proxy_impl!(downstream);

  fn complete(&mut self) {
    for value in self.buffer.drain(..) {
      self.downstream.next(value);
    }
    self.downstream.complete();
  }
}

impl<Item: Payload> Observable<Item> {
  /// Emits the last `count` items once the source completes.
  pub fn take_last(&self, count: usize) -> Observable<Item> {
    Observable::new(TakeLastOp { source: self.clone(), count })
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxvar_macro::test]
  fn keeps_the_tail() {
    assert_eq!(Observable::from_iter(0..10).take_last(3).to_vec(), Ok(vec![7, 8, 9]));
    assert_eq!(Observable::from_iter(0..2).take_last(3).to_vec(), Ok(vec![0, 1]));
    assert_eq!(Observable::from_iter(0..2).take_last(0).to_vec(), Ok(vec![]));
  }

  #[rxvar_macro::test]
  fn errors_drop_the_buffer() {
    let o = Observable::from_iter([1, 2]).concat([Observable::error("late")]).take_last(1);
    assert_eq!(o.to_vec(), Err(RxError::new("late")));
  }
}
