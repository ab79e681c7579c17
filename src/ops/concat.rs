use std::sync::Arc;

use crate::{
  observable::{Observable, Payload, Subscribable},
  observer::{error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct ConcatOp<Item> {
  sources: Arc<[Observable<Item>]>,
}

impl<Item: Payload> Subscribable<Item> for ConcatOp<Item> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    subscribe_from(self.sources.clone(), 0, subscriber)
  }
}

fn subscribe_from<Item: Payload>(
  sources: Arc<[Observable<Item>]>, index: usize, downstream: Subscriber<Item>,
) {
  let Some(source) = sources.get(index).cloned() else {
    return downstream.complete();
  };
  let observer = ConcatObserver { downstream: downstream.clone(), sources, index };
  source.actual_subscribe(downstream.chain(observer));
}

struct ConcatObserver<Item> {
  downstream: Subscriber<Item>,
  sources: Arc<[Observable<Item>]>,
  index: usize,
}

impl<Item: Payload> Observer<Item> for ConcatObserver<Item> {
  fn next(&mut self, value: Item) { self.downstream.next(value) }

  error_proxy_impl!(downstream);

  fn complete(&mut self) {
    subscribe_from(self.sources.clone(), self.index + 1, self.downstream.clone())
  }
}

impl<Item: Payload> Observable<Item> {
  /// Emits this observable's items, then each of `others` in turn. The
  /// next source is subscribed only once the previous one completed.
  pub fn concat(&self, others: impl IntoIterator<Item = Observable<Item>>) -> Observable<Item> {
    let sources = std::iter::once(self.clone()).chain(others).collect();
    Observable::new(ConcatOp { sources })
  }

  /// Emits `items` before this observable's own items.
  pub fn start_with(&self, items: impl IntoIterator<Item = Item>) -> Observable<Item> {
    Observable::from_iter(items).concat([self.clone()])
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn subscribes_sequentially() {
    let first = PublishSubject::new();
    let subscribed = Arc::new(Mutex::new(false));
    let s = subscribed.clone();
    let second = Observable::defer(move || {
      *s.lock() = true;
      Observable::from_iter([3, 4])
    });
    let got = Arc::new(Mutex::new(vec![]));
    let g = got.clone();
    let _d = first.concat([second]).subscribe(move |v| g.lock().push(v));
    first.next(1);
    first.next(2);
    assert!(!*subscribed.lock());
    first.complete();
    assert!(*subscribed.lock());
    assert_eq!(*got.lock(), vec![1, 2, 3, 4]);
  }

  #[rxvar_macro::test]
  fn start_with_prepends() {
    let o = Observable::from_iter([3, 4]).start_with([1, 2]);
    assert_eq!(o.to_vec(), Ok(vec![1, 2, 3, 4]));
  }

  #[rxvar_macro::test]
  fn error_skips_the_rest() {
    let o = Observable::just(1).concat([Observable::error("stop"), Observable::just(2)]);
    assert_eq!(o.to_vec(), Err(RxError::new("stop")));
  }
}
