use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::{Observable, Payload, Subscribable},
  observer::{error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct CombineLatestOp<A, B> {
  left: Observable<A>,
  right: Observable<B>,
}

struct CombineState<A, B> {
  left: Option<A>,
  right: Option<B>,
  done: [bool; 2],
}

type Shared<A, B> = Arc<Mutex<CombineState<A, B>>>;

impl<A: Payload, B: Payload> Subscribable<(A, B)> for CombineLatestOp<A, B> {
  fn actual_subscribe(&self, subscriber: Subscriber<(A, B)>) {
    let state: Shared<A, B> =
      Arc::new(Mutex::new(CombineState { left: None, right: None, done: [false; 2] }));
    let left = CombineObserver {
      downstream: subscriber.clone(),
      state: state.clone(),
      side: 0,
      emitted: false,
      store: |s: &mut CombineState<A, B>, v| s.left = Some(v),
    };
    self.left.actual_subscribe(subscriber.chain(left));
    let right = CombineObserver {
      downstream: subscriber.clone(),
      state,
      side: 1,
      emitted: false,
      store: |s: &mut CombineState<A, B>, v| s.right = Some(v),
    };
    self.right.actual_subscribe(subscriber.chain(right));
  }
}

struct CombineObserver<A, B, V> {
  downstream: Subscriber<(A, B)>,
  state: Shared<A, B>,
  side: usize,
  emitted: bool,
  store: fn(&mut CombineState<A, B>, V),
}

impl<A: Payload, B: Payload, V> Observer<V> for CombineObserver<A, B, V> {
  fn next(&mut self, value: V) {
    self.emitted = true;
    let latest = {
      let mut state = self.state.lock();
      (self.store)(&mut state, value);
      state.left.clone().zip(state.right.clone())
    };
    if let Some(pair) = latest {
      self.downstream.next(pair);
    }
  }

  error_proxy_impl!(downstream);

  fn complete(&mut self) {
    let finished = {
      let mut state = self.state.lock();
      state.done[self.side] = true;
      // A source that never emitted means no combination ever will.
      !self.emitted || state.done == [true; 2]
    };
    if finished {
      self.downstream.complete();
    }
  }
}

pub(crate) fn combine_latest_pair<A: Payload, B: Payload>(
  left: &Observable<A>, right: &Observable<B>,
) -> Observable<(A, B)> {
  Observable::new(CombineLatestOp { left: left.clone(), right: right.clone() })
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn emits_once_all_have_values() {
    let a = PublishSubject::<i32>::new();
    let b = PublishSubject::<&str>::new();
    let got = Arc::new(Mutex::new(vec![]));
    let g = got.clone();
    let _d = a.combine_latest(b.as_observable()).subscribe(move |v| g.lock().push(v));
    a.next(1);
    a.next(2);
    assert!(got.lock().is_empty());
    b.next("x");
    a.next(3);
    b.next("y");
    assert_eq!(*got.lock(), vec![(2, "x"), (3, "x"), (3, "y")]);
  }

  #[rxvar_macro::test]
  fn completes_when_all_complete() {
    let a = PublishSubject::<i32>::new();
    let b = PublishSubject::<i32>::new();
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    let _d = a.combine_latest(b.as_observable()).subscribe_all(|_| {}, |e| panic!("{e}"), move || *c.lock() = true);
    a.next(1);
    b.next(1);
    a.complete();
    assert!(!*completed.lock());
    b.complete();
    assert!(*completed.lock());
  }

  #[rxvar_macro::test]
  fn silent_source_completes_immediately() {
    let o = Observable::from_iter([1, 2]).combine_latest(Observable::<i32>::empty());
    assert_eq!(o.to_vec(), Ok(vec![]));
  }

  #[rxvar_macro::test]
  fn combines_many_sources_with_a_function() {
    let o = Observable::just(1).combine_latest_with(
      (Observable::just("two"), Observable::just(3.0), Observable::from_iter([4u8, 5])),
      |(a, b, c, d)| format!("{a}-{b}-{c}-{d}"),
    );
    assert_eq!(o.to_vec(), Ok(vec!["1-two-3-4".to_string(), "1-two-3-5".to_string()]));
  }

  #[rxvar_macro::test]
  fn errors_immediately() {
    let o = Observable::<i32>::never().combine_latest((Observable::<i32>::error("bad"),));
    assert_eq!(o.to_vec(), Err(RxError::new("bad")));
  }
}
