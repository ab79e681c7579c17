use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::{
  observable::{Observable, Payload, Subscribable},
  observer::{error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct ZipOp<A, B> {
  left: Observable<A>,
  right: Observable<B>,
}

struct ZipState<A, B> {
  left: VecDeque<A>,
  right: VecDeque<B>,
  done: [bool; 2],
}

impl<A, B> ZipState<A, B> {
  fn pop_pair(&mut self) -> Option<(A, B)> {
    if self.left.is_empty() || self.right.is_empty() {
      return None;
    }
    self.left.pop_front().zip(self.right.pop_front())
  }

  /// A finished side with nothing buffered can't pair again.
  fn exhausted(&self) -> bool {
    (self.done[0] && self.left.is_empty()) || (self.done[1] && self.right.is_empty())
  }
}

type Shared<A, B> = Arc<Mutex<ZipState<A, B>>>;

impl<A: Payload, B: Payload> Subscribable<(A, B)> for ZipOp<A, B> {
  fn actual_subscribe(&self, subscriber: Subscriber<(A, B)>) {
    let state: Shared<A, B> = Arc::new(Mutex::new(ZipState {
      left: VecDeque::new(),
      right: VecDeque::new(),
      done: [false; 2],
    }));
    let left = ZipObserver {
      downstream: subscriber.clone(),
      state: state.clone(),
      side: 0,
      push: |s: &mut ZipState<A, B>, v| s.left.push_back(v),
    };
    self.left.actual_subscribe(subscriber.chain(left));
    let right = ZipObserver {
      downstream: subscriber.clone(),
      state,
      side: 1,
      push: |s: &mut ZipState<A, B>, v| s.right.push_back(v),
    };
    self.right.actual_subscribe(subscriber.chain(right));
  }
}

struct ZipObserver<A, B, V> {
  downstream: Subscriber<(A, B)>,
  state: Shared<A, B>,
  side: usize,
  push: fn(&mut ZipState<A, B>, V),
}

impl<A: Payload, B: Payload, V> Observer<V> for ZipObserver<A, B, V> {
  fn next(&mut self, value: V) {
    let (pair, exhausted) = {
      let mut state = self.state.lock();
      (self.push)(&mut state, value);
      let pair = state.pop_pair();
      (pair, state.exhausted())
    };
    if let Some(pair) = pair {
      self.downstream.next(pair);
    }
    if exhausted {
      self.downstream.complete();
    }
  }

  error_proxy_impl!(downstream);

  fn complete(&mut self) {
    let exhausted = {
      let mut state = self.state.lock();
      state.done[self.side] = true;
      state.exhausted()
    };
    if exhausted {
      self.downstream.complete();
    }
  }
}

pub(crate) fn zip_pair<A: Payload, B: Payload>(
  left: &Observable<A>, right: &Observable<B>,
) -> Observable<(A, B)> {
  Observable::new(ZipOp { left: left.clone(), right: right.clone() })
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn pairs_by_index() {
    let a = PublishSubject::<i32>::new();
    let b = PublishSubject::<&str>::new();
    let got = Arc::new(Mutex::new(vec![]));
    let g = got.clone();
    let _d = a.zip(b.as_observable()).subscribe(move |v| g.lock().push(v));
    a.next(1);
    a.next(2);
    a.next(3);
    b.next("one");
    b.next("two");
    assert_eq!(*got.lock(), vec![(1, "one"), (2, "two")]);
  }

  #[rxvar_macro::test]
  fn ends_with_the_shortest_source() {
    let o = Observable::from_iter([1, 2, 3, 4]).zip_with(
      (Observable::from_iter(['a', 'b', 'c']), Observable::repeat(true)),
      |(n, c, _)| format!("{n}{c}"),
    );
    assert_eq!(o.to_vec(), Ok(vec!["1a".to_string(), "2b".to_string(), "3c".to_string()]));
  }

  #[rxvar_macro::test]
  fn buffered_items_still_pair_after_completion() {
    let a = PublishSubject::<i32>::new();
    let b = PublishSubject::<i32>::new();
    let log = Arc::new(Mutex::new(vec![]));
    let (n, c) = (log.clone(), log.clone());
    let _d = a.zip(b.as_observable()).subscribe_all(
      move |(x, y)| n.lock().push(format!("{x}+{y}")),
      |e| panic!("{e}"),
      move || c.lock().push("completed".into()),
    );
    a.next(1);
    a.next(2);
    a.complete();
    b.next(10);
    assert_eq!(*log.lock(), vec!["1+10"]);
    b.next(20);
    assert_eq!(*log.lock(), vec!["1+10", "2+20", "completed"]);
  }
}
