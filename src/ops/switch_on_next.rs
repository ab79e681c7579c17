use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  error::RxError,
  observable::{Observable, Payload, Subscribable},
  observer::{error_proxy_impl, Observer},
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionLike},
  var::Var,
};

struct SwitchOp<Item> {
  source: Observable<Observable<Item>>,
}

#[derive(Default)]
struct SwitchState {
  /// Incremented for every inner observable; only the inner holding the
  /// current id may emit.
  current: u64,
  inner: Option<Subscription>,
  inner_active: bool,
  outer_done: bool,
}

impl<Item: Payload> Subscribable<Item> for SwitchOp<Item> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let observer = SwitchObserver { downstream: subscriber.clone(), state: Arc::default() };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct SwitchObserver<Item> {
  downstream: Subscriber<Item>,
  state: Arc<Mutex<SwitchState>>,
}

impl<Item: Payload> Observer<Observable<Item>> for SwitchObserver<Item> {
  fn next(&mut self, inner: Observable<Item>) {
    let (id, previous) = {
      let mut state = self.state.lock();
      state.current += 1;
      state.inner_active = true;
      (state.current, state.inner.take())
    };
    if let Some(previous) = previous {
      previous.unsubscribe();
    }

    let observer =
      SwitchInnerObserver { downstream: self.downstream.clone(), state: self.state.clone(), id };
    let subscriber = self.downstream.chain(observer);
    {
      let mut state = self.state.lock();
      if state.current == id {
        state.inner = Some(subscriber.subscription().clone());
      }
    }
    inner.actual_subscribe(subscriber);
  }

  error_proxy_impl!(downstream);

  fn complete(&mut self) {
    let finished = {
      let mut state = self.state.lock();
      state.outer_done = true;
      !state.inner_active
    };
    if finished {
      self.downstream.complete();
    }
  }
}

struct SwitchInnerObserver<Item> {
  downstream: Subscriber<Item>,
  state: Arc<Mutex<SwitchState>>,
  id: u64,
}

impl<Item> SwitchInnerObserver<Item> {
  fn is_current(&self) -> bool { self.state.lock().current == self.id }
}

impl<Item: Payload> Observer<Item> for SwitchInnerObserver<Item> {
  fn next(&mut self, value: Item) {
    if self.is_current() {
      self.downstream.next(value);
    }
  }

  fn error(&mut self, err: RxError) {
    if self.is_current() {
      self.downstream.error(err);
    }
  }

  fn complete(&mut self) {
    let finished = {
      let mut state = self.state.lock();
      if state.current != self.id {
        return;
      }
      state.inner_active = false;
      state.inner = None;
      state.outer_done
    };
    if finished {
      self.downstream.complete();
    }
  }
}

impl<Item: Payload> Observable<Observable<Item>> {
  /// Mirrors the most recent inner observable.
  ///
  /// Every new inner observable unsubscribes the previous one; items the
  /// abandoned inner still produces are dropped. Completes once the outer
  /// and the current inner observable have completed.
  pub fn switch_on_next(&self) -> Observable<Item> { Observable::new(SwitchOp { source: self.clone() }) }
}

impl Observable<Var> {
  /// [`switch_on_next`](Observable::switch_on_next) over dynamic values.
  ///
  /// Every item must wrap an `Observable<Var>`; any other value fails the
  /// stream with [`RxError::NotAnObservable`].
  pub fn switch_on_next(&self) -> Observable<Var> {
    self
      .try_map(|v: Var| {
        v.as_observable().ok_or_else(|| RxError::NotAnObservable { found: format!("{} ({v})", v.kind()) })
      })
      .switch_on_next()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn abandoned_inner_is_ignored() {
    let outer = PublishSubject::<Observable<i32>>::new();
    let first = PublishSubject::<i32>::new();
    let second = PublishSubject::<i32>::new();
    let got = Arc::new(Mutex::new(vec![]));
    let g = got.clone();
    let _d = outer.switch_on_next().subscribe(move |v| g.lock().push(v));

    outer.next(first.as_observable());
    first.next(1);
    outer.next(second.as_observable());
    first.next(2);
    second.next(3);
    assert_eq!(*got.lock(), vec![1, 3]);
    assert_eq!(first.subscriber_count(), 0);
  }

  #[rxvar_macro::test]
  fn completes_after_outer_and_current_inner() {
    let outer = PublishSubject::<Observable<i32>>::new();
    let inner = PublishSubject::<i32>::new();
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    let _d = outer.switch_on_next().subscribe_all(|_| {}, |e| panic!("{e}"), move || *c.lock() = true);
    outer.next(inner.as_observable());
    outer.complete();
    assert!(!*completed.lock());
    inner.complete();
    assert!(*completed.lock());
  }

  #[rxvar_macro::test]
  fn nested_dynamic_switching() {
    let o = Observable::from_iter([1, 2])
      .map(|v| Var::from(Observable::just(Var::from(Observable::from_iter([v * 10, v * 10 + 1]).into_dynamic()))))
      .switch_on_next()
      .switch_on_next()
      .typed::<i64>();
    assert_eq!(o.to_vec(), Ok(vec![10, 11, 20, 21]));
  }

  #[rxvar_macro::test]
  fn dynamic_items_must_be_observables() {
    let o = Observable::just(Var::from(5)).switch_on_next();
    assert!(matches!(o.to_vec(), Err(RxError::NotAnObservable { .. })));
  }
}
