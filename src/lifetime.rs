//! Tying subscriptions to the lifetime of their owner.
//!
//! An object that subscribes on its own behalf owns a [`Deallocated`]
//! signal and bounds every such subscription with
//! [`take_until`](crate::observable::Observable::take_until) on it. The
//! signal fires when the owner starts dropping, before any of the owner's
//! other fields are torn down, so no callback ever reaches a half-dropped
//! owner.

use std::{
  fmt,
  sync::atomic::{AtomicBool, Ordering},
};

use crate::{
  observable::{Observable, ValueObservable},
  subject::{BehaviorSubject, ReplaySubject},
  subscription::DisposeBag,
  value::Value,
  var::Var,
};

/// A one-shot "about to be dropped" signal.
///
/// Declare it as the first field of the owner, so it drops (and fires)
/// first, or call [`fire`](Self::fire) at the top of the owner's own
/// `Drop`.
pub struct Deallocated {
  subject: ReplaySubject<()>,
  fired: AtomicBool,
}

impl Deallocated {
  pub fn new() -> Self { Deallocated { subject: ReplaySubject::with_capacity(1), fired: AtomicBool::new(false) } }

  /// Emits `()` once, when the signal fires, then completes. Subscribing
  /// after that still yields `()`, so `take_until` on it ends at once.
  pub fn observable(&self) -> Observable<()> { self.subject.as_observable() }

  /// Fires the signal. Only the first call has an effect.
  pub fn fire(&self) {
    if self.fired.swap(true, Ordering::AcqRel) {
      return;
    }
    tracing::debug!(subscribers = self.subject.subscriber_count(), "deallocated signal fired");
    self.subject.next(());
    self.subject.complete();
  }

  pub fn is_fired(&self) -> bool { self.fired.load(Ordering::Acquire) }
}

impl Default for Deallocated {
  fn default() -> Self { Self::new() }
}

impl Drop for Deallocated {
  fn drop(&mut self) { self.fire() }
}

impl fmt::Debug for Deallocated {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Deallocated").field("fired", &self.is_fired()).finish()
  }
}

/// A [`Value`] bound two ways to a [`BehaviorSubject`].
///
/// Pushing into [`subject`](Self::subject) sets the value; changes made to
/// the value through any handle are pushed into the subject once the
/// value's message loop delivers them. Dropping the `ReactiveValue` ends
/// both bindings and completes its subject's subscribers.
pub struct ReactiveValue {
  deallocated: Deallocated,
  value: Value,
  subject: BehaviorSubject<Var>,
  _bridge: ValueObservable,
  _bindings: DisposeBag,
}

impl ReactiveValue {
  /// Binds a fresh value, notified through the calling thread's message
  /// loop.
  pub fn new(initial: impl Into<Var>) -> Self { ReactiveValue::with_value(Value::new(initial)) }

  /// Binds to `value`, sharing its source with every other handle.
  pub fn with_value(value: Value) -> Self {
    let deallocated = Deallocated::new();
    let subject = BehaviorSubject::new(value.get());
    let bridge = Observable::from_value(&value);
    let bindings = DisposeBag::new();
    let until = deallocated.observable();

    let target = value.clone();
    subject
      .take_until(&until)
      .subscribe_err(move |v| target.set(v), |err| tracing::error!(error = %err, "reactive value subject failed"))
      .disposed_by(&bindings);

    let s = subject.clone();
    bridge
      .take_until(&until)
      .subscribe(move |v| {
        if s.latest_item().as_ref() != Some(&v) {
          s.next(v);
        }
      })
      .disposed_by(&bindings);

    ReactiveValue { deallocated, value, subject, _bridge: bridge, _bindings: bindings }
  }

  pub fn value(&self) -> &Value { &self.value }

  pub fn get(&self) -> Var { self.subject.value() }

  /// Pushes `value` into the subject, which sets the underlying value.
  pub fn set(&self, value: impl Into<Var>) { self.subject.next(value.into()) }

  /// Subscribe to follow the value, push to change it.
  pub fn subject(&self) -> &BehaviorSubject<Var> { &self.subject }

  pub fn observable(&self) -> Observable<Var> { self.subject.as_observable() }

  pub fn deallocated(&self) -> &Deallocated { &self.deallocated }
}

impl Drop for ReactiveValue {
  fn drop(&mut self) {
    self.deallocated.fire();
    self.subject.complete();
  }
}

impl fmt::Debug for ReactiveValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ReactiveValue").field("value", &self.value).finish()
  }
}
