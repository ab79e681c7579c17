use std::{ops::Deref, sync::Arc};

use crate::{
  observable::Observable,
  subject::BehaviorSubject,
  value::{ListenerId, Value},
  var::Var,
};

/// Owning handle of an observable bridged from a [`Value`].
///
/// Subscribers get the value current at the last notification right away,
/// then every coalesced change. The bridge lives as long as some clone of
/// this handle does: once the last one is dropped the listener is removed
/// and subscribers receive `complete`. Observables derived from it with
/// operators do not keep it alive.
#[derive(Clone)]
pub struct ValueObservable {
  bridge: Arc<Bridge>,
  observable: Observable<Var>,
}

struct Bridge {
  value: Value,
  subject: BehaviorSubject<Var>,
  listener: ListenerId,
}

impl Drop for Bridge {
  fn drop(&mut self) {
    self.value.remove_listener(self.listener);
    self.subject.complete();
    tracing::debug!("value bridge completed");
  }
}

impl ValueObservable {
  pub fn value(&self) -> &Value { &self.bridge.value }

  /// The bridged stream, without ownership of the bridge.
  pub fn as_observable(&self) -> Observable<Var> { self.observable.clone() }
}

impl Deref for ValueObservable {
  type Target = Observable<Var>;

  fn deref(&self) -> &Self::Target { &self.observable }
}

impl Observable<Var> {
  /// Bridges `value` into an observable, see [`ValueObservable`].
  pub fn from_value(value: &Value) -> ValueObservable {
    let subject = BehaviorSubject::new(value.get());
    let s = subject.clone();
    let listener = value.add_listener(move |v| s.next(v.clone()));
    let observable = subject.as_observable();
    let bridge = Bridge { value: value.clone(), subject, listener };
    ValueObservable { bridge: Arc::new(bridge), observable }
  }
}
