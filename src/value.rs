//! A shared, observable property cell.
//!
//! [`Value`] stands in for a GUI toolkit's value object: every clone refers
//! to the same underlying source, and listeners registered through any
//! clone hear about changes made through any other. Change notifications
//! are asynchronous and coalesced: they are posted to the
//! [`MessageLoop`] the source was created on, and rapid writes before the
//! loop runs produce a single notification carrying the final value.

use std::{
  fmt,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Weak,
  },
};

use parking_lot::Mutex;

use crate::{message_loop::MessageLoop, subscription::DynamicSubscriptions, var::Var};

pub(crate) type Listener = Arc<dyn Fn(&Var) + Send + Sync>;

/// Identifies a listener registered with [`Value::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(usize);

#[derive(Clone)]
pub struct Value(Arc<Source>);

struct Source {
  value: Mutex<Var>,
  listeners: Mutex<DynamicSubscriptions<Listener>>,
  notify_pending: AtomicBool,
  looper: MessageLoop,
}

impl Value {
  /// A new source notifying through the calling thread's message loop.
  pub fn new(initial: impl Into<Var>) -> Self { Value::with_loop(initial, MessageLoop::current()) }

  pub fn with_loop(initial: impl Into<Var>, looper: MessageLoop) -> Self {
    Value(Arc::new(Source {
      value: Mutex::new(initial.into()),
      listeners: Mutex::default(),
      notify_pending: AtomicBool::new(false),
      looper,
    }))
  }

  pub fn get(&self) -> Var { self.0.value.lock().clone() }

  /// Stores `value`. If it differs from the current one, listeners are
  /// notified the next time the source's message loop runs.
  pub fn set(&self, value: impl Into<Var>) {
    let value = value.into();
    {
      let mut current = self.0.value.lock();
      if *current == value {
        return;
      }
      *current = value;
    }
    if !self.0.notify_pending.swap(true, Ordering::AcqRel) {
      let source = Arc::downgrade(&self.0);
      self.0.looper.post(move || Source::notify(&source));
    }
  }

  /// `true` when both handles share one source.
  pub fn refers_to_same_source(&self, other: &Value) -> bool { Arc::ptr_eq(&self.0, &other.0) }

  pub fn add_listener(&self, listener: impl Fn(&Var) + Send + Sync + 'static) -> ListenerId {
    ListenerId(self.0.listeners.lock().add(Arc::new(listener)))
  }

  pub fn remove_listener(&self, id: ListenerId) -> bool {
    self.0.listeners.lock().remove(id.0).is_some()
  }

  pub fn listener_count(&self) -> usize { self.0.listeners.lock().len() }
}

impl Source {
  fn notify(source: &Weak<Source>) {
    let Some(source) = source.upgrade() else { return };
    source.notify_pending.store(false, Ordering::Release);
    let value = source.value.lock().clone();
    let listeners = source.listeners.lock().snapshot();
    for listener in listeners {
      listener(&value);
    }
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Value").field(&self.get()).finish()
  }
}
