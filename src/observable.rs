//! The [`Observable`] type and its creation functions.
//!
//! An `Observable<Item>` is an immutable, cloneable description of a
//! producer. Every subscription runs the producer again from scratch;
//! cloning or dropping the handle never affects running subscriptions.
//!
//! ```rust
//! use rxvar::prelude::*;
//!
//! let result = Observable::from_iter(1..=5)
//!   .scan(10, |acc, v| acc + v)
//!   .to_vec();
//! assert_eq!(result, Ok(vec![11, 13, 16, 20, 25]));
//! ```

use std::{fmt, sync::Arc};

use parking_lot::{Condvar, Mutex};

use crate::{
  error::RxError,
  observer::{noop, unhandled_error, FnObserver, Observer},
  subscriber::Subscriber,
  subscription::Disposable,
};

mod create;
mod from_iter;
mod from_value;
mod interval;
mod range;
mod repeat;
mod trivial;

pub use from_value::ValueObservable;
pub use range::Steppable;

/// Items carried by an observable.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Payload for T {}

/// The producer behind an [`Observable`].
///
/// Implementations must deliver everything through `subscriber`, and should
/// stop producing once [`Subscriber::is_closed`] reports `true`.
pub trait Subscribable<Item>: Send + Sync {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>);
}

pub struct Observable<Item> {
  source: Arc<dyn Subscribable<Item>>,
}

impl<Item> Clone for Observable<Item> {
  fn clone(&self) -> Self { Observable { source: self.source.clone() } }
}

/// Observables compare by identity: two handles are equal when they were
/// cloned from the same description.
impl<Item> PartialEq for Observable<Item> {
  fn eq(&self, other: &Self) -> bool {
    Arc::as_ptr(&self.source) as *const () == Arc::as_ptr(&other.source) as *const ()
  }
}

impl<Item> fmt::Debug for Observable<Item> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Observable")
      .field("item", &std::any::type_name::<Item>())
      .field("source", &Arc::as_ptr(&self.source))
      .finish()
  }
}

impl<Item: Payload> Observable<Item> {
  pub fn new(source: impl Subscribable<Item> + 'static) -> Self {
    Observable { source: Arc::new(source) }
  }

  /// Subscribes `subscriber` to the producer.
  pub fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    if !subscriber.is_closed() {
      self.source.actual_subscribe(subscriber)
    }
  }

  /// Subscribes with an item handler only.
  ///
  /// Errors are fatal on this path: an error reaching the subscriber is
  /// logged and then panics the emitting thread. Use
  /// [`subscribe_err`](Self::subscribe_err) for chains that can fail.
  pub fn subscribe<N>(&self, on_next: N) -> Disposable
  where
    N: FnMut(Item) + Send + 'static,
  {
    self.subscribe_observer(FnObserver::new(on_next, unhandled_error, noop))
  }

  pub fn subscribe_err<N, E>(&self, on_next: N, on_error: E) -> Disposable
  where
    N: FnMut(Item) + Send + 'static,
    E: FnMut(RxError) + Send + 'static,
  {
    self.subscribe_observer(FnObserver::new(on_next, on_error, noop))
  }

  pub fn subscribe_all<N, E, C>(&self, on_next: N, on_error: E, on_complete: C) -> Disposable
  where
    N: FnMut(Item) + Send + 'static,
    E: FnMut(RxError) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    self.subscribe_observer(FnObserver::new(on_next, on_error, on_complete))
  }

  pub fn subscribe_observer(&self, observer: impl Observer<Item> + Send + 'static) -> Disposable {
    let subscriber = Subscriber::new(observer);
    let disposable = Disposable::new(subscriber.subscription().clone());
    self.actual_subscribe(subscriber);
    disposable
  }

  /// Blocks the calling thread until the observable terminates and returns
  /// every item, or the error.
  ///
  /// # Deadlock
  ///
  /// If completion depends on work scheduled onto the calling thread (for
  /// example through [`SchedulerRef::message_thread`] of this thread's
  /// [`MessageLoop`]), this never returns.
  ///
  /// [`SchedulerRef::message_thread`]: crate::scheduler::SchedulerRef::message_thread
  /// [`MessageLoop`]: crate::message_loop::MessageLoop
  pub fn to_vec(&self) -> Result<Vec<Item>, RxError> {
    type Slot<T> = (Mutex<Option<Result<Vec<T>, RxError>>>, Condvar);
    let slot: Arc<Slot<Item>> = Arc::new((Mutex::new(None), Condvar::new()));
    let items = Arc::new(Mutex::new(Vec::new()));

    let finish = {
      let slot = slot.clone();
      move |result| {
        *slot.0.lock() = Some(result);
        slot.1.notify_all();
      }
    };
    let on_error = {
      let finish = finish.clone();
      move |err| finish(Err(err))
    };
    let on_complete = {
      let items = items.clone();
      move || finish(Ok(std::mem::take(&mut *items.lock())))
    };
    let _subscription = self.subscribe_all(move |v| items.lock().push(v), on_error, on_complete);

    let mut result = slot.0.lock();
    loop {
      if let Some(result) = result.take() {
        return result;
      }
      slot.1.wait(&mut result);
    }
  }
}
