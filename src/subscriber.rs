//! The serializing observer handed to producers.

use std::{
  cell::RefCell,
  collections::VecDeque,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use parking_lot::ReentrantMutex;

use crate::{
  error::RxError,
  observer::{Notification, Observer},
  subscription::{Subscription, SubscriptionLike},
};

/// A cloneable, thread-safe handle to one subscription's observer.
///
/// Producers and operators only ever talk to a `Subscriber`. It guarantees
/// the observer it wraps sees a well-formed sequence:
///
/// - callbacks never overlap; a notification raised from inside a callback
///   is queued and delivered after the callback returns, and calls from
///   other threads wait for the running one;
/// - nothing is delivered after the first terminal notification;
/// - nothing is delivered once the subscription is disposed.
///
/// Accepting a terminal notification closes the subscription, which tears
/// down everything upstream before the observer is told.
pub struct Subscriber<Item> {
  inner: Arc<Inner<Item>>,
}

struct Inner<Item> {
  state: ReentrantMutex<RefCell<State<Item>>>,
  flags: Arc<Flags>,
  subscription: Subscription,
}

#[derive(Default)]
struct Flags {
  stopped: AtomicBool,
  disposed: AtomicBool,
}

struct State<Item> {
  observer: Option<Box<dyn Observer<Item> + Send>>,
  queue: VecDeque<Notification<Item>>,
  draining: bool,
}

impl<Item> Clone for Subscriber<Item> {
  fn clone(&self) -> Self { Subscriber { inner: self.inner.clone() } }
}

impl<Item: Send + 'static> Subscriber<Item> {
  pub fn new(observer: impl Observer<Item> + Send + 'static) -> Self {
    let flags = Arc::new(Flags::default());
    let subscription = Subscription::new();
    let f = flags.clone();
    subscription.add_teardown(move || {
      if !f.stopped.load(Ordering::Acquire) {
        f.disposed.store(true, Ordering::Release);
      }
    });
    let state = State { observer: Some(Box::new(observer)), queue: VecDeque::new(), draining: false };
    Subscriber {
      inner: Arc::new(Inner { state: ReentrantMutex::new(RefCell::new(state)), flags, subscription }),
    }
  }

  /// Creates the subscriber of an upstream stage feeding `observer`, whose
  /// subscription is a child of this one.
  pub fn chain<U: Send + 'static>(
    &self, observer: impl Observer<U> + Send + 'static,
  ) -> Subscriber<U> {
    let upstream = Subscriber::new(observer);
    self.inner.subscription.add(upstream.subscription().clone());
    upstream
  }

  #[inline]
  pub fn next(&self, value: Item) { self.emit(Notification::Next(value)) }

  #[inline]
  pub fn error(&self, err: RxError) { self.emit(Notification::Error(err)) }

  #[inline]
  pub fn complete(&self) { self.emit(Notification::Complete) }

  /// `true` once terminated or disposed. Producers should stop emitting.
  pub fn is_closed(&self) -> bool {
    let flags = &self.inner.flags;
    flags.stopped.load(Ordering::Acquire)
      || flags.disposed.load(Ordering::Acquire)
      || self.inner.subscription.is_closed()
  }

  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.inner.subscription }

  /// Ties `teardown` to this subscription.
  #[inline]
  pub fn add<S: SubscriptionLike + Send + Sync + 'static>(&self, teardown: S) {
    self.inner.subscription.add(teardown)
  }

  pub fn emit(&self, notification: Notification<Item>) {
    if self.is_closed() {
      return;
    }
    let guard = self.inner.state.lock();
    let terminal = notification.is_terminal();
    let draining = {
      let mut state = guard.borrow_mut();
      if terminal && self.inner.flags.stopped.swap(true, Ordering::AcqRel) {
        return;
      }
      state.queue.push_back(notification);
      std::mem::replace(&mut state.draining, true)
    };
    if terminal {
      self.inner.subscription.unsubscribe();
    }
    if draining {
      return;
    }

    loop {
      let (notification, observer) = {
        let mut state = guard.borrow_mut();
        let Some(n) = state.queue.pop_front() else {
          state.draining = false;
          break;
        };
        if self.inner.flags.disposed.load(Ordering::Acquire) {
          state.queue.clear();
          state.draining = false;
          let observer = state.observer.take();
          drop(state);
          drop(observer);
          break;
        }
        (n, state.observer.take())
      };
      let Some(mut observer) = observer else { continue };
      let terminal = notification.is_terminal();
      notification.accept(&mut observer);
      if !terminal {
        guard.borrow_mut().observer = Some(observer);
      }
    }
  }
}

impl<Item: Send + 'static> Observer<Item> for Subscriber<Item> {
  #[inline]
  fn next(&mut self, value: Item) { Subscriber::next(self, value) }

  #[inline]
  fn error(&mut self, err: RxError) { Subscriber::error(self, err) }

  #[inline]
  fn complete(&mut self) { Subscriber::complete(self) }
}
