//! Observer trait and implementations
//!
//! An [`Observer`] receives values, an error or a completion from an
//! observable. The trait itself does not enforce the notification grammar;
//! [`Subscriber`](crate::subscriber::Subscriber) does that for every
//! subscription.

use crate::error::RxError;

// ============================================================================
// Observer Trait
// ============================================================================

pub trait Observer<Item> {
  fn next(&mut self, value: Item);

  fn error(&mut self, err: RxError);

  fn complete(&mut self);
}

impl<Item, O: Observer<Item> + ?Sized> Observer<Item> for Box<O> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }

  #[inline]
  fn error(&mut self, err: RxError) { (**self).error(err) }

  #[inline]
  fn complete(&mut self) { (**self).complete() }
}

/// A single notification, used where notifications are queued.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification<Item> {
  Next(Item),
  Error(RxError),
  Complete,
}

impl<Item> Notification<Item> {
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }

  pub fn accept<O: Observer<Item> + ?Sized>(self, observer: &mut O) {
    match self {
      Notification::Next(v) => observer.next(v),
      Notification::Error(e) => observer.error(e),
      Notification::Complete => observer.complete(),
    }
  }
}

// ============================================================================
// Closure observers
// ============================================================================

/// Observer built from three closures.
pub struct FnObserver<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> FnObserver<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self { FnObserver { next, error, complete } }
}

impl<Item, N, E, C> Observer<Item> for FnObserver<N, E, C>
where
  N: FnMut(Item),
  E: FnMut(RxError),
  C: FnMut(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(&mut self, err: RxError) { (self.error)(err) }

  #[inline]
  fn complete(&mut self) { (self.complete)() }
}

/// The error handler used when a subscriber supplies none.
///
/// Unhandled errors are fatal: the error is logged and the thread panics.
pub fn unhandled_error(err: RxError) {
  tracing::error!(error = %err, "unhandled error in observable");
  panic!("unhandled error in observable: {err}");
}

#[inline]
pub(crate) fn noop() {}

// ============================================================================
// Proxy helpers for operator observers
// ============================================================================

/// Forwards `error` to the named downstream field.
macro_rules! error_proxy_impl {
  ($field:ident) => {
    #[inline]
    fn error(&mut self, err: $crate::error::RxError) { self.$field.error(err) }
  };
}

/// Forwards `complete` to the named downstream field.
macro_rules! complete_proxy_impl {
  ($field:ident) => {
    #[inline]
    fn complete(&mut self) { self.$field.complete() }
  };
}

pub(crate) use {complete_proxy_impl, error_proxy_impl};

#[cfg(test)]
mod tests {
  use std::panic::{catch_unwind, AssertUnwindSafe};

  use super::*;

  #[rxvar_macro::test]
  fn notification_accept() {
    let mut items = vec![];
    let mut completed = false;
    {
      let mut observer = FnObserver::new(|v| items.push(v), |_| {}, || completed = true);
      Notification::Next(1).accept(&mut observer);
      Notification::Next(2).accept(&mut observer);
      Notification::<i32>::Complete.accept(&mut observer);
    }
    assert_eq!(items, vec![1, 2]);
    assert!(completed);
    assert!(Notification::<i32>::Error(RxError::new("x")).is_terminal());
    assert!(!Notification::Next(()).is_terminal());
  }

  #[rxvar_macro::test]
  fn unhandled_error_is_fatal() {
    let result = catch_unwind(AssertUnwindSafe(|| unhandled_error(RxError::new("boom"))));
    assert!(result.is_err());
  }
}
