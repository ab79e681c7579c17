use std::{
  any::Any,
  fmt::{Debug, Formatter},
  mem,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use parking_lot::Mutex;
use smallvec::SmallVec;

mod dynamic;
pub use dynamic::DynamicSubscriptions;

/// Anything that can be torn down.
pub trait SubscriptionLike {
  /// Tears down the resource. Calling it more than once has no effect.
  fn unsubscribe(&self);

  fn is_closed(&self) -> bool;
}

type Teardown = Box<dyn SubscriptionLike + Send + Sync>;

/// A thread-safe, cloneable list of teardowns.
///
/// Every operator stage owns one and registers it as a child of the
/// downstream stage, so closing the last subscription of a chain closes the
/// whole chain.
#[derive(Clone, Default)]
pub struct Subscription(Arc<Inner>);

#[derive(Default)]
struct Inner {
  closed: AtomicBool,
  teardown: Mutex<SmallVec<[Teardown; 1]>>,
}

impl Subscription {
  pub fn new() -> Self { Self::default() }

  /// Registers a child. If this subscription is already closed the child is
  /// torn down immediately.
  pub fn add<S: SubscriptionLike + Send + Sync + 'static>(&self, subscription: S) {
    if self.is_same(&subscription) {
      return;
    }
    let mut teardown = self.0.teardown.lock();
    if self.is_closed() {
      drop(teardown);
      subscription.unsubscribe();
    } else {
      teardown.retain(|v| !v.is_closed());
      teardown.push(Box::new(subscription));
    }
  }

  /// Registers a closure run once on unsubscribe.
  pub fn add_teardown(&self, f: impl FnOnce() + Send + 'static) {
    self.add(ClosureSubscription::new(f))
  }

  pub fn teardown_size(&self) -> usize { self.0.teardown.lock().len() }

  fn is_same(&self, other: &dyn Any) -> bool {
    other.downcast_ref::<Self>().is_some_and(|other| Arc::ptr_eq(&self.0, &other.0))
  }
}

impl SubscriptionLike for Subscription {
  fn unsubscribe(&self) {
    if self.0.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    // Teardowns may re-enter this subscription, so they run unlocked.
    let teardown = mem::take(&mut *self.0.teardown.lock());
    tracing::trace!(count = teardown.len(), "subscription closed");
    for v in teardown {
      v.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.closed.load(Ordering::Acquire) }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("closed", &self.is_closed())
      .field("teardown_count", &self.teardown_size())
      .finish()
  }
}

/// Runs a closure once, on the first `unsubscribe`.
pub struct ClosureSubscription(Mutex<Option<Box<dyn FnOnce() + Send>>>);

impl ClosureSubscription {
  pub fn new(f: impl FnOnce() + Send + 'static) -> Self { Self(Mutex::new(Some(Box::new(f)))) }
}

impl SubscriptionLike for ClosureSubscription {
  fn unsubscribe(&self) {
    let f = self.0.lock().take();
    if let Some(f) = f {
      f();
    }
  }

  fn is_closed(&self) -> bool { self.0.lock().is_none() }
}

/// Handle to one active subscription, returned by `subscribe`.
///
/// Dropping a `Disposable` does **not** cancel the subscription. Call
/// [`dispose`](Disposable::dispose), hand it to a [`DisposeBag`], or convert
/// it with [`dispose_when_dropped`](Disposable::dispose_when_dropped).
#[derive(Clone, Debug)]
#[must_use = "dropping a Disposable keeps the subscription running"]
pub struct Disposable(Subscription);

impl Disposable {
  pub(crate) fn new(subscription: Subscription) -> Self { Disposable(subscription) }

  /// Stops the subscription. No notification is delivered after this returns,
  /// unless one is already running on another thread.
  #[inline]
  pub fn dispose(&self) { self.0.unsubscribe() }

  /// `false` once disposed or terminated.
  #[inline]
  pub fn is_subscribed(&self) -> bool { !self.0.is_closed() }

  /// Hands ownership to `bag`, which disposes it when cleared or dropped.
  pub fn disposed_by(self, bag: &DisposeBag) { bag.insert(self) }

  /// Activates RAII behavior: the subscription is disposed as soon as the
  /// returned guard goes out of scope.
  pub fn dispose_when_dropped(self) -> DisposableGuard { DisposableGuard(self) }
}

impl SubscriptionLike for Disposable {
  #[inline]
  fn unsubscribe(&self) { self.dispose() }

  #[inline]
  fn is_closed(&self) -> bool { !self.is_subscribed() }
}

/// Disposes the wrapped subscription on drop.
#[derive(Debug)]
#[must_use]
pub struct DisposableGuard(Disposable);

impl DisposableGuard {
  pub fn disposable(&self) -> &Disposable { &self.0 }
}

impl Drop for DisposableGuard {
  fn drop(&mut self) { self.0.dispose() }
}

/// Owns a set of disposables and disposes all of them, once, when cleared
/// or dropped.
#[derive(Default)]
pub struct DisposeBag(Mutex<Vec<Disposable>>);

impl DisposeBag {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&self, disposable: Disposable) {
    let mut items = self.0.lock();
    items.retain(Disposable::is_subscribed);
    items.push(disposable);
  }

  pub fn len(&self) -> usize { self.0.lock().len() }

  pub fn is_empty(&self) -> bool { self.0.lock().is_empty() }

  /// Disposes everything held so far. The bag stays usable.
  pub fn clear(&self) {
    let items = mem::take(&mut *self.0.lock());
    if !items.is_empty() {
      tracing::debug!(count = items.len(), "dispose bag cleared");
    }
    for d in items {
      d.dispose();
    }
  }
}

impl Drop for DisposeBag {
  fn drop(&mut self) { self.clear() }
}

impl Debug for DisposeBag {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DisposeBag").field("len", &self.len()).finish()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::AtomicUsize;

  use super::*;

  fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    (count, move || {
      c.fetch_add(1, Ordering::SeqCst);
    })
  }

  #[rxvar_macro::test]
  fn teardown_runs_once() {
    let subscription = Subscription::new();
    let (count, f) = counter();
    subscription.add_teardown(f);
    subscription.unsubscribe();
    subscription.unsubscribe();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(subscription.is_closed());
  }

  #[rxvar_macro::test]
  fn add_to_closed_tears_down_immediately() {
    let subscription = Subscription::new();
    subscription.unsubscribe();
    let (count, f) = counter();
    subscription.add_teardown(f);
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[rxvar_macro::test]
  fn closing_parent_closes_children() {
    let parent = Subscription::new();
    let child = Subscription::new();
    parent.add(child.clone());
    parent.add(parent.clone());
    assert_eq!(parent.teardown_size(), 1);
    parent.unsubscribe();
    assert!(child.is_closed());
  }

  #[rxvar_macro::test]
  fn closed_children_are_pruned() {
    let parent = Subscription::new();
    let child = Subscription::new();
    parent.add(child.clone());
    child.unsubscribe();
    parent.add(Subscription::new());
    assert_eq!(parent.teardown_size(), 1);
  }

  #[rxvar_macro::test]
  fn reentrant_teardown() {
    let subscription = Subscription::new();
    let s = subscription.clone();
    subscription.add_teardown(move || s.unsubscribe());
    subscription.unsubscribe();
    assert!(subscription.is_closed());
  }

  #[rxvar_macro::test]
  fn dropping_disposable_keeps_subscription() {
    let subscription = Subscription::new();
    {
      let _d = Disposable::new(subscription.clone());
    }
    assert!(!subscription.is_closed());
    {
      let _guard = Disposable::new(subscription.clone()).dispose_when_dropped();
    }
    assert!(subscription.is_closed());
  }

  #[rxvar_macro::test]
  fn dispose_bag() {
    let a = Subscription::new();
    let b = Subscription::new();
    {
      let bag = DisposeBag::new();
      Disposable::new(a.clone()).disposed_by(&bag);
      Disposable::new(b.clone()).disposed_by(&bag);
      assert_eq!(bag.len(), 2);
      b.unsubscribe();
      bag.clear();
      assert!(bag.is_empty());
      assert!(a.is_closed());

      let c = Subscription::new();
      Disposable::new(c.clone()).disposed_by(&bag);
      drop(bag);
      assert!(c.is_closed());
    }
  }
}
