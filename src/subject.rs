//! Subjects: observers that are also observables.
//!
//! Every subject multicasts what is pushed into it to its current
//! subscribers. The flavors differ in what a new subscriber gets first:
//!
//! | Flavor | On subscribe |
//! |--------|--------------|
//! | [`PublishSubject`] | nothing, only future items |
//! | [`BehaviorSubject`] | the latest item (seeded at construction) |
//! | [`ReplaySubject`] | the last `n` items, oldest first |
//!
//! Once a subject has completed or failed it stays that way: further pushes
//! are ignored and late subscribers receive the same terminal notification.
//! Dropping a subject handle does not complete its subscribers.

use std::{ops::Deref, sync::Arc};

use crate::{
  error::RxError,
  observable::{Observable, Payload},
  observer::Observer,
};

mod behavior_subject;
mod publish_subject;
mod replay_subject;
mod subject_core;

pub use behavior_subject::BehaviorSubject;
pub use publish_subject::PublishSubject;
pub use replay_subject::ReplaySubject;
use subject_core::{Retention, SubjectCore, SubjectSource};

/// The behavior shared by all subject flavors. Clones share one subject.
pub struct Subject<Item> {
  core: Arc<SubjectCore<Item>>,
  observable: Observable<Item>,
}

impl<Item> Clone for Subject<Item> {
  fn clone(&self) -> Self { Subject { core: self.core.clone(), observable: self.observable.clone() } }
}

impl<Item: Payload> Subject<Item> {
  fn with_retention(retention: Retention, seed: Option<Item>) -> Self {
    let core = SubjectCore::new(retention, seed);
    let observable = Observable::new(SubjectSource(core.clone()));
    Subject { core, observable }
  }

  /// Pushes `value` to every current subscriber.
  #[inline]
  pub fn next(&self, value: Item) { self.core.next(value) }

  #[inline]
  pub fn error(&self, err: RxError) { self.core.error(err) }

  #[inline]
  pub fn complete(&self) { self.core.complete() }

  /// The most recent retained item, if any. A publish subject retains
  /// nothing.
  pub fn latest_item(&self) -> Option<Item> { self.core.latest_item() }

  pub fn is_terminated(&self) -> bool { self.core.is_terminated() }

  pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }

  pub fn as_observable(&self) -> Observable<Item> { self.observable.clone() }

  /// A handle that only pushes. It keeps the subject alive.
  pub fn as_observer(&self) -> SubjectObserver<Item> { SubjectObserver(self.core.clone()) }
}

impl<Item> Deref for Subject<Item> {
  type Target = Observable<Item>;

  fn deref(&self) -> &Self::Target { &self.observable }
}

impl<Item: Payload> Observer<Item> for Subject<Item> {
  fn next(&mut self, value: Item) { self.core.next(value) }

  fn error(&mut self, err: RxError) { self.core.error(err) }

  fn complete(&mut self) { self.core.complete() }
}

/// Push-only view of a subject, see [`Subject::as_observer`].
pub struct SubjectObserver<Item>(Arc<SubjectCore<Item>>);

impl<Item> Clone for SubjectObserver<Item> {
  fn clone(&self) -> Self { SubjectObserver(self.0.clone()) }
}

impl<Item: Payload> SubjectObserver<Item> {
  pub fn next(&self, value: Item) { self.0.next(value) }

  pub fn error(&self, err: RxError) { self.0.error(err) }

  pub fn complete(&self) { self.0.complete() }
}

impl<Item: Payload> Observer<Item> for SubjectObserver<Item> {
  fn next(&mut self, value: Item) { self.0.next(value) }

  fn error(&mut self, err: RxError) { self.0.error(err) }

  fn complete(&mut self) { self.0.complete() }
}

macro_rules! subject_flavor_impl {
  ($name:ident) => {
    impl<Item> Clone for $name<Item> {
      fn clone(&self) -> Self { $name(self.0.clone()) }
    }

    impl<Item: $crate::observable::Payload> $name<Item> {
      #[inline]
      pub fn next(&self, value: Item) { self.0.next(value) }

      #[inline]
      pub fn error(&self, err: $crate::error::RxError) { self.0.error(err) }

      #[inline]
      pub fn complete(&self) { self.0.complete() }
    }

    impl<Item> std::ops::Deref for $name<Item> {
      type Target = $crate::subject::Subject<Item>;

      fn deref(&self) -> &Self::Target { &self.0 }
    }

    impl<Item: $crate::observable::Payload> $crate::observer::Observer<Item> for $name<Item> {
      fn next(&mut self, value: Item) { self.0.core.next(value) }

      fn error(&mut self, err: $crate::error::RxError) { self.0.core.error(err) }

      fn complete(&mut self) { self.0.core.complete() }
    }

    impl<Item: $crate::observable::Payload> From<$name<Item>> for $crate::subject::Subject<Item> {
      fn from(subject: $name<Item>) -> Self { subject.0 }
    }
  };
}

pub(crate) use subject_flavor_impl;
