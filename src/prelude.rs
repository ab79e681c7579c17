//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Core types
pub use crate::{
  error::RxError,
  observable::{Observable, Payload, Steppable, Subscribable, ValueObservable},
  observer::{FnObserver, Notification, Observer},
  subscriber::Subscriber,
};
// Operators
#[cfg(feature = "stream")]
pub use crate::ops::ObservableStream;
pub use crate::ops::{CombineSources, TupleAppend};
// Scheduler
pub use crate::scheduler::{
  Duration, Instant, PendingTask, Scheduler, SchedulerRef, TaskHandle, TestScheduler,
};
// Subject
pub use crate::subject::{BehaviorSubject, PublishSubject, ReplaySubject, Subject, SubjectObserver};
// Subscription
pub use crate::subscription::{
  ClosureSubscription, Disposable, DisposableGuard, DisposeBag, Subscription, SubscriptionLike,
};
// Dynamic values and host integration
pub use crate::{
  lifetime::{Deallocated, ReactiveValue},
  message_loop::MessageLoop,
  value::{ListenerId, Value},
  var::{DynObject, FromVar, Var},
};
