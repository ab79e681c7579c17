//! # rxvar: Reactive Extensions over dynamic values
//!
//! Thread-safe Observables, Subjects and Schedulers, plus the pieces needed
//! to drive them from an application's property cells: a dynamic value
//! type, an observable [`Value`] cell and lifetime-bound subscriptions.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxvar::prelude::*;
//!
//! let evens = Observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .to_vec();
//! assert_eq!(evens, Ok(vec![0, 4, 8, 12, 16]));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Description of a producer, re-run for every subscription |
//! | [`Observer`] | Consumes `next`, `error` and `complete` notifications |
//! | [`Subscriber`] | Serializing observer handle given to producers |
//! | [`Disposable`] / [`DisposeBag`] | Cancel one subscription, or a scope of them |
//! | [`PublishSubject`] / [`BehaviorSubject`] / [`ReplaySubject`] | Multicast push points |
//! | [`SchedulerRef`] | Where `observe_on` and timers run |
//! | [`Var`] | Dynamic value carried across untyped boundaries |
//! | [`Value`] | Shared property cell with coalesced change notifications |
//! | [`Deallocated`] | Fires when its owner starts dropping |
//!
//! ## Errors are fatal unless handled
//!
//! [`Observable::subscribe`] installs no error handler: an error reaching it
//! is logged through `tracing` and panics. Chains that can fail are
//! subscribed with `subscribe_err` or `subscribe_all`.
//!
//! ## Feature Flags
//!
//! - **`stream`** (default): `into_stream` and `first`, bridging to the
//!   `futures` ecosystem
//!
//! [`Observable`]: observable::Observable
//! [`Observable::subscribe`]: observable::Observable::subscribe
//! [`Observer`]: observer::Observer
//! [`Subscriber`]: subscriber::Subscriber
//! [`Disposable`]: subscription::Disposable
//! [`DisposeBag`]: subscription::DisposeBag
//! [`PublishSubject`]: subject::PublishSubject
//! [`BehaviorSubject`]: subject::BehaviorSubject
//! [`ReplaySubject`]: subject::ReplaySubject
//! [`SchedulerRef`]: scheduler::SchedulerRef
//! [`Var`]: var::Var
//! [`Value`]: value::Value
//! [`Deallocated`]: lifetime::Deallocated

pub mod error;
pub mod lifetime;
pub mod message_loop;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;
pub mod value;
pub mod var;
