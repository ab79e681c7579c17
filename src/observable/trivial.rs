use crate::{
  error::RxError,
  observable::{Observable, Payload},
};

impl<Item: Payload> Observable<Item> {
  /// Completes immediately without emitting.
  pub fn empty() -> Self { Observable::create(|s| s.complete()) }

  /// Fails immediately with `err`.
  pub fn error(err: impl Into<RxError>) -> Self {
    let err = err.into();
    Observable::create(move |s| s.error(err.clone()))
  }

  /// Emits nothing and never terminates.
  pub fn never() -> Self { Observable::create(|_| {}) }

  /// Emits `value` then completes.
  pub fn just(value: Item) -> Self {
    Observable::create(move |s| {
      s.next(value.clone());
      s.complete();
    })
  }
}
