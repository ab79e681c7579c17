//! Error type carried by `on_error` notifications.
//!
//! [`RxError`] is the single error type of the crate. Producer failures,
//! usage errors and conversion failures all travel as an `RxError`; it is
//! cheap to clone because every observer of a multicast stream receives its
//! own copy.

use std::{error::Error as StdError, fmt, sync::Arc};

use thiserror::Error;

/// Shared, type-erased cause of an [`RxError`].
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Clone, Error)]
pub enum RxError {
  /// A failure raised by a producer or an operator transform.
  #[error("{message}")]
  Producer {
    message: String,
    #[source]
    cause: Option<Cause>,
  },

  /// `range` was asked for a descending interval.
  #[error("Invalid range: first ({first}) is greater than last ({last})")]
  InvalidRange { first: String, last: String },

  /// `switch_on_next` received an item that does not wrap an observable.
  #[error("Can't switch to an item that is not an Observable: {found}")]
  NotAnObservable { found: String },

  /// A dynamic value could not be converted to the requested type.
  #[error("Can't convert {from} to {to}")]
  Conversion { from: String, to: &'static str },

  /// `element_at` ran past the end of the source.
  #[error("Index {index} is out of range")]
  OutOfRange { index: usize },
}

impl RxError {
  /// A producer error carrying only a message.
  pub fn new(message: impl Into<String>) -> Self {
    RxError::Producer { message: message.into(), cause: None }
  }

  /// A producer error wrapping an original cause.
  pub fn with_cause<E>(message: impl Into<String>, cause: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    RxError::Producer { message: message.into(), cause: Some(Arc::new(cause)) }
  }

  pub(crate) fn invalid_range(first: impl fmt::Debug, last: impl fmt::Debug) -> Self {
    RxError::InvalidRange { first: format!("{first:?}"), last: format!("{last:?}") }
  }

  /// Human readable message, without the cause chain.
  pub fn message(&self) -> String {
    match self {
      RxError::Producer { message, .. } => message.clone(),
      other => other.to_string(),
    }
  }

  /// The original cause, if the error wraps one.
  pub fn cause(&self) -> Option<&Cause> {
    match self {
      RxError::Producer { cause, .. } => cause.as_ref(),
      _ => None,
    }
  }
}

impl From<&str> for RxError {
  fn from(message: &str) -> Self { RxError::new(message) }
}

impl From<String> for RxError {
  fn from(message: String) -> Self { RxError::new(message) }
}

impl From<std::io::Error> for RxError {
  fn from(err: std::io::Error) -> Self { RxError::with_cause(err.to_string(), err) }
}

impl PartialEq for RxError {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (RxError::Producer { message: a, .. }, RxError::Producer { message: b, .. }) => a == b,
      (
        RxError::InvalidRange { first: f1, last: l1 },
        RxError::InvalidRange { first: f2, last: l2 },
      ) => f1 == f2 && l1 == l2,
      (RxError::NotAnObservable { found: a }, RxError::NotAnObservable { found: b }) => a == b,
      (RxError::Conversion { from: f1, to: t1 }, RxError::Conversion { from: f2, to: t2 }) => {
        f1 == f2 && t1 == t2
      }
      (RxError::OutOfRange { index: a }, RxError::OutOfRange { index: b }) => a == b,
      _ => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxvar_macro::test]
  fn message_and_cause() {
    let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
    let err = RxError::with_cause("save failed", io);
    assert_eq!(err.message(), "save failed");
    assert_eq!(err.to_string(), "save failed");
    assert_eq!(err.cause().map(|c| c.to_string()), Some("disk gone".to_string()));
    assert!(err.source().is_some());
  }

  #[rxvar_macro::test]
  fn invalid_range_message() {
    let err = RxError::invalid_range(10, 9);
    assert_eq!(err.to_string(), "Invalid range: first (10) is greater than last (9)");
  }

  #[rxvar_macro::test]
  fn equality_ignores_cause() {
    let a = RxError::new("boom");
    let b = RxError::with_cause("boom", std::io::Error::new(std::io::ErrorKind::Other, "x"));
    assert_eq!(a, b);
    assert_ne!(a, RxError::OutOfRange { index: 0 });
    assert_eq!(RxError::from("boom"), a);
  }
}
