//! Argument types of the multi-source operators.
//!
//! [`combine_latest`], [`with_latest_from`] and [`zip`] accept either one
//! observable or a tuple of up to seven. The result items are flat tuples,
//! the receiver's item first:
//!
//! ```rust
//! use rxvar::prelude::*;
//!
//! let sums = Observable::just(1)
//!   .combine_latest((Observable::just(2), Observable::just(3)))
//!   .map(|(a, b, c)| a + b + c);
//! assert_eq!(sums.to_vec(), Ok(vec![6]));
//! ```
//!
//! [`combine_latest`]: Observable::combine_latest
//! [`with_latest_from`]: Observable::with_latest_from
//! [`zip`]: Observable::zip

use super::{combine_latest::combine_latest_pair, with_latest_from::with_latest_from_pair, zip::zip_pair};
use crate::observable::{Observable, Payload};

/// One observable, or a tuple of observables, to combine with an
/// `Observable<A>`.
pub trait CombineSources<A: Payload> {
  /// The combined item: `(A, B, ...)`.
  type Item: Payload;

  fn combine_latest_into(self, source: &Observable<A>) -> Observable<Self::Item>;

  fn with_latest_from_into(self, source: &Observable<A>) -> Observable<Self::Item>;

  fn zip_into(self, source: &Observable<A>) -> Observable<Self::Item>;
}

/// Appends one element to a tuple.
pub trait TupleAppend<Z> {
  type Output;

  fn append(self, z: Z) -> Self::Output;
}

macro_rules! impl_tuple_append {
  ($($T:ident),+) => {
    impl<$($T,)+ Z> TupleAppend<Z> for ($($T,)+) {
      type Output = ($($T,)+ Z);

      #[allow(non_snake_case)]
      fn append(self, z: Z) -> Self::Output {
        let ($($T,)+) = self;
        ($($T,)+ z)
      }
    }
  };
}

impl_tuple_append!(A);
impl_tuple_append!(A, B);
impl_tuple_append!(A, B, C);
impl_tuple_append!(A, B, C, D);
impl_tuple_append!(A, B, C, D, E);
impl_tuple_append!(A, B, C, D, E, F);
impl_tuple_append!(A, B, C, D, E, F, G);

impl<A: Payload, B: Payload> CombineSources<A> for Observable<B> {
  type Item = (A, B);

  fn combine_latest_into(self, source: &Observable<A>) -> Observable<(A, B)> {
    combine_latest_pair(source, &self)
  }

  fn with_latest_from_into(self, source: &Observable<A>) -> Observable<(A, B)> {
    with_latest_from_pair(source, &self)
  }

  fn zip_into(self, source: &Observable<A>) -> Observable<(A, B)> { zip_pair(source, &self) }
}

// Tuples fold pairwise: `((a,), b)` becomes `(a, b)`, then `((a, b), c)`
// becomes `(a, b, c)` and so on.
macro_rules! impl_combine_sources {
  (@fold $pair:ident, $self:ident, $source:ident, $($idx:tt),+) => {{
    let acc = $source.map(|a| (a,));
    $(let acc = $pair(&acc, &$self.$idx).map(|(t, v)| TupleAppend::append(t, v));)+
    acc
  }};
  ($($T:ident $idx:tt),+) => {
    impl<A: Payload, $($T: Payload),+> CombineSources<A> for ($(Observable<$T>,)+) {
      type Item = (A, $($T),+);

      fn combine_latest_into(self, source: &Observable<A>) -> Observable<Self::Item> {
        impl_combine_sources!(@fold combine_latest_pair, self, source, $($idx),+)
      }

      fn with_latest_from_into(self, source: &Observable<A>) -> Observable<Self::Item> {
        impl_combine_sources!(@fold with_latest_from_pair, self, source, $($idx),+)
      }

      fn zip_into(self, source: &Observable<A>) -> Observable<Self::Item> {
        impl_combine_sources!(@fold zip_pair, self, source, $($idx),+)
      }
    }
  };
}

impl_combine_sources!(B 0);
impl_combine_sources!(B 0, C 1);
impl_combine_sources!(B 0, C 1, D 2);
impl_combine_sources!(B 0, C 1, D 2, E 3);
impl_combine_sources!(B 0, C 1, D 2, E 3, F 4);
impl_combine_sources!(B 0, C 1, D 2, E 3, F 4, G 5);
impl_combine_sources!(B 0, C 1, D 2, E 3, F 4, G 5, H 6);

impl<Item: Payload> Observable<Item> {
  /// Emits a tuple of the latest items of this observable and `others`
  /// whenever any of them emits, once each has emitted at least once.
  ///
  /// Completes when every source has completed, or as soon as one
  /// completes without having emitted. Any error fails the result.
  pub fn combine_latest<S: CombineSources<Item>>(&self, others: S) -> Observable<S::Item> {
    others.combine_latest_into(self)
  }

  /// [`combine_latest`](Self::combine_latest), mapped through `f`.
  pub fn combine_latest_with<S, B, F>(&self, others: S, f: F) -> Observable<B>
  where
    S: CombineSources<Item>,
    B: Payload,
    F: Fn(S::Item) -> B + Send + Sync + 'static,
  {
    self.combine_latest(others).map(f)
  }

  /// Emits, for every item of this observable, a tuple with the latest item
  /// of each of `others`. Items arriving before every other source has
  /// emitted are dropped.
  pub fn with_latest_from<S: CombineSources<Item>>(&self, others: S) -> Observable<S::Item> {
    others.with_latest_from_into(self)
  }

  /// [`with_latest_from`](Self::with_latest_from), mapped through `f`.
  pub fn with_latest_from_with<S, B, F>(&self, others: S, f: F) -> Observable<B>
  where
    S: CombineSources<Item>,
    B: Payload,
    F: Fn(S::Item) -> B + Send + Sync + 'static,
  {
    self.with_latest_from(others).map(f)
  }

  /// Pairs the n-th items of this observable and `others`. Completes once
  /// a completed source has no buffered items left to pair.
  pub fn zip<S: CombineSources<Item>>(&self, others: S) -> Observable<S::Item> { others.zip_into(self) }

  /// [`zip`](Self::zip), mapped through `f`.
  pub fn zip_with<S, B, F>(&self, others: S, f: F) -> Observable<B>
  where
    S: CombineSources<Item>,
    B: Payload,
    F: Fn(S::Item) -> B + Send + Sync + 'static,
  {
    self.zip(others).map(f)
  }
}
