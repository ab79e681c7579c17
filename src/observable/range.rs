use std::{cmp::Ordering, fmt::Debug};

use crate::{
  error::RxError,
  observable::{Observable, Payload},
};

/// Numeric types usable with [`Observable::range`].
pub trait Steppable: Payload + PartialOrd + Debug {
  const ZERO: Self;
  const ONE: Self;

  /// `self + step`, or `None` once that overflows or no longer moves
  /// forward.
  fn checked_step(&self, step: &Self) -> Option<Self>;
}

macro_rules! impl_steppable_int {
  ($($t:ty),*) => {
    $(impl Steppable for $t {
      const ZERO: Self = 0;
      const ONE: Self = 1;

      #[inline]
      fn checked_step(&self, step: &Self) -> Option<Self> {
        self.checked_add(*step).filter(|next| next > self)
      }
    })*
  };
}

macro_rules! impl_steppable_float {
  ($($t:ty),*) => {
    $(impl Steppable for $t {
      const ZERO: Self = 0.0;
      const ONE: Self = 1.0;

      #[inline]
      fn checked_step(&self, step: &Self) -> Option<Self> {
        let next = self + step;
        (next > *self && next.is_finite()).then_some(next)
      }
    })*
  };
}

impl_steppable_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_steppable_float!(f32, f64);

impl<Item: Steppable> Observable<Item> {
  /// Emits `first, first + 1, ...` up to and including `last`.
  pub fn range(first: Item, last: Item) -> Result<Self, RxError> {
    Observable::range_step(first, last, Item::ONE)
  }

  /// Emits `first, first + step, ...` while below `last`, then `last`
  /// itself, even when it isn't a whole number of steps away:
  /// `range_step(17.5, 22.8, 2.0)` gives `17.5, 19.5, 21.5, 22.8`.
  /// Stepping stops early, still ending with `last`, when the next value
  /// would overflow the type or lose precision.
  ///
  /// Fails with [`RxError::InvalidRange`] when `first > last`, or when
  /// `step` isn't positive.
  pub fn range_step(first: Item, last: Item, step: Item) -> Result<Self, RxError> {
    if first > last || step.partial_cmp(&Item::ZERO) != Some(Ordering::Greater) {
      return Err(RxError::invalid_range(first, last));
    }
    Ok(Observable::create(move |s| {
      let mut v = first.clone();
      while v < last {
        if s.is_closed() {
          return;
        }
        s.next(v.clone());
        match v.checked_step(&step) {
          Some(next) => v = next,
          None => break,
        }
      }
      s.next(last.clone());
      s.complete();
    }))
  }
}
