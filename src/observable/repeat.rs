use crate::observable::{Observable, Payload};

impl<Item: Payload> Observable<Item> {
  /// Emits `item` forever. Bound it with an operator such as
  /// [`take`](Self::take); the loop ends as soon as the subscriber closes.
  pub fn repeat(item: Item) -> Self {
    Observable::create(move |s| {
      while !s.is_closed() {
        s.next(item.clone());
      }
    })
  }

  /// Emits `item` exactly `times` times, then completes.
  pub fn repeat_times(item: Item, times: usize) -> Self {
    Observable::create(move |s| {
      for _ in 0..times {
        if s.is_closed() {
          return;
        }
        s.next(item.clone());
      }
      s.complete();
    })
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxvar_macro::test]
  fn endless_repeat_is_bounded_by_take() {
    assert_eq!(Observable::repeat(8).take(9).to_vec(), Ok(vec![8; 9]));
  }

  #[rxvar_macro::test]
  fn bounded_repeat() {
    assert_eq!(Observable::repeat_times("4", 7).to_vec(), Ok(vec!["4"; 7]));
    assert_eq!(Observable::repeat_times(1, 0).to_vec(), Ok(vec![]));
  }
}
