use std::sync::Arc;

use crate::{
  observable::{Observable, Payload, Subscribable},
  observer::{complete_proxy_impl, error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct DistinctUntilChangedOp<Item, F> {
  source: Observable<Item>,
  eq: Arc<F>,
}

impl<Item, F> Subscribable<Item> for DistinctUntilChangedOp<Item, F>
where
  Item: Payload,
  F: Fn(&Item, &Item) -> bool + Send + Sync + 'static,
{
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let observer =
      DistinctUntilChangedObserver { downstream: subscriber.clone(), eq: self.eq.clone(), last: None };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct DistinctUntilChangedObserver<Item, F> {
  downstream: Subscriber<Item>,
  eq: Arc<F>,
  last: Option<Item>,
}

impl<Item, F> Observer<Item> for DistinctUntilChangedObserver<Item, F>
where
  Item: Payload,
  F: Fn(&Item, &Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if self.last.as_ref().is_some_and(|last| (self.eq)(last, &value)) {
      return;
    }
    self.last = Some(value.clone());
    self.downstream.next(value);
  }

  error_proxy_impl!(downstream);
  complete_proxy_impl!(downstream);
}

impl<Item: Payload> Observable<Item> {
  /// Drops items `eq` considers equal to the item emitted just before.
  pub fn distinct_until_changed_by<F>(&self, eq: F) -> Observable<Item>
  where
    F: Fn(&Item, &Item) -> bool + Send + Sync + 'static,
  {
    Observable::new(DistinctUntilChangedOp { source: self.clone(), eq: Arc::new(eq) })
  }
}

impl<Item: Payload + PartialEq> Observable<Item> {
  /// Drops items equal to the item emitted just before.
  pub fn distinct_until_changed(&self) -> Observable<Item> {
    self.distinct_until_changed_by(|a: &Item, b: &Item| a == b)
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxvar_macro::test]
  fn drops_consecutive_duplicates() {
    let o = Observable::from_iter([1, 1, 2, 2, 2, 1, 3, 3]).distinct_until_changed();
    assert_eq!(o.to_vec(), Ok(vec![1, 2, 1, 3]));
  }

  #[rxvar_macro::test]
  fn dynamic_numbers_compare_across_kinds() {
    let o = Observable::from_iter([Var::from(7), Var::from(7.0), Var::from("7")]).distinct_until_changed();
    assert_eq!(o.to_vec(), Ok(vec![Var::from(7), Var::from("7")]));
  }

  #[rxvar_macro::test]
  fn custom_equality() {
    let o = Observable::from_iter(["a", "A", "b", "B", "a"])
      .distinct_until_changed_by(|x: &&str, y: &&str| x.eq_ignore_ascii_case(y));
    assert_eq!(o.to_vec(), Ok(vec!["a", "b", "a"]));
  }
}
