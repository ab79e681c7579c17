use std::sync::Arc;

use crate::{
  observable::{Observable, Payload, Subscribable},
  observer::{complete_proxy_impl, error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct ScanOp<Item, Acc, F> {
  source: Observable<Item>,
  seed: Acc,
  func: Arc<F>,
}

impl<Item, Acc, F> Subscribable<Acc> for ScanOp<Item, Acc, F>
where
  Item: Payload,
  Acc: Payload,
  F: Fn(Acc, Item) -> Acc + Send + Sync + 'static,
{
  fn actual_subscribe(&self, subscriber: Subscriber<Acc>) {
    let observer =
      ScanObserver { downstream: subscriber.clone(), acc: self.seed.clone(), func: self.func.clone() };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct ScanObserver<Acc, F> {
  downstream: Subscriber<Acc>,
  acc: Acc,
  func: Arc<F>,
}

impl<Item, Acc, F> Observer<Item> for ScanObserver<Acc, F>
where
  Acc: Payload,
  F: Fn(Acc, Item) -> Acc,
{
  fn next(&mut self, value: Item) {
    self.acc = (self.func)(self.acc.clone(), value);
    self.downstream.next(self.acc.clone());
  }

  error_proxy_impl!(downstream);
  complete_proxy_impl!(downstream);
}

struct ReduceOp<Item, Acc, F> {
  source: Observable<Item>,
  seed: Acc,
  func: Arc<F>,
}

impl<Item, Acc, F> Subscribable<Acc> for ReduceOp<Item, Acc, F>
where
  Item: Payload,
  Acc: Payload,
  F: Fn(Acc, Item) -> Acc + Send + Sync + 'static,
{
  fn actual_subscribe(&self, subscriber: Subscriber<Acc>) {
    let observer =
      ReduceObserver { downstream: subscriber.clone(), acc: Some(self.seed.clone()), func: self.func.clone() };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct ReduceObserver<Acc, F> {
  downstream: Subscriber<Acc>,
  acc: Option<Acc>,
  func: Arc<F>,
}

impl<Item, Acc, F> Observer<Item> for ReduceObserver<Acc, F>
where
  Acc: Payload,
  F: Fn(Acc, Item) -> Acc,
{
  fn next(&mut self, value: Item) {
    if let Some(acc) = self.acc.take() {
      self.acc = Some((self.func)(acc, value));
    }
  }

  error_proxy_impl!(downstream);

  fn complete(&mut self) {
    if let Some(acc) = self.acc.take() {
      self.downstream.next(acc);
    }
    self.downstream.complete();
  }
}

impl<Item: Payload> Observable<Item> {
  /// Emits the running accumulation `f(acc, item)` for every item,
  /// starting from `seed`. The seed itself is never emitted.
  pub fn scan<Acc, F>(&self, seed: Acc, f: F) -> Observable<Acc>
  where
    Acc: Payload,
    F: Fn(Acc, Item) -> Acc + Send + Sync + 'static,
  {
    Observable::new(ScanOp { source: self.clone(), seed, func: Arc::new(f) })
  }

  /// Like [`scan`](Self::scan), but emits only the final accumulation,
  /// once the source completes. An empty source yields `seed`.
  pub fn reduce<Acc, F>(&self, seed: Acc, f: F) -> Observable<Acc>
  where
    Acc: Payload,
    F: Fn(Acc, Item) -> Acc + Send + Sync + 'static,
  {
    Observable::new(ReduceOp { source: self.clone(), seed, func: Arc::new(f) })
  }
}

#[cfg(test)]
mod tests {
  use float_cmp::approx_eq;

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn scan_emits_running_totals() {
    let o = Observable::from_iter([1, 2, 3, 4, 5]).scan(10, |acc, v| acc + v);
    assert_eq!(o.to_vec(), Ok(vec![11, 13, 16, 20, 25]));
  }

  #[rxvar_macro::test]
  fn scan_restarts_per_subscription() {
    let o = Observable::from_iter(["a", "b"]).scan(String::new(), |acc, v| acc + v);
    assert_eq!(o.to_vec(), Ok(vec!["a".to_string(), "ab".to_string()]));
    assert_eq!(o.to_vec(), Ok(vec!["a".to_string(), "ab".to_string()]));
  }

  #[rxvar_macro::test]
  fn reduce_emits_once() -> Result<(), RxError> {
    let sum = Observable::range_step(0.5, 2.0, 0.5)?.reduce(0.0, |acc, v| acc + v).to_vec()?;
    assert_eq!(sum.len(), 1);
    assert!(approx_eq!(f64, sum[0], 5.0, ulps = 2));
    Ok(())
  }

  #[rxvar_macro::test]
  fn reduce_of_nothing_is_the_seed() {
    assert_eq!(Observable::<i32>::empty().reduce(7, |a, v| a + v).to_vec(), Ok(vec![7]));
  }
}
