use std::sync::Arc;

use crate::{
  error::RxError,
  observable::{Observable, Payload, Subscribable},
  observer::{complete_proxy_impl, error_proxy_impl, Observer},
  subscriber::Subscriber,
  var::{FromVar, Var},
};

struct MapOp<S, F> {
  source: Observable<S>,
  func: Arc<F>,
}

impl<S, B, F> Subscribable<B> for MapOp<S, F>
where
  S: Payload,
  B: Payload,
  F: Fn(S) -> B + Send + Sync + 'static,
{
  fn actual_subscribe(&self, subscriber: Subscriber<B>) {
    let observer = MapObserver { downstream: subscriber.clone(), func: self.func.clone() };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct MapObserver<B, F> {
  downstream: Subscriber<B>,
  func: Arc<F>,
}

impl<S, B, F> Observer<S> for MapObserver<B, F>
where
  B: Payload,
  F: Fn(S) -> B,
{
  fn next(&mut self, value: S) { self.downstream.next((self.func)(value)) }

  error_proxy_impl!(downstream);
  complete_proxy_impl!(downstream);
}

struct TryMapOp<S, F> {
  source: Observable<S>,
  func: Arc<F>,
}

impl<S, B, E, F> Subscribable<B> for TryMapOp<S, F>
where
  S: Payload,
  B: Payload,
  E: Into<RxError>,
  F: Fn(S) -> Result<B, E> + Send + Sync + 'static,
{
  fn actual_subscribe(&self, subscriber: Subscriber<B>) {
    let observer = TryMapObserver { downstream: subscriber.clone(), func: self.func.clone() };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct TryMapObserver<B, F> {
  downstream: Subscriber<B>,
  func: Arc<F>,
}

impl<S, B, E, F> Observer<S> for TryMapObserver<B, F>
where
  B: Payload,
  E: Into<RxError>,
  F: Fn(S) -> Result<B, E>,
{
  fn next(&mut self, value: S) {
    match (self.func)(value) {
      Ok(v) => self.downstream.next(v),
      Err(e) => self.downstream.error(e.into()),
    }
  }

  error_proxy_impl!(downstream);
  complete_proxy_impl!(downstream);
}

impl<Item: Payload> Observable<Item> {
  /// Transforms every item with `f`.
  pub fn map<B, F>(&self, f: F) -> Observable<B>
  where
    B: Payload,
    F: Fn(Item) -> B + Send + Sync + 'static,
  {
    Observable::new(MapOp { source: self.clone(), func: Arc::new(f) })
  }

  /// Transforms every item with a fallible `f`. The first failure is sent
  /// to `on_error` in place of the item.
  pub fn try_map<B, E, F>(&self, f: F) -> Observable<B>
  where
    B: Payload,
    E: Into<RxError>,
    F: Fn(Item) -> Result<B, E> + Send + Sync + 'static,
  {
    Observable::new(TryMapOp { source: self.clone(), func: Arc::new(f) })
  }
}

impl<Item: Payload + Into<Var>> Observable<Item> {
  /// Wraps every item in a [`Var`].
  pub fn into_dynamic(&self) -> Observable<Var> { self.map(Into::into) }
}

impl Observable<Var> {
  /// Converts every item to `T`; a value that doesn't convert fails the
  /// stream with [`RxError::Conversion`].
  pub fn typed<T: FromVar + Payload>(&self) -> Observable<T> { self.try_map(|v: Var| v.get::<T>()) }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[rxvar_macro::test]
  fn map_transforms_items() {
    let o = Observable::from_iter([1, 2, 3]).map(|v| v * 10);
    assert_eq!(o.to_vec(), Ok(vec![10, 20, 30]));
  }

  #[rxvar_macro::test]
  fn map_changes_item_type() {
    let o = Observable::from_iter(["hello", "rx"]).map(|s| format!("{}!", s.to_uppercase()));
    assert_eq!(o.to_vec(), Ok(vec!["HELLO!".to_string(), "RX!".to_string()]));
  }

  #[rxvar_macro::test]
  fn try_map_stops_at_first_failure() {
    let items = Arc::new(Mutex::new(vec![]));
    let errors = Arc::new(Mutex::new(vec![]));
    let (i, e) = (items.clone(), errors.clone());
    let _d = Observable::from_iter(["1", "2", "x", "4"])
      .try_map(|s| s.parse::<i32>().map_err(|err| RxError::with_cause("not a number", err)))
      .subscribe_err(move |v| i.lock().push(v), move |err| e.lock().push(err.to_string()));
    assert_eq!(*items.lock(), vec![1, 2]);
    assert_eq!(*errors.lock(), vec!["not a number"]);
  }

  #[rxvar_macro::test]
  fn dynamic_round_trip() {
    let o = Observable::from_iter([1i64, 2, 3]).into_dynamic().typed::<i64>();
    assert_eq!(o.to_vec(), Ok(vec![1, 2, 3]));
  }

  #[rxvar_macro::test]
  fn typed_reports_conversion_failures() {
    let o = Observable::from_iter([Var::from(1), Var::from("one")]).typed::<i64>();
    assert!(matches!(o.to_vec(), Err(RxError::Conversion { to: "i64", .. })));
  }
}
