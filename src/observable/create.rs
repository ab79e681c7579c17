use crate::{
  error::RxError,
  observable::{Observable, Payload, Subscribable},
  subscriber::Subscriber,
};

struct Create<F>(F);

impl<Item, F> Subscribable<Item> for Create<F>
where
  F: Fn(Subscriber<Item>) + Send + Sync,
{
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) { (self.0)(subscriber) }
}

struct Defer<F>(F);

impl<Item, F> Subscribable<Item> for Defer<F>
where
  Item: Payload,
  F: Fn() -> Observable<Item> + Send + Sync,
{
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    (self.0)().actual_subscribe(subscriber)
  }
}

impl<Item: Payload> Observable<Item> {
  /// Creates an observable from a subscribe function, called once per
  /// subscription.
  ///
  /// The function may emit synchronously, or keep the subscriber and emit
  /// later from anywhere.
  pub fn create<F>(on_subscribe: F) -> Self
  where
    F: Fn(Subscriber<Item>) + Send + Sync + 'static,
  {
    Observable::new(Create(on_subscribe))
  }

  /// Like [`create`](Self::create), but a failing subscribe function sends
  /// its error to the subscriber.
  pub fn try_create<F, E>(on_subscribe: F) -> Self
  where
    F: Fn(&Subscriber<Item>) -> Result<(), E> + Send + Sync + 'static,
    E: Into<RxError>,
  {
    Observable::create(move |subscriber| {
      if let Err(err) = on_subscribe(&subscriber) {
        subscriber.error(err.into());
      }
    })
  }

  /// Calls `factory` for every subscription and subscribes to the result.
  pub fn defer<F>(factory: F) -> Self
  where
    F: Fn() -> Observable<Item> + Send + Sync + 'static,
  {
    Observable::new(Defer(factory))
  }
}
