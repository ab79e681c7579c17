//! Bridges observables into `futures` streams.
//!
//! ```rust
//! use futures::{executor::block_on, StreamExt};
//! use rxvar::prelude::*;
//!
//! let items: Vec<_> = block_on(Observable::from_iter(1..=3).into_stream().collect());
//! assert_eq!(items, vec![Ok(1), Ok(2), Ok(3)]);
//! ```

use std::{
  future::Future,
  pin::Pin,
  sync::Arc,
  task::{Context, Poll},
};

use futures::{
  channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender},
  Stream, StreamExt,
};
use parking_lot::Mutex;

use crate::{
  error::RxError,
  observable::{Observable, Payload},
  observer::Observer,
  subscription::DisposableGuard,
};

/// A [`Stream`] of the items of an observable, ending after its
/// completion or its error. Dropping the stream disposes the subscription.
pub struct ObservableStream<Item> {
  receiver: UnboundedReceiver<Result<Item, RxError>>,
  _subscription: DisposableGuard,
}

impl<Item> Stream for ObservableStream<Item> {
  type Item = Result<Item, RxError>;

  fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    self.receiver.poll_next_unpin(cx)
  }
}

struct ChannelObserver<Item> {
  sender: Arc<Mutex<Option<UnboundedSender<Result<Item, RxError>>>>>,
}

impl<Item> ChannelObserver<Item> {
  fn send(&self, value: Result<Item, RxError>) {
    if let Some(sender) = self.sender.lock().as_ref() {
      // A closed receiver means the stream was dropped.
      let _ = sender.unbounded_send(value);
    }
  }

  fn close(&self) { self.sender.lock().take(); }
}

impl<Item> Observer<Item> for ChannelObserver<Item> {
  fn next(&mut self, value: Item) { self.send(Ok(value)) }

  fn error(&mut self, err: RxError) {
    self.send(Err(err));
    self.close();
  }

  fn complete(&mut self) { self.close() }
}

impl<Item: Payload> Observable<Item> {
  /// Subscribes and returns the items as a [`Stream`].
  pub fn into_stream(&self) -> ObservableStream<Item> {
    let (sender, receiver) = unbounded();
    let observer = ChannelObserver { sender: Arc::new(Mutex::new(Some(sender))) };
    let subscription = self.subscribe_observer(observer).dispose_when_dropped();
    ObservableStream { receiver, _subscription: subscription }
  }

  /// Resolves to the first item, or fails with [`RxError::OutOfRange`] if
  /// the observable completes empty.
  pub fn first(&self) -> impl Future<Output = Result<Item, RxError>> + Send {
    let mut stream = self.element_at(0).into_stream();
    async move { stream.next().await.unwrap_or(Err(RxError::OutOfRange { index: 0 })) }
  }
}
