use crate::{
  error::RxError,
  observable::{Observable, Payload, Subscribable},
  observer::{error_proxy_impl, Observer},
  subscriber::Subscriber,
};

struct ElementAtOp<Item> {
  source: Observable<Item>,
  index: usize,
}

impl<Item: Payload> Subscribable<Item> for ElementAtOp<Item> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let observer = ElementAtObserver { downstream: subscriber.clone(), index: self.index, seen: 0 };
    self.source.actual_subscribe(subscriber.chain(observer));
  }
}

struct ElementAtObserver<Item> {
  downstream: Subscriber<Item>,
  index: usize,
  seen: usize,
}

impl<Item: Payload> Observer<Item> for ElementAtObserver<Item> {
  fn next(&mut self, value: Item) {
    if self.seen == self.index {
      self.downstream.next(value);
      self.downstream.complete();
    }
    self.seen += 1;
  }

  error_proxy_impl!(downstream);

  fn complete(&mut self) { self.downstream.error(RxError::OutOfRange { index: self.index }) }
}

impl<Item: Payload> Observable<Item> {
  /// Emits only the item at `index`, counting from zero, then completes.
  /// Fails with [`RxError::OutOfRange`] if the source completes first.
  pub fn element_at(&self, index: usize) -> Observable<Item> {
    Observable::new(ElementAtOp { source: self.clone(), index })
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[rxvar_macro::test]
  fn picks_one_item() {
    assert_eq!(Observable::from_iter(["a", "b", "c"]).element_at(1).to_vec(), Ok(vec!["b"]));
  }

  #[rxvar_macro::test]
  fn past_the_end_is_an_error() {
    assert_eq!(
      Observable::from_iter(["a"]).element_at(3).to_vec(),
      Err(RxError::OutOfRange { index: 3 })
    );
  }
}
