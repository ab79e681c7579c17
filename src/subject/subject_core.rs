use std::{
  collections::VecDeque,
  sync::{Arc, Weak},
};

use parking_lot::{Mutex, ReentrantMutex};

use crate::{
  error::RxError,
  observable::{Payload, Subscribable},
  subscriber::Subscriber,
  subscription::{ClosureSubscription, DynamicSubscriptions},
};

/// What a subject keeps for subscribers that arrive later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Retention {
  Nothing,
  Latest,
  Last(Option<usize>),
}

#[derive(Debug, Clone)]
enum Terminal {
  Completed,
  Error(RxError),
}

struct State<Item> {
  subscribers: DynamicSubscriptions<Subscriber<Item>>,
  history: VecDeque<Item>,
  terminal: Option<Terminal>,
}

/// Shared state of every subject flavor.
///
/// `state` guards the subscriber list and history and is never held while
/// calling out. `gate` serializes emissions and replays, so history order is
/// delivery order; it is reentrant so a subscriber may push into the
/// subject it listens to.
pub(crate) struct SubjectCore<Item> {
  retention: Retention,
  state: Mutex<State<Item>>,
  gate: ReentrantMutex<()>,
}

impl<Item: Payload> SubjectCore<Item> {
  pub fn new(retention: Retention, seed: Option<Item>) -> Arc<Self> {
    Arc::new(SubjectCore {
      retention,
      state: Mutex::new(State {
        subscribers: DynamicSubscriptions::new(),
        history: seed.into_iter().collect(),
        terminal: None,
      }),
      gate: ReentrantMutex::new(()),
    })
  }

  pub fn next(&self, value: Item) {
    let _gate = self.gate.lock();
    let targets = {
      let mut state = self.state.lock();
      if state.terminal.is_some() {
        return;
      }
      match self.retention {
        Retention::Nothing => {}
        Retention::Latest => {
          state.history.clear();
          state.history.push_back(value.clone());
        }
        Retention::Last(capacity) => {
          state.history.push_back(value.clone());
          if let Some(capacity) = capacity {
            while state.history.len() > capacity {
              state.history.pop_front();
            }
          }
        }
      }
      state.subscribers.snapshot()
    };
    for subscriber in targets {
      subscriber.next(value.clone());
    }
  }

  pub fn error(&self, err: RxError) { self.terminate(Terminal::Error(err)) }

  pub fn complete(&self) { self.terminate(Terminal::Completed) }

  fn terminate(&self, terminal: Terminal) {
    let _gate = self.gate.lock();
    let targets: Vec<_> = {
      let mut state = self.state.lock();
      if state.terminal.is_some() {
        return;
      }
      state.terminal = Some(terminal.clone());
      state.subscribers.drain().collect()
    };
    tracing::debug!(subscribers = targets.len(), ?terminal, "subject terminated");
    for subscriber in targets {
      deliver(&subscriber, &terminal);
    }
  }

  pub fn latest_item(&self) -> Option<Item> { self.state.lock().history.back().cloned() }

  pub fn is_terminated(&self) -> bool { self.state.lock().terminal.is_some() }

  pub fn subscriber_count(&self) -> usize { self.state.lock().subscribers.len() }

  fn subscribe(self: &Arc<Self>, subscriber: Subscriber<Item>) {
    let _gate = self.gate.lock();
    let (replay, terminal, id) = {
      let mut state = self.state.lock();
      let replay: Vec<Item> = match (self.retention, &state.terminal) {
        (Retention::Nothing, _) => vec![],
        // An ended behavior subject only reports how it ended.
        (Retention::Latest, Some(_)) => vec![],
        _ => state.history.iter().cloned().collect(),
      };
      let terminal = state.terminal.clone();
      let id = terminal.is_none().then(|| state.subscribers.add(subscriber.clone()));
      (replay, terminal, id)
    };
    if let Some(id) = id {
      let core = Arc::downgrade(self);
      subscriber.add(ClosureSubscription::new(move || remove(&core, id)));
    }
    for v in replay {
      subscriber.next(v);
    }
    if let Some(terminal) = terminal {
      deliver(&subscriber, &terminal);
    }
  }
}

fn remove<Item>(core: &Weak<SubjectCore<Item>>, id: usize) {
  if let Some(core) = core.upgrade() {
    let removed = core.state.lock().subscribers.remove(id);
    drop(removed);
  }
}

fn deliver<Item: Payload>(subscriber: &Subscriber<Item>, terminal: &Terminal) {
  match terminal {
    Terminal::Completed => subscriber.complete(),
    Terminal::Error(err) => subscriber.error(err.clone()),
  }
}

/// The subscribe side of a subject, as seen by its `Observable`.
pub(crate) struct SubjectSource<Item>(pub Arc<SubjectCore<Item>>);

impl<Item: Payload> Subscribable<Item> for SubjectSource<Item> {
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) { self.0.subscribe(subscriber) }
}
