use std::sync::{Arc, Mutex};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{Publisher, SharedSubscription, SubscriptionLike},
};

type SharedPublishers<Item, Err> =
  Arc<Mutex<Vec<Box<dyn Publisher<Item, Err> + Send>>>>;

/// Thread-safe publish subject: both an observable and an observer.
///
/// Cloning shares the subscriber set, so any clone can be handed to a
/// producer thread while others are subscribed to. Broadcast clones the
/// value per subscriber; a terminal signal drains the subscriber set.
pub struct Subject<Item, Err> {
  observers: SharedPublishers<Item, Err>,
  subscription: SharedSubscription,
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Self::default() }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self {
    Subject {
      observers: Arc::new(Mutex::new(vec![])),
      subscription: SharedSubscription::default(),
    }
  }
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self {
    Subject {
      observers: self.observers.clone(),
      subscription: self.subscription.clone(),
    }
  }
}

impl<Item, Err, O> Observable<Item, Err, O> for Subject<Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscription = SharedSubscription::default();
    self.subscription.add(subscription.clone());
    self
      .observers
      .lock()
      .unwrap()
      .push(Box::new(Subscriber::new(observer, subscription.clone())));
    subscription
  }
}

impl<Item, Err> ObservableExt<Item, Err> for Subject<Item, Err> {}

impl<Item, Err> Observer<Item, Err> for Subject<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) {
    let mut observers = self.observers.lock().unwrap();
    observers.retain(|p| !p.is_closed());
    for p in observers.iter_mut() {
      p.next(value.clone());
    }
  }

  fn error(&mut self, err: Err) {
    let mut observers = self.observers.lock().unwrap();
    for mut p in observers.drain(..) {
      p.error(err.clone());
    }
  }

  fn complete(&mut self) {
    let mut observers = self.observers.lock().unwrap();
    for mut p in observers.drain(..) {
      p.complete();
    }
  }
}

impl<Item, Err> SubscriptionLike for Subject<Item, Err> {
  #[inline]
  fn unsubscribe(&mut self) { self.subscription.unsubscribe(); }

  #[inline]
  fn is_closed(&self) -> bool { self.subscription.is_closed() }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn broadcast() {
    let mut subject = Subject::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    for _ in 0..2 {
      let seen = seen.clone();
      subject.clone().subscribe(move |v| seen.lock().unwrap().push(v));
    }
    subject.next(7);
    assert_eq!(*seen.lock().unwrap(), vec![7, 7]);
  }

  #[test]
  fn unsubscribed_observer_stops_receiving() {
    let mut subject = Subject::new();
    let count = Arc::new(Mutex::new(0));
    {
      let count = count.clone();
      let _guard = subject
        .clone()
        .subscribe(move |_: i32| *count.lock().unwrap() += 1)
        .unsubscribe_when_dropped();
      // guard dropped here
    }
    subject.next(1);
    assert_eq!(*count.lock().unwrap(), 0);
  }

  #[test]
  fn terminal_drains_subscribers() {
    let mut subject = Subject::<i32, &str>::new();
    let completed = Arc::new(Mutex::new(0));
    let c = completed.clone();
    subject.clone().subscribe_all(|_| {}, |_| {}, move || {
      *c.lock().unwrap() += 1
    });
    subject.complete();
    subject.complete();
    assert_eq!(*completed.lock().unwrap(), 1);
  }
}
