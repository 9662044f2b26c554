use crate::{observer::Observer, subscription::SubscriptionLike};

/// Pairs an observer with its subscription and enforces the safe-observer
/// contract on the way in: nothing is delivered after the subscription
/// closes, and a terminal signal closes it.
pub struct Subscriber<O, U> {
  observer: O,
  subscription: U,
}

impl<O, U> Subscriber<O, U> {
  pub fn new(observer: O, subscription: U) -> Self {
    Subscriber { observer, subscription }
  }
}

impl<Item, Err, O, U> Observer<Item, Err> for Subscriber<O, U>
where
  O: Observer<Item, Err>,
  U: SubscriptionLike,
{
  fn next(&mut self, value: Item) {
    if !self.subscription.is_closed() {
      self.observer.next(value);
    }
  }

  fn error(&mut self, err: Err) {
    if !self.subscription.is_closed() {
      self.subscription.unsubscribe();
      self.observer.error(err);
    }
  }

  fn complete(&mut self) {
    if !self.subscription.is_closed() {
      self.subscription.unsubscribe();
      self.observer.complete();
    }
  }
}

impl<O, U> SubscriptionLike for Subscriber<O, U>
where
  U: SubscriptionLike,
{
  #[inline]
  fn unsubscribe(&mut self) { self.subscription.unsubscribe(); }

  #[inline]
  fn is_closed(&self) -> bool { self.subscription.is_closed() }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::subscription::SharedSubscription;

  struct Record {
    values: Vec<i32>,
    terminals: usize,
  }

  impl Observer<i32, ()> for &mut Record {
    fn next(&mut self, value: i32) { self.values.push(value); }
    fn error(&mut self, _: ()) { self.terminals += 1; }
    fn complete(&mut self) { self.terminals += 1; }
  }

  #[test]
  fn terminal_closes_and_silences() {
    let mut record = Record { values: vec![], terminals: 0 };
    let mut subscriber =
      Subscriber::new(&mut record, SharedSubscription::default());
    subscriber.next(1);
    subscriber.complete();
    subscriber.next(2);
    subscriber.error(());
    assert!(subscriber.is_closed());
    assert_eq!(record.values, vec![1]);
    assert_eq!(record.terminals, 1);
  }

  #[test]
  fn closed_before_delivery_drops_values() {
    let mut record = Record { values: vec![], terminals: 0 };
    let mut subscriber =
      Subscriber::new(&mut record, SharedSubscription::default());
    subscriber.unsubscribe();
    subscriber.next(1);
    assert!(record.values.is_empty());
  }
}
