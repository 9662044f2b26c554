use std::{
  fmt::{Debug, Formatter},
  sync::{Arc, Mutex},
};

use smallvec::SmallVec;

use crate::observer::Observer;

/// Handle returned from a subscribe call, used to stop receiving signals
/// before the stream terminates on its own.
pub trait SubscriptionLike {
  fn unsubscribe(&mut self);

  fn is_closed(&self) -> bool;
}

/// The simplest subscription: a closed flag with no teardown children.
#[derive(Clone, Debug, Default)]
pub struct SingleSubscription(bool);

impl SubscriptionLike for SingleSubscription {
  #[inline]
  fn unsubscribe(&mut self) { self.0 = true; }

  #[inline]
  fn is_closed(&self) -> bool { self.0 }
}

/// Thread-safe subscription aggregating child teardown handles.
///
/// Cloning shares state: closing any clone closes all of them and
/// unsubscribes every child exactly once. Adding to an already-closed
/// subscription unsubscribes the child immediately.
#[derive(Clone, Default)]
pub struct SharedSubscription(
  Arc<Mutex<Inner<Box<dyn SubscriptionLike + Send + Sync>>>>,
);

impl SharedSubscription {
  pub fn add<S: SubscriptionLike + Send + Sync + 'static>(
    &self,
    subscription: S,
  ) {
    self.0.lock().unwrap().add(Box::new(subscription));
  }
}

impl SubscriptionLike for SharedSubscription {
  #[inline]
  fn unsubscribe(&mut self) { self.0.lock().unwrap().unsubscribe(); }

  #[inline]
  fn is_closed(&self) -> bool { self.0.lock().unwrap().is_closed() }
}

impl Debug for SharedSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SharedSubscription")
      .field("is_closed", &self.is_closed())
      .finish()
  }
}

struct Inner<T> {
  closed: bool,
  teardown: SmallVec<[T; 1]>,
}

impl<T: SubscriptionLike> SubscriptionLike for Inner<T> {
  #[inline]
  fn is_closed(&self) -> bool { self.closed }

  fn unsubscribe(&mut self) {
    if !self.closed {
      self.closed = true;
      for v in &mut self.teardown {
        v.unsubscribe();
      }
      self.teardown.clear();
    }
  }
}

impl<T: SubscriptionLike> Inner<T> {
  fn add(&mut self, mut v: T) {
    if self.closed {
      v.unsubscribe();
    } else {
      self.teardown.retain(|v| !v.is_closed());
      self.teardown.push(v);
    }
  }
}

impl<T> Default for Inner<T> {
  fn default() -> Self { Inner { closed: false, teardown: SmallVec::new() } }
}

impl<T: ?Sized> SubscriptionLike for Box<T>
where
  T: SubscriptionLike,
{
  #[inline]
  fn unsubscribe(&mut self) { (**self).unsubscribe(); }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// An observer a subject retains: it both receives signals and knows whether
/// its subscription is still live.
pub trait Publisher<Item, Err>: Observer<Item, Err> + SubscriptionLike {}

impl<Item, Err, T> Publisher<Item, Err> for T where
  T: Observer<Item, Err> + SubscriptionLike
{
}

/// Wrapper around a subscription which provides the
/// `unsubscribe_when_dropped()` method.
pub struct SubscriptionWrapper<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionWrapper<T> {
  /// Activates "RAII" behavior for this subscription. `unsubscribe()` is
  /// called automatically as soon as the returned value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<T> {
    SubscriptionGuard(self.0)
  }

  /// Consumes this wrapper and returns the underlying subscription.
  pub fn into_inner(self) -> T { self.0 }
}

impl<T: SubscriptionLike> SubscriptionLike for SubscriptionWrapper<T> {
  #[inline]
  fn unsubscribe(&mut self) { self.0.unsubscribe(); }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// An RAII "scoped subscription": when this structure is dropped (falls out
/// of scope), the subscription is unsubscribed.
#[must_use]
pub struct SubscriptionGuard<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior.
  pub fn new(subscription: T) -> SubscriptionGuard<T> {
    SubscriptionGuard(subscription)
  }
}

impl<T: SubscriptionLike> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe(); }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn shared_unsubscribes_children_once() {
    let parent = SharedSubscription::default();
    let c1 = SharedSubscription::default();
    let c2 = SharedSubscription::default();
    parent.add(c1.clone());
    parent.add(c2.clone());

    parent.clone().unsubscribe();
    assert!(c1.is_closed());
    assert!(c2.is_closed());

    // a second unsubscribe is a no-op
    parent.clone().unsubscribe();
    assert!(parent.is_closed());
  }

  #[test]
  fn add_after_close_unsubscribes_immediately() {
    let parent = SharedSubscription::default();
    parent.clone().unsubscribe();
    let child = SharedSubscription::default();
    parent.add(child.clone());
    assert!(child.is_closed());
  }

  #[test]
  fn guard_unsubscribes_on_drop() {
    let sub = SharedSubscription::default();
    {
      let _guard = SubscriptionWrapper(sub.clone()).unsubscribe_when_dropped();
    }
    assert!(sub.is_closed());
  }
}
