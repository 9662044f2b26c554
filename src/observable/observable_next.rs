use crate::{
  observable::Observable,
  observer::Observer,
  subscription::{SubscriptionLike, SubscriptionWrapper},
};

/// Observer built from a single `next` closure; errors are unrepresentable
/// (`Err = ()`) and completion is ignored.
#[derive(Clone)]
pub struct ObserverItem<N> {
  next: N,
}

impl<Item, N> Observer<Item, ()> for ObserverItem<N>
where
  N: FnMut(Item),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value); }

  #[inline]
  fn error(&mut self, _err: ()) {}

  #[inline]
  fn complete(&mut self) {}
}

pub trait SubscribeNext<Item, N> {
  type Unsub: SubscriptionLike;

  /// Invokes an execution of the observable with a value handler only.
  fn subscribe(self, next: N) -> SubscriptionWrapper<Self::Unsub>;
}

impl<S, Item, N> SubscribeNext<Item, N> for S
where
  S: Observable<Item, (), ObserverItem<N>>,
  N: FnMut(Item),
{
  type Unsub = S::Unsub;

  fn subscribe(self, next: N) -> SubscriptionWrapper<Self::Unsub> {
    SubscriptionWrapper(self.actual_subscribe(ObserverItem { next }))
  }
}
