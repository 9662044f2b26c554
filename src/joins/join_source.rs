use std::{
  any::Any,
  hash::{Hash, Hasher},
  sync::Arc,
};

use crate::{
  observable::Observable,
  ops::materialize::{MaterializeObserver, MaterializeOp},
  subscription::SubscriptionLike,
  type_hint::TypeHint,
};

use super::{
  join_observer::{JoinSubscriber, QueueHandle},
  when::Gate,
};

/// A buffered join value with its compile-time type erased. The typed
/// selector built by `then` downcasts positionally; a queue only ever
/// buffers its own source's item type.
pub(crate) type BoxedValue = Box<dyn Any + Send>;

pub(crate) type BoxedSubscription = Box<dyn SubscriptionLike + Send>;

/// The observer a join queue plants on a materialized source.
pub type JoinWire<Item, Err> = MaterializeObserver<JoinSubscriber<Item, Err>>;

/// Allocation-unique identity token. Clones compare equal; independent
/// tokens never do. This is what lets a session registry recognize "the same
/// stream" across plans without asking sources for reference identity.
#[derive(Clone)]
pub(crate) struct SourceKey(Arc<()>);

impl SourceKey {
  fn new() -> Self { SourceKey(Arc::new(())) }
}

impl PartialEq for SourceKey {
  fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl Eq for SourceKey {}

impl Hash for SourceKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    (Arc::as_ptr(&self.0) as usize).hash(state);
  }
}

/// A source observable with its item type erased down to the subscription
/// recipe a join queue needs: materialize, box each value, feed the queue.
pub(crate) trait ErasedSource<Err>: Send {
  fn box_clone(&self) -> Box<dyn ErasedSource<Err>>;

  fn subscribe_queue(
    self: Box<Self>,
    gate: Gate,
    queue: QueueHandle<Err>,
  ) -> BoxedSubscription;
}

pub(crate) struct SourceWire<S, Item> {
  source: S,
  _hint: TypeHint<Item>,
}

impl<S, Item, Err> ErasedSource<Err> for SourceWire<S, Item>
where
  S: Observable<Item, Err, JoinWire<Item, Err>> + Clone + Send + 'static,
  <S as Observable<Item, Err, JoinWire<Item, Err>>>::Unsub: Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
{
  fn box_clone(&self) -> Box<dyn ErasedSource<Err>> {
    Box::new(SourceWire { source: self.source.clone(), _hint: TypeHint::new() })
  }

  fn subscribe_queue(
    self: Box<Self>,
    gate: Gate,
    queue: QueueHandle<Err>,
  ) -> BoxedSubscription {
    let subscriber = JoinSubscriber::new(gate, queue);
    let materialized = MaterializeOp { source: self.source };
    Box::new(materialized.actual_subscribe(subscriber))
  }
}

pub(crate) struct ErasedJoinSource<Err> {
  pub(crate) key: SourceKey,
  pub(crate) source: Box<dyn ErasedSource<Err>>,
}

impl<Err> Clone for ErasedJoinSource<Err> {
  fn clone(&self) -> Self {
    ErasedJoinSource { key: self.key.clone(), source: self.source.box_clone() }
  }
}

/// A handle pinning a source observable's identity inside a join group.
///
/// Patterns are built from these handles. Clones share the identity: every
/// pattern position holding a clone observes one shared per-session queue
/// backed by one subscription to the source. Wrapping an observable twice
/// (two `new` calls) produces two unrelated identities, each with its own
/// queue and subscription.
pub struct JoinSource<Item, Err> {
  pub(crate) inner: ErasedJoinSource<Err>,
  _hint: TypeHint<Item>,
}

impl<Item, Err> Clone for JoinSource<Item, Err> {
  fn clone(&self) -> Self {
    JoinSource { inner: self.inner.clone(), _hint: TypeHint::new() }
  }
}

impl<Item, Err> JoinSource<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  /// Wraps `source` with a fresh join identity.
  pub fn new<S>(source: S) -> Self
  where
    S: Observable<Item, Err, JoinWire<Item, Err>> + Clone + Send + 'static,
    <S as Observable<Item, Err, JoinWire<Item, Err>>>::Unsub: Send + 'static,
  {
    JoinSource {
      inner: ErasedJoinSource {
        key: SourceKey::new(),
        source: Box::new(SourceWire { source, _hint: TypeHint::new() }),
      },
      _hint: TypeHint::new(),
    }
  }
}
