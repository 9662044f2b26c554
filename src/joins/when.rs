use std::{
  collections::HashMap,
  mem,
  sync::{Arc, Mutex, MutexGuard},
};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::{MutArc, RcDeref, RcDerefMut},
  subscription::{SharedSubscription, SubscriptionLike},
};

use super::{
  join_observer::{JoinObserver, QueueHandle},
  join_source::{ErasedJoinSource, SourceKey},
  plan::Plan,
};

/// The session lock. One per `when` subscription, shared by every queue and
/// plan of that session; all queue mutation, match attempts and callback
/// invocation happen while it is held. It is acquired once per entry point
/// (notification arrival, activation, disposal) and never nested.
#[derive(Clone, Default)]
pub(crate) struct Gate(Arc<Mutex<()>>);

impl Gate {
  pub(crate) fn lock(&self) -> MutexGuard<'_, ()> { self.0.lock().unwrap() }
}

/// The shared downstream slot. The first terminal signal takes the boxed
/// observer, so later emissions fall on `None` and the single-terminal
/// contract holds no matter which plan or queue terminates the session.
pub(crate) type Downstream<Item, Err> =
  MutArc<Option<Box<dyn Observer<Item, Err> + Send>>>;

pub(crate) type CoreHandle<Err> = MutArc<WhenCore<Err>>;

/// Session bookkeeping: how many plans are still live, which queues exist,
/// and whether the session already terminated.
pub(crate) struct WhenCore<Err> {
  live_plans: usize,
  queues: Vec<QueueHandle<Err>>,
  terminated: bool,
}

/// Disposes every queue of the session. Idempotent; the terminated flag is
/// flipped under the core's own cell so a racing second teardown finds
/// nothing left to do.
pub(crate) fn teardown<Err>(core: &CoreHandle<Err>) {
  let queues = {
    let mut core = core.rc_deref_mut();
    if core.terminated {
      return;
    }
    core.terminated = true;
    core.live_plans = 0;
    mem::take(&mut core.queues)
  };
  for queue in &queues {
    JoinObserver::dispose(queue);
  }
}

/// Called by a plan's completion callback. When the last live plan
/// deactivates, the downstream completes and the session tears down.
pub(crate) fn deactivate<Item, Err>(
  core: &CoreHandle<Err>,
  downstream: &Downstream<Item, Err>,
) {
  let all_done = {
    let mut core = core.rc_deref_mut();
    if core.terminated {
      false
    } else {
      core.live_plans -= 1;
      core.live_plans == 0
    }
  };
  if all_done {
    downstream.clone().complete();
    teardown(core);
  }
}

/// Per-activation context threaded through the plans: the queue registry
/// (keyed by source identity, so a source referenced by several plans is
/// subscribed once), the downstream slot and the session core.
pub(crate) struct ActivationCtx<Item, Err> {
  registry: HashMap<SourceKey, QueueHandle<Err>>,
  downstream: Downstream<Item, Err>,
  core: CoreHandle<Err>,
  next_id: usize,
}

impl<Item, Err> ActivationCtx<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  fn new(downstream: Downstream<Item, Err>, core: CoreHandle<Err>) -> Self {
    ActivationCtx {
      registry: HashMap::new(),
      downstream,
      core,
      next_id: 0,
    }
  }

  pub(crate) fn next_plan_id(&mut self) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    id
  }

  pub(crate) fn downstream(&self) -> &Downstream<Item, Err> {
    &self.downstream
  }

  pub(crate) fn core(&self) -> &CoreHandle<Err> { &self.core }

  pub(crate) fn count_live_plan(&mut self) {
    self.core.rc_deref_mut().live_plans += 1;
  }

  /// Looks up the queue for a source identity, creating and registering it
  /// on first reference. The queue's error callback escalates straight to
  /// the downstream and tears the session down — source errors are never
  /// buffered or matched around.
  pub(crate) fn queue_for(
    &mut self,
    source: ErasedJoinSource<Err>,
  ) -> QueueHandle<Err> {
    if let Some(queue) = self.registry.get(&source.key) {
      return queue.clone();
    }
    let on_error: Box<dyn FnOnce(Err) + Send> = {
      let mut downstream = self.downstream.clone();
      let core = self.core.clone();
      Box::new(move |err| {
        downstream.error(err);
        teardown(&core);
      })
    };
    let queue = MutArc::own(JoinObserver::new(source.source, on_error));
    self.registry.insert(source.key, queue.clone());
    queue
  }

  fn into_queues(self) -> Vec<QueueHandle<Err>> {
    self.registry.into_values().collect()
  }
}

/// Runs a set of [`Plan`]s as one combined observable.
///
/// The combined stream emits one value per successful match of any plan,
/// completes once every plan has completed, and errors if any constituent
/// source errors or any selector fails. Plans may overlap in the streams
/// they reference; overlapping positions share one observation queue per
/// session, and a value consumed by one plan is gone for the others.
///
/// Callbacks run while the session gate is held. Feeding a session source
/// or disposing the combined subscription from inside a selector or the
/// downstream observer is not supported.
pub fn when<Item, Err, I>(plans: I) -> When<Item, Err>
where
  I: IntoIterator<Item = Plan<Item, Err>>,
{
  When { plans: plans.into_iter().collect() }
}

pub struct When<Item, Err> {
  plans: Vec<Plan<Item, Err>>,
}

impl<Item, Err, O> Observable<Item, Err, O> for When<Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let gate = Gate::default();
    let downstream: Downstream<Item, Err> =
      MutArc::own(Some(Box::new(observer)));
    let core: CoreHandle<Err> = MutArc::own(WhenCore {
      live_plans: 0,
      queues: Vec::new(),
      terminated: false,
    });
    let subscription = SharedSubscription::default();
    subscription.add(WhenTeardown {
      gate: gate.clone(),
      core: core.clone(),
      downstream: downstream.clone(),
    });

    if self.plans.is_empty() {
      // every plan has completed, vacuously
      downstream.clone().complete();
      teardown(&core);
      return subscription;
    }

    let queues = {
      let _guard = gate.lock();
      let mut ctx = ActivationCtx::new(downstream, core.clone());
      for plan in self.plans {
        plan.activate(&mut ctx);
      }
      let queues = ctx.into_queues();
      core.rc_deref_mut().queues = queues.clone();
      queues
    };

    // Sources are subscribed only after the gate is released: a synchronous
    // source delivers its whole lifetime re-entrantly through the gate, and
    // the gate is not a reentrant lock.
    for queue in &queues {
      JoinObserver::subscribe(queue, &gate);
    }
    subscription
  }
}

impl<Item, Err> ObservableExt<Item, Err> for When<Item, Err> {}

struct WhenTeardown<Item, Err> {
  gate: Gate,
  core: CoreHandle<Err>,
  downstream: Downstream<Item, Err>,
}

impl<Item, Err> SubscriptionLike for WhenTeardown<Item, Err> {
  fn unsubscribe(&mut self) {
    let _guard = self.gate.lock();
    // external disposal is silent: no terminal signal, just teardown
    *self.downstream.rc_deref_mut() = None;
    teardown(&self.core);
  }

  fn is_closed(&self) -> bool { self.core.rc_deref().terminated }
}

#[cfg(test)]
mod test {
  use std::sync::{Arc, Mutex};

  use crate::prelude::*;

  fn collector<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl FnMut(T)) {
    let store = Arc::new(Mutex::new(Vec::new()));
    let sink = store.clone();
    (store, move |v| sink.lock().unwrap().push(v))
  }

  #[test]
  fn pairwise_join() {
    let mut xs = Subject::<i32, ()>::new();
    let mut ys = Subject::<i32, ()>::new();
    let (out, push) = collector();

    when([xs
      .clone()
      .join_source()
      .and(ys.clone().join_source())
      .then(|a, b| a + b)])
    .subscribe_all(push, |_| {}, || {});

    xs.next(1);
    xs.next(2);
    assert!(out.lock().unwrap().is_empty());
    ys.next(10);
    ys.next(20);
    assert_eq!(*out.lock().unwrap(), vec![11, 22]);
  }

  #[test]
  fn completes_when_all_plans_complete() {
    let mut xs = Subject::<i32, ()>::new();
    let mut ys = Subject::<i32, ()>::new();
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();

    when([xs
      .clone()
      .join_source()
      .and(ys.clone().join_source())
      .then(|a, b| a + b)])
    .subscribe_all(|_| {}, |_: ()| {}, move || *c.lock().unwrap() = true);

    xs.next(1);
    xs.complete();
    assert!(!*completed.lock().unwrap());
    // this round matches the buffered value pair; the completion sentinel
    // behind it is observed on the following round
    ys.next(1);
    assert!(!*completed.lock().unwrap());
    ys.complete();
    assert!(*completed.lock().unwrap());
  }

  #[test]
  fn source_error_escalates_immediately() {
    let mut xs = Subject::<i32, &str>::new();
    let ys = Subject::<i32, &str>::new();
    let err = Arc::new(Mutex::new(None));
    let e = err.clone();

    when([xs
      .clone()
      .join_source()
      .and(ys.clone().join_source())
      .then(|a, b| a + b)])
    .subscribe_all(|_| {}, move |x| *e.lock().unwrap() = Some(x), || {});

    // no partner value buffered anywhere; the error still escalates
    xs.error("bang");
    assert_eq!(*err.lock().unwrap(), Some("bang"));
  }

  #[test]
  fn empty_when_completes_at_subscribe() {
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    when(Vec::<Plan<i32, ()>>::new()).subscribe_all(
      |_| {},
      |_| {},
      move || *c.lock().unwrap() = true,
    );
    assert!(*completed.lock().unwrap());
  }

  #[test]
  fn disposal_stops_emission() {
    let mut xs = Subject::<i32, ()>::new();
    let mut ys = Subject::<i32, ()>::new();
    let (out, push) = collector();

    let mut sub = when([xs
      .clone()
      .join_source()
      .and(ys.clone().join_source())
      .then(|a, b| a + b)])
    .subscribe_all(push, |_| {}, || {});

    xs.next(1);
    sub.unsubscribe();
    ys.next(2);
    assert!(out.lock().unwrap().is_empty());
  }
}
