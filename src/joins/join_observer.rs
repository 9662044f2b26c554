use std::{collections::VecDeque, convert::Infallible};

use crate::{
  notification::Notification,
  observer::Observer,
  rc::{MutArc, RcDerefMut},
  subscription::SubscriptionLike,
  type_hint::TypeHint,
};

use super::{
  active_plan::PlanHandle,
  join_source::{BoxedSubscription, BoxedValue, ErasedSource},
  when::Gate,
};

pub(crate) type QueueHandle<Err> = MutArc<JoinObserver<Err>>;

/// What a plan sees when it peeks a queue position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Head {
  Value,
  Completed,
}

/// Per-source observation queue: the FIFO buffer of not-yet-consumed
/// notifications plus the set of plans watching this source.
///
/// One queue exists per distinct [`JoinSource`](super::JoinSource) identity
/// per session. Values are appended in arrival order and only ever removed
/// by a committed match; a `Completed` notification is never dequeued, so it
/// stays at the head as a sentinel every watching plan gets to observe. An
/// `Error` notification is not buffered at all — it fires the session error
/// callback the moment it arrives.
pub(crate) struct JoinObserver<Err> {
  buffer: VecDeque<Notification<BoxedValue, Err>>,
  active_plans: Vec<(usize, PlanHandle<Err>)>,
  on_error: Option<Box<dyn FnOnce(Err) + Send>>,
  source: Option<Box<dyn ErasedSource<Err>>>,
  subscription: Option<BoxedSubscription>,
  disposed: bool,
}

impl<Err> JoinObserver<Err> {
  pub(crate) fn new(
    source: Box<dyn ErasedSource<Err>>,
    on_error: Box<dyn FnOnce(Err) + Send>,
  ) -> Self {
    JoinObserver {
      buffer: VecDeque::new(),
      active_plans: Vec::new(),
      on_error: Some(on_error),
      source: Some(source),
      subscription: None,
      disposed: false,
    }
  }

  /// Peeks the buffered notification `depth` positions from the head.
  /// `depth` is non-zero only for plans binding this queue at several
  /// pattern positions.
  pub(crate) fn peek(&self, depth: usize) -> Option<Head> {
    self.buffer.get(depth).map(|n| match n {
      Notification::Next(_) => Head::Value,
      Notification::Completed => Head::Completed,
      // errors escalate without ever entering the buffer
      Notification::Error(_) => unreachable!("buffered error notification"),
    })
  }

  /// Removes and returns the value at the head. Only called while
  /// committing a match whose peeks all succeeded, under the session gate.
  pub(crate) fn dequeue_value(&mut self) -> BoxedValue {
    match self.buffer.pop_front() {
      Some(Notification::Next(value)) => value,
      _ => unreachable!("match committed against an unready queue"),
    }
  }

  /// Registers a plan; re-registration of the same plan id is a no-op, so a
  /// plan binding this queue at several positions is offered each
  /// notification once.
  pub(crate) fn add_plan(&mut self, id: usize, plan: PlanHandle<Err>) {
    if self.active_plans.iter().all(|(existing, _)| *existing != id) {
      self.active_plans.push((id, plan));
    }
  }

  fn dispose_locked(&mut self) -> Option<BoxedSubscription> {
    self.disposed = true;
    self.buffer.clear();
    self.active_plans.clear();
    self.on_error = None;
    self.source = None;
    self.subscription.take()
  }

  /// Deregisters a plan; the queue disposes itself (and unsubscribes its
  /// source) when the last watching plan leaves.
  pub(crate) fn remove_plan(this: &QueueHandle<Err>, id: usize) {
    let subscription = {
      let mut queue = this.rc_deref_mut();
      queue.active_plans.retain(|(existing, _)| *existing != id);
      if queue.active_plans.is_empty() && !queue.disposed {
        queue.dispose_locked()
      } else {
        None
      }
    };
    if let Some(mut subscription) = subscription {
      subscription.unsubscribe();
    }
  }

  /// Tears the queue down: drops buffered values, forgets plans and
  /// unsubscribes the source. Idempotent.
  pub(crate) fn dispose(this: &QueueHandle<Err>) {
    let subscription = this.rc_deref_mut().dispose_locked();
    if let Some(mut subscription) = subscription {
      subscription.unsubscribe();
    }
  }

  /// Subscribes the pending source. Runs *without* the session gate held:
  /// a synchronous source delivers its notifications re-entrantly through
  /// [`JoinSubscriber`], which takes the gate per notification.
  pub(crate) fn subscribe(this: &QueueHandle<Err>, gate: &Gate) {
    let source = {
      let mut queue = this.rc_deref_mut();
      if queue.disposed {
        return;
      }
      queue.source.take()
    };
    let Some(source) = source else { return };
    let subscription = source.subscribe_queue(gate.clone(), this.clone());
    let leftover = {
      let mut queue = this.rc_deref_mut();
      if queue.disposed {
        // the source terminated the whole session while subscribing
        Some(subscription)
      } else {
        queue.subscription = Some(subscription);
        None
      }
    };
    if let Some(mut subscription) = leftover {
      subscription.unsubscribe();
    }
  }

  /// Handles one incoming materialized notification. Caller holds the
  /// session gate.
  ///
  /// Values and completions are enqueued, then every watching plan is
  /// offered a match in registration order. The plan list is snapshotted
  /// first: a successful match may deregister plans (even this queue's)
  /// mid-iteration. Errors skip the buffer entirely and escalate through
  /// the session error callback exactly once.
  pub(crate) fn on_notification(
    this: &QueueHandle<Err>,
    notification: Notification<BoxedValue, Err>,
  ) {
    let plans = {
      let mut queue = this.rc_deref_mut();
      if queue.disposed {
        return;
      }
      match notification {
        Notification::Error(err) => {
          let on_error = queue.on_error.take();
          drop(queue);
          if let Some(on_error) = on_error {
            on_error(err);
          }
          return;
        }
        buffered => queue.buffer.push_back(buffered),
      }
      queue
        .active_plans
        .iter()
        .map(|(_, plan)| plan.clone())
        .collect::<Vec<_>>()
    };
    for plan in plans {
      plan.rc_deref_mut().match_notifications();
    }
  }
}

/// The observer planted on one materialized source: boxes each value and
/// funnels the notification to its queue under the session gate.
pub struct JoinSubscriber<Item, Err> {
  gate: Gate,
  queue: QueueHandle<Err>,
  _hint: TypeHint<Item>,
}

impl<Item, Err> JoinSubscriber<Item, Err> {
  pub(crate) fn new(gate: Gate, queue: QueueHandle<Err>) -> Self {
    JoinSubscriber { gate, queue, _hint: TypeHint::new() }
  }
}

impl<Item, Err> Observer<Notification<Item, Err>, Infallible>
  for JoinSubscriber<Item, Err>
where
  Item: Send + 'static,
{
  fn next(&mut self, value: Notification<Item, Err>) {
    let notification = match value {
      Notification::Next(v) => Notification::Next(Box::new(v) as BoxedValue),
      Notification::Error(e) => Notification::Error(e),
      Notification::Completed => Notification::Completed,
    };
    let _guard = self.gate.lock();
    JoinObserver::on_notification(&self.queue, notification);
  }

  fn error(&mut self, err: Infallible) { match err {} }

  fn complete(&mut self) {
    // the terminal notification already arrived as a value
  }
}
