use smallvec::SmallVec;

use crate::rc::{MutArc, RcDeref, RcDerefMut};

use super::{
  join_observer::{Head, QueueHandle},
  join_source::BoxedValue,
};

pub(crate) type PlanHandle<Err> = MutArc<ActivePlan<Err>>;

/// One matched row of values, in pattern order.
pub(crate) type MatchValues = SmallVec<[BoxedValue; 4]>;

/// The live instantiation of a plan: the pattern's queues in positional
/// order, the bound callbacks, and a terminal flag.
///
/// Lifecycle is `active -> completed` with no way back; a completed plan
/// never matches again and has deregistered itself from every queue.
pub(crate) struct ActivePlan<Err> {
  queues: SmallVec<[QueueHandle<Err>; 4]>,
  on_match: Box<dyn FnMut(MatchValues) + Send>,
  on_completed: Box<dyn FnMut() + Send>,
  completed: bool,
}

impl<Err> ActivePlan<Err> {
  pub(crate) fn new(
    queues: SmallVec<[QueueHandle<Err>; 4]>,
    on_match: Box<dyn FnMut(MatchValues) + Send>,
    on_completed: Box<dyn FnMut() + Send>,
  ) -> Self {
    ActivePlan { queues, on_match, on_completed, completed: false }
  }

  /// One match attempt, invoked for every notification arriving on any of
  /// this plan's queues. Caller holds the session gate, which is what makes
  /// the peek phase and the commit phase atomic with respect to every other
  /// plan in the session.
  ///
  /// Peek all positions first; commit (dequeue all) only if every position
  /// holds a value. Nothing is consumed on a failed attempt, so a value
  /// this plan cannot use yet stays available to other plans sharing the
  /// queue. A `Completed` head anywhere completes this plan instead; the
  /// sentinel is left in place for the other watchers.
  pub(crate) fn match_notifications(&mut self) {
    if self.completed {
      return;
    }
    let mut finished = false;
    for (i, queue) in self.queues.iter().enumerate() {
      // a pattern may bind one queue at several positions; position i then
      // peeks past the values earlier positions will consume
      let depth = self.queues[..i].iter().filter(|q| q.ptr_eq(queue)).count();
      match queue.rc_deref().peek(depth) {
        None => return,
        Some(Head::Completed) => finished = true,
        Some(Head::Value) => {}
      }
    }
    if finished {
      self.completed = true;
      (self.on_completed)();
      return;
    }
    let mut values = MatchValues::new();
    for queue in &self.queues {
      values.push(queue.rc_deref_mut().dequeue_value());
    }
    (self.on_match)(values);
  }
}

/// Builds the handle and registers it with each distinct queue of the
/// pattern, in registration order.
pub(crate) fn register<Err>(
  id: usize,
  plan: ActivePlan<Err>,
) -> PlanHandle<Err> {
  let queues = plan.queues.clone();
  let handle = MutArc::own(plan);
  for queue in &queues {
    queue.rc_deref_mut().add_plan(id, handle.clone());
  }
  handle
}
