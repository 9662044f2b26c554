use smallvec::SmallVec;

use crate::observer::Observer;

use super::{
  active_plan::{self, ActivePlan, MatchValues, PlanHandle},
  join_observer::{JoinObserver, QueueHandle},
  join_source::{BoxedValue, ErasedJoinSource},
  when::{self, ActivationCtx},
};

pub(crate) type BoxedSelector<Item, Err> =
  Box<dyn FnMut(MatchValues) -> Result<Item, Err> + Send>;

/// A join pattern bound to a result selector: the static recipe for one
/// kind of match, reusable across `when` groups only by rebuilding (plans
/// are consumed on activation, like every observable here is consumed on
/// subscribe).
///
/// The pattern's arity disappears at construction: sources are stored as a
/// runtime-ordered list and the typed selector is wrapped into one that
/// downcasts a row of boxed values positionally. That keeps the matching
/// machinery singular while `then` keeps the caller's types checked.
pub struct Plan<Item, Err> {
  pub(crate) sources: SmallVec<[ErasedJoinSource<Err>; 4]>,
  pub(crate) selector: BoxedSelector<Item, Err>,
}

/// Takes the next value of a match row, restoring its concrete type.
pub(crate) fn unbox_next<T: 'static>(
  values: &mut impl Iterator<Item = BoxedValue>,
) -> T {
  let Some(value) = values.next() else {
    unreachable!("match row shorter than its pattern")
  };
  match value.downcast::<T>() {
    Ok(v) => *v,
    // a queue only ever buffers its own source's item type
    Err(_) => unreachable!("join queue delivered a foreign value type"),
  }
}

impl<Item, Err> Plan<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  /// Instantiates this plan against a session: resolves each source to its
  /// session queue (creating queues on first reference), wires the
  /// callbacks, registers with every distinct queue and counts the plan
  /// live at the coordinator.
  pub(crate) fn activate(
    self,
    ctx: &mut ActivationCtx<Item, Err>,
  ) -> PlanHandle<Err> {
    let id = ctx.next_plan_id();
    let mut queues: SmallVec<[QueueHandle<Err>; 4]> = SmallVec::new();
    for source in self.sources {
      queues.push(ctx.queue_for(source));
    }

    let mut selector = self.selector;
    let on_match: Box<dyn FnMut(MatchValues) + Send> = {
      let mut downstream = ctx.downstream().clone();
      let core = ctx.core().clone();
      Box::new(move |values| match selector(values) {
        Ok(value) => downstream.next(value),
        Err(err) => {
          // a failing selector is fatal to the whole join group
          downstream.error(err);
          when::teardown(&core);
        }
      })
    };

    let on_completed: Box<dyn FnMut() + Send> = {
      let queues = queues.clone();
      let downstream = ctx.downstream().clone();
      let core = ctx.core().clone();
      Box::new(move || {
        for queue in &queues {
          JoinObserver::remove_plan(queue, id);
        }
        when::deactivate(&core, &downstream);
      })
    };

    let handle =
      active_plan::register(id, ActivePlan::new(queues, on_match, on_completed));
    ctx.count_live_plan();
    handle
  }
}
