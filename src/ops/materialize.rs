//! Materialize operator
//!
//! Turns the three observer callbacks into ordinary [`Notification`] values.
//! The materialized stream itself never errors: a source terminal arrives as
//! a final `Notification` value, followed by completion of the materialized
//! stream. This is the form the join engine buffers per source.

use std::convert::Infallible;

use crate::{
  notification::Notification,
  observable::{Observable, ObservableExt},
  observer::Observer,
};

#[derive(Clone)]
pub struct MaterializeOp<S> {
  pub(crate) source: S,
}

pub struct MaterializeObserver<O> {
  observer: O,
}

impl<Item, Err, O> Observer<Item, Err> for MaterializeObserver<O>
where
  O: Observer<Notification<Item, Err>, Infallible>,
{
  fn next(&mut self, value: Item) {
    self.observer.next(Notification::Next(value));
  }

  fn error(&mut self, err: Err) {
    self.observer.next(Notification::Error(err));
    self.observer.complete();
  }

  fn complete(&mut self) {
    self.observer.next(Notification::Completed);
    self.observer.complete();
  }
}

impl<Item, Err, S, O> Observable<Notification<Item, Err>, Infallible, O>
  for MaterializeOp<S>
where
  S: Observable<Item, Err, MaterializeObserver<O>>,
  O: Observer<Notification<Item, Err>, Infallible>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(MaterializeObserver { observer })
  }
}

impl<Item, Err, S> ObservableExt<Notification<Item, Err>, Infallible>
  for MaterializeOp<S>
{
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn values_then_completion_marker() {
    let mut seen = vec![];
    observable::from_iter::<_, ()>([1, 2])
      .materialize()
      .subscribe_all(|n| seen.push(n), |_| {}, || {});
    assert_eq!(
      seen,
      vec![
        Notification::Next(1),
        Notification::Next(2),
        Notification::Completed
      ]
    );
  }

  #[test]
  fn error_becomes_a_value() {
    let mut seen = vec![];
    let mut completed = false;
    observable::throw::<i32, _>("broken").materialize().subscribe_all(
      |n| seen.push(n),
      |_| {},
      || completed = true,
    );
    assert_eq!(seen, vec![Notification::Error("broken")]);
    // the materialized stream itself completes normally
    assert!(completed);
  }
}
