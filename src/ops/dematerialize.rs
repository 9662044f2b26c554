//! Dematerialize operator: the inverse of `materialize`.
//!
//! Replays buffered [`Notification`] values as real observer signals and goes
//! silent after the first terminal notification, restoring the
//! single-terminal contract of the raw stream.

use std::convert::Infallible;

use crate::{
  notification::Notification,
  observable::{Observable, ObservableExt},
  observer::Observer,
};

#[derive(Clone)]
pub struct DematerializeOp<S> {
  pub(crate) source: S,
}

/// Adds `dematerialize` to streams of notifications. Available on any type;
/// subscribing enforces that the source actually yields notifications.
pub trait Dematerialize: Sized {
  fn dematerialize(self) -> DematerializeOp<Self> {
    DematerializeOp { source: self }
  }
}

impl<S> Dematerialize for S {}

pub struct DematerializeObserver<O> {
  observer: O,
  stopped: bool,
}

impl<Item, Err, O> Observer<Notification<Item, Err>, Infallible>
  for DematerializeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Notification<Item, Err>) {
    if self.stopped {
      return;
    }
    match value {
      Notification::Next(v) => self.observer.next(v),
      Notification::Error(e) => {
        self.stopped = true;
        self.observer.error(e);
      }
      Notification::Completed => {
        self.stopped = true;
        self.observer.complete();
      }
    }
  }

  fn error(&mut self, err: Infallible) { match err {} }

  fn complete(&mut self) {
    // An upstream that completes without a terminal notification still
    // terminates the dematerialized stream.
    if !self.stopped {
      self.stopped = true;
      self.observer.complete();
    }
  }
}

impl<Item, Err, S, O> Observable<Item, Err, O> for DematerializeOp<S>
where
  S: Observable<Notification<Item, Err>, Infallible, DematerializeObserver<O>>,
  O: Observer<Item, Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self
      .source
      .actual_subscribe(DematerializeObserver { observer, stopped: false })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for DematerializeOp<S> {}
