//! Observer trait and adapter implementations
//!
//! An `Observer` consumes the three stream signals. The contract mirrors the
//! underlying event primitive: zero or more `next` calls, then at most one of
//! `error` or `complete`, and nothing afterwards. Enforcement of that
//! contract lives in [`Subscriber`](crate::subscriber::Subscriber); the trait
//! itself is deliberately unguarded.

use crate::rc::{MutArc, RcDerefMut};

pub trait Observer<Item, Err> {
  /// Receive the next value.
  fn next(&mut self, value: Item);

  /// Receive the terminal error.
  fn error(&mut self, err: Err);

  /// Receive the completion signal.
  fn complete(&mut self);
}

impl<Item, Err, O> Observer<Item, Err> for Box<O>
where
  O: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value); }

  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err); }

  #[inline]
  fn complete(&mut self) { (**self).complete(); }
}

/// `None` swallows every signal; a terminal signal consumes the inner
/// observer, so at most one of `error`/`complete` is ever delivered.
impl<Item, Err, O> Observer<Item, Err> for Option<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(&mut self, err: Err) {
    if let Some(mut inner) = self.take() {
      inner.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(mut inner) = self.take() {
      inner.complete();
    }
  }
}

/// Shared-ownership observer slot. Cloning hands several producers the same
/// downstream; the first terminal signal empties the slot for all of them.
impl<Item, Err, O> Observer<Item, Err> for MutArc<Option<O>>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) { self.rc_deref_mut().next(value); }

  fn error(&mut self, err: Err) {
    // take first so the cell's lock is released before the callback runs
    let inner = self.rc_deref_mut().take();
    if let Some(mut inner) = inner {
      inner.error(err);
    }
  }

  fn complete(&mut self) {
    let inner = self.rc_deref_mut().take();
    if let Some(mut inner) = inner {
      inner.complete();
    }
  }
}
