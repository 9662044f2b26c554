use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::SingleSubscription,
  type_hint::TypeHint,
};

/// Creates an observable that produces no values and completes immediately.
pub fn empty<Item, Err>() -> Empty<Item, Err> { Empty(TypeHint::new()) }

#[derive(Clone)]
pub struct Empty<Item, Err>(TypeHint<(Item, Err)>);

impl<Item, Err, O> Observable<Item, Err, O> for Empty<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = SingleSubscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    observer.complete();
    SingleSubscription::default()
  }
}

impl<Item, Err> ObservableExt<Item, Err> for Empty<Item, Err> {}

/// Creates an observable that emits no items and terminates with an error.
pub fn throw<Item, Err>(err: Err) -> Throw<Item, Err> {
  Throw(err, TypeHint::new())
}

#[derive(Clone)]
pub struct Throw<Item, Err>(Err, TypeHint<Item>);

impl<Item, Err, O> Observable<Item, Err, O> for Throw<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = SingleSubscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    observer.error(self.0);
    SingleSubscription::default()
  }
}

impl<Item, Err> ObservableExt<Item, Err> for Throw<Item, Err> {}

/// Creates an observable that never signals anything.
pub fn never<Item, Err>() -> Never<Item, Err> { Never(TypeHint::new()) }

#[derive(Clone)]
pub struct Never<Item, Err>(TypeHint<(Item, Err)>);

impl<Item, Err, O> Observable<Item, Err, O> for Never<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = SingleSubscription;

  fn actual_subscribe(self, _observer: O) -> Self::Unsub {
    SingleSubscription::default()
  }
}

impl<Item, Err> ObservableExt<Item, Err> for Never<Item, Err> {}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn empty_only_completes() {
    let mut nexted = false;
    let mut completed = false;
    observable::empty::<i32, ()>().subscribe_all(
      |_| nexted = true,
      |_| {},
      || completed = true,
    );
    assert!(!nexted);
    assert!(completed);
  }

  #[test]
  fn throw_only_errors() {
    let mut err = None;
    observable::throw::<i32, _>("boom").subscribe_all(
      |_| {},
      |e| err = Some(e),
      || {},
    );
    assert_eq!(err, Some("boom"));
  }

  #[test]
  fn never_stays_silent() {
    let signalled = std::cell::Cell::new(false);
    observable::never::<i32, ()>().subscribe_all(
      |_| signalled.set(true),
      |_| signalled.set(true),
      || signalled.set(true),
    );
    assert!(!signalled.get());
  }
}
