use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::SingleSubscription,
  type_hint::TypeHint,
};

/// Creates an observable that emits a single value, then completes.
pub fn of<Item, Err>(value: Item) -> ObservableOf<Item, Err> {
  ObservableOf(value, TypeHint::new())
}

#[derive(Clone)]
pub struct ObservableOf<Item, Err>(Item, TypeHint<Err>);

impl<Item, Err, O> Observable<Item, Err, O> for ObservableOf<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = SingleSubscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    observer.next(self.0);
    observer.complete();
    SingleSubscription::default()
  }
}

impl<Item, Err> ObservableExt<Item, Err> for ObservableOf<Item, Err> {}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn of_emits_once() {
    let mut values = vec![];
    observable::of(42).subscribe(|v| values.push(v));
    assert_eq!(values, vec![42]);
  }
}
