use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::SingleSubscription,
  type_hint::TypeHint,
};

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error; the
/// error channel is free, so the stream composes with any session error
/// type.
///
/// # Examples
///
/// ```
/// use conflux::prelude::*;
///
/// observable::from_iter(0..10).subscribe(|v| println!("{},", v));
/// ```
pub fn from_iter<Iter, Err>(iter: Iter) -> ObservableIter<Iter, Err>
where
  Iter: IntoIterator,
{
  ObservableIter(iter, TypeHint::new())
}

#[derive(Clone)]
pub struct ObservableIter<Iter, Err>(Iter, TypeHint<Err>);

impl<Iter, Err, O> Observable<Iter::Item, Err, O> for ObservableIter<Iter, Err>
where
  Iter: IntoIterator,
  O: Observer<Iter::Item, Err>,
{
  type Unsub = SingleSubscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    for v in self.0 {
      observer.next(v);
    }
    observer.complete();
    SingleSubscription::default()
  }
}

impl<Iter, Err> ObservableExt<Iter::Item, Err> for ObservableIter<Iter, Err> where
  Iter: IntoIterator
{
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn from_range() {
    let mut hit_count = 0;
    let mut completed = false;
    observable::from_iter::<_, ()>(0..100)
      .subscribe_all(|_| hit_count += 1, |_| {}, || completed = true);
    assert_eq!(hit_count, 100);
    assert!(completed);
  }

  #[test]
  fn from_vec() {
    let mut sum = 0;
    observable::from_iter(vec![1, 2, 3]).subscribe(|v| sum += v);
    assert_eq!(sum, 6);
  }
}
