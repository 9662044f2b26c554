//! The typed pattern surface.
//!
//! `JoinSource::and` chains sources into `Pattern2..Pattern16`; `then` /
//! `then_result` bind a positional selector and erase the pattern into a
//! runtime [`Plan`]. Arity is capped at 16 positional arguments, which is
//! where ergonomics of positional selectors give out; the runtime engine
//! itself has no cap.

use smallvec::{smallvec, SmallVec};

use super::{
  active_plan::MatchValues,
  join_source::{ErasedJoinSource, JoinSource},
  plan::{unbox_next, Plan},
};

impl<T1, Err> JoinSource<T1, Err>
where
  T1: Send + 'static,
  Err: Send + 'static,
{
  /// Requires a value from `other` as well, extending the pattern.
  pub fn and<T2>(self, other: JoinSource<T2, Err>) -> Pattern2<T1, T2, Err>
  where
    T2: Send + 'static,
  {
    Pattern2 { sources: (self, other) }
  }

  /// Binds a selector over this single stream, producing a [`Plan`].
  pub fn then<Item, F>(self, mut selector: F) -> Plan<Item, Err>
  where
    F: FnMut(T1) -> Item + Send + 'static,
    Item: Send + 'static,
  {
    self.then_result(move |v| Ok(selector(v)))
  }

  /// Binds a fallible selector; returning `Err` terminates the whole join
  /// session.
  pub fn then_result<Item, F>(self, mut selector: F) -> Plan<Item, Err>
  where
    F: FnMut(T1) -> Result<Item, Err> + Send + 'static,
    Item: Send + 'static,
  {
    let sources: SmallVec<[ErasedJoinSource<Err>; 4]> =
      smallvec![self.inner];
    Plan {
      sources,
      selector: Box::new(move |values: MatchValues| {
        let mut values = values.into_iter();
        let v1 = unbox_next::<T1>(&mut values);
        selector(v1)
      }),
    }
  }
}

macro_rules! join_pattern {
  (
    $pattern: ident, ($($T: ident),+), ($($v: ident),+),
    and -> $next: ident, $Tn: ident
  ) => {
    join_pattern!($pattern, ($($T),+), ($($v),+));

    impl<$($T,)+ Err> $pattern<$($T,)+ Err>
    where
      $($T: Send + 'static,)+
      Err: Send + 'static,
    {
      /// Requires a value from `other` as well, extending the pattern.
      pub fn and<$Tn>(
        self,
        other: JoinSource<$Tn, Err>,
      ) -> $next<$($T,)+ $Tn, Err>
      where
        $Tn: Send + 'static,
      {
        let ($($v,)+) = self.sources;
        $next { sources: ($($v,)+ other) }
      }
    }
  };
  (
    $pattern: ident, ($($T: ident),+), ($($v: ident),+)
  ) => {
    /// A join pattern: an ordered tuple of stream handles that must all
    /// produce a value for a match to fire.
    pub struct $pattern<$($T,)+ Err> {
      pub(crate) sources: ($(JoinSource<$T, Err>,)+),
    }

    impl<$($T,)+ Err> $pattern<$($T,)+ Err>
    where
      $($T: Send + 'static,)+
      Err: Send + 'static,
    {
      /// Binds a positional selector, producing a [`Plan`].
      pub fn then<Item, F>(self, mut selector: F) -> Plan<Item, Err>
      where
        F: FnMut($($T),+) -> Item + Send + 'static,
        Item: Send + 'static,
      {
        self.then_result(move |$($v),+| Ok(selector($($v),+)))
      }

      /// Binds a fallible positional selector; returning `Err` terminates
      /// the whole join session.
      pub fn then_result<Item, F>(self, mut selector: F) -> Plan<Item, Err>
      where
        F: FnMut($($T),+) -> Result<Item, Err> + Send + 'static,
        Item: Send + 'static,
      {
        let ($($v,)+) = self.sources;
        let sources: SmallVec<[ErasedJoinSource<Err>; 4]> =
          smallvec![$($v.inner),+];
        Plan {
          sources,
          selector: Box::new(move |values: MatchValues| {
            let mut values = values.into_iter();
            $(let $v = unbox_next::<$T>(&mut values);)+
            selector($($v),+)
          }),
        }
      }
    }
  };
}

join_pattern!(Pattern2, (T1, T2), (s1, s2), and -> Pattern3, T3);
join_pattern!(Pattern3, (T1, T2, T3), (s1, s2, s3), and -> Pattern4, T4);
join_pattern!(Pattern4, (T1, T2, T3, T4), (s1, s2, s3, s4),
  and -> Pattern5, T5);
join_pattern!(Pattern5, (T1, T2, T3, T4, T5), (s1, s2, s3, s4, s5),
  and -> Pattern6, T6);
join_pattern!(Pattern6, (T1, T2, T3, T4, T5, T6), (s1, s2, s3, s4, s5, s6),
  and -> Pattern7, T7);
join_pattern!(Pattern7, (T1, T2, T3, T4, T5, T6, T7),
  (s1, s2, s3, s4, s5, s6, s7), and -> Pattern8, T8);
join_pattern!(Pattern8, (T1, T2, T3, T4, T5, T6, T7, T8),
  (s1, s2, s3, s4, s5, s6, s7, s8), and -> Pattern9, T9);
join_pattern!(Pattern9, (T1, T2, T3, T4, T5, T6, T7, T8, T9),
  (s1, s2, s3, s4, s5, s6, s7, s8, s9), and -> Pattern10, T10);
join_pattern!(Pattern10, (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10),
  (s1, s2, s3, s4, s5, s6, s7, s8, s9, s10), and -> Pattern11, T11);
join_pattern!(Pattern11, (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11),
  (s1, s2, s3, s4, s5, s6, s7, s8, s9, s10, s11), and -> Pattern12, T12);
join_pattern!(Pattern12, (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12),
  (s1, s2, s3, s4, s5, s6, s7, s8, s9, s10, s11, s12), and -> Pattern13, T13);
join_pattern!(Pattern13,
  (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13),
  (s1, s2, s3, s4, s5, s6, s7, s8, s9, s10, s11, s12, s13),
  and -> Pattern14, T14);
join_pattern!(Pattern14,
  (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14),
  (s1, s2, s3, s4, s5, s6, s7, s8, s9, s10, s11, s12, s13, s14),
  and -> Pattern15, T15);
join_pattern!(Pattern15,
  (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15),
  (s1, s2, s3, s4, s5, s6, s7, s8, s9, s10, s11, s12, s13, s14, s15),
  and -> Pattern16, T16);
join_pattern!(Pattern16,
  (T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15, T16),
  (s1, s2, s3, s4, s5, s6, s7, s8, s9, s10, s11, s12, s13, s14, s15, s16));
