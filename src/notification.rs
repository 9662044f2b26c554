/// The materialized form of a stream signal.
///
/// `materialize` reifies the three observer callbacks into ordinary values so
/// they can be buffered, inspected and replayed. The join engine leans on
/// this: every per-stream observation queue buffers `Notification`s rather
/// than acting on signals the moment they arrive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification<Item, Err> {
  /// A value produced by the stream.
  Next(Item),
  /// The stream failed; terminal.
  Error(Err),
  /// The stream finished; terminal.
  Completed,
}

impl<Item, Err> Notification<Item, Err> {
  #[inline]
  pub fn is_next(&self) -> bool { matches!(self, Notification::Next(_)) }

  #[inline]
  pub fn is_error(&self) -> bool { matches!(self, Notification::Error(_)) }

  #[inline]
  pub fn is_completed(&self) -> bool { matches!(self, Notification::Completed) }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn predicates() {
    let n: Notification<i32, ()> = Notification::Next(1);
    assert!(n.is_next() && !n.is_error() && !n.is_completed());
    let e: Notification<i32, &str> = Notification::Error("oops");
    assert!(e.is_error());
    let c: Notification<i32, ()> = Notification::Completed;
    assert!(c.is_completed());
  }
}
