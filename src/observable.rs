mod from_iter;
pub use from_iter::*;
mod of;
pub use of::*;
mod trivial;
pub use trivial::*;
mod observable_all;
pub use observable_all::*;
mod observable_next;
pub use observable_next::*;

use crate::{
  joins::{JoinSource, JoinWire},
  observer::Observer,
  ops::{into_stream::ObservableStream, materialize::MaterializeOp},
  subscription::SubscriptionLike,
};

/// A push-based stream of values over time, parameterized by the observer it
/// accepts. Subscribing consumes the observable; clone (or use a clonable
/// source such as [`Subject`](crate::subject::Subject)) to subscribe again.
pub trait Observable<Item, Err, O: Observer<Item, Err>> {
  type Unsub: SubscriptionLike;

  /// Invokes an execution of this observable, registering the observer for
  /// the signals it will emit.
  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

/// Combinators available on every observable in this crate.
///
/// Implemented explicitly per source type; the methods are pure wrappers, so
/// a single marker impl per type is all that's needed.
pub trait ObservableExt<Item, Err>: Sized {
  /// Reifies `next`/`error`/`complete` into
  /// [`Notification`](crate::notification::Notification) values.
  ///
  /// The materialized stream never errors; a terminal signal arrives as a
  /// final `Notification` value followed by completion.
  fn materialize(self) -> MaterializeOp<Self> {
    MaterializeOp { source: self }
  }

  /// Adapts this observable into a [`futures::Stream`] of
  /// `Result<Item, Err>` items. The source is subscribed on first poll.
  fn into_stream(self) -> ObservableStream<Self, Item, Err> {
    ObservableStream::new(self)
  }

  /// Wraps this observable as a join-pattern source with a fresh identity.
  ///
  /// Clone the returned handle to make several patterns share one
  /// underlying subscription; wrapping the same observable twice yields two
  /// independent identities.
  fn join_source(self) -> JoinSource<Item, Err>
  where
    Self: Observable<Item, Err, JoinWire<Item, Err>> + Clone + Send + 'static,
    <Self as Observable<Item, Err, JoinWire<Item, Err>>>::Unsub:
      Send + 'static,
    Item: Send + 'static,
    Err: Send + 'static,
  {
    JoinSource::new(self)
  }
}
