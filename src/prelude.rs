//! Prelude module for convenient imports
//!
//! Re-exports the types and traits needed for everyday use of the crate.

pub use crate::joins::*;
pub use crate::notification::Notification;
pub use crate::observable;
pub use crate::observable::{
  Observable, ObservableExt, ObserverAll, ObserverItem, SubscribeAll,
  SubscribeNext,
};
pub use crate::observer::Observer;
pub use crate::ops::dematerialize::Dematerialize;
pub use crate::rc::{MutArc, RcDeref, RcDerefMut};
pub use crate::subject::Subject;
pub use crate::subscriber::Subscriber;
pub use crate::subscription::{
  Publisher, SharedSubscription, SingleSubscription, SubscriptionGuard,
  SubscriptionLike, SubscriptionWrapper,
};
pub use crate::type_hint::TypeHint;
