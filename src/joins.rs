//! Join patterns: declarative coordination over multiple event streams.
//!
//! A *join pattern* fires a combined callback exactly when every one of a
//! fixed set of source streams has a value available. Patterns are built by
//! chaining [`JoinSource::and`], bound to a result selector with `then` /
//! `then_result` to form a [`Plan`], and one or more plans are run together
//! with [`when`]:
//!
//! ```
//! use conflux::prelude::*;
//!
//! let mut xs = Subject::<i32, ()>::new();
//! let mut ys = Subject::<&str, ()>::new();
//!
//! let plan = xs
//!   .clone()
//!   .join_source()
//!   .and(ys.clone().join_source())
//!   .then(|n, s| format!("{s}{n}"));
//!
//! use std::sync::{Arc, Mutex};
//! let out = Arc::new(Mutex::new(vec![]));
//! let sink = out.clone();
//! when([plan]).subscribe_all(
//!   move |v| sink.lock().unwrap().push(v),
//!   |_| {},
//!   || {},
//! );
//!
//! xs.next(1);
//! assert!(out.lock().unwrap().is_empty()); // ys has nothing yet
//! ys.next("a");
//! assert_eq!(*out.lock().unwrap(), vec!["a1".to_string()]);
//! ```
//!
//! Plans sharing a [`JoinSource`] clone share one buffered observation queue
//! and one underlying subscription; a value consumed by one plan's match is
//! gone for every other plan. All bookkeeping for one `when` subscription is
//! serialized through a single session gate, so producers may deliver from
//! independent threads.

mod active_plan;
mod join_observer;
mod join_source;
mod pattern;
mod plan;
mod when;

pub use join_observer::JoinSubscriber;
pub use join_source::{JoinSource, JoinWire};
pub use pattern::*;
pub use plan::Plan;
pub use when::{when, When};
