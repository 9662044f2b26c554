//! # conflux: join-pattern reactive event streams
//!
//! A reactive stream library whose centerpiece is the *join-pattern engine*:
//! declare that a result should be produced whenever every one of a set of
//! independent streams has a value available, and let the engine fire your
//! selector exactly once per such match — thread-safely, FIFO per stream,
//! with no value consumed twice and none skipped.
//!
//! ```
//! use conflux::prelude::*;
//!
//! let mut prices = Subject::<f64, ()>::new();
//! let mut orders = Subject::<u32, ()>::new();
//!
//! let fills = prices
//!   .clone()
//!   .join_source()
//!   .and(orders.clone().join_source())
//!   .then(|price, quantity| price * quantity as f64);
//!
//! use std::sync::{Arc, Mutex};
//! let total = Arc::new(Mutex::new(0.0));
//! let sink = total.clone();
//! // values pair up positionally, in arrival order per stream
//! when([fills]).subscribe_all(
//!   move |v| *sink.lock().unwrap() += v,
//!   |_| {},
//!   || {},
//! );
//!
//! prices.next(2.0);
//! orders.next(3); // fires: 6.0
//! assert_eq!(*total.lock().unwrap(), 6.0);
//! ```
//!
//! | Concept | Type |
//! |---------|------|
//! | Event source | [`Subject`](subject::Subject), [`observable`] constructors |
//! | Pattern over N streams | [`JoinSource::and`](joins::JoinSource) chains |
//! | Pattern + selector | [`Plan`](joins::Plan) |
//! | Combined stream | [`when`](joins::when) |
//!
//! Signals are the classic reactive trio — `next*, (error | complete)?` —
//! and the combined stream honors the same contract: exactly one terminal
//! signal, after which nothing more is emitted.

pub mod joins;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod subject;
pub mod subscriber;
pub mod subscription;
pub mod type_hint;

pub use prelude::*;
