//! End-to-end behavior of the join-pattern engine.

use std::{
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  },
  thread,
};

use conflux::prelude::*;

struct Probe<Item, Err> {
  next: Arc<Mutex<Vec<Item>>>,
  errors: Arc<Mutex<Vec<Err>>>,
  completes: Arc<AtomicUsize>,
}

impl<Item, Err> Default for Probe<Item, Err> {
  fn default() -> Self {
    Probe {
      next: Arc::new(Mutex::new(Vec::new())),
      errors: Arc::new(Mutex::new(Vec::new())),
      completes: Arc::new(AtomicUsize::new(0)),
    }
  }
}

impl<Item: Send + 'static, Err: Send + 'static> Probe<Item, Err> {
  /// Subscribes the probe to `source` and keeps the subscription alive.
  fn watch(
    &self,
    source: When<Item, Err>,
  ) -> SubscriptionWrapper<SharedSubscription> {
    let next = self.next.clone();
    let errors = self.errors.clone();
    let completes = self.completes.clone();
    source.subscribe_all(
      move |v| next.lock().unwrap().push(v),
      move |e| errors.lock().unwrap().push(e),
      move || {
        completes.fetch_add(1, Ordering::SeqCst);
      },
    )
  }

  fn values(&self) -> Vec<Item>
  where
    Item: Clone,
  {
    self.next.lock().unwrap().clone()
  }

  fn error_count(&self) -> usize { self.errors.lock().unwrap().len() }

  fn complete_count(&self) -> usize { self.completes.load(Ordering::SeqCst) }
}

/// Two plans sharing a stream never observe the same value twice: once a
/// match consumes it, the other plan has to wait for the next one.
#[test]
fn shared_queue_consumes_each_value_once() {
  let mut x = Subject::<i32, ()>::new();
  let mut y = Subject::<i32, ()>::new();
  let mut z = Subject::<i32, ()>::new();

  let xsrc = x.clone().join_source();
  let plan_a = xsrc
    .clone()
    .and(y.clone().join_source())
    .then(|x, y| format!("a:{x}:{y}"));
  let plan_b = xsrc
    .and(z.clone().join_source())
    .then(|x, z| format!("b:{x}:{z}"));

  let probe = Probe::default();
  let _sub = probe.watch(when([plan_a, plan_b]));

  x.next(1);
  assert!(probe.values().is_empty());
  y.next(10); // plan A fires, consuming x's 1
  assert_eq!(probe.values(), vec!["a:1:10".to_string()]);
  z.next(100); // plan B must NOT reuse the consumed 1
  assert_eq!(probe.values(), vec!["a:1:10".to_string()]);
  x.next(2); // now plan B gets its partner
  assert_eq!(
    probe.values(),
    vec!["a:1:10".to_string(), "b:2:100".to_string()]
  );
}

/// Values of one stream are matched strictly in production order.
#[test]
fn values_pair_in_fifo_order() {
  let mut x = Subject::<i32, ()>::new();
  let mut y = Subject::<char, ()>::new();

  let plan = x
    .clone()
    .join_source()
    .and(y.clone().join_source())
    .then(|n, c| (n, c));
  let probe = Probe::default();
  let _sub = probe.watch(when([plan]));

  x.next(1);
  x.next(2);
  x.next(3);
  y.next('a');
  y.next('b');
  y.next('c');
  assert_eq!(probe.values(), vec![(1, 'a'), (2, 'b'), (3, 'c')]);
}

/// A plan holds its fire until every stream has buffered a value, no matter
/// how much one side gets ahead.
#[test]
fn no_match_until_every_stream_is_ready() {
  let mut x = Subject::<i32, ()>::new();
  let y = Subject::<i32, ()>::new();

  let plan = x
    .clone()
    .join_source()
    .and(y.clone().join_source())
    .then(|a, b| a + b);
  let probe = Probe::default();
  let _sub = probe.watch(when([plan]));

  for i in 0..5 {
    x.next(i);
  }
  assert!(probe.values().is_empty());
  assert_eq!(probe.complete_count(), 0);
}

/// A completion notification stays at the head of its queue as a sentinel,
/// so every plan sharing that queue observes it; the combined stream
/// completes exactly once, after every plan has.
#[test]
fn completion_sentinel_reaches_every_plan() {
  let mut x = Subject::<i32, ()>::new();
  let mut y = Subject::<i32, ()>::new();
  let mut z = Subject::<i32, ()>::new();

  let xsrc = x.clone().join_source();
  let plan_a = xsrc.clone().and(y.clone().join_source()).then(|a, b| a + b);
  let plan_b = xsrc.and(z.clone().join_source()).then(|a, b| a + b);

  let probe = Probe::default();
  let _sub = probe.watch(when([plan_a, plan_b]));

  // both plans have a pending partner value when x completes
  y.next(1);
  z.next(2);
  x.complete();
  assert!(probe.values().is_empty());
  assert_eq!(probe.complete_count(), 1);
}

/// One failing selector is fatal to the whole session, even while another
/// plan has matchable values queued up.
#[test]
fn selector_error_terminates_the_session() {
  let mut a = Subject::<i32, &str>::new();
  let mut b = Subject::<i32, &str>::new();
  let mut c = Subject::<i32, &str>::new();
  let mut d = Subject::<i32, &str>::new();

  let failing = a
    .clone()
    .join_source()
    .and(b.clone().join_source())
    .then_result(|_, _| Err("selector gave up"));
  let healthy = c
    .clone()
    .join_source()
    .and(d.clone().join_source())
    .then_result(|x, y| Ok(x + y));

  let probe = Probe::default();
  let _sub = probe.watch(when([failing, healthy]));

  c.next(1); // healthy plan is half ready
  a.next(1);
  b.next(1); // failing plan matches and errors the session
  assert_eq!(probe.error_count(), 1);
  d.next(1); // would have completed the healthy match
  assert!(probe.values().is_empty());
  assert_eq!(probe.error_count(), 1);
  assert_eq!(probe.complete_count(), 0);
}

/// Disposing the combined subscription twice behaves like disposing once.
#[test]
fn disposal_is_idempotent() {
  let mut x = Subject::<i32, ()>::new();
  let mut y = Subject::<i32, ()>::new();

  let plan = x
    .clone()
    .join_source()
    .and(y.clone().join_source())
    .then(|a, b| a + b);
  let probe = Probe::default();
  let mut sub = probe.watch(when([plan]));

  x.next(1);
  sub.unsubscribe();
  sub.unsubscribe();
  y.next(2);
  assert!(probe.values().is_empty());
  assert_eq!(probe.error_count(), 0);
  assert_eq!(probe.complete_count(), 0);
}

/// Independent producer threads drive one pattern; every pair is matched
/// exactly once and each side is consumed in FIFO order.
#[test]
fn concurrent_producers_pair_exactly_once() {
  const N: i32 = 200;

  let x = Subject::<i32, ()>::new();
  let y = Subject::<i32, ()>::new();

  let plan = x
    .clone()
    .join_source()
    .and(y.clone().join_source())
    .then(|a, b| (a, b));
  let probe = Probe::default();
  let _sub = probe.watch(when([plan]));

  let tx = thread::spawn({
    let mut x = x.clone();
    move || {
      for i in 0..N {
        x.next(i);
      }
    }
  });
  let ty = thread::spawn({
    let mut y = y.clone();
    move || {
      for i in 0..N {
        y.next(1000 + i);
      }
    }
  });
  tx.join().unwrap();
  ty.join().unwrap();

  let values = probe.values();
  assert_eq!(values.len(), N as usize);
  for (i, (a, b)) in values.iter().enumerate() {
    assert_eq!(*a, i as i32);
    assert_eq!(*b, 1000 + i as i32);
  }
}

/// Cloning one `JoinSource` into several plans shares a single underlying
/// subscription; wrapping the source twice does not.
#[test]
fn shared_join_source_subscribes_once() {
  #[derive(Clone)]
  struct Counted {
    subject: Subject<i32, ()>,
    subscribed: Arc<AtomicUsize>,
  }

  impl<O> Observable<i32, (), O> for Counted
  where
    O: Observer<i32, ()> + Send + 'static,
  {
    type Unsub = SharedSubscription;

    fn actual_subscribe(self, observer: O) -> Self::Unsub {
      self.subscribed.fetch_add(1, Ordering::SeqCst);
      self.subject.actual_subscribe(observer)
    }
  }

  let counted = Counted {
    subject: Subject::new(),
    subscribed: Arc::new(AtomicUsize::new(0)),
  };
  let y = Subject::<i32, ()>::new();
  let z = Subject::<i32, ()>::new();

  let shared = JoinSource::new(counted.clone());
  let plan_a = shared.clone().and(y.clone().join_source()).then(|a, b| a + b);
  let plan_b = shared.and(z.clone().join_source()).then(|a, b| a + b);
  let probe = Probe::default();
  let _sub = probe.watch(when([plan_a, plan_b]));
  assert_eq!(counted.subscribed.load(Ordering::SeqCst), 1);

  // two independent wraps are two identities, hence two subscriptions
  let plan_c = JoinSource::new(counted.clone())
    .and(y.clone().join_source())
    .then(|a, b| a + b);
  let plan_d = JoinSource::new(counted.clone())
    .and(z.clone().join_source())
    .then(|a, b| a + b);
  let probe2 = Probe::default();
  let _sub2 = probe2.watch(when([plan_c, plan_d]));
  assert_eq!(counted.subscribed.load(Ordering::SeqCst), 3);
}

/// A pattern may bind the same stream at two positions; consecutive values
/// pair up positionally.
#[test]
fn same_stream_twice_pairs_consecutive_values() {
  let mut x = Subject::<i32, ()>::new();

  let xsrc = x.clone().join_source();
  let plan = xsrc.clone().and(xsrc).then(|a, b| (a, b));
  let probe = Probe::default();
  let _sub = probe.watch(when([plan]));

  x.next(1);
  assert!(probe.values().is_empty());
  x.next(2);
  assert_eq!(probe.values(), vec![(1, 2)]);
  x.next(3);
  x.next(4);
  assert_eq!(probe.values(), vec![(1, 2), (3, 4)]);
}

/// The worked scenario: A = [1, 2], B = ["x", "y"], selector appends.
#[test]
fn interleaved_scenario() {
  let mut a = Subject::<i32, ()>::new();
  let mut b = Subject::<&str, ()>::new();

  let plan = a
    .clone()
    .join_source()
    .and(b.clone().join_source())
    .then(|n, s| format!("{s}{n}"));
  let probe = Probe::default();
  let _sub = probe.watch(when([plan]));

  a.next(1);
  b.next("x");
  a.next(2);
  b.next("y");
  assert_eq!(probe.values(), vec!["x1".to_string(), "y2".to_string()]);
  assert_eq!(probe.complete_count(), 0);

  a.complete();
  b.complete();
  assert_eq!(probe.complete_count(), 1);
  assert_eq!(probe.error_count(), 0);
}

/// A source error is escalated unbuffered: it does not wait for partners
/// and tears the whole session down.
#[test]
fn source_error_preempts_matching() {
  let mut x = Subject::<i32, String>::new();
  let mut y = Subject::<i32, String>::new();

  let plan = x
    .clone()
    .join_source()
    .and(y.clone().join_source())
    .then(|a, b| a + b);
  let probe = Probe::default();
  let _sub = probe.watch(when([plan]));

  y.next(5); // buffered, never consumed
  x.error("wire down".to_string());
  assert_eq!(probe.error_count(), 1);
  assert!(probe.values().is_empty());

  // the session is gone; later values are ignored
  y.next(6);
  assert!(probe.values().is_empty());
  assert_eq!(probe.complete_count(), 0);
}
