//! Bridge from push-based observables to `futures::Stream`.
//!
//! The adapter buffers signals behind a mutex and wakes the task that last
//! polled it. The source is subscribed lazily on first poll, so building the
//! stream is free and the subscription lives on the polling task's side.

use std::{
  collections::VecDeque,
  pin::Pin,
  sync::{Arc, Mutex},
  task::{Context, Poll, Waker},
};

use futures::stream::Stream;

use crate::{
  observable::Observable, observer::Observer, subscription::SubscriptionLike,
};

pub struct ObservableStream<S, Item, Err> {
  source: Option<S>,
  state: Arc<Mutex<StreamState<Item, Err>>>,
  subscription: Option<Box<dyn SubscriptionLike + Send>>,
}

impl<S, Item, Err> ObservableStream<S, Item, Err> {
  pub(crate) fn new(source: S) -> Self {
    ObservableStream {
      source: Some(source),
      state: Arc::new(Mutex::new(StreamState::new())),
      subscription: None,
    }
  }
}

struct StreamState<Item, Err> {
  buffer: VecDeque<Result<Item, Err>>,
  done: bool,
  waker: Option<Waker>,
}

impl<Item, Err> StreamState<Item, Err> {
  fn new() -> Self {
    StreamState { buffer: VecDeque::new(), done: false, waker: None }
  }
}

pub struct StreamObserver<Item, Err> {
  state: Arc<Mutex<StreamState<Item, Err>>>,
}

impl<Item, Err> StreamObserver<Item, Err> {
  fn push(&self, event: Option<Result<Item, Err>>) {
    let waker = {
      let mut state = self.state.lock().unwrap();
      match event {
        Some(v) => state.buffer.push_back(v),
        None => state.done = true,
      }
      state.waker.take()
    };
    if let Some(waker) = waker {
      waker.wake();
    }
  }
}

impl<Item, Err> Observer<Item, Err> for StreamObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.push(Some(Ok(value))); }

  fn error(&mut self, err: Err) {
    self.push(Some(Err(err)));
    self.push(None);
  }

  fn complete(&mut self) { self.push(None); }
}

impl<S, Item, Err> Stream for ObservableStream<S, Item, Err>
where
  S: Observable<Item, Err, StreamObserver<Item, Err>> + Unpin,
  S::Unsub: Send + 'static,
{
  type Item = Result<Item, Err>;

  fn poll_next(
    self: Pin<&mut Self>,
    cx: &mut Context<'_>,
  ) -> Poll<Option<Self::Item>> {
    let this = self.get_mut();
    if let Some(source) = this.source.take() {
      let observer = StreamObserver { state: this.state.clone() };
      this.subscription = Some(Box::new(source.actual_subscribe(observer)));
    }
    let mut state = this.state.lock().unwrap();
    if let Some(event) = state.buffer.pop_front() {
      return Poll::Ready(Some(event));
    }
    if state.done {
      return Poll::Ready(None);
    }
    state.waker = Some(cx.waker().clone());
    Poll::Pending
  }
}

impl<S, Item, Err> Drop for ObservableStream<S, Item, Err> {
  fn drop(&mut self) {
    if let Some(mut subscription) = self.subscription.take() {
      subscription.unsubscribe();
    }
  }
}

#[cfg(test)]
mod test {
  use futures::{executor::block_on, StreamExt};

  use crate::prelude::*;

  #[test]
  fn drains_a_finite_source() {
    let collected: Vec<_> =
      block_on(observable::from_iter::<_, ()>(0..4).into_stream().collect());
    assert_eq!(collected, vec![Ok(0), Ok(1), Ok(2), Ok(3)]);
  }

  #[test]
  fn error_ends_the_stream() {
    let collected: Vec<_> =
      block_on(observable::throw::<i32, _>("late").into_stream().collect());
    assert_eq!(collected, vec![Err("late")]);
  }

  #[test]
  fn live_subject_values_flow_through() {
    let mut subject = Subject::<i32, ()>::new();
    let mut stream = subject.clone().into_stream();
    block_on(async {
      // subscribe by polling once; the subject has no buffered values yet
      futures::future::poll_fn(|cx| {
        use futures::Stream;
        match std::pin::Pin::new(&mut stream).poll_next(cx) {
          std::task::Poll::Pending => std::task::Poll::Ready(()),
          other => panic!("expected pending, got {other:?}"),
        }
      })
      .await;
      subject.next(9);
      subject.complete();
      assert_eq!(stream.next().await, Some(Ok(9)));
      assert_eq!(stream.next().await, None);
    });
  }
}
