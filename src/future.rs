//! A single-assignment result cell with completion callbacks.
//!
//! `QueryFuture<T>` plays the role of `nssct.future.Future`: engines hand
//! one to a plugin immediately, complete it later from inside `step()`, and
//! run any callbacks registered on it — whether they were attached before or
//! after completion — exactly once, synchronously, in registration order.
//!
//! It also implements [`std::future::Future`] directly, so plugin code
//! written as ordinary `async fn`s can simply `.await` the value: rustc's
//! generated state machine *is* this crate's realization of the coroutine
//! driver described by the core's design notes (no generator or stackful
//! coroutine needs to be hand-rolled).
//!
//! Single-threaded only: there is exactly one logical thread of execution
//! so this is built on `Rc`/`RefCell` rather than
//! `Arc`/`Mutex`, and is deliberately not `Send`/`Sync`.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::error::Error;

type DoneCallback<T> = Box<dyn FnOnce(&Result<T, Error>)>;

enum State<T> {
    Pending(Vec<DoneCallback<T>>),
    Done(Result<T, Error>),
}

struct Inner<T> {
    state: State<T>,
}

/// A single-assignment, callback-bearing result cell for one query.
pub struct QueryFuture<T>(Rc<RefCell<Inner<T>>>);

impl<T> Clone for QueryFuture<T> {
    fn clone(&self) -> Self {
        QueryFuture(Rc::clone(&self.0))
    }
}

impl<T: Clone> QueryFuture<T> {
    /// A Future with no result yet.
    pub fn pending() -> Self {
        QueryFuture(Rc::new(RefCell::new(Inner {
            state: State::Pending(Vec::new()),
        })))
    }

    /// An already-fulfilled Future.
    pub fn ready(value: T) -> Self {
        QueryFuture(Rc::new(RefCell::new(Inner {
            state: State::Done(Ok(value)),
        })))
    }

    /// An already-failed Future.
    pub fn failed(err: Error) -> Self {
        QueryFuture(Rc::new(RefCell::new(Inner {
            state: State::Done(Err(err)),
        })))
    }

    /// An already-completed Future from a `Result`.
    pub fn completed(result: Result<T, Error>) -> Self {
        QueryFuture(Rc::new(RefCell::new(Inner {
            state: State::Done(result),
        })))
    }

    /// Whether this Future has reached a terminal state.
    pub fn is_done(&self) -> bool {
        matches!(self.0.borrow().state, State::Done(_))
    }

    /// Transition `pending -> fulfilled`, running queued callbacks.
    ///
    /// # Panics
    ///
    /// Panics if this Future is already terminal; `set_result`/`set_failure`
    /// are each legal only from `pending`.
    pub fn set_result(&self, value: T) {
        self.complete(Ok(value));
    }

    /// Transition `pending -> failed`, running queued callbacks.
    ///
    /// # Panics
    ///
    /// Panics if this Future is already terminal.
    pub fn set_failure(&self, err: Error) {
        self.complete(Err(err));
    }

    fn complete(&self, result: Result<T, Error>) {
        let callbacks = {
            let mut inner = self.0.borrow_mut();
            match std::mem::replace(&mut inner.state, State::Done(result.clone())) {
                State::Pending(cbs) => cbs,
                State::Done(_) => panic!("QueryFuture completed twice"),
            }
        };
        for cb in callbacks {
            cb(&result);
        }
    }

    /// Register a completion callback. If this Future is already terminal,
    /// the callback runs immediately and synchronously; otherwise it is
    /// queued and run (in registration order, alongside any others) when
    /// the Future completes.
    ///
    /// Callback panics are not caught here: engine-internal callbacks (the
    /// only callers) never panic by construction; a panicking callback is a
    /// programming error, not a runtime condition to recover from.
    pub fn on_done(&self, cb: impl FnOnce(&Result<T, Error>) + 'static) {
        let mut inner = self.0.borrow_mut();
        match &mut inner.state {
            State::Done(result) => {
                let result = result.clone();
                drop(inner);
                cb(&result);
            }
            State::Pending(cbs) => cbs.push(Box::new(cb)),
        }
    }

    /// The result, if terminal.
    pub fn result(&self) -> Option<Result<T, Error>> {
        match &self.0.borrow().state {
            State::Done(r) => Some(r.clone()),
            State::Pending(_) => None,
        }
    }
}

impl<T: Clone> Future for QueryFuture<T> {
    type Output = Result<T, Error>;

    /// Level-triggered: does not register the waker. This crate's
    /// controller re-polls every outstanding plugin future once after each
    /// `step()` rather than relying on wake-ups, which is sufficient because
    /// every completion happens synchronously inside `step()` (see
    /// `crate::controller`). A `QueryFuture` must therefore never be
    /// `.await`ed from outside this crate's own poll loop.
    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.result() {
            Some(r) => Poll::Ready(r),
            None => Poll::Pending,
        }
    }
}
