//! Drives plugin coroutines to completion against one [`Engine`].
//!
//! Grounded on `nssct.controller.Controller`. A plugin is any `async fn`
//! that walks the engine and reports through a [`Collector`]; rustc's
//! generated state machine is this crate's realization of the cooperative
//! coroutine driver. Because every suspension this
//! model ever performs resolves synchronously inside [`Engine::step`], the
//! controller drives plugins by repolling them once after each step rather
//! than through a real waker-based executor (see [`crate::future`]).

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::error::Error;
use crate::report::{Alert, Collector, Severity};
use crate::Engine;

type PluginFuture = Pin<Box<dyn Future<Output = Result<(), Error>>>>;

struct Pending {
    name: String,
    future: PluginFuture,
}

/// Owns one engine and the set of plugin coroutines running against it.
///
/// `E` may be a concrete engine type or `dyn Engine`, so a binary can pick
/// its engine stack (plain/cached/bulk) at runtime behind one `Rc<dyn
/// Engine>`.
pub struct Controller<E: ?Sized> {
    engine: Rc<E>,
    collector: Collector,
    pending: Vec<Pending>,
}

impl<E: Engine> Controller<E> {
    /// Build a controller around `engine`, reporting into `collector`.
    pub fn new(engine: E, collector: Collector) -> Self {
        Self::from_rc(Rc::new(engine), collector)
    }
}

impl<E: Engine + ?Sized> Controller<E> {
    /// Build a controller around an already-shared engine, e.g. a
    /// `Rc<dyn Engine>` chosen at runtime.
    pub fn from_rc(engine: Rc<E>, collector: Collector) -> Self {
        Controller {
            engine,
            collector,
            pending: Vec::new(),
        }
    }

    /// A handle plugins can use to issue `get`/`get_next` queries.
    pub fn engine(&self) -> Rc<E> {
        Rc::clone(&self.engine)
    }

    /// The alert sink plugins report into.
    pub fn collector(&self) -> Collector {
        self.collector.clone()
    }

    fn poll_once(future: &mut PluginFuture) -> Poll<Result<(), Error>> {
        let waker = Waker::noop();
        let mut cx = Context::from_waker(waker);
        future.as_mut().poll(&mut cx)
    }

    /// Construct and immediately poll one plugin once, so any failure that
    /// does not need the engine to turn at all is captured right away.
    /// Plugins that do not finish on the first poll are tracked until
    /// `run` completes or detects a stall.
    pub fn start_plugin(
        &mut self,
        name: impl Into<String>,
        future: impl Future<Output = Result<(), Error>> + 'static,
    ) {
        let name = name.into();
        let mut future: PluginFuture = Box::pin(future);
        match Self::poll_once(&mut future) {
            Poll::Ready(Ok(())) => {}
            Poll::Ready(Err(e)) => self.fail(&name, &e),
            Poll::Pending => self.pending.push(Pending { name, future }),
        }
    }

    fn fail(&self, name: &str, err: &Error) {
        tracing::debug!(plugin = name, error = %err, "plugin failed");
        self.collector
            .add_alert(Alert::new(Severity::Critical, format!("{name}: {err}")));
    }

    /// Run every started plugin to completion, alternating `engine.step()`
    /// with a repoll pass over still-pending plugins, until none remain.
    ///
    /// The stall check happens *after* the repoll pass: a plugin resuming
    /// during repoll may enqueue a follow-up query, and that new work must
    /// count as progress even though it postdates the `step()` call that
    /// unblocked it. Checking `engine.step()`'s return value instead (before
    /// repolling) would declare a stall on any multi-query plugin whose
    /// engine only discovers the next query after the first completes.
    pub fn run(&mut self) {
        while !self.pending.is_empty() {
            self.engine.step();

            let mut still_pending = Vec::with_capacity(self.pending.len());
            for mut p in std::mem::take(&mut self.pending) {
                match Self::poll_once(&mut p.future) {
                    Poll::Ready(Ok(())) => {}
                    Poll::Ready(Err(e)) => self.fail(&p.name, &e),
                    Poll::Pending => still_pending.push(p),
                }
            }
            self.pending = still_pending;

            if !self.pending.is_empty() && !self.engine.has_work() {
                for p in self.pending.drain(..) {
                    tracing::warn!(plugin = %p.name, "stalled waiting on the engine");
                    self.collector.add_alert(Alert::new(
                        Severity::Critical,
                        format!("{}: stalled waiting on the engine", p.name),
                    ));
                }
                return;
            }
        }
    }
}
