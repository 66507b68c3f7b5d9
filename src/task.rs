//! A callable bound to a promise: invoking the task runs the captured
//! closure inside a failure guard and fulfils the promise either way.

use std::panic::{self, AssertUnwindSafe};

use crate::oneshot::{Future, Promise};

/// Move-only, one-shot. Invocation consumes the task, so a second call is
/// unrepresentable; arguments are captured by value at construction.
pub struct PackagedTask {
    job: Box<dyn FnOnce() + Send>,
}

impl PackagedTask {
    /// Packages `f` with a fresh promise and returns the task together
    /// with the future observing its outcome.
    pub fn new<F, R>(f: F) -> (PackagedTask, Future<R>)
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let mut promise = Promise::new();
        let future = promise.future();

        let job = Box::new(move || {
            match panic::catch_unwind(AssertUnwindSafe(f)) {
                Ok(value) => promise.set(value),
                Err(failure) => promise.fail(failure),
            }
        });

        (PackagedTask { job }, future)
    }

    /// Runs the closure and fulfils the bound promise. Never unwinds: a
    /// failing closure is captured into the future instead.
    pub fn invoke(self) {
        (self.job)();
    }
}
