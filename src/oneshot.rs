//! One-shot transfer of a value or a captured failure between two threads.
//!
//! A `Promise` is the write end, a `Future` the read end; both share one
//! result cell. The cell starts empty and transitions exactly once, to a
//! value or to a failure, releasing a ready signal the consumer can block
//! on or poll.

use std::any::Any;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

/// A failure captured on the producer's thread, transportable across
/// threads and re-raised on the consumer's.
pub type Failure = Box<dyn Any + Send + 'static>;

enum State<T> {
    Empty,
    Value(T),
    Failure(Failure),
}

/// Shared single-writer single-reader slot. The unit case needs nothing
/// special: `State<()>` already collapses to done-or-failure.
struct ResultCell<T> {
    state: Mutex<State<T>>,
    ready_cond: Condvar,
    // Lock-free mirror of "state is no longer empty" for polling.
    ready: AtomicBool,
}

impl<T> ResultCell<T> {
    fn new() -> Self {
        ResultCell {
            state: Mutex::new(State::Empty),
            ready_cond: Condvar::new(),
            ready: AtomicBool::new(false),
        }
    }

    // First writer wins; anything after that is dropped.
    fn fulfil(&self, outcome: State<T>) {
        {
            let mut state = self.state.lock().unwrap();
            if !matches!(*state, State::Empty) {
                return;
            }
            *state = outcome;
            self.ready.store(true, Ordering::Release);
        }
        self.ready_cond.notify_all();
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn take(&self) -> T {
        let mut state = self.state.lock().unwrap();
        while matches!(*state, State::Empty) {
            state = self.ready_cond.wait(state).unwrap();
        }
        match std::mem::replace(&mut *state, State::Empty) {
            State::Value(value) => value,
            State::Failure(failure) => {
                drop(state);
                panic::resume_unwind(failure);
            }
            State::Empty => unreachable!(),
        }
    }
}

/// Write end. Movable, not clonable; setting twice is a caller-visible
/// no-op (the first write wins).
pub struct Promise<T> {
    cell: Arc<ResultCell<T>>,
    future_issued: bool,
}

impl<T> Promise<T> {
    pub fn new() -> Self {
        Promise {
            cell: Arc::new(ResultCell::new()),
            future_issued: false,
        }
    }

    pub fn set(&self, value: T) {
        self.cell.fulfil(State::Value(value));
    }

    pub fn fail(&self, failure: Failure) {
        self.cell.fulfil(State::Failure(failure));
    }

    /// Issues the read end. At most one future exists per promise.
    pub fn future(&mut self) -> Future<T> {
        assert!(
            !self.future_issued,
            "a future was already issued for this promise"
        );
        self.future_issued = true;
        Future {
            cell: self.cell.clone(),
        }
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Promise::new()
    }
}

/// Read end. Consuming `get` makes a second retrieval unrepresentable.
pub struct Future<T> {
    cell: Arc<ResultCell<T>>,
}

impl<T> Future<T> {
    /// Blocks until the cell is fulfilled, then returns the value by move
    /// or re-raises the captured failure on this thread.
    pub fn get(self) -> T {
        self.cell.take()
    }

    /// Non-destructive readiness query.
    pub fn ready(&self) -> bool {
        self.cell.is_ready()
    }
}
