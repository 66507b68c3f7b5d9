use std::sync::{Condvar, Mutex};

/// Many-to-one rendezvous: each worker signals once per round, one
/// coordinator waits for all of them.
///
/// The count resets to zero when the wait returns, so the same instance is
/// reused round after round without rearming. Only workers dispatched in
/// the current round may signal; a stray extra signal would leave the count
/// above the target and deadlock the next wait.
pub struct Rendezvous {
    done: Mutex<usize>,
    cond: Condvar,
    target: usize,
}

impl Rendezvous {
    pub fn new(target: usize) -> Self {
        Rendezvous {
            done: Mutex::new(0),
            cond: Condvar::new(),
            target,
        }
    }

    /// Called by a worker when its share of the round is finished.
    pub fn signal_done(&self) {
        let mut needs_notification = false;
        {
            let mut done = self.done.lock().unwrap();
            *done += 1;
            if *done == self.target {
                needs_notification = true;
            }
        }
        if needs_notification {
            self.cond.notify_one();
        }
    }

    /// Blocks until every worker has signalled, then resets the count.
    ///
    /// Single-caller: at most one coordinator waits at a time. A fresh lock
    /// is taken on every call.
    pub fn wait_for_all_done(&self) {
        let mut done = self.done.lock().unwrap();
        while *done != self.target {
            done = self.cond.wait(done).unwrap();
        }
        *done = 0;
    }
}
