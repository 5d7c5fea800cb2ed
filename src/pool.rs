//! Fixed-size thread pool with `submit`/`wait_all` semantics.
//!
//! Grounded on `examples/original_source/Hax/threadpool.h`: a slot array,
//! one `Mutex` + `Condvar` pair, and the discipline that `submit` holds the
//! mutex across both the "wait for a free slot" and "pick the first idle
//! slot" steps — the spec calls this out explicitly as the reason the
//! design is race-free despite a single broadcast condvar.
//!
//! The teacher crate (a single-threaded Go engine) has no pool of its own;
//! this module is std-only (`std::thread`, `std::sync::{Mutex, Condvar}`)
//! rather than reaching for a runtime crate like `rayon`, since the
//! original's bounded "N in flight" gate doesn't need one.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

/// Error returned when a worker thread fails to spawn.
#[derive(Debug)]
pub struct PoolError(pub std::io::Error);

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to spawn worker thread: {}", self.0)
    }
}

impl std::error::Error for PoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

struct Slot {
    active: bool,
    handle: Option<JoinHandle<()>>,
}

/// A pool of `n_threads` slots. `submit` blocks until a slot is free, then
/// runs the task on a fresh OS thread in that slot. `wait_all` joins every
/// outstanding thread.
pub struct Pool {
    slots: Arc<Mutex<Vec<Slot>>>,
    cv: Arc<Condvar>,
}

impl Pool {
    pub fn new(n_threads: usize) -> Self {
        let slots = (0..n_threads)
            .map(|_| Slot {
                active: false,
                handle: None,
            })
            .collect();
        Pool {
            slots: Arc::new(Mutex::new(slots)),
            cv: Arc::new(Condvar::new()),
        }
    }

    pub fn num_active(&self) -> usize {
        self.slots.lock().unwrap().iter().filter(|s| s.active).count()
    }

    /// Run `task` on the first free slot, blocking until one is available.
    pub fn submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slots = self.slots.lock().unwrap();
        loop {
            if let Some(idx) = slots.iter().position(|s| !s.active) {
                if let Some(handle) = slots[idx].handle.take() {
                    // Previous occupant of this slot has already signalled
                    // `active = false`; joining it here cannot block.
                    let _ = handle.join();
                }

                let slots_for_thread = Arc::clone(&self.slots);
                let cv_for_thread = Arc::clone(&self.cv);
                let spawned = std::thread::Builder::new().spawn(move || {
                    task();
                    let mut slots = slots_for_thread.lock().unwrap();
                    slots[idx].active = false;
                    cv_for_thread.notify_one();
                });

                match spawned {
                    Ok(handle) => {
                        slots[idx].active = true;
                        slots[idx].handle = Some(handle);
                        return Ok(());
                    }
                    Err(err) => return Err(PoolError(err)),
                }
            }

            slots = self.cv.wait(slots).unwrap();
        }
    }

    /// Block until every submitted task has completed.
    pub fn wait_all(&mut self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut slots = self.slots.lock().unwrap();
            slots.iter_mut().filter_map(|s| s.handle.take()).collect()
        };
        for handle in handles {
            let _ = handle.join();
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.wait_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn construct_does_not_panic() {
        let _pool = Pool::new(4);
    }

    #[test]
    fn submit_runs_tasks_and_wait_all_blocks_until_done() {
        let t1 = Arc::new(Mutex::new(false));
        let t2 = Arc::new(Mutex::new(false));
        let mut pool = Pool::new(2);

        {
            let t1 = Arc::clone(&t1);
            pool.submit(move || {
                std::thread::sleep(Duration::from_millis(100));
                *t1.lock().unwrap() = true;
            })
            .unwrap();
        }
        {
            let t2 = Arc::clone(&t2);
            pool.submit(move || {
                std::thread::sleep(Duration::from_millis(100));
                *t2.lock().unwrap() = true;
            })
            .unwrap();
        }

        assert!(!*t1.lock().unwrap());
        assert!(!*t2.lock().unwrap());
        pool.wait_all();
        assert!(*t1.lock().unwrap());
        assert!(*t2.lock().unwrap());
    }

    /// S6: 50 tasks through a 4-slot pool never exceed 4 concurrently
    /// active, and every task completes.
    #[test]
    fn excess_submissions_wait_and_all_complete() {
        let out = Arc::new(Mutex::new(vec![0u8; 50]));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut pool = Pool::new(4);

        for i in 0..50 {
            assert!(pool.num_active() <= 4);
            let out = Arc::clone(&out);
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            pool.submit(move || {
                let now_active = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now_active, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(5));
                out.lock().unwrap()[i] = 1;
                active.fetch_sub(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.wait_all();

        let out = out.lock().unwrap();
        for &v in out.iter() {
            assert_eq!(v, 1);
        }
        assert!(peak.load(Ordering::SeqCst) <= 4);
    }
}
