use crate::{ReduceOp, Reducer};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;

/// A group of in-process workers joined by a barrier.
///
/// Each worker publishes its local value into its own slot, waits for the
/// others, and folds all slots in rank order, so the result is the same on
/// every worker and does not depend on thread scheduling.
///
/// A worker of [`ThreadGroup::run`] that panics poisons the group: workers
/// waiting in a reduction, and any that arrive later, panic as well instead
/// of waiting forever.
pub struct ThreadGroup {
    size: usize,
    gate: Mutex<Gate>,
    arrived: Condvar,
    slots: Mutex<Vec<f64>>,
}

struct Gate {
    count: usize,
    generation: usize,
    poisoned: bool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl ThreadGroup {
    pub fn new(size: usize) -> Arc<ThreadGroup> {
        assert!(size > 0, "a thread group needs at least one worker");

        Arc::new(ThreadGroup {
            size,
            gate: Mutex::new(Gate {
                count: 0,
                generation: 0,
                poisoned: false,
            }),
            arrived: Condvar::new(),
            slots: Mutex::new(vec![0.0; size]),
        })
    }

    pub fn get_size(&self) -> usize {
        self.size
    }

    pub fn reducer(self: &Arc<Self>, rank: usize) -> ThreadReducer {
        assert!(rank < self.size);

        ThreadReducer {
            group: Arc::clone(self),
            rank,
        }
    }

    /// Runs `work` on `size` scoped threads, one per rank, and returns the
    /// per-rank results ordered by rank. `Err` if any worker panicked.
    pub fn run<T, F>(size: usize, work: F) -> thread::Result<Vec<T>>
    where
        T: Send,
        F: Fn(ThreadReducer) -> T + Sync,
    {
        let group = ThreadGroup::new(size);

        thread::scope(|s| {
            let handles: Vec<_> = (0..size)
                .map(|rank| {
                    let reducer = group.reducer(rank);
                    let group = Arc::clone(&group);
                    let work = &work;

                    s.spawn(move || {
                        match panic::catch_unwind(AssertUnwindSafe(move || work(reducer))) {
                            Ok(v) => v,
                            Err(payload) => {
                                group.poison();
                                panic::resume_unwind(payload)
                            }
                        }
                    })
                })
                .collect();

            let joined: Vec<thread::Result<T>> = handles.into_iter().map(|h| h.join()).collect();

            joined.into_iter().collect()
        })
    }

    fn poison(&self) {
        lock(&self.gate).poisoned = true;
        self.arrived.notify_all();
    }

    /// Blocks until all `size` workers have arrived.
    fn wait(&self) {
        let mut gate = lock(&self.gate);

        if gate.poisoned {
            drop(gate);
            panic!("thread group poisoned by a panicking worker");
        }

        let generation = gate.generation;

        gate.count += 1;

        if gate.count == self.size {
            gate.count = 0;
            gate.generation += 1;
            self.arrived.notify_all();
            return;
        }

        while gate.generation == generation && !gate.poisoned {
            gate = self.arrived.wait(gate).unwrap_or_else(|e| e.into_inner());
        }

        if gate.generation == generation {
            drop(gate);
            panic!("thread group poisoned by a panicking worker");
        }
    }

    fn all_reduce(&self, rank: usize, local: f64, op: ReduceOp) -> f64 {
        lock(&self.slots)[rank] = local;

        self.wait();

        let reduced = lock(&self.slots)
            .iter()
            .fold(op.identity(), |acc, &v| op.apply(acc, v));

        // nobody may overwrite a slot before every worker has read it
        self.wait();

        reduced
    }
}

/// Handle of one worker inside a [`ThreadGroup`].
pub struct ThreadReducer {
    group: Arc<ThreadGroup>,
    rank: usize,
}

impl Reducer for ThreadReducer {
    fn sum(&self, local: f64) -> f64 {
        self.group.all_reduce(self.rank, local, ReduceOp::Sum)
    }

    fn min(&self, local: f64) -> f64 {
        self.group.all_reduce(self.rank, local, ReduceOp::Min)
    }

    fn max(&self, local: f64) -> f64 {
        self.group.all_reduce(self.rank, local, ReduceOp::Max)
    }

    fn get_rank(&self) -> usize {
        self.rank
    }

    fn get_size(&self) -> usize {
        self.group.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_thread_group_reductions_agree_on_every_rank() {
        let results = ThreadGroup::run(4, |r| {
            let x = r.get_rank() as f64 + 1.0;
            (r.sum(x), r.min(x), r.max(x))
        })
        .unwrap();

        assert_eq!(results.len(), 4);

        for (sum, min, max) in results {
            assert_relative_eq!(sum, 10.0);
            assert_eq!(min, 1.0);
            assert_eq!(max, 4.0);
        }
    }

    #[test]
    fn test_thread_group_repeated_reductions_stay_in_lock_step() {
        let results = ThreadGroup::run(3, |r| {
            let mut acc = 0.0;
            for i in 0..50 {
                acc += r.sum(i as f64 * (r.get_rank() as f64 + 1.0));
            }
            acc
        })
        .unwrap();

        // sum_i i * (1 + 2 + 3) for i < 50
        let expected = 6.0 * (49.0 * 50.0 / 2.0);

        for acc in results {
            assert_relative_eq!(acc, expected);
        }
    }

    #[test]
    fn test_thread_group_panic_releases_waiting_workers() {
        let result = ThreadGroup::run(3, |r| {
            if r.get_rank() == 1 {
                panic!("worker 1 failed");
            }

            r.sum(1.0)
        });

        assert!(result.is_err());
    }

    #[test]
    fn test_thread_group_panic_after_a_reduction() {
        let result = ThreadGroup::run(2, |r| {
            let total = r.sum(1.0);

            if r.get_rank() == 0 {
                panic!("worker 0 failed");
            }

            total + r.max(0.0)
        });

        assert!(result.is_err());
    }

    #[test]
    fn test_thread_group_min_ignores_infinite_sentinels() {
        let results = ThreadGroup::run(2, |r| {
            let local = if r.get_rank() == 0 { f64::INFINITY } else { 0.5 };
            r.min(local)
        })
        .unwrap();

        assert_eq!(results, vec![0.5, 0.5]);
    }
}
