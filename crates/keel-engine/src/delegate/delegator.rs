use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Duration;

use flume::RecvTimeoutError;

use super::error::DelegateError;
use crate::panic;

type Task = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;
type Call = Box<dyn FnOnce() + Send + 'static>;

/// Outcome of one `Delegator::drain`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DrainReport {
    /// Queued tasks executed.
    pub ran: usize,
    /// Queued tasks that returned an error or panicked.
    pub failed: usize,
    /// Whether a pending blocking call was completed.
    pub call_ran: bool,
}

struct Shared {
    owner: ThreadId,
    queue_tx: flume::Sender<Task>,
    queue_rx: flume::Receiver<Task>,
    pending: Mutex<Option<Call>>,
    outstanding: AtomicBool,
    closed: AtomicBool,
}

impl Shared {
    fn pending(&self) -> MutexGuard<'_, Option<Call>> {
        // Calls never run under the lock, so a poisoned guard still holds a consistent slot.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Mailbox that funnels work onto a single owning thread.
///
/// Handles are cheap to clone and may be sent to any thread. The owning thread is fixed
/// at construction; it is the only thread that may `drain` or `shutdown`, and the only
/// thread that ever executes submitted work.
///
/// Within one `drain`, queued tasks run first (FIFO, only those present when the drain
/// started), then the pending blocking call, if any.
#[derive(Clone)]
pub struct Delegator {
    shared: Arc<Shared>,
}

impl Delegator {
    /// Binds a new delegator to the calling thread.
    pub fn new() -> Self {
        Self::bound_to(thread::current().id())
    }

    /// Binds a new delegator to `owner`.
    pub fn bound_to(owner: ThreadId) -> Self {
        let (queue_tx, queue_rx) = flume::unbounded();
        Self {
            shared: Arc::new(Shared {
                owner,
                queue_tx,
                queue_rx,
                pending: Mutex::new(None),
                outstanding: AtomicBool::new(false),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn owner(&self) -> ThreadId {
        self.shared.owner
    }

    pub fn is_owning_thread(&self) -> bool {
        thread::current().id() == self.shared.owner
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Number of fire-and-forget tasks waiting for the next drain.
    pub fn queued(&self) -> usize {
        self.shared.queue_rx.len()
    }

    /// Whether a blocking call is installed and not yet picked up by the owner.
    pub fn has_pending_call(&self) -> bool {
        self.shared.pending().is_some()
    }

    /// Fire-and-forget.
    ///
    /// On the owning thread the task runs immediately; anywhere else it is queued for the
    /// next `drain`. Task failures are logged and never reach the caller.
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        if self.is_owning_thread() {
            if let Err(err) = panic::catch(task) {
                log::error!("posted task failed: {err:#}");
            }
            return;
        }

        if self.is_closed() {
            log::debug!("delegator closed; dropping posted task");
            return;
        }

        if self.shared.queue_tx.send(Box::new(task)).is_err() {
            log::debug!("task queue disconnected; dropping posted task");
        }
    }

    /// Runs `task` on the owning thread and waits for its result.
    ///
    /// On the owning thread the task runs inline. Elsewhere the caller blocks, without
    /// timeout, until the owner's next `drain` completes the task. Only one blocking call
    /// may be outstanding at a time; a second concurrent caller gets `Busy`.
    pub fn call<T, F>(&self, task: F) -> Result<T, DelegateError>
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_owning_thread() {
            return panic::catch(task).map_err(DelegateError::Execution);
        }

        let rx = self.submit(task)?;
        let result = rx.recv().unwrap_or(Err(DelegateError::Closed));
        self.release();
        result
    }

    /// Like `call`, but gives up after `timeout`.
    ///
    /// If the owner has not picked the task up yet it is withdrawn and never runs. If the
    /// owner is already running it, the result is discarded.
    pub fn call_timeout<T, F>(&self, task: F, timeout: Duration) -> Result<T, DelegateError>
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_owning_thread() {
            return panic::catch(task).map_err(DelegateError::Execution);
        }

        let rx = self.submit(task)?;
        let result = match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Disconnected) => Err(DelegateError::Closed),
            Err(RecvTimeoutError::Timeout) => {
                let withdrawn = self.shared.pending().take().is_some();
                if withdrawn {
                    log::debug!("blocking call withdrawn after {timeout:?}");
                    Err(DelegateError::Timeout(timeout))
                } else {
                    // Owner picked it up; it may have finished in the meantime.
                    rx.try_recv().unwrap_or(Err(DelegateError::Timeout(timeout)))
                }
            }
        };
        self.release();
        result
    }

    /// Executes queued work. Owning thread only; call once per frame.
    pub fn drain(&self) -> Result<DrainReport, DelegateError> {
        self.ensure_owner("drain")?;

        let mut report = DrainReport::default();

        let queued = self.shared.queue_rx.len();
        for task in self.shared.queue_rx.try_iter().take(queued) {
            report.ran += 1;
            if let Err(err) = panic::catch(task) {
                report.failed += 1;
                log::error!("queued task failed: {err:#}");
            }
        }

        let call = self.shared.pending().take();
        if let Some(call) = call {
            call();
            report.call_ran = true;
        }

        if report != DrainReport::default() {
            log::trace!(
                "drained {} task(s), {} failed, blocking call: {}",
                report.ran,
                report.failed,
                report.call_ran
            );
        }

        Ok(report)
    }

    /// Drops all queued work and releases a blocked caller with `Closed`.
    ///
    /// Owning thread only. Later posts are dropped and later calls fail with `Closed`.
    pub fn shutdown(&self) -> Result<(), DelegateError> {
        self.ensure_owner("shutdown")?;

        self.shared.closed.store(true, Ordering::Release);
        let dropped = self.shared.queue_rx.drain().count();
        let abandoned = self.shared.pending().take().is_some();

        log::debug!(
            "delegator shut down; dropped {dropped} queued task(s), abandoned call: {abandoned}"
        );
        Ok(())
    }

    fn submit<T, F>(
        &self,
        task: F,
    ) -> Result<flume::Receiver<Result<T, DelegateError>>, DelegateError>
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_closed() {
            return Err(DelegateError::Closed);
        }

        if self
            .shared
            .outstanding
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DelegateError::Busy);
        }

        let (tx, rx) = flume::bounded(1);
        let call: Call = Box::new(move || {
            // The waiter may have timed out and gone away.
            let _ = tx.send(panic::catch(task).map_err(DelegateError::Execution));
        });
        *self.shared.pending() = Some(call);

        // A shutdown that raced the install would never release this caller.
        if self.is_closed() {
            self.shared.pending().take();
            self.release();
            return Err(DelegateError::Closed);
        }

        Ok(rx)
    }

    fn release(&self) {
        self.shared.outstanding.store(false, Ordering::Release);
    }

    fn ensure_owner(&self, operation: &'static str) -> Result<(), DelegateError> {
        let caller = thread::current().id();
        if caller == self.shared.owner {
            Ok(())
        } else {
            Err(DelegateError::NotOwningThread {
                operation,
                owner: self.shared.owner,
                caller,
            })
        }
    }
}

impl Default for Delegator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Delegator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegator")
            .field("owner", &self.shared.owner)
            .field("queued", &self.queued())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    #[derive(Debug, thiserror::Error)]
    #[error("sensor {0} offline")]
    struct SensorOffline(u8);

    fn wait_until(cond: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    // ── post ──────────────────────────────────────────────────────────────

    #[test]
    fn post_on_owner_runs_inline() {
        let delegator = Delegator::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        delegator.post(move || {
            h.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(delegator.queued(), 0);
    }

    #[test]
    fn post_from_other_thread_waits_for_drain() {
        let delegator = Delegator::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let handle = delegator.clone();
        let sink = log.clone();
        thread::spawn(move || {
            for i in 0..3 {
                let sink = sink.clone();
                handle.post(move || {
                    sink.lock().unwrap().push(i);
                    Ok(())
                });
            }
        })
        .join()
        .unwrap();

        assert_eq!(delegator.queued(), 3);
        assert!(log.lock().unwrap().is_empty());

        let report = delegator.drain().unwrap();
        assert_eq!(report.ran, 3);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn failing_task_does_not_stop_drain() {
        let delegator = Delegator::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let handle = delegator.clone();
        let h = hits.clone();
        thread::spawn(move || {
            handle.post(|| Err(SensorOffline(1).into()));
            handle.post(|| panic!("bad task"));
            handle.post(move || {
                h.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        })
        .join()
        .unwrap();

        let report = delegator.drain().unwrap();
        assert_eq!(report.ran, 3);
        assert_eq!(report.failed, 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    // ── call ──────────────────────────────────────────────────────────────

    #[test]
    fn call_on_owner_short_circuits() {
        let delegator = Delegator::new();
        assert_eq!(delegator.call(|| Ok(5)).unwrap(), 5);
        // No blocking slot was taken, so a second call is fine too.
        assert_eq!(delegator.call(|| Ok(6)).unwrap(), 6);
        assert!(!delegator.has_pending_call());
    }

    #[test]
    fn call_on_owner_propagates_error() {
        let delegator = Delegator::new();
        let err = delegator
            .call::<(), _>(|| Err(SensorOffline(2).into()))
            .unwrap_err();
        let source = err.execution().and_then(|e| e.downcast_ref::<SensorOffline>());
        assert_eq!(source.map(|e| e.0), Some(2));
    }

    #[test]
    fn call_blocks_until_owner_drains() {
        let delegator = Delegator::new();
        let (tx, rx) = flume::bounded(1);

        let handle = delegator.clone();
        let worker = thread::spawn(move || {
            tx.send(handle.call(|| Ok(42))).unwrap();
        });

        assert!(wait_until(|| delegator.has_pending_call()));
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        let report = delegator.drain().unwrap();
        assert!(report.call_ran);

        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result.unwrap(), 42);
        worker.join().unwrap();
    }

    #[test]
    fn call_from_other_thread_reraises_task_error() {
        let delegator = Delegator::new();
        let handle = delegator.clone();
        let worker = thread::spawn(move || handle.call::<u32, _>(|| Err(SensorOffline(9).into())));

        assert!(wait_until(|| delegator.has_pending_call()));
        delegator.drain().unwrap();

        let err = worker.join().unwrap().unwrap_err();
        assert!(matches!(err, DelegateError::Execution(_)));
        let source = err.execution().and_then(|e| e.downcast_ref::<SensorOffline>());
        assert_eq!(source.map(|e| e.0), Some(9));
    }

    #[test]
    fn panicking_call_becomes_execution_error() {
        let delegator = Delegator::new();
        let handle = delegator.clone();
        let worker = thread::spawn(move || handle.call::<(), _>(|| panic!("kaboom")));

        assert!(wait_until(|| delegator.has_pending_call()));
        delegator.drain().unwrap();

        let err = worker.join().unwrap().unwrap_err();
        assert!(err.to_string().contains("kaboom"));
    }

    #[test]
    fn second_concurrent_call_is_busy() {
        let delegator = Delegator::new();

        let first = delegator.clone();
        let waiting = thread::spawn(move || first.call(|| Ok("first")));
        assert!(wait_until(|| delegator.has_pending_call()));

        let second = delegator.clone();
        let rejected = thread::spawn(move || second.call(|| Ok("second")))
            .join()
            .unwrap();
        assert!(matches!(rejected, Err(DelegateError::Busy)));

        delegator.drain().unwrap();
        assert_eq!(waiting.join().unwrap().unwrap(), "first");
    }

    #[test]
    fn queue_runs_before_blocking_call() {
        let delegator = Delegator::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let handle = delegator.clone();
        let sink = order.clone();
        let worker = thread::spawn(move || {
            let s = sink.clone();
            handle.post(move || {
                s.lock().unwrap().push("posted");
                Ok(())
            });
            handle.call(move || {
                sink.lock().unwrap().push("called");
                Ok(())
            })
        });

        assert!(wait_until(|| delegator.has_pending_call()));
        delegator.drain().unwrap();
        worker.join().unwrap().unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["posted", "called"]);
    }

    #[test]
    fn call_timeout_withdraws_unstarted_task() {
        let delegator = Delegator::new();
        let ran = Arc::new(AtomicBool::new(false));

        let handle = delegator.clone();
        let flag = ran.clone();
        let result = thread::spawn(move || {
            handle.call_timeout(
                move || {
                    flag.store(true, Ordering::SeqCst);
                    Ok(())
                },
                Duration::from_millis(20),
            )
        })
        .join()
        .unwrap();

        assert!(matches!(result, Err(DelegateError::Timeout(_))));
        assert!(!delegator.has_pending_call());
        assert!(!delegator.drain().unwrap().call_ran);
        assert!(!ran.load(Ordering::SeqCst));

        // Slot is free again.
        let handle = delegator.clone();
        let worker = thread::spawn(move || handle.call(|| Ok(1)));
        assert!(wait_until(|| delegator.has_pending_call()));
        delegator.drain().unwrap();
        assert_eq!(worker.join().unwrap().unwrap(), 1);
    }

    // ── owner-only operations ─────────────────────────────────────────────

    #[test]
    fn drain_off_owner_is_rejected() {
        let delegator = Delegator::new();
        let handle = delegator.clone();
        let result = thread::spawn(move || handle.drain()).join().unwrap();
        match result {
            Err(DelegateError::NotOwningThread {
                operation: "drain",
                owner,
                caller,
            }) => {
                assert_eq!(owner, delegator.owner());
                assert_eq!(owner, thread::current().id());
                assert_ne!(caller, owner);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn bound_owner_is_reported() {
        let here = thread::current().id();
        let delegator = Delegator::bound_to(here);
        assert_eq!(delegator.owner(), here);
        assert!(delegator.is_owning_thread());
    }

    #[test]
    fn shutdown_releases_blocked_caller() {
        let delegator = Delegator::new();
        let handle = delegator.clone();
        let worker = thread::spawn(move || handle.call(|| Ok(0)));

        assert!(wait_until(|| delegator.has_pending_call()));
        delegator.shutdown().unwrap();

        assert!(matches!(worker.join().unwrap(), Err(DelegateError::Closed)));
        assert!(delegator.is_closed());
    }

    #[test]
    fn shutdown_drops_queue_and_rejects_new_work() {
        let delegator = Delegator::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let handle = delegator.clone();
        let h = hits.clone();
        thread::spawn(move || {
            let h2 = h.clone();
            handle.post(move || {
                h2.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        })
        .join()
        .unwrap();

        delegator.shutdown().unwrap();
        assert_eq!(delegator.queued(), 0);

        let handle = delegator.clone();
        let (posted, called) = thread::spawn(move || {
            handle.post(|| Ok(()));
            (handle.queued(), handle.call(|| Ok(())))
        })
        .join()
        .unwrap();

        assert_eq!(posted, 0);
        assert!(matches!(called, Err(DelegateError::Closed)));
        assert_eq!(delegator.drain().unwrap(), DrainReport::default());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
