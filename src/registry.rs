//! Registry of per-device monitoring tasks
//!
//! Each keyboard gets one thread running a [`KeyDetect`] body. The registry
//! guarantees at most one live task per [`DeviceId`], cancels tasks when their
//! device goes away and joins every thread it ever spawned on drain or drop.

use crate::cancel::CancelToken;
use crate::device::DeviceId;
use crate::error::DetectError;
use crate::keyboard::KeyDetect;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

/// A spawned monitor and the token that stops it
struct MonitorTask {
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

impl MonitorTask {
    fn is_live(&self) -> bool {
        !self.handle.is_finished()
    }
}

#[derive(Default)]
struct Tasks {
    live: HashMap<DeviceId, MonitorTask>,
    /// Cancelled tasks whose threads may still be winding down
    retired: Vec<JoinHandle<()>>,
    draining: bool,
}

impl Tasks {
    fn retire(&mut self, task: MonitorTask) {
        task.cancel.cancel();
        self.retired.push(task.handle);
    }

    /// Join retired threads that have already exited
    fn reap(&mut self) {
        let (done, pending): (Vec<_>, Vec<_>) =
            self.retired.drain(..).partition(|h| h.is_finished());
        self.retired = pending;
        for handle in done {
            join_quietly(handle);
        }
    }
}

/// Supervised set of monitoring tasks.
///
/// All mutations are short map updates under one lock; thread joins happen
/// outside it. Dropping the registry drains it.
pub struct TaskRegistry {
    tasks: Mutex<Tasks>,
    shutdown: CancelToken,
}

impl TaskRegistry {
    /// Tasks receive child tokens of `shutdown`, so cancelling it reaches all
    /// of them at once.
    pub fn new(shutdown: CancelToken) -> Self {
        Self {
            tasks: Mutex::new(Tasks::default()),
            shutdown,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tasks> {
        // Monitor threads never take this lock
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// True iff a task for `id` is registered and its thread is still running
    pub fn exists(&self, id: &DeviceId) -> bool {
        self.lock().live.get(id).is_some_and(MonitorTask::is_live)
    }

    /// Start monitoring `id` unless it is already monitored.
    ///
    /// Returns `Ok(true)` when a task was spawned and `Ok(false)` for the
    /// idempotent no-op (already live, empty id, or registry draining).
    pub fn start(&self, id: &DeviceId, detector: &Arc<dyn KeyDetect>) -> Result<bool, DetectError> {
        if id.is_empty() {
            return Ok(false);
        }

        let mut tasks = self.lock();
        if tasks.draining {
            debug!("Registry draining, not starting event{}", id);
            return Ok(false);
        }
        if tasks.live.get(id).is_some_and(MonitorTask::is_live) {
            debug!("event{} already monitored", id);
            return Ok(false);
        }
        // A task whose thread already returned (device read failed) is stale
        if let Some(stale) = tasks.live.remove(id) {
            tasks.retire(stale);
        }
        tasks.reap();

        let cancel = self.shutdown.child();
        let task_cancel = cancel.clone();
        let task_id = id.clone();
        let task_detector = Arc::clone(detector);
        let handle = thread::Builder::new()
            .name(format!("key-detect-{}", id))
            .spawn(move || task_detector.detect(&task_id, &task_cancel))
            .map_err(|source| DetectError::Spawn {
                id: id.clone(),
                source,
            })?;

        tasks.live.insert(id.clone(), MonitorTask { cancel, handle });
        info!("Started monitor for event{}", id);
        Ok(true)
    }

    /// Cancel the task for `id`, if any. Does not wait for it to exit.
    pub fn stop(&self, id: &DeviceId) {
        let mut tasks = self.lock();
        if let Some(task) = tasks.live.remove(id) {
            tasks.retire(task);
            info!("Stopped monitor for event{}", id);
        }
        tasks.reap();
    }

    /// Cancel every task and wait for all of them to exit.
    ///
    /// Safe on an empty registry and safe to call more than once. Starts are
    /// refused from here on.
    pub fn drain(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut tasks = self.lock();
            tasks.draining = true;
            let live: Vec<MonitorTask> = tasks.live.drain().map(|(_, task)| task).collect();
            for task in live {
                tasks.retire(task);
            }
            std::mem::take(&mut tasks.retired)
        };

        if !handles.is_empty() {
            info!("Waiting for {} monitor(s) to exit", handles.len());
        }
        for handle in handles {
            join_quietly(handle);
        }
    }

    /// Number of live tasks
    pub fn len(&self) -> usize {
        self.lock().live.values().filter(|t| t.is_live()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids with a live task, in ascending index order
    pub fn ids(&self) -> Vec<DeviceId> {
        let mut ids: Vec<DeviceId> = self
            .lock()
            .live
            .iter()
            .filter(|(_, t)| t.is_live())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort_by_key(|id| (id.index(), id.clone()));
        ids
    }
}

impl Drop for TaskRegistry {
    fn drop(&mut self) {
        self.drain();
    }
}

fn join_quietly(handle: JoinHandle<()>) {
    let name = handle.thread().name().unwrap_or("monitor").to_string();
    if handle.join().is_err() {
        warn!("Monitor thread {} panicked", name);
    }
}
