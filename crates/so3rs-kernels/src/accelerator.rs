//! Asynchronous in-order execution streams
//!
//! A [`Stream`] models an accelerator command queue: [`Backend::launch`]
//! enqueues and returns immediately, and [`Stream::synchronize`] drains the
//! queue in submission order on a dedicated worker thread. Jobs borrow their
//! operands for `'env`, so every stream must be joined before those borrows
//! end; [`Stream::scope`] does this automatically.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

use parking_lot::Mutex;
use so3rs_core::Device;

use crate::backend::{Backend, Job};
use crate::config::KernelConfig;
use crate::error::{fatal, KernelError, KernelResult};

/// In-order queue of deferred kernels for one device
pub struct Stream<'env> {
    device: Device,
    config: KernelConfig,
    queue: Mutex<Vec<(&'static str, Job<'env>)>>,
}

impl<'env> Stream<'env> {
    /// Empty stream on `device`
    pub fn new(device: Device) -> Self {
        Self::with_config(device, KernelConfig::default())
    }

    /// Empty stream with explicit configuration
    pub fn with_config(device: Device, config: KernelConfig) -> Self {
        Self {
            device,
            config,
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Run `f` against a fresh stream and join it before returning
    pub fn scope<R>(device: Device, f: impl FnOnce(&Stream<'env>) -> R) -> KernelResult<R> {
        let stream = Stream::new(device);
        let result = f(&stream);
        stream.synchronize()?;
        Ok(result)
    }

    /// Number of kernels submitted but not yet executed
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Block until every queued kernel has executed
    ///
    /// A kernel that panics is reported as [`KernelError::DeviceFailure`];
    /// kernels queued after it are discarded.
    pub fn synchronize(&self) -> KernelResult<()> {
        let jobs = std::mem::take(&mut *self.queue.lock());
        if jobs.is_empty() {
            return Ok(());
        }
        let device = self.device;
        let count = jobs.len();
        tracing::trace!(%device, count, "synchronizing stream");

        let outcome = thread::scope(|scope| {
            let worker = scope.spawn(move || {
                for (kernel, job) in jobs {
                    if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
                        return Err((kernel, panic_message(payload.as_ref())));
                    }
                }
                Ok(())
            });
            worker.join()
        });

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err((kernel, message))) => Err(KernelError::device_failure(kernel, device, message)),
            Err(payload) => Err(KernelError::device_failure(
                "stream",
                device,
                panic_message(payload.as_ref()),
            )),
        }
    }
}

impl<'env> Backend<'env> for Stream<'env> {
    fn device(&self) -> Device {
        self.device
    }

    fn config(&self) -> &KernelConfig {
        &self.config
    }

    fn launch(&self, kernel: &'static str, job: Job<'env>) -> KernelResult<()> {
        tracing::trace!(kernel, device = %self.device, "enqueue");
        self.queue.lock().push((kernel, job));
        Ok(())
    }
}

impl Drop for Stream<'_> {
    fn drop(&mut self) {
        let result = self.synchronize();
        if !thread::panicking() {
            fatal(result);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "kernel panicked".to_string()
    }
}
