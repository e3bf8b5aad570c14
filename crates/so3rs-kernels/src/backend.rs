//! Execution backends
//!
//! Engines validate their operands, resolve coefficient tables, and then hand
//! a self-contained job to a [`Backend`]. The job borrows the operand views
//! for `'env`, so a backend may run it immediately ([`HostBackend`]) or defer
//! it until an explicit join (`Stream`, behind the `accelerator` feature).
//! Either way the mathematical result is identical.

use so3rs_core::Device;

use crate::config::KernelConfig;
use crate::error::KernelResult;

/// Deferred kernel body borrowing operands for `'env`
pub type Job<'env> = Box<dyn FnOnce() + Send + 'env>;

/// Execution capability selected from the operands' device tag
pub trait Backend<'env> {
    /// Device this backend executes on
    fn device(&self) -> Device;

    /// Execution knobs
    fn config(&self) -> &KernelConfig;

    /// Submit a kernel; may return before the kernel has run
    fn launch(&self, kernel: &'static str, job: Job<'env>) -> KernelResult<()>;
}

/// Synchronous host execution
#[derive(Clone, Debug, Default)]
pub struct HostBackend {
    config: KernelConfig,
}

impl HostBackend {
    /// Host backend with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Host backend with an explicit configuration
    pub fn with_config(config: KernelConfig) -> Self {
        Self { config }
    }
}

impl<'env> Backend<'env> for HostBackend {
    fn device(&self) -> Device {
        Device::Host
    }

    fn config(&self) -> &KernelConfig {
        &self.config
    }

    fn launch(&self, kernel: &'static str, job: Job<'env>) -> KernelResult<()> {
        tracing::trace!(kernel, "host launch");
        job();
        Ok(())
    }
}
