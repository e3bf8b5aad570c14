//! Error types for SO(3) kernel operations
//!
//! Every engine operation validates its operands before touching storage.
//! Validation failures are caller or model-construction bugs: the `try_*`
//! entry points return them as [`KernelError`], and the plain entry points
//! abort through [`fatal`].

use so3rs_core::Device;
use thiserror::Error;

/// Error type for kernel operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Degrees violate |l1 - l2| <= l <= l1 + l2
    #[error("{operation}: triangle rule violated for (l1={l1}, l2={l2}, l={l})")]
    TriangleRule {
        operation: String,
        l1: usize,
        l2: usize,
        l: usize,
    },

    /// Operands live on different devices
    #[error("{operation}: device mismatch - expected {expected}, got {actual}")]
    DeviceMismatch {
        operation: String,
        expected: Device,
        actual: Device,
    },

    /// Operands disagree on batch size
    #[error("{operation}: batch size mismatch - expected {expected}, got {actual}")]
    BatchMismatch {
        operation: String,
        expected: usize,
        actual: usize,
    },

    /// Operands disagree on multiplicity
    #[error("{operation}: multiplicity mismatch - expected {expected}, got {actual}")]
    MultiplicityMismatch {
        operation: String,
        expected: usize,
        actual: usize,
    },

    /// An operand has the wrong extent along some axis
    #[error("{operation}: dimension mismatch - expected {expected:?}, got {actual:?}. {context}")]
    DimensionMismatch {
        operation: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: String,
    },

    /// No backend for this device was compiled in
    #[error("{operation}: no backend available for {device} (enable the `accelerator` feature)")]
    BackendUnavailable { operation: String, device: Device },

    /// A device kernel failed while executing
    #[error("{operation}: kernel failure on {device}: {message}")]
    DeviceFailure {
        operation: String,
        device: Device,
        message: String,
    },
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

impl KernelError {
    /// Create a triangle rule error
    pub fn triangle_rule(operation: impl Into<String>, l1: usize, l2: usize, l: usize) -> Self {
        KernelError::TriangleRule {
            operation: operation.into(),
            l1,
            l2,
            l,
        }
    }

    /// Create a device mismatch error
    pub fn device_mismatch(operation: impl Into<String>, expected: Device, actual: Device) -> Self {
        KernelError::DeviceMismatch {
            operation: operation.into(),
            expected,
            actual,
        }
    }

    /// Create a batch mismatch error
    pub fn batch_mismatch(operation: impl Into<String>, expected: usize, actual: usize) -> Self {
        KernelError::BatchMismatch {
            operation: operation.into(),
            expected,
            actual,
        }
    }

    /// Create a multiplicity mismatch error
    pub fn multiplicity_mismatch(
        operation: impl Into<String>,
        expected: usize,
        actual: usize,
    ) -> Self {
        KernelError::MultiplicityMismatch {
            operation: operation.into(),
            expected,
            actual,
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(
        operation: impl Into<String>,
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: impl Into<String>,
    ) -> Self {
        KernelError::DimensionMismatch {
            operation: operation.into(),
            expected,
            actual,
            context: context.into(),
        }
    }

    /// Create a backend unavailable error
    pub fn backend_unavailable(operation: impl Into<String>, device: Device) -> Self {
        KernelError::BackendUnavailable {
            operation: operation.into(),
            device,
        }
    }

    /// Create a device failure error
    pub fn device_failure(
        operation: impl Into<String>,
        device: Device,
        message: impl Into<String>,
    ) -> Self {
        KernelError::DeviceFailure {
            operation: operation.into(),
            device,
            message: message.into(),
        }
    }
}

/// Unwrap a kernel result, aborting on a violated precondition
///
/// Kernel preconditions are never recoverable at the call site, so the
/// plain (non-`try_`) entry points funnel through here.
#[track_caller]
pub fn fatal<T>(result: KernelResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(error = %err, "fatal kernel precondition");
            panic!("{}", err)
        }
    }
}

/// Check that every device in `actual` equals `expected`
pub(crate) fn check_devices(operation: &str, expected: Device, actual: &[Device]) -> KernelResult<()> {
    match actual.iter().find(|&&d| d != expected) {
        Some(&d) => Err(KernelError::device_mismatch(operation, expected, d)),
        None => Ok(()),
    }
}

/// Check that every batch size equals the first one
pub(crate) fn check_batches(operation: &str, batches: &[usize]) -> KernelResult<()> {
    let Some((&first, rest)) = batches.split_first() else {
        return Ok(());
    };
    match rest.iter().find(|&&b| b != first) {
        Some(&b) => Err(KernelError::batch_mismatch(operation, first, b)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_display() {
        let err = KernelError::triangle_rule("add_diag_cg_product", 1, 1, 3);
        let msg = err.to_string();
        assert!(msg.contains("add_diag_cg_product"));
        assert!(msg.contains("l1=1, l2=1, l=3"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = KernelError::dimension_mismatch(
            "add_cg_product",
            vec![2, 5, 6],
            vec![2, 5, 4],
            "output has too few channels",
        );
        let msg = err.to_string();
        assert!(msg.contains("[2, 5, 6]"));
        assert!(msg.contains("[2, 5, 4]"));
        assert!(msg.contains("too few channels"));
    }

    #[test]
    fn test_check_devices() {
        assert!(check_devices("op", Device::Host, &[Device::Host, Device::Host]).is_ok());
        assert_eq!(
            check_devices("op", Device::Host, &[Device::Host, Device::Accelerator(0)]),
            Err(KernelError::device_mismatch(
                "op",
                Device::Host,
                Device::Accelerator(0)
            ))
        );
    }

    #[test]
    fn test_check_batches() {
        assert!(check_batches("op", &[]).is_ok());
        assert!(check_batches("op", &[3, 3, 3]).is_ok());
        assert_eq!(
            check_batches("op", &[3, 3, 2]),
            Err(KernelError::batch_mismatch("op", 3, 2))
        );
    }

    #[test]
    #[should_panic(expected = "triangle rule violated")]
    fn test_fatal_panics() {
        fatal::<()>(Err(KernelError::triangle_rule("op", 0, 0, 1)));
    }
}
