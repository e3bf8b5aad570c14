//! Device tags carried by every part
//!
//! A part's device decides which backend executes an operation on it. All
//! operands of one operation must agree on the device.

use std::fmt;

/// Where a part's storage lives and where kernels on it execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Device {
    /// Host memory, executed on the calling thread (or the rayon pool)
    #[default]
    Host,
    /// Accelerator with the given ordinal; kernels are queued on a stream
    Accelerator(usize),
}

impl Device {
    /// True for [`Device::Host`]
    pub fn is_host(self) -> bool {
        matches!(self, Device::Host)
    }

    /// Accelerator ordinal, if any
    pub fn ordinal(self) -> Option<usize> {
        match self {
            Device::Host => None,
            Device::Accelerator(id) => Some(id),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Host => write!(f, "host"),
            Device::Accelerator(id) => write!(f, "accelerator:{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_display() {
        assert_eq!(Device::Host.to_string(), "host");
        assert_eq!(Device::Accelerator(2).to_string(), "accelerator:2");
    }

    #[test]
    fn test_device_ordinal() {
        assert!(Device::default().is_host());
        assert_eq!(Device::Host.ordinal(), None);
        assert_eq!(Device::Accelerator(3).ordinal(), Some(3));
    }
}
