//! Coefficient banks bundled for injection into engine calls

use once_cell::sync::Lazy;

use crate::cg_bank::CGBank;
use crate::wigner::FourierMatrixBank;

static GLOBAL: Lazy<Banks> = Lazy::new(Banks::new);

/// Clebsch-Gordan tables and angular matrices
///
/// Construct one per model and pass it to every engine call, or share the
/// process-wide instance from [`Banks::global`]. Entries are never evicted.
#[derive(Default)]
pub struct Banks {
    /// Clebsch-Gordan coefficient tables
    pub cg: CGBank,
    /// Wigner small-d and phase matrices
    pub fourier: FourierMatrixBank,
}

impl Banks {
    /// Empty banks
    pub fn new() -> Self {
        Self::default()
    }

    /// Lazily initialized process-wide banks
    pub fn global() -> &'static Banks {
        &GLOBAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_is_shared() {
        let a = Banks::global();
        let b = Banks::global();
        assert!(std::ptr::eq(a, b));
        let c1 = a.cg.get::<f64>(2, 2, 4);
        let c2 = b.cg.get::<f64>(2, 2, 4);
        assert!(std::sync::Arc::ptr_eq(&c1, &c2));
    }
}
