//! Backend selection from device tags

use so3rs_core::Device;

#[cfg(not(feature = "accelerator"))]
use crate::error::KernelError;
use crate::backend::{Backend, HostBackend};
use crate::error::KernelResult;

/// Run `launch` on the backend matching `device`, joining before return
pub(crate) fn on_device<'env>(
    operation: &'static str,
    device: Device,
    launch: impl FnOnce(&dyn Backend<'env>) -> KernelResult<()>,
) -> KernelResult<()> {
    #[cfg(feature = "accelerator")]
    let _ = operation;
    match device {
        Device::Host => launch(&HostBackend::default()),
        #[cfg(feature = "accelerator")]
        Device::Accelerator(_) => {
            crate::accelerator::Stream::scope(device, |stream| launch(stream))?
        }
        #[cfg(not(feature = "accelerator"))]
        Device::Accelerator(_) => Err(KernelError::backend_unavailable(operation, device)),
    }
}

/// Validate operand devices against each other and the backend, then batches
pub(crate) fn check_operands<'env, B: Backend<'env> + ?Sized>(
    operation: &'static str,
    backend: &B,
    devices: &[Device],
    batches: &[usize],
) -> KernelResult<()> {
    if let Some((&first, rest)) = devices.split_first() {
        crate::error::check_devices(operation, first, rest)?;
        crate::error::check_devices(operation, backend.device(), &[first])?;
    }
    crate::error::check_batches(operation, batches)
}

/// Generate the fatal, device-dispatched, and backend-explicit entry points
/// around a `try_*_with` implementation
macro_rules! entry_points {
    (
        $(#[$meta:meta])*
        $plain:ident, $try_plain:ident, $with:ident => $try_with:ident
        ($out:ident: $out_ty:ty $(, $arg:ident: $arg_ty:ty)* $(,)?)
    ) => {
        $(#[$meta])*
        #[track_caller]
        pub fn $plain<'env, T: ::so3rs_core::SO3Float>(
            banks: &$crate::Banks,
            $out: $out_ty
            $(, $arg: $arg_ty)*
        ) {
            $crate::error::fatal($try_plain(banks, $out $(, $arg)*))
        }

        #[doc = concat!("Fallible form of [`", stringify!($plain), "`]")]
        pub fn $try_plain<'env, T: ::so3rs_core::SO3Float>(
            banks: &$crate::Banks,
            $out: $out_ty
            $(, $arg: $arg_ty)*
        ) -> $crate::error::KernelResult<()> {
            let device = $out.device();
            $crate::dispatch::on_device(stringify!($plain), device, move |backend| {
                $try_with(backend, banks, $out $(, $arg)*)
            })
        }

        #[doc = concat!("[`", stringify!($plain), "`] on an explicit backend")]
        #[track_caller]
        pub fn $with<'env, T, B>(
            backend: &B,
            banks: &$crate::Banks,
            $out: $out_ty
            $(, $arg: $arg_ty)*
        ) where
            T: ::so3rs_core::SO3Float,
            B: $crate::backend::Backend<'env> + ?Sized,
        {
            $crate::error::fatal($try_with(backend, banks, $out $(, $arg)*))
        }
    };
}

pub(crate) use entry_points;
