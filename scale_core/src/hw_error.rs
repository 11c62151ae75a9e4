//! Turning device errors into [`ScaleError`].
//!
//! Every collaborator hands back `Box<dyn Error + Send + Sync>`. The
//! controller only cares whether a device was slow (a load cell that never
//! signalled data-ready, an audio module that stopped answering) or broken
//! outright, so that is the split made here.

use crate::error::ScaleError;

/// Classify a device error as [`ScaleError::Timeout`] or a hardware fault.
///
/// With `hardware-errors` the GPIO/UART driver error is matched by type;
/// anything else, including sim and test doubles, is judged by its text.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> ScaleError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<scale_hardware::error::HwError>() {
            return from_driver(hw);
        }
    }

    let text = e.to_string();
    let lower = text.to_ascii_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        ScaleError::Timeout
    } else {
        ScaleError::Hardware(text)
    }
}

#[cfg(feature = "hardware-errors")]
fn from_driver(hw: &scale_hardware::error::HwError) -> ScaleError {
    use scale_hardware::error::HwError;

    match hw {
        HwError::DataReadyTimeout | HwError::Timeout => ScaleError::Timeout,
        HwError::Gpio(_) | HwError::Uart(_) | HwError::Io(_) => {
            ScaleError::HardwareFault(hw.to_string())
        }
    }
}
