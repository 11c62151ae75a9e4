use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("device timeout")]
    Timeout,
    #[error("hx711 data-ready timeout")]
    DataReadyTimeout,
    #[error("uart error: {0}")]
    Uart(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
impl From<rppal::gpio::Error> for HwError {
    fn from(e: rppal::gpio::Error) -> Self {
        HwError::Gpio(e.to_string())
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
impl From<rppal::uart::Error> for HwError {
    fn from(e: rppal::uart::Error) -> Self {
        HwError::Uart(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HwError>;
