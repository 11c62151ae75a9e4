//! Raspberry Pi drivers (GPIO and UART via `rppal`).

pub mod dfplayer;
pub mod gpio;
pub mod hx711;
pub mod keypad;
pub mod tm1637;

pub use dfplayer::DfPlayer;
pub use gpio::{GpioButton, GpioBuzzer, GpioPowerLine};
pub use hx711::{Hx711, Hx711Sensor};
pub use keypad::MatrixKeypad;
pub use tm1637::Tm1637;

pub use rppal::gpio::Gpio;
