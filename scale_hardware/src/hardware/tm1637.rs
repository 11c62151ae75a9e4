use std::time::Duration;

use rppal::gpio::{Gpio, OutputPin};
use scale_traits::DigitDisplay;

use crate::error::Result;
use crate::protocol::tm1637;

type HwResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

const BIT_DELAY: Duration = Duration::from_micros(5);

/// TM1637 4-digit display, bit-banged. The ACK bit is clocked but not read.
pub struct Tm1637 {
    clk: OutputPin,
    dio: OutputPin,
    brightness: u8,
    digits: usize,
}

impl Tm1637 {
    pub fn try_new(gpio: &Gpio, clk: u8, dio: u8, brightness: u8) -> Result<Self> {
        Ok(Self {
            clk: gpio.get(clk)?.into_output_high(),
            dio: gpio.get(dio)?.into_output_high(),
            brightness: brightness.min(7),
            digits: 4,
        })
    }

    fn start(&mut self) {
        self.dio.set_low();
        std::thread::sleep(BIT_DELAY);
    }

    fn stop(&mut self) {
        self.clk.set_low();
        self.dio.set_low();
        std::thread::sleep(BIT_DELAY);
        self.clk.set_high();
        std::thread::sleep(BIT_DELAY);
        self.dio.set_high();
        std::thread::sleep(BIT_DELAY);
    }

    fn write_byte(&mut self, byte: u8) {
        for i in 0..8 {
            self.clk.set_low();
            if byte & (1 << i) != 0 {
                self.dio.set_high();
            } else {
                self.dio.set_low();
            }
            std::thread::sleep(BIT_DELAY);
            self.clk.set_high();
            std::thread::sleep(BIT_DELAY);
        }
        // ack slot
        self.clk.set_low();
        self.dio.set_high();
        std::thread::sleep(BIT_DELAY);
        self.clk.set_high();
        std::thread::sleep(BIT_DELAY);
        self.clk.set_low();
    }

    fn write_segments(&mut self, segs: &[u8]) {
        self.start();
        self.write_byte(tm1637::CMD_DATA);
        self.stop();

        self.start();
        self.write_byte(tm1637::CMD_ADDR);
        for s in segs {
            self.write_byte(*s);
        }
        self.stop();

        self.start();
        self.write_byte(tm1637::CMD_DISPLAY_ON | self.brightness);
        self.stop();
    }
}

impl DigitDisplay for Tm1637 {
    fn show(&mut self, value: i32, digits: u8) -> HwResult<()> {
        self.digits = usize::from(digits);
        let segs = tm1637::encode(value, self.digits);
        self.write_segments(&segs);
        Ok(())
    }

    fn show_fault(&mut self) -> HwResult<()> {
        self.write_segments(&tm1637::fault(self.digits));
        Ok(())
    }
}
