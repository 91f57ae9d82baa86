// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Console over USART.
//!
//! On the Nucleo-F767ZI, USART3 (PD8/PD9) is wired to the ST-LINK virtual COM port. Telemetry and
//! diagnostics go out through [`fmt::Write`]; the receive side is polled for the Ctrl-C byte that
//! stops the scheduler.
//!
//! Note: When using `writeln!`, be sure to include `\r` (CR) in the format string to ensure correct
//! line endings on the terminal.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* <baud_rate>
//! ```

use core::fmt;
use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Rx, Serial, Tx},
};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
    rx: Rx<U>,
    rx_errors: u32,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, rx) = serial.split();
        Self {
            tx,
            rx,
            rx_errors: 0,
        }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }

    /// Take one received byte if there is one. Framing and overrun errors are counted and the
    /// byte is dropped.
    pub fn try_read(&mut self) -> Option<u8> {
        match self.rx.read() {
            Ok(b) => Some(b),
            Err(nb::Error::WouldBlock) => None,
            Err(nb::Error::Other(_)) => {
                self.rx_errors = self.rx_errors.wrapping_add(1);
                None
            }
        }
    }

    #[inline]
    pub fn rx_errors(&self) -> u32 {
        self.rx_errors
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Usart`.
impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}
