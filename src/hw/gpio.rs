// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Register-level GPIO for pins chosen at runtime from a [`PinId`].
//!
//! The HAL's typed pins fix the pin at compile time. Motor wiring comes from config tables as
//! board names, so these helpers program MODER/AFR/BSRR directly on whichever port the name
//! resolved to.

use embedded_hal::digital::{ErrorType, OutputPin};
use stm32f7xx_hal::pac;

use super::pins::PinId;

/// Run `$body` with `$gpio` bound to the register block of port `$port` (0 = A).
macro_rules! with_port {
    ($port:expr, |$gpio:ident| $body:expr) => {
        match $port {
            0 => {
                let $gpio = unsafe { &*pac::GPIOA::ptr() };
                $body
            }
            1 => {
                let $gpio = unsafe { &*pac::GPIOB::ptr() };
                $body
            }
            2 => {
                let $gpio = unsafe { &*pac::GPIOC::ptr() };
                $body
            }
            3 => {
                let $gpio = unsafe { &*pac::GPIOD::ptr() };
                $body
            }
            4 => {
                let $gpio = unsafe { &*pac::GPIOE::ptr() };
                $body
            }
            5 => {
                let $gpio = unsafe { &*pac::GPIOF::ptr() };
                $body
            }
            6 => {
                let $gpio = unsafe { &*pac::GPIOG::ptr() };
                $body
            }
            7 => {
                let $gpio = unsafe { &*pac::GPIOH::ptr() };
                $body
            }
            _ => {}
        }
    };
}

const MODE_OUTPUT: u32 = 0b01;
const MODE_ALTERNATE: u32 = 0b10;

fn enable_port_clock(pin: PinId) {
    let rcc = unsafe { &*pac::RCC::ptr() };
    // GPIOAEN..GPIOHEN are bits 0..7
    rcc.ahb1enr
        .modify(|r, w| unsafe { w.bits(r.bits() | (1 << pin.port())) });
}

fn set_mode(pin: PinId, mode: u32) {
    let shift = 2 * pin.number() as u32;
    with_port!(pin.port(), |gpio| {
        gpio.otyper
            .modify(|r, w| unsafe { w.bits(r.bits() & !(1 << pin.number())) });
        gpio.moder
            .modify(|r, w| unsafe { w.bits((r.bits() & !(0b11 << shift)) | (mode << shift)) });
    });
}

/// Route `pin` to alternate function `af`.
pub fn into_alternate(pin: PinId, af: u8) {
    enable_port_clock(pin);

    let n = pin.number() as u32;
    let af = af as u32 & 0xF;
    with_port!(pin.port(), |gpio| {
        if n < 8 {
            let shift = 4 * n;
            gpio.afrl
                .modify(|r, w| unsafe { w.bits((r.bits() & !(0xF << shift)) | (af << shift)) });
        } else {
            let shift = 4 * (n - 8);
            gpio.afrh
                .modify(|r, w| unsafe { w.bits((r.bits() & !(0xF << shift)) | (af << shift)) });
        }
    });
    set_mode(pin, MODE_ALTERNATE);
}

/// Push-pull output on a runtime-selected pin. Starts low.
pub struct OutputLine {
    pin: PinId,
}

impl OutputLine {
    pub fn new(pin: PinId) -> Self {
        enable_port_clock(pin);
        let mut line = Self { pin };
        line.write(false);
        set_mode(pin, MODE_OUTPUT);
        line
    }

    fn write(&mut self, high: bool) {
        let n = self.pin.number() as u32;
        let bit = if high { 1 << n } else { 1 << (n + 16) };
        with_port!(self.pin.port(), |gpio| {
            gpio.bsrr.write(|w| unsafe { w.bits(bit) });
        });
    }

    #[inline]
    pub fn pin(&self) -> PinId {
        self.pin
    }
}

impl ErrorType for OutputLine {
    type Error = core::convert::Infallible;
}

impl OutputPin for OutputLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}
