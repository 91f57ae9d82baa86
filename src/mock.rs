// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side stand-ins for the peripherals used by the control logic.

use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::pwm::{ErrorType as PwmErrorType, SetDutyCycle};

use crate::drivers::encoder_tracker::{QuadratureCounter, COUNTER_MODULUS};

/// Counter whose value is set directly by the test.
pub struct MockCounter {
    value: Cell<u32>,
}

impl MockCounter {
    pub fn new(value: u32) -> Self {
        Self {
            value: Cell::new(value),
        }
    }

    pub fn set(&self, value: u32) {
        self.value.set(value % COUNTER_MODULUS);
    }
}

impl QuadratureCounter for MockCounter {
    fn count(&self) -> u32 {
        self.value.get()
    }
}

/// Output pin that remembers its level.
#[derive(Default)]
pub struct MockPin {
    pub high: bool,
}

impl PinErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

/// PWM channel with a 1000-step period that records the last duty written.
pub struct MockPwm {
    pub duty: u16,
    pub writes: usize,
}

impl MockPwm {
    pub const MAX_DUTY: u16 = 1000;

    pub fn new() -> Self {
        Self { duty: 0, writes: 0 }
    }
}

impl PwmErrorType for MockPwm {
    type Error = Infallible;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        Self::MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        assert!(duty <= Self::MAX_DUTY, "duty {duty} above max {}", Self::MAX_DUTY);
        self.duty = duty;
        self.writes += 1;
        Ok(())
    }
}
