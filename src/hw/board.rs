// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Motor hardware bring-up for the Nucleo-F767ZI.
//!
//! Resolves [`config::MOTORS`](crate::config::MOTORS), checks the whole wiring for conflicts, then
//! configures the encoder and PWM timers and hands back owned drivers, one set per motor.

use stm32f7xx_hal::pac;

use super::encoder::Encoder;
use super::gpio::OutputLine;
use super::pins::{ensure_distinct, MotorBinding, PinError};
use super::pwm::{self, PwmChannel};
use crate::config::{self, MotorConfig};
use crate::motors::DcMotor;

/// Encoder and bridge of one motor.
pub struct MotorHw<C, P> {
    pub encoder: C,
    pub motor: DcMotor<OutputLine, P>,
}

pub type Motor1Hw = MotorHw<Encoder<pac::TIM8>, PwmChannel<pac::TIM5>>;
pub type Motor2Hw = MotorHw<Encoder<pac::TIM4>, PwmChannel<pac::TIM3>>;

/// Peripherals the motors take over. The GPIO ports are claimed so that no HAL pin split can
/// alias the registers programmed here.
pub struct MotorPeripherals {
    pub gpioa: pac::GPIOA,
    pub gpiob: pac::GPIOB,
    pub gpioc: pac::GPIOC,
    pub tim3: pac::TIM3,
    pub tim4: pac::TIM4,
    pub tim5: pac::TIM5,
    pub tim8: pac::TIM8,
}

pub struct Board {
    pub motor1: Motor1Hw,
    pub motor2: Motor2Hw,
}

/// Highest port index owned through [`MotorPeripherals`] (C).
const LAST_CLAIMED_PORT: u8 = 2;

fn bridge<P>(cfg: &MotorConfig, binding: &MotorBinding, (a, b): (P, P)) -> DcMotor<OutputLine, P>
where
    P: embedded_hal::pwm::SetDutyCycle,
{
    DcMotor::new(OutputLine::new(binding.enable), a, b).with_level_limit(cfg.level_limit)
}

impl Board {
    /// `tclk1_hz` is the APB1 timer clock feeding the PWM timers.
    pub fn new(p: MotorPeripherals, tclk1_hz: u32) -> Result<Self, PinError<'static>> {
        let m1 = &config::MOTOR1;
        let m2 = &config::MOTOR2;

        let b1 = m1.pins.resolve()?;
        let b2 = m2.pins.resolve()?;
        ensure_distinct(&[b1, b2])?;

        if let Some(pin) = b1
            .pins()
            .into_iter()
            .chain(b2.pins())
            .find(|pin| pin.port() > LAST_CLAIMED_PORT)
        {
            return Err(PinError::PortUnavailable(pin));
        }

        let MotorPeripherals {
            gpioa: _,
            gpiob: _,
            gpioc: _,
            tim3,
            tim4,
            tim5,
            tim8,
        } = p;

        let motor1 = MotorHw {
            encoder: Encoder::tim8(tim8, &b1.encoder)?,
            motor: bridge(m1, &b1, pwm::tim5(tim5, &b1.pwm, tclk1_hz, config::PWM_FREQ_HZ)?),
        };
        let motor2 = MotorHw {
            encoder: Encoder::tim4(tim4, &b2.encoder)?,
            motor: bridge(m2, &b2, pwm::tim3(tim3, &b2.pwm, tclk1_hz, config::PWM_FREQ_HZ)?),
        };

        Ok(Self { motor1, motor2 })
    }
}
