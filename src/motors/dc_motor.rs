// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Brushed DC motor on a dual-PWM H-bridge (L6206-style IN1/IN2 + enable).
//!
//! A signed drive level in percent is split across the two bridge inputs so that only one of them
//! is ever driven:
//!
//! | level | channel A | channel B |
//! | ----- | --------- | --------- |
//! | `>= 0` | 0 | `level` |
//! | `< 0` | `-level` | 0 |

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use micromath::F32Ext;

pub struct DcMotor<EN, PWM> {
    enable: EN,
    ch_a: PWM,
    ch_b: PWM,

    /// Optional magnitude bound on the commanded level, in percent
    limit: Option<f32>,

    enabled: bool,
    level: f32,
    duty_a: f32,
    duty_b: f32,
}

impl<EN, PWM> DcMotor<EN, PWM>
where
    EN: OutputPin,
    PWM: SetDutyCycle,
{
    /// Take ownership of the bridge pins. Both channels start at 0% with the bridge disabled.
    pub fn new(enable: EN, ch_a: PWM, ch_b: PWM) -> Self {
        let mut motor = Self {
            enable,
            ch_a,
            ch_b,
            limit: None,
            enabled: false,
            level: 0.0,
            duty_a: 0.0,
            duty_b: 0.0,
        };
        motor.disable();
        motor
    }

    /// Clamp the magnitude of every level to `limit` percent.
    ///
    /// Without a limit, out-of-range levels are kept as commanded and the written duty saturates
    /// at full scale. A non-finite limit is ignored.
    pub fn with_level_limit(mut self, limit: Option<f32>) -> Self {
        self.limit = limit.filter(|l| l.is_finite()).map(F32Ext::abs);
        self
    }

    /// Drive the bridge enable line high.
    pub fn enable(&mut self) {
        self.enable.set_high().ok();
        self.enabled = true;
    }

    /// Zero both channels and drive the enable line low.
    pub fn disable(&mut self) {
        self.set_level(0.0);
        self.enable.set_low().ok();
        self.enabled = false;
    }

    /// Command a signed drive level in percent of full duty.
    pub fn set_level(&mut self, level: f32) {
        let level = match self.limit {
            Some(limit) => level.clamp(-limit, limit),
            None => level,
        };

        let (a, b) = if level >= 0.0 {
            (0.0, level)
        } else {
            (-level, 0.0)
        };

        Self::write_percent(&mut self.ch_a, a);
        Self::write_percent(&mut self.ch_b, b);

        self.level = level;
        self.duty_a = a;
        self.duty_b = b;
    }

    fn write_percent(ch: &mut PWM, percent: f32) {
        let max = ch.max_duty_cycle();
        // `as` saturates, NaN becomes 0
        let duty = (percent / 100.0 * max as f32).round() as u16;
        ch.set_duty_cycle(duty.min(max)).ok();
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last commanded level, after the optional limit.
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Last commanded (channel A, channel B) percentages.
    #[inline]
    pub fn channels(&self) -> (f32, f32) {
        (self.duty_a, self.duty_b)
    }

    #[cfg(test)]
    fn pwm(&self) -> (&PWM, &PWM) {
        (&self.ch_a, &self.ch_b)
    }

    /// Release the pins.
    pub fn free(self) -> (EN, PWM, PWM) {
        (self.enable, self.ch_a, self.ch_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPin, MockPwm};

    fn motor() -> DcMotor<MockPin, MockPwm> {
        DcMotor::new(MockPin::default(), MockPwm::new(), MockPwm::new())
    }

    #[test]
    fn positive_level_drives_channel_b() {
        let mut m = motor();
        m.set_level(50.0);
        assert_eq!(m.channels(), (0.0, 50.0));

        let (_, a, b) = m.free();
        assert_eq!(a.duty, 0);
        assert_eq!(b.duty, 500);
    }

    #[test]
    fn negative_level_drives_channel_a() {
        let mut m = motor();
        m.set_level(-30.0);
        assert_eq!(m.channels(), (30.0, 0.0));

        let (_, a, b) = m.free();
        assert_eq!(a.duty, 300);
        assert_eq!(b.duty, 0);
    }

    #[test]
    fn channels_are_mutually_exclusive() {
        let mut m = motor();
        let mut level = -150.0;
        while level <= 150.0 {
            m.set_level(level);
            let (a, b) = m.channels();
            if level == 0.0 {
                assert_eq!((a, b), (0.0, 0.0));
            } else {
                assert!((a == 0.0) != (b == 0.0), "level {level}: ({a}, {b})");
            }
            level += 7.5;
        }
    }

    #[test]
    fn levels_pass_through_unclamped_by_default() {
        let mut m = motor();
        m.set_level(330.0);
        assert_eq!(m.level(), 330.0);
        assert_eq!(m.channels(), (0.0, 330.0));

        let (_, _, b) = m.free();
        assert_eq!(b.duty, MockPwm::MAX_DUTY);
    }

    #[test]
    fn written_duty_never_exceeds_max() {
        let mut m = motor();
        for level in [100.0, 100.04, 330.0, -1e9, f32::INFINITY, f32::MAX] {
            m.set_level(level);
            let (a, b) = m.pwm();
            assert!(a.duty <= a.max_duty_cycle() && b.duty <= b.max_duty_cycle(), "{level}");
        }
        m.set_level(-330.0);
        assert_eq!(m.level(), -330.0);
        assert_eq!(m.pwm().0.duty, MockPwm::MAX_DUTY);
    }

    #[test]
    fn non_finite_limit_is_ignored() {
        let mut m = motor().with_level_limit(Some(f32::NAN));
        m.set_level(120.0);
        assert_eq!(m.level(), 120.0);

        let mut m = motor().with_level_limit(Some(f32::INFINITY));
        m.set_level(-50.0);
        assert_eq!(m.channels(), (50.0, 0.0));
    }

    #[test]
    fn optional_limit_bounds_magnitude() {
        let mut m = motor().with_level_limit(Some(80.0));
        m.set_level(330.0);
        assert_eq!(m.channels(), (0.0, 80.0));
        m.set_level(-95.0);
        assert_eq!(m.channels(), (80.0, 0.0));
        m.set_level(12.0);
        assert_eq!(m.level(), 12.0);
    }

    #[test]
    fn enable_and_disable_drive_the_enable_line() {
        let mut m = motor();
        m.enable();
        m.set_level(40.0);
        m.disable();
        assert_eq!(m.channels(), (0.0, 0.0));

        let (en, _, b) = m.free();
        assert!(!en.high);
        assert_eq!(b.duty, 0);
    }

    #[test]
    fn repeated_level_is_idempotent() {
        let mut m = motor();
        m.set_level(-20.0);
        m.set_level(-20.0);
        let (_, a, b) = m.free();
        assert_eq!((a.duty, b.duty), (200, 0));
    }
}
