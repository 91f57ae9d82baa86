// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-channel edge-aligned PWM on a general-purpose timer.
//!
//! CH1 and CH2 run in PWM mode 1 at the same frequency with preloaded compare registers. Each
//! channel implements [`SetDutyCycle`], which is what [`DcMotor`](crate::motors::DcMotor) drives.

use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use stm32f7xx_hal::pac;

use super::gpio;
use super::pins::{check_channels, PinError, TimerPin};

/// OCxM = 110 (PWM mode 1) with OCxPE for CH1 and CH2 in CCMR1.
const CCMR1_PWM1_PRELOAD: u32 = (0b110 << 4) | (1 << 3) | (0b110 << 12) | (1 << 11);

/// One compare channel of a PWM timer.
pub struct PwmChannel<TIM> {
    channel: u8,
    max_duty: u16,
    _tim: PhantomData<TIM>,
}

impl<TIM> PwmChannel<TIM> {
    #[inline]
    pub fn channel(&self) -> u8 {
        self.channel
    }
}

impl<TIM> ErrorType for PwmChannel<TIM> {
    type Error = Infallible;
}

/// Prescaler and auto-reload for `freq_hz` from timer clock `tclk_hz`.
fn timebase(tclk_hz: u32, freq_hz: u32) -> (u32, u32) {
    let ticks = (tclk_hz / freq_hz.max(1)).max(2);
    let psc = (ticks - 1) / 0x1_0000;
    let arr = ticks / (psc + 1) - 1;
    (psc, arr)
}

macro_rules! pwm_timer {
    ($($TIM:ident: ($ctor:ident, $n:expr, $en:ident),)+) => {
        $(
            /// Start the timer at `freq_hz` and return its two channels, duty zero.
            ///
            /// `tclk_hz` is the timer kernel clock (`clocks.timclk1()`). The channels reach the
            /// timer through the PAC pointer once `tim` is consumed here.
            pub fn $ctor(
                tim: pac::$TIM,
                pins: &[TimerPin; 2],
                tclk_hz: u32,
                freq_hz: u32,
            ) -> Result<(PwmChannel<pac::$TIM>, PwmChannel<pac::$TIM>), PinError<'static>> {
                check_channels($n, pins)?;
                for p in pins {
                    gpio::into_alternate(p.pin, p.af);
                }

                let rcc = unsafe { &*pac::RCC::ptr() };
                rcc.apb1enr.modify(|_, w| w.$en().set_bit());

                tim.cr1.modify(|_, w| w.cen().clear_bit());

                let (psc, arr) = timebase(tclk_hz, freq_hz);
                tim.psc.write(|w| unsafe { w.bits(psc) });
                tim.arr.write(|w| unsafe { w.bits(arr) });
                tim.ccr1.write(|w| unsafe { w.bits(0) });
                tim.ccr2.write(|w| unsafe { w.bits(0) });

                tim.ccmr1_output()
                    .write(|w| unsafe { w.bits(CCMR1_PWM1_PRELOAD) });
                tim.ccer.modify(|_, w| {
                    w.cc1p()
                        .clear_bit()
                        .cc2p()
                        .clear_bit()
                        .cc1e()
                        .set_bit()
                        .cc2e()
                        .set_bit()
                });

                // ARPE, then UG to load the shadow registers
                tim.cr1.modify(|r, w| unsafe { w.bits(r.bits() | (1 << 7)) });
                tim.egr.write(|w| unsafe { w.bits(1) });
                tim.cr1.modify(|_, w| w.cen().set_bit());

                let max_duty = (arr + 1).min(u16::MAX as u32) as u16;
                Ok((
                    PwmChannel { channel: 1, max_duty, _tim: PhantomData },
                    PwmChannel { channel: 2, max_duty, _tim: PhantomData },
                ))
            }

            impl SetDutyCycle for PwmChannel<pac::$TIM> {
                #[inline]
                fn max_duty_cycle(&self) -> u16 {
                    self.max_duty
                }

                fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
                    let tim = unsafe { &*pac::$TIM::ptr() };
                    let duty = duty.min(self.max_duty) as u32;
                    match self.channel {
                        1 => tim.ccr1.write(|w| unsafe { w.bits(duty) }),
                        _ => tim.ccr2.write(|w| unsafe { w.bits(duty) }),
                    }
                    Ok(())
                }
            }
        )+
    };
}

pwm_timer! {
    TIM2: (tim2, 2, tim2en),
    TIM3: (tim3, 3, tim3en),
    TIM4: (tim4, 4, tim4en),
    TIM5: (tim5, 5, tim5en),
}
