// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Quadrature encoder support via STM32F7 timers in encoder mode.
//!
//! The counter wraps at [`COUNTER_MODULUS`] rather than at the register width so that every encoder
//! timer, 16 or 32 bit, presents the same range to
//! [`EncoderTracker`](crate::drivers::EncoderTracker).

use stm32f7xx_hal::pac;

use super::gpio;
use super::pins::{check_channels, PinError, TimerPin};
use crate::drivers::{QuadratureCounter, COUNTER_MODULUS};

pub struct Encoder<TIM> {
    tim: TIM,
}

impl<TIM> Encoder<TIM> {
    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> TIM {
        self.tim
    }
}

macro_rules! encoder {
    ($($TIM:ident: ($ctor:ident, $n:expr, $enr:ident, $en:ident),)+) => {
        $(
            impl Encoder<pac::$TIM> {
                /// Configure the timer as a quadrature encoder on phase pins `pins` (CH1, CH2).
                pub fn $ctor(
                    tim: pac::$TIM,
                    pins: &[TimerPin; 2],
                ) -> Result<Self, PinError<'static>> {
                    check_channels($n, pins)?;
                    for p in pins {
                        gpio::into_alternate(p.pin, p.af);
                    }

                    let rcc = unsafe { &*pac::RCC::ptr() };
                    rcc.$enr.modify(|_, w| w.$en().set_bit());

                    // Disable counter while configuring
                    tim.cr1.modify(|_, w| w.cen().clear_bit());

                    tim.arr.write(|w| unsafe { w.bits(COUNTER_MODULUS - 1) });

                    // Slave mode: encoder mode 3 (count on both TI1 and TI2)
                    tim.smcr.modify(|_, w| w.sms().bits(0b011));

                    // Configure CH1/CH2 as inputs from TI1/TI2
                    tim.ccmr1_input().modify(|_, w| w.cc1s().ti1().cc2s().ti2());

                    // Polarity and enable for both channels.
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

                    tim.cnt.write(|w| unsafe { w.bits(0) });
                    tim.cr1.modify(|_, w| w.cen().set_bit());

                    Ok(Self { tim })
                }
            }

            impl QuadratureCounter for Encoder<pac::$TIM> {
                #[inline]
                fn count(&self) -> u32 {
                    self.tim.cnt.read().bits() % COUNTER_MODULUS
                }
            }
        )+
    };
}

encoder! {
    TIM2: (tim2, 2, apb1enr, tim2en),
    TIM3: (tim3, 3, apb1enr, tim3en),
    TIM4: (tim4, 4, apb1enr, tim4en),
    TIM5: (tim5, 5, apb1enr, tim5en),
    TIM8: (tim8, 8, apb2enr, tim8en),
}
