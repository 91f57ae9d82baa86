// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCU-level wrappers. Only [`pins`] is target independent; the rest program STM32F7 registers
//! and exist on the target only.

pub mod pins;

#[cfg(target_os = "none")]
pub mod board;
#[cfg(target_os = "none")]
pub mod encoder;
#[cfg(target_os = "none")]
pub mod gpio;
#[cfg(target_os = "none")]
pub mod pwm;
#[cfg(target_os = "none")]
pub mod usart;

#[cfg(target_os = "none")]
pub use board::{Board, MotorPeripherals};
#[cfg(target_os = "none")]
pub use encoder::Encoder;
#[cfg(target_os = "none")]
pub use usart::Usart;

pub use pins::{MotorPins, PinError, PinId};
