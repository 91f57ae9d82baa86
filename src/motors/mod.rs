// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Actuator Abstractions
//!
//! This module contains motor-level wrappers that sit above the raw `hw` layer.
//!
//! ## Modules
//!
//! - [`dc_motor`] - Brushed DC motor on a dual-PWM H-bridge.

pub mod dc_motor;

pub use dc_motor::DcMotor;
