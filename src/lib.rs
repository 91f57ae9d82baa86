// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # TwinMotor Firmware
//!
//! Closed-loop position control for two DC motors on a Nucleo-F767ZI, written in Rust. Each motor
//! runs an independent encoder → proportional controller → H-bridge pipeline, sequenced by its own
//! state-machine task under a single cooperative scheduler.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | MCU-level wrappers around GPIO, timers (encoder + PWM), USART, and the pin map |
//! | [`drivers`] | Device-level logic above `hw` (quadrature position tracking) |
//! | [`motors`] | Motor-level abstractions (dual-PWM DC motor) |
//! | [`control`] | Control algorithms (proportional controller) |
//! | [`sched`] | Cooperative priority scheduler, shares and queues |
//! | [`tasks`] | Per-motor control state machines |
//! | [`protocol`] | Telemetry line protocol shared with the host plotting tool |
//! | [`config`] | Board bindings, gains, setpoints and task timing |
//!
//! ## Getting Started
//!
//! Run the host-side unit tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod drivers;
pub mod hw;
pub mod motors;
pub mod protocol;
pub mod sched;
pub mod tasks;

#[cfg(test)]
pub(crate) mod mock;
