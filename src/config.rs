// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board bindings, gains, setpoints and task timing.
//!
//! Everything the firmware needs to know about the rig lives here as `const` data. Pin names are
//! validated by [`MotorPins::resolve`] when the board is brought up.

use crate::hw::pins::MotorPins;
use crate::tasks::{Completion, MotorTaskConfig};

pub use crate::drivers::COUNTER_MODULUS;

/// ST-LINK virtual COM port rate.
pub const CONSOLE_BAUD: u32 = 115_200;

/// H-bridge PWM carrier.
pub const PWM_FREQ_HZ: u32 = 1_000;

/// SysTick rate driving the scheduler clock.
pub const TICK_HZ: u32 = 1_000;

/// Everything about one motor: wiring, control parameters and scheduling.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MotorConfig {
    /// Scheduler task name
    pub name: &'static str,
    /// Larger runs first
    pub priority: u8,
    pub period_ms: u32,
    pub pins: MotorPins,
    /// Optional magnitude bound on the commanded level, in percent
    pub level_limit: Option<f32>,
    pub task: MotorTaskConfig,
}

/// Motor 1: bridge on TIM5 (PA0/PA1), encoder on TIM8 (PC6/PC7). Parks after one run.
pub const MOTOR1: MotorConfig = MotorConfig {
    name: "Motor_1",
    priority: 2,
    period_ms: 10,
    pins: MotorPins {
        enable: "PC1",
        in1: "PA0",
        in2: "PA1",
        pwm_timer: 5,
        enc_a: "PC6",
        enc_b: "PC7",
        encoder_timer: 8,
    },
    level_limit: None,
    task: MotorTaskConfig::new(1, 3300, 1.0).with_completion(Completion::Idle),
};

/// Motor 2: bridge on TIM3 (PB4/PB5), encoder on TIM4 (PB6/PB7). Streams its step response.
pub const MOTOR2: MotorConfig = MotorConfig {
    name: "Motor_2",
    priority: 1,
    period_ms: 15,
    pins: MotorPins {
        enable: "PA10",
        in1: "PB4",
        in2: "PB5",
        pwm_timer: 3,
        enc_a: "PB6",
        enc_b: "PB7",
        encoder_timer: 4,
    },
    level_limit: None,
    task: MotorTaskConfig::new(2, 3300, 0.1).with_completion(Completion::Report),
};

pub const MOTORS: [MotorConfig; 2] = [MOTOR1, MOTOR2];
