// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Application Tasks
//!
//! - [`motor_task`] - Closed-loop control sequence for one motor.

pub mod motor_task;

pub use motor_task::{
    Completion, CycleReport, MotorTask, MotorTaskConfig, Outputs, TaskState, CYCLE_QUEUE_LEN,
    RUN_ITERATIONS,
};
