// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

pub mod telemetry;

pub use telemetry::{BlockParser, Event, Sample};
