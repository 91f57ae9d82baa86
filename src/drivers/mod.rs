// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Level Logic
//!
//! This module sits above the raw `hw/` layer and below the application logic. Everything here is
//! generic over small hardware traits, so it builds and tests on the host.
//!
//! ## Existing drivers
//!
//! - [`encoder_tracker`] – unbounded position from a wrapping quadrature counter

pub mod encoder_tracker;

pub use encoder_tracker::{EncoderTracker, QuadratureCounter, COUNTER_MODULUS};
