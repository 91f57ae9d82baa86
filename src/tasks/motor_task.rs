// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Per-motor control task.
//!
//! Each motor runs the same sequence as an explicit state machine, one bounded unit of work per
//! [`step`](crate::sched::Task::step):
//!
//! ```text
//! Init ─► AwaitInput ─► Run(0) ─► … ─► Run(n-1) ─┬─► Stop ─► Idle          (Completion::Idle)
//!              ▲                                 ├─► Stop ─► Report(k) ─► Idle  (Completion::Report)
//!              ├─────────────────────────────────┤   (setpoint += step)   (Completion::Oscillate)
//!              └────────────── Stop ◄────────────┘   (setpoint *= factor) (Completion::Ratchet)
//! ```
//!
//! A `Run` step is one encoder read, one controller update and one actuator command. On the last
//! iteration the encoder is zeroed and the completion policy decides what comes next.

use core::ops::ControlFlow;

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use heapless::Vec;

use crate::control::Proportional;
use crate::drivers::{EncoderTracker, QuadratureCounter};
use crate::motors::DcMotor;
use crate::protocol::telemetry::{self, Sample};
use crate::sched::{Context, Queue, Share, Task};

/// Iterations of one closed-loop run.
pub const RUN_ITERATIONS: u16 = 100;

/// Samples kept per run for the report. Iterations past this are not recorded.
pub const SAMPLE_CAPACITY: usize = RUN_ITERATIONS as usize;

/// Depth of the cycle-report queue.
pub const CYCLE_QUEUE_LEN: usize = 16;

/// What a task does after the last iteration of a run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Completion {
    /// Stop the motor and idle.
    Idle,
    /// Stop the motor, stream the recorded samples, then idle.
    Report,
    /// Shift the setpoint by `setpoint_step`, drive the negated last output and start again.
    /// The setpoint saturates at the `i64` range.
    Oscillate { setpoint_step: i64 },
    /// Stop the motor, multiply the setpoint by `factor` and start again. The setpoint saturates
    /// at the `i64` range.
    Ratchet { factor: i64 },
}

/// Task state. Only [`MotorTask`]'s step changes it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskState {
    Init,
    AwaitInput,
    /// Closed-loop run, holding the index of the next iteration
    Run(u16),
    Stop,
    /// Streaming samples, holding the index of the next one
    Report(usize),
    Idle,
}

/// Static parameters of one motor task.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MotorTaskConfig {
    /// Motor number used in logs and cycle reports
    pub id: u8,
    /// Initial setpoint in encoder counts
    pub setpoint: i64,
    /// Gain assigned in `AwaitInput` when no other value was provided
    pub gain: f32,
    pub iterations: u16,
    pub completion: Completion,
}

impl MotorTaskConfig {
    pub const fn new(id: u8, setpoint: i64, gain: f32) -> Self {
        Self {
            id,
            setpoint,
            gain,
            iterations: RUN_ITERATIONS,
            completion: Completion::Idle,
        }
    }

    /// Number of iterations per run. Zero is treated as one.
    pub const fn with_iterations(mut self, iterations: u16) -> Self {
        self.iterations = if iterations == 0 { 1 } else { iterations };
        self
    }

    pub const fn with_completion(mut self, completion: Completion) -> Self {
        self.completion = completion;
        self
    }
}

/// Pushed to the cycle queue each time a run finishes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    pub motor: u8,
    /// 1 for the first completed run
    pub cycle: u32,
    /// Position at the last iteration, before zeroing
    pub position: i64,
}

/// Optional channels a task publishes to.
#[derive(Default)]
pub struct Outputs<'a> {
    /// Latest measured position
    pub position: Option<&'a Share<i64>>,
    /// One [`CycleReport`] per completed run
    pub cycles: Option<&'a Queue<CycleReport, CYCLE_QUEUE_LEN>>,
}

/// Control task for one motor. Owns the encoder, the controller and the motor exclusively.
pub struct MotorTask<'a, C, EN, PWM> {
    config: MotorTaskConfig,
    state: TaskState,

    encoder: EncoderTracker<C>,
    controller: Proportional,
    motor: DcMotor<EN, PWM>,

    pending_gain: Option<f32>,
    samples: Vec<Sample, SAMPLE_CAPACITY>,
    run_started_ms: u32,
    cycles: u32,

    outputs: Outputs<'a>,
}

impl<'a, C, EN, PWM> MotorTask<'a, C, EN, PWM>
where
    C: QuadratureCounter,
    EN: OutputPin,
    PWM: SetDutyCycle,
{
    /// Build a task around its hardware. Nothing is driven until the first step.
    ///
    /// The controller starts with zero gain; the real gain is assigned in `AwaitInput`.
    pub fn new(config: MotorTaskConfig, counter: C, motor: DcMotor<EN, PWM>) -> Self {
        Self {
            config,
            state: TaskState::Init,
            encoder: EncoderTracker::new(counter),
            controller: Proportional::new(config.setpoint, 0.0),
            motor,
            pending_gain: None,
            samples: Vec::new(),
            run_started_ms: 0,
            cycles: 0,
            outputs: Outputs::default(),
        }
    }

    pub fn with_outputs(mut self, outputs: Outputs<'a>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Offer a gain to be taken at the next `AwaitInput` instead of the configured one.
    pub fn provide_gain(&mut self, gain: f32) {
        self.pending_gain = Some(gain);
    }

    /// Zero the bridge, disable it and park the task. Used once the scheduler has been
    /// interrupted.
    pub fn halt(&mut self) {
        self.motor.set_level(0.0);
        self.motor.disable();
        self.state = TaskState::Idle;
    }

    fn init(&mut self, cx: &mut Context<'_>) {
        self.motor.enable();
        self.motor.set_level(0.0);
        self.encoder.zero();
        self.controller.set_setpoint(self.config.setpoint);

        let _ = write!(
            cx.out,
            "motor{}: ready, setpoint {}\r\n",
            self.config.id, self.config.setpoint
        );
        self.state = TaskState::AwaitInput;
    }

    fn await_input(&mut self, cx: &mut Context<'_>) {
        let _ = telemetry::write_marker(cx.out, telemetry::READY);

        let gain = self.pending_gain.take().unwrap_or(self.config.gain);
        self.controller.set_gain(gain);

        self.samples.clear();
        self.run_started_ms = cx.now_ms;
        self.state = TaskState::Run(0);
    }

    fn run(&mut self, i: u16, cx: &mut Context<'_>) {
        let position = self.encoder.read();
        let output = self.controller.run(position);
        self.motor.set_level(output);

        let _ = self.samples.push(Sample {
            time_ms: cx.now_ms.wrapping_sub(self.run_started_ms),
            position,
        });
        if let Some(share) = self.outputs.position {
            share.put(position);
        }

        if i + 1 >= self.config.iterations {
            self.complete(output, position);
        } else {
            self.state = TaskState::Run(i + 1);
        }
    }

    fn complete(&mut self, output: f32, position: i64) {
        self.encoder.zero();
        self.cycles += 1;

        if let Some(queue) = self.outputs.cycles {
            let _ = queue.put(CycleReport {
                motor: self.config.id,
                cycle: self.cycles,
                position,
            });
        }

        match self.config.completion {
            Completion::Oscillate { setpoint_step } => {
                let setpoint = self.controller.setpoint().saturating_add(setpoint_step);
                self.controller.set_setpoint(setpoint);
                self.motor.set_level(-output);
                self.state = TaskState::AwaitInput;
            }
            Completion::Idle | Completion::Report | Completion::Ratchet { .. } => {
                self.motor.set_level(0.0);
                self.state = TaskState::Stop;
            }
        }
    }

    fn stop(&mut self, cx: &mut Context<'_>) {
        self.state = match self.config.completion {
            Completion::Idle => TaskState::Idle,
            Completion::Report => {
                let _ = telemetry::write_marker(cx.out, telemetry::START);
                TaskState::Report(0)
            }
            Completion::Ratchet { factor } => {
                let setpoint = self.controller.setpoint().saturating_mul(factor);
                self.controller.set_setpoint(setpoint);
                TaskState::AwaitInput
            }
            Completion::Oscillate { .. } => TaskState::AwaitInput,
        };
    }

    fn report(&mut self, k: usize, cx: &mut Context<'_>) {
        match self.samples.get(k) {
            Some(sample) => {
                let _ = telemetry::write_sample(cx.out, sample);
                self.state = TaskState::Report(k + 1);
            }
            None => {
                let _ = telemetry::write_marker(cx.out, telemetry::END);
                self.state = TaskState::Idle;
            }
        }
    }

    #[inline]
    pub fn state(&self) -> TaskState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &MotorTaskConfig {
        &self.config
    }

    #[inline]
    pub fn encoder(&self) -> &EncoderTracker<C> {
        &self.encoder
    }

    #[inline]
    pub fn controller(&self) -> &Proportional {
        &self.controller
    }

    #[inline]
    pub fn motor(&self) -> &DcMotor<EN, PWM> {
        &self.motor
    }

    /// Samples of the current or last run.
    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Completed runs.
    #[inline]
    pub fn cycles(&self) -> u32 {
        self.cycles
    }
}

impl<C, EN, PWM> Task for MotorTask<'_, C, EN, PWM>
where
    C: QuadratureCounter,
    EN: OutputPin,
    PWM: SetDutyCycle,
{
    fn step(&mut self, cx: &mut Context<'_>) -> ControlFlow<()> {
        match self.state {
            TaskState::Init => self.init(cx),
            TaskState::AwaitInput => self.await_input(cx),
            TaskState::Run(i) => self.run(i, cx),
            TaskState::Stop => self.stop(cx),
            TaskState::Report(k) => self.report(k, cx),
            TaskState::Idle => {}
        }
        ControlFlow::Continue(())
    }
}
