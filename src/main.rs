// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use core::fmt::Write;
    use core::sync::atomic::{AtomicU32, Ordering};

    use cortex_m::peripheral::{syst::SystClkSource, SCB};
    use cortex_m_rt::{entry, exception};
    use heapless::String;
    use panic_halt as _;

    use hal::{
        pac,
        prelude::*,
        serial::{Config, Serial},
    };
    use stm32f7xx_hal as hal;

    use twinmotor::config;
    use twinmotor::hw::{Board, MotorPeripherals, Usart};
    use twinmotor::protocol::telemetry::{INTERRUPT, SOFT_RESET};
    use twinmotor::sched::{Overflow, Queue, Scheduler, Share};
    use twinmotor::tasks::{CycleReport, MotorTask, Outputs, CYCLE_QUEUE_LEN};

    /// Milliseconds since boot, advanced by SysTick.
    static MILLIS: AtomicU32 = AtomicU32::new(0);

    #[exception]
    fn SysTick() {
        MILLIS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn now_ms() -> u32 {
        MILLIS.load(Ordering::Relaxed)
    }

    fn park() -> ! {
        loop {
            cortex_m::asm::nop();
        }
    }

    #[entry]
    fn main() -> ! {
        // Peripherals
        let dp = pac::Peripherals::take().unwrap();
        let cp = cortex_m::Peripherals::take().unwrap();

        // Clocks
        let rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.freeze();

        // USART3 (ST-LINK VCP)
        let gpiod = dp.GPIOD.split();
        let tx = gpiod.pd8.into_alternate::<7>();
        let rx = gpiod.pd9.into_alternate::<7>();
        let usart_cfg = Config {
            baud_rate: config::CONSOLE_BAUD.bps(),
            ..Default::default()
        };
        let serial = Serial::new(dp.USART3, (tx, rx), &clocks, usart_cfg);
        let mut usart = Usart::new(serial);

        // Scheduler clock
        let mut syst = cp.SYST;
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(clocks.sysclk().raw() / config::TICK_HZ - 1);
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();

        usart.println("twinmotor: dual motor position control");

        // Motors
        let peripherals = MotorPeripherals {
            gpioa: dp.GPIOA,
            gpiob: dp.GPIOB,
            gpioc: dp.GPIOC,
            tim3: dp.TIM3,
            tim4: dp.TIM4,
            tim5: dp.TIM5,
            tim8: dp.TIM8,
        };
        let board = match Board::new(peripherals, clocks.timclk1().raw()) {
            Ok(board) => board,
            Err(e) => {
                let _ = write!(usart, "motor bring-up failed: {}\r\n", e);
                park();
            }
        };

        // Shares
        let position1: Share<i64> = Share::new("Share 0", 0);
        let position2: Share<i64> = Share::new("Share 1", 0);
        let cycles: Queue<CycleReport, CYCLE_QUEUE_LEN> = Queue::new("Queue 0", Overflow::Reject);

        // Tasks
        let (m1, m2) = (&config::MOTOR1, &config::MOTOR2);
        let mut task1 = MotorTask::new(m1.task, board.motor1.encoder, board.motor1.motor)
            .with_outputs(Outputs {
                position: Some(&position1),
                cycles: Some(&cycles),
            });
        let mut task2 = MotorTask::new(m2.task, board.motor2.encoder, board.motor2.motor)
            .with_outputs(Outputs {
                position: Some(&position2),
                cycles: Some(&cycles),
            });

        let mut sched: Scheduler<'_, 2> = Scheduler::new();
        for (result, m) in [
            (sched.add(m1.name, m1.priority, m1.period_ms, &mut task1), m1),
            (sched.add(m2.name, m2.priority, m2.period_ms, &mut task2), m2),
        ] {
            match result {
                Ok(()) => {
                    let _ = write!(
                        usart,
                        "task {}: priority {}, period {} ms\r\n",
                        m.name, m.priority, m.period_ms
                    );
                }
                Err(e) => {
                    let _ = write!(usart, "task {}: {}\r\n", m.name, e);
                    park();
                }
            }
        }

        usart.println("Press Ctrl-C to stop and show diagnostics.");

        loop {
            if usart.try_read() == Some(INTERRUPT) {
                break;
            }
            if sched.poll(now_ms(), &mut usart).is_break() {
                break;
            }
        }

        // Stop both bridges before the blocking diagnostics writes.
        let mut table: String<256> = String::new();
        let _ = write!(table, "{}", sched);
        drop(sched);
        task1.halt();
        task2.halt();

        // Diagnostics
        usart.println("");
        usart.write_str(&table);
        let _ = write!(usart, "{}\r\n{}\r\n{}\r\n", position1, position2, cycles);
        while let Some(r) = cycles.get() {
            let _ = write!(
                usart,
                "motor{} cycle {}: position {}\r\n",
                r.motor, r.cycle, r.position
            );
        }
        if usart.rx_errors() > 0 {
            let _ = write!(usart, "console rx errors: {}\r\n", usart.rx_errors());
        }
        usart.flush();

        loop {
            if usart.try_read() == Some(SOFT_RESET) {
                SCB::sys_reset();
            }
        }
    }
}

/// Hosts only build the library and its tests.
#[cfg(not(target_os = "none"))]
fn main() {}
