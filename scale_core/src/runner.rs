//! Drive a `Controller` until it powers off or is told to stop.

use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;

use crate::controller::Controller;
use crate::error::Result;
use crate::status::TickStatus;
use crate::util::ms;

/// Why `run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Idle timeout fired and the power line was asserted.
    PoweredOff,
    /// The interrupt flag was raised (Ctrl-C).
    Interrupted,
    /// `max_ticks` reached.
    TickLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub reason: StopReason,
    pub ticks: u64,
}

/// Run the boot sequence, then tick and pause `tick_ms` until the device
/// powers off, `interrupt` is raised, or `max_ticks` ticks have run.
///
/// The interrupt flag is checked before every tick; a tick in progress
/// always completes.
pub fn run(
    controller: &mut Controller,
    interrupt: &AtomicBool,
    max_ticks: Option<u64>,
) -> Result<RunOutcome> {
    controller.begin();
    let pause = ms(controller.timing().tick_ms);
    let clock = std::sync::Arc::clone(&controller.clock);
    let mut ticks: u64 = 0;

    loop {
        if interrupt.load(Ordering::Relaxed) {
            tracing::info!(ticks, "interrupted");
            return Ok(RunOutcome {
                reason: StopReason::Interrupted,
                ticks,
            });
        }
        if max_ticks.is_some_and(|max| ticks >= max) {
            tracing::info!(ticks, "tick limit reached");
            return Ok(RunOutcome {
                reason: StopReason::TickLimit,
                ticks,
            });
        }

        let status = controller
            .tick()
            .wrap_err_with(|| format!("tick {ticks}"))?;
        ticks += 1;

        if status == TickStatus::ShutDown {
            return Ok(RunOutcome {
                reason: StopReason::PoweredOff,
                ticks,
            });
        }
        clock.sleep(pause);
    }
}
