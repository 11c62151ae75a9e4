//! Status returned from each dispatch-loop tick.

/// Public status of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Keep ticking.
    Running,
    /// Idle timeout fired, the shutdown was announced and the power-cutoff
    /// line asserted. Terminal: further ticks do nothing.
    ShutDown,
}

impl TickStatus {
    pub fn is_shut_down(self) -> bool {
        matches!(self, TickStatus::ShutDown)
    }
}
