//! # Configuration
//!
//! [`Config`] selects the acquisition strategy and carries the handful of
//! bring-up parameters the controller passes to the peripheral control
//! surface. The defaults reproduce the reference firmware: block-transfer
//! mode, the longest sample time on every channel, interrupt priority 1 and a
//! low-priority copy channel.
//!
//! ```rust
//! use adc_scan::{Config, Mode, SampleTime};
//!
//! let config = Config::default()
//!     .with_mode(Mode::Interrupt)
//!     .with_sample_time(SampleTime::Cycles71_5);
//!
//! assert_eq!(config.mode(), Mode::Interrupt);
//! ```

use crate::peripheral::{Priority, SampleTime, TransferPriority};

/// Acquisition strategy, fixed for the lifetime of a controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// One interrupt per conversion; the sequencer stores each reading and
    /// raises the signal after the third.
    Interrupt,
    /// The converter output is copied into the buffer by a one-shot block
    /// transfer; one interrupt per cycle.
    #[default]
    BlockTransfer,
}

/// Acquisition configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub struct Config {
    mode: Mode,
    sample_time: SampleTime,
    interrupt_priority: Priority,
    transfer_priority: TransferPriority,
}

impl Config {
    /// Select the acquisition strategy.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sample time programmed for each of the three channels.
    pub fn with_sample_time(mut self, sample_time: SampleTime) -> Self {
        self.sample_time = sample_time;
        self
    }

    /// Priority of the completion interrupt, whichever strategy raises it.
    pub fn with_interrupt_priority(mut self, priority: Priority) -> Self {
        self.interrupt_priority = priority;
        self
    }

    /// Arbitration priority of the block-copy channel.
    pub fn with_transfer_priority(mut self, priority: TransferPriority) -> Self {
        self.transfer_priority = priority;
        self
    }

    /// The selected strategy.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The per-channel sample time.
    pub fn sample_time(&self) -> SampleTime {
        self.sample_time
    }

    /// The completion interrupt priority.
    pub fn interrupt_priority(&self) -> Priority {
        self.interrupt_priority
    }

    /// The block-copy channel priority.
    pub fn transfer_priority(&self) -> TransferPriority {
        self.transfer_priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_firmware() {
        let config = Config::default();

        assert_eq!(config.mode(), Mode::BlockTransfer);
        assert_eq!(config.sample_time(), SampleTime::Cycles239_5);
        assert_eq!(config.interrupt_priority(), Priority(1));
        assert_eq!(config.transfer_priority(), TransferPriority::Low);
    }

    #[test]
    fn builder_overrides_single_fields() {
        let config = Config::default()
            .with_mode(Mode::Interrupt)
            .with_interrupt_priority(Priority(3))
            .with_transfer_priority(TransferPriority::High);

        assert_eq!(config.mode(), Mode::Interrupt);
        assert_eq!(config.interrupt_priority(), Priority(3));
        assert_eq!(config.transfer_priority(), TransferPriority::High);
        assert_eq!(config.sample_time(), SampleTime::Cycles239_5);
    }
}
