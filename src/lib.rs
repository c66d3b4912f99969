//! Three-channel analog acquisition core.
//!
//! Samples three analog inputs in a repeating cycle and makes each complete
//! set of readings available to the application. Two acquisition strategies
//! are provided, selected once through [`Config`]:
//!
//! - [`Mode::Interrupt`]: the converter raises one interrupt per conversion
//!   and a [`ChannelSequencer`] stores each reading in turn.
//! - [`Mode::BlockTransfer`]: a one-shot block-copy (DMA) channel moves the
//!   three readings into memory and raises a single interrupt per cycle.
//!
//! Both end the same way: the [`SampleBuffer`] holds readings `[c0, c1, c2]`
//! and the [`CompletionSignal`] is raised. The [`AcquisitionController`]
//! waits for that signal, hands the buffer to the application, clears the
//! signal and starts over.
//!
//! The core drives hardware only through the [`Converter`] and
//! [`TransferChannel`] traits. An implementation for the STM32F0x1 is
//! available behind the `stm32f0` feature.
//!
//! ```rust, no_run
//! use adc_scan::{handler, AcquisitionContext, AcquisitionController, Config};
//! use adc_scan::{Converter, TransferChannel};
//!
//! static CONTEXT: AcquisitionContext = AcquisitionContext::new();
//!
//! fn acquire(adc: impl Converter, dma: impl TransferChannel) -> ! {
//!     let mut controller = AcquisitionController::new(adc, dma, &CONTEXT, Config::default());
//!     controller.init();
//!     handler::bind(controller.handler());
//!
//!     controller.run(|samples| {
//!         let [_c0, _c1, _c2] = samples.read();
//!     })
//! }
//! ```
//!
//! ## Feature Flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]
#![deny(missing_docs, rust_2018_idioms)]

// MUST be the first module
mod fmt;

mod config;
mod context;
mod controller;
pub mod handler;
#[cfg(test)]
mod mock;
pub mod peripheral;
mod sequencer;
#[cfg(feature = "stm32f0")]
pub mod stm32f0;
mod transfer;

pub use self::{
    config::{Config, Mode},
    context::{AcquisitionContext, CompletionSignal, SampleBuffer},
    controller::AcquisitionController,
    handler::{CompletionHandler, Event},
    peripheral::{
        Converter,
        ConverterConfig,
        Priority,
        SampleTime,
        TransferChannel,
        TransferDescriptor,
        TransferPriority,
    },
    sequencer::ChannelSequencer,
    transfer::{CycleState, TransferEngine},
};

/// A single conversion result. Only the low 12 bits are used.
pub type Sample = u16;

/// Number of scanned input channels.
pub const CHANNEL_COUNT: usize = 3;

// Scanned channels, in conversion order.
const CHANNELS: [u8; CHANNEL_COUNT] = [0, 1, 2];

/// Acquisition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A cycle was requested before the converter reported ready.
    NotReady,
    /// A block transfer was triggered without re-arming the channel.
    NotArmed,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotReady => write!(f, "converter not ready"),
            Self::NotArmed => write!(f, "transfer channel not armed"),
        }
    }
}

impl core::error::Error for Error {}
