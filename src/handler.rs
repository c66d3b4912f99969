//! # Completion handler
//!
//! The interrupt side of the acquisition core. A [`CompletionHandler`] is a
//! copyable handle onto the [`AcquisitionContext`] plus the selected
//! [`Mode`]; the interrupt vector turns the hardware status into an
//! [`Event`] and passes it on.
//!
//! The handler is either called directly, or registered once with [`bind`]
//! so the vector only has to call [`dispatch`]:
//!
//! ```rust, no_run
//! use adc_scan::{handler, AcquisitionContext, CompletionHandler, Event, Mode};
//!
//! static CONTEXT: AcquisitionContext = AcquisitionContext::new();
//!
//! handler::bind(CompletionHandler::new(&CONTEXT, Mode::BlockTransfer));
//!
//! // inside the transfer-complete interrupt, after clearing the flag
//! handler::dispatch(Event::TransferComplete);
//! ```

use core::cell::Cell;

use critical_section::Mutex;

use crate::{config::Mode, sequencer::ChannelSequencer, transfer, AcquisitionContext, Sample};

/// A completion notification reported by the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// One conversion finished; carries the value of the data register.
    ConversionComplete(Sample),
    /// The block-copy channel moved its last element.
    TransferComplete,
}

/// Interrupt-side entry point of one acquisition.
#[derive(Debug, Clone, Copy)]
pub struct CompletionHandler<'a> {
    context: &'a AcquisitionContext,
    mode: Mode,
}

impl<'a> CompletionHandler<'a> {
    /// Create a handler for `context` running in `mode`.
    pub const fn new(context: &'a AcquisitionContext, mode: Mode) -> Self {
        Self { context, mode }
    }

    /// The strategy this handler serves.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Process one event. Runs to completion; must not be re-entered.
    ///
    /// Events that do not belong to the selected strategy are ignored, as the
    /// matching notification is never enabled for it.
    pub fn on_event(&self, event: Event) {
        match (self.mode, event) {
            (Mode::Interrupt, Event::ConversionComplete(reading)) => {
                ChannelSequencer::new(self.context).on_conversion_complete(reading)
            }
            (Mode::BlockTransfer, Event::TransferComplete) => {
                transfer::on_transfer_complete(self.context)
            }
            (mode, event) => trace!("ignoring {:?} in {:?} mode", event, mode),
        }
    }
}

static HANDLER: Mutex<Cell<Option<CompletionHandler<'static>>>> = Mutex::new(Cell::new(None));

/// Register the handler that [`dispatch`] forwards to, replacing any previous
/// one.
pub fn bind(handler: CompletionHandler<'static>) {
    critical_section::with(|cs| HANDLER.borrow(cs).set(Some(handler)));
}

/// Remove the registered handler.
pub fn unbind() {
    critical_section::with(|cs| HANDLER.borrow(cs).set(None));
}

/// Forward `event` to the registered handler. Returns `false` if nothing is
/// bound.
pub fn dispatch(event: Event) -> bool {
    let handler = critical_section::with(|cs| HANDLER.borrow(cs).get());

    match handler {
        Some(handler) => {
            handler.on_event(event);
            true
        }
        None => false,
    }
}
