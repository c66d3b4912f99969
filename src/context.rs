//! # Acquisition context
//!
//! The [`SampleBuffer`] and the [`CompletionSignal`] are the only state
//! shared between the controller loop and the completion handler. Both live
//! in an [`AcquisitionContext`], which is usually placed in a `static` so the
//! interrupt side can reach it for the lifetime of the program:
//!
//! ```rust, no_run
//! use adc_scan::AcquisitionContext;
//!
//! static CONTEXT: AcquisitionContext = AcquisitionContext::new();
//! ```
//!
//! No lock protects either value. The handler is the only writer of the
//! buffer slots and the only party raising the signal, the controller is the
//! only reader and the only party clearing it. Slot stores are ordered before
//! the signal's release store, so once the controller observes a raised
//! signal it observes the complete buffer as well.

use portable_atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};

use crate::{Sample, CHANNEL_COUNT};

/// Fixed-size storage for the most recent reading of each channel.
///
/// Index `i` always holds the reading of input channel `i`. The buffer is
/// never resized and starts out all zero.
pub struct SampleBuffer {
    slots: [AtomicU16; CHANNEL_COUNT],
}

impl SampleBuffer {
    /// Create an all-zero buffer.
    pub const fn new() -> Self {
        Self {
            slots: [AtomicU16::new(0), AtomicU16::new(0), AtomicU16::new(0)],
        }
    }

    /// The reading stored for `channel`, or `None` if the channel does not
    /// exist.
    pub fn get(&self, channel: usize) -> Option<Sample> {
        self.slots
            .get(channel)
            .map(|slot| slot.load(Ordering::Relaxed))
    }

    /// All three readings, in channel order.
    pub fn read(&self) -> [Sample; CHANNEL_COUNT] {
        [
            self.slots[0].load(Ordering::Relaxed),
            self.slots[1].load(Ordering::Relaxed),
            self.slots[2].load(Ordering::Relaxed),
        ]
    }

    pub(crate) fn store(&self, channel: usize, sample: Sample) {
        self.slots[channel].store(sample, Ordering::Relaxed);
    }

    /// Base address of the buffer, used as the auto-incrementing destination
    /// of a block transfer.
    pub(crate) fn as_mut_ptr(&self) -> *mut Sample {
        // `AtomicU16` has the same in-memory representation as `u16`.
        self.slots.as_ptr() as *mut Sample
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for SampleBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.read()).finish()
    }
}

/// Single-bit handshake telling the controller that a full cycle of readings
/// is ready.
///
/// Raised with release ordering by the completion handler, observed with
/// acquire ordering and cleared by the controller.
#[derive(Debug)]
pub struct CompletionSignal {
    raised: AtomicBool,
}

impl CompletionSignal {
    /// Create a lowered signal.
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Whether a full cycle has completed since the signal was last cleared.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    pub(crate) fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    pub(crate) fn clear(&self) {
        self.raised.store(false, Ordering::Release);
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a cycle produces, plus the position of the interrupt-driven
/// scan.
///
/// One context is created at start-up and handed by reference to the
/// [`AcquisitionController`](crate::AcquisitionController) and, through a
/// [`CompletionHandler`](crate::CompletionHandler), to the interrupt side.
#[derive(Debug)]
pub struct AcquisitionContext {
    pub(crate) buffer: SampleBuffer,
    pub(crate) signal: CompletionSignal,
    // Channel whose result the sequencer expects next.
    pub(crate) channel: AtomicU8,
}

impl AcquisitionContext {
    /// Create a context with an all-zero buffer, a lowered signal and the
    /// scan positioned on channel 0.
    pub const fn new() -> Self {
        Self {
            buffer: SampleBuffer::new(),
            signal: CompletionSignal::new(),
            channel: AtomicU8::new(0),
        }
    }

    /// The sample buffer.
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// The completion signal.
    pub fn signal(&self) -> &CompletionSignal {
        &self.signal
    }
}

impl Default for AcquisitionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed_and_lowered() {
        let context = AcquisitionContext::new();

        assert_eq!(context.buffer().read(), [0, 0, 0]);
        assert!(!context.signal().is_raised());
        assert_eq!(context.channel.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn get_rejects_missing_channel() {
        let buffer = SampleBuffer::new();
        buffer.store(1, 4095);

        assert_eq!(buffer.get(1), Some(4095));
        assert_eq!(buffer.get(CHANNEL_COUNT), None);
    }

    #[test]
    fn base_pointer_addresses_consecutive_slots() {
        let buffer = SampleBuffer::new();
        let base = buffer.as_mut_ptr();

        unsafe {
            base.write_volatile(7);
            base.add(1).write_volatile(8);
            base.add(2).write_volatile(9);
        }

        assert_eq!(buffer.read(), [7, 8, 9]);
    }

    #[test]
    fn signal_latches_until_cleared() {
        let signal = CompletionSignal::new();

        signal.raise();
        assert!(signal.is_raised());
        assert!(signal.is_raised());

        signal.clear();
        assert!(!signal.is_raised());
    }
}
