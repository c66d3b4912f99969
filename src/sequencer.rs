//! # Channel sequencer
//!
//! Interrupt-driven scan. The converter walks channels 0, 1 and 2 on its own
//! after a single trigger and reports each result with a conversion-complete
//! interrupt. The sequencer only tracks where in that order the scan is:
//!
//! | expected | action            | next | signal |
//! |----------|-------------------|------|--------|
//! | 0        | `buffer[0] = v`   | 1    | -      |
//! | 1        | `buffer[1] = v`   | 2    | -      |
//! | 2        | `buffer[2] = v`   | 0    | raised |
//!
//! The expected channel is written only here, from the completion handler.
//! There is no guard against events arriving without a trigger: a fourth
//! event is stored as channel 0 again, overwrites `buffer[0]` without
//! re-raising the signal, and leaves the next cycle one channel ahead.

use portable_atomic::Ordering;

use crate::{AcquisitionContext, Sample, CHANNEL_COUNT};

/// Per-conversion state machine of the interrupt strategy.
///
/// A sequencer is a cheap handle onto an [`AcquisitionContext`]; the expected
/// channel lives in the context so the controller and the interrupt side see
/// the same position.
#[derive(Debug, Clone, Copy)]
pub struct ChannelSequencer<'a> {
    context: &'a AcquisitionContext,
}

impl<'a> ChannelSequencer<'a> {
    /// Create a sequencer over `context`.
    pub const fn new(context: &'a AcquisitionContext) -> Self {
        Self { context }
    }

    /// The channel whose result is expected next.
    pub fn channel_index(&self) -> u8 {
        self.context.channel.load(Ordering::Relaxed)
    }

    /// Handle one conversion-complete event carrying `reading`.
    ///
    /// Must only be called from the completion handler.
    pub fn on_conversion_complete(&self, reading: Sample) {
        let channel = self.channel_index() as usize;
        trace!("conversion complete: channel {} = {}", channel, reading);

        self.context.buffer.store(channel, reading);

        if channel + 1 < CHANNEL_COUNT {
            self.context
                .channel
                .store(channel as u8 + 1, Ordering::Relaxed);
        } else {
            self.context.channel.store(0, Ordering::Relaxed);
            self.context.signal.raise();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_events_fill_buffer_and_raise_signal() {
        let context = AcquisitionContext::new();
        let sequencer = ChannelSequencer::new(&context);

        sequencer.on_conversion_complete(100);
        sequencer.on_conversion_complete(200);
        sequencer.on_conversion_complete(300);

        assert_eq!(context.buffer().read(), [100, 200, 300]);
        assert!(context.signal().is_raised());
        assert_eq!(sequencer.channel_index(), 0);
    }

    #[test]
    fn signal_stays_low_until_last_channel() {
        let context = AcquisitionContext::new();
        let sequencer = ChannelSequencer::new(&context);

        sequencer.on_conversion_complete(1);
        assert!(!context.signal().is_raised());
        assert_eq!(sequencer.channel_index(), 1);

        sequencer.on_conversion_complete(2);
        assert!(!context.signal().is_raised());
        assert_eq!(sequencer.channel_index(), 2);

        sequencer.on_conversion_complete(3);
        assert!(context.signal().is_raised());
    }

    #[test]
    fn stray_fourth_event_overwrites_first_slot() {
        let context = AcquisitionContext::new();
        let sequencer = ChannelSequencer::new(&context);

        for reading in [10, 20, 30, 40] {
            sequencer.on_conversion_complete(reading);
        }

        assert_eq!(context.buffer().read(), [40, 20, 30]);
        assert!(context.signal().is_raised());
        assert_eq!(sequencer.channel_index(), 1);
    }

    #[test]
    fn copies_share_the_scan_position() {
        let context = AcquisitionContext::new();
        let interrupt_side = ChannelSequencer::new(&context);
        let controller_side = interrupt_side;

        interrupt_side.on_conversion_complete(4095);
        assert_eq!(controller_side.channel_index(), 1);

        interrupt_side.on_conversion_complete(0);
        interrupt_side.on_conversion_complete(0);
        assert_eq!(controller_side.channel_index(), 0);
    }
}
