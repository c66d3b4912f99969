//! # Transfer engine
//!
//! Block-transfer scan. Instead of taking an interrupt per conversion, the
//! converter issues a copy request after each result and a block-copy
//! channel moves the three readings from the converter's data register into
//! the [`SampleBuffer`](crate::SampleBuffer). Only the end of the whole block
//! is signalled.
//!
//! The channel runs in one-shot mode: once it has copied three elements it
//! stops serving requests. Every cycle therefore starts with [`arm`], which
//! disables the channel, reloads the descriptor and enables it again.
//! [`trigger`] refuses to start the converter on an engine that has not been
//! re-armed, so a consumed descriptor can never produce a completion.
//!
//! [`arm`]: TransferEngine::arm
//! [`trigger`]: TransferEngine::trigger

use crate::{
    peripheral::{Converter, TransferChannel, TransferDescriptor, TransferPriority},
    AcquisitionContext,
    Error,
    Sample,
};

/// Where a block-transfer cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    /// No descriptor has been loaded yet.
    Idle,
    /// The descriptor is loaded and the channel enabled.
    Armed,
    /// The converter has been started; the copy is in flight.
    Converting,
    /// All three readings have landed and the signal is raised.
    Complete,
}

/// One-shot block-copy driver of the transfer strategy.
pub struct TransferEngine<'a, D> {
    channel: D,
    context: &'a AcquisitionContext,
    descriptor: TransferDescriptor,
    state: CycleState,
}

impl<'a, D> TransferEngine<'a, D>
where
    D: TransferChannel,
{
    /// Create an idle engine that copies from the converter register at
    /// `source` into the buffer of `context`.
    pub fn new(
        channel: D,
        context: &'a AcquisitionContext,
        source: *const Sample,
        priority: TransferPriority,
    ) -> Self {
        let descriptor =
            TransferDescriptor::one_shot(source, context.buffer.as_mut_ptr(), priority);

        Self {
            channel,
            context,
            descriptor,
            state: CycleState::Idle,
        }
    }

    /// Load the descriptor for the next block and enable the channel.
    pub fn arm(&mut self) {
        self.channel.disable();
        self.channel.configure(&self.descriptor);
        self.channel.enable();
        self.state = CycleState::Armed;
    }

    /// Start the converter. The channel copies its three results and raises
    /// the transfer-complete interrupt after the last one.
    ///
    /// Fails with [`Error::NotArmed`], without touching the converter, unless
    /// [`arm`](Self::arm) was called since the previous trigger.
    pub fn trigger<C>(&mut self, converter: &mut C) -> Result<(), Error>
    where
        C: Converter,
    {
        if self.state != CycleState::Armed {
            warn!("block transfer triggered while {:?}", self.state());
            return Err(Error::NotArmed);
        }

        converter.start_conversion();
        self.state = CycleState::Converting;
        Ok(())
    }

    /// Current cycle state.
    pub fn state(&self) -> CycleState {
        match self.state {
            CycleState::Converting if self.context.signal.is_raised() => CycleState::Complete,
            state => state,
        }
    }

    /// The descriptor loaded by every [`arm`](Self::arm).
    pub fn descriptor(&self) -> &TransferDescriptor {
        &self.descriptor
    }

    pub(crate) fn channel_mut(&mut self) -> &mut D {
        &mut self.channel
    }

    /// Give back the channel.
    pub fn release(self) -> D {
        self.channel
    }
}

/// Handle a transfer-complete event. Must only be called from the completion
/// handler.
pub(crate) fn on_transfer_complete(context: &AcquisitionContext) {
    trace!("transfer complete");
    context.signal.raise();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockConverter, MockTransfer};

    fn engine<'a>(
        context: &'a AcquisitionContext,
        converter: &MockConverter,
        transfer: &MockTransfer,
    ) -> TransferEngine<'a, MockTransfer> {
        TransferEngine::new(
            transfer.clone(),
            context,
            converter.data_register(),
            TransferPriority::Low,
        )
    }

    #[test]
    fn arm_reloads_descriptor_with_channel_disabled() {
        let context = AcquisitionContext::new();
        let converter = MockConverter::new();
        let transfer = MockTransfer::new();
        let mut engine = engine(&context, &converter, &transfer);

        assert_eq!(engine.state(), CycleState::Idle);
        engine.arm();

        let state = transfer.state();
        assert_eq!(engine.state(), CycleState::Armed);
        assert!(state.enabled);
        assert_eq!(state.disables, 1);
        assert_eq!(state.remaining, 3);
        assert_eq!(state.descriptor, Some(*engine.descriptor()));
        assert_eq!(engine.descriptor().source, converter.data_register());
        assert_eq!(engine.descriptor().destination, context.buffer.as_mut_ptr());
    }

    #[test]
    fn block_lands_before_signal() {
        let context = AcquisitionContext::new();
        let mut converter = MockConverter::new();
        let transfer = MockTransfer::new();
        let mut engine = engine(&context, &converter, &transfer);

        engine.arm();
        engine.trigger(&mut converter).unwrap();
        assert_eq!(converter.state().starts, 1);
        assert_eq!(engine.state(), CycleState::Converting);
        assert!(!context.signal().is_raised());

        assert!(transfer.complete(&[7, 8, 9]));
        on_transfer_complete(&context);

        assert_eq!(context.buffer().read(), [7, 8, 9]);
        assert!(context.signal().is_raised());
        assert_eq!(engine.state(), CycleState::Complete);
    }

    #[test]
    fn partial_block_does_not_complete() {
        let context = AcquisitionContext::new();
        let mut converter = MockConverter::new();
        let transfer = MockTransfer::new();
        let mut engine = engine(&context, &converter, &transfer);

        engine.arm();
        engine.trigger(&mut converter).unwrap();

        assert!(!transfer.complete(&[1, 2]));
        assert!(!context.signal().is_raised());
        assert!(transfer.complete(&[3]));
    }

    #[test]
    fn second_trigger_without_arm_is_refused() {
        let context = AcquisitionContext::new();
        let mut converter = MockConverter::new();
        let transfer = MockTransfer::new();
        let mut engine = engine(&context, &converter, &transfer);

        engine.arm();
        engine.trigger(&mut converter).unwrap();
        assert!(transfer.complete(&[1, 2, 3]));
        on_transfer_complete(&context);
        context.signal.clear();

        assert_eq!(engine.trigger(&mut converter), Err(Error::NotArmed));
        assert_eq!(converter.state().starts, 1);
        assert!(!transfer.complete(&[4, 5, 6]));
        assert!(!context.signal().is_raised());
        assert_eq!(context.buffer().read(), [1, 2, 3]);
    }

    #[test]
    fn trigger_on_fresh_engine_is_refused() {
        let context = AcquisitionContext::new();
        let mut converter = MockConverter::new();
        let transfer = MockTransfer::new();
        let mut engine = engine(&context, &converter, &transfer);

        assert_eq!(engine.trigger(&mut converter), Err(Error::NotArmed));
        assert_eq!(converter.state().starts, 0);
    }

    #[test]
    fn rearm_allows_next_block() {
        let context = AcquisitionContext::new();
        let mut converter = MockConverter::new();
        let transfer = MockTransfer::new();
        let mut engine = engine(&context, &converter, &transfer);

        for block in [[1, 2, 3], [4, 5, 6]] {
            engine.arm();
            engine.trigger(&mut converter).unwrap();
            assert!(transfer.complete(&block));
            on_transfer_complete(&context);
            assert_eq!(context.buffer().read(), block);
            context.signal.clear();
            }

        assert_eq!(transfer.state().configures, 2);
    }
}
