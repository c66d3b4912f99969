//! # Acquisition controller
//!
//! The consumer-facing side of the acquisition core. The controller owns the
//! converter and the block-copy channel, runs the one-time bring-up and
//! readiness gate, and then drives the endless
//! `start_cycle -> wait_for_completion -> consume_and_reset` loop.
//!
//! Waiting is a busy poll on the [`CompletionSignal`](crate::CompletionSignal).
//! There is no scheduler to yield to and no timeout: if the converter never
//! becomes ready, or a started cycle never completes, the controller spins
//! forever. [`poll_completion`](AcquisitionController::poll_completion) exposes
//! the same check without blocking, for callers that want to wait some other
//! way.

use core::convert::Infallible;

use crate::{
    config::{Config, Mode},
    handler::CompletionHandler,
    peripheral::{Converter, ConverterConfig, TransferChannel},
    sequencer::ChannelSequencer,
    transfer::{CycleState, TransferEngine},
    AcquisitionContext,
    Error,
    SampleBuffer,
    CHANNELS,
};

enum Strategy<'a, D> {
    Interrupt {
        sequencer: ChannelSequencer<'a>,
        // Unused by this strategy; handed back by `release`.
        channel: D,
    },
    BlockTransfer(TransferEngine<'a, D>),
}

/// Drives acquisition cycles and hands each completed buffer to the
/// application.
pub struct AcquisitionController<'a, C, D> {
    converter: C,
    strategy: Strategy<'a, D>,
    context: &'a AcquisitionContext,
    config: Config,
    ready: bool,
}

impl<'a, C, D> AcquisitionController<'a, C, D>
where
    C: Converter,
    D: TransferChannel,
{
    /// Create a controller over `context`, using the strategy selected in
    /// `config`.
    ///
    /// The block-copy channel is only driven in [`Mode::BlockTransfer`]; in
    /// [`Mode::Interrupt`] it is kept idle until [`release`](Self::release).
    pub fn new(converter: C, channel: D, context: &'a AcquisitionContext, config: Config) -> Self {
        let strategy = match config.mode() {
            Mode::Interrupt => Strategy::Interrupt {
                sequencer: ChannelSequencer::new(context),
                channel,
            },
            Mode::BlockTransfer => Strategy::BlockTransfer(TransferEngine::new(
                channel,
                context,
                converter.data_register(),
                config.transfer_priority(),
            )),
        };

        Self {
            converter,
            strategy,
            context,
            config,
            ready: false,
        }
    }

    /// Bring up the converter, and the block-copy channel if used, through
    /// the peripheral control surface.
    pub fn init(&mut self) {
        debug!("bringing up {:?} acquisition", self.config.mode());

        self.converter.enable_inputs(&CHANNELS);
        self.converter.configure(&ConverterConfig::DEFAULT);

        let priority = self.config.interrupt_priority();
        match &mut self.strategy {
            Strategy::Interrupt { .. } => self.converter.listen(priority),
            Strategy::BlockTransfer(engine) => {
                self.converter.enable_dma_requests();
                engine.arm();
                engine.channel_mut().listen(priority);
            }
        }

        for channel in CHANNELS {
            self.converter
                .set_sample_time(channel, self.config.sample_time());
        }
    }

    /// Block until the converter reports ready. No timeout.
    pub fn wait_until_ready(&mut self) {
        while !self.converter.is_ready() {
            core::hint::spin_loop();
        }

        info!("converter ready");
        self.ready = true;
    }

    /// Trigger one acquisition cycle: a scan of channel 0 onwards, or the
    /// whole block.
    ///
    /// Has no effect and returns [`Error::NotReady`] until
    /// [`wait_until_ready`](Self::wait_until_ready) has returned.
    pub fn start_cycle(&mut self) -> Result<(), Error> {
        if !self.ready {
            warn!("cycle requested before the converter is ready");
            return Err(Error::NotReady);
        }

        match &mut self.strategy {
            Strategy::Interrupt { .. } => {
                self.converter.start_conversion();
                Ok(())
            }
            Strategy::BlockTransfer(engine) => engine.trigger(&mut self.converter),
        }
    }

    /// Check for a completed cycle without blocking.
    pub fn poll_completion(&self) -> nb::Result<(), Infallible> {
        if self.context.signal.is_raised() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Spin until the current cycle has completed. No timeout.
    pub fn wait_for_completion(&self) {
        nb::block!(self.poll_completion()).unwrap_or_else(|never| match never {});
    }

    /// Let `consumer` read the sample buffer, then clear the completion
    /// signal and, in block-transfer mode, re-arm the copy channel.
    ///
    /// The scan position is owned by the completion handler and is left
    /// alone. A stray conversion event therefore carries over into the next
    /// cycle.
    ///
    /// Calling this again without an intervening cycle leaves the buffer as
    /// it is and the signal lowered.
    pub fn consume_and_reset<R>(&mut self, consumer: impl FnOnce(&SampleBuffer) -> R) -> R {
        let result = consumer(&self.context.buffer);

        self.context.signal.clear();
        if let Strategy::BlockTransfer(engine) = &mut self.strategy {
            engine.arm();
        }

        result
    }

    /// Run one complete cycle and hand the buffer to `consumer`.
    pub fn run_cycle<R>(&mut self, consumer: impl FnOnce(&SampleBuffer) -> R) -> Result<R, Error> {
        self.start_cycle()?;
        self.wait_for_completion();
        Ok(self.consume_and_reset(consumer))
    }

    /// Wait for the converter, then acquire forever.
    pub fn run(mut self, mut consumer: impl FnMut(&SampleBuffer)) -> ! {
        self.wait_until_ready();

        loop {
            if let Err(error) = self.run_cycle(&mut consumer) {
                warn!("cycle skipped: {}", error);
            }
        }
    }

    /// The handler to register with the interrupt side.
    pub fn handler(&self) -> CompletionHandler<'a> {
        CompletionHandler::new(self.context, self.config.mode())
    }

    /// The most recent readings.
    pub fn samples(&self) -> &SampleBuffer {
        &self.context.buffer
    }

    /// Whether a completed cycle is waiting to be consumed.
    pub fn is_complete(&self) -> bool {
        self.context.signal.is_raised()
    }

    /// The channel the interrupt-driven scan expects next. Always 0 in
    /// block-transfer mode.
    pub fn channel_index(&self) -> u8 {
        match &self.strategy {
            Strategy::Interrupt { sequencer, .. } => sequencer.channel_index(),
            Strategy::BlockTransfer(_) => 0,
        }
    }

    /// State of the block-copy cycle, or `None` in interrupt mode.
    pub fn cycle_state(&self) -> Option<CycleState> {
        match &self.strategy {
            Strategy::Interrupt { .. } => None,
            Strategy::BlockTransfer(engine) => Some(engine.state()),
        }
    }

    /// The selected strategy.
    pub fn mode(&self) -> Mode {
        self.config.mode()
    }

    /// Give back the converter and the block-copy channel.
    pub fn release(self) -> (C, D) {
        let channel = match self.strategy {
            Strategy::Interrupt { channel, .. } => channel,
            Strategy::BlockTransfer(engine) => engine.release(),
        };

        (self.converter, channel)
    }
}
