//! Host-side fakes of the peripheral control surface.
//!
//! Each fake is a cheap clone over shared state, so a test can keep one copy
//! for inspection and stimulus while the controller owns another.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    peripheral::{
        Converter,
        ConverterConfig,
        Priority,
        SampleTime,
        TransferChannel,
        TransferDescriptor,
    },
    Sample,
};

#[derive(Debug, Default)]
pub struct ConverterState {
    /// `is_ready` answers `false` this many more times.
    pub not_ready_polls: u32,
    pub ready_polls: u32,
    pub starts: u32,
    pub inputs: Vec<u8>,
    pub config: Option<ConverterConfig>,
    pub sample_times: Vec<(u8, SampleTime)>,
    pub dma_requests: bool,
    pub listening: Option<Priority>,
}

#[derive(Debug, Clone, Default)]
pub struct MockConverter {
    state: Arc<Mutex<ConverterState>>,
    register: Arc<Sample>,
}

impl MockConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn not_ready_for(polls: u32) -> Self {
        let converter = Self::new();
        converter.state().not_ready_polls = polls;
        converter
    }

    pub fn state(&self) -> MutexGuard<'_, ConverterState> {
        self.state.lock().unwrap()
    }
}

impl Converter for MockConverter {
    fn enable_inputs(&mut self, channels: &[u8]) {
        self.state().inputs.extend_from_slice(channels);
    }

    fn configure(&mut self, config: &ConverterConfig) {
        self.state().config = Some(*config);
    }

    fn set_sample_time(&mut self, channel: u8, sample_time: SampleTime) {
        self.state().sample_times.push((channel, sample_time));
    }

    fn enable_dma_requests(&mut self) {
        self.state().dma_requests = true;
    }

    fn listen(&mut self, priority: Priority) {
        self.state().listening = Some(priority);
    }

    fn is_ready(&self) -> bool {
        let mut state = self.state();
        state.ready_polls += 1;
        if state.not_ready_polls > 0 {
            state.not_ready_polls -= 1;
            false
        } else {
            true
        }
    }

    fn start_conversion(&mut self) {
        self.state().starts += 1;
    }

    fn data_register(&self) -> *const Sample {
        Arc::as_ptr(&self.register)
    }
}

#[derive(Debug, Default)]
pub struct TransferState {
    pub descriptor: Option<TransferDescriptor>,
    pub enabled: bool,
    /// Elements left before the one-shot transfer completes.
    pub remaining: u16,
    pub configures: u32,
    pub disables: u32,
    pub listening: Option<Priority>,
}

#[derive(Debug, Clone, Default)]
pub struct MockTransfer {
    state: Arc<Mutex<TransferState>>,
}

impl MockTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, TransferState> {
        self.state.lock().unwrap()
    }

    /// Copy converter results into the descriptor's destination the way the
    /// hardware would. Returns `true` if the transfer-complete flag fires.
    pub fn complete(&self, block: &[Sample]) -> bool {
        let mut state = self.state();
        let Some(descriptor) = state.descriptor else {
            return false;
        };
        if !state.enabled || state.remaining == 0 {
            return false;
        }

        for &value in block {
            if state.remaining == 0 {
                break;
            }
            let index = (descriptor.count - state.remaining) as usize;
            unsafe { descriptor.destination.add(index).write_volatile(value) };
            state.remaining -= 1;
        }

        state.remaining == 0
    }
}

impl TransferChannel for MockTransfer {
    fn configure(&mut self, descriptor: &TransferDescriptor) {
        let mut state = self.state();
        assert!(!state.enabled, "descriptor written while channel enabled");
        state.descriptor = Some(*descriptor);
        state.remaining = descriptor.count;
        state.configures += 1;
    }

    fn enable(&mut self) {
        self.state().enabled = true;
    }

    fn disable(&mut self) {
        let mut state = self.state();
        state.enabled = false;
        state.disables += 1;
    }

    fn listen(&mut self, priority: Priority) {
        self.state().listening = Some(priority);
    }
}
