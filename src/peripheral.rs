//! # Peripheral control surface
//!
//! The acquisition core never touches registers itself. Everything it needs
//! from the converter and from the block-copy engine goes through the
//! [`Converter`] and [`TransferChannel`] traits, which a board or chip
//! binding implements. Most of the calls here are made exactly once, from
//! [`AcquisitionController::init`](crate::AcquisitionController::init).

use crate::{Sample, CHANNEL_COUNT};

/// Conversion resolution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// 12 bit resolution, readings in `0..=4095`
    #[default]
    Bits12,
}

impl Resolution {
    /// The largest reading the converter can produce at this resolution.
    pub const fn max_value(self) -> Sample {
        match self {
            Resolution::Bits12 => 0x0fff,
        }
    }
}

/// Placement of a reading inside the 16 bit data register.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Align {
    /// Right aligned results (least significant bits)
    #[default]
    Right,
}

/// What starts a conversion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerSource {
    /// Conversions are started by software only
    #[default]
    Software,
}

/// Order in which the converter walks the selected channels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanDirection {
    /// Lowest channel number first
    #[default]
    Upward,
}

/// Converter set-up shared by both strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConverterConfig {
    /// Conversion resolution
    pub resolution: Resolution,
    /// Data alignment
    pub align: Align,
    /// Keep converting after the last channel of a scan
    pub continuous: bool,
    /// Conversion trigger
    pub trigger: TriggerSource,
    /// Scan order
    pub scan: ScanDirection,
}

impl ConverterConfig {
    /// 12 bit, right aligned, single scan per software trigger, ascending
    /// channel order.
    pub const DEFAULT: Self = Self {
        resolution: Resolution::Bits12,
        align: Align::Right,
        continuous: false,
        trigger: TriggerSource::Software,
        scan: ScanDirection::Upward,
    };
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-channel sampling duration, in converter clock cycles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum SampleTime {
    Cycles1_5   = 0b000,
    Cycles7_5   = 0b001,
    Cycles13_5  = 0b010,
    Cycles28_5  = 0b011,
    Cycles41_5  = 0b100,
    Cycles55_5  = 0b101,
    Cycles71_5  = 0b110,
    #[default]
    Cycles239_5 = 0b111,
}

/// Interrupt priority level handed to the interrupt controller.
///
/// Lower numbers are more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Priority(pub u8);

impl Default for Priority {
    fn default() -> Self {
        Priority(1)
    }
}

/// Arbitration priority of a block-copy channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum TransferPriority {
    #[default]
    Low      = 0b00,
    Medium   = 0b01,
    High     = 0b10,
    VeryHigh = 0b11,
}

/// Width of one transferred element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataSize {
    /// 8 bit
    Byte     = 0b00,
    /// 16 bit, the native width of a reading
    HalfWord = 0b01,
    /// 32 bit
    Word     = 0b10,
}

/// Direction of a block copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// From a peripheral register into memory
    PeripheralToMemory,
}

/// What the channel does after the last element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferMode {
    /// Stop after `count` elements; the channel must be re-armed for the next
    /// block.
    OneShot,
}

/// Everything a block-copy channel needs to move one cycle of readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferDescriptor {
    /// Converter data register. Not incremented between elements.
    pub source: *const Sample,
    /// First buffer slot. Incremented after every element.
    pub destination: *mut Sample,
    /// Element width on both sides of the copy
    pub width: DataSize,
    /// Number of elements
    pub count: u16,
    /// Copy direction
    pub direction: Direction,
    /// One-shot or circular
    pub mode: TransferMode,
    /// Channel arbitration priority
    pub priority: TransferPriority,
    /// Whether the source address advances after each element
    pub source_increment: bool,
    /// Whether the destination address advances after each element
    pub destination_increment: bool,
}

impl TransferDescriptor {
    /// Descriptor for one cycle: [`CHANNEL_COUNT`] half-words from a fixed
    /// register into consecutive buffer slots, once.
    pub fn one_shot(
        source: *const Sample,
        destination: *mut Sample,
        priority: TransferPriority,
    ) -> Self {
        Self {
            source,
            destination,
            width: DataSize::HalfWord,
            count: CHANNEL_COUNT as u16,
            direction: Direction::PeripheralToMemory,
            mode: TransferMode::OneShot,
            priority,
            source_increment: false,
            destination_increment: true,
        }
    }
}

/// The analog-to-digital converter, as seen by the acquisition core.
pub trait Converter {
    /// Put the given input lines into analog mode.
    fn enable_inputs(&mut self, channels: &[u8]);

    /// Apply the converter set-up and select the scanned channels.
    fn configure(&mut self, config: &ConverterConfig);

    /// Program the sampling duration of one channel.
    fn set_sample_time(&mut self, channel: u8, sample_time: SampleTime);

    /// Make the converter issue a copy request after every conversion.
    fn enable_dma_requests(&mut self);

    /// Clear any stale end-of-conversion flag, enable the
    /// conversion-complete notification and register its priority.
    fn listen(&mut self, priority: Priority);

    /// Whether the converter has finished its own start-up and may be
    /// triggered.
    fn is_ready(&self) -> bool;

    /// Start one scan over the selected channels.
    fn start_conversion(&mut self);

    /// Address of the register every conversion result is written to.
    fn data_register(&self) -> *const Sample;
}

/// A block-copy (DMA) channel, as seen by the acquisition core.
pub trait TransferChannel {
    /// Load a descriptor. Only called while the channel is disabled.
    fn configure(&mut self, descriptor: &TransferDescriptor);

    /// Start serving copy requests.
    fn enable(&mut self);

    /// Stop serving copy requests.
    fn disable(&mut self);

    /// Clear any stale transfer-complete flag, enable the transfer-complete
    /// notification and register its priority.
    fn listen(&mut self, priority: Priority);
}
