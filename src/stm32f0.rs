//! # STM32F0 binding
//!
//! [`Converter`] and [`TransferChannel`] implementations for ADC1 and DMA1
//! channel 1 of the STM32F0x1 family, scanning PA0, PA1 and PA2.
//!
//! The interrupt vectors stay with the application. Each one asks the
//! matching peripheral for its pending [`Event`] and forwards it:
//!
//! ```rust, ignore
//! #[interrupt]
//! fn DMA1_CH1() {
//!     if let Some(event) = Stm32Dma::take_event() {
//!         adc_scan::handler::dispatch(event);
//!     }
//! }
//! ```

use cortex_m::peripheral::NVIC;
use stm32f0::stm32f0x1::{Interrupt, ADC, DMA1, GPIOA, RCC};

use crate::{
    handler::Event,
    peripheral::{
        Align,
        Converter,
        ConverterConfig,
        Direction,
        Priority,
        Resolution,
        SampleTime,
        ScanDirection,
        TransferChannel,
        TransferDescriptor,
        TransferMode,
        TriggerSource,
    },
    Sample,
};

const RCC_AHBENR_DMAEN: u32 = 1 << 0;
const RCC_AHBENR_IOPAEN: u32 = 1 << 17;
const RCC_APB2ENR_ADCEN: u32 = 1 << 9;

const ADC_ISR_ADRDY: u32 = 1 << 0;
const ADC_ISR_EOC: u32 = 1 << 2;
const ADC_IER_EOCIE: u32 = 1 << 2;
const ADC_CR_ADEN: u32 = 1 << 0;
const ADC_CR_ADSTART: u32 = 1 << 2;
const ADC_CFGR1_DMAEN: u32 = 1 << 0;
const ADC_CFGR1_SCANDIR: u32 = 1 << 2;
const ADC_CFGR1_RES: u32 = 0b11 << 3;
const ADC_CFGR1_ALIGN: u32 = 1 << 5;
const ADC_CFGR1_EXTEN: u32 = 0b11 << 10;
const ADC_CFGR1_CONT: u32 = 1 << 13;

const DMA_CCR_EN: u32 = 1 << 0;
const DMA_CCR_TCIE: u32 = 1 << 1;
const DMA_CCR_DIR: u32 = 1 << 4;
const DMA_CCR_CIRC: u32 = 1 << 5;
const DMA_CCR_PINC: u32 = 1 << 6;
const DMA_CCR_MINC: u32 = 1 << 7;
const DMA_ISR_TCIF1: u32 = 1 << 1;
const DMA_IFCR_CTCIF1: u32 = 1 << 1;

// Cortex-M0 implements the two most significant priority bits.
const NVIC_PRIO_SHIFT: u8 = 6;

fn unmask(interrupt: Interrupt, priority: Priority) {
    unsafe {
        let mut nvic = cortex_m::Peripherals::steal().NVIC;
        nvic.set_priority(interrupt, priority.0 << NVIC_PRIO_SHIFT);
        NVIC::unpend(interrupt);
        NVIC::unmask(interrupt);
    }
}

/// ADC1 sampling PA0..PA2 on channels 0..2.
pub struct Stm32Adc {
    adc: ADC,
    gpioa: GPIOA,
}

impl Stm32Adc {
    /// Enable the ADC and GPIOA clocks and take ownership of both
    /// peripherals.
    pub fn new(adc: ADC, gpioa: GPIOA, rcc: &RCC) -> Self {
        rcc.ahbenr
            .modify(|r, w| unsafe { w.bits(r.bits() | RCC_AHBENR_IOPAEN) });
        rcc.apb2enr
            .modify(|r, w| unsafe { w.bits(r.bits() | RCC_APB2ENR_ADCEN) });

        Self { adc, gpioa }
    }

    /// Check and clear the end-of-conversion flag. Call from the
    /// `ADC_COMP` vector.
    pub fn take_event() -> Option<Event> {
        let adc = unsafe { &*ADC::ptr() };

        if adc.isr.read().bits() & ADC_ISR_EOC == 0 {
            return None;
        }

        adc.isr.write(|w| unsafe { w.bits(ADC_ISR_EOC) });
        Some(Event::ConversionComplete(adc.dr.read().bits() as Sample))
    }

    /// Give back the peripherals.
    pub fn release(self) -> (ADC, GPIOA) {
        (self.adc, self.gpioa)
    }
}

impl Converter for Stm32Adc {
    fn enable_inputs(&mut self, channels: &[u8]) {
        for &channel in channels {
            let shift = u32::from(channel) * 2;
            self.gpioa
                .moder
                .modify(|r, w| unsafe { w.bits(r.bits() | (0b11 << shift)) });
            self.gpioa
                .pupdr
                .modify(|r, w| unsafe { w.bits(r.bits() & !(0b11 << shift)) });
        }
    }

    fn configure(&mut self, config: &ConverterConfig) {
        // Each of these encodes as zero in CFGR1.
        match (config.resolution, config.align, config.trigger, config.scan) {
            (Resolution::Bits12, Align::Right, TriggerSource::Software, ScanDirection::Upward) => {}
        }
        let cfgr1 = if config.continuous { ADC_CFGR1_CONT } else { 0 };

        let mask =
            ADC_CFGR1_SCANDIR | ADC_CFGR1_RES | ADC_CFGR1_ALIGN | ADC_CFGR1_EXTEN | ADC_CFGR1_CONT;
        self.adc
            .cfgr1
            .modify(|r, w| unsafe { w.bits((r.bits() & !mask) | cfgr1) });

        self.adc
            .cr
            .modify(|r, w| unsafe { w.bits(r.bits() | ADC_CR_ADEN) });
    }

    fn set_sample_time(&mut self, channel: u8, sample_time: SampleTime) {
        self.adc
            .chselr
            .modify(|r, w| unsafe { w.bits(r.bits() | (1 << channel)) });
        // One sample time shared by every channel on this family.
        self.adc
            .smpr
            .write(|w| unsafe { w.bits(sample_time as u32) });
    }

    fn enable_dma_requests(&mut self) {
        self.adc
            .cfgr1
            .modify(|r, w| unsafe { w.bits(r.bits() | ADC_CFGR1_DMAEN) });
    }

    fn listen(&mut self, priority: Priority) {
        self.adc.isr.write(|w| unsafe { w.bits(ADC_ISR_EOC) });
        self.adc
            .ier
            .modify(|r, w| unsafe { w.bits(r.bits() | ADC_IER_EOCIE) });
        unmask(Interrupt::ADC_COMP, priority);
    }

    fn is_ready(&self) -> bool {
        self.adc.isr.read().bits() & ADC_ISR_ADRDY != 0
    }

    fn start_conversion(&mut self) {
        self.adc
            .cr
            .modify(|r, w| unsafe { w.bits(r.bits() | ADC_CR_ADSTART) });
    }

    fn data_register(&self) -> *const Sample {
        // Results are right aligned in the low half-word.
        &self.adc.dr as *const _ as *const Sample
    }
}

/// DMA1 channel 1, which serves ADC1 requests.
pub struct Stm32Dma {
    dma: DMA1,
}

impl Stm32Dma {
    /// Enable the DMA clock and take ownership of the controller.
    pub fn new(dma: DMA1, rcc: &RCC) -> Self {
        rcc.ahbenr
            .modify(|r, w| unsafe { w.bits(r.bits() | RCC_AHBENR_DMAEN) });

        Self { dma }
    }

    /// Check and clear the channel 1 transfer-complete flag. Call from the
    /// `DMA1_CH1` vector.
    pub fn take_event() -> Option<Event> {
        let dma = unsafe { &*DMA1::ptr() };

        if dma.isr.read().bits() & DMA_ISR_TCIF1 == 0 {
            return None;
        }

        dma.ifcr.write(|w| unsafe { w.bits(DMA_IFCR_CTCIF1) });
        Some(Event::TransferComplete)
    }

    /// Give back the controller.
    pub fn release(self) -> DMA1 {
        self.dma
    }
}

impl TransferChannel for Stm32Dma {
    fn configure(&mut self, descriptor: &TransferDescriptor) {
        let width = descriptor.width as u32;
        let mut ccr = (width << 8) | (width << 10) | ((descriptor.priority as u32) << 12);

        match descriptor.direction {
            Direction::PeripheralToMemory => ccr &= !DMA_CCR_DIR,
        }
        match descriptor.mode {
            TransferMode::OneShot => ccr &= !DMA_CCR_CIRC,
        }
        if descriptor.source_increment {
            ccr |= DMA_CCR_PINC;
        }
        if descriptor.destination_increment {
            ccr |= DMA_CCR_MINC;
        }

        // Keep the interrupt enable set by `listen` across re-arms.
        let ch = &self.dma.ch1;
        ch.par.write(|w| unsafe { w.bits(descriptor.source as u32) });
        ch.mar.write(|w| unsafe { w.bits(descriptor.destination as u32) });
        ch.ndtr
            .write(|w| unsafe { w.bits(u32::from(descriptor.count)) });
        ch.cr
            .modify(|r, w| unsafe { w.bits((r.bits() & DMA_CCR_TCIE) | ccr) });
    }

    fn enable(&mut self) {
        self.dma
            .ch1
            .cr
            .modify(|r, w| unsafe { w.bits(r.bits() | DMA_CCR_EN) });
    }

    fn disable(&mut self) {
        self.dma
            .ch1
            .cr
            .modify(|r, w| unsafe { w.bits(r.bits() & !DMA_CCR_EN) });
    }

    fn listen(&mut self, priority: Priority) {
        self.dma.ifcr.write(|w| unsafe { w.bits(DMA_IFCR_CTCIF1) });
        self.dma
            .ch1
            .cr
            .modify(|r, w| unsafe { w.bits(r.bits() | DMA_CCR_TCIE) });
        unmask(Interrupt::DMA1_CH1, priority);
    }
}
