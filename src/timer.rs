// Licensed under the Apache-2.0 license

//! Timer/counter driver.
//!
//! Parameter-table-driven configuration of up to eight TC instances with
//! two compare/capture channels each: waveform generation, compare
//! match, PWM duty, capture, interrupt control, and callback dispatch.
//!
//! The callback registry is owned by the driver, one optional `fn()`
//! per (instance, channel) registered at configuration time, instead
//! of living in process-wide state. [`TimerCounter::dispatch`] is meant
//! to be called from the shared interrupt handler; registered callbacks
//! run in that interrupt context, must not block, and must treat any
//! state they touch as shared with foreground code (atomics or
//! equivalent).
//!
//! Out-of-range instance or channel indices are silently ignored, the
//! same permissive policy the GPIO driver applies to pin indices.

use crate::common::{Logger, NoOpLogger};

/// Number of TC instances.
pub const TC_COUNT: usize = 8;
/// Compare/capture channels per instance.
pub const TC_CHANNELS: usize = 2;

/// Interrupt flag bits shared by the flag, enable-set and enable-clear
/// registers.
pub mod flags {
    /// Counter overflow.
    pub const OVF: u8 = 1 << 0;
    /// Synchronization error.
    pub const ERR: u8 = 1 << 1;
    /// Channel 0 match/capture.
    pub const MC0: u8 = 1 << 4;
    /// Channel 1 match/capture.
    pub const MC1: u8 = 1 << 5;
    /// Every defined flag.
    pub const ALL: u8 = OVF | ERR | MC0 | MC1;
}

/// Counter resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Bits8,
    Bits16,
    Bits32,
}

/// Clock prescaler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Prescaler {
    Div1,
    Div2,
    Div4,
    Div8,
    Div16,
    Div64,
    Div256,
    Div1024,
}

/// Waveform generation mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Waveform {
    NormalFrequency,
    MatchFrequency,
    NormalPwm,
    MatchPwm,
}

/// Capture source selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CaptureMode {
    /// Capture from the channel I/O pin.
    Io,
    /// Capture from the event system.
    Event,
    /// Period and pulse-width capture.
    PeriodPulseWidth,
    /// Single-edge pulse-width capture.
    PulseWidth,
}

/// Synchronization domains of a TC register file.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TcSync {
    Enable,
    SoftwareReset,
    /// Compare-channel value propagation.
    Compare(usize),
}

/// Register interface covering all TC instances.
///
/// Every accessor takes the instance index; implementations map it onto
/// the per-instance register blocks and clock-mask tables.
pub trait TcHardware {
    /// Enable the instance's bus clock and generic clock channel,
    /// waiting until the channel reports enabled.
    fn enable_clock(&mut self, tc: usize);

    fn set_enable(&mut self, tc: usize, enable: bool);

    fn software_reset(&mut self, tc: usize);

    fn sync_busy(&self, tc: usize, target: TcSync) -> bool;

    /// Program counter mode and prescaler in one control write.
    fn configure(&mut self, tc: usize, mode: Mode, prescaler: Prescaler);

    fn set_waveform(&mut self, tc: usize, waveform: Waveform);

    fn set_compare(&mut self, tc: usize, channel: usize, value: u32);

    /// Current free-running counter value.
    fn count(&self, tc: usize) -> u16;

    fn interrupt_flags(&self, tc: usize) -> u8;

    fn clear_interrupt_flags(&mut self, tc: usize, mask: u8);

    fn enable_interrupts(&mut self, tc: usize, mask: u8);

    fn disable_interrupts(&mut self, tc: usize, mask: u8);

    fn enable_capture(&mut self, tc: usize, channel: usize, mode: CaptureMode, invert: bool);

    /// Latched capture value of one channel.
    fn capture_value(&self, tc: usize, channel: usize) -> u16;

    fn set_oneshot(&mut self, tc: usize);

    fn set_downcount(&mut self, tc: usize);
}

/// Callback invoked from the interrupt dispatch routine.
pub type Callback = fn();

/// Driver over the TC register interface with an owned callback
/// registry.
pub struct TimerCounter<T: TcHardware, L: Logger = NoOpLogger> {
    hw: T,
    callbacks: [[Option<Callback>; TC_CHANNELS]; TC_COUNT],
    logger: L,
}

impl<T: TcHardware> TimerCounter<T> {
    #[must_use]
    pub fn new(hw: T) -> Self {
        Self::with_logger(hw, NoOpLogger)
    }
}

impl<T: TcHardware, L: Logger> TimerCounter<T, L> {
    #[must_use]
    pub fn with_logger(hw: T, logger: L) -> Self {
        Self {
            hw,
            callbacks: [[None; TC_CHANNELS]; TC_COUNT],
            logger,
        }
    }

    /// Release the register interface.
    #[must_use]
    pub fn free(self) -> T {
        self.hw
    }

    /// Configure one instance: clock enable, disable + reset, mode and
    /// prescaler, waveform, channel-0 compare value, and a clean flag
    /// slate. The instance is left stopped; call [`TimerCounter::start`]
    /// to run it.
    pub fn init(
        &mut self,
        tc: usize,
        mode: Mode,
        prescaler: Prescaler,
        waveform: Waveform,
        compare: u32,
    ) {
        if tc >= TC_COUNT {
            self.logger.log("tc: instance index out of range");
            return;
        }

        self.hw.enable_clock(tc);

        self.hw.set_enable(tc, false);
        while self.hw.sync_busy(tc, TcSync::Enable) {}

        self.hw.software_reset(tc);
        while self.hw.sync_busy(tc, TcSync::SoftwareReset) {}

        self.hw.configure(tc, mode, prescaler);

        self.hw.set_waveform(tc, waveform);
        while self.hw.sync_busy(tc, TcSync::Enable) {}

        self.hw.set_compare(tc, 0, compare);
        while self.hw.sync_busy(tc, TcSync::Compare(0)) {}

        self.hw.clear_interrupt_flags(tc, flags::ALL);
    }

    pub fn start(&mut self, tc: usize) {
        if tc >= TC_COUNT {
            return;
        }
        self.hw.set_enable(tc, true);
        while self.hw.sync_busy(tc, TcSync::Enable) {}
    }

    pub fn stop(&mut self, tc: usize) {
        if tc >= TC_COUNT {
            return;
        }
        self.hw.set_enable(tc, false);
        while self.hw.sync_busy(tc, TcSync::Enable) {}
    }

    /// Update the channel-0 compare value.
    pub fn set_compare(&mut self, tc: usize, value: u32) {
        if tc >= TC_COUNT {
            return;
        }
        self.hw.set_compare(tc, 0, value);
        while self.hw.sync_busy(tc, TcSync::Compare(0)) {}
    }

    /// Test-and-clear the channel-0 match flag.
    #[must_use]
    pub fn compare_match(&mut self, tc: usize) -> bool {
        if tc >= TC_COUNT {
            return false;
        }
        if self.hw.interrupt_flags(tc) & flags::MC0 != 0 {
            self.hw.clear_interrupt_flags(tc, flags::MC0);
            return true;
        }
        false
    }

    /// Current free-running counter value. Zero for out-of-range
    /// instances.
    #[must_use]
    pub fn count(&self, tc: usize) -> u16 {
        if tc >= TC_COUNT {
            return 0;
        }
        self.hw.count(tc)
    }

    /// Update the channel-1 compare value, which sets the PWM duty
    /// cycle in the PWM waveform modes.
    pub fn set_pwm_duty(&mut self, tc: usize, duty: u32) {
        if tc >= TC_COUNT {
            return;
        }
        self.hw.set_compare(tc, 1, duty);
        while self.hw.sync_busy(tc, TcSync::Compare(1)) {}
    }

    /// Arm capture on one channel and clear its stale match flag.
    pub fn enable_capture(&mut self, tc: usize, channel: usize, mode: CaptureMode, invert: bool) {
        if tc >= TC_COUNT || channel >= TC_CHANNELS {
            return;
        }
        self.hw.enable_capture(tc, channel, mode, invert);
        self.hw.clear_interrupt_flags(tc, flags::MC0 << channel);
    }

    /// Wait for a capture on the channel (unbounded), then return the
    /// latched value and clear the flag. Zero for out-of-range indices.
    #[must_use]
    pub fn read_capture(&mut self, tc: usize, channel: usize) -> u16 {
        if tc >= TC_COUNT || channel >= TC_CHANNELS {
            return 0;
        }
        let mask = flags::MC0 << channel;
        while self.hw.interrupt_flags(tc) & mask == 0 {}
        let value = self.hw.capture_value(tc, channel);
        self.hw.clear_interrupt_flags(tc, mask);
        value
    }

    pub fn enable_interrupts(&mut self, tc: usize, mask: u8) {
        if tc >= TC_COUNT {
            return;
        }
        self.hw.enable_interrupts(tc, mask);
    }

    pub fn disable_interrupts(&mut self, tc: usize, mask: u8) {
        if tc >= TC_COUNT {
            return;
        }
        self.hw.disable_interrupts(tc, mask);
    }

    pub fn clear_interrupts(&mut self, tc: usize, mask: u8) {
        if tc >= TC_COUNT {
            return;
        }
        self.hw.clear_interrupt_flags(tc, mask);
    }

    /// Put the counter in one-shot mode.
    pub fn set_oneshot(&mut self, tc: usize, enable: bool) {
        if tc >= TC_COUNT || !enable {
            return;
        }
        self.hw.set_oneshot(tc);
    }

    /// Make the counter count down instead of up.
    pub fn set_downcount(&mut self, tc: usize, enable: bool) {
        if tc >= TC_COUNT || !enable {
            return;
        }
        self.hw.set_downcount(tc);
    }

    /// Register a callback for one channel and enable its match
    /// interrupt. Out-of-range indices are ignored.
    pub fn register_callback(&mut self, tc: usize, channel: usize, callback: Callback) {
        let Some(slot) = self
            .callbacks
            .get_mut(tc)
            .and_then(|channels| channels.get_mut(channel))
        else {
            return;
        };
        *slot = Some(callback);
        self.hw.enable_interrupts(tc, flags::MC0 << channel);
    }

    /// Remove a channel's callback without touching the interrupt
    /// enables.
    pub fn unregister_callback(&mut self, tc: usize, channel: usize) {
        if let Some(slot) = self
            .callbacks
            .get_mut(tc)
            .and_then(|channels| channels.get_mut(channel))
        {
            *slot = None;
        }
    }

    /// Shared interrupt handler body for one instance: for every channel
    /// whose match flag is set, clear the flag first, then invoke the
    /// registered callback, if any.
    pub fn dispatch(&mut self, tc: usize) {
        let Some(channels) = self.callbacks.get(tc) else {
            return;
        };
        for (channel, callback) in channels.iter().enumerate() {
            let mask = flags::MC0 << channel;
            if self.hw.interrupt_flags(tc) & mask != 0 {
                self.hw.clear_interrupt_flags(tc, mask);
                if let Some(callback) = callback {
                    callback();
                }
            }
        }
    }
}
