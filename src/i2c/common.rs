// Licensed under the Apache-2.0 license

//! Common types and constants for the SERCOM I2C driver.
//!
//! This module provides shared definitions for error handling, transfer
//! direction, and bus configuration used across the I2C driver
//! implementation.

use core::{error, fmt};

use crate::i2c::hardware_interface::{PadMapping, SdaHold};
use fugit::HertzU32;

/// Target bus frequency.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum I2cSpeed {
    Standard = 100_000,
    Fast = 400_000,
    FastPlus = 1_000_000,
}

impl I2cSpeed {
    /// Bus frequency as a typed rate.
    #[must_use]
    pub fn frequency(self) -> HertzU32 {
        HertzU32::from_raw(self as u32)
    }

    /// Precomputed baud divisor for this speed with a 48 MHz reference
    /// clock. The driver programs the divisor as-is; it does not evaluate
    /// a rate formula at run time.
    #[must_use]
    pub const fn baud_divisor(self) -> u8 {
        match self {
            I2cSpeed::Standard => 232,
            I2cSpeed::Fast => 53,
            I2cSpeed::FastPlus => 19,
        }
    }
}

/// Transfer direction carried by the address phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Write,
    Read,
}

impl Direction {
    /// R/W bit appended to the shifted 7-bit address.
    #[must_use]
    pub const fn rw_bit(self) -> u8 {
        match self {
            Direction::Write => 0,
            Direction::Read => 1,
        }
    }
}

/// Errors reported by the master driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The address phase was not acknowledged by any device.
    AddressNack,
    /// A data byte was rejected by the addressed device.
    DataNack,
    /// A bounded wait ran out of its iteration budget. Only reachable
    /// through `stop_checked` or when a poll limit is configured.
    Timeout,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Error::AddressNack => "I2C address not acknowledged",
            Error::DataNack => "I2C data byte not acknowledged",
            Error::Timeout => "I2C wait budget exhausted",
        };
        f.write_str(s)
    }
}

impl error::Error for Error {}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
        match self {
            Error::AddressNack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Error::DataNack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            Error::Timeout => ErrorKind::Other,
        }
    }
}

/// Number of control-sync polls `stop` performs before giving up.
pub const STOP_POLL_BUDGET: u32 = 100_000;

/// Bus configuration committed during `initialize`.
pub struct I2cConfig {
    /// Baud-rate divisor written to the baud register verbatim.
    pub baud_divisor: u8,
    /// SDA hold-time selection.
    pub sda_hold: SdaHold,
    /// Signal-to-pad routing.
    pub pad_mapping: PadMapping,
    /// Iteration bound applied to the otherwise-unbounded status polls.
    ///
    /// `None` keeps the hardware-dictated blocking behavior: a wait that
    /// never completes hangs the caller. `Some(n)` makes those waits
    /// return [`Error::Timeout`] after `n` iterations, which changes the
    /// observable failure behavior of every call except `stop`.
    pub poll_limit: Option<u32>,
}

impl Default for I2cConfig {
    fn default() -> Self {
        I2cConfigBuilder::new().build()
    }
}

pub struct I2cConfigBuilder {
    speed: I2cSpeed,
    baud_divisor: Option<u8>,
    sda_hold: SdaHold,
    pad_mapping: PadMapping,
    poll_limit: Option<u32>,
}

impl Default for I2cConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            speed: I2cSpeed::Standard,
            baud_divisor: None,
            sda_hold: SdaHold::Ns600,
            pad_mapping: PadMapping::TwoWire,
            poll_limit: None,
        }
    }

    #[must_use]
    pub fn speed(mut self, speed: I2cSpeed) -> Self {
        self.speed = speed;
        self
    }

    /// Override the divisor derived from the selected speed.
    #[must_use]
    pub fn baud_divisor(mut self, divisor: u8) -> Self {
        self.baud_divisor = Some(divisor);
        self
    }

    #[must_use]
    pub fn sda_hold(mut self, hold: SdaHold) -> Self {
        self.sda_hold = hold;
        self
    }

    #[must_use]
    pub fn pad_mapping(mut self, mapping: PadMapping) -> Self {
        self.pad_mapping = mapping;
        self
    }

    #[must_use]
    pub fn poll_limit(mut self, limit: u32) -> Self {
        self.poll_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn build(self) -> I2cConfig {
        I2cConfig {
            baud_divisor: self.baud_divisor.unwrap_or(self.speed.baud_divisor()),
            sda_hold: self.sda_hold,
            pad_mapping: self.pad_mapping,
            poll_limit: self.poll_limit,
        }
    }
}
