// Licensed under the Apache-2.0 license

//! I2C master primitive abstraction.
//!
//! [`I2cMasterOps`] is the seam between the chip driver and the
//! embedded-hal controller layer: it expresses one bus transaction as the
//! caller-driven start / write / read / stop call sequence, each call
//! blocking until the hardware reports phase completion or a NACK. The
//! controller in [`crate::i2c::i2c_controller`] is generic over this
//! trait, so it can be exercised against a scripted fake in host tests.

use crate::i2c::common::Direction;
use crate::i2c::hardware_interface::AckAction;
use crate::syscon::BringUp;

/// Blocking single-master bus primitives.
///
/// Callers issue `start` followed by any number of `write_byte` /
/// `read_byte` calls and finish with `stop`. Only one transaction may be
/// in flight at a time; the driver does not track overlapping callers.
pub trait I2cMasterOps {
    /// Driver-specific error type compatible with embedded-hal.
    type Error: embedded_hal::i2c::Error + core::fmt::Debug;

    /// Bring up and configure the peripheral. Must be called once before
    /// any transaction.
    ///
    /// # Errors
    ///
    /// Only fails when a poll bound is configured and a synchronization
    /// wait exhausts it.
    fn initialize<B: BringUp>(&mut self, bringup: &mut B) -> Result<(), Self::Error>;

    /// Transmit a start (or repeated-start) condition and the address
    /// phase for the given 7-bit address and direction.
    ///
    /// # Errors
    ///
    /// Returns an address-NACK error if no device acknowledges. The bus
    /// is *not* released; the caller decides whether to retry or stop.
    fn start(&mut self, address: u8, direction: Direction) -> Result<(), Self::Error>;

    /// Transmit one data byte.
    ///
    /// # Errors
    ///
    /// Returns a data-NACK error if the addressed device rejects the
    /// byte.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Receive one data byte, pre-arming the given acknowledge action.
    ///
    /// `AckAction::Ack` commands receive-and-continue, `AckAction::Nack`
    /// commands receive-and-stop. There is no hardware rejection on this
    /// path.
    ///
    /// # Errors
    ///
    /// Only fails when a poll bound is configured and exhausted.
    fn read_byte(&mut self, ack: AckAction) -> Result<u8, Self::Error>;

    /// Issue a stop condition and wait (bounded) for the bus to settle,
    /// silently giving up when the budget is exhausted.
    fn stop(&mut self);

    /// Like [`I2cMasterOps::stop`], but reports budget exhaustion.
    ///
    /// # Errors
    ///
    /// Returns a timeout error if the synchronization flag never cleared
    /// within the stop budget.
    fn stop_checked(&mut self) -> Result<(), Self::Error>;
}
