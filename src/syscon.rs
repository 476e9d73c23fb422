// Licensed under the Apache-2.0 license

//! System bring-up collaborator contract.
//!
//! SERCOM peripherals need their bus and generic clocks routed and their
//! pins muxed away from GPIO before any register of the peripheral itself
//! is touched. That work depends on the clock tree and pad layout of the
//! concrete board, so the drivers only call the two operations below and
//! leave the register writes to an external implementation.

/// Clock and pin bring-up for one peripheral instance.
///
/// [`crate::i2c::SercomI2c::initialize`] and
/// [`crate::usart::UsartController::init`] invoke `enable_clocks` followed
/// by `configure_pins` as the first two steps of their sequences.
pub trait BringUp {
    /// Enable the peripheral's bus clock and generic clock channel.
    ///
    /// Implementations must not return before the generic-clock channel
    /// reports enabled.
    fn enable_clocks(&mut self);

    /// Route the signal pins to the peripheral function.
    ///
    /// For I2C this also enables the weak pull-ups and pre-drives both
    /// lines to the idle-high level.
    fn configure_pins(&mut self);
}
