// Licensed under the Apache-2.0 license

//! SERCOM I2C master driver module.
//!
//! This module provides the blocking, polling-mode, single-master I2C
//! implementation for SERCOM-based `SoCs`, designed for bare-metal and
//! `no_std` environments. It layers a register-interface trait, the chip
//! driver, and an embedded-hal compatible controller on top of each other
//! so the protocol logic is testable without real hardware.

pub mod common;
pub mod hardware_interface;
pub mod i2c_controller;
pub mod sercom_i2c;
pub mod traits;

// Re-export common types for convenience
pub use common::{Direction, Error, I2cConfig, I2cConfigBuilder, I2cSpeed};

// Re-export hardware interfaces
pub use hardware_interface::{
    AckAction, BusCommand, BusState, HardwareInterface, PadMapping, SdaHold, SyncTarget,
};

// Re-export the driver and controller
pub use i2c_controller::I2cController;
pub use sercom_i2c::SercomI2c;
pub use traits::I2cMasterOps;
