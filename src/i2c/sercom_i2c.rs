// Licensed under the Apache-2.0 license

//! SERCOM I2C master driver.
//!
//! Owns the bus-transaction state machine: initialization and reset
//! sequencing, start-condition + address-phase handshake, byte write with
//! ACK/NACK detection, byte read with selectable ACK/NACK continuation,
//! and stop-condition with bounded bus-idle recovery. Every operation is
//! a direct, blocking call that busy-polls hardware status; apart from
//! `stop`, the polls are unbounded unless a poll limit is configured.

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::{Direction, Error, I2cConfig, STOP_POLL_BUDGET};
use crate::i2c::hardware_interface::{
    AckAction, BusCommand, BusState, HardwareInterface, SyncTarget,
};
use crate::i2c::traits::I2cMasterOps;
use crate::syscon::BringUp;

/// Blocking master driver over one SERCOM instance's register interface.
pub struct SercomI2c<H: HardwareInterface, L: Logger = NoOpLogger> {
    hw: H,
    config: I2cConfig,
    logger: L,
}

impl<H: HardwareInterface> SercomI2c<H> {
    #[must_use]
    pub fn new(hw: H, config: I2cConfig) -> Self {
        Self::with_logger(hw, config, NoOpLogger)
    }
}

impl<H: HardwareInterface, L: Logger> SercomI2c<H, L> {
    #[must_use]
    pub fn with_logger(hw: H, config: I2cConfig, logger: L) -> Self {
        Self { hw, config, logger }
    }

    /// Release the register interface.
    #[must_use]
    pub fn free(self) -> H {
        self.hw
    }

    /// Bring up and configure the controller.
    ///
    /// Sequencing invariant: the controller is disabled and software-reset
    /// before mode, pad routing and hold time are written, and it is only
    /// enabled after those parameters and the baud divisor are committed
    /// and the pending synchronization has cleared.
    ///
    /// # Errors
    ///
    /// Only fails with [`Error::Timeout`] when `poll_limit` is configured
    /// and a synchronization wait exhausts it; with the default
    /// configuration a peripheral that never reports ready hangs the
    /// caller instead.
    pub fn initialize<B: BringUp>(&mut self, bringup: &mut B) -> Result<(), Error> {
        bringup.enable_clocks();
        bringup.configure_pins();

        // The peripheral only accepts a reset while disabled.
        self.hw.set_enable(false);
        self.wait_sync(SyncTarget::Enable)?;

        self.hw.software_reset();
        self.wait_sync(SyncTarget::SoftwareReset)?;

        self.hw
            .configure_master(self.config.pad_mapping, self.config.sda_hold);

        self.hw.enable_smart_mode();
        self.wait_sync(SyncTarget::SystemOp)?;

        self.hw.set_baud(self.config.baud_divisor);

        self.hw.set_enable(true);
        self.wait_sync(SyncTarget::Enable)?;

        // The bus-state field powers up as unknown; force it to idle so
        // the first start condition is accepted.
        self.hw.force_bus_state(BusState::Idle);
        self.wait_sync(SyncTarget::SystemOp)?;

        Ok(())
    }

    /// Transmit a start (or repeated-start) condition plus the address
    /// phase and wait for the handshake to resolve.
    ///
    /// The completion flag is tested before the NACK status on every
    /// iteration, so a phase that has already completed wins over a
    /// simultaneously-reported NACK.
    ///
    /// # Errors
    ///
    /// [`Error::AddressNack`] if no device acknowledges the address. The
    /// bus is not released; issuing a stop is the caller's decision.
    pub fn start(&mut self, address: u8, direction: Direction) -> Result<(), Error> {
        self.hw
            .write_address((address << 1) | direction.rw_bit());

        let mut budget = self.config.poll_limit;
        loop {
            let completed = match direction {
                Direction::Read => self.hw.slave_on_bus(),
                Direction::Write => self.hw.master_on_bus(),
            };
            if completed {
                return Ok(());
            }
            if self.hw.rx_nack() {
                self.logger.log("i2c: address not acknowledged");
                return Err(Error::AddressNack);
            }
            Self::consume(&mut budget, &mut self.logger)?;
        }
    }

    /// Transmit one data byte and report the peer's acknowledgement.
    ///
    /// # Errors
    ///
    /// [`Error::DataNack`] if the device rejects the byte.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.hw.write_data(byte);

        let mut budget = self.config.poll_limit;
        while !self.hw.master_on_bus() {
            Self::consume(&mut budget, &mut self.logger)?;
        }

        if self.hw.rx_nack() {
            self.logger.log("i2c: data byte not acknowledged");
            return Err(Error::DataNack);
        }
        Ok(())
    }

    /// Receive one data byte.
    ///
    /// The acknowledge action and follow-up command are committed to the
    /// control register *before* the data register is consumed: the data
    /// read is what drives the pre-armed ACK/NACK onto the bus and
    /// advances the transaction. `AckAction::Ack` arms
    /// receive-and-continue, `AckAction::Nack` arms receive-and-stop.
    ///
    /// A rejected read does not exist at this layer; whether to NACK is
    /// the caller's choice.
    ///
    /// # Errors
    ///
    /// Only fails with [`Error::Timeout`] under a configured poll limit.
    pub fn read_byte(&mut self, ack: AckAction) -> Result<u8, Error> {
        let mut budget = self.config.poll_limit;
        while !self.hw.slave_on_bus() {
            Self::consume(&mut budget, &mut self.logger)?;
        }

        let command = match ack {
            AckAction::Ack => BusCommand::ReadContinue,
            AckAction::Nack => BusCommand::Stop,
        };
        self.hw.set_ack_command(ack, command);

        Ok(self.hw.read_data())
    }

    /// Issue a stop condition, forcing bus release, and wait for the
    /// synchronization flag with a bounded retry budget, the only
    /// timeout-guarded wait in the driver. Gives up silently when the
    /// budget is exhausted; callers that need to observe the outcome use
    /// [`SercomI2c::stop_checked`].
    pub fn stop(&mut self) {
        let _ = self.stop_checked();
    }

    /// Stop with the give-up made visible.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if sync-busy did not clear within the budget.
    pub fn stop_checked(&mut self) -> Result<(), Error> {
        self.hw.set_ack_command(AckAction::Ack, BusCommand::Stop);

        let mut budget = STOP_POLL_BUDGET;
        while self.hw.sync_busy(SyncTarget::SystemOp) {
            budget -= 1;
            if budget == 0 {
                self.logger.log("i2c: stop gave up waiting for bus idle");
                return Err(Error::Timeout);
            }
        }
        Ok(())
    }

    fn wait_sync(&mut self, target: SyncTarget) -> Result<(), Error> {
        let mut budget = self.config.poll_limit;
        while self.hw.sync_busy(target) {
            Self::consume(&mut budget, &mut self.logger)?;
        }
        Ok(())
    }

    // Burn one iteration of an injected poll bound. `None` never expires.
    fn consume(budget: &mut Option<u32>, logger: &mut L) -> Result<(), Error> {
        if let Some(remaining) = budget {
            if *remaining == 0 {
                logger.log("i2c: poll limit exhausted");
                return Err(Error::Timeout);
            }
            *remaining -= 1;
        }
        Ok(())
    }
}

impl<H: HardwareInterface, L: Logger> I2cMasterOps for SercomI2c<H, L> {
    type Error = Error;

    fn initialize<B: BringUp>(&mut self, bringup: &mut B) -> Result<(), Error> {
        SercomI2c::initialize(self, bringup)
    }

    fn start(&mut self, address: u8, direction: Direction) -> Result<(), Error> {
        SercomI2c::start(self, address, direction)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        SercomI2c::write_byte(self, byte)
    }

    fn read_byte(&mut self, ack: AckAction) -> Result<u8, Error> {
        SercomI2c::read_byte(self, ack)
    }

    fn stop(&mut self) {
        SercomI2c::stop(self);
    }

    fn stop_checked(&mut self) -> Result<(), Error> {
        SercomI2c::stop_checked(self)
    }
}
