// Licensed under the Apache-2.0 license

//! Register interface collaborator for the SERCOM I2C master.
//!
//! The driver never touches raw addresses. Everything it needs from the
//! peripheral's control, status, data, and synchronization registers is
//! expressed here as named, typed accessors, so the bus-transaction logic
//! can run against a simulated register file in host tests and against a
//! memory-mapped implementation on the target. Implementations for real
//! hardware live outside this crate.

/// Synchronization-busy conditions the driver waits on.
///
/// Register writes to the peripheral take effect asynchronously; the
/// hardware raises one of these per-domain busy bits until the write has
/// been absorbed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SyncTarget {
    /// Enable/disable propagation.
    Enable,
    /// Software reset in progress.
    SoftwareReset,
    /// General system-operation sync (smart mode, commands, bus state).
    SystemOp,
}

/// Acknowledge action pre-armed for the next data-register read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AckAction {
    /// Drive ACK after the byte (ACK-action bit clear).
    Ack,
    /// Drive NACK after the byte (ACK-action bit set).
    Nack,
}

/// Bus command written to the command field of the control register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusCommand {
    /// Acknowledge-and-continue: receive another byte.
    ReadContinue,
    /// Issue a stop condition, releasing the bus.
    Stop,
}

/// Bus-state field values of the status register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusState {
    Unknown,
    Idle,
    Owner,
    Busy,
}

/// SDA hold-time selection programmed with the operating mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SdaHold {
    Disabled,
    Ns75,
    Ns450,
    Ns600,
}

/// Signal-to-pad routing programmed with the operating mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PadMapping {
    /// SDA on pad 0, SCL on pad 1 (standard two-wire operation).
    TwoWire,
    /// Four-wire operation with separate in/out pads.
    FourWire,
}

/// One SERCOM instance's I2C-master register file.
///
/// The contract mirrors the hardware: writing the address register emits
/// the start condition and address phase, writing the data register sends
/// a byte, and reading the data register consumes a received byte *and*
/// drives the pre-armed ACK/NACK onto the bus.
pub trait HardwareInterface {
    /// Set or clear the controller enable bit.
    fn set_enable(&mut self, enable: bool);

    /// Request a software reset of the peripheral.
    fn software_reset(&mut self);

    /// Program operating mode = master together with the pad routing and
    /// SDA hold time. Only valid while the controller is disabled and
    /// reset (the driver guarantees the ordering).
    fn configure_master(&mut self, pad_mapping: PadMapping, sda_hold: SdaHold);

    /// Enable smart mode: the hardware drives ACK/NACK from the pre-armed
    /// command instead of per-byte bit-banging.
    fn enable_smart_mode(&mut self);

    /// Program the baud-rate divisor.
    fn set_baud(&mut self, divisor: u8);

    /// Whether the given synchronization domain is still busy.
    fn sync_busy(&self, target: SyncTarget) -> bool;

    /// Write the shifted address + R/W bit, triggering start + address
    /// phase transmission.
    fn write_address(&mut self, address_rw: u8);

    /// Master-on-bus flag: a write-direction phase has completed.
    fn master_on_bus(&self) -> bool;

    /// Slave-on-bus flag: a read-direction phase has completed.
    fn slave_on_bus(&self) -> bool;

    /// Receive-NACK status: the last address or data byte was rejected.
    fn rx_nack(&self) -> bool;

    /// Commit the ACK action and bus command in a single control write.
    fn set_ack_command(&mut self, action: AckAction, command: BusCommand);

    /// Write a byte to the data register, triggering transmission.
    fn write_data(&mut self, byte: u8);

    /// Read the data register, consuming the received byte and driving
    /// the pre-armed ACK/NACK.
    fn read_data(&mut self) -> u8;

    /// Force the status bus-state field to the given value.
    fn force_bus_state(&mut self, state: BusState);
}
