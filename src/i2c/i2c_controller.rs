// Licensed under the Apache-2.0 license

//! High-level I2C controller abstraction.
//!
//! This module provides the embedded-hal compatible surface over the
//! blocking master primitives. It composes start / write / read / stop
//! call sequences into whole transactions and is designed for use in
//! `no_std` environments with hardware abstraction traits.

use crate::common::{Logger, NoOpLogger};
use crate::i2c::common::Direction;
use crate::i2c::hardware_interface::AckAction;
use crate::i2c::traits::I2cMasterOps;
use embedded_hal::i2c::{Operation, SevenBitAddress};

pub struct I2cController<H: I2cMasterOps, L: Logger = NoOpLogger> {
    pub hardware: H,
    pub logger: L,
}

impl<H: I2cMasterOps> I2cController<H> {
    #[must_use]
    pub fn new(hardware: H) -> Self {
        Self {
            hardware,
            logger: NoOpLogger,
        }
    }
}

impl<H: I2cMasterOps, L: Logger> embedded_hal::i2c::ErrorType for I2cController<H, L> {
    type Error = H::Error;
}

impl<H: I2cMasterOps, L: Logger> embedded_hal::i2c::I2c for I2cController<H, L> {
    /// Execute a sequence of operations between one start and one stop.
    ///
    /// A (repeated) start with the address phase is issued at every
    /// change of direction. Read bytes are acknowledged except for the
    /// final byte of the whole transaction, which is NACKed together
    /// with the receive-and-stop command. Smart mode cannot NACK without
    /// also stopping, so a read operation followed by another operation
    /// acknowledges its last byte before the repeated start.
    ///
    /// The bus is released with a stop both after completion and after
    /// any mid-transaction NACK.
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if operations.is_empty() {
            return Ok(());
        }

        let total = operations.len();
        let mut previous: Option<Direction> = None;
        for (index, operation) in operations.iter_mut().enumerate() {
            let direction = match operation {
                Operation::Read(_) => Direction::Read,
                Operation::Write(_) => Direction::Write,
            };
            if previous != Some(direction) {
                if let Err(e) = self.hardware.start(address, direction) {
                    self.hardware.stop();
                    return Err(e);
                }
            }
            match operation {
                Operation::Write(bytes) => {
                    for &byte in *bytes {
                        if let Err(e) = self.hardware.write_byte(byte) {
                            self.hardware.stop();
                            return Err(e);
                        }
                    }
                }
                Operation::Read(buffer) => {
                    let last_operation = index + 1 == total;
                    let len = buffer.len();
                    for (i, slot) in buffer.iter_mut().enumerate() {
                        let ack = if last_operation && i + 1 == len {
                            AckAction::Nack
                        } else {
                            AckAction::Ack
                        };
                        match self.hardware.read_byte(ack) {
                            Ok(byte) => *slot = byte,
                            Err(e) => {
                                self.hardware.stop();
                                return Err(e);
                            }
                        }
                    }
                }
            }
            previous = Some(direction);
        }

        self.hardware.stop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::common::Error;
    use crate::syscon::BringUp;
    use embedded_hal::i2c::I2c;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Start(u8, Direction),
        WriteByte(u8),
        ReadByte(AckAction),
        Stop,
    }

    #[derive(Default)]
    struct FakeMaster {
        calls: Vec<Call>,
        nack_address: Option<u8>,
        nack_byte: Option<u8>,
        rx: VecDeque<u8>,
    }

    impl I2cMasterOps for FakeMaster {
        type Error = Error;

        fn initialize<B: BringUp>(&mut self, _bringup: &mut B) -> Result<(), Error> {
            Ok(())
        }

        fn start(&mut self, address: u8, direction: Direction) -> Result<(), Error> {
            self.calls.push(Call::Start(address, direction));
            if self.nack_address == Some(address) {
                return Err(Error::AddressNack);
            }
            Ok(())
        }

        fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
            self.calls.push(Call::WriteByte(byte));
            if self.nack_byte == Some(byte) {
                return Err(Error::DataNack);
            }
            Ok(())
        }

        fn read_byte(&mut self, ack: AckAction) -> Result<u8, Error> {
            self.calls.push(Call::ReadByte(ack));
            Ok(self.rx.pop_front().unwrap_or(0))
        }

        fn stop(&mut self) {
            self.calls.push(Call::Stop);
        }

        fn stop_checked(&mut self) -> Result<(), Error> {
            self.calls.push(Call::Stop);
            Ok(())
        }
    }

    #[test]
    fn test_write_is_start_bytes_stop() {
        let mut controller = I2cController::new(FakeMaster::default());

        controller.write(0x50, &[0x01, 0x02]).unwrap();

        assert_eq!(
            controller.hardware.calls,
            vec![
                Call::Start(0x50, Direction::Write),
                Call::WriteByte(0x01),
                Call::WriteByte(0x02),
                Call::Stop,
            ]
        );
    }

    #[test]
    fn test_write_data_nack_still_releases_bus() {
        let mut controller = I2cController::new(FakeMaster {
            nack_byte: Some(0x55),
            ..FakeMaster::default()
        });

        let result = controller.write(0x50, &[0xAA, 0x55, 0xFF]);

        assert_eq!(result, Err(Error::DataNack));
        assert_eq!(
            controller.hardware.calls,
            vec![
                Call::Start(0x50, Direction::Write),
                Call::WriteByte(0xAA),
                Call::WriteByte(0x55),
                Call::Stop,
            ]
        );
    }

    #[test]
    fn test_address_nack_still_releases_bus() {
        let mut controller = I2cController::new(FakeMaster {
            nack_address: Some(0x50),
            ..FakeMaster::default()
        });

        let result = controller.write(0x50, &[0x01]);

        assert_eq!(result, Err(Error::AddressNack));
        assert_eq!(
            controller.hardware.calls,
            vec![Call::Start(0x50, Direction::Write), Call::Stop]
        );
    }

    #[test]
    fn test_read_nacks_only_final_byte() {
        let mut controller = I2cController::new(FakeMaster {
            rx: VecDeque::from([0x11, 0x22, 0x33]),
            ..FakeMaster::default()
        });

        let mut buffer = [0u8; 3];
        controller.read(0x48, &mut buffer).unwrap();

        assert_eq!(buffer, [0x11, 0x22, 0x33]);
        assert_eq!(
            controller.hardware.calls,
            vec![
                Call::Start(0x48, Direction::Read),
                Call::ReadByte(AckAction::Ack),
                Call::ReadByte(AckAction::Ack),
                Call::ReadByte(AckAction::Nack),
                Call::Stop,
            ]
        );
    }

    #[test]
    fn test_write_read_uses_repeated_start() {
        let mut controller = I2cController::new(FakeMaster {
            rx: VecDeque::from([0x7F]),
            ..FakeMaster::default()
        });

        let mut buffer = [0u8; 1];
        controller.write_read(0x48, &[0x0F], &mut buffer).unwrap();

        assert_eq!(buffer, [0x7F]);
        assert_eq!(
            controller.hardware.calls,
            vec![
                Call::Start(0x48, Direction::Write),
                Call::WriteByte(0x0F),
                Call::Start(0x48, Direction::Read),
                Call::ReadByte(AckAction::Nack),
                Call::Stop,
            ]
        );
    }

    #[test]
    fn test_transaction_merges_same_direction_operations() {
        let mut controller = I2cController::new(FakeMaster {
            rx: VecDeque::from([0x01]),
            ..FakeMaster::default()
        });

        let mut buffer = [0u8; 1];
        let mut operations = [
            Operation::Write(&[0x10]),
            Operation::Write(&[0x20]),
            Operation::Read(&mut buffer),
        ];
        controller.transaction(0x30, &mut operations).unwrap();

        assert_eq!(
            controller.hardware.calls,
            vec![
                Call::Start(0x30, Direction::Write),
                Call::WriteByte(0x10),
                Call::WriteByte(0x20),
                Call::Start(0x30, Direction::Read),
                Call::ReadByte(AckAction::Nack),
                Call::Stop,
            ]
        );
    }

    #[test]
    fn test_empty_transaction_touches_nothing() {
        let mut controller = I2cController::new(FakeMaster::default());

        controller.transaction(0x30, &mut []).unwrap();

        assert!(controller.hardware.calls.is_empty());
    }
}
