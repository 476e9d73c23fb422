// Licensed under the Apache-2.0 license

//! SERCOM USART driver.
//!
//! Blocking byte-stream transceiver with a fixed 8N1 frame (8 data bits,
//! no parity, one stop bit, LSB first) and a configurable baud rate
//! computed from the reference clock with the arithmetic baud formula.
//! Transmit and receive busy-poll the data-register-empty and
//! receive-complete flags without a timeout; there is no handshaking.
//!
//! The non-blocking [`UsartController::try_write_byte`] /
//! [`UsartController::try_read_byte`] primitives return `nb::Result`,
//! and the blocking calls wrap them with `nb::block!`.

use core::convert::Infallible;

use crate::common::{Logger, NoOpLogger};
use crate::syscon::BringUp;
use fugit::HertzU32;

/// Synchronization domains of the USART register file.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UsartSync {
    /// Receiver/transmitter-enable propagation.
    Control,
    /// Peripheral enable propagation.
    Enable,
}

/// Register interface of one SERCOM instance in USART mode.
pub trait UsartHardware {
    /// Request a software reset.
    fn software_reset(&mut self);

    /// Whether the software reset is still in progress.
    fn reset_pending(&self) -> bool;

    /// Program the frame shape: internal clock, RX on pad 1, TX on
    /// pad 0, LSB first, 8 data bits.
    fn configure_frame(&mut self);

    /// Enable the receiver and transmitter.
    fn enable_rx_tx(&mut self);

    /// Program the 16-bit baud register.
    fn set_baud(&mut self, value: u16);

    /// Enable the peripheral.
    fn set_enable(&mut self);

    /// Whether the given synchronization domain is still busy.
    fn sync_busy(&self, target: UsartSync) -> bool;

    /// Data-register-empty: the transmitter can accept a byte.
    fn data_register_empty(&self) -> bool;

    /// Receive-complete: a byte is waiting in the data register.
    fn receive_complete(&self) -> bool;

    /// Write a byte to the data register.
    fn write_data(&mut self, byte: u8);

    /// Read the received byte from the data register.
    fn read_data(&mut self) -> u8;
}

/// USART configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Requested baud rate in bits per second.
    pub baud_rate: u32,
    /// Reference clock feeding the baud generator.
    pub clock: HertzU32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            clock: HertzU32::from_raw(48_000_000),
        }
    }
}

impl Config {
    /// Baud register value in asynchronous arithmetic mode:
    /// `BAUD = 65536 * (1 - 16 * baud / f_ref)`, evaluated in integer
    /// arithmetic.
    #[must_use]
    pub const fn baud_register(&self) -> u16 {
        let scaled = 65_536u64 * 16 * self.baud_rate as u64 / self.clock.raw() as u64;
        (65_536u64 - scaled) as u16
    }
}

/// Blocking USART transceiver over a register interface.
pub struct UsartController<H: UsartHardware, L: Logger = NoOpLogger> {
    hw: H,
    logger: L,
}

impl<H: UsartHardware> UsartController<H> {
    #[must_use]
    pub fn new(hw: H) -> Self {
        Self::with_logger(hw, NoOpLogger)
    }
}

impl<H: UsartHardware, L: Logger> UsartController<H, L> {
    #[must_use]
    pub fn with_logger(hw: H, logger: L) -> Self {
        Self { hw, logger }
    }

    /// Release the register interface.
    #[must_use]
    pub fn free(self) -> H {
        self.hw
    }

    /// Bring up the transceiver: clocks and pins via the collaborator,
    /// software reset, frame configuration, receiver/transmitter enable,
    /// baud programming, then enable. The reset and synchronization
    /// waits are unbounded.
    pub fn init<B: BringUp>(&mut self, config: &Config, bringup: &mut B) {
        bringup.enable_clocks();
        bringup.configure_pins();

        self.hw.software_reset();
        while self.hw.reset_pending() {}

        self.hw.configure_frame();

        self.hw.enable_rx_tx();
        while self.hw.sync_busy(UsartSync::Control) {}

        self.hw.set_baud(config.baud_register());

        self.hw.set_enable();
        while self.hw.sync_busy(UsartSync::Enable) {}

        self.logger.log("usart: initialized");
    }

    /// Queue one byte for transmission if the transmitter has room.
    ///
    /// # Errors
    ///
    /// `nb::Error::WouldBlock` while the data register is occupied.
    pub fn try_write_byte(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        if !self.hw.data_register_empty() {
            return Err(nb::Error::WouldBlock);
        }
        self.hw.write_data(byte);
        Ok(())
    }

    /// Take one received byte if one is waiting.
    ///
    /// # Errors
    ///
    /// `nb::Error::WouldBlock` until a byte has been received.
    pub fn try_read_byte(&mut self) -> nb::Result<u8, Infallible> {
        if !self.hw.receive_complete() {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.hw.read_data())
    }

    /// Transmit one byte, blocking until the transmitter accepts it.
    pub fn write_byte(&mut self, byte: u8) {
        // Infallible apart from WouldBlock, which block! absorbs.
        let _ = nb::block!(self.try_write_byte(byte));
    }

    /// Receive one byte, blocking until one arrives.
    pub fn read_byte(&mut self) -> u8 {
        match nb::block!(self.try_read_byte()) {
            Ok(byte) => byte,
            Err(e) => match e {},
        }
    }

    /// Transmit a string byte by byte.
    pub fn write_str(&mut self, s: &str) {
        for &byte in s.as_bytes() {
            self.write_byte(byte);
        }
    }
}

impl<H: UsartHardware, L: Logger> embedded_io::ErrorType for UsartController<H, L> {
    type Error = Infallible;
}

impl<H: UsartHardware, L: Logger> embedded_io::Write for UsartController<H, L> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &byte in buf {
            self.write_byte(byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // The data register doubles as the shift buffer gate: empty
        // means the last byte has been handed to the shifter.
        while !self.hw.data_register_empty() {}
        Ok(())
    }
}

impl<H: UsartHardware, L: Logger> embedded_io::Read for UsartController<H, L> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut count = 0;
        for slot in buf.iter_mut() {
            if count == 0 {
                *slot = self.read_byte();
            } else {
                match self.try_read_byte() {
                    Ok(byte) => *slot = byte,
                    Err(nb::Error::WouldBlock) => break,
                    Err(nb::Error::Other(e)) => match e {},
                }
            }
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Read, Write};
    use std::cell::Cell;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        EnableClocks,
        ConfigurePins,
        SoftwareReset,
        ConfigureFrame,
        EnableRxTx,
        SetBaud(u16),
        SetEnable,
        WriteData(u8),
        ReadData,
    }

    #[derive(Default)]
    struct MockUsart {
        ops: Vec<Op>,
        rx: VecDeque<u8>,
        /// Polls before the transmitter reports room.
        dre_delay: u32,
        dre_polls: Cell<u32>,
        /// Bytes the receiver reports ready; beyond that, RXC stays low.
        rxc_limit: usize,
    }

    impl MockUsart {
        fn with_rx(rx: &[u8]) -> Self {
            Self {
                rx: rx.iter().copied().collect(),
                rxc_limit: rx.len(),
                ..Self::default()
            }
        }
    }

    impl UsartHardware for MockUsart {
        fn software_reset(&mut self) {
            self.ops.push(Op::SoftwareReset);
        }

        fn reset_pending(&self) -> bool {
            false
        }

        fn configure_frame(&mut self) {
            self.ops.push(Op::ConfigureFrame);
        }

        fn enable_rx_tx(&mut self) {
            self.ops.push(Op::EnableRxTx);
        }

        fn set_baud(&mut self, value: u16) {
            self.ops.push(Op::SetBaud(value));
        }

        fn set_enable(&mut self) {
            self.ops.push(Op::SetEnable);
        }

        fn sync_busy(&self, _target: UsartSync) -> bool {
            false
        }

        fn data_register_empty(&self) -> bool {
            let polls = self.dre_polls.get() + 1;
            self.dre_polls.set(polls);
            polls > self.dre_delay
        }

        fn receive_complete(&self) -> bool {
            self.rxc_limit > 0
        }

        fn write_data(&mut self, byte: u8) {
            self.dre_polls.set(0);
            self.ops.push(Op::WriteData(byte));
        }

        fn read_data(&mut self) -> u8 {
            self.ops.push(Op::ReadData);
            self.rxc_limit = self.rxc_limit.saturating_sub(1);
            self.rx.pop_front().unwrap_or(0)
        }
    }

    struct MockBringUp<'a>(&'a mut Vec<Op>);

    impl BringUp for MockBringUp<'_> {
        fn enable_clocks(&mut self) {
            self.0.push(Op::EnableClocks);
        }

        fn configure_pins(&mut self) {
            self.0.push(Op::ConfigurePins);
        }
    }

    #[test]
    fn test_baud_register_formula() {
        let config = Config::default();
        assert_eq!(config.baud_register(), 63_020);

        let slow = Config {
            baud_rate: 9_600,
            clock: HertzU32::from_raw(48_000_000),
        };
        assert_eq!(slow.baud_register(), 65_327);
    }

    #[test]
    fn test_init_sequence_order() {
        let mut setup_ops = Vec::new();
        let mut usart = UsartController::new(MockUsart::default());

        usart.init(&Config::default(), &mut MockBringUp(&mut setup_ops));

        assert_eq!(setup_ops, vec![Op::EnableClocks, Op::ConfigurePins]);
        assert_eq!(
            usart.hw.ops,
            vec![
                Op::SoftwareReset,
                Op::ConfigureFrame,
                Op::EnableRxTx,
                Op::SetBaud(63_020),
                Op::SetEnable,
            ]
        );
    }

    #[test]
    fn test_write_byte_waits_for_data_register_empty() {
        let mut usart = UsartController::new(MockUsart {
            dre_delay: 5,
            ..MockUsart::default()
        });

        usart.write_byte(0x42);

        assert_eq!(usart.hw.ops, vec![Op::WriteData(0x42)]);
        assert_eq!(usart.hw.dre_polls.get(), 0);
    }

    #[test]
    fn test_try_write_would_block_while_busy() {
        let mut usart = UsartController::new(MockUsart {
            dre_delay: 1,
            ..MockUsart::default()
        });

        assert_eq!(usart.try_write_byte(0x42), Err(nb::Error::WouldBlock));
        assert_eq!(usart.try_write_byte(0x42), Ok(()));
    }

    #[test]
    fn test_read_byte_returns_received_data() {
        let mut usart = UsartController::new(MockUsart::with_rx(&[0x5A]));

        assert_eq!(usart.read_byte(), 0x5A);
    }

    #[test]
    fn test_write_str_sends_bytes_in_order() {
        let mut usart = UsartController::new(MockUsart::default());

        usart.write_str("OK\r\n");

        assert_eq!(
            usart.hw.ops,
            vec![
                Op::WriteData(b'O'),
                Op::WriteData(b'K'),
                Op::WriteData(b'\r'),
                Op::WriteData(b'\n'),
            ]
        );
    }

    #[test]
    fn test_embedded_io_write_all_bytes() {
        let mut usart = UsartController::new(MockUsart::default());

        let written = usart.write(&[1, 2, 3]).unwrap();

        assert_eq!(written, 3);
        assert_eq!(
            usart.hw.ops,
            vec![Op::WriteData(1), Op::WriteData(2), Op::WriteData(3)]
        );
    }

    #[test]
    fn test_embedded_io_read_drains_available_bytes() {
        let mut usart = UsartController::new(MockUsart::with_rx(&[0x10, 0x20]));

        let mut buf = [0u8; 4];
        let count = usart.read(&mut buf).unwrap();

        assert_eq!(count, 2);
        assert_eq!(&buf[..2], &[0x10, 0x20]);
    }
}
