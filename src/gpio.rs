// Licensed under the Apache-2.0 license

//! GPIO port driver.
//!
//! Four 32-pin port groups driven through set/clear/toggle mask
//! registers. Out-of-range pin indices are silently ignored: writes
//! become no-ops and reads return low instead of reporting an error.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Pins per port group.
pub const PINS_PER_PORT: u8 = 32;

/// GPIO port group identifier.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PortId {
    Port0,
    Port1,
    Port2,
    Port3,
}

/// Pin direction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Input,
    Output,
}

/// Register interface of the port controller.
///
/// All writes are mask-based: the hardware applies the set/clear/toggle
/// to every pin whose bit is set, without read-modify-write.
pub trait PortHardware {
    /// Switch the masked pins to output.
    fn dir_set(&mut self, port: PortId, mask: u32);

    /// Switch the masked pins to input.
    fn dir_clear(&mut self, port: PortId, mask: u32);

    /// Drive the masked pins high.
    fn out_set(&mut self, port: PortId, mask: u32);

    /// Drive the masked pins low.
    fn out_clear(&mut self, port: PortId, mask: u32);

    /// Toggle the masked pins.
    fn out_toggle(&mut self, port: PortId, mask: u32);

    /// Sampled input levels of the whole port.
    fn input(&self, port: PortId) -> u32;
}

/// GPIO driver over a port-controller register interface.
pub struct Gpio<P: PortHardware> {
    ports: P,
}

impl<P: PortHardware> Gpio<P> {
    #[must_use]
    pub fn new(ports: P) -> Self {
        Self { ports }
    }

    /// Release the register interface.
    #[must_use]
    pub fn free(self) -> P {
        self.ports
    }

    /// Configure the direction of one pin. Ignored for `pin >= 32`.
    pub fn configure_pin(&mut self, port: PortId, pin: u8, direction: Direction) {
        let Some(mask) = pin_mask(pin) else {
            return;
        };
        match direction {
            Direction::Output => self.ports.dir_set(port, mask),
            Direction::Input => self.ports.dir_clear(port, mask),
        }
    }

    /// Drive one pin high. Ignored for `pin >= 32`.
    pub fn write_high(&mut self, port: PortId, pin: u8) {
        if let Some(mask) = pin_mask(pin) {
            self.ports.out_set(port, mask);
        }
    }

    /// Drive one pin low. Ignored for `pin >= 32`.
    pub fn write_low(&mut self, port: PortId, pin: u8) {
        if let Some(mask) = pin_mask(pin) {
            self.ports.out_clear(port, mask);
        }
    }

    /// Toggle one pin. Ignored for `pin >= 32`.
    pub fn toggle(&mut self, port: PortId, pin: u8) {
        if let Some(mask) = pin_mask(pin) {
            self.ports.out_toggle(port, mask);
        }
    }

    /// Sample the input level of one pin. Returns `false` for
    /// `pin >= 32`.
    #[must_use]
    pub fn read_pin(&self, port: PortId, pin: u8) -> bool {
        match pin_mask(pin) {
            Some(mask) => self.ports.input(port) & mask != 0,
            None => false,
        }
    }

    /// Borrow one pin as an embedded-hal digital pin handle.
    pub fn pin(&mut self, port: PortId, pin: u8) -> Pin<'_, P> {
        Pin {
            gpio: self,
            port,
            pin,
        }
    }
}

fn pin_mask(pin: u8) -> Option<u32> {
    (pin < PINS_PER_PORT).then(|| 1u32 << pin)
}

/// Single-pin handle implementing the embedded-hal digital traits.
///
/// Borrows the driver mutably, so only one handle exists at a time. The
/// silent out-of-range policy carries over: operations on an invalid
/// index succeed without touching hardware.
pub struct Pin<'a, P: PortHardware> {
    gpio: &'a mut Gpio<P>,
    port: PortId,
    pin: u8,
}

impl<P: PortHardware> ErrorType for Pin<'_, P> {
    type Error = Infallible;
}

impl<P: PortHardware> OutputPin for Pin<'_, P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.gpio.write_low(self.port, self.pin);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.gpio.write_high(self.port, self.pin);
        Ok(())
    }
}

impl<P: PortHardware> InputPin for Pin<'_, P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.gpio.read_pin(self.port, self.pin))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.gpio.read_pin(self.port, self.pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        DirSet(PortId, u32),
        DirClear(PortId, u32),
        OutSet(PortId, u32),
        OutClear(PortId, u32),
        OutToggle(PortId, u32),
    }

    #[derive(Default)]
    struct MockPort {
        ops: Vec<Op>,
        levels: HashMap<u8, u32>,
    }

    fn key(port: PortId) -> u8 {
        match port {
            PortId::Port0 => 0,
            PortId::Port1 => 1,
            PortId::Port2 => 2,
            PortId::Port3 => 3,
        }
    }

    impl PortHardware for MockPort {
        fn dir_set(&mut self, port: PortId, mask: u32) {
            self.ops.push(Op::DirSet(port, mask));
        }

        fn dir_clear(&mut self, port: PortId, mask: u32) {
            self.ops.push(Op::DirClear(port, mask));
        }

        fn out_set(&mut self, port: PortId, mask: u32) {
            self.ops.push(Op::OutSet(port, mask));
        }

        fn out_clear(&mut self, port: PortId, mask: u32) {
            self.ops.push(Op::OutClear(port, mask));
        }

        fn out_toggle(&mut self, port: PortId, mask: u32) {
            self.ops.push(Op::OutToggle(port, mask));
        }

        fn input(&self, port: PortId) -> u32 {
            self.levels.get(&key(port)).copied().unwrap_or(0)
        }
    }

    #[test]
    fn test_configure_and_write_use_pin_masks() {
        let mut gpio = Gpio::new(MockPort::default());

        gpio.configure_pin(PortId::Port3, 8, Direction::Output);
        gpio.write_high(PortId::Port3, 8);
        gpio.write_low(PortId::Port3, 8);
        gpio.toggle(PortId::Port3, 8);
        gpio.configure_pin(PortId::Port0, 0, Direction::Input);

        assert_eq!(
            gpio.ports.ops,
            vec![
                Op::DirSet(PortId::Port3, 1 << 8),
                Op::OutSet(PortId::Port3, 1 << 8),
                Op::OutClear(PortId::Port3, 1 << 8),
                Op::OutToggle(PortId::Port3, 1 << 8),
                Op::DirClear(PortId::Port0, 1),
            ]
        );
    }

    #[test]
    fn test_out_of_range_pin_is_silent_no_op() {
        let mut gpio = Gpio::new(MockPort::default());

        for pin in [32, 33, 200, 255] {
            gpio.configure_pin(PortId::Port1, pin, Direction::Output);
            gpio.write_high(PortId::Port1, pin);
            gpio.write_low(PortId::Port1, pin);
            gpio.toggle(PortId::Port1, pin);
            assert!(!gpio.read_pin(PortId::Port1, pin));
        }

        assert!(gpio.ports.ops.is_empty());
    }

    #[test]
    fn test_read_pin_extracts_level() {
        let mut port = MockPort::default();
        port.levels.insert(2, 1 << 13);
        let gpio = Gpio::new(port);

        assert!(gpio.read_pin(PortId::Port2, 13));
        assert!(!gpio.read_pin(PortId::Port2, 12));
        assert!(!gpio.read_pin(PortId::Port1, 13));
    }

    #[test]
    fn test_pin_handle_digital_traits() {
        let mut port = MockPort::default();
        port.levels.insert(0, 1 << 5);
        let mut gpio = Gpio::new(port);

        let mut pin = gpio.pin(PortId::Port0, 5);
        assert!(pin.is_high().unwrap());
        assert!(!pin.is_low().unwrap());
        pin.set_high().unwrap();
        pin.set_low().unwrap();

        assert_eq!(
            gpio.ports.ops,
            vec![
                Op::OutSet(PortId::Port0, 1 << 5),
                Op::OutClear(PortId::Port0, 1 << 5),
            ]
        );
    }
}
