//! An in-memory register bank for host-side testing
//!
//! [`SimulatedBank`] stands in for the chip's lower data space. It
//! keeps a journal of every register write, along with whether
//! interrupts were enabled at the time, so tests can check the order
//! in which bits change and that timed sequences ran with interrupts
//! masked.
//!
//! When built for a particular chip (see [`SimulatedBank::for_chip`])
//! the bank also models the clock prescale register's change-enable
//! window: a write of `CLKPCE` alone opens the window, and only the
//! very next register access may change the divisor. Anything else
//! closes the window again and a late write is ignored, as it would be
//! on the hardware.

use crate::chips::Chip;
use crate::clock::CLKPCE;
use crate::peripheral::Control;
use crate::register::{Register, RegisterBank, SREG, SREG_I};
use bit_field::BitField;
use core::cell::{Cell, RefCell};

/// Size of the modelled data space. Covers every register of the
/// supported parts, `UCSR3B` at `0x131` being the highest.
const DATA_SPACE: usize = 0x200;

/// One journaled register write
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Write {
    pub register: Register,
    /// The value the code wrote, which is not necessarily what the
    /// register holds afterwards.
    pub value: u8,
    /// `SREG[I]` immediately before this write
    pub interrupts_enabled: bool,
}

pub struct SimulatedBank {
    cells: [Cell<u8>; DATA_SPACE],
    journal: RefCell<Vec<Write>>,
    prescale: Option<Register>,
    window: Cell<bool>,
}

impl SimulatedBank {
    /// A bank with every register zeroed and no timed registers.
    pub fn new() -> SimulatedBank {
        SimulatedBank {
            cells: core::array::from_fn(|_| Cell::new(0)),
            journal: RefCell::new(Vec::new()),
            prescale: None,
            window: Cell::new(false),
        }
    }

    /// A zeroed bank that models `C`'s clock prescale register.
    pub fn for_chip<C: Chip>() -> SimulatedBank {
        SimulatedBank {
            prescale: Some(C::CLOCK_PRESCALE),
            ..SimulatedBank::new()
        }
    }

    /// The state `C` comes out of reset in, as far as this crate is
    /// concerned: every peripheral clocked and enabled, the clock
    /// undivided, and interrupts enabled.
    pub fn all_enabled<C: Chip>() -> SimulatedBank {
        let bank = SimulatedBank::for_chip::<C>();
        bank.poke(SREG, 1 << SREG_I);
        for &prr in C::POWER_REDUCTION {
            bank.poke(prr, 0);
        }
        for descriptor in C::PERIPHERALS {
            match descriptor.control {
                Control::ClockOnly => {}
                Control::Enable {
                    register, enable, ..
                } => bank.poke(register, bank.peek(register) | enable),
                Control::Disable {
                    register, disable, ..
                } => bank.poke(register, bank.peek(register) & !disable),
            }
        }
        bank.poke(C::CLOCK_PRESCALE, 0);
        bank
    }

    /// Read a register without it counting as an access.
    pub fn peek(&self, register: Register) -> u8 {
        self.cells[register.address() as usize].get()
    }

    /// Set a register without it counting as an access or being
    /// journaled. Bypasses the prescale model entirely.
    pub fn poke(&self, register: Register, value: u8) {
        self.cells[register.address() as usize].set(value);
    }

    /// Every write since creation or the last [`clear_journal`](Self::clear_journal).
    pub fn journal(&self) -> Vec<Write> {
        self.journal.borrow().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.borrow_mut().clear();
    }

    /// The values written to one register, in order.
    pub fn writes_to(&self, register: Register) -> Vec<u8> {
        self.journal
            .borrow()
            .iter()
            .filter(|w| w.register == register)
            .map(|w| w.value)
            .collect()
    }

    /// Any access other than the one completing the sequence closes
    /// the prescale change window.
    fn close_window(&self) {
        if self.window.replace(false) {
            if let Some(prescale) = self.prescale {
                self.poke(prescale, self.peek(prescale) & !CLKPCE);
            }
        }
    }

    fn write_prescale(&self, register: Register, value: u8) {
        let window = self.window.replace(false);
        if value == CLKPCE {
            // CLKPCE only latches when every other bit is written as zero
            self.poke(register, self.peek(register) | CLKPCE);
            self.window.set(true);
        } else if window && !value.get_bit(7) {
            self.poke(register, value & 0x0F);
        } else {
            self.poke(register, self.peek(register) & !CLKPCE);
        }
    }
}

impl Default for SimulatedBank {
    fn default() -> SimulatedBank {
        SimulatedBank::new()
    }
}

impl RegisterBank for SimulatedBank {
    fn read(&self, register: Register) -> u8 {
        self.close_window();
        self.peek(register)
    }

    fn write(&self, register: Register, value: u8) {
        self.journal.borrow_mut().push(Write {
            register,
            value,
            interrupts_enabled: self.peek(SREG).get_bit(SREG_I),
        });

        if Some(register) == self.prescale {
            self.write_prescale(register, value);
        } else {
            self.close_window();
            self.poke(register, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::{ATmega2560, ATmega328P};
    use crate::peripheral::PeripheralId;

    fn clkpr() -> Register {
        ATmega328P::CLOCK_PRESCALE
    }

    #[test]
    fn journal_records_interrupt_state() {
        let bank = SimulatedBank::new();
        let reg = Register::at(0x7A);
        bank.write(reg, 1);
        bank.enable_interrupts();
        bank.write(reg, 2);

        let journal = bank.journal();
        assert_eq!(journal.len(), 3);
        assert!(!journal[0].interrupts_enabled);
        assert_eq!(journal[1].register, SREG);
        assert!(journal[2].interrupts_enabled);
        assert_eq!(bank.writes_to(reg), vec![1, 2]);

        bank.clear_journal();
        assert!(bank.journal().is_empty());
    }

    #[test]
    fn prescale_change_in_window() {
        let bank = SimulatedBank::for_chip::<ATmega328P>();
        bank.write(clkpr(), CLKPCE);
        assert_eq!(bank.peek(clkpr()), CLKPCE);
        bank.write(clkpr(), 0x04);
        assert_eq!(bank.peek(clkpr()), 0x04);
    }

    #[test]
    fn prescale_change_without_unlock_is_ignored() {
        let bank = SimulatedBank::for_chip::<ATmega328P>();
        bank.write(clkpr(), 0x04);
        assert_eq!(bank.peek(clkpr()), 0);
    }

    #[test]
    fn late_prescale_write_is_ignored() {
        let bank = SimulatedBank::for_chip::<ATmega328P>();
        bank.write(clkpr(), CLKPCE);
        let _ = bank.read(SREG);
        assert_eq!(bank.peek(clkpr()), 0);
        bank.write(clkpr(), 0x04);
        assert_eq!(bank.peek(clkpr()), 0);
    }

    #[test]
    fn unlock_needs_other_bits_zero() {
        let bank = SimulatedBank::for_chip::<ATmega328P>();
        bank.write(clkpr(), CLKPCE | 0x03);
        bank.write(clkpr(), 0x03);
        assert_eq!(bank.peek(clkpr()), 0);
    }

    #[test]
    fn reset_state() {
        let bank = SimulatedBank::all_enabled::<ATmega2560>();
        assert!(bank.interrupts_enabled());
        let serial3 = ATmega2560::PERIPHERALS
            .iter()
            .find(|d| d.id == PeripheralId::Serial3)
            .map(|d| d.control);
        match serial3 {
            Some(Control::Enable {
                register, enable, ..
            }) => assert_eq!(bank.peek(register) & enable, enable),
            other => panic!("unexpected control for Serial3: {:?}", other),
        }
    }
}
