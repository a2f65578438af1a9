//! Register access
//!
//! Every register this crate touches is an 8-bit register in the AVR
//! data space. Access goes through the [`RegisterBank`] trait so the
//! power-control logic can run against real hardware ([`Mmio`]) or
//! against an in-memory model.

use bit_field::BitField;
use volatile::Volatile;

/// An 8-bit register, identified by its data-space address.
///
/// Note that this is the *data* address (the one `lds`/`sts` use), not
/// the I/O address. For registers in the I/O space the data address is
/// the I/O address plus `0x20`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register(u16);

impl Register {
    pub const fn at(address: u16) -> Register {
        Register(address)
    }

    pub const fn address(self) -> u16 {
        self.0
    }
}

/// A single bit in a register
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bit {
    pub register: Register,
    pub bit: usize,
}

impl Bit {
    pub const fn new(register: Register, bit: usize) -> Bit {
        Bit { register, bit }
    }

    pub const fn mask(self) -> u8 {
        1 << self.bit
    }
}

/// The status register. Identical on every supported part.
pub const SREG: Register = Register::at(0x5F);

/// Global interrupt enable, `SREG[I]`
pub const SREG_I: usize = 7;

/// Access to a set of 8-bit memory-mapped registers.
///
/// Implementations must not cache: every `read` observes the register
/// and every `write` reaches it, in program order.
pub trait RegisterBank {
    fn read(&self, register: Register) -> u8;

    fn write(&self, register: Register, value: u8);

    /// Read-modify-write a register.
    fn update<F>(&self, register: Register, f: F)
    where
        F: FnOnce(&mut u8),
    {
        let mut value = self.read(register);
        f(&mut value);
        self.write(register, value);
    }

    /// Write `first` then `second` to the same register with nothing
    /// in between.
    ///
    /// Used for the timed unlock sequences, where the hardware only
    /// honours the second write if it lands within a few cycles of the
    /// first. Callers must already have interrupts disabled.
    fn timed_write(&self, register: Register, first: u8, second: u8) {
        self.write(register, first);
        self.write(register, second);
    }

    fn bit(&self, bit: Bit) -> bool {
        self.read(bit.register).get_bit(bit.bit)
    }

    fn set_bit(&self, bit: Bit, value: bool) {
        self.update(bit.register, |r| {
            r.set_bit(bit.bit, value);
        });
    }

    /// Set every bit in `mask`, leaving the rest alone.
    fn set_mask(&self, register: Register, mask: u8) {
        self.update(register, |r| *r |= mask);
    }

    /// Clear every bit in `mask`, leaving the rest alone.
    fn clear_mask(&self, register: Register, mask: u8) {
        self.update(register, |r| *r &= !mask);
    }

    /// Query `SREG[I]`
    fn interrupts_enabled(&self) -> bool {
        self.read(SREG).get_bit(SREG_I)
    }

    fn disable_interrupts(&self) {
        self.update(SREG, |r| {
            r.set_bit(SREG_I, false);
        });
    }

    fn enable_interrupts(&self) {
        self.update(SREG, |r| {
            r.set_bit(SREG_I, true);
        });
    }
}

impl<B> RegisterBank for &B
where
    B: RegisterBank + ?Sized,
{
    fn read(&self, register: Register) -> u8 {
        (**self).read(register)
    }

    fn write(&self, register: Register, value: u8) {
        (**self).write(register, value)
    }

    fn timed_write(&self, register: Register, first: u8, second: u8) {
        (**self).timed_write(register, first, second)
    }

    fn interrupts_enabled(&self) -> bool {
        (**self).interrupts_enabled()
    }

    fn disable_interrupts(&self) {
        (**self).disable_interrupts()
    }

    fn enable_interrupts(&self) {
        (**self).enable_interrupts()
    }
}

/// The chip's own registers.
///
/// Only meaningful when running on the part the crate was configured
/// for. Obtain one through
/// [`ActivePower::take`](crate::power::ActivePower::take), which makes
/// sure only a single handle to the hardware exists.
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    /// The caller must be running on an AVR part whose register map
    /// matches the addresses it will pass to this bank, and must not
    /// create a second handle that could race with this one.
    pub const unsafe fn new() -> Mmio {
        Mmio { _private: () }
    }

    #[inline(always)]
    fn cell(register: Register) -> &'static mut Volatile<u8> {
        unsafe { &mut *(register.address() as usize as *mut Volatile<u8>) }
    }
}

impl RegisterBank for Mmio {
    #[inline(always)]
    fn read(&self, register: Register) -> u8 {
        Mmio::cell(register).read()
    }

    #[inline(always)]
    fn write(&self, register: Register, value: u8) {
        Mmio::cell(register).write(value);
    }

    #[inline(always)]
    fn timed_write(&self, register: Register, first: u8, second: u8) {
        // Both values are computed before the first store so the two
        // stores come out back to back.
        let cell = Mmio::cell(register);
        cell.write(first);
        cell.write(second);
    }

    #[cfg(target_arch = "avr")]
    #[inline(always)]
    fn disable_interrupts(&self) {
        unsafe {
            core::arch::asm!("cli", options(nostack));
        }
    }

    #[cfg(target_arch = "avr")]
    #[inline(always)]
    fn enable_interrupts(&self) {
        unsafe {
            core::arch::asm!("sei", options(nostack));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedBank;

    const REG: Register = Register::at(0x64);

    #[test]
    fn update_preserves_other_bits() {
        let bank = SimulatedBank::new();
        bank.write(REG, 0b1010_0000);
        bank.set_mask(REG, 0b0000_0011);
        assert_eq!(bank.read(REG), 0b1010_0011);
        bank.clear_mask(REG, 0b1000_0001);
        assert_eq!(bank.read(REG), 0b0010_0010);
    }

    #[test]
    fn single_bits() {
        let bank = SimulatedBank::new();
        let bit = Bit::new(REG, 5);
        assert_eq!(bit.mask(), 0x20);
        assert!(!bank.bit(bit));
        bank.set_bit(bit, true);
        assert!(bank.bit(bit));
        assert_eq!(bank.read(REG), 0x20);
        bank.set_bit(bit, false);
        assert_eq!(bank.read(REG), 0);
    }

    #[test]
    fn interrupt_flag_lives_in_sreg() {
        let bank = SimulatedBank::new();
        assert!(!bank.interrupts_enabled());
        bank.write(SREG, 0x03);
        bank.enable_interrupts();
        assert!(bank.interrupts_enabled());
        assert_eq!(bank.read(SREG), 0x83);
        bank.disable_interrupts();
        assert_eq!(bank.read(SREG), 0x03);
    }

    #[test]
    fn references_forward() {
        let bank = SimulatedBank::new();
        let by_ref = &bank;
        by_ref.write(REG, 0x42);
        assert_eq!(bank.read(REG), 0x42);
    }
}
