//! System clock prescaler
//!
//! `CLKPR` divides the system clock by a power of two between 1 and
//! 256. The divisor can only be changed with a timed sequence: write
//! `CLKPCE` with every other bit zero, then write the new divisor
//! within four cycles. If anything gets in between (an interrupt, or
//! just slow code) the hardware quietly drops the second write.
//!
//! Slowing the clock affects everything that counts cycles. Timers run
//! slower, serial baud rates are wrong, and the ADC may lose accuracy.

use crate::interrupt::CriticalSection;
use crate::register::{Register, RegisterBank};
use bit_field::BitField;

/// Clock prescaler change enable, `CLKPR[CLKPCE]`
pub const CLKPCE: u8 = 1 << 7;

/// The system clock divisors the hardware supports
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescale {
    Div1,
    Div2,
    Div4,
    Div8,
    Div16,
    Div32,
    Div64,
    Div128,
    Div256,
}

impl Prescale {
    /// Look up the prescale setting for a division ratio
    pub fn from_ratio(ratio: u16) -> Option<Prescale> {
        match ratio {
            1 => Some(Prescale::Div1),
            2 => Some(Prescale::Div2),
            4 => Some(Prescale::Div4),
            8 => Some(Prescale::Div8),
            16 => Some(Prescale::Div16),
            32 => Some(Prescale::Div32),
            64 => Some(Prescale::Div64),
            128 => Some(Prescale::Div128),
            256 => Some(Prescale::Div256),
            _ => None,
        }
    }

    pub fn ratio(self) -> u16 {
        1 << self.bits()
    }

    /// The `CLKPR[CLKPS]` encoding
    pub fn bits(self) -> u8 {
        self as u8
    }
}

#[doc(hidden)]
impl TryFrom<u8> for Prescale {
    type Error = u8;

    fn try_from(v: u8) -> Result<Prescale, u8> {
        match v {
            0 => Ok(Prescale::Div1),
            1 => Ok(Prescale::Div2),
            2 => Ok(Prescale::Div4),
            3 => Ok(Prescale::Div8),
            4 => Ok(Prescale::Div16),
            5 => Ok(Prescale::Div32),
            6 => Ok(Prescale::Div64),
            7 => Ok(Prescale::Div128),
            8 => Ok(Prescale::Div256),
            other => Err(other),
        }
    }
}

/// Indicates a prescale change was refused
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrescaleError {
    /// The ratio isn't a power of two between 1 and 256. `CLKPR` was
    /// not touched.
    InvalidRatio(u16),
}

/// The system clock prescaler
pub struct SystemClock<'a, B: RegisterBank> {
    bank: &'a B,
    clkpr: Register,
}

impl<'a, B: RegisterBank> SystemClock<'a, B> {
    pub fn new(bank: &'a B, clkpr: Register) -> SystemClock<'a, B> {
        SystemClock { bank, clkpr }
    }

    /// Divide the system clock by `ratio`.
    ///
    /// # Errors
    /// Returns [`PrescaleError::InvalidRatio`] unless `ratio` is one of
    /// 1, 2, 4, 8, 16, 32, 64, 128 or 256. The clock is left alone.
    pub fn divide_by(&mut self, ratio: u16) -> Result<(), PrescaleError> {
        match Prescale::from_ratio(ratio) {
            Some(prescale) => {
                self.set(prescale);
                Ok(())
            }
            None => {
                warn!("refusing clock divisor {}", ratio);
                Err(PrescaleError::InvalidRatio(ratio))
            }
        }
    }

    /// Change the clock divisor.
    ///
    /// Interrupts are masked for the length of the timed sequence and
    /// restored to their previous state afterwards.
    pub fn set(&mut self, prescale: Prescale) {
        let bits = prescale.bits();
        {
            let cs = CriticalSection::enter(self.bank);
            cs.bank().timed_write(self.clkpr, CLKPCE, bits);
        }
        debug!("system clock divided by {}", prescale.ratio());
    }

    /// Read back the current divisor. Returns `None` if `CLKPR` holds
    /// one of the reserved encodings.
    pub fn prescale(&self) -> Option<Prescale> {
        Prescale::try_from(self.bank.read(self.clkpr).get_bits(0..4)).ok()
    }

    pub fn divide_by_8(&mut self) {
        self.set(Prescale::Div8);
    }

    pub fn divide_by_16(&mut self) {
        self.set(Prescale::Div16);
    }

    pub fn full_speed(&mut self) {
        self.set(Prescale::Div1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::{ATmega328P, ATtiny85, Chip};
    use crate::register::SREG;
    use crate::sim::SimulatedBank;

    const CLKPR: Register = ATmega328P::CLOCK_PRESCALE;

    #[test]
    fn every_ratio_sets_its_encoding() {
        let expected: [(u16, u8); 9] = [
            (1, 0),
            (2, 1),
            (4, 2),
            (8, 3),
            (16, 4),
            (32, 5),
            (64, 6),
            (128, 7),
            (256, 8),
        ];
        let bank = SimulatedBank::for_chip::<ATmega328P>();
        let mut clock = SystemClock::new(&bank, CLKPR);
        for (ratio, bits) in expected {
            assert_eq!(clock.divide_by(ratio), Ok(()));
            assert_eq!(bank.peek(CLKPR), bits, "ratio {}", ratio);
            assert_eq!(clock.prescale().map(Prescale::ratio), Some(ratio));
        }
    }

    #[test]
    fn invalid_ratio_leaves_register_alone() {
        let bank = SimulatedBank::for_chip::<ATmega328P>();
        let mut clock = SystemClock::new(&bank, CLKPR);
        clock.divide_by_8();
        bank.clear_journal();

        for ratio in [0, 3, 5, 12, 255, 512] {
            assert_eq!(
                clock.divide_by(ratio),
                Err(PrescaleError::InvalidRatio(ratio))
            );
        }
        assert_eq!(bank.peek(CLKPR), 0x03);
        assert!(bank.journal().is_empty());
    }

    #[test]
    fn unlock_and_value_are_adjacent_and_masked() {
        let bank = SimulatedBank::for_chip::<ATmega328P>();
        bank.enable_interrupts();
        bank.clear_journal();

        SystemClock::new(&bank, CLKPR).divide_by_16();

        let journal = bank.journal();
        let first = journal
            .iter()
            .position(|w| w.register == CLKPR)
            .unwrap_or(usize::MAX);
        assert_eq!(journal[first].value, CLKPCE);
        assert_eq!(journal[first + 1].register, CLKPR);
        assert_eq!(journal[first + 1].value, 0x04);
        assert!(!journal[first].interrupts_enabled);
        assert!(!journal[first + 1].interrupts_enabled);

        // Masked before, restored after.
        assert_eq!(journal.first().map(|w| w.register), Some(SREG));
        assert_eq!(journal.last().map(|w| w.register), Some(SREG));
        assert!(bank.interrupts_enabled());
        assert_eq!(bank.peek(CLKPR), 0x04);
    }

    #[test]
    fn keeps_interrupts_masked_if_they_were() {
        let bank = SimulatedBank::for_chip::<ATmega328P>();
        SystemClock::new(&bank, CLKPR).divide_by(2).unwrap();
        assert!(!bank.interrupts_enabled());
        assert_eq!(bank.peek(CLKPR), 0x01);
    }

    #[test]
    fn shortcuts() {
        let bank = SimulatedBank::for_chip::<ATtiny85>();
        let clkpr = ATtiny85::CLOCK_PRESCALE;
        let mut clock = SystemClock::new(&bank, clkpr);

        clock.divide_by_8();
        assert_eq!(clock.prescale(), Some(Prescale::Div8));
        clock.divide_by_16();
        assert_eq!(clock.prescale(), Some(Prescale::Div16));
        clock.full_speed();
        assert_eq!(clock.prescale(), Some(Prescale::Div1));
        assert_eq!(bank.peek(clkpr), 0);
    }

    #[test]
    fn reserved_encoding_reads_as_none() {
        let bank = SimulatedBank::for_chip::<ATmega328P>();
        bank.poke(CLKPR, 0x0B);
        assert_eq!(SystemClock::new(&bank, CLKPR).prescale(), None);
    }

    #[test]
    fn ratio_round_trip() {
        assert_eq!(Prescale::from_ratio(64), Some(Prescale::Div64));
        assert_eq!(Prescale::Div256.ratio(), 256);
        assert_eq!(Prescale::Div256.bits(), 8);
        assert_eq!(Prescale::from_ratio(100), None);
    }
}
