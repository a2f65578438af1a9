//! The top level power control handle
//!
//! [`ActivePower`] owns the register bank for one chip and hands out
//! controllers for its peripherals and its system clock. The accessors
//! for individual peripherals (`adc()`, `spi()`, `serial3()`, ...) are
//! generated per chip in [`chips`](crate::chips), so only the ones the
//! part actually has exist.

use crate::chips::{Chip, ChipVariant};
use crate::clock::SystemClock;
use crate::interrupt::CriticalSection;
use crate::peripheral::{Peripheral, PeripheralId};
use crate::register::RegisterBank;
use core::marker::PhantomData;

/// Power control for every peripheral on chip `C`
pub struct ActivePower<C: Chip, B: RegisterBank> {
    bank: B,
    _chip: PhantomData<C>,
}

impl<C: Chip, B: RegisterBank> ActivePower<C, B> {
    /// Wrap a register bank laid out like chip `C`.
    ///
    /// On hardware use [`ActivePower::take`] instead.
    pub fn new(bank: B) -> ActivePower<C, B> {
        ActivePower {
            bank,
            _chip: PhantomData,
        }
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Give the register bank back
    pub fn release(self) -> B {
        self.bank
    }

    pub fn variant(&self) -> ChipVariant {
        C::VARIANT
    }

    /// Look up a peripheral by name, for when the peripheral isn't
    /// known until run time. Returns `None` if this chip doesn't have
    /// it.
    pub fn peripheral(&self, id: PeripheralId) -> Option<Peripheral<'_, B>> {
        C::PERIPHERALS
            .iter()
            .find(|d| d.id == id)
            .map(|d| Peripheral::new(&self.bank, *d))
    }

    /// Every peripheral this chip can power down
    pub fn peripherals(&self) -> impl Iterator<Item = Peripheral<'_, B>> + '_ {
        C::PERIPHERALS
            .iter()
            .map(move |d| Peripheral::new(&self.bank, *d))
    }

    pub fn system_clock(&mut self) -> SystemClock<'_, B> {
        SystemClock::new(&self.bank, C::CLOCK_PRESCALE)
    }

    /// Mask interrupts until the returned guard is dropped
    pub fn critical_section(&self) -> CriticalSection<'_, B> {
        CriticalSection::enter(&self.bank)
    }

    /// Query whether every peripheral is clocked and enabled.
    ///
    /// On parts with two power reduction registers both must also read
    /// zero, which catches gates for peripherals this crate doesn't
    /// otherwise manage.
    pub fn is_on(&self) -> bool {
        if C::POWER_REDUCTION.len() > 1
            && C::POWER_REDUCTION.iter().any(|&prr| self.bank.read(prr) != 0)
        {
            return false;
        }
        self.peripherals().all(|p| p.is_on())
    }

    /// Power up every peripheral
    pub fn power_on(&self) {
        debug!("{}: powering on all peripherals", C::NAME);
        for peripheral in self.peripherals() {
            peripheral.power_on();
        }
    }

    /// Power down every peripheral.
    ///
    /// This includes timer 0, which the Arduino core uses for
    /// `millis()` and `delay()`; turn it back on if anything depends
    /// on those.
    pub fn power_off(&self) {
        debug!("{}: powering off all peripherals", C::NAME);
        for peripheral in self.peripherals() {
            peripheral.power_off();
        }
    }
}

#[cfg(any(
    feature = "attiny84",
    feature = "attiny85",
    feature = "atmega328p",
    feature = "atmega1284p",
    feature = "atmega2560",
))]
mod hardware {
    use super::ActivePower;
    use crate::chips::Target;
    use crate::interrupt;
    use crate::register::Mmio;
    use core::sync::atomic::{AtomicBool, Ordering};

    static TAKEN: AtomicBool = AtomicBool::new(false);

    impl ActivePower<Target, Mmio> {
        /// Grab the hardware
        ///
        /// Returns `None` if the handle has already been taken.
        pub fn take() -> Option<ActivePower<Target, Mmio>> {
            // Safety: the chip features pick the register map, and
            // TAKEN makes sure this is the only bank handed out.
            let bank = unsafe { Mmio::new() };

            // AVR has no compare-and-swap, so the check and the store
            // happen with interrupts masked instead.
            let was_taken = interrupt::free(&bank, |_| {
                let was_taken = TAKEN.load(Ordering::Relaxed);
                TAKEN.store(true, Ordering::Relaxed);
                was_taken
            });

            if was_taken {
                None
            } else {
                Some(ActivePower::new(bank))
            }
        }
    }
}
