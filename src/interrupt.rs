//! Critical sections
//!
//! A [`CriticalSection`] masks interrupts for as long as it is alive and
//! puts `SREG[I]` back the way it found it when dropped. Guards nest:
//! an inner guard finds interrupts already masked and leaves them
//! masked, so only the outermost one turns them back on.

use crate::register::RegisterBank;

/// Interrupts are masked while one of these exists
pub struct CriticalSection<'a, B: RegisterBank> {
    bank: &'a B,
    was_enabled: bool,
}

impl<'a, B: RegisterBank> CriticalSection<'a, B> {
    /// Snapshot the interrupt flag and mask interrupts
    pub fn enter(bank: &'a B) -> CriticalSection<'a, B> {
        let was_enabled = bank.interrupts_enabled();
        bank.disable_interrupts();
        CriticalSection { bank, was_enabled }
    }

    /// Whether interrupts were enabled when this guard was taken, and
    /// so will be again once it is dropped.
    pub fn was_enabled(&self) -> bool {
        self.was_enabled
    }

    pub fn bank(&self) -> &'a B {
        self.bank
    }
}

impl<B: RegisterBank> Drop for CriticalSection<'_, B> {
    fn drop(&mut self) {
        if self.was_enabled {
            self.bank.enable_interrupts();
        }
    }
}

/// Run `f` with interrupts masked
pub fn free<B, F, R>(bank: &B, f: F) -> R
where
    B: RegisterBank,
    F: FnOnce(&CriticalSection<'_, B>) -> R,
{
    let cs = CriticalSection::enter(bank);
    f(&cs)
}
