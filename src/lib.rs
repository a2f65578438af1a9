//! Active-mode power saving for AVR chips
//!
//! This crate switches off the clocks and enable bits of on-chip
//! peripherals you aren't using (ADC, analog comparator, USARTs, SPI,
//! TWI, timers) and divides down the system clock, to save a few
//! hundred microamps while the chip is awake. It doesn't put the chip
//! to sleep, and it doesn't decide what to turn off; that is up to
//! you.
//!
//! The savings only matter on boards that don't burn milliamps
//! elsewhere: a Pro Mini with its power LED and regulator removed, or
//! a bare chip on a breadboard. The ADC is by far the biggest user,
//! followed by the USARTs, SPI and the 16-bit timers.
//!
//! Pick the chip with one of the `attiny84`, `attiny85`, `atmega328p`,
//! `atmega1284p` or `atmega2560` features.
//!
//! # Examples
//! ```rust,ignore
//! #![no_std]
//! #![no_main]
//!
//! use avr_active_power::ActivePower;
//!
//! #[no_mangle]
//! pub extern "C" fn main() {
//!     let mut chip = match ActivePower::take() {
//!         Some(chip) => chip,
//!         None => return,
//!     };
//!
//!     // Shouldn't be on, but maybe it is
//!     if chip.analog_comparator().is_on() {
//!         chip.analog_comparator().power_off();
//!     }
//!     chip.adc().power_off();
//!
//!     chip.system_clock().divide_by_16();
//!     // ... not much to do for a while ...
//!     chip.system_clock().full_speed();
//! }
//! ```

#![cfg_attr(not(any(test, feature = "sim")), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod chips;
pub mod clock;
pub mod interrupt;
pub mod peripheral;
pub mod power;
pub mod register;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use crate::chips::{Chip, ChipVariant};
#[cfg(any(
    feature = "attiny84",
    feature = "attiny85",
    feature = "atmega328p",
    feature = "atmega1284p",
    feature = "atmega2560",
))]
pub use crate::chips::Target;
pub use crate::clock::{Prescale, PrescaleError, SystemClock};
pub use crate::interrupt::CriticalSection;
pub use crate::peripheral::{Peripheral, PeripheralId};
pub use crate::power::ActivePower;
pub use crate::register::{Mmio, Register, RegisterBank};
