//! ATtiny24/44/84 and ATtiny25/45/85
//!
//! The two families share a register layout except for `PRR`, which
//! sits at I/O address `0x00` on the x4 parts and `0x20` on the x5.
//! Neither has a USART, SPI or TWI; serial comms go through the USI,
//! which only has a clock gate.

use super::{adc, comparator, timer, ChipVariant};
use crate::peripheral::{Descriptor, PeripheralId};
use crate::register::{Bit, Register};

const PRR_X4: Register = Register::at(0x20);
const PRR_X5: Register = Register::at(0x40);
const ACSR: Register = Register::at(0x28);
const ADCSRA: Register = Register::at(0x26);
const CLKPR: Register = Register::at(0x46);

// PRR bits
const PRADC: usize = 0;
const PRUSI: usize = 1;
const PRTIM0: usize = 2;
const PRTIM1: usize = 3;

const fn usi(prr: Register) -> Descriptor {
    Descriptor::clock_only(PeripheralId::Usi, Bit::new(prr, PRUSI))
}

chip! {
    /// ATtiny24, ATtiny44 and ATtiny84
    ATtiny84 {
        variant: ChipVariant::Tiny,
        name: "ATtiny84",
        clock_prescale: CLKPR,
        power_reduction: [PRR_X4],
        peripherals: {
            adc => adc(Bit::new(PRR_X4, PRADC), ADCSRA),
            analog_comparator => comparator(ACSR),
            /// The universal serial interface
            usi => usi(PRR_X4),
            timer0 => timer(PeripheralId::Timer0, Bit::new(PRR_X4, PRTIM0)),
            timer1 => timer(PeripheralId::Timer1, Bit::new(PRR_X4, PRTIM1)),
        }
    }
}

chip! {
    /// ATtiny25, ATtiny45 and ATtiny85
    ATtiny85 {
        variant: ChipVariant::Tiny,
        name: "ATtiny85",
        clock_prescale: CLKPR,
        power_reduction: [PRR_X5],
        peripherals: {
            adc => adc(Bit::new(PRR_X5, PRADC), ADCSRA),
            analog_comparator => comparator(ACSR),
            /// The universal serial interface
            usi => usi(PRR_X5),
            timer0 => timer(PeripheralId::Timer0, Bit::new(PRR_X5, PRTIM0)),
            timer1 => timer(PeripheralId::Timer1, Bit::new(PRR_X5, PRTIM1)),
        }
    }
}
