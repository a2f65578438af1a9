//! ATmega164/324/644/1284 (P variants)
//!
//! `PRR0` is laid out like the 328P's `PRR`, with `PRUSART1` filling
//! bit 4. `PRR1` only gates timer 3.

use super::{adc, comparator, spi, timer, usart, wire, ChipVariant};
use crate::peripheral::PeripheralId;
use crate::register::{Bit, Register};

const PRR0: Register = Register::at(0x64);
const PRR1: Register = Register::at(0x65);
const ACSR: Register = Register::at(0x50);
const ADCSRA: Register = Register::at(0x7A);
const SPCR: Register = Register::at(0x4C);
const TWCR: Register = Register::at(0xBC);
const UCSR0B: Register = Register::at(0xC1);
const UCSR1B: Register = Register::at(0xC9);
const CLKPR: Register = Register::at(0x61);

// PRR0
const PRADC: usize = 0;
const PRUSART0: usize = 1;
const PRSPI: usize = 2;
const PRTIM1: usize = 3;
const PRUSART1: usize = 4;
const PRTIM0: usize = 5;
const PRTIM2: usize = 6;
const PRTWI: usize = 7;
// PRR1
const PRTIM3: usize = 0;

chip! {
    /// ATmega1284P and its smaller siblings
    ATmega1284P {
        variant: ChipVariant::DualRegister,
        name: "ATmega1284P",
        clock_prescale: CLKPR,
        power_reduction: [PRR0, PRR1],
        peripherals: {
            adc => adc(Bit::new(PRR0, PRADC), ADCSRA),
            analog_comparator => comparator(ACSR),
            serial => usart(PeripheralId::Serial0, Bit::new(PRR0, PRUSART0), UCSR0B),
            serial1 => usart(PeripheralId::Serial1, Bit::new(PRR0, PRUSART1), UCSR1B),
            spi => spi(Bit::new(PRR0, PRSPI), SPCR),
            /// The two-wire interface
            wire => wire(Bit::new(PRR0, PRTWI), TWCR),
            timer0 => timer(PeripheralId::Timer0, Bit::new(PRR0, PRTIM0)),
            timer1 => timer(PeripheralId::Timer1, Bit::new(PRR0, PRTIM1)),
            timer2 => timer(PeripheralId::Timer2, Bit::new(PRR0, PRTIM2)),
            timer3 => timer(PeripheralId::Timer3, Bit::new(PRR1, PRTIM3)),
        }
    }
}
