//! ATmega48/88/168/328 (P and PA variants included)
//!
//! | Bit | `PRR` | Arduino user |
//! |-----|-------|--------------|
//! | 0 | `PRADC` | `analogRead()` |
//! | 1 | `PRUSART0` | `Serial` |
//! | 2 | `PRSPI` | `SPI` |
//! | 3 | `PRTIM1` | `tone()`, `analogWrite()` |
//! | 5 | `PRTIM0` | `millis()`, `delay()` |
//! | 6 | `PRTIM2` | `tone()`, `analogWrite()` |
//! | 7 | `PRTWI` | `Wire` |

use super::{adc, comparator, spi, timer, usart, wire, ChipVariant};
use crate::peripheral::PeripheralId;
use crate::register::{Bit, Register};

const PRR: Register = Register::at(0x64);
const ACSR: Register = Register::at(0x50);
const ADCSRA: Register = Register::at(0x7A);
const SPCR: Register = Register::at(0x4C);
const TWCR: Register = Register::at(0xBC);
const UCSR0B: Register = Register::at(0xC1);
const CLKPR: Register = Register::at(0x61);

const PRADC: usize = 0;
const PRUSART0: usize = 1;
const PRSPI: usize = 2;
const PRTIM1: usize = 3;
const PRTIM0: usize = 5;
const PRTIM2: usize = 6;
const PRTWI: usize = 7;

chip! {
    /// ATmega328P and its smaller siblings
    ATmega328P {
        variant: ChipVariant::SingleRegister,
        name: "ATmega328P",
        clock_prescale: CLKPR,
        power_reduction: [PRR],
        peripherals: {
            adc => adc(Bit::new(PRR, PRADC), ADCSRA),
            analog_comparator => comparator(ACSR),
            serial => usart(PeripheralId::Serial0, Bit::new(PRR, PRUSART0), UCSR0B),
            spi => spi(Bit::new(PRR, PRSPI), SPCR),
            /// The two-wire interface
            wire => wire(Bit::new(PRR, PRTWI), TWCR),
            timer0 => timer(PeripheralId::Timer0, Bit::new(PRR, PRTIM0)),
            timer1 => timer(PeripheralId::Timer1, Bit::new(PRR, PRTIM1)),
            timer2 => timer(PeripheralId::Timer2, Bit::new(PRR, PRTIM2)),
        }
    }
}
