//! ATmega640/1280/1281/2560/2561
//!
//! `PRR0` matches the 328P's `PRR`. Everything added on top of the
//! 328P's set, including USART1, is gated from `PRR1`.

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
const UCSR2B: Register = Register::at(0xD1);
const UCSR3B: Register = Register::at(0x131);
const CLKPR: Register = Register::at(0x61);

// PRR0
const PRADC: usize = 0;
const PRUSART0: usize = 1;
const PRSPI: usize = 2;
const PRTIM1: usize = 3;
const PRTIM0: usize = 5;
const PRTIM2: usize = 6;
const PRTWI: usize = 7;
// PRR1
const PRUSART1: usize = 0;
const PRUSART2: usize = 1;
const PRUSART3: usize = 2;
const PRTIM3: usize = 3;
const PRTIM4: usize = 4;
const PRTIM5: usize = 5;

chip! {
    /// ATmega2560 and its siblings
    ATmega2560 {
        variant: ChipVariant::DualRegisterExtended,
        name: "ATmega2560",
        clock_prescale: CLKPR,
        power_reduction: [PRR0, PRR1],
        peripherals: {
            adc => adc(Bit::new(PRR0, PRADC), ADCSRA),
            analog_comparator => comparator(ACSR),
            serial => usart(PeripheralId::Serial0, Bit::new(PRR0, PRUSART0), UCSR0B),
            serial1 => usart(PeripheralId::Serial1, Bit::new(PRR1, PRUSART1), UCSR1B),
            serial2 => usart(PeripheralId::Serial2, Bit::new(PRR1, PRUSART2), UCSR2B),
            serial3 => usart(PeripheralId::Serial3, Bit::new(PRR1, PRUSART3), UCSR3B),
            spi => spi(Bit::new(PRR0, PRSPI), SPCR),
            /// The two-wire interface
            wire => wire(Bit::new(PRR0, PRTWI), TWCR),
            timer0 => timer(PeripheralId::Timer0, Bit::new(PRR0, PRTIM0)),
            timer1 => timer(PeripheralId::Timer1, Bit::new(PRR0, PRTIM1)),
            timer2 => timer(PeripheralId::Timer2, Bit::new(PRR0, PRTIM2)),
            timer3 => timer(PeripheralId::Timer3, Bit::new(PRR1, PRTIM3)),
            timer4 => timer(PeripheralId::Timer4, Bit::new(PRR1, PRTIM4)),
            timer5 => timer(PeripheralId::Timer5, Bit::new(PRR1, PRTIM5)),
        }
    }
}
