//! Supported chips
//!
//! Each supported part is a marker type implementing [`Chip`], which
//! carries its register map as associated constants. Per-peripheral
//! accessors such as `ActivePower::spi` are only generated for the
//! chips that actually have that peripheral, so asking for one a part
//! lacks fails to compile rather than failing at run time.
//!
//! | Type | Variant | Power reduction | Peripherals |
//! |------|---------|-----------------|-------------|
//! | [`ATtiny84`], [`ATtiny85`] | [`Tiny`](ChipVariant::Tiny) | `PRR` | ADC, AC, USI, timers 0-1 |
//! | [`ATmega328P`] | [`SingleRegister`](ChipVariant::SingleRegister) | `PRR` | ADC, AC, USART0, SPI, TWI, timers 0-2 |
//! | [`ATmega1284P`] | [`DualRegister`](ChipVariant::DualRegister) | `PRR0`, `PRR1` | as above, plus USART1 and timer 3 |
//! | [`ATmega2560`] | [`DualRegisterExtended`](ChipVariant::DualRegisterExtended) | `PRR0`, `PRR1` | as above, plus USART2-3 and timers 4-5 |

use crate::peripheral::{Descriptor, PeripheralId};
use crate::register::{Bit, Register};

/// Defines a chip marker type, its [`Chip`] implementation, and the
/// per-peripheral accessors on `ActivePower` for that chip.
macro_rules! chip {
    (
        $(#[$meta:meta])*
        $chip:ident {
            variant: $variant:expr,
            name: $name:literal,
            clock_prescale: $clkpr:expr,
            power_reduction: [$($prr:expr),+ $(,)?],
            peripherals: {
                $($(#[$pmeta:meta])* $accessor:ident => $desc:expr,)+
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub struct $chip;

        impl $crate::chips::sealed::Sealed for $chip {}

        impl $crate::chips::Chip for $chip {
            const VARIANT: $crate::chips::ChipVariant = $variant;
            const NAME: &'static str = $name;
            const CLOCK_PRESCALE: $crate::register::Register = $clkpr;
            const POWER_REDUCTION: &'static [$crate::register::Register] = &[$($prr),+];
            const PERIPHERALS: &'static [$crate::peripheral::Descriptor] = &[$($desc),+];
        }

        impl<B: $crate::register::RegisterBank> $crate::power::ActivePower<$chip, B> {
            $(
                $(#[$pmeta])*
                pub fn $accessor(&self) -> $crate::peripheral::Peripheral<'_, B> {
                    $crate::peripheral::Peripheral::new(self.bank(), $desc)
                }
            )+
        }
    };
}

mod atmega1284p;
mod atmega2560;
mod atmega328p;
mod attiny;

pub use self::atmega1284p::ATmega1284P;
pub use self::atmega2560::ATmega2560;
pub use self::atmega328p::ATmega328P;
pub use self::attiny::{ATtiny84, ATtiny85};

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// The families of part this crate distinguishes between
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipVariant {
    /// The minimal parts: one `PRR` gating the ADC, the USI and two
    /// timers
    Tiny,
    /// One `PRR`, with a single USART, SPI, TWI and three timers
    SingleRegister,
    /// `PRR0` and `PRR1`, adding a second USART and a fourth timer
    DualRegister,
    /// `PRR0` and `PRR1`, with four USARTs and six timers
    DualRegisterExtended,
}

impl ChipVariant {
    /// How many power reduction registers parts of this family have
    pub fn power_reduction_registers(self) -> usize {
        match self {
            ChipVariant::Tiny | ChipVariant::SingleRegister => 1,
            ChipVariant::DualRegister | ChipVariant::DualRegisterExtended => 2,
        }
    }
}

/// A supported part and its register map
///
/// This trait is sealed; the set of chips is fixed by this crate.
pub trait Chip: sealed::Sealed {
    const VARIANT: ChipVariant;
    const NAME: &'static str;

    /// `CLKPR`
    const CLOCK_PRESCALE: Register;

    /// `PRR`, or `PRR0` and `PRR1`
    const POWER_REDUCTION: &'static [Register];

    /// Every peripheral on the part that can be powered down
    const PERIPHERALS: &'static [Descriptor];
}

// Control register bits common to every part. The register addresses
// differ between families, the bit positions don't.

// ACSR[ACD], ACSR[ACIE]
const ACD: u8 = 1 << 7;
const ACIE: u8 = 1 << 3;
// ADCSRA[ADEN], ADCSRA[ADIE]
const ADEN: u8 = 1 << 7;
const ADIE: u8 = 1 << 3;
// SPCR[SPIE], SPCR[SPE]
const SPIE: u8 = 1 << 7;
const SPE: u8 = 1 << 6;
// TWCR[TWEN], TWCR[TWIE]
const TWEN: u8 = 1 << 2;
const TWIE: u8 = 1 << 0;
// UCSRnB[RXCIEn], [TXCIEn], [UDRIEn], [RXENn], [TXENn]
const RXCIE: u8 = 1 << 7;
const TXCIE: u8 = 1 << 6;
const UDRIE: u8 = 1 << 5;
const RXEN: u8 = 1 << 4;
const TXEN: u8 = 1 << 3;

const fn comparator(acsr: Register) -> Descriptor {
    Descriptor::ungated(PeripheralId::AnalogComparator, acsr, ACD, ACIE)
}

const fn adc(gate: Bit, adcsra: Register) -> Descriptor {
    Descriptor::gated(PeripheralId::Adc, gate, adcsra, ADEN, ADIE)
}

const fn spi(gate: Bit, spcr: Register) -> Descriptor {
    Descriptor::gated(PeripheralId::Spi, gate, spcr, SPE, SPIE)
}

const fn wire(gate: Bit, twcr: Register) -> Descriptor {
    Descriptor::gated(PeripheralId::Wire, gate, twcr, TWEN, TWIE)
}

const fn usart(id: PeripheralId, gate: Bit, ucsrb: Register) -> Descriptor {
    Descriptor::gated(id, gate, ucsrb, RXEN | TXEN, RXCIE | TXCIE | UDRIE)
}

const fn timer(id: PeripheralId, gate: Bit) -> Descriptor {
    Descriptor::clock_only(id, gate)
}

/// The chip selected with the crate's chip features
#[cfg(feature = "attiny84")]
pub type Target = ATtiny84;
/// The chip selected with the crate's chip features
#[cfg(feature = "attiny85")]
pub type Target = ATtiny85;
/// The chip selected with the crate's chip features
#[cfg(feature = "atmega328p")]
pub type Target = ATmega328P;
/// The chip selected with the crate's chip features
#[cfg(feature = "atmega1284p")]
pub type Target = ATmega1284P;
/// The chip selected with the crate's chip features
#[cfg(feature = "atmega2560")]
pub type Target = ATmega2560;

#[cfg(all(
    target_arch = "avr",
    not(any(
        feature = "attiny84",
        feature = "attiny85",
        feature = "atmega328p",
        feature = "atmega1284p",
        feature = "atmega2560",
    ))
))]
compile_error!(
    "Unrecognised chip: enable one of the `attiny84`, `attiny85`, `atmega328p`, \
     `atmega1284p` or `atmega2560` features."
);

#[cfg(any(
    all(
        feature = "attiny84",
        any(
            feature = "attiny85",
            feature = "atmega328p",
            feature = "atmega1284p",
            feature = "atmega2560",
        )
    ),
    all(
        feature = "attiny85",
        any(
            feature = "atmega328p",
            feature = "atmega1284p",
            feature = "atmega2560",
        )
    ),
    all(
        feature = "atmega328p",
        any(feature = "atmega1284p", feature = "atmega2560")
    ),
    all(feature = "atmega1284p", feature = "atmega2560"),
))]
compile_error!("Only one chip feature may be enabled at a time.");
