//! Per-peripheral power control
//!
//! Most AVR peripherals have two independent switches: a clock gate in
//! one of the power reduction registers (`PRR`, or `PRR0`/`PRR1` on
//! the bigger parts), and one or more enable bits in the peripheral's
//! own control register. Writing a control register while the
//! peripheral's clock is gated has no effect, so the two have to be
//! flipped in a particular order:
//!
//! * powering down clears the enable bits first, then gates the clock
//! * powering up ungates the clock first, then sets the enable bits
//!
//! The timers and the USI have no enable bit: gating their clock
//! freezes them and stops their interrupts. The analog comparator has
//! no clock gate, only an active-high disable bit (`ACSR[ACD]`).

use crate::register::{Bit, Register, RegisterBank};

/// Names every peripheral this crate knows how to power down
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeripheralId {
    Adc,
    AnalogComparator,
    /// The universal serial interface on the tiny parts
    Usi,
    Serial0,
    Serial1,
    Serial2,
    Serial3,
    Spi,
    /// The two-wire interface (I2C)
    Wire,
    Timer0,
    Timer1,
    Timer2,
    Timer3,
    Timer4,
    Timer5,
}

/// How a peripheral is switched on in its own control register
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    /// No control bits; only the clock gate matters.
    ClockOnly,
    /// Every bit in `enable` must be set for the peripheral to be on.
    /// The `interrupts` bits are cleared along with them when powering
    /// down, but are left for the caller to configure when powering up.
    Enable {
        register: Register,
        enable: u8,
        interrupts: u8,
    },
    /// The peripheral is on while the `disable` bits are clear.
    /// `interrupts` is masked before `disable` is set.
    Disable {
        register: Register,
        disable: u8,
        interrupts: u8,
    },
}

/// Where a peripheral's switches live on a particular chip
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Descriptor {
    pub id: PeripheralId,
    /// Clock gate bit in a power reduction register, if the peripheral
    /// has one
    pub gate: Option<Bit>,
    pub control: Control,
}

impl Descriptor {
    /// A peripheral with a clock gate and enable bits
    pub const fn gated(
        id: PeripheralId,
        gate: Bit,
        register: Register,
        enable: u8,
        interrupts: u8,
    ) -> Descriptor {
        Descriptor {
            id,
            gate: Some(gate),
            control: Control::Enable {
                register,
                enable,
                interrupts,
            },
        }
    }

    /// A peripheral which is only controlled by its clock gate
    pub const fn clock_only(id: PeripheralId, gate: Bit) -> Descriptor {
        Descriptor {
            id,
            gate: Some(gate),
            control: Control::ClockOnly,
        }
    }

    /// A peripheral with no clock gate and an active-high disable bit
    pub const fn ungated(
        id: PeripheralId,
        register: Register,
        disable: u8,
        interrupts: u8,
    ) -> Descriptor {
        Descriptor {
            id,
            gate: None,
            control: Control::Disable {
                register,
                disable,
                interrupts,
            },
        }
    }
}

/// Power control for a single peripheral
pub struct Peripheral<'a, B: RegisterBank> {
    bank: &'a B,
    descriptor: Descriptor,
}

impl<'a, B: RegisterBank> Peripheral<'a, B> {
    pub fn new(bank: &'a B, descriptor: Descriptor) -> Peripheral<'a, B> {
        Peripheral { bank, descriptor }
    }

    pub fn id(&self) -> PeripheralId {
        self.descriptor.id
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Query whether the peripheral is clocked and enabled
    pub fn is_on(&self) -> bool {
        let clocked = match self.descriptor.gate {
            Some(gate) => !self.bank.bit(gate),
            None => true,
        };

        clocked
            && match self.descriptor.control {
                Control::ClockOnly => true,
                Control::Enable {
                    register, enable, ..
                } => self.bank.read(register) & enable == enable,
                Control::Disable {
                    register, disable, ..
                } => self.bank.read(register) & disable == 0,
            }
    }

    /// Ungate the peripheral's clock, then enable it.
    pub fn power_on(&self) {
        trace!("power on {:?}", self.descriptor.id);

        if let Some(gate) = self.descriptor.gate {
            self.bank.set_bit(gate, false);
        }

        match self.descriptor.control {
            Control::ClockOnly => {}
            Control::Enable {
                register, enable, ..
            } => self.bank.set_mask(register, enable),
            Control::Disable {
                register, disable, ..
            } => self.bank.clear_mask(register, disable),
        }
    }

    /// Disable the peripheral and its interrupts, then gate its clock.
    ///
    /// Anything in flight (a transfer, a conversion) is cut off.
    pub fn power_off(&self) {
        trace!("power off {:?}", self.descriptor.id);

        match self.descriptor.control {
            Control::ClockOnly => {}
            Control::Enable {
                register,
                enable,
                interrupts,
            } => self.bank.clear_mask(register, enable | interrupts),
            Control::Disable {
                register,
                disable,
                interrupts,
            } => {
                // ACSR[ACIE] must be clear before ACSR[ACD] changes or
                // the comparator can fire a spurious interrupt.
                self.bank.clear_mask(register, interrupts);
                self.bank.set_mask(register, disable);
            }
        }

        if let Some(gate) = self.descriptor.gate {
            self.bank.set_bit(gate, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedBank;

    const PRR: Register = Register::at(0x64);
    const ADCSRA: Register = Register::at(0x7A);
    const ACSR: Register = Register::at(0x50);
    const UCSR0B: Register = Register::at(0xC1);

    const ADC: Descriptor = Descriptor::gated(
        PeripheralId::Adc,
        Bit::new(PRR, 0),
        ADCSRA,
        1 << 7,
        1 << 3,
    );
    const SERIAL0: Descriptor = Descriptor::gated(
        PeripheralId::Serial0,
        Bit::new(PRR, 1),
        UCSR0B,
        (1 << 4) | (1 << 3),
        (1 << 7) | (1 << 6) | (1 << 5),
    );
    const TIMER0: Descriptor = Descriptor::clock_only(PeripheralId::Timer0, Bit::new(PRR, 5));
    const AC: Descriptor = Descriptor::ungated(PeripheralId::AnalogComparator, ACSR, 1 << 7, 1 << 3);

    #[test]
    fn on_then_off() {
        let bank = SimulatedBank::new();
        for descriptor in [ADC, SERIAL0, TIMER0, AC] {
            let peripheral = Peripheral::new(&bank, descriptor);
            peripheral.power_on();
            assert!(peripheral.is_on(), "{:?} should be on", descriptor.id);
            peripheral.power_off();
            assert!(!peripheral.is_on(), "{:?} should be off", descriptor.id);
        }
    }

    #[test]
    fn power_on_is_idempotent() {
        let bank = SimulatedBank::new();
        let adc = Peripheral::new(&bank, ADC);
        adc.power_on();
        let once = (bank.peek(PRR), bank.peek(ADCSRA));
        adc.power_on();
        assert_eq!((bank.peek(PRR), bank.peek(ADCSRA)), once);
        assert!(adc.is_on());
    }

    #[test]
    fn power_off_is_idempotent() {
        let bank = SimulatedBank::new();
        let serial = Peripheral::new(&bank, SERIAL0);
        serial.power_off();
        let once = (bank.peek(PRR), bank.peek(UCSR0B));
        serial.power_off();
        assert_eq!((bank.peek(PRR), bank.peek(UCSR0B)), once);
        assert!(!serial.is_on());
    }

    #[test]
    fn power_off_disables_before_gating() {
        let bank = SimulatedBank::new();
        bank.poke(ADCSRA, 0b1000_1111);
        Peripheral::new(&bank, ADC).power_off();

        let journal = bank.journal();
        let control = journal.iter().position(|w| w.register == ADCSRA);
        let gate = journal.iter().position(|w| w.register == PRR);
        assert!(control.is_some() && gate.is_some());
        assert!(control < gate);

        // Prescaler select bits survive, enable and interrupt enable don't.
        assert_eq!(bank.peek(ADCSRA), 0b0000_0111);
        assert_eq!(bank.peek(PRR), 0b0000_0001);
    }

    #[test]
    fn power_on_ungates_before_enabling() {
        let bank = SimulatedBank::new();
        bank.poke(PRR, 0xFF);
        Peripheral::new(&bank, SERIAL0).power_on();

        let journal = bank.journal();
        let gate = journal.iter().position(|w| w.register == PRR);
        let control = journal.iter().position(|w| w.register == UCSR0B);
        assert!(gate.is_some() && control.is_some());
        assert!(gate < control);

        assert_eq!(bank.peek(PRR), 0xFD);
        // Both directions come on together, interrupts stay off.
        assert_eq!(bank.peek(UCSR0B), 0b0001_1000);
    }

    #[test]
    fn serial_needs_both_directions() {
        let bank = SimulatedBank::new();
        let serial = Peripheral::new(&bank, SERIAL0);
        bank.poke(UCSR0B, 1 << 3);
        assert!(!serial.is_on());
        bank.poke(UCSR0B, (1 << 3) | (1 << 4));
        assert!(serial.is_on());
    }

    #[test]
    fn gated_clock_means_off() {
        let bank = SimulatedBank::new();
        let adc = Peripheral::new(&bank, ADC);
        adc.power_on();
        bank.poke(PRR, 0x01);
        assert!(!adc.is_on());
        // Other peripherals' gates don't matter.
        bank.poke(PRR, 0xFE);
        assert!(adc.is_on());
    }

    #[test]
    fn comparator_masks_interrupt_first() {
        let bank = SimulatedBank::new();
        bank.poke(ACSR, 1 << 3);
        let ac = Peripheral::new(&bank, AC);
        assert!(ac.is_on());
        ac.power_off();

        assert_eq!(bank.writes_to(ACSR), vec![0, 1 << 7]);
        assert!(!ac.is_on());
        assert!(bank.writes_to(PRR).is_empty());

        ac.power_on();
        assert!(ac.is_on());
        assert_eq!(bank.peek(ACSR), 0);
    }

    #[test]
    fn timers_only_touch_their_gate() {
        let bank = SimulatedBank::new();
        let timer = Peripheral::new(&bank, TIMER0);
        timer.power_off();
        assert_eq!(bank.peek(PRR), 1 << 5);
        assert!(!timer.is_on());
        timer.power_on();
        assert_eq!(bank.peek(PRR), 0);
        assert!(timer.is_on());
        assert!(bank.journal().iter().all(|w| w.register == PRR));
    }
}
