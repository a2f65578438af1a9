#![no_main]
#![no_std]
#![feature(asm_experimental_arch)]

extern crate avr_active_power;
use avr_active_power::*;

fn sleep() -> ! {
    loop {
        unsafe {
            core::arch::asm!("sleep");
        }
    }
}

#[no_mangle]
pub extern "C" fn main() {
    let mut chip = match ActivePower::<Target, Mmio>::take() {
        Some(chip) => chip,
        None => sleep(),
    };

    // Everything off, then bring back timer 0 for millis() and delay()
    chip.power_off();
    chip.timer0().power_on();

    chip.system_clock().divide_by_16();

    unsafe {
        core::arch::asm!("sei");
    }
    sleep();
}

#[panic_handler]
fn bootup_panic(_: &core::panic::PanicInfo) -> ! {
    sleep();
}
