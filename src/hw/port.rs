//! Bit-banged two-wire port for the bank expander.
//!
//! The expander hangs off its own slow two-wire link, driven
//! open-drain from two GPIOs (drive low, release high against the
//! pull-ups). Each [`BankBus`] phase completes synchronously unless a
//! slave stretches the clock past the stretch budget; the port then
//! reports the phase as not-done and the driver gives up with a
//! `BusTimeout`.

use embassy_nrf::gpio::{Flex, OutputDrive, Pull};
use embassy_time::{block_for, Duration};

use crate::bank::driver::BankBus;

/// Half a clock period (~100 kHz).
const HALF_PERIOD_US: u64 = 5;

/// How long a slave may stretch the clock before the phase is
/// declared stuck.
const STRETCH_SPINS: u32 = 1_000;

pub struct TwoWirePort {
    scl: Flex<'static>,
    sda: Flex<'static>,
    data: u8,
    done: bool,
}

impl TwoWirePort {
    pub fn new(mut scl: Flex<'static>, mut sda: Flex<'static>) -> Self {
        scl.set_as_input(Pull::Up);
        sda.set_as_input(Pull::Up);
        Self {
            scl,
            sda,
            data: 0,
            done: true,
        }
    }

    fn pause() {
        block_for(Duration::from_micros(HALF_PERIOD_US));
    }

    /// Release SCL and wait for it to actually rise, honouring clock
    /// stretching within the budget.
    fn scl_high(&mut self) -> bool {
        self.scl.set_as_input(Pull::Up);
        for _ in 0..STRETCH_SPINS {
            if self.scl.is_high() {
                return true;
            }
        }
        false
    }

    fn scl_low(&mut self) {
        self.scl.set_as_output(OutputDrive::Standard);
        self.scl.set_low();
    }

    fn sda_set(&mut self, high: bool) {
        if high {
            self.sda.set_as_input(Pull::Up);
        } else {
            self.sda.set_as_output(OutputDrive::Standard);
            self.sda.set_low();
        }
    }

    fn clock_out_bit(&mut self, bit: bool) -> bool {
        self.sda_set(bit);
        Self::pause();
        let ok = self.scl_high();
        Self::pause();
        self.scl_low();
        ok
    }

    fn clock_in_bit(&mut self) -> Option<bool> {
        self.sda_set(true);
        Self::pause();
        if !self.scl_high() {
            return None;
        }
        let bit = self.sda.is_high();
        Self::pause();
        self.scl_low();
        Some(bit)
    }
}

impl BankBus for TwoWirePort {
    fn start(&mut self) {
        // SDA falls while SCL is high (also covers repeated START).
        self.sda_set(true);
        let ok = self.scl_high();
        Self::pause();
        self.sda_set(false);
        Self::pause();
        self.scl_low();
        self.done = ok;
    }

    fn write_byte(&mut self, byte: u8) {
        let mut ok = true;
        for i in (0..8).rev() {
            ok &= self.clock_out_bit(byte & (1 << i) != 0);
        }
        // Clock the slave's acknowledge bit through.
        ok &= self.clock_in_bit().is_some();
        self.done = ok;
    }

    fn read_byte(&mut self, ack: bool) {
        let mut value = 0u8;
        let mut ok = true;
        for _ in 0..8 {
            match self.clock_in_bit() {
                Some(bit) => value = (value << 1) | bit as u8,
                None => ok = false,
            }
        }
        // ACK asks for more; NAK ends the read.
        ok &= self.clock_out_bit(!ack);
        self.data = value;
        self.done = ok;
    }

    fn stop(&mut self) {
        // SDA rises while SCL is high.
        self.sda_set(false);
        Self::pause();
        let ok = self.scl_high();
        Self::pause();
        self.sda_set(true);
        Self::pause();
        self.done = ok;
    }

    fn phase_done(&mut self) -> bool {
        self.done
    }

    fn data(&self) -> u8 {
        self.data
    }
}
