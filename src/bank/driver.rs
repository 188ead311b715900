//! Bank expander bus protocol.
//!
//! The LED/button expander sits at a fixed address on a two-wire bus
//! and is driven with a blocking request/response protocol: select a
//! register, then stream data bytes; reads switch direction with a
//! repeated START. Every phase completes when the controller's phase
//! flag asserts. A wedged bus must not stall the 20 ms poll loop, so
//! the driver bounds every completion wait and abandons the
//! transaction with [`Error::BusTimeout`] instead of spinning forever.

use crate::config::{
    BANK_ADDR_READ, BANK_ADDR_WRITE, BUS_PHASE_SPIN_LIMIT, REG_DUTY_A, REG_DUTY_B, REG_INPUT,
    REG_OUTPUT,
};
use crate::error::Error;

/// Register-level contract for the two-wire controller wired to the
/// bank expander.
///
/// One method per bus phase. Implementations only touch hardware (or a
/// test double); sequencing, completion polling and the timeout policy
/// all live in [`BankDriver`].
pub trait BankBus {
    /// Initiate a START (or repeated START) condition.
    fn start(&mut self);

    /// Initiate transmission of one byte (address or data).
    fn write_byte(&mut self, byte: u8);

    /// Initiate reception of one byte; `ack` selects ACK vs NAK.
    fn read_byte(&mut self, ack: bool);

    /// Initiate a STOP condition.
    fn stop(&mut self);

    /// True once the phase in flight has completed.
    fn phase_done(&mut self) -> bool;

    /// Byte captured by the most recent completed read phase.
    fn data(&self) -> u8;
}

/// Blocking protocol driver for the bank expander.
pub struct BankDriver<B> {
    bus: B,
}

impl<B: BankBus> BankDriver<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    fn wait_phase(&mut self) -> Result<(), Error> {
        for _ in 0..BUS_PHASE_SPIN_LIMIT {
            if self.bus.phase_done() {
                return Ok(());
            }
        }
        Err(Error::BusTimeout)
    }

    fn begin(&mut self) -> Result<(), Error> {
        self.bus.start();
        self.wait_phase()
    }

    fn send(&mut self, byte: u8) -> Result<(), Error> {
        self.bus.write_byte(byte);
        self.wait_phase()
    }

    fn recv(&mut self, ack: bool) -> Result<u8, Error> {
        self.bus.read_byte(ack);
        self.wait_phase()?;
        Ok(self.bus.data())
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.bus.stop();
        self.wait_phase()
    }

    /// Read the momentary button bits.
    ///
    /// The inputs are active-low, so the snapshot is inverted and
    /// masked down to the four button positions.
    pub fn read_buttons(&mut self) -> Result<u8, Error> {
        self.begin()?;
        self.send(BANK_ADDR_WRITE)?;
        self.send(REG_INPUT)?;
        self.begin()?; // repeated START to turn the bus around
        self.send(BANK_ADDR_READ)?;
        let raw = self.recv(false)?;
        self.finish()?;
        Ok((raw ^ 0x0F) & 0x0F)
    }

    /// Write the packed zone byte to the output register, round-trip
    /// to completion.
    pub fn write_state(&mut self, state: u8) -> Result<(), Error> {
        self.begin()?;
        self.send(BANK_ADDR_WRITE)?;
        self.send(REG_OUTPUT)?;
        self.send(state)?;
        self.finish()
    }

    /// Program both PWM duty registers. Called once at start-up.
    pub fn set_duty(&mut self, duty_a: u8, duty_b: u8) -> Result<(), Error> {
        self.begin()?;
        self.send(BANK_ADDR_WRITE)?;
        self.send(REG_DUTY_A)?;
        self.send(duty_a)?;
        self.begin()?;
        self.send(BANK_ADDR_WRITE)?;
        self.send(REG_DUTY_B)?;
        self.send(duty_b)?;
        self.finish()
    }
}
