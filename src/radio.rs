//! Configuration sequencing
//!
//! [`Radio`] drives a [`Device`] from power-up to a configured radio and gates
//! strobes on how far it has got:
//!
//! ```text
//! Uninitialized --reset--> Resetting --await_ready--> Configuring
//!     --configure--> Ready --start_rx/start_tx--> Rx | Tx --idle--> Idle
//! ```
//!
//! Idle behaves like Ready. The sequencer tracks the state it commanded, not
//! the chip's live state: a finished transmission may return the chip to IDLE
//! on its own depending on MCSM1. Use [`Radio::marc_state`] to see the chip's
//! view.
//!
//! # Important Notes
//! - Every strobe is rejected before [`Radio::reset`] has been called
//! - SRX/STX are rejected until every configuration register is written
//! - Oscillator start-up time after SRES is bounded by the configured
//!   [`Deadline`], never assumed
//! - A failed step leaves the state where it was; recover with `reset`

use crate::commands::{StatusByte, Strobe};
use crate::device::{Deadline, Device};
use crate::errors::Error;
use crate::registers::{MarcState, PaTable, RadioState, RegisterMap, TestSettings};

/// Sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Nothing sent yet
    Uninitialized,
    /// SRES sent, waiting for the chip to report ready
    Resetting,
    /// Chip ready, registers not yet written
    Configuring,
    /// Fully configured
    Ready,
    /// SRX sent
    Rx,
    /// STX sent
    Tx,
    /// SIDLE sent after RX or TX
    Idle,
}

impl State {
    /// Whether configuration has completed
    pub const fn is_configured(self) -> bool {
        matches!(self, State::Ready | State::Rx | State::Tx | State::Idle)
    }
}

/// Everything written during configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfig {
    /// Configuration register values
    pub registers: RegisterMap,
    /// Test register values, written after `registers` when set
    pub test_settings: Option<TestSettings>,
    /// Power table, written after the registers
    pub pa_table: PaTable,
    /// Read every written register back and compare
    pub verify: bool,
    /// How long to wait for the chip after SRES
    pub ready_deadline: Deadline,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            registers: RegisterMap::DEFAULT,
            test_settings: None,
            pa_table: PaTable::DEFAULT,
            verify: true,
            ready_deadline: Deadline::default(),
        }
    }
}

/// Configuration sequencer for the CC1100
pub struct Radio<SPI> {
    device: Device<SPI>,
    state: State,
}

impl<SPI> Radio<SPI> {
    /// Creates an uninitialized radio on `spi`.
    pub fn new(spi: SPI) -> Self {
        Self::from_device(Device::new(spi))
    }

    /// Wraps an existing device. The chip is assumed to be in an unknown state.
    pub fn from_device(device: Device<SPI>) -> Self {
        Self {
            device,
            state: State::Uninitialized,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn device(&self) -> &Device<SPI> {
        &self.device
    }

    /// Raw access to the command interface.
    ///
    /// Strobes issued here bypass the sequencer and are not reflected in
    /// [`state`](Radio::state).
    pub fn device_mut(&mut self) -> &mut Device<SPI> {
        &mut self.device
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.device.release()
    }

    fn transition(&mut self, next: State) {
        if self.state != next {
            debug!("radio {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn require(&self, expected: State) -> Result<(), Error> {
        if self.state != expected {
            return Err(Error::NotConfigured);
        }
        Ok(())
    }

    fn require_configured(&self) -> Result<(), Error> {
        if !self.state.is_configured() {
            return Err(Error::NotConfigured);
        }
        Ok(())
    }
}

impl<SPI> Radio<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Sends SRES. Allowed from any state.
    ///
    /// The chip holds CHIP_RDYn high until its crystal is stable; follow with
    /// [`await_ready`](Radio::await_ready) before anything else.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed; the radio is left
    ///   uninitialized
    pub fn reset(&mut self) -> Result<StatusByte, Error> {
        match self.device.strobe(Strobe::Sres) {
            Ok(status) => {
                self.transition(State::Resetting);
                Ok(status)
            }
            Err(e) => {
                self.transition(State::Uninitialized);
                Err(e)
            }
        }
    }

    /// Waits for the chip to answer `SNOP` with CHIP_RDYn low after a reset.
    ///
    /// # Errors
    /// * `Error::NotConfigured` - no reset is pending
    /// * `Error::BusTimeout` - the chip did not become ready within `deadline`
    /// * `Error::Bus` - SPI communication failed
    pub fn await_ready<D>(&mut self, delay: &mut D, deadline: Deadline) -> Result<StatusByte, Error>
    where
        D: embedded_hal::delay::DelayNs,
    {
        self.require(State::Resetting)?;
        let status = self.device.wait_ready(delay, deadline)?;
        self.transition(State::Configuring);
        Ok(status)
    }

    /// Writes the configuration and power table, optionally verifying them.
    ///
    /// Registers are written one by one in ascending address order, then the
    /// test registers if set, then the PATABLE as a single burst.
    ///
    /// # Errors
    /// * `Error::NotConfigured` - the chip has not been reset and found ready
    /// * `Error::ConfigurationVerificationFailed` - a register read back a
    ///   different value; the radio stays in `Configuring`
    /// * `Error::Bus` - SPI communication failed
    pub fn configure(&mut self, config: &RadioConfig) -> Result<(), Error> {
        self.require(State::Configuring)?;

        for (register, value) in config.registers.iter() {
            self.device.write_register(register, value)?;
        }
        if let Some(test_settings) = &config.test_settings {
            for (register, value) in test_settings.entries() {
                self.device.write_register(register, value)?;
            }
        }
        self.device.write_pa_table(&config.pa_table)?;

        if config.verify {
            self.verify(config)?;
        }

        self.transition(State::Ready);
        Ok(())
    }

    /// Reads back every register `config` writes and compares.
    ///
    /// # Errors
    /// * `Error::ConfigurationVerificationFailed` - names the first mismatch
    /// * `Error::Bus` - SPI communication failed
    pub fn verify(&mut self, config: &RadioConfig) -> Result<(), Error> {
        let test_entries = config.test_settings.as_ref().map(TestSettings::entries);
        let expected = config
            .registers
            .iter()
            .chain(test_entries.into_iter().flatten());

        for (register, expected) in expected {
            let actual = self.device.read_register(register)?;
            if actual != expected {
                warn!(
                    "{:?} read back {:#x}, expected {:#x}",
                    register,
                    actual,
                    expected
                );
                return Err(Error::ConfigurationVerificationFailed {
                    register,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Resets, waits for the chip and configures it.
    ///
    /// # Errors
    /// Any error of [`reset`](Radio::reset), [`await_ready`](Radio::await_ready)
    /// or [`configure`](Radio::configure).
    pub fn initialize<D>(&mut self, delay: &mut D, config: &RadioConfig) -> Result<(), Error>
    where
        D: embedded_hal::delay::DelayNs,
    {
        self.reset()?;
        self.await_ready(delay, config.ready_deadline)?;
        self.configure(config)
    }

    /// Issues a strobe, subject to the sequencer state.
    ///
    /// SRES behaves like [`reset`](Radio::reset) once the radio has been reset
    /// at least once.
    ///
    /// # Errors
    /// * `Error::NotConfigured` - the radio is uninitialized, or SRX/STX before
    ///   configuration completed; nothing was sent
    /// * `Error::Bus` - SPI communication failed
    pub fn strobe(&mut self, strobe: Strobe) -> Result<StatusByte, Error> {
        if self.state == State::Uninitialized {
            warn!("rejected {:?} before reset", strobe);
            return Err(Error::NotConfigured);
        }
        if matches!(strobe, Strobe::Srx | Strobe::Stx) {
            self.require_configured()?;
        }
        if strobe == Strobe::Sres {
            return self.reset();
        }

        let status = self.device.strobe(strobe)?;
        if self.state.is_configured() {
            match strobe {
                Strobe::Srx => self.transition(State::Rx),
                Strobe::Stx => self.transition(State::Tx),
                Strobe::Sidle => self.transition(State::Idle),
                _ => {}
            }
        }
        Ok(status)
    }

    /// Enters RX.
    pub fn start_rx(&mut self) -> Result<StatusByte, Error> {
        self.strobe(Strobe::Srx)
    }

    /// Enters TX, sending whatever is queued in the TX FIFO.
    pub fn start_tx(&mut self) -> Result<StatusByte, Error> {
        self.strobe(Strobe::Stx)
    }

    /// Leaves RX/TX for IDLE.
    pub fn idle(&mut self) -> Result<StatusByte, Error> {
        self.strobe(Strobe::Sidle)
    }

    /// Calibrates the frequency synthesizer. The chip must be idle.
    pub fn calibrate(&mut self) -> Result<StatusByte, Error> {
        self.require_configured()?;
        self.strobe(Strobe::Scal)
    }

    /// Discards the RX FIFO. The chip must be idle or overflowed.
    pub fn flush_rx(&mut self) -> Result<StatusByte, Error> {
        self.require_configured()?;
        self.strobe(Strobe::Sfrx)
    }

    /// Discards the TX FIFO. The chip must be idle or underflowed.
    pub fn flush_tx(&mut self) -> Result<StatusByte, Error> {
        self.require_configured()?;
        self.strobe(Strobe::Sftx)
    }

    /// Reads the chip's own state machine state.
    ///
    /// # Errors
    /// * `Error::Deserialization` - MARCSTATE held an undocumented value
    /// * `Error::Bus` - SPI communication failed
    pub fn marc_state(&mut self) -> Result<MarcState, Error> {
        Ok(self.device.read_status::<RadioState>()?.state)
    }
}
