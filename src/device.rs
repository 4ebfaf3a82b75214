//! CC1100 Device Interface
//!
//! This module provides the command interface for the CC1100 over SPI. It
//! supports both synchronous and asynchronous operation.
//!
//! The interface is built around the `Device<SPI>` struct which wraps an SPI
//! device and provides methods for:
//! - Reading and writing configuration registers, singly or in bursts
//! - Reading status registers
//! - Issuing command strobes
//! - Filling the TX FIFO and draining the RX FIFO
//! - Loading the PATABLE
//!
//! Every method runs exactly one bus transaction unless documented otherwise,
//! and records the status byte the chip returned with it.
//!
//! All methods take `&mut self`, so transactions on one chip can never
//! interleave. Share a `Device` between tasks behind a mutex.
//!
//! # Example
//! ```no_run
//! use cc1100::{Device, Register, Strobe, Error};
//! use embedded_hal::spi::SpiDevice;
//!
//! fn tune<SPI: SpiDevice>(spi: SPI) -> Result<u8, Error> {
//!     let mut device = Device::new(spi);
//!     device.strobe(Strobe::Sidle)?;
//!     device.write_register(Register::Channr, 0x05)?;
//!     device.read_register(Register::Channr)
//! }
//! ```

use regiface::{ByteArray, ReadableRegister};

use crate::commands::{StatusByte, Strobe, BYTES_IN_FIFO};
use crate::errors::Error;
use crate::registers::{
    Address, PaTable, Register, StatusRegister, FIFO_ADDRESS, FIFO_LEN, PA_TABLE_LEN,
};
use crate::transaction::{AccessMode, CommandByte, Payload, Transaction};

/// Upper bound on how long to wait for the chip to report ready.
///
/// The chip is polled with `SNOP` up to `polls` times, `interval_us` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline {
    pub polls: u32,
    pub interval_us: u32,
}

impl Deadline {
    pub const fn new(polls: u32, interval_us: u32) -> Self {
        Self { polls, interval_us }
    }
}

impl Default for Deadline {
    /// 100 polls 10 µs apart, well beyond the crystal start-up time
    fn default() -> Self {
        Self::new(100, 10)
    }
}

/// What the driver knows about one FIFO's fill level.
#[derive(Debug, Clone, Copy, Default)]
struct FifoCount {
    /// Last count reported by the chip, adjusted for bytes the driver moved
    /// since
    bytes: Option<u8>,
    /// No transaction has happened since the chip reported `bytes`
    fresh: bool,
}

impl FifoCount {
    fn report(&mut self, bytes: u8) {
        self.bytes = Some(bytes);
        self.fresh = true;
    }

    fn forget(&mut self) {
        *self = Self::default();
    }
}

/// Main device interface for the CC1100 radio.
///
/// This struct wraps an SPI device and provides methods to interact with the
/// radio. It supports both synchronous operations through the embedded-hal
/// traits and asynchronous operations through embedded-hal-async.
pub struct Device<SPI> {
    spi: SPI,
    last_status: Option<StatusByte>,
    /// Lower bound on the RX FIFO fill level, the radio only adds bytes
    rx: FifoCount,
    /// Upper bound on the TX FIFO fill level, the radio only removes bytes
    tx: FifoCount,
}

impl<SPI> Device<SPI> {
    /// Creates a new Device instance wrapping the provided SPI device.
    ///
    /// # Arguments
    /// * `spi` - An SPI device implementing the required embedded-hal traits
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            last_status: None,
            rx: FifoCount::default(),
            tx: FifoCount::default(),
        }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }

    /// Status byte returned by the most recent transaction
    pub fn last_status(&self) -> Option<StatusByte> {
        self.last_status
    }

    /// RX FIFO byte count last reported by the chip, less bytes drained since.
    ///
    /// The chip may have received more in the meantime.
    pub fn known_rx_bytes(&self) -> Option<u8> {
        self.rx.bytes
    }

    /// TX FIFO byte count last reported by the chip, plus bytes queued since.
    ///
    /// The chip may have sent some of them in the meantime.
    pub fn known_tx_bytes(&self) -> Option<u8> {
        self.tx.bytes
    }

    fn record(&mut self, command: CommandByte, status: StatusByte) {
        self.last_status = Some(status);
        self.rx.fresh = false;
        self.tx.fresh = false;

        // Raw FIFO accesses move bytes the counts cannot see
        if command.address() == FIFO_ADDRESS {
            if command.mode().is_read() {
                self.rx.forget();
            } else {
                self.tx.forget();
            }
            return;
        }
        if !command.is_strobe() {
            return;
        }
        if let Ok(strobe) = Strobe::try_from(command.address()) {
            if !strobe.preserves_rx_fifo() {
                self.rx.forget();
            }
            if !strobe.preserves_tx_fifo() {
                self.tx.forget();
            }
        }
    }

    fn record_status_register(&mut self, address: u8, value: u8) {
        if address == StatusRegister::Rxbytes.address() {
            self.rx.report(value & BYTES_IN_FIFO);
        } else if address == StatusRegister::Txbytes.address() {
            self.tx.report(value & BYTES_IN_FIFO);
        }
    }

    /// Bytes known to be readable, if they cover `requested`.
    ///
    /// `Ok(None)` means the chip has to be asked again.
    fn known_rx_window(&self, requested: usize) -> Result<Option<u8>, Error> {
        check_known(requested, self.rx.bytes, self.rx.fresh)
    }

    /// Free TX FIFO space known to be writable, if it covers `requested`.
    fn known_tx_window(&self, requested: usize) -> Result<Option<u8>, Error> {
        check_known(requested, self.tx.bytes.map(tx_room), self.tx.fresh)
    }
}

fn tx_room(queued: u8) -> u8 {
    FIFO_LEN.saturating_sub(queued)
}

fn check_known(requested: usize, known: Option<u8>, fresh: bool) -> Result<Option<u8>, Error> {
    match known {
        Some(available) if requested <= available as usize => Ok(Some(available)),
        // Just reported by the chip, asking again would not change the answer
        Some(available) if fresh => check_fifo_request(requested, available).map(|()| None),
        _ => Ok(None),
    }
}

fn check_fifo_request(requested: usize, available: u8) -> Result<(), Error> {
    if requested > available as usize {
        debug!("FIFO has {} bytes, {} requested", available, requested);
        return Err(Error::InsufficientData {
            requested,
            available,
        });
    }
    Ok(())
}

fn check_burst(address: Address, len: usize) -> Result<(), Error> {
    match address.max_burst() {
        Some(max) if len > max => Err(Error::InvalidAccessMode),
        _ => Ok(()),
    }
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Runs a single raw transaction.
    ///
    /// # Errors
    /// * `Error::InvalidAccessMode` - header flags disagree with the payload;
    ///   nothing was sent
    /// * `Error::Bus` - SPI communication failed
    pub fn transact(
        &mut self,
        command: CommandByte,
        payload: Payload<'_>,
    ) -> Result<StatusByte, Error> {
        let status = Transaction::new(command, payload)?.execute(&mut self.spi)?;
        self.record(command, status);
        Ok(status)
    }

    /// Writes a single configuration register.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn write_register(&mut self, register: Register, value: u8) -> Result<StatusByte, Error> {
        self.transact(
            CommandByte::encode(register.address(), AccessMode::WriteSingle),
            Payload::Write(&[value]),
        )
    }

    /// Reads a single configuration register.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn read_register(&mut self, register: Register) -> Result<u8, Error> {
        let mut value = [0u8];
        self.transact(
            CommandByte::encode(register.address(), AccessMode::ReadSingle),
            Payload::Read(&mut value),
        )?;
        Ok(value[0])
    }

    /// Writes consecutive bytes starting at `address`.
    ///
    /// Configuration bursts auto-increment through the register space, PATABLE
    /// bursts through its slots, and FIFO bursts queue bytes for transmission.
    ///
    /// # Errors
    /// * `Error::InvalidAccessMode` - `values` is empty or runs past the end of
    ///   the addressed space
    /// * `Error::InsufficientData` - not enough free space in the TX FIFO
    /// * `Error::Bus` - SPI communication failed
    pub fn write_burst(
        &mut self,
        address: impl Into<Address>,
        values: &[u8],
    ) -> Result<StatusByte, Error> {
        let address = address.into();
        if address == Address::Fifo {
            return self.write_tx_fifo(values);
        }
        check_burst(address, values.len())?;
        self.transact(
            CommandByte::encode(address.bits(), AccessMode::WriteBurst),
            Payload::Write(values),
        )
    }

    /// Reads consecutive bytes starting at `address` into `values`.
    ///
    /// Reading [`Address::Fifo`] drains the RX FIFO, see
    /// [`read_rx_fifo`](Device::read_rx_fifo).
    ///
    /// # Errors
    /// * `Error::InvalidAccessMode` - `values` is empty or runs past the end of
    ///   the addressed space
    /// * `Error::InsufficientData` - more FIFO bytes requested than available
    /// * `Error::Bus` - SPI communication failed
    pub fn read_burst(
        &mut self,
        address: impl Into<Address>,
        values: &mut [u8],
    ) -> Result<StatusByte, Error> {
        let address = address.into();
        if address == Address::Fifo {
            return self.read_rx_fifo(values);
        }
        check_burst(address, values.len())?;
        self.transact(
            CommandByte::encode(address.bits(), AccessMode::ReadBurst),
            Payload::Read(values),
        )
    }

    /// Issues a command strobe and returns the chip's status byte.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn strobe(&mut self, strobe: Strobe) -> Result<StatusByte, Error> {
        debug!("strobe {:?}", strobe);
        self.transact(
            CommandByte::encode(strobe.opcode(), AccessMode::WriteSingle),
            Payload::None,
        )
    }

    /// Reads a status register.
    ///
    /// # Type Parameters
    /// * `R` - Status register type implementing ReadableRegister with u8 ID
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    /// * `Error::Deserialization` - Failed to parse register value
    pub fn read_status<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();
        self.transact(
            CommandByte::encode(R::id(), AccessMode::ReadBurst),
            Payload::Read(raw_value.as_mut()),
        )?;
        if let Some(&value) = raw_value.as_mut().first() {
            self.record_status_register(R::id(), value);
        }

        R::from_bytes(raw_value).map_err(|_| Error::Deserialization)
    }

    /// Reads the raw value of a status register.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn read_status_register(&mut self, register: StatusRegister) -> Result<u8, Error> {
        let mut value = [0u8];
        self.transact(
            CommandByte::encode(register.address(), AccessMode::ReadBurst),
            Payload::Read(&mut value),
        )?;
        self.record_status_register(register.address(), value[0]);
        Ok(value[0])
    }

    /// Queues bytes in the TX FIFO.
    ///
    /// `TXBYTES` is read first whenever the free space already known does not
    /// cover `bytes`, costing one extra transaction.
    ///
    /// # Errors
    /// * `Error::InvalidAccessMode` - `bytes` is empty
    /// * `Error::InsufficientData` - the TX FIFO has less free space than
    ///   `bytes` needs; nothing was queued
    /// * `Error::Bus` - SPI communication failed
    pub fn write_tx_fifo(&mut self, bytes: &[u8]) -> Result<StatusByte, Error> {
        if bytes.is_empty() {
            return Err(Error::InvalidAccessMode);
        }
        let room = match self.known_tx_window(bytes.len())? {
            Some(room) => room,
            None => {
                let queued = self.read_status_register(StatusRegister::Txbytes)? & BYTES_IN_FIFO;
                let room = tx_room(queued);
                check_fifo_request(bytes.len(), room)?;
                room
            }
        };

        let status = self.transact(
            CommandByte::encode(Address::Fifo.bits(), AccessMode::WriteBurst),
            Payload::Write(bytes),
        )?;
        self.tx.bytes = Some(FIFO_LEN - room + bytes.len() as u8);
        Ok(status)
    }

    /// Fills `bytes` from the RX FIFO.
    ///
    /// `RXBYTES` is read first whenever the byte count already known does not
    /// cover `bytes`, costing one extra transaction. A count the chip reported
    /// in the immediately preceding transaction is trusted as is.
    ///
    /// # Errors
    /// * `Error::InvalidAccessMode` - `bytes` is empty
    /// * `Error::InsufficientData` - the FIFO holds fewer bytes than requested;
    ///   the FIFO itself was not touched
    /// * `Error::Bus` - SPI communication failed
    pub fn read_rx_fifo(&mut self, bytes: &mut [u8]) -> Result<StatusByte, Error> {
        if bytes.is_empty() {
            return Err(Error::InvalidAccessMode);
        }
        let available = match self.known_rx_window(bytes.len())? {
            Some(available) => available,
            None => {
                let available =
                    self.read_status_register(StatusRegister::Rxbytes)? & BYTES_IN_FIFO;
                check_fifo_request(bytes.len(), available)?;
                available
            }
        };

        let len = bytes.len() as u8;
        let status = self.transact(
            CommandByte::encode(Address::Fifo.bits(), AccessMode::ReadBurst),
            Payload::Read(bytes),
        )?;
        self.rx.bytes = Some(available - len);
        Ok(status)
    }

    /// Loads all eight PATABLE slots.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn write_pa_table(&mut self, table: &PaTable) -> Result<StatusByte, Error> {
        self.write_burst(Address::PaTable, table.as_bytes())
    }

    /// Reads back all eight PATABLE slots.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn read_pa_table(&mut self) -> Result<PaTable, Error> {
        let mut levels = [0u8; PA_TABLE_LEN];
        self.read_burst(Address::PaTable, &mut levels)?;
        Ok(PaTable::new(levels))
    }

    /// Polls with `SNOP` until the chip reports ready.
    ///
    /// # Errors
    /// * `Error::BusTimeout` - CHIP_RDYn stayed high for the whole deadline
    /// * `Error::Bus` - SPI communication failed
    pub fn wait_ready<D>(&mut self, delay: &mut D, deadline: Deadline) -> Result<StatusByte, Error>
    where
        D: embedded_hal::delay::DelayNs,
    {
        for _ in 0..deadline.polls {
            let status = self.strobe(Strobe::Snop)?;
            if status.chip_ready() {
                return Ok(status);
            }
            delay.delay_us(deadline.interval_us);
        }

        warn!("chip not ready after {} polls", deadline.polls);
        Err(Error::BusTimeout)
    }
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal_async::spi::SpiDevice,
{
    /// Asynchronously runs a single raw transaction.
    ///
    /// This is the async version of [`transact`](Device::transact).
    pub async fn transact_async(
        &mut self,
        command: CommandByte,
        payload: Payload<'_>,
    ) -> Result<StatusByte, Error> {
        let status = Transaction::new(command, payload)?
            .execute_async(&mut self.spi)
            .await?;
        self.record(command, status);
        Ok(status)
    }

    /// Asynchronously writes a single configuration register.
    ///
    /// This is the async version of [`write_register`](Device::write_register).
    pub async fn write_register_async(
        &mut self,
        register: Register,
        value: u8,
    ) -> Result<StatusByte, Error> {
        self.transact_async(
            CommandByte::encode(register.address(), AccessMode::WriteSingle),
            Payload::Write(&[value]),
        )
        .await
    }

    /// Asynchronously reads a single configuration register.
    ///
    /// This is the async version of [`read_register`](Device::read_register).
    pub async fn read_register_async(&mut self, register: Register) -> Result<u8, Error> {
        let mut value = [0u8];
        self.transact_async(
            CommandByte::encode(register.address(), AccessMode::ReadSingle),
            Payload::Read(&mut value),
        )
        .await?;
        Ok(value[0])
    }

    /// Asynchronously writes consecutive bytes starting at `address`.
    ///
    /// This is the async version of [`write_burst`](Device::write_burst).
    pub async fn write_burst_async(
        &mut self,
        address: impl Into<Address>,
        values: &[u8],
    ) -> Result<StatusByte, Error> {
        let address = address.into();
        if address == Address::Fifo {
            return self.write_tx_fifo_async(values).await;
        }
        check_burst(address, values.len())?;
        self.transact_async(
            CommandByte::encode(address.bits(), AccessMode::WriteBurst),
            Payload::Write(values),
        )
        .await
    }

    /// Asynchronously reads consecutive bytes starting at `address`.
    ///
    /// This is the async version of [`read_burst`](Device::read_burst).
    pub async fn read_burst_async(
        &mut self,
        address: impl Into<Address>,
        values: &mut [u8],
    ) -> Result<StatusByte, Error> {
        let address = address.into();
        if address == Address::Fifo {
            return self.read_rx_fifo_async(values).await;
        }
        check_burst(address, values.len())?;
        self.transact_async(
            CommandByte::encode(address.bits(), AccessMode::ReadBurst),
            Payload::Read(values),
        )
        .await
    }

    /// Asynchronously issues a command strobe.
    ///
    /// This is the async version of [`strobe`](Device::strobe).
    pub async fn strobe_async(&mut self, strobe: Strobe) -> Result<StatusByte, Error> {
        debug!("strobe {:?}", strobe);
        self.transact_async(
            CommandByte::encode(strobe.opcode(), AccessMode::WriteSingle),
            Payload::None,
        )
        .await
    }

    /// Asynchronously reads a status register.
    ///
    /// This is the async version of [`read_status`](Device::read_status).
    pub async fn read_status_async<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();
        self.transact_async(
            CommandByte::encode(R::id(), AccessMode::ReadBurst),
            Payload::Read(raw_value.as_mut()),
        )
        .await?;
        if let Some(&value) = raw_value.as_mut().first() {
            self.record_status_register(R::id(), value);
        }

        R::from_bytes(raw_value).map_err(|_| Error::Deserialization)
    }

    /// Asynchronously reads the raw value of a status register.
    ///
    /// This is the async version of
    /// [`read_status_register`](Device::read_status_register).
    pub async fn read_status_register_async(
        &mut self,
        register: StatusRegister,
    ) -> Result<u8, Error> {
        let mut value = [0u8];
        self.transact_async(
            CommandByte::encode(register.address(), AccessMode::ReadBurst),
            Payload::Read(&mut value),
        )
        .await?;
        self.record_status_register(register.address(), value[0]);
        Ok(value[0])
    }

    /// Asynchronously queues bytes in the TX FIFO.
    ///
    /// This is the async version of [`write_tx_fifo`](Device::write_tx_fifo).
    pub async fn write_tx_fifo_async(&mut self, bytes: &[u8]) -> Result<StatusByte, Error> {
        if bytes.is_empty() {
            return Err(Error::InvalidAccessMode);
        }
        let room = match self.known_tx_window(bytes.len())? {
            Some(room) => room,
            None => {
                let queued = self
                    .read_status_register_async(StatusRegister::Txbytes)
                    .await?
                    & BYTES_IN_FIFO;
                let room = tx_room(queued);
                check_fifo_request(bytes.len(), room)?;
                room
            }
        };

        let status = self
            .transact_async(
                CommandByte::encode(Address::Fifo.bits(), AccessMode::WriteBurst),
                Payload::Write(bytes),
            )
            .await?;
        self.tx.bytes = Some(FIFO_LEN - room + bytes.len() as u8);
        Ok(status)
    }

    /// Asynchronously fills `bytes` from the RX FIFO.
    ///
    /// This is the async version of [`read_rx_fifo`](Device::read_rx_fifo).
    pub async fn read_rx_fifo_async(&mut self, bytes: &mut [u8]) -> Result<StatusByte, Error> {
        if bytes.is_empty() {
            return Err(Error::InvalidAccessMode);
        }
        let available = match self.known_rx_window(bytes.len())? {
            Some(available) => available,
            None => {
                let available = self
                    .read_status_register_async(StatusRegister::Rxbytes)
                    .await?
                    & BYTES_IN_FIFO;
                check_fifo_request(bytes.len(), available)?;
                available
            }
        };

        let len = bytes.len() as u8;
        let status = self
            .transact_async(
                CommandByte::encode(Address::Fifo.bits(), AccessMode::ReadBurst),
                Payload::Read(bytes),
            )
            .await?;
        self.rx.bytes = Some(available - len);
        Ok(status)
    }

    /// Asynchronously loads all eight PATABLE slots.
    ///
    /// This is the async version of [`write_pa_table`](Device::write_pa_table).
    pub async fn write_pa_table_async(&mut self, table: &PaTable) -> Result<StatusByte, Error> {
        self.write_burst_async(Address::PaTable, table.as_bytes())
            .await
    }

    /// Asynchronously reads back all eight PATABLE slots.
    ///
    /// This is the async version of [`read_pa_table`](Device::read_pa_table).
    pub async fn read_pa_table_async(&mut self) -> Result<PaTable, Error> {
        let mut levels = [0u8; PA_TABLE_LEN];
        self.read_burst_async(Address::PaTable, &mut levels).await?;
        Ok(PaTable::new(levels))
    }

    /// Asynchronously polls with `SNOP` until the chip reports ready.
    ///
    /// This is the async version of [`wait_ready`](Device::wait_ready).
    pub async fn wait_ready_async<D>(
        &mut self,
        delay: &mut D,
        deadline: Deadline,
    ) -> Result<StatusByte, Error>
    where
        D: embedded_hal_async::delay::DelayNs,
    {
        for _ in 0..deadline.polls {
            let status = self.strobe_async(Strobe::Snop).await?;
            if status.chip_ready() {
                return Ok(status);
            }
            delay.delay_us(deadline.interval_us).await;
        }

        warn!("chip not ready after {} polls", deadline.polls);
        Err(Error::BusTimeout)
    }
}
