#![allow(dead_code)]

use std::collections::VecDeque;

use embedded_hal::spi::{self, ErrorKind, ErrorType, Operation};

pub const CONFIG_SPACE: usize = 0x2F;
pub const FIFO_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Idle = 0,
    Rx = 1,
    Tx = 2,
    Fstxon = 3,
    Calibrate = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimError;

impl spi::Error for SimError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ChipSelectFault
    }
}

/// Behavioural model of the CC1100 SPI interface.
///
/// Every byte goes through [`SimChip::exchange`], the first byte of each
/// transaction being the header.
#[derive(Debug)]
pub struct SimChip {
    pub registers: [u8; CONFIG_SPACE],
    pub pa_table: [u8; 8],
    pub state: SimState,
    pub rx_fifo: VecDeque<u8>,
    pub tx_fifo: Vec<u8>,
    /// Packets landing in the RX FIFO, one after each RX FIFO read
    pub arrivals: VecDeque<Vec<u8>>,
    /// Header bytes of every completed transaction
    pub headers: Vec<u8>,
    /// Headers to answer with CHIP_RDYn high
    pub busy_polls: u32,
    /// How many headers to answer with CHIP_RDYn high after SRES
    pub busy_after_reset: u32,
    /// Fail the next transaction before any byte is exchanged
    pub fail_next: bool,
    /// Registers that ignore writes, as if stuck
    pub stuck: Vec<u8>,
    header: Option<u8>,
    cursor: u8,
    pa_index: usize,
}

impl Default for SimChip {
    fn default() -> Self {
        Self {
            registers: [0; CONFIG_SPACE],
            pa_table: [0; 8],
            state: SimState::Idle,
            rx_fifo: VecDeque::new(),
            tx_fifo: Vec::new(),
            arrivals: VecDeque::new(),
            headers: Vec::new(),
            busy_polls: 0,
            busy_after_reset: 2,
            fail_next: false,
            stuck: Vec::new(),
            header: None,
            cursor: 0,
            pa_index: 0,
        }
    }
}

impl SimChip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transactions(&self) -> usize {
        self.headers.len()
    }

    pub fn receive(&mut self, bytes: &[u8]) {
        self.rx_fifo.extend(bytes.iter().copied());
    }

    fn status(&self, read: bool) -> u8 {
        let ready = if self.busy_polls > 0 { 0x80 } else { 0x00 };
        let fifo = if read {
            self.rx_fifo.len()
        } else {
            FIFO_SIZE - 1 - self.tx_fifo.len().min(FIFO_SIZE - 1)
        };
        ready | (self.state as u8) << 4 | fifo.min(15) as u8
    }

    fn strobe(&mut self, opcode: u8) {
        match opcode {
            0x30 => {
                self.registers = [0; CONFIG_SPACE];
                self.pa_table = [0; 8];
                self.rx_fifo.clear();
                self.tx_fifo.clear();
                self.state = SimState::Idle;
                self.busy_polls = self.busy_after_reset;
            }
            0x31 => self.state = SimState::Fstxon,
            0x34 => self.state = SimState::Rx,
            0x35 => self.state = SimState::Tx,
            0x36 => self.state = SimState::Idle,
            0x3A => self.rx_fifo.clear(),
            0x3B => self.tx_fifo.clear(),
            _ => {}
        }
    }

    fn status_register(&self, address: u8) -> u8 {
        match address {
            0x30 => 0x00,
            0x31 => 0x03,
            0x35 => match self.state {
                SimState::Idle => 0x01,
                SimState::Rx => 0x0D,
                SimState::Tx => 0x13,
                SimState::Fstxon => 0x12,
                SimState::Calibrate => 0x08,
            },
            0x3A => self.tx_fifo.len() as u8,
            0x3B => self.rx_fifo.len().min(0x7F) as u8,
            _ => 0x00,
        }
    }

    pub fn exchange(&mut self, out: u8) -> u8 {
        let Some(header) = self.header else {
            let status = self.status(out & 0x80 != 0);
            self.busy_polls = self.busy_polls.saturating_sub(1);
            self.header = Some(out);
            self.cursor = out & 0x3F;
            self.pa_index = 0;
            if (0x30..=0x3D).contains(&self.cursor) && out & 0x40 == 0 {
                self.strobe(self.cursor);
            }
            return status;
        };

        let read = header & 0x80 != 0;
        let burst = header & 0x40 != 0;
        let address = self.cursor;
        let reply = match address {
            0x00..=0x2E => {
                let reply = self.registers[address as usize];
                if !read && !self.stuck.contains(&address) {
                    self.registers[address as usize] = out;
                }
                if burst {
                    self.cursor += 1;
                }
                reply
            }
            0x30..=0x3D => self.status_register(address),
            0x3E => {
                let slot = self.pa_index % 8;
                let reply = self.pa_table[slot];
                if !read {
                    self.pa_table[slot] = out;
                }
                self.pa_index += 1;
                reply
            }
            0x3F => {
                if read {
                    self.rx_fifo.pop_front().unwrap_or(0)
                } else {
                    self.tx_fifo.push(out);
                    self.status(false)
                }
            }
            _ => 0,
        };
        if read {
            reply
        } else {
            self.status(false)
        }
    }

    fn run(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), SimError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(SimError);
        }

        self.header = None;
        for operation in operations.iter_mut() {
            match operation {
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.exchange(0x00);
                    }
                }
                Operation::Write(buf) => {
                    for &byte in buf.iter() {
                        self.exchange(byte);
                    }
                }
                Operation::Transfer(read, write) => {
                    let len = read.len().max(write.len());
                    for i in 0..len {
                        let reply = self.exchange(write.get(i).copied().unwrap_or(0));
                        if let Some(slot) = read.get_mut(i) {
                            *slot = reply;
                        }
                    }
                }
                Operation::TransferInPlace(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.exchange(*byte);
                    }
                }
                Operation::DelayNs(_) => {}
            }
        }
        if let Some(header) = self.header.take() {
            self.headers.push(header);
            if header & 0xBF == 0xBF {
                if let Some(packet) = self.arrivals.pop_front() {
                    self.rx_fifo.extend(packet);
                }
            }
        }
        Ok(())
    }
}

impl ErrorType for SimChip {
    type Error = SimError;
}

impl spi::SpiDevice for SimChip {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        self.run(operations)
    }
}

impl embedded_hal_async::spi::SpiDevice for SimChip {
    async fn transaction(
        &mut self,
        operations: &mut [Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        self.run(operations)
    }
}

/// Delay that returns immediately and counts calls
#[derive(Debug, Default)]
pub struct NoDelay {
    pub calls: u32,
}

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {
        self.calls += 1;
    }
}

impl embedded_hal_async::delay::DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {
        self.calls += 1;
    }
}

/// Polls a future that never actually waits to completion.
pub fn block_on<F: core::future::Future>(future: F) -> F::Output {
    let mut future = core::pin::pin!(future);
    let mut cx = core::task::Context::from_waker(core::task::Waker::noop());
    loop {
        if let core::task::Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
    }
}
