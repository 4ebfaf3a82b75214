//! Configuration registers
//!
//! The CC1100 keeps its radio configuration in 47 single-byte registers at
//! addresses 0x00-0x2E. Of these, the 39 registers from IOCFG2 to FSCAL0 carry
//! the frequency, modulation, packet handling and state machine settings and
//! make up a [`RegisterMap`]. The remaining eight (RCCTRL1/0 and the test
//! registers) are addressable for reads, and FSTEST/TEST2/TEST1/TEST0 can be
//! written through [`TestSettings`].
//!
//! The values in [`RegisterMap::DEFAULT`] are opaque tuning data. Swapping the
//! map reconfigures frequency, modulation and timing without touching the
//! command layer.

/// Number of registers written during configuration
pub const CONFIG_REGISTER_COUNT: usize = 39;

/// Highest configuration register address
pub const LAST_CONFIG_ADDRESS: u8 = 0x2E;

/// Configuration register identity.
///
/// Each variant's discriminant is its address on the bus.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// GDO2 output pin configuration
    Iocfg2 = 0x00,
    /// GDO1 output pin configuration
    Iocfg1 = 0x01,
    /// GDO0 output pin configuration
    Iocfg0 = 0x02,
    /// RX FIFO and TX FIFO thresholds
    Fifothr = 0x03,
    /// Sync word, high byte
    Sync1 = 0x04,
    /// Sync word, low byte
    Sync0 = 0x05,
    /// Packet length
    Pktlen = 0x06,
    /// Packet automation control
    Pktctrl1 = 0x07,
    /// Packet automation control
    Pktctrl0 = 0x08,
    /// Device address
    Addr = 0x09,
    /// Channel number
    Channr = 0x0A,
    /// Frequency synthesizer control
    Fsctrl1 = 0x0B,
    /// Frequency synthesizer control
    Fsctrl0 = 0x0C,
    /// Frequency control word, high byte
    Freq2 = 0x0D,
    /// Frequency control word, middle byte
    Freq1 = 0x0E,
    /// Frequency control word, low byte
    Freq0 = 0x0F,
    /// Modem configuration
    Mdmcfg4 = 0x10,
    /// Modem configuration
    Mdmcfg3 = 0x11,
    /// Modem configuration
    Mdmcfg2 = 0x12,
    /// Modem configuration
    Mdmcfg1 = 0x13,
    /// Modem configuration
    Mdmcfg0 = 0x14,
    /// Modem deviation setting
    Deviatn = 0x15,
    /// Main radio control state machine configuration
    Mcsm2 = 0x16,
    /// Main radio control state machine configuration
    Mcsm1 = 0x17,
    /// Main radio control state machine configuration
    Mcsm0 = 0x18,
    /// Frequency offset compensation configuration
    Foccfg = 0x19,
    /// Bit synchronization configuration
    Bscfg = 0x1A,
    /// AGC control
    Agcctrl2 = 0x1B,
    /// AGC control
    Agcctrl1 = 0x1C,
    /// AGC control
    Agcctrl0 = 0x1D,
    /// Event 0 timeout, high byte
    Worevt1 = 0x1E,
    /// Event 0 timeout, low byte
    Worevt0 = 0x1F,
    /// Wake On Radio control
    Worctrl = 0x20,
    /// Front end RX configuration
    Frend1 = 0x21,
    /// Front end TX configuration
    Frend0 = 0x22,
    /// Frequency synthesizer calibration
    Fscal3 = 0x23,
    /// Frequency synthesizer calibration
    Fscal2 = 0x24,
    /// Frequency synthesizer calibration
    Fscal1 = 0x25,
    /// Frequency synthesizer calibration
    Fscal0 = 0x26,
    /// RC oscillator configuration
    Rcctrl1 = 0x27,
    /// RC oscillator configuration
    Rcctrl0 = 0x28,
    /// Frequency synthesizer calibration control
    Fstest = 0x29,
    /// Production test
    Ptest = 0x2A,
    /// AGC test
    Agctest = 0x2B,
    /// Various test settings
    Test2 = 0x2C,
    /// Various test settings
    Test1 = 0x2D,
    /// Various test settings
    Test0 = 0x2E,
}

impl Register {
    /// Every register, in ascending address order
    pub const ALL: [Register; LAST_CONFIG_ADDRESS as usize + 1] = [
        Register::Iocfg2,
        Register::Iocfg1,
        Register::Iocfg0,
        Register::Fifothr,
        Register::Sync1,
        Register::Sync0,
        Register::Pktlen,
        Register::Pktctrl1,
        Register::Pktctrl0,
        Register::Addr,
        Register::Channr,
        Register::Fsctrl1,
        Register::Fsctrl0,
        Register::Freq2,
        Register::Freq1,
        Register::Freq0,
        Register::Mdmcfg4,
        Register::Mdmcfg3,
        Register::Mdmcfg2,
        Register::Mdmcfg1,
        Register::Mdmcfg0,
        Register::Deviatn,
        Register::Mcsm2,
        Register::Mcsm1,
        Register::Mcsm0,
        Register::Foccfg,
        Register::Bscfg,
        Register::Agcctrl2,
        Register::Agcctrl1,
        Register::Agcctrl0,
        Register::Worevt1,
        Register::Worevt0,
        Register::Worctrl,
        Register::Frend1,
        Register::Frend0,
        Register::Fscal3,
        Register::Fscal2,
        Register::Fscal1,
        Register::Fscal0,
        Register::Rcctrl1,
        Register::Rcctrl0,
        Register::Fstest,
        Register::Ptest,
        Register::Agctest,
        Register::Test2,
        Register::Test1,
        Register::Test0,
    ];

    /// Bus address of the register
    pub const fn address(self) -> u8 {
        self as u8
    }

    /// Looks up the register at `address`.
    pub const fn from_address(address: u8) -> Option<Register> {
        if address <= LAST_CONFIG_ADDRESS {
            Some(Self::ALL[address as usize])
        } else {
            None
        }
    }

    /// Whether the register is part of a [`RegisterMap`]
    pub const fn is_configurable(self) -> bool {
        (self as usize) < CONFIG_REGISTER_COUNT
    }
}

/// The 39 configuration register values written at startup.
///
/// Entries are stored by address, so iteration is always in ascending address
/// order and every configurable register appears exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    values: [u8; CONFIG_REGISTER_COUNT],
}

impl RegisterMap {
    /// 433 MHz 2-FSK settings shipped with the NetUSB firmware
    pub const DEFAULT: RegisterMap = RegisterMap::new([
        0x0B, // IOCFG2
        0x46, // IOCFG1
        0x06, // IOCFG0
        0x07, // FIFOTHR
        0xD3, // SYNC1
        0x91, // SYNC0
        0xFF, // PKTLEN
        0x04, // PKTCTRL1
        0x05, // PKTCTRL0
        0x00, // ADDR, broadcast
        0x00, // CHANNR
        0x08, // FSCTRL1
        0x00, // FSCTRL0
        0x10, // FREQ2
        0xA7, // FREQ1
        0x62, // FREQ0
        0x5B, // MDMCFG4
        0xF8, // MDMCFG3
        0x03, // MDMCFG2
        0x22, // MDMCFG1
        0xF8, // MDMCFG0
        0x47, // DEVIATN
        0x07, // MCSM2
        0x3F, // MCSM1
        0x18, // MCSM0
        0x1D, // FOCCFG
        0x1C, // BSCFG
        0xC7, // AGCCTRL2
        0x00, // AGCCTRL1
        0xB2, // AGCCTRL0
        0x87, // WOREVT1
        0x6B, // WOREVT0
        0x71, // WORCTRL
        0xB6, // FREND1
        0x10, // FREND0
        0xEA, // FSCAL3
        0x2A, // FSCAL2
        0x00, // FSCAL1
        0x1F, // FSCAL0
    ]);

    /// Creates a map from values ordered by register address, IOCFG2 first.
    pub const fn new(values: [u8; CONFIG_REGISTER_COUNT]) -> Self {
        Self { values }
    }

    /// Returns a copy of the map with `register` set to `value`.
    ///
    /// Registers outside the configurable range are ignored.
    pub const fn with(mut self, register: Register, value: u8) -> Self {
        if register.is_configurable() {
            self.values[register as usize] = value;
        }
        self
    }

    /// Configured value for `register`, if it is part of the map.
    pub const fn get(&self, register: Register) -> Option<u8> {
        if register.is_configurable() {
            Some(self.values[register as usize])
        } else {
            None
        }
    }

    /// Raw values in address order, suitable for a burst write from IOCFG2.
    pub const fn as_bytes(&self) -> &[u8; CONFIG_REGISTER_COUNT] {
        &self.values
    }

    /// Iterates `(register, value)` pairs in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = (Register, u8)> + '_ {
        Register::ALL.into_iter().zip(self.values.iter().copied())
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Values for the test registers exported by SmartRF Studio.
///
/// These are written after the [`RegisterMap`] when present. Leaving them
/// unset keeps the chip's reset values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestSettings {
    pub fstest: u8,
    pub test2: u8,
    pub test1: u8,
    pub test0: u8,
}

impl TestSettings {
    pub const RECOMMENDED: TestSettings = TestSettings {
        fstest: 0x59,
        test2: 0x81,
        test1: 0x35,
        test0: 0x0B,
    };

    /// `(register, value)` pairs in ascending address order
    pub const fn entries(&self) -> [(Register, u8); 4] {
        [
            (Register::Fstest, self.fstest),
            (Register::Test2, self.test2),
            (Register::Test1, self.test1),
            (Register::Test0, self.test0),
        ]
    }
}

/// Number of power amplifier table slots
pub const PA_TABLE_LEN: usize = 8;

/// Power amplifier table.
///
/// Slot 0 sets the output power used for transmission unless FREND0 selects
/// power ramping across further slots. The slots are independent; nothing
/// requires them to be equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PaTable([u8; PA_TABLE_LEN]);

impl PaTable {
    /// +10 dBm in every slot
    pub const DEFAULT: PaTable = PaTable::uniform(0xC0);

    pub const fn new(levels: [u8; PA_TABLE_LEN]) -> Self {
        Self(levels)
    }

    /// Table with the same power setting in every slot
    pub const fn uniform(level: u8) -> Self {
        Self([level; PA_TABLE_LEN])
    }

    pub const fn level(&self, index: usize) -> Option<u8> {
        if index < PA_TABLE_LEN {
            Some(self.0[index])
        } else {
            None
        }
    }

    pub const fn as_bytes(&self) -> &[u8; PA_TABLE_LEN] {
        &self.0
    }
}

impl Default for PaTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<[u8; PA_TABLE_LEN]> for PaTable {
    fn from(levels: [u8; PA_TABLE_LEN]) -> Self {
        Self(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_are_unique_and_in_range() {
        for (index, register) in Register::ALL.iter().enumerate() {
            assert_eq!(register.address() as usize, index);
            assert!(register.address() <= LAST_CONFIG_ADDRESS);
        }
        for (index, (register, _)) in RegisterMap::DEFAULT.iter().enumerate() {
            assert_eq!(register.address() as usize, index);
        }
        assert_eq!(RegisterMap::DEFAULT.iter().count(), CONFIG_REGISTER_COUNT);
    }

    #[test]
    fn lookup_by_address() {
        assert_eq!(Register::from_address(0x00), Some(Register::Iocfg2));
        assert_eq!(Register::from_address(0x29), Some(Register::Fstest));
        assert_eq!(Register::from_address(0x2E), Some(Register::Test0));
        assert_eq!(Register::from_address(0x2F), None);
    }

    #[test]
    fn map_lookup_and_override() {
        let map = RegisterMap::DEFAULT;
        assert_eq!(map.get(Register::Freq2), Some(0x10));
        assert_eq!(map.get(Register::Fscal0), Some(0x1F));
        assert_eq!(map.get(Register::Test0), None);

        let tuned = map.with(Register::Channr, 0x05).with(Register::Test2, 0x88);
        assert_eq!(tuned.get(Register::Channr), Some(0x05));
        assert_eq!(tuned.get(Register::Test2), None);
        assert_eq!(map.get(Register::Channr), Some(0x00));
    }

    #[test]
    fn test_settings_are_canonical_registers() {
        let entries = TestSettings::RECOMMENDED.entries();
        assert_eq!(entries[0], (Register::Fstest, 0x59));
        assert_eq!(entries[3], (Register::Test0, 0x0B));
        assert!(entries.iter().all(|(register, _)| !register.is_configurable()));
    }

    #[test]
    fn pa_table_slots_may_differ() {
        let ramp = PaTable::new([0x03, 0x0E, 0x1E, 0x27, 0x50, 0x81, 0xCB, 0xC2]);
        assert_eq!(ramp.level(0), Some(0x03));
        assert_eq!(ramp.level(7), Some(0xC2));
        assert_eq!(ramp.level(8), None);
        assert_eq!(PaTable::default().as_bytes(), &[0xC0; PA_TABLE_LEN]);
    }
}
