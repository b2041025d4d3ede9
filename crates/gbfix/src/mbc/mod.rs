//! Cartridge type catalog and `--mbc-type` parsing
//!
//! The cartridge type byte at 0x147 tells the boot ROM and emulators which
//! memory bank controller (MBC) the cartridge carries, and which extra
//! hardware (RAM, battery, timer, rumble motor, sensor) sits next to it.

mod parser;
mod token;

pub use parser::{BaseType, parse_mbc};
pub use token::MbcToken;

use std::fmt;

/// Every cartridge type byte with a canonical name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MbcType {
    Rom = 0x00,
    RomRam = 0x08,
    RomRamBattery = 0x09,

    Mbc1 = 0x01,
    Mbc1Ram = 0x02,
    Mbc1RamBattery = 0x03,

    Mbc2 = 0x05,
    Mbc2Battery = 0x06,

    Mmm01 = 0x0B,
    Mmm01Ram = 0x0C,
    Mmm01RamBattery = 0x0D,

    Mbc3 = 0x11,
    Mbc3TimerBattery = 0x0F,
    Mbc3TimerRamBattery = 0x10,
    Mbc3Ram = 0x12,
    Mbc3RamBattery = 0x13,

    Mbc5 = 0x19,
    Mbc5Ram = 0x1A,
    Mbc5RamBattery = 0x1B,
    Mbc5Rumble = 0x1C,
    Mbc5RumbleRam = 0x1D,
    Mbc5RumbleRamBattery = 0x1E,

    Mbc6 = 0x20,

    Mbc7SensorRumbleRamBattery = 0x22,

    PocketCamera = 0xFC,

    BandaiTama5 = 0xFD,

    HuC3 = 0xFE,

    HuC1RamBattery = 0xFF,
}

impl MbcType {
    pub const ALL: [MbcType; 28] = [
        MbcType::Rom,
        MbcType::RomRam,
        MbcType::RomRamBattery,
        MbcType::Mbc1,
        MbcType::Mbc1Ram,
        MbcType::Mbc1RamBattery,
        MbcType::Mbc2,
        MbcType::Mbc2Battery,
        MbcType::Mmm01,
        MbcType::Mmm01Ram,
        MbcType::Mmm01RamBattery,
        MbcType::Mbc3,
        MbcType::Mbc3TimerBattery,
        MbcType::Mbc3TimerRamBattery,
        MbcType::Mbc3Ram,
        MbcType::Mbc3RamBattery,
        MbcType::Mbc5,
        MbcType::Mbc5Ram,
        MbcType::Mbc5RamBattery,
        MbcType::Mbc5Rumble,
        MbcType::Mbc5RumbleRam,
        MbcType::Mbc5RumbleRamBattery,
        MbcType::Mbc6,
        MbcType::Mbc7SensorRumbleRamBattery,
        MbcType::PocketCamera,
        MbcType::BandaiTama5,
        MbcType::HuC3,
        MbcType::HuC1RamBattery,
    ];

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|ty| ty.code() == byte)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Canonical display name, features joined with `+`
    pub fn name(self) -> &'static str {
        match self {
            MbcType::Rom => "ROM",
            MbcType::RomRam => "ROM+RAM",
            MbcType::RomRamBattery => "ROM+RAM+BATTERY",
            MbcType::Mbc1 => "MBC1",
            MbcType::Mbc1Ram => "MBC1+RAM",
            MbcType::Mbc1RamBattery => "MBC1+RAM+BATTERY",
            MbcType::Mbc2 => "MBC2",
            MbcType::Mbc2Battery => "MBC2+BATTERY",
            MbcType::Mmm01 => "MMM01",
            MbcType::Mmm01Ram => "MMM01+RAM",
            MbcType::Mmm01RamBattery => "MMM01+RAM+BATTERY",
            MbcType::Mbc3 => "MBC3",
            MbcType::Mbc3TimerBattery => "MBC3+TIMER+BATTERY",
            MbcType::Mbc3TimerRamBattery => "MBC3+TIMER+RAM+BATTERY",
            MbcType::Mbc3Ram => "MBC3+RAM",
            MbcType::Mbc3RamBattery => "MBC3+RAM+BATTERY",
            MbcType::Mbc5 => "MBC5",
            MbcType::Mbc5Ram => "MBC5+RAM",
            MbcType::Mbc5RamBattery => "MBC5+RAM+BATTERY",
            MbcType::Mbc5Rumble => "MBC5+RUMBLE",
            MbcType::Mbc5RumbleRam => "MBC5+RUMBLE+RAM",
            MbcType::Mbc5RumbleRamBattery => "MBC5+RUMBLE+RAM+BATTERY",
            MbcType::Mbc6 => "MBC6",
            MbcType::Mbc7SensorRumbleRamBattery => "MBC7+SENSOR+RUMBLE+RAM+BATTERY",
            MbcType::PocketCamera => "POCKET CAMERA",
            MbcType::BandaiTama5 => "BANDAI TAMA5",
            MbcType::HuC3 => "HUC3",
            MbcType::HuC1RamBattery => "HUC1+RAM+BATTERY",
        }
    }

    /// Whether the cartridge is expected to carry on-board RAM
    pub fn has_ram(self) -> bool {
        match self {
            MbcType::Rom
            | MbcType::Mbc1
            // MBC2 has built-in RAM, but the header does not describe it
            | MbcType::Mbc2
            | MbcType::Mbc2Battery
            | MbcType::Mmm01
            | MbcType::Mbc3
            | MbcType::Mbc3TimerBattery
            | MbcType::Mbc5
            | MbcType::Mbc5Rumble
            | MbcType::Mbc6
            | MbcType::BandaiTama5 => false,

            MbcType::RomRam
            | MbcType::RomRamBattery
            | MbcType::Mbc1Ram
            | MbcType::Mbc1RamBattery
            | MbcType::Mmm01Ram
            | MbcType::Mmm01RamBattery
            | MbcType::Mbc3TimerRamBattery
            | MbcType::Mbc3Ram
            | MbcType::Mbc3RamBattery
            | MbcType::Mbc5Ram
            | MbcType::Mbc5RamBattery
            | MbcType::Mbc5RumbleRam
            | MbcType::Mbc5RumbleRamBattery
            | MbcType::Mbc7SensorRumbleRamBattery
            | MbcType::PocketCamera
            | MbcType::HuC3
            | MbcType::HuC1RamBattery => true,
        }
    }
}

impl fmt::Display for MbcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved cartridge type byte
///
/// Numeric `--mbc-type` arguments may name bytes outside the catalog; those
/// are written as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CartridgeType(pub u8);

impl CartridgeType {
    pub fn byte(self) -> u8 {
        self.0
    }

    pub fn known(self) -> Option<MbcType> {
        MbcType::from_byte(self.0)
    }

    pub fn has_ram(self) -> bool {
        self.known().is_some_and(MbcType::has_ram)
    }
}

impl From<MbcType> for CartridgeType {
    fn from(ty: MbcType) -> Self {
        Self(ty.code())
    }
}

impl fmt::Display for CartridgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.known() {
            Some(ty) => f.write_str(ty.name()),
            None => write!(f, "${:02X}", self.0),
        }
    }
}

/// Extra hardware next to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Feature {
    Ram = 0x80,
    Battery = 0x40,
    Timer = 0x20,
    Rumble = 0x10,
    Sensor = 0x08,
}

/// Small bitset of [`Feature`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeatureSet(u8);

impl FeatureSet {
    pub const EMPTY: FeatureSet = FeatureSet(0);

    pub const fn of(features: &[Feature]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < features.len() {
            bits |= features[i] as u8;
            i += 1;
        }
        Self(bits)
    }

    pub fn insert(&mut self, feature: Feature) {
        self.0 |= feature as u8;
    }

    pub fn contains(self, feature: Feature) -> bool {
        self.0 & feature as u8 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_codes_are_distinct() {
        for (i, a) in MbcType::ALL.iter().enumerate() {
            for b in &MbcType::ALL[i + 1..] {
                assert_ne!(a.code(), b.code(), "{a} and {b} share a code");
            }
        }
    }

    #[test]
    fn test_from_byte() {
        assert_eq!(MbcType::from_byte(0x13), Some(MbcType::Mbc3RamBattery));
        assert_eq!(MbcType::from_byte(0xFF), Some(MbcType::HuC1RamBattery));
        assert_eq!(MbcType::from_byte(0x04), None);
    }

    #[test]
    fn test_has_ram() {
        assert!(MbcType::PocketCamera.has_ram());
        assert!(MbcType::Mbc5RumbleRam.has_ram());
        assert!(!MbcType::Mbc2Battery.has_ram());
        assert!(!MbcType::Mbc3TimerBattery.has_ram());
    }

    #[test]
    fn test_cartridge_type_display() {
        assert_eq!(CartridgeType(0x1B).to_string(), "MBC5+RAM+BATTERY");
        assert_eq!(CartridgeType(0x04).to_string(), "$04");
        assert!(!CartridgeType(0x04).has_ram());
    }

    #[test]
    fn test_feature_set() {
        let mut set = FeatureSet::EMPTY;
        assert!(set.is_empty());
        set.insert(Feature::Ram);
        set.insert(Feature::Battery);
        set.insert(Feature::Ram);
        assert_eq!(set, FeatureSet::of(&[Feature::Battery, Feature::Ram]));
        assert!(set.contains(Feature::Battery));
        assert!(!set.contains(Feature::Timer));
    }
}
