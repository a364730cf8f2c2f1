//! Hardware descriptions of supported controllers.

pub mod bcr2000;

use crate::midi::model::SendFailed;

/// Stored hardware configuration slot, 1-based as printed on the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Preset(u8);

#[derive(Debug, thiserror::Error)]
#[error("Preset must be between 1 and {max}. Got: {got}.")]
pub struct InvalidPreset {
    pub got: u8,
    pub max: u8,
}

impl Preset {
    pub const MAX: u8 = 32;

    pub fn new(slot: u8) -> Result<Preset, InvalidPreset> {
        if (1..=Self::MAX).contains(&slot) {
            Ok(Preset(slot))
        } else {
            Err(InvalidPreset {
                got: slot,
                max: Self::MAX,
            })
        }
    }

    pub fn slot(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Preset {
    type Error = InvalidPreset;

    fn try_from(slot: u8) -> Result<Self, Self::Error> {
        Preset::new(slot)
    }
}

impl From<Preset> for u8 {
    fn from(preset: Preset) -> Self {
        preset.0
    }
}

pub trait PresetSelector {
    fn set_preset(&self, preset: Preset) -> Result<(), SendFailed>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_range() {
        assert!(Preset::new(0).is_err());
        assert_eq!(Preset::new(1).unwrap().slot(), 1);
        assert_eq!(Preset::new(32).unwrap().slot(), 32);
        assert!(Preset::new(33).is_err());
    }

    #[test]
    fn preset_deserializes_with_range_check() {
        assert_eq!(serde_yaml::from_str::<Preset>("31").unwrap().slot(), 31);
        assert!(serde_yaml::from_str::<Preset>("40").is_err());
    }
}
