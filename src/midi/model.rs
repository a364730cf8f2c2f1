use serde::de::{Error, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error;
use std::fmt;
use std::fmt::Formatter;

const U8_MSB_EXTRACTOR: u8 = 0x80;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Status(u8);

impl Status {
    /// Control Change on MIDI channel 1.
    pub const CONTROL_CHANGE: Status = Status(0xB0);
    /// Program Change on MIDI channel 1.
    pub const PROGRAM_CHANGE: Status = Status(0xC0);

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn from_u8(status: u8) -> Option<Status> {
        (status & U8_MSB_EXTRACTOR == U8_MSB_EXTRACTOR).then_some(Status(status))
    }
}

struct StatusVisitor;

impl<'de> Visitor<'de> for StatusVisitor {
    type Value = Status;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("Expecting status to be u8 between 0x80 and 0xFF.")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        let parse_res = u8::try_from(v).ok().and_then(Status::from_u8);

        match parse_res {
            None => Err(E::custom(format!(
                "Expecting status to be u8 between 0x80 and 0xFF. Got: {}.",
                v
            ))),
            Some(status) => Ok(status),
        }
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::custom(format!(
                "Expecting status to be u8 between 0x80 and 0xFF. Got: {}.",
                v
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_u8(StatusVisitor)
    }
}

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct DataByte(u8);

impl DataByte {
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn from_u8(db: u8) -> Option<DataByte> {
        (db & U8_MSB_EXTRACTOR == 0).then_some(DataByte(db))
    }

    /// Compile-time checked data byte for address tables.
    pub const fn literal(db: u8) -> DataByte {
        assert!(db & U8_MSB_EXTRACTOR == 0, "data byte must be below 0x80");
        DataByte(db)
    }
}

struct DataByteVisitor;

impl<'de> Visitor<'de> for DataByteVisitor {
    type Value = DataByte;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("Expecting data byte to be u8 between 0x00 and 0x7F.")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        let parse_res = u8::try_from(v).ok().and_then(DataByte::from_u8);

        match parse_res {
            None => Err(E::custom(format!(
                "Expecting data byte to be u8 between 0x00 and 0x7F. Got: {}.",
                v
            ))),
            Some(db) => Ok(db),
        }
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::custom(format!(
                "Expecting data byte to be u8 between 0x00 and 0x7F. Got: {}.",
                v
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for DataByte {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_u8(DataByteVisitor)
    }
}

impl Serialize for DataByte {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

/// Physical control address: status byte plus first data byte.
/// Written as a two element sequence, e.g. `[0xB0, 0x43]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MidiAddress(pub Status, pub DataByte);

impl MidiAddress {
    pub fn status(&self) -> Status {
        self.0
    }

    pub fn data_byte(&self) -> DataByte {
        self.1
    }
}

impl fmt::Display for MidiAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:02X}, 0x{:02X}]", self.0.as_u8(), self.1.as_u8())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiMessage {
    pub status: Status,
    pub fst_data_byte: DataByte,
    /// Absent for two byte messages such as Program Change.
    pub snd_data_byte: Option<DataByte>,
}

impl MidiMessage {
    pub fn program_change(program: DataByte) -> MidiMessage {
        MidiMessage {
            status: Status::PROGRAM_CHANGE,
            fst_data_byte: program,
            snd_data_byte: None,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![self.status.as_u8(), self.fst_data_byte.as_u8()];
        if let Some(snd) = self.snd_data_byte {
            bytes.push(snd.as_u8());
        }
        bytes
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Sending MIDI Message failed. Reason: {human_friendly_description}.")]
pub struct SendFailed {
    pub human_friendly_description: String,
    #[source]
    pub underlying_error: Option<Box<dyn error::Error + Send + Sync>>,
}

pub trait MidiSender {
    fn send(&self, msg: MidiMessage) -> Result<(), SendFailed>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_requires_msb() {
        assert_eq!(Status::from_u8(0xB0), Some(Status::CONTROL_CHANGE));
        assert_eq!(Status::from_u8(0x7F), None);
    }

    #[test]
    fn data_byte_rejects_msb() {
        assert_eq!(DataByte::from_u8(0x43).map(|d| d.as_u8()), Some(0x43));
        assert_eq!(DataByte::from_u8(0x80), None);
    }

    #[test]
    fn address_parses_from_yaml_pair() {
        let address: MidiAddress = serde_yaml::from_str("[0xB0, 0x43]").unwrap();
        assert_eq!(address, MidiAddress(Status::CONTROL_CHANGE, DataByte::literal(0x43)));
        assert_eq!(address.to_string(), "[0xB0, 0x43]");
    }

    #[test]
    fn address_rejects_out_of_range_bytes() {
        assert!(serde_yaml::from_str::<MidiAddress>("[0x30, 0x43]").is_err());
        assert!(serde_yaml::from_str::<MidiAddress>("[0xB0, 0x80]").is_err());
        assert!(serde_yaml::from_str::<MidiAddress>("[0xB0, 300]").is_err());
        assert!(serde_yaml::from_str::<MidiAddress>("[0xB0]").is_err());
        assert!(serde_yaml::from_str::<MidiAddress>("[0xB0, 0x01, 0x02]").is_err());
    }

    #[test]
    fn program_change_is_two_bytes() {
        let msg = MidiMessage::program_change(DataByte::literal(30));
        assert_eq!(msg.to_bytes(), vec![0xC0, 30]);
    }
}
