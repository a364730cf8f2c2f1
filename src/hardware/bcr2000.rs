//! Behringer BCR2000 in its factory CC layout.

use tracing::debug;

use crate::hardware::{Preset, PresetSelector};
use crate::midi::model::{DataByte, MidiMessage, MidiSender, SendFailed, Status};

/// A push encoder: turning sends on `encoder`, pushing sends on `button`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PushEncoder {
    pub encoder: DataByte,
    pub button: DataByte,
}

/// Named physical address tables of the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bcr2000Layout {
    pub status_control_change: Status,
    pub push_encoder_group1: [PushEncoder; 8],
    pub button_row1: [DataByte; 8],
    pub button_row2: [DataByte; 8],
    pub encoder_row1: [DataByte; 8],
    pub encoder_row2: [DataByte; 8],
    pub encoder_row3: [DataByte; 8],
    pub button_box: [DataByte; 4],
}

const fn row<const N: usize>(first: u8) -> [DataByte; N] {
    let mut out = [DataByte::literal(0); N];
    let mut i = 0;
    while i < N {
        out[i] = DataByte::literal(first + i as u8);
        i += 1;
    }
    out
}

const fn push_encoders(first_encoder: u8, first_button: u8) -> [PushEncoder; 8] {
    let encoders: [DataByte; 8] = row(first_encoder);
    let buttons: [DataByte; 8] = row(first_button);
    let mut out = [PushEncoder {
        encoder: DataByte::literal(0),
        button: DataByte::literal(0),
    }; 8];
    let mut i = 0;
    while i < 8 {
        out[i] = PushEncoder {
            encoder: encoders[i],
            button: buttons[i],
        };
        i += 1;
    }
    out
}

impl Bcr2000Layout {
    pub const STATUS_CONTROL_CHANGE: Status = Status::CONTROL_CHANGE;

    pub const FACTORY: Bcr2000Layout = Bcr2000Layout {
        status_control_change: Self::STATUS_CONTROL_CHANGE,
        push_encoder_group1: push_encoders(0x01, 0x21),
        button_row1: row(0x41),
        button_row2: row(0x49),
        encoder_row1: row(0x51),
        encoder_row2: row(0x59),
        encoder_row3: row(0x61),
        button_box: row(0x69),
    };
}

impl Default for Bcr2000Layout {
    fn default() -> Self {
        Self::FACTORY
    }
}

/// Program Change selecting `preset`. The device numbers programs from 0.
pub fn preset_message(preset: Preset) -> MidiMessage {
    // Slots stop at 32, so the program number always fits a data byte.
    let program = DataByte::from_u8(preset.slot() - 1).unwrap_or(DataByte::literal(0));
    MidiMessage::program_change(program)
}

pub struct Bcr2000<S> {
    sender: S,
}

impl<S: MidiSender> Bcr2000<S> {
    pub fn new(sender: S) -> Bcr2000<S> {
        Bcr2000 { sender }
    }

    pub fn into_sender(self) -> S {
        self.sender
    }
}

impl<S: MidiSender> PresetSelector for Bcr2000<S> {
    fn set_preset(&self, preset: Preset) -> Result<(), SendFailed> {
        debug!(preset = preset.slot(), "selecting BCR2000 preset");
        self.sender.send(preset_message(preset))
    }
}
