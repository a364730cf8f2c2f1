use std::sync::Mutex;

use crate::midi::model::{MidiMessage, MidiSender, SendFailed};

/// Logs messages instead of sending them. Used for `--dry-run`.
pub struct JustPrint;

impl MidiSender for JustPrint {
    fn send(&self, msg: MidiMessage) -> Result<(), SendFailed> {
        let bytes: Vec<String> = msg.to_bytes().iter().map(|b| format!("0x{b:02X}")).collect();
        println!("Sent: {}", bytes.join(" "));
        Ok(())
    }
}

/// Keeps every message in memory.
#[derive(Default)]
pub struct Recording(Mutex<Vec<MidiMessage>>);

impl Recording {
    pub fn sent(&self) -> Vec<MidiMessage> {
        self.0.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl MidiSender for Recording {
    fn send(&self, msg: MidiMessage) -> Result<(), SendFailed> {
        self.0
            .lock()
            .map_err(|_| SendFailed {
                human_friendly_description: "recording lock poisoned".to_owned(),
                underlying_error: None,
            })?
            .push(msg);
        Ok(())
    }
}

/// Rejects every message.
pub struct AlwaysFail;

impl MidiSender for AlwaysFail {
    fn send(&self, _msg: MidiMessage) -> Result<(), SendFailed> {
        Err(SendFailed {
            human_friendly_description: "device unplugged".to_owned(),
            underlying_error: None,
        })
    }
}
