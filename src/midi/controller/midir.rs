use crossbeam_channel as cch;
use std::thread;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

use crate::midi::model::{MidiMessage, MidiSender, SendFailed};

pub struct MidirBased {
    sender: cch::Sender<MidiMessage>,
    _sending_loop: JoinHandle<()>,
}

impl MidirBased {
    /// Opens the first output port whose name contains `controller`.
    pub fn new(controller: &str) -> anyhow::Result<MidirBased> {
        let mut midi_out = Self::prepare_midi_out_connection(controller)?;
        let (sender, receiver) = cch::unbounded::<MidiMessage>();
        let _sending_loop = thread::spawn(move || {
            while let Ok(midi_msg) = receiver.recv() {
                debug!(midi = ?midi_msg, "sending");
                // Fire and forget.
                if let Err(e) = midi_out.send(&midi_msg.to_bytes()) {
                    warn!(error = %e, "MIDI output rejected message");
                }
            }
            midi_out.close();
        });

        Ok(MidirBased {
            sender,
            _sending_loop,
        })
    }

    /// Drops the channel and waits until every queued message was written.
    pub fn flush_and_close(self) {
        let MidirBased {
            sender,
            _sending_loop: sending_loop,
        } = self;
        drop(sender);
        if sending_loop.join().is_err() {
            warn!("MIDI sending thread panicked");
        }
    }

    pub fn list_output_ports() -> anyhow::Result<Vec<String>> {
        let midi_out = midir::MidiOutput::new("generic-midi-mapping-ports")?;
        Ok(midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect())
    }

    fn prepare_midi_out_connection(
        controller: &str,
    ) -> anyhow::Result<midir::MidiOutputConnection> {
        let midi_port = midir::MidiOutput::new(&format!("{controller}-client"))?;
        let port = Self::find_port(&midi_port, controller).ok_or_else(|| {
            anyhow::Error::msg(format!("Couldn't find MIDI output port matching {controller}."))
        })?;
        info!(controller, "connecting to MIDI output");
        midi_port
            .connect(&port, controller)
            .map_err(|e| anyhow::Error::msg(format!("Couldn't connect to {controller}: {e}")))
    }

    fn find_port(mo: &midir::MidiOutput, controller: &str) -> Option<midir::MidiOutputPort> {
        mo.ports().into_iter().find(|p| {
            mo.port_name(p)
                .map(|pn| pn.contains(controller))
                .unwrap_or(false)
        })
    }
}

impl MidiSender for MidirBased {
    fn send(&self, msg: MidiMessage) -> Result<(), SendFailed> {
        self.sender.send(msg).map_err(|e| SendFailed {
            human_friendly_description: "MIDI sending thread is gone".to_owned(),
            underlying_error: Some(e.into()),
        })
    }
}
