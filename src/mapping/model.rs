use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::hardware::{Preset, PresetSelector};
use crate::mapping::components::Component;
use crate::midi::model::{MidiAddress, SendFailed};

/// Procedure run by the host when the controller is loaded or released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum LifecycleHook {
    SelectPreset { preset: Preset },
}

impl LifecycleHook {
    pub fn select_preset(preset: Preset) -> LifecycleHook {
        LifecycleHook::SelectPreset { preset }
    }

    pub fn run(&self, device: &dyn PresetSelector) -> Result<(), SendFailed> {
        match self {
            LifecycleHook::SelectPreset { preset } => device.set_preset(*preset),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentBinding {
    pub component: Component,
    pub midi: MidiAddress,
    /// Only active while a shift button is held.
    pub shift: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeckConfig {
    pub deck_numbers: Vec<u32>,
    pub components: Vec<ComponentBinding>,
}

/// Addresses of the fixed effect unit roles. Slots are 1-based.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EffectUnitComponents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_focus_button: Option<MidiAddress>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub enable_buttons: BTreeMap<u32, MidiAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_wet_knob: Option<MidiAddress>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub knobs: BTreeMap<u32, MidiAddress>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectUnitRole {
    EffectFocusButton,
    EnableButton(u32),
    DryWetKnob,
    Knob(u32),
}

impl EffectUnitComponents {
    pub fn roles(&self) -> impl Iterator<Item = (EffectUnitRole, MidiAddress)> + '_ {
        let focus = self
            .effect_focus_button
            .map(|a| (EffectUnitRole::EffectFocusButton, a));
        let dry_wet = self.dry_wet_knob.map(|a| (EffectUnitRole::DryWetKnob, a));
        let enable = self
            .enable_buttons
            .iter()
            .map(|(slot, a)| (EffectUnitRole::EnableButton(*slot), *a));
        let knobs = self
            .knobs
            .iter()
            .map(|(slot, a)| (EffectUnitRole::Knob(*slot), *a));

        focus.into_iter().chain(enable).chain(dry_wet).chain(knobs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EffectUnitConfig {
    pub unit_numbers: Vec<u32>,
    pub components: EffectUnitComponents,
}

/// Everything the host needs to bind the controller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MappingConfig {
    pub init: Option<LifecycleHook>,
    pub shutdown: Option<LifecycleHook>,
    pub decks: Vec<DeckConfig>,
    pub effect_units: Vec<EffectUnitConfig>,
}

impl MappingConfig {
    pub fn init(&self, device: &dyn PresetSelector) {
        Self::run_hook("init", self.init.as_ref(), device)
    }

    pub fn shutdown(&self, device: &dyn PresetSelector) {
        Self::run_hook("shutdown", self.shutdown.as_ref(), device)
    }

    // Hook failures belong to the hardware driver; they are only logged.
    fn run_hook(name: &str, hook: Option<&LifecycleHook>, device: &dyn PresetSelector) {
        match hook {
            None => info!(hook = name, "no hook configured"),
            Some(hook) => {
                info!(hook = name, ?hook, "running lifecycle hook");
                if let Err(e) = hook.run(device) {
                    warn!(hook = name, error = %e, "lifecycle hook failed");
                }
            }
        }
    }

    /// Every physical address referenced by the mapping.
    pub fn addresses(&self) -> impl Iterator<Item = MidiAddress> + '_ {
        let deck_addresses = self
            .decks
            .iter()
            .flat_map(|deck| deck.components.iter().map(|binding| binding.midi));
        let unit_addresses = self
            .effect_units
            .iter()
            .flat_map(|unit| unit.components.roles().map(|(_, address)| address));

        deck_addresses.chain(unit_addresses)
    }

    pub fn binding_count(&self) -> usize {
        self.decks.iter().map(|d| d.components.len()).sum()
    }
}
