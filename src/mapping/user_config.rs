//! The built-in BCR2000 mapping: two decks with transport, pitch and loop
//! controls, and two effect-unit strips each driving a pair of units.

use std::collections::BTreeMap;

use crate::hardware::bcr2000::Bcr2000Layout;
use crate::hardware::Preset;
use crate::mapping::components::*;
use crate::mapping::model::{
    ComponentBinding, DeckConfig, EffectUnitComponents, EffectUnitConfig, LifecycleHook,
    MappingConfig,
};
use crate::midi::model::{DataByte, MidiAddress};

/// Object whose shift flag the shift buttons toggle.
pub const SHIFT_TARGET: &str = "GenericMidiController";

pub const INIT_PRESET: u8 = 1;
pub const SHUTDOWN_PRESET: u8 = 31;

/// Effect slots per unit reachable from the surface.
const EFFECT_SLOTS: usize = 3;

pub fn user_config(layout: &Bcr2000Layout) -> MappingConfig {
    MappingConfig {
        init: Preset::new(INIT_PRESET).ok().map(LifecycleHook::select_preset),
        shutdown: Preset::new(SHUTDOWN_PRESET)
            .ok()
            .map(LifecycleHook::select_preset),
        decks: vec![deck(layout, 1, 0, 0), deck(layout, 2, 4, 2)],
        effect_units: vec![
            effect_unit(layout, vec![1, 3], 0),
            effect_unit(layout, vec![2, 4], 4),
        ],
    }
}

/// One deck occupies four columns of the upper section and two buttons of the button box.
fn deck(layout: &Bcr2000Layout, number: u32, column: usize, box_column: usize) -> DeckConfig {
    let at = |db: DataByte| MidiAddress(layout.status_control_change, db);
    let buttons = &layout.button_row1[column..column + 4];
    let encoders = &layout.push_encoder_group1[column..column + 4];
    let assign = &layout.button_box[box_column..box_column + 2];

    let plain = |component, db| ComponentBinding {
        component,
        midi: at(db),
        shift: false,
    };
    let shifted = |component, db| ComponentBinding {
        component,
        midi: at(db),
        shift: true,
    };
    let key = |key: &str| key.to_owned();

    DeckConfig {
        deck_numbers: vec![number],
        components: vec![
            plain(
                Component::ShiftButton(ShiftButtonOptions {
                    target: key(SHIFT_TARGET),
                }),
                buttons[3],
            ),
            plain(
                Component::RangeAwareEncoder(RangeAwareEncoderOptions {
                    key: key("pitch"),
                    bound: 6.0,
                }),
                encoders[0].encoder,
            ),
            plain(
                Component::Trigger(TriggerOptions {
                    in_key: key("pitch_set_zero"),
                }),
                encoders[0].button,
            ),
            plain(
                Component::Button(ButtonOptions {
                    key: key("keylock"),
                }),
                buttons[0],
            ),
            shifted(
                Component::EnumToggleButton(EnumToggleButtonOptions {
                    in_key: key("vinylcontrol_mode"),
                    max_value: 3,
                }),
                buttons[0],
            ),
            plain(
                Component::BackLoopButton(BackLoopButtonOptions {
                    out_key: key("loop_enabled"),
                }),
                buttons[1],
            ),
            shifted(
                Component::Button(ButtonOptions {
                    key: key("beatlooproll_activate"),
                }),
                buttons[1],
            ),
            plain(
                Component::Button(ButtonOptions {
                    key: key("reverse"),
                }),
                buttons[2],
            ),
            shifted(
                Component::Button(ButtonOptions {
                    key: key("reverseroll"),
                }),
                buttons[2],
            ),
            plain(
                Component::LoopEncoder(LoopEncoderOptions {
                    key: key("beatloop_size"),
                }),
                encoders[1].encoder,
            ),
            plain(
                Component::LoopMoveEncoder(LoopMoveEncoderOptions {
                    in_key: key("loop_move"),
                    size_control: key("beatjump_size"),
                }),
                encoders[2].encoder,
            ),
            plain(
                Component::LoopEncoder(LoopEncoderOptions {
                    key: key("beatjump_size"),
                }),
                encoders[3].encoder,
            ),
            plain(
                Component::EffectAssignmentButton(EffectAssignmentButtonOptions {
                    effect_unit: 1,
                    button_type: ButtonType::Push,
                }),
                assign[0],
            ),
            plain(
                Component::EffectAssignmentButton(EffectAssignmentButtonOptions {
                    effect_unit: 2,
                    button_type: ButtonType::Push,
                }),
                assign[1],
            ),
        ],
    }
}

/// Focus button followed by one enable button per slot on the lower button row,
/// dry/wet followed by one knob per slot on the first encoder row.
fn effect_unit(layout: &Bcr2000Layout, unit_numbers: Vec<u32>, column: usize) -> EffectUnitConfig {
    let at = |db: DataByte| MidiAddress(layout.status_control_change, db);
    let slots = |row: &[DataByte]| -> BTreeMap<u32, MidiAddress> {
        (1..=EFFECT_SLOTS)
            .map(|slot| (slot as u32, at(row[column + slot])))
            .collect()
    };

    EffectUnitConfig {
        unit_numbers,
        components: EffectUnitComponents {
            effect_focus_button: Some(at(layout.button_row2[column])),
            enable_buttons: slots(&layout.button_row2),
            dry_wet_knob: Some(at(layout.encoder_row1[column])),
            knobs: slots(&layout.encoder_row1),
        },
    }
}
