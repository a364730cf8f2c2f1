use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use tracing::warn;

use crate::mapping::components::{Component, ComponentKind};
use crate::mapping::model::{DeckConfig, EffectUnitConfig, MappingConfig};
use crate::midi::model::MidiAddress;

/// Location of a binding, written as `decks[i].components[j]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BindingPosition {
    pub deck: usize,
    pub component: usize,
}

impl fmt::Display for BindingPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decks[{}].components[{}]", self.deck, self.component)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("decks[{deck}] has no deck numbers")]
    EmptyDeckNumbers { deck: usize },
    #[error("decks[{deck}] lists deck number 0, decks are numbered from 1")]
    ZeroDeckNumber { deck: usize },
    #[error("decks[{deck}] lists deck number {number} more than once")]
    DuplicateDeckNumber { deck: usize, number: u32 },
    #[error("decks[{deck}].components[{component}] has unknown type {type_name}")]
    UnknownComponentType {
        deck: usize,
        component: usize,
        type_name: String,
    },
    #[error("decks[{deck}].components[{component}] has invalid {kind} options: {source}")]
    InvalidOptions {
        deck: usize,
        component: usize,
        kind: ComponentKind,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(
        "decks[{deck}].components[{component}] assigns effect unit 0, units are numbered from 1"
    )]
    ZeroEffectUnitTarget { deck: usize, component: usize },
    #[error(
        "{second} binds {address} (shift: {shift}) on deck {deck_number}, already bound by {first}"
    )]
    ConflictingBinding {
        deck_number: u32,
        address: MidiAddress,
        shift: bool,
        first: BindingPosition,
        second: BindingPosition,
    },
    #[error("effectUnits[{unit}] has no unit numbers")]
    EmptyUnitNumbers { unit: usize },
    #[error("effectUnits[{unit}] lists unit number 0, effect units are numbered from 1")]
    ZeroUnitNumber { unit: usize },
    #[error("effectUnits[{unit}] assigns unit number {number} which is already assigned")]
    DuplicateUnitNumber { unit: usize, number: u32 },
    #[error("effectUnits[{unit}].components.{role} uses slot 0, slots are numbered from 1")]
    ZeroEffectSlot { unit: usize, role: &'static str },
}

impl MappingConfig {
    /// Load time checks the host would otherwise trip over while binding.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Binding sets may share deck numbers, so conflicts are tracked per deck number.
        let mut bound = HashMap::new();
        for (index, deck) in self.decks.iter().enumerate() {
            validate_deck(index, deck, &mut bound)?;
        }

        let mut assigned_units = HashSet::new();
        for (index, unit) in self.effect_units.iter().enumerate() {
            validate_effect_unit(index, unit, &mut assigned_units)?;
        }

        let statuses: BTreeSet<u8> = self.addresses().map(|a| a.status().as_u8()).collect();
        if statuses.len() > 1 {
            warn!(?statuses, "mapping mixes several MIDI status bytes");
        }

        Ok(())
    }
}

type BoundControls = HashMap<(u32, MidiAddress, bool), BindingPosition>;

fn validate_deck(
    index: usize,
    deck: &DeckConfig,
    bound: &mut BoundControls,
) -> Result<(), ConfigError> {
    if deck.deck_numbers.is_empty() {
        return Err(ConfigError::EmptyDeckNumbers { deck: index });
    }
    let mut seen = HashSet::new();
    for &number in &deck.deck_numbers {
        if number == 0 {
            return Err(ConfigError::ZeroDeckNumber { deck: index });
        }
        if !seen.insert(number) {
            return Err(ConfigError::DuplicateDeckNumber {
                deck: index,
                number,
            });
        }
    }

    for (component, binding) in deck.components.iter().enumerate() {
        if let Component::EffectAssignmentButton(options) = &binding.component {
            if options.effect_unit == 0 {
                return Err(ConfigError::ZeroEffectUnitTarget {
                    deck: index,
                    component,
                });
            }
        }
        let position = BindingPosition {
            deck: index,
            component,
        };
        for &deck_number in &deck.deck_numbers {
            let key = (deck_number, binding.midi, binding.shift);
            if let Some(&first) = bound.get(&key) {
                return Err(ConfigError::ConflictingBinding {
                    deck_number,
                    address: binding.midi,
                    shift: binding.shift,
                    first,
                    second: position,
                });
            }
            bound.insert(key, position);
        }
    }

    Ok(())
}

fn validate_effect_unit(
    index: usize,
    unit: &EffectUnitConfig,
    assigned_units: &mut HashSet<u32>,
) -> Result<(), ConfigError> {
    if unit.unit_numbers.is_empty() {
        return Err(ConfigError::EmptyUnitNumbers { unit: index });
    }
    for &number in &unit.unit_numbers {
        if number == 0 {
            return Err(ConfigError::ZeroUnitNumber { unit: index });
        }
        if !assigned_units.insert(number) {
            return Err(ConfigError::DuplicateUnitNumber {
                unit: index,
                number,
            });
        }
    }

    if unit.components.enable_buttons.contains_key(&0) {
        return Err(ConfigError::ZeroEffectSlot {
            unit: index,
            role: "enableButtons",
        });
    }
    if unit.components.knobs.contains_key(&0) {
        return Err(ConfigError::ZeroEffectSlot {
            unit: index,
            role: "knobs",
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::components::{ButtonOptions, ButtonType, EffectAssignmentButtonOptions};
    use crate::mapping::model::{ComponentBinding, EffectUnitComponents};
    use crate::midi::model::{DataByte, Status};

    fn cc(data: u8) -> MidiAddress {
        MidiAddress(Status::CONTROL_CHANGE, DataByte::literal(data))
    }

    fn button(key: &str, data: u8, shift: bool) -> ComponentBinding {
        ComponentBinding {
            component: Component::Button(ButtonOptions {
                key: key.to_owned(),
            }),
            midi: cc(data),
            shift,
        }
    }

    fn deck(deck_numbers: Vec<u32>, components: Vec<ComponentBinding>) -> MappingConfig {
        MappingConfig {
            decks: vec![DeckConfig {
                deck_numbers,
                components,
            }],
            ..MappingConfig::default()
        }
    }

    fn units(unit_numbers: &[&[u32]]) -> MappingConfig {
        MappingConfig {
            effect_units: unit_numbers
                .iter()
                .map(|numbers| EffectUnitConfig {
                    unit_numbers: numbers.to_vec(),
                    components: EffectUnitComponents::default(),
                })
                .collect(),
            ..MappingConfig::default()
        }
    }

    #[test]
    fn empty_config_is_valid() {
        assert!(MappingConfig::default().validate().is_ok());
    }

    #[test]
    fn shift_disambiguates_shared_address() {
        let config = deck(
            vec![1],
            vec![button("reverse", 0x43, false), button("reverseroll", 0x43, true)],
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn same_address_and_shift_conflicts() {
        let config = deck(
            vec![1],
            vec![button("reverse", 0x43, false), button("keylock", 0x43, false)],
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ConflictingBinding {
                deck_number: 1,
                shift: false,
                first: BindingPosition {
                    deck: 0,
                    component: 0
                },
                second: BindingPosition {
                    deck: 0,
                    component: 1
                },
                ..
            })
        ));
    }

    fn decks(sets: Vec<(Vec<u32>, Vec<ComponentBinding>)>) -> MappingConfig {
        MappingConfig {
            decks: sets
                .into_iter()
                .map(|(deck_numbers, components)| DeckConfig {
                    deck_numbers,
                    components,
                })
                .collect(),
            ..MappingConfig::default()
        }
    }

    #[test]
    fn conflicts_are_detected_across_binding_sets_sharing_a_deck() {
        let config = decks(vec![
            (vec![1], vec![button("reverse", 0x43, false)]),
            (vec![1, 2], vec![button("keylock", 0x43, false)]),
        ]);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ConflictingBinding {
                deck_number: 1,
                first: BindingPosition {
                    deck: 0,
                    component: 0
                },
                second: BindingPosition {
                    deck: 1,
                    component: 0
                },
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "decks[1].components[0] binds [0xB0, 0x43] (shift: false) on deck 1, \
             already bound by decks[0].components[0]"
        );
    }

    #[test]
    fn overlapping_deck_numbers_are_fine_without_shared_controls() {
        let config = decks(vec![
            (vec![1], vec![button("reverse", 0x43, false)]),
            (
                vec![1, 2],
                vec![button("reverseroll", 0x43, true), button("keylock", 0x44, false)],
            ),
        ]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn same_control_on_disjoint_decks_is_fine() {
        let config = decks(vec![
            (vec![1, 3], vec![button("reverse", 0x43, false)]),
            (vec![2, 4], vec![button("reverse", 0x43, false)]),
        ]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deck_numbers_must_be_present_and_positive() {
        assert!(matches!(
            deck(vec![], vec![]).validate(),
            Err(ConfigError::EmptyDeckNumbers { deck: 0 })
        ));
        assert!(matches!(
            deck(vec![1, 0], vec![]).validate(),
            Err(ConfigError::ZeroDeckNumber { deck: 0 })
        ));
        assert!(matches!(
            deck(vec![2, 2], vec![]).validate(),
            Err(ConfigError::DuplicateDeckNumber { deck: 0, number: 2 })
        ));
    }

    #[test]
    fn effect_assignment_needs_a_real_unit() {
        let config = deck(
            vec![1],
            vec![ComponentBinding {
                component: Component::EffectAssignmentButton(EffectAssignmentButtonOptions {
                    effect_unit: 0,
                    button_type: ButtonType::Push,
                }),
                midi: cc(0x69),
                shift: false,
            }],
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroEffectUnitTarget {
                deck: 0,
                component: 0
            })
        ));
    }

    #[test]
    fn unit_numbers_are_not_assigned_twice() {
        assert!(units(&[&[1, 3], &[2, 4]]).validate().is_ok());
        assert!(matches!(
            units(&[&[1, 3], &[3, 4]]).validate(),
            Err(ConfigError::DuplicateUnitNumber { unit: 1, number: 3 })
        ));
        assert!(matches!(
            units(&[&[]]).validate(),
            Err(ConfigError::EmptyUnitNumbers { unit: 0 })
        ));
        assert!(matches!(
            units(&[&[0]]).validate(),
            Err(ConfigError::ZeroUnitNumber { unit: 0 })
        ));
    }

    #[test]
    fn effect_slots_start_at_one() {
        let mut config = units(&[&[1]]);
        config.effect_units[0].components.knobs.insert(0, cc(0x51));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ZeroEffectSlot { unit: 0, role: "knobs" }));
        assert_eq!(
            err.to_string(),
            "effectUnits[0].components.knobs uses slot 0, slots are numbered from 1"
        );
    }
}
