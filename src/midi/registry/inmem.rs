use std::borrow::Cow;
use std::collections::HashMap;

use tracing::debug;

use crate::mapping::components::Component;
use crate::mapping::model::MappingConfig;
use crate::midi::model::MidiAddress;
use crate::midi::registry::model::{BindingKey, BindingRegistry, EffectUnitBinding};

pub struct ReadOnlyMapBindingRegistry {
    components: HashMap<BindingKey, Component>,
    effect_units: HashMap<MidiAddress, Vec<EffectUnitBinding>>,
}

impl ReadOnlyMapBindingRegistry {
    /// Expects a validated config: `validate` rejects two bindings sharing a
    /// (deck, address, shift) key, so no entry is shadowed here.
    pub fn new(config: &MappingConfig) -> ReadOnlyMapBindingRegistry {
        let mut components = HashMap::new();
        for deck in &config.decks {
            for &number in &deck.deck_numbers {
                for binding in &deck.components {
                    let key = BindingKey {
                        deck: number,
                        address: binding.midi,
                        shift: binding.shift,
                    };
                    components
                        .entry(key)
                        .or_insert_with(|| binding.component.clone());
                }
            }
        }

        let mut effect_units: HashMap<MidiAddress, Vec<EffectUnitBinding>> = HashMap::new();
        for unit in &config.effect_units {
            for &number in &unit.unit_numbers {
                for (role, address) in unit.components.roles() {
                    effect_units
                        .entry(address)
                        .or_default()
                        .push(EffectUnitBinding { unit: number, role });
                }
            }
        }
        effect_units
            .values_mut()
            .for_each(|bindings| bindings.sort_by_key(|b| b.unit));

        debug!(
            components = components.len(),
            effect_unit_addresses = effect_units.len(),
            "binding registry built"
        );

        ReadOnlyMapBindingRegistry {
            components,
            effect_units,
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl BindingRegistry for ReadOnlyMapBindingRegistry {
    fn get(&self, key: &BindingKey) -> Option<Cow<'_, Component>> {
        self.components.get(key).map(Cow::Borrowed)
    }

    fn effect_unit_roles(&self, address: &MidiAddress) -> Vec<EffectUnitBinding> {
        self.effect_units.get(address).cloned().unwrap_or_default()
    }
}
