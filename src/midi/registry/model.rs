use std::borrow::Cow;

use crate::mapping::components::Component;
use crate::mapping::model::EffectUnitRole;
use crate::midi::model::MidiAddress;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindingKey {
    pub deck: u32,
    pub address: MidiAddress,
    pub shift: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectUnitBinding {
    pub unit: u32,
    pub role: EffectUnitRole,
}

pub trait BindingRegistry {
    fn get(&self, key: &BindingKey) -> Option<Cow<'_, Component>>;

    /// Effect unit roles wired to `address`, ordered by unit number.
    fn effect_unit_roles(&self, address: &MidiAddress) -> Vec<EffectUnitBinding>;
}
