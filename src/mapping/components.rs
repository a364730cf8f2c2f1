//! Component kinds a deck binding can instantiate, each with its own options record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Button,
    EffectAssignmentButton,
    ShiftButton,
    RangeAwareEncoder,
    Trigger,
    EnumToggleButton,
    BackLoopButton,
    LoopEncoder,
    LoopMoveEncoder,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 9] = [
        ComponentKind::Button,
        ComponentKind::EffectAssignmentButton,
        ComponentKind::ShiftButton,
        ComponentKind::RangeAwareEncoder,
        ComponentKind::Trigger,
        ComponentKind::EnumToggleButton,
        ComponentKind::BackLoopButton,
        ComponentKind::LoopEncoder,
        ComponentKind::LoopMoveEncoder,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Button => "Button",
            ComponentKind::EffectAssignmentButton => "EffectAssignmentButton",
            ComponentKind::ShiftButton => "ShiftButton",
            ComponentKind::RangeAwareEncoder => "RangeAwareEncoder",
            ComponentKind::Trigger => "Trigger",
            ComponentKind::EnumToggleButton => "EnumToggleButton",
            ComponentKind::BackLoopButton => "BackLoopButton",
            ComponentKind::LoopEncoder => "LoopEncoder",
            ComponentKind::LoopMoveEncoder => "LoopMoveEncoder",
        }
    }

    /// Option keys as written in configuration files. Every key is required.
    pub fn option_keys(&self) -> &'static [&'static str] {
        match self {
            ComponentKind::Button => &["key"],
            ComponentKind::EffectAssignmentButton => &["effectUnit", "type"],
            ComponentKind::ShiftButton => &["target"],
            ComponentKind::RangeAwareEncoder => &["key", "bound"],
            ComponentKind::Trigger => &["inKey"],
            ComponentKind::EnumToggleButton => &["inKey", "maxValue"],
            ComponentKind::BackLoopButton => &["outKey"],
            ComponentKind::LoopEncoder => &["key"],
            ComponentKind::LoopMoveEncoder => &["inKey", "sizeControl"],
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown component type: {0}.")]
pub struct UnknownComponentKind(pub String);

impl FromStr for ComponentKind {
    type Err = UnknownComponentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownComponentKind(s.to_owned()))
    }
}

/// Press semantics of a button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonType {
    Push,
    Toggle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShiftButtonOptions {
    /// Owner of the shift flag toggled while the button is held.
    pub target: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RangeAwareEncoderOptions {
    pub key: String,
    /// The encoder sweeps `-bound..=bound`.
    pub bound: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TriggerOptions {
    pub in_key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ButtonOptions {
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnumToggleButtonOptions {
    pub in_key: String,
    /// Presses cycle the control through `0..=max_value`.
    pub max_value: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BackLoopButtonOptions {
    pub out_key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoopEncoderOptions {
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoopMoveEncoderOptions {
    pub in_key: String,
    /// Control whose current value is the step size per tick.
    pub size_control: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EffectAssignmentButtonOptions {
    pub effect_unit: u32,
    #[serde(rename = "type")]
    pub button_type: ButtonType,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    Button(ButtonOptions),
    EffectAssignmentButton(EffectAssignmentButtonOptions),
    ShiftButton(ShiftButtonOptions),
    RangeAwareEncoder(RangeAwareEncoderOptions),
    Trigger(TriggerOptions),
    EnumToggleButton(EnumToggleButtonOptions),
    BackLoopButton(BackLoopButtonOptions),
    LoopEncoder(LoopEncoderOptions),
    LoopMoveEncoder(LoopMoveEncoderOptions),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Button(_) => ComponentKind::Button,
            Component::EffectAssignmentButton(_) => ComponentKind::EffectAssignmentButton,
            Component::ShiftButton(_) => ComponentKind::ShiftButton,
            Component::RangeAwareEncoder(_) => ComponentKind::RangeAwareEncoder,
            Component::Trigger(_) => ComponentKind::Trigger,
            Component::EnumToggleButton(_) => ComponentKind::EnumToggleButton,
            Component::BackLoopButton(_) => ComponentKind::BackLoopButton,
            Component::LoopEncoder(_) => ComponentKind::LoopEncoder,
            Component::LoopMoveEncoder(_) => ComponentKind::LoopMoveEncoder,
        }
    }

    /// Builds the component from its untyped options map.
    /// Missing and unrecognized keys are both rejected.
    pub fn from_options(
        kind: ComponentKind,
        options: serde_yaml::Value,
    ) -> Result<Component, serde_yaml::Error> {
        use serde_yaml::from_value;

        Ok(match kind {
            ComponentKind::Button => Component::Button(from_value(options)?),
            ComponentKind::EffectAssignmentButton => {
                Component::EffectAssignmentButton(from_value(options)?)
            }
            ComponentKind::ShiftButton => Component::ShiftButton(from_value(options)?),
            ComponentKind::RangeAwareEncoder => Component::RangeAwareEncoder(from_value(options)?),
            ComponentKind::Trigger => Component::Trigger(from_value(options)?),
            ComponentKind::EnumToggleButton => Component::EnumToggleButton(from_value(options)?),
            ComponentKind::BackLoopButton => Component::BackLoopButton(from_value(options)?),
            ComponentKind::LoopEncoder => Component::LoopEncoder(from_value(options)?),
            ComponentKind::LoopMoveEncoder => Component::LoopMoveEncoder(from_value(options)?),
        })
    }

    pub fn options(&self) -> Result<serde_yaml::Value, serde_yaml::Error> {
        use serde_yaml::to_value;

        match self {
            Component::Button(o) => to_value(o),
            Component::EffectAssignmentButton(o) => to_value(o),
            Component::ShiftButton(o) => to_value(o),
            Component::RangeAwareEncoder(o) => to_value(o),
            Component::Trigger(o) => to_value(o),
            Component::EnumToggleButton(o) => to_value(o),
            Component::BackLoopButton(o) => to_value(o),
            Component::LoopEncoder(o) => to_value(o),
            Component::LoopMoveEncoder(o) => to_value(o),
        }
    }

    /// Software control this component primarily reads or writes, if any.
    pub fn control_key(&self) -> Option<&str> {
        match self {
            Component::Button(o) => Some(&o.key),
            Component::RangeAwareEncoder(o) => Some(&o.key),
            Component::LoopEncoder(o) => Some(&o.key),
            Component::Trigger(o) => Some(&o.in_key),
            Component::EnumToggleButton(o) => Some(&o.in_key),
            Component::LoopMoveEncoder(o) => Some(&o.in_key),
            Component::BackLoopButton(o) => Some(&o.out_key),
            Component::EffectAssignmentButton(_) | Component::ShiftButton(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> serde_yaml::Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.name().parse::<ComponentKind>().unwrap(), kind);
        }
        assert!("Fader".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn options_are_checked_per_kind() {
        let component = Component::from_options(
            ComponentKind::LoopMoveEncoder,
            yaml("{inKey: loop_move, sizeControl: beatjump_size}"),
        )
        .unwrap();
        assert_eq!(
            component,
            Component::LoopMoveEncoder(LoopMoveEncoderOptions {
                in_key: "loop_move".to_owned(),
                size_control: "beatjump_size".to_owned(),
            })
        );
        assert_eq!(component.control_key(), Some("loop_move"));
    }

    #[test]
    fn missing_option_is_rejected() {
        let err = Component::from_options(ComponentKind::EnumToggleButton, yaml("{inKey: x}"))
            .unwrap_err();
        assert!(err.to_string().contains("maxValue"), "{err}");
    }

    #[test]
    fn extraneous_option_is_rejected() {
        let err = Component::from_options(ComponentKind::Button, yaml("{key: reverse, bound: 6}"))
            .unwrap_err();
        assert!(err.to_string().contains("bound"), "{err}");
    }

    #[test]
    fn effect_assignment_button_type() {
        let component = Component::from_options(
            ComponentKind::EffectAssignmentButton,
            yaml("{effectUnit: 2, type: toggle}"),
        )
        .unwrap();
        assert_eq!(
            component,
            Component::EffectAssignmentButton(EffectAssignmentButtonOptions {
                effect_unit: 2,
                button_type: ButtonType::Toggle,
            })
        );
        assert!(Component::from_options(
            ComponentKind::EffectAssignmentButton,
            yaml("{effectUnit: 2, type: hold}"),
        )
        .is_err());
    }
}
