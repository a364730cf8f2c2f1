use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::mapping::components::{Component, ComponentKind};
use crate::mapping::model::{
    ComponentBinding, DeckConfig, EffectUnitConfig, LifecycleHook, MappingConfig,
};
use crate::mapping::validation::ConfigError;
use crate::midi::model::MidiAddress;

// YAML specific configuration

#[derive(Debug, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentBindingConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub midi: MidiAddress,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub shift: bool,
    #[serde(default = "empty_options")]
    pub options: serde_yaml::Value,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeckConfigYaml {
    pub deck_numbers: Vec<u32>,
    #[serde(default = "Vec::new")]
    pub components: Vec<ComponentBindingConfig>,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MappingConfigYaml {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<LifecycleHook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown: Option<LifecycleHook>,
    #[serde(default = "Vec::new")]
    pub decks: Vec<DeckConfigYaml>,
    #[serde(default = "Vec::new")]
    pub effect_units: Vec<EffectUnitConfig>,
}

fn empty_options() -> serde_yaml::Value {
    serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
}

// Parsed part - from configuration to application specific

pub fn parse(yaml: MappingConfigYaml) -> Result<MappingConfig, ConfigError> {
    let decks = yaml
        .decks
        .into_iter()
        .enumerate()
        .map(|(deck, deck_yaml)| parse_deck(deck, deck_yaml))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MappingConfig {
        init: yaml.init,
        shutdown: yaml.shutdown,
        decks,
        effect_units: yaml.effect_units,
    })
}

fn parse_deck(deck: usize, yaml: DeckConfigYaml) -> Result<DeckConfig, ConfigError> {
    let components = yaml
        .components
        .into_iter()
        .enumerate()
        .map(|(component, binding)| {
            let kind: ComponentKind =
                binding
                    .kind
                    .parse()
                    .map_err(|_| ConfigError::UnknownComponentType {
                        deck,
                        component,
                        type_name: binding.kind.clone(),
                    })?;
            let parsed = Component::from_options(kind, binding.options).map_err(|source| {
                ConfigError::InvalidOptions {
                    deck,
                    component,
                    kind,
                    source,
                }
            })?;
            Ok(ComponentBinding {
                component: parsed,
                midi: binding.midi,
                shift: binding.shift,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(DeckConfig {
        deck_numbers: yaml.deck_numbers,
        components,
    })
}

// Back to YAML, used to dump the built-in mapping

impl TryFrom<&MappingConfig> for MappingConfigYaml {
    type Error = serde_yaml::Error;

    fn try_from(config: &MappingConfig) -> Result<Self, Self::Error> {
        let decks = config
            .decks
            .iter()
            .map(|deck| {
                let components = deck
                    .components
                    .iter()
                    .map(|binding| {
                        Ok(ComponentBindingConfig {
                            kind: binding.component.kind().name().to_owned(),
                            midi: binding.midi,
                            shift: binding.shift,
                            options: binding.component.options()?,
                        })
                    })
                    .collect::<Result<Vec<_>, serde_yaml::Error>>()?;
                Ok(DeckConfigYaml {
                    deck_numbers: deck.deck_numbers.clone(),
                    components,
                })
            })
            .collect::<Result<Vec<_>, serde_yaml::Error>>()?;

        Ok(MappingConfigYaml {
            init: config.init,
            shutdown: config.shutdown,
            decks,
            effect_units: config.effect_units.clone(),
        })
    }
}

pub fn from_yaml_str(contents: &str) -> anyhow::Result<MappingConfig> {
    let yaml: MappingConfigYaml =
        serde_yaml::from_str(contents).context("Failed to parse YAML mapping")?;
    let config = parse(yaml)?;
    config.validate()?;
    Ok(config)
}

pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> anyhow::Result<MappingConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read mapping file: {}", path.display()))?;
    let config = from_yaml_str(&contents)
        .with_context(|| format!("Invalid mapping file: {}", path.display()))?;
    info!(
        path = %path.display(),
        decks = config.decks.len(),
        bindings = config.binding_count(),
        effect_units = config.effect_units.len(),
        "mapping loaded"
    );
    Ok(config)
}

pub fn to_yaml_string(config: &MappingConfig) -> anyhow::Result<String> {
    let yaml = MappingConfigYaml::try_from(config).context("Failed to convert mapping")?;
    serde_yaml::to_string(&yaml).context("Failed to serialize mapping to YAML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::bcr2000::Bcr2000Layout;
    use crate::hardware::Preset;
    use crate::mapping::components::ButtonOptions;
    use crate::mapping::user_config::user_config;
    use std::io::Write;

    const DECK_YAML: &str = r#"
init: { action: selectPreset, preset: 1 }
shutdown: { action: selectPreset, preset: 31 }
decks:
  - deckNumbers: [1]
    components:
      - { type: ShiftButton, midi: [0xB0, 0x44], options: { target: GenericMidiController } }
      - { type: Button, midi: [0xB0, 0x43], options: { key: reverse } }
      - { type: Button, midi: [0xB0, 0x43], shift: true, options: { key: reverseroll } }
effectUnits:
  - unitNumbers: [1, 3]
    components:
      effectFocusButton: [0xB0, 0x49]
      enableButtons:
        1: [0xB0, 0x4A]
        2: [0xB0, 0x4B]
      dryWetKnob: [0xB0, 0x51]
"#;

    #[test]
    fn parses_deck_and_effect_unit_sections() {
        let config = from_yaml_str(DECK_YAML).unwrap();

        assert_eq!(
            config.init,
            Some(LifecycleHook::select_preset(Preset::new(1).unwrap()))
        );
        assert_eq!(config.decks.len(), 1);
        let deck = &config.decks[0];
        assert_eq!(deck.deck_numbers, vec![1]);
        assert_eq!(deck.components.len(), 3);
        assert_eq!(
            deck.components[2],
            ComponentBinding {
                component: Component::Button(ButtonOptions {
                    key: "reverseroll".to_owned()
                }),
                midi: deck.components[1].midi,
                shift: true,
            }
        );
        assert!(!deck.components[1].shift);

        let unit = &config.effect_units[0];
        assert_eq!(unit.unit_numbers, vec![1, 3]);
        assert_eq!(unit.components.enable_buttons.len(), 2);
        assert!(unit.components.knobs.is_empty());
    }

    #[test]
    fn sections_may_be_omitted() {
        let config = from_yaml_str("{}").unwrap();
        assert_eq!(config, MappingConfig::default());
    }

    #[test]
    fn unknown_type_names_the_binding() {
        let err = from_yaml_str(
            "decks: [{deckNumbers: [1], components: [{type: Fader, midi: [0xB0, 1], options: {key: x}}]}]",
        )
        .unwrap_err();
        let err = err.downcast::<ConfigError>().unwrap();
        assert!(matches!(
            err,
            ConfigError::UnknownComponentType { deck: 0, component: 0, ref type_name } if type_name == "Fader"
        ));
    }

    #[test]
    fn option_mismatch_names_the_binding() {
        let err = from_yaml_str(
            "decks: [{deckNumbers: [2], components: [{type: Trigger, midi: [0xB0, 1], options: {key: x}}]}]",
        )
        .unwrap_err();
        let err = err.downcast::<ConfigError>().unwrap();
        assert!(matches!(
            err,
            ConfigError::InvalidOptions {
                deck: 0,
                component: 0,
                kind: ComponentKind::Trigger,
                ..
            }
        ));
    }

    #[test]
    fn missing_options_are_reported() {
        let err = from_yaml_str(
            "decks: [{deckNumbers: [1], components: [{type: LoopEncoder, midi: [0xB0, 1]}]}]",
        )
        .unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn unknown_effect_unit_role_is_rejected() {
        assert!(from_yaml_str(
            "effectUnits: [{unitNumbers: [1], components: {mixButton: [0xB0, 1]}}]"
        )
        .is_err());
    }

    #[test]
    fn loaded_configs_are_validated() {
        let err = from_yaml_str(
            "effectUnits: [{unitNumbers: [1], components: {}}, {unitNumbers: [1], components: {}}]",
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast::<ConfigError>().unwrap(),
            ConfigError::DuplicateUnitNumber { unit: 1, number: 1 }
        ));
    }

    #[test]
    fn binding_sets_sharing_a_deck_cannot_rebind_a_control() {
        let yaml = r#"
decks:
  - deckNumbers: [1]
    components:
      - {type: Button, midi: [0xB0, 0x43], options: {key: reverse}}
  - deckNumbers: [1, 2]
    components:
      - {type: Button, midi: [0xB0, 0x43], options: {key: keylock}}
"#;
        let err = from_yaml_str(yaml).unwrap_err();
        assert!(matches!(
            err.downcast::<ConfigError>().unwrap(),
            ConfigError::ConflictingBinding {
                deck_number: 1,
                shift: false,
                ..
            }
        ));
    }

    #[test]
    fn builtin_mapping_survives_yaml_dump() {
        let builtin = user_config(&Bcr2000Layout::FACTORY);
        let dumped = to_yaml_string(&builtin).unwrap();
        assert_eq!(from_yaml_str(&dumped).unwrap(), builtin);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DECK_YAML.as_bytes()).unwrap();

        let config = load_from_yaml(file.path()).unwrap();
        assert_eq!(config.binding_count(), 3);
        assert!(load_from_yaml(file.path().with_extension("missing")).is_err());
    }
}
