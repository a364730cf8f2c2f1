//! Shows, validates and applies the BCR2000 DJ mapping.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use generic_midi_mapping::configuration;
use generic_midi_mapping::hardware::bcr2000::{Bcr2000, Bcr2000Layout};
use generic_midi_mapping::mapping::model::MappingConfig;
use generic_midi_mapping::midi::controller::midir::MidirBased;
use generic_midi_mapping::midi::controller::stubs::JustPrint;
use generic_midi_mapping::midi::model::{DataByte, MidiAddress, Status};
use generic_midi_mapping::midi::registry::inmem::ReadOnlyMapBindingRegistry;
use generic_midi_mapping::midi::registry::model::{BindingKey, BindingRegistry};
use generic_midi_mapping::user_config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML mapping to use instead of the built-in BCR2000 table
    #[arg(short, long, env = "MAPPING_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the mapping as YAML
    Show,
    /// Check the mapping and print a summary
    Validate,
    /// Resolve what a physical control is bound to
    Lookup {
        #[arg(long, default_value_t = 1)]
        deck: u32,
        /// Status byte, e.g. 0xB0
        #[arg(long, value_parser = parse_byte, default_value = "0xB0")]
        status: u8,
        /// First data byte (controller number), e.g. 0x43
        #[arg(value_parser = parse_byte)]
        data: u8,
        #[arg(long)]
        shift: bool,
    },
    /// Run the init hook against the controller
    Init {
        #[command(flatten)]
        device: DeviceArgs,
    },
    /// Run the shutdown hook against the controller
    Shutdown {
        #[command(flatten)]
        device: DeviceArgs,
    },
    /// List MIDI output ports
    ListPorts,
}

#[derive(clap::Args, Debug)]
struct DeviceArgs {
    /// Part of the MIDI output port name
    #[arg(long, env = "MIDI_PORT", default_value = "BCR2000")]
    port: String,

    /// Print the messages instead of sending them
    #[arg(long)]
    dry_run: bool,
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("{s}: {e}"))
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level).context("Invalid log level")?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}

fn load_mapping(path: Option<&PathBuf>) -> anyhow::Result<MappingConfig> {
    match path {
        Some(path) => configuration::load_from_yaml(path),
        None => {
            let config = user_config(&Bcr2000Layout::FACTORY);
            config.validate()?;
            info!("using built-in BCR2000 mapping");
            Ok(config)
        }
    }
}

enum Hook {
    Init,
    Shutdown,
}

fn run_hook(mapping: &MappingConfig, hook: Hook, device: &DeviceArgs) -> anyhow::Result<()> {
    let run = |selector: &dyn generic_midi_mapping::hardware::PresetSelector| match hook {
        Hook::Init => mapping.init(selector),
        Hook::Shutdown => mapping.shutdown(selector),
    };

    if device.dry_run {
        run(&Bcr2000::new(JustPrint));
    } else {
        let controller = Bcr2000::new(MidirBased::new(&device.port)?);
        run(&controller);
        controller.into_sender().flush_and_close();
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    if let Command::ListPorts = args.command {
        for port in MidirBased::list_output_ports()? {
            println!("{port}");
        }
        return Ok(());
    }

    let mapping = load_mapping(args.config.as_ref())?;

    match args.command {
        Command::Show => print!("{}", configuration::to_yaml_string(&mapping)?),
        Command::Validate => {
            println!(
                "OK: {} deck binding set(s), {} binding(s), {} effect unit group(s)",
                mapping.decks.len(),
                mapping.binding_count(),
                mapping.effect_units.len()
            );
        }
        Command::Lookup {
            deck,
            status,
            data,
            shift,
        } => {
            let address = MidiAddress(
                Status::from_u8(status).context("Status byte must be 0x80 or above")?,
                DataByte::from_u8(data).context("Data byte must be below 0x80")?,
            );
            let registry = ReadOnlyMapBindingRegistry::new(&mapping);
            let key = BindingKey {
                deck,
                address,
                shift,
            };
            match registry.get(&key) {
                Some(component) => println!("deck {deck} {address} shift={shift}: {component:?}"),
                None => println!("deck {deck} {address} shift={shift}: unbound"),
            }
            for binding in registry.effect_unit_roles(&address) {
                println!("effect unit {}: {:?}", binding.unit, binding.role);
            }
        }
        Command::Init { device } => run_hook(&mapping, Hook::Init, &device)?,
        Command::Shutdown { device } => run_hook(&mapping, Hook::Shutdown, &device)?,
        Command::ListPorts => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_parse_as_hex_or_decimal() {
        assert_eq!(parse_byte("0xB0"), Ok(0xB0));
        assert_eq!(parse_byte("67"), Ok(67));
        assert!(parse_byte("0x1FF").is_err());
    }

    #[test]
    fn cli_arguments_are_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn lookup_parses_shift_flag() {
        let args =
            Args::try_parse_from(["generic-midi-mapping", "lookup", "0x43", "--shift"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Lookup {
                deck: 1,
                status: 0xB0,
                data: 0x43,
                shift: true
            }
        ));
    }
}
