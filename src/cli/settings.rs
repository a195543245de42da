use anyhow::Result;
use clap::Subcommand;

use crate::{
    app::AppState,
    core::settings::{Settings, SettingsPatch},
    storage::blob_store::BlobStore,
    utils::units::format_units,
};

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    #[command(about = "Show the current settings")]
    Show,
    #[command(about = "Change the conversion settings")]
    Set {
        #[arg(long, conflicts_with = "disable", help = "Turn unit conversion on")]
        enable: bool,
        #[arg(long, help = "Turn unit conversion off")]
        disable: bool,
        #[arg(long, help = "Units counted per tap. Values below 0.1 are raised to it")]
        rate: Option<f64>,
        #[arg(long, help = "Name of the converted unit, e.g. Steps or Reps")]
        label: Option<String>,
    },
}

pub async fn process_settings_command(
    command: SettingsCommands,
    state: &mut AppState<impl BlobStore>,
) -> Result<()> {
    match command {
        SettingsCommands::Show => {
            print_settings(state.settings());
            Ok(())
        }
        SettingsCommands::Set {
            enable,
            disable,
            rate,
            label,
        } => {
            let patch = SettingsPatch {
                enable_conversion: match (enable, disable) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                conversion_rate: rate,
                conversion_label: label,
            };
            let updated = state.update_settings(patch).await?;
            print_settings(updated);
            Ok(())
        }
    }
}

fn print_settings(settings: &Settings) {
    if settings.enable_conversion {
        println!("Conversion  enabled");
        println!(
            "Rate        {} {} per tap",
            format_units(settings.conversion_rate),
            settings.conversion_label
        );
    } else {
        println!("Conversion  disabled");
    }
}
