use std::io::Write;

use atelier::{
    settings::{SettingsPatch, StoreSettings},
    storage::KeyValueStore,
    storefront::Storefront,
};
use clap::{Args, Subcommand};

use super::table;

#[derive(Debug, Args)]
pub(crate) struct SettingsCommand {
    #[command(subcommand)]
    command: SettingsSubcommand,
}

#[derive(Debug, Subcommand)]
enum SettingsSubcommand {
    /// Show the current settings
    Show,
    /// Change one setting
    Set {
        /// Setting name, e.g. `tax_rate`
        name: String,

        /// New value
        value: String,
    },
    /// Restore the default settings
    Reset,
}

pub(crate) fn run<S: KeyValueStore>(
    storefront: &mut Storefront<S>,
    command: SettingsCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let settings = match command.command {
        SettingsSubcommand::Show => storefront.settings().get(),
        SettingsSubcommand::Set { name, value } => storefront
            .settings_mut()
            .update(SettingsPatch::field(&name, &value)?)?,
        SettingsSubcommand::Reset => storefront.settings_mut().reset()?,
    };

    writeln!(out, "{}", settings_table(settings))?;

    Ok(())
}

fn settings_table(settings: &StoreSettings) -> tabled::Table {
    let rows = [
        ("store_name", settings.store_name.clone()),
        ("store_email", settings.store_email.clone()),
        ("store_phone", settings.store_phone.clone()),
        ("tax_rate", settings.tax_rate.to_string()),
        ("shipping_cost", settings.shipping_cost.to_string()),
        (
            "free_shipping_threshold",
            settings.free_shipping_threshold.to_string(),
        ),
        ("currency", settings.currency.clone()),
        ("theme", settings.theme.to_string()),
    ]
    .map(|(name, value)| [name.to_string(), value]);

    table(["Ajuste", "Valor"], rows)
}
