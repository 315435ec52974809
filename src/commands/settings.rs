//! Shows or changes the singleton invoice settings.

use crate::{
    db::invoice_settings::InvoiceSettingsStore,
    libs::{messages::Message, view::View},
    msg_print, msg_success, msg_warning,
};
use anyhow::Result;
use clap::Args;

/// Without options the current settings are printed. Given options replace
/// their field and keep the others.
#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[arg(long)]
    hourly_rate: Option<f64>,
    #[arg(long)]
    recipient: Option<String>,
    #[arg(long)]
    sender: Option<String>,
}

pub fn cmd(args: SettingsArgs) -> Result<()> {
    let store = InvoiceSettingsStore::new()?;
    let mut settings = store.get()?;

    if args.hourly_rate.is_none() && args.recipient.is_none() && args.sender.is_none() {
        msg_print!(Message::SettingsHeader, true);
        View::settings(&settings);
        if settings.validate().is_err() {
            msg_warning!(Message::SettingsRateNotSet);
        }
        return Ok(());
    }

    if let Some(rate) = args.hourly_rate {
        settings.hourly_rate = rate;
    }
    if let Some(recipient) = args.recipient {
        settings.recipient = recipient;
    }
    if let Some(sender) = args.sender {
        settings.sender = sender;
    }

    let saved = store.set(&settings)?;
    msg_success!(Message::SettingsSaved);
    View::settings(&saved);
    Ok(())
}
