//! Imports one or more CSV exports into the store.
//!
//! Files are processed independently: a file that cannot be read or parsed
//! is reported and skipped, the others are still imported. The command fails
//! if any file failed.

use crate::{
    libs::{config::Config, import::Importer, messages::Message},
    msg_bail_anyhow, msg_error, msg_info, msg_success, msg_warning,
};
use anyhow::Result;
use clap::Args;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// CSV files to import
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Timezone of the timestamps, overriding the configured one
    #[arg(short, long)]
    timezone: Option<String>,
}

pub fn cmd(args: ImportArgs) -> Result<()> {
    let config = Config::read()?;
    let timezone = args.timezone.unwrap_or(config.import.timezone);
    let mut importer = Importer::new()?;
    let mut failed = 0;

    for path in &args.files {
        let path_label = path.display().to_string();
        msg_info!(Message::ImportStarted(path_label.clone()));

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                msg_error!(Message::ImportFileReadFailed(path_label, e.to_string()));
                failed += 1;
                continue;
            }
        };

        let file_name = path.file_name().map(|name| name.to_string_lossy().to_string()).unwrap_or_else(|| path_label.clone());

        match importer.import(&file_name, &contents, &config.import.columns, &timezone) {
            Ok(result) => {
                if result.new.is_empty() && result.existing.is_empty() {
                    msg_warning!(Message::ImportNoRows(path_label));
                }
                msg_success!(Message::ImportCompleted {
                    csv_import_id: result.csv_import.id.unwrap_or(0),
                    new: result.new.len(),
                    existing: result.existing.len(),
                });
            }
            Err(e) => {
                msg_error!(format!("{}: {}", path_label, e));
                failed += 1;
            }
        }
    }

    if failed > 0 {
        msg_bail_anyhow!(format!("{} of {} file(s) failed to import", failed, args.files.len()));
    }
    Ok(())
}
