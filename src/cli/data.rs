use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::{
    app::AppState, core::backup, storage::blob_store::BlobStore, utils::time::date_to_key,
};

/// Command to write the combined backup document. The default file name
/// carries today's date so backups sort naturally.
pub async fn process_export_command(
    output: Option<PathBuf>,
    state: &AppState<impl BlobStore>,
) -> Result<()> {
    let path = output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "taptrack-backup-{}.json",
            date_to_key(state.today())
        ))
    });
    tokio::fs::write(&path, state.export())
        .await
        .with_context(|| format!("Failed to write backup to {path:?}"))?;
    println!("Exported backup to {}", path.display());
    Ok(())
}

/// Command to replace state from a backup file. Parsing happens before the
/// confirmation so a rejected file never prompts and never mutates anything.
pub async fn process_import_command(
    file: PathBuf,
    assume_yes: bool,
    state: &mut AppState<impl BlobStore>,
) -> Result<()> {
    let raw = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read {file:?}"))?;
    let parsed = backup::parse_document(&raw, state.settings())
        .context("The selected file is not a valid backup")?;

    if !assume_yes && !confirm("This will overwrite your current history. Are you sure?")? {
        println!("Import cancelled.");
        return Ok(());
    }

    state.apply_import(parsed).await?;
    println!("Data imported successfully.");
    Ok(())
}

pub async fn process_clear_command(
    assume_yes: bool,
    state: &mut AppState<impl BlobStore>,
) -> Result<()> {
    if !assume_yes
        && !confirm("Are you sure you want to delete all data? This cannot be undone.")?
    {
        println!("Clear cancelled.");
        return Ok(());
    }
    state.clear().await?;
    println!("All data deleted.");
    Ok(())
}

/// Destructive actions ask on the console unless --yes was passed.
fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;

    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
