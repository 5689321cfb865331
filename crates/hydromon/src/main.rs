//! `hydromon` - CLI for the hydroponic monitoring record keeper
//!
//! This binary maps user commands onto the entry service: listing and
//! filtering entries, recording new observations (with optional photos),
//! deleting entries, aggregate statistics, CSV export, and configuration
//! inspection.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;

use anyhow::Context;
use clap::Parser;

use hydromon::cli::{
    self, AddCommand, Cli, Command, ConfigCommand, DeleteCommand, ExportCommand, ListCommand,
    OutputFormat, StatsCommand,
};
use hydromon::photo::PhotoPayload;
use hydromon::{init_logging, Config, Entry, EntryService, EntryStore, NewEntry, PhotoStore, PlantType};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Add(cmd) => handle_add(&config, &cmd),
        Command::Delete(cmd) => handle_delete(&config, &cmd),
        Command::Stats(cmd) => handle_stats(&config, &cmd),
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

/// Open the stores the service needs, per the loaded configuration.
fn open_service(config: &Config) -> anyhow::Result<EntryService> {
    let store = EntryStore::open(config.database_path())?;
    let photos = PhotoStore::open(config.upload_dir(), config.upload.max_photo_bytes)?;
    Ok(EntryService::new(store, photos))
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let service = open_service(config)?;

    let start = cmd.from.as_deref().map(cli::parse_date).transpose()?;
    let end = cmd.to.as_deref().map(cli::parse_date).transpose()?;

    let plant = PlantType::from(cmd.plant);
    let entries = service.filter(plant, start, end)?;

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Table => print_entry_table(plant, &entries),
    }
    Ok(())
}

fn print_entry_table(plant: PlantType, entries: &[Entry]) {
    if entries.is_empty() {
        println!("No entries for {plant}.");
        return;
    }

    println!(
        "{:<6} {:<12} {:<10} {:<6} {:<28} NOTES",
        "ID", "DATE", "EC", "pH", "PHOTO"
    );
    for entry in entries {
        println!(
            "{:<6} {:<12} {:<10} {:<6} {:<28} {}",
            entry.id,
            entry.date.format("%Y-%m-%d"),
            entry.ec,
            entry.ph,
            entry.photo_ref.as_deref().unwrap_or("-"),
            entry.notes,
        );
    }
    println!();
    println!(
        "{} entr{} for {plant}",
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" }
    );
}

fn handle_add(config: &Config, cmd: &AddCommand) -> anyhow::Result<()> {
    let service = open_service(config)?;

    let photo = match (&cmd.photo, &cmd.photo_data) {
        (Some(path), _) => Some(read_photo_file(path)?),
        (None, Some(data)) => Some(PhotoPayload::DataUrl(data.clone())),
        (None, None) => None,
    };

    let candidate = NewEntry {
        plant_type: Some(PlantType::from(cmd.plant).to_string()),
        date: Some(cli::parse_date(&cmd.date)?),
        ec: Some(cmd.ec),
        ph: Some(cmd.ph),
        notes: cmd.notes.clone(),
    };

    let entry = service.create(&candidate, photo.as_ref())?;

    println!(
        "Recorded entry {} for {} on {}",
        entry.id,
        entry.plant_type,
        entry.date.format("%Y-%m-%d")
    );
    if let Some(reference) = &entry.photo_ref {
        println!("Photo stored as {reference}");
    }
    Ok(())
}

/// Build a file payload from a path on disk.
fn read_photo_file(path: &Path) -> anyhow::Result<PhotoPayload> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read photo file {}", path.display()))?;

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("photo")
        .to_string();

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let content_type = match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        // Let the upload policy reject it with a proper message.
        _ => "application/octet-stream",
    };

    Ok(PhotoPayload::File {
        filename,
        content_type: content_type.to_string(),
        bytes,
    })
}

fn handle_delete(config: &Config, cmd: &DeleteCommand) -> anyhow::Result<()> {
    let service = open_service(config)?;
    service.delete(cmd.id)?;
    println!("Deleted entry {}", cmd.id);
    Ok(())
}

fn handle_stats(config: &Config, cmd: &StatsCommand) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let plant = PlantType::from(cmd.plant);
    let analytics = service.analytics(plant)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&analytics)?);
    } else {
        println!("Statistics for {plant}");
        println!("-------------------");
        println!("Entries:  {}", analytics.total_entries);
        println!("Avg EC:   {:.2} μS/cm", analytics.avg_ec);
        println!("Avg pH:   {:.2}", analytics.avg_ph);
    }
    Ok(())
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let export = service.export(PlantType::from(cmd.plant))?;

    match &cmd.output {
        Some(path) if path.as_os_str() == "-" => println!("{}", export.content),
        Some(path) => {
            std::fs::write(path, &export.content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => {
            std::fs::write(&export.filename, &export.content)
                .with_context(|| format!("failed to write {}", export.filename))?;
            println!("Exported to {}", export.filename);
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:   {}", config.database_path().display());
                println!();
                println!("[Upload]");
                println!("  Upload dir:      {}", config.upload_dir().display());
                println!("  Max photo bytes: {}", config.upload.max_photo_bytes);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
