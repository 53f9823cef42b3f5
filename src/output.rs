use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::circle::Circle;
use crate::settings::Settings;
use crate::stats::PackingSummary;


pub const CIRCLES_FILE: &str = "circles.dat";
pub const SUMMARY_FILE: &str = "summary.json";
pub const SETTINGS_FILE: &str = "settings.toml";

/// Write the circles as `x y radius` rows, in packing order.
pub fn write_circles(path: &Path, circles: &[Circle]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);

    for circle in circles {
        let center = circle.center();
        writeln!(writer, "{} {} {}", center.x, center.y, circle.radius())?;
    }
    writer.flush()?;

    Ok(())
}

pub fn write_summary(path: &Path, summary: &PackingSummary) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .with_context(|| format!("Failed to write summary to {:?}", path))?;
    Ok(())
}

/// Write the settings that produced a run, so it can be repeated with `--config`.
pub fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    let text = toml::to_string(settings).context("Failed to serialize settings")?;
    fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

/// Write all results of a run to `settings.directory`.
pub fn writeup(settings: &Settings, circles: &[Circle], summary: &PackingSummary) -> Result<()> {
    let directory = &settings.directory;
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory {:?}", directory))?;

    write_circles(&directory.join(CIRCLES_FILE), circles)?;
    write_summary(&directory.join(SUMMARY_FILE), summary)?;
    write_settings(&directory.join(SETTINGS_FILE), settings)?;

    log::info!("results written to {:?}", directory);
    Ok(())
}
