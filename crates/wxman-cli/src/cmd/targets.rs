//! Targets command

use std::path::Path;

use anyhow::Result;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use wxman_schema::PlatformEntry;

use super::load_table;

/// List every release and platform in the table.
pub fn targets(releases: Option<&Path>) -> Result<()> {
    let table = load_table(releases)?;

    let mut out = Table::new();
    out.load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["version", "target", "status", "archive"]);

    let mut channels: Vec<_> = table.channels().collect();
    channels.sort_by(|a, b| b.version.cmp(&a.version));

    for channel in channels {
        for (platform, entry) in channel.entries() {
            let (status, detail) = match entry {
                PlatformEntry::Artifact(artifact) => (
                    Cell::new("supported").fg(Color::Green),
                    artifact.file_name().to_string(),
                ),
                PlatformEntry::Unsupported { reason } => {
                    (Cell::new("unsupported").fg(Color::Yellow), reason.clone())
                }
            };
            out.add_row(vec![
                Cell::new(&channel.version),
                Cell::new(platform.target_triple()),
                status,
                Cell::new(detail),
            ]);
        }
    }

    println!("{out}");
    Ok(())
}
