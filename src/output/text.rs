use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use comfy_table::{Table, presets::ASCII_BORDERS_ONLY_CONDENSED};

use super::OutputFormatter;
use crate::prune::{ResourceList, total_items};

pub struct TextFormatter;

impl TextFormatter {
    fn format_at(results: &[ResourceList], header: &str, now: DateTime<Utc>) -> String {
        let mut out = vec![header.to_string()];

        for list in results {
            let title = list.resource_type().display_name();
            out.push(String::new());
            out.push(format!("{}:", title));

            let mut table = Table::new();
            table.load_preset(ASCII_BORDERS_ONLY_CONDENSED);
            table.set_header(vec!["NAMESPACE", "NAME", "AGE"]);
            for item in list.items() {
                table.add_row(vec![
                    item.namespace.clone(),
                    item.name.clone(),
                    format_age(now - item.created_at),
                ]);
            }
            out.push(table.to_string());
        }

        out.push(String::new());
        out.push(format!("Total: {} resources", total_items(results)));
        out.join("\n")
    }
}

impl OutputFormatter for TextFormatter {
    fn format(results: &[ResourceList], header: &str) -> Result<String> {
        Ok(Self::format_at(results, header, Utc::now()))
    }
}

/// Human-readable age rounded to the minute: `3d4h`, `5h12m` or `7m`
pub fn format_age(age: Duration) -> String {
    let minutes = (age.num_seconds().max(0) + 30) / 60;
    let days = minutes / (24 * 60);
    let hours = (minutes % (24 * 60)) / 60;
    let mins = minutes % 60;

    if days > 0 {
        format!("{}d{}h", days, hours)
    } else if hours > 0 {
        format!("{}h{}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}
