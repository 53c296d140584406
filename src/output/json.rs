use anyhow::{Context, Result};

use super::OutputFormatter;
use crate::prune::ResourceList;

pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format(results: &[ResourceList], _header: &str) -> Result<String> {
        serde_json::to_string_pretty(results).context("Failed to serialize results to JSON")
    }
}
