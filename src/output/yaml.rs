use anyhow::{Context, Result};

use super::OutputFormatter;
use crate::prune::ResourceList;

pub struct YamlFormatter;

impl OutputFormatter for YamlFormatter {
    fn format(results: &[ResourceList], _header: &str) -> Result<String> {
        serde_yaml::to_string(results).context("Failed to serialize results to YAML")
    }
}
