mod json;
mod text;
mod yaml;

pub use json::JsonFormatter;
pub use text::TextFormatter;
pub use yaml::YamlFormatter;

use anyhow::Result;

use crate::cli::OutputFormat;
use crate::prune::ResourceList;

/// Printed when no resource type has qualifying items
pub const NO_RESULTS: &str = "No unused resources found.";

pub trait OutputFormatter {
    fn format(results: &[ResourceList], header: &str) -> Result<String>;
}

/// Render classification results in the requested format
pub fn render(results: &[ResourceList], format: &OutputFormat, header: &str) -> Result<String> {
    if results.is_empty() {
        return Ok(NO_RESULTS.to_string());
    }
    match format {
        OutputFormat::Text => TextFormatter::format(results, header),
        OutputFormat::Json => JsonFormatter::format(results, header),
        OutputFormat::Yaml => YamlFormatter::format(results, header),
    }
}
