use anyhow::{Context, Result};
use console::Term;
use std::io::{BufRead, stdin};

/// Ask before deleting `count` resources. Only `y` or `yes` confirm.
pub fn confirm_deletion(count: usize) -> Result<bool> {
    let term = Term::stdout();
    term.write_str(&format!(
        "\nAre you sure you want to delete these {} resources? (y/N): ",
        count
    ))
    .context("Failed to write prompt")?;
    term.flush().context("Failed to write prompt")?;
    read_answer(stdin().lock())
}

/// Read one answer line; end of input cancels
fn read_answer(mut reader: impl BufRead) -> Result<bool> {
    let mut response = String::new();
    reader
        .read_line(&mut response)
        .context("Error reading input")?;
    Ok(is_affirmative(&response))
}

fn is_affirmative(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
}
