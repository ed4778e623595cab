//! Small helpers shared across the pipeline stages: progress reporting and
//! the one-time copy of the viewer's static assets into the output tree.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

pub fn progress_bar(
    quiet: bool,
    message: impl Into<Cow<'static, str>>,
    total: usize,
    unit: &str,
) -> ProgressBar {
    if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(total as u64);

        bar.set_style(
            ProgressStyle::with_template(&format!(
                "{{msg}} {{wide_bar}} {{human_pos}}/{{human_len}} {unit}"
            ))
            .unwrap(),
        );

        bar.set_message(message);

        bar
    }
}

/// Recursively copies the viewer's static template directory into the
/// output directory, leaving any existing tile/marker output alone.
pub fn copy_template(template: &Path, destination: &Path) -> Result<()> {
    fs::create_dir_all(destination)
        .with_context(|| format!("failed to create {}", destination.display()))?;

    for entry in fs::read_dir(template)
        .with_context(|| format!("failed to read {}", template.display()))?
    {
        let entry = entry?;
        let from = entry.path();
        let to = destination.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_template(&from, &to)?;
        } else {
            fs::copy(&from, &to)
                .with_context(|| format!("failed to copy {} to {}", from.display(), to.display()))?;
        }
    }

    Ok(())
}
