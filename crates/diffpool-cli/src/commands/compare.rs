//! Compare command.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use diffpool::CompareSession;

use crate::PairArgs;

pub fn run(pair: &PairArgs, json: Option<PathBuf>, csv: Option<PathBuf>) -> Result<()> {
    let session = CompareSession::new(pair.config());
    let report = session.run_comparison(&pair.reference, &pair.test).with_context(|| {
        format!(
            "Failed to compare {} against {}",
            pair.test.display(),
            pair.reference.display()
        )
    })?;

    let mut out = io::stdout().lock();
    report.write_text(&mut out)?;
    out.flush()?;

    if let Some(path) = json {
        report
            .write_json(&path)
            .with_context(|| format!("Failed to write JSON report: {}", path.display()))?;
        log::info!("JSON report written to {}", path.display());
    }

    if let Some(path) = csv {
        report
            .append_csv_row(&path)
            .with_context(|| format!("Failed to append CSV row: {}", path.display()))?;
        log::info!("CSV row appended to {}", path.display());
    }

    Ok(())
}
