//! Histogram command.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use diffpool::{CompareSession, write_histogram_csv};

use crate::PairArgs;

pub fn run(pair: &PairArgs, output: Option<PathBuf>) -> Result<()> {
    let session = CompareSession::new(pair.config());
    let pooled = session.pool_files(&pair.reference, &pair.test).with_context(|| {
        format!(
            "Failed to pool {} against {}",
            pair.test.display(),
            pair.reference.display()
        )
    })?;

    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_histogram_csv(pooled.pool.bins(), file)?;
            log::info!("{} bins written to {}", pooled.pool.bin_count(), path.display());
        }
        None => write_histogram_csv(pooled.pool.bins(), io::stdout().lock())?,
    }

    Ok(())
}
