//! CSV reports for a finished market day
//!
//! Two files per session, named by a shared local timestamp:
//!
//! - `setup_<stamp>.csv` describes the buyers as they entered
//! - `log_<stamp>.csv` lists every lot in settlement order

use std::fs;
use std::path::{Path, PathBuf};

use afslag_types::{SetupRecord, TransactionRecord};
use chrono::Local;

use crate::error::Result;

/// Where the two report files landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub setup: PathBuf,
    pub log: PathBuf,
}

/// Write both report files under `dir`, creating it if needed
///
/// Empty fields stand for "no winner" and "no sale price" on
/// discarded lots.
pub fn write_reports(
    dir: &Path,
    setup: &[SetupRecord],
    transactions: &[TransactionRecord],
) -> Result<ReportPaths> {
    fs::create_dir_all(dir)?;
    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let paths = ReportPaths {
        setup: dir.join(format!("setup_{stamp}.csv")),
        log: dir.join(format!("log_{stamp}.csv")),
    };

    let mut writer = csv::Writer::from_path(&paths.setup)?;
    writer.write_record(["buyer", "personality", "preference", "budget"])?;
    for record in setup {
        writer.write_record([
            record.buyer_id.to_string(),
            record.personality.clone(),
            record.preference.to_string(),
            record.starting_budget.to_string(),
        ])?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(&paths.log)?;
    writer.write_record(["seller", "lot", "item", "sale_price", "winner"])?;
    for record in transactions {
        writer.write_record([
            record.seller_id.to_string(),
            record.lot_id.to_string(),
            record.kind.to_string(),
            record
                .sale_price
                .map(|price| price.to_string())
                .unwrap_or_default(),
            record
                .winner
                .as_ref()
                .map(|winner| winner.to_string())
                .unwrap_or_default(),
        ])?;
    }
    writer.flush()?;

    tracing::info!(
        setup = %paths.setup.display(),
        log = %paths.log.display(),
        buyers = setup.len(),
        lots = transactions.len(),
        "Reports written"
    );
    Ok(paths)
}
