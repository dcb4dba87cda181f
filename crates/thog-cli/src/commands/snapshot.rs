//! Point-in-time backups: `thog snapshot`.

use anyhow::Result;
use chrono::Utc;
use thog_store::Store;

/// Writes a timestamped copy of the data file and reports its path.
pub fn run(store: &Store) -> Result<()> {
    let path = store.snapshot(Utc::now())?;
    println!("backup created: {}", path.display());
    Ok(())
}
