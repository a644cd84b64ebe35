//! Optional on-disk mirror of the published snapshot.

use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::model::Snapshot;

/// Writes the snapshot as JSON, atomically.
///
/// The bytes land in a sibling temp file first and are renamed over the
/// target, so a reader tailing the file never sees a torn write.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_vec(snapshot)?;
    debug!(path = %path.display(), bytes = json.len(), "Writing snapshot mirror");

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &json)?;
    fs::rename(&tmp, path)?;

    Ok(())
}
