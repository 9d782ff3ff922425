//! Market snapshots stored as JSON files, for offline planning and exports.

use std::{fs, io, path::Path};

use thiserror::Error;
use tracing::{debug, info};

use super::rows::SnapshotRows;

#[derive(Debug, Error)]
pub enum SnapshotFileError {
    #[error("failed to access snapshot file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid snapshot file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load snapshot rows from a JSON file.
pub fn load_snapshot_file(path: &Path) -> Result<SnapshotRows, SnapshotFileError> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotFileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let rows: SnapshotRows =
        serde_json::from_str(&content).map_err(|source| SnapshotFileError::Json {
            path: path.display().to_string(),
            source,
        })?;

    debug!(
        path = %path.display(),
        cities = rows.cities.len(),
        products = rows.products.len(),
        edges = rows.edges.len(),
        prices = rows.prices.len(),
        "loaded snapshot file"
    );
    Ok(rows)
}

/// Save snapshot rows to a JSON file, creating parent directories as needed.
pub fn save_snapshot_file(path: &Path, rows: &SnapshotRows) -> Result<(), SnapshotFileError> {
    let io_err = |source: io::Error| SnapshotFileError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = serde_json::to_string_pretty(rows).map_err(|source| SnapshotFileError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, content).map_err(io_err)?;

    info!(
        path = %path.display(),
        cities = rows.cities.len(),
        prices = rows.prices.len(),
        "saved snapshot file"
    );
    Ok(())
}
