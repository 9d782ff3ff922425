//! Where market snapshots come from: the hosted database, JSON files, or the demo seed.

pub mod rows;
pub mod seed;
pub mod snapshot_file;
pub mod supabase;

pub use rows::SnapshotRows;
pub use snapshot_file::{load_snapshot_file, save_snapshot_file, SnapshotFileError};
pub use supabase::{CacheStatus, CachedPayload, SupabaseClient, SupabaseError};
