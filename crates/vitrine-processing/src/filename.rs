//! Unique, meaning-free filenames for stored assets.

use chrono::Utc;
use uuid::Uuid;

/// Generate a collision-free filename stem: `{uuid_v4}_{unix_seconds}`.
///
/// The name never derives from the client-supplied filename, so traversal
/// sequences or encoding oddities in user input cannot reach storage paths.
/// Uniqueness holds across concurrent requests from multiple processes.
pub fn generate_filename() -> String {
    format!("{}_{}", Uuid::new_v4(), Utc::now().timestamp())
}
