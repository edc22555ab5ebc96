//! IPA archive handling.
//!
//! Provides extraction into a working directory, discovery of the `.app`
//! bundle inside `Payload/`, and repacking of the signed tree into a fresh
//! archive.

pub mod bundle;
pub mod extract;
pub mod repack;

pub use bundle::locate_app_bundle;
pub use extract::{extract_archive, validate_archive};
pub use repack::repackage;
