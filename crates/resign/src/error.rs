//! Error types for resigning operations.
//!
//! This module defines the [`enum@Error`] enum covering all failure cases in
//! the resign pipeline: filesystem I/O, archive codec failures, structural
//! validation of the extracted payload, and errors propagated from the
//! external signing primitive.
//!
//! # See Also
//!
//! - [`crate::Result`] - Convenience type alias using this error

use std::path::PathBuf;
use thiserror::Error;

/// Error type for resigning operations.
///
/// All public functions in this crate return [`crate::Result<T>`], which uses
/// this error type. Match on variants to handle specific failure cases.
///
/// # Examples
///
/// ```no_run
/// use resign::{locate_app_bundle, Error};
///
/// match locate_app_bundle("work/Payload") {
///     Ok(app) => println!("found {}", app.display()),
///     Err(Error::MissingPayload(dir)) => eprintln!("no Payload at {}", dir.display()),
///     Err(e) => eprintln!("error: {e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Occurs while staging inputs, writing extracted entries, or copying
    /// the finished archive to its durable location.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive operation failed.
    ///
    /// The input archive is corrupt or unreadable, or the output archive
    /// could not be written. See [`crate::ipa`].
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Property list parsing failed.
    #[error("Plist error: {0}")]
    Plist(#[from] plist::Error),

    /// The extracted archive has no `Payload` directory at its root.
    #[error("No Payload directory at {0}")]
    MissingPayload(PathBuf),

    /// The `Payload` directory contains no `.app` bundle.
    #[error("No .app bundle inside {0}")]
    MissingAppBundle(PathBuf),

    /// The external signing primitive reported a failure.
    ///
    /// The message is propagated verbatim from the primitive.
    #[error("Signing failed: {0}")]
    Signing(String),
}
