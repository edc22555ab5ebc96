pub mod error;
pub mod fetch;
pub mod ipa;
pub mod pipeline;
pub mod profile;
pub mod progress;
pub mod signer;
pub mod staging;
pub mod workspace;

pub use error::Error;
pub use fetch::{FetchClient, FetchOutcome};
pub use ipa::{extract_archive, locate_app_bundle, repackage, validate_archive};
pub use pipeline::{ResignRequest, Resigner};
pub use progress::{NullProgress, Progress};
pub use signer::{BundleSigner, CommandSigner, SignCompletion, SignRequest};
pub use staging::{stage_inputs, StagedInputs};
pub use workspace::Workspace;

pub type Result<T> = std::result::Result<T, Error>;
