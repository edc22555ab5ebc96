//! The resign pipeline.
//!
//! One job: stage the caller's files into an isolated workspace, extract the
//! archive, locate the app bundle, hand it to the signing primitive, repack,
//! and publish the result. Steps run strictly in that order and fail fast;
//! the workspace is torn down on every exit path because [`Workspace`] cleans
//! up on drop.

use crate::ipa::{extract_archive, locate_app_bundle, repackage, validate_archive};
use crate::progress::Progress;
use crate::signer::{sign_bundle, BundleSigner};
use crate::staging::stage_inputs;
use crate::workspace::Workspace;
use crate::Result;
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// One resign job: the caller's three files plus the key passphrase.
pub struct ResignRequest {
    /// Archive to resign.
    pub ipa: PathBuf,
    /// PKCS#12 key container.
    pub p12: PathBuf,
    /// Provisioning profile.
    pub profile: PathBuf,
    /// Passphrase for the key container.
    pub password: SecretString,
}

/// Resigning entry point.
///
/// Holds the injected signing primitive and the two stable locations: where
/// per-job workspaces are created (the system temp directory unless
/// overridden) and where finished archives are published.
///
/// # Example
///
/// ```no_run
/// use resign::{CommandSigner, Resigner, ResignRequest};
/// use secrecy::SecretString;
/// use std::sync::Arc;
///
/// # async fn run() -> resign::Result<()> {
/// let resigner = Resigner::new(Arc::new(CommandSigner::new("zsign")), "signed");
/// let output = resigner
///     .resign(
///         ResignRequest {
///             ipa: "App.ipa".into(),
///             p12: "identity.p12".into(),
///             profile: "dist.mobileprovision".into(),
///             password: SecretString::new("secret".into()),
///         },
///         &|message: &str| println!("{message}"),
///     )
///     .await?;
/// println!("signed: {}", output.display());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Resigner {
    signer: Arc<dyn BundleSigner>,
    staging_root: PathBuf,
    output_dir: PathBuf,
}

impl Resigner {
    pub fn new(signer: Arc<dyn BundleSigner>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            signer,
            staging_root: std::env::temp_dir(),
            output_dir: output_dir.into(),
        }
    }

    /// Override where per-job workspaces are created.
    pub fn staging_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_root = dir.into();
        self
    }

    /// Run one job to completion and return the durable output path.
    ///
    /// Jobs are independent: each gets a uniquely named workspace, so any
    /// number may run concurrently without coordination. No step is retried;
    /// the first failure aborts the job and the workspace is removed either
    /// way.
    pub async fn resign(
        &self,
        request: ResignRequest,
        progress: &dyn Progress,
    ) -> Result<PathBuf> {
        let workspace = Workspace::prepare(&self.staging_root)?;
        debug!(root = %workspace.root().display(), "workspace ready");

        progress.report("staging inputs");
        let staged = stage_inputs(
            &request.ipa,
            &request.p12,
            &request.profile,
            workspace.inputs_dir(),
        )?;
        validate_archive(&staged.ipa)?;

        progress.report("extracting archive");
        extract_archive(&staged.ipa, workspace.work_dir(), progress)?;

        let app = locate_app_bundle(workspace.work_dir().join("Payload"))?;
        debug!(bundle = %app.display(), "located app bundle");

        sign_bundle(
            self.signer.as_ref(),
            &app,
            &staged.profile,
            &staged.p12,
            &request.password,
            progress,
        )
        .await?;

        progress.report("repacking archive");
        let output = repackage(
            workspace.work_dir(),
            &request.ipa,
            workspace.root(),
            &self.output_dir,
            progress,
        )?;

        progress.report("done");
        Ok(output)
    }

    /// Run a job on its own background task.
    ///
    /// The returned handle resolves to the job's result; this is the single
    /// completion channel per job.
    pub fn spawn(
        &self,
        request: ResignRequest,
        progress: Arc<dyn Progress>,
    ) -> JoinHandle<Result<PathBuf>> {
        let resigner = self.clone();
        tokio::spawn(async move { resigner.resign(request, progress.as_ref()).await })
    }
}
