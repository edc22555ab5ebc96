//! Bridge between the pipeline and the external signing primitive.
//!
//! Code-signature construction lives outside this crate, in an audited
//! zsign-compatible tool. The pipeline talks to it through [`BundleSigner`],
//! a one-method capability with callback completion, so tests substitute a
//! fake and the pipeline never links the primitive directly.

use crate::progress::Progress;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::process::Command;
use tokio::sync::oneshot;

/// One signing invocation: which bundle, with which identity.
pub struct SignRequest {
    /// The `.app` bundle to sign in place.
    pub app_path: PathBuf,
    /// Provisioning profile to embed.
    pub profile_path: PathBuf,
    /// PKCS#12 key container.
    pub p12_path: PathBuf,
    /// Passphrase for the key container.
    pub p12_password: SecretString,
    /// Entitlements override; `None` leaves the primitive's defaults.
    pub entitlements_path: Option<PathBuf>,
    /// Strip the embedded profile after signing.
    pub remove_provision: bool,
}

/// Called exactly once when the primitive finishes, with `Err` carrying the
/// primitive's own failure message.
pub type SignCompletion = Box<dyn FnOnce(std::result::Result<(), String>) + Send>;

/// The external signing primitive, injected as a capability.
///
/// Implementations must invoke `completion` exactly once, from any thread.
pub trait BundleSigner: Send + Sync {
    fn sign(&self, request: SignRequest, completion: SignCompletion);
}

/// Run the signing primitive on `app_path` and wait for its completion.
///
/// The primitive reports through a one-shot callback; a oneshot channel
/// turns that into an awaitable so the job's sequential flow resumes only
/// after the single completion signal. The primitive is invoked once per
/// job, with an empty entitlements override and the profile left in place.
///
/// # Errors
///
/// Returns [`Error::Signing`] with the primitive's message verbatim, or with
/// a synthetic message if the primitive dropped its callback unfired.
pub async fn sign_bundle(
    signer: &dyn BundleSigner,
    app_path: &Path,
    profile_path: &Path,
    p12_path: &Path,
    p12_password: &SecretString,
    progress: &dyn Progress,
) -> Result<()> {
    let bundle_name = app_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| app_path.display().to_string());
    progress.report(&format!("signing {}", bundle_name));

    let (tx, rx) = oneshot::channel();
    signer.sign(
        SignRequest {
            app_path: app_path.to_path_buf(),
            profile_path: profile_path.to_path_buf(),
            p12_path: p12_path.to_path_buf(),
            p12_password: p12_password.clone(),
            entitlements_path: None,
            remove_provision: false,
        },
        Box::new(move |outcome| {
            let _ = tx.send(outcome);
        }),
    );

    match rx.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(message)) => Err(Error::Signing(message)),
        Err(_) => Err(Error::Signing(
            "signing primitive dropped its completion callback".into(),
        )),
    }
}

/// Production signer that shells out to an external zsign-compatible
/// executable.
///
/// The process runs on its own thread; completion fires once with the
/// process outcome, so a missing executable or a non-zero exit surfaces
/// through the callback like any other signing failure.
pub struct CommandSigner {
    program: PathBuf,
}

impl CommandSigner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl BundleSigner for CommandSigner {
    fn sign(&self, request: SignRequest, completion: SignCompletion) {
        let program = self.program.clone();
        std::thread::spawn(move || {
            let mut cmd = Command::new(&program);
            cmd.arg("--pkcs12")
                .arg(&request.p12_path)
                .arg("--profile")
                .arg(&request.profile_path)
                .arg("--password")
                .arg(request.p12_password.expose_secret());
            if let Some(ref entitlements) = request.entitlements_path {
                cmd.arg("--entitlements").arg(entitlements);
            }
            cmd.arg(&request.app_path);

            let outcome = match cmd.output() {
                Ok(out) if out.status.success() => Ok(()),
                Ok(out) => Err(String::from_utf8_lossy(&out.stderr).trim().to_string()),
                Err(e) => Err(format!("failed to launch {}: {}", program.display(), e)),
            };
            completion(outcome);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Fake primitive that completes from a background thread after a delay,
    /// the way a foreign callback-style API would.
    struct ScriptedSigner {
        failure: Option<String>,
    }

    impl BundleSigner for ScriptedSigner {
        fn sign(&self, _request: SignRequest, completion: SignCompletion) {
            let failure = self.failure.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(10));
                match failure {
                    None => completion(Ok(())),
                    Some(message) => completion(Err(message)),
                }
            });
        }
    }

    /// Primitive that never calls back.
    struct SilentSigner;

    impl BundleSigner for SilentSigner {
        fn sign(&self, _request: SignRequest, completion: SignCompletion) {
            drop(completion);
        }
    }

    #[tokio::test]
    async fn waits_for_deferred_completion() {
        let signer = ScriptedSigner { failure: None };
        let lines = Mutex::new(Vec::new());
        let sink = |message: &str| lines.lock().unwrap().push(message.to_string());

        sign_bundle(
            &signer,
            Path::new("/ws/work/Payload/Test.app"),
            Path::new("/ws/inputs/dist.mobileprovision"),
            Path::new("/ws/inputs/identity.p12"),
            &SecretString::new("secret".into()),
            &sink,
        )
        .await
        .unwrap();

        assert_eq!(lines.lock().unwrap().as_slice(), ["signing Test.app"]);
    }

    #[tokio::test]
    async fn propagates_primitive_failure_verbatim() {
        let signer = ScriptedSigner {
            failure: Some("certificate rejected".into()),
        };

        let result = sign_bundle(
            &signer,
            Path::new("Test.app"),
            Path::new("p"),
            Path::new("k"),
            &SecretString::new(String::new()),
            &NullProgress,
        )
        .await;

        match result {
            Err(Error::Signing(message)) => assert_eq!(message, "certificate rejected"),
            other => panic!("expected signing error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropped_callback_is_a_signing_error() {
        let result = sign_bundle(
            &SilentSigner,
            Path::new("Test.app"),
            Path::new("p"),
            Path::new("k"),
            &SecretString::new(String::new()),
            &NullProgress,
        )
        .await;

        assert!(matches!(result, Err(Error::Signing(_))));
    }

    #[tokio::test]
    async fn command_signer_reports_missing_executable() {
        let signer = CommandSigner::new("/nonexistent/zsign-binary");

        let result = sign_bundle(
            &signer,
            Path::new("Test.app"),
            Path::new("p"),
            Path::new("k"),
            &SecretString::new(String::new()),
            &NullProgress,
        )
        .await;

        match result {
            Err(Error::Signing(message)) => assert!(message.contains("failed to launch")),
            other => panic!("expected signing error, got {other:?}"),
        }
    }
}
