//! Command-line interface for the IPA resigner.
//!
//! Resigns IPA archives with a new certificate and provisioning profile,
//! inspects profile expiration dates, and fetches JSON feeds.

use clap::{Parser, Subcommand};
use resign::fetch::{FetchClient, FetchOutcome};
use resign::signer::CommandSigner;
use resign::{profile, ResignRequest, Resigner};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "resign")]
#[command(about = "iOS IPA resigning tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resign an IPA with a new certificate and provisioning profile.
    Resign {
        /// Input IPA file
        ipa: PathBuf,

        /// PKCS#12 file (.p12) with certificate and private key
        #[arg(short = 'p', long)]
        pkcs12: PathBuf,

        /// Provisioning profile (.mobileprovision)
        #[arg(short = 'm', long)]
        profile: PathBuf,

        /// Password for the PKCS#12 file
        #[arg(long, default_value = "")]
        password: String,

        /// Directory the signed IPA is published into
        #[arg(short = 'o', long, default_value = "signed")]
        output_dir: PathBuf,

        /// zsign-compatible signing executable
        #[arg(long, default_value = "zsign")]
        signer: PathBuf,
    },
    /// Print the expiration date of a provisioning profile.
    Expiry {
        /// Provisioning profile (.mobileprovision)
        profile: PathBuf,
    },
    /// Fetch JSON feeds concurrently and pretty-print them.
    Fetch {
        /// URLs to fetch
        urls: Vec<String>,

        /// Print outcomes as they finish instead of in input order
        #[arg(long)]
        unordered: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Commands::Resign {
            ipa,
            pkcs12,
            profile,
            password,
            output_dir,
            signer,
        } => {
            let resigner = Resigner::new(Arc::new(CommandSigner::new(signer)), output_dir);
            let request = ResignRequest {
                ipa,
                p12: pkcs12,
                profile,
                password: SecretString::new(password),
            };

            let progress = |message: &str| println!("{message}");
            let output = resigner.resign(request, &progress).await?;
            println!("Signed: {}", output.display());
        }
        Commands::Expiry { profile: path } => match profile::expiration_date_from_file(&path) {
            Some(date) => println!("{}", date.to_xml_format()),
            None => println!("no expiration date found"),
        },
        Commands::Fetch { urls, unordered } => {
            let client = FetchClient::new();
            if unordered {
                let parsed = urls
                    .iter()
                    .filter_map(|raw| url_parse(raw))
                    .collect::<Vec<_>>();
                client.fetch_and_print(parsed).await;
            } else {
                let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
                for (url, outcome) in client.fetch_all_strs(&refs).await {
                    match outcome {
                        FetchOutcome::Json(pretty) => println!("{url}\n{pretty}"),
                        FetchOutcome::Raw(body) => println!("{url}\n{body}"),
                        FetchOutcome::Http { status, excerpt } => {
                            println!("{url} failed: HTTP {status}: {excerpt}")
                        }
                        FetchOutcome::Transport(message) => println!("{url} failed: {message}"),
                    }
                }
            }
        }
    }

    Ok(())
}

fn url_parse(raw: &str) -> Option<url::Url> {
    match url::Url::parse(raw) {
        Ok(url) => Some(url),
        Err(e) => {
            eprintln!("skipping {raw}: {e}");
            None
        }
    }
}
