//! Concurrent JSON feed fetching.
//!
//! Independent of the resign pipeline: fetch N URLs at once and pretty-print
//! whatever comes back. Parse failures are outcomes, not errors, because the
//! raw body is still useful for diagnostics.

use serde_json::Value;
use std::time::Duration;
use tokio::task::JoinSet;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const EXCERPT_LEN: usize = 200;

/// What one URL produced.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Body parsed as JSON, re-serialized pretty-printed.
    Json(String),
    /// Success response whose body is not JSON; kept verbatim.
    Raw(String),
    /// Non-success status, with a truncated body excerpt.
    Http { status: u16, excerpt: String },
    /// The request never produced a response (connect failure, timeout).
    Transport(String),
}

fn excerpt(body: &str) -> String {
    let mut end = body.len().min(EXCERPT_LEN);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_string()
}

async fn fetch_one(http: reqwest::Client, url: Url) -> FetchOutcome {
    let response = match http.get(url).send().await {
        Ok(response) => response,
        Err(e) => return FetchOutcome::Transport(e.to_string()),
    };

    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return FetchOutcome::Transport(e.to_string()),
    };

    if !status.is_success() {
        return FetchOutcome::Http {
            status: status.as_u16(),
            excerpt: excerpt(&body),
        };
    }

    match serde_json::from_str::<Value>(&body) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => FetchOutcome::Json(pretty),
            Err(_) => FetchOutcome::Raw(body),
        },
        Err(_) => FetchOutcome::Raw(body),
    }
}

fn print_outcome(url: &Url, outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::Json(pretty) => println!("{url}\n{pretty}"),
        FetchOutcome::Raw(body) => println!("{url}\n{body}"),
        FetchOutcome::Http { status, excerpt } => {
            println!("{url} failed: HTTP {status}: {excerpt}")
        }
        FetchOutcome::Transport(message) => println!("{url} failed: {message}"),
    }
}

/// Concurrent fetcher with a fixed per-request timeout.
pub struct FetchClient {
    http: reqwest::Client,
}

impl FetchClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Mainly for tests; production callers keep the 10 s default.
    pub fn with_timeout(timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client build");
        Self { http }
    }

    /// Fetch all URLs concurrently, returning outcomes in input order.
    ///
    /// One task per URL, tagged with its input index; results are collected
    /// as tasks finish and sorted by that index before returning, so the
    /// output lines up with `urls` no matter which request finished first.
    pub async fn fetch_all(&self, urls: Vec<Url>) -> Vec<(Url, FetchOutcome)> {
        let mut tasks = JoinSet::new();
        for (index, url) in urls.into_iter().enumerate() {
            let http = self.http.clone();
            tasks.spawn(async move {
                let outcome = fetch_one(http, url.clone()).await;
                (index, url, outcome)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            if let Ok(entry) = joined {
                results.push(entry);
            }
        }
        results.sort_by_key(|(index, _, _)| *index);

        results
            .into_iter()
            .map(|(_, url, outcome)| (url, outcome))
            .collect()
    }

    /// Fetch all URLs concurrently, printing each outcome as its task
    /// finishes. Output order follows completion, not input order.
    pub async fn fetch_and_print(&self, urls: Vec<Url>) {
        let mut tasks = JoinSet::new();
        for url in urls {
            let http = self.http.clone();
            tasks.spawn(async move {
                let outcome = fetch_one(http, url.clone()).await;
                (url, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Ok((url, outcome)) = joined {
                print_outcome(&url, &outcome);
            }
        }
    }

    /// String-typed entry point: unparseable URLs are skipped, with the
    /// skipped count logged, and the remainder delegates to [`Self::fetch_all`].
    pub async fn fetch_all_strs(&self, urls: &[&str]) -> Vec<(Url, FetchOutcome)> {
        let mut parsed = Vec::with_capacity(urls.len());
        let mut skipped = 0usize;
        for raw in urls {
            match Url::parse(raw) {
                Ok(url) => parsed.push(url),
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::warn!("skipped {} unparseable URL(s)", skipped);
        }

        self.fetch_all(parsed).await
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}
