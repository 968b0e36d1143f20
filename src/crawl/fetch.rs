//! Resource fetching.
//!
//! Turns CLI input into a fetchable URL and retrieves resources over HTTP
//! or from the local filesystem. The entry document is fetched with a
//! redirect-disabled client so every hop can be recorded as a graph edge;
//! subresources use a regular redirect-following client.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use url::Url;

use crate::config::constants::{
    HEADER_CONTENT_SECURITY_POLICY, HEADER_CONTENT_SECURITY_POLICY_REPORT_ONLY, MAX_REDIRECT_HOPS,
    MAX_RESPONSE_BODY_SIZE, URL_SCHEME_PATTERN,
};
use crate::graph::DocumentKind;

static SCHEME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(URL_SCHEME_PATTERN).unwrap_or_else(|e| {
        panic!(
            "Failed to compile URL scheme pattern '{}': {}. This is a programming error.",
            URL_SCHEME_PATTERN, e
        )
    })
});

/// A fetched resource, and the request chain that produced it.
#[derive(Debug)]
pub struct FetchedResource {
    /// Every URL requested, in request order; the last one is the final
    /// destination that produced the body.
    pub chain: Vec<Url>,
    /// Resource kind, from content-type or file extension
    pub kind: DocumentKind,
    /// Response body, possibly truncated at the size cap
    pub body: String,
    /// `Content-Security-Policy` response header, if any
    pub csp_header: Option<String>,
    /// `Content-Security-Policy-Report-Only` response header, if any
    pub csp_report_only_header: Option<String>,
}

impl FetchedResource {
    /// The URL that produced the body.
    pub fn final_url(&self) -> &Url {
        // chain is never empty: every constructor pushes at least the
        // requested URL.
        &self.chain[self.chain.len() - 1]
    }
}

/// Resolves CLI input into an entry URL and a root URL.
///
/// Input matching an absolute URL scheme is parsed as-is; anything else is
/// treated as a local file path relative to the current directory. The root
/// defaults to the directory containing a local input file and stays `None`
/// for remote input unless `--root` was given.
///
/// # Errors
///
/// Returns an error if the input cannot be parsed as a URL or the path
/// cannot be made absolute.
pub fn resolve_input(input: &str, root: Option<&str>) -> Result<(Url, Option<Url>)> {
    let entry = if SCHEME_PATTERN.is_match(input) {
        Url::parse(input).with_context(|| format!("Invalid url: {input}"))?
    } else {
        let path = Path::new(input);
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .context("Cannot determine current directory")?
                .join(path)
        };
        Url::from_file_path(&absolute)
            .map_err(|_| anyhow!("Cannot turn path into a file url: {}", absolute.display()))?
    };

    let root_url = match root {
        Some(root) => Some(if SCHEME_PATTERN.is_match(root) {
            Url::parse(root).with_context(|| format!("Invalid root url: {root}"))?
        } else {
            let path = Path::new(root);
            let absolute = if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .context("Cannot determine current directory")?
                    .join(path)
            };
            Url::from_file_path(&absolute)
                .map_err(|_| anyhow!("Cannot turn root into a file url: {}", absolute.display()))?
        }),
        None if entry.scheme() == "file" => {
            // Containing directory of the input file.
            entry.join(".").ok()
        }
        None => None,
    };

    Ok((entry, root_url))
}

/// Derives the resource kind from a content-type header, falling back to the
/// URL's file extension.
pub fn kind_for(content_type: Option<&str>, url: &Url) -> DocumentKind {
    if let Some(content_type) = content_type {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "text/html" | "application/xhtml+xml" => return DocumentKind::Html,
            "text/css" => return DocumentKind::Css,
            "text/javascript" | "application/javascript" | "application/x-javascript"
            | "application/ecmascript" => return DocumentKind::JavaScript,
            _ if essence.starts_with("image/") => return DocumentKind::Image,
            _ => {}
        }
    }
    kind_from_extension(url)
}

fn kind_from_extension(url: &Url) -> DocumentKind {
    let path = url.path().to_ascii_lowercase();
    let extension = path.rsplit('.').next().unwrap_or("");
    match extension {
        "html" | "htm" | "xhtml" => DocumentKind::Html,
        "css" => DocumentKind::Css,
        "js" | "mjs" => DocumentKind::JavaScript,
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "avif" => DocumentKind::Image,
        _ => DocumentKind::Other,
    }
}

/// Fetches the entry document, recording every redirect hop.
///
/// `client` must have redirect following disabled; the loop resolves each
/// `Location` header against the current URL and gives up after
/// `MAX_REDIRECT_HOPS` hops. `file://` URLs are read from disk and produce a
/// single-element chain.
///
/// # Errors
///
/// Returns an error if a request fails, a `Location` header cannot be
/// resolved, or a local file cannot be read.
pub async fn fetch_entry(client: &reqwest::Client, url: &Url) -> Result<FetchedResource> {
    if url.scheme() == "file" {
        return fetch_file(url).await;
    }

    let mut chain: Vec<Url> = Vec::new();
    let mut current = url.clone();

    for _ in 0..MAX_REDIRECT_HOPS {
        chain.push(current.clone());
        let response = client
            .get(current.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {current}"))?;

        if response.status().is_redirection() {
            if let Some(location) = response.headers().get(reqwest::header::LOCATION) {
                let location = location.to_str().unwrap_or("").to_string();
                current = current
                    .join(&location)
                    .with_context(|| format!("Invalid redirect location: {location}"))?;
                continue;
            }
            // Redirect status without a Location header; treat as final.
            log::warn!(
                "Redirect status {} for {} but no Location header",
                response.status(),
                current
            );
            return finish_http_response(chain, response).await;
        }
        return finish_http_response(chain, response).await;
    }

    Err(anyhow!(
        "Too many redirects (more than {MAX_REDIRECT_HOPS}) starting from {url}"
    ))
}

/// Fetches a subresource with a redirect-following client.
///
/// Cross-URL redirects still matter for the derived policy (the final
/// origin is what the browser loads), so the chain records the requested
/// and, when different, the final URL.
///
/// # Errors
///
/// Returns an error if the request fails or a local file cannot be read.
pub async fn fetch_subresource(client: &reqwest::Client, url: &Url) -> Result<FetchedResource> {
    if url.scheme() == "file" {
        return fetch_file(url).await;
    }

    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;

    let mut chain = vec![url.clone()];
    if response.url() != url {
        chain.push(response.url().clone());
    }
    finish_http_response(chain, response).await
}

async fn finish_http_response(
    chain: Vec<Url>,
    response: reqwest::Response,
) -> Result<FetchedResource> {
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("HTTP {} for {}", status, response.url()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let csp_header = header_value(&response, HEADER_CONTENT_SECURITY_POLICY);
    let csp_report_only_header =
        header_value(&response, HEADER_CONTENT_SECURITY_POLICY_REPORT_ONLY);
    let final_url = response.url().clone();

    let body = read_body_capped(response).await?;

    Ok(FetchedResource {
        kind: kind_for(content_type.as_deref(), &final_url),
        chain,
        body,
        csp_header,
        csp_report_only_header,
    })
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Reads the response body, stopping at the size cap.
async fn read_body_capped(mut response: reqwest::Response) -> Result<String> {
    let url = response.url().clone();
    let mut bytes: Vec<u8> = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("Failed to read body of {url}"))?
    {
        if bytes.len() + chunk.len() > MAX_RESPONSE_BODY_SIZE {
            log::warn!(
                "Body of {} exceeds {} bytes, truncating",
                url,
                MAX_RESPONSE_BODY_SIZE
            );
            let remaining = MAX_RESPONSE_BODY_SIZE - bytes.len();
            bytes.extend_from_slice(&chunk[..remaining]);
            break;
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

async fn fetch_file(url: &Url) -> Result<FetchedResource> {
    let path = url
        .to_file_path()
        .map_err(|_| anyhow!("Cannot turn file url into a path: {url}"))?;
    let body = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(FetchedResource {
        chain: vec![url.clone()],
        kind: kind_from_extension(url),
        body,
        csp_header: None,
        csp_report_only_header: None,
    })
}
