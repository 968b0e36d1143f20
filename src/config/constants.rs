//! Application-wide constants.

/// Policy text used to seed the analysis when a document carries no policy
/// at all and no `--include` override was given.
pub const DEFAULT_BASELINE_POLICY: &str = "default-src 'none'";

/// Enforcing CSP header / meta `http-equiv` name.
pub const HEADER_CONTENT_SECURITY_POLICY: &str = "Content-Security-Policy";

/// Report-only CSP header / meta `http-equiv` name.
pub const HEADER_CONTENT_SECURITY_POLICY_REPORT_ONLY: &str =
    "Content-Security-Policy-Report-Only";

/// CSP3 keyword that is still experimental in shipping browsers.
///
/// When it shows up in a derived policy (or among missing source
/// expressions) and the target level is below 3, an advisory warning is
/// emitted.
pub const UNSTABLE_CSP3_KEYWORD: &str = "'unsafe-hashed-attributes'";

/// Directives that get full resource paths (rather than bare origins) when
/// the target CSP level is 2 or higher.
pub const INCLUDE_PATH_DIRECTIVES: &[&str] = &[
    "script-src",
    "style-src",
    "frame-src",
    "object-src",
    "manifest-src",
    "child-src",
];

/// Default User-Agent string for HTTP requests.
///
/// Uses a generic Chrome-like string without a specific version number to
/// avoid becoming outdated. Users can override this via `--user-agent`.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Pattern recognizing an absolute URL scheme (`http://`, `file://`, ...).
/// Input not matching this is treated as a local file path.
pub const URL_SCHEME_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9+.-]*://";

// Redirect handling
/// Maximum number of redirect hops to follow.
/// Prevents infinite redirect loops and excessive request chains.
pub const MAX_REDIRECT_HOPS: usize = 10;

// Response and body size limits
/// Maximum response body size in bytes (2MB).
/// Responses larger than this are skipped to prevent memory exhaustion.
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Line width bound for `--pretty` policy output.
pub const PRETTY_MAX_WIDTH: usize = 80;

/// Indent unit for `--pretty` policy output.
pub const PRETTY_INDENT: &str = "  ";
