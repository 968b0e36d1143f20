//! Policy lifecycle on the crawl graph: redirect resolution, extraction of
//! pre-existing policies, and baseline synthesis.

pub mod baseline;
pub mod extract;
pub mod redirects;

pub use baseline::synthesize_baseline;
pub use extract::{ensure_html_found, extract_existing, OriginalPolicy};
pub use redirects::resolve_initial;
