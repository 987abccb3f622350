//! Cartography: where to fetch. URL variants per task, pagination crawling, and request pacing.

pub mod crawler;
pub mod rate_limiter;
pub mod url_variants;
