//! Service layer for the mirror.
//!
//! This module contains the collaborators of the page pipeline:
//! - Content API access (`ContentApi`, `HttpContentApi`)
//! - HTML cleaning (`Sanitizer`, `SanitizePolicy`)
//! - Version-control finalize (`Publisher`, `GitPublisher`)

mod confluence;
mod git;
pub mod sanitizer;

pub use confluence::{ContentApi, HttpContentApi};
pub use git::{GitPublisher, Publisher};
pub use sanitizer::{SanitizePolicy, Sanitizer};
