//! Storage abstractions for mirrored pages.
//!
//! Each page lands at a path derived from its web UI link:
//!
//! ```text
//! {output_dir}/
//! └── wiki.nci.nih.gov/          # host of the listing base URL
//!     └── display/
//!         └── SPACE/
//!             ├── Home.html
//!             └── Release+Notes.html
//! ```

pub mod local;

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::PageDescriptor;
use crate::utils::strip_https;

// Re-export for convenience
pub use local::LocalStorage;

/// Suffix appended to every page file.
pub const PAGE_EXTENSION: &str = ".html";

/// Trait for page storage backends.
#[async_trait]
pub trait PageStorage: Send + Sync {
    /// Persist sanitized content for a page, returning where it was written.
    async fn write_page(
        &self,
        base_url: &str,
        page: &PageDescriptor,
        content: &str,
    ) -> Result<PathBuf>;
}

/// Relative output path of a page: `strip("https://", base + webui) + ".html"`.
///
/// Empty and `.` segments are dropped; `..` segments are rejected so a page
/// can never be written outside the output directory.
pub fn page_relative_path(base_url: &str, webui: &str) -> Result<PathBuf> {
    let joined = format!("{base_url}{webui}");
    let stripped = strip_https(&joined);

    let mut path = PathBuf::new();
    for segment in stripped.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        // Reject anything the platform would not treat as a plain file name.
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => path.push(segment),
            _ => {
                return Err(AppError::invalid_path(
                    stripped,
                    format!("unsafe path segment {segment:?}"),
                ));
            }
        }
    }

    let Some(file_name) = path.file_name().map(|n| n.to_os_string()) else {
        return Err(AppError::invalid_path(stripped, "no file name"));
    };
    let mut file_name = file_name;
    file_name.push(PAGE_EXTENSION);
    path.set_file_name(file_name);
    Ok(path)
}
