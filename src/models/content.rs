//! Wire types of the Confluence content API.

use serde::Deserialize;

use crate::utils::join_link;

/// One page of the paginated `/rest/api/content` listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingPage {
    #[serde(rename = "_links", default)]
    pub links: ListingLinks,

    #[serde(default)]
    pub limit: usize,

    #[serde(default)]
    pub size: usize,

    #[serde(default)]
    pub start: usize,

    /// Descriptors in listing order
    #[serde(default)]
    pub results: Vec<PageDescriptor>,
}

impl ListingPage {
    /// Absolute URL of the next listing page, if there is one.
    ///
    /// Relative cursors are joined onto `base_url`; an absent or empty
    /// cursor ends pagination.
    pub fn next_url(&self, base_url: &str) -> Option<String> {
        self.links
            .next
            .as_deref()
            .map(str::trim)
            .filter(|next| !next.is_empty())
            .map(|next| join_link(base_url, next))
    }
}

/// Navigation links of a listing page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingLinks {
    /// Base URL that `webui` links are relative to
    #[serde(default)]
    pub base: String,

    #[serde(default)]
    pub context: String,

    #[serde(default)]
    pub next: Option<String>,

    #[serde(rename = "self", default)]
    pub self_link: String,
}

/// Metadata record for one remote content item.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PageDescriptor {
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub title: String,

    #[serde(rename = "_links", default)]
    pub links: PageLinks,
}

impl PageDescriptor {
    /// URL returning this page with its export view expanded.
    pub fn export_view_url(&self) -> String {
        let separator = if self.links.self_link.contains('?') {
            '&'
        } else {
            '?'
        };
        format!("{}{}expand=body.export_view", self.links.self_link, separator)
    }
}

/// Navigation links of one content item.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PageLinks {
    /// Absolute REST URL of the content item
    #[serde(rename = "self", default)]
    pub self_link: String,

    /// Web UI path, relative to the listing's base URL
    #[serde(default)]
    pub webui: String,

    #[serde(default)]
    pub tinyui: Option<String>,

    #[serde(default)]
    pub editui: Option<String>,
}

/// Response of `GET {self}?expand=body.export_view`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportViewResponse {
    #[serde(default)]
    pub body: ContentBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentBody {
    #[serde(default)]
    pub export_view: BodyValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BodyValue {
    #[serde(default)]
    pub value: String,
}

impl ExportViewResponse {
    /// Rendered HTML of the page.
    pub fn into_html(self) -> String {
        self.body.export_view.value
    }
}
