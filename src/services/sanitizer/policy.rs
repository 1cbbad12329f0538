// src/services/sanitizer/policy.rs

//! Allow-list sanitization policy.
//!
//! A policy is assembled once with the builder methods below and is
//! read-only afterwards.

use std::collections::{HashMap, HashSet};

/// Validation rule for an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrRule {
    /// Any value
    Any,
    /// A URL with an allowed scheme, or a relative URL
    Url,
    /// Decimal digits only
    Integer,
    /// Digits with an optional trailing `%`
    NumberOrPercent,
    /// An HTML id / name token: `[A-Za-z0-9:._-]+`
    Token,
    /// Whitespace-separated tokens
    TokenList,
    /// ASCII letters, with length bounds
    Letters { min: usize, max: usize },
    /// One of a fixed set of keywords, case-insensitive
    OneOf(&'static [&'static str]),
}

const DIRECTIONS: &[&str] = &["ltr", "rtl"];
const LIST_TYPES: &[&str] = &["circle", "disc", "square", "a", "i", "1"];
const CELL_ALIGN: &[&str] = &["center", "justify", "left", "right", "char"];
const CELL_VALIGN: &[&str] = &["baseline", "bottom", "middle", "top"];
const CELL_SCOPE: &[&str] = &["row", "col", "rowgroup", "colgroup"];
const IMAGE_ALIGN: &[&str] = &[
    "left",
    "right",
    "top",
    "texttop",
    "middle",
    "absmiddle",
    "baseline",
    "bottom",
    "absbottom",
];

/// Elements whose whole subtree is removed, not just the tag.
const DROPPED_SUBTREES: &[&str] = &[
    "script", "style", "iframe", "frameset", "noframes", "noembed", "noscript", "object",
    "embed", "applet", "template", "title", "textarea", "select", "svg", "math",
];

/// Text-level and block elements of a user-generated-content baseline.
const UGC_ELEMENTS: &[&str] = &[
    "p", "br", "div", "span", "hr", "pre", "code", "blockquote", "b", "i", "strong", "em", "u",
    "s", "strike", "small", "sub", "sup", "tt", "abbr", "acronym", "cite", "dfn", "mark", "samp",
    "var", "kbd", "q", "del", "ins", "time", "article", "aside", "figure", "figcaption",
    "details", "hgroup", "ruby", "rp", "rt", "wbr",
];

impl AttrRule {
    fn check(self, value: &str, policy: &SanitizePolicy) -> bool {
        match self {
            AttrRule::Any => true,
            AttrRule::Url => policy.is_allowed_url(value),
            AttrRule::Integer => !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
            AttrRule::NumberOrPercent => {
                let digits = value.strip_suffix('%').unwrap_or(value);
                !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
            }
            AttrRule::Token => {
                !value.is_empty()
                    && value
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b':' | b'-' | b'_' | b'.'))
            }
            AttrRule::TokenList => value.split_ascii_whitespace().all(|token| {
                token
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b':' | b'-' | b'_' | b'.'))
            }),
            AttrRule::Letters { min, max } => {
                (min..=max).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_alphabetic())
            }
            AttrRule::OneOf(words) => words.iter().any(|w| w.eq_ignore_ascii_case(value.trim())),
        }
    }
}

/// Immutable allow-list of elements, attributes, and URL schemes.
#[derive(Debug, Clone, Default)]
pub struct SanitizePolicy {
    elements: HashSet<&'static str>,
    global_attrs: HashMap<&'static str, AttrRule>,
    element_attrs: HashMap<&'static str, HashMap<&'static str, AttrRule>>,
    /// Elements that accept only their own attributes, never global ones
    exclusive_attrs: HashSet<&'static str>,
    /// Elements dropped (unwrapped) when no attribute survives
    require_attrs: HashSet<&'static str>,
    dropped_subtrees: HashSet<&'static str>,
    url_schemes: HashSet<&'static str>,
    allow_relative_urls: bool,
}

impl SanitizePolicy {
    /// A policy that allows nothing.
    pub fn empty() -> Self {
        Self {
            dropped_subtrees: DROPPED_SUBTREES.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Policy applied to exported wiki pages.
    ///
    /// UGC baseline plus lists, tables, images, `section`, `summary`, headings,
    /// and anchors that keep nothing but `href`.
    pub fn wiki_export() -> Self {
        Self::empty()
            .allow_standard_attributes()
            .allow_standard_urls()
            .allow_lists()
            .allow_tables()
            .allow_images()
            .allow_elements(UGC_ELEMENTS)
            .allow_attrs(&["cite"], AttrRule::Url, &["blockquote", "q", "del", "ins"])
            .allow_attrs(&["datetime"], AttrRule::Any, &["del", "ins", "time"])
            .allow_elements(&["section"])
            .allow_elements(&["summary"])
            .allow_elements(&["h1", "h2", "h3", "h4", "h5", "h6"])
            .allow_only_attrs(&["href"], AttrRule::Url, "a")
    }

    /// Allow the given elements with no element-specific attributes.
    pub fn allow_elements(mut self, elements: &[&'static str]) -> Self {
        self.elements.extend(elements.iter().copied());
        self
    }

    /// Allow attributes on the given elements (and allow those elements).
    pub fn allow_attrs(
        mut self,
        attrs: &[&'static str],
        rule: AttrRule,
        elements: &[&'static str],
    ) -> Self {
        for &element in elements {
            self.elements.insert(element);
            let allowed = self.element_attrs.entry(element).or_default();
            for &attr in attrs {
                allowed.insert(attr, rule);
            }
        }
        self
    }

    /// Allow an element that keeps only the listed attributes.
    ///
    /// Global attributes are not applied to it, and the element is unwrapped
    /// when none of the listed attributes survive.
    pub fn allow_only_attrs(
        mut self,
        attrs: &[&'static str],
        rule: AttrRule,
        element: &'static str,
    ) -> Self {
        self.element_attrs.remove(element);
        self.exclusive_attrs.insert(element);
        self.require_attrs.insert(element);
        self.allow_attrs(attrs, rule, &[element])
    }

    /// Allow `dir`, `id`, `lang` and `title` on every allowed element.
    pub fn allow_standard_attributes(mut self) -> Self {
        self.global_attrs.insert("dir", AttrRule::OneOf(DIRECTIONS));
        self.global_attrs.insert("id", AttrRule::Token);
        self.global_attrs
            .insert("lang", AttrRule::Letters { min: 2, max: 20 });
        self.global_attrs.insert("title", AttrRule::Any);
        self
    }

    /// Allow `http`, `https` and `mailto` URLs, plus relative URLs.
    pub fn allow_standard_urls(mut self) -> Self {
        self.url_schemes.extend(["http", "https", "mailto"]);
        self.allow_relative_urls = true;
        self
    }

    /// Allow ordered, unordered and definition lists.
    pub fn allow_lists(self) -> Self {
        self.allow_attrs(&["type"], AttrRule::OneOf(LIST_TYPES), &["ol", "ul", "li"])
            .allow_attrs(&["start"], AttrRule::Integer, &["ol"])
            .allow_attrs(&["value"], AttrRule::Integer, &["li"])
            .allow_elements(&["dl", "dt", "dd"])
    }

    /// Allow table structure and its layout attributes.
    pub fn allow_tables(self) -> Self {
        self.allow_attrs(&["height", "width"], AttrRule::NumberOrPercent, &["table"])
            .allow_attrs(&["summary"], AttrRule::Any, &["table"])
            .allow_elements(&["caption"])
            .allow_attrs(&["span"], AttrRule::Integer, &["col", "colgroup"])
            .allow_attrs(
                &["height", "width"],
                AttrRule::NumberOrPercent,
                &["col", "colgroup", "td", "th"],
            )
            .allow_attrs(
                &["align"],
                AttrRule::OneOf(CELL_ALIGN),
                &["col", "colgroup", "thead", "tbody", "tfoot", "tr", "td", "th"],
            )
            .allow_attrs(
                &["valign"],
                AttrRule::OneOf(CELL_VALIGN),
                &["col", "colgroup", "thead", "tbody", "tfoot", "tr", "td", "th"],
            )
            .allow_attrs(&["abbr"], AttrRule::Any, &["td", "th"])
            .allow_attrs(&["colspan", "rowspan"], AttrRule::Integer, &["td", "th"])
            .allow_attrs(&["headers"], AttrRule::TokenList, &["td", "th"])
            .allow_attrs(&["scope"], AttrRule::OneOf(CELL_SCOPE), &["th"])
    }

    /// Allow images with a checked `src`.
    pub fn allow_images(mut self) -> Self {
        self.require_attrs.insert("img");
        self.allow_attrs(&["src"], AttrRule::Url, &["img"])
            .allow_attrs(&["alt"], AttrRule::Any, &["img"])
            .allow_attrs(&["height", "width"], AttrRule::NumberOrPercent, &["img"])
            .allow_attrs(&["align"], AttrRule::OneOf(IMAGE_ALIGN), &["img"])
    }

    /// Whether the element survives sanitization.
    pub fn allows_element(&self, element: &str) -> bool {
        self.elements.contains(element)
    }

    /// Whether the element and its whole subtree are removed.
    pub fn drops_subtree(&self, element: &str) -> bool {
        self.dropped_subtrees.contains(element)
    }

    /// Whether the element is unwrapped when it has no surviving attributes.
    pub fn requires_attrs(&self, element: &str) -> bool {
        self.require_attrs.contains(element)
    }

    /// Whether `attr="value"` survives on `element`.
    pub fn allows_attr(&self, element: &str, attr: &str, value: &str) -> bool {
        let own = self
            .element_attrs
            .get(element)
            .and_then(|attrs| attrs.get(attr));
        let rule = match own {
            Some(rule) => Some(rule),
            None if self.exclusive_attrs.contains(element) => None,
            None => self.global_attrs.get(attr),
        };
        rule.is_some_and(|rule| rule.check(value, self))
    }

    /// Whether a URL attribute value is acceptable.
    pub fn is_allowed_url(&self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        match url::Url::parse(value) {
            Ok(parsed) => self.url_schemes.contains(parsed.scheme()),
            Err(url::ParseError::RelativeUrlWithoutBase) => self.allow_relative_urls,
            Err(_) => false,
        }
    }
}
