// src/services/sanitizer/mod.rs

//! HTML sanitizer for exported wiki pages.
//!
//! Parses a fragment with `scraper`, keeps only what the [`SanitizePolicy`]
//! allows, and pretty-prints the result. Pure and deterministic: the same
//! input and policy always produce the same bytes.

mod format;
mod policy;

pub use policy::{AttrRule, SanitizePolicy};

use scraper::{ElementRef, Html, Node};

/// Sanitized tree node handed to the formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CleanNode {
    Text(String),
    Element {
        name: String,
        attrs: Vec<(String, String)>,
        children: Vec<CleanNode>,
    },
}

/// Applies a fixed policy to raw HTML.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    policy: SanitizePolicy,
}

impl Sanitizer {
    pub fn new(policy: SanitizePolicy) -> Self {
        Self { policy }
    }

    /// Clean and pretty-print an HTML fragment.
    pub fn sanitize(&self, raw: &str) -> String {
        let fragment = Html::parse_fragment(raw);
        let mut nodes = Vec::new();
        self.clean_children(fragment.root_element(), &mut nodes);
        format::render(&nodes)
    }

    fn clean_children(&self, parent: ElementRef<'_>, out: &mut Vec<CleanNode>) {
        for child in parent.children() {
            match child.value() {
                Node::Text(text) => push_text(out, text),
                Node::Element(element) => {
                    let Some(child_ref) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let name = element.name();
                    if self.policy.drops_subtree(name) {
                        continue;
                    }
                    if !self.policy.allows_element(name) {
                        self.clean_children(child_ref, out);
                        continue;
                    }

                    let mut attrs: Vec<(String, String)> = element
                        .attrs()
                        .filter(|(key, value)| self.policy.allows_attr(name, key, value))
                        .map(|(key, value)| (key.to_string(), value.to_string()))
                        .collect();
                    attrs.sort();
                    if attrs.is_empty() && self.policy.requires_attrs(name) {
                        self.clean_children(child_ref, out);
                        continue;
                    }

                    let mut children = Vec::new();
                    self.clean_children(child_ref, &mut children);
                    out.push(CleanNode::Element {
                        name: name.to_string(),
                        attrs,
                        children,
                    });
                }
                // Comments, doctypes and processing instructions are dropped.
                _ => {}
            }
        }
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(SanitizePolicy::wiki_export())
    }
}

/// Append text, merging with a preceding text node left by unwrapping.
fn push_text(out: &mut Vec<CleanNode>, text: &str) {
    if let Some(CleanNode::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(CleanNode::Text(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(raw: &str) -> String {
        Sanitizer::default().sanitize(raw)
    }

    #[test]
    fn test_script_removed_with_content() {
        let out = sanitize("<script>alert(1)</script><p>hi</p>");
        assert!(out.contains("<p>hi</p>"));
        assert!(!out.contains("<script"));
        assert!(!out.contains("alert"));
    }

    #[test]
    fn test_anchor_keeps_only_href() {
        let out = sanitize(r#"<a href="http://x" onclick="evil()" class="link" title="t">link</a>"#);
        assert_eq!(out, "<a href=\"http://x\">link</a>\n");
    }

    #[test]
    fn test_anchor_with_unsafe_href_is_unwrapped() {
        let out = sanitize(r#"<p><a href="javascript:alert(1)">click</a></p>"#);
        assert_eq!(out, "<p>click</p>\n");
    }

    #[test]
    fn test_disallowed_wrapper_keeps_children() {
        let out = sanitize(r#"<form action="/x"><p>kept</p><input value="gone"></form>"#);
        assert_eq!(out, "<p>kept</p>\n");
    }

    #[test]
    fn test_disallowed_attributes_stripped() {
        let out = sanitize(
            r#"<div class="confluence-information-macro" style="color:red" id="box-1"><h2 data-x="1">Title</h2></div>"#,
        );
        assert_eq!(out, "<div id=\"box-1\">\n  <h2>Title</h2>\n</div>\n");
    }

    #[test]
    fn test_comments_dropped() {
        assert_eq!(sanitize("<p>a<!-- note -->b</p>"), "<p>ab</p>\n");
    }

    #[test]
    fn test_table_structure_kept() {
        let out = sanitize(
            r#"<table class="confluenceTable"><tr><th scope="col">H</th></tr><tr><td colspan="2" onmouseover="x()">D</td></tr></table>"#,
        );
        assert_eq!(
            out,
            "<table>\n  <tbody>\n    <tr>\n      <th scope=\"col\">H</th>\n    </tr>\n    <tr>\n      <td colspan=\"2\">D</td>\n    </tr>\n  </tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_image_without_safe_src_dropped() {
        assert_eq!(
            sanitize(r#"<p><img src="javascript:x()" onerror="y()">text</p>"#),
            "<p>text</p>\n"
        );
        assert_eq!(
            sanitize(r#"<img src="/download/attachments/1/a.png" alt="diagram">"#),
            "<img alt=\"diagram\" src=\"/download/attachments/1/a.png\">\n"
        );
    }

    #[test]
    fn test_sections_and_headings() {
        let out = sanitize("<section><h1>A</h1><summary>S</summary><h6>F</h6></section>");
        assert_eq!(
            out,
            "<section>\n  <h1>A</h1>\n  <summary>S</summary>\n  <h6>F</h6>\n</section>\n"
        );
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "<script>alert(1)</script><p>hi</p>",
            r#"<div><p>Intro <b>bold</b> and <a href="/x" rel="nofollow">link</a></p>
                <ul><li>one</li><li>two <em>2</em></li></ul></div>"#,
            "<table><tr><td>a</td><td><p>b</p></td></tr></table>",
            "<p>before</p>loose text<section><h3>x</h3> tail</section>",
            "<pre>\nline one\n  line two</pre><p>a &amp; b &lt;c&gt;</p>",
            "<blockquote><p>quoted</p>trailing</blockquote>",
        ];
        for input in inputs {
            let once = sanitize(input);
            let twice = sanitize(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_sanitize_is_deterministic() {
        let input = r#"<div id="a" title="t" lang="en"><p>x</p></div>"#;
        assert_eq!(sanitize(input), sanitize(input));
    }

    #[test]
    fn test_empty_policy_leaves_only_text() {
        let sanitizer = Sanitizer::new(SanitizePolicy::empty());
        assert_eq!(
            sanitizer.sanitize("<div><p>plain <b>text</b></p><script>x</script></div>"),
            "plain text\n"
        );
    }
}
