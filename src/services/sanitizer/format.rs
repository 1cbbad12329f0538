// src/services/sanitizer/format.rs

//! Pretty-printer for sanitized HTML trees.
//!
//! Layout rules:
//! - block elements start on their own line, indented two spaces per depth
//! - a block whose children are all inline is printed on one line
//! - runs of inline content collapse ASCII whitespace and are trimmed at
//!   block boundaries
//! - `pre` content is printed verbatim

use super::CleanNode;

const INDENT: &str = "  ";

/// Elements laid out inline with surrounding text.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "b", "bdi", "bdo", "br", "cite", "code", "data", "del", "dfn", "em",
    "i", "img", "ins", "kbd", "mark", "q", "rp", "rt", "ruby", "s", "samp", "small", "span",
    "strike", "strong", "sub", "sup", "time", "tt", "u", "var", "wbr",
];

/// Elements without content or closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Whether a node must be laid out as a block.
fn is_block(node: &CleanNode) -> bool {
    match node {
        CleanNode::Text(_) => false,
        CleanNode::Element { name, children, .. } => {
            !INLINE_ELEMENTS.contains(&name.as_str()) || children.iter().any(is_block)
        }
    }
}

/// Render a sanitized tree. Every line ends with a newline.
pub(crate) fn render(nodes: &[CleanNode]) -> String {
    let mut out = String::new();
    render_blocks(nodes, 0, &mut out);
    out
}

fn render_blocks(nodes: &[CleanNode], depth: usize, out: &mut String) {
    let mut run: Vec<&CleanNode> = Vec::new();
    for node in nodes {
        if is_block(node) {
            flush_inline_run(&run, depth, out);
            run.clear();
            render_block(node, depth, out);
        } else {
            run.push(node);
        }
    }
    flush_inline_run(&run, depth, out);
}

fn flush_inline_run(run: &[&CleanNode], depth: usize, out: &mut String) {
    let mut line = String::new();
    for node in run {
        write_inline(node, &mut line);
    }
    let line = line.trim_matches(|c: char| c.is_ascii_whitespace());
    if !line.is_empty() {
        push_line(depth, line, out);
    }
}

fn render_block(node: &CleanNode, depth: usize, out: &mut String) {
    let CleanNode::Element {
        name,
        attrs,
        children,
    } = node
    else {
        return;
    };

    let mut open = String::new();
    write_open_tag(name, attrs, &mut open);

    if is_void(name) {
        push_line(depth, &open, out);
        return;
    }

    if name == "pre" {
        let mut body = String::new();
        for child in children {
            write_verbatim(child, &mut body);
        }
        // A newline directly after <pre> is swallowed by the parser.
        if body.starts_with('\n') {
            open.push('\n');
        }
        push_line(depth, &format!("{open}{body}</{name}>"), out);
        return;
    }

    if children.iter().any(is_block) {
        push_line(depth, &open, out);
        render_blocks(children, depth + 1, out);
        push_line(depth, &format!("</{name}>"), out);
    } else {
        let mut inner = String::new();
        for child in children {
            write_inline(child, &mut inner);
        }
        let inner = inner.trim_matches(|c: char| c.is_ascii_whitespace());
        push_line(depth, &format!("{open}{inner}</{name}>"), out);
    }
}

fn push_line(depth: usize, line: &str, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(line);
    out.push('\n');
}

fn write_inline(node: &CleanNode, out: &mut String) {
    match node {
        CleanNode::Text(text) => write_collapsed_text(text, out),
        CleanNode::Element {
            name,
            attrs,
            children,
        } => {
            write_open_tag(name, attrs, out);
            if is_void(name) {
                return;
            }
            for child in children {
                write_inline(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn write_verbatim(node: &CleanNode, out: &mut String) {
    match node {
        CleanNode::Text(text) => escape_text(text, out),
        CleanNode::Element {
            name,
            attrs,
            children,
        } => {
            write_open_tag(name, attrs, out);
            if is_void(name) {
                return;
            }
            for child in children {
                write_verbatim(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

/// Collapse runs of ASCII whitespace to one space, continuing any run
/// already at the end of `out`.
fn write_collapsed_text(text: &str, out: &mut String) {
    let mut in_space = out.ends_with(' ');
    let mut collapsed = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                collapsed.push(' ');
                in_space = true;
            }
        } else {
            collapsed.push(c);
            in_space = false;
        }
    }
    escape_text(&collapsed, out);
}

fn write_open_tag(name: &str, attrs: &[(String, String)], out: &mut String) {
    out.push('<');
    out.push_str(name);
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_attr(value, out);
        out.push('"');
    }
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
