//! README pipeline: Markdown conversion followed by sanitization.
//!
//! Both stages are optional collaborators. Without a converter the source
//! goes to the sanitizer unchanged; without a sanitizer the text is escaped
//! and wrapped in `<pre>`, so converted HTML is never inserted unsanitized.

use pulldown_cmark::{html, Options, Parser};

use crate::html::{escape_html, Node};

pub trait Converter: Send + Sync {
    fn to_html(&self, markdown: &str) -> String;
}

pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> String;
}

/// CommonMark plus tables and strikethrough.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmarkConverter;

impl Converter for CmarkConverter {
    fn to_html(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        let parser = Parser::new_ext(markdown, options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

pub struct ReadmeRenderer {
    converter: Option<Box<dyn Converter>>,
    sanitizer: Option<Box<dyn Sanitizer>>,
}

impl Default for ReadmeRenderer {
    fn default() -> Self {
        Self::standard()
    }
}

impl ReadmeRenderer {
    pub fn new(
        converter: Option<Box<dyn Converter>>,
        sanitizer: Option<Box<dyn Sanitizer>>,
    ) -> Self {
        Self {
            converter,
            sanitizer,
        }
    }

    pub fn standard() -> Self {
        Self::new(
            Some(Box::new(CmarkConverter)),
            Some(Box::new(AllowlistSanitizer)),
        )
    }

    pub fn from_flags(markdown: bool, sanitize: bool) -> Self {
        Self::new(
            markdown.then(|| Box::new(CmarkConverter) as Box<dyn Converter>),
            sanitize.then(|| Box::new(AllowlistSanitizer) as Box<dyn Sanitizer>),
        )
    }

    pub fn render(&self, markdown: &str) -> Node {
        let converted = match &self.converter {
            Some(c) => c.to_html(markdown),
            None => markdown.to_string(),
        };
        let html = match &self.sanitizer {
            Some(s) => s.sanitize(&converted),
            None => format!("<pre>{}</pre>", escape_html(&converted)),
        };
        Node::Raw(html)
    }
}

// =============================================================================
// Allowlist sanitizer
// =============================================================================

/// Keeps a fixed set of structural tags, strips every other tag (keeping its
/// text), drops `script`-like elements with their content, drops comments,
/// and keeps only a few attributes with safe URL schemes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowlistSanitizer;

const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "hr", "h1", "h2", "h3", "h4", "h5", "h6", "em", "strong", "del", "s", "code",
    "pre", "blockquote", "ul", "ol", "li", "a", "img", "table", "thead", "tbody", "tr", "th",
    "td", "sup", "sub", "span", "div",
];

const DROP_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "template", "noscript", "textarea",
];

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

fn allowed_attr(tag: &str, attr: &str) -> bool {
    matches!(
        (tag, attr),
        ("a", "href" | "title")
            | ("img", "src" | "alt" | "title")
            | ("ol", "start")
            | ("code", "class")
    )
}

fn is_url_attr(attr: &str) -> bool {
    matches!(attr, "href" | "src")
}

/// Relative URLs pass; absolute ones need an allowed scheme.
fn is_safe_url(value: &str) -> bool {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    let end = cleaned
        .find([':', '/', '?', '#'])
        .unwrap_or(cleaned.len());
    let prefix = &cleaned[..end];
    if prefix.contains('&') {
        return false;
    }
    match cleaned[end..].chars().next() {
        Some(':') => SAFE_SCHEMES.contains(&prefix),
        _ => true,
    }
}

impl Sanitizer for AllowlistSanitizer {
    fn sanitize(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let lower = html.to_ascii_lowercase();
        let mut cursor = 0usize;

        while let Some(rel) = html[cursor..].find('<') {
            let start = cursor + rel;
            out.push_str(&html[cursor..start]);

            if lower[start..].starts_with("<!--") {
                cursor = match lower[start + 4..].find("-->") {
                    Some(r) => start + 4 + r + 3,
                    None => html.len(),
                };
                continue;
            }

            let Some(end) = find_tag_end(html, start) else {
                out.push_str(&escape_html(&html[start..]));
                cursor = html.len();
                break;
            };
            let inner = &html[start + 1..end];
            cursor = end + 1;

            if let Some(name) = inner.trim_start().strip_prefix('/') {
                let name = tag_name(name);
                if ALLOWED_TAGS.contains(&name.as_str()) {
                    out.push_str("</");
                    out.push_str(&name);
                    out.push('>');
                }
                continue;
            }

            let Some(tag) = parse_open_tag(inner) else {
                continue;
            };

            if DROP_WITH_CONTENT.contains(&tag.name.as_str()) {
                let close = format!("</{}", tag.name);
                cursor = match lower[cursor..].find(&close) {
                    Some(r) => {
                        let close_start = cursor + r;
                        find_tag_end(html, close_start).map_or(html.len(), |e| e + 1)
                    }
                    None => html.len(),
                };
                continue;
            }

            if ALLOWED_TAGS.contains(&tag.name.as_str()) {
                out.push_str(&rebuild_open_tag(&tag));
            }
        }

        if cursor < html.len() {
            out.push_str(&html[cursor..]);
        }
        out
    }
}

#[derive(Debug, Clone)]
struct ParsedAttr {
    key: String,
    value: Option<String>,
}

#[derive(Debug, Clone)]
struct ParsedOpenTag {
    name: String,
    attrs: Vec<ParsedAttr>,
    self_closing: bool,
}

fn find_tag_end(source: &str, start: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (offset, ch) in source[start..].char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '>' => return Some(start + offset),
            _ => {}
        }
    }
    None
}

fn tag_name(s: &str) -> String {
    s.trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn parse_open_tag(inner: &str) -> Option<ParsedOpenTag> {
    let s = inner.trim();
    if s.is_empty() || s.starts_with('!') || s.starts_with('?') {
        return None;
    }
    let name = tag_name(s);
    if name.is_empty() {
        return None;
    }
    let bytes = s.as_bytes();
    let mut i = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphanumeric())
        .map_or(s.len(), |(idx, _)| idx);
    let mut attrs = Vec::new();
    let mut self_closing = false;

    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        if bytes[i] == b'/' {
            self_closing = true;
            i += 1;
            continue;
        }

        let key_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'='
            && bytes[i] != b'/'
        {
            i += 1;
        }
        if i == key_start {
            i += 1;
            continue;
        }
        let key = s[key_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let mut value = None;
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                let val_start = i;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                value = Some(s[val_start..i].to_string());
                i = (i + 1).min(bytes.len());
            } else {
                let val_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                value = Some(s[val_start..i].to_string());
            }
        }
        attrs.push(ParsedAttr { key, value });
    }

    Some(ParsedOpenTag {
        name,
        attrs,
        self_closing,
    })
}

fn rebuild_open_tag(tag: &ParsedOpenTag) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(&tag.name);
    for attr in &tag.attrs {
        if !allowed_attr(&tag.name, &attr.key) {
            continue;
        }
        let value = attr.value.as_deref().unwrap_or_default();
        if is_url_attr(&attr.key) && !is_safe_url(value) {
            continue;
        }
        out.push(' ');
        out.push_str(&attr.key);
        out.push_str("=\"");
        // Values arrive entity-encoded; only the delimiters need guarding.
        out.push_str(&value.replace('"', "&quot;").replace('<', "&lt;"));
        out.push('"');
    }
    if tag.self_closing {
        out.push_str(" />");
    } else {
        out.push('>');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(s: &str) -> String {
        AllowlistSanitizer.sanitize(s)
    }

    #[test]
    fn converts_markdown() {
        let html = CmarkConverter.to_html("# Title\n\nSome *text*.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn keeps_allowed_structure() {
        let html = "<h2>Hi</h2><p>a <strong>b</strong> &amp; c</p><ul><li>x</li></ul>";
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn drops_script_with_content() {
        assert_eq!(sanitize("<p>a</p><script>alert(1)</script><p>b</p>"), "<p>a</p><p>b</p>");
        assert_eq!(sanitize("<SCRIPT src=x>bad()</SCRIPT>ok"), "ok");
    }

    #[test]
    fn strips_unknown_tags_keeps_text() {
        assert_eq!(sanitize("<marquee>hey</marquee>"), "hey");
        assert_eq!(sanitize("a<!-- secret -->b"), "ab");
    }

    #[test]
    fn strips_handlers_and_bad_urls() {
        assert_eq!(
            sanitize("<a href=\"javascript:alert(1)\" onclick=\"x()\">go</a>"),
            "<a>go</a>"
        );
        assert_eq!(
            sanitize("<a href=\"https://example.com/?a=1&amp;b=2\" title=\"t\">go</a>"),
            "<a href=\"https://example.com/?a=1&amp;b=2\" title=\"t\">go</a>"
        );
        let img = "<img src=\"./logo.png\" alt=\"logo\" />";
        assert_eq!(sanitize(img), img);
        assert_eq!(sanitize("<img src=\"data:text/html,x\">"), "<img>");
        assert_eq!(sanitize("<p style=\"color:red\">x</p>"), "<p>x</p>");
    }

    #[test]
    fn url_schemes() {
        assert!(is_safe_url("https://a.b"));
        assert!(is_safe_url("mailto:me@x.y"));
        assert!(is_safe_url("docs/page.html#top"));
        assert!(is_safe_url("/abs?q=a:b"));
        assert!(!is_safe_url(" JaVa Script:alert(1)"));
        assert!(!is_safe_url("java&#115;cript:x"));
        assert!(!is_safe_url("vbscript:x"));
    }

    #[test]
    fn unterminated_tag_is_escaped() {
        assert_eq!(sanitize("a < b"), "a &lt; b");
    }

    #[test]
    fn full_pipeline_sanitizes_embedded_html() {
        let r = ReadmeRenderer::standard();
        let out = r.render("Hello\n\n<script>steal()</script>\n\n[x](javascript:evil())").to_html();
        assert!(out.contains("<p>Hello</p>"));
        assert!(!out.contains("script"));
        assert!(!out.contains("javascript"));
    }

    #[test]
    fn without_sanitizer_text_is_escaped_and_wrapped() {
        let r = ReadmeRenderer::from_flags(true, false);
        let out = r.render("# T").to_html();
        assert!(out.starts_with("<pre>&lt;h1&gt;T&lt;/h1&gt;"));
        assert!(out.ends_with("</pre>"));

        let r = ReadmeRenderer::from_flags(false, false);
        assert_eq!(r.render("a <b> & c").to_html(), "<pre>a &lt;b&gt; &amp; c</pre>");
    }

    #[test]
    fn without_converter_source_is_sanitized_raw() {
        let r = ReadmeRenderer::from_flags(false, true);
        assert_eq!(r.render("# T <em>x</em><script>y</script>").to_html(), "# T <em>x</em>");
    }
}
