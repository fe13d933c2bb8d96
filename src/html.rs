//! A small fragment tree standing in for the DOM.
//!
//! Text nodes are always escaped on output. `Node::Raw` is inserted verbatim
//! and is only built for the signal summary and the sanitized README.

use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Start building an element.
pub fn el(tag: &'static str) -> Element {
    Element {
        tag,
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

pub fn text(s: impl Into<String>) -> Node {
    Node::Text(s.into())
}

impl Element {
    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.push((key.to_string(), value.into()));
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(self, s: impl Into<String>) -> Self {
        self.child(Node::Text(s.into()))
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|c| c.split_whitespace().any(|x| x == class))
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

const VOID_TAGS: [&str; 5] = ["br", "hr", "img", "input", "meta"];

impl Node {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(&escape_html(s)),
            Node::Raw(s) => out.push_str(s),
            Node::Element(e) => {
                let _ = write!(out, "<{}", e.tag);
                for (k, v) in &e.attrs {
                    let _ = write!(out, " {}=\"{}\"", k, escape_html(v));
                }
                out.push('>');
                if VOID_TAGS.contains(&e.tag) {
                    return;
                }
                for c in &e.children {
                    c.write_html(out);
                }
                let _ = write!(out, "</{}>", e.tag);
            }
        }
    }

    /// Concatenated text of this subtree. Raw markup is included as-is.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(s) | Node::Raw(s) => s.clone(),
            Node::Element(e) => e.children.iter().map(Node::text_content).collect(),
        }
    }

    /// Every element in this subtree (pre-order) carrying `class`.
    pub fn find_by_class<'a>(&'a self, class: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(&|e| e.has_class(class), &mut found);
        found
    }

    pub fn find_by_tag<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(&|e| e.tag == tag, &mut found);
        found
    }

    fn collect<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, found: &mut Vec<&'a Element>) {
        if let Node::Element(e) = self {
            if pred(e) {
                found.push(e);
            }
            for c in &e.children {
                c.collect(pred, found);
            }
        }
    }
}

impl Element {
    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }
}

/// Serialize a fragment.
pub fn render_fragment(nodes: &[Node]) -> String {
    nodes.iter().map(Node::to_html).collect()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
