//! Plain rendered-document tree and the HTML boundary adapter.
//!
//! The tokenizers operate on a simple `(tag, attributes, children)` tree so
//! they can be fed literal trees in tests. `parse_document` adapts the site's
//! rendered HTML into that tree; it handles the fixed dialect the build emits
//! (lowercase tags, quoted attributes, no error recovery beyond tolerant
//! closing), not arbitrary web content.

/// One node of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Lowercased tag name.
    pub tag: String,
    /// Lowercased attribute names with decoded values.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Tags that force a line break in rendered text.
const BLOCK_LEVEL_TAGS: &[&str] = &[
    "div", "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "table", "tr", "td",
    "blockquote", "pre", "hr", "form",
];

/// Elements that never have children.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

impl Element {
    pub fn new(tag: impl Into<String>) -> Element {
        Element {
            tag: tag.into(),
            ..Element::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(n, _)| n == name)
    }

    /// All descendant text, concatenated without separators (DOM
    /// `textContent` semantics).
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Rendered text with soft line breaks: block-level children and `<br>`
    /// start new lines, anchors become `[text](href)` markdown links. This
    /// stands in for the original's off-screen `innerText` measurement, which
    /// only existed because a detached DOM node does not lay itself out.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        collect_visible(self, &mut out);
        out
    }

    /// Non-empty rendered lines, whitespace-collapsed.
    pub fn visible_lines(&self) -> Vec<String> {
        self.visible_text()
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn is_block_level(&self) -> bool {
        BLOCK_LEVEL_TAGS.contains(&self.tag.as_str())
    }

    /// First child element with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(e) if e.tag == tag => Some(e),
            _ => None,
        })
    }

    /// All child elements with one of the given tags, in order.
    pub fn children_tagged(&self, tags: &[&str]) -> Vec<&Element> {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Element(e) if tags.contains(&e.tag.as_str()) => Some(e),
                _ => None,
            })
            .collect()
    }

    /// First element child, if any.
    pub fn first_element(&self) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }
}

fn collect_text(elem: &Element, out: &mut String) {
    for child in &elem.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
        }
    }
}

fn collect_visible(elem: &Element, out: &mut String) {
    for child in &elem.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if e.tag == "a" => {
                let text = e.text_content();
                let href = e.attr("href").unwrap_or("");
                out.push_str(&format!("[{}]({})", text.trim(), href));
            }
            Node::Element(e) if e.tag == "br" => out.push('\n'),
            Node::Element(e) if e.is_block_level() => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                collect_visible(e, out);
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Node::Element(e) => collect_visible(e, out),
        }
    }
}

/// A located element together with the sibling list that contains it, so the
/// tokenizers can walk the preceding/following context.
#[derive(Debug, Clone, Copy)]
pub struct SiblingContext<'a> {
    pub siblings: &'a [Node],
    pub index: usize,
}

impl<'a> SiblingContext<'a> {
    pub fn target(&self) -> &'a Element {
        match &self.siblings[self.index] {
            Node::Element(e) => e,
            Node::Text(_) => unreachable!("sibling context always points at an element"),
        }
    }

    /// Element siblings before the target, nearest first.
    pub fn before(&self) -> Vec<&'a Element> {
        self.siblings[..self.index]
            .iter()
            .rev()
            .filter_map(|node| match node {
                Node::Element(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    /// Element siblings after the target, nearest first.
    pub fn after(&self) -> Vec<&'a Element> {
        self.siblings[self.index + 1..]
            .iter()
            .filter_map(|node| match node {
                Node::Element(e) => Some(e),
                _ => None,
            })
            .collect()
    }
}

/// Find every element with the given tag, paired with its sibling context.
pub fn find_elements<'a>(root: &'a Element, tag: &str) -> Vec<SiblingContext<'a>> {
    let mut found = Vec::new();
    walk_find(root, tag, &mut found);
    found
}

fn walk_find<'a>(elem: &'a Element, tag: &str, out: &mut Vec<SiblingContext<'a>>) {
    for (index, child) in elem.children.iter().enumerate() {
        if let Node::Element(e) = child {
            if e.tag == tag {
                out.push(SiblingContext {
                    siblings: &elem.children,
                    index,
                });
            }
            walk_find(e, tag, out);
        }
    }
}

// -- HTML reader --------------------------------------------------------------

/// Parse a rendered HTML document into a synthetic root element.
pub fn parse_document(html: &str) -> Element {
    let mut stack: Vec<Element> = vec![Element::new("#document")];
    let bytes = html.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'<' {
            if html[pos..].starts_with("<!--") {
                pos = match html[pos..].find("-->") {
                    Some(end) => pos + end + 3,
                    None => bytes.len(),
                };
            } else if html[pos..].starts_with("<!") {
                pos = skip_past(html, pos, '>');
            } else if html[pos..].starts_with("</") {
                let (tag, next) = read_tag_name(html, pos + 2);
                pos = skip_past(html, next, '>');
                close_tag(&mut stack, &tag);
            } else if pos + 1 < bytes.len() && bytes[pos + 1].is_ascii_alphabetic() {
                let (tag, next) = read_tag_name(html, pos + 1);
                let (attrs, self_closed, next) = read_attrs(html, next);
                pos = next;

                let elem = Element {
                    tag: tag.clone(),
                    attrs,
                    children: Vec::new(),
                };

                if tag == "script" || tag == "style" {
                    // Raw text content, skipped entirely.
                    let close = format!("</{tag}");
                    pos = match html[pos..].find(&close) {
                        Some(end) => skip_past(html, pos + end, '>'),
                        None => bytes.len(),
                    };
                    attach(&mut stack, Node::Element(elem));
                } else if self_closed || VOID_TAGS.contains(&tag.as_str()) {
                    attach(&mut stack, Node::Element(elem));
                } else {
                    stack.push(elem);
                }
            } else {
                // Stray `<` treated as text.
                attach(&mut stack, Node::Text("<".to_string()));
                pos += 1;
            }
        } else {
            let end = html[pos..]
                .find('<')
                .map(|i| pos + i)
                .unwrap_or(bytes.len());
            let text = decode_entities(&html[pos..end]);
            if !text.is_empty() {
                attach(&mut stack, Node::Text(text));
            }
            pos = end;
        }
    }

    // Tolerate unclosed elements at EOF.
    while stack.len() > 1 {
        let elem = stack.pop().unwrap();
        attach(&mut stack, Node::Element(elem));
    }
    stack.pop().unwrap()
}

fn attach(stack: &mut Vec<Element>, node: Node) {
    stack
        .last_mut()
        .expect("document root always on stack")
        .children
        .push(node);
}

fn close_tag(stack: &mut Vec<Element>, tag: &str) {
    // Only pop if the tag is actually open somewhere; otherwise ignore.
    if !stack.iter().skip(1).any(|e| e.tag == tag) {
        return;
    }
    loop {
        let elem = stack.pop().unwrap();
        let done = elem.tag == tag;
        attach(stack, Node::Element(elem));
        if done || stack.len() == 1 {
            break;
        }
    }
}

fn read_tag_name(html: &str, start: usize) -> (String, usize) {
    let mut end = start;
    for (i, c) in html[start..].char_indices() {
        if c.is_ascii_alphanumeric() || c == '-' {
            end = start + i + c.len_utf8();
        } else {
            break;
        }
    }
    (html[start..end].to_ascii_lowercase(), end)
}

fn read_attrs(html: &str, start: usize) -> (Vec<(String, String)>, bool, usize) {
    let mut attrs = Vec::new();
    let bytes = html.as_bytes();
    let mut pos = start;
    let mut self_closed = false;

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }
        if bytes[pos] == b'>' {
            pos += 1;
            break;
        }
        if bytes[pos] == b'/' {
            self_closed = true;
            pos += 1;
            continue;
        }

        let name_start = pos;
        while pos < bytes.len() && !b"=/> \t\r\n".contains(&bytes[pos]) {
            pos += 1;
        }
        let name = html[name_start..pos].to_ascii_lowercase();

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        let mut value = String::new();
        if pos < bytes.len() && bytes[pos] == b'=' {
            pos += 1;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos < bytes.len() && (bytes[pos] == b'"' || bytes[pos] == b'\'') {
                let quote = bytes[pos];
                pos += 1;
                let value_start = pos;
                while pos < bytes.len() && bytes[pos] != quote {
                    pos += 1;
                }
                value = decode_entities(&html[value_start..pos]);
                if pos < bytes.len() {
                    pos += 1;
                }
            } else {
                let value_start = pos;
                while pos < bytes.len() && !b"/> \t\r\n".contains(&bytes[pos]) {
                    pos += 1;
                }
                value = decode_entities(&html[value_start..pos]);
            }
        }

        if !name.is_empty() {
            attrs.push((name, value));
        }
    }

    (attrs, self_closed, pos)
}

fn skip_past(html: &str, start: usize, target: char) -> usize {
    match html[start..].find(target) {
        Some(i) => start + i + target.len_utf8(),
        None => html.len(),
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let Some(semi) = rest.find(';').filter(|&i| i <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
