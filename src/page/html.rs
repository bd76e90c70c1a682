//! Reading and writing pages as HTML
//!
//! Only two things are understood: the `<html>` start tag and
//! `<pre><code>...</code></pre>` blocks. Everything else is carried through
//! untouched.

use super::document::{Content, Page, Segment};
use super::{COPY_CLASS, RENDERED_CLASS};
use crate::syntax::escape_html;

impl Page {
    /// Build a page from generated HTML
    pub fn from_html(html: &str) -> Self {
        let mut page = Page::new();
        let mut pos = 0;

        if let Some((start, end)) = find_tag(html, 0, "html") {
            let attrs = parse_attrs(&html[start + "<html".len()..end - 1]);
            for (name, value) in attrs {
                if name == "class" {
                    page.root.classes = split_classes(&value);
                } else {
                    page.root.attrs.push((name, value));
                }
            }
            page.segments.push(Segment::Html(html[..start].to_string()));
            page.segments.push(Segment::Root);
            pos = end;
        }

        while let Some((pre_start, pre_end)) = find_tag(html, pos, "pre") {
            match parse_code_block(html, pre_end) {
                Some(block) => {
                    page.segments
                        .push(Segment::Html(html[pos..pre_start].to_string()));
                    page.push_block(
                        block.classes,
                        decode_entities(block.text),
                        html[pre_start..pre_end].to_string(),
                        block.attrs,
                    );
                    pos = block.end;
                }
                None => {
                    // Not a code block; keep it as plain HTML
                    page.segments
                        .push(Segment::Html(html[pos..pre_end].to_string()));
                    pos = pre_end;
                }
            }
        }

        page.segments.push(Segment::Html(html[pos..].to_string()));
        page
    }

    /// Serialize the page, rendered blocks included
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Html(html) => out.push_str(html),
                Segment::Root => {
                    out.push_str("<html");
                    if !self.root.classes.is_empty() {
                        push_attr(&mut out, "class", &self.root.classes.join(" "));
                    }
                    for (name, value) in &self.root.attrs {
                        push_attr(&mut out, name, value);
                    }
                    out.push('>');
                }
                Segment::Block(index) => {
                    let slot = &self.slots[*index];
                    match &slot.node.content {
                        Content::Source(text) => {
                            out.push_str(&slot.pre_open);
                            out.push_str("<code");
                            if !slot.node.classes.is_empty() {
                                push_attr(&mut out, "class", &slot.node.classes.join(" "));
                            }
                            for (name, value) in &slot.code_attrs {
                                push_attr(&mut out, name, value);
                            }
                            out.push('>');
                            out.push_str(&escape_html(text));
                            out.push_str("</code></pre>");
                        }
                        Content::Rendered(rendered) => {
                            out.push_str(&format!(
                                "<div class=\"{}\" data-theme=\"{}\">",
                                RENDERED_CLASS,
                                escape_html(&rendered.theme)
                            ));
                            out.push_str(&rendered.markup);
                            out.push_str(&format!(
                                "<button class=\"{}\" type=\"button\" data-state=\"{}\" aria-label=\"Copy code\">{}</button></div>",
                                COPY_CLASS,
                                rendered.copy.state.as_str(),
                                rendered.copy.state.label()
                            ));
                        }
                    }
                }
            }
        }
        out
    }
}

struct CodeBlock<'a> {
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    text: &'a str,
    /// Byte offset just past `</pre>`
    end: usize,
}

/// `<code ...>text</code>` followed by `</pre>`, starting right after `<pre>`
fn parse_code_block(html: &str, after_pre: usize) -> Option<CodeBlock<'_>> {
    let code_start = after_pre + leading_ws(&html[after_pre..]);
    let (start, open_end) = find_tag(html, code_start, "code")?;
    if start != code_start {
        return None;
    }

    let close = open_end + html[open_end..].find("</code>")?;
    let after_code = close + "</code>".len();
    let pre_close = after_code + leading_ws(&html[after_code..]);
    if !html[pre_close..].starts_with("</pre>") {
        return None;
    }

    let mut classes = Vec::new();
    let mut attrs = Vec::new();
    for (name, value) in parse_attrs(&html[start + "<code".len()..open_end - 1]) {
        if name == "class" {
            classes = split_classes(&value);
        } else {
            attrs.push((name, value));
        }
    }

    Some(CodeBlock {
        classes,
        attrs,
        text: &html[open_end..close],
        end: pre_close + "</pre>".len(),
    })
}

/// Find the next `<name ...>` start tag at or after `from`; returns the
/// offsets of `<` and just past `>`
fn find_tag(html: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let needle = format!("<{}", name);
    let mut search = from;
    while let Some(found) = html[search..].find(&needle) {
        let start = search + found;
        let after = start + needle.len();
        match html[after..].chars().next() {
            Some(c) if c == '>' || c.is_ascii_whitespace() => {
                return Some((start, tag_end(html, after)?));
            }
            _ => search = after,
        }
    }
    None
}

/// Offset just past the `>` closing the tag whose attributes start at
/// `from`; a `>` inside a quoted attribute value does not count
fn tag_end(html: &str, from: usize) -> Option<usize> {
    let mut quote = None;
    let mut after_eq = false;
    for (i, b) in html.bytes().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'>' => return Some(i + 1),
                b'"' | b'\'' if after_eq => quote = Some(b),
                b'=' => after_eq = true,
                b if b.is_ascii_whitespace() => {}
                _ => after_eq = false,
            },
        }
    }
    None
}

fn leading_ws(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

fn split_classes(value: &str) -> Vec<String> {
    value.split_whitespace().map(String::from).collect()
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html(value));
    out.push('"');
}

/// Parse `a="x" b='y' c=z d` into name/value pairs, values entity-decoded
pub(crate) fn parse_attrs(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = s.trim_start();

    while !rest.is_empty() {
        let name_len = rest
            .find(|c: char| c.is_ascii_whitespace() || c == '=' || c == '/')
            .unwrap_or(rest.len());
        if name_len == 0 {
            // Stray `/` or `=`
            rest = rest[1..].trim_start();
            continue;
        }
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let (value, remaining) = match after_eq.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    let close = body.find(q).unwrap_or(body.len());
                    (&body[..close], body.get(close + 1..).unwrap_or(""))
                }
                _ => {
                    let end = after_eq
                        .find(|c: char| c.is_ascii_whitespace())
                        .unwrap_or(after_eq.len());
                    (&after_eq[..end], &after_eq[end..])
                }
            };
            rest = remaining.trim_start();
            decode_entities(value)
        } else {
            String::new()
        };

        attrs.push((name, value));
    }
    attrs
}

/// Decode the character references a page generator emits
pub(crate) fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &rest[1..semi];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => {
                    let code = if let Some(hex) = entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        entity.strip_prefix('#').and_then(|d| d.parse().ok())
                    };
                    code.and_then(char::from_u32)
                }
            };
            c.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
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
