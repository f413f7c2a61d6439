//! Minimal markup scanner for the listing pages the watcher consumes.
//!
//! This is not a general HTML tokenizer. It splits a document into start
//! tags, end tags and text runs, skipping comments and declarations, which is
//! all the strict table parser in [`crate::table`] needs.

use std::borrow::Cow;

/// One event produced while scanning a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent<'a> {
    /// A start tag. The name is the raw slice from the document.
    Open(&'a str),
    /// An end tag.
    Close(&'a str),
    /// A text run between tags, with character references decoded.
    Text(Cow<'a, str>),
}

/// Iterator over the [`MarkupEvent`]s of a document.
///
/// Attribute values are honored when locating the end of a tag, so a quoted
/// `>` inside an attribute does not terminate it. Each text run between two
/// tags arrives as a single event.
pub struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { rest: input }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = MarkupEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.rest.is_empty() {
                return None;
            }

            let Some(inside) = self.rest.strip_prefix('<') else {
                // Text run up to the next tag, or to the end of input.
                let end = self.rest.find('<').unwrap_or(self.rest.len());
                let text = &self.rest[..end];
                self.rest = &self.rest[end..];
                if text.is_empty() {
                    continue;
                }
                return Some(MarkupEvent::Text(decode_entities(text)));
            };

            if let Some(after) = inside.strip_prefix("!--") {
                // Comment; unterminated comments swallow the rest of the input.
                match after.find("-->") {
                    Some(end) => {
                        self.rest = &after[end + 3..];
                        continue;
                    }
                    None => {
                        self.rest = "";
                        return None;
                    }
                }
            }

            if inside.starts_with('!') || inside.starts_with('?') {
                // Declaration (<!DOCTYPE ...>) or processing instruction.
                match inside.find('>') {
                    Some(end) => {
                        self.rest = &inside[end + 1..];
                        continue;
                    }
                    None => {
                        self.rest = "";
                        return None;
                    }
                }
            }

            if let Some(after) = inside.strip_prefix('/') {
                let end = after.find('>').unwrap_or(after.len());
                let name = after[..end].trim();
                self.rest = after.get(end + 1..).unwrap_or("");
                if name.is_empty() {
                    continue;
                }
                return Some(MarkupEvent::Close(name));
            }

            let name_end = inside
                .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
                .unwrap_or(inside.len());
            let name = &inside[..name_end];
            match tag_end(&inside[name_end..]) {
                Some(offset) => {
                    self.rest = &inside[name_end + offset..];
                }
                None => {
                    // Unterminated tag at end of input.
                    self.rest = "";
                }
            }
            if name.is_empty() {
                continue;
            }
            return Some(MarkupEvent::Open(name));
        }
    }
}

/// Byte offset just past the closing `>`, skipping quoted attribute values.
fn tag_end(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'>' => return Some(i + 1),
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                if i >= bytes.len() {
                    return None;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Decode the character references the listing pages use.
///
/// `&nbsp;` becomes U+00A0, which counts as whitespace for trimming later.
/// Unknown references are passed through verbatim.
fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match parse_entity(rest) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Parse one `&...;` reference at the start of `s`, returning the decoded
/// character and the byte length consumed.
fn parse_entity(s: &str) -> Option<(char, usize)> {
    let body = s.strip_prefix('&')?;
    let semi = body.find(';')?;
    if semi == 0 || semi > 8 {
        return None;
    }
    let name = &body[..semi];
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((ch, semi + 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(input: &str) -> Vec<MarkupEvent<'_>> {
        Scanner::new(input).collect()
    }

    #[test]
    fn splits_tags_and_text() {
        assert_eq!(
            events("<td>x</td>"),
            vec![
                MarkupEvent::Open("td"),
                MarkupEvent::Text(Cow::Borrowed("x")),
                MarkupEvent::Close("td"),
            ]
        );
    }

    #[test]
    fn quoted_gt_does_not_end_a_tag() {
        assert_eq!(
            events(r#"<a href="?C=N;O=D><x">Name</a>"#),
            vec![
                MarkupEvent::Open("a"),
                MarkupEvent::Text(Cow::Borrowed("Name")),
                MarkupEvent::Close("a"),
            ]
        );
    }

    #[test]
    fn doctype_and_comments_are_skipped() {
        let input = "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\">\n<!-- x --><hr>";
        assert_eq!(
            events(input),
            vec![MarkupEvent::Text(Cow::Borrowed("\n")), MarkupEvent::Open("hr")]
        );
    }

    #[test]
    fn entities_are_decoded_within_one_text_run() {
        assert_eq!(
            events("A &amp; B&nbsp;&#65;&#x42;&bogus;"),
            vec![MarkupEvent::Text(Cow::Owned("A & B\u{a0}AB&bogus;".to_string()))]
        );
    }

    #[test]
    fn self_closing_tag_yields_open_event() {
        assert_eq!(events("<hr />"), vec![MarkupEvent::Open("hr")]);
    }
}
