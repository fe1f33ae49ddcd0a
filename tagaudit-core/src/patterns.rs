// Pattern library
//
// Builds the matchers used by the rule evaluators. HTML is treated as text:
// nothing here parses markup, and malformed documents are matched as-is.
//
// The regex crate has no lookaround and no backreferences, so the two
// attribute conditions are split in two phases: a regex finds each opening
// construct `<tag ...>`, then `forbidden_assignment_at` walks its attribute
// region by hand.

use crate::error::Result;
use regex::Regex;

/// `<tag ...>` or `<tag/>`, lazily followed by an optional `</tag>`.
///
/// The lazy body means a match never extends past the opening construct
/// unless the closing tag follows immediately, so counting matches counts
/// opening tags of both the paired and the self-closing form.
pub(crate) fn closing_pair(tag: &str) -> Result<Regex> {
    let tag = regex::escape(tag);
    Ok(Regex::new(&format!(r"<{tag}\b[^>]*>(?:.*?)(?:</{tag}>)?"))?)
}

/// Captures the text between the first `<tag>` and the next `</tag>`.
pub(crate) fn inner_content(tag: &str) -> Result<Regex> {
    let tag = regex::escape(tag);
    Ok(Regex::new(&format!(r"(?s)<{tag}>(.*?)</{tag}>"))?)
}

/// What must NOT appear in a tag's attribute region for the tag to count.
#[derive(Debug, Clone, Copy)]
enum Forbidden<'a> {
    /// `attribute=` followed by any quoted value
    AnyValue,
    /// `attribute="value"` or `attribute='value'`
    Value(&'a str),
}

/// Counts opening tags that lack a given attribute assignment.
#[derive(Debug)]
pub(crate) struct AttributeFilter<'a> {
    opening: Regex,
    tag_len: usize,
    attribute: &'a str,
    forbidden: Forbidden<'a>,
}

impl<'a> AttributeFilter<'a> {
    /// Matches `<tag>` elements with no `attribute="..."` at all.
    pub(crate) fn absent(tag: &str, attribute: &'a str) -> Result<Self> {
        Self::build(tag, attribute, Forbidden::AnyValue)
    }

    /// Matches `<tag>` elements where `attribute="value"` is absent; the
    /// attribute carrying any other value still matches.
    pub(crate) fn mismatched(tag: &str, attribute: &'a str, value: &'a str) -> Result<Self> {
        Self::build(tag, attribute, Forbidden::Value(value))
    }

    fn build(tag: &str, attribute: &'a str, forbidden: Forbidden<'a>) -> Result<Self> {
        // Tag name must end at whitespace, `/` or `>`
        let opening = Regex::new(&format!(r"<{}(?:[\s/][^>]*)?>", regex::escape(tag)))?;
        Ok(Self {
            opening,
            tag_len: tag.len(),
            attribute,
            forbidden,
        })
    }

    /// Number of non-overlapping matches in `context`.
    ///
    /// A rejected candidate resumes the search one character after its `<`,
    /// so a `<tag` hidden inside a rejected tag's quoted value is still seen.
    pub(crate) fn count(&self, context: &str) -> usize {
        let bytes = context.as_bytes();
        let mut count = 0;
        let mut pos = 0;

        while let Some(found) = self.opening.find_at(context, pos) {
            let attrs_start = found.start() + 1 + self.tag_len;
            if self.forbidden_assignment_at(bytes, attrs_start) {
                pos = found.start() + 1;
            } else {
                count += 1;
                pos = found.end();
            }
        }

        count
    }

    /// Walks the attribute region starting at `start`, stepping over quoted
    /// values as whole units, and reports whether the forbidden assignment
    /// begins at any position visited before the tag closes.
    fn forbidden_assignment_at(&self, bytes: &[u8], start: usize) -> bool {
        let mut i = start;
        loop {
            if self.assignment_matches(&bytes[i..]) {
                return true;
            }
            match bytes.get(i) {
                None | Some(b'>') => return false,
                Some(b'=') => match quoted_value_end(bytes, i + 1) {
                    Some(end) => i = end,
                    None => return false,
                },
                Some(_) => i += 1,
            }
        }
    }

    /// `attribute \s* = \s* q ... q` where both quotes are the same character.
    fn assignment_matches(&self, rest: &[u8]) -> bool {
        let Some(after_name) = rest.strip_prefix(self.attribute.as_bytes()) else {
            return false;
        };
        let after_name = skip_whitespace(after_name);
        let Some(after_eq) = after_name.strip_prefix(b"=") else {
            return false;
        };
        let after_eq = skip_whitespace(after_eq);
        let Some((&quote, body)) = after_eq.split_first() else {
            return false;
        };
        if !is_quote(quote) {
            return false;
        }

        match self.forbidden {
            Forbidden::AnyValue => body.contains(&quote),
            Forbidden::Value(value) => body
                .strip_prefix(value.as_bytes())
                .and_then(|tail| tail.first())
                .is_some_and(|&closing| closing == quote),
        }
    }
}

/// Given the index just after an `=`, returns the index after the closing
/// quote of a quoted value, or `None` when no quoted value starts there.
fn quoted_value_end(bytes: &[u8], open: usize) -> Option<usize> {
    let quote = *bytes.get(open)?;
    if !is_quote(quote) {
        return None;
    }
    let body = &bytes[open + 1..];
    let close = body.iter().position(|&b| b == quote)?;
    Some(open + 1 + close + 1)
}

fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\''
}

fn skip_whitespace(bytes: &[u8]) -> &[u8] {
    let skip = bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
    &bytes[skip..]
}
