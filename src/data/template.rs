//! `{id}` template extraction.
//!
//! A pattern such as `{id}/anat/*T1w*` doubles as an extraction template:
//! the `{id}` token captures, every other wildcard matches without capturing.
//! When the token occurs more than once all occurrences must capture the
//! same text.

use regex::Regex;

use super::glob::translate;
use crate::error::{ConfigError, Result};

/// The identifier token recognised in patterns.
pub const ID_TOKEN: &str = "{id}";

enum Piece<'a> {
    Id,
    AnyDirs,
    Text(&'a str),
}

fn pieces(pattern: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    while i < pattern.len() {
        let rest = &pattern[i..];
        let at_component_start = i == 0 || pattern[..i].ends_with('/');
        let token_len = if rest.starts_with(ID_TOKEN) {
            Some((Piece::Id, ID_TOKEN.len()))
        } else if at_component_start && rest.starts_with("**/") {
            Some((Piece::AnyDirs, 3))
        } else {
            None
        };
        match token_len {
            Some((piece, len)) => {
                if text_start < i {
                    out.push(Piece::Text(&pattern[text_start..i]));
                }
                out.push(piece);
                i += len;
                text_start = i;
            }
            None => {
                i += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    if text_start < pattern.len() {
        out.push(Piece::Text(&pattern[text_start..]));
    }
    out
}

/// A compiled identifier extraction template.
#[derive(Debug, Clone)]
pub struct IdTemplate {
    pattern: String,
    regex: Regex,
    captures: usize,
}

/// Regex source for `pattern`. With `known` set, every `{id}` after the
/// first matches that literal text instead of capturing.
fn regex_body(pattern: &str, known: Option<&str>) -> (String, usize) {
    let mut body = String::new();
    let mut captures = 0;
    for piece in pieces(pattern) {
        match piece {
            Piece::Id => {
                match known {
                    Some(id) if captures > 0 => body.push_str(&regex::escape(id)),
                    _ => body.push_str(&format!("(?P<id{captures}>.+?)")),
                }
                captures += 1;
            }
            Piece::AnyDirs => body.push_str("(?:.*/)?"),
            Piece::Text(text) => body.push_str(&translate(text, ".*?", "[^/]")),
        }
    }
    (format!("^(?s:{body})$"), captures)
}

impl IdTemplate {
    /// Whether a pattern carries an identifier token at all.
    pub fn has_token(pattern: &str) -> bool {
        pattern.contains(ID_TOKEN)
    }

    pub fn new(pattern: &str) -> Result<Self> {
        let (body, captures) = regex_body(pattern, None);
        if captures == 0 {
            return Err(ConfigError::invalid_pattern(
                pattern,
                format!("no {ID_TOKEN} token to extract"),
            ));
        }
        let regex =
            Regex::new(&body).map_err(|e| ConfigError::invalid_pattern(pattern, e.to_string()))?;
        Ok(IdTemplate {
            pattern: pattern.to_string(),
            regex,
            captures,
        })
    }

    /// Extract the identifier from a relative path, or `None` when the path
    /// does not fit the template.
    ///
    /// A repeated token is resolved from its first occurrence; the path must
    /// then match with every later occurrence fixed to that text.
    pub fn extract(&self, relative: &str) -> Option<String> {
        let caps = self.regex.captures(relative)?;
        let first = caps.name("id0")?.as_str();
        if self.captures == 1 {
            return Some(first.to_string());
        }
        let (body, _) = regex_body(&self.pattern, Some(first));
        let pinned = Regex::new(&body).ok()?;
        pinned.is_match(relative).then(|| first.to_string())
    }
}
