//! Recursive filesystem globbing and fnmatch-style filtering.
//!
//! Matching is done on `/`-separated paths relative to a base directory.
//! A glob `*` stays inside one path component and never matches a leading
//! dot; a component that is exactly `**` spans zero or more directories.
//! An fnmatch `*` matches across components.

use std::path::Path;

use regex::Regex;
use walkdir::WalkDir;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone)]
enum Segment {
    AnyDepth,
    Component { regex: Regex, dot: bool },
}

/// A compiled recursive glob.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    segments: Vec<Segment>,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut segments = Vec::new();
        for part in pattern.split('/') {
            if part.is_empty() || part == "." {
                continue;
            }
            if part == "**" {
                // consecutive `**` components are equivalent to one
                if !matches!(segments.last(), Some(Segment::AnyDepth)) {
                    segments.push(Segment::AnyDepth);
                }
                continue;
            }
            let body = translate(part, "[^/]*", "[^/]");
            let regex = Regex::new(&format!("^(?s:{body})$"))
                .map_err(|e| ConfigError::invalid_pattern(pattern, e.to_string()))?;
            segments.push(Segment::Component {
                regex,
                dot: part.starts_with('.'),
            });
        }
        if segments.is_empty() {
            return Err(ConfigError::invalid_pattern(pattern, "pattern is empty"));
        }
        Ok(GlobPattern {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn is_recursive(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::AnyDepth))
    }

    /// Whether a `/`-separated relative path matches.
    pub fn matches(&self, relative: &str) -> bool {
        let parts: Vec<&str> = relative.split('/').filter(|p| !p.is_empty()).collect();
        !parts.is_empty() && match_segments(&self.segments, &parts)
    }

    /// Walk `base_dir` and return every matching file or directory as a
    /// relative path, sorted lexicographically.
    pub fn resolve(&self, base_dir: &Path) -> Vec<String> {
        let mut walker = WalkDir::new(base_dir).min_depth(1).follow_links(true);
        if !self.is_recursive() {
            walker = walker.max_depth(self.segments.len());
        }

        let mut matched = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("skipping unreadable entry under {}: {err}", base_dir.display());
                    continue;
                }
            };
            let Some(relative) = relative_str(base_dir, entry.path()) else {
                log::warn!("skipping non UTF-8 path {}", entry.path().display());
                continue;
            };
            if self.matches(&relative) {
                matched.push(relative);
            }
        }
        matched.sort();
        matched
    }
}

fn relative_str(base_dir: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base_dir).ok()?;
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    parts.map(|p| p.join("/"))
}

fn is_hidden(part: &str) -> bool {
    part.starts_with('.')
}

fn match_segments(segments: &[Segment], parts: &[&str]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return parts.is_empty();
    };
    match first {
        Segment::AnyDepth => {
            for skip in 0..=parts.len() {
                if skip > 0 && is_hidden(parts[skip - 1]) {
                    return false;
                }
                if match_segments(rest, &parts[skip..]) {
                    return true;
                }
            }
            false
        }
        Segment::Component { regex, dot } => match parts.split_first() {
            Some((part, tail)) => {
                (*dot || !is_hidden(part)) && regex.is_match(part) && match_segments(rest, tail)
            }
            None => false,
        },
    }
}

/// Translate shell wildcards into a regex body. `[...]` classes keep their
/// meaning (with `!` negation); an unterminated `[` is literal.
pub(crate) fn translate(pattern: &str, star: &str, question: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                while i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 1;
                }
                out.push_str(star);
            }
            '?' => out.push_str(question),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i + 1..end]));
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    out
}

fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    // a `]` right after the opening bracket is literal
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

fn translate_class(body: &[char]) -> String {
    let mut out = String::from("[");
    let mut rest = body;
    if let Some(('!', tail)) = rest.split_first() {
        out.push('^');
        rest = tail;
    } else if let Some(('^', tail)) = rest.split_first() {
        out.push_str(r"\^");
        rest = tail;
    }
    for &c in rest {
        match c {
            '\\' | '[' | ']' | '&' | '~' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push(']');
    out
}

/// An fnmatch-style filter applied to whole relative paths.
#[derive(Debug, Clone)]
pub struct PathFilter {
    regex: Regex,
}

impl PathFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        let body = translate(pattern, ".*", ".");
        let regex = Regex::new(&format!("^(?s:{body})$"))
            .map_err(|e| ConfigError::invalid_pattern(pattern, e.to_string()))?;
        Ok(PathFilter { regex })
    }

    pub fn matches(&self, relative: &str) -> bool {
        self.regex.is_match(relative)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn star_stays_in_component() {
        let g = GlobPattern::new("*/anat/*T1w*").unwrap();
        assert!(g.matches("sub-01/anat/sub-01_T1w.nii.gz"));
        assert!(!g.matches("sub-01/ses-1/anat/sub-01_T1w.nii.gz"));
        assert!(!g.matches("sub-01/anat"));
    }

    #[test]
    fn double_star_spans_directories() {
        let g = GlobPattern::new("**/*T1w*").unwrap();
        assert!(g.matches("a_T1w.png"));
        assert!(g.matches("sub-01/ses-1/anat/sub-01_T1w.png"));
        assert!(!g.matches("sub-01/anat/sub-01_bold.png"));
    }

    #[test]
    fn hidden_entries_need_explicit_dot() {
        assert!(!GlobPattern::new("*").unwrap().matches(".git"));
        assert!(GlobPattern::new(".*").unwrap().matches(".git"));
        assert!(!GlobPattern::new("**/*.png").unwrap().matches(".cache/a.png"));
    }

    #[test]
    fn question_and_classes() {
        let g = GlobPattern::new("run-?_[!x]*.png").unwrap();
        assert!(g.matches("run-1_a.png"));
        assert!(!g.matches("run-1_x.png"));
        assert!(!g.matches("run-12_a.png"));
    }

    #[test]
    fn empty_pattern_is_invalid() {
        assert!(GlobPattern::new("").is_err());
        assert!(GlobPattern::new("./").is_err());
    }

    #[test]
    fn resolve_sorts_and_includes_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "sub-02/anat/sub-02_T1w.png");
        touch(dir.path(), "sub-01/anat/sub-01_T1w.png");
        touch(dir.path(), "participants.tsv");

        let files = GlobPattern::new("*/anat/*").unwrap().resolve(dir.path());
        assert_eq!(
            files,
            ["sub-01/anat/sub-01_T1w.png", "sub-02/anat/sub-02_T1w.png"]
        );

        let dirs = GlobPattern::new("sub-*").unwrap().resolve(dir.path());
        assert_eq!(dirs, ["sub-01", "sub-02"]);
    }

    #[test]
    fn filter_star_crosses_components() {
        let f = PathFilter::new("sub-01*").unwrap();
        assert!(f.matches("sub-01/anat/sub-01_T1w.png"));
        assert!(!f.matches("sub-02/anat/sub-02_T1w.png"));
        assert!(PathFilter::new("*[ab]").unwrap().matches("x/y/a"));
        assert!(PathFilter::new("weird[").unwrap().matches("weird["));
    }
}
