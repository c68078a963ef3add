//! Exclusion rules for tarball packaging.
//!
//! Rules come from three places, in order:
//! - the built-in [`DEFAULT_EXCLUDES`] list
//! - caller-supplied patterns
//! - one pattern per line of a `.dockerignore` at the root of the tree
//!
//! A rule excludes a directory when the relative path equals the rule or sits
//! below it, and otherwise excludes a path when the rule matches it as a
//! single-segment glob (`*` and `?` never cross `/`, `**` is not recursive).
//! Character classes negate only with `^`, and `\` escapes inside them.
//!
//! Any rule that is empty or contains [`MARKER_TOKEN`] is inert. The built-in
//! `Dockerfile` entry therefore never excludes anything.
// NOTE: the marker check most likely meant to force-exclude the manifest and
// instead makes every rule mentioning it inert. Uploads rely on the manifest
// being shipped, so treat this as a known defect rather than changing it here.

use crate::error::{Error, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::fs;
use std::io;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

/// Patterns that are always excluded from the tarball.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "Dockerfile",
    ".dockerignore",
    ".gitignore",
    ".git",
    "node_modules",
    "*.env",
];

/// Any rule containing this token never excludes anything.
pub const MARKER_TOKEN: &str = "Dockerfile";

/// Ignore file read from the root of the tree being packaged.
pub const IGNORE_FILENAME: &str = ".dockerignore";

/// A single trimmed exclusion pattern.
#[derive(Debug, Clone)]
pub struct ExclusionRule {
    pattern: String,
    /// `None` when the pattern is not a valid glob
    matcher: Option<GlobMatcher>,
}

impl ExclusionRule {
    /// Creates a rule from a raw pattern, trimming surrounding whitespace.
    pub fn new(raw: &str) -> Self {
        let pattern = raw.trim().to_string();
        let matcher = if pattern.is_empty() {
            None
        } else {
            match compile_glob(&pattern) {
                Ok(matcher) => Some(matcher),
                Err(e) => {
                    tracing::warn!("Ignoring malformed exclusion pattern '{}': {}", pattern, e);
                    None
                }
            }
        };

        Self { pattern, matcher }
    }

    /// The trimmed pattern text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if this rule can never exclude a path.
    pub fn is_inert(&self) -> bool {
        self.pattern.is_empty() || self.pattern.contains(MARKER_TOKEN)
    }

    /// Returns true if the pattern failed to compile as a glob.
    pub fn is_malformed(&self) -> bool {
        !self.pattern.is_empty() && self.matcher.is_none()
    }

    /// Checks a `/`-separated relative path against this rule.
    pub fn matches(&self, relative_path: &str, is_dir: bool) -> bool {
        if self.is_inert() {
            return false;
        }

        if is_dir
            && (relative_path == self.pattern
                || relative_path
                    .strip_prefix(self.pattern.as_str())
                    .is_some_and(|rest| rest.starts_with('/')))
        {
            return true;
        }

        self.matcher
            .as_ref()
            .is_some_and(|matcher| matcher.is_match(relative_path))
    }
}

/// The full set of exclusion rules applied to one tree.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    rules: Vec<ExclusionRule>,
}

impl ExclusionSet {
    /// Creates a rule set from the built-in defaults plus additional patterns.
    pub fn new<I, S>(additional_patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = DEFAULT_EXCLUDES
            .iter()
            .copied()
            .map(ExclusionRule::new)
            .chain(
                additional_patterns
                    .into_iter()
                    .map(|p| ExclusionRule::new(p.as_ref())),
            )
            .collect();

        Self { rules }
    }

    /// Creates the rule set for `root`: defaults, additional patterns, then
    /// the lines of `root/.dockerignore` if that file exists.
    pub fn for_root<I, S>(root: &Path, additional_patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new(additional_patterns);

        let ignore_path = root.join(IGNORE_FILENAME);
        match fs::read(&ignore_path) {
            Ok(content) => {
                let content = String::from_utf8_lossy(&content);
                let before = set.rules.len();
                set.rules.extend(content.split('\n').map(ExclusionRule::new));
                tracing::debug!(
                    "Loaded {} rules from {}",
                    set.rules.len() - before,
                    ignore_path.display()
                );
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::ignore_file(ignore_path, e)),
        }

        Ok(set)
    }

    /// Returns true if the relative path is excluded. For a directory this
    /// also means none of its descendants are visited.
    pub fn is_excluded(&self, relative_path: &str, is_dir: bool) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.matches(relative_path, is_dir))
    }

    /// Patterns that can actually exclude something.
    pub fn active_patterns(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|rule| !rule.is_inert())
            .map(ExclusionRule::pattern)
    }

    /// All rules, including inert ones, in evaluation order.
    pub fn rules(&self) -> &[ExclusionRule] {
        &self.rules
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

#[derive(Debug, thiserror::Error)]
enum PatternError {
    #[error("unterminated or malformed character class")]
    Class,

    #[error("character class matches nothing")]
    EmptyClass,

    #[error(transparent)]
    Glob(#[from] globset::Error),
}

fn compile_glob(pattern: &str) -> std::result::Result<GlobMatcher, PatternError> {
    let glob = GlobBuilder::new(&single_segment_glob(pattern)?)
        .literal_separator(true)
        .backslash_escape(true)
        .build()?;
    Ok(glob.compile_matcher())
}

/// Rewrites an ignore-file pattern into globset syntax with the same meaning:
/// runs of `*` collapse to one, braces are literal, and character classes
/// follow the ignore-file rules (`[^...]` negates, `\` escapes inside a class).
fn single_segment_glob(pattern: &str) -> std::result::Result<String, PatternError> {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '*' => {
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
                out.push('*');
            }
            '{' | '}' => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            '[' => {
                let (negated, ranges) = parse_class(&mut chars)?;
                out.push_str(&class_glob(negated, ranges)?);
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

type ClassRange = (char, char);

/// Parses the body of a class after its opening `[`. `^` negates, `\` takes
/// the next character literally, and an unescaped `-` or `]` may not start a
/// member. Reversed ranges are accepted and match nothing.
fn parse_class(
    chars: &mut Peekable<Chars<'_>>,
) -> std::result::Result<(bool, Vec<ClassRange>), PatternError> {
    let negated = chars.next_if_eq(&'^').is_some();
    let mut members = 0usize;
    let mut ranges = Vec::new();

    loop {
        if members > 0 && chars.next_if_eq(&']').is_some() {
            break;
        }
        let lo = class_char(chars)?;
        let hi = if chars.next_if_eq(&'-').is_some() {
            class_char(chars)?
        } else {
            lo
        };
        members += 1;
        if lo <= hi {
            ranges.push((lo, hi));
        }
    }

    ranges.sort_unstable();
    ranges.dedup();
    Ok((negated, ranges))
}

fn class_char(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<char, PatternError> {
    match chars.next() {
        None | Some('-') | Some(']') => Err(PatternError::Class),
        Some('\\') => chars.next().ok_or(PatternError::Class),
        Some(c) => Ok(c),
    }
}

/// Writes a parsed class in globset syntax. globset has no escapes inside a
/// class, so `]` is placed first, `-` first or last, and a leading `!` or `^`
/// is kept away from the negation position.
fn class_glob(
    negated: bool,
    ranges: Vec<ClassRange>,
) -> std::result::Result<String, PatternError> {
    let (ranges, has_close) = split_out(ranges, ']');
    let (mut ranges, has_dash) = split_out(ranges, '-');

    if ranges.is_empty() && !has_close && !has_dash {
        return if negated {
            Ok(format!("[{}-{}]", '\u{0}', char::MAX))
        } else {
            Err(PatternError::EmptyClass)
        };
    }

    let starts_negation = |r: &ClassRange| r.0 == '!' || r.0 == '^';
    let mut dash_first = false;
    if !negated && !has_close {
        if has_dash {
            dash_first = true;
        } else {
            if ranges.iter().all(starts_negation) {
                ranges = ranges
                    .into_iter()
                    .flat_map(|(lo, hi)| {
                        if lo < hi {
                            vec![(lo, lo), (step(lo, 1), hi)]
                        } else {
                            vec![(lo, hi)]
                        }
                    })
                    .collect();
            }
            match ranges.iter().position(|r| !starts_negation(r)) {
                Some(idx) => ranges.swap(0, idx),
                None => {
                    // Only `!` and `^` remain; spell them as escaped literals.
                    let literals: Vec<String> =
                        ranges.iter().map(|(c, _)| format!("\\{}", c)).collect();
                    return Ok(match literals.as_slice() {
                        [single] => single.clone(),
                        _ => format!("{{{}}}", literals.join(",")),
                    });
                }
            }
        }
    }

    let mut out = String::from("[");
    if negated {
        out.push('!');
    }
    if has_close {
        out.push(']');
    }
    if has_dash && dash_first {
        out.push('-');
    }
    for (lo, hi) in ranges {
        out.push(lo);
        if lo < hi {
            out.push('-');
            out.push(hi);
        }
    }
    if has_dash && !dash_first {
        out.push('-');
    }
    out.push(']');
    Ok(out)
}

/// Removes `c` from every range, splitting ranges that contain it.
fn split_out(ranges: Vec<ClassRange>, c: char) -> (Vec<ClassRange>, bool) {
    let mut found = false;
    let mut out = Vec::with_capacity(ranges.len() + 1);
    for (lo, hi) in ranges {
        if lo <= c && c <= hi {
            found = true;
            if lo < c {
                out.push((lo, step(c, -1)));
            }
            if c < hi {
                out.push((step(c, 1), hi));
            }
        } else {
            out.push((lo, hi));
        }
    }
    (out, found)
}

/// Neighbouring code point of an ASCII punctuation character.
fn step(c: char, delta: i32) -> char {
    char::from_u32((c as u32).wrapping_add_signed(delta)).unwrap_or(c)
}
