//! # Glob Patterns
//!
//! Compiled glob patterns, shared by [`PurePath::matches`](crate::PurePath::matches)
//! and the directory-walking glob.
//!
//! ## Syntax
//!
//! | Token | Matches |
//! |-------|---------|
//! | `*` | Any run of characters within one segment |
//! | `?` | Exactly one character |
//! | `[abc]`, `[a-z]` | One character from the class |
//! | `[!abc]` | One character not in the class |
//! | `**` (whole segment) | Zero or more directory levels |
//!
//! An unterminated `[` is matched literally.

use std::borrow::Cow;

use crate::{PathError, PurePath};

/// One piece of a compiled segment pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Char(char),
    AnyChar,
    Star,
    Class { negated: bool, items: Vec<ClassItem> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassItem {
    Char(char),
    Range(char, char),
}

impl Token {
    fn matches_char(&self, c: char) -> bool {
        match self {
            Token::Char(expected) => *expected == c,
            Token::AnyChar => true,
            Token::Star => false,
            Token::Class { negated, items } => {
                let hit = items.iter().any(|item| match *item {
                    ClassItem::Char(x) => x == c,
                    ClassItem::Range(lo, hi) => lo <= c && c <= hi,
                });
                hit != *negated
            }
        }
    }
}

/// A glob pattern for a single path segment (no `/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPattern {
    source: String,
    tokens: Vec<Token>,
}

impl SegmentPattern {
    /// Compile a segment pattern.
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_owned(),
            tokens: compile(source),
        }
    }

    /// The pattern text this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the pattern contains no wildcard tokens.
    pub fn is_literal(&self) -> bool {
        self.tokens.iter().all(|t| matches!(t, Token::Char(_)))
    }

    /// Test a single segment against this pattern.
    pub fn matches(&self, name: &str) -> bool {
        let text: Vec<char> = name.chars().collect();
        match_tokens(&self.tokens, &text)
    }
}

fn compile(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                // Runs of stars are equivalent to one.
                if tokens.last() != Some(&Token::Star) {
                    tokens.push(Token::Star);
                }
                i += 1;
            }
            '?' => {
                tokens.push(Token::AnyChar);
                i += 1;
            }
            '[' => match compile_class(&chars, i + 1) {
                Some((token, next)) => {
                    tokens.push(token);
                    i = next;
                }
                None => {
                    tokens.push(Token::Char('['));
                    i += 1;
                }
            },
            c => {
                tokens.push(Token::Char(c));
                i += 1;
            }
        }
    }
    tokens
}

/// Parse a character class starting just after `[`. Returns the token and the
/// index after the closing `]`, or `None` when the class is unterminated.
fn compile_class(chars: &[char], start: usize) -> Option<(Token, usize)> {
    let mut i = start;
    let negated = chars.get(i) == Some(&'!');
    if negated {
        i += 1;
    }
    let body_start = i;
    let mut items = Vec::new();
    while i < chars.len() {
        let c = chars[i];
        // `]` directly after the opening bracket is a literal member.
        if c == ']' && i > body_start {
            return Some((Token::Class { negated, items }, i + 1));
        }
        if chars.get(i + 1) == Some(&'-') && chars.get(i + 2).is_some_and(|&hi| hi != ']') {
            items.push(ClassItem::Range(c, chars[i + 2]));
            i += 3;
        } else {
            items.push(ClassItem::Char(c));
            i += 1;
        }
    }
    None
}

/// Greedy star matching with single-point backtracking.
fn match_tokens(tokens: &[Token], text: &[char]) -> bool {
    let (mut ti, mut pi) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;
    while ti < text.len() {
        if let Some(token) = tokens.get(pi) {
            if *token == Token::Star {
                backtrack = Some((pi + 1, ti));
                pi += 1;
                continue;
            }
            if token.matches_char(text[ti]) {
                ti += 1;
                pi += 1;
                continue;
            }
        }
        match backtrack {
            Some((resume, consumed)) => {
                pi = resume;
                ti = consumed + 1;
                backtrack = Some((resume, consumed + 1));
            }
            None => return false,
        }
    }
    tokens[pi..].iter().all(|t| *t == Token::Star)
}

/// One segment of a multi-segment [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// No wildcards; matched by direct lookup.
    Literal(String),
    /// Contains wildcards; matched against directory listings.
    Wildcard(SegmentPattern),
    /// `**`: zero or more directory levels.
    Recursive,
}

impl PatternSegment {
    fn parse(segment: &str) -> Self {
        if segment == "**" {
            return PatternSegment::Recursive;
        }
        let compiled = SegmentPattern::new(segment);
        if compiled.is_literal() {
            PatternSegment::Literal(segment.to_owned())
        } else {
            PatternSegment::Wildcard(compiled)
        }
    }

    /// Test a name against this segment, after applying `fold` to both sides.
    pub(crate) fn matches_with(&self, name: &str, fold: fn(&str) -> Cow<'_, str>) -> bool {
        match self {
            PatternSegment::Literal(lit) => fold(lit) == fold(name),
            PatternSegment::Wildcard(pat) => {
                let folded = fold(pat.as_str());
                if matches!(folded, Cow::Borrowed(_)) {
                    pat.matches(&fold(name))
                } else {
                    SegmentPattern::new(&folded).matches(&fold(name))
                }
            }
            PatternSegment::Recursive => true,
        }
    }
}

/// A compiled multi-segment glob pattern such as `src/**/*.rs`.
///
/// Patterns are split with the same grammar as [`PurePath`], so empty and
/// `.` segments disappear and `..` stays a literal segment.
///
/// # Example
///
/// ```rust
/// use anypath::{Pattern, PurePath};
///
/// let pattern = Pattern::new("**/*.txt").unwrap();
/// assert!(pattern.matches(&PurePath::new("a/b/c.txt")));
/// assert!(!pattern.matches(&PurePath::new("a/b/c.rs")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    anchor: PurePath,
    segments: Vec<PatternSegment>,
}

impl Pattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// - [`PathError::InvalidPattern`] if the pattern has no segments
    pub fn new(source: &str) -> Result<Self, PathError> {
        Self::compile(source, "match")
    }

    /// [`new`](Self::new), naming `operation` in errors.
    pub(crate) fn compile(source: &str, operation: &'static str) -> Result<Self, PathError> {
        let parsed = PurePath::new(source);
        if parsed.segments().is_empty() {
            return Err(PathError::InvalidPattern {
                pattern: source.to_owned(),
                reason: "pattern has no segments",
                operation,
            });
        }
        let segments = parsed
            .segments()
            .iter()
            .map(|s| PatternSegment::parse(s))
            .collect();
        Ok(Self {
            source: source.to_owned(),
            anchor: parsed.anchor_path(),
            segments,
        })
    }

    /// The pattern text this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the pattern starts with a root.
    pub fn is_absolute(&self) -> bool {
        self.anchor.is_absolute()
    }

    /// The compiled segments, in order.
    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    /// Match `path` lexically, case-sensitively.
    ///
    /// Relative patterns match from the right; absolute patterns must match
    /// the whole path.
    pub fn matches(&self, path: &PurePath) -> bool {
        self.matches_with(path, unfolded)
    }

    pub(crate) fn matches_with(&self, path: &PurePath, fold: fn(&str) -> Cow<'_, str>) -> bool {
        let names = path.segments();
        if self.is_absolute() {
            return path.anchor_path() == self.anchor && match_segments(&self.segments, names, fold);
        }
        (0..=names.len()).any(|start| match_segments(&self.segments, &names[start..], fold))
    }
}

fn unfolded(s: &str) -> Cow<'_, str> {
    Cow::Borrowed(s)
}

fn match_segments(
    pattern: &[PatternSegment],
    names: &[String],
    fold: fn(&str) -> Cow<'_, str>,
) -> bool {
    match pattern.split_first() {
        None => names.is_empty(),
        Some((PatternSegment::Recursive, rest)) => {
            (0..=names.len()).any(|skip| match_segments(rest, &names[skip..], fold))
        }
        Some((segment, rest)) => match names.split_first() {
            Some((name, tail)) => segment.matches_with(name, fold) && match_segments(rest, tail, fold),
            None => false,
        },
    }
}
