//! A small selector subset for host lookups.
//!
//! Supported: type selectors, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`
//! (value optionally quoted), compounds of those, and comma-separated lists.
//! Combinators and pseudo-classes are rejected.

use anyhow::{Result, anyhow, bail};
use std::collections::BTreeMap;

/// One simple selector inside a compound.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Simple {
    Type(String),
    Id(String),
    Class(String),
    HasAttr(String),
    AttrEquals(String, String),
}

/// A compound selector: every part must match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    parts: Vec<Simple>,
}

/// A comma-separated list of compound selectors: any may match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Selector>,
}

impl SelectorList {
    /// Parse a selector list.
    ///
    /// # Errors
    /// Returns an error for empty input, unsupported syntax, or unterminated
    /// attribute selectors.
    pub fn parse(source: &str) -> Result<Self> {
        let mut selectors = Vec::new();
        for group in split_top_level(source) {
            let trimmed = group.trim();
            if trimmed.is_empty() {
                bail!("empty selector in list '{source}'");
            }
            selectors.push(Selector::parse(trimmed)?);
        }
        Ok(Self { selectors })
    }

    /// Test an element given its lowercase tag name and attributes.
    pub fn matches(&self, tag: &str, attrs: &BTreeMap<String, String>) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.matches(tag, attrs))
    }
}

impl Selector {
    /// Parse a single compound selector.
    ///
    /// # Errors
    /// Returns an error on combinators, pseudo-classes, or malformed parts.
    pub fn parse(source: &str) -> Result<Self> {
        let chars: Vec<char> = source.chars().collect();
        let mut parts = Vec::new();
        let mut pos = 0;
        while pos < chars.len() {
            match chars[pos] {
                '*' if pos == 0 => pos += 1,
                '#' => {
                    let (ident, next) = read_ident(&chars, pos + 1, source)?;
                    parts.push(Simple::Id(ident));
                    pos = next;
                }
                '.' => {
                    let (ident, next) = read_ident(&chars, pos + 1, source)?;
                    parts.push(Simple::Class(ident));
                    pos = next;
                }
                '[' => {
                    let close = chars[pos..]
                        .iter()
                        .position(|ch| *ch == ']')
                        .map(|offset| pos + offset)
                        .ok_or_else(|| anyhow!("unterminated attribute selector in '{source}'"))?;
                    let inner: String = chars[pos + 1..close].iter().collect();
                    parts.push(parse_attr(inner.trim(), source)?);
                    pos = close + 1;
                }
                ch if pos == 0 && is_ident_char(ch) => {
                    let (ident, next) = read_ident(&chars, pos, source)?;
                    parts.push(Simple::Type(ident.to_ascii_lowercase()));
                    pos = next;
                }
                other => bail!("unsupported selector syntax '{other}' in '{source}'"),
            }
        }
        Ok(Self { parts })
    }

    /// Test an element given its lowercase tag name and attributes.
    pub fn matches(&self, tag: &str, attrs: &BTreeMap<String, String>) -> bool {
        self.parts.iter().all(|part| match part {
            Simple::Type(name) => name == tag,
            Simple::Id(id) => attrs.get("id").is_some_and(|value| value == id),
            Simple::Class(class) => attrs.get("class").is_some_and(|value| {
                value
                    .split_whitespace()
                    .any(|token| token == class)
            }),
            Simple::HasAttr(name) => attrs.contains_key(name),
            Simple::AttrEquals(name, expected) => {
                attrs.get(name).is_some_and(|value| value == expected)
            }
        })
    }
}

/// Split on commas outside `[...]` and quotes.
fn split_top_level(source: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut depth = 0_usize;
    let mut quote = None;
    let mut start = 0;
    for (index, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                groups.push(&source[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    groups.push(&source[start..]);
    groups
}

const fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

/// Read an identifier starting at `start`; returns it and the next position.
fn read_ident(chars: &[char], start: usize, source: &str) -> Result<(String, usize)> {
    let mut end = start;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }
    if end == start {
        bail!("expected identifier at offset {start} in '{source}'");
    }
    Ok((chars[start..end].iter().collect(), end))
}

/// Parse the inside of `[...]`. Attribute names are case-insensitive.
fn parse_attr(inner: &str, source: &str) -> Result<Simple> {
    match inner.split_once('=') {
        None => {
            if inner.is_empty() || !inner.chars().all(is_ident_char) {
                bail!("invalid attribute name '{inner}' in '{source}'");
            }
            Ok(Simple::HasAttr(inner.to_ascii_lowercase()))
        }
        Some((name_raw, value_raw)) => {
            let name = name_raw.trim();
            if name.is_empty() || !name.chars().all(is_ident_char) {
                bail!("invalid attribute name '{name}' in '{source}'");
            }
            let value = value_raw.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
                .or_else(|| {
                    value
                        .strip_prefix('\'')
                        .and_then(|rest| rest.strip_suffix('\''))
                })
                .unwrap_or(value);
            Ok(Simple::AttrEquals(
                name.to_ascii_lowercase(),
                unquoted.to_owned(),
            ))
        }
    }
}
