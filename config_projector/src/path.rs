//! Parsing and resolution of `$`-rooted extraction paths.
//!
//! The supported grammar is a JSONPath subset: member access (`.name`,
//! `['name']`, `["name"]`), indexes (`[2]`, `[-1]`), slices (`[1:3]`),
//! wildcards (`[*]`, `.*`) and index unions (`[0,2]`). Filters and recursive
//! descent are rejected when the path is parsed.

use std::fmt;

use camino::Utf8Path;

use crate::error::{ProjectionError, ProjectionResult};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Member(String),
    Index(i64),
    Slice {
        start: Option<i64>,
        end: Option<i64>,
    },
    Wildcard,
    Union(Vec<i64>),
}

impl Step {
    const fn selects_many(&self) -> bool {
        matches!(self, Self::Slice { .. } | Self::Wildcard | Self::Union(_))
    }
}

/// A parsed extraction path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPath {
    raw: String,
    steps: Vec<Step>,
}

impl ExtractionPath {
    /// Parse `raw` into an extraction path.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidExtractionPath`] when the expression
    /// does not start at `$`, uses unsupported syntax or is malformed.
    pub fn parse(raw: &str) -> ProjectionResult<Self> {
        let steps = Parser::new(raw).parse()?;
        Ok(Self {
            raw: raw.to_owned(),
            steps,
        })
    }

    /// The expression as written in the manifest.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    /// Resolve the path against `root`, decoded from `document`.
    ///
    /// Paths made only of members and indexes yield the single node they
    /// reach. Once a slice, wildcard or union is applied the result is a
    /// sequence of every match. Sequence selectors keep element order, while
    /// a wildcard over a mapping yields its values in sorted key order.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::PathNotFound`] when no node matches.
    pub fn resolve(&self, root: &Value, document: &Utf8Path) -> ProjectionResult<Value> {
        let mut nodes = vec![root];
        let mut many = false;
        for step in &self.steps {
            let mut next = Vec::new();
            for node in nodes {
                select(step, node, &mut next);
            }
            many |= step.selects_many();
            if next.is_empty() {
                return Err(self.not_found(document, step));
            }
            nodes = next;
        }
        if many {
            return Ok(Value::Sequence(nodes.into_iter().cloned().collect()));
        }
        nodes
            .first()
            .map(|node| (*node).clone())
            .ok_or_else(|| ProjectionError::PathNotFound {
                path: self.raw.clone(),
                document: document.to_owned(),
                reason: String::from("no node matched"),
            })
    }

    fn not_found(&self, document: &Utf8Path, step: &Step) -> ProjectionError {
        let reason = match step {
            Step::Member(name) => format!("no member named '{name}'"),
            Step::Index(index) => format!("index {index} is out of range"),
            Step::Slice { .. } => String::from("slice selected no elements"),
            Step::Wildcard => String::from("wildcard selected no elements"),
            Step::Union(_) => String::from("union selected no elements"),
        };
        ProjectionError::PathNotFound {
            path: self.raw.clone(),
            document: document.to_owned(),
            reason,
        }
    }
}

impl fmt::Display for ExtractionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn select<'v>(step: &Step, node: &'v Value, out: &mut Vec<&'v Value>) {
    match (step, node) {
        (Step::Member(name), Value::Mapping(entries)) => out.extend(entries.get(name)),
        (Step::Index(index), Value::Sequence(items)) => {
            out.extend(normalise_index(*index, items.len()).and_then(|at| items.get(at)));
        }
        (Step::Slice { start, end }, Value::Sequence(items)) => {
            let (from, to) = slice_bounds(*start, *end, items.len());
            out.extend(items.get(from..to).unwrap_or_default());
        }
        (Step::Union(indexes), Value::Sequence(items)) => out.extend(
            indexes
                .iter()
                .filter_map(|index| normalise_index(*index, items.len()))
                .filter_map(|at| items.get(at)),
        ),
        (Step::Wildcard, Value::Sequence(items)) => out.extend(items),
        (Step::Wildcard, Value::Mapping(entries)) => out.extend(entries.values()),
        _ => {}
    }
}

/// Map a possibly negative index onto `0..len`.
fn normalise_index(index: i64, len: usize) -> Option<usize> {
    let signed_len = i64::try_from(len).ok()?;
    let at = if index < 0 { signed_len + index } else { index };
    if (0..signed_len).contains(&at) {
        usize::try_from(at).ok()
    } else {
        None
    }
}

fn slice_bounds(start: Option<i64>, end: Option<i64>, len: usize) -> (usize, usize) {
    let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
    let clamp = |bound: i64| {
        let at = if bound < 0 { signed_len + bound } else { bound };
        usize::try_from(at.clamp(0, signed_len)).unwrap_or(len)
    };
    let from = start.map_or(0, clamp);
    let to = end.map_or(len, clamp);
    (from, to.max(from))
}

struct Parser<'a> {
    raw: &'a str,
    rest: &'a str,
}

impl<'a> Parser<'a> {
    const fn new(raw: &'a str) -> Self {
        Self { raw, rest: raw }
    }

    fn parse(mut self) -> ProjectionResult<Vec<Step>> {
        self.rest = self
            .raw
            .strip_prefix('$')
            .ok_or_else(|| self.invalid("paths must start with '$'"))?;
        let mut steps = Vec::new();
        loop {
            let remaining = self.rest;
            let step = if let Some(after_dot) = remaining.strip_prefix('.') {
                self.dotted(after_dot)?
            } else if let Some(body) = remaining.strip_prefix('[') {
                self.bracketed(body)?
            } else if let Some(other) = remaining.chars().next() {
                return Err(self.invalid(&format!("unexpected character '{other}'")));
            } else {
                return Ok(steps);
            };
            steps.push(step);
        }
    }

    fn dotted(&mut self, after_dot: &'a str) -> ProjectionResult<Step> {
        if after_dot.starts_with('.') {
            return Err(self.invalid("recursive descent is not supported"));
        }
        if let Some(remaining) = after_dot.strip_prefix('*') {
            self.rest = remaining;
            return Ok(Step::Wildcard);
        }
        let end = after_dot.find(['.', '[']).unwrap_or(after_dot.len());
        let (name, remaining) = after_dot.split_at(end);
        if name.is_empty() {
            return Err(self.invalid("expected a member name after '.'"));
        }
        self.rest = remaining;
        Ok(Step::Member(name.to_owned()))
    }

    fn bracketed(&mut self, body: &'a str) -> ProjectionResult<Step> {
        let inner = body.trim_start();
        match inner.chars().next() {
            Some(quote @ ('\'' | '"')) => {
                self.quoted_member(inner.strip_prefix(quote).unwrap_or_default(), quote)
            }
            Some('?') => Err(self.invalid("filter expressions are not supported")),
            Some(_) => {
                let (selector, remaining) = inner
                    .split_once(']')
                    .ok_or_else(|| self.invalid("unterminated '['"))?;
                self.rest = remaining;
                self.selector(selector.trim())
            }
            None => Err(self.invalid("unterminated '['")),
        }
    }

    fn quoted_member(&mut self, body: &'a str, quote: char) -> ProjectionResult<Step> {
        let mut name = String::new();
        let mut chars = body.char_indices();
        while let Some((at, current)) = chars.next() {
            if current == '\\' {
                let (_, escaped) = chars
                    .next()
                    .ok_or_else(|| self.invalid("unterminated escape sequence"))?;
                name.push(escaped);
            } else if current == quote {
                let (_, after_quote) = body.split_at(at + current.len_utf8());
                self.rest = after_quote
                    .trim_start()
                    .strip_prefix(']')
                    .ok_or_else(|| self.invalid("expected ']' after quoted member"))?;
                return Ok(Step::Member(name));
            } else {
                name.push(current);
            }
        }
        Err(self.invalid("unterminated quoted member"))
    }

    fn selector(&self, selector: &str) -> ProjectionResult<Step> {
        if selector == "*" {
            return Ok(Step::Wildcard);
        }
        if let Some((start, end)) = selector.split_once(':') {
            if end.contains(':') {
                return Err(self.invalid("slice steps are not supported"));
            }
            return Ok(Step::Slice {
                start: self.optional_index(start)?,
                end: self.optional_index(end)?,
            });
        }
        if selector.contains(',') {
            let indexes = selector
                .split(',')
                .map(|part| self.index(part))
                .collect::<ProjectionResult<Vec<_>>>()?;
            return Ok(Step::Union(indexes));
        }
        self.index(selector).map(Step::Index)
    }

    fn optional_index(&self, bound: &str) -> ProjectionResult<Option<i64>> {
        if bound.trim().is_empty() {
            Ok(None)
        } else {
            self.index(bound).map(Some)
        }
    }

    fn index(&self, literal: &str) -> ProjectionResult<i64> {
        let trimmed = literal.trim();
        trimmed
            .parse::<i64>()
            .map_err(|_| self.invalid(&format!("'{trimmed}' is not an integer index")))
    }

    fn invalid(&self, reason: &str) -> ProjectionError {
        ProjectionError::InvalidExtractionPath {
            path: self.raw.to_owned(),
            reason: reason.to_owned(),
        }
    }
}
