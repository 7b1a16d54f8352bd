//! Source filter patterns and rule evaluation.
//!
//! A [`SourceFilter`] is an ordered list of `(verdict, pattern)` rules.
//! Rules are applied in list order and the last rule that matches a path
//! decides whether that path is compiled. Resolvers rely on this: a broad
//! rule is written first and narrower overrides are appended after it.
//!
//! Rules render to the `+<pattern>` / `-<pattern>` syntax accepted by the
//! build environment and parse back from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// A path pattern relative to the library source directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Matches the path itself or anything below it as a directory.
    Path(String),
    /// Matches any path starting with the prefix (written `prefix*`).
    Wildcard(String),
}

impl Pattern {
    /// Parse a pattern. A single trailing `*` makes it a wildcard.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Err(PlanError::InvalidPattern {
                pattern: raw.into(),
                detail: "pattern is empty".into(),
            });
        }
        match normalized.strip_suffix('*') {
            Some(prefix) if !prefix.contains('*') => Ok(Self::Wildcard(prefix.into())),
            Some(_) => Err(PlanError::InvalidPattern {
                pattern: raw.into(),
                detail: "'*' is only supported as a suffix".into(),
            }),
            None if normalized.contains('*') => Err(PlanError::InvalidPattern {
                pattern: raw.into(),
                detail: "'*' is only supported as a suffix".into(),
            }),
            None => match normalized.trim_end_matches('/') {
                "" => Err(PlanError::InvalidPattern {
                    pattern: raw.into(),
                    detail: "pattern names no path".into(),
                }),
                path => Ok(Self::Path(path.into())),
            },
        }
    }

    /// Pattern matching everything.
    pub fn everything() -> Self {
        Self::Wildcard(String::new())
    }

    /// Exact or directory-prefix pattern for `path`. A trailing `/` is dropped.
    pub fn path(path: &str) -> Self {
        Self::Path(normalize(path).trim_end_matches('/').into())
    }

    /// Wildcard pattern matching everything starting with `prefix`.
    pub fn wildcard(prefix: &str) -> Self {
        Self::Wildcard(normalize(prefix))
    }

    /// Whether `path` (already normalized) matches.
    fn matches_normalized(&self, path: &str) -> bool {
        match self {
            Self::Path(p) => {
                path == p
                    || (path.len() > p.len()
                        && path.starts_with(p.as_str())
                        && path.as_bytes()[p.len()] == b'/')
            }
            Self::Wildcard(prefix) => path.starts_with(prefix.as_str()),
        }
    }

    /// Whether `path` matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.matches_normalized(&normalize(path))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{p}"),
            Self::Wildcard(prefix) => write!(f, "{prefix}*"),
        }
    }
}

/// Use forward slashes and drop a leading `./`.
fn normalize(raw: &str) -> String {
    let mut s = raw.trim().replace('\\', "/");
    while let Some(rest) = s.strip_prefix("./") {
        s = rest.to_string();
    }
    s
}

/// Whether a matching path is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Include,
    Exclude,
}

impl Verdict {
    fn sigil(self) -> char {
        match self {
            Self::Include => '+',
            Self::Exclude => '-',
        }
    }
}

/// One source filter rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilterRule {
    pub verdict: Verdict,
    pub pattern: Pattern,
}

impl FilterRule {
    pub fn include(pattern: Pattern) -> Self {
        Self {
            verdict: Verdict::Include,
            pattern,
        }
    }

    pub fn exclude(pattern: Pattern) -> Self {
        Self {
            verdict: Verdict::Exclude,
            pattern,
        }
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.verdict.sigil(), self.pattern)
    }
}

impl FromStr for FilterRule {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || PlanError::InvalidRule { rule: s.into() };
        let verdict = match s.chars().next() {
            Some('+') => Verdict::Include,
            Some('-') => Verdict::Exclude,
            _ => return Err(invalid()),
        };
        let inner = s[1..]
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(invalid)?;
        Ok(Self {
            verdict,
            pattern: Pattern::parse(inner)?,
        })
    }
}

impl TryFrom<String> for FilterRule {
    type Error = PlanError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<FilterRule> for String {
    fn from(rule: FilterRule) -> Self {
        rule.to_string()
    }
}

/// An ordered list of filter rules with last-match-wins precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceFilter {
    rules: Vec<FilterRule>,
}

impl SourceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an include rule.
    pub fn include(&mut self, pattern: Pattern) -> &mut Self {
        self.push(FilterRule::include(pattern))
    }

    /// Append an exclude rule.
    pub fn exclude(&mut self, pattern: Pattern) -> &mut Self {
        self.push(FilterRule::exclude(pattern))
    }

    /// Append a rule. It overrides every earlier rule for the paths it matches.
    pub fn push(&mut self, rule: FilterRule) -> &mut Self {
        log::debug!("source filter rule {rule}");
        self.rules.push(rule);
        self
    }

    /// The rules in application order.
    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Verdict of the last rule matching `path`, or `None` if no rule matches.
    pub fn evaluate(&self, path: &str) -> Option<Verdict> {
        let path = normalize(path);
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.pattern.matches_normalized(&path))
            .map(|rule| rule.verdict)
    }

    /// Whether `path` is compiled. Paths no rule matches are not.
    pub fn selects(&self, path: &str) -> bool {
        self.evaluate(path) == Some(Verdict::Include)
    }

    /// The subset of `paths` that is compiled, in input order.
    pub fn select<'a, I>(&self, paths: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        paths.into_iter().filter(|p| self.selects(p)).collect()
    }

    /// Render every rule in `+<pattern>` / `-<pattern>` syntax.
    pub fn render(&self) -> Vec<String> {
        self.rules.iter().map(ToString::to_string).collect()
    }
}
