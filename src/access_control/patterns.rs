//! Pattern matching for client scopes
//!
//! Provides anchored regex matching used to decide which scopes select a
//! client's rules.

use crate::error::ConfigError;
use regex::Regex;

/// Compiled pattern matcher
///
/// Each pattern must match a whole scope: `read:.*` matches `read:users`
/// but `read` does not match `read:users`.
#[derive(Debug)]
pub struct PatternMatcher {
    patterns: Vec<CompiledPattern>,
}

#[derive(Debug)]
struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl PatternMatcher {
    /// Create a new pattern matcher from a list of regex patterns
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
                ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                }
            })?;

            compiled.push(CompiledPattern {
                source: pattern.clone(),
                regex,
            });
        }

        Ok(Self { patterns: compiled })
    }

    /// The first pattern a scope matches
    pub fn find_match(&self, scope: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.regex.is_match(scope))
            .map(|p| p.source.as_str())
    }

    /// Check if this matcher has any patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
