//! The formatting transform.
//!
//! Pipelines only see the [`Transform`] trait. [`SexpFormatter`] is the
//! shipped implementation: a token-level whitespace and indentation
//! formatter for s-expression sources. Passes run in a fixed order, each
//! gated by a [`FeatureToggles`] flag:
//! 1. remove consecutive blank lines
//! 2. remove surrounding whitespace
//! 3. insert missing whitespace
//! 4. remove multiple non-indenting spaces
//! 5. indentation
//! 6. remove trailing whitespace

pub mod indent;
pub mod lexer;
pub mod passes;
pub mod rules;

pub use lexer::ParseError;
pub use rules::{IndentRule, IndentTable};

use crate::config::{Config, FeatureToggles};
use std::collections::BTreeMap;

/// Source text in, reformatted source text out.
pub trait Transform: Send + Sync {
    fn transform(&self, source: &str, toggles: &FeatureToggles) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Default)]
pub struct SexpFormatter {
    indents: IndentTable,
    aliases: BTreeMap<String, String>,
}

impl SexpFormatter {
    pub fn new(indents: IndentTable, aliases: BTreeMap<String, String>) -> Self {
        SexpFormatter { indents, aliases }
    }

    pub fn from_config(config: &Config) -> Self {
        SexpFormatter::new(config.indents.clone(), config.aliases.clone())
    }

    pub fn format(&self, source: &str, toggles: &FeatureToggles) -> Result<String, ParseError> {
        let mut tokens = lexer::lex(source)?;
        if toggles.remove_consecutive_blank_lines {
            tokens = passes::remove_consecutive_blank_lines(tokens);
        }
        if toggles.remove_surrounding_whitespace {
            tokens = passes::remove_surrounding_whitespace(tokens);
        }
        if toggles.insert_missing_whitespace {
            tokens = passes::insert_missing_whitespace(tokens);
        }
        if toggles.remove_multiple_non_indenting_spaces {
            tokens = passes::remove_multiple_non_indenting_spaces(tokens);
        }
        if toggles.indentation {
            tokens = indent::reindent(&tokens, &self.indents, &self.aliases);
        }
        if toggles.remove_trailing_whitespace {
            tokens = passes::remove_trailing_whitespace(tokens);
        }
        Ok(lexer::render(&tokens))
    }
}

impl Transform for SexpFormatter {
    fn transform(&self, source: &str, toggles: &FeatureToggles) -> anyhow::Result<String> {
        Ok(self.format(source, toggles)?)
    }
}
