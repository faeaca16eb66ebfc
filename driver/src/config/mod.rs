//! The configuration grammar.
//!
//! A configuration is a parenthesized expression over registered features,
//! e.g. `eager(tiebreaking([sum([g(), h1]), h1]), reopen_closed=true)`.
//! Named evaluators predefined with `--evaluator NAME=EXPR` can be
//! referenced by bare name; every reference resolves to the SAME
//! task-independent factory node, which is what makes the task-binding
//! pass share the evaluator instance.
//!
//! Binding errors exit with the input-error code; `--help` prints the
//! feature documentation from [`registry`].

pub mod lexer;
pub mod parser;
pub mod registry;

use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use foray_search::component::{EvaluatorFactory, SearchEngineFactory};

/// Predefined named evaluators, resolvable by bare name.
pub type Definitions = HashMap<String, Rc<EvaluatorFactory>>;

/// Failure while binding a configuration string.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("column {column}: unexpected character `{found}`")]
    UnexpectedCharacter { column: usize, found: char },

    #[error("column {column}: expected {expected}, found `{found}`")]
    UnexpectedToken {
        column: usize,
        expected: String,
        found: String,
    },

    #[error("unexpected end of configuration (expected {expected})")]
    UnexpectedEnd { expected: String },

    #[error("trailing input after the configuration: `{found}`")]
    TrailingInput { found: String },

    #[error("unknown feature `{name}`")]
    UnknownFeature { name: String },

    #[error("`{name}` is not a defined evaluator")]
    UndefinedReference { name: String },

    #[error("{feature}: missing required option `{option}`")]
    MissingOption { feature: String, option: String },

    #[error("{feature}: unknown or surplus argument `{argument}`")]
    SurplusArgument { feature: String, argument: String },

    #[error("{feature}: option `{option}` given both positionally and by name")]
    DuplicateOption { feature: String, option: String },

    #[error("{feature}: option `{option}` expects {expected}, got `{found}`")]
    OptionType {
        feature: String,
        option: String,
        expected: String,
        found: String,
    },

    #[error("{feature}: option `{option}`: {detail}")]
    InvalidOption {
        feature: String,
        option: String,
        detail: String,
    },

    #[error("evaluator definition `{definition}` is not of the form NAME=EXPR")]
    MalformedDefinition { definition: String },

    #[error("evaluator `{name}` is defined twice")]
    DuplicateDefinition { name: String },

    #[error("the top-level feature must be a search engine, got {found}")]
    NotAnEngine { found: String },

    #[error("definition `{name}` must be an evaluator, got {found}")]
    NotAnEvaluator { name: String, found: String },
}

/// Bind `--evaluator` definitions and the search expression to a
/// task-independent engine factory.
///
/// # Errors
///
/// Returns [`ConfigError`] on lexical, grammatical, or feature-binding
/// failures.
pub fn parse_configuration(
    search: &str,
    evaluator_definitions: &[String],
) -> Result<Rc<SearchEngineFactory>, ConfigError> {
    let mut definitions = Definitions::new();
    for definition in evaluator_definitions {
        let (name, expression) =
            definition
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedDefinition {
                    definition: definition.clone(),
                })?;
        let name = name.trim();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::MalformedDefinition {
                definition: definition.clone(),
            });
        }
        if definitions.contains_key(name) {
            return Err(ConfigError::DuplicateDefinition {
                name: name.to_string(),
            });
        }
        let value = parser::parse_expression(expression, &definitions)?;
        match value {
            parser::Value::Evaluator(factory) => {
                definitions.insert(name.to_string(), factory);
            }
            other => {
                return Err(ConfigError::NotAnEvaluator {
                    name: name.to_string(),
                    found: other.kind().to_string(),
                })
            }
        }
    }

    match parser::parse_expression(search, &definitions)? {
        parser::Value::Engine(factory) => Ok(factory),
        other => Err(ConfigError::NotAnEngine {
            found: other.kind().to_string(),
        }),
    }
}
