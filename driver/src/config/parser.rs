//! Recursive-descent parser over configuration tokens.

use std::collections::VecDeque;
use std::rc::Rc;

use foray_search::component::{EvaluatorFactory, OpenListFactory, SearchEngineFactory};

use super::lexer::{tokenize, Spanned, Token};
use super::registry::{construct, Args};
use super::{ConfigError, Definitions};

/// A parsed configuration value.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Infinity,
    /// A bare keyword (e.g. a cost type). Only a fixed keyword set parses
    /// as a symbol; other bare identifiers must name defined evaluators.
    Symbol(String),
    List(Vec<Value>),
    Evaluator(Rc<EvaluatorFactory>),
    OpenList(Rc<OpenListFactory>),
    Engine(Rc<SearchEngineFactory>),
}

/// Keywords that parse as symbols rather than evaluator references.
const SYMBOLS: &[&str] = &["normal", "one", "plusone"];

impl Value {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "an integer",
            Value::Float(_) => "a number",
            Value::Bool(_) => "a boolean",
            Value::Infinity => "infinity",
            Value::Symbol(_) => "a keyword",
            Value::List(_) => "a list",
            Value::Evaluator(_) => "an evaluator",
            Value::OpenList(_) => "an open list",
            Value::Engine(_) => "a search engine",
        }
    }
}

/// Parse one complete expression; trailing tokens are an error.
///
/// # Errors
///
/// Returns [`ConfigError`] on lexical or grammatical failure, unknown
/// features, or undefined evaluator references.
pub fn parse_expression(input: &str, definitions: &Definitions) -> Result<Value, ConfigError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        index: 0,
        definitions,
    };
    let value = parser.parse_value()?;
    if let Some(spanned) = parser.peek() {
        return Err(ConfigError::TrailingInput {
            found: spanned.token.describe(),
        });
    }
    Ok(value)
}

struct Parser<'a> {
    tokens: Vec<Spanned>,
    index: usize,
    definitions: &'a Definitions,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.index)
    }

    fn next(&mut self, expected: &str) -> Result<Spanned, ConfigError> {
        let spanned = self
            .tokens
            .get(self.index)
            .cloned()
            .ok_or_else(|| ConfigError::UnexpectedEnd {
                expected: expected.to_string(),
            })?;
        self.index += 1;
        Ok(spanned)
    }

    fn expect(&mut self, token: &Token, expected: &str) -> Result<(), ConfigError> {
        let spanned = self.next(expected)?;
        if spanned.token == *token {
            Ok(())
        } else {
            Err(ConfigError::UnexpectedToken {
                column: spanned.column,
                expected: expected.to_string(),
                found: spanned.token.describe(),
            })
        }
    }

    fn parse_value(&mut self) -> Result<Value, ConfigError> {
        let spanned = self.next("a value")?;
        match spanned.token {
            Token::Int(value) => Ok(Value::Int(value)),
            Token::Float(value) => Ok(Value::Float(value)),
            Token::LBracket => self.parse_list(),
            Token::Ident(name) => match name.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "infinity" => Ok(Value::Infinity),
                _ => {
                    if matches!(self.peek(), Some(s) if s.token == Token::LParen) {
                        self.parse_feature(name)
                    } else if let Some(factory) = self.definitions.get(&name) {
                        Ok(Value::Evaluator(Rc::clone(factory)))
                    } else if SYMBOLS.contains(&name.as_str()) {
                        Ok(Value::Symbol(name))
                    } else {
                        Err(ConfigError::UndefinedReference { name })
                    }
                }
            },
            token => Err(ConfigError::UnexpectedToken {
                column: spanned.column,
                expected: "a value".to_string(),
                found: token.describe(),
            }),
        }
    }

    fn parse_list(&mut self) -> Result<Value, ConfigError> {
        let mut items = Vec::new();
        if matches!(self.peek(), Some(s) if s.token == Token::RBracket) {
            self.index += 1;
            return Ok(Value::List(items));
        }
        loop {
            items.push(self.parse_value()?);
            let spanned = self.next("`,` or `]`")?;
            match spanned.token {
                Token::Comma => {}
                Token::RBracket => return Ok(Value::List(items)),
                token => {
                    return Err(ConfigError::UnexpectedToken {
                        column: spanned.column,
                        expected: "`,` or `]`".to_string(),
                        found: token.describe(),
                    })
                }
            }
        }
    }

    fn parse_feature(&mut self, name: String) -> Result<Value, ConfigError> {
        self.expect(&Token::LParen, "`(`")?;
        let mut positional = VecDeque::new();
        let mut named = Vec::new();

        if matches!(self.peek(), Some(s) if s.token == Token::RParen) {
            self.index += 1;
            return construct(Args::new(name, positional, named));
        }
        loop {
            // `ident =` starts a named argument; anything else is
            // positional.
            let is_named = matches!(
                (self.peek(), self.tokens.get(self.index + 1)),
                (Some(Spanned { token: Token::Ident(_), .. }), Some(second))
                    if second.token == Token::Equals
            );
            if is_named {
                let Spanned {
                    token: Token::Ident(option),
                    ..
                } = self.next("an option name")?
                else {
                    unreachable!("peeked an identifier");
                };
                self.index += 1; // the `=`
                named.push((option, self.parse_value()?));
            } else {
                positional.push_back(self.parse_value()?);
            }
            let spanned = self.next("`,` or `)`")?;
            match spanned.token {
                Token::Comma => {}
                Token::RParen => return construct(Args::new(name, positional, named)),
                token => {
                    return Err(ConfigError::UnexpectedToken {
                        column: spanned.column,
                        expected: "`,` or `)`".to_string(),
                        found: token.describe(),
                    })
                }
            }
        }
    }
}
