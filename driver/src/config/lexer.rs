//! Tokenizer for configuration expressions.

use super::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Feature name, option name, keyword, or evaluator reference.
    Ident(String),
    Int(i64),
    Float(f64),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Equals,
}

impl Token {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => name.clone(),
            Token::Int(value) => value.to_string(),
            Token::Float(value) => value.to_string(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::LBracket => "[".into(),
            Token::RBracket => "]".into(),
            Token::Comma => ",".into(),
            Token::Equals => "=".into(),
        }
    }
}

/// A token plus its 1-based column, for error messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub column: usize,
}

/// Tokenize a full expression.
///
/// # Errors
///
/// Returns [`ConfigError::UnexpectedCharacter`] on input outside the
/// grammar's alphabet.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, ConfigError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut index = 0;

    while index < chars.len() {
        let column = index + 1;
        let c = chars[index];
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                index += 1;
            }
            '(' | ')' | '[' | ']' | ',' | '=' => {
                let token = match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    ',' => Token::Comma,
                    _ => Token::Equals,
                };
                tokens.push(Spanned { token, column });
                index += 1;
            }
            '-' | '0'..='9' => {
                let start = index;
                index += 1;
                let mut is_float = false;
                while index < chars.len()
                    && (chars[index].is_ascii_digit() || (!is_float && chars[index] == '.'))
                {
                    if chars[index] == '.' {
                        is_float = true;
                    }
                    index += 1;
                }
                let text: String = chars[start..index].iter().collect();
                let token = if is_float {
                    Token::Float(
                        text.parse()
                            .map_err(|_| ConfigError::UnexpectedCharacter { column, found: c })?,
                    )
                } else {
                    Token::Int(
                        text.parse()
                            .map_err(|_| ConfigError::UnexpectedCharacter { column, found: c })?,
                    )
                };
                tokens.push(Spanned { token, column });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = index;
                while index < chars.len()
                    && (chars[index].is_ascii_alphanumeric() || chars[index] == '_')
                {
                    index += 1;
                }
                tokens.push(Spanned {
                    token: Token::Ident(chars[start..index].iter().collect()),
                    column,
                });
            }
            found => return Err(ConfigError::UnexpectedCharacter { column, found }),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .expect("tokenize")
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn tokenizes_a_feature_call() {
        assert_eq!(
            kinds("weight(g(), 2)"),
            vec![
                Token::Ident("weight".into()),
                Token::LParen,
                Token::Ident("g".into()),
                Token::LParen,
                Token::RParen,
                Token::Comma,
                Token::Int(2),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn numbers_and_keywords() {
        assert_eq!(
            kinds("[-3, 1.5, infinity, true]"),
            vec![
                Token::LBracket,
                Token::Int(-3),
                Token::Comma,
                Token::Float(1.5),
                Token::Comma,
                Token::Ident("infinity".into()),
                Token::Comma,
                Token::Ident("true".into()),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn rejects_stray_characters() {
        let err = tokenize("eager(!)").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnexpectedCharacter { found: '!', .. }
        ));
    }

    #[test]
    fn columns_are_one_based() {
        let tokens = tokenize(" g(").expect("tokenize");
        assert_eq!(tokens[0].column, 2);
        assert_eq!(tokens[1].column, 3);
    }
}
