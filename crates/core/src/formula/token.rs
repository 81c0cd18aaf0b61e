//! Formula tokenizer

use crate::error::{Error, Result};

/// A token in a formula
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    /// `**`
    Power,
    LParen,
    RParen,
}

/// Tokenize a formula string
pub(crate) fn tokenize(formula: &str) -> Result<Vec<Token>> {
    let invalid = |reason: String| Error::InvalidFormula {
        formula: formula.to_string(),
        reason,
    };

    let mut tokens = Vec::new();
    let chars: Vec<char> = formula.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            c if c.is_whitespace() => {
                i += 1;
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Power);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // optional exponent: 1e-3, 2.5E4
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let num_str: String = chars[start..i].iter().collect();
                let num = num_str
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("invalid number: {num_str}")))?;
                tokens.push(Token::Number(num));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            c => {
                return Err(invalid(format!("unexpected character '{c}'")));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_is_one_token() {
        let tokens = tokenize("N**2*R").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("N".into()),
                Token::Power,
                Token::Number(2.0),
                Token::Star,
                Token::Ident("R".into()),
            ]
        );
    }

    #[test]
    fn scientific_notation() {
        let tokens = tokenize("1e-3 + 2.5E2").unwrap();
        assert_eq!(tokens[0], Token::Number(0.001));
        assert_eq!(tokens[2], Token::Number(250.0));
    }

    #[test]
    fn identifiers_with_digits() {
        let tokens = tokenize("RE1 + S2 + kNN").unwrap();
        assert_eq!(tokens[0], Token::Ident("RE1".into()));
        assert_eq!(tokens[4], Token::Ident("kNN".into()));
    }

    #[test]
    fn rejects_unknown_characters() {
        assert!(tokenize("N % R").is_err());
        assert!(tokenize("1..2").is_err());
    }
}
