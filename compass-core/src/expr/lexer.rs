//! Tokenizer for condition and pre-population expressions

use super::error::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    In,
    If,
    Else,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

impl Token {
    /// Short description used in parse errors
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Str(s) => format!("string \"{}\"", s),
            Token::Ident(name) => format!("identifier {}", name),
            other => format!("{:?}", other),
        }
    }
}

/// Split an expression into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' => {
                let mut literal = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' || c == '_' {
                        if c != '_' {
                            literal.push(c);
                        }
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            '"' | '\'' => {
                chars.next();
                let quote = ch;
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, other)) => value.push(other),
                            None => break,
                        },
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        c => value.push(c),
                    }
                }
                if !closed {
                    return Err(ExprError::UnterminatedString(offset));
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(keyword_or_ident(word));
            }
            _ => {
                chars.next();
                let next = chars.peek().map(|&(_, c)| c);
                let (token, consumed_next) = match (ch, next) {
                    ('=', Some('=')) => (Token::EqEq, true),
                    ('!', Some('=')) => (Token::NotEq, true),
                    ('<', Some('=')) => (Token::Le, true),
                    ('>', Some('=')) => (Token::Ge, true),
                    ('&', Some('&')) => (Token::And, true),
                    ('|', Some('|')) => (Token::Or, true),
                    ('!', _) => (Token::Not, false),
                    ('<', _) => (Token::Lt, false),
                    ('>', _) => (Token::Gt, false),
                    ('+', _) => (Token::Plus, false),
                    ('-', _) => (Token::Minus, false),
                    ('*', _) => (Token::Star, false),
                    ('/', _) => (Token::Slash, false),
                    ('%', _) => (Token::Percent, false),
                    ('(', _) => (Token::LParen, false),
                    (')', _) => (Token::RParen, false),
                    ('[', _) => (Token::LBracket, false),
                    (']', _) => (Token::RBracket, false),
                    (',', _) => (Token::Comma, false),
                    _ => return Err(ExprError::UnexpectedChar { ch, offset }),
                };
                if consumed_next {
                    chars.next();
                }
                tokens.push(token);
            }
        }
    }

    Ok(tokens)
}

fn keyword_or_ident(word: String) -> Token {
    match word.as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "in" => Token::In,
        "if" => Token::If,
        "else" => Token::Else,
        "true" | "True" => Token::True,
        "false" | "False" => Token::False,
        "none" | "None" | "null" => Token::Null,
        _ => Token::Ident(word),
    }
}
