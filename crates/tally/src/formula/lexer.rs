//! Tokenizer for the formula grammar.

use super::error::FormulaError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Identifier(String),
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    EqualsEquals,
    NotEquals,
    Eof,
}

pub(crate) struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    input: &'a str,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            input,
        }
    }

    /// Byte offset of the next unread character.
    pub(crate) fn position(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(i, _)| *i)
            .unwrap_or(self.input.len())
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn syntax(&self, position: usize, message: impl Into<String>) -> FormulaError {
        FormulaError::Syntax {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn next_token(&mut self) -> Result<Token, FormulaError> {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }

        let start = self.position();
        let Some(c) = self.peek() else {
            return Ok(Token::Eof);
        };

        if c.is_ascii_digit() || c == '.' {
            return self.lex_number(start);
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let mut ident = String::new();
            while let Some(c) = self.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    ident.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
            return Ok(Token::Identifier(ident));
        }

        self.bump();
        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '*' => {
                if self.peek() == Some('*') {
                    self.bump();
                    Token::StarStar
                } else {
                    Token::Star
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Token::LessEquals
                } else {
                    Token::Less
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Token::GreaterEquals
                } else {
                    Token::Greater
                }
            }
            '=' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Token::EqualsEquals
                } else {
                    return Err(self.syntax(start, "assignment is not allowed, use '==' to compare"));
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Token::NotEquals
                } else {
                    return Err(self.syntax(start, "unexpected character '!'"));
                }
            }
            other => {
                return Err(self.syntax(start, format!("unexpected character {other:?}")));
            }
        };
        Ok(token)
    }

    fn lex_number(&mut self, start: usize) -> Result<Token, FormulaError> {
        let mut text = String::new();
        let mut seen_digit = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                seen_digit = true;
            } else if c != '.' {
                break;
            }
            text.push(c);
            self.bump();
        }

        if !seen_digit {
            return Err(self.syntax(start, "unexpected character '.'"));
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            text.push('e');
            self.bump();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                text.push(sign);
                self.bump();
            }
            let mut exponent_digits = false;
            while let Some(c) = self.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                exponent_digits = true;
                text.push(c);
                self.bump();
            }
            if !exponent_digits {
                return Err(self.syntax(start, format!("malformed number '{text}'")));
            }
        }

        if matches!(self.peek(), Some(c) if c.is_ascii_alphabetic() || c == '_') {
            let position = self.position();
            return Err(self.syntax(position, "identifier cannot follow a number"));
        }

        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| self.syntax(start, format!("malformed number '{text}'")))
    }
}
