//! Precedence-climbing parser producing the formula syntax tree.
//!
//! Grammar, lowest to highest binding:
//!
//! ```text
//! comparison  > < >= <= == !=     left-assoc, yields 1/0
//! additive    + -                 left-assoc
//! term        * / %               left-assoc
//! unary       + -                 prefix
//! power       **                  right-assoc, binds tighter than a prefix on its left
//! primary     number | name | name(args) | (expr)
//! ```

use super::error::FormulaError;
use super::lexer::{Lexer, Token};

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Name(String),
    Call {
        name: String,
        args: Vec<Expr>,
    },
    UnaryOp {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Negate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
}

const UNARY_PREC: u8 = 4;

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Token,
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, max_depth: usize) -> Result<Self, FormulaError> {
        let mut lexer = Lexer::new(input);
        let lookahead = lexer.next_token()?;
        Ok(Self {
            lexer,
            lookahead,
            position: 0,
            depth: 0,
            max_depth,
        })
    }

    fn bump(&mut self) -> Result<Token, FormulaError> {
        self.position = self.lexer.position();
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.lookahead, next))
    }

    fn error(&self, message: impl Into<String>) -> FormulaError {
        FormulaError::Syntax {
            position: self.position,
            message: message.into(),
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), FormulaError> {
        if self.lookahead == token {
            self.bump()?;
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {}, found {}",
                describe(&token),
                describe(&self.lookahead)
            )))
        }
    }

    fn parse(&mut self) -> Result<Expr, FormulaError> {
        if self.lookahead == Token::Eof {
            return Err(FormulaError::Empty);
        }
        let (expr, _) = self.parse_expr(0)?;
        if self.lookahead != Token::Eof {
            return Err(self.error(format!("unexpected {}", describe(&self.lookahead))));
        }
        Ok(expr)
    }

    /// Height of a node whose tallest child has `child_height`. Tree height,
    /// not call depth, bounds the evaluator's recursion.
    fn node_height(&self, child_height: usize) -> Result<usize, FormulaError> {
        let height = child_height + 1;
        if height > self.max_depth {
            return Err(FormulaError::TooDeep {
                limit: self.max_depth,
            });
        }
        Ok(height)
    }

    fn parse_expr(&mut self, min_prec: u8) -> Result<(Expr, usize), FormulaError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::TooDeep {
                limit: self.max_depth,
            });
        }

        let (mut left, mut height) = self.parse_prefix()?;
        while let Some((op, prec)) = self.infix_binding_power() {
            if prec < min_prec {
                break;
            }
            self.bump()?;
            let (right, right_height) = if op == BinaryOp::Power {
                self.parse_expr(UNARY_PREC)?
            } else {
                self.parse_expr(prec + 1)?
            };
            height = self.node_height(height.max(right_height))?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth -= 1;
        Ok((left, height))
    }

    fn parse_prefix(&mut self) -> Result<(Expr, usize), FormulaError> {
        match &self.lookahead {
            Token::Minus | Token::Plus => {
                let op = if self.bump()? == Token::Minus {
                    UnaryOp::Negate
                } else {
                    UnaryOp::Plus
                };
                let (expr, height) = self.parse_expr(UNARY_PREC)?;
                Ok((
                    Expr::UnaryOp {
                        op,
                        expr: Box::new(expr),
                    },
                    self.node_height(height)?,
                ))
            }
            Token::Number(n) => {
                let n = *n;
                self.bump()?;
                Ok((Expr::Number(n), 1))
            }
            Token::Identifier(name) => {
                let name = name.clone();
                self.bump()?;
                if self.lookahead == Token::LParen {
                    self.bump()?;
                    let (args, height) = self.parse_args()?;
                    Ok((Expr::Call { name, args }, self.node_height(height)?))
                } else {
                    Ok((Expr::Name(name), 1))
                }
            }
            Token::LParen => {
                self.bump()?;
                let inner = self.parse_expr(0)?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            other => Err(self.error(format!("unexpected {}", describe(other)))),
        }
    }

    /// Arguments up to the closing parenthesis, with the tallest one's height.
    fn parse_args(&mut self) -> Result<(Vec<Expr>, usize), FormulaError> {
        let mut args = Vec::new();
        let mut height = 0;
        if self.lookahead == Token::RParen {
            self.bump()?;
            return Ok((args, height));
        }
        loop {
            let (arg, arg_height) = self.parse_expr(0)?;
            args.push(arg);
            height = height.max(arg_height);
            match self.lookahead {
                Token::Comma => {
                    self.bump()?;
                }
                Token::RParen => {
                    self.bump()?;
                    return Ok((args, height));
                }
                _ => {
                    return Err(self.error(format!(
                        "expected ',' or ')', found {}",
                        describe(&self.lookahead)
                    )));
                }
            }
        }
    }

    fn infix_binding_power(&self) -> Option<(BinaryOp, u8)> {
        match self.lookahead {
            Token::EqualsEquals => Some((BinaryOp::Equals, 1)),
            Token::NotEquals => Some((BinaryOp::NotEquals, 1)),
            Token::Less => Some((BinaryOp::Less, 1)),
            Token::LessEquals => Some((BinaryOp::LessEquals, 1)),
            Token::Greater => Some((BinaryOp::Greater, 1)),
            Token::GreaterEquals => Some((BinaryOp::GreaterEquals, 1)),
            Token::Plus => Some((BinaryOp::Add, 2)),
            Token::Minus => Some((BinaryOp::Subtract, 2)),
            Token::Star => Some((BinaryOp::Multiply, 3)),
            Token::Slash => Some((BinaryOp::Divide, 3)),
            Token::Percent => Some((BinaryOp::Modulo, 3)),
            Token::StarStar => Some((BinaryOp::Power, 5)),
            _ => None,
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(n) => format!("number {n}"),
        Token::Identifier(name) => format!("name '{name}'"),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::StarStar => "'**'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::Percent => "'%'".to_string(),
        Token::Less => "'<'".to_string(),
        Token::LessEquals => "'<='".to_string(),
        Token::Greater => "'>'".to_string(),
        Token::GreaterEquals => "'>='".to_string(),
        Token::EqualsEquals => "'=='".to_string(),
        Token::NotEquals => "'!='".to_string(),
        Token::Eof => "end of formula".to_string(),
    }
}

/// Parse a formula into its syntax tree.
pub fn parse(input: &str, max_depth: usize) -> Result<Expr, FormulaError> {
    Parser::new(input, max_depth)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Number(n))
    }

    fn bin(op: BinaryOp, left: Box<Expr>, right: Box<Expr>) -> Box<Expr> {
        Box::new(Expr::BinaryOp { op, left, right })
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        assert_eq!(
            parse("1 + 2 * 3", 64).unwrap(),
            *bin(BinaryOp::Add, num(1.0), bin(BinaryOp::Multiply, num(2.0), num(3.0)))
        );
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        assert_eq!(
            parse("5 - 2 - 1", 64).unwrap(),
            *bin(BinaryOp::Subtract, bin(BinaryOp::Subtract, num(5.0), num(2.0)), num(1.0))
        );
    }

    #[test]
    fn test_power_is_right_associative_and_beats_negation() {
        assert_eq!(
            parse("2 ** 3 ** 2", 64).unwrap(),
            *bin(BinaryOp::Power, num(2.0), bin(BinaryOp::Power, num(3.0), num(2.0)))
        );
        assert_eq!(
            parse("-2 ** 2", 64).unwrap(),
            Expr::UnaryOp {
                op: UnaryOp::Negate,
                expr: bin(BinaryOp::Power, num(2.0), num(2.0)),
            }
        );
    }

    #[test]
    fn test_comparison_is_lowest() {
        assert_eq!(
            parse("1 + 1 > 1", 64).unwrap(),
            *bin(BinaryOp::Greater, bin(BinaryOp::Add, num(1.0), num(1.0)), num(1.0))
        );
    }

    #[test]
    fn test_call_with_args() {
        assert_eq!(
            parse("round(x, 2)", 64).unwrap(),
            Expr::Call {
                name: "round".into(),
                args: vec![Expr::Name("x".into()), Expr::Number(2.0)],
            }
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(parse("", 64), Err(FormulaError::Empty)));
        assert!(matches!(parse("1 +", 64), Err(FormulaError::Syntax { .. })));
        assert!(matches!(parse("(1", 64), Err(FormulaError::Syntax { .. })));
        assert!(matches!(parse("sum(a b)", 64), Err(FormulaError::Syntax { .. })));
        assert!(matches!(parse("1 2", 64), Err(FormulaError::Syntax { .. })));
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert!(matches!(parse(&deep, 64), Err(FormulaError::TooDeep { limit: 64 })));
        assert!(parse(&deep, 256).is_ok());
    }

    #[test]
    fn test_long_operator_chain_counts_toward_depth() {
        // Each '+' adds a level to the left-deep tree.
        let chain = vec!["1"; 100].join("+");
        assert!(matches!(parse(&chain, 64), Err(FormulaError::TooDeep { limit: 64 })));
        assert!(parse(&chain, 128).is_ok());

        let nested_calls = format!("{}x{}", "abs(".repeat(70), ")".repeat(70));
        assert!(matches!(
            parse(&nested_calls, 64),
            Err(FormulaError::TooDeep { limit: 64 })
        ));
    }
}
