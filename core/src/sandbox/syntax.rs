//! Parsing sandbox code into statements.

use lazy_static::lazy_static;
use pest::Parser;
use pest::error::{Error, ErrorVariant, LineColLocation};
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::host::Mode;

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        .op(Op::infix(Rule::or_op, Assoc::Left))         // `or`
        .op(Op::infix(Rule::and_op, Assoc::Left))        // `and`
        .op(Op::prefix(Rule::not_op))                    // `not`
        .op(
            Op::infix(Rule::eq, Assoc::Left)
                | Op::infix(Rule::ne, Assoc::Left)
                | Op::infix(Rule::lt, Assoc::Left)
                | Op::infix(Rule::le, Assoc::Left)
                | Op::infix(Rule::gt, Assoc::Left)
                | Op::infix(Rule::ge, Assoc::Left)
        )                                                // comparisons
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(
            Op::infix(Rule::mul, Assoc::Left)
                | Op::infix(Rule::div, Assoc::Left)
                | Op::infix(Rule::floordiv, Assoc::Left)
                | Op::infix(Rule::modulo, Assoc::Left)
        )
        .op(Op::prefix(Rule::neg) | Op::prefix(Rule::pos)) // unary `-`, `+`
        .op(Op::infix(Rule::pow, Assoc::Right))          // `**` (right-assoc)
        .op(Op::postfix(Rule::call_op) | Op::postfix(Rule::index_op));
}

#[derive(Parser)]
#[grammar = "sandbox/grammar.pest"]
pub struct SandboxParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "** or pow()",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
    List(Vec<Expr>),
    Name(String),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: BoolOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callable: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        value: Box<Expr>,
        index: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Assign { name: String, value: Expr },
    Del(String),
    Raise(Option<Expr>),
    Assert { test: Expr, msg: Option<Expr> },
    Pass,
    Class { name: String, base: Option<Expr> },
}

/// A statement and the one-based line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub line: usize,
    pub kind: StmtKind,
}

/// A parse failure and the one-based line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl From<Error<Rule>> for SyntaxError {
    fn from(err: Error<Rule>) -> Self {
        let line = match err.line_col {
            LineColLocation::Pos((line, _)) | LineColLocation::Span((line, _), _) => line,
        };
        let message = match err.variant {
            ErrorVariant::CustomError { message } => message,
            ErrorVariant::ParsingError { .. } => "invalid syntax".to_string(),
        };
        SyntaxError { line, message }
    }
}

/// Parse `code` as a sequence of statements.
///
/// In [`Mode::Eval`] the single expression is returned as an expression
/// statement.
pub fn parse(code: &str, mode: Mode) -> Result<Vec<Stmt>, SyntaxError> {
    let rule = match mode {
        Mode::Single => Rule::single_input,
        Mode::Eval => Rule::eval_input,
        Mode::Exec => Rule::program,
    };
    let mut pairs = SandboxParser::parse(rule, code)?;
    let Some(root) = pairs.next() else {
        return Ok(Vec::new());
    };
    let mut stmts = Vec::new();
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::EOI => {}
            Rule::expression => stmts.push(Stmt {
                line: pair.line_col().0,
                kind: StmtKind::Expr(parse_expr(pair)?),
            }),
            _ => stmts.push(parse_stmt(pair)?),
        }
    }
    Ok(stmts)
}

fn custom_error(pair: &Pair<Rule>, message: &str) -> Error<Rule> {
    Error::new_from_span(
        ErrorVariant::CustomError {
            message: message.to_string(),
        },
        pair.as_span(),
    )
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_class | Rule::kw_del | Rule::kw_raise | Rule::kw_assert | Rule::kw_pass
    )
}

/// The children of a statement, without its keywords.
fn operands(pair: Pair<'_, Rule>) -> impl Iterator<Item = Pair<'_, Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

fn next_operand<'i>(
    parent: &Pair<'i, Rule>,
    operands: &mut impl Iterator<Item = Pair<'i, Rule>>,
) -> Result<Pair<'i, Rule>, Error<Rule>> {
    operands
        .next()
        .ok_or_else(|| custom_error(parent, "missing expected pair in rule"))
}

fn parse_stmt(pair: Pair<Rule>) -> Result<Stmt, Error<Rule>> {
    let line = pair.line_col().0;
    let kind = match pair.as_rule() {
        Rule::expr_stmt => {
            let mut inner = operands(pair.clone());
            StmtKind::Expr(parse_expr(next_operand(&pair, &mut inner)?)?)
        }
        Rule::assign_stmt => {
            let mut inner = operands(pair.clone());
            let name = next_operand(&pair, &mut inner)?.as_str().to_string();
            let value = parse_expr(next_operand(&pair, &mut inner)?)?;
            StmtKind::Assign { name, value }
        }
        Rule::del_stmt => {
            let mut inner = operands(pair.clone());
            StmtKind::Del(next_operand(&pair, &mut inner)?.as_str().to_string())
        }
        Rule::raise_stmt => StmtKind::Raise(operands(pair).next().map(parse_expr).transpose()?),
        Rule::assert_stmt => {
            let mut inner = operands(pair.clone());
            let test = parse_expr(next_operand(&pair, &mut inner)?)?;
            let msg = inner.next().map(parse_expr).transpose()?;
            StmtKind::Assert { test, msg }
        }
        Rule::pass_stmt => StmtKind::Pass,
        Rule::class_def => {
            let mut inner = operands(pair.clone());
            let name = next_operand(&pair, &mut inner)?.as_str().to_string();
            let base = inner.next().map(parse_expr).transpose()?;
            StmtKind::Class { name, base }
        }
        rule => return Err(custom_error(&pair, &format!("unexpected statement {rule:?}"))),
    };
    Ok(Stmt { line, kind })
}

pub fn parse_expr(pair: Pair<Rule>) -> Result<Expr, Error<Rule>> {
    match pair.as_rule() {
        Rule::expression => PRATT_PARSER
            .map_primary(parse_expr)
            .map_prefix(|op, rhs| {
                let op = match op.as_rule() {
                    Rule::neg => UnaryOp::Neg,
                    Rule::pos => UnaryOp::Pos,
                    Rule::not_op => UnaryOp::Not,
                    rule => return Err(custom_error(&op, &format!("unknown prefix operator {rule:?}"))),
                };
                Ok(Expr::Unary {
                    op,
                    expr: Box::new(rhs?),
                })
            })
            .map_infix(|lhs, op, rhs| {
                let op = match op.as_rule() {
                    Rule::and_op => BoolOp::And,
                    Rule::or_op => BoolOp::Or,
                    rule => {
                        let op = binary_op(rule)
                            .ok_or_else(|| custom_error(&op, "unknown binary operator"))?;
                        return Ok(Expr::Binary {
                            op,
                            left: Box::new(lhs?),
                            right: Box::new(rhs?),
                        });
                    }
                };
                Ok(Expr::Logical {
                    op,
                    left: Box::new(lhs?),
                    right: Box::new(rhs?),
                })
            })
            .map_postfix(|lhs, op| match op.as_rule() {
                Rule::call_op => {
                    let args = op.into_inner().map(parse_expr).collect::<Result<_, _>>()?;
                    Ok(Expr::Call {
                        callable: Box::new(lhs?),
                        args,
                    })
                }
                Rule::index_op => {
                    let index = op
                        .clone()
                        .into_inner()
                        .next()
                        .ok_or_else(|| custom_error(&op, "missing index expression"))?;
                    Ok(Expr::Index {
                        value: Box::new(lhs?),
                        index: Box::new(parse_expr(index)?),
                    })
                }
                rule => Err(custom_error(&op, &format!("unknown postfix operator {rule:?}"))),
            })
            .parse(pair.into_inner()),

        Rule::integer => pair
            .as_str()
            .parse()
            .map(Expr::Int)
            .map_err(|_| custom_error(&pair, "integer literal is too large")),

        Rule::float => pair
            .as_str()
            .parse()
            .map(Expr::Float)
            .map_err(|_| custom_error(&pair, "invalid float literal")),

        Rule::string => {
            let inner = pair
                .clone()
                .into_inner()
                .next()
                .ok_or_else(|| custom_error(&pair, "missing string body"))?;
            Ok(Expr::Str(unescape(inner.as_str())))
        }

        Rule::true_lit => Ok(Expr::Bool(true)),
        Rule::false_lit => Ok(Expr::Bool(false)),
        Rule::none_lit => Ok(Expr::None),

        Rule::list => {
            let items = pair
                .into_inner()
                .map(parse_expr)
                .collect::<Result<_, _>>()?;
            Ok(Expr::List(items))
        }

        Rule::ident => Ok(Expr::Name(pair.as_str().to_string())),

        rule => Err(custom_error(&pair, &format!("unexpected expression {rule:?}"))),
    }
}

fn binary_op(rule: Rule) -> Option<BinaryOp> {
    Some(match rule {
        Rule::add => BinaryOp::Add,
        Rule::sub => BinaryOp::Sub,
        Rule::mul => BinaryOp::Mul,
        Rule::div => BinaryOp::Div,
        Rule::floordiv => BinaryOp::FloorDiv,
        Rule::modulo => BinaryOp::Mod,
        Rule::pow => BinaryOp::Pow,
        Rule::eq => BinaryOp::Eq,
        Rule::ne => BinaryOp::Ne,
        Rule::lt => BinaryOp::Lt,
        Rule::le => BinaryOp::Le,
        Rule::gt => BinaryOp::Gt,
        Rule::ge => BinaryOp::Ge,
        _ => return None,
    })
}

/// Resolve backslash escapes. Unknown escapes are kept verbatim.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(c @ ('\\' | '\'' | '"')) => out.push(c),
            Some(c) => {
                out.push('\\');
                out.push(c);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn expr(code: &str) -> Expr {
        let stmts = parse(code, Mode::Eval).expect("expression should parse");
        match stmts.into_iter().next().map(|stmt| stmt.kind) {
            Some(StmtKind::Expr(expr)) => expr,
            other => panic!("expected an expression, got {other:?}"),
        }
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(
            expr("1 + 2 * 3"),
            binary(
                BinaryOp::Add,
                Expr::Int(1),
                binary(BinaryOp::Mul, Expr::Int(2), Expr::Int(3))
            )
        );
        assert_eq!(
            expr("2 ** 3 ** 2"),
            binary(
                BinaryOp::Pow,
                Expr::Int(2),
                binary(BinaryOp::Pow, Expr::Int(3), Expr::Int(2))
            )
        );
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        assert_eq!(
            expr("-2 ** 2"),
            Expr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(binary(BinaryOp::Pow, Expr::Int(2), Expr::Int(2))),
            }
        );
    }

    #[test]
    fn test_not_binds_looser_than_comparison() {
        assert_eq!(
            expr("not a == b"),
            Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(binary(
                    BinaryOp::Eq,
                    Expr::Name("a".to_string()),
                    Expr::Name("b".to_string())
                )),
            }
        );
    }

    #[test]
    fn test_postfix() {
        assert_eq!(
            expr("f(1, 'a')[0]"),
            Expr::Index {
                value: Box::new(Expr::Call {
                    callable: Box::new(Expr::Name("f".to_string())),
                    args: vec![Expr::Int(1), Expr::Str("a".to_string())],
                }),
                index: Box::new(Expr::Int(0)),
            }
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(expr("1.5"), Expr::Float(1.5));
        assert_eq!(expr("1e3"), Expr::Float(1000.0));
        assert_eq!(expr("'a\\'b\\n'"), Expr::Str("a'b\n".to_string()));
        assert_eq!(expr("\"x\""), Expr::Str("x".to_string()));
        assert_eq!(expr("[True, None, ]"), Expr::List(vec![Expr::Bool(true), Expr::None]));
        assert_eq!(expr("Nonesuch"), Expr::Name("Nonesuch".to_string()));
    }

    #[test]
    fn test_statements() {
        let stmts = parse("x = 1; del x; pass # done\n", Mode::Single).unwrap();
        let kinds: Vec<_> = stmts.into_iter().map(|stmt| stmt.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StmtKind::Assign {
                    name: "x".to_string(),
                    value: Expr::Int(1)
                },
                StmtKind::Del("x".to_string()),
                StmtKind::Pass,
            ]
        );

        let stmts = parse("class E(ValueError): pass", Mode::Single).unwrap();
        assert_eq!(
            stmts[0].kind,
            StmtKind::Class {
                name: "E".to_string(),
                base: Some(Expr::Name("ValueError".to_string()))
            }
        );
        assert_eq!(
            parse("raise", Mode::Single).unwrap()[0].kind,
            StmtKind::Raise(None)
        );
    }

    #[test]
    fn test_program_lines() {
        let stmts = parse("a = 1\n\nb = a\nassert b == 1, 'b'\n", Mode::Exec).unwrap();
        let lines: Vec<_> = stmts.iter().map(|stmt| stmt.line).collect();
        assert_eq!(lines, vec![1, 3, 4]);
    }

    #[test]
    fn test_mode_restrictions() {
        assert!(parse("x = 1", Mode::Eval).is_err());
        assert!(parse("a = 1\nb = 2", Mode::Single).is_err());
        assert!(parse("1 + 1\n", Mode::Single).is_ok());
        assert!(parse("", Mode::Single).unwrap().is_empty());
    }

    #[test]
    fn test_syntax_error_line() {
        let err = parse("a = 1\nb = (2\n", Mode::Exec).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.message, "invalid syntax");

        let err = parse("x = 1 +", Mode::Single).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_keywords_are_not_names() {
        assert!(parse("pass = 1", Mode::Single).is_err());
        assert!(parse("passed = 1", Mode::Single).is_ok());
        assert!(parse("class = 1", Mode::Single).is_err());
    }
}
