//! PEST-based parser for script files
//!
//! Produces the executor's AST, with span information for error reporting.

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};

use super::executor::types::ast::{
    is_default_span, BinaryOp, Expr, FunctionDef, Param, Span, Stmt,
};

pub mod semantic_validator;

#[cfg(test)]
mod tests;

/* ===================== Script Definition ===================== */

/// Script definition - represents a complete script file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptDef {
    /// Function definitions, in source order
    pub functions: Vec<FunctionDef>,
    /// Span of the entire script
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "parser/script.pest"]
struct ScriptParser;

/* ===================== Error Types ===================== */

#[derive(Debug)]
pub enum ParseError {
    PestError(String, Option<Span>),
    BuildError(String, Option<Span>),
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::PestError(_, span) => *span,
            ParseError::BuildError(_, span) => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::PestError(msg, _) => msg,
            ParseError::BuildError(msg, _) => msg,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::PestError(msg, _) => write!(f, "{}", msg),
            ParseError::BuildError(msg, _) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let (start, end) = match err.location {
            pest::error::InputLocation::Pos(pos) => (pos, pos),
            pest::error::InputLocation::Span((start, end)) => (start, end),
        };
        let span = match err.line_col {
            pest::error::LineColLocation::Pos((line, col)) => Some(Span {
                start,
                end,
                start_line: line.saturating_sub(1),
                start_col: col.saturating_sub(1),
                end_line: line.saturating_sub(1),
                end_col: col,
            }),
            pest::error::LineColLocation::Span((start_line, start_col), (end_line, end_col)) => {
                Some(Span {
                    start,
                    end,
                    start_line: start_line.saturating_sub(1),
                    start_col: start_col.saturating_sub(1),
                    end_line: end_line.saturating_sub(1),
                    end_col: end_col.saturating_sub(1),
                })
            }
        };
        ParseError::PestError(err.to_string(), span)
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/* ===================== Span Helpers ===================== */

/// Convert a PEST pair's span to our Span type
fn pair_to_span(pair: &Pair<Rule>, source: &str) -> Span {
    let pest_span = pair.as_span();
    let start = pest_span.start();
    let end = pest_span.end();

    let (start_line, start_col) = offset_to_line_col(source, start);
    let (end_line, end_col) = offset_to_line_col(source, end);

    Span::new(start, end, start_line, start_col, end_line, end_col)
}

/// Convert byte offset to (line, column) - 0-indexed
fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    let mut current_offset = 0;

    for ch in source.chars() {
        if current_offset >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
        current_offset += ch.len_utf8();
    }

    (line, col)
}

/// Next child of a pair the grammar guarantees to be present
fn expect_next<'a>(inner: &mut Pairs<'a, Rule>, what: &str, span: Span) -> ParseResult<Pair<'a, Rule>> {
    inner
        .next()
        .ok_or_else(|| ParseError::BuildError(format!("Missing {}", what), Some(span)))
}

/* ===================== Public API ===================== */

/// Parse a script source string into its function definitions
pub fn parse_script(source: &str) -> ParseResult<ScriptDef> {
    let mut pairs = ScriptParser::parse(Rule::program, source)?;
    let program = expect_next(&mut pairs, "program", Span::default())?;
    let span = pair_to_span(&program, source);

    let mut functions = Vec::new();
    for pair in program.into_inner() {
        match pair.as_rule() {
            Rule::function_def => functions.push(build_function(pair, source)?),
            Rule::EOI => {}
            _ => {
                return Err(ParseError::BuildError(
                    format!("Unexpected program content: {:?}", pair.as_rule()),
                    Some(pair_to_span(&pair, source)),
                ))
            }
        }
    }

    Ok(ScriptDef { functions, span })
}

/// Parse a single statement (testing API)
pub fn parse(source: &str) -> ParseResult<Stmt> {
    let mut pairs = ScriptParser::parse(Rule::single_statement, source)?;
    let program = expect_next(&mut pairs, "statement", Span::default())?;
    let span = pair_to_span(&program, source);
    let stmt = expect_next(&mut program.into_inner(), "statement", span)?;
    build_statement(stmt, source)
}

/* ===================== AST Builder ===================== */

fn build_function(pair: Pair<Rule>, source: &str) -> ParseResult<FunctionDef> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let name = expect_next(&mut inner, "function name", span)?
        .as_str()
        .to_string();

    let mut params = Vec::new();
    let mut body = None;
    for pair in inner {
        match pair.as_rule() {
            Rule::param_list => {
                for param in pair.into_inner() {
                    params.push(build_param(param, source)?);
                }
            }
            Rule::block => body = Some(build_block(pair, source)?),
            _ => {
                return Err(ParseError::BuildError(
                    format!("Unexpected function content: {:?}", pair.as_rule()),
                    Some(pair_to_span(&pair, source)),
                ))
            }
        }
    }

    let body = body.ok_or_else(|| {
        ParseError::BuildError(format!("Function '{}' has no body", name), Some(span))
    })?;

    Ok(FunctionDef {
        name,
        params,
        body,
        span,
    })
}

fn build_param(pair: Pair<Rule>, source: &str) -> ParseResult<Param> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let name = expect_next(&mut inner, "parameter name", span)?
        .as_str()
        .to_string();
    let type_name = inner.next().map(|t| t.as_str().trim().to_string());

    Ok(Param {
        name,
        type_name,
        span,
    })
}

fn build_block(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let statements: Result<Vec<Stmt>, ParseError> = pair
        .into_inner()
        .map(|stmt_pair| build_statement(stmt_pair, source))
        .collect();

    Ok(Stmt::Block {
        body: statements?,
        span,
    })
}

fn build_if_stmt(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let test = build_expression(expect_next(&mut inner, "if condition", span)?, source)?;
    let then_s = build_statement(expect_next(&mut inner, "if body", span)?, source)?;

    let else_s = if let Some(else_clause_pair) = inner.next() {
        let else_inner = expect_next(&mut else_clause_pair.into_inner(), "else body", span)?;
        Some(Box::new(build_statement(else_inner, source)?))
    } else {
        None
    };

    Ok(Stmt::If {
        test,
        then_s: Box::new(then_s),
        else_s,
        span,
    })
}

fn build_while_stmt(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let test = build_expression(expect_next(&mut inner, "while condition", span)?, source)?;
    let body = build_statement(expect_next(&mut inner, "while body", span)?, source)?;

    Ok(Stmt::While {
        test,
        body: Box::new(body),
        span,
    })
}

fn build_declare_stmt(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let name_pair = expect_next(&mut inner, "variable name", span)?;
    let name_span = pair_to_span(&name_pair, source);
    let name = name_pair.as_str().to_string();

    let init = match inner.next() {
        Some(expr_pair) => Some(build_expression(expr_pair, source)?),
        None => None,
    };

    Ok(Stmt::Declare {
        name,
        name_span,
        init,
        span,
    })
}

/// Build an assignment; compound forms (`x.a += e`) lower to `x.a = add(x.a, e)`
fn build_assign_stmt(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let var_pair = expect_next(&mut inner, "assignment target", span)?;
    let var_span = pair_to_span(&var_pair, source);
    let var = var_pair.as_str().to_string();

    // Rebuilt as an expression for compound operators
    let mut target = Expr::Ident {
        name: var.clone(),
        span: var_span,
    };
    let mut path = Vec::new();
    let mut op = None;
    let mut value = None;

    for pair in inner {
        match pair.as_rule() {
            Rule::assign_path_segment => {
                let segment_span = pair_to_span(&pair, source);
                let property = expect_next(&mut pair.into_inner(), "property name", segment_span)?
                    .as_str()
                    .to_string();
                target = Expr::Member {
                    span: target.span().merge(&segment_span),
                    object: Box::new(target),
                    property: property.clone(),
                };
                path.push(property);
            }
            Rule::assign_op => op = Some(pair.as_str().to_string()),
            Rule::expression => value = Some(build_expression(pair, source)?),
            _ => {}
        }
    }

    let value = value
        .ok_or_else(|| ParseError::BuildError("Missing assigned value".to_string(), Some(span)))?;

    let func_name = match op.as_deref() {
        Some("+=") => Some("add"),
        Some("-=") => Some("sub"),
        Some("*=") => Some("mul"),
        Some("/=") => Some("div"),
        _ => None,
    };

    let value = match func_name {
        Some(name) => Expr::Call {
            callee: Box::new(Expr::Ident {
                name: name.to_string(),
                span,
            }),
            args: vec![target, value],
            span,
        },
        None => value,
    };

    Ok(Stmt::Assign {
        var,
        var_span,
        path,
        value,
        span,
    })
}

fn build_binary_expr(pair: Pair<Rule>, source: &str) -> ParseResult<Expr> {
    let span = pair_to_span(&pair, source);
    let mut inner = pair.into_inner();

    let mut left = build_expression(expect_next(&mut inner, "operand", span)?, source)?;

    while let Some(op_pair) = inner.next() {
        let op_rule = op_pair.as_rule();
        let right = build_expression(expect_next(&mut inner, "right operand", span)?, source)?;
        let new_span = left.span().merge(&right.span());

        left = match op_rule {
            Rule::op_and => Expr::BinaryOp {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
                span: new_span,
            },
            Rule::op_or => Expr::BinaryOp {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                span: new_span,
            },
            _ => {
                let func_name = match op_rule {
                    Rule::op_eq => "eq",
                    Rule::op_ne => "ne",
                    Rule::op_lt => "lt",
                    Rule::op_lte => "lte",
                    Rule::op_gt => "gt",
                    Rule::op_gte => "gte",
                    Rule::op_add => "add",
                    Rule::op_sub => "sub",
                    Rule::op_mul => "mul",
                    Rule::op_div => "div",
                    Rule::op_mod => "mod",
                    _ => {
                        return Err(ParseError::BuildError(
                            format!("Expected operator, got {:?}", op_rule),
                            Some(pair_to_span(&op_pair, source)),
                        ))
                    }
                };

                Expr::Call {
                    callee: Box::new(Expr::Ident {
                        name: func_name.to_string(),
                        span: pair_to_span(&op_pair, source),
                    }),
                    args: vec![left, right],
                    span: new_span,
                }
            }
        };
    }

    Ok(left)
}

fn build_statement(pair: Pair<Rule>, source: &str) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair, source);

    match pair.as_rule() {
        Rule::statement => {
            let inner = expect_next(&mut pair.into_inner(), "statement", span)?;
            build_statement(inner, source)
        }
        Rule::return_stmt => {
            let value = match pair.into_inner().next() {
                Some(expr_pair) => Some(build_expression(expr_pair, source)?),
                None => None,
            };
            Ok(Stmt::Return { value, span })
        }
        Rule::if_stmt => build_if_stmt(pair, source),
        Rule::while_stmt => build_while_stmt(pair, source),
        Rule::break_stmt => Ok(Stmt::Break { span }),
        Rule::continue_stmt => Ok(Stmt::Continue { span }),
        Rule::block => build_block(pair, source),
        Rule::declare_stmt => build_declare_stmt(pair, source),
        Rule::assign_stmt => build_assign_stmt(pair, source),
        Rule::expr_stmt => {
            let expr_pair = expect_next(&mut pair.into_inner(), "expression", span)?;
            let expr = build_expression(expr_pair, source)?;
            Ok(Stmt::Expr { expr, span })
        }
        _ => Err(ParseError::BuildError(
            format!("Unexpected statement rule: {:?}", pair.as_rule()),
            Some(span),
        )),
    }
}

fn build_expression(pair: Pair<Rule>, source: &str) -> ParseResult<Expr> {
    let span = pair_to_span(&pair, source);

    match pair.as_rule() {
        Rule::expression | Rule::primary | Rule::literal => {
            let inner = expect_next(&mut pair.into_inner(), "expression", span)?;
            build_expression(inner, source)
        }
        Rule::logical_or_expr
        | Rule::logical_and_expr
        | Rule::equality_expr
        | Rule::comparison_expr
        | Rule::additive_expr
        | Rule::multiplicative_expr => build_binary_expr(pair, source),
        Rule::unary_expr => {
            let mut inner = pair.into_inner();
            let first = expect_next(&mut inner, "operand", span)?;

            let func_name = match first.as_rule() {
                Rule::op_not => "not",
                Rule::op_neg => "neg",
                _ => return build_expression(first, source),
            };
            let operand = build_expression(expect_next(&mut inner, "operand", span)?, source)?;

            // Fold negative number literals
            if let (Rule::op_neg, Expr::LitNum { v, .. }) = (first.as_rule(), &operand) {
                return Ok(Expr::LitNum { v: -v, span });
            }

            Ok(Expr::Call {
                callee: Box::new(Expr::Ident {
                    name: func_name.to_string(),
                    span: pair_to_span(&first, source),
                }),
                args: vec![operand],
                span,
            })
        }
        Rule::call_expr => {
            let mut inner = pair.into_inner();
            let mut expr = build_expression(expect_next(&mut inner, "primary", span)?, source)?;

            for postfix_pair in inner {
                let postfix_span = pair_to_span(&postfix_pair, source);
                let postfix_inner =
                    expect_next(&mut postfix_pair.into_inner(), "postfix", postfix_span)?;
                let new_span = expr.span().merge(&postfix_span);

                expr = match postfix_inner.as_rule() {
                    Rule::call_suffix => {
                        let args = match postfix_inner.into_inner().next() {
                            Some(arg_list_pair) => build_arg_list(arg_list_pair, source)?,
                            None => vec![],
                        };
                        Expr::Call {
                            callee: Box::new(expr),
                            args,
                            span: new_span,
                        }
                    }
                    Rule::member_access => {
                        let prop =
                            expect_next(&mut postfix_inner.into_inner(), "property", postfix_span)?;
                        Expr::Member {
                            object: Box::new(expr),
                            property: prop.as_str().to_string(),
                            span: new_span,
                        }
                    }
                    other => {
                        return Err(ParseError::BuildError(
                            format!("Unexpected postfix rule: {:?}", other),
                            Some(postfix_span),
                        ))
                    }
                };
            }

            Ok(expr)
        }
        Rule::identifier => {
            let name = pair.as_str().to_string();
            Ok(Expr::Ident { name, span })
        }
        Rule::number => {
            let num_str = pair.as_str();
            let value = num_str.parse::<f64>().map_err(|e| {
                ParseError::BuildError(
                    format!("Failed to parse number '{}': {}", num_str, e),
                    Some(span),
                )
            })?;
            Ok(Expr::LitNum { v: value, span })
        }
        Rule::boolean => {
            let value = pair.as_str() == "true";
            Ok(Expr::LitBool { v: value, span })
        }
        Rule::string => {
            let content = expect_next(&mut pair.into_inner(), "string content", span)?;
            Ok(Expr::LitStr {
                v: unescape(content.as_str()),
                span,
            })
        }
        Rule::null_lit => Ok(Expr::LitNull { span }),
        _ => Err(ParseError::BuildError(
            format!("Unexpected expression rule: {:?}", pair.as_rule()),
            Some(span),
        )),
    }
}

fn build_arg_list(pair: Pair<Rule>, source: &str) -> ParseResult<Vec<Expr>> {
    pair.into_inner()
        .map(|expr_pair| build_expression(expr_pair, source))
        .collect()
}

/// Resolve `\n`, `\t`, `\"` and `\\`; any other escaped char stands for itself
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
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
