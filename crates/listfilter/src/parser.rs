//! Recursive descent parser for filter expressions.

use super::ast::{
    AdditiveExpression, AdditiveOperator, ComparisonExpression, ComparisonOperator, Expression,
    Identifier, LogicalExpression, LogicalOperator, MultiplicativeExpression,
    MultiplicativeOperator, Primary, PrimaryExpression, Span, ValueExpression,
};
use super::error::{CompileResult, ParseError};
use super::lexer::{Lexer, Token, TokenKind};

const END_OF_INPUT: &str = "end of input";

/// Maximum number of comparisons joined by `&&`/`||` in one filter.
pub const MAX_CLAUSES: usize = 256;

/// Maximum depth of nested parentheses in a value.
pub const MAX_NESTING: usize = 64;

/// Parser for filter expressions.
///
/// This parser implements an LL(1) recursive descent parser over the
/// whitespace-free token stream produced by [`Lexer::tokenize`].
///
/// # Grammar
///
/// ```text
/// expression     ::= logical
/// logical        ::= comparison (("&&" | "||") logical)?
/// comparison     ::= identifier comparison_op value
/// identifier     ::= name (":" name)?
/// value          ::= additive
/// additive       ::= multiplicative (("+" | "-") multiplicative)*
/// multiplicative ::= primary (("*" | "/") primary)*
/// primary        ::= string | number | bool | "null" | macro | "(" value ")"
/// ```
///
/// # Logical Operators
///
/// `&&` and `||` share one level and group to the right, so
/// `a=1 && b=2 || c=3` parses as `a=1 && (b=2 || c=3)`.
///
/// # Example
///
/// ```
/// use listfilter_rs::{FilterParser, LogicalOperator};
///
/// let expr = FilterParser::parse("status = 'active' && age > 21").unwrap();
/// assert_eq!(expr.logical.left.field.name, "status");
/// assert!(matches!(expr.logical.right, Some((LogicalOperator::And, _))));
/// ```
pub struct FilterParser<'a> {
    tokens: Vec<Token<'a>>,
    position: usize,
    /// Number of currently open parentheses.
    depth: usize,
    /// Byte length of the input, reported as the offset of end of input.
    input_len: usize,
}

impl<'a> FilterParser<'a> {
    /// Parses a filter expression string into an [`Expression`] AST.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::Lex` if the input contains a character no token
    /// rule accepts (including an unterminated string).
    ///
    /// Returns `CompileError::Parse` if the tokens do not follow the grammar,
    /// including empty input and trailing tokens after a complete expression.
    pub fn parse(input: &'a str) -> CompileResult<Expression> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Self {
            tokens,
            position: 0,
            depth: 0,
            input_len: input.len(),
        };

        let logical = parser.parse_logical()?;

        // Check that we consumed all tokens
        if let Some(remaining) = parser.peek() {
            return Err(ParseError::new(
                remaining.offset,
                &["arithmetic operator", "logical operator", END_OF_INPUT],
                describe(remaining),
            )
            .into());
        }

        Ok(Expression { logical })
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.position).copied();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// End offset of the most recently consumed token.
    fn last_end(&self) -> usize {
        self.position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, Token::end)
    }

    /// Builds an error for the current token (or end of input).
    fn error_here(&self, expected: &[&str]) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::new(token.offset, expected, describe(token)),
            None => ParseError::new(self.input_len, expected, END_OF_INPUT),
        }
    }

    /// Consumes a token of the given kind or fails naming `expected`.
    fn expect_kind(&mut self, kind: TokenKind, expected: &[&str]) -> Result<Token<'a>, ParseError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                let token = *token;
                self.position += 1;
                Ok(token)
            }
            _ => Err(self.error_here(expected)),
        }
    }

    /// Parses `comparison (("&&" | "||") logical)?`
    ///
    /// The chain is read in a loop and then folded into the right-nested
    /// tree, so its length does not grow the call stack.
    fn parse_logical(&mut self) -> Result<LogicalExpression, ParseError> {
        let first = self.parse_comparison()?;
        let mut rest = Vec::new();

        loop {
            let (operator, token) = match self.peek() {
                Some(token) if token.is(TokenKind::LogicalOp, "&&") => (LogicalOperator::And, *token),
                Some(token) if token.is(TokenKind::LogicalOp, "||") => (LogicalOperator::Or, *token),
                _ => break,
            };
            if rest.len() + 1 >= MAX_CLAUSES {
                return Err(ParseError::new(
                    token.offset,
                    &[END_OF_INPUT],
                    format!("more than {MAX_CLAUSES} comparisons"),
                ));
            }
            self.advance(); // consume '&&' / '||'
            rest.push((operator, self.parse_comparison()?));
        }

        let mut right = None;
        for (operator, comparison) in rest.into_iter().rev() {
            right = Some((operator, Box::new(logical_node(comparison, right))));
        }
        Ok(logical_node(first, right))
    }

    /// Parses `identifier comparison_op value`
    fn parse_comparison(&mut self) -> Result<ComparisonExpression, ParseError> {
        let field = self.parse_identifier()?;

        let expected_op: &[&str] = if field.modifier.is_some() {
            &["comparison operator"]
        } else {
            &["\":\"", "comparison operator"]
        };
        let op_token = self.expect_kind(TokenKind::ComparisonOp, expected_op)?;
        let operator = ComparisonOperator::from_symbol(op_token.text).ok_or_else(|| {
            ParseError::new(op_token.offset, &["comparison operator"], describe(&op_token))
        })?;

        let value = self.parse_value()?;
        let span = Span::new(field.span.start, value.span.end);
        Ok(ComparisonExpression {
            field,
            operator,
            value,
            span,
        })
    }

    /// Parses `name (":" name)?`
    fn parse_identifier(&mut self) -> Result<Identifier, ParseError> {
        let name = self.expect_kind(TokenKind::Identifier, &["identifier"])?;

        let modifier = match self.peek() {
            Some(token) if token.is(TokenKind::Punct, ":") => {
                self.advance(); // consume ':'
                let modifier = self.expect_kind(TokenKind::Identifier, &["modifier identifier"])?;
                Some(modifier.text.to_string())
            }
            _ => None,
        };

        Ok(Identifier {
            name: name.text.to_string(),
            modifier,
            span: Span::new(name.offset, self.last_end()),
        })
    }

    /// Parses a value: `additive`
    fn parse_value(&mut self) -> Result<ValueExpression, ParseError> {
        let additive = self.parse_additive()?;
        let span = additive.span;
        Ok(ValueExpression { additive, span })
    }

    /// Parses `multiplicative (("+" | "-") multiplicative)*`
    fn parse_additive(&mut self) -> Result<AdditiveExpression, ParseError> {
        let left = self.parse_multiplicative()?;
        let start = left.span.start;
        let mut rest = Vec::new();

        loop {
            let operator = match self.peek() {
                Some(token) if token.is(TokenKind::ArithmeticOp, "+") => AdditiveOperator::Add,
                Some(token) if token.is(TokenKind::ArithmeticOp, "-") => AdditiveOperator::Sub,
                _ => break,
            };
            self.advance();
            rest.push((operator, self.parse_multiplicative()?));
        }

        Ok(AdditiveExpression {
            left,
            rest,
            span: Span::new(start, self.last_end()),
        })
    }

    /// Parses `primary (("*" | "/") primary)*`
    fn parse_multiplicative(&mut self) -> Result<MultiplicativeExpression, ParseError> {
        let left = self.parse_primary()?;
        let start = left.span.start;
        let mut rest = Vec::new();

        loop {
            let operator = match self.peek() {
                Some(token) if token.is(TokenKind::ArithmeticOp, "*") => {
                    MultiplicativeOperator::Mul
                }
                Some(token) if token.is(TokenKind::ArithmeticOp, "/") => {
                    MultiplicativeOperator::Div
                }
                _ => break,
            };
            self.advance();
            rest.push((operator, self.parse_primary()?));
        }

        Ok(MultiplicativeExpression {
            left,
            rest,
            span: Span::new(start, self.last_end()),
        })
    }

    /// Parses `string | number | bool | "null" | macro | "(" value ")"`
    fn parse_primary(&mut self) -> Result<PrimaryExpression, ParseError> {
        const EXPECTED: &[&str] = &["string", "number", "bool", "null", "macro", "\"(\""];

        let Some(token) = self.peek().copied() else {
            return Err(self.error_here(EXPECTED));
        };

        let kind = match token.kind {
            TokenKind::String => Primary::String(strip_quotes(token.text).to_string()),
            TokenKind::Number => {
                let number = token
                    .text
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| {
                        ParseError::new(token.offset, &["finite number"], describe(&token))
                    })?;
                Primary::Number(number)
            }
            TokenKind::Bool => Primary::Bool(token.text == "true"),
            TokenKind::Null => Primary::Null,
            TokenKind::Macro => Primary::Macro(token.text.trim_start_matches('@').to_string()),
            TokenKind::Punct if token.text == "(" => {
                if self.depth >= MAX_NESTING {
                    return Err(ParseError::new(
                        token.offset,
                        &["string", "number", "bool", "null", "macro"],
                        format!("\"(\" nested deeper than {MAX_NESTING}"),
                    ));
                }
                self.advance(); // consume '('
                self.depth += 1;
                let inner = self.parse_value()?;
                self.depth -= 1;
                match self.peek() {
                    Some(close) if close.is(TokenKind::Punct, ")") => {}
                    _ => return Err(self.error_here(&["arithmetic operator", "\")\""])),
                }
                self.advance(); // consume ')'
                return Ok(PrimaryExpression {
                    kind: Primary::Group(Box::new(inner)),
                    span: Span::new(token.offset, self.last_end()),
                });
            }
            _ => return Err(self.error_here(EXPECTED)),
        };

        self.advance();
        Ok(PrimaryExpression {
            kind,
            span: Span::new(token.offset, token.end()),
        })
    }
}

/// Builds one link of a logical chain, spanning to the end of its tail.
fn logical_node(
    left: ComparisonExpression,
    right: Option<(LogicalOperator, Box<LogicalExpression>)>,
) -> LogicalExpression {
    let end = right.as_ref().map_or(left.span.end, |(_, tail)| tail.span.end);
    let span = Span::new(left.span.start, end);
    LogicalExpression { left, right, span }
}

/// Removes the surrounding quote characters from a string token.
fn strip_quotes(text: &str) -> &str {
    text.get(1..text.len().saturating_sub(1)).unwrap_or("")
}

/// Describes a token for error messages, e.g. `identifier "b"`.
fn describe(token: &Token<'_>) -> String {
    format!("{} {:?}", token.kind, token.text)
}
