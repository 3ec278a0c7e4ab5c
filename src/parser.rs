//! Parser for Source programs
//!
//! Uses recursive descent with Pratt parsing for expressions. Constructs the
//! evaluator does not run (loops, arrays, objects, member access, ...) are
//! still parsed so they can be reported by name at runtime.

use std::rc::Rc;

use crate::ast::*;
use crate::error::Error;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::string_dict::StringDict;
use crate::value::SourceString;

/// Deepest nesting of statements and expressions accepted; each level is a
/// native recursion in the parser.
pub const MAX_NESTING_DEPTH: usize = 200;

/// Parser for Source code
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, string_dict: &'a mut StringDict) -> Self {
        let mut lexer = Lexer::new(source, string_dict);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            previous: Token::eof(0, 1, 1),
            depth: 0,
        }
    }

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program, Error> {
        let start = self.current.span;
        let body = self.parse_statement_list(|p| p.is_at_end())?;
        Ok(Program {
            body: body.into(),
            span: self.span_from(start),
        })
    }

    fn parse_statement_list(
        &mut self,
        done: impl Fn(&Self) -> bool,
    ) -> Result<Vec<Statement>, Error> {
        let mut body = Vec::new();
        while !done(self) {
            if self.is_at_end() {
                return Err(self.unexpected_token("'}'"));
            }
            // empty statement
            if self.match_token(&TokenKind::Semicolon) {
                continue;
            }
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    // ============ STATEMENTS ============

    fn parse_statement(&mut self) -> Result<Statement, Error> {
        self.nested(Self::parse_statement_kind)
    }

    fn parse_statement_kind(&mut self) -> Result<Statement, Error> {
        match &self.current.kind {
            TokenKind::Const | TokenKind::Let => Ok(Statement::VariableDeclaration(Rc::new(
                self.parse_variable_declaration()?,
            ))),
            TokenKind::Var => Err(self.error("Variable declaration using \"var\" is not allowed")),
            TokenKind::Function => self.parse_function_declaration(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::LBrace => Ok(Statement::Block(Rc::new(self.parse_block_statement()?))),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Break => {
                let span = self.current.span;
                self.advance();
                self.expect_semicolon()?;
                Ok(Statement::Break(span))
            }
            TokenKind::Continue => {
                let span = self.current.span;
                self.advance();
                self.expect_semicolon()?;
                Ok(Statement::Continue(span))
            }
            TokenKind::Throw => self.parse_throw_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Class => self.skip_unsupported_statement("class declaration"),
            TokenKind::Switch => self.skip_unsupported_statement("switch statement"),
            TokenKind::Import => self.skip_unsupported_statement("import declaration"),
            TokenKind::Export => self.skip_unsupported_statement("export declaration"),
            TokenKind::Debugger => self.skip_unsupported_statement("debugger statement"),
            _ => self.parse_expression_statement(),
        }
    }

    /// `const x = e;` or `let x = e;`. One declarator, initializer required.
    fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, Error> {
        let start = self.current.span;
        let kind = if self.match_token(&TokenKind::Const) {
            VariableKind::Const
        } else {
            self.require_token(&TokenKind::Let)?;
            VariableKind::Let
        };

        let id = self.parse_identifier()?;
        if !self.match_token(&TokenKind::Eq) {
            let keyword = match kind {
                VariableKind::Const => "const",
                VariableKind::Let => "let",
            };
            return Err(self.error(&format!("Missing initializer in {keyword} declaration")));
        }
        let init = self.parse_assignment_expression()?;
        if self.check(&TokenKind::Comma) {
            return Err(self.error("Only one variable may be declared per statement"));
        }
        self.expect_semicolon()?;

        Ok(VariableDeclaration {
            kind,
            id,
            init,
            span: self.span_from(start),
        })
    }

    fn parse_function_declaration(&mut self) -> Result<Statement, Error> {
        let start = self.current.span;
        self.require_token(&TokenKind::Function)?;
        if !self.check_identifier() {
            return Err(self.error("Function declarations require a name"));
        }
        let id = Some(self.parse_identifier()?);
        let function = self.parse_function_rest(id, start)?;
        Ok(Statement::FunctionDeclaration(Rc::new(function)))
    }

    /// Parameters and body of a `function` declaration or expression.
    fn parse_function_rest(&mut self, id: Option<Identifier>, start: Span) -> Result<Function, Error> {
        self.require_token(&TokenKind::LParen)?;
        let params = self.parse_params()?;
        let body = self.parse_block_statement()?;
        Ok(Function {
            id,
            params: params.into(),
            body: Rc::new(body),
            is_arrow: false,
            span: self.span_from(start),
        })
    }

    /// Parameter list after `(`, through the closing `)`.
    fn parse_params(&mut self) -> Result<Vec<FunctionParam>, Error> {
        let mut params: Vec<FunctionParam> = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let is_rest = self.match_token(&TokenKind::DotDotDot);
            let name = self.parse_identifier()?;
            if params.iter().any(|p| p.name.name == name.name) {
                return Err(Error::syntax_error(
                    format!("Duplicate parameter name \"{}\"", name.name),
                    name.span.line,
                    name.span.column,
                ));
            }
            params.push(FunctionParam { name, is_rest });
            if is_rest {
                break;
            }
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.require_token(&TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_block_statement(&mut self) -> Result<BlockStatement, Error> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;
        let body = self.parse_statement_list(|p| p.check(&TokenKind::RBrace))?;
        self.require_token(&TokenKind::RBrace)?;
        Ok(BlockStatement {
            body: body.into(),
            span: self.span_from(start),
        })
    }

    fn parse_if_statement(&mut self) -> Result<Statement, Error> {
        let start = self.current.span;
        self.require_token(&TokenKind::If)?;
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;

        let consequent = self.parse_statement()?;
        let alternate = if self.match_token(&TokenKind::Else) {
            Some(self.parse_statement()?)
        } else {
            None
        };

        Ok(Statement::If(Rc::new(IfStatement {
            test,
            consequent,
            alternate,
            span: self.span_from(start),
        })))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, Error> {
        let start = self.current.span;
        self.require_token(&TokenKind::Return)?;

        let argument = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.is_at_end()
            || self.lexer.had_newline_before()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon()?;

        Ok(Statement::Return(Rc::new(ReturnStatement {
            argument,
            span: self.span_from(start),
        })))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, Error> {
        let start = self.current.span;
        self.require_token(&TokenKind::While)?;
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        let body = self.parse_statement()?;
        Ok(Statement::While(Rc::new(WhileStatement {
            test,
            body,
            span: self.span_from(start),
        })))
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, Error> {
        let start = self.current.span;
        self.require_token(&TokenKind::Do)?;
        let body = self.parse_statement()?;
        self.require_token(&TokenKind::While)?;
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        self.match_token(&TokenKind::Semicolon);
        Ok(Statement::DoWhile(Rc::new(WhileStatement {
            test,
            body,
            span: self.span_from(start),
        })))
    }

    fn parse_for_statement(&mut self) -> Result<Statement, Error> {
        let start = self.current.span;
        self.require_token(&TokenKind::For)?;
        self.require_token(&TokenKind::LParen)?;

        let init = match &self.current.kind {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::Const | TokenKind::Let => {
                // `for (const x of xs)` has no initializer; report the loop as a whole
                if self.is_for_in_of_head() {
                    self.skip_balanced_parens()?;
                    self.parse_statement()?;
                    return Ok(Statement::Unsupported(UnsupportedStatement {
                        kind: "for-of loop",
                        span: self.span_from(start),
                    }));
                }
                Some(Statement::VariableDeclaration(Rc::new(
                    self.parse_variable_declaration()?,
                )))
            }
            _ => {
                let expr_start = self.current.span;
                let expression = self.parse_expression()?;
                self.require_token(&TokenKind::Semicolon)?;
                Some(Statement::Expression(Rc::new(ExpressionStatement {
                    expression,
                    span: self.span_from(expr_start),
                })))
            }
        };

        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.require_token(&TokenKind::Semicolon)?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.require_token(&TokenKind::RParen)?;

        let body = self.parse_statement()?;
        Ok(Statement::For(Rc::new(ForStatement {
            init,
            test,
            update,
            body,
            span: self.span_from(start),
        })))
    }

    /// At `let`/`const` inside a `for (`: is this `let x of ...` / `let x in ...`?
    fn is_for_in_of_head(&mut self) -> bool {
        let checkpoint = self.lexer.checkpoint();
        let name = self.lexer.next_token();
        let next = self.lexer.next_token();
        self.lexer.restore(checkpoint);
        matches!(name.kind, TokenKind::Identifier(_))
            && matches!(&next.kind, TokenKind::Identifier(s) if s == "of" || s == "in")
    }

    fn parse_throw_statement(&mut self) -> Result<Statement, Error> {
        let start = self.current.span;
        self.require_token(&TokenKind::Throw)?;
        let argument = self.parse_expression()?;
        self.expect_semicolon()?;
        Ok(Statement::Throw(Rc::new(ThrowStatement {
            argument,
            span: self.span_from(start),
        })))
    }

    fn parse_try_statement(&mut self) -> Result<Statement, Error> {
        let start = self.current.span;
        self.require_token(&TokenKind::Try)?;
        let block = Rc::new(self.parse_block_statement()?);

        let mut param = None;
        let handler = if self.match_token(&TokenKind::Catch) {
            if self.match_token(&TokenKind::LParen) {
                param = Some(self.parse_identifier()?);
                self.require_token(&TokenKind::RParen)?;
            }
            Some(Rc::new(self.parse_block_statement()?))
        } else {
            None
        };
        let finalizer = if self.match_token(&TokenKind::Finally) {
            Some(Rc::new(self.parse_block_statement()?))
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.error("Missing catch or finally after try"));
        }

        Ok(Statement::Try(Rc::new(TryStatement {
            block,
            param,
            handler,
            finalizer,
            span: self.span_from(start),
        })))
    }

    /// Skip a statement the parser does not model, up to its terminating `;`
    /// or the `}` closing its body.
    fn skip_unsupported_statement(&mut self, kind: &'static str) -> Result<Statement, Error> {
        let start = self.current.span;
        self.advance();
        let mut depth = 0usize;
        loop {
            match &self.current.kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    break;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        break;
                    }
                }
                _ => {}
            }
            self.advance();
        }
        Ok(Statement::Unsupported(UnsupportedStatement {
            kind,
            span: self.span_from(start),
        }))
    }

    /// Consume a parenthesized group, starting inside its `(`.
    fn skip_balanced_parens(&mut self) -> Result<(), Error> {
        let mut depth = 1usize;
        while depth > 0 {
            match &self.current.kind {
                TokenKind::Eof => return Err(self.unexpected_token("')'")),
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            self.advance();
        }
        Ok(())
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, Error> {
        let start = self.current.span;
        let expression = self.parse_expression()?;
        self.expect_semicolon()?;
        Ok(Statement::Expression(Rc::new(ExpressionStatement {
            expression,
            span: self.span_from(start),
        })))
    }

    // ============ EXPRESSIONS ============

    /// Sequence expressions are not part of the language; this is a single
    /// assignment expression.
    fn parse_expression(&mut self) -> Result<Expression, Error> {
        self.parse_assignment_expression()
    }

    fn parse_assignment_expression(&mut self) -> Result<Expression, Error> {
        self.nested(Self::parse_assignment)
    }

    fn parse_assignment(&mut self) -> Result<Expression, Error> {
        let start = self.current.span;
        let expr = self.parse_conditional_expression()?;

        if let Some(operator) = self.current_assignment_op() {
            let target = match expr {
                Expression::Identifier(id) => AssignmentTarget::Identifier(id),
                Expression::Member(member) => AssignmentTarget::Member(member),
                _ => return Err(self.error("Invalid assignment target")),
            };
            self.advance();
            let value = self.parse_assignment_expression()?;
            return Ok(Expression::Assignment(Rc::new(AssignmentExpression {
                operator,
                target,
                value,
                span: self.span_from(start),
            })));
        }

        Ok(expr)
    }

    fn parse_conditional_expression(&mut self) -> Result<Expression, Error> {
        let start = self.current.span;
        let test = self.parse_binary_expression(0)?;

        if self.match_token(&TokenKind::Question) {
            let consequent = self.parse_assignment_expression()?;
            self.require_token(&TokenKind::Colon)?;
            let alternate = self.parse_assignment_expression()?;
            return Ok(Expression::Conditional(Rc::new(ConditionalExpression {
                test,
                consequent,
                alternate,
                span: self.span_from(start),
            })));
        }

        Ok(test)
    }

    /// Pratt parser for binary and logical operators
    fn parse_binary_expression(&mut self, min_prec: u8) -> Result<Expression, Error> {
        let start = self.current.span;
        let mut left = self.parse_unary_expression()?;

        while let Some((op, prec)) = self.current_binary_op() {
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary_expression(prec + 1)?;
            let span = self.span_from(start);

            left = match op {
                Operator::Binary(operator) => Expression::Binary(Rc::new(BinaryExpression {
                    operator,
                    left,
                    right,
                    span,
                })),
                Operator::Logical(operator) => Expression::Logical(Rc::new(LogicalExpression {
                    operator,
                    left,
                    right,
                    span,
                })),
            };
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression, Error> {
        self.nested(Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<Expression, Error> {
        let start = self.current.span;

        if let Some(operator) = self.current_unary_op() {
            self.advance();
            let argument = self.parse_unary_expression()?;
            return Ok(Expression::Unary(Rc::new(UnaryExpression {
                operator,
                argument,
                span: self.span_from(start),
            })));
        }

        // Prefix update
        if let Some(increment) = self.current_update_op() {
            self.advance();
            let argument = self.parse_unary_expression()?;
            return Ok(Expression::Update(Rc::new(UpdateExpression {
                increment,
                prefix: true,
                argument,
                span: self.span_from(start),
            })));
        }

        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Result<Expression, Error> {
        let start = self.current.span;
        let expr = self.parse_call_expression()?;

        if !self.lexer.had_newline_before() {
            if let Some(increment) = self.current_update_op() {
                self.advance();
                return Ok(Expression::Update(Rc::new(UpdateExpression {
                    increment,
                    prefix: false,
                    argument: expr,
                    span: self.span_from(start),
                })));
            }
        }

        Ok(expr)
    }

    fn parse_call_expression(&mut self) -> Result<Expression, Error> {
        let start = self.current.span;

        let mut expr = if self.match_token(&TokenKind::New) {
            let callee = self.parse_primary_expression()?;
            let arguments = if self.match_token(&TokenKind::LParen) {
                self.parse_arguments()?
            } else {
                Vec::new()
            };
            Expression::New(Rc::new(CallExpression {
                callee,
                arguments: arguments.into(),
                span: self.span_from(start),
            }))
        } else {
            self.parse_primary_expression()?
        };

        loop {
            if self.match_token(&TokenKind::LParen) {
                let arguments = self.parse_arguments()?;
                expr = Expression::Call(Rc::new(CallExpression {
                    callee: expr,
                    arguments: arguments.into(),
                    span: self.span_from(start),
                }));
            } else if self.match_token(&TokenKind::Dot) {
                let property = self.parse_identifier_name()?;
                expr = Expression::Member(Rc::new(MemberExpression {
                    object: expr,
                    property: MemberProperty::Identifier(property),
                    span: self.span_from(start),
                }));
            } else if self.match_token(&TokenKind::LBracket) {
                let property = self.parse_expression()?;
                self.require_token(&TokenKind::RBracket)?;
                expr = Expression::Member(Rc::new(MemberExpression {
                    object: expr,
                    property: MemberProperty::Computed(property),
                    span: self.span_from(start),
                }));
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Arguments after `(`, through the closing `)`.
    fn parse_arguments(&mut self) -> Result<Vec<Expression>, Error> {
        let mut arguments = Vec::new();
        while !self.check(&TokenKind::RParen) {
            arguments.push(self.parse_assignment_expression()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.require_token(&TokenKind::RParen)?;
        Ok(arguments)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, Error> {
        let start = self.current.span;

        let literal = |value| Expression::Literal(Literal { value, span: start });
        match self.current.kind.clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(literal(LiteralValue::Number(n)))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(literal(LiteralValue::String(s)))
            }
            TokenKind::True => {
                self.advance();
                Ok(literal(LiteralValue::Boolean(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(literal(LiteralValue::Boolean(false)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(literal(LiteralValue::Null))
            }
            TokenKind::Template(s) => {
                self.advance();
                Ok(Expression::Template(Literal {
                    value: LiteralValue::String(s),
                    span: start,
                }))
            }
            TokenKind::This => {
                self.advance();
                Ok(Expression::This(start))
            }
            TokenKind::Identifier(_) => {
                let id = self.parse_identifier()?;
                // x => ...
                if self.check(&TokenKind::Arrow) && !self.lexer.had_newline_before() {
                    let params = vec![FunctionParam {
                        name: id,
                        is_rest: false,
                    }];
                    return self.parse_arrow_body(params, start);
                }
                Ok(Expression::Identifier(id))
            }
            TokenKind::Function => {
                self.advance();
                let id = if self.check_identifier() {
                    Some(self.parse_identifier()?)
                } else {
                    None
                };
                let function = self.parse_function_rest(id, start)?;
                Ok(Expression::Function(Rc::new(function)))
            }
            TokenKind::LParen => self.parse_parenthesized_or_arrow(),
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::Invalid(c) if c == '"' || c == '\'' => Err(self.error("Unterminated string literal")),
            _ => Err(self.unexpected_token("expression")),
        }
    }

    fn parse_parenthesized_or_arrow(&mut self) -> Result<Expression, Error> {
        let start = self.current.span;

        // Save state for potential rollback
        let lexer_checkpoint = self.lexer.checkpoint();
        let saved_current = self.current.clone();
        let saved_previous = self.previous.clone();

        self.require_token(&TokenKind::LParen)?;
        if let Ok(params) = self.parse_params() {
            if self.check(&TokenKind::Arrow) {
                return self.parse_arrow_body(params, start);
            }
        }

        // Not an arrow function: rollback and re-parse as an expression
        self.lexer.restore(lexer_checkpoint);
        self.current = saved_current;
        self.previous = saved_previous;

        self.require_token(&TokenKind::LParen)?;
        let expr = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        Ok(expr)
    }

    /// Everything after the parameters of an arrow function. An expression
    /// body becomes a block holding a single `return`.
    fn parse_arrow_body(&mut self, params: Vec<FunctionParam>, start: Span) -> Result<Expression, Error> {
        self.require_token(&TokenKind::Arrow)?;

        let body = if self.check(&TokenKind::LBrace) {
            self.parse_block_statement()?
        } else {
            let body_start = self.current.span;
            let argument = self.parse_assignment_expression()?;
            let span = self.span_from(body_start);
            BlockStatement {
                body: Rc::from(vec![Statement::Return(Rc::new(ReturnStatement {
                    argument: Some(argument),
                    span,
                }))]),
                span,
            }
        };

        Ok(Expression::Function(Rc::new(Function {
            id: None,
            params: params.into(),
            body: Rc::new(body),
            is_arrow: true,
            span: self.span_from(start),
        })))
    }

    fn parse_array_literal(&mut self) -> Result<Expression, Error> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBracket)?;
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            elements.push(self.parse_assignment_expression()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.require_token(&TokenKind::RBracket)?;
        Ok(Expression::Array(Rc::new(ArrayExpression {
            elements,
            span: self.span_from(start),
        })))
    }

    fn parse_object_literal(&mut self) -> Result<Expression, Error> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;
        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let key_span = self.current.span;
            let key = match self.current.kind.clone() {
                TokenKind::String(s) => {
                    self.advance();
                    s
                }
                TokenKind::Number(n) => {
                    self.advance();
                    SourceString::from(n.to_string())
                }
                _ => self.parse_identifier_name()?.name,
            };
            let value = if self.match_token(&TokenKind::Colon) {
                self.parse_assignment_expression()?
            } else {
                // shorthand `{ x }`
                Expression::Identifier(Identifier {
                    name: key.clone(),
                    span: key_span,
                })
            };
            properties.push((key, value));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.require_token(&TokenKind::RBrace)?;
        Ok(Expression::Object(Rc::new(ObjectExpression {
            properties,
            span: self.span_from(start),
        })))
    }

    fn parse_identifier(&mut self) -> Result<Identifier, Error> {
        match self.current.kind.clone() {
            TokenKind::Identifier(name) => {
                let span = self.current.span;
                self.advance();
                Ok(Identifier { name, span })
            }
            _ => Err(self.unexpected_token("identifier")),
        }
    }

    /// Identifier after `.` or as an object key; keywords are allowed.
    fn parse_identifier_name(&mut self) -> Result<Identifier, Error> {
        if self.check_identifier() {
            return self.parse_identifier();
        }
        let name = keyword_text(&self.current.kind).ok_or_else(|| self.unexpected_token("property name"))?;
        let span = self.current.span;
        self.advance();
        Ok(Identifier {
            name: SourceString::from(name),
            span,
        })
    }

    // ============ TOKEN HELPERS ============

    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
    }

    fn require_token(&mut self, kind: &TokenKind) -> Result<(), Error> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected_token(&format!("{:?}", kind)))
        }
    }

    fn expect_semicolon(&mut self) -> Result<(), Error> {
        if self.match_token(&TokenKind::Semicolon) {
            return Ok(());
        }

        // ASI: accept if at end, before }, or after newline
        if self.is_at_end() || self.check(&TokenKind::RBrace) || self.lexer.had_newline_before() {
            return Ok(());
        }

        Err(self.unexpected_token("';'"))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn check_identifier(&self) -> bool {
        matches!(self.current.kind, TokenKind::Identifier(_))
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    fn span_from(&self, start: Span) -> Span {
        Span::new(
            start.start,
            self.previous.span.end.max(start.start),
            start.line,
            start.column,
        )
    }

    /// Run `parse` one nesting level deeper. The level is released whether or
    /// not it succeeds, so arrow-function rollback stays balanced.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, Error>) -> Result<T, Error> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error("Maximum nesting depth exceeded"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn error(&self, message: &str) -> Error {
        Error::syntax_error(message, self.current.span.line, self.current.span.column)
    }

    fn unexpected_token(&self, expected: &str) -> Error {
        Error::syntax_error(
            format!("Unexpected {:?}, expected {}", self.current.kind, expected),
            self.current.span.line,
            self.current.span.column,
        )
    }

    /// Returns (operator, precedence)
    fn current_binary_op(&self) -> Option<(Operator, u8)> {
        let op = match &self.current.kind {
            TokenKind::QuestionQuestion => (Operator::Logical(LogicalOp::NullishCoalescing), 1),
            TokenKind::PipePipe => (Operator::Logical(LogicalOp::Or), 2),
            TokenKind::AmpAmp => (Operator::Logical(LogicalOp::And), 3),
            TokenKind::EqEq => (Operator::Binary(BinaryOp::Eq), 4),
            TokenKind::BangEq => (Operator::Binary(BinaryOp::NotEq), 4),
            TokenKind::EqEqEq => (Operator::Binary(BinaryOp::StrictEq), 4),
            TokenKind::BangEqEq => (Operator::Binary(BinaryOp::StrictNotEq), 4),
            TokenKind::Lt => (Operator::Binary(BinaryOp::Lt), 5),
            TokenKind::LtEq => (Operator::Binary(BinaryOp::LtEq), 5),
            TokenKind::Gt => (Operator::Binary(BinaryOp::Gt), 5),
            TokenKind::GtEq => (Operator::Binary(BinaryOp::GtEq), 5),
            TokenKind::Plus => (Operator::Binary(BinaryOp::Add), 6),
            TokenKind::Minus => (Operator::Binary(BinaryOp::Sub), 6),
            TokenKind::Star => (Operator::Binary(BinaryOp::Mul), 7),
            TokenKind::Slash => (Operator::Binary(BinaryOp::Div), 7),
            TokenKind::Percent => (Operator::Binary(BinaryOp::Mod), 7),
            _ => return None,
        };
        Some(op)
    }

    fn current_unary_op(&self) -> Option<UnaryOp> {
        match &self.current.kind {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            _ => None,
        }
    }

    /// `Some(true)` for `++`, `Some(false)` for `--`
    fn current_update_op(&self) -> Option<bool> {
        match &self.current.kind {
            TokenKind::PlusPlus => Some(true),
            TokenKind::MinusMinus => Some(false),
            _ => None,
        }
    }

    fn current_assignment_op(&self) -> Option<AssignmentOp> {
        match &self.current.kind {
            TokenKind::Eq => Some(AssignmentOp::Assign),
            TokenKind::PlusEq => Some(AssignmentOp::AddAssign),
            TokenKind::MinusEq => Some(AssignmentOp::SubAssign),
            TokenKind::StarEq => Some(AssignmentOp::MulAssign),
            TokenKind::SlashEq => Some(AssignmentOp::DivAssign),
            TokenKind::PercentEq => Some(AssignmentOp::ModAssign),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
enum Operator {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

fn keyword_text(kind: &TokenKind) -> Option<&'static str> {
    Some(match kind {
        TokenKind::True => "true",
        TokenKind::False => "false",
        TokenKind::Null => "null",
        TokenKind::Let => "let",
        TokenKind::Const => "const",
        TokenKind::Var => "var",
        TokenKind::Function => "function",
        TokenKind::Return => "return",
        TokenKind::If => "if",
        TokenKind::Else => "else",
        TokenKind::For => "for",
        TokenKind::While => "while",
        TokenKind::Do => "do",
        TokenKind::Break => "break",
        TokenKind::Continue => "continue",
        TokenKind::Try => "try",
        TokenKind::Catch => "catch",
        TokenKind::Finally => "finally",
        TokenKind::Throw => "throw",
        TokenKind::New => "new",
        TokenKind::This => "this",
        TokenKind::Class => "class",
        TokenKind::Switch => "switch",
        TokenKind::Import => "import",
        TokenKind::Export => "export",
        TokenKind::Typeof => "typeof",
        TokenKind::Debugger => "debugger",
        _ => return None,
    })
}
