//! The push-style SQL parser.
//!
//! [`Parser`] couples the generic automaton from the `pushdown` crate with
//! this crate's grammar tables and reduction actions. The caller (normally
//! a scanner) feeds one [`Token`] at a time and calls
//! [`finish`](Parser::finish) at end of input; everything the parse builds
//! or diagnoses lands in the borrowed [`SemanticBuilder`].
//!
//! One parser instance handles one token stream, which may contain any
//! number of `;`-separated statements. The first syntax error ends the
//! parse; feeding more tokens afterwards is a no-op.

use crate::builder::SemanticBuilder;
use crate::reduce;
use crate::tables::{Rule, TABLES};
use crate::token::Token;
use crate::value::SemanticValue;
use pushdown::{
    Automaton, EngineStats, ParseError, ReduceDriver, Span, Status, TraceSink,
    DEFAULT_STACK_DEPTH,
};
use std::marker::PhantomData;

/// Grammar driver bridging the automaton to the SQL reduction actions.
///
/// Stateless apart from bookkeeping the reductions need: the span of the
/// most recently fed token and the first failure's detail.
pub struct SqlDriver<B> {
    last_span: Span,
    failure: Option<ParseError>,
    _marker: PhantomData<fn(B)>,
}

impl<B> Default for SqlDriver<B> {
    fn default() -> Self {
        Self {
            last_span: Span::default(),
            failure: None,
            _marker: PhantomData,
        }
    }
}

impl<B: SemanticBuilder> ReduceDriver for SqlDriver<B> {
    type Value = SemanticValue;
    type Context = B;

    fn reduce(&mut self, ctx: &mut B, rule: u16, rhs: Vec<SemanticValue>) -> SemanticValue {
        reduce::apply(Rule::from_index(rule), rhs, ctx, self.last_span)
    }

    fn syntax_error(&mut self, ctx: &mut B, _terminal: u16, value: &SemanticValue) {
        let (near, span) = match value {
            SemanticValue::Token(t) => (t.text.to_string(), t.span),
            _ => (String::new(), Span::default()),
        };
        ctx.report_error(format!("near \"{near}\": syntax error"), Some(span));
        if self.failure.is_none() {
            self.failure = Some(ParseError::Syntax { near, span });
        }
    }

    fn stack_overflow(&mut self, ctx: &mut B) {
        ctx.report_error("parser stack overflow".to_owned(), None);
        if self.failure.is_none() {
            self.failure = Some(ParseError::StackOverflow);
        }
    }
}

/// A push-style SQL parser borrowing its semantic builder for the duration
/// of one parse.
///
/// Dropping the parser mid-stream releases every semantic value still on
/// the stack, exactly as error teardown does.
pub struct Parser<'b, B: SemanticBuilder> {
    engine: Automaton<SqlDriver<B>>,
    builder: &'b mut B,
}

impl<'b, B: SemanticBuilder> Parser<'b, B> {
    /// Creates a parser over `builder`.
    pub fn new(builder: &'b mut B) -> Self {
        Self {
            engine: Automaton::new(&TABLES, SqlDriver::default(), DEFAULT_STACK_DEPTH),
            builder,
        }
    }

    /// Like [`new`](Self::new), with a diagnostic trace sink attached.
    pub fn with_trace(builder: &'b mut B, sink: Box<dyn TraceSink>) -> Self {
        Self {
            engine: Automaton::new(&TABLES, SqlDriver::default(), DEFAULT_STACK_DEPTH)
                .with_trace(sink),
            builder,
        }
    }

    /// Feeds one token. A no-op once the parse has accepted or failed.
    pub fn feed(&mut self, token: Token) {
        let code = token.kind.code();
        self.engine.driver_mut().last_span = token.span;
        self.engine
            .feed(self.builder, code, SemanticValue::Token(token));
    }

    /// Drives end-of-input processing and reports the outcome.
    ///
    /// `Ok(())` means the automaton accepted and the builder recorded no
    /// diagnostics; the builder's own state holds whatever the statements
    /// produced.
    pub fn finish(mut self) -> Result<(), ParseError> {
        if self.engine.status() == Status::Running {
            let end = self.engine.driver().last_span.end;
            self.feed(Token::eof(end));
        }
        match self.engine.status() {
            Status::Accepted => {
                if self.builder.has_errors() {
                    Err(ParseError::Semantic {
                        count: self.builder.error_count(),
                    })
                } else {
                    Ok(())
                }
            }
            Status::Failed => {
                let failure = self.engine.driver_mut().failure.take();
                Err(failure.unwrap_or(ParseError::Incomplete))
            }
            Status::Running => Err(ParseError::Incomplete),
        }
    }

    /// Current automaton status.
    pub fn status(&self) -> Status {
        self.engine.status()
    }

    /// Shift/reduce counters for the parse so far.
    pub fn stats(&self) -> &EngineStats {
        self.engine.stats()
    }
}

/// Feeds a whole token sequence and finishes the parse.
pub fn parse<B: SemanticBuilder>(
    builder: &mut B,
    tokens: impl IntoIterator<Item = Token>,
) -> Result<(), ParseError> {
    let mut parser = Parser::new(builder);
    for token in tokens {
        parser.feed(token);
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::{parse, Parser};
    use crate::ast::{CompoundOp, Expr, ExprOp, ResolveType};
    use crate::builder::{AstSink, DmlStatement, SemanticBuilder};
    use crate::token::{Token, TokenType};
    use pushdown::{ParseError, Span, Status};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Lays tokens out one space apart so spans are predictable.
    fn toks(items: &[(TokenType, &str)]) -> Vec<Token> {
        let mut out = Vec::new();
        let mut pos = 0;
        for &(kind, text) in items {
            let start = pos;
            pos += text.len();
            out.push(Token::new(kind, text, Span::new(start, pos)));
            pos += 1;
        }
        out
    }

    fn first_select(sink: &AstSink) -> &crate::ast::Select {
        match sink.statements.first().expect("no statement collected") {
            DmlStatement::Select(s) => s,
            other => panic!("expected a select, got {other:?}"),
        }
    }

    fn first_column_expr(sink: &AstSink) -> &Expr {
        first_select(sink).columns[0]
            .expr
            .as_deref()
            .expect("result column has no expression")
    }

    use TokenType as T;

    #[test]
    fn select_one_drives_to_accept() {
        init_logger();
        let mut sink = AstSink::default();
        let r = parse(
            &mut sink,
            toks(&[(T::Select, "SELECT"), (T::Integer, "1"), (T::Semi, ";")]),
        );
        assert_eq!(r, Ok(()));
        assert_eq!(sink.statements.len(), 1);
        let e = first_column_expr(&sink);
        assert_eq!(e.op, ExprOp::Integer);
        assert_eq!(e.token.as_deref(), Some("1"));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        init_logger();
        let mut sink = AstSink::default();
        parse(
            &mut sink,
            toks(&[
                (T::Select, "SELECT"),
                (T::Id, "a"),
                (T::Plus, "+"),
                (T::Id, "b"),
                (T::Star, "*"),
                (T::Id, "c"),
                (T::Semi, ";"),
            ]),
        )
        .unwrap();
        let add = first_column_expr(&sink);
        assert_eq!(add.op, ExprOp::Add);
        assert_eq!(add.left.as_ref().unwrap().op, ExprOp::Id);
        let mul = add.right.as_ref().unwrap();
        assert_eq!(mul.op, ExprOp::Multiply);
        assert_eq!(mul.left.as_ref().unwrap().token.as_deref(), Some("b"));
        assert_eq!(mul.right.as_ref().unwrap().token.as_deref(), Some("c"));
    }

    #[test]
    fn subtraction_is_left_associative() {
        init_logger();
        let mut sink = AstSink::default();
        parse(
            &mut sink,
            toks(&[
                (T::Select, "SELECT"),
                (T::Id, "a"),
                (T::Minus, "-"),
                (T::Id, "b"),
                (T::Minus, "-"),
                (T::Id, "c"),
                (T::Semi, ";"),
            ]),
        )
        .unwrap();
        let outer = first_column_expr(&sink);
        assert_eq!(outer.op, ExprOp::Subtract);
        let inner = outer.left.as_ref().unwrap();
        assert_eq!(inner.op, ExprOp::Subtract);
        assert_eq!(inner.left.as_ref().unwrap().token.as_deref(), Some("a"));
        assert_eq!(inner.right.as_ref().unwrap().token.as_deref(), Some("b"));
        assert_eq!(outer.right.as_ref().unwrap().token.as_deref(), Some("c"));
    }

    #[test]
    fn is_null_folds_to_a_unary_null_test() {
        init_logger();
        let mut sink = AstSink::default();
        parse(
            &mut sink,
            toks(&[
                (T::Select, "SELECT"),
                (T::Id, "a"),
                (T::Is, "IS"),
                (T::Null, "NULL"),
                (T::Semi, ";"),
            ]),
        )
        .unwrap();
        let e = first_column_expr(&sink);
        assert_eq!(e.op, ExprOp::IsNull);
        assert_eq!(e.left.as_ref().unwrap().op, ExprOp::Id);
        assert!(e.right.is_none());
    }

    #[test]
    fn is_not_null_folds_to_a_not_null_test() {
        init_logger();
        let mut sink = AstSink::default();
        parse(
            &mut sink,
            toks(&[
                (T::Select, "SELECT"),
                (T::Id, "a"),
                (T::Is, "IS"),
                (T::Not, "NOT"),
                (T::Null, "NULL"),
                (T::Semi, ";"),
            ]),
        )
        .unwrap();
        let e = first_column_expr(&sink);
        assert_eq!(e.op, ExprOp::NotNull);
        assert!(e.right.is_none());
    }

    #[test]
    fn is_against_a_non_null_operand_stays_binary() {
        init_logger();
        let mut sink = AstSink::default();
        parse(
            &mut sink,
            toks(&[
                (T::Select, "SELECT"),
                (T::Id, "a"),
                (T::Is, "IS"),
                (T::Id, "b"),
                (T::Semi, ";"),
            ]),
        )
        .unwrap();
        let e = first_column_expr(&sink);
        assert_eq!(e.op, ExprOp::Is);
        assert_eq!(e.right.as_ref().unwrap().token.as_deref(), Some("b"));
    }

    #[test]
    fn expression_spans_cover_their_source_text() {
        init_logger();
        let mut sink = AstSink::default();
        // Offsets: SELECT=0..6  a=7..8  +=9..10  b=11..12  ;=13..14
        parse(
            &mut sink,
            toks(&[
                (T::Select, "SELECT"),
                (T::Id, "a"),
                (T::Plus, "+"),
                (T::Id, "b"),
                (T::Semi, ";"),
            ]),
        )
        .unwrap();
        let select = first_select(&sink);
        assert_eq!(select.columns[0].span, Some(Span::new(7, 12)));
        let add = first_column_expr(&sink);
        assert_eq!(add.span, Span::new(7, 12));
        assert_eq!(add.left.as_ref().unwrap().span, Span::new(7, 8));
    }

    #[test]
    fn syntax_error_reports_the_offending_token_and_fails() {
        init_logger();
        let mut sink = AstSink::default();
        let mut parser = Parser::new(&mut sink);
        for t in toks(&[
            (T::Select, "SELECT"),
            (T::Select, "SELECT"),
            (T::Semi, ";"),
        ]) {
            parser.feed(t);
        }
        assert_eq!(parser.status(), Status::Failed);
        let err = parser.finish().unwrap_err();
        assert_eq!(
            err,
            ParseError::Syntax {
                near: "SELECT".to_owned(),
                span: Span::new(7, 13),
            }
        );
        assert_eq!(sink.errors.len(), 1);
        assert_eq!(sink.errors[0].0, "near \"SELECT\": syntax error");
        assert!(sink.statements.is_empty());
    }

    #[test]
    fn statements_after_the_first_semicolon_also_parse() {
        init_logger();
        let mut sink = AstSink::default();
        parse(
            &mut sink,
            toks(&[
                (T::Select, "SELECT"),
                (T::Integer, "1"),
                (T::Semi, ";"),
                (T::Select, "SELECT"),
                (T::Integer, "2"),
                (T::Semi, ";"),
            ]),
        )
        .unwrap();
        assert_eq!(sink.statements.len(), 2);
    }

    #[test]
    fn non_reserved_keywords_fall_back_to_identifiers() {
        init_logger();
        let mut sink = AstSink::default();
        parse(
            &mut sink,
            toks(&[(T::Select, "SELECT"), (T::Explain, "explain"), (T::Semi, ";")]),
        )
        .unwrap();
        let e = first_column_expr(&sink);
        assert_eq!(e.op, ExprOp::Id);
        assert_eq!(e.token.as_deref(), Some("explain"));
    }

    #[test]
    fn insert_with_values_reaches_the_builder() {
        init_logger();
        let mut sink = AstSink::default();
        parse(
            &mut sink,
            toks(&[
                (T::Insert, "INSERT"),
                (T::Into, "INTO"),
                (T::Id, "t"),
                (T::Values, "VALUES"),
                (T::Lp, "("),
                (T::Integer, "1"),
                (T::Rp, ")"),
                (T::Semi, ";"),
            ]),
        )
        .unwrap();
        match &sink.statements[0] {
            DmlStatement::Insert {
                target,
                columns,
                values,
                select,
                or_conflict,
            } => {
                assert_eq!(target[0].name.as_deref(), Some("t"));
                assert!(columns.is_none());
                assert_eq!(values.as_ref().unwrap().len(), 1);
                assert!(select.is_none());
                assert_eq!(*or_conflict, ResolveType::Default);
            }
            other => panic!("expected an insert, got {other:?}"),
        }
    }

    #[test]
    fn select_with_from_and_where_builds_the_full_shape() {
        init_logger();
        let mut sink = AstSink::default();
        parse(
            &mut sink,
            toks(&[
                (T::Select, "SELECT"),
                (T::Id, "a"),
                (T::From, "FROM"),
                (T::Id, "t"),
                (T::Where, "WHERE"),
                (T::Id, "a"),
                (T::Gt, ">"),
                (T::Integer, "1"),
                (T::Semi, ";"),
            ]),
        )
        .unwrap();
        let select = first_select(&sink);
        let from = select.from.as_ref().unwrap();
        assert_eq!(from[0].name.as_deref(), Some("t"));
        let cond = select.where_clause.as_deref().unwrap();
        assert_eq!(cond.op, ExprOp::Gt);
    }

    #[test]
    fn compound_select_links_through_prior() {
        init_logger();
        let mut sink = AstSink::default();
        parse(
            &mut sink,
            toks(&[
                (T::Select, "SELECT"),
                (T::Integer, "1"),
                (T::Union, "UNION"),
                (T::Select, "SELECT"),
                (T::Integer, "2"),
                (T::Semi, ";"),
            ]),
        )
        .unwrap();
        let select = first_select(&sink);
        assert_eq!(select.op, CompoundOp::Union);
        let prior = select.prior.as_ref().unwrap();
        assert_eq!(prior.op, CompoundOp::Select);
    }

    /// A builder whose expression allocator always refuses, modeling
    /// resource exhaustion.
    #[derive(Default)]
    struct ExhaustedBuilder {
        sink: AstSink,
    }

    impl SemanticBuilder for ExhaustedBuilder {
        fn report_error(&mut self, message: String, span: Option<Span>) {
            self.sink.report_error(message, span);
        }

        fn error_count(&self) -> usize {
            self.sink.error_count()
        }

        fn expr(&mut self, expr: Expr) -> Option<Box<Expr>> {
            drop(expr);
            self.report_error("out of memory".to_owned(), None);
            None
        }

        fn select_statement(&mut self, select: Box<crate::ast::Select>) {
            self.sink.select_statement(select);
        }
    }

    #[test]
    fn failed_allocation_leaves_a_placeholder_and_marks_the_parse() {
        init_logger();
        let mut builder = ExhaustedBuilder::default();
        let mut parser = Parser::new(&mut builder);
        for t in toks(&[(T::Select, "SELECT"), (T::Integer, "1"), (T::Semi, ";")]) {
            parser.feed(t);
        }
        // The automaton still accepts; the failure surfaces via finish()
        // as a semantic error, not a syntax error.
        let err = parser.finish().unwrap_err();
        assert!(matches!(err, ParseError::Semantic { count } if count > 0));
        let select = match &builder.sink.statements[0] {
            DmlStatement::Select(s) => s,
            other => panic!("expected a select, got {other:?}"),
        };
        assert!(select.columns[0].expr.is_none());
    }

    #[test]
    fn tokens_after_a_failure_are_ignored() {
        init_logger();
        let mut sink = AstSink::default();
        let mut parser = Parser::new(&mut sink);
        for t in toks(&[
            (T::Select, "SELECT"),
            (T::Select, "SELECT"),
            (T::Integer, "1"),
            (T::Semi, ";"),
        ]) {
            parser.feed(t);
        }
        assert_eq!(parser.status(), Status::Failed);
        let finish_res = parser.finish();
        assert_eq!(sink.errors.len(), 1);
        assert!(finish_res.is_err());
    }
}
