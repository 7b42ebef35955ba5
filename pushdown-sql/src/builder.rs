//! The semantic-builder capability the reduction actions call into.
//!
//! The parser core never executes statements or resolves names; everything
//! a finished (or partially built) statement needs done happens behind this
//! trait. Three kinds of service:
//!
//! - **diagnostics** — [`report_error`](SemanticBuilder::report_error) is
//!   the single channel every parse-time error flows through, syntax errors
//!   included;
//! - **node allocation** — [`expr`](SemanticBuilder::expr) allocates
//!   expression nodes and may refuse (resource exhaustion); the requesting
//!   action substitutes a placeholder so the parse continues and later
//!   errors still surface;
//! - **statement hand-off** — one method per statement-level operation
//!   (`select_statement`, `start_table`, `begin_trigger`, ...). The parser
//!   calls these as reductions complete; the finished product lives in the
//!   builder's own state, not in the parser.
//!
//! All hand-off methods default to no-ops so implementations override only
//! what they observe.

use crate::ast::{
    Expr, ExprList, ExplainKind, IdList, ResolveType, SavepointOp, Select, SortOrder, SrcList,
    TransType, TrigEvent, TriggerStep, TriggerTime,
};
use crate::token::Token;
use crate::value::ExprSpan;
use pushdown::Span;

/// Capability through which semantic actions build and hand off the AST.
pub trait SemanticBuilder {
    // --- diagnostics -----------------------------------------------------

    /// Records one diagnostic. Called for syntax errors, stack overflow,
    /// and grammar-level semantic errors alike.
    fn report_error(&mut self, message: String, span: Option<Span>);

    /// Number of diagnostics recorded so far.
    fn error_count(&self) -> usize;

    /// `true` once any diagnostic has been recorded.
    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    // --- expression allocation -------------------------------------------

    /// Allocates one expression node, or `None` when resources are
    /// exhausted. The default implementation never fails.
    fn expr(&mut self, expr: Expr) -> Option<Box<Expr>> {
        Some(Box::new(expr))
    }

    /// Assigns a parameter number to a `Variable` expression.
    fn assign_variable_number(&mut self, _expr: &mut Expr) {}

    /// `true` inside a nested parse, where register references are legal.
    fn is_nested(&self) -> bool {
        false
    }

    // --- statement prologue / epilogue -----------------------------------

    /// A new statement begins, with its EXPLAIN prefix if any.
    fn begin_parse(&mut self, _explain: ExplainKind) {}

    /// The statement's reductions are complete.
    fn finish_coding(&mut self) {}

    // --- transactions ----------------------------------------------------

    fn begin_transaction(&mut self, _ty: TransType) {}
    fn commit_transaction(&mut self) {}
    fn rollback_transaction(&mut self) {}
    fn savepoint(&mut self, _op: SavepointOp, _name: &Token) {}

    // --- CREATE TABLE ----------------------------------------------------

    fn start_table(&mut self, _name: &Token, _db: &Token, _temp: bool, _if_not_exists: bool) {}

    /// Begins a new column definition.
    fn add_column(&mut self, _name: &Token) {}

    /// Declares the current column's type.
    fn add_column_type(&mut self, _ty: &Token) {}

    /// Attaches a DEFAULT value to the current column.
    fn add_default_value(&mut self, _value: ExprSpan) {}

    fn add_not_null(&mut self, _on_conflict: ResolveType) {}

    /// A PRIMARY KEY constraint; `columns` is `None` for the single-column
    /// form attached to the current column.
    fn add_primary_key(
        &mut self,
        _columns: Option<ExprList>,
        _on_conflict: ResolveType,
        _autoincrement: bool,
        _sort_order: SortOrder,
    ) {
    }

    fn add_check_constraint(&mut self, _check: Option<Box<Expr>>) {}

    /// A UNIQUE constraint; `columns` as in
    /// [`add_primary_key`](Self::add_primary_key).
    fn add_unique_constraint(&mut self, _columns: Option<ExprList>, _on_conflict: ResolveType) {}

    fn add_collate_type(&mut self, _name: &Token) {}

    /// A REFERENCES clause; `actions` is the packed ON DELETE / ON UPDATE
    /// action pair.
    fn create_foreign_key(
        &mut self,
        _from_columns: Option<ExprList>,
        _table: &Token,
        _to_columns: Option<ExprList>,
        _actions: i32,
    ) {
    }

    fn defer_foreign_key(&mut self, _deferred: bool) {}

    /// Names the next constraint, or clears the pending name.
    fn constraint_name(&mut self, _name: Option<&Token>) {}

    /// Finishes CREATE TABLE; `as_select` carries the `AS select` form.
    fn end_table(&mut self, _as_select: Option<Box<Select>>) {}

    // --- views and DROP --------------------------------------------------

    fn create_view(
        &mut self,
        _start: &Token,
        _name: &Token,
        _db: &Token,
        _select: Option<Box<Select>>,
        _temp: bool,
        _if_not_exists: bool,
    ) {
    }

    fn drop_table(&mut self, _name: SrcList, _is_view: bool, _if_exists: bool) {}

    // --- DML -------------------------------------------------------------

    /// A complete top-level SELECT.
    fn select_statement(&mut self, _select: Box<Select>) {}

    fn delete_from(&mut self, _target: SrcList, _where_clause: Option<Box<Expr>>) {}

    fn update(
        &mut self,
        _target: SrcList,
        _set_list: ExprList,
        _where_clause: Option<Box<Expr>>,
        _or_conflict: ResolveType,
    ) {
    }

    /// INSERT/REPLACE; exactly one of `values`/`select` is set, or neither
    /// for DEFAULT VALUES.
    fn insert(
        &mut self,
        _target: SrcList,
        _columns: Option<IdList>,
        _values: Option<ExprList>,
        _select: Option<Box<Select>>,
        _or_conflict: ResolveType,
    ) {
    }

    // --- indexes ---------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn create_index(
        &mut self,
        _name: &Token,
        _db: &Token,
        _table: SrcList,
        _columns: Option<ExprList>,
        _on_conflict: ResolveType,
        _start: &Token,
        _where_clause: Option<Box<Expr>>,
        _if_not_exists: bool,
    ) {
    }

    fn drop_index(&mut self, _name: SrcList, _if_exists: bool) {}

    // --- utility statements ----------------------------------------------

    fn vacuum(&mut self) {}

    fn pragma(&mut self, _name: &Token, _db: &Token, _value: Option<&Token>, _minus: bool) {}

    fn reindex(&mut self, _name: Option<&Token>, _db: Option<&Token>) {}

    fn analyze(&mut self, _name: Option<&Token>, _db: Option<&Token>) {}

    fn attach(
        &mut self,
        _file: Option<Box<Expr>>,
        _db_name: Option<Box<Expr>>,
        _key: Option<Box<Expr>>,
    ) {
    }

    fn detach(&mut self, _db_name: Option<Box<Expr>>) {}

    // --- ALTER TABLE -----------------------------------------------------

    fn alter_rename_table(&mut self, _target: SrcList, _new_name: &Token) {}

    fn alter_begin_add_column(&mut self, _target: SrcList) {}

    /// `column_def`'s span covers the whole new column definition.
    fn alter_finish_add_column(&mut self, _column_def: &Token) {}

    // --- triggers --------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn begin_trigger(
        &mut self,
        _name: &Token,
        _db: &Token,
        _time: TriggerTime,
        _event: TrigEvent,
        _table: SrcList,
        _when: Option<Box<Expr>>,
        _temp: bool,
        _if_not_exists: bool,
    ) {
    }

    /// `span` covers the whole CREATE TRIGGER statement.
    fn finish_trigger(&mut self, _steps: Vec<TriggerStep>, _span: Span) {}

    fn drop_trigger(&mut self, _name: SrcList, _if_exists: bool) {}

    // --- virtual tables --------------------------------------------------

    fn vtab_begin(&mut self, _name: &Token, _db: &Token, _module: &Token, _if_not_exists: bool) {}

    fn vtab_finish(&mut self, _end: Option<&Token>) {}

    fn vtab_arg_init(&mut self) {}

    fn vtab_arg_extend(&mut self, _token: &Token) {}
}

/// A DML statement as collected by [`AstSink`].
#[derive(Debug, PartialEq)]
pub enum DmlStatement {
    Select(Box<Select>),
    Delete {
        target: SrcList,
        where_clause: Option<Box<Expr>>,
    },
    Update {
        target: SrcList,
        set_list: ExprList,
        where_clause: Option<Box<Expr>>,
        or_conflict: ResolveType,
    },
    Insert {
        target: SrcList,
        columns: Option<IdList>,
        values: Option<ExprList>,
        select: Option<Box<Select>>,
        or_conflict: ResolveType,
    },
}

/// A minimal builder that buffers DML statements and diagnostics.
///
/// Suitable as a starting point for embedding and as the observer in tests;
/// every other hand-off keeps its default no-op.
#[derive(Debug, Default)]
pub struct AstSink {
    /// Completed DML statements in source order.
    pub statements: Vec<DmlStatement>,
    /// Diagnostics in report order.
    pub errors: Vec<(String, Option<Span>)>,
}

impl SemanticBuilder for AstSink {
    fn report_error(&mut self, message: String, span: Option<Span>) {
        log::debug!("parse diagnostic: {message}");
        self.errors.push((message, span));
    }

    fn error_count(&self) -> usize {
        self.errors.len()
    }

    fn select_statement(&mut self, select: Box<Select>) {
        self.statements.push(DmlStatement::Select(select));
    }

    fn delete_from(&mut self, target: SrcList, where_clause: Option<Box<Expr>>) {
        self.statements.push(DmlStatement::Delete {
            target,
            where_clause,
        });
    }

    fn update(
        &mut self,
        target: SrcList,
        set_list: ExprList,
        where_clause: Option<Box<Expr>>,
        or_conflict: ResolveType,
    ) {
        self.statements.push(DmlStatement::Update {
            target,
            set_list,
            where_clause,
            or_conflict,
        });
    }

    fn insert(
        &mut self,
        target: SrcList,
        columns: Option<IdList>,
        values: Option<ExprList>,
        select: Option<Box<Select>>,
        or_conflict: ResolveType,
    ) {
        self.statements.push(DmlStatement::Insert {
            target,
            columns,
            values,
            select,
            or_conflict,
        });
    }
}
