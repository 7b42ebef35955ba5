//! # pushdown-sql
//!
//! A SQL front end for the [`pushdown`] LALR(1) runtime: the precomputed
//! grammar tables, the terminal and rule code enums, a typed AST, the
//! per-rule reduction actions, and a push-style [`Parser`].
//!
//! The crate deliberately stops at the parse boundary. Tokens come from the
//! caller (the scanner is not part of this crate), and everything a parsed
//! statement *means* — name resolution, execution, schema changes — happens
//! behind the [`SemanticBuilder`] capability the caller supplies.
//! [`AstSink`] is a ready-made builder that simply buffers DML statements
//! and diagnostics.
//!
//! ```rust
//! use pushdown::Span;
//! use pushdown_sql::{parse, AstSink, DmlStatement, Token, TokenType};
//!
//! let mut sink = AstSink::default();
//! parse(
//!     &mut sink,
//!     [
//!         Token::new(TokenType::Select, "SELECT", Span::new(0, 6)),
//!         Token::new(TokenType::Integer, "1", Span::new(7, 8)),
//!         Token::new(TokenType::Semi, ";", Span::new(8, 9)),
//!     ],
//! )
//! .unwrap();
//! assert!(matches!(sink.statements[0], DmlStatement::Select(_)));
//! ```
//!
//! ## Modules
//!
//! - [`token`] — terminal codes and the lexical [`Token`]
//! - [`tables`] — the packed grammar tables and the [`Rule`] enum
//! - [`ast`] — expression, select, source-list and trigger node types
//! - [`value`] — the per-symbol [`SemanticValue`] union
//! - [`builder`] — the [`SemanticBuilder`] capability and [`AstSink`]
//! - [`parser`] — the [`Parser`] drive loop glue

pub mod ast;
pub mod builder;
pub mod parser;
mod reduce;
pub mod tables;
pub mod token;
pub mod value;

pub use ast::{
    CompoundOp, Expr, ExprFlags, ExprList, ExprOp, ExplainKind, IdList, Indexed, JoinType,
    LikeOp, LimitVal, ResolveType, SavepointOp, Select, SelectFlags, SortOrder, SrcItem, SrcList,
    TransType, TrigEvent, TriggerEventKind, TriggerStep, TriggerTime, ValueList,
};
pub use builder::{AstSink, DmlStatement, SemanticBuilder};
pub use parser::{parse, Parser, SqlDriver};
pub use tables::{Rule, TABLES};
pub use token::{Token, TokenType};
pub use value::{ExprSpan, SemanticValue};
