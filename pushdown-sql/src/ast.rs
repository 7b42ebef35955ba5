//! Typed AST built by the reduction actions.
//!
//! Nodes own their children (`Box`/`Vec`/`Option`), so discarding any
//! subtree — during a reduction that drops an unused child, on error
//! teardown, or when the whole statement is dropped — frees every node
//! exactly once with no destructor bookkeeping.

use crate::token::Token;
use bitflags::bitflags;
use pushdown::Span;
use smartstring::alias::String;

/// Expression node operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprOp {
    // Literals and references.
    Null,
    Integer,
    Float,
    Blob,
    Str,
    Id,
    Dot,
    Variable,
    Register,
    /// `*` or `table.*` in a result column list.
    All,

    // Logical and comparison operators.
    And,
    Or,
    Not,
    Is,
    IsNot,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,

    // Arithmetic, bitwise and string operators.
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Concat,
    BitAnd,
    BitOr,
    ShiftLeft,
    ShiftRight,
    BitNot,
    UMinus,
    UPlus,

    // Null tests.
    IsNull,
    NotNull,

    // Composite forms.
    Between,
    In,
    Exists,
    Case,
    Cast,
    Collate,
    Function,
    /// CURRENT_TIME and friends: functions that return constants.
    ConstFunc,
    Select,
    Raise,
}

impl ExprOp {
    /// The operator for a binary-operator terminal.
    ///
    /// Panics on terminals that are not binary operators; the grammar only
    /// routes operator tokens here.
    pub fn binary(t: crate::token::TokenType) -> ExprOp {
        use crate::token::TokenType as T;
        match t {
            T::And => ExprOp::And,
            T::Or => ExprOp::Or,
            T::Lt => ExprOp::Lt,
            T::Gt => ExprOp::Gt,
            T::Le => ExprOp::Le,
            T::Ge => ExprOp::Ge,
            T::Eq => ExprOp::Eq,
            T::Ne => ExprOp::Ne,
            T::Bitand => ExprOp::BitAnd,
            T::Bitor => ExprOp::BitOr,
            T::Lshift => ExprOp::ShiftLeft,
            T::Rshift => ExprOp::ShiftRight,
            T::Plus => ExprOp::Add,
            T::Minus => ExprOp::Subtract,
            T::Star => ExprOp::Multiply,
            T::Slash => ExprOp::Divide,
            T::Rem => ExprOp::Remainder,
            T::Concat => ExprOp::Concat,
            T::Is => ExprOp::Is,
            other => unreachable!("not a binary operator terminal: {other:?}"),
        }
    }

    /// The operator for a literal terminal (`NULL`, numbers, strings, blobs).
    pub fn literal(t: crate::token::TokenType) -> ExprOp {
        use crate::token::TokenType as T;
        match t {
            T::Null => ExprOp::Null,
            T::Integer => ExprOp::Integer,
            T::Float => ExprOp::Float,
            T::Blob => ExprOp::Blob,
            T::String => ExprOp::Str,
            other => unreachable!("not a literal terminal: {other:?}"),
        }
    }

    /// The operator for a postfix null-test terminal.
    pub fn null_test(t: crate::token::TokenType) -> ExprOp {
        use crate::token::TokenType as T;
        match t {
            T::Isnull => ExprOp::IsNull,
            T::Notnull => ExprOp::NotNull,
            other => unreachable!("not a null-test terminal: {other:?}"),
        }
    }
}

bitflags! {
    /// Expression properties.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ExprFlags: u8 {
        /// `f(DISTINCT ...)` aggregate call.
        const DISTINCT = 0x01;
        /// Built from an infix keyword operator (LIKE/GLOB/MATCH).
        const INFIX_FUNC = 0x02;
    }
}

/// One expression node.
#[derive(Debug, Default, PartialEq)]
pub struct Expr {
    pub op: ExprOp,
    /// Literal text, identifier, function name, collation or type name,
    /// depending on `op`.
    pub token: Option<String>,
    pub left: Option<Box<Expr>>,
    pub right: Option<Box<Expr>>,
    /// Argument or operand list (function args, IN list, CASE arms,
    /// BETWEEN bounds).
    pub list: Option<ExprList>,
    /// Subquery operand (IN/EXISTS/scalar subquery).
    pub select: Option<Box<Select>>,
    /// RAISE resolution.
    pub on_conflict: Option<ResolveType>,
    pub flags: ExprFlags,
    /// Source text covered by this node.
    pub span: Span,
}

impl Default for ExprOp {
    fn default() -> Self {
        ExprOp::Null
    }
}

impl Expr {
    /// A node with no operands.
    pub fn new(op: ExprOp, span: Span) -> Expr {
        Expr {
            op,
            span,
            ..Expr::default()
        }
    }

    /// A leaf node carrying the token's text and span.
    pub fn from_token(op: ExprOp, token: &Token) -> Expr {
        Expr {
            op,
            token: Some(token.text.clone()),
            span: token.span,
            ..Expr::default()
        }
    }
}

/// One result-column / list entry.
#[derive(Debug, Default, PartialEq)]
pub struct ExprItem {
    /// The expression; `None` only after a failed node allocation.
    pub expr: Option<Box<Expr>>,
    /// `AS` alias, assignment target, or indexed column name.
    pub name: Option<String>,
    /// Source text of the expression, for column naming.
    pub span: Option<Span>,
    /// Sort direction, where the list is an ORDER BY/index key list.
    pub sort_order: SortOrder,
}

/// A list of expressions with per-item metadata.
pub type ExprList = Vec<ExprItem>;

/// Appends `expr` to `list` (creating it on first use), the universal
/// list-building step shared by result columns, ORDER BY, SET lists, ...
pub fn exprlist_append(list: Option<ExprList>, expr: Option<Box<Expr>>) -> ExprList {
    let mut list = list.unwrap_or_default();
    list.push(ExprItem {
        expr,
        ..ExprItem::default()
    });
    list
}

/// Names the most recently appended item (alias, SET target, key column).
pub fn exprlist_set_name(list: &mut ExprList, name: &Token) {
    if let Some(item) = list.last_mut() {
        item.name = Some(name.text.clone());
    }
}

/// Records the source span of the most recently appended item.
pub fn exprlist_set_span(list: &mut ExprList, span: Span) {
    if let Some(item) = list.last_mut() {
        item.span = Some(span);
    }
}

/// A list of plain identifiers (column name lists, USING lists).
pub type IdList = Vec<String>;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

bitflags! {
    /// How a FROM term joins the one before it.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct JoinType: u8 {
        const INNER = 0x01;
        const CROSS = 0x02;
        const NATURAL = 0x04;
        const LEFT = 0x08;
        const RIGHT = 0x10;
        const OUTER = 0x20;
        /// Unknown keyword seen while parsing the join operator.
        const ERROR = 0x40;
    }
}

/// Looks up one join-operator keyword, case-insensitively.
pub fn join_keyword(text: &str) -> Option<JoinType> {
    const KEYWORDS: [(&str, JoinType); 7] = [
        ("natural", JoinType::NATURAL),
        ("left", JoinType::LEFT.union(JoinType::OUTER)),
        ("outer", JoinType::OUTER),
        ("right", JoinType::RIGHT.union(JoinType::OUTER)),
        ("full", JoinType::LEFT.union(JoinType::RIGHT).union(JoinType::OUTER)),
        ("inner", JoinType::INNER),
        ("cross", JoinType::INNER.union(JoinType::CROSS)),
    ];
    KEYWORDS
        .iter()
        .find(|(kw, _)| kw.eq_ignore_ascii_case(text))
        .map(|&(_, jt)| jt)
}

/// INDEXED BY state of a FROM term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Indexed {
    #[default]
    Unspecified,
    By(String),
    NotIndexed,
}

/// One term of a FROM clause (or a statement's target table).
#[derive(Debug, Default, PartialEq)]
pub struct SrcItem {
    pub database: Option<String>,
    pub name: Option<String>,
    pub alias: Option<String>,
    /// Subquery in place of a named table.
    pub select: Option<Box<Select>>,
    /// How this term joins the previous one.
    pub join_type: JoinType,
    pub on: Option<Box<Expr>>,
    pub using: Option<IdList>,
    pub indexed: Indexed,
}

/// A FROM clause: the joined source terms in order.
pub type SrcList = Vec<SrcItem>;

/// Appends a possibly-qualified table name to `list`. An empty `db` token
/// means the name is unqualified.
pub fn srclist_append(list: Option<SrcList>, name: &Token, db: &Token) -> SrcList {
    let mut list = list.unwrap_or_default();
    let (database, name) = if db.is_empty() {
        (None, Some(name.text.clone()))
    } else {
        (Some(name.text.clone()), Some(db.text.clone()))
    };
    list.push(SrcItem {
        database,
        name,
        ..SrcItem::default()
    });
    list
}

/// Appends one FROM term with everything the grammar attaches to it:
/// an optional (possibly qualified) table name or subquery, an alias, and
/// the ON / USING clauses.
pub fn srclist_append_from_term(
    prefix: Option<SrcList>,
    name: Option<&Token>,
    db: Option<&Token>,
    alias: &Token,
    select: Option<Box<Select>>,
    on: Option<Box<Expr>>,
    using: Option<IdList>,
) -> SrcList {
    let mut list = match (name, db) {
        (Some(name), Some(db)) => srclist_append(prefix, name, db),
        _ => {
            let mut list = prefix.unwrap_or_default();
            list.push(SrcItem::default());
            list
        }
    };
    if let Some(item) = list.last_mut() {
        if !alias.is_empty() {
            item.alias = Some(alias.text.clone());
        }
        item.select = select;
        item.on = on;
        item.using = using;
    }
    list
}

/// Records the INDEXED BY state on the most recently appended FROM term.
pub fn srclist_indexed_by(list: &mut SrcList, indexed: Indexed) {
    if let Some(item) = list.last_mut() {
        item.indexed = indexed;
    }
}

/// Moves each term's join operator onto the term to its left.
///
/// The grammar attaches `A join-op B`'s operator to `A` while building;
/// downstream consumers want it on `B`, so the finished FROM clause shifts
/// every join type one term rightward and clears the last.
pub fn srclist_shift_join_type(list: &mut SrcList) {
    for i in (1..list.len()).rev() {
        list[i].join_type = list[i - 1].join_type;
    }
    if let Some(first) = list.first_mut() {
        first.join_type = JoinType::empty();
    }
}

/// Compound operator linking a SELECT to its `prior`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompoundOp {
    /// Not a compound arm.
    #[default]
    Select,
    Union,
    UnionAll,
    Except,
    Intersect,
}

bitflags! {
    /// SELECT statement properties.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct SelectFlags: u8 {
        const DISTINCT = 0x01;
        /// Synthesized from a multi-row VALUES clause.
        const VALUES = 0x02;
        /// Wraps a parenthesized join in a FROM clause.
        const NESTED_FROM = 0x04;
    }
}

/// One SELECT statement (or one arm of a compound SELECT).
#[derive(Debug, Default, PartialEq)]
pub struct Select {
    /// Result columns; a lone `*` when the source produced none.
    pub columns: ExprList,
    pub from: Option<SrcList>,
    pub where_clause: Option<Box<Expr>>,
    pub group_by: Option<ExprList>,
    pub having: Option<Box<Expr>>,
    pub order_by: Option<ExprList>,
    pub limit: Option<Box<Expr>>,
    pub offset: Option<Box<Expr>>,
    pub flags: SelectFlags,
    /// How this arm connects to `prior`.
    pub op: CompoundOp,
    /// The SELECT to the left of the compound operator.
    pub prior: Option<Box<Select>>,
}

impl Select {
    /// Assembles a SELECT, substituting `*` when no column list was built.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        columns: Option<ExprList>,
        from: Option<SrcList>,
        where_clause: Option<Box<Expr>>,
        group_by: Option<ExprList>,
        having: Option<Box<Expr>>,
        order_by: Option<ExprList>,
        flags: SelectFlags,
        limit: Option<Box<Expr>>,
        offset: Option<Box<Expr>>,
    ) -> Select {
        let columns = match columns {
            Some(list) if !list.is_empty() => list,
            _ => exprlist_append(None, Some(Box::new(Expr::new(ExprOp::All, Span::default())))),
        };
        Select {
            columns,
            from,
            where_clause,
            group_by,
            having,
            order_by,
            limit,
            offset,
            flags,
            op: CompoundOp::Select,
            prior: None,
        }
    }
}

/// LIMIT clause payload.
#[derive(Debug, Default, PartialEq)]
pub struct LimitVal {
    pub limit: Option<Box<Expr>>,
    pub offset: Option<Box<Expr>>,
}

/// LIKE/GLOB/REGEXP/MATCH operator descriptor.
#[derive(Debug, Default, PartialEq)]
pub struct LikeOp {
    /// The operator keyword token; its text names the matching function.
    pub operator: Token,
    /// `NOT LIKE` and friends.
    pub not: bool,
}

/// VALUES clause payload: a single row list, or a compound SELECT once a
/// second row appears.
#[derive(Debug, Default, PartialEq)]
pub struct ValueList {
    pub list: Option<ExprList>,
    pub select: Option<Box<Select>>,
}

/// Conflict-resolution algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolveType {
    None,
    Rollback,
    Abort,
    Fail,
    Ignore,
    Replace,
    Restrict,
    SetNull,
    SetDefault,
    Cascade,
    /// Defer to the statement or schema default.
    #[default]
    Default,
}

impl ResolveType {
    /// Byte code used in the packed foreign-key action pair.
    pub fn code(self) -> i32 {
        match self {
            ResolveType::None => 0,
            ResolveType::Rollback => 1,
            ResolveType::Abort => 2,
            ResolveType::Fail => 3,
            ResolveType::Ignore => 4,
            ResolveType::Replace => 5,
            ResolveType::Restrict => 6,
            ResolveType::SetNull => 7,
            ResolveType::SetDefault => 8,
            ResolveType::Cascade => 9,
            ResolveType::Default => 10,
        }
    }
}

/// Transaction mode of a BEGIN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransType {
    #[default]
    Deferred,
    Immediate,
    Exclusive,
}

/// Savepoint statement flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavepointOp {
    Begin,
    Release,
    Rollback,
}

/// EXPLAIN prefix of a statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExplainKind {
    #[default]
    Normal,
    Explain,
    QueryPlan,
}

/// When a trigger fires relative to the triggering statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerTime {
    #[default]
    Before,
    After,
    InsteadOf,
}

/// Which statement kind fires a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEventKind {
    Delete,
    Insert,
    Update,
}

/// A trigger's event clause: the kind plus the UPDATE OF column list.
#[derive(Debug, PartialEq)]
pub struct TrigEvent {
    pub kind: TriggerEventKind,
    pub columns: Option<IdList>,
}

/// One statement in a trigger body.
///
/// Targets inside trigger bodies are bare names; the grammar rejects
/// qualified names and INDEXED BY clauses there.
#[derive(Debug, PartialEq)]
pub enum TriggerStep {
    Update {
        target: String,
        set_list: ExprList,
        where_clause: Option<Box<Expr>>,
        or_conflict: ResolveType,
    },
    Insert {
        target: String,
        columns: Option<IdList>,
        values: Option<ExprList>,
        select: Option<Box<Select>>,
        or_conflict: ResolveType,
    },
    Delete {
        target: String,
        where_clause: Option<Box<Expr>>,
    },
    Select(Option<Box<Select>>),
}

/// Packed foreign-key action fragment produced by one `refarg`; the
/// delete action occupies the low byte, the update action the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefArg {
    pub value: i32,
    pub mask: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenType};
    use pushdown::Span;

    #[test]
    fn exprlist_append_grows_and_names() {
        let e = Box::new(Expr::new(ExprOp::Integer, Span::new(0, 1)));
        let mut list = exprlist_append(None, Some(e));
        exprlist_set_name(&mut list, &Token::new(TokenType::Id, "n", Span::new(5, 6)));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name.as_deref(), Some("n"));
        let list = exprlist_append(Some(list), None);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn srclist_append_splits_qualified_names() {
        let name = Token::new(TokenType::Id, "main", Span::new(0, 4));
        let db = Token::new(TokenType::Id, "t", Span::new(5, 6));
        let list = srclist_append(None, &name, &db);
        assert_eq!(list[0].database.as_deref(), Some("main"));
        assert_eq!(list[0].name.as_deref(), Some("t"));

        let bare = srclist_append(None, &name, &Token::default());
        assert_eq!(bare[0].database, None);
        assert_eq!(bare[0].name.as_deref(), Some("main"));
    }

    #[test]
    fn shift_join_type_moves_operators_right() {
        let name = |s: &str| Token::new(TokenType::Id, s, Span::default());
        let mut list = srclist_append(None, &name("a"), &Token::default());
        list[0].join_type = JoinType::LEFT | JoinType::OUTER;
        let mut list = srclist_append(Some(list), &name("b"), &Token::default());
        srclist_shift_join_type(&mut list);
        assert_eq!(list[0].join_type, JoinType::empty());
        assert_eq!(list[1].join_type, JoinType::LEFT | JoinType::OUTER);
    }

    #[test]
    fn join_keywords_fold_case_and_compose() {
        assert_eq!(join_keyword("NATURAL"), Some(JoinType::NATURAL));
        assert_eq!(join_keyword("left"), Some(JoinType::LEFT | JoinType::OUTER));
        assert_eq!(join_keyword("sideways"), None);
    }

    #[test]
    fn select_new_substitutes_star_for_missing_columns() {
        let s = Select::new(None, None, None, None, None, None, SelectFlags::empty(), None, None);
        assert_eq!(s.columns.len(), 1);
        assert_eq!(s.columns[0].expr.as_ref().unwrap().op, ExprOp::All);
    }
}
