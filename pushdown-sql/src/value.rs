//! The semantic value attached to every stack entry.
//!
//! [`SemanticValue`] is a closed union over every per-symbol payload shape
//! the grammar produces. Which variant a slot holds is fixed by the symbol
//! occupying it, so the reduction arms take operands through the typed
//! [`Rhs`] accessors; a variant mismatch is a grammar-internal bug and
//! panics rather than being handled.
//!
//! Every owning variant drops its payload structurally, which is what makes
//! the engine's teardown discipline (each value destroyed exactly once on
//! any exit path) hold without per-symbol destructor bookkeeping.

use crate::ast::{
    CompoundOp, Expr, ExprList, IdList, Indexed, JoinType, LikeOp, LimitVal, RefArg, ResolveType,
    Select, SortOrder, SrcList, TransType, TrigEvent, TriggerStep, TriggerTime, ValueList,
};
use crate::token::Token;
use pushdown::Span;

/// An expression under construction, paired with the source span it covers.
///
/// The expression is `None` when node allocation failed; the span still
/// flows outward so enclosing nodes and diagnostics stay accurate.
#[derive(Debug, Default, PartialEq)]
pub struct ExprSpan {
    pub expr: Option<Box<Expr>>,
    pub span: Span,
}

/// Per-symbol payload of one stack entry.
#[derive(Debug, Default, PartialEq)]
pub enum SemanticValue {
    /// Valueless symbols and the stack sentinel.
    #[default]
    Unit,
    /// A shifted terminal.
    Token(Token),
    /// `expr` / `term`: expression plus covered span.
    ExprSpan(ExprSpan),
    /// Bare optional expression (`where_opt`, `on_opt`, `case_else`, ...).
    Expr(Option<Box<Expr>>),
    ExprList(Option<ExprList>),
    IdList(Option<IdList>),
    SrcList(Option<SrcList>),
    Select(Option<Box<Select>>),
    /// `limit_opt`.
    Limit(LimitVal),
    /// `likeop`.
    Like(LikeOp),
    /// `refarg`: one foreign-key action fragment.
    RefArg(RefArg),
    /// Conflict-resolution carrying symbols (`onconf`, `orconf`, ...).
    Resolve(ResolveType),
    /// `multiselect_op`.
    Compound(CompoundOp),
    /// `transtype`.
    Trans(TransType),
    /// `sortorder`.
    Sort(SortOrder),
    /// `trigger_time`.
    TrigTime(TriggerTime),
    /// `trigger_event`.
    TrigEvent(TrigEvent),
    /// `trigger_cmd`.
    TrigStep(Option<TriggerStep>),
    /// `trigger_cmd_list`.
    TrigSteps(Vec<TriggerStep>),
    /// `valuelist`.
    Values(ValueList),
    /// `joinop`.
    JoinKind(JoinType),
    /// `indexed_opt`.
    Indexed(Indexed),
    /// Flags and counters (`ifexists`, `autoinc`, packed `refargs`, ...).
    Int(i64),
}

/// Typed access to the values popped for one reduction, in rule order.
///
/// Each accessor moves the value out of its slot; taking the same slot
/// twice, or as the wrong variant, panics.
pub(crate) struct Rhs(Vec<SemanticValue>);

macro_rules! accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&mut self, index: usize) -> $ty {
            match self.take(index) {
                SemanticValue::$variant(v) => v,
                other => unreachable!(
                    "rhs slot {index} holds {other:?}, expected {}",
                    stringify!($variant)
                ),
            }
        }
    };
}

impl Rhs {
    pub fn new(values: Vec<SemanticValue>) -> Self {
        Rhs(values)
    }

    fn take(&mut self, index: usize) -> SemanticValue {
        std::mem::take(&mut self.0[index])
    }

    accessor!(token, Token, Token);
    accessor!(expr_span, ExprSpan, ExprSpan);
    accessor!(expr, Expr, Option<Box<Expr>>);
    accessor!(expr_list, ExprList, Option<ExprList>);
    accessor!(id_list, IdList, Option<IdList>);
    accessor!(src_list, SrcList, Option<SrcList>);
    accessor!(select, Select, Option<Box<Select>>);
    accessor!(limit, Limit, LimitVal);
    accessor!(like, Like, LikeOp);
    accessor!(ref_arg, RefArg, RefArg);
    accessor!(resolve, Resolve, ResolveType);
    accessor!(compound, Compound, CompoundOp);
    accessor!(trans, Trans, TransType);
    accessor!(sort, Sort, SortOrder);
    accessor!(trig_time, TrigTime, TriggerTime);
    accessor!(trig_event, TrigEvent, TrigEvent);
    accessor!(trig_step, TrigStep, Option<TriggerStep>);
    accessor!(trig_steps, TrigSteps, Vec<TriggerStep>);
    accessor!(values, Values, ValueList);
    accessor!(join_kind, JoinKind, JoinType);
    accessor!(indexed, Indexed, Indexed);
    accessor!(int, Int, i64);

    /// Integer slot read as a flag.
    pub fn flag(&mut self, index: usize) -> bool {
        self.int(index) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::{Rhs, SemanticValue};
    use crate::token::{Token, TokenType};
    use pushdown::Span;

    #[test]
    fn accessors_move_values_out_in_rule_order() {
        let mut rhs = Rhs::new(vec![
            SemanticValue::Token(Token::new(TokenType::Id, "t", Span::new(0, 1))),
            SemanticValue::Int(1),
            SemanticValue::Unit,
        ]);
        assert_eq!(rhs.token(0).text, "t");
        assert!(rhs.flag(1));
    }

    #[test]
    #[should_panic(expected = "expected Token")]
    fn variant_mismatch_is_a_grammar_bug() {
        let mut rhs = Rhs::new(vec![SemanticValue::Int(3)]);
        let _ = rhs.token(0);
    }
}
