//! Semantic actions: one arm per grammar rule.
//!
//! [`apply`] is invoked by the automaton on every reduction with the popped
//! right-hand-side values in rule order; it synthesizes the left-hand-side
//! value, calling into the [`SemanticBuilder`] for node allocation,
//! statement hand-off and diagnostics. Values not moved into the result are
//! dropped before the arm returns.
//!
//! Expression arms maintain the source span of every value they build by
//! combining the spans of the children they consume. The degenerate-case
//! folds (`x IS NULL`, `x IN ()`) happen here, in the arms for those exact
//! rules, not in a later pass.

use crate::ast::{
    exprlist_append, exprlist_set_name, exprlist_set_span, srclist_append,
    srclist_append_from_term, srclist_indexed_by, srclist_shift_join_type, CompoundOp, Expr,
    ExprFlags, ExprOp, ExplainKind, JoinType, LikeOp, LimitVal, RefArg, ResolveType, SavepointOp,
    Select, SelectFlags, SortOrder, TransType, TrigEvent, TriggerEventKind, TriggerStep,
    TriggerTime, ValueList,
};
use crate::builder::SemanticBuilder;
use crate::tables::Rule;
use crate::token::{Token, TokenType};
use crate::value::{ExprSpan, Rhs, SemanticValue};
use pushdown::Span;

/// Builds an expression leaf from a single token.
fn span_expr<B: SemanticBuilder>(b: &mut B, op: ExprOp, token: &Token) -> ExprSpan {
    ExprSpan {
        expr: b.expr(Expr::from_token(op, token)),
        span: token.span,
    }
}

/// Builds a binary node; the result covers both operands.
fn span_binary<B: SemanticBuilder>(b: &mut B, op: ExprOp, left: ExprSpan, right: ExprSpan) -> ExprSpan {
    let span = left.span.cover(right.span);
    let expr = b.expr(Expr {
        op,
        left: left.expr,
        right: right.expr,
        span,
        ..Expr::default()
    });
    ExprSpan { expr, span }
}

/// Builds a prefix-operator node spanning from the operator token.
fn span_unary_prefix<B: SemanticBuilder>(
    b: &mut B,
    op: ExprOp,
    operand: ExprSpan,
    pre_op: &Token,
) -> ExprSpan {
    let span = pre_op.span.cover(operand.span);
    let expr = b.expr(Expr {
        op,
        left: operand.expr,
        span,
        ..Expr::default()
    });
    ExprSpan { expr, span }
}

/// Builds a postfix-operator node spanning to the operator token.
fn span_unary_postfix<B: SemanticBuilder>(
    b: &mut B,
    op: ExprOp,
    operand: ExprSpan,
    post_op: &Token,
) -> ExprSpan {
    let span = operand.span.cover(post_op.span);
    let expr = b.expr(Expr {
        op,
        left: operand.expr,
        span,
        ..Expr::default()
    });
    ExprSpan { expr, span }
}

/// Rewrites a binary IS / IS NOT node into a unary null test when its
/// right operand is a literal NULL.
fn binary_to_unary_if_null(out: &mut ExprSpan, op: ExprOp) {
    if let Some(node) = out.expr.as_mut() {
        if node.right.as_ref().is_some_and(|r| r.op == ExprOp::Null) {
            node.op = op;
            node.right = None;
        }
    }
}

/// Resolves a join-operator keyword sequence, reporting unsupported and
/// unknown combinations.
fn join_type<B: SemanticBuilder>(b: &mut B, tokens: &[&Token]) -> JoinType {
    let mut jt = JoinType::empty();
    for t in tokens {
        match crate::ast::join_keyword(&t.text) {
            Some(j) => jt |= j,
            None => jt |= JoinType::ERROR,
        }
    }
    let span = tokens.first().map(|t| t.span);
    if jt.contains(JoinType::INNER | JoinType::OUTER) || jt.contains(JoinType::ERROR) {
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        b.report_error(
            format!("unknown or unsupported join type: {}", words.join(" ")),
            span,
        );
        JoinType::INNER
    } else if jt.contains(JoinType::RIGHT) {
        b.report_error(
            "RIGHT and FULL OUTER JOINs are not currently supported".to_owned(),
            span,
        );
        JoinType::INNER
    } else {
        jt
    }
}

/// Synthesizes the LHS value for `rule` from `values` (rule order).
///
/// `last_span` is the span of the most recently consumed token; a few rules
/// that cover trailing optional clauses extend their span to it.
pub(crate) fn apply<B: SemanticBuilder>(
    rule: Rule,
    values: Vec<SemanticValue>,
    b: &mut B,
    last_span: Span,
) -> SemanticValue {
    let mut rhs = Rhs::new(values);
    match rule {
        Rule::Explain1 => {
            // explain ::=
            b.begin_parse(ExplainKind::Normal);
            SemanticValue::Unit
        }
        Rule::Explain2 => {
            // explain ::= EXPLAIN
            b.begin_parse(ExplainKind::Explain);
            SemanticValue::Unit
        }
        Rule::Explain3 => {
            // explain ::= EXPLAIN QUERY PLAN
            b.begin_parse(ExplainKind::QueryPlan);
            SemanticValue::Unit
        }
        Rule::Cmdx => {
            // cmdx ::= cmd
            b.finish_coding();
            SemanticValue::Unit
        }
        Rule::Cmd1 => {
            // cmd ::= BEGIN transtype trans_opt
            let ty = rhs.trans(1);
            b.begin_transaction(ty);
            SemanticValue::Unit
        }
        Rule::Transtype1 | Rule::Transtype2 => {
            // transtype ::= | transtype ::= DEFERRED
            SemanticValue::Trans(TransType::Deferred)
        }
        Rule::Transtype3 => {
            // transtype ::= IMMEDIATE
            SemanticValue::Trans(TransType::Immediate)
        }
        Rule::Transtype4 => {
            // transtype ::= EXCLUSIVE
            SemanticValue::Trans(TransType::Exclusive)
        }
        Rule::Cmd2 | Rule::Cmd3 => {
            // cmd ::= COMMIT trans_opt | cmd ::= END trans_opt
            b.commit_transaction();
            SemanticValue::Unit
        }
        Rule::Cmd4 => {
            // cmd ::= ROLLBACK trans_opt
            b.rollback_transaction();
            SemanticValue::Unit
        }
        Rule::Cmd5 => {
            // cmd ::= SAVEPOINT nm
            let name = rhs.token(1);
            b.savepoint(SavepointOp::Begin, &name);
            SemanticValue::Unit
        }
        Rule::Cmd6 => {
            // cmd ::= RELEASE savepoint_opt nm
            let name = rhs.token(2);
            b.savepoint(SavepointOp::Release, &name);
            SemanticValue::Unit
        }
        Rule::Cmd7 => {
            // cmd ::= ROLLBACK trans_opt TO savepoint_opt nm
            let name = rhs.token(4);
            b.savepoint(SavepointOp::Rollback, &name);
            SemanticValue::Unit
        }
        Rule::CreateTable => {
            // create_table ::= createkw temp TABLE ifnotexists nm dbnm
            let temp = rhs.flag(1);
            let if_not_exists = rhs.flag(3);
            let name = rhs.token(4);
            let db = rhs.token(5);
            b.start_table(&name, &db, temp, if_not_exists);
            SemanticValue::Unit
        }
        Rule::Createkw => {
            // createkw ::= CREATE
            SemanticValue::Token(rhs.token(0))
        }
        Rule::Ifnotexists1 | Rule::Temp2 | Rule::Autoinc1 | Rule::DeferSubclause1
        | Rule::InitDeferredPredOpt1 | Rule::InitDeferredPredOpt3 | Rule::DeferSubclauseOpt1
        | Rule::Ifexists2 | Rule::BetweenOp1 | Rule::InOp1 => {
            // ifnotexists ::= | temp ::= | autoinc ::=
            // | defer_subclause ::= NOT DEFERRABLE init_deferred_pred_opt
            // | init_deferred_pred_opt ::= | init_deferred_pred_opt ::= INITIALLY IMMEDIATE
            // | defer_subclause_opt ::= | ifexists ::=
            // | between_op ::= BETWEEN | in_op ::= IN
            SemanticValue::Int(0)
        }
        Rule::Ifnotexists2 | Rule::Temp1 | Rule::Autoinc2 | Rule::InitDeferredPredOpt2
        | Rule::Ifexists1 | Rule::BetweenOp2 | Rule::InOp2 => {
            // ifnotexists ::= IF NOT EXISTS | temp ::= TEMP | autoinc ::= AUTOINCR
            // | init_deferred_pred_opt ::= INITIALLY DEFERRED | ifexists ::= IF EXISTS
            // | between_op ::= NOT BETWEEN | in_op ::= NOT IN
            SemanticValue::Int(1)
        }
        Rule::CreateTableArgs1 => {
            // create_table_args ::= LP columnlist conslist_opt RP
            b.end_table(None);
            SemanticValue::Unit
        }
        Rule::CreateTableArgs2 => {
            // create_table_args ::= AS select
            let select = rhs.select(1);
            b.end_table(select);
            SemanticValue::Unit
        }
        Rule::Column => {
            // column ::= columnid type carglist
            let columnid = rhs.token(0);
            let span = columnid.span.cover(last_span);
            SemanticValue::Token(Token::new(columnid.kind, "", span))
        }
        Rule::Columnid => {
            // columnid ::= nm
            let name = rhs.token(0);
            b.add_column(&name);
            b.constraint_name(None);
            SemanticValue::Token(name)
        }
        Rule::Id1 | Rule::Id2 | Rule::Ids | Rule::Nm1 | Rule::Nm2 | Rule::Nm3
        | Rule::Typetoken1 | Rule::Typename1 | Rule::As2 | Rule::Trnm1 | Rule::Nmnum1
        | Rule::Nmnum2 | Rule::Nmnum3 | Rule::Nmnum4 | Rule::Nmnum5 | Rule::PlusNum2
        | Rule::Number => {
            // id ::= ID | id ::= INDEXED | ids ::= ID|STRING | nm ::= id
            // | nm ::= STRING | nm ::= JOIN_KW | typetoken ::= typename
            // | typename ::= ids | as ::= ids | trnm ::= nm | nmnum ::= ...
            // | plus_num ::= number | number ::= INTEGER|FLOAT
            SemanticValue::Token(rhs.token(0))
        }
        Rule::As1 | Rule::Dbnm2 | Rule::Collate2 => {
            // as ::= AS nm | dbnm ::= DOT nm | collate ::= COLLATE ids
            SemanticValue::Token(rhs.token(1))
        }
        Rule::PlusNum1 | Rule::MinusNum => {
            // plus_num ::= PLUS number | minus_num ::= MINUS number
            SemanticValue::Token(rhs.token(1))
        }
        Rule::Type2 => {
            // type ::= typetoken
            let ty = rhs.token(0);
            b.add_column_type(&ty);
            SemanticValue::Unit
        }
        Rule::Typetoken2 => {
            // typetoken ::= typename LP signed RP
            let mut t = rhs.token(0);
            let rp = rhs.token(3);
            t.span = t.span.cover(rp.span);
            SemanticValue::Token(t)
        }
        Rule::Typetoken3 => {
            // typetoken ::= typename LP signed COMMA signed RP
            let mut t = rhs.token(0);
            let rp = rhs.token(5);
            t.span = t.span.cover(rp.span);
            SemanticValue::Token(t)
        }
        Rule::Typename2 => {
            // typename ::= typename ids
            let mut t = rhs.token(0);
            let ids = rhs.token(1);
            t.text = format!("{} {}", t.text, ids.text).into();
            t.span = t.span.cover(ids.span);
            SemanticValue::Token(t)
        }
        Rule::Ccons1 | Rule::Tcons1 => {
            // ccons ::= CONSTRAINT nm | tcons ::= CONSTRAINT nm
            let name = rhs.token(1);
            b.constraint_name(Some(&name));
            SemanticValue::Unit
        }
        Rule::Ccons2 => {
            // ccons ::= DEFAULT term
            let value = rhs.expr_span(1);
            b.add_default_value(value);
            SemanticValue::Unit
        }
        Rule::Ccons3 => {
            // ccons ::= DEFAULT LP expr RP
            let value = rhs.expr_span(2);
            b.add_default_value(value);
            SemanticValue::Unit
        }
        Rule::Ccons4 => {
            // ccons ::= DEFAULT PLUS term
            let value = rhs.expr_span(2);
            b.add_default_value(value);
            SemanticValue::Unit
        }
        Rule::Ccons5 => {
            // ccons ::= DEFAULT MINUS term
            let minus = rhs.token(1);
            let term = rhs.expr_span(2);
            let value = span_unary_prefix(b, ExprOp::UMinus, term, &minus);
            b.add_default_value(value);
            SemanticValue::Unit
        }
        Rule::Ccons6 => {
            // ccons ::= DEFAULT id
            let id = rhs.token(1);
            let value = span_expr(b, ExprOp::Str, &id);
            b.add_default_value(value);
            SemanticValue::Unit
        }
        Rule::Ccons8 => {
            // ccons ::= NOT NULL onconf
            let on_conflict = rhs.resolve(2);
            b.add_not_null(on_conflict);
            SemanticValue::Unit
        }
        Rule::Ccons9 => {
            // ccons ::= PRIMARY KEY sortorder onconf autoinc
            let sort_order = rhs.sort(2);
            let on_conflict = rhs.resolve(3);
            let autoinc = rhs.flag(4);
            b.add_primary_key(None, on_conflict, autoinc, sort_order);
            SemanticValue::Unit
        }
        Rule::Ccons10 => {
            // ccons ::= UNIQUE onconf
            let on_conflict = rhs.resolve(1);
            b.add_unique_constraint(None, on_conflict);
            SemanticValue::Unit
        }
        Rule::Ccons11 => {
            // ccons ::= CHECK LP expr RP
            let check = rhs.expr_span(2);
            b.add_check_constraint(check.expr);
            SemanticValue::Unit
        }
        Rule::Ccons12 => {
            // ccons ::= REFERENCES nm idxlist_opt refargs
            let table = rhs.token(1);
            let to_columns = rhs.expr_list(2);
            let actions = rhs.int(3) as i32;
            b.create_foreign_key(None, &table, to_columns, actions);
            SemanticValue::Unit
        }
        Rule::Ccons13 => {
            // ccons ::= defer_subclause
            let deferred = rhs.flag(0);
            b.defer_foreign_key(deferred);
            SemanticValue::Unit
        }
        Rule::Ccons14 => {
            // ccons ::= COLLATE ids
            let name = rhs.token(1);
            b.add_collate_type(&name);
            SemanticValue::Unit
        }
        Rule::Refargs1 => {
            // refargs ::=
            SemanticValue::Int(0)
        }
        Rule::Refargs2 => {
            // refargs ::= refargs refarg
            let prev = rhs.int(0);
            let arg = rhs.ref_arg(1);
            SemanticValue::Int((prev & !i64::from(arg.mask)) | i64::from(arg.value))
        }
        Rule::Refarg1 | Rule::Refarg2 => {
            // refarg ::= MATCH nm | refarg ::= ON INSERT refact
            SemanticValue::RefArg(RefArg { value: 0, mask: 0 })
        }
        Rule::Refarg3 => {
            // refarg ::= ON DELETE refact
            let act = rhs.resolve(2);
            SemanticValue::RefArg(RefArg {
                value: act.code(),
                mask: 0x0000ff,
            })
        }
        Rule::Refarg4 => {
            // refarg ::= ON UPDATE refact
            let act = rhs.resolve(2);
            SemanticValue::RefArg(RefArg {
                value: act.code() << 8,
                mask: 0x00ff00,
            })
        }
        Rule::Refact1 => SemanticValue::Resolve(ResolveType::SetNull), // refact ::= SET NULL
        Rule::Refact2 => SemanticValue::Resolve(ResolveType::SetDefault), // refact ::= SET DEFAULT
        Rule::Refact3 => SemanticValue::Resolve(ResolveType::Cascade), // refact ::= CASCADE
        Rule::Refact4 => SemanticValue::Resolve(ResolveType::Restrict), // refact ::= RESTRICT
        Rule::Refact5 => SemanticValue::Resolve(ResolveType::None),    // refact ::= NO ACTION
        Rule::DeferSubclause2 => {
            // defer_subclause ::= DEFERRABLE init_deferred_pred_opt
            SemanticValue::Int(rhs.int(1))
        }
        Rule::DeferSubclauseOpt2 => {
            // defer_subclause_opt ::= defer_subclause
            SemanticValue::Int(rhs.int(0))
        }
        Rule::Tcons2 => {
            // tcons ::= PRIMARY KEY LP idxlist autoinc RP onconf
            let columns = rhs.expr_list(3);
            let autoinc = rhs.flag(4);
            let on_conflict = rhs.resolve(6);
            b.add_primary_key(columns, on_conflict, autoinc, SortOrder::Asc);
            SemanticValue::Unit
        }
        Rule::Tcons3 => {
            // tcons ::= UNIQUE LP idxlist RP onconf
            let columns = rhs.expr_list(2);
            let on_conflict = rhs.resolve(4);
            b.add_unique_constraint(columns, on_conflict);
            SemanticValue::Unit
        }
        Rule::Tcons4 => {
            // tcons ::= CHECK LP expr RP onconf
            let check = rhs.expr_span(2);
            b.add_check_constraint(check.expr);
            SemanticValue::Unit
        }
        Rule::Tcons5 => {
            // tcons ::= FOREIGN KEY LP idxlist RP REFERENCES nm idxlist_opt
            //           refargs defer_subclause_opt
            let from_columns = rhs.expr_list(3);
            let table = rhs.token(6);
            let to_columns = rhs.expr_list(7);
            let actions = rhs.int(8) as i32;
            let deferred = rhs.flag(9);
            b.create_foreign_key(from_columns, &table, to_columns, actions);
            b.defer_foreign_key(deferred);
            SemanticValue::Unit
        }
        Rule::Tconscomma1 => {
            // tconscomma ::= COMMA
            b.constraint_name(None);
            SemanticValue::Unit
        }
        Rule::Onconf1 | Rule::Orconf1 => {
            // onconf ::= | orconf ::=
            SemanticValue::Resolve(ResolveType::Default)
        }
        Rule::Onconf2 => {
            // onconf ::= ON CONFLICT resolvetype
            SemanticValue::Resolve(rhs.resolve(2))
        }
        Rule::Orconf2 => {
            // orconf ::= OR resolvetype
            SemanticValue::Resolve(rhs.resolve(1))
        }
        Rule::Resolvetype1 => {
            // resolvetype ::= raisetype
            SemanticValue::Resolve(rhs.resolve(0))
        }
        Rule::Resolvetype2 => SemanticValue::Resolve(ResolveType::Ignore), // resolvetype ::= IGNORE
        Rule::Resolvetype3 => SemanticValue::Resolve(ResolveType::Replace), // resolvetype ::= REPLACE
        Rule::Cmd9 | Rule::Cmd11 => {
            // cmd ::= DROP TABLE ifexists fullname | cmd ::= DROP VIEW ifexists fullname
            let if_exists = rhs.flag(2);
            let name = rhs.src_list(3).unwrap_or_default();
            b.drop_table(name, rule == Rule::Cmd11, if_exists);
            SemanticValue::Unit
        }
        Rule::Cmd10 => {
            // cmd ::= createkw temp VIEW ifnotexists nm dbnm AS select
            let start = rhs.token(0);
            let temp = rhs.flag(1);
            let if_not_exists = rhs.flag(3);
            let name = rhs.token(4);
            let db = rhs.token(5);
            let select = rhs.select(7);
            b.create_view(&start, &name, &db, select, temp, if_not_exists);
            SemanticValue::Unit
        }
        Rule::Cmd12 => {
            // cmd ::= select
            if let Some(select) = rhs.select(0) {
                b.select_statement(select);
            }
            SemanticValue::Unit
        }
        Rule::Select1 => {
            // select ::= oneselect
            SemanticValue::Select(rhs.select(0))
        }
        Rule::Select2 => {
            // select ::= select multiselect_op oneselect
            let left = rhs.select(0);
            let op = rhs.compound(1);
            let right = rhs.select(2);
            match right {
                Some(mut new) => {
                    new.op = op;
                    new.prior = left;
                    SemanticValue::Select(Some(new))
                }
                None => {
                    drop(left);
                    SemanticValue::Select(None)
                }
            }
        }
        Rule::MultiselectOp1 => SemanticValue::Compound(CompoundOp::Union), // multiselect_op ::= UNION
        Rule::MultiselectOp2 => SemanticValue::Compound(CompoundOp::UnionAll), // multiselect_op ::= UNION ALL
        Rule::MultiselectOp3 => {
            // multiselect_op ::= EXCEPT|INTERSECT
            match rhs.token(0).kind {
                TokenType::Except => SemanticValue::Compound(CompoundOp::Except),
                TokenType::Intersect => SemanticValue::Compound(CompoundOp::Intersect),
                other => unreachable!("bad compound operator terminal {other:?}"),
            }
        }
        Rule::Oneselect => {
            // oneselect ::= SELECT distinct selcollist from where_opt
            //               groupby_opt having_opt orderby_opt limit_opt
            let distinct = rhs.flag(1);
            let columns = rhs.expr_list(2);
            let from = rhs.src_list(3);
            let where_clause = rhs.expr(4);
            let group_by = rhs.expr_list(5);
            let having = rhs.expr(6);
            let order_by = rhs.expr_list(7);
            let limit = rhs.limit(8);
            let flags = if distinct {
                SelectFlags::DISTINCT
            } else {
                SelectFlags::empty()
            };
            SemanticValue::Select(Some(Box::new(Select::new(
                columns,
                from,
                where_clause,
                group_by,
                having,
                order_by,
                flags,
                limit.limit,
                limit.offset,
            ))))
        }
        Rule::Distinct1 => SemanticValue::Int(1), // distinct ::= DISTINCT
        Rule::Distinct2 | Rule::Distinct3 => SemanticValue::Int(0), // distinct ::= ALL | distinct ::=
        Rule::Sclp1 => {
            // sclp ::= selcollist COMMA
            SemanticValue::ExprList(rhs.expr_list(0))
        }
        Rule::Sclp2 | Rule::OrderbyOpt1 | Rule::GroupbyOpt1 | Rule::Exprlist2
        | Rule::IdxlistOpt1 => {
            // sclp ::= | orderby_opt ::= | groupby_opt ::= | exprlist ::= | idxlist_opt ::=
            SemanticValue::ExprList(None)
        }
        Rule::Selcollist1 => {
            // selcollist ::= sclp expr as
            let list = rhs.expr_list(0);
            let e = rhs.expr_span(1);
            let alias = rhs.token(2);
            let mut list = exprlist_append(list, e.expr);
            if !alias.is_empty() {
                exprlist_set_name(&mut list, &alias);
            }
            exprlist_set_span(&mut list, e.span);
            SemanticValue::ExprList(Some(list))
        }
        Rule::Selcollist2 => {
            // selcollist ::= sclp STAR
            let list = rhs.expr_list(0);
            let star = rhs.token(1);
            let all = b.expr(Expr::new(ExprOp::All, star.span));
            SemanticValue::ExprList(Some(exprlist_append(list, all)))
        }
        Rule::Selcollist3 => {
            // selcollist ::= sclp nm DOT STAR
            let list = rhs.expr_list(0);
            let name = rhs.token(1);
            let star = rhs.token(3);
            let left = b.expr(Expr::from_token(ExprOp::Id, &name));
            let right = b.expr(Expr::from_token(ExprOp::All, &star));
            let span = name.span.cover(star.span);
            let dot = b.expr(Expr {
                op: ExprOp::Dot,
                left,
                right,
                span,
                ..Expr::default()
            });
            SemanticValue::ExprList(Some(exprlist_append(list, dot)))
        }
        Rule::As3 | Rule::Dbnm1 | Rule::Collate1 => {
            // as ::= | dbnm ::= | collate ::=
            SemanticValue::Token(Token::default())
        }
        Rule::From1 => {
            // from ::=
            SemanticValue::SrcList(Some(Vec::new()))
        }
        Rule::From2 => {
            // from ::= FROM seltablist
            let mut list = rhs.src_list(1).unwrap_or_default();
            srclist_shift_join_type(&mut list);
            SemanticValue::SrcList(Some(list))
        }
        Rule::StlPrefix1 => {
            // stl_prefix ::= seltablist joinop
            let list = rhs.src_list(0);
            let join = rhs.join_kind(1);
            let mut list = list.unwrap_or_default();
            if let Some(last) = list.last_mut() {
                last.join_type = join;
            }
            SemanticValue::SrcList(Some(list))
        }
        Rule::StlPrefix2 => {
            // stl_prefix ::=
            SemanticValue::SrcList(None)
        }
        Rule::Seltablist1 => {
            // seltablist ::= stl_prefix nm dbnm as indexed_opt on_opt using_opt
            let prefix = rhs.src_list(0);
            let name = rhs.token(1);
            let db = rhs.token(2);
            let alias = rhs.token(3);
            let indexed = rhs.indexed(4);
            let on = rhs.expr(5);
            let using = rhs.id_list(6);
            let mut list =
                srclist_append_from_term(prefix, Some(&name), Some(&db), &alias, None, on, using);
            srclist_indexed_by(&mut list, indexed);
            SemanticValue::SrcList(Some(list))
        }
        Rule::Seltablist2 => {
            // seltablist ::= stl_prefix LP select RP as on_opt using_opt
            let prefix = rhs.src_list(0);
            let select = rhs.select(2);
            let alias = rhs.token(4);
            let on = rhs.expr(5);
            let using = rhs.id_list(6);
            let list = srclist_append_from_term(prefix, None, None, &alias, select, on, using);
            SemanticValue::SrcList(Some(list))
        }
        Rule::Seltablist3 => {
            // seltablist ::= stl_prefix LP seltablist RP as on_opt using_opt
            let prefix = rhs.src_list(0);
            let inner = rhs.src_list(2).unwrap_or_default();
            let alias = rhs.token(4);
            let on = rhs.expr(5);
            let using = rhs.id_list(6);
            if prefix.is_none() && alias.is_empty() && on.is_none() && using.is_none() {
                // A parenthesized FROM term with nothing attached is just
                // its contents.
                SemanticValue::SrcList(Some(inner))
            } else if inner.len() == 1 {
                let mut list =
                    srclist_append_from_term(prefix, None, None, &alias, None, on, using);
                if let (Some(new_item), Some(old)) =
                    (list.last_mut(), inner.into_iter().next())
                {
                    new_item.name = old.name;
                    new_item.database = old.database;
                    new_item.select = old.select;
                }
                SemanticValue::SrcList(Some(list))
            } else {
                let mut inner = inner;
                srclist_shift_join_type(&mut inner);
                let subquery = Select::new(
                    None,
                    Some(inner),
                    None,
                    None,
                    None,
                    None,
                    SelectFlags::NESTED_FROM,
                    None,
                    None,
                );
                let list = srclist_append_from_term(
                    prefix,
                    None,
                    None,
                    &alias,
                    Some(Box::new(subquery)),
                    on,
                    using,
                );
                SemanticValue::SrcList(Some(list))
            }
        }
        Rule::Fullname => {
            // fullname ::= nm dbnm
            let name = rhs.token(0);
            let db = rhs.token(1);
            SemanticValue::SrcList(Some(srclist_append(None, &name, &db)))
        }
        Rule::Joinop1 => {
            // joinop ::= COMMA|JOIN
            SemanticValue::JoinKind(JoinType::INNER)
        }
        Rule::Joinop2 => {
            // joinop ::= JOIN_KW JOIN
            let kw = rhs.token(0);
            SemanticValue::JoinKind(join_type(b, &[&kw]))
        }
        Rule::Joinop3 => {
            // joinop ::= JOIN_KW nm JOIN
            let kw = rhs.token(0);
            let n1 = rhs.token(1);
            SemanticValue::JoinKind(join_type(b, &[&kw, &n1]))
        }
        Rule::Joinop4 => {
            // joinop ::= JOIN_KW nm nm JOIN
            let kw = rhs.token(0);
            let n1 = rhs.token(1);
            let n2 = rhs.token(2);
            SemanticValue::JoinKind(join_type(b, &[&kw, &n1, &n2]))
        }
        Rule::OnOpt1 => {
            // on_opt ::= ON expr
            SemanticValue::Expr(rhs.expr_span(1).expr)
        }
        Rule::OnOpt2 | Rule::HavingOpt1 | Rule::WhereOpt1 | Rule::CaseElse2
        | Rule::CaseOperand2 | Rule::WhenClause1 | Rule::KeyOpt1 => {
            // on_opt ::= | having_opt ::= | where_opt ::= | case_else ::=
            // | case_operand ::= | when_clause ::= | key_opt ::=
            SemanticValue::Expr(None)
        }
        Rule::HavingOpt2 | Rule::WhereOpt2 | Rule::WhenClause2 | Rule::KeyOpt2 => {
            // having_opt ::= HAVING expr | where_opt ::= WHERE expr
            // | when_clause ::= WHEN expr | key_opt ::= KEY expr
            SemanticValue::Expr(rhs.expr_span(1).expr)
        }
        Rule::CaseElse1 => {
            // case_else ::= ELSE expr
            SemanticValue::Expr(rhs.expr_span(1).expr)
        }
        Rule::CaseOperand1 => {
            // case_operand ::= expr
            SemanticValue::Expr(rhs.expr_span(0).expr)
        }
        Rule::IndexedOpt1 => {
            // indexed_opt ::=
            SemanticValue::Indexed(crate::ast::Indexed::Unspecified)
        }
        Rule::IndexedOpt2 => {
            // indexed_opt ::= INDEXED BY nm
            let name = rhs.token(2);
            SemanticValue::Indexed(crate::ast::Indexed::By(name.text))
        }
        Rule::IndexedOpt3 => {
            // indexed_opt ::= NOT INDEXED
            SemanticValue::Indexed(crate::ast::Indexed::NotIndexed)
        }
        Rule::UsingOpt1 => {
            // using_opt ::= USING LP inscollist RP
            SemanticValue::IdList(rhs.id_list(2))
        }
        Rule::UsingOpt2 | Rule::InscollistOpt1 => {
            // using_opt ::= | inscollist_opt ::=
            SemanticValue::IdList(None)
        }
        Rule::OrderbyOpt2 => {
            // orderby_opt ::= ORDER BY sortlist
            SemanticValue::ExprList(rhs.expr_list(2))
        }
        Rule::Sortlist1 => {
            // sortlist ::= sortlist COMMA expr sortorder
            let list = rhs.expr_list(0);
            let e = rhs.expr_span(2);
            let sort = rhs.sort(3);
            let mut list = exprlist_append(list, e.expr);
            if let Some(item) = list.last_mut() {
                item.sort_order = sort;
            }
            SemanticValue::ExprList(Some(list))
        }
        Rule::Sortlist2 => {
            // sortlist ::= expr sortorder
            let e = rhs.expr_span(0);
            let sort = rhs.sort(1);
            let mut list = exprlist_append(None, e.expr);
            if let Some(item) = list.last_mut() {
                item.sort_order = sort;
            }
            SemanticValue::ExprList(Some(list))
        }
        Rule::Sortorder1 | Rule::Sortorder3 => {
            // sortorder ::= ASC | sortorder ::=
            SemanticValue::Sort(SortOrder::Asc)
        }
        Rule::Sortorder2 => {
            // sortorder ::= DESC
            SemanticValue::Sort(SortOrder::Desc)
        }
        Rule::GroupbyOpt2 => {
            // groupby_opt ::= GROUP BY nexprlist
            SemanticValue::ExprList(rhs.expr_list(2))
        }
        Rule::LimitOpt1 => {
            // limit_opt ::=
            SemanticValue::Limit(LimitVal::default())
        }
        Rule::LimitOpt2 => {
            // limit_opt ::= LIMIT expr
            SemanticValue::Limit(LimitVal {
                limit: rhs.expr_span(1).expr,
                offset: None,
            })
        }
        Rule::LimitOpt3 => {
            // limit_opt ::= LIMIT expr OFFSET expr
            SemanticValue::Limit(LimitVal {
                limit: rhs.expr_span(1).expr,
                offset: rhs.expr_span(3).expr,
            })
        }
        Rule::LimitOpt4 => {
            // limit_opt ::= LIMIT expr COMMA expr
            SemanticValue::Limit(LimitVal {
                offset: rhs.expr_span(1).expr,
                limit: rhs.expr_span(3).expr,
            })
        }
        Rule::Cmd13 => {
            // cmd ::= DELETE FROM fullname indexed_opt where_opt
            let mut target = rhs.src_list(2).unwrap_or_default();
            let indexed = rhs.indexed(3);
            let where_clause = rhs.expr(4);
            srclist_indexed_by(&mut target, indexed);
            b.delete_from(target, where_clause);
            SemanticValue::Unit
        }
        Rule::Cmd14 => {
            // cmd ::= UPDATE orconf fullname indexed_opt SET setlist where_opt
            let or_conflict = rhs.resolve(1);
            let mut target = rhs.src_list(2).unwrap_or_default();
            let indexed = rhs.indexed(3);
            let set_list = rhs.expr_list(5).unwrap_or_default();
            let where_clause = rhs.expr(6);
            srclist_indexed_by(&mut target, indexed);
            b.update(target, set_list, where_clause, or_conflict);
            SemanticValue::Unit
        }
        Rule::Setlist1 => {
            // setlist ::= setlist COMMA nm EQ expr
            let list = rhs.expr_list(0);
            let name = rhs.token(2);
            let e = rhs.expr_span(4);
            let mut list = exprlist_append(list, e.expr);
            exprlist_set_name(&mut list, &name);
            SemanticValue::ExprList(Some(list))
        }
        Rule::Setlist2 => {
            // setlist ::= nm EQ expr
            let name = rhs.token(0);
            let e = rhs.expr_span(2);
            let mut list = exprlist_append(None, e.expr);
            exprlist_set_name(&mut list, &name);
            SemanticValue::ExprList(Some(list))
        }
        Rule::Cmd15 => {
            // cmd ::= insert_cmd INTO fullname inscollist_opt valuelist
            let or_conflict = rhs.resolve(0);
            let target = rhs.src_list(2).unwrap_or_default();
            let columns = rhs.id_list(3);
            let values = rhs.values(4);
            b.insert(target, columns, values.list, values.select, or_conflict);
            SemanticValue::Unit
        }
        Rule::Cmd16 => {
            // cmd ::= insert_cmd INTO fullname inscollist_opt select
            let or_conflict = rhs.resolve(0);
            let target = rhs.src_list(2).unwrap_or_default();
            let columns = rhs.id_list(3);
            let select = rhs.select(4);
            b.insert(target, columns, None, select, or_conflict);
            SemanticValue::Unit
        }
        Rule::Cmd17 => {
            // cmd ::= insert_cmd INTO fullname inscollist_opt DEFAULT VALUES
            let or_conflict = rhs.resolve(0);
            let target = rhs.src_list(2).unwrap_or_default();
            let columns = rhs.id_list(3);
            b.insert(target, columns, None, None, or_conflict);
            SemanticValue::Unit
        }
        Rule::InsertCmd1 => {
            // insert_cmd ::= INSERT orconf
            SemanticValue::Resolve(rhs.resolve(1))
        }
        Rule::InsertCmd2 => {
            // insert_cmd ::= REPLACE
            SemanticValue::Resolve(ResolveType::Replace)
        }
        Rule::Valuelist1 => {
            // valuelist ::= VALUES LP nexprlist RP
            SemanticValue::Values(ValueList {
                list: rhs.expr_list(2),
                select: None,
            })
        }
        Rule::Valuelist2 => {
            // valuelist ::= valuelist COMMA LP exprlist RP
            // A second VALUES row converts the clause into a compound
            // UNION ALL select flagged as a VALUES source.
            let mut prev = rhs.values(0);
            let row = rhs.expr_list(3);
            let mut right = Select::new(
                row,
                None,
                None,
                None,
                None,
                None,
                SelectFlags::empty(),
                None,
                None,
            );
            if prev.list.is_some() {
                let first = Select::new(
                    prev.list.take(),
                    None,
                    None,
                    None,
                    None,
                    None,
                    SelectFlags::empty(),
                    None,
                    None,
                );
                prev.select = Some(Box::new(first));
            }
            let select = match prev.select.take() {
                Some(mut prior) => {
                    right.op = CompoundOp::UnionAll;
                    right.flags |= SelectFlags::VALUES;
                    prior.flags |= SelectFlags::VALUES;
                    right.prior = Some(prior);
                    Some(Box::new(right))
                }
                None => None,
            };
            SemanticValue::Values(ValueList { list: None, select })
        }
        Rule::InscollistOpt2 => {
            // inscollist_opt ::= LP inscollist RP
            SemanticValue::IdList(rhs.id_list(1))
        }
        Rule::Inscollist1 => {
            // inscollist ::= inscollist COMMA nm
            let mut list = rhs.id_list(0).unwrap_or_default();
            list.push(rhs.token(2).text);
            SemanticValue::IdList(Some(list))
        }
        Rule::Inscollist2 => {
            // inscollist ::= nm
            SemanticValue::IdList(Some(vec![rhs.token(0).text]))
        }
        Rule::Expr1 => {
            // expr ::= term
            SemanticValue::ExprSpan(rhs.expr_span(0))
        }
        Rule::Expr2 => {
            // expr ::= LP expr RP
            let lp = rhs.token(0);
            let mut e = rhs.expr_span(1);
            let rp = rhs.token(2);
            e.span = lp.span.cover(rp.span);
            SemanticValue::ExprSpan(e)
        }
        Rule::Term1 | Rule::Term2 | Rule::Term3 => {
            // term ::= NULL | term ::= INTEGER|FLOAT|BLOB | term ::= STRING
            let t = rhs.token(0);
            SemanticValue::ExprSpan(span_expr(b, ExprOp::literal(t.kind), &t))
        }
        Rule::Expr3 | Rule::Expr4 => {
            // expr ::= id | expr ::= JOIN_KW
            let t = rhs.token(0);
            SemanticValue::ExprSpan(span_expr(b, ExprOp::Id, &t))
        }
        Rule::Expr5 => {
            // expr ::= nm DOT nm
            let n1 = rhs.token(0);
            let n2 = rhs.token(2);
            let left = b.expr(Expr::from_token(ExprOp::Id, &n1));
            let right = b.expr(Expr::from_token(ExprOp::Id, &n2));
            let span = n1.span.cover(n2.span);
            let expr = b.expr(Expr {
                op: ExprOp::Dot,
                left,
                right,
                span,
                ..Expr::default()
            });
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr6 => {
            // expr ::= nm DOT nm DOT nm
            let n1 = rhs.token(0);
            let n2 = rhs.token(2);
            let n3 = rhs.token(4);
            let t1 = b.expr(Expr::from_token(ExprOp::Id, &n1));
            let t2 = b.expr(Expr::from_token(ExprOp::Id, &n2));
            let t3 = b.expr(Expr::from_token(ExprOp::Id, &n3));
            let inner_span = n2.span.cover(n3.span);
            let inner = b.expr(Expr {
                op: ExprOp::Dot,
                left: t2,
                right: t3,
                span: inner_span,
                ..Expr::default()
            });
            let span = n1.span.cover(n3.span);
            let expr = b.expr(Expr {
                op: ExprOp::Dot,
                left: t1,
                right: inner,
                span,
                ..Expr::default()
            });
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr7 => {
            // expr ::= REGISTER
            // Register references are only meaningful inside a nested parse.
            let t = rhs.token(0);
            if b.is_nested() {
                SemanticValue::ExprSpan(span_expr(b, ExprOp::Register, &t))
            } else {
                b.report_error(format!("near \"{}\": syntax error", t.text), Some(t.span));
                SemanticValue::ExprSpan(ExprSpan {
                    expr: None,
                    span: t.span,
                })
            }
        }
        Rule::Expr8 => {
            // expr ::= VARIABLE
            let t = rhs.token(0);
            let mut e = Expr::from_token(ExprOp::Variable, &t);
            b.assign_variable_number(&mut e);
            SemanticValue::ExprSpan(ExprSpan {
                expr: b.expr(e),
                span: t.span,
            })
        }
        Rule::Expr9 => {
            // expr ::= expr COLLATE ids
            let operand = rhs.expr_span(0);
            let name = rhs.token(2);
            let span = operand.span.cover(name.span);
            let expr = b.expr(Expr {
                op: ExprOp::Collate,
                left: operand.expr,
                token: Some(name.text),
                span,
                ..Expr::default()
            });
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr10 => {
            // expr ::= CAST LP expr AS typetoken RP
            let cast = rhs.token(0);
            let operand = rhs.expr_span(2);
            let ty = rhs.token(4);
            let rp = rhs.token(5);
            let span = cast.span.cover(rp.span);
            let expr = b.expr(Expr {
                op: ExprOp::Cast,
                left: operand.expr,
                token: Some(ty.text),
                span,
                ..Expr::default()
            });
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr11 => {
            // expr ::= ID LP distinct exprlist RP
            let name = rhs.token(0);
            let distinct = rhs.flag(2);
            let args = rhs.expr_list(3);
            let rp = rhs.token(4);
            let span = name.span.cover(rp.span);
            let mut e = Expr {
                op: ExprOp::Function,
                token: Some(name.text),
                list: args,
                span,
                ..Expr::default()
            };
            if distinct {
                e.flags |= ExprFlags::DISTINCT;
            }
            SemanticValue::ExprSpan(ExprSpan {
                expr: b.expr(e),
                span,
            })
        }
        Rule::Expr12 => {
            // expr ::= ID LP STAR RP
            let name = rhs.token(0);
            let rp = rhs.token(3);
            let span = name.span.cover(rp.span);
            let expr = b.expr(Expr {
                op: ExprOp::Function,
                token: Some(name.text),
                span,
                ..Expr::default()
            });
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Term4 => {
            // term ::= CTIME_KW
            // CURRENT_TIME and friends parse as constant-valued functions.
            let t = rhs.token(0);
            SemanticValue::ExprSpan(span_expr(b, ExprOp::ConstFunc, &t))
        }
        Rule::Expr13 | Rule::Expr14 | Rule::Expr15 | Rule::Expr16 | Rule::Expr17
        | Rule::Expr18 | Rule::Expr19 | Rule::Expr20 => {
            // expr ::= expr AND expr | expr ::= expr OR expr
            // | expr ::= expr LT|GT|GE|LE expr | expr ::= expr EQ|NE expr
            // | expr ::= expr BITAND|BITOR|LSHIFT|RSHIFT expr
            // | expr ::= expr PLUS|MINUS expr | expr ::= expr STAR|SLASH|REM expr
            // | expr ::= expr CONCAT expr
            let left = rhs.expr_span(0);
            let op = rhs.token(1);
            let right = rhs.expr_span(2);
            SemanticValue::ExprSpan(span_binary(b, ExprOp::binary(op.kind), left, right))
        }
        Rule::Likeop1 | Rule::Likeop3 => {
            // likeop ::= LIKE_KW | likeop ::= MATCH
            SemanticValue::Like(LikeOp {
                operator: rhs.token(0),
                not: false,
            })
        }
        Rule::Likeop2 | Rule::Likeop4 => {
            // likeop ::= NOT LIKE_KW | likeop ::= NOT MATCH
            SemanticValue::Like(LikeOp {
                operator: rhs.token(1),
                not: true,
            })
        }
        Rule::Expr21 => {
            // expr ::= expr likeop expr
            let left = rhs.expr_span(0);
            let like = rhs.like(1);
            let right = rhs.expr_span(2);
            let span = left.span.cover(right.span);
            let mut list = exprlist_append(None, right.expr);
            list = exprlist_append(Some(list), left.expr);
            let mut expr = b.expr(Expr {
                op: ExprOp::Function,
                token: Some(like.operator.text),
                list: Some(list),
                span,
                ..Expr::default()
            });
            if like.not {
                expr = b.expr(Expr {
                    op: ExprOp::Not,
                    left: expr,
                    span,
                    ..Expr::default()
                });
            }
            if let Some(e) = expr.as_mut() {
                e.flags |= ExprFlags::INFIX_FUNC;
            }
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr22 => {
            // expr ::= expr likeop expr ESCAPE expr
            let left = rhs.expr_span(0);
            let like = rhs.like(1);
            let pattern = rhs.expr_span(2);
            let escape = rhs.expr_span(4);
            let span = left.span.cover(escape.span);
            let mut list = exprlist_append(None, pattern.expr);
            list = exprlist_append(Some(list), left.expr);
            list = exprlist_append(Some(list), escape.expr);
            let mut expr = b.expr(Expr {
                op: ExprOp::Function,
                token: Some(like.operator.text),
                list: Some(list),
                span,
                ..Expr::default()
            });
            if like.not {
                expr = b.expr(Expr {
                    op: ExprOp::Not,
                    left: expr,
                    span,
                    ..Expr::default()
                });
            }
            if let Some(e) = expr.as_mut() {
                e.flags |= ExprFlags::INFIX_FUNC;
            }
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr23 => {
            // expr ::= expr ISNULL|NOTNULL
            let operand = rhs.expr_span(0);
            let op = rhs.token(1);
            SemanticValue::ExprSpan(span_unary_postfix(
                b,
                ExprOp::null_test(op.kind),
                operand,
                &op,
            ))
        }
        Rule::Expr24 => {
            // expr ::= expr NOT NULL
            let operand = rhs.expr_span(0);
            let null = rhs.token(2);
            SemanticValue::ExprSpan(span_unary_postfix(b, ExprOp::NotNull, operand, &null))
        }
        Rule::Expr25 => {
            // expr ::= expr IS expr
            let left = rhs.expr_span(0);
            let right = rhs.expr_span(2);
            let mut out = span_binary(b, ExprOp::Is, left, right);
            binary_to_unary_if_null(&mut out, ExprOp::IsNull);
            SemanticValue::ExprSpan(out)
        }
        Rule::Expr26 => {
            // expr ::= expr IS NOT expr
            let left = rhs.expr_span(0);
            let right = rhs.expr_span(3);
            let mut out = span_binary(b, ExprOp::IsNot, left, right);
            binary_to_unary_if_null(&mut out, ExprOp::NotNull);
            SemanticValue::ExprSpan(out)
        }
        Rule::Expr27 => {
            // expr ::= NOT expr
            let op = rhs.token(0);
            let operand = rhs.expr_span(1);
            SemanticValue::ExprSpan(span_unary_prefix(b, ExprOp::Not, operand, &op))
        }
        Rule::Expr28 => {
            // expr ::= BITNOT expr
            let op = rhs.token(0);
            let operand = rhs.expr_span(1);
            SemanticValue::ExprSpan(span_unary_prefix(b, ExprOp::BitNot, operand, &op))
        }
        Rule::Expr29 => {
            // expr ::= MINUS expr
            let op = rhs.token(0);
            let operand = rhs.expr_span(1);
            SemanticValue::ExprSpan(span_unary_prefix(b, ExprOp::UMinus, operand, &op))
        }
        Rule::Expr30 => {
            // expr ::= PLUS expr
            let op = rhs.token(0);
            let operand = rhs.expr_span(1);
            SemanticValue::ExprSpan(span_unary_prefix(b, ExprOp::UPlus, operand, &op))
        }
        Rule::Expr31 => {
            // expr ::= expr between_op expr AND expr
            let left = rhs.expr_span(0);
            let not = rhs.flag(1);
            let lo = rhs.expr_span(2);
            let hi = rhs.expr_span(4);
            let span = left.span.cover(hi.span);
            let mut list = exprlist_append(None, lo.expr);
            list = exprlist_append(Some(list), hi.expr);
            let mut expr = b.expr(Expr {
                op: ExprOp::Between,
                left: left.expr,
                list: Some(list),
                span,
                ..Expr::default()
            });
            if not {
                expr = b.expr(Expr {
                    op: ExprOp::Not,
                    left: expr,
                    span,
                    ..Expr::default()
                });
            }
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr32 => {
            // expr ::= expr in_op LP exprlist RP
            let left = rhs.expr_span(0);
            let not = rhs.flag(1);
            let list = rhs.expr_list(3);
            let rp = rhs.token(4);
            let span = left.span.cover(rp.span);
            let expr = match list {
                None => {
                    // `expr IN ()` is constant false (true when negated),
                    // regardless of the left operand.
                    drop(left.expr);
                    b.expr(Expr {
                        op: ExprOp::Integer,
                        token: Some(if not { "1" } else { "0" }.into()),
                        span,
                        ..Expr::default()
                    })
                }
                Some(list) => {
                    let mut e = b.expr(Expr {
                        op: ExprOp::In,
                        left: left.expr,
                        list: Some(list),
                        span,
                        ..Expr::default()
                    });
                    if not {
                        e = b.expr(Expr {
                            op: ExprOp::Not,
                            left: e,
                            span,
                            ..Expr::default()
                        });
                    }
                    e
                }
            };
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr33 => {
            // expr ::= LP select RP
            let lp = rhs.token(0);
            let select = rhs.select(1);
            let rp = rhs.token(2);
            let span = lp.span.cover(rp.span);
            let expr = b.expr(Expr {
                op: ExprOp::Select,
                select,
                span,
                ..Expr::default()
            });
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr34 => {
            // expr ::= expr in_op LP select RP
            let left = rhs.expr_span(0);
            let not = rhs.flag(1);
            let select = rhs.select(3);
            let rp = rhs.token(4);
            let span = left.span.cover(rp.span);
            let mut expr = b.expr(Expr {
                op: ExprOp::In,
                left: left.expr,
                select,
                span,
                ..Expr::default()
            });
            if not {
                expr = b.expr(Expr {
                    op: ExprOp::Not,
                    left: expr,
                    span,
                    ..Expr::default()
                });
            }
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr35 => {
            // expr ::= expr in_op nm dbnm
            let left = rhs.expr_span(0);
            let not = rhs.flag(1);
            let name = rhs.token(2);
            let db = rhs.token(3);
            let src = srclist_append(None, &name, &db);
            let end = if db.is_empty() { name.span } else { db.span };
            let span = left.span.cover(end);
            let subquery = Select::new(
                None,
                Some(src),
                None,
                None,
                None,
                None,
                SelectFlags::empty(),
                None,
                None,
            );
            let mut expr = b.expr(Expr {
                op: ExprOp::In,
                left: left.expr,
                select: Some(Box::new(subquery)),
                span,
                ..Expr::default()
            });
            if not {
                expr = b.expr(Expr {
                    op: ExprOp::Not,
                    left: expr,
                    span,
                    ..Expr::default()
                });
            }
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr36 => {
            // expr ::= EXISTS LP select RP
            let exists = rhs.token(0);
            let select = rhs.select(2);
            let rp = rhs.token(3);
            let span = exists.span.cover(rp.span);
            let expr = b.expr(Expr {
                op: ExprOp::Exists,
                select,
                span,
                ..Expr::default()
            });
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr37 => {
            // expr ::= CASE case_operand case_exprlist case_else END
            let case = rhs.token(0);
            let operand = rhs.expr(1);
            let arms = rhs.expr_list(2);
            let else_clause = rhs.expr(3);
            let end = rhs.token(4);
            let span = case.span.cover(end.span);
            let list = match else_clause {
                Some(e) => exprlist_append(arms, Some(e)),
                None => arms.unwrap_or_default(),
            };
            let expr = b.expr(Expr {
                op: ExprOp::Case,
                left: operand,
                list: Some(list),
                span,
                ..Expr::default()
            });
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::CaseExprlist1 => {
            // case_exprlist ::= case_exprlist WHEN expr THEN expr
            let list = rhs.expr_list(0);
            let when = rhs.expr_span(2);
            let then = rhs.expr_span(4);
            let list = exprlist_append(list, when.expr);
            SemanticValue::ExprList(Some(exprlist_append(Some(list), then.expr)))
        }
        Rule::CaseExprlist2 => {
            // case_exprlist ::= WHEN expr THEN expr
            let when = rhs.expr_span(1);
            let then = rhs.expr_span(3);
            let list = exprlist_append(None, when.expr);
            SemanticValue::ExprList(Some(exprlist_append(Some(list), then.expr)))
        }
        Rule::Exprlist1 => {
            // exprlist ::= nexprlist
            SemanticValue::ExprList(rhs.expr_list(0))
        }
        Rule::Nexprlist1 => {
            // nexprlist ::= nexprlist COMMA expr
            let list = rhs.expr_list(0);
            let e = rhs.expr_span(2);
            SemanticValue::ExprList(Some(exprlist_append(list, e.expr)))
        }
        Rule::Nexprlist2 => {
            // nexprlist ::= expr
            let e = rhs.expr_span(0);
            SemanticValue::ExprList(Some(exprlist_append(None, e.expr)))
        }
        Rule::Cmd18 => {
            // cmd ::= createkw uniqueflag INDEX ifnotexists nm dbnm
            //         ON nm LP idxlist RP where_opt
            let start = rhs.token(0);
            let unique = rhs.resolve(1);
            let if_not_exists = rhs.flag(3);
            let name = rhs.token(4);
            let db = rhs.token(5);
            let table = rhs.token(7);
            let columns = rhs.expr_list(9);
            let where_clause = rhs.expr(11);
            let table = srclist_append(None, &table, &Token::default());
            b.create_index(
                &name,
                &db,
                table,
                columns,
                unique,
                &start,
                where_clause,
                if_not_exists,
            );
            SemanticValue::Unit
        }
        Rule::Uniqueflag1 | Rule::Raisetype2 => {
            // uniqueflag ::= UNIQUE | raisetype ::= ABORT
            SemanticValue::Resolve(ResolveType::Abort)
        }
        Rule::Uniqueflag2 => {
            // uniqueflag ::=
            SemanticValue::Resolve(ResolveType::None)
        }
        Rule::IdxlistOpt2 => {
            // idxlist_opt ::= LP idxlist RP
            SemanticValue::ExprList(rhs.expr_list(1))
        }
        Rule::Idxlist1 => {
            // idxlist ::= idxlist COMMA nm collate sortorder
            let list = rhs.expr_list(0);
            let name = rhs.token(2);
            let collate = rhs.token(3);
            let sort = rhs.sort(4);
            let e = if collate.is_empty() {
                None
            } else {
                b.expr(Expr {
                    op: ExprOp::Collate,
                    token: Some(collate.text),
                    span: collate.span,
                    ..Expr::default()
                })
            };
            let mut list = exprlist_append(list, e);
            exprlist_set_name(&mut list, &name);
            if let Some(item) = list.last_mut() {
                item.sort_order = sort;
            }
            SemanticValue::ExprList(Some(list))
        }
        Rule::Idxlist2 => {
            // idxlist ::= nm collate sortorder
            let name = rhs.token(0);
            let collate = rhs.token(1);
            let sort = rhs.sort(2);
            let e = if collate.is_empty() {
                None
            } else {
                b.expr(Expr {
                    op: ExprOp::Collate,
                    token: Some(collate.text),
                    span: collate.span,
                    ..Expr::default()
                })
            };
            let mut list = exprlist_append(None, e);
            exprlist_set_name(&mut list, &name);
            if let Some(item) = list.last_mut() {
                item.sort_order = sort;
            }
            SemanticValue::ExprList(Some(list))
        }
        Rule::Cmd19 => {
            // cmd ::= DROP INDEX ifexists fullname
            let if_exists = rhs.flag(2);
            let name = rhs.src_list(3).unwrap_or_default();
            b.drop_index(name, if_exists);
            SemanticValue::Unit
        }
        Rule::Cmd20 | Rule::Cmd21 => {
            // cmd ::= VACUUM | cmd ::= VACUUM nm
            b.vacuum();
            SemanticValue::Unit
        }
        Rule::Cmd22 => {
            // cmd ::= PRAGMA nm dbnm
            let name = rhs.token(1);
            let db = rhs.token(2);
            b.pragma(&name, &db, None, false);
            SemanticValue::Unit
        }
        Rule::Cmd23 | Rule::Cmd24 => {
            // cmd ::= PRAGMA nm dbnm EQ nmnum | cmd ::= PRAGMA nm dbnm LP nmnum RP
            let name = rhs.token(1);
            let db = rhs.token(2);
            let value = rhs.token(4);
            b.pragma(&name, &db, Some(&value), false);
            SemanticValue::Unit
        }
        Rule::Cmd25 | Rule::Cmd26 => {
            // cmd ::= PRAGMA nm dbnm EQ minus_num
            // | cmd ::= PRAGMA nm dbnm LP minus_num RP
            let name = rhs.token(1);
            let db = rhs.token(2);
            let value = rhs.token(4);
            b.pragma(&name, &db, Some(&value), true);
            SemanticValue::Unit
        }
        Rule::Cmd27 => {
            // cmd ::= createkw trigger_decl BEGIN trigger_cmd_list END
            let start = rhs.token(0);
            let steps = rhs.trig_steps(3);
            let end = rhs.token(4);
            b.finish_trigger(steps, start.span.cover(end.span));
            SemanticValue::Unit
        }
        Rule::TriggerDecl => {
            // trigger_decl ::= temp TRIGGER ifnotexists nm dbnm trigger_time
            //                  trigger_event ON fullname foreach_clause when_clause
            let temp = rhs.flag(0);
            let if_not_exists = rhs.flag(2);
            let name = rhs.token(3);
            let db = rhs.token(4);
            let time = rhs.trig_time(5);
            let event = rhs.trig_event(6);
            let table = rhs.src_list(8).unwrap_or_default();
            let when = rhs.expr(10);
            b.begin_trigger(&name, &db, time, event, table, when, temp, if_not_exists);
            let named = if db.is_empty() { name } else { db };
            SemanticValue::Token(named)
        }
        Rule::TriggerTime1 | Rule::TriggerTime4 => {
            // trigger_time ::= BEFORE | trigger_time ::=
            SemanticValue::TrigTime(TriggerTime::Before)
        }
        Rule::TriggerTime2 => {
            // trigger_time ::= AFTER
            SemanticValue::TrigTime(TriggerTime::After)
        }
        Rule::TriggerTime3 => {
            // trigger_time ::= INSTEAD OF
            SemanticValue::TrigTime(TriggerTime::InsteadOf)
        }
        Rule::TriggerEvent1 => {
            // trigger_event ::= DELETE|INSERT
            let kind = match rhs.token(0).kind {
                TokenType::Delete => TriggerEventKind::Delete,
                TokenType::Insert => TriggerEventKind::Insert,
                other => unreachable!("bad trigger event terminal {other:?}"),
            };
            SemanticValue::TrigEvent(TrigEvent {
                kind,
                columns: None,
            })
        }
        Rule::TriggerEvent2 => {
            // trigger_event ::= UPDATE
            SemanticValue::TrigEvent(TrigEvent {
                kind: TriggerEventKind::Update,
                columns: None,
            })
        }
        Rule::TriggerEvent3 => {
            // trigger_event ::= UPDATE OF inscollist
            let columns = rhs.id_list(2);
            SemanticValue::TrigEvent(TrigEvent {
                kind: TriggerEventKind::Update,
                columns,
            })
        }
        Rule::TriggerCmdList1 => {
            // trigger_cmd_list ::= trigger_cmd_list trigger_cmd SEMI
            let mut steps = rhs.trig_steps(0);
            if let Some(step) = rhs.trig_step(1) {
                steps.push(step);
            }
            SemanticValue::TrigSteps(steps)
        }
        Rule::TriggerCmdList2 => {
            // trigger_cmd_list ::= trigger_cmd SEMI
            let steps = rhs.trig_step(0).into_iter().collect();
            SemanticValue::TrigSteps(steps)
        }
        Rule::Trnm2 => {
            // trnm ::= nm DOT nm
            let name = rhs.token(2);
            b.report_error(
                "qualified table names are not allowed on INSERT, UPDATE, and DELETE \
                 statements within triggers"
                    .to_owned(),
                Some(name.span),
            );
            SemanticValue::Token(name)
        }
        Rule::Tridxby2 => {
            // tridxby ::= INDEXED BY nm
            let name = rhs.token(2);
            b.report_error(
                "the INDEXED BY clause is not allowed on UPDATE or DELETE statements \
                 within triggers"
                    .to_owned(),
                Some(name.span),
            );
            SemanticValue::Unit
        }
        Rule::Tridxby3 => {
            // tridxby ::= NOT INDEXED
            let t = rhs.token(1);
            b.report_error(
                "the NOT INDEXED clause is not allowed on UPDATE or DELETE statements \
                 within triggers"
                    .to_owned(),
                Some(t.span),
            );
            SemanticValue::Unit
        }
        Rule::TriggerCmd1 => {
            // trigger_cmd ::= UPDATE orconf trnm tridxby SET setlist where_opt
            let or_conflict = rhs.resolve(1);
            let target = rhs.token(2);
            let set_list = rhs.expr_list(5).unwrap_or_default();
            let where_clause = rhs.expr(6);
            SemanticValue::TrigStep(Some(TriggerStep::Update {
                target: target.text,
                set_list,
                where_clause,
                or_conflict,
            }))
        }
        Rule::TriggerCmd2 => {
            // trigger_cmd ::= insert_cmd INTO trnm inscollist_opt valuelist
            let or_conflict = rhs.resolve(0);
            let target = rhs.token(2);
            let columns = rhs.id_list(3);
            let values = rhs.values(4);
            SemanticValue::TrigStep(Some(TriggerStep::Insert {
                target: target.text,
                columns,
                values: values.list,
                select: values.select,
                or_conflict,
            }))
        }
        Rule::TriggerCmd3 => {
            // trigger_cmd ::= insert_cmd INTO trnm inscollist_opt select
            let or_conflict = rhs.resolve(0);
            let target = rhs.token(2);
            let columns = rhs.id_list(3);
            let select = rhs.select(4);
            SemanticValue::TrigStep(Some(TriggerStep::Insert {
                target: target.text,
                columns,
                values: None,
                select,
                or_conflict,
            }))
        }
        Rule::TriggerCmd4 => {
            // trigger_cmd ::= DELETE FROM trnm tridxby where_opt
            let target = rhs.token(2);
            let where_clause = rhs.expr(4);
            SemanticValue::TrigStep(Some(TriggerStep::Delete {
                target: target.text,
                where_clause,
            }))
        }
        Rule::TriggerCmd5 => {
            // trigger_cmd ::= select
            SemanticValue::TrigStep(Some(TriggerStep::Select(rhs.select(0))))
        }
        Rule::Expr38 => {
            // expr ::= RAISE LP IGNORE RP
            let raise = rhs.token(0);
            let rp = rhs.token(3);
            let span = raise.span.cover(rp.span);
            let expr = b.expr(Expr {
                op: ExprOp::Raise,
                on_conflict: Some(ResolveType::Ignore),
                span,
                ..Expr::default()
            });
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Expr39 => {
            // expr ::= RAISE LP raisetype COMMA nm RP
            let raise = rhs.token(0);
            let ty = rhs.resolve(2);
            let message = rhs.token(4);
            let rp = rhs.token(5);
            let span = raise.span.cover(rp.span);
            let expr = b.expr(Expr {
                op: ExprOp::Raise,
                token: Some(message.text),
                on_conflict: Some(ty),
                span,
                ..Expr::default()
            });
            SemanticValue::ExprSpan(ExprSpan { expr, span })
        }
        Rule::Raisetype1 => SemanticValue::Resolve(ResolveType::Rollback), // raisetype ::= ROLLBACK
        Rule::Raisetype3 => SemanticValue::Resolve(ResolveType::Fail),     // raisetype ::= FAIL
        Rule::Cmd28 => {
            // cmd ::= DROP TRIGGER ifexists fullname
            let if_exists = rhs.flag(2);
            let name = rhs.src_list(3).unwrap_or_default();
            b.drop_trigger(name, if_exists);
            SemanticValue::Unit
        }
        Rule::Cmd29 => {
            // cmd ::= ATTACH database_kw_opt expr AS expr key_opt
            let file = rhs.expr_span(2);
            let db = rhs.expr_span(4);
            let key = rhs.expr(5);
            b.attach(file.expr, db.expr, key);
            SemanticValue::Unit
        }
        Rule::Cmd30 => {
            // cmd ::= DETACH database_kw_opt expr
            let db = rhs.expr_span(2);
            b.detach(db.expr);
            SemanticValue::Unit
        }
        Rule::Cmd31 => {
            // cmd ::= REINDEX
            b.reindex(None, None);
            SemanticValue::Unit
        }
        Rule::Cmd32 => {
            // cmd ::= REINDEX nm dbnm
            let name = rhs.token(1);
            let db = rhs.token(2);
            b.reindex(Some(&name), Some(&db));
            SemanticValue::Unit
        }
        Rule::Cmd33 => {
            // cmd ::= ANALYZE
            b.analyze(None, None);
            SemanticValue::Unit
        }
        Rule::Cmd34 => {
            // cmd ::= ANALYZE nm dbnm
            let name = rhs.token(1);
            let db = rhs.token(2);
            b.analyze(Some(&name), Some(&db));
            SemanticValue::Unit
        }
        Rule::Cmd35 => {
            // cmd ::= ALTER TABLE fullname RENAME TO nm
            let target = rhs.src_list(2).unwrap_or_default();
            let new_name = rhs.token(5);
            b.alter_rename_table(target, &new_name);
            SemanticValue::Unit
        }
        Rule::Cmd36 => {
            // cmd ::= ALTER TABLE add_column_fullname ADD kwcolumn_opt column
            let column_def = rhs.token(5);
            b.alter_finish_add_column(&column_def);
            SemanticValue::Unit
        }
        Rule::AddColumnFullname => {
            // add_column_fullname ::= fullname
            let target = rhs.src_list(0).unwrap_or_default();
            b.alter_begin_add_column(target);
            SemanticValue::Unit
        }
        Rule::Cmd37 => {
            // cmd ::= create_vtab
            b.vtab_finish(None);
            SemanticValue::Unit
        }
        Rule::Cmd38 => {
            // cmd ::= create_vtab LP vtabarglist RP
            let rp = rhs.token(3);
            b.vtab_finish(Some(&rp));
            SemanticValue::Unit
        }
        Rule::CreateVtab => {
            // create_vtab ::= createkw VIRTUAL TABLE ifnotexists nm dbnm USING nm
            let if_not_exists = rhs.flag(3);
            let name = rhs.token(4);
            let db = rhs.token(5);
            let module = rhs.token(7);
            b.vtab_begin(&name, &db, &module, if_not_exists);
            SemanticValue::Unit
        }
        Rule::Vtabarg1 => {
            // vtabarg ::=
            b.vtab_arg_init();
            SemanticValue::Unit
        }
        Rule::Vtabargtoken1 | Rule::Lp => {
            // vtabargtoken ::= ANY | lp ::= LP
            let t = rhs.token(0);
            b.vtab_arg_extend(&t);
            SemanticValue::Unit
        }
        Rule::Vtabargtoken2 => {
            // vtabargtoken ::= lp anylist RP
            let rp = rhs.token(2);
            b.vtab_arg_extend(&rp);
            SemanticValue::Unit
        }
        Rule::Input | Rule::Cmdlist1 | Rule::Cmdlist2 | Rule::Ecmd1 | Rule::Ecmd2
        | Rule::TransOpt1 | Rule::TransOpt2 | Rule::TransOpt3 | Rule::SavepointOpt1
        | Rule::SavepointOpt2 | Rule::Cmd8 | Rule::Columnlist1 | Rule::Columnlist2
        | Rule::Type1 | Rule::Signed1 | Rule::Signed2 | Rule::Carglist1 | Rule::Carglist2
        | Rule::Ccons7 | Rule::ConslistOpt1 | Rule::ConslistOpt2 | Rule::Conslist1
        | Rule::Conslist2 | Rule::Tconscomma2 | Rule::ForeachClause1 | Rule::ForeachClause2
        | Rule::Tridxby1 | Rule::DatabaseKwOpt1 | Rule::DatabaseKwOpt2 | Rule::KwcolumnOpt1
        | Rule::KwcolumnOpt2 | Rule::Vtabarglist1 | Rule::Vtabarglist2 | Rule::Vtabarg2
        | Rule::Anylist1 | Rule::Anylist2 | Rule::Anylist3 => {
            // input ::= cmdlist | cmdlist ::= ... | ecmd ::= ... | trans_opt ::= ...
            // | savepoint_opt ::= ... | cmd ::= create_table create_table_args
            // | columnlist ::= ... | type ::= | signed ::= ... | carglist ::= ...
            // | ccons ::= NULL onconf | conslist_opt ::= ... | conslist ::= ...
            // | tconscomma ::= | foreach_clause ::= ... | tridxby ::=
            // | database_kw_opt ::= ... | kwcolumn_opt ::= ... | vtabarglist ::= ...
            // | vtabarg ::= vtabarg vtabargtoken | anylist ::= ...
            // Popped values are dropped; no synthesized value.
            SemanticValue::Unit
        }
    }
}
