//! Handcrafted packed tables for the runtime's own tests.
//!
//! `MINI` encodes the grammar
//!
//! ```text
//!   0: start ::= expr        (accept via the goto row of state 0)
//!   1: expr  ::= expr plus term
//!   2: expr  ::= term
//!   3: term  ::= num
//! ```
//!
//! with terminal `name` registered as a fallback for `num`, so driver tests
//! can exercise shift, reduce, accept, error, and fallback paths against a
//! real (if tiny) LALR automaton. `WILD` is a one-state table whose only
//! purpose is the wildcard lookup path.

use crate::{PackedTables, RuleDef};

/// Terminal codes shared by both fixtures.
pub mod term {
    pub const END: u16 = 0;
    pub const NUM: u16 = 1;
    pub const PLUS: u16 = 2;
    /// Falls back to [`NUM`] in `MINI`; unknown to `WILD`.
    pub const NAME: u16 = 3;
}

/// Nonterminal codes of `MINI`.
pub mod nt {
    pub const START: u16 = 4;
    pub const EXPR: u16 = 5;
    pub const TERM: u16 = 6;
}

/// States of `MINI`:
/// 0 initial; 1 after `expr`; 2 after `term`; 3 after `num`;
/// 4 after `expr plus`; 5 after `expr plus term`.
pub static MINI: PackedTables = PackedTables {
    n_states: 6,
    n_rules: 4,
    n_symbols: 7,
    terminal_bound: 4,
    wildcard: None,
    //                  0   1   2   3   4  5  6  7  8   9  10  11
    action: &[12, 12, 12, 12, 11, 1, 2, 3, 6, 12, 4, 5],
    lookahead: &[7, 7, 7, 7, 4, 5, 6, 1, 0, 7, 2, 6],
    shift_ofst: &[6, 8, -8, -8, 6, -8],
    shift_use_dflt: -8,
    reduce_ofst: &[0, -99, -99, -99, 5, -99],
    default_action: &[10, 10, 8, 9, 10, 7],
    fallback: &[0, 0, 0, term::NUM as u8],
    rules: &[
        RuleDef { lhs: nt::START, arity: 1 },
        RuleDef { lhs: nt::EXPR, arity: 3 },
        RuleDef { lhs: nt::EXPR, arity: 1 },
        RuleDef { lhs: nt::TERM, arity: 1 },
    ],
    symbol_names: &["$", "num", "plus", "name", "start", "expr", "term"],
    rule_names: &[
        "start ::= expr",
        "expr ::= expr plus term",
        "expr ::= term",
        "term ::= num",
    ],
};

/// One meaningful state: `plus` shifts directly, every other non-end
/// terminal resolves through the wildcard slot.
pub static WILD: PackedTables = PackedTables {
    n_states: 3,
    n_rules: 1,
    n_symbols: 5,
    terminal_bound: 4,
    wildcard: Some(3),
    action: &[6, 6, 1, 2],
    lookahead: &[5, 5, 2, 3],
    shift_ofst: &[0, -8, -8],
    shift_use_dflt: -8,
    reduce_ofst: &[-9, -9, -9],
    default_action: &[4, 4, 4],
    fallback: &[0, 0, 0, 0],
    rules: &[RuleDef { lhs: 4, arity: 1 }],
    symbol_names: &["$", "num", "plus", "any", "s"],
    rule_names: &["s ::= any"],
};
