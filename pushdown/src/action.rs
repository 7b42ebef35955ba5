//! Automaton actions and parse status.

/// What the automaton does in response to a lookahead symbol in a state.
///
/// Decoded from the packed action tables; see
/// [`PackedTables`](crate::PackedTables).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Push the lookahead and enter the given state.
    Shift(u16),
    /// Replace the top RHS entries with the rule's LHS nonterminal.
    Reduce(u16),
    /// The start symbol has been recognized; the parse is complete.
    Accept,
    /// No action exists for this (state, lookahead) pair.
    Error,
}

/// Lifecycle of one parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    /// Accepting tokens.
    #[default]
    Running,
    /// The start symbol was reduced and end-of-input consumed.
    Accepted,
    /// A syntax error or overflow ended the parse; further input is ignored.
    Failed,
}
