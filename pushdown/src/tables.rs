//! Packed LALR(1) grammar tables and the lookup algorithm over them.
//!
//! The tables use the classic compressed encoding: all shift and goto rows
//! share one big `action` array, and each state stores an offset into it.
//! A slot only belongs to a state/symbol pair if the parallel `lookahead`
//! array confirms the symbol at `offset + symbol`; anything else is a hash
//! miss and degrades through the fallback token, the wildcard symbol, and
//! finally the state's unconditional default action. Lookups never allocate
//! and always resolve to *some* [`Action`].
//!
//! Action codes decode as: `code < n_states` is a shift to that state,
//! `code < n_states + n_rules` is a reduce by `code - n_states`, then the
//! error and accept codes follow.

use crate::Action;

/// One grammar rule: the produced nonterminal and how many stack entries
/// the reduction consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDef {
    /// Symbol code of the left-hand side nonterminal.
    pub lhs: u16,
    /// Number of right-hand side symbols.
    pub arity: u8,
}

/// Read-only precomputed tables for one grammar.
///
/// Instances are `'static` data emitted by a table generator and never
/// mutated during a parse, so they are freely shared between concurrent
/// parser instances.
pub struct PackedTables {
    /// Number of automaton states.
    pub n_states: u16,
    /// Number of grammar rules.
    pub n_rules: u16,
    /// One past the highest valid symbol code.
    pub n_symbols: u16,
    /// Symbol codes below this bound are terminals.
    pub terminal_bound: u16,
    /// Terminal that matches any otherwise-unresolvable lookahead, if the
    /// grammar defines one.
    pub wildcard: Option<u16>,
    /// Packed action codes, shared by shift and goto rows.
    pub action: &'static [u16],
    /// Symbol expected at each `action` slot; confirms row membership.
    pub lookahead: &'static [u8],
    /// Per-state offset into `action` for terminal lookups.
    pub shift_ofst: &'static [i16],
    /// Sentinel offset marking "this state only has its default action".
    pub shift_use_dflt: i16,
    /// Per-state offset into `action` for nonterminal (goto) lookups.
    pub reduce_ofst: &'static [i16],
    /// Unconditional default action per state.
    pub default_action: &'static [u16],
    /// Substitute terminal tried when the exact terminal has no action;
    /// zero means no fallback. Indexed by terminal code, may be shorter
    /// than the terminal range.
    pub fallback: &'static [u8],
    /// Rule metadata, indexed by rule number.
    pub rules: &'static [RuleDef],
    /// Display names for every symbol code.
    pub symbol_names: &'static [&'static str],
    /// Display form (`lhs ::= rhs...`) for every rule.
    pub rule_names: &'static [&'static str],
}

impl PackedTables {
    /// Action code meaning "syntax error".
    #[inline]
    fn error_code(&self) -> u16 {
        self.n_states + self.n_rules
    }

    /// Action code meaning "accept".
    #[inline]
    fn accept_code(&self) -> u16 {
        self.n_states + self.n_rules + 1
    }

    #[inline]
    fn decode(&self, code: u16) -> Action {
        if code < self.n_states {
            Action::Shift(code)
        } else if code < self.error_code() {
            Action::Reduce(code - self.n_states)
        } else if code == self.accept_code() {
            Action::Accept
        } else {
            // The explicit error code and the no-op filler both reject.
            Action::Error
        }
    }

    /// Resolves the action for a terminal lookahead in `state`.
    ///
    /// Misses retry through the fallback table (a more generic terminal
    /// class, typically mapping non-reserved keywords to plain identifiers),
    /// then the wildcard symbol, and finally the state's default action, so
    /// the driver always has an action to take.
    pub fn shift_action(&self, state: u16, terminal: u16) -> Action {
        debug_assert!(terminal < self.n_symbols);
        let mut terminal = terminal;
        loop {
            let ofst = match self.shift_ofst.get(state as usize) {
                Some(&o) if o != self.shift_use_dflt => o,
                _ => return self.decode(self.default_action[state as usize]),
            };
            let i = ofst as i32 + terminal as i32;
            if let Some(&la) = usize::try_from(i).ok().and_then(|i| self.lookahead.get(i)) {
                if u16::from(la) == terminal {
                    return self.decode(self.action[i as usize]);
                }
            }
            // Slot miss. The end-of-input terminal (code 0) never falls back.
            if terminal > 0 {
                if let Some(&fb) = self.fallback.get(terminal as usize) {
                    if fb != 0 {
                        log::trace!(
                            "FALLBACK {} => {}",
                            self.symbol_name(terminal),
                            self.symbol_name(u16::from(fb))
                        );
                        terminal = u16::from(fb);
                        continue;
                    }
                }
                if let Some(wild) = self.wildcard {
                    let j = i - terminal as i32 + wild as i32;
                    if let Some(&la) =
                        usize::try_from(j).ok().and_then(|j| self.lookahead.get(j))
                    {
                        if u16::from(la) == wild {
                            log::trace!(
                                "WILDCARD {} => {}",
                                self.symbol_name(terminal),
                                self.symbol_name(wild)
                            );
                            return self.decode(self.action[j as usize]);
                        }
                    }
                }
            }
            return self.decode(self.default_action[state as usize]);
        }
    }

    /// Resolves the goto action after reducing to `nonterminal` with `state`
    /// on top of the stack.
    ///
    /// Same two-level scheme as [`shift_action`](Self::shift_action) but with
    /// no fallback or wildcard step; a state with no goto row degrades to its
    /// default action.
    pub fn goto_action(&self, state: u16, nonterminal: u16) -> Action {
        debug_assert!(nonterminal >= self.terminal_bound && nonterminal < self.n_symbols);
        let Some(&ofst) = self.reduce_ofst.get(state as usize) else {
            return self.decode(self.default_action[state as usize]);
        };
        let i = ofst as i32 + nonterminal as i32;
        if let Some(&la) = usize::try_from(i).ok().and_then(|i| self.lookahead.get(i)) {
            if u16::from(la) == nonterminal {
                return self.decode(self.action[i as usize]);
            }
        }
        self.decode(self.default_action[state as usize])
    }

    /// Rule metadata for `rule`.
    #[inline]
    pub fn rule(&self, rule: u16) -> RuleDef {
        self.rules[rule as usize]
    }

    /// `true` if `symbol` is a terminal (lexer-produced) code.
    #[inline]
    pub fn is_terminal(&self, symbol: u16) -> bool {
        symbol < self.terminal_bound
    }

    /// Display name of a symbol code, or `"?"` when out of range.
    #[inline]
    pub fn symbol_name(&self, symbol: u16) -> &'static str {
        self.symbol_names.get(symbol as usize).copied().unwrap_or("?")
    }

    /// Display form of a rule, or `"?"` when out of range.
    #[inline]
    pub fn rule_name(&self, rule: u16) -> &'static str {
        self.rule_names.get(rule as usize).copied().unwrap_or("?")
    }
}

#[cfg(test)]
mod tests {
    use crate::test_tables::{self, term, MINI};
    use crate::Action;

    #[test]
    fn direct_hits_resolve_to_shift() {
        assert_eq!(MINI.shift_action(0, term::NUM), Action::Shift(3));
        assert_eq!(MINI.shift_action(4, term::NUM), Action::Shift(3));
        assert_eq!(MINI.shift_action(1, term::PLUS), Action::Shift(4));
    }

    #[test]
    fn end_of_input_reduces_the_start_rule() {
        assert_eq!(MINI.shift_action(1, term::END), Action::Reduce(0));
    }

    #[test]
    fn registered_fallback_is_retried_before_default() {
        // `name` has no direct action anywhere but falls back to `num`.
        assert_eq!(MINI.shift_action(0, term::NAME), Action::Shift(3));
        // In a state where the fallback target has no action either, the
        // lookup must keep degrading to the default action.
        assert_eq!(MINI.shift_action(1, term::NAME), Action::Error);
    }

    #[test]
    fn wildcard_matches_unresolvable_lookaheads() {
        let t = &test_tables::WILD;
        // `plus` resolves directly; `num` has no slot and no fallback, so it
        // matches through the wildcard entry instead.
        assert_eq!(t.shift_action(0, term::PLUS), Action::Shift(1));
        assert_eq!(t.shift_action(0, term::NUM), Action::Shift(2));
        // End-of-input never matches the wildcard.
        assert_eq!(t.shift_action(0, term::END), Action::Error);
    }

    #[test]
    fn default_only_states_use_the_sentinel_offset() {
        assert_eq!(MINI.shift_action(2, term::NUM), Action::Reduce(2));
        assert_eq!(MINI.shift_action(3, term::PLUS), Action::Reduce(3));
        assert_eq!(MINI.shift_action(5, term::END), Action::Reduce(1));
    }

    #[test]
    fn goto_resolves_rows_and_degrades_to_default() {
        assert_eq!(MINI.goto_action(0, test_tables::nt::EXPR), Action::Shift(1));
        assert_eq!(MINI.goto_action(0, test_tables::nt::TERM), Action::Shift(2));
        assert_eq!(MINI.goto_action(4, test_tables::nt::TERM), Action::Shift(5));
        assert_eq!(MINI.goto_action(0, test_tables::nt::START), Action::Accept);
    }

    #[test]
    fn rule_metadata_round_trips() {
        let r = MINI.rule(1);
        assert_eq!((r.lhs, r.arity), (test_tables::nt::EXPR, 3));
        assert_eq!(MINI.rule_name(1), "expr ::= expr plus term");
        assert_eq!(MINI.symbol_name(term::PLUS), "plus");
        assert!(MINI.is_terminal(term::PLUS));
        assert!(!MINI.is_terminal(test_tables::nt::EXPR));
    }
}
