//! The automaton driver: a push-style shift/reduce loop over packed tables.
//!
//! The caller feeds one `(terminal, value)` pair at a time. For each token
//! the driver repeatedly consults the tables for the current state and
//! lookahead: a shift consumes the token; a reduce invokes the grammar's
//! [`ReduceDriver`] and re-examines the same lookahead; accept and error are
//! terminal. End-of-input is the distinguished terminal code 0.
//!
//! Error recovery is disabled by design: the first error action reports and
//! abandons the parse. The driver never unwinds out of the loop — every
//! outcome is an explicit [`Status`] transition, and every exit path tears
//! the value stack down so each owned semantic value drops exactly once.

use crate::stack::{Overflow, ValueStack};
use crate::{Action, PackedTables, Status};
use std::fmt;

/// Grammar-side hooks invoked by the automaton.
///
/// Implementations hold no parse state of their own beyond what their
/// `Context` (the semantic builder) carries; typically a zero-sized struct
/// with a `PhantomData` marker.
pub trait ReduceDriver {
    /// Semantic value attached to every stack entry.
    type Value: Default;
    /// External context threaded through every hook (the semantic builder).
    type Context;

    /// Synthesizes the LHS value for `rule` from the popped RHS values,
    /// given in rule order (leftmost first).
    ///
    /// Must return a well-typed value even when node construction fails;
    /// popped values not moved into the result are dropped here.
    fn reduce(&mut self, ctx: &mut Self::Context, rule: u16, rhs: Vec<Self::Value>)
        -> Self::Value;

    /// A syntax error on `terminal`; `value` is the offending token's value.
    fn syntax_error(&mut self, ctx: &mut Self::Context, terminal: u16, value: &Self::Value);

    /// The value stack hit its depth limit.
    fn stack_overflow(&mut self, ctx: &mut Self::Context);
}

/// Diagnostic-only sink for the driver's trace lines.
///
/// Purely observational: an absent sink changes nothing about control flow.
/// The same lines also go to `log::trace!` unconditionally.
pub trait TraceSink {
    /// Receives one human-readable line ("Shift 5", "Reduce [...]", ...).
    fn line(&mut self, line: &str);
}

/// Which terminal condition ended a failed parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The tables rejected a lookahead.
    Syntax,
    /// The value stack hit its depth limit.
    StackOverflow,
    /// A goto lookup failed to resolve; only possible with malformed tables.
    Internal,
}

/// Running counters, mirroring what the trace shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Tokens fed (including the end-of-input marker).
    pub tokens: usize,
    /// Shift actions taken.
    pub shifts: usize,
    /// Reductions performed.
    pub reductions: usize,
    /// Error actions hit.
    pub errors: usize,
}

/// Default depth limit for the value stack.
pub const DEFAULT_STACK_DEPTH: usize = 100;

/// A pushdown automaton instance for one parse.
///
/// Single-threaded and non-reentrant; independent instances over the same
/// `'static` tables may run concurrently. Dropping the automaton mid-parse
/// runs the same teardown as failure: the stack drops, and with it every
/// still-owned semantic value.
pub struct Automaton<D: ReduceDriver> {
    tables: &'static PackedTables,
    stack: ValueStack<D::Value>,
    driver: D,
    status: Status,
    failure: Option<FailureKind>,
    /// Shift countdown that suppresses cascading error reports; negative
    /// until the first error, reset to 3 on each one.
    err_budget: i32,
    stats: EngineStats,
    trace: Option<Box<dyn TraceSink>>,
}

impl<D: ReduceDriver> Automaton<D> {
    /// Creates a fresh automaton in state 0 with the sentinel base entry.
    pub fn new(tables: &'static PackedTables, driver: D, max_depth: usize) -> Self {
        let mut stack = ValueStack::new(max_depth);
        stack.start(D::Value::default());
        Self {
            tables,
            stack,
            driver,
            status: Status::Running,
            failure: None,
            err_budget: -1,
            stats: EngineStats::default(),
            trace: None,
        }
    }

    /// Attaches a diagnostic trace sink.
    pub fn with_trace(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Feeds one token. A no-op once the parse has accepted or failed.
    pub fn feed(&mut self, ctx: &mut D::Context, terminal: u16, value: D::Value) {
        if self.status != Status::Running {
            log::trace!(
                "Input {} ignored ({:?})",
                self.tables.symbol_name(terminal),
                self.status
            );
            return;
        }
        self.stats.tokens += 1;
        self.trace(format_args!("Input {}", self.tables.symbol_name(terminal)));

        let mut value = Some(value);
        loop {
            let state = self.stack.top().state;
            match self.tables.shift_action(state, terminal) {
                Action::Shift(next) => {
                    let v = value.take().expect("token value consumed twice");
                    if let Err(Overflow(v)) = self.stack.push(next, terminal, v) {
                        drop(v);
                        self.overflow(ctx);
                        return;
                    }
                    self.err_budget -= 1;
                    self.stats.shifts += 1;
                    self.trace(format_args!("Shift {next}"));
                    return;
                }
                Action::Reduce(rule) => {
                    if !self.reduce(ctx, rule) {
                        return;
                    }
                }
                Action::Accept => {
                    self.accept();
                    return;
                }
                Action::Error => {
                    self.trace(format_args!("Syntax Error"));
                    if self.err_budget <= 0 {
                        let v = value.as_ref().expect("token value consumed twice");
                        self.driver.syntax_error(ctx, terminal, v);
                    }
                    self.err_budget = 3;
                    self.fail(FailureKind::Syntax);
                    return;
                }
            }
        }
    }

    /// Performs one reduction plus the goto that follows it.
    /// Returns `false` when the parse reached a terminal status.
    fn reduce(&mut self, ctx: &mut D::Context, rule: u16) -> bool {
        let info = self.tables.rule(rule);
        self.trace(format_args!("Reduce [{}]", self.tables.rule_name(rule)));
        let rhs = self.stack.pop_n(usize::from(info.arity));
        let value = self.driver.reduce(ctx, rule, rhs);
        self.stats.reductions += 1;
        match self.tables.goto_action(self.stack.top().state, info.lhs) {
            Action::Shift(next) => {
                if let Err(Overflow(v)) = self.stack.push(next, info.lhs, value) {
                    drop(v);
                    self.overflow(ctx);
                    return false;
                }
                true
            }
            Action::Accept => {
                drop(value);
                self.accept();
                false
            }
            Action::Reduce(_) | Action::Error => {
                log::error!(
                    "no goto for {} after [{}]",
                    self.tables.symbol_name(info.lhs),
                    self.tables.rule_name(rule)
                );
                drop(value);
                self.fail(FailureKind::Internal);
                false
            }
        }
    }

    fn accept(&mut self) {
        self.trace(format_args!("Accept"));
        self.stack.clear();
        self.status = Status::Accepted;
    }

    fn overflow(&mut self, ctx: &mut D::Context) {
        self.trace(format_args!("Stack Overflow"));
        self.driver.stack_overflow(ctx);
        self.fail(FailureKind::StackOverflow);
    }

    fn fail(&mut self, kind: FailureKind) {
        self.stack.clear();
        self.status = Status::Failed;
        self.failure = Some(kind);
        self.stats.errors += 1;
    }

    fn trace(&mut self, args: fmt::Arguments<'_>) {
        log::trace!("{args}");
        if let Some(sink) = self.trace.as_deref_mut() {
            sink.line(&args.to_string());
        }
    }

    /// Current parse status.
    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    /// What ended the parse, when `status()` is `Failed`.
    #[inline]
    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    /// Running counters.
    #[inline]
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Current stack depth (sentinel included); 0 after teardown.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// The grammar driver.
    #[inline]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the grammar driver.
    #[inline]
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// The tables this automaton runs on.
    #[inline]
    pub fn tables(&self) -> &'static PackedTables {
        self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::{Automaton, EngineStats, FailureKind, ReduceDriver, TraceSink};
    use crate::test_tables::{term, MINI};
    use crate::Status;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Counts live values via `Rc` clones of one probe; `reduce` drops the
    /// popped children and answers with a fresh clone.
    struct CountingDriver {
        probe: Rc<()>,
        syntax_errors: Vec<u16>,
        overflows: usize,
    }

    impl CountingDriver {
        fn new(probe: &Rc<()>) -> Self {
            Self {
                probe: Rc::clone(probe),
                syntax_errors: Vec::new(),
                overflows: 0,
            }
        }
    }

    impl ReduceDriver for CountingDriver {
        type Value = Option<Rc<()>>;
        type Context = ();

        fn reduce(&mut self, _ctx: &mut (), _rule: u16, rhs: Vec<Self::Value>) -> Self::Value {
            drop(rhs);
            Some(Rc::clone(&self.probe))
        }

        fn syntax_error(&mut self, _ctx: &mut (), terminal: u16, _value: &Self::Value) {
            self.syntax_errors.push(terminal);
        }

        fn stack_overflow(&mut self, _ctx: &mut ()) {
            self.overflows += 1;
        }
    }

    fn counting_automaton(probe: &Rc<()>, depth: usize) -> Automaton<CountingDriver> {
        Automaton::new(&MINI, CountingDriver::new(probe), depth)
    }

    fn feed(a: &mut Automaton<CountingDriver>, t: u16) {
        let probe = Rc::clone(&a.driver().probe);
        a.feed(&mut (), t, Some(probe));
    }

    #[test]
    fn accepts_num_plus_num() {
        init_logger();
        let probe = Rc::new(());
        let mut a = counting_automaton(&probe, 16);
        for t in [term::NUM, term::PLUS, term::NUM, term::END] {
            feed(&mut a, t);
        }
        assert_eq!(a.status(), Status::Accepted);
        assert_eq!(
            *a.stats(),
            EngineStats {
                tokens: 4,
                shifts: 3,
                reductions: 5,
                errors: 0
            }
        );
        // Teardown on accept dropped every owned value.
        drop(a);
        assert_eq!(Rc::strong_count(&probe), 1);
    }

    #[test]
    fn stack_depth_balances_around_each_reduction() {
        init_logger();
        let probe = Rc::new(());
        let mut a = counting_automaton(&probe, 16);
        let mut depths = Vec::new();
        for t in [term::NUM, term::PLUS, term::NUM, term::END] {
            feed(&mut a, t);
            depths.push(a.depth());
        }
        // shift num; [term, expr reductions] + shift plus; shift num;
        // term/expr-arity-3/start reductions then accept teardown.
        assert_eq!(depths, vec![2, 3, 4, 0]);
    }

    #[test]
    fn fallback_terminal_parses_like_its_target() {
        init_logger();
        let probe = Rc::new(());
        let mut a = counting_automaton(&probe, 16);
        for t in [term::NAME, term::PLUS, term::NAME, term::END] {
            feed(&mut a, t);
        }
        assert_eq!(a.status(), Status::Accepted);
        drop(a);
        assert_eq!(Rc::strong_count(&probe), 1);
    }

    #[test]
    fn syntax_error_reports_aborts_and_leaks_nothing() {
        init_logger();
        let probe = Rc::new(());
        let mut a = counting_automaton(&probe, 16);
        for t in [term::NUM, term::NUM, term::END] {
            feed(&mut a, t);
        }
        assert_eq!(a.status(), Status::Failed);
        assert_eq!(a.failure(), Some(FailureKind::Syntax));
        assert_eq!(a.driver().syntax_errors, vec![term::NUM]);
        assert_eq!(a.depth(), 0);
        // The end-of-input token was ignored after the failure.
        assert_eq!(a.stats().tokens, 2);
        drop(a);
        assert_eq!(Rc::strong_count(&probe), 1);
    }

    #[test]
    fn overflow_reports_and_tears_down() {
        init_logger();
        let probe = Rc::new(());
        // Sentinel occupies the only free slot below the limit.
        let mut a = counting_automaton(&probe, 2);
        feed(&mut a, term::NUM);
        // First shift fits; the reduction chain pushes again within limit,
        // so push the parse further until the cap hits.
        feed(&mut a, term::PLUS);
        assert_eq!(a.status(), Status::Failed);
        assert_eq!(a.failure(), Some(FailureKind::StackOverflow));
        assert_eq!(a.driver().overflows, 1);
        drop(a);
        assert_eq!(Rc::strong_count(&probe), 1);
    }

    #[test]
    fn dropping_mid_parse_releases_every_value() {
        init_logger();
        let probe = Rc::new(());
        let mut a = counting_automaton(&probe, 16);
        feed(&mut a, term::NUM);
        feed(&mut a, term::PLUS);
        assert!(Rc::strong_count(&probe) > 1);
        drop(a);
        assert_eq!(Rc::strong_count(&probe), 1);
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl TraceSink for Recorder {
        fn line(&mut self, line: &str) {
            self.0.borrow_mut().push(line.to_owned());
        }
    }

    #[test]
    fn identical_input_yields_identical_action_traces() {
        init_logger();
        let run = || {
            let probe = Rc::new(());
            let rec = Recorder::default();
            let lines = Rc::clone(&rec.0);
            let mut a = counting_automaton(&probe, 16).with_trace(Box::new(rec));
            for t in [term::NUM, term::PLUS, term::NUM, term::END] {
                feed(&mut a, t);
            }
            assert_eq!(a.status(), Status::Accepted);
            let out = lines.borrow().clone();
            out
        };
        let first = run();
        let second = run();
        assert_eq!(first, second);
        assert!(first.contains(&"Reduce [expr ::= expr plus term]".to_owned()));
        assert_eq!(first.last().unwrap().as_str(), "Accept");
    }
}
