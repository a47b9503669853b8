//! Parser.

use crate::definition::{ParseAction, ParseTable};
use std::{fmt, iter::Fuse};

/// The outcome of a single [`Parser::step`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    /// The input has been recognized. Stepping again keeps returning `Accept`.
    Accept,
    /// The input has been rejected.
    Error,
    /// A terminal was consumed.
    Shift,
    /// A nonterminal was pushed, either the one just reduced or one spliced
    /// into the input.
    Goto,
    /// The symbols of a production were popped.
    Reduce,
}

/// An entry of the parse stack: the state a symbol was pushed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame<TState, TSymbol> {
    pub state: TState,
    pub symbol: TSymbol,
}

/// The shift-reduce parser driven based on the generated parse table.
///
/// The input may contain nonterminals as well, they are pushed as if they
/// had just been reduced.
pub struct Parser<TDef, I>
where
    TDef: ParseTable,
    I: Iterator<Item = TDef::Symbol>,
{
    definition: TDef,
    input: Fuse<I>,
    stack: Vec<Frame<TDef::State, TDef::Symbol>>,
    state: TDef::State,
    accepted: bool,
    // read from the input but not consumed yet
    lookahead: Option<TDef::Symbol>,
    // the left-hand side of the last reduce, waiting for its goto
    reduced: Option<TDef::Symbol>,
}

impl<TDef, I> fmt::Debug for Parser<TDef, I>
where
    TDef: ParseTable,
    I: Iterator<Item = TDef::Symbol>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("stack", &self.stack)
            .field("state", &self.state)
            .field("accepted", &self.accepted)
            .field("lookahead", &self.lookahead)
            .field("reduced", &self.reduced)
            .finish_non_exhaustive()
    }
}

impl<TDef, I> Parser<TDef, I>
where
    TDef: ParseTable,
    I: Iterator<Item = TDef::Symbol>,
{
    /// Create an instance of `Parser` reading `input` with the specified parse table.
    pub fn new<T>(definition: TDef, input: T) -> Self
    where
        T: IntoIterator<IntoIter = I, Item = TDef::Symbol>,
    {
        let state = definition.initial_state();
        Self {
            definition,
            input: input.into_iter().fuse(),
            stack: vec![],
            state,
            accepted: false,
            lookahead: None,
            reduced: None,
        }
    }

    /// Perform one transition of the automaton.
    ///
    /// Past the end of the input the end-of-input terminal is read. The
    /// behavior after `Step::Error` is unspecified.
    pub fn step(&mut self) -> Step {
        if self.accepted {
            return Step::Accept;
        }

        if let Some(lhs) = self.reduced {
            let step = self.goto(lhs);
            if step == Step::Goto {
                self.reduced = None;
            }
            return step;
        }

        let symbol = match self.lookahead {
            Some(symbol) => symbol,
            None => {
                let symbol = self
                    .input
                    .next()
                    .unwrap_or_else(|| self.definition.end_of_input());
                self.lookahead = Some(symbol);
                symbol
            }
        };

        if self.definition.is_nonterminal(symbol) {
            let step = self.goto(symbol);
            if step == Step::Goto {
                self.lookahead = None;
            }
            return step;
        }

        match self.definition.action(self.state, symbol) {
            ParseAction::Accept => {
                self.accepted = true;
                Step::Accept
            }
            ParseAction::Shift(next) => {
                self.stack.push(Frame {
                    state: self.state,
                    symbol,
                });
                self.lookahead = None;
                self.state = next;
                Step::Shift
            }
            ParseAction::Reduce { lhs, len } => {
                if len > 0 {
                    if self.stack.len() < len {
                        return Step::Error;
                    }
                    // the bottom popped frame holds the state to resume from
                    let base = self.stack.len() - len;
                    self.state = self.stack[base].state;
                    self.stack.truncate(base);
                }
                self.reduced = Some(lhs);
                Step::Reduce
            }
            ParseAction::Error => Step::Error,
        }
    }

    fn goto(&mut self, symbol: TDef::Symbol) -> Step {
        match self.definition.goto(self.state, symbol) {
            Some(next) => {
                self.stack.push(Frame {
                    state: self.state,
                    symbol,
                });
                self.state = next;
                Step::Goto
            }
            None => Step::Error,
        }
    }

    /// Step until the input is accepted or rejected.
    pub fn run(&mut self) -> Result<(), ParseError<TDef::State, TDef::Symbol>> {
        loop {
            match self.step() {
                Step::Accept => return Ok(()),
                Step::Error => {
                    return Err(ParseError::Rejected {
                        state: self.state,
                        symbol: self.reduced.or(self.lookahead),
                    })
                }
                Step::Shift | Step::Goto | Step::Reduce => (),
            }
        }
    }

    pub fn definition(&self) -> &TDef {
        &self.definition
    }

    /// The current state of the automaton.
    pub fn state(&self) -> TDef::State {
        self.state
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// The symbol read from the input but not consumed yet.
    pub fn next_symbol(&self) -> Option<TDef::Symbol> {
        self.lookahead
    }

    /// The nonterminal reduced by the last step, if its goto is still pending.
    pub fn pending_goto(&self) -> Option<TDef::Symbol> {
        self.reduced
    }

    pub fn stack(&self) -> &[Frame<TDef::State, TDef::Symbol>] {
        &self.stack
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError<TState: fmt::Debug, TSymbol: fmt::Debug> {
    #[error("unexpected symbol {symbol:?} in state {state:?}")]
    Rejected {
        state: TState,
        symbol: Option<TSymbol>,
    },
}
