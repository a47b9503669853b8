//! Parser definition.

use std::fmt;

/// The trait for abstracting the generated parse table.
pub trait ParseTable {
    /// The number to identify the state of the automaton.
    type State: Copy + Eq + fmt::Debug;

    /// The number to identify the terminal/nonterminal symbols.
    type Symbol: Copy + Eq + fmt::Debug;

    /// Return the initial state number.
    fn initial_state(&self) -> Self::State;

    /// Return the terminal that stands for the end of input.
    fn end_of_input(&self) -> Self::Symbol;

    fn is_nonterminal(&self, symbol: Self::Symbol) -> bool;

    /// Return the action corresponding to the specified state number and
    /// lookahead terminal.
    fn action(
        &self,
        current: Self::State,
        lookahead: Self::Symbol,
    ) -> ParseAction<Self::State, Self::Symbol>;

    /// Return the state reached from `current` on the nonterminal `symbol`.
    fn goto(&self, current: Self::State, symbol: Self::Symbol) -> Option<Self::State>;
}

macro_rules! forward_parse_table {
    ($($ty:ty),*) => {$(
        impl<T: ?Sized> ParseTable for $ty
        where
            T: ParseTable,
        {
            type State = T::State;
            type Symbol = T::Symbol;

            fn initial_state(&self) -> Self::State {
                (**self).initial_state()
            }

            fn end_of_input(&self) -> Self::Symbol {
                (**self).end_of_input()
            }

            fn is_nonterminal(&self, symbol: Self::Symbol) -> bool {
                (**self).is_nonterminal(symbol)
            }

            fn action(
                &self,
                current: Self::State,
                lookahead: Self::Symbol,
            ) -> ParseAction<Self::State, Self::Symbol> {
                (**self).action(current, lookahead)
            }

            fn goto(&self, current: Self::State, symbol: Self::Symbol) -> Option<Self::State> {
                (**self).goto(current, symbol)
            }
        }
    )*};
}

forward_parse_table!(&T, std::rc::Rc<T>, std::sync::Arc<T>);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseAction<TState, TSymbol> {
    /// Consume the lookahead and move to the state.
    Shift(TState),

    /// The input is complete.
    Accept,

    /// Pop `len` symbols and push `lhs` in their place.
    Reduce { lhs: TSymbol, len: usize },

    /// The lookahead is not acceptable in the current state.
    Error,
}
