//! An SLR(1) parser generator engine.
//!
//! The pipeline runs leaf to root: a validated [`Grammar`](grammar::Grammar)
//! carries its dataflow analyses, the [`LR0Items`](lr0::LR0Items) table numbers
//! every dot position, the [`Machine`](automaton::Machine) collects the LR(0)
//! states, and [`Tables`](table::Tables) resolve them into a dense action table
//! that the `slrgen-runtime` parser can drive.

pub mod analysis;
pub mod automaton;
pub mod grammar;
pub mod lr0;
pub mod scc;
pub mod table;
pub mod types;
pub mod util;

mod config;
#[cfg(test)]
mod testing;

pub use crate::config::{Config, Mode};
