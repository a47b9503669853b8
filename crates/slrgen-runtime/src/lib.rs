//! Runtime for the parse tables generated by `slrgen`.

pub mod definition;
pub mod parser;
