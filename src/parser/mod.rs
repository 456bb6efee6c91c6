pub mod quote_parser;

pub use quote_parser::{Parser, QuoteParser};
