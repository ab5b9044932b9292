pub mod chart;
pub mod derivation;
pub mod error;
pub mod grammar;
pub mod item;
pub mod token;

pub use chart::{Chart, ParseResult, Step, StepEvent};
pub use derivation::Derivation;
pub use grammar::{Grammar, Production};
pub use item::{BackPointer, Item, StateSet};
pub use token::{Alphabet, EOF, NonTerminal, Terminal, Token};
