//! Operator-facing input and output channels.

pub mod terminal;
pub mod traits;

pub use terminal::TerminalInterface;
pub use traits::Interface;
