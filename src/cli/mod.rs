//! CLI command handling

pub mod inspect;
pub mod output;
pub mod simulate;

pub use inspect::*;
pub use output::*;
pub use simulate::*;
