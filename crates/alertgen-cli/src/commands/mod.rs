//! Command implementations.

mod check;
mod generate;

pub use check::CheckCommand;
pub use generate::GenerateCommand;
