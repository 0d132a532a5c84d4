//! Built-in output languages.
//!
//! # Key Components
//!
//! - [`SummaryLanguage`] - A metadata summary in line comments, listing types and members
//!   without decompiling method bodies

mod summary;

pub use summary::SummaryLanguage;
