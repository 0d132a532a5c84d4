use thiserror::Error;

use crate::language::DecompilationType;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Structural absence in the metadata (no entry point, no timestamp, no known runtime
/// version, no declaring type) is never an error; the corresponding output is omitted. Errors
/// are reserved for misuse at a call boundary and for requests a renderer cannot serve.
///
/// # Examples
///
/// ```rust
/// use dotscope_lang::{
///     language::{DecompilationType, Language},
///     languages::SummaryLanguage,
///     Error,
/// };
///
/// let language = SummaryLanguage::new();
/// match language.decompile_synthetic(DecompilationType::PartialType, &()) {
///     Err(Error::UnsupportedOperation(kind)) => println!("{kind} is not supported"),
///     Err(e) => println!("Other error: {e}"),
///     Ok(()) => println!("done"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument was missing or invalid.
    ///
    /// This is a caller bug and is reported immediately at the call boundary, e.g. when a
    /// formatting call receives no entity, or a builder is missing a required name. The
    /// associated value names the offending argument.
    #[error("Invalid argument - {0}")]
    InvalidArgument(&'static str),

    /// The renderer does not support the requested synthetic view.
    ///
    /// Returned by [`crate::language::Language::decompile_synthetic`] for every kind the
    /// renderer does not claim through
    /// [`crate::language::Language::can_decompile`].
    #[error("Decompilation of {0} is not implemented by this language")]
    UnsupportedOperation(DecompilationType),

    /// The requested display locale is not known.
    #[error("Unknown display locale - {0}")]
    UnknownLocale(String),
}
