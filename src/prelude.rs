//! # dotscope-lang Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotscope-lang library. Import this module to get quick access to the object
//! model, the language traits and the output sinks.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotscope-lang operations
pub use crate::Error;

/// The result type used throughout dotscope-lang
pub use crate::Result;

/// Locale and settings passed with every rendering call
pub use crate::options::{DecompilationOptions, DecompilerSettings, DisplayLocale};

// ================================================================================================
// Metadata Model
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Assemblies and their identity
pub use crate::metadata::assembly::{Assembly, AssemblyBuilder, AssemblyFlags, AssemblyRc};
pub use crate::metadata::identity::{AssemblyIdentity, AssemblyVersion, StrongName};

/// Modules and the fields read from their headers
pub use crate::metadata::module::{
    CorFlags, File, FileRc, ManagedEntryPoint, Machine, Module, ModuleBuilder, ModuleRc,
};

/// Types and members
pub use crate::metadata::members::{
    Event, EventRc, Field, FieldRc, MemberDef, MemberRef, Method, MethodRc, Property, PropertyRc,
    Variable,
};
pub use crate::metadata::typesystem::{CilType, CilTypeRc, CilTypeRef};

// ================================================================================================
// Entry Points and Headers
// ================================================================================================

/// Entry point resolution
pub use crate::entrypoint::{
    resolve_entry_point, resolve_entry_point_with, DiskProbe, EntryPoint, FileProbe,
};

/// Header emission
pub use crate::header::{DecompileAssemblyFlags, HeaderTarget};

// ================================================================================================
// Languages and Output
// ================================================================================================

/// The contract of an output language
pub use crate::language::{DecompilationType, Language, NameFormatter, PrinterFlags};

/// Built-in languages
pub use crate::languages::SummaryLanguage;

/// Output sinks
pub use crate::output::{PlainTextOutput, TextFragment, TextOutput, TextTokenKind, TokenOutput};

/// Identifier escaping
pub use crate::escape::escape_identifier;

/// Language identifiers
pub use uguid::{guid, Guid};
