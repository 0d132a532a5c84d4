// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dotscope-lang
//!
//! Pluggable output languages for .NET assembly summaries, built on the `dotscope` metadata
//! model.
//!
//! Given an already-parsed assembly or module, `dotscope-lang` resolves its real entry point
//! (native code, a managed method, or a forward into another module of the assembly), writes
//! a header describing the assembly and module, and defines the contract an output language
//! implements to name and annotate types and members.
//!
//! ## Features
//!
//! - **🧭 Entry point resolution** - Follows `File` forwards across the modules of an assembly, bounded against cycles
//! - **📝 Header emission** - Identity, global members, entry point, platform, runtime and PE timestamp
//! - **🧩 Extensible languages** - [`language::NameFormatter`] and [`language::Language`] with sensible defaults
//! - **🔗 Linked output** - Every rendered name can carry a reference to the entity it names
//! - **🛡️ Safe identifiers** - Control and invisible characters in names are escaped
//! - **🌍 Explicit locale** - Dates are formatted in the locale passed with each call
//!
//! ## Quick Start
//!
//! ```rust
//! use dotscope_lang::prelude::*;
//!
//! let program = CilType::new(Token::new(0x02000002), "Contoso", "Program", 0);
//! let main = Method::new(Token::new(0x06000001), "Main");
//! program.add_method(main.clone());
//!
//! let module = ModuleBuilder::new()
//!     .name("App.exe")
//!     .machine(Machine::AMD64)
//!     .runtime_version("v4.0.30319")
//!     .entry_point_method(main)
//!     .add_type(program)
//!     .build()?;
//! let assembly = AssemblyBuilder::new()
//!     .name("App")
//!     .version(AssemblyVersion::new(1, 0, 0, 0))
//!     .build()?;
//! assembly.add_module(module)?;
//!
//! let mut output = PlainTextOutput::new();
//! SummaryLanguage::new().write_module_assembly(
//!     HeaderTarget::Assembly(&assembly),
//!     &mut output,
//!     &DecompilationOptions::default(),
//!     DecompileAssemblyFlags::ASSEMBLY_AND_MODULE,
//! )?;
//!
//! assert_eq!(
//!     output.as_str(),
//!     "// App.exe\n\
//!      // App, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null\n\
//!      \n\
//!      // Entry point: Contoso.Program.Main\n\
//!      // Architecture: x64\n\
//!      // Runtime: .NET 4.0\n\
//!      \n"
//! );
//! # Ok::<(), dotscope_lang::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - Read-only object model of assemblies, modules, types and members
//! - [`entrypoint`] - Entry point resolution across the modules of an assembly
//! - [`header`] - The header block written for an assembly or module
//! - [`language`] - The contract of an output language
//! - [`languages`] - Built-in output languages
//! - [`output`] - Text sinks receiving rendered output
//! - [`escape`] - Identifier escaping
//! - [`options`] - Locale and settings passed with every call
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: forwarded entry points at `debug`, unresolved
//! forwards at `warn`, header sections at `trace`. No logger is installed by the library.
//!
//! ## Thread Safety
//!
//! A fully built model is `Send + Sync`, and every language is `Send + Sync`. Headers for
//! independent assemblies may be written from several threads at once, each into its own
//! output.

pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotscope_lang::prelude::*;
///
/// let module = ModuleBuilder::new().name("Library.dll").build()?;
/// assert!(resolve_entry_point(&module).is_none());
/// # Ok::<(), dotscope_lang::Error>(())
/// ```
pub mod prelude;

/// Read-only object model of assemblies, modules, types and members
///
/// # Key Components
///
/// - [`metadata::assembly`] - Assemblies and their modules
/// - [`metadata::module`] - Modules, entry point fields, machine and CLR flags
/// - [`metadata::typesystem`] - Types, including the global `<Module>` type
/// - [`metadata::members`] - Methods, fields, properties, events and cross-references
/// - [`metadata::identity`] - Assembly names, versions and strong names
/// - [`metadata::token`] - Metadata tokens
pub mod metadata;

/// Entry point resolution across the modules of an assembly
pub mod entrypoint;

/// Identifier escaping for rendered names
pub mod escape;

/// The header block written for an assembly or module
pub mod header;

/// The contract of an output language
pub mod language;

/// Built-in output languages
pub mod languages;

/// Locale and settings passed with every call
pub mod options;

/// Text sinks receiving rendered output
pub mod output;

/// `dotscope-lang` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `dotscope-lang` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use dotscope_lang::{options::DisplayLocale, Error};
///
/// match DisplayLocale::new("tlh_KLINGON") {
///     Ok(locale) => println!("Using {}", locale.name()),
///     Err(Error::UnknownLocale(name)) => println!("No such locale: {name}"),
///     Err(e) => println!("Error: {e}"),
/// }
/// ```
pub use error::Error;
