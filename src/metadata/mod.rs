//! Read-only object model of assemblies, modules, types and members.
//!
//! This is the view of already-parsed metadata that the entry point resolver, the header
//! emitter and the renderers consume. Producing it from a binary is the job of a metadata
//! parser; within this crate the model is built through [`assembly::AssemblyBuilder`],
//! [`module::ModuleBuilder`] and the constructors of [`typesystem::CilType`] and the
//! [`members`].
//!
//! Ownership runs top-down (assembly → modules → types → members) through `Arc`, while all
//! back-references (module → assembly, member → declaring type, nested → enclosing type) are
//! weak. All collections are append-only `boxcar` vectors, so a fully built graph is
//! `Send + Sync` and can be summarized from several threads at once.

pub mod assembly;
pub mod identity;
pub mod members;
pub mod module;
pub mod token;
pub mod typesystem;
