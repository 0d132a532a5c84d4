//! Entry point resolution across the modules of an assembly.
//!
//! The CLR header of a module names its entry point in one of three ways: the RVA of native
//! code, a `MethodDef` of the module itself, or a `File` row naming another module of the
//! same assembly which holds the real entry point. [`resolve_entry_point`] follows such
//! forwards until it reaches native code or a managed method.
//!
//! Traversal is bounded by the number of modules of the owning assembly, so a malformed or
//! cyclic chain of forwards terminates with [`EntryPoint::None`] instead of looping. A module
//! without an owning assembly reports its own entry point but never follows a forward.
//!
//! # Examples
//!
//! ```rust
//! use dotscope_lang::entrypoint::{resolve_entry_point, EntryPoint};
//! use dotscope_lang::metadata::module::ModuleBuilder;
//!
//! let module = ModuleBuilder::new()
//!     .name("Native.exe")
//!     .native_entry_point(0x1000)
//!     .build()?;
//!
//! assert_eq!(resolve_entry_point(&module), EntryPoint::Native(0x1000));
//! # Ok::<(), dotscope_lang::Error>(())
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};

use crate::metadata::{
    members::MethodRc,
    module::{ManagedEntryPoint, ModuleRc},
};

/// The resolved entry point of a module
#[derive(Clone, Default)]
pub enum EntryPoint {
    /// The module has no entry point, or it could not be resolved
    #[default]
    None,
    /// Native code at this RVA
    Native(u32),
    /// A managed method
    Managed(MethodRc),
}

impl EntryPoint {
    /// Returns true if no entry point was found
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, EntryPoint::None)
    }

    /// The RVA of a native entry point
    #[must_use]
    pub fn native_rva(&self) -> Option<u32> {
        match self {
            EntryPoint::Native(rva) => Some(*rva),
            _ => None,
        }
    }

    /// The method of a managed entry point
    #[must_use]
    pub fn method(&self) -> Option<&MethodRc> {
        match self {
            EntryPoint::Managed(method) => Some(method),
            _ => None,
        }
    }
}

impl PartialEq for EntryPoint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EntryPoint::None, EntryPoint::None) => true,
            (EntryPoint::Native(a), EntryPoint::Native(b)) => a == b,
            (EntryPoint::Managed(a), EntryPoint::Managed(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPoint::None => f.write_str("None"),
            EntryPoint::Native(rva) => write!(f, "Native(0x{rva:08x})"),
            EntryPoint::Managed(method) => write!(f, "Managed({}, {})", method.name, method.token),
        }
    }
}

/// Answers whether the file behind a module location exists
///
/// Forwarded entry points are only followed into sibling modules whose file exists. Any
/// `Fn(&Path) -> bool` closure is a probe as well.
pub trait FileProbe {
    /// Returns true if `path` names an existing file
    fn exists(&self, path: &Path) -> bool;
}

/// A [`FileProbe`] asking the filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskProbe;

impl FileProbe for DiskProbe {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

impl<F> FileProbe for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Resolve the entry point of `module`, checking sibling files on disk
#[must_use]
pub fn resolve_entry_point(module: &ModuleRc) -> EntryPoint {
    resolve_entry_point_with(module, &DiskProbe)
}

/// Resolve the entry point of `module`, checking sibling files with `probe`
///
/// At every step a non-zero native RVA wins over a managed entry point. A `File` forward is
/// followed to the sibling module whose existing file has the forwarded name, compared
/// without regard to case. At most as many steps are taken as the owning assembly has
/// modules (one step for a module without assembly).
#[must_use]
pub fn resolve_entry_point_with(module: &ModuleRc, probe: &dyn FileProbe) -> EntryPoint {
    let mut current = module.clone();
    let mut max_iterations = 1usize;
    let mut iteration = 0usize;

    while iteration < max_iterations {
        iteration += 1;

        let assembly = current.assembly();
        if let Some(assembly) = &assembly {
            max_iterations = assembly.module_count();
        }

        if current.native_entry_point != 0 {
            return EntryPoint::Native(current.native_entry_point);
        }

        let file = match &current.managed_entry_point {
            Some(ManagedEntryPoint::Method(method)) => {
                return EntryPoint::Managed(method.clone());
            }
            Some(ManagedEntryPoint::File(file)) => file.clone(),
            None => return EntryPoint::None,
        };

        let Some(assembly) = assembly else {
            debug!(
                "Module '{}' forwards its entry point to '{}' but belongs to no assembly",
                current.name, file.name
            );
            return EntryPoint::None;
        };

        let next = assembly
            .modules
            .iter()
            .map(|(_, sibling)| sibling)
            .find(|sibling| {
                sibling.location_exists(|path| probe.exists(path))
                    && sibling
                        .file_name()
                        .is_some_and(|file_name| file.matches(&file_name))
            })
            .cloned();

        match next {
            Some(next) => {
                debug!(
                    "Following entry point of '{}' to '{}' ({})",
                    current.name,
                    file.name,
                    next.display_location()
                );
                current = next;
            }
            None => {
                warn!(
                    "Entry point of '{}' forwards to '{}', which is not an existing module of '{}'",
                    current.name,
                    file.name,
                    assembly.name()
                );
                return EntryPoint::None;
            }
        }
    }

    warn!(
        "Entry point of '{}' not resolved after {} forwards",
        module.name, max_iterations
    );
    EntryPoint::None
}
