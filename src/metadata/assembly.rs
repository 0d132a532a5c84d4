//! Assemblies: the logical deployable unit grouping one or more modules.
//!
//! An [`Assembly`] owns its modules; each module holds a weak back-reference to it, installed
//! by [`Assembly::add_module`]. The first module added is the manifest module.
//!
//! # Examples
//!
//! ```rust
//! use dotscope_lang::metadata::{
//!     assembly::AssemblyBuilder, identity::AssemblyVersion, module::ModuleBuilder,
//! };
//!
//! let assembly = AssemblyBuilder::new()
//!     .name("App")
//!     .version(AssemblyVersion::new(1, 0, 0, 0))
//!     .build()?;
//! assembly.add_module(ModuleBuilder::new().name("App.exe").build()?)?;
//!
//! assert_eq!(assembly.module_count(), 1);
//! assert_eq!(assembly.full_name(), "App, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null");
//! # Ok::<(), dotscope_lang::Error>(())
//! ```

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::{
    metadata::{
        identity::{AssemblyIdentity, AssemblyVersion, StrongName},
        module::ModuleRc,
        token::Token,
    },
    Error, Result,
};

/// Reference to an `Assembly`
pub type AssemblyRc = Arc<Assembly>;
/// A vector that holds the modules of an assembly
pub type ModuleList = Arc<boxcar::Vec<ModuleRc>>;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Flags of the `Assembly` table (`AssemblyFlags`, §II.23.1.2)
    pub struct AssemblyFlags: u32 {
        /// The assembly reference holds the full (unhashed) public key
        const PUBLIC_KEY = 0x0001;
        /// The implementation of this assembly used at runtime is not expected to match the version seen at compile time
        const RETARGETABLE = 0x0100;
        /// The assembly contains Windows Runtime code
        const CONTENT_TYPE_WINDOWS_RUNTIME = 0x0200;
        /// Reserved
        const DISABLE_JIT_COMPILE_OPTIMIZER = 0x4000;
        /// Reserved
        const ENABLE_JIT_COMPILE_TRACKING = 0x8000;
    }
}

/// Mask of the content type bits inside [`AssemblyFlags`]
pub const CONTENT_TYPE_MASK: u32 = 0x0E00;

/// The `Assembly` row of a manifest module, together with the modules of the assembly
pub struct Assembly {
    /// Token
    pub token: Token,
    /// Name, version, culture and strong name
    pub identity: AssemblyIdentity,
    /// Assembly flags
    pub flags: AssemblyFlags,
    /// All modules of this assembly, the manifest module first
    pub modules: ModuleList,
}

impl Assembly {
    /// The simple name of this assembly
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Returns true if the content type bits mark this as a Windows Runtime assembly
    #[must_use]
    pub fn is_content_type_windows_runtime(&self) -> bool {
        self.flags.bits() & CONTENT_TYPE_MASK == AssemblyFlags::CONTENT_TYPE_WINDOWS_RUNTIME.bits()
    }

    /// Returns true if the assembly is retargetable
    #[must_use]
    pub fn is_retargetable(&self) -> bool {
        self.flags.contains(AssemblyFlags::RETARGETABLE)
    }

    /// The full display name of this assembly
    ///
    /// This is the identity's display name followed by `Retargetable=Yes` and
    /// `ContentType=WindowsRuntime` when the corresponding flags are set.
    #[must_use]
    pub fn full_name(&self) -> String {
        let mut name = self.identity.display_name();
        if self.is_retargetable() {
            name.push_str(", Retargetable=Yes");
        }
        if self.is_content_type_windows_runtime() {
            name.push_str(", ContentType=WindowsRuntime");
        }
        name
    }

    /// The number of modules of this assembly
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.count()
    }

    /// The manifest module (the first module added)
    #[must_use]
    pub fn manifest_module(&self) -> Option<ModuleRc> {
        self.modules.get(0).cloned()
    }

    /// Adds `module` to this assembly and sets its back-reference
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the module already belongs to an assembly.
    pub fn add_module(self: &Arc<Self>, module: ModuleRc) -> Result<()> {
        if !module.set_assembly(self) {
            return Err(Error::InvalidArgument("module"));
        }
        self.modules.push(module);
        Ok(())
    }
}

impl fmt::Debug for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modules: Vec<&str> = self.modules.iter().map(|(_, m)| m.name.as_str()).collect();
        f.debug_struct("Assembly")
            .field("token", &self.token)
            .field("identity", &self.identity)
            .field("flags", &self.flags)
            .field("modules", &modules)
            .finish()
    }
}

/// Fluent builder for [`Assembly`]
#[derive(Debug, Clone)]
pub struct AssemblyBuilder {
    token: Token,
    name: Option<String>,
    version: AssemblyVersion,
    culture: Option<String>,
    strong_name: Option<StrongName>,
    flags: AssemblyFlags,
}

impl Default for AssemblyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AssemblyBuilder {
    /// Creates a new builder for a culture-neutral, unsigned assembly
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: Token::from_parts(Token::ASSEMBLY, 1),
            name: None,
            version: AssemblyVersion::default(),
            culture: None,
            strong_name: None,
            flags: AssemblyFlags::empty(),
        }
    }

    /// Sets the simple name (required)
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the version
    #[must_use]
    pub fn version(mut self, version: AssemblyVersion) -> Self {
        self.version = version;
        self
    }

    /// Sets the culture
    #[must_use]
    pub fn culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = Some(culture.into());
        self
    }

    /// Sets the full public key and the `PUBLIC_KEY` flag
    #[must_use]
    pub fn public_key(mut self, key: Vec<u8>) -> Self {
        self.strong_name = Some(StrongName::PublicKey(key));
        self.flags |= AssemblyFlags::PUBLIC_KEY;
        self
    }

    /// Sets a public key token
    #[must_use]
    pub fn public_key_token(mut self, token: [u8; 8]) -> Self {
        self.strong_name = Some(StrongName::Token(token));
        self
    }

    /// Adds assembly flags
    #[must_use]
    pub fn flags(mut self, flags: AssemblyFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Builds the assembly, without modules
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if no name was given.
    pub fn build(self) -> Result<AssemblyRc> {
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .ok_or(Error::InvalidArgument("name"))?;

        Ok(Arc::new(Assembly {
            token: self.token,
            identity: AssemblyIdentity::new(name, self.version, self.culture, self.strong_name),
            flags: self.flags,
            modules: Arc::new(boxcar::Vec::new()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::module::ModuleBuilder;

    #[test]
    fn test_winrt_content_type() {
        let assembly = AssemblyBuilder::new()
            .name("Windows.Foundation")
            .version(AssemblyVersion::new(255, 255, 255, 255))
            .flags(AssemblyFlags::CONTENT_TYPE_WINDOWS_RUNTIME)
            .build()
            .unwrap();

        assert!(assembly.is_content_type_windows_runtime());
        assert!(assembly.full_name().ends_with(", ContentType=WindowsRuntime"));
    }

    #[test]
    fn test_retargetable_full_name() {
        let assembly = AssemblyBuilder::new()
            .name("System")
            .version(AssemblyVersion::new(2, 0, 5, 0))
            .public_key_token([0x7c, 0xec, 0x85, 0xd7, 0xbe, 0xa7, 0x79, 0x8e])
            .flags(AssemblyFlags::RETARGETABLE)
            .build()
            .unwrap();

        assert_eq!(
            assembly.full_name(),
            "System, Version=2.0.5.0, Culture=neutral, PublicKeyToken=7cec85d7bea7798e, Retargetable=Yes"
        );
    }

    #[test]
    fn test_modules_get_back_reference() {
        let assembly = AssemblyBuilder::new().name("App").build().unwrap();
        let main = ModuleBuilder::new().name("App.exe").build().unwrap();
        let helper = ModuleBuilder::new().name("Helper.netmodule").build().unwrap();

        assembly.add_module(main.clone()).unwrap();
        assembly.add_module(helper.clone()).unwrap();

        assert_eq!(assembly.module_count(), 2);
        assert!(Arc::ptr_eq(&main.assembly().unwrap(), &assembly));
        assert!(Arc::ptr_eq(&assembly.manifest_module().unwrap(), &main));
    }

    #[test]
    fn test_module_cannot_join_two_assemblies() {
        let first = AssemblyBuilder::new().name("First").build().unwrap();
        let second = AssemblyBuilder::new().name("Second").build().unwrap();
        let module = ModuleBuilder::new().name("Shared.dll").build().unwrap();

        first.add_module(module.clone()).unwrap();
        assert!(matches!(
            second.add_module(module),
            Err(Error::InvalidArgument("module"))
        ));
        assert_eq!(second.module_count(), 0);
    }

    #[test]
    fn test_build_requires_name() {
        assert!(AssemblyBuilder::new().build().is_err());
    }

    #[test]
    fn test_satellite_culture() {
        let assembly = AssemblyBuilder::new()
            .name("App.resources")
            .version(AssemblyVersion::new(1, 0, 0, 0))
            .culture("de-DE")
            .build()
            .unwrap();

        assert_eq!(assembly.token.table(), Token::ASSEMBLY);
        assert_eq!(
            assembly.full_name(),
            "App.resources, Version=1.0.0.0, Culture=de-DE, PublicKeyToken=null"
        );
    }

    #[test]
    fn test_debug_lists_module_names() {
        let assembly = AssemblyBuilder::new().name("App").build().unwrap();
        assembly
            .add_module(ModuleBuilder::new().name("App.exe").build().unwrap())
            .unwrap();

        let debug = format!("{assembly:?}");
        assert!(debug.starts_with("Assembly {"));
        assert!(debug.contains("[\"App.exe\"]"));
    }
}
