//! Modules: the physical compiled units an assembly is made of.
//!
//! A [`Module`] carries everything the header emitter and the entry point resolver read:
//! the module's name and on-disk location, the native and managed entry points from the
//! CLR header, the target [`Machine`], the [`CorFlags`], the metadata runtime version
//! string and, when available, the [`PeImage`] file header values.
//!
//! Modules are built with a [`ModuleBuilder`] and attached to an assembly with
//! [`crate::metadata::assembly::Assembly::add_module`], which installs the module's
//! non-owning back-reference to its assembly.
//!
//! # Examples
//!
//! ```rust
//! use dotscope_lang::metadata::module::{CorFlags, Machine, ModuleBuilder};
//!
//! let module = ModuleBuilder::new()
//!     .name("App.exe")
//!     .location("/opt/app/App.exe")
//!     .machine(Machine::AMD64)
//!     .cor_flags(CorFlags::IL_ONLY)
//!     .runtime_version("v4.0.30319")
//!     .build()?;
//!
//! assert!(module.is_il_only());
//! assert!(module.is_clr40());
//! assert_eq!(module.file_name().as_deref(), Some("App.exe"));
//! # Ok::<(), dotscope_lang::Error>(())
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, Weak};

use bitflags::bitflags;

use crate::{
    metadata::{
        assembly::{Assembly, AssemblyRc},
        members::MethodRc,
        token::Token,
        typesystem::{CilTypeList, CilTypeRc},
    },
    Error, Result,
};

/// Reference to a `Module`
pub type ModuleRc = Arc<Module>;
/// Reference to a `File`
pub type FileRc = Arc<File>;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Runtime flags of the CLR header (`COMIMAGE_FLAGS_*`, §II.25.3.3.1)
    pub struct CorFlags: u32 {
        /// The image contains IL code only
        const IL_ONLY = 0x0000_0001;
        /// The image can only be loaded into a 32-bit process
        const REQUIRED_32BIT = 0x0000_0002;
        /// The image is an IL library
        const IL_LIBRARY = 0x0000_0004;
        /// The image has a strong name signature
        const STRONG_NAME_SIGNED = 0x0000_0008;
        /// The entry point field holds an RVA of native code
        const NATIVE_ENTRYPOINT = 0x0000_0010;
        /// The loader and JIT track debug information
        const TRACK_DEBUG_DATA = 0x0001_0000;
        /// The image prefers running in a 32-bit process
        const PREFERRED_32BIT = 0x0002_0000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Flags of a `File` row (`FileAttributes`, §II.23.1.6)
    pub struct FileAttributes: u32 {
        /// The file is not a resource file
        const CONTAINS_METADATA = 0x0000;
        /// The file is a resource file or other non-metadata-containing file
        const CONTAINS_NO_METADATA = 0x0001;
    }
}

// Values XOR-ed into the machine field of ReadyToRun images built for a non-Windows OS
const MACHINE_OS_OVERRIDES: [u16; 5] = [0x4644, 0xADC4, 0x7B79, 0x1993, 0x1992];

/// Target machine of the PE file header (`IMAGE_FILE_MACHINE_*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Machine {
    /// Intel 386 and compatible (also used by AnyCPU images)
    #[default]
    I386,
    /// x64
    AMD64,
    /// Intel Itanium
    IA64,
    /// ARM little endian
    ARM,
    /// ARM Thumb
    THUMB,
    /// ARM Thumb-2 little endian
    ARMNT,
    /// ARM64 little endian
    ARM64,
    /// RISC-V 64-bit
    RISCV64,
    /// LoongArch 64-bit
    LOONGARCH64,
    /// Any other machine value
    Other(u16),
}

impl Machine {
    /// Map a raw machine value, undoing the OS-specific override of ReadyToRun images
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        let direct = Self::from_known(raw);
        if !matches!(direct, Machine::Other(_)) {
            return direct;
        }

        MACHINE_OS_OVERRIDES
            .iter()
            .map(|os| Self::from_known(raw ^ os))
            .find(|machine| !matches!(machine, Machine::Other(_)))
            .unwrap_or(direct)
    }

    fn from_known(raw: u16) -> Self {
        match raw {
            0x014C => Machine::I386,
            0x8664 => Machine::AMD64,
            0x0200 => Machine::IA64,
            0x01C0 => Machine::ARM,
            0x01C2 => Machine::THUMB,
            0x01C4 => Machine::ARMNT,
            0xAA64 => Machine::ARM64,
            0x5064 => Machine::RISCV64,
            0x6264 => Machine::LOONGARCH64,
            other => Machine::Other(other),
        }
    }

    /// The raw machine value
    #[must_use]
    pub fn raw(&self) -> u16 {
        match self {
            Machine::I386 => 0x014C,
            Machine::AMD64 => 0x8664,
            Machine::IA64 => 0x0200,
            Machine::ARM => 0x01C0,
            Machine::THUMB => 0x01C2,
            Machine::ARMNT => 0x01C4,
            Machine::ARM64 => 0xAA64,
            Machine::RISCV64 => 0x5064,
            Machine::LOONGARCH64 => 0x6264,
            Machine::Other(raw) => *raw,
        }
    }
}

impl From<u16> for Machine {
    fn from(value: u16) -> Self {
        Machine::from_raw(value)
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Machine::I386 => f.write_str("I386"),
            Machine::AMD64 => f.write_str("AMD64"),
            Machine::IA64 => f.write_str("IA64"),
            Machine::ARM => f.write_str("ARM"),
            Machine::THUMB => f.write_str("THUMB"),
            Machine::ARMNT => f.write_str("ARMNT"),
            Machine::ARM64 => f.write_str("ARM64"),
            Machine::RISCV64 => f.write_str("RISCV64"),
            Machine::LOONGARCH64 => f.write_str("LOONGARCH64"),
            Machine::Other(raw) => write!(f, "0x{raw:04X}"),
        }
    }
}

/// Values read from the PE file header of the image a module was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeImage {
    /// `TimeDateStamp` of the COFF file header, seconds since the Unix epoch
    pub time_date_stamp: u32,
}

/// A `File` row of the manifest (§II.22.19), naming another file of the assembly
pub struct File {
    /// Token
    pub token: Token,
    /// The file name, without any directory
    pub name: String,
    /// a 4-byte bitmask of type `FileAttributes`
    pub flags: FileAttributes,
}

impl File {
    /// Create a new `File` row for a file containing metadata
    pub fn new(token: Token, name: impl Into<String>) -> FileRc {
        Arc::new(File {
            token,
            name: name.into(),
            flags: FileAttributes::CONTAINS_METADATA,
        })
    }

    /// Returns true if `file_name` names this file, ignoring ASCII and Unicode case
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.name.eq_ignore_ascii_case(file_name)
            || self.name.to_lowercase() == file_name.to_lowercase()
    }
}

/// The managed entry point of a module, as named by the CLR header's entry point token
#[derive(Clone)]
pub enum ManagedEntryPoint {
    /// A method defined in this module
    Method(MethodRc),
    /// Another file of the assembly which holds the entry point
    File(FileRc),
}

impl fmt::Debug for ManagedEntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagedEntryPoint::Method(method) => write!(f, "Method({})", method.name),
            ManagedEntryPoint::File(file) => write!(f, "File({})", file.name),
        }
    }
}

/// One physical module of an assembly
pub struct Module {
    /// Token
    pub token: Token,
    /// Name of this module
    pub name: String,
    /// Path the module was loaded from, empty for in-memory modules
    pub location: PathBuf,
    /// RVA of the native entry point, 0 if absent
    pub native_entry_point: u32,
    /// The managed entry point, if any
    pub managed_entry_point: Option<ManagedEntryPoint>,
    /// Target machine
    pub machine: Machine,
    /// Flags of the CLR header
    pub cor_flags: CorFlags,
    /// Version string of the metadata root (e.g. "v4.0.30319")
    pub runtime_version: String,
    /// PE file header values, `None` for modules not backed by a PE image
    pub pe_image: Option<PeImage>,
    /// The global `<Module>` type
    pub global_type: Option<CilTypeRc>,
    /// All types defined in this module
    pub types: CilTypeList,
    assembly: OnceLock<Weak<Assembly>>,
}

impl Module {
    /// The assembly this module belongs to, if any
    #[must_use]
    pub fn assembly(&self) -> Option<AssemblyRc> {
        self.assembly.get().and_then(Weak::upgrade)
    }

    pub(crate) fn set_assembly(&self, assembly: &AssemblyRc) -> bool {
        self.assembly.set(Arc::downgrade(assembly)).is_ok()
    }

    /// The file name part of this module's location
    #[must_use]
    pub fn file_name(&self) -> Option<String> {
        self.location
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// The location as shown in headers, falling back to the module name
    #[must_use]
    pub fn display_location(&self) -> String {
        if self.location.as_os_str().is_empty() {
            self.name.clone()
        } else {
            self.location.display().to_string()
        }
    }

    /// Returns true if the image contains IL code only
    #[must_use]
    pub fn is_il_only(&self) -> bool {
        self.cor_flags.contains(CorFlags::IL_ONLY)
    }

    /// Returns true if the image must run in a 32-bit process
    #[must_use]
    pub fn is_32bit_required(&self) -> bool {
        self.cor_flags.contains(CorFlags::REQUIRED_32BIT)
    }

    /// Returns true if the image prefers a 32-bit process
    #[must_use]
    pub fn is_32bit_preferred(&self) -> bool {
        self.cor_flags.contains(CorFlags::PREFERRED_32BIT)
    }

    /// Returns true if the metadata targets the CLR 1.0
    #[must_use]
    pub fn is_clr10(&self) -> bool {
        let version = self.runtime_version.as_str();
        version.starts_with("v1.0")
            || version.starts_with("v1.x86")
            || version == "retail"
            || version == "COMPLUS"
    }

    /// Returns true if the metadata targets the CLR 1.1
    #[must_use]
    pub fn is_clr11(&self) -> bool {
        self.runtime_version.starts_with("v1.1")
    }

    /// Returns true if the metadata targets the CLR 2.0
    #[must_use]
    pub fn is_clr20(&self) -> bool {
        self.runtime_version.starts_with("v2.0")
    }

    /// Returns true if the metadata targets the CLR 4.0
    #[must_use]
    pub fn is_clr40(&self) -> bool {
        self.runtime_version.starts_with("v4.0")
    }

    /// Returns true if `location` exists according to `exists`, used by sibling lookups
    pub(crate) fn location_exists(&self, exists: impl Fn(&Path) -> bool) -> bool {
        !self.location.as_os_str().is_empty() && exists(&self.location)
    }
}

/// Fluent builder for [`Module`]
#[derive(Clone)]
pub struct ModuleBuilder {
    token: Token,
    name: Option<String>,
    location: PathBuf,
    native_entry_point: u32,
    managed_entry_point: Option<ManagedEntryPoint>,
    machine: Machine,
    cor_flags: CorFlags,
    runtime_version: String,
    pe_image: Option<PeImage>,
    global_type: Option<CilTypeRc>,
    types: Vec<CilTypeRc>,
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("native_entry_point", &self.native_entry_point)
            .field("managed_entry_point", &self.managed_entry_point)
            .field("machine", &self.machine)
            .field("cor_flags", &self.cor_flags)
            .finish_non_exhaustive()
    }
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleBuilder {
    /// Creates a new builder for an IL-only I386 (AnyCPU) module
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: Token::from_parts(Token::MODULE, 1),
            name: None,
            location: PathBuf::new(),
            native_entry_point: 0,
            managed_entry_point: None,
            machine: Machine::I386,
            cor_flags: CorFlags::IL_ONLY,
            runtime_version: String::new(),
            pe_image: None,
            global_type: None,
            types: Vec::new(),
        }
    }

    /// Sets the module token
    #[must_use]
    pub fn token(mut self, token: Token) -> Self {
        self.token = token;
        self
    }

    /// Sets the module name (required)
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the path the module was loaded from
    #[must_use]
    pub fn location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the RVA of the native entry point
    #[must_use]
    pub fn native_entry_point(mut self, rva: u32) -> Self {
        self.native_entry_point = rva;
        self
    }

    /// Makes `method` the managed entry point
    #[must_use]
    pub fn entry_point_method(mut self, method: MethodRc) -> Self {
        self.managed_entry_point = Some(ManagedEntryPoint::Method(method));
        self
    }

    /// Forwards the managed entry point to another file of the assembly
    #[must_use]
    pub fn entry_point_file(mut self, file: FileRc) -> Self {
        self.managed_entry_point = Some(ManagedEntryPoint::File(file));
        self
    }

    /// Sets the target machine
    #[must_use]
    pub fn machine(mut self, machine: Machine) -> Self {
        self.machine = machine;
        self
    }

    /// Sets the CLR header flags
    #[must_use]
    pub fn cor_flags(mut self, flags: CorFlags) -> Self {
        self.cor_flags = flags;
        self
    }

    /// Sets the metadata runtime version string
    #[must_use]
    pub fn runtime_version(mut self, version: impl Into<String>) -> Self {
        self.runtime_version = version.into();
        self
    }

    /// Sets the PE `TimeDateStamp`, marking the module as backed by a PE image
    #[must_use]
    pub fn timestamp(mut self, time_date_stamp: u32) -> Self {
        self.pe_image = Some(PeImage { time_date_stamp });
        self
    }

    /// Sets the global `<Module>` type
    #[must_use]
    pub fn global_type(mut self, global: CilTypeRc) -> Self {
        self.global_type = Some(global);
        self
    }

    /// Adds a type defined in this module
    #[must_use]
    pub fn add_type(mut self, ty: CilTypeRc) -> Self {
        self.types.push(ty);
        self
    }

    /// Builds the module
    ///
    /// The global type, if set, is also the first entry of [`Module::types`].
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if no name was given.
    pub fn build(self) -> Result<ModuleRc> {
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .ok_or(Error::InvalidArgument("name"))?;

        let types = Arc::new(boxcar::Vec::with_capacity(self.types.len() + 1));
        if let Some(global) = &self.global_type {
            types.push(global.clone());
        }
        for ty in self.types {
            types.push(ty);
        }

        Ok(Arc::new(Module {
            token: self.token,
            name,
            location: self.location,
            native_entry_point: self.native_entry_point,
            managed_entry_point: self.managed_entry_point,
            machine: self.machine,
            cor_flags: self.cor_flags,
            runtime_version: self.runtime_version,
            pe_image: self.pe_image,
            global_type: self.global_type,
            types,
            assembly: OnceLock::new(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_with_runtime(version: &str) -> ModuleRc {
        ModuleBuilder::new()
            .name("test.dll")
            .runtime_version(version)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_name() {
        assert!(matches!(
            ModuleBuilder::new().build(),
            Err(Error::InvalidArgument("name"))
        ));
        assert!(ModuleBuilder::new().name("").build().is_err());
    }

    #[test]
    fn test_default_token_is_first_module_row() {
        let module = ModuleBuilder::new().name("App.exe").build().unwrap();
        assert_eq!(module.token.table(), Token::MODULE);
        assert_eq!(module.token.row(), 1);
    }

    #[test]
    fn test_clr_versions() {
        let clr10 = module_with_runtime("v1.0.3705");
        assert!(clr10.is_clr10() && !clr10.is_clr11());
        assert!(module_with_runtime("COMPLUS").is_clr10());
        assert!(module_with_runtime("v1.1.4322").is_clr11());

        let clr20 = module_with_runtime("v2.0.50727");
        assert!(clr20.is_clr20() && !clr20.is_clr40());

        let clr40 = module_with_runtime("v4.0.30319");
        assert!(clr40.is_clr40() && !clr40.is_clr20());

        let unknown = module_with_runtime("");
        assert!(!unknown.is_clr10() && !unknown.is_clr11());
        assert!(!unknown.is_clr20() && !unknown.is_clr40());
    }

    #[test]
    fn test_machine_roundtrip_and_overrides() {
        assert_eq!(Machine::from_raw(0x8664), Machine::AMD64);
        assert_eq!(Machine::from_raw(0x014C), Machine::I386);
        // AMD64 ReadyToRun image built for Linux
        assert_eq!(Machine::from_raw(0x8664 ^ 0x7B79), Machine::AMD64);
        // ARM64 ReadyToRun image built for macOS
        assert_eq!(Machine::from_raw(0xAA64 ^ 0x4644), Machine::ARM64);
        assert_eq!(Machine::from_raw(0x0EBC), Machine::Other(0x0EBC));
        assert_eq!(Machine::ARMNT.raw(), 0x01C4);
    }

    #[test]
    fn test_machine_display() {
        assert_eq!(Machine::AMD64.to_string(), "AMD64");
        assert_eq!(Machine::Other(0x0EBC).to_string(), "0x0EBC");
    }

    #[test]
    fn test_bitness_flags() {
        let module = ModuleBuilder::new()
            .name("x86.exe")
            .cor_flags(CorFlags::IL_ONLY | CorFlags::REQUIRED_32BIT)
            .build()
            .unwrap();
        assert!(module.is_il_only());
        assert!(module.is_32bit_required());
        assert!(!module.is_32bit_preferred());
    }

    #[test]
    fn test_display_location_falls_back_to_name() {
        let module = ModuleBuilder::new().name("InMemory.dll").build().unwrap();
        assert_eq!(module.display_location(), "InMemory.dll");
        assert!(module.file_name().is_none());

        let on_disk = ModuleBuilder::new()
            .name("App.exe")
            .location("/opt/app/App.exe")
            .build()
            .unwrap();
        assert_eq!(on_disk.file_name().as_deref(), Some("App.exe"));
    }

    #[test]
    fn test_file_matches_case_insensitive() {
        let file = File::new(Token::new(0x26000001), "Helper.NetModule");
        assert!(file.matches("helper.netmodule"));
        assert!(file.matches("HELPER.NETMODULE"));
        assert!(!file.matches("helper.dll"));
    }

    #[test]
    fn test_global_type_is_first_type() {
        let global = crate::metadata::typesystem::CilType::global(Token::new(0x02000001));
        let program = crate::test::create_type("App", "Program");
        let module = ModuleBuilder::new()
            .name("App.exe")
            .add_type(program)
            .global_type(global)
            .build()
            .unwrap();

        assert_eq!(module.types.count(), 2);
        assert!(module.types.get(0).unwrap().is_global());
    }
}
