//! The comment block written in front of a decompiled assembly or module.
//!
//! For an assembly or module the header names the file, the assembly identity, the members
//! of the global `<Module>` type, the resolved entry point, the target platform and
//! runtime, and the build timestamp of the PE image, e.g.:
//!
//! ```text
//! // /opt/app/App.exe
//! // App, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null
//!
//! // Entry point: Contoso.Program.Main
//! // Architecture: AnyCPU (64-bit preferred)
//! // Runtime: .NET 4.0
//! // Timestamp: 5F5E1000 (09/13/2020 12:26:40 PM)
//!
//! ```
//!
//! Every line goes through the [`Language`] in use, so comment delimiters and name
//! rendering follow the output language. Absent optional metadata (no entry point, no PE
//! image, an unknown runtime) only omits the corresponding line.

use bitflags::bitflags;
use chrono::{DateTime, TimeDelta, Utc};
use log::trace;

use crate::{
    entrypoint::{resolve_entry_point, EntryPoint},
    language::Language,
    metadata::{
        assembly::AssemblyRc,
        members::{MemberDef, MemberRef},
        module::{Machine, Module, ModuleRc},
    },
    options::{DecompilationOptions, DisplayLocale},
    output::{TextOutput, TextTokenKind},
    Error, Result,
};

pub(crate) const TYPES_LABEL: &str = "Types:";
const GLOBAL_TYPE_LABEL: &str = "Global type:";
const ENTRY_POINT_LABEL: &str = "Entry point:";
const ARCHITECTURE_LABEL: &str = "Architecture:";
const RUNTIME_LABEL: &str = "Runtime:";
const UNMANAGED_CODE: &str = "This assembly contains unmanaged code.";
const ANY_CPU_32BIT_PREFERRED: &str = "AnyCPU (32-bit preferred)";
const ANY_CPU_64BIT_PREFERRED: &str = "AnyCPU (64-bit preferred)";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Parts of the header to write
    pub struct DecompileAssemblyFlags: u32 {
        /// Assembly identity and entry point
        const ASSEMBLY = 0x0001;
        /// Module name, global members, entry point, platform and runtime
        const MODULE = 0x0002;
        /// Both parts
        const ASSEMBLY_AND_MODULE = Self::ASSEMBLY.bits() | Self::MODULE.bits();
    }
}

impl Default for DecompileAssemblyFlags {
    fn default() -> Self {
        DecompileAssemblyFlags::ASSEMBLY_AND_MODULE
    }
}

/// What a header is written for
#[derive(Debug, Clone, Copy)]
pub enum HeaderTarget<'a> {
    /// A single module, together with its assembly if it has one
    Module(&'a ModuleRc),
    /// An assembly, described through its manifest module
    Assembly(&'a AssemblyRc),
}

impl HeaderTarget<'_> {
    /// The module the header describes
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for an assembly without modules.
    pub fn module(&self) -> Result<ModuleRc> {
        match self {
            HeaderTarget::Module(module) => Ok((*module).clone()),
            HeaderTarget::Assembly(assembly) => assembly
                .manifest_module()
                .ok_or(Error::InvalidArgument("assembly")),
        }
    }

    /// The assembly the header describes, if any
    #[must_use]
    pub fn assembly(&self) -> Option<AssemblyRc> {
        match self {
            HeaderTarget::Module(module) => module.assembly(),
            HeaderTarget::Assembly(assembly) => Some((*assembly).clone()),
        }
    }
}

impl<'a> From<&'a ModuleRc> for HeaderTarget<'a> {
    fn from(value: &'a ModuleRc) -> Self {
        HeaderTarget::Module(value)
    }
}

impl<'a> From<&'a AssemblyRc> for HeaderTarget<'a> {
    fn from(value: &'a AssemblyRc) -> Self {
        HeaderTarget::Assembly(value)
    }
}

/// Write the identity lines of the header
///
/// These are the location of the module and, depending on `flags`, the display name of the
/// assembly (`Name [WinRT]` for Windows Runtime assemblies) or the name of the module.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] for an assembly without modules.
pub fn decompile_assembly<L: Language + ?Sized>(
    lang: &L,
    target: HeaderTarget<'_>,
    output: &mut dyn TextOutput,
    flags: DecompileAssemblyFlags,
) -> Result<()> {
    let module = target.module()?;
    let assembly = target.assembly();

    lang.write_comment_line(output, &module.display_location());
    match &assembly {
        Some(assembly) if flags.contains(DecompileAssemblyFlags::ASSEMBLY) => {
            if assembly.is_content_type_windows_runtime() {
                lang.write_comment_line(output, &format!("{} [WinRT]", assembly.name()));
            } else {
                lang.write_comment_line(output, &assembly.full_name());
            }
        }
        _ if flags.contains(DecompileAssemblyFlags::MODULE) => {
            lang.write_comment_line(output, &module.name);
        }
        _ => {}
    }
    Ok(())
}

/// Write the full header of an assembly or module
///
/// Entry points forwarded to sibling modules are resolved against the files on disk.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] for an assembly without modules.
pub fn write_module_assembly<L: Language + ?Sized>(
    lang: &L,
    target: HeaderTarget<'_>,
    output: &mut dyn TextOutput,
    options: &DecompilationOptions,
    flags: DecompileAssemblyFlags,
) -> Result<()> {
    decompile_assembly(lang, target, output, flags)?;
    let module = target.module()?;
    let with_assembly = flags.contains(DecompileAssemblyFlags::ASSEMBLY);
    let with_module = flags.contains(DecompileAssemblyFlags::MODULE);

    output.write_line();

    if with_module {
        write_global_members(lang, &module, output, options);
    }

    if with_module || with_assembly {
        trace!("Resolving entry point of '{}'", module.name);
        print_entry_point(lang, &resolve_entry_point(&module), output);
    }

    if with_module {
        trace!("Writing platform of '{}'", module.name);
        lang.write_comment_line(
            output,
            &format!("{} {}", ARCHITECTURE_LABEL, platform_display_name(&module)),
        );
        if !module.is_il_only() {
            lang.write_comment_line(output, UNMANAGED_CODE);
        }
        if let Some(runtime) = runtime_display_name(&module) {
            lang.write_comment_line(output, &format!("{RUNTIME_LABEL} {runtime}"));
        }
    }

    if with_module || with_assembly {
        if let Some(pe_image) = &module.pe_image {
            let timestamp = pe_image.time_date_stamp;
            let date = format_timestamp(timestamp, &options.locale);
            lang.write_comment_line(output, &format!("Timestamp: {timestamp:08X} ({date})"));
        }
        output.write_line();
    }

    Ok(())
}

fn write_global_members<L: Language + ?Sized>(
    lang: &L,
    module: &Module,
    output: &mut dyn TextOutput,
    options: &DecompilationOptions,
) {
    let Some(global) = &module.global_type else {
        return;
    };

    let members: Vec<_> = MemberRef::members_of(global)
        .into_iter()
        .filter(|member| lang.show_member(member, &options.settings))
        .collect();
    if members.is_empty() {
        return;
    }

    trace!("Writing {} global members of '{}'", members.len(), module.name);
    lang.write_comment_begin(output, true);
    output.write(GLOBAL_TYPE_LABEL, TextTokenKind::Comment);
    output.write(" ", TextTokenKind::Comment);
    lang.write_type_reference(output, global, true, TextTokenKind::Comment);
    lang.write_comment_end(output, true);
    output.write_line();

    for member in &members {
        lang.write_comment_begin(output, true);
        lang.write_member_reference(output, member, TextTokenKind::Comment);
        lang.write_comment_end(output, true);
        output.write_line();
    }
}

/// Write the line describing a resolved entry point
///
/// A native entry point is shown by its RVA, a managed one as `DeclaringType.Method` with
/// both names rendered and linked by `lang`. Nothing is written for [`EntryPoint::None`].
pub fn print_entry_point<L: Language + ?Sized>(
    lang: &L,
    entry_point: &EntryPoint,
    output: &mut dyn TextOutput,
) {
    match entry_point {
        EntryPoint::None => {}
        EntryPoint::Native(rva) => {
            lang.write_comment_line(output, &format!("Native Entry point: 0x{rva:08x}"));
        }
        EntryPoint::Managed(method) => {
            lang.write_comment_begin(output, true);
            output.write(ENTRY_POINT_LABEL, TextTokenKind::Comment);
            output.write(" ", TextTokenKind::Comment);
            if let Some(declaring) = method.declaring_type() {
                lang.write_type_reference(output, &declaring, true, TextTokenKind::Comment);
                output.write(".", TextTokenKind::Comment);
            }
            lang.write_member_reference(
                output,
                &MemberRef::Method(method.clone()),
                TextTokenKind::Comment,
            );
            lang.write_comment_end(output, true);
            output.write_line();
        }
    }
}

/// The platform a module targets, as shown in the header
#[must_use]
pub fn platform_display_name(module: &Module) -> String {
    match module.machine {
        Machine::I386 => {
            if module.is_32bit_preferred() {
                ANY_CPU_32BIT_PREFERRED.to_string()
            } else if module.is_32bit_required() {
                "x86".to_string()
            } else {
                ANY_CPU_64BIT_PREFERRED.to_string()
            }
        }
        Machine::AMD64 => "x64".to_string(),
        Machine::IA64 => "Itanium".to_string(),
        Machine::ARMNT => "ARM".to_string(),
        Machine::ARM64 => "ARM64".to_string(),
        other => other.to_string(),
    }
}

/// The runtime a module targets, or `None` if its metadata version is not known
#[must_use]
pub fn runtime_display_name(module: &Module) -> Option<&'static str> {
    if module.is_clr10() {
        Some(".NET 1.0")
    } else if module.is_clr11() {
        Some(".NET 1.1")
    } else if module.is_clr20() {
        Some(".NET 2.0")
    } else if module.is_clr40() {
        Some(".NET 4.0")
    } else {
        None
    }
}

/// The UTC time of a PE `TimeDateStamp`, seconds since the Unix epoch
#[must_use]
pub fn pe_timestamp_to_datetime(timestamp: u32) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + TimeDelta::seconds(i64::from(timestamp))
}

/// A PE `TimeDateStamp` as date and time in `locale`
#[must_use]
pub fn format_timestamp(timestamp: u32, locale: &DisplayLocale) -> String {
    pe_timestamp_to_datetime(timestamp)
        .format_localized("%x %X", locale.locale())
        .to_string()
}
