//! The contract an output language implements.
//!
//! A renderer is one implementation of two traits:
//!
//! - [`NameFormatter`] renders names of types and members: escaped, highlighted and, where
//!   possible, linked back to the entity they name. Every method has a default, so a
//!   language only overrides what its syntax needs.
//! - [`Language`] adds the language's identity and one hook per entity kind. The default
//!   hooks write a single comment line naming the entity; a language overrides them to
//!   produce full declarations.
//!
//! The header emitter ([`crate::header`]) and the entry point resolver are shared by all
//! languages and only reach the renderer through these traits.
//!
//! # Examples
//!
//! ```rust
//! use dotscope_lang::prelude::*;
//!
//! struct Basic;
//!
//! impl NameFormatter for Basic {
//!     fn write_comment_begin(&self, output: &mut dyn TextOutput, add_space: bool) {
//!         output.write(if add_space { "' " } else { "'" }, TextTokenKind::Comment);
//!     }
//! }
//!
//! impl Language for Basic {
//!     fn generic_name(&self) -> &str { "Basic" }
//!     fn unique_name(&self) -> &str { "Basic" }
//!     fn order(&self) -> f64 { 10.0 }
//!     fn generic_guid(&self) -> Guid { guid!("a4f35508-691f-4bd0-b74d-d5d5d1d0e8e6") }
//!     fn unique_guid(&self) -> Guid { guid!("a4f35508-691f-4bd0-b74d-d5d5d1d0e8e6") }
//!     fn file_extension(&self) -> &str { ".vb" }
//! }
//!
//! let program = CilType::new(Token::new(0x02000002), "Contoso", "Program", 0);
//! let mut output = PlainTextOutput::new();
//! Basic.decompile_type(&program, &mut output, &DecompilationOptions::default())?;
//! assert_eq!(output.as_str(), "' Contoso.Program\n");
//! # Ok::<(), dotscope_lang::Error>(())
//! ```

use std::any::Any;

use bitflags::bitflags;
use strum::{Display, EnumIter};
use uguid::Guid;

use crate::{
    escape::escape_identifier,
    header::{self, DecompileAssemblyFlags, HeaderTarget},
    metadata::{
        members::{Event, Field, MemberDef, MemberRef, Method, Property, Variable},
        typesystem::{CilType, CilTypeRc},
    },
    options::{DecompilationOptions, DecompilerSettings},
    output::{PlainTextOutput, TextOutput, TextTokenKind},
    Error, Result,
};

/// Synthetic views a language may be able to produce besides entity declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum DecompilationType {
    /// One part of a type whose members are spread over several views
    PartialType,
    /// The assembly-level attributes of an assembly, as a source file
    AssemblyInfo,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Options of the short member form written by [`NameFormatter::write_member`]
    pub struct PrinterFlags: u32 {
        /// Qualify type names with their namespace
        const SHOW_NAMESPACES = 0x0001;
        /// Append the metadata token
        const SHOW_TOKENS = 0x0002;
        /// Flags used for tooltips
        const DEFAULT = Self::SHOW_NAMESPACES.bits();
    }
}

impl Default for PrinterFlags {
    fn default() -> Self {
        PrinterFlags::DEFAULT
    }
}

/// Renders names of types and members for one output language
pub trait NameFormatter {
    /// Start a comment
    fn write_comment_begin(&self, output: &mut dyn TextOutput, add_space: bool) {
        if add_space {
            output.write("// ", TextTokenKind::Comment);
        } else {
            output.write("//", TextTokenKind::Comment);
        }
    }

    /// End a comment started with [`NameFormatter::write_comment_begin`]
    fn write_comment_end(&self, _output: &mut dyn TextOutput, _add_space: bool) {}

    /// Write `text` as a complete comment line
    fn write_comment_line(&self, output: &mut dyn TextOutput, text: &str) {
        self.write_comment_begin(output, true);
        output.write(text, TextTokenKind::Comment);
        self.write_comment_end(output, true);
        output.write_line();
    }

    /// Write the escaped name of `ty`, qualified with namespace and enclosing types if asked
    fn type_to_string(&self, output: &mut dyn TextOutput, ty: &CilType, include_namespace: bool) {
        let name = if include_namespace {
            ty.fullname()
        } else {
            ty.name.clone()
        };
        output.write(&escape_identifier(&name), TextTokenKind::Type);
    }

    /// [`NameFormatter::type_to_string`] as plain text
    fn type_name_string(&self, ty: &CilType, include_namespace: bool) -> String {
        let mut output = PlainTextOutput::new();
        self.type_to_string(&mut output, ty, include_namespace);
        output.into_string()
    }

    /// Write the escaped simple name of `ty`
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `ty` is `None`.
    fn format_type_name(&self, output: &mut dyn TextOutput, ty: Option<&CilType>) -> Result<()> {
        let ty = ty.ok_or(Error::InvalidArgument("type"))?;
        output.write(&escape_identifier(&ty.name), TextTokenKind::Type);
        Ok(())
    }

    /// Write the escaped name of `method`, preceded by its declaring type if it has one
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `method` is `None`.
    fn format_method_name(&self, output: &mut dyn TextOutput, method: Option<&Method>) -> Result<()> {
        let method = method.ok_or(Error::InvalidArgument("method"))?;
        if let Some(declaring) = method.declaring_type() {
            self.type_to_string(output, &declaring, false);
            output.write(".", TextTokenKind::Operator);
        }
        output.write(&escape_identifier(&method.name), TextTokenKind::Method);
        Ok(())
    }

    /// Write the escaped name of `property`
    ///
    /// `is_indexer` forces (or suppresses) indexer notation in languages that have one;
    /// `None` lets the language decide from the property itself.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `property` is `None`.
    fn format_property_name(
        &self,
        output: &mut dyn TextOutput,
        property: Option<&Property>,
        is_indexer: Option<bool>,
    ) -> Result<()> {
        let _ = is_indexer;
        let property = property.ok_or(Error::InvalidArgument("property"))?;
        output.write(&escape_identifier(&property.name), TextTokenKind::Property);
        Ok(())
    }

    /// Write the name of `ty` as a reference to it, qualified if `include_namespace` is set
    ///
    /// The text is whatever [`NameFormatter::type_to_string`] renders for `ty`.
    fn write_type_reference(
        &self,
        output: &mut dyn TextOutput,
        ty: &CilTypeRc,
        include_namespace: bool,
        kind: TextTokenKind,
    ) {
        let name = self.type_name_string(ty, include_namespace);
        output.write_reference(&name, &MemberRef::Type(ty.clone()), kind);
    }

    /// Write the escaped simple name of `member` as a reference to it
    fn write_member_reference(
        &self,
        output: &mut dyn TextOutput,
        member: &MemberRef,
        kind: TextTokenKind,
    ) {
        output.write_reference(&escape_identifier(member.name()), member, kind);
    }

    /// Write the tooltip shown for `member`
    fn write_tooltip(&self, output: &mut dyn TextOutput, member: &MemberRef) {
        self.write_member(output, member, PrinterFlags::DEFAULT);
    }

    /// Write the short form of `member`: `DeclaringType.Name`
    fn write_member(&self, output: &mut dyn TextOutput, member: &MemberRef, flags: PrinterFlags) {
        let include_namespace = flags.contains(PrinterFlags::SHOW_NAMESPACES);
        match member {
            MemberRef::Type(ty) => {
                self.write_type_reference(output, ty, include_namespace, TextTokenKind::Type);
            }
            _ => {
                if let Some(declaring) = member.declaring_type() {
                    self.write_type_reference(output, &declaring, include_namespace, TextTokenKind::Type);
                    output.write(".", TextTokenKind::Operator);
                }
                self.write_member_reference(output, member, TextTokenKind::for_member(member));
            }
        }

        if flags.contains(PrinterFlags::SHOW_TOKENS) {
            output.write(" ", TextTokenKind::Text);
            output.write(&member.token().to_string(), TextTokenKind::Number);
        }
    }

    /// Write the tooltip of a local variable or parameter
    ///
    /// `name` overrides the variable's own name if it is not blank.
    fn write_variable_tooltip(&self, output: &mut dyn TextOutput, variable: &Variable, name: Option<&str>) {
        output.write(
            &escape_identifier(&variable.display_name(name)),
            TextTokenKind::Local,
        );
    }

    /// `DeclaringType.FullName.name`, or just `name` without declaring type
    fn qualified_member_name(&self, declaring_type: Option<&CilType>, name: &str) -> String {
        match declaring_type {
            Some(ty) => format!(
                "{}.{}",
                self.type_name_string(ty, true),
                escape_identifier(name)
            ),
            None => escape_identifier(name).into_owned(),
        }
    }
}

/// An output language: its identity plus one rendering hook per entity kind
///
/// Languages are shared between threads; every hook takes `&self` and writes into the sink
/// it is handed.
pub trait Language: NameFormatter + Send + Sync {
    /// Name shown to users, shared by all versions of the language
    fn generic_name(&self) -> &str;

    /// Name shown to users, unique to this implementation
    fn unique_name(&self) -> &str;

    /// Sort key among all languages, lowest first
    fn order(&self) -> f64;

    /// Identifier shared by all versions of the language
    fn generic_guid(&self) -> Guid;

    /// Identifier unique to this implementation
    fn unique_guid(&self) -> Guid;

    /// Extension of files written in this language, including the dot
    fn file_extension(&self) -> &str;

    /// Extension of project files, if the language has projects
    fn project_file_extension(&self) -> Option<&str> {
        None
    }

    /// Render a method
    ///
    /// # Errors
    /// The default never fails; overrides may report their own errors.
    fn decompile_method(
        &self,
        method: &Method,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> Result<()> {
        let _ = options;
        let declaring = method.declaring_type();
        let line = self.qualified_member_name(declaring.as_deref(), &method.name);
        self.write_comment_line(output, &line);
        Ok(())
    }

    /// Render a property
    ///
    /// # Errors
    /// The default never fails; overrides may report their own errors.
    fn decompile_property(
        &self,
        property: &Property,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> Result<()> {
        let _ = options;
        let declaring = property.declaring_type();
        let line = self.qualified_member_name(declaring.as_deref(), &property.name);
        self.write_comment_line(output, &line);
        Ok(())
    }

    /// Render a field
    ///
    /// # Errors
    /// The default never fails; overrides may report their own errors.
    fn decompile_field(
        &self,
        field: &Field,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> Result<()> {
        let _ = options;
        let declaring = field.declaring_type();
        let line = self.qualified_member_name(declaring.as_deref(), &field.name);
        self.write_comment_line(output, &line);
        Ok(())
    }

    /// Render an event
    ///
    /// # Errors
    /// The default never fails; overrides may report their own errors.
    fn decompile_event(
        &self,
        event: &Event,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> Result<()> {
        let _ = options;
        let declaring = event.declaring_type();
        let line = self.qualified_member_name(declaring.as_deref(), &event.name);
        self.write_comment_line(output, &line);
        Ok(())
    }

    /// Render a type
    ///
    /// # Errors
    /// The default never fails; overrides may report their own errors.
    fn decompile_type(
        &self,
        ty: &CilType,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> Result<()> {
        let _ = options;
        let name = self.type_name_string(ty, true);
        self.write_comment_line(output, &name);
        Ok(())
    }

    /// Render the types of one namespace
    ///
    /// The default writes the namespace, a `Types:` label and one linked line per type.
    ///
    /// # Errors
    /// The default never fails; overrides may report their own errors.
    fn decompile_namespace(
        &self,
        namespace: &str,
        types: &[CilTypeRc],
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> Result<()> {
        let _ = options;
        self.write_comment_line(output, &escape_identifier(namespace));
        self.write_comment_line(output, "");
        self.write_comment_line(output, header::TYPES_LABEL);
        self.write_comment_line(output, "");
        for ty in types {
            self.write_comment_begin(output, true);
            output.write_reference(
                &escape_identifier(&ty.name),
                &MemberRef::Type(ty.clone()),
                TextTokenKind::Comment,
            );
            self.write_comment_end(output, true);
            output.write_line();
        }
        Ok(())
    }

    /// Render the identity of an assembly or module
    ///
    /// The default writes the identity lines of the header, see
    /// [`header::decompile_assembly`].
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for an assembly without modules.
    fn decompile_assembly(
        &self,
        target: HeaderTarget<'_>,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
        flags: DecompileAssemblyFlags,
    ) -> Result<()> {
        let _ = options;
        header::decompile_assembly(self, target, output, flags)
    }

    /// Write the full header of an assembly or module, see [`header::write_module_assembly`]
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for an assembly without modules.
    fn write_module_assembly(
        &self,
        target: HeaderTarget<'_>,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
        flags: DecompileAssemblyFlags,
    ) -> Result<()> {
        header::write_module_assembly(self, target, output, options, flags)
    }

    /// Write a comment line linking to the declaring type of `member`
    ///
    /// Nothing is written for members without declaring type.
    fn write_comment_line_declaring_type(&self, output: &mut dyn TextOutput, member: &MemberRef) {
        let Some(declaring) = member.declaring_type() else {
            return;
        };

        let name = self.type_name_string(&declaring, true);
        self.write_comment_begin(output, true);
        output.write_reference(&name, &MemberRef::Type(declaring), TextTokenKind::Comment);
        self.write_comment_end(output, true);
        output.write_line();
    }

    /// Returns true if `member` should be shown with the given settings
    fn show_member(&self, member: &MemberRef, settings: &DecompilerSettings) -> bool {
        let _ = (member, settings);
        true
    }

    /// Returns true if this language can produce the synthetic view `kind`
    fn can_decompile(&self, kind: DecompilationType) -> bool {
        let _ = kind;
        false
    }

    /// Produce the synthetic view `kind` from `data`
    ///
    /// # Errors
    /// The default returns [`Error::UnsupportedOperation`] for every kind.
    fn decompile_synthetic(&self, kind: DecompilationType, data: &dyn Any) -> Result<()> {
        let _ = data;
        Err(Error::UnsupportedOperation(kind))
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::output::{TextFragment, TokenOutput};
    use crate::test::{create_event, create_field, create_method, create_property, create_type};

    struct Plain;

    impl NameFormatter for Plain {}

    impl Language for Plain {
        fn generic_name(&self) -> &str {
            "Plain"
        }

        fn unique_name(&self) -> &str {
            "Plain"
        }

        fn order(&self) -> f64 {
            0.0
        }

        fn generic_guid(&self) -> Guid {
            Guid::ZERO
        }

        fn unique_guid(&self) -> Guid {
            Guid::ZERO
        }

        fn file_extension(&self) -> &str {
            ".txt"
        }
    }

    fn render(f: impl FnOnce(&mut PlainTextOutput)) -> String {
        let mut output = PlainTextOutput::new();
        f(&mut output);
        output.into_string()
    }

    #[test]
    fn test_comment_delimiters() {
        assert_eq!(render(|o| Plain.write_comment_begin(o, true)), "// ");
        assert_eq!(render(|o| Plain.write_comment_begin(o, false)), "//");
        assert_eq!(render(|o| Plain.write_comment_end(o, true)), "");
        assert_eq!(render(|o| Plain.write_comment_line(o, "text")), "// text\n");
    }

    #[test]
    fn test_type_names() {
        let outer = create_type("Contoso", "Outer");
        let inner = create_type("", "Inner\u{0001}");
        outer.add_nested_type(inner.clone());

        assert_eq!(Plain.type_name_string(&outer, true), "Contoso.Outer");
        assert_eq!(Plain.type_name_string(&outer, false), "Outer");
        assert_eq!(
            Plain.type_name_string(&inner, true),
            "Contoso.Outer/Inner\\u0001"
        );
        assert_eq!(Plain.type_name_string(&inner, false), "Inner\\u0001");
    }

    #[test]
    fn test_format_requires_entity() {
        let mut output = PlainTextOutput::new();
        assert!(matches!(
            Plain.format_type_name(&mut output, None),
            Err(Error::InvalidArgument("type"))
        ));
        assert!(matches!(
            Plain.format_method_name(&mut output, None),
            Err(Error::InvalidArgument("method"))
        ));
        assert!(matches!(
            Plain.format_property_name(&mut output, None, Some(true)),
            Err(Error::InvalidArgument("property"))
        ));
        assert!(output.as_str().is_empty());
    }

    #[test]
    fn test_format_names() {
        let ty = create_type("Contoso", "Program");
        let method = create_method("Main");
        let property = create_property("Count\n");
        ty.add_method(method.clone());

        assert_eq!(
            render(|o| Plain.format_type_name(o, Some(&ty)).unwrap()),
            "Program"
        );
        assert_eq!(
            render(|o| Plain.format_method_name(o, Some(&method)).unwrap()),
            "Program.Main"
        );
        assert_eq!(
            render(|o| Plain.format_method_name(o, Some(&create_method("Orphan"))).unwrap()),
            "Orphan"
        );
        assert_eq!(
            render(|o| Plain.format_property_name(o, Some(&property), None).unwrap()),
            "Count\\u000A"
        );
    }

    #[test]
    fn test_member_short_form() {
        let ty = create_type("Contoso", "Program");
        let field = create_field("value");
        ty.add_field(field.clone());
        let member = MemberRef::Field(field);

        assert_eq!(
            render(|o| Plain.write_tooltip(o, &member)),
            "Contoso.Program.value"
        );
        assert_eq!(
            render(|o| Plain.write_member(o, &member, PrinterFlags::empty())),
            "Program.value"
        );

        let with_token = render(|o| Plain.write_member(o, &member, PrinterFlags::SHOW_TOKENS));
        assert!(with_token.starts_with("Program.value 0x04"));
    }

    #[test]
    fn test_member_reference_is_linked() {
        let method = MemberRef::Method(create_method("Run"));
        let mut output = TokenOutput::new();
        Plain.write_member_reference(&mut output, &method, TextTokenKind::Method);

        assert_eq!(
            output.fragments(),
            &[TextFragment::Text {
                text: "Run".to_string(),
                kind: TextTokenKind::Method,
                reference: Some(method.clone()),
            }]
        );
    }

    #[test]
    fn test_variable_tooltip() {
        let variable = Variable::new(2, None);
        assert_eq!(render(|o| Plain.write_variable_tooltip(o, &variable, None)), "#2");
        assert_eq!(
            render(|o| Plain.write_variable_tooltip(o, &variable, Some("args"))),
            "args"
        );
    }

    #[test]
    fn test_default_member_hooks() {
        let options = DecompilationOptions::default();
        let ty = create_type("Contoso", "Program");
        let method = create_method("Main");
        let field = create_field("count");
        let property = create_property("Name");
        let event = create_event("Changed");
        ty.add_method(method.clone());
        ty.add_field(field.clone());
        ty.add_property(property.clone());
        ty.add_event(event.clone());

        let text = render(|o| {
            Plain.decompile_method(&method, o, &options).unwrap();
            Plain.decompile_field(&field, o, &options).unwrap();
            Plain.decompile_property(&property, o, &options).unwrap();
            Plain.decompile_event(&event, o, &options).unwrap();
            Plain.decompile_type(&ty, o, &options).unwrap();
        });

        assert_eq!(
            text,
            "// Contoso.Program.Main\n\
             // Contoso.Program.count\n\
             // Contoso.Program.Name\n\
             // Contoso.Program.Changed\n\
             // Contoso.Program\n"
        );
    }

    #[test]
    fn test_hooks_without_declaring_type() {
        let options = DecompilationOptions::default();
        let text = render(|o| {
            Plain
                .decompile_method(&create_method("Lonely"), o, &options)
                .unwrap();
        });
        assert_eq!(text, "// Lonely\n");
    }

    #[test]
    fn test_namespace_listing() {
        let options = DecompilationOptions::default();
        let types = vec![create_type("Contoso", "A"), create_type("Contoso", "B")];

        let mut output = TokenOutput::new();
        Plain
            .decompile_namespace("Contoso", &types, &mut output, &options)
            .unwrap();

        assert_eq!(
            output.to_text(),
            "// Contoso\n//\u{20}\n// Types:\n//\u{20}\n// A\n// B\n"
        );
        let linked: Vec<_> = output.references().map(|(text, _)| text).collect();
        assert_eq!(linked, vec!["A", "B"]);
    }

    #[test]
    fn test_declaring_type_line() {
        let ty = create_type("Contoso", "Program");
        let event = create_event("Tick");
        ty.add_event(event.clone());

        let mut output = TokenOutput::new();
        Plain.write_comment_line_declaring_type(&mut output, &MemberRef::Event(event));
        Plain.write_comment_line_declaring_type(
            &mut output,
            &MemberRef::Event(create_event("Orphan")),
        );

        assert_eq!(output.to_text(), "// Contoso.Program\n");
        let (_, reference) = output.references().next().unwrap();
        assert_eq!(reference, &MemberRef::Type(ty));
    }

    #[test]
    fn test_synthetic_views_are_unsupported_by_default() {
        for kind in DecompilationType::iter() {
            assert!(!Plain.can_decompile(kind));
            assert!(matches!(
                Plain.decompile_synthetic(kind, &"data"),
                Err(Error::UnsupportedOperation(k)) if k == kind
            ));
        }
    }

    #[test]
    fn test_identity_defaults() {
        assert!(Plain.project_file_extension().is_none());
        assert!(Plain.show_member(
            &MemberRef::Method(create_method("<Main>$")),
            &DecompilerSettings::default()
        ));
        assert_eq!(
            Error::UnsupportedOperation(DecompilationType::PartialType).to_string(),
            "Decompilation of PartialType is not implemented by this language"
        );
    }
}
