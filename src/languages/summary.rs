use uguid::{guid, Guid};

use crate::{
    language::{Language, NameFormatter},
    metadata::{members::MemberRef, typesystem::CilType},
    options::{DecompilationOptions, DecompilerSettings},
    output::{TextOutput, TextTokenKind},
    Result,
};

const SUMMARY_GUID: Guid = guid!("5e2f06c4-9b1d-4a35-8c71-3e0d4b8f6a12");

/// A language writing a metadata summary as line comments
///
/// Members are written with the default hooks. Types are listed with the names of their
/// members and nested types, each linked to the entity it names. Compiler-generated members
/// (names starting with `<`) are only shown when
/// [`DecompilerSettings::show_compiler_generated`] is set.
///
/// # Examples
///
/// ```rust
/// use dotscope_lang::prelude::*;
///
/// let program = CilType::new(Token::new(0x02000002), "Contoso", "Program", 0);
/// program.add_method(Method::new(Token::new(0x06000001), "Main"));
///
/// let mut output = PlainTextOutput::new();
/// SummaryLanguage::new().decompile_type(&program, &mut output, &DecompilationOptions::default())?;
/// assert_eq!(output.as_str(), "// Contoso.Program\n//   Main\n");
/// # Ok::<(), dotscope_lang::Error>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct SummaryLanguage;

impl SummaryLanguage {
    /// Create the summary language
    #[must_use]
    pub fn new() -> Self {
        SummaryLanguage
    }

    fn write_entry(
        &self,
        output: &mut dyn TextOutput,
        member: &MemberRef,
        settings: &DecompilerSettings,
    ) {
        self.write_comment_begin(output, true);
        output.write("  ", TextTokenKind::Comment);
        self.write_member_reference(output, member, TextTokenKind::for_member(member));
        if settings.show_tokens {
            output.write(" ", TextTokenKind::Comment);
            output.write(&member.token().to_string(), TextTokenKind::Number);
        }
        self.write_comment_end(output, true);
        output.write_line();
    }
}

impl NameFormatter for SummaryLanguage {}

impl Language for SummaryLanguage {
    fn generic_name(&self) -> &str {
        "Summary"
    }

    fn unique_name(&self) -> &str {
        "Summary"
    }

    fn order(&self) -> f64 {
        100.0
    }

    fn generic_guid(&self) -> Guid {
        SUMMARY_GUID
    }

    fn unique_guid(&self) -> Guid {
        SUMMARY_GUID
    }

    fn file_extension(&self) -> &str {
        ".txt"
    }

    fn decompile_type(
        &self,
        ty: &CilType,
        output: &mut dyn TextOutput,
        options: &DecompilationOptions,
    ) -> Result<()> {
        let name = self.type_name_string(ty, true);
        self.write_comment_line(output, &name);

        let members = MemberRef::members_of(ty)
            .into_iter()
            .chain(ty.nested_types.iter().map(|(_, nested)| MemberRef::Type(nested.clone())));
        for member in members {
            if self.show_member(&member, &options.settings) {
                self.write_entry(output, &member, &options.settings);
            }
        }
        Ok(())
    }

    fn show_member(&self, member: &MemberRef, settings: &DecompilerSettings) -> bool {
        settings.show_compiler_generated || !member.name().starts_with('<')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        language::DecompilationType,
        metadata::members::Property,
        test::{create_field, create_method, create_type},
        Error,
    };

    fn options(show_compiler_generated: bool, show_tokens: bool) -> DecompilationOptions {
        DecompilationOptions {
            settings: DecompilerSettings {
                show_compiler_generated,
                show_tokens,
            },
            ..DecompilationOptions::default()
        }
    }

    #[test]
    fn test_identity() {
        let language = SummaryLanguage::new();
        assert_eq!(language.generic_name(), "Summary");
        assert_eq!(language.file_extension(), ".txt");
        assert_eq!(language.generic_guid(), language.unique_guid());
        assert_ne!(language.unique_guid(), Guid::ZERO);
        assert!(language.project_file_extension().is_none());
    }

    #[test]
    fn test_type_listing() {
        let ty = create_type("Contoso", "Program");
        ty.add_method(create_method("Main"));
        ty.add_method(create_method("<Main>$"));
        ty.add_field(create_field("count"));
        ty.add_nested_type(create_type("", "Nested"));

        let mut output = crate::output::PlainTextOutput::new();
        SummaryLanguage::new()
            .decompile_type(&ty, &mut output, &options(false, false))
            .unwrap();
        assert_eq!(
            output.as_str(),
            "// Contoso.Program\n//   Main\n//   count\n//   Nested\n"
        );

        let mut output = crate::output::PlainTextOutput::new();
        SummaryLanguage::new()
            .decompile_type(&ty, &mut output, &options(true, false))
            .unwrap();
        assert!(output.as_str().contains("//   <Main>$\n"));
    }

    #[test]
    fn test_type_listing_with_tokens() {
        let ty = create_type("Contoso", "Program");
        let main = create_method("Main");
        ty.add_method(main.clone());

        let mut output = crate::output::PlainTextOutput::new();
        SummaryLanguage::new()
            .decompile_type(&ty, &mut output, &options(false, true))
            .unwrap();
        assert_eq!(
            output.as_str(),
            format!("// Contoso.Program\n//   Main {}\n", main.token)
        );
    }

    #[test]
    fn test_indexer_property_hook() {
        let ty = create_type("Contoso", "List");
        let item = Property::indexed(crate::metadata::token::Token::new(0x17000001), "Item", 1);
        ty.add_property(item.clone());

        let mut output = crate::output::PlainTextOutput::new();
        SummaryLanguage::new()
            .decompile_property(&item, &mut output, &DecompilationOptions::default())
            .unwrap();
        assert_eq!(output.as_str(), "// Contoso.List.Item\n");
    }

    #[test]
    fn test_synthetic_views_unsupported() {
        let language = SummaryLanguage::new();
        assert!(!language.can_decompile(DecompilationType::AssemblyInfo));
        assert!(matches!(
            language.decompile_synthetic(DecompilationType::AssemblyInfo, &()),
            Err(Error::UnsupportedOperation(DecompilationType::AssemblyInfo))
        ));
    }
}
