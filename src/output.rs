//! Text sinks receiving rendered output.
//!
//! Renderers and the header emitter never build strings for the caller; they write
//! fragments into a [`TextOutput`]. Each fragment carries a [`TextTokenKind`] for
//! highlighting and may carry a [`MemberRef`] naming the entity the text refers to, so a
//! viewer can turn it into a navigable link.
//!
//! Two sinks are provided:
//!
//! - [`PlainTextOutput`] keeps only the text, for logs, files and tests
//! - [`TokenOutput`] records every fragment, including its kind and cross-reference

use strum::Display;

use crate::metadata::members::MemberRef;

/// Highlighting category of a piece of output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TextTokenKind {
    /// Plain text
    Text,
    /// Comment text, including comment delimiters
    Comment,
    /// A keyword of the output language
    Keyword,
    /// A namespace name
    Namespace,
    /// A type name
    Type,
    /// A method name
    Method,
    /// A field name
    Field,
    /// A property name
    Property,
    /// An event name
    Event,
    /// A local variable or parameter name
    Local,
    /// A number
    Number,
    /// Punctuation and operators
    Operator,
}

impl TextTokenKind {
    /// The kind used for names of `member`
    #[must_use]
    pub fn for_member(member: &MemberRef) -> Self {
        match member {
            MemberRef::Type(_) => TextTokenKind::Type,
            MemberRef::Method(_) => TextTokenKind::Method,
            MemberRef::Field(_) => TextTokenKind::Field,
            MemberRef::Property(_) => TextTokenKind::Property,
            MemberRef::Event(_) => TextTokenKind::Event,
        }
    }
}

/// A caller-supplied sink for rendered text
///
/// Writing is infallible: sinks buffer in memory and report failures of their own
/// backing store, if any, when they are flushed by the caller.
pub trait TextOutput {
    /// Write `text`
    fn write(&mut self, text: &str, kind: TextTokenKind);

    /// Write `text` as a reference to `reference`
    ///
    /// Sinks that cannot link text may write it as plain text, but must keep it unchanged.
    fn write_reference(&mut self, text: &str, reference: &MemberRef, kind: TextTokenKind);

    /// Terminate the current line
    fn write_line(&mut self);
}

/// A sink collecting plain text, dropping all references
#[derive(Debug, Default, Clone)]
pub struct PlainTextOutput {
    text: String,
}

impl PlainTextOutput {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The text written so far
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The lines written so far
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Consume the sink, returning its text
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl TextOutput for PlainTextOutput {
    fn write(&mut self, text: &str, _kind: TextTokenKind) {
        self.text.push_str(text);
    }

    fn write_reference(&mut self, text: &str, _reference: &MemberRef, _kind: TextTokenKind) {
        self.text.push_str(text);
    }

    fn write_line(&mut self) {
        self.text.push('\n');
    }
}

/// One piece of output recorded by [`TokenOutput`]
#[derive(Debug, Clone, PartialEq)]
pub enum TextFragment {
    /// Text, optionally linked to the entity it names
    Text {
        /// The text as written
        text: String,
        /// Highlighting category
        kind: TextTokenKind,
        /// The entity the text refers to
        reference: Option<MemberRef>,
    },
    /// End of line
    NewLine,
}

/// A sink recording every fragment with its kind and cross-reference
#[derive(Debug, Default, Clone)]
pub struct TokenOutput {
    fragments: Vec<TextFragment>,
}

impl TokenOutput {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All fragments written so far
    #[must_use]
    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }

    /// All references written so far, with their text
    pub fn references(&self) -> impl Iterator<Item = (&str, &MemberRef)> {
        self.fragments.iter().filter_map(|fragment| match fragment {
            TextFragment::Text {
                text,
                reference: Some(reference),
                ..
            } => Some((text.as_str(), reference)),
            _ => None,
        })
    }

    /// The recorded output as plain text
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for fragment in &self.fragments {
            match fragment {
                TextFragment::Text { text: part, .. } => text.push_str(part),
                TextFragment::NewLine => text.push('\n'),
            }
        }
        text
    }
}

impl TextOutput for TokenOutput {
    fn write(&mut self, text: &str, kind: TextTokenKind) {
        self.fragments.push(TextFragment::Text {
            text: text.to_string(),
            kind,
            reference: None,
        });
    }

    fn write_reference(&mut self, text: &str, reference: &MemberRef, kind: TextTokenKind) {
        self.fragments.push(TextFragment::Text {
            text: text.to_string(),
            kind,
            reference: Some(reference.clone()),
        });
    }

    fn write_line(&mut self) {
        self.fragments.push(TextFragment::NewLine);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::create_method;

    #[test]
    fn test_plain_output_drops_references() {
        let method = MemberRef::Method(create_method("Main"));
        let mut output = PlainTextOutput::new();
        output.write("// ", TextTokenKind::Comment);
        output.write_reference("Main", &method, TextTokenKind::Method);
        output.write_line();

        assert_eq!(output.as_str(), "// Main\n");
        assert_eq!(output.lines().collect::<Vec<_>>(), vec!["// Main"]);
    }

    #[test]
    fn test_token_output_records_references() {
        let method = MemberRef::Method(create_method("Main"));
        let mut output = TokenOutput::new();
        output.write("// ", TextTokenKind::Comment);
        output.write_reference("Main", &method, TextTokenKind::Comment);
        output.write_line();

        assert_eq!(output.fragments().len(), 3);
        assert_eq!(output.to_text(), "// Main\n");

        let references: Vec<_> = output.references().collect();
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].0, "Main");
        assert_eq!(references[0].1, &method);
    }

    #[test]
    fn test_token_kind_for_member() {
        let method = MemberRef::Method(create_method("Main"));
        assert_eq!(TextTokenKind::for_member(&method), TextTokenKind::Method);
        assert_eq!(TextTokenKind::Comment.to_string(), "Comment");
    }
}
