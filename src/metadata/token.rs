//! Metadata tokens identifying the entities of the object model.
//!
//! Every entity handed to this crate (types, members, modules, files) carries the token
//! it had in the metadata tables of its module. Tokens are used to tell entities apart in
//! cross-references and are optionally printed in tooltips.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Table id of the `Module` table
    pub const MODULE: u8 = 0x00;
    /// Table id of the `TypeDef` table
    pub const TYPE_DEF: u8 = 0x02;
    /// Table id of the `Field` table
    pub const FIELD: u8 = 0x04;
    /// Table id of the `MethodDef` table
    pub const METHOD_DEF: u8 = 0x06;
    /// Table id of the `Event` table
    pub const EVENT: u8 = 0x14;
    /// Table id of the `Property` table
    pub const PROPERTY: u8 = 0x17;
    /// Table id of the `Assembly` table
    pub const ASSEMBLY: u8 = 0x20;
    /// Table id of the `File` table
    pub const FILE: u8 = 0x26;

    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Builds a token from a table id and a row id
    ///
    /// Rows above `0x00FF_FFFF` are truncated to the 24 bits a token can carry.
    #[must_use]
    pub fn from_parts(table: u8, row: u32) -> Self {
        Token((u32::from(table) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (row 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row() == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_parts() {
        let token = Token::from_parts(Token::METHOD_DEF, 1);
        assert_eq!(token.value(), 0x06000001);
        assert_eq!(token.table(), Token::METHOD_DEF);
        assert_eq!(token.row(), 1);
    }

    #[test]
    fn test_token_row_truncated() {
        let token = Token::from_parts(Token::FILE, 0x0100_0002);
        assert_eq!(token.table(), Token::FILE);
        assert_eq!(token.row(), 2);
    }

    #[test]
    fn test_token_is_null() {
        assert!(Token(0x00000000).is_null());
        assert!(Token(0x02000000).is_null());
        assert!(!Token(0x06000001).is_null());
    }

    #[test]
    fn test_token_display() {
        assert_eq!(format!("{}", Token(0x06000001)), "0x06000001");
        assert_eq!(format!("{}", Token(0x0200ABCD)), "0x0200ABCD");
    }

    #[test]
    fn test_token_debug() {
        let debug_str = format!("{:?}", Token(0x06000001));
        assert!(debug_str.contains("Token(0x06000001"));
        assert!(debug_str.contains("table: 0x06"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_token_ordering() {
        assert!(Token(0x06000001) < Token(0x06000002));
        assert!(Token(0x06000002) < Token(0x07000001));
    }
}
