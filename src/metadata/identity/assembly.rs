//! Assembly identity and display names.
//!
//! This module provides the identity of an assembly as printed in the header block:
//! the simple name, four-part [`AssemblyVersion`], culture and strong name. The
//! [`AssemblyIdentity::display_name`] follows the format used by the .NET runtime,
//! e.g. `mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089`.
//!
//! # ECMA-335 References
//!
//! - **Section II.6.2.1**: Assembly versioning - four-part version number semantics
//! - **Section II.6.2.1.3**: Public key and token - strong name identity format
//! - **Section II.22.2**: Assembly table - assembly metadata structure

use std::fmt::{self, Write};
use std::str::FromStr;

use sha1::{Digest, Sha1};

use crate::{Error, Result};

/// Cryptographic strong name of an assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrongName {
    /// The full public key blob
    PublicKey(Vec<u8>),
    /// An 8-byte public key token, in display order
    Token([u8; 8]),
}

impl StrongName {
    /// The public key token of this strong name
    ///
    /// For a full public key this is the last 8 bytes of its SHA-1 hash, reversed.
    #[must_use]
    pub fn token(&self) -> [u8; 8] {
        match self {
            StrongName::Token(token) => *token,
            StrongName::PublicKey(key) => {
                let mut hasher = Sha1::new();
                hasher.update(key);
                let hash = hasher.finalize();

                let mut token = [0u8; 8];
                for (dst, src) in token.iter_mut().zip(hash.iter().rev()) {
                    *dst = *src;
                }
                token
            }
        }
    }

    /// The public key token as lowercase hex
    #[must_use]
    pub fn token_hex(&self) -> String {
        self.token().iter().fold(String::with_capacity(16), |mut acc, b| {
            let _ = write!(acc, "{b:02x}");
            acc
        })
    }
}

/// Four-part version numbering for .NET assemblies.
///
/// Versions are compared component-wise in order: major, minor, build, revision.
///
/// # Examples
///
/// ```rust
/// use dotscope_lang::metadata::identity::AssemblyVersion;
///
/// let version: AssemblyVersion = "1.2.3.4".parse()?;
/// assert_eq!(version, AssemblyVersion::new(1, 2, 3, 4));
/// assert_eq!(version.to_string(), "1.2.3.4");
/// # Ok::<(), dotscope_lang::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version component
    pub major: u16,
    /// Minor version component
    pub minor: u16,
    /// Build version component
    pub build: u16,
    /// Revision version component
    pub revision: u16,
}

impl AssemblyVersion {
    /// Create a new version from its four components
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse a version in dotted notation
    ///
    /// Missing trailing components default to zero, so `"2.0"` is `2.0.0.0`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the string is empty, has more than four
    /// components, or a component is not a 16-bit number.
    pub fn parse(version_str: &str) -> Result<Self> {
        let trimmed = version_str.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("version"));
        }

        let mut parts = [0u16; 4];
        for (index, part) in trimmed.split('.').enumerate() {
            if index >= parts.len() {
                return Err(Error::InvalidArgument("version"));
            }
            parts[index] = part
                .parse::<u16>()
                .map_err(|_| Error::InvalidArgument("version"))?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for AssemblyVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Identity of an assembly: simple name, version, culture and strong name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyIdentity {
    /// Simple assembly name (e.g. "mscorlib", "System.Core")
    pub name: String,
    /// Four-part version number
    pub version: AssemblyVersion,
    /// Culture of a satellite assembly, `None` (or empty) for culture-neutral assemblies
    pub culture: Option<String>,
    /// Strong name, `None` if the assembly is not signed
    pub strong_name: Option<StrongName>,
}

impl AssemblyIdentity {
    /// Create a new assembly identity
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: AssemblyVersion,
        culture: Option<String>,
        strong_name: Option<StrongName>,
    ) -> Self {
        AssemblyIdentity {
            name: name.into(),
            version,
            culture,
            strong_name,
        }
    }

    /// Check if this assembly is culture-neutral
    #[must_use]
    pub fn is_culture_neutral(&self) -> bool {
        self.culture.as_deref().map_or(true, str::is_empty)
    }

    /// Build the display name of this identity
    ///
    /// ```rust
    /// use dotscope_lang::metadata::identity::{AssemblyIdentity, AssemblyVersion};
    ///
    /// let identity = AssemblyIdentity::new("MyLibrary", AssemblyVersion::new(1, 2, 3, 4), None, None);
    /// assert_eq!(
    ///     identity.display_name(),
    ///     "MyLibrary, Version=1.2.3.4, Culture=neutral, PublicKeyToken=null"
    /// );
    /// ```
    #[must_use]
    pub fn display_name(&self) -> String {
        // Typical format: "Name, Version=x.x.x.x, Culture=neutral, PublicKeyToken=xxxxxxxxxxxxxxxx"
        let mut result = String::with_capacity(self.name.len() + 80);

        result.push_str(&self.name);
        let _ = write!(result, ", Version={}", self.version);

        let culture = match self.culture.as_deref() {
            Some(culture) if !culture.is_empty() => culture,
            _ => "neutral",
        };
        let _ = write!(result, ", Culture={culture}");

        result.push_str(", PublicKeyToken=");
        match &self.strong_name {
            Some(strong_name) => result.push_str(&strong_name.token_hex()),
            None => result.push_str("null"),
        }

        result
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}
