//! Options threaded through every rendering call.
//!
//! Nothing in this crate reads ambient process state: the display locale used for dates and
//! the renderer settings are passed explicitly in [`DecompilationOptions`].
//!
//! # Examples
//!
//! ```rust
//! use dotscope_lang::options::{DecompilationOptions, DisplayLocale};
//!
//! let options = DecompilationOptions {
//!     locale: DisplayLocale::new("de_DE")?,
//!     ..DecompilationOptions::default()
//! };
//! assert_eq!(options.locale.name(), "de_DE");
//! # Ok::<(), dotscope_lang::Error>(())
//! ```

use std::borrow::Cow;
use std::fmt;

use chrono::Locale;

use crate::{Error, Result};

/// Locale used to format dates in rendered output
#[derive(Clone)]
pub struct DisplayLocale {
    locale: Locale,
    name: Cow<'static, str>,
}

impl DisplayLocale {
    /// The `en_US` locale
    pub const EN_US: DisplayLocale = DisplayLocale {
        locale: Locale::en_US,
        name: Cow::Borrowed("en_US"),
    };

    /// The `POSIX` locale
    pub const POSIX: DisplayLocale = DisplayLocale {
        locale: Locale::POSIX,
        name: Cow::Borrowed("POSIX"),
    };

    /// Look up a locale by its POSIX name, e.g. `en_US` or `de_DE`
    ///
    /// A `-` separator (`en-US`) is accepted as well.
    ///
    /// # Errors
    /// Returns [`Error::UnknownLocale`] if no such locale is known.
    pub fn new(name: &str) -> Result<Self> {
        let normalized = name.trim().replace('-', "_");
        let locale = Locale::try_from(normalized.as_str())
            .map_err(|_| Error::UnknownLocale(name.to_string()))?;

        Ok(DisplayLocale {
            locale,
            name: Cow::Owned(normalized),
        })
    }

    /// The chrono locale
    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// The POSIX name of this locale
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for DisplayLocale {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for DisplayLocale {}

impl fmt::Debug for DisplayLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayLocale({})", self.name)
    }
}

impl Default for DisplayLocale {
    fn default() -> Self {
        DisplayLocale::EN_US
    }
}

/// Settings a renderer may consult when deciding what to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecompilerSettings {
    /// Show compiler-generated members (names starting with `<`)
    pub show_compiler_generated: bool,
    /// Append metadata tokens to member tooltips
    pub show_tokens: bool,
}

/// Options of a single rendering call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecompilationOptions {
    /// Locale used for dates
    pub locale: DisplayLocale,
    /// Renderer settings
    pub settings: DecompilerSettings,
}
