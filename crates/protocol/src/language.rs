//! The closed set of languages the editor can build and run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use ts_rs::TS;

/// A source language supported by the harness.
///
/// Serialized using the display names shown in the editor's language
/// selector (`"C"`, `"C++"`, `"Java"`, `"Python"`, `"R"`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
pub enum Language {
    #[serde(alias = "c")]
    C,

    #[serde(rename = "C++", alias = "cpp", alias = "c++")]
    Cpp,

    #[serde(alias = "java")]
    Java,

    #[serde(alias = "python", alias = "py")]
    Python,

    #[serde(alias = "r")]
    R,
}

impl Language {
    /// Every supported language, in selector order.
    pub const ALL: [Language; 5] = [
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::Python,
        Language::R,
    ];

    /// Human-readable name, as shown in the language selector.
    pub fn name(&self) -> &'static str {
        match self {
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Java => "Java",
            Self::Python => "Python",
            Self::R => "R",
        }
    }

    /// Parse a language tag.
    ///
    /// Matching is case-insensitive and accepts a few common aliases
    /// (`cpp`, `cxx`, `py`, `python3`). Returns `None` for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use nc_protocol::Language;
    ///
    /// assert_eq!(Language::from_tag("c++"), Some(Language::Cpp));
    /// assert_eq!(Language::from_tag("PY"), Some(Language::Python));
    /// assert_eq!(Language::from_tag("cobol"), None);
    /// ```
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "c" => Some(Self::C),
            "c++" | "cpp" | "cxx" => Some(Self::Cpp),
            "java" => Some(Self::Java),
            "python" | "python3" | "py" => Some(Self::Python),
            "r" => Some(Self::R),
            _ => None,
        }
    }

    /// Detect the language of a file from its extension.
    ///
    /// Headers (`.h`, `.hpp`) are treated as C++.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "c" => Some(Self::C),
            "cpp" | "cc" | "cxx" | "hpp" | "h" => Some(Self::Cpp),
            "java" => Some(Self::Java),
            "py" => Some(Self::Python),
            "r" => Some(Self::R),
            _ => None,
        }
    }

    /// File-chooser filters for this language: a label and its glob patterns.
    ///
    /// Every pattern maps back to this language through [`Language::from_path`],
    /// so headers are only offered under C++.
    pub fn file_filters(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::C => ("C Files", &["*.c"]),
            Self::Cpp => ("C++ Files", &["*.cpp", "*.hpp", "*.h"]),
            Self::Java => ("Java Files", &["*.java"]),
            Self::Python => ("Python Files", &["*.py"]),
            Self::R => ("R Files", &["*.r", "*.R"]),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name a supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown language: {}", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}
