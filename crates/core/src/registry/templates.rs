//! Embedded boilerplate templates.
//!
//! This module uses `rust-embed` to embed the files of the workspace
//! `templates/` directory into the binary at compile time:
//! - `CARGO_MANIFEST_DIR` = `crates/core`
//! - `../../templates` = workspace root `templates/`

use super::descriptor::descriptor_for;
use nc_protocol::Language;
use rust_embed::RustEmbed;

/// Language whose template is used for unrecognized tags.
pub const DEFAULT_LANGUAGE: Language = Language::Cpp;

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Get template file content by path.
fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// Boilerplate for `language`.
///
/// Every template prints `Hello, World!` followed by a newline.
///
/// # Example
/// ```
/// use nc_core::registry::template_for;
/// use nc_protocol::Language;
///
/// assert!(template_for(Language::Java).contains("public class Main"));
/// ```
pub fn template_for(language: Language) -> String {
    get_template(descriptor_for(language).template).unwrap_or_default()
}

/// Boilerplate for a language tag as typed by the user.
///
/// Unrecognized tags get the C++ template instead of an error.
pub fn template_for_tag(tag: &str) -> String {
    template_for(Language::from_tag(tag).unwrap_or(DEFAULT_LANGUAGE))
}
