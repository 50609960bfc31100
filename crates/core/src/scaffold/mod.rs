//! New program files seeded with a language template.
//!
//! Files are named `Program_<N><ext>` with the smallest N, starting at 1,
//! that is not already taken in the target directory.

pub mod error;

pub use error::{ScaffoldError, ScaffoldResult};

use crate::registry::template_for;
use nc_protocol::Language;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const FILE_STEM: &str = "Program_";

/// Extension used for files created for `language`.
///
/// R files are created with a lowercase `.r`; the staged copy used for
/// building keeps its own extension.
pub fn file_extension(language: Language) -> &'static str {
    match language {
        Language::C => ".c",
        Language::Cpp => ".cpp",
        Language::Java => ".java",
        Language::Python => ".py",
        Language::R => ".r",
    }
}

/// Create `Program_<N><ext>` in `dir`, filled with the template of
/// `language`, and return its path.
///
/// The directory is created if missing. Existing files are never
/// overwritten.
///
/// # Example
///
/// ```no_run
/// use nc_core::scaffold::create_program_file;
/// use nc_protocol::Language;
/// use std::path::Path;
///
/// let path = create_program_file(Path::new("."), Language::Python).unwrap();
/// assert!(path.ends_with("Program_1.py"));
/// ```
pub fn create_program_file(dir: &Path, language: Language) -> ScaffoldResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| ScaffoldError::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })?;

    let extension = file_extension(language);
    let template = template_for(language);

    let mut counter = 1u32;
    loop {
        let path = dir.join(format!("{FILE_STEM}{counter}{extension}"));

        // create_new makes the existence check and the creation one step
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(template.as_bytes())
                    .map_err(|source| ScaffoldError::FileWrite {
                        path: path.clone(),
                        source,
                    })?;
                tracing::debug!(path = %path.display(), language = %language, "created program file");
                return Ok(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                counter += 1;
            }
            Err(source) => return Err(ScaffoldError::FileWrite { path, source }),
        }
    }
}
