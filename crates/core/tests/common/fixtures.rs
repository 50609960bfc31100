//! Test fixtures: sample programs, fake toolchains and configurations.
//!
//! The fake toolchains are shell scripts run through `sh`, so the tests
//! never exec a file they have just written themselves.

use nc_core::config::{HarnessConfig, ToolCandidate, ToolchainOverride};
use nc_protocol::Language;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Marker that makes the fake compiler reject a source.
pub const SYNTAX_ERROR_MARKER: &str = "SYNTAX_ERROR";

/// Marker that makes the fake compiler print a warning and still succeed.
pub const WARNING_MARKER: &str = "WARNING";

/// Marker that makes the fake compiler flood stderr and fail.
pub const FLOOD_MARKER: &str = "FLOOD";

/// Marker that makes the built program exit with status 7.
pub const EXIT_NONZERO_MARKER: &str = "EXIT_NONZERO";

/// Marker that makes the fake compiler take two seconds and produce a
/// program printing `slow build`.
#[allow(dead_code)]
pub const SLOW_MARKER: &str = "SLOW_BUILD";

pub const HELLO_C: &str = "#include <stdio.h>\n\nint main() {\n    printf(\"Hello, World!\\n\");\n    return 0;\n}\n";

/// A C program with a missing semicolon and the syntax error marker.
#[allow(dead_code)]
pub const BROKEN_C: &str =
    "#include <stdio.h>\n\nint main() {\n    printf(\"SYNTAX_ERROR\\n\")\n    return 0;\n}\n";

const FAKE_COMPILER: &str = r#"#!/bin/sh
# fake compiler: <source> -o <output>
src="$1"
out="$3"

if grep -q FLOOD "$src"; then
    i=0
    while [ $i -lt 20000 ]; do
        echo "$src:$i:1: error: flood" >&2
        i=$((i+1))
    done
    exit 1
fi

if grep -q SYNTAX_ERROR "$src"; then
    echo "$src:4:5: error: expected ';' before 'return'" >&2
    exit 1
fi

if grep -q WARNING "$src"; then
    echo "$src:1:1: warning: unused variable 'x'" >&2
fi

if grep -q SLOW_BUILD "$src"; then
    sleep 2
    printf '#!/bin/sh\necho "slow build"\n' > "$out"
    chmod +x "$out"
    exit 0
fi

printf '#!/bin/sh\necho "Hello, World!"\n' > "$out"
if grep -q EXIT_NONZERO "$src"; then
    printf 'echo "bye" >&2\nexit 7\n' >> "$out"
fi
chmod +x "$out"
"#;

/// A temporary work directory plus a directory holding fake toolchains.
pub struct Sandbox {
    pub work: TempDir,
    pub tools: TempDir,
}

impl Sandbox {
    pub fn new() -> std::io::Result<Self> {
        let work = tempfile::tempdir()?;
        let tools = tempfile::tempdir()?;
        std::fs::write(tools.path().join("fakecc"), FAKE_COMPILER)?;
        Ok(Self { work, tools })
    }

    pub fn work_dir(&self) -> &Path {
        self.work.path()
    }

    pub fn fake_compiler(&self) -> PathBuf {
        self.tools.path().join("fakecc")
    }

    /// Config whose C compiler is the fake compiler.
    pub fn fake_c_config(&self) -> HarnessConfig {
        let compiler = sh_candidate(vec![
            self.fake_compiler().to_string_lossy().into_owned(),
            "{source}".to_string(),
            "-o".to_string(),
            "{output}".to_string(),
        ]);

        HarnessConfig::default()
            .with_work_dir(self.work_dir())
            .with_toolchain(
                Language::C,
                ToolchainOverride {
                    compile: Some(vec![compiler]),
                    run: None,
                },
            )
    }

    /// Config whose R runtime candidates are a missing primary and `sh`
    /// reading the script from stdin as the fallback.
    #[allow(dead_code)]
    pub fn r_fallback_config(&self) -> HarnessConfig {
        HarnessConfig::default()
            .with_work_dir(self.work_dir())
            .with_toolchain(
                Language::R,
                ToolchainOverride {
                    compile: None,
                    run: Some(vec![
                        ToolCandidate::new("nocopy-missing-rscript").with_args(["{script}"]),
                        sh_candidate(vec!["-s".to_string()]).with_stdin_script(true),
                    ]),
                },
            )
    }
}

/// `sh` with the given arguments and a version probe that plain POSIX
/// shells understand.
pub fn sh_candidate(args: Vec<String>) -> ToolCandidate {
    ToolCandidate::new("sh")
        .with_args(args)
        .with_probe_args(["-c", "exit 0"])
}

/// `true` if `program` is on PATH.
#[allow(dead_code)]
pub fn is_installed(program: &str) -> bool {
    which::which(program).is_ok()
}
