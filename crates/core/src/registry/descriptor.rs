//! Pipeline descriptors: how each language is staged, compiled and run.
//!
//! The table is an immutable static. Adding a language means adding one
//! entry here and one template file.

use crate::config::ToolCandidate;
use nc_protocol::Language;
use regex::Regex;

/// A built-in toolchain candidate.
#[derive(Debug)]
pub struct ToolSpec {
    pub program: &'static str,
    pub args: &'static [&'static str],
    pub probe_args: &'static [&'static str],
    pub stdin_script: bool,
}

impl ToolSpec {
    pub fn to_candidate(&self) -> ToolCandidate {
        ToolCandidate::new(self.program)
            .with_args(self.args.iter().copied())
            .with_probe_args(self.probe_args.iter().copied())
            .with_stdin_script(self.stdin_script)
    }
}

/// The compile step of a compiled language.
#[derive(Debug)]
pub struct CompileStep {
    pub candidates: &'static [ToolSpec],
}

/// How a successful build is executed.
#[derive(Debug)]
pub enum RunStep {
    /// Execute the native artifact directly.
    Artifact,

    /// Hand the build output to a runtime tool.
    Tool { candidates: &'static [ToolSpec] },
}

/// How the staged file name is derived from the source.
#[derive(Debug)]
pub enum EntryPointDiscovery {
    None,

    /// Single-capture pattern; `default` is used when nothing matches.
    Pattern {
        pattern: &'static str,
        default: &'static str,
    },
}

impl EntryPointDiscovery {
    /// Extract the entry-point name from `source`.
    ///
    /// Never fails: a pattern without a match yields the default name.
    pub fn discover(&self, source: &str) -> Option<String> {
        match self {
            Self::None => None,
            Self::Pattern { pattern, default } => {
                let found = Regex::new(pattern)
                    .ok()
                    .and_then(|re| re.captures(source))
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string());
                Some(found.unwrap_or_else(|| default.to_string()))
            }
        }
    }
}

/// Everything the harness needs to know about one language.
#[derive(Debug)]
pub struct PipelineDescriptor {
    pub language: Language,

    /// Extension of the staged source file, including the dot.
    pub extension: &'static str,

    /// Path of the boilerplate inside the embedded template folder.
    pub template: &'static str,

    /// Present iff the language is compiled.
    pub compile: Option<CompileStep>,

    pub run: RunStep,

    pub entry_point: EntryPointDiscovery,

    /// Shown when no toolchain candidate is available.
    pub install_guidance: &'static str,
}

impl PipelineDescriptor {
    pub fn is_compiled(&self) -> bool {
        self.compile.is_some()
    }

    /// True when the build output is a native executable at the fixed
    /// artifact path.
    pub fn produces_native_artifact(&self) -> bool {
        matches!(self.run, RunStep::Artifact)
    }
}

const VERSION: &[&str] = &["--version"];

static DESCRIPTORS: [PipelineDescriptor; 5] = [
    PipelineDescriptor {
        language: Language::C,
        extension: ".c",
        template: "main.c",
        compile: Some(CompileStep {
            candidates: &[
                ToolSpec {
                    program: "gcc",
                    args: &["{source}", "-o", "{output}"],
                    probe_args: VERSION,
                    stdin_script: false,
                },
                ToolSpec {
                    program: "cc",
                    args: &["{source}", "-o", "{output}"],
                    probe_args: VERSION,
                    stdin_script: false,
                },
            ],
        }),
        run: RunStep::Artifact,
        entry_point: EntryPointDiscovery::None,
        install_guidance: "To install a C compiler:\n\
            - On Ubuntu/Debian: Run 'sudo apt-get install build-essential'\n\
            - On Fedora/RHEL: Run 'sudo dnf install gcc'\n\
            - On Arch Linux: Run 'sudo pacman -S gcc'\n\
            - On macOS: Run 'xcode-select --install'\n\
            - On Windows: Install MinGW-w64 from https://www.mingw-w64.org/\n",
    },
    PipelineDescriptor {
        language: Language::Cpp,
        extension: ".cpp",
        template: "main.cpp",
        compile: Some(CompileStep {
            candidates: &[
                ToolSpec {
                    program: "g++",
                    args: &["{source}", "-o", "{output}"],
                    probe_args: VERSION,
                    stdin_script: false,
                },
                ToolSpec {
                    program: "c++",
                    args: &["{source}", "-o", "{output}"],
                    probe_args: VERSION,
                    stdin_script: false,
                },
            ],
        }),
        run: RunStep::Artifact,
        entry_point: EntryPointDiscovery::None,
        install_guidance: "To install a C++ compiler:\n\
            - On Ubuntu/Debian: Run 'sudo apt-get install g++'\n\
            - On Fedora/RHEL: Run 'sudo dnf install gcc-c++'\n\
            - On Arch Linux: Run 'sudo pacman -S gcc'\n\
            - On macOS: Run 'xcode-select --install'\n\
            - On Windows: Install MinGW-w64 from https://www.mingw-w64.org/\n",
    },
    PipelineDescriptor {
        language: Language::Java,
        extension: ".java",
        template: "Main.java",
        compile: Some(CompileStep {
            candidates: &[ToolSpec {
                program: "javac",
                args: &["-d", "{dir}", "{source}"],
                probe_args: &["-version"],
                stdin_script: false,
            }],
        }),
        run: RunStep::Tool {
            candidates: &[ToolSpec {
                program: "java",
                args: &["-cp", "{dir}", "{class}"],
                probe_args: &["-version"],
                stdin_script: false,
            }],
        },
        entry_point: EntryPointDiscovery::Pattern {
            pattern: r"public\s+class\s+(\w+)",
            default: "Main",
        },
        install_guidance: "To install a JDK:\n\
            - On Ubuntu/Debian: Run 'sudo apt-get install default-jdk'\n\
            - On Fedora/RHEL: Run 'sudo dnf install java-latest-openjdk-devel'\n\
            - On Arch Linux: Run 'sudo pacman -S jdk-openjdk'\n\
            - On macOS/Windows: Install from https://adoptium.net/\n",
    },
    PipelineDescriptor {
        language: Language::Python,
        extension: ".py",
        template: "main.py",
        compile: None,
        run: RunStep::Tool {
            candidates: &[
                ToolSpec {
                    program: "python3",
                    args: &["{script}"],
                    probe_args: VERSION,
                    stdin_script: false,
                },
                ToolSpec {
                    program: "python",
                    args: &["{script}"],
                    probe_args: VERSION,
                    stdin_script: false,
                },
            ],
        },
        entry_point: EntryPointDiscovery::None,
        install_guidance: "To install Python:\n\
            - On Ubuntu/Debian: Run 'sudo apt-get install python3'\n\
            - On Fedora/RHEL: Run 'sudo dnf install python3'\n\
            - On Arch Linux: Run 'sudo pacman -S python'\n\
            - On macOS/Windows: Install from https://www.python.org/downloads/\n",
    },
    PipelineDescriptor {
        language: Language::R,
        extension: ".R",
        template: "main.R",
        compile: None,
        run: RunStep::Tool {
            candidates: &[
                ToolSpec {
                    program: "Rscript",
                    args: &["{script}"],
                    probe_args: VERSION,
                    stdin_script: false,
                },
                ToolSpec {
                    program: "R",
                    args: &["--vanilla"],
                    probe_args: VERSION,
                    stdin_script: true,
                },
                ToolSpec {
                    program: "/usr/bin/Rscript",
                    args: &["{script}"],
                    probe_args: VERSION,
                    stdin_script: false,
                },
                ToolSpec {
                    program: "/usr/local/bin/Rscript",
                    args: &["{script}"],
                    probe_args: VERSION,
                    stdin_script: false,
                },
            ],
        },
        entry_point: EntryPointDiscovery::None,
        install_guidance: "To install R:\n\
            - On Ubuntu/Debian: Run 'sudo apt-get install r-base'\n\
            - On Fedora/RHEL: Run 'sudo dnf install R'\n\
            - On Arch Linux: Run 'sudo pacman -S r'\n\
            - On macOS: Install from https://cran.r-project.org/bin/macosx/\n\
            - On Windows: Install from https://cran.r-project.org/bin/windows/\n\n\
            After installation, restart the NoCopy IDE.\n",
    },
];

/// Descriptor for `language`. Total over the closed enum.
pub fn descriptor_for(language: Language) -> &'static PipelineDescriptor {
    match language {
        Language::C => &DESCRIPTORS[0],
        Language::Cpp => &DESCRIPTORS[1],
        Language::Java => &DESCRIPTORS[2],
        Language::Python => &DESCRIPTORS[3],
        Language::R => &DESCRIPTORS[4],
    }
}
