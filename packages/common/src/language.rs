//! Static table of languages the judge can execute.
//!
//! Each entry carries everything the sandbox needs to build and run a
//! submission: the container image, the source file extension, and the
//! build/run command lines. Adding a language is a table change.

/// Configuration of a single supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Numeric id used by submissions.
    pub id: i32,
    pub name: &'static str,
    /// Container image the sandbox boots for this language.
    pub container_image: &'static str,
    /// Source file extension, without the dot.
    pub file_extension: &'static str,
    /// Build command run inside the container; empty for interpreted languages.
    pub build_command: &'static [&'static str],
    /// Run command executed once per test case.
    pub run_command: &'static [&'static str],
    pub needs_compilation: bool,
}

static LANGUAGES: &[Language] = &[
    Language {
        id: 1,
        name: "python",
        container_image: "python-runner",
        file_extension: "py",
        build_command: &[],
        run_command: &["python", "main.py"],
        needs_compilation: false,
    },
    Language {
        id: 2,
        name: "go",
        container_image: "go-runner",
        file_extension: "go",
        build_command: &["go", "build", "-o", "solution", "main.go"],
        run_command: &["./solution"],
        needs_compilation: true,
    },
];

impl Language {
    /// Look up a language by its numeric id.
    pub fn from_id(id: i32) -> Option<&'static Language> {
        LANGUAGES.iter().find(|lang| lang.id == id)
    }

    /// Look up a language by name.
    pub fn from_name(name: &str) -> Option<&'static Language> {
        LANGUAGES.iter().find(|lang| lang.name == name)
    }

    /// Name of the source file as mounted inside the container.
    pub fn source_file_name(&self) -> String {
        format!("main.{}", self.file_extension)
    }

    /// All supported languages.
    pub fn all() -> &'static [Language] {
        LANGUAGES
    }
}
