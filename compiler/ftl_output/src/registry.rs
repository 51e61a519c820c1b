//! Output format lookup by name and by template file extension.

use rustc_hash::FxHashMap;

use crate::format::OutputFormat;

/// Immutable name table for output formats.
///
/// Built once per configuration and passed by reference to the parser,
/// which resolves `#ftl output_format=...` and `#outputformat "..."` through
/// it.
#[derive(Clone, Debug)]
pub struct OutputFormatRegistry {
    by_name: FxHashMap<&'static str, OutputFormat>,
    by_extension: FxHashMap<&'static str, OutputFormat>,
}

impl OutputFormatRegistry {
    /// The registry of all standard formats.
    pub fn standard() -> Self {
        let by_name = OutputFormat::ALL.iter().map(|f| (f.name(), *f)).collect();
        let by_extension = [
            ("ftlh", OutputFormat::Html),
            ("ftlx", OutputFormat::Xml),
        ]
        .into_iter()
        .collect();
        OutputFormatRegistry {
            by_name,
            by_extension,
        }
    }

    /// Look a format up by its template-visible name (`"HTML"`, `"plainText"`).
    pub fn by_name(&self, name: &str) -> Option<OutputFormat> {
        self.by_name.get(name).copied()
    }

    /// The format implied by a template file extension (`ftlh`, `ftlx`).
    pub fn by_file_extension(&self, extension: &str) -> Option<OutputFormat> {
        self.by_extension.get(extension).copied()
    }

    /// Names of all registered formats, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.by_name.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for OutputFormatRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
