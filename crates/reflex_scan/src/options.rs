//! Scanner configuration.

use rustc_hash::FxHashSet;

use crate::baseline::Baseline;

/// Options for a [`Scanner`](crate::Scanner).
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Export-macro names discarded transparently during tokenization, so
    /// `REFLECTED() class DLL_EXPORT Node` parses the same as without the
    /// annotation.
    pub api_macros: FxHashSet<String>,

    /// Capture members in private and protected scope as well as public.
    pub include_private: bool,

    /// Brace-nesting depth above which source lines are dropped before
    /// tokenization. The default keeps namespace nesting plus one type body
    /// and discards function bodies below that.
    pub depth_threshold: u32,

    /// Types seeded into the database before any source is scanned.
    pub baseline: Baseline,
}

impl Default for ScanOptions {
    fn default() -> Self {
        let mut api_macros = FxHashSet::default();
        api_macros.insert("DLL_EXPORT".to_owned());
        Self {
            api_macros,
            include_private: false,
            depth_threshold: 2,
            baseline: Baseline::default(),
        }
    }
}
