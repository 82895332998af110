//! Brace-depth pre-filtering.
//!
//! The scanner never descends into function bodies. Before tokenization it
//! drops every source line whose brace-nesting depth exceeds a threshold,
//! which leaves declarations intact while statement bodies vanish. Depth
//! itself comes from a collaborator that already indexed the file.

/// Per-line brace-nesting depth for a source unit.
///
/// Implemented for closures, so embedders can hand in `|line| depths[line]`
/// over whatever index they maintain.
pub trait DepthFilter {
    /// Nesting depth at the start of the zero-based `line`.
    fn depth_at_line(&self, line: usize) -> u32;
}

impl<F: Fn(usize) -> u32> DepthFilter for F {
    fn depth_at_line(&self, line: usize) -> u32 {
        self(line)
    }
}

/// Drop every line deeper than `threshold` and rejoin the survivors.
///
/// Line boundaries of the kept lines are preserved so that downstream
/// line-oriented recovery still works on the filtered buffer.
pub fn minimalize(source: &str, depth: &impl DepthFilter, threshold: u32) -> String {
    let mut kept = Vec::new();
    for (index, line) in source.lines().enumerate() {
        if depth.depth_at_line(index) <= threshold {
            kept.push(line);
        }
    }
    kept.join("\n")
}
