//! Reflection-annotation scanner.
//!
//! Walks C-family headers for `REFLECTED`, `PROPERTY`, `METHOD_CMD`,
//! `REFLECT_GLOBAL`, `BITFIELD_FLAGS`, and `NO_REFLECT` markers, and
//! accumulates the annotated declarations into a [`reflex_db`] type
//! database. Unannotated code is tolerated, not parsed: the grammar reads
//! just enough of each declaration to capture what the markers point to,
//! and recovers at statement boundaries everywhere else.
//!
//! ```
//! use reflex_scan::Scanner;
//!
//! let source = "REFLECTED() struct Light { PROPERTY(net) float range_; };";
//! let mut scanner = Scanner::new();
//! scanner.scan(source, &|_| 0)?;
//! let db = scanner.finish();
//!
//! let light = db.lookup("Light").unwrap();
//! assert_eq!(db.node(light).properties[0].name, "range_");
//! # Ok::<(), reflex_scan::ScanError>(())
//! ```

mod baseline;
mod depth;
mod options;
mod scanner;

pub use baseline::{Baseline, Seed};
pub use depth::{minimalize, DepthFilter};
pub use options::ScanOptions;
pub use scanner::{ScanError, Scanner};
