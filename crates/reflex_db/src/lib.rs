//! Type database for scanned reflection data.
//!
//! Scanning populates a [`TypeDatabase`] arena with [`TypeNode`] entries —
//! seeded baseline types, declared types and enums, and incomplete
//! stand-ins for names used before their declaration. After the last
//! source unit, one [`TypeDatabase::resolve`] pass swaps stand-in
//! references for their canonical table entries and rebuilds the derived
//! back-references; whatever never resolves stays flagged incomplete.
//!
//! Hierarchy queries (depth, topological order, overrides) and the
//! [`TraitList`] accessors are the read side consumed by generators.

mod binding;
mod database;
mod modifiers;
mod node;

pub use binding::{Trait, TraitList};
pub use database::TypeDatabase;
pub use modifiers::Modifiers;
pub use node::{Method, Property, TemplateParam, TypeId, TypeNode};
