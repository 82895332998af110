//! The type database: arena storage, the name table, and the one-shot
//! resolution pass that stitches forward references into a connected graph.
//!
//! Nodes are allocated in an arena and referenced by [`TypeId`]. Only
//! *registered* nodes appear in the name table; incomplete stand-ins live in
//! the arena alone until [`TypeDatabase::resolve`] swaps references to them
//! for the declared type of the same name. References that never resolve
//! stay incomplete — an inspectable end state, not an error.

use std::collections::hash_map::Entry;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::node::{Method, Property, TemplateParam, TypeId, TypeNode};

/// Name-keyed store of every type the scanner has seen.
///
/// Multiple source units may accumulate into one database; call
/// [`TypeDatabase::resolve`] once after the last unit, since resolution
/// treats the table as closed-world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypeDatabase {
    /// Every node ever allocated, stand-ins included. Ids index here.
    arena: Vec<TypeNode>,

    /// Registered ids in registration order. Iteration and `FindEnumValue`
    /// scans follow this order, never hash-map order.
    registered: Vec<TypeId>,

    /// Name index over registered nodes only.
    by_name: FxHashMap<String, TypeId>,

    /// Free functions captured outside any type.
    pub global_functions: Vec<Method>,

    /// Global variables captured outside any type.
    pub global_properties: Vec<Property>,

    resolved: bool,
}

impl TypeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    // === Arena Access ===

    /// Node behind `id`. Ids never dangle; they are handed out by this
    /// database and nodes are never removed.
    pub fn node(&self, id: TypeId) -> &TypeNode {
        &self.arena[id.index()]
    }

    pub fn node_mut(&mut self, id: TypeId) -> &mut TypeNode {
        &mut self.arena[id.index()]
    }

    /// Number of registered types. Stand-ins are not counted.
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Registered ids in registration order.
    pub fn types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.registered.iter().copied()
    }

    /// True once the resolution pass has run.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    // === Registration ===

    /// Allocate a node in the arena without entering it into the name
    /// table. The scanner parses declarations into allocated nodes and
    /// registers them once complete.
    #[allow(clippy::cast_possible_truncation)]
    pub fn alloc(&mut self, node: TypeNode) -> TypeId {
        let id = TypeId::from_raw(self.arena.len() as u32);
        self.arena.push(node);
        id
    }

    /// Allocate an incomplete stand-in for a name with no declaration yet.
    pub fn add_standin(&mut self, name: &str) -> TypeId {
        tracing::debug!(name, "stand-in for undeclared type");
        self.alloc(TypeNode::incomplete(name))
    }

    /// Enter an allocated node into the name table. The first registration
    /// of a name wins; later duplicates are dropped and reported `false`.
    pub fn register(&mut self, id: TypeId) -> bool {
        let name = self.arena[id.index()].name.clone();
        match self.by_name.entry(name) {
            Entry::Occupied(_) => {
                tracing::warn!(name = %self.arena[id.index()].name, "duplicate type registration dropped");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
                self.registered.push(id);
                tracing::debug!(name = %self.arena[id.index()].name, "registered type");
                true
            }
        }
    }

    /// Register a complete baseline type with its generator-facing tag.
    /// Returns the canonical id when the name was already seeded.
    pub fn register_seed(
        &mut self,
        name: &str,
        external_tag: &str,
        is_primitive: bool,
        is_template: bool,
    ) -> TypeId {
        let mut node = TypeNode::named(name);
        node.is_internal = true;
        node.is_primitive = is_primitive;
        node.is_template = is_template;
        node.external_tag = external_tag.to_owned();
        let id = self.alloc(node);
        if self.register(id) {
            id
        } else {
            self.lookup(name).unwrap_or(id)
        }
    }

    /// Exact-name lookup in the table. Stand-ins are never found here.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Id equality, or spelled-name equality while either side is still an
    /// unresolved stand-in.
    pub fn same_type(&self, a: TypeId, b: TypeId) -> bool {
        a == b || self.node(a).name == self.node(b).name
    }

    // === Resolution ===

    /// The one-shot resolution pass.
    ///
    /// For every registered type (then the globals), walks properties,
    /// methods, base classes, template parameters, and the template element
    /// type; each reference to an incomplete node is looked up by name and
    /// swapped in place for the canonical entry when one exists. Afterwards
    /// `derived_types` is rebuilt from the resolved base lists. Calling this
    /// twice is a no-op: the second call returns without touching the table.
    pub fn resolve(&mut self) {
        if self.resolved {
            return;
        }
        self.resolved = true;

        for node in &mut self.arena {
            node.derived_types.clear();
        }

        for i in 0..self.registered.len() {
            self.resolve_node(self.registered[i]);
        }

        let mut functions = std::mem::take(&mut self.global_functions);
        for function in &mut functions {
            self.resolve_method(function);
        }
        self.global_functions = functions;

        let mut properties = std::mem::take(&mut self.global_properties);
        for property in &mut properties {
            self.resolve_property(property);
        }
        self.global_properties = properties;

        for i in 0..self.registered.len() {
            let id = self.registered[i];
            let bases = self.node(id).base_classes.clone();
            for base in bases {
                self.node_mut(base).derived_types.push(id);
            }
        }
    }

    fn resolve_node(&mut self, id: TypeId) {
        let mut properties = std::mem::take(&mut self.arena[id.index()].properties);
        for property in &mut properties {
            self.resolve_property(property);
        }
        self.arena[id.index()].properties = properties;

        let mut methods = std::mem::take(&mut self.arena[id.index()].methods);
        for method in &mut methods {
            self.resolve_method(method);
        }
        self.arena[id.index()].methods = methods;

        let mut bases = std::mem::take(&mut self.arena[id.index()].base_classes);
        for base in &mut bases {
            *base = self.resolved_id(*base);
        }
        self.arena[id.index()].base_classes = bases;

        if let Some(element) = self.arena[id.index()].template_element_type {
            self.arena[id.index()].template_element_type = Some(self.resolved_id(element));
        }
    }

    fn resolve_property(&self, property: &mut Property) {
        property.ty = self.resolved_id(property.ty);
        if let Some(source) = property.enum_flag_source {
            property.enum_flag_source = Some(self.resolved_id(source));
        }
        for param in &mut property.template_parameters {
            if let TemplateParam::Nested(nested) = param {
                self.resolve_property(nested);
            }
        }
    }

    fn resolve_method(&self, method: &mut Method) {
        self.resolve_property(&mut method.return_type);
        for argument in &mut method.arguments {
            self.resolve_property(argument);
        }
    }

    /// Canonical id for a reference: the id itself when complete, the table
    /// entry of the same name when one exists, otherwise the stand-in
    /// unchanged.
    fn resolved_id(&self, id: TypeId) -> TypeId {
        let node = self.node(id);
        if node.is_complete {
            return id;
        }
        match self.lookup(&node.name) {
            Some(canonical) => canonical,
            None => {
                tracing::debug!(name = %node.name, "type reference left unresolved");
                id
            }
        }
    }

    // === Enum Lookup ===

    /// Value of the first enum constant named `identifier` across every
    /// registered type, in registration order; `0` when no enum defines it.
    pub fn find_enum_value(&self, identifier: &str) -> i64 {
        for &id in &self.registered {
            if let Some(value) = self.node(id).enum_value(identifier) {
                return value;
            }
        }
        0
    }

    // === Hierarchy Queries ===

    /// Primary (first-declared) base, when any.
    pub fn first_base(&self, id: TypeId) -> Option<TypeId> {
        self.node(id).base_classes.first().copied()
    }

    /// Distance to the root following only the first base at each step.
    /// Cyclic chains stop once the walk exceeds the arena size.
    pub fn depth(&self, id: TypeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(base) = self.first_base(current) {
            depth += 1;
            current = base;
            if depth > self.arena.len() {
                break;
            }
        }
        depth
    }

    /// End of the first-base chain; a type with no bases is its own root.
    pub fn root(&self, id: TypeId) -> TypeId {
        let mut current = id;
        let mut steps = 0;
        while let Some(base) = self.first_base(current) {
            current = base;
            steps += 1;
            if steps > self.arena.len() {
                break;
            }
        }
        current
    }

    /// Registered ids ordered so that every base precedes all of its
    /// transitive derivatives. The sort is stable: ties keep registration
    /// order.
    pub fn topologically_by_depth(&self) -> Vec<TypeId> {
        let mut ids = self.registered.clone();
        ids.sort_by_key(|&id| self.depth(id));
        ids
    }

    /// Whether `id` inherits (directly or transitively, across every
    /// base-class branch) from a type named `ancestor`.
    pub fn extends(&self, id: TypeId, ancestor: &str) -> bool {
        let mut visited = FxHashSet::default();
        self.extends_walk(id, ancestor, &mut visited)
    }

    fn extends_walk(&self, id: TypeId, ancestor: &str, visited: &mut FxHashSet<TypeId>) -> bool {
        for &base in &self.node(id).base_classes {
            if !visited.insert(base) {
                continue;
            }
            if self.node(base).name == ancestor || self.extends_walk(base, ancestor, visited) {
                return true;
            }
        }
        false
    }

    /// For a virtual method, the overridden declaration in the *immediate*
    /// base types (one level, not transitive), matched by name and
    /// signature. Returns the method itself when nothing matches, when the
    /// method is not virtual, or when it has no declaring type.
    pub fn resolve_virtual_override<'a>(&'a self, method: &'a Method) -> &'a Method {
        let Some(owner) = method.declaring_type else {
            return method;
        };
        if !method.modifiers.is_virtual() {
            return method;
        }
        for &base in &self.node(owner).base_classes {
            let found = self
                .node(base)
                .methods
                .iter()
                .find(|candidate| {
                    candidate.name == method.name && candidate.same_signature(method, self)
                });
            if let Some(found) = found {
                return found;
            }
        }
        method
    }

    /// Declaring type of the overridden declaration found by
    /// [`Self::resolve_virtual_override`].
    pub fn virtual_origin(&self, method: &Method) -> Option<TypeId> {
        self.resolve_virtual_override(method).declaring_type
    }

    /// Whether the type itself declares a method with this name.
    pub fn has_method(&self, id: TypeId, name: &str) -> bool {
        self.node(id).methods.iter().any(|m| m.name == name)
    }

    /// Whether the type or anything up its first-base chain declares a
    /// callable.
    pub fn has_any_callables(&self, id: TypeId) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(ty) = current {
            if !self.node(ty).methods.is_empty() {
                return true;
            }
            steps += 1;
            if steps > self.arena.len() {
                break;
            }
            current = self.first_base(ty);
        }
        false
    }
}

#[cfg(test)]
mod tests;
