//! Nodes of the scanned type graph.
//!
//! A [`TypeNode`] is one entry in the [`TypeDatabase`] arena: a seeded
//! baseline type, a `REFLECTED` declaration from scanned source, or an
//! incomplete stand-in created for a name that has not been declared yet.
//! Members hang off the node as [`Property`] and [`Method`] values, which
//! reference other nodes by [`TypeId`].

use std::fmt;

use smallvec::SmallVec;

use crate::binding::TraitList;
use crate::database::TypeDatabase;
use crate::modifiers::Modifiers;

/// Seeded sequence containers generators treat as list-like.
const LIST_TYPES: &[&str] = &["std::array", "std::vector", "Vector", "PODVector"];

/// Seeded associative containers generators treat as table-like.
const TABLE_TYPES: &[&str] = &["std::map", "std::unordered_map", "HashMap"];

// === Type Ids ===

/// Index of a [`TypeNode`] in the database arena.
///
/// Ids are stable for the lifetime of the database: resolution rewrites the
/// references *between* nodes but never moves a node, so an id obtained
/// before [`TypeDatabase::resolve`] still names the same node afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Underlying arena index.
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

// Ids are stored in every property slot; keep them word-cheap.
const _: () = assert!(std::mem::size_of::<TypeId>() == 4);

// === Type Nodes ===

/// One type known to the database.
#[derive(Clone, Debug, Default, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TypeNode {
    /// Declared name, or the spelled name of an unresolved reference.
    pub name: String,

    /// False for stand-ins created from a bare name mention. Resolution
    /// swaps references to such nodes for the declared type of the same
    /// name, when one exists.
    pub is_complete: bool,

    /// Seeded primitive (`int`, `float`, ...).
    pub is_primitive: bool,

    /// Part of the seeded baseline rather than scanned source.
    pub is_internal: bool,

    /// Takes template arguments (`Vector<T>`, `std::map<K, V>`, ...).
    pub is_template: bool,

    pub is_abstract: bool,
    pub is_final: bool,

    /// Fixed element count for array-like baseline entries.
    pub array_length: Option<u32>,

    /// Generator-facing tag for seeded types (`"unsigned"` for `uint32_t`,
    /// `"string"` for `std::string`).
    pub external_tag: String,

    /// Direct bases in declaration order. The first entry is the primary
    /// base used for depth and root queries.
    pub base_classes: SmallVec<[TypeId; 2]>,

    /// Types that list this node among their bases. Derived data: cleared
    /// and rebuilt by [`TypeDatabase::resolve`].
    pub derived_types: Vec<TypeId>,

    pub properties: Vec<Property>,
    pub methods: Vec<Method>,

    /// Named constants for enum types, in declaration order.
    pub enum_values: Vec<(String, i64)>,

    pub binding_traits: TraitList,

    /// Element type for seeded container baselines.
    pub template_element_type: Option<TypeId>,
}

impl TypeNode {
    /// Complete node for a declared or seeded type.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_complete: true,
            ..Self::default()
        }
    }

    /// Incomplete stand-in for a name with no declaration yet.
    pub fn incomplete(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// True when the node captured at least one enum constant.
    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }

    /// Value of an enum constant on this node alone.
    pub fn enum_value(&self, name: &str) -> Option<i64> {
        self.enum_values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

// === Properties ===

/// A data member, global variable, callable argument, or return slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub name: String,

    /// Declared type. May point at an incomplete stand-in until resolution.
    pub ty: TypeId,

    pub modifiers: Modifiers,

    /// Template arguments captured from `Name<...>`.
    pub template_parameters: Vec<TemplateParam>,

    /// Enum supplying bit names, from a `BITFIELD_FLAGS(Enum)` marker.
    pub enum_flag_source: Option<TypeId>,

    pub binding_traits: TraitList,

    /// Fixed array element count; 0 when the member is not an array.
    pub array_size: u32,
}

impl Property {
    /// Bare unnamed property of the given type.
    pub fn of(ty: TypeId) -> Self {
        Self {
            name: String::new(),
            ty,
            modifiers: Modifiers::empty(),
            template_parameters: Vec::new(),
            enum_flag_source: None,
            binding_traits: TraitList::new(),
            array_size: 0,
        }
    }

    /// Renders the declared type as it would appear in source: `const`
    /// prefix, template arguments, pointer/reference suffix.
    pub fn full_type_name(&self, db: &TypeDatabase) -> String {
        let mut out = String::new();
        if self.modifiers.is_const() {
            out.push_str("const ");
        }
        out.push_str(&db.node(self.ty).name);
        if !self.template_parameters.is_empty() {
            out.push('<');
            for (i, param) in self.template_parameters.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match param {
                    TemplateParam::Integer(value) => out.push_str(&value.to_string()),
                    TemplateParam::Nested(nested) => out.push_str(&nested.full_type_name(db)),
                }
            }
            out.push('>');
        }
        if self.modifiers.is_pointer() {
            out.push('*');
        }
        if self.modifiers.is_reference() {
            out.push('&');
        }
        out
    }

    /// Structural signature equality: same modifiers, same resolved type
    /// (or the same spelled name while unresolved), same template
    /// arguments.
    pub fn same_signature(&self, other: &Self, db: &TypeDatabase) -> bool {
        if self.modifiers != other.modifiers {
            return false;
        }
        if !db.same_type(self.ty, other.ty) {
            return false;
        }
        if self.template_parameters.len() != other.template_parameters.len() {
            return false;
        }
        self.template_parameters
            .iter()
            .zip(&other.template_parameters)
            .all(|(a, b)| a.same_as(b, db))
    }

    /// The declared type takes template arguments.
    pub fn is_template(&self, db: &TypeDatabase) -> bool {
        db.node(self.ty).is_template
    }

    /// The declared type names a seeded sequence container.
    pub fn is_list_like(&self, db: &TypeDatabase) -> bool {
        LIST_TYPES.contains(&db.node(self.ty).name.as_str())
    }

    /// The declared type names a seeded associative container.
    pub fn is_table_like(&self, db: &TypeDatabase) -> bool {
        TABLE_TYPES.contains(&db.node(self.ty).name.as_str())
    }
}

// === Template Arguments ===

/// One captured template argument: an integer literal (`std::array<T, 4>`)
/// or a nested type expression.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateParam {
    Integer(i64),
    Nested(Property),
}

impl TemplateParam {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&Property> {
        match self {
            Self::Integer(_) => None,
            Self::Nested(nested) => Some(nested),
        }
    }

    fn same_as(&self, other: &Self, db: &TypeDatabase) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Nested(a), Self::Nested(b)) => a.same_signature(b, db),
            _ => false,
        }
    }
}

// === Methods ===

/// A callable: member method or a free function captured from a
/// command-style marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub name: String,

    /// Owning type; `None` for globals.
    pub declaring_type: Option<TypeId>,

    pub return_type: Property,

    pub arguments: Vec<Property>,

    /// Argument names, index-aligned with `arguments`; empty when unnamed.
    pub argument_names: Vec<String>,

    /// Default argument text, index-aligned with `arguments`; empty when
    /// the argument has no default.
    pub default_arguments: Vec<String>,

    pub binding_traits: TraitList,

    /// Callable-level modifiers: `virtual` plus the trailing `const`,
    /// `override`, `final`, and `abstract` qualifiers.
    pub modifiers: Modifiers,
}

impl Method {
    /// Bare unnamed method with the given return slot.
    pub fn returning(return_type: Property) -> Self {
        Self {
            name: String::new(),
            declaring_type: None,
            return_type,
            arguments: Vec::new(),
            argument_names: Vec::new(),
            default_arguments: Vec::new(),
            binding_traits: TraitList::new(),
            modifiers: Modifiers::empty(),
        }
    }

    /// Restores the index alignment of names and defaults after arguments
    /// have been appended.
    pub fn pad_arguments(&mut self) {
        self.argument_names.resize(self.arguments.len(), String::new());
        self.default_arguments.resize(self.arguments.len(), String::new());
    }

    /// True when argument `index` carries default text.
    pub fn has_default(&self, index: usize) -> bool {
        self.default_arguments
            .get(index)
            .is_some_and(|text| !text.is_empty())
    }

    /// Renders the parenthesized argument type list, with the trailing
    /// `const` qualifier when present.
    pub fn call_signature(&self, db: &TypeDatabase) -> String {
        let mut out = String::from("(");
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&arg.full_type_name(db));
        }
        out.push(')');
        if self.modifiers.is_const() {
            out.push_str(" const");
        }
        out
    }

    /// Structural signature equality: return type, arity, argument types,
    /// and `const` qualification. Names are not compared.
    pub fn same_signature(&self, other: &Self, db: &TypeDatabase) -> bool {
        if !self.return_type.same_signature(&other.return_type, db) {
            return false;
        }
        if self.arguments.len() != other.arguments.len() {
            return false;
        }
        if self.modifiers.is_const() != other.modifiers.is_const() {
            return false;
        }
        self.arguments
            .iter()
            .zip(&other.arguments)
            .all(|(a, b)| a.same_signature(b, db))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::database::TypeDatabase;

    fn seeded() -> TypeDatabase {
        let mut db = TypeDatabase::new();
        for name in ["void", "int", "float", "Vector", "std::vector"] {
            let template = matches!(name, "Vector" | "std::vector");
            db.register_seed(name, name, !template, template);
        }
        db
    }

    fn id_of(db: &TypeDatabase, name: &str) -> TypeId {
        db.lookup(name).unwrap_or_else(|| panic!("{name} not seeded"))
    }

    #[test]
    fn full_type_name_renders_const_templates_and_pointers() {
        let db = seeded();
        let mut inner = Property::of(id_of(&db, "int"));
        inner.modifiers |= Modifiers::POINTER;

        let mut prop = Property::of(id_of(&db, "Vector"));
        prop.modifiers |= Modifiers::CONST | Modifiers::REFERENCE;
        prop.template_parameters.push(TemplateParam::Nested(inner));

        assert_eq!(prop.full_type_name(&db), "const Vector<int*>&");
    }

    #[test]
    fn full_type_name_renders_integer_arguments() {
        let db = seeded();
        let mut prop = Property::of(id_of(&db, "std::vector"));
        prop.template_parameters
            .push(TemplateParam::Nested(Property::of(id_of(&db, "float"))));
        prop.template_parameters.push(TemplateParam::Integer(4));

        assert_eq!(prop.full_type_name(&db), "std::vector<float, 4>");
    }

    #[test]
    fn padded_argument_lists_stay_aligned() {
        let db = seeded();
        let mut method = Method::returning(Property::of(id_of(&db, "void")));
        method.arguments.push(Property::of(id_of(&db, "int")));
        method.argument_names.push("height".to_owned());
        method.arguments.push(Property::of(id_of(&db, "float")));
        method.pad_arguments();

        assert_eq!(method.argument_names.len(), 2);
        assert_eq!(method.default_arguments.len(), 2);
        assert_eq!(method.argument_names[1], "");
        assert!(!method.has_default(0));
    }

    #[test]
    fn call_signature_lists_argument_types() {
        let db = seeded();
        let mut method = Method::returning(Property::of(id_of(&db, "void")));
        method.arguments.push(Property::of(id_of(&db, "int")));
        let mut by_ref = Property::of(id_of(&db, "float"));
        by_ref.modifiers |= Modifiers::CONST | Modifiers::REFERENCE;
        method.arguments.push(by_ref);
        method.modifiers |= Modifiers::CONST;
        method.pad_arguments();

        assert_eq!(method.call_signature(&db), "(int, const float&) const");
    }

    #[test]
    fn same_signature_compares_structure_not_names() {
        let db = seeded();
        let mut first = Method::returning(Property::of(id_of(&db, "int")));
        first.name = "GetHeight".to_owned();
        let mut second = Method::returning(Property::of(id_of(&db, "int")));
        second.name = "GetWidth".to_owned();
        assert!(first.same_signature(&second, &db));

        second.modifiers |= Modifiers::CONST;
        assert!(!first.same_signature(&second, &db));
    }

    #[test]
    fn container_queries_follow_seeded_names() {
        let db = seeded();
        let prop = Property::of(id_of(&db, "std::vector"));
        assert!(prop.is_list_like(&db));
        assert!(!prop.is_table_like(&db));
        assert!(prop.is_template(&db));
    }
}
