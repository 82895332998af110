// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;
use crate::modifiers::Modifiers;

/// Property of a named type, creating a stand-in when undeclared.
fn field(db: &mut TypeDatabase, type_name: &str) -> Property {
    let ty = db
        .lookup(type_name)
        .unwrap_or_else(|| db.add_standin(type_name));
    Property::of(ty)
}

/// Register an empty complete type and return its id.
fn declare(db: &mut TypeDatabase, name: &str) -> TypeId {
    let id = db.alloc(TypeNode::named(name));
    assert!(db.register(id));
    id
}

#[test]
fn register_and_lookup_round_trip() {
    let mut db = TypeDatabase::new();
    let int = db.register_seed("int", "int", true, false);
    let vec = db.register_seed("Vector", "", false, true);

    assert_eq!(db.lookup("int"), Some(int));
    assert_eq!(db.lookup("Vector"), Some(vec));
    assert_eq!(db.lookup("float"), None);
    assert_eq!(db.len(), 2);
    assert_eq!(db.types().collect::<Vec<_>>(), vec![int, vec]);

    assert!(db.node(int).is_internal);
    assert!(db.node(int).is_primitive);
    assert!(db.node(vec).is_template);
    assert_eq!(db.node(int).external_tag, "int");
}

#[test]
fn duplicate_registration_keeps_first() {
    let mut db = TypeDatabase::new();
    let first = db.alloc(TypeNode::named("Foo"));
    let second = db.alloc(TypeNode::named("Foo"));

    assert!(db.register(first));
    assert!(!db.register(second));
    assert_eq!(db.lookup("Foo"), Some(first));
    assert_eq!(db.len(), 1);
}

#[test]
fn register_seed_returns_canonical_on_duplicate() {
    let mut db = TypeDatabase::new();
    let first = db.register_seed("int", "int", true, false);
    let again = db.register_seed("int", "int", true, false);
    assert_eq!(first, again);
    assert_eq!(db.len(), 1);
}

#[test]
fn standins_never_enter_the_table() {
    let mut db = TypeDatabase::new();
    let standin = db.add_standin("Ghost");

    assert_eq!(db.lookup("Ghost"), None);
    assert_eq!(db.len(), 0);
    assert!(!db.node(standin).is_complete);
    assert_eq!(db.node(standin).name, "Ghost");
}

#[test]
fn resolve_swaps_forward_references_to_the_table_entry() {
    let mut db = TypeDatabase::new();

    // Foo scanned first, mentioning Bar before its declaration.
    let bar_ref = db.add_standin("Bar");
    let foo = db.alloc(TypeNode::named("Foo"));
    db.node_mut(foo).base_classes.push(bar_ref);
    db.node_mut(foo).properties.push(Property::of(bar_ref));
    db.register(foo);

    let bar = declare(&mut db, "Bar");
    db.resolve();

    // Identity, not a same-named copy.
    assert_eq!(db.node(foo).base_classes[0], bar);
    assert_eq!(db.node(foo).properties[0].ty, bar);
}

#[test]
fn resolve_reaches_template_parameters_and_element_types() {
    let mut db = TypeDatabase::new();
    let vector = db.register_seed("Vector", "", false, true);

    let node_ref = db.add_standin("Node");
    let mut list = Property::of(vector);
    list.template_parameters
        .push(TemplateParam::Nested(Property::of(node_ref)));

    let owner = db.alloc(TypeNode::named("Scene"));
    db.node_mut(owner).properties.push(list);
    db.node_mut(owner).template_element_type = Some(node_ref);
    db.register(owner);

    let node = declare(&mut db, "Node");
    db.resolve();

    let prop = &db.node(owner).properties[0];
    let nested = prop.template_parameters[0].as_nested().unwrap();
    assert_eq!(nested.ty, node);
    assert_eq!(db.node(owner).template_element_type, Some(node));
}

#[test]
fn resolve_is_idempotent() {
    let mut db = TypeDatabase::new();
    let base_ref = db.add_standin("Base");
    let derived = db.alloc(TypeNode::named("Derived"));
    db.node_mut(derived).base_classes.push(base_ref);
    db.register(derived);
    declare(&mut db, "Base");

    db.resolve();
    let once = db.clone();
    db.resolve();
    assert_eq!(db, once);
}

#[test]
fn resolve_rebuilds_derived_types() {
    let mut db = TypeDatabase::new();
    let base = declare(&mut db, "Base");
    let base_ref = db.add_standin("Base");
    let derived = db.alloc(TypeNode::named("Derived"));
    db.node_mut(derived).base_classes.push(base_ref);
    db.register(derived);

    db.resolve();
    assert_eq!(db.node(base).derived_types, vec![derived]);
    assert!(db.node(derived).derived_types.is_empty());
}

#[test]
fn unresolved_references_stay_incomplete() {
    let mut db = TypeDatabase::new();
    let owner = db.alloc(TypeNode::named("Widget"));
    let missing = field(&mut db, "NeverDeclared");
    db.node_mut(owner).properties.push(missing);
    db.register(owner);

    db.resolve();
    let ty = db.node(owner).properties[0].ty;
    assert!(!db.node(ty).is_complete);
    assert_eq!(db.node(ty).name, "NeverDeclared");
    assert_eq!(db.lookup("NeverDeclared"), None);
}

#[test]
fn find_enum_value_scans_in_registration_order() {
    let mut db = TypeDatabase::new();
    let mut first = TypeNode::named("ColorBits");
    first.enum_values.push(("Red".to_owned(), 1));
    first.enum_values.push(("Shared".to_owned(), 10));
    let id = db.alloc(first);
    db.register(id);

    let mut second = TypeNode::named("MaskBits");
    second.enum_values.push(("Shared".to_owned(), 99));
    let id = db.alloc(second);
    db.register(id);

    assert_eq!(db.find_enum_value("Red"), 1);
    assert_eq!(db.find_enum_value("Shared"), 10);
    assert_eq!(db.find_enum_value("Unknown"), 0);
}

#[test]
fn depth_follows_only_the_first_base() {
    let mut db = TypeDatabase::new();
    let a = declare(&mut db, "A");
    let b = declare(&mut db, "B");
    db.node_mut(b).base_classes.push(a);

    let mixin = declare(&mut db, "Mixin");
    let c = declare(&mut db, "C");
    db.node_mut(c).base_classes.push(b);
    db.node_mut(c).base_classes.push(mixin);

    assert_eq!(db.depth(a), 0);
    assert_eq!(db.depth(b), 1);
    assert_eq!(db.depth(c), 2);
    assert_eq!(db.first_base(c), Some(b));
    assert_eq!(db.root(c), a);
    assert_eq!(db.root(a), a);
}

#[test]
fn depth_and_root_terminate_on_cycles() {
    let mut db = TypeDatabase::new();
    let a = declare(&mut db, "A");
    let b = declare(&mut db, "B");
    db.node_mut(a).base_classes.push(b);
    db.node_mut(b).base_classes.push(a);

    assert!(db.depth(a) <= db.len() + 2);
    let root = db.root(a);
    assert!(root == a || root == b);
    assert!(db.extends(a, "A"));
}

#[test]
fn topological_order_places_bases_first_and_is_stable() {
    let mut db = TypeDatabase::new();

    // Registered most-derived first, with forward references.
    let b_ref = db.add_standin("B");
    let c = db.alloc(TypeNode::named("C"));
    db.node_mut(c).base_classes.push(b_ref);
    db.register(c);

    let unrelated = declare(&mut db, "Unrelated");

    let a_ref = db.add_standin("A");
    let b = db.alloc(TypeNode::named("B"));
    db.node_mut(b).base_classes.push(a_ref);
    db.register(b);

    let a = declare(&mut db, "A");
    db.resolve();

    // Depth ties (Unrelated, A) keep registration order.
    assert_eq!(db.topologically_by_depth(), vec![unrelated, a, b, c]);
}

#[test]
fn extends_searches_every_base_branch() {
    let mut db = TypeDatabase::new();
    let left_root = declare(&mut db, "LeftRoot");
    let right_root = declare(&mut db, "RightRoot");
    let left = declare(&mut db, "Left");
    db.node_mut(left).base_classes.push(left_root);
    let right = declare(&mut db, "Right");
    db.node_mut(right).base_classes.push(right_root);
    let bottom = declare(&mut db, "Bottom");
    db.node_mut(bottom).base_classes.push(left);
    db.node_mut(bottom).base_classes.push(right);

    assert!(db.extends(bottom, "RightRoot"));
    assert!(db.extends(bottom, "LeftRoot"));
    assert!(db.extends(bottom, "Right"));
    assert!(!db.extends(bottom, "Bottom"));
    assert!(!db.extends(left_root, "Bottom"));
}

#[test]
fn virtual_override_checks_immediate_bases_only() {
    let mut db = TypeDatabase::new();
    let void = db.register_seed("void", "void", true, false);

    let update = |owner: TypeId| {
        let mut m = Method::returning(Property::of(void));
        m.name = "Update".to_owned();
        m.declaring_type = Some(owner);
        m.modifiers |= Modifiers::VIRTUAL;
        m
    };

    let base = declare(&mut db, "Base");
    let base_update = update(base);
    db.node_mut(base).methods.push(base_update);

    let derived = declare(&mut db, "Derived");
    db.node_mut(derived).base_classes.push(base);
    let derived_update = update(derived);
    db.node_mut(derived).methods.push(derived_update.clone());

    let grand = declare(&mut db, "Grand");
    db.node_mut(grand).base_classes.push(derived);

    // One level up finds the base declaration.
    let found = db.resolve_virtual_override(&derived_update);
    assert_eq!(found.declaring_type, Some(base));
    assert_eq!(db.virtual_origin(&derived_update), Some(base));

    // The search stops at the immediate base: Grand's override resolves to
    // Derived's declaration, never Base's.
    let grand_update = update(grand);
    let found = db.resolve_virtual_override(&grand_update);
    assert_eq!(found.declaring_type, Some(derived));

    // No match anywhere resolves to the method itself.
    let grand_jump = {
        let mut m = update(grand);
        m.name = "Jump".to_owned();
        m
    };
    let found = db.resolve_virtual_override(&grand_jump);
    assert_eq!(found.declaring_type, Some(grand));

    // Non-virtual methods never search.
    let mut plain = derived_update.clone();
    plain.modifiers = Modifiers::empty();
    assert_eq!(
        db.resolve_virtual_override(&plain).declaring_type,
        Some(derived)
    );
}

#[test]
fn globals_resolve_with_the_table() {
    let mut db = TypeDatabase::new();
    let gravity = field(&mut db, "Vector3");
    db.global_properties.push(gravity);

    let ret = field(&mut db, "Vector3");
    let mut spawn = Method::returning(ret);
    spawn.name = "SpawnPoint".to_owned();
    db.global_functions.push(spawn);

    let vector3 = declare(&mut db, "Vector3");
    db.resolve();

    assert_eq!(db.global_properties[0].ty, vector3);
    assert_eq!(db.global_functions[0].return_type.ty, vector3);
}

#[test]
fn has_method_and_callable_queries() {
    let mut db = TypeDatabase::new();
    let void = db.register_seed("void", "void", true, false);

    let base = declare(&mut db, "Base");
    let mut m = Method::returning(Property::of(void));
    m.name = "Update".to_owned();
    m.declaring_type = Some(base);
    db.node_mut(base).methods.push(m);

    let derived = declare(&mut db, "Derived");
    db.node_mut(derived).base_classes.push(base);

    assert!(db.has_method(base, "Update"));
    assert!(!db.has_method(derived, "Update"));
    assert!(db.has_any_callables(derived));
    assert!(!db.has_any_callables(void));
}

#[test]
fn same_type_matches_standins_by_name() {
    let mut db = TypeDatabase::new();
    let declared = declare(&mut db, "Node");
    let standin = db.add_standin("Node");
    let other = db.add_standin("Component");

    assert!(db.same_type(declared, standin));
    assert!(db.same_type(standin, standin));
    assert!(!db.same_type(declared, other));
}
