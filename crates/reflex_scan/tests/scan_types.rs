// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Struct and class declarations: scopes, markers, member shapes, and
//! recovery behavior.

use pretty_assertions::assert_eq;
use reflex_db::{Modifiers, TypeDatabase, TypeId};
use reflex_scan::{ScanOptions, Scanner};

fn scan(sources: &[&str]) -> TypeDatabase {
    let mut scanner = Scanner::new();
    for source in sources {
        scanner.scan(source, &|_| 0).expect("scan should succeed");
    }
    scanner.finish()
}

fn id_of(db: &TypeDatabase, name: &str) -> TypeId {
    db.lookup(name)
        .unwrap_or_else(|| panic!("{name} not registered"))
}

fn property_names(db: &TypeDatabase, type_name: &str) -> Vec<String> {
    db.node(id_of(db, type_name))
        .properties
        .iter()
        .map(|p| p.name.clone())
        .collect()
}

#[test]
fn struct_scope_defaults_to_public() {
    let db = scan(&["REFLECTED() struct Point { int x_; int y_; };"]);
    assert_eq!(property_names(&db, "Point"), ["x_", "y_"]);
}

#[test]
fn class_scope_defaults_to_private() {
    let db = scan(&["REFLECTED() class Hidden { int secret_; };"]);
    assert_eq!(property_names(&db, "Hidden"), Vec::<String>::new());
}

#[test]
fn scope_labels_flip_member_capture() {
    let db = scan(&["\
REFLECTED() class Actor {
public:
    PROPERTY() float health_;
    int frame_;
protected:
    int guarded_;
private:
    PROPERTY() int secret_;
public:
    float speed_;
};
"]);
    assert_eq!(property_names(&db, "Actor"), ["health_", "frame_", "speed_"]);
}

#[test]
fn include_private_captures_guarded_scopes() {
    let options = ScanOptions {
        include_private: true,
        ..ScanOptions::default()
    };
    let mut scanner = Scanner::with_options(options);
    scanner
        .scan(
            "REFLECTED() class Actor {\nprivate:\n    PROPERTY() int secret_;\n};",
            &|_| 0,
        )
        .unwrap();
    let db = scanner.finish();
    assert_eq!(property_names(&db, "Actor"), ["secret_"]);
}

#[test]
fn marker_traits_attach_to_members() {
    let db = scan(&["\
REFLECTED() struct Mover {
    PROPERTY(net, name = \"Jump Height\", range = 0:100) float jump_height_;
    PROPERTY(get = Node::GetPosition) Vector3 position_;
};
"]);
    let mover = id_of(&db, "Mover");
    let jump = &db.node(mover).properties[0];
    assert!(jump.binding_traits.has("net"));
    assert_eq!(jump.binding_traits.get("name"), Some("Jump Height"));
    assert_eq!(
        jump.binding_traits.get_range("range", (-1.0, -1.0)),
        (0.0, 100.0)
    );

    let position = &db.node(mover).properties[1];
    assert_eq!(position.binding_traits.get("get"), Some("Node::GetPosition"));
}

#[test]
fn reflected_traits_attach_to_the_type() {
    let db = scan(&["REFLECTED(category = gameplay, transient) struct Spawner {};"]);
    let spawner = db.node(id_of(&db, "Spawner"));
    assert_eq!(spawner.binding_traits.get("category"), Some("gameplay"));
    assert!(spawner.binding_traits.has("transient"));
}

#[test]
fn base_clause_records_the_first_base_only() {
    let db = scan(&[
        "REFLECTED() struct Object {};",
        "REFLECTED() class Node : public Object, public Serializable {};",
    ]);
    let node = db.node(id_of(&db, "Node"));
    assert_eq!(node.base_classes.len(), 1);
    assert_eq!(node.base_classes[0], id_of(&db, "Object"));
}

#[test]
fn class_modifiers_before_the_body_are_recorded() {
    let db = scan(&[
        "REFLECTED() class Shape abstract {};",
        "REFLECTED() class Circle final : public Shape {};",
    ]);
    assert!(db.node(id_of(&db, "Shape")).is_abstract);
    assert!(db.node(id_of(&db, "Circle")).is_final);
}

#[test]
fn unsigned_spellings_canonicalize_at_token_boundaries() {
    let db = scan(&["\
REFLECTED() struct Packed {
    unsigned int a_;
    unsigned char b_;
    unsigned short c_;
    unsigned long d_;
    unsigned long long e_;
    unsigned f_;
    short g_;
    long h_;
    long long i_;
};
"]);
    let expected = [
        "uint32_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t", "unsigned", "int16_t",
        "int64_t", "int64_t",
    ];
    let packed = db.node(id_of(&db, "Packed"));
    let spelled: Vec<&str> = packed
        .properties
        .iter()
        .map(|p| db.node(p.ty).name.as_str())
        .collect();
    assert_eq!(spelled, expected);
    // Canonical spellings land on seeded builtins, not stand-ins.
    assert!(packed.properties.iter().all(|p| db.node(p.ty).is_complete));
}

#[test]
fn fixed_arrays_record_element_counts() {
    let db = scan(&["\
REFLECTED() enum Limits { MaxSlots = 4 };
REFLECTED() struct Inventory {
    PROPERTY() float weights_[16];
    PROPERTY() int slots_[MaxSlots];
    PROPERTY() int unknown_[Mystery];
};
"]);
    let inventory = db.node(id_of(&db, "Inventory"));
    assert_eq!(inventory.properties[0].array_size, 16);
    assert_eq!(inventory.properties[1].array_size, 4);
    assert_eq!(inventory.properties[2].array_size, 0);
}

#[test]
fn template_arguments_nest_and_split_shift_right() {
    let db = scan(&["\
REFLECTED() struct Node {
    PROPERTY() Vector<SharedPtr<Node>> children_;
    PROPERTY() HashMap<StringHash, Variant> vars_;
    PROPERTY() std::array<float, 4> corners_;
};
"]);
    let node = db.node(id_of(&db, "Node"));

    let children = &node.properties[0];
    assert_eq!(db.node(children.ty).name, "Vector");
    assert!(children.modifiers.contains(Modifiers::TEMPLATE));
    let shared = children.template_parameters[0].as_nested().unwrap();
    assert_eq!(db.node(shared.ty).name, "SharedPtr");
    let inner = shared.template_parameters[0].as_nested().unwrap();
    assert_eq!(db.node(inner.ty).name, "Node");

    let vars = &node.properties[1];
    assert_eq!(vars.template_parameters.len(), 2);
    assert!(vars.is_table_like(&db));

    let corners = &node.properties[2];
    assert_eq!(corners.template_parameters[1].as_integer(), Some(4));
    assert!(corners.is_list_like(&db));
}

#[test]
fn command_methods_capture_arguments_names_and_defaults() {
    let db = scan(&["\
REFLECTED() struct Actor {
    METHOD_CMD() virtual void Jump(int height = 1);
    METHOD_CMD() float Lerp(float from, float to, float t = 0.5);
    METHOD_CMD() float GetMass() const;
};
"]);
    let actor = db.node(id_of(&db, "Actor"));

    let jump = &actor.methods[0];
    assert!(jump.modifiers.is_virtual());
    assert!(!jump.return_type.modifiers.is_virtual());
    assert_eq!(jump.argument_names, ["height"]);
    assert_eq!(jump.default_arguments, ["1"]);
    assert!(jump.has_default(0));

    let lerp = &actor.methods[1];
    assert_eq!(lerp.arguments.len(), 3);
    assert_eq!(lerp.argument_names, ["from", "to", "t"]);
    assert_eq!(lerp.default_arguments, ["", "", "0.5"]);
    assert_eq!(lerp.call_signature(&db), "(float, float, float)");

    let mass = &actor.methods[2];
    assert!(mass.modifiers.is_const());
    assert_eq!(mass.call_signature(&db), "() const");
}

#[test]
fn global_commands_and_variables_are_captured() {
    let db = scan(&["\
METHOD_CMD(name = Jump) void Jump(int height = 1);
REFLECT_GLOBAL(save) float gravity_ = -9.8;
"]);
    let jump = &db.global_functions[0];
    assert_eq!(jump.name, "Jump");
    assert_eq!(jump.declaring_type, None);
    assert_eq!(jump.binding_traits.get("name"), Some("Jump"));
    assert_eq!(db.node(jump.arguments[0].ty).name, "int");
    assert_eq!(jump.argument_names, ["height"]);
    assert_eq!(jump.default_arguments, ["1"]);

    let gravity = &db.global_properties[0];
    assert_eq!(gravity.name, "gravity_");
    assert!(gravity.binding_traits.has("save"));
}

#[test]
fn default_argument_text_is_verbatim_source() {
    let db = scan(&["\
REFLECTED() struct Emitter {
    METHOD_CMD() void Burst(Vector3 at = Vector3::ZERO, int count = Clamp(4, 1, 8));
    METHOD_CMD() void Play(String sound = \"wave\");
};
"]);
    let emitter = db.node(id_of(&db, "Emitter"));
    assert_eq!(
        emitter.methods[0].default_arguments,
        ["Vector3::ZERO", "Clamp(4, 1, 8)"]
    );
    assert_eq!(emitter.methods[1].default_arguments, ["\"wave\""]);
}

#[test]
fn unmarked_callables_are_skipped_but_fields_kept() {
    let db = scan(&["\
REFLECTED() struct Body {
    void Update(float dt);
    float GetMass() const { return mass_; }
    int frame_;
};
"]);
    let body = db.node(id_of(&db, "Body"));
    assert!(body.methods.is_empty());
    assert_eq!(property_names(&db, "Body"), ["frame_"]);
}

#[test]
fn inline_bodies_do_not_derail_member_capture() {
    let db = scan(&["\
REFLECTED() struct Timer {
    METHOD_CMD() void Reset() { elapsed_ = 0; }
    PROPERTY() float elapsed_;
};
"]);
    let timer = db.node(id_of(&db, "Timer"));
    assert_eq!(timer.methods.len(), 1);
    assert_eq!(property_names(&db, "Timer"), ["elapsed_"]);
}

#[test]
fn no_reflect_hides_the_next_declaration() {
    let db = scan(&["\
REFLECTED() struct Cache {
    NO_REFLECT int scratch_;
    NO_REFLECT void Rebuild() { scratch_ = 0; }
    PROPERTY() int entries_;
};
"]);
    assert_eq!(property_names(&db, "Cache"), ["entries_"]);
    assert!(db.node(id_of(&db, "Cache")).methods.is_empty());
}

#[test]
fn bitfield_flags_links_a_declared_enum() {
    let db = scan(&["\
REFLECTED() enum Caps { CanJump = FLAG(0), CanFly = FLAG(1) };
REFLECTED() struct Actor {
    PROPERTY() BITFIELD_FLAGS(Caps) unsigned flags_;
    PROPERTY() BITFIELD_FLAGS(Missing) unsigned other_;
};
"]);
    let actor = db.node(id_of(&db, "Actor"));
    assert_eq!(actor.properties[0].enum_flag_source, Some(id_of(&db, "Caps")));
    assert_eq!(actor.properties[1].enum_flag_source, None);
}

#[test]
fn export_macros_are_transparent() {
    let db = scan(&["REFLECTED() class DLL_EXPORT Widget { public: int w_; };"]);
    assert_eq!(property_names(&db, "Widget"), ["w_"]);

    let mut options = ScanOptions::default();
    options.api_macros.insert("ENGINE_API".to_owned());
    let mut scanner = Scanner::with_options(options);
    scanner
        .scan("REFLECTED() class ENGINE_API Panel { public: int h_; };", &|_| 0)
        .unwrap();
    let db = scanner.finish();
    assert_eq!(property_names(&db, "Panel"), ["h_"]);
}

#[test]
fn member_modifier_keywords_set_bits_in_any_order() {
    let db = scan(&["\
REFLECTED() struct Config {
    PROPERTY() static const int max_retries_;
    PROPERTY() mutable volatile float cache_;
    PROPERTY() const Vector3& anchor_;
    PROPERTY() transient Node* owner_;
};
"]);
    let config = db.node(id_of(&db, "Config"));
    assert!(config.properties[0].modifiers.is_static());
    assert!(config.properties[0].modifiers.is_const());
    assert!(config.properties[1].modifiers.contains(Modifiers::MUTABLE | Modifiers::VOLATILE));
    assert!(config.properties[2].modifiers.is_reference());
    assert_eq!(config.properties[2].full_type_name(&db), "const Vector3&");
    assert!(config.properties[3].modifiers.is_pointer());
    assert!(config.properties[3].modifiers.contains(Modifiers::TRANSIENT));
}

#[test]
fn deep_lines_are_filtered_before_tokenization() {
    let source = "REFLECTED() struct Cfg {\n    PROPERTY() int kept_;\n    PROPERTY() int dropped_;\n};";
    let depths = [0u32, 1, 3, 0];
    let mut scanner = Scanner::new();
    scanner.scan(source, &|line: usize| depths[line]).unwrap();
    let db = scanner.finish();
    assert_eq!(property_names(&db, "Cfg"), ["kept_"]);
}

#[test]
fn unterminated_comment_surfaces_a_scan_error() {
    let mut scanner = Scanner::new();
    let err = scanner
        .scan("REFLECTED() struct X {\n/* runaway", &|_| 0)
        .unwrap_err();
    assert_eq!(err.message, "unterminated block comment");
    assert_eq!(err.line, 2);
    assert_eq!(err.to_string(), "line 2: unterminated block comment");
    // Everything captured before the failure stays in the database.
    assert!(scanner.database().lookup("X").is_some());
}

#[test]
fn constructors_are_abandoned_without_losing_members() {
    let db = scan(&["\
REFLECTED() struct Particle {
    Particle() {}
    explicit Particle(float mass);
    PROPERTY() float mass_;
};
"]);
    assert_eq!(property_names(&db, "Particle"), ["mass_"]);
}

#[test]
fn preprocessor_lines_are_invisible() {
    let db = scan(&["\
#pragma once
#include <math.h>
REFLECTED() struct Sample {
#if PLATFORM_DESKTOP
    PROPERTY() int quality_;
#endif
};
"]);
    assert_eq!(property_names(&db, "Sample"), ["quality_"]);
}
