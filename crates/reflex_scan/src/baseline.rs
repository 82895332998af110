//! Baseline type catalog.
//!
//! Scanned source references engine and standard-library types it never
//! declares. Those are seeded into the database up front so field and
//! argument references resolve to internal entries instead of stand-ins.

use reflex_db::{Modifiers, Property, TypeDatabase};

/// One pre-registered type: a name, the tag the reflection consumer maps it
/// to, and optionally the public fields scripting can reach through it.
#[derive(Clone, Debug)]
pub struct Seed {
    pub name: String,
    pub external_tag: String,
    pub is_primitive: bool,
    pub is_template: bool,
    /// `(field name, field type name)` pairs, added after every seed type
    /// is registered so the field types are present.
    pub fields: Vec<(String, String)>,
}

impl Seed {
    /// Builtin value type, tagged for the external consumer.
    pub fn primitive(name: &str, external_tag: &str) -> Self {
        Self {
            name: name.to_owned(),
            external_tag: external_tag.to_owned(),
            is_primitive: true,
            is_template: false,
            fields: Vec::new(),
        }
    }

    /// Engine type tagged with its own name.
    pub fn engine(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            external_tag: name.to_owned(),
            is_primitive: false,
            is_template: false,
            fields: Vec::new(),
        }
    }

    /// Container template.
    pub fn template(name: &str, external_tag: &str) -> Self {
        Self {
            name: name.to_owned(),
            external_tag: external_tag.to_owned(),
            is_primitive: false,
            is_template: true,
            fields: Vec::new(),
        }
    }

    /// Attach public fields, all of the same type.
    #[must_use]
    pub fn with_fields(mut self, type_name: &str, names: &[&str]) -> Self {
        for name in names {
            self.fields
                .push(((*name).to_owned(), type_name.to_owned()));
        }
        self
    }
}

/// The set of seeds applied to a fresh database.
///
/// The default catalog covers C-family builtins (including the fixed-width
/// spellings multi-word builtins canonicalize to), the engine math and
/// container types, and the `std::` containers scanned headers use.
#[derive(Clone, Debug)]
pub struct Baseline {
    seeds: Vec<Seed>,
}

impl Baseline {
    /// No seeds at all. Every referenced type becomes a stand-in.
    pub fn empty() -> Self {
        Self { seeds: Vec::new() }
    }

    pub fn push(&mut self, seed: Seed) {
        self.seeds.push(seed);
    }

    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    /// Register every seed, then attach seed fields once all of their
    /// types are present.
    pub(crate) fn apply(&self, db: &mut TypeDatabase) {
        for seed in &self.seeds {
            db.register_seed(
                &seed.name,
                &seed.external_tag,
                seed.is_primitive,
                seed.is_template,
            );
        }
        for seed in &self.seeds {
            if seed.fields.is_empty() {
                continue;
            }
            let Some(id) = db.lookup(&seed.name) else {
                continue;
            };
            for (field_name, type_name) in &seed.fields {
                let Some(ty) = db.lookup(type_name) else {
                    continue;
                };
                let mut field = Property::of(ty);
                field.name = field_name.clone();
                field.modifiers |= Modifiers::PUBLIC;
                db.node_mut(id).properties.push(field);
            }
        }
    }
}

impl Default for Baseline {
    fn default() -> Self {
        let seeds = vec![
            Seed::primitive("void", "void"),
            Seed::primitive("bool", "bool"),
            Seed::primitive("int", "int"),
            Seed::primitive("float", "float"),
            Seed::primitive("double", "double"),
            Seed::primitive("unsigned", "unsigned"),
            Seed::primitive("uint32_t", "unsigned"),
            Seed::primitive("int8_t", "int8_t"),
            Seed::primitive("uint8_t", "uint8_t"),
            Seed::primitive("int16_t", "int16_t"),
            Seed::primitive("uint16_t", "uint16_t"),
            Seed::primitive("int64_t", "int64_t"),
            Seed::primitive("uint64_t", "uint64_t"),
            Seed::primitive("std::string", "string"),
            Seed::primitive("String", "string"),
            Seed::primitive("StringHash", "StringHash"),
            Seed::engine("Variant"),
            Seed::engine("VariantVector"),
            Seed::engine("VariantMap"),
            Seed::engine("IntVector2").with_fields("int", &["x_", "y_"]),
            Seed::engine("IntVector3").with_fields("int", &["x_", "y_", "z_"]),
            Seed::engine("IntRect").with_fields("int", &["left_", "top_", "right_", "bottom_"]),
            Seed::engine("Rect").with_fields("float", &["left_", "top_", "right_", "bottom_"]),
            Seed::engine("Vector2").with_fields("float", &["x_", "y_"]),
            Seed::engine("Vector3").with_fields("float", &["x_", "y_", "z_"]),
            Seed::engine("Vector4").with_fields("float", &["x_", "y_", "z_", "w_"]),
            Seed::engine("Quaternion").with_fields("float", &["x_", "y_", "z_", "w_"]),
            Seed::engine("Color").with_fields("float", &["r_", "g_", "b_", "a_"]),
            Seed::engine("float2").with_fields("float", &["x", "y"]),
            Seed::engine("float3").with_fields("float", &["x", "y", "z"]),
            Seed::engine("float4").with_fields("float", &["x", "y", "z", "w"]),
            Seed::engine("rgba").with_fields("float", &["r", "g", "b", "a"]),
            Seed::engine("Quat").with_fields("float", &["x", "y", "z", "w"]),
            Seed::engine("float3x3"),
            Seed::engine("float3x4"),
            Seed::engine("float4x4"),
            Seed::template("SharedPtr", "SharedPtr"),
            Seed::template("WeakPtr", "WeakPtr"),
            Seed::template("Vector", "Vector"),
            Seed::template("PODVector", "PODVector"),
            Seed::template("HashMap", "HashMap"),
            Seed::template("std::vector", ""),
            Seed::template("std::array", ""),
            Seed::template("std::set", ""),
            Seed::template("std::map", ""),
            Seed::template("std::unordered_map", ""),
        ];
        Self { seeds }
    }
}
