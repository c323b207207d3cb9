//! Statement emitters for generated scene scripts
//!
//! Each function turns one typed payload into script text and has no other
//! inputs, so every statement shape can be checked in isolation.

use crate::core::entity::ComponentKind;
use crate::io::scene::{QuaternionData, TransformData, Vector3Data};

/// Escaped, double-quoted string literal
pub fn string_literal(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}

/// Name of the lookup table holding shared instances of `kind`
pub fn table_name(kind: ComponentKind) -> Option<&'static str> {
    match kind {
        ComponentKind::GltfShape => Some("gltfLookup"),
        ComponentKind::NftShape => Some("nftLookup"),
        ComponentKind::Transform => None,
    }
}

pub fn table_open(table: &str) -> String {
    format!("var {table} = {{\n")
}

/// One shared construction, e.g. `"a.glb": new GLTFShape("a.glb"),`
pub fn table_entry(kind: ComponentKind, key: &str) -> String {
    let key = string_literal(key);
    format!("\t{key}: new {}({key}),\n", kind.tag())
}

pub fn table_close() -> String {
    "};\n".to_string()
}

/// Loop that makes every shared instance in `table` pickable
pub fn mark_pickable(table: &str) -> String {
    format!("for (var i in {table}) {{\n\t{table}[i].isPickable = true;\n}}\n")
}

/// Declarations shared by every entity block
pub fn entity_preamble(drag_event_uuid: &str) -> String {
    format!(
        "var entities = [];\n\
         var currentEntity = null;\n\
         var gizmoEvent = new OnDragEnded((e) => log('drag ended received in ECS', e));\n\
         gizmoEvent.data.uuid = {};\n",
        string_literal(drag_event_uuid)
    )
}

pub fn entity_open(entity_id: &str) -> String {
    format!(
        "currentEntity = new Entity();\n\
         entities.push(currentEntity);\n\
         currentEntity.uuid = {};\n\
         currentEntity.set(gizmoEvent);\n",
        string_literal(entity_id)
    )
}

/// Attach a shared instance from its lookup table
pub fn shared_reference(table: &str, key: &str) -> String {
    format!("currentEntity.set({table}[{}]);\n", string_literal(key))
}

pub fn vector3(v: &Vector3Data) -> String {
    format!("new Vector3({}, {}, {})", v.x, v.y, v.z)
}

pub fn quaternion(q: &QuaternionData) -> String {
    format!("new Quaternion({}, {}, {}, {})", q.x, q.y, q.z, q.w)
}

/// Inline per-entity transform carrying the literal payload values
pub fn transform_constructor(data: &TransformData) -> String {
    let mut fields = format!(
        "\tposition: {},\n\trotation: {}",
        vector3(&data.position),
        quaternion(&data.rotation)
    );
    if let Some(scale) = &data.scale {
        fields.push_str(&format!(",\n\tscale: {}", vector3(scale)));
    }
    format!("currentEntity.set(new Transform({{\n{fields}\n}}));\n")
}

pub fn add_entity() -> String {
    "engine.addEntity(currentEntity);\n".to_string()
}
