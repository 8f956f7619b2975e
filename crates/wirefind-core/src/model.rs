//! JSON description of a domain model.
//!
//! Two layers, mirroring how node-type metadata is usually consumed:
//! - **Deserialization layer**: `Raw*` structs, a 1:1 mapping to the JSON
//! - **Analysis layer**: the same declarations interned into a [`TypeTable`]
//!
//! ```json
//! {
//!   "enums": [{ "name": "Color", "underlying": "int" }],
//!   "interfaces": [{ "name": "IShape" }],
//!   "classes": [
//!     { "name": "Person", "members": [{ "name": "Name", "type": "string" }] }
//!   ]
//! }
//! ```

use crate::types::{ClassSpec, TypeError, TypeTable};

/// Root of a model document.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RawModel {
    #[serde(default)]
    pub enums: Vec<RawEnum>,
    #[serde(default)]
    pub interfaces: Vec<RawInterface>,
    #[serde(default)]
    pub classes: Vec<RawClass>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawEnum {
    pub name: String,
    #[serde(default = "default_underlying")]
    pub underlying: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawInterface {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawClass {
    pub name: String,
    pub base: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub members: Vec<RawMember>,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawMember {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

fn default_underlying() -> String {
    "int".to_owned()
}

/// Parse model JSON into raw declarations.
pub fn parse_model(json: &str) -> Result<RawModel, serde_json::Error> {
    serde_json::from_str(json)
}

impl TypeTable {
    /// Build a table holding the builtins plus every declaration in `json`.
    pub fn from_json(json: &str) -> Result<Self, TypeError> {
        let model = parse_model(json)?;
        let mut table = Self::new();
        table.load_model(&model)?;
        Ok(table)
    }

    /// Declare everything in `model`. Classes and interfaces may refer to
    /// each other in any order.
    pub fn load_model(&mut self, model: &RawModel) -> Result<(), TypeError> {
        for raw in &model.enums {
            let underlying = self.parse(&raw.underlying)?;
            self.define_enum(&raw.name, underlying)?;
        }

        let mut interfaces = Vec::with_capacity(model.interfaces.len());
        for raw in &model.interfaces {
            interfaces.push(self.define_interface(&raw.name, &[])?);
        }
        for (raw, &id) in model.interfaces.iter().zip(&interfaces) {
            let bases = raw
                .bases
                .iter()
                .map(|name| self.parse(name))
                .collect::<Result<Vec<_>, _>>()?;
            self.set_interface_bases(id, bases);
        }

        for raw in &model.classes {
            if self.lookup_name(&raw.name).is_some() {
                return Err(TypeError::Duplicate(raw.name.clone()));
            }
            self.declare_class(&raw.name)?;
        }
        for raw in &model.classes {
            let mut spec = ClassSpec::new();
            if raw.anonymous {
                spec = spec.anonymous();
            }
            if let Some(base) = &raw.base {
                spec = spec.base(self.parse(base)?);
            }
            for interface in &raw.interfaces {
                spec = spec.implements(self.parse(interface)?);
            }
            for member in &raw.members {
                spec = spec.member(member.name.clone(), self.parse(&member.type_name)?);
            }
            self.define_class(&raw.name, spec)?;
        }

        Ok(())
    }
}
