//! Raw City Object records
//!
//! Typed view of the `CityObjects` map as it appears in the document.
//! Boundaries stay as JSON values because their nesting depth depends on
//! the geometry type; they are resolved later against the vertex pool.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CityJsonError;
use crate::model::{Attributes, Warning};

/// LOD assumed for geometry entries that do not carry one
pub const DEFAULT_GEOMETRY_LOD: i32 = 1;

/// City Object type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum CityObjectType {
    Building,
    BuildingPart,
    TINRelief,
    Other(String),
}

impl From<String> for CityObjectType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Building" => CityObjectType::Building,
            "BuildingPart" => CityObjectType::BuildingPart,
            "TINRelief" => CityObjectType::TINRelief,
            _ => CityObjectType::Other(name),
        }
    }
}

impl From<&str> for CityObjectType {
    fn from(name: &str) -> Self {
        CityObjectType::from(name.to_string())
    }
}

impl CityObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            CityObjectType::Building => "Building",
            CityObjectType::BuildingPart => "BuildingPart",
            CityObjectType::TINRelief => "TINRelief",
            CityObjectType::Other(name) => name,
        }
    }
}

impl fmt::Display for CityObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry representation kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum GeometryKind {
    MultiSurface,
    CompositeSurface,
    Solid,
    Other(String),
}

impl From<String> for GeometryKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "MultiSurface" => GeometryKind::MultiSurface,
            "CompositeSurface" => GeometryKind::CompositeSurface,
            "Solid" => GeometryKind::Solid,
            _ => GeometryKind::Other(name),
        }
    }
}

impl From<&str> for GeometryKind {
    fn from(name: &str) -> Self {
        GeometryKind::from(name.to_string())
    }
}

impl GeometryKind {
    pub fn as_str(&self) -> &str {
        match self {
            GeometryKind::MultiSurface => "MultiSurface",
            GeometryKind::CompositeSurface => "CompositeSurface",
            GeometryKind::Solid => "Solid",
            GeometryKind::Other(name) => name,
        }
    }

    pub fn is_surface_family(&self) -> bool {
        matches!(self, GeometryKind::MultiSurface | GeometryKind::CompositeSurface)
    }

    pub fn is_solid_family(&self) -> bool {
        matches!(self, GeometryKind::Solid)
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `2`, `2.0`, `"2"` and `"2.2"`; the integer part is the LOD
fn lod_from_value<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let lod = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    lod.map(|l| l.trunc() as i32)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid lod {}", value)))
}

fn default_lod() -> i32 {
    DEFAULT_GEOMETRY_LOD
}

/// One entry of a City Object's `geometry` array
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeometryEntry {
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    #[serde(default = "default_lod", deserialize_with = "lod_from_value")]
    pub lod: i32,
    #[serde(default)]
    pub boundaries: Value,
    #[serde(default)]
    pub semantics: Option<Value>,
}

impl GeometryEntry {
    pub fn new(kind: impl Into<GeometryKind>, lod: i32, boundaries: Value) -> Self {
        Self {
            kind: kind.into(),
            lod,
            boundaries,
            semantics: None,
        }
    }
}

/// `null` reads like an absent member
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Members every City Object needs for classification
#[derive(Deserialize)]
struct RecordHeader {
    #[serde(rename = "type")]
    object_type: CityObjectType,
    #[serde(default, deserialize_with = "null_as_default")]
    parents: Vec<String>,
}

/// Members only read for objects the loader keeps
#[derive(Deserialize)]
struct RecordBody {
    #[serde(default, deserialize_with = "null_as_default")]
    children: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    geometry: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    attributes: Attributes,
}

/// A City Object as read from the document, keyed by `id` in the flat map
#[derive(Debug, Clone, PartialEq)]
pub struct CityObjectRecord {
    pub id: String,
    pub object_type: CityObjectType,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    /// Geometry entries that decoded, in document order
    pub geometry: Vec<GeometryEntry>,
    /// One error per geometry entry that did not decode
    pub geometry_errors: Vec<CityJsonError>,
    pub attributes: Attributes,
}

impl CityObjectRecord {
    /// Decode one member of the `CityObjects` map.
    ///
    /// Objects of an unsupported type only have `type` and `parents` read.
    /// A geometry entry that fails to decode is kept as an error on the
    /// record instead of failing the record.
    pub fn decode(id: &str, value: &Value) -> Result<Self, CityJsonError> {
        let header = RecordHeader::deserialize(value).map_err(|e| CityJsonError::MalformedObject(e.to_string()))?;
        let mut record = Self {
            id: id.to_string(),
            object_type: header.object_type,
            parents: header.parents,
            children: Vec::new(),
            geometry: Vec::new(),
            geometry_errors: Vec::new(),
            attributes: Attributes::new(),
        };
        if matches!(record.object_type, CityObjectType::Other(_)) {
            return Ok(record);
        }

        let body = RecordBody::deserialize(value).map_err(|e| CityJsonError::MalformedObject(e.to_string()))?;
        for entry in &body.geometry {
            match GeometryEntry::deserialize(entry) {
                Ok(entry) => record.geometry.push(entry),
                Err(e) => record.geometry_errors.push(CityJsonError::MalformedGeometry(e.to_string())),
            }
        }
        record.children = body.children;
        record.attributes = body.attributes;
        Ok(record)
    }

    /// Objects without parent references start a hierarchy
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Decode every City Object, in document order.
///
/// Objects that cannot be decoded are left out of the map and reported.
pub fn decode_records(objects: &IndexMap<String, Value>, warnings: &mut Vec<Warning>) -> IndexMap<String, CityObjectRecord> {
    let mut records = IndexMap::with_capacity(objects.len());
    for (id, value) in objects {
        match CityObjectRecord::decode(id, value) {
            Ok(record) => {
                records.insert(id.clone(), record);
            }
            Err(source) => warnings.push(Warning::MalformedObject { id: id.clone(), source }),
        }
    }
    records
}
