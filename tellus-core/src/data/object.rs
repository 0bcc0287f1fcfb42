//! Data object kinds and the shared object container

use super::history::{History, HistoryEntry};
use crate::error::TellusError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The kind of data an object carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    /// Regular raster grid
    Grid,
    /// Vector features (points, lines, polygons)
    Shapes,
    /// Attribute table
    Table,
    /// Irregular point cloud
    PointCloud,
    /// Triangulated irregular network
    Tin,
}

impl DataKind {
    /// Parse a kind name, as used by manifests and front ends
    pub fn parse(name: &str) -> Result<Self, TellusError> {
        match name.to_ascii_lowercase().as_str() {
            "grid" => Ok(DataKind::Grid),
            "shapes" => Ok(DataKind::Shapes),
            "table" => Ok(DataKind::Table),
            "pointcloud" | "point_cloud" => Ok(DataKind::PointCloud),
            "tin" => Ok(DataKind::Tin),
            other => Err(TellusError::UnsupportedKind(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Grid => "grid",
            DataKind::Shapes => "shapes",
            DataKind::Table => "table",
            DataKind::PointCloud => "point_cloud",
            DataKind::Tin => "tin",
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique in-process identifier of a data object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spatial reference tag carried by georeferenced objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialReference {
    /// Authority code, e.g. "EPSG:4326"
    pub authority: String,

    /// Full definition string (WKT or proj), if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl SpatialReference {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            definition: None,
        }
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }
}

/// A typed unit of geospatial or tabular data
///
/// The manager core never interprets the payload itself; tools do. The
/// object carries the metadata every collaborator needs: kind, name,
/// projection, provenance history, and kind-specific attributes (a table,
/// for instance, lists its field names under `"fields"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataObject {
    id: ObjectId,
    kind: DataKind,
    name: Option<String>,
    projection: Option<SpatialReference>,
    history: History,
    attributes: Value,
}

impl DataObject {
    /// Create a fresh, unnamed object of the given kind
    pub fn new(kind: DataKind) -> Self {
        Self {
            id: ObjectId::new(),
            kind,
            name: None,
            projection: None,
            history: History::new(),
            attributes: Value::Null,
        }
    }

    /// Create an object from a kind name, failing on unknown kinds
    pub fn create(kind: &str) -> Result<Self, TellusError> {
        Ok(Self::new(DataKind::parse(kind)?))
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn projection(&self) -> Option<&SpatialReference> {
        self.projection.as_ref()
    }

    pub fn set_projection(&mut self, projection: Option<SpatialReference>) {
        self.projection = projection;
    }

    /// The provenance log, oldest entry first
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Append a provenance entry; prior entries are never touched
    pub fn record_history(&mut self, entry: HistoryEntry) {
        self.history.record(entry);
    }

    /// Kind-specific attribute payload
    pub fn attributes(&self) -> &Value {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: Value) {
        self.attributes = attributes;
    }

    /// Field names of a table-like object, as used by dependent parameters
    pub fn fields(&self) -> Vec<String> {
        self.attributes
            .get("fields")
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|f| f.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_fields(&mut self, fields: &[&str]) {
        let value = Value::Array(fields.iter().map(|f| Value::from(*f)).collect());
        match &mut self.attributes {
            Value::Object(map) => {
                map.insert("fields".to_string(), value);
            }
            _ => {
                self.attributes = serde_json::json!({ "fields": value });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_unknown_kind() {
        assert!(DataObject::create("grid").is_ok());
        assert!(matches!(
            DataObject::create("hologram"),
            Err(TellusError::UnsupportedKind(_))
        ));
    }

    #[test]
    fn projection_roundtrip() {
        let mut object = DataObject::new(DataKind::Grid);
        assert!(object.projection().is_none());

        object.set_projection(Some(SpatialReference::new("EPSG:32632")));
        assert_eq!(object.projection().unwrap().authority, "EPSG:32632");

        object.set_projection(None);
        assert!(object.projection().is_none());
    }

    #[test]
    fn table_fields_from_attributes() {
        let mut table = DataObject::new(DataKind::Table);
        assert!(table.fields().is_empty());

        table.set_fields(&["elevation", "aspect"]);
        assert_eq!(table.fields(), vec!["elevation", "aspect"]);
    }
}
