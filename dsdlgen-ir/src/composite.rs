//! Composite type definitions produced by the schema front-end.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DataType;

/// Major/minor version of a composite type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Identity of a composite type: its full dotted name and version.
///
/// Types reference each other by key so that the model can express
/// reference cycles without shared ownership.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeKey {
    pub full_name: String,
    pub version: Version,
}

impl TypeKey {
    pub fn new(full_name: impl Into<String>, version: Version) -> Self {
        Self {
            full_name: full_name.into(),
            version,
        }
    }

    /// Last component of the dotted name.
    pub fn short_name(&self) -> &str {
        short_name_of(&self.full_name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.full_name, self.version)
    }
}

/// What an attribute is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeKind {
    /// A regular data field.
    Field,
    /// Anonymous padding field.
    Padding,
    /// A constant with its literal value as written in the schema.
    Constant { value: String },
}

/// A field or constant of a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name (empty for padding).
    #[serde(default)]
    pub name: String,
    /// Field, padding or constant.
    #[serde(flatten)]
    pub kind: AttributeKind,
    /// Data type of the attribute.
    pub data_type: DataType,
}

impl Attribute {
    /// Create a data field.
    pub fn field(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Field,
            data_type,
        }
    }

    /// Create a constant.
    pub fn constant(name: impl Into<String>, data_type: DataType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Constant {
                value: value.into(),
            },
            data_type,
        }
    }

    /// Returns true if this attribute is a constant.
    pub fn is_constant(&self) -> bool {
        matches!(self.kind, AttributeKind::Constant { .. })
    }
}

/// Structural kind of a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompositeKind {
    /// Plain structure.
    Structure,
    /// Tagged union; exactly one field is active.
    Union,
    /// Service with a request and a response type. Services have no
    /// attributes of their own.
    Service { request: TypeKey, response: TypeKey },
}

/// A versioned composite type (structure, union or service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeType {
    /// Full dotted name, e.g. `uavcan.node.Heartbeat`.
    pub full_name: String,
    /// Type version.
    pub version: Version,
    /// Structure, union or service.
    #[serde(flatten)]
    pub kind: CompositeKind,
    /// Ordered fields and constants.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Owning service when this type is a service request or response.
    #[serde(default)]
    pub parent_service: Option<TypeKey>,
    /// Marked deprecated in the schema.
    #[serde(default)]
    pub deprecated: bool,
}

impl CompositeType {
    /// Create a structure type with no attributes.
    pub fn structure(full_name: impl Into<String>, version: Version) -> Self {
        Self::new(full_name, version, CompositeKind::Structure)
    }

    /// Create a union type with no attributes.
    pub fn union(full_name: impl Into<String>, version: Version) -> Self {
        Self::new(full_name, version, CompositeKind::Union)
    }

    /// Create a service type from its request and response keys.
    pub fn service(
        full_name: impl Into<String>,
        version: Version,
        request: TypeKey,
        response: TypeKey,
    ) -> Self {
        Self::new(full_name, version, CompositeKind::Service { request, response })
    }

    fn new(full_name: impl Into<String>, version: Version, kind: CompositeKind) -> Self {
        Self {
            full_name: full_name.into(),
            version,
            kind,
            attributes: Vec::new(),
            parent_service: None,
            deprecated: false,
        }
    }

    /// Add an attribute (builder style).
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Set the owning service (builder style).
    pub fn with_parent_service(mut self, parent: TypeKey) -> Self {
        self.parent_service = Some(parent);
        self
    }

    /// Identity key of this type.
    pub fn key(&self) -> TypeKey {
        TypeKey::new(self.full_name.clone(), self.version)
    }

    /// Last component of the dotted name.
    pub fn short_name(&self) -> &str {
        short_name_of(&self.full_name)
    }

    /// Full name of the owning namespace (the name minus the short name).
    pub fn namespace(&self) -> &str {
        self.full_name
            .rsplit_once('.')
            .map(|(ns, _)| ns)
            .unwrap_or("")
    }

    /// Namespace name split into its components.
    pub fn namespace_components(&self) -> Vec<&str> {
        self.namespace().split('.').filter(|c| !c.is_empty()).collect()
    }

    pub fn is_union(&self) -> bool {
        matches!(self.kind, CompositeKind::Union)
    }

    pub fn is_service(&self) -> bool {
        matches!(self.kind, CompositeKind::Service { .. })
    }

    /// Data fields (excludes constants).
    pub fn fields(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| !a.is_constant())
    }

    /// Constants.
    pub fn constants(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| a.is_constant())
    }
}

fn short_name_of(full_name: &str) -> &str {
    full_name
        .rsplit_once('.')
        .map(|(_, short)| short)
        .unwrap_or(full_name)
}
