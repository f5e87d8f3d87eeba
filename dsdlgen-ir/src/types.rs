//! Data types carried by attributes.

use serde::{Deserialize, Serialize};

use crate::TypeKey;

/// Primitive (non-composite) data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "primitive", rename_all = "snake_case")]
pub enum PrimitiveType {
    Boolean,
    SignedInteger { bits: u8 },
    UnsignedInteger { bits: u8 },
    Float { bits: u8 },
    /// Padding type; carries no value.
    Void { bits: u8 },
}

impl PrimitiveType {
    /// Get the lowercase schema name of this primitive (e.g. `uint8`).
    pub fn schema_name(&self) -> String {
        match self {
            PrimitiveType::Boolean => "bool".to_string(),
            PrimitiveType::SignedInteger { bits } => format!("int{}", bits),
            PrimitiveType::UnsignedInteger { bits } => format!("uint{}", bits),
            PrimitiveType::Float { bits } => format!("float{}", bits),
            PrimitiveType::Void { bits } => format!("void{}", bits),
        }
    }

    /// Returns true for signed and unsigned integers.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            PrimitiveType::SignedInteger { .. } | PrimitiveType::UnsignedInteger { .. }
        )
    }
}

/// Array capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayCapacity {
    /// Fixed length array.
    Fixed(u32),
    /// Variable length array with an upper bound.
    Variable(u32),
}

impl ArrayCapacity {
    /// Maximum number of elements.
    pub fn max(&self) -> u32 {
        match self {
            ArrayCapacity::Fixed(n) | ArrayCapacity::Variable(n) => *n,
        }
    }

    /// Returns true for variable length arrays.
    pub fn is_variable(&self) -> bool {
        matches!(self, ArrayCapacity::Variable(_))
    }
}

/// The data type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataType {
    /// A primitive value.
    Primitive(PrimitiveType),
    /// An array of some element type.
    Array {
        element: Box<DataType>,
        capacity: ArrayCapacity,
    },
    /// A reference to another composite type, by key.
    Composite(TypeKey),
}

impl DataType {
    /// Returns true if this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self, DataType::Primitive(_))
    }

    /// Get the referenced composite key, if any.
    pub fn as_composite(&self) -> Option<&TypeKey> {
        match self {
            DataType::Composite(key) => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Version;

    #[test]
    fn test_primitive_schema_name() {
        assert_eq!(PrimitiveType::Boolean.schema_name(), "bool");
        assert_eq!(
            PrimitiveType::UnsignedInteger { bits: 8 }.schema_name(),
            "uint8"
        );
        assert_eq!(PrimitiveType::Float { bits: 32 }.schema_name(), "float32");
    }

    #[test]
    fn test_array_capacity() {
        assert_eq!(ArrayCapacity::Fixed(4).max(), 4);
        assert!(ArrayCapacity::Variable(10).is_variable());
        assert!(!ArrayCapacity::Fixed(10).is_variable());
    }

    #[test]
    fn test_data_type_deserialize_array() {
        let json = r#"{
            "type": "array",
            "element": { "type": "primitive", "primitive": "unsigned_integer", "bits": 8 },
            "capacity": { "variable": 16 }
        }"#;
        let ty: DataType = serde_json::from_str(json).unwrap();

        assert_eq!(
            ty,
            DataType::Array {
                element: Box::new(DataType::Primitive(PrimitiveType::UnsignedInteger {
                    bits: 8
                })),
                capacity: ArrayCapacity::Variable(16),
            }
        );
    }

    #[test]
    fn test_data_type_as_composite() {
        let key = TypeKey::new("uavcan.node.Health", Version::new(1, 0));
        let ty = DataType::Composite(key.clone());
        assert_eq!(ty.as_composite(), Some(&key));
        assert!(!ty.is_primitive());
    }
}
