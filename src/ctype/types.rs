// C type representation produced by the type-string parser

use serde::{Serialize, Serializer};
use std::fmt;

/// Width of a fixed-width integer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub fn bits(self) -> u8 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }
}

impl Serialize for IntWidth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

/// A parsed C type.
///
/// Pointer depth is counted rather than nested: `int***` is one `Pointer`
/// node with `depth == 3`. `StructRef` only names a struct; its size lives in
/// the layout registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CType {
    Void,
    Integer { width: IntWidth, signed: bool },
    Float,
    Double,
    Pointer { to: Box<CType>, depth: usize },
    Array { of: Box<CType>, length: usize },
    StructRef { name: String },
}

impl CType {
    pub fn int(width: IntWidth, signed: bool) -> Self {
        CType::Integer { width, signed }
    }

    pub fn struct_ref(name: impl Into<String>) -> Self {
        CType::StructRef { name: name.into() }
    }

    pub fn pointer_to(self, depth: usize) -> Self {
        CType::Pointer {
            to: Box::new(self),
            depth,
        }
    }

    pub fn array_of(self, length: usize) -> Self {
        CType::Array {
            of: Box::new(self),
            length,
        }
    }

    /// Pointed-to type and pointer depth
    pub fn pointee(&self) -> Option<(&CType, usize)> {
        match self {
            CType::Pointer { to, depth } => Some((to, *depth)),
            _ => None,
        }
    }

    /// Element type and length of an array
    pub fn element(&self) -> Option<(&CType, usize)> {
        match self {
            CType::Array { of, length } => Some((of, *length)),
            _ => None,
        }
    }

    /// Numbers and pointers: values that fit one typed memory access.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            CType::Integer { .. } | CType::Float | CType::Double | CType::Pointer { .. }
        )
    }

    /// Name of the struct this type embeds by value, looking through arrays.
    pub fn struct_dependency(&self) -> Option<&str> {
        match self {
            CType::StructRef { name } => Some(name),
            CType::Array { of, .. } => of.struct_dependency(),
            _ => None,
        }
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Void => write!(f, "void"),
            CType::Integer { width, signed } => {
                let name = match width {
                    IntWidth::W8 => "char",
                    IntWidth::W16 => "short",
                    IntWidth::W32 => "int",
                    IntWidth::W64 => "long long",
                };
                if *signed {
                    write!(f, "{}", name)
                } else {
                    write!(f, "unsigned {}", name)
                }
            }
            CType::Float => write!(f, "float"),
            CType::Double => write!(f, "double"),
            CType::Pointer { to, depth } => write!(f, "{} {}", to, "*".repeat(*depth)),
            CType::Array { of, length } => write!(f, "{}[{}]", of, length),
            CType::StructRef { name } => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_spelling() {
        assert_eq!(CType::int(IntWidth::W8, false).to_string(), "unsigned char");
        assert_eq!(
            CType::struct_ref("Vector3").pointer_to(2).to_string(),
            "Vector3 **"
        );
        assert_eq!(CType::Float.array_of(4).to_string(), "float[4]");
    }

    #[test]
    fn test_struct_dependency_ignores_pointers() {
        assert_eq!(
            CType::struct_ref("Color").array_of(2).struct_dependency(),
            Some("Color")
        );
        assert_eq!(CType::struct_ref("Image").pointer_to(1).struct_dependency(), None);
        assert_eq!(CType::Float.struct_dependency(), None);
    }

    #[test]
    fn test_pointee_and_element() {
        let pointer = CType::int(IntWidth::W8, true).pointer_to(3);
        assert_eq!(pointer.pointee(), Some((&CType::int(IntWidth::W8, true), 3)));
        assert_eq!(pointer.element(), None);

        let array = CType::struct_ref("Matrix").array_of(2);
        assert_eq!(array.element(), Some((&CType::struct_ref("Matrix"), 2)));
        assert_eq!(array.pointee(), None);

        assert_eq!(CType::Double.pointee(), None);
        assert_eq!(CType::Double.element(), None);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_string(&CType::int(IntWidth::W16, true).array_of(3)).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"array","of":{"kind":"integer","width":16,"signed":true},"length":3}"#
        );
    }
}
