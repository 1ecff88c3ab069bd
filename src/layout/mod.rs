//! Struct layout resolution
//!
//! Computes byte sizes and field offsets for the structs of an API
//! description. Layouts are packed: every field starts at the sum of the
//! sizes of the fields before it, with no alignment padding, matching the
//! native library's declared layout on wasm32.
//!
//! # Type Sizes
//!
//! - `char`/`bool`: 1 byte, `short`: 2 bytes
//! - `int`/`long`/`float`/pointer: 4 bytes (regardless of pointee type)
//! - `long long`/`double`: 8 bytes
//! - array: `length * sizeof(element)`
//! - struct: the total size recorded in the [`StructRegistry`]
//!
//! Struct references are looked up in the registry, so a struct can only be
//! resolved after every struct it embeds by value. [`dependency_order`]
//! produces such an order from a description.

pub mod order;
pub mod registry;

pub use order::dependency_order;
pub use registry::StructRegistry;

use crate::api::StructDesc;
use crate::ctype::{parse_type, CType, CTypeError, IntWidth};
use serde::Serialize;
use std::fmt;

/// One field of a resolved struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldLayout {
    pub name: String,
    pub ctype: CType,
    pub offset: usize,
    pub size: usize,
}

/// A resolved struct: fields with their byte offsets, and the total size
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructLayout {
    pub name: String,
    pub fields: Vec<FieldLayout>,
    pub size: usize,
}

impl StructLayout {
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Same fields and size under another name
    pub fn renamed(&self, name: impl Into<String>) -> StructLayout {
        StructLayout {
            name: name.into(),
            fields: self.fields.clone(),
            size: self.size,
        }
    }
}

/// A struct name that is not (yet) in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    pub name: String,
    /// Struct and field that needed the size, when known
    pub structure: Option<String>,
    pub field: Option<String>,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.structure, &self.field) {
            (Some(structure), Some(field)) => write!(
                f,
                "Struct '{}' is not defined (needed by field '{}' of '{}')",
                self.name, field, structure
            ),
            (Some(structure), None) => write!(
                f,
                "Struct '{}' is not defined (needed by '{}')",
                self.name, structure
            ),
            _ => write!(f, "Struct '{}' is not defined", self.name),
        }
    }
}

impl std::error::Error for LookupError {}

/// Why a type has no size
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeError {
    Void,
    UnknownStruct(String),
    Overflow,
}

impl fmt::Display for SizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeError::Void => write!(f, "void has no size"),
            SizeError::UnknownStruct(name) => write!(f, "Struct '{}' is not defined", name),
            SizeError::Overflow => write!(f, "size overflows usize"),
        }
    }
}

impl std::error::Error for SizeError {}

/// Errors raised while resolving layouts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A field's type string does not lex or parse
    Type {
        structure: String,
        field: String,
        source: CTypeError,
    },

    /// A field declared as `void`
    VoidField { structure: String, field: String },

    /// A struct reference missing from the registry
    Lookup(LookupError),

    /// Array or struct size does not fit in `usize`
    SizeOverflow { structure: String, field: String },

    /// A second layout under an existing name
    Duplicate { name: String },

    /// Structs that embed each other by value
    Cycle { names: Vec<String> },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Type {
                structure,
                field,
                source,
            } => write!(
                f,
                "Invalid type for field '{}' of '{}': {}",
                field, structure, source
            ),
            LayoutError::VoidField { structure, field } => {
                write!(f, "Field '{}' of '{}' is declared void", field, structure)
            }
            LayoutError::Lookup(err) => write!(f, "{}", err),
            LayoutError::SizeOverflow { structure, field } => write!(
                f,
                "Size of field '{}' of '{}' overflows",
                field, structure
            ),
            LayoutError::Duplicate { name } => {
                write!(f, "Struct '{}' is already registered", name)
            }
            LayoutError::Cycle { names } => write!(
                f,
                "Structs embed each other by value: {}",
                names.join(", ")
            ),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayoutError::Type { source, .. } => Some(source),
            LayoutError::Lookup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LookupError> for LayoutError {
    fn from(err: LookupError) -> Self {
        LayoutError::Lookup(err)
    }
}

/// Size of a type in bytes
pub fn size_of(ctype: &CType, registry: &StructRegistry) -> Result<usize, SizeError> {
    match ctype {
        CType::Void => Err(SizeError::Void),
        CType::Integer { width, .. } => Ok(width.bytes()),
        // wasm32: pointers are 32-bit addresses, whatever the depth
        CType::Pointer { .. } | CType::Float => Ok(IntWidth::W32.bytes()),
        CType::Double => Ok(8),
        CType::Array { of, length } => size_of(of, registry)?
            .checked_mul(*length)
            .ok_or(SizeError::Overflow),
        CType::StructRef { name } => registry
            .size_of_struct(name)
            .ok_or_else(|| SizeError::UnknownStruct(name.clone())),
    }
}

/// Resolve one struct description against the structs resolved so far.
///
/// Fields are laid out in declaration order. The first failing field aborts
/// the whole struct.
pub fn resolve_layout(
    desc: &StructDesc,
    registry: &StructRegistry,
) -> Result<StructLayout, LayoutError> {
    let mut fields = Vec::with_capacity(desc.fields.len());
    let mut offset: usize = 0;

    for field in &desc.fields {
        let ctype = parse_type(&field.type_name).map_err(|source| LayoutError::Type {
            structure: desc.name.clone(),
            field: field.name.clone(),
            source,
        })?;

        let size = size_of(&ctype, registry).map_err(|err| match err {
            SizeError::Void => LayoutError::VoidField {
                structure: desc.name.clone(),
                field: field.name.clone(),
            },
            SizeError::UnknownStruct(name) => LayoutError::Lookup(LookupError {
                name,
                structure: Some(desc.name.clone()),
                field: Some(field.name.clone()),
            }),
            SizeError::Overflow => LayoutError::SizeOverflow {
                structure: desc.name.clone(),
                field: field.name.clone(),
            },
        })?;

        fields.push(FieldLayout {
            name: field.name.clone(),
            ctype,
            offset,
            size,
        });

        offset = offset
            .checked_add(size)
            .ok_or_else(|| LayoutError::SizeOverflow {
                structure: desc.name.clone(),
                field: field.name.clone(),
            })?;
    }

    Ok(StructLayout {
        name: desc.name.clone(),
        fields,
        size: offset,
    })
}
