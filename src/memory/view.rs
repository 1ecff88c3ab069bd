//! Field access through a resolved layout
//!
//! A [`StructView`] pairs a [`StructLayout`] with a base address and reads
//! or writes fields at `base + offset`, which is exactly what the generated
//! property accessors do at runtime.

use super::{Address, LinearMemory, MemoryError, ScalarKind, Value};
use crate::ctype::CType;
use crate::layout::{size_of, StructLayout, StructRegistry};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewError {
    UnknownField { structure: String, field: String },
    /// Scalar access to an array or struct field (or the reverse)
    NotScalar { field: String, ctype: CType },
    NotStruct { field: String, ctype: CType },
    IndexOutOfRange { field: String, index: usize, length: usize },
    UnknownStruct { name: String },
    /// Offset does not fit the 32-bit address space
    AddressOverflow { field: String },
    Memory(MemoryError),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::UnknownField { structure, field } => {
                write!(f, "'{}' has no field '{}'", structure, field)
            }
            ViewError::NotScalar { field, ctype } => {
                write!(f, "Field '{}' of type '{}' is not a scalar", field, ctype)
            }
            ViewError::NotStruct { field, ctype } => {
                write!(f, "Field '{}' of type '{}' is not a struct", field, ctype)
            }
            ViewError::IndexOutOfRange {
                field,
                index,
                length,
            } => write!(
                f,
                "Index {} out of range for field '{}' of length {}",
                index, field, length
            ),
            ViewError::UnknownStruct { name } => write!(f, "Struct '{}' is not defined", name),
            ViewError::AddressOverflow { field } => {
                write!(f, "Address of field '{}' overflows", field)
            }
            ViewError::Memory(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewError::Memory(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MemoryError> for ViewError {
    fn from(err: MemoryError) -> Self {
        ViewError::Memory(err)
    }
}

/// A struct instance in linear memory
#[derive(Debug, Clone, Copy)]
pub struct StructView<'a> {
    layout: &'a StructLayout,
    address: Address,
}

impl<'a> StructView<'a> {
    /// View an existing instance
    pub fn at(layout: &'a StructLayout, address: Address) -> Self {
        StructView { layout, address }
    }

    /// Allocate a zeroed instance
    pub fn alloc<M: LinearMemory>(
        memory: &mut M,
        layout: &'a StructLayout,
    ) -> Result<Self, ViewError> {
        let address = memory.malloc(layout.size)?;
        Ok(StructView { layout, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn layout(&self) -> &'a StructLayout {
        self.layout
    }

    fn field_info(&self, field: &str) -> Result<(Address, &'a CType), ViewError> {
        let layout = self.layout.field(field).ok_or_else(|| ViewError::UnknownField {
            structure: self.layout.name.clone(),
            field: field.to_string(),
        })?;
        let address = offset_address(self.address, layout.offset, field)?;
        Ok((address, &layout.ctype))
    }

    /// Address of a field
    pub fn field_address(&self, field: &str) -> Result<Address, ViewError> {
        self.field_info(field).map(|(address, _)| address)
    }

    /// Read a scalar or pointer field
    pub fn get<M: LinearMemory>(&self, memory: &M, field: &str) -> Result<Value, ViewError> {
        let (address, ctype) = self.field_info(field)?;
        let kind = scalar_kind(field, ctype)?;
        Ok(memory.read_scalar(address, kind)?)
    }

    /// Write a scalar or pointer field
    pub fn set<M: LinearMemory>(
        &self,
        memory: &mut M,
        field: &str,
        value: Value,
    ) -> Result<(), ViewError> {
        let (address, ctype) = self.field_info(field)?;
        let kind = scalar_kind(field, ctype)?;
        Ok(memory.write_scalar(address, kind, value)?)
    }

    fn element(&self, field: &str, index: usize) -> Result<(Address, ScalarKind), ViewError> {
        let (address, ctype) = self.field_info(field)?;
        let Some((of, length)) = ctype.element() else {
            return Err(ViewError::NotScalar {
                field: field.to_string(),
                ctype: ctype.clone(),
            });
        };
        if index >= length {
            return Err(ViewError::IndexOutOfRange {
                field: field.to_string(),
                index,
                length,
            });
        }
        let kind = scalar_kind(field, of)?;
        let offset = index
            .checked_mul(kind.size())
            .ok_or_else(|| ViewError::AddressOverflow {
                field: field.to_string(),
            })?;
        Ok((offset_address(address, offset, field)?, kind))
    }

    /// Read one element of an array-of-scalars field
    pub fn get_element<M: LinearMemory>(
        &self,
        memory: &M,
        field: &str,
        index: usize,
    ) -> Result<Value, ViewError> {
        let (address, kind) = self.element(field, index)?;
        Ok(memory.read_scalar(address, kind)?)
    }

    /// Write one element of an array-of-scalars field
    pub fn set_element<M: LinearMemory>(
        &self,
        memory: &mut M,
        field: &str,
        index: usize,
        value: Value,
    ) -> Result<(), ViewError> {
        let (address, kind) = self.element(field, index)?;
        Ok(memory.write_scalar(address, kind, value)?)
    }

    /// View of a struct embedded by value
    pub fn nested(
        &self,
        field: &str,
        registry: &'a StructRegistry,
    ) -> Result<StructView<'a>, ViewError> {
        let (address, ctype) = self.field_info(field)?;
        let CType::StructRef { name } = ctype else {
            return Err(ViewError::NotStruct {
                field: field.to_string(),
                ctype: ctype.clone(),
            });
        };
        let layout = registry
            .get(name)
            .ok_or_else(|| ViewError::UnknownStruct { name: name.clone() })?;
        Ok(StructView::at(layout, address))
    }

    /// Copy the raw bytes of a by-value struct field from `source`
    pub fn set_struct<M: LinearMemory>(
        &self,
        memory: &mut M,
        field: &str,
        source: &StructView<'_>,
        registry: &StructRegistry,
    ) -> Result<(), ViewError> {
        let (address, ctype) = self.field_info(field)?;
        let size = size_of(ctype, registry).map_err(|_| ViewError::NotStruct {
            field: field.to_string(),
            ctype: ctype.clone(),
        })?;
        if !matches!(ctype, CType::StructRef { .. }) || size != source.layout.size {
            return Err(ViewError::NotStruct {
                field: field.to_string(),
                ctype: ctype.clone(),
            });
        }
        let bytes = memory.read_bytes(source.address, size)?;
        Ok(memory.write_bytes(address, &bytes)?)
    }

    /// Allocate a copy of this instance
    pub fn clone_in<M: LinearMemory>(&self, memory: &mut M) -> Result<StructView<'a>, ViewError> {
        let bytes = memory.read_bytes(self.address, self.layout.size)?;
        let copy = StructView::alloc(memory, self.layout)?;
        memory.write_bytes(copy.address, &bytes)?;
        Ok(copy)
    }

    pub fn free<M: LinearMemory>(self, memory: &mut M) -> Result<(), ViewError> {
        Ok(memory.free(self.address)?)
    }
}

fn scalar_kind(field: &str, ctype: &CType) -> Result<ScalarKind, ViewError> {
    ScalarKind::of(ctype).ok_or_else(|| ViewError::NotScalar {
        field: field.to_string(),
        ctype: ctype.clone(),
    })
}

fn offset_address(base: Address, offset: usize, field: &str) -> Result<Address, ViewError> {
    Address::try_from(offset)
        .ok()
        .and_then(|offset| base.checked_add(offset))
        .ok_or_else(|| ViewError::AddressOverflow {
            field: field.to_string(),
        })
}
