//! Linear memory contract used by the generated bindings
//!
//! The generated accessor classes read and write struct fields in the
//! WebAssembly module's linear memory at the offsets computed by
//! [`crate::layout`]. This module states that contract in Rust:
//! - [`LinearMemory`]: `malloc`/`free` plus little-endian typed access
//! - [`heap`]: an in-process [`heap::Heap`] implementing the contract
//! - [`view`]: [`view::StructView`], field access through a struct layout
//!
//! # Scalar Kinds
//!
//! Every scalar C type maps to exactly one [`ScalarKind`], which fixes the
//! width and signedness of the memory access:
//! ```text
//! char/bool → I8   unsigned char → U8   short → I16  unsigned short → U16
//! int/long  → I32  unsigned      → U32  pointer → U32
//! long long → I64  unsigned long long → U64  float → F32  double → F64
//! ```
//! A mismatch between a field's kind and its computed offset silently
//! corrupts neighbouring fields, so both are derived from the same
//! [`CType`].

pub mod heap;
pub mod view;

use crate::ctype::{CType, IntWidth};
use std::fmt;

/// Byte address in a 32-bit linear memory
pub type Address = u32;

/// Width and signedness of one typed memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl ScalarKind {
    /// Access kind for a field type. `None` for void, arrays and structs.
    pub fn of(ctype: &CType) -> Option<ScalarKind> {
        let kind = match ctype {
            CType::Integer { width, signed } => match (width, signed) {
                (IntWidth::W8, true) => ScalarKind::I8,
                (IntWidth::W8, false) => ScalarKind::U8,
                (IntWidth::W16, true) => ScalarKind::I16,
                (IntWidth::W16, false) => ScalarKind::U16,
                (IntWidth::W32, true) => ScalarKind::I32,
                (IntWidth::W32, false) => ScalarKind::U32,
                (IntWidth::W64, true) => ScalarKind::I64,
                (IntWidth::W64, false) => ScalarKind::U64,
            },
            CType::Pointer { .. } => ScalarKind::U32,
            CType::Float => ScalarKind::F32,
            CType::Double => ScalarKind::F64,
            CType::Void | CType::Array { .. } | CType::StructRef { .. } => return None,
        };
        Some(kind)
    }

    pub fn size(self) -> usize {
        match self {
            ScalarKind::I8 | ScalarKind::U8 => 1,
            ScalarKind::I16 | ScalarKind::U16 => 2,
            ScalarKind::I32 | ScalarKind::U32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 => 8,
        }
    }

    /// Suffix of the matching `DataView` getter/setter (`getUint16`, ...)
    pub fn accessor(self) -> &'static str {
        match self {
            ScalarKind::I8 => "Int8",
            ScalarKind::U8 => "Uint8",
            ScalarKind::I16 => "Int16",
            ScalarKind::U16 => "Uint16",
            ScalarKind::I32 => "Int32",
            ScalarKind::U32 => "Uint32",
            ScalarKind::I64 => "BigInt64",
            ScalarKind::U64 => "BigUint64",
            ScalarKind::F32 => "Float32",
            ScalarKind::F64 => "Float64",
        }
    }
}

/// A scalar read from or written to memory
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Value {
    fn as_i64(self) -> i64 {
        match self {
            Value::Int(n) => n,
            Value::UInt(n) => n as i64,
            Value::Float(x) => x as i64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Value::Int(n) => n as f64,
            Value::UInt(n) => n as f64,
            Value::Float(x) => x,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Memory errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    OutOfMemory { requested: usize, limit: usize },
    InvalidPointer { address: Address },
    UseAfterFree { address: Address },
    DoubleFree { address: Address },
    InvalidFree { address: Address },
    OutOfBounds { address: Address, len: usize },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::OutOfMemory { requested, limit } => write!(
                f,
                "Out of memory: requested {} bytes, limit is {}",
                requested, limit
            ),
            MemoryError::InvalidPointer { address } => {
                write!(f, "Invalid pointer: address 0x{:08x} not allocated", address)
            }
            MemoryError::UseAfterFree { address } => {
                write!(f, "Use-after-free: address 0x{:08x} has been freed", address)
            }
            MemoryError::DoubleFree { address } => {
                write!(f, "Double free at address 0x{:08x}", address)
            }
            MemoryError::InvalidFree { address } => write!(
                f,
                "Invalid free: address 0x{:08x} was never allocated",
                address
            ),
            MemoryError::OutOfBounds { address, len } => write!(
                f,
                "Buffer overrun: {} bytes at 0x{:08x} leave the allocated block",
                len, address
            ),
        }
    }
}

impl std::error::Error for MemoryError {}

/// A byte-addressable memory with an allocator.
///
/// Implementors provide raw byte access; typed access is little-endian and
/// provided on top.
pub trait LinearMemory {
    fn malloc(&mut self, size: usize) -> Result<Address, MemoryError>;

    fn free(&mut self, address: Address) -> Result<(), MemoryError>;

    fn read_bytes(&self, address: Address, len: usize) -> Result<Vec<u8>, MemoryError>;

    fn write_bytes(&mut self, address: Address, bytes: &[u8]) -> Result<(), MemoryError>;

    /// Read one scalar of the given kind
    fn read_scalar(&self, address: Address, kind: ScalarKind) -> Result<Value, MemoryError> {
        let bytes = self.read_bytes(address, kind.size())?;
        let mut buf = [0u8; 8];
        buf[..bytes.len()].copy_from_slice(&bytes);

        let value = match kind {
            ScalarKind::I8 => Value::Int(i8::from_le_bytes([buf[0]]) as i64),
            ScalarKind::U8 => Value::UInt(buf[0] as u64),
            ScalarKind::I16 => Value::Int(i16::from_le_bytes([buf[0], buf[1]]) as i64),
            ScalarKind::U16 => Value::UInt(u16::from_le_bytes([buf[0], buf[1]]) as u64),
            ScalarKind::I32 => {
                Value::Int(i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as i64)
            }
            ScalarKind::U32 => {
                Value::UInt(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as u64)
            }
            ScalarKind::I64 => Value::Int(i64::from_le_bytes(buf)),
            ScalarKind::U64 => Value::UInt(u64::from_le_bytes(buf)),
            ScalarKind::F32 => {
                Value::Float(f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f64)
            }
            ScalarKind::F64 => Value::Float(f64::from_le_bytes(buf)),
        };
        Ok(value)
    }

    /// Write one scalar, truncating integers to the kind's width
    fn write_scalar(
        &mut self,
        address: Address,
        kind: ScalarKind,
        value: Value,
    ) -> Result<(), MemoryError> {
        let bytes: Vec<u8> = match kind {
            ScalarKind::I8 | ScalarKind::U8 => (value.as_i64() as u8).to_le_bytes().to_vec(),
            ScalarKind::I16 | ScalarKind::U16 => (value.as_i64() as u16).to_le_bytes().to_vec(),
            ScalarKind::I32 | ScalarKind::U32 => (value.as_i64() as u32).to_le_bytes().to_vec(),
            ScalarKind::I64 => value.as_i64().to_le_bytes().to_vec(),
            ScalarKind::U64 => match value {
                Value::UInt(n) => n.to_le_bytes().to_vec(),
                other => (other.as_i64() as u64).to_le_bytes().to_vec(),
            },
            ScalarKind::F32 => (value.as_f64() as f32).to_le_bytes().to_vec(),
            ScalarKind::F64 => value.as_f64().to_le_bytes().to_vec(),
        };
        self.write_bytes(address, &bytes)
    }
}
