//! # Introduction
//!
//! raybind reads the JSON description of a native graphics library's C API
//! and computes the byte layout of every struct as it sits in a 32-bit
//! WebAssembly linear memory. From those layouts it generates a Python
//! module whose classes read and write struct fields at the right offsets.
//!
//! ## Pipeline
//!
//! ```text
//! JSON → api → type string → Lexer → Parser → CType → Layout → Registry → Python / table / TUI
//! ```
//!
//! 1. [`api`]: serde model of the description files.
//! 2. [`ctype`]: lexes and parses C type strings such as
//!    `"const unsigned char *"` into a [`ctype::CType`].
//! 3. [`layout`]: packed struct layouts, the [`layout::StructRegistry`],
//!    aliases and dependency ordering.
//! 4. [`generator`]: resolves several descriptions into one
//!    [`generator::Resolution`] and emits the Python module.
//! 5. [`memory`]: the linear memory contract the generated code relies on,
//!    with an in-process heap and struct views to exercise layouts.
//! 6. [`ui`]: ratatui-based layout inspector; not part of the stable
//!    library API.
//!
//! ## Sizes
//!
//! `char`/`bool` 1, `short` 2, `int`/`long`/`float`/pointers 4,
//! `long long`/`double` 8. Fields are packed with no padding.

pub mod api;
pub mod ctype;
pub mod generator;
pub mod layout;
pub mod memory;
pub mod ui;
