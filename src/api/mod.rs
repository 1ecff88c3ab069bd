//! API description model
//!
//! Serde model of the JSON description of the native library's API. Only
//! the shapes the generator reads are modelled; unknown keys are ignored and
//! missing lists or descriptions default to empty.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiDescription {
    #[serde(default)]
    pub defines: Vec<DefineDesc>,
    #[serde(default)]
    pub structs: Vec<StructDesc>,
    #[serde(default)]
    pub aliases: Vec<AliasDesc>,
    #[serde(default)]
    pub enums: Vec<EnumDesc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StructDesc {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<FieldDesc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDesc {
    pub name: String,
    /// C type string, e.g. `"unsigned char"` or `"Vector3 *"`
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub description: String,
}

/// `name` is another name for the struct `type_name`
#[derive(Debug, Clone, Deserialize)]
pub struct AliasDesc {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumDesc {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub values: Vec<EnumValueDesc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumValueDesc {
    pub name: String,
    pub value: i64,
    #[serde(default)]
    pub description: String,
}

/// A `#define`. `value` is kept as raw JSON since its shape depends on `kind`.
#[derive(Debug, Clone, Deserialize)]
pub struct DefineDesc {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub description: String,
}

/// Errors raised while loading a description
#[derive(Debug)]
pub enum ApiError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Io { path, source } => {
                write!(f, "Cannot read '{}': {}", path.display(), source)
            }
            ApiError::Json { path, source } => {
                write!(f, "Invalid API description '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Io { source, .. } => Some(source),
            ApiError::Json { source, .. } => Some(source),
        }
    }
}

impl ApiDescription {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_path(path: &Path) -> Result<Self, ApiError> {
        let text = fs::read_to_string(path).map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ApiError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Aliases whose target is `name`, in description order
    pub fn aliases_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AliasDesc> + 'a {
        self.aliases.iter().filter(move |alias| alias.type_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "defines": [
            { "name": "PI", "type": "FLOAT", "value": 3.14159265358979, "description": "" }
        ],
        "structs": [
            {
                "name": "Vector2",
                "description": "Vector2, 2 components",
                "fields": [
                    { "type": "float", "name": "x", "description": "Vector x component" },
                    { "type": "float", "name": "y", "description": "Vector y component" }
                ]
            }
        ],
        "aliases": [
            { "type": "Vector4", "name": "Quaternion", "description": "Quaternion, 4 components" }
        ],
        "enums": [
            {
                "name": "BlendMode",
                "description": "Color blending modes",
                "values": [ { "name": "BLEND_ALPHA", "value": 0, "description": "" } ]
            }
        ],
        "functions": [
            {
                "name": "InitWindow",
                "description": "Initialize window",
                "returnType": "void",
                "params": [
                    { "type": "int", "name": "width" },
                    { "type": "const char *", "name": "title" }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let api = ApiDescription::from_json(SAMPLE).unwrap();

        assert_eq!(api.structs.len(), 1);
        assert_eq!(api.structs[0].fields[1].type_name, "float");
        assert_eq!(api.aliases[0].type_name, "Vector4");
        assert_eq!(api.enums[0].values[0].name, "BLEND_ALPHA");
        assert_eq!(api.defines[0].kind, "FLOAT");
    }

    #[test]
    fn test_function_lists_are_ignored() {
        // native functions are called through the VM, not wrapped here
        let api = ApiDescription::from_json(
            r#"{ "callbacks": [ { "name": "TraceLogCallback" } ], "functions": [ 1, 2 ] }"#,
        )
        .unwrap();

        assert!(api.structs.is_empty());
        assert!(api.defines.is_empty());
    }

    #[test]
    fn test_aliases_of() {
        let api = ApiDescription::from_json(SAMPLE).unwrap();

        assert_eq!(api.aliases_of("Vector4").count(), 1);
        assert_eq!(api.aliases_of("Vector2").count(), 0);
    }

    #[test]
    fn test_missing_file() {
        let err = ApiDescription::from_path(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ApiError::Io { .. }));
    }
}
