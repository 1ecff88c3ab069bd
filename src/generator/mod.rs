//! Generation driver
//!
//! Feeds one or more API descriptions through the layout resolver and
//! collects everything the emitters need into a [`Resolution`]:
//! - the [`StructRegistry`] with every struct and alias that resolved
//! - the failures, one per struct that did not
//! - enums and defines, first description wins on duplicate names
//!
//! Descriptions are processed in the order given. A name already resolved by
//! an earlier description is skipped, and aliases are registered right
//! after their target so the registry order matches the emitted module.

pub mod python;

use crate::api::{ApiDescription, DefineDesc, EnumDesc, StructDesc};
use crate::layout::{dependency_order, resolve_layout, LayoutError, LookupError, StructRegistry};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// Library-level generation knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Move by-value struct dependencies ahead of their users
    pub sort_dependencies: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            sort_dependencies: true,
        }
    }
}

/// A struct (or alias) that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructFailure {
    pub name: String,
    pub error: LayoutError,
}

impl fmt::Display for StructFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.error)
    }
}

/// Everything resolved from a set of API descriptions
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub registry: StructRegistry,
    pub failures: Vec<StructFailure>,
    pub enums: Vec<EnumDesc>,
    pub defines: Vec<DefineDesc>,
    alias_targets: FxHashMap<String, String>,
    descriptions: FxHashMap<String, StructDesc>,
}

impl Resolution {
    /// Target struct if `name` was registered as an alias
    pub fn alias_target(&self, name: &str) -> Option<&str> {
        self.alias_targets.get(name).map(String::as_str)
    }

    /// Description of a resolved struct. Aliases answer with their target's.
    pub fn description(&self, name: &str) -> Option<&StructDesc> {
        let name = self.alias_target(name).unwrap_or(name);
        self.descriptions.get(name)
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolves API descriptions one after another into a single [`Resolution`]
#[derive(Debug, Default)]
pub struct Generator {
    options: GeneratorOptions,
    resolution: Resolution,
    failed: FxHashSet<String>,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Generator {
            options,
            ..Default::default()
        }
    }

    /// Resolve the structs and aliases of one description and keep its enums
    /// and defines. Returns the number of registry entries added.
    pub fn add_api(&mut self, api: &ApiDescription) -> usize {
        let before = self.resolution.registry.len();

        let pending: Vec<StructDesc> = api
            .structs
            .iter()
            .filter(|desc| !self.resolution.registry.contains(&desc.name))
            .cloned()
            .collect();

        for desc in self.ordered(&pending, api) {
            if self.resolution.registry.contains(&desc.name) {
                continue;
            }
            match resolve_layout(desc, &self.resolution.registry) {
                Ok(layout) => {
                    if let Err(error) = self.resolution.registry.insert(layout) {
                        self.fail(&desc.name, error);
                        continue;
                    }
                    self.resolution
                        .descriptions
                        .insert(desc.name.clone(), desc.clone());
                    self.register_aliases_of(&desc.name, api);
                }
                Err(error) => self.fail(&desc.name, error),
            }
        }

        // aliases of structs resolved by an earlier description
        for alias in &api.aliases {
            if self.resolution.registry.contains(&alias.name) || self.failed.contains(&alias.name) {
                continue;
            }
            if self.resolution.registry.contains(&alias.type_name) {
                self.register_alias(&alias.type_name, &alias.name);
            } else if !self.failed.contains(&alias.type_name) {
                let error = LayoutError::Lookup(LookupError {
                    name: alias.type_name.clone(),
                    structure: Some(alias.name.clone()),
                    field: None,
                });
                self.fail(&alias.name, error);
            }
        }

        for desc in &api.enums {
            if !self.resolution.enums.iter().any(|e| e.name == desc.name) {
                self.resolution.enums.push(desc.clone());
            }
        }
        for desc in &api.defines {
            if !self.resolution.defines.iter().any(|d| d.name == desc.name) {
                self.resolution.defines.push(desc.clone());
            }
        }

        self.resolution.registry.len() - before
    }

    pub fn finish(self) -> Resolution {
        self.resolution
    }

    /// Pending structs in resolution order. Structs caught in a by-value
    /// cycle are recorded as failures and left out. Structs that only embed
    /// a cycle stay in and fail later with a lookup error.
    fn ordered<'a>(&mut self, pending: &'a [StructDesc], api: &ApiDescription) -> Vec<&'a StructDesc> {
        if !self.options.sort_dependencies {
            return pending.iter().collect();
        }
        let mut remaining: Vec<StructDesc> = pending.to_vec();
        loop {
            let outcome = dependency_order(&remaining, &api.aliases)
                .map(|ordered| ordered.iter().map(|d| d.name.clone()).collect::<Vec<_>>());
            let names = match outcome {
                Ok(names) => names,
                Err(LayoutError::Cycle { names }) if !names.is_empty() => {
                    let error = LayoutError::Cycle {
                        names: names.clone(),
                    };
                    for name in &names {
                        self.fail(name, error.clone());
                    }
                    remaining.retain(|desc| !names.contains(&desc.name));
                    continue;
                }
                Err(_) => remaining.iter().map(|d| d.name.clone()).collect(),
            };
            return names
                .iter()
                .filter_map(|name| pending.iter().find(|d| d.name == *name))
                .collect();
        }
    }

    fn register_aliases_of(&mut self, target: &str, api: &ApiDescription) {
        for alias in api.aliases_of(target) {
            if !self.resolution.registry.contains(&alias.name) {
                self.register_alias(target, &alias.name);
            }
        }
    }

    fn register_alias(&mut self, target: &str, alias: &str) {
        match self.resolution.registry.register_alias(target, alias) {
            Ok(_) => {
                self.resolution
                    .alias_targets
                    .insert(alias.to_string(), target.to_string());
            }
            Err(error) => self.fail(alias, error),
        }
    }

    fn fail(&mut self, name: &str, error: LayoutError) {
        self.failed.insert(name.to_string());
        self.resolution.failures.push(StructFailure {
            name: name.to_string(),
            error,
        });
    }
}

/// Resolve several descriptions in order
pub fn resolve_all(apis: &[ApiDescription], options: GeneratorOptions) -> Resolution {
    let mut generator = Generator::new(options);
    for api in apis {
        generator.add_api(api);
    }
    generator.finish()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const RAYLIB_SUBSET: &str = r#"{
        "defines": [
            { "name": "RAYLIB_VERSION", "type": "STRING", "value": "5.0", "description": "" },
            { "name": "PI", "type": "FLOAT", "value": 3.141592653589793, "description": "" },
            { "name": "DEG2RAD", "type": "FLOAT_MATH", "value": "(PI/180.0f)", "description": "" },
            { "name": "LIGHTGRAY", "type": "COLOR", "value": "CLITERAL(Color){ 200, 200, 200, 255 }", "description": "Light Gray" },
            { "name": "RL_MALLOC(sz)", "type": "MACRO", "value": "malloc(sz)", "description": "" }
        ],
        "structs": [
            {
                "name": "Ray",
                "description": "Ray, ray for raycasting",
                "fields": [
                    { "type": "Vector3", "name": "position", "description": "Ray position (origin)" },
                    { "type": "Vector3", "name": "direction", "description": "Ray direction" }
                ]
            },
            {
                "name": "Vector3",
                "description": "Vector3, 3 components",
                "fields": [
                    { "type": "float", "name": "x", "description": "" },
                    { "type": "float", "name": "y", "description": "" },
                    { "type": "float", "name": "z", "description": "" }
                ]
            },
            {
                "name": "Vector4",
                "description": "Vector4, 4 components",
                "fields": [
                    { "type": "float", "name": "x", "description": "" },
                    { "type": "float", "name": "y", "description": "" },
                    { "type": "float", "name": "z", "description": "" },
                    { "type": "float", "name": "w", "description": "" }
                ]
            },
            {
                "name": "Color",
                "description": "Color, 4 components, R8G8B8A8 (32bit)",
                "fields": [
                    { "type": "unsigned char", "name": "r", "description": "" },
                    { "type": "unsigned char", "name": "g", "description": "" },
                    { "type": "unsigned char", "name": "b", "description": "" },
                    { "type": "unsigned char", "name": "a", "description": "" }
                ]
            },
            {
                "name": "Mesh",
                "description": "",
                "fields": [
                    { "type": "int", "name": "vertexCount", "description": "" },
                    { "type": "float *", "name": "vertices", "description": "" },
                    { "type": "unsigned short *", "name": "indices", "description": "" }
                ]
            }
        ],
        "aliases": [
            { "type": "Vector4", "name": "Quaternion", "description": "Quaternion, 4 components" }
        ],
        "enums": [
            {
                "name": "ConfigFlags",
                "description": "System/Window config flags",
                "values": [
                    { "name": "FLAG_VSYNC_HINT", "value": 64, "description": "Set to try enabling V-Sync on GPU" },
                    { "name": "FLAG_FULLSCREEN_MODE", "value": 2, "description": "" }
                ]
            }
        ]
    }"#;

    fn raylib() -> ApiDescription {
        ApiDescription::from_json(RAYLIB_SUBSET).unwrap()
    }

    fn names(resolution: &Resolution) -> Vec<&str> {
        resolution.registry.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_resolves_out_of_order_descriptions() {
        let resolution = resolve_all(&[raylib()], GeneratorOptions::default());

        assert!(resolution.is_ok(), "{:?}", resolution.failures);
        assert_eq!(
            names(&resolution),
            vec!["Vector3", "Ray", "Vector4", "Quaternion", "Color", "Mesh"]
        );
        assert_eq!(resolution.registry.get("Ray").unwrap().size, 24);
        assert_eq!(resolution.registry.get("Mesh").unwrap().size, 12);
        assert_eq!(resolution.alias_target("Quaternion"), Some("Vector4"));
        assert_eq!(
            resolution.description("Quaternion").unwrap().description,
            "Vector4, 4 components"
        );
    }

    #[test]
    fn test_keep_order_reports_lookup_failures() {
        let options = GeneratorOptions {
            sort_dependencies: false,
        };
        let resolution = resolve_all(&[raylib()], options);

        assert_eq!(resolution.failures.len(), 1);
        let failure = &resolution.failures[0];
        assert_eq!(failure.name, "Ray");
        assert!(matches!(
            failure.error,
            LayoutError::Lookup(LookupError { ref name, .. }) if name == "Vector3"
        ));
        assert!(!resolution.registry.contains("Ray"));
        assert!(resolution.registry.contains("Mesh"));
    }

    #[test]
    fn test_later_descriptions_skip_known_names() {
        let raymath = ApiDescription::from_json(
            r#"{
                "structs": [
                    { "name": "Vector3", "fields": [ { "type": "double", "name": "x" } ] },
                    { "name": "float3", "fields": [ { "type": "float[3]", "name": "v" } ] }
                ],
                "aliases": [ { "type": "Vector3", "name": "Normal" } ],
                "enums": [ { "name": "ConfigFlags", "values": [] } ]
            }"#,
        )
        .unwrap();

        let mut generator = Generator::new(GeneratorOptions::default());
        assert_eq!(generator.add_api(&raylib()), 6);
        assert_eq!(generator.add_api(&raymath), 2);
        let resolution = generator.finish();

        assert!(resolution.is_ok(), "{:?}", resolution.failures);
        assert_eq!(resolution.registry.get("Vector3").unwrap().size, 12);
        assert_eq!(resolution.registry.get("Normal").unwrap().size, 12);
        assert_eq!(resolution.enums.len(), 1);
        assert_eq!(resolution.enums[0].values.len(), 2);
    }

    #[test]
    fn test_failures_do_not_stop_the_rest() {
        let api = ApiDescription::from_json(
            r#"{
                "structs": [
                    { "name": "Bad", "fields": [ { "type": "float float", "name": "x" } ] },
                    { "name": "User", "fields": [ { "type": "Bad", "name": "bad" } ] },
                    { "name": "Good", "fields": [ { "type": "int", "name": "x" } ] },
                    { "name": "A", "fields": [ { "type": "B", "name": "b" } ] },
                    { "name": "B", "fields": [ { "type": "A", "name": "a" } ] }
                ],
                "aliases": [
                    { "type": "Bad", "name": "AlsoBad" },
                    { "type": "Missing", "name": "Orphan" }
                ]
            }"#,
        )
        .unwrap();
        let resolution = resolve_all(&[api], GeneratorOptions::default());

        let failed: Vec<&str> = resolution.failures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(failed, vec!["A", "B", "Bad", "User", "Orphan"]);
        assert_eq!(names(&resolution), vec!["Good"]);
        assert!(!resolution.is_ok());
    }

    #[test]
    fn test_struct_embedding_a_cycle_fails_with_lookup() {
        let api = ApiDescription::from_json(
            r#"{
                "structs": [
                    { "name": "A", "fields": [ { "type": "B", "name": "b" } ] },
                    { "name": "B", "fields": [ { "type": "A", "name": "a" } ] },
                    { "name": "C", "fields": [ { "type": "A", "name": "a" } ] },
                    { "name": "X", "fields": [ { "type": "Y[2]", "name": "y" } ] },
                    { "name": "Y", "fields": [ { "type": "X", "name": "x" } ] }
                ]
            }"#,
        )
        .unwrap();
        let resolution = resolve_all(&[api], GeneratorOptions::default());

        let failed: Vec<&str> = resolution.failures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(failed, vec!["A", "B", "X", "Y", "C"]);
        for failure in &resolution.failures[..4] {
            assert!(matches!(failure.error, LayoutError::Cycle { .. }), "{}", failure);
        }
        match &resolution.failures[4].error {
            LayoutError::Lookup(LookupError { name, structure, .. }) => {
                assert_eq!(name, "A");
                assert_eq!(structure.as_deref(), Some("C"));
            }
            other => panic!("expected lookup error, got {:?}", other),
        }
    }
}
