// Integration tests for struct layout resolution over a raylib-style API

use raybind::api::ApiDescription;
use raybind::ctype::{parse_type, CType, CTypeError, IntWidth};
use raybind::generator::{resolve_all, Generator, GeneratorOptions, Resolution};
use raybind::layout::{LayoutError, LookupError};

const RAYLIB: &str = include_str!("fixtures/raylib_subset.json");

fn raylib() -> ApiDescription {
    ApiDescription::from_json(RAYLIB).expect("fixture should parse")
}

fn resolve(options: GeneratorOptions) -> Resolution {
    resolve_all(&[raylib()], options)
}

fn size(resolution: &Resolution, name: &str) -> usize {
    resolution
        .registry
        .get(name)
        .unwrap_or_else(|| panic!("{} should be resolved", name))
        .size
}

fn offset(resolution: &Resolution, structure: &str, field: &str) -> usize {
    resolution
        .registry
        .get(structure)
        .and_then(|layout| layout.field(field))
        .unwrap_or_else(|| panic!("{}.{} should exist", structure, field))
        .offset
}

#[test]
fn test_raylib_struct_sizes() {
    let resolution = resolve(GeneratorOptions::default());
    assert!(resolution.is_ok(), "failures: {:?}", resolution.failures);

    let expected = [
        ("Vector3", 12),
        ("Vector4", 16),
        ("Quaternion", 16),
        ("Matrix", 64),
        ("Model", 96),
        ("Color", 4),
        ("Image", 20),
        ("Texture", 20),
        ("Texture2D", 20),
        ("TextureCubemap", 20),
        ("RenderTexture", 44),
        ("RenderTexture2D", 44),
        ("Camera3D", 44),
        ("Camera", 44),
        ("Mesh", 60),
        ("BoneInfo", 36),
        ("MaterialMap", 28),
        ("Shader", 8),
        ("Material", 28),
        ("Transform", 40),
    ];
    for (name, bytes) in expected {
        assert_eq!(size(&resolution, name), bytes, "size of {}", name);
    }
    assert_eq!(resolution.registry.len(), expected.len());
}

#[test]
fn test_registry_order_puts_dependencies_and_aliases_first() {
    let resolution = resolve(GeneratorOptions::default());
    let names: Vec<&str> = resolution
        .registry
        .iter()
        .map(|layout| layout.name.as_str())
        .collect();

    assert_eq!(
        names,
        vec![
            "Vector3",
            "Vector4",
            "Quaternion",
            "Matrix",
            "Model",
            "Color",
            "Image",
            "Texture",
            "Texture2D",
            "TextureCubemap",
            "RenderTexture",
            "RenderTexture2D",
            "Camera3D",
            "Camera",
            "Mesh",
            "BoneInfo",
            "MaterialMap",
            "Shader",
            "Material",
            "Transform",
        ]
    );
}

#[test]
fn test_packed_field_offsets() {
    let resolution = resolve(GeneratorOptions::default());

    assert_eq!(offset(&resolution, "Camera3D", "fovy"), 36);
    assert_eq!(offset(&resolution, "Camera3D", "projection"), 40);
    assert_eq!(offset(&resolution, "Transform", "rotation"), 12);
    assert_eq!(offset(&resolution, "Transform", "scale"), 28);
    assert_eq!(offset(&resolution, "Material", "params"), 12);
    assert_eq!(offset(&resolution, "MaterialMap", "value"), 24);
    assert_eq!(offset(&resolution, "Model", "bindPose"), 92);
    assert_eq!(offset(&resolution, "BoneInfo", "parent"), 32);

    let mesh = resolution.registry.get("Mesh").expect("Mesh");
    let vbo = mesh.field("vboId").expect("vboId");
    assert_eq!(vbo.offset, 56);
    assert_eq!(vbo.size, 4);
    assert_eq!(
        vbo.ctype,
        CType::Pointer {
            to: Box::new(CType::Integer {
                width: IntWidth::W32,
                signed: false
            }),
            depth: 1
        }
    );
}

#[test]
fn test_aliases_share_layouts() {
    let resolution = resolve(GeneratorOptions::default());
    let texture = resolution.registry.get("Texture").expect("Texture");
    let texture2d = resolution.registry.get("Texture2D").expect("Texture2D");

    assert_eq!(texture.fields, texture2d.fields);
    assert_eq!(resolution.alias_target("Texture2D"), Some("Texture"));
    assert_eq!(resolution.alias_target("Texture"), None);
}

#[test]
fn test_description_order_fails_forward_references() {
    let resolution = resolve(GeneratorOptions {
        sort_dependencies: false,
    });

    let failed: Vec<&str> = resolution
        .failures
        .iter()
        .map(|failure| failure.name.as_str())
        .collect();
    assert_eq!(failed, vec!["Model", "Material"]);

    match &resolution.failures[0].error {
        LayoutError::Lookup(LookupError {
            name,
            structure,
            field,
        }) => {
            assert_eq!(name, "Matrix");
            assert_eq!(structure.as_deref(), Some("Model"));
            assert_eq!(field.as_deref(), Some("transform"));
        }
        other => panic!("expected lookup error, got {:?}", other),
    }
    assert_eq!(size(&resolution, "Transform"), 40);
}

#[test]
fn test_later_files_do_not_override() {
    let raymath = ApiDescription::from_json(
        r#"{
            "structs": [
                {
                    "name": "Vector3",
                    "description": "redefined with doubles",
                    "fields": [
                        { "type": "double", "name": "x" },
                        { "type": "double", "name": "y" },
                        { "type": "double", "name": "z" }
                    ]
                },
                {
                    "name": "float16",
                    "fields": [ { "type": "float[16]", "name": "v" } ]
                }
            ],
            "aliases": [ { "type": "Camera3D", "name": "Camera" } ]
        }"#,
    )
    .expect("raymath should parse");

    let mut generator = Generator::new(GeneratorOptions::default());
    generator.add_api(&raylib());
    assert_eq!(generator.add_api(&raymath), 1);
    let resolution = generator.finish();

    assert!(resolution.is_ok(), "failures: {:?}", resolution.failures);
    assert_eq!(size(&resolution, "Vector3"), 12);
    assert_eq!(size(&resolution, "float16"), 64);
}

#[test]
fn test_bad_field_types_are_reported() {
    let api = ApiDescription::from_json(
        r#"{
            "structs": [
                { "name": "Good", "fields": [ { "type": "struct Good *", "name": "next" } ] },
                { "name": "Grid", "fields": [ { "type": "float[2][2]", "name": "cells" } ] },
                { "name": "Cash", "fields": [ { "type": "int$", "name": "amount" } ] },
                { "name": "Nothing", "fields": [ { "type": "void", "name": "x" } ] }
            ]
        }"#,
    )
    .expect("api should parse");
    let resolution = resolve_all(&[api], GeneratorOptions::default());

    assert_eq!(size(&resolution, "Good"), 4);
    assert_eq!(resolution.failures.len(), 3);
    assert!(matches!(
        resolution.failures[0].error,
        LayoutError::Type {
            source: CTypeError::Parse(_),
            ..
        }
    ));
    assert!(matches!(
        resolution.failures[1].error,
        LayoutError::Type {
            source: CTypeError::Lex(_),
            ..
        }
    ));
    assert!(matches!(
        resolution.failures[2].error,
        LayoutError::VoidField { .. }
    ));
}

#[test]
fn test_type_strings_from_the_api() {
    let cases = [
        ("const char *", "char *"),
        ("const unsigned char", "unsigned char"),
        ("unsigned long long", "unsigned long long"),
        ("char const", "char"),
        ("struct Foo *", "Foo *"),
        ("Vector3 **", "Vector3 **"),
        ("char[32]", "char[32]"),
        ("long int", "int"),
    ];
    for (text, spelled) in cases {
        let ctype = parse_type(text).unwrap_or_else(|e| panic!("{:?}: {}", text, e));
        assert_eq!(ctype.to_string(), spelled, "{:?}", text);
    }

    for text in ["int*[4]", "float[2][2]", "int * const", "signed unsigned", ""] {
        assert!(parse_type(text).is_err(), "{:?} should not parse", text);
    }
}
