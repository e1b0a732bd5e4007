//! Error type tests
//!
//! Tests for LoadstoneError display, diagnostic codes and conversions.

#![allow(clippy::expect_used)]

use miette::Diagnostic;

use super::*;

macro_rules! test_error_contains {
    ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
        #[test]
        fn $test_name() {
            let err = $err;
            let error_string = err.to_string();
            $(
                assert!(error_string.contains($contains),
                    "Error message should contain '{}', got: {}",
                    $contains,
                    error_string
                );
            )+
        }
    };
}

#[test]
fn test_error_display() {
    let err = LoadstoneError::UnitNotFound {
        name: "app.Missing".to_string(),
    };
    assert_eq!(err.to_string(), "Unit not found: app.Missing");
}

#[test]
fn test_error_code() {
    let err = LoadstoneError::NoEntryPoint;
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("loadstone::entry::missing".to_string())
    );
}

#[test]
fn test_illegal_access_hides_name_by_default() {
    let err = LoadstoneError::IllegalAccess { name: None };
    assert_eq!(err.to_string(), "Illegal access to a pipeline-internal unit");
}

#[test]
fn test_illegal_access_discloses_name_in_developer_mode() {
    let err = LoadstoneError::IllegalAccess {
        name: Some("loadstone.boot.Secret".to_string()),
    };
    assert!(err.to_string().ends_with(": loadstone.boot.Secret"));
}

#[test]
fn test_transform_failures_are_not_fatal() {
    let err = LoadstoneError::TransformFailed {
        rule: "widen".to_string(),
        unit: "app.A".to_string(),
        reason: "bad bytes".to_string(),
    };
    assert!(!err.is_fatal());
    assert!(LoadstoneError::NoEntryPoint.is_fatal());
}

#[test]
fn test_only_entry_point_failures_are_sensitive() {
    let failed = LoadstoneError::EntryPointFailed {
        unit: "app.Main".to_string(),
        reason: "boom".to_string(),
    };
    assert!(failed.is_sensitive());
    assert!(!LoadstoneError::NoEntryPoint.is_sensitive());
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: LoadstoneError = io_err.into();
    assert!(matches!(err, LoadstoneError::IoError { .. }));
}

#[test]
fn test_json_error_conversion() {
    let parse_result: std::result::Result<serde_json::Value, _> =
        serde_json::from_str("invalid json content");
    let json_err = parse_result.expect_err("invalid JSON should fail");
    let err: LoadstoneError = json_err.into();
    assert!(matches!(err, LoadstoneError::ConfigParseFailed { .. }));
}

#[test]
fn test_yaml_error_conversion() {
    let parse_result: std::result::Result<serde_yaml::Value, _> =
        serde_yaml::from_str("invalid: yaml: content: [unclosed");
    let yaml_err = parse_result.expect_err("invalid YAML should fail");
    let err: LoadstoneError = yaml_err.into();
    assert!(matches!(err, LoadstoneError::ConfigParseFailed { .. }));
}

#[test]
fn test_panic_reason_from_str_and_string() {
    let boxed: Box<dyn Any + Send> = Box::new("static message");
    assert_eq!(panic_reason(boxed.as_ref()), "static message");

    let boxed: Box<dyn Any + Send> = Box::new(String::from("owned message"));
    assert_eq!(panic_reason(boxed.as_ref()), "owned message");

    let boxed: Box<dyn Any + Send> = Box::new(42_u32);
    assert_eq!(panic_reason(boxed.as_ref()), "panic with non-string payload");
}

#[test]
#[allow(clippy::panic)]
fn test_contain_panic_returns_reason_and_restores_state() {
    let inner: std::result::Result<std::result::Result<(), String>, String> =
        contain_panic(true, || contain_panic(false, || panic!("inner rule")));
    assert_eq!(inner, Ok(Err("inner rule".to_string())));

    let outer: std::result::Result<(), String> =
        contain_panic(false, || panic!("entry point {}", "exploded"));
    assert_eq!(outer, Err("entry point exploded".to_string()));

    assert_eq!(CONTAINED.with(std::cell::Cell::get), None);
    assert_eq!(contain_panic(false, || 7), Ok(7));
}

test_error_contains!(
    test_circular_dependency_error,
    LoadstoneError::CircularDependency {
        report: "  - {a, b}".to_string(),
        cycles: vec![vec!["a".to_string(), "b".to_string()]],
    },
    "Circular dependency",
    "{a, b}"
);

test_error_contains!(
    test_resource_not_found_error,
    LoadstoneError::ResourceNotFound {
        registry: "tiles".to_string(),
        resource: "core:bar".to_string(),
        path: "/assets/core/tiles/bar.json".to_string(),
    },
    "core:bar",
    "tiles"
);

test_error_contains!(
    test_type_mismatch_error,
    LoadstoneError::TypeMismatch {
        registry: "tiles".to_string(),
        resource: "core:stone".to_string(),
        variant: "core:stone_mossy".to_string(),
        expected: "Tile".to_string(),
    },
    "core:stone",
    "core:stone_mossy",
    "Tile"
);

test_error_contains!(
    test_dependency_not_found_error,
    LoadstoneError::DependencyNotFound {
        name: "items".to_string(),
        required_by: "recipes".to_string(),
    },
    "items",
    "recipes"
);

test_error_contains!(
    test_registry_frozen_error,
    LoadstoneError::RegistryFrozen {
        name: "tiles".to_string(),
    },
    "Registry 'tiles' is frozen"
);

test_error_contains!(
    test_application_error,
    LoadstoneError::application("world generation failed"),
    "world generation failed"
);
