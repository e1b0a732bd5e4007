//! Namespaced resource identifiers (`namespace:path`)

use std::fmt;

use crate::error::{LoadstoneError, Result};

/// Identifier of a registry entry or resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    namespace: String,
    path: String,
}

impl ResourceId {
    /// Create an identifier from already-separated parts
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Result<Self> {
        let id = Self {
            namespace: namespace.into(),
            path: path.into(),
        };
        id.validate()?;
        Ok(id)
    }

    /// Parse `ns:path`, or a bare `path` in `default_namespace`
    ///
    /// ```text
    /// "stone"           → core:stone      (default namespace "core")
    /// "mymod:ore/iron"  → mymod:ore/iron
    /// ":stone"          → error (empty namespace)
    /// ```
    pub fn parse(raw: &str, default_namespace: &str) -> Result<Self> {
        let (namespace, path) = raw.split_once(':').unwrap_or((default_namespace, raw));
        Self::new(namespace, path).map_err(|e| match e {
            LoadstoneError::InvalidResourceId { reason, .. } => LoadstoneError::InvalidResourceId {
                id: raw.to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Identifier with the same namespace and `path` extended by `/suffix`
    pub fn child(&self, suffix: &str) -> Result<Self> {
        Self::new(self.namespace.clone(), format!("{}/{suffix}", self.path))
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| LoadstoneError::InvalidResourceId {
            id: self.to_string(),
            reason: reason.to_string(),
        };

        if self.namespace.is_empty() {
            return Err(invalid("namespace is empty"));
        }
        if self.path.is_empty() {
            return Err(invalid("path is empty"));
        }
        if !self.namespace.chars().all(is_namespace_char) {
            return Err(invalid(
                "namespace may only contain lowercase letters, digits, '_', '-' and '.'",
            ));
        }
        if !self.path.chars().all(|c| is_namespace_char(c) || c == '/') {
            return Err(invalid(
                "path may only contain lowercase letters, digits, '_', '-', '.' and '/'",
            ));
        }
        if self
            .path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(invalid("path segments must be non-empty and may not be '.' or '..'"));
        }
        Ok(())
    }
}

fn is_namespace_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.')
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_default_namespace() {
        let id = ResourceId::parse("stone", "core").expect("parse id");
        assert_eq!(id.namespace(), "core");
        assert_eq!(id.path(), "stone");
        assert_eq!(id.to_string(), "core:stone");
    }

    #[test]
    fn test_parse_explicit_namespace() {
        let id = ResourceId::parse("mymod:ore/iron", "core").expect("parse id");
        assert_eq!(id.namespace(), "mymod");
        assert_eq!(id.path(), "ore/iron");
    }

    #[test]
    fn test_invalid_ids_name_the_raw_input() {
        for raw in [":stone", "core:", "Core:stone", "core:a//b", "core:../escape", "core:a b"] {
            match ResourceId::parse(raw, "core") {
                Err(LoadstoneError::InvalidResourceId { id, .. }) => assert_eq!(id, raw),
                other => panic!("Expected InvalidResourceId for {raw}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_child() {
        let id = ResourceId::parse("tiles/stone", "core").expect("parse id");
        let child = id.child("mossy").expect("child id");
        assert_eq!(child.to_string(), "core:tiles/stone/mossy");
    }
}
