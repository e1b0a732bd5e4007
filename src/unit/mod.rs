//! Unit descriptors
//!
//! A unit is the pipeline's code artifact: a serialized type description with
//! a fully-qualified dotted name, its place in the type hierarchy, its
//! type-level markers and its members. Units travel through the pipeline as
//! raw bytes; this module is the only place that gives those bytes structure.

use serde::{Deserialize, Serialize};

use crate::error::{LoadstoneError, Result};

pub use marker::{Marker, MarkerKind};

pub mod marker;

/// Return type of methods that produce nothing
pub const VOID: &str = "void";

/// Parameter type of the process argument list
pub const STRING_ARRAY: &str = "string[]";

/// Access level of a type or member, ordered from most to least restrictive
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    #[default]
    Package,
    Protected,
    Public,
}

/// A field declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default, rename = "static")]
    pub is_static: bool,

    #[serde(default, rename = "final")]
    pub is_final: bool,

    /// Compile-time constant value, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Marker>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Package,
            is_static: false,
            is_final: false,
            constant: None,
            markers: Vec::new(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_constant(mut self, value: serde_json::Value) -> Self {
        self.constant = Some(value);
        self
    }

    /// A static, non-final field with no constant value: a late-binding slot
    pub fn is_injection_slot(&self) -> bool {
        self.is_static && !self.is_final && self.constant.is_none()
    }
}

/// A method declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default, rename = "static")]
    pub is_static: bool,

    #[serde(default)]
    pub params: Vec<String>,

    #[serde(default = "default_return")]
    pub returns: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Marker>,
}

fn default_return() -> String {
    VOID.to_string()
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Package,
            is_static: false,
            params: Vec::new(),
            returns: default_return(),
            markers: Vec::new(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_param(mut self, ty: impl Into<String>) -> Self {
        self.params.push(ty.into());
        self
    }

    pub fn with_return(mut self, ty: impl Into<String>) -> Self {
        self.returns = ty.into();
        self
    }

    pub fn with_marker(mut self, marker: impl Into<Marker>) -> Self {
        self.markers.push(marker.into());
        self
    }

    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        self.markers.iter().any(|m| m.kind == kind)
    }
}

/// A constructor declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constructor {
    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub params: Vec<String>,
}

impl Constructor {
    pub fn new(visibility: Visibility) -> Self {
        Self {
            visibility,
            params: Vec::new(),
        }
    }
}

/// Structured view of a unit's bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// Fully-qualified dotted name
    pub name: String,

    #[serde(default)]
    pub visibility: Visibility,

    /// Whether this type is an interface
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub interface: bool,

    /// Direct supertype
    #[serde(default, rename = "super", skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,

    /// Implemented interfaces, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,

    /// Type-level markers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Marker>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<Constructor>,
}

impl UnitDescriptor {
    /// Create an empty descriptor for a package-visible type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Package,
            interface: false,
            supertype: None,
            interfaces: Vec::new(),
            markers: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Create an empty descriptor for a public interface
    pub fn interface(name: impl Into<String>) -> Self {
        let mut descriptor = Self::new(name).with_visibility(Visibility::Public);
        descriptor.interface = true;
        descriptor
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_marker(mut self, marker: impl Into<Marker>) -> Self {
        self.markers.push(marker.into());
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Parse unit bytes, checking that they describe the expected name
    pub fn from_bytes(expected_name: &str, bytes: &[u8]) -> Result<Self> {
        let descriptor: UnitDescriptor =
            serde_json::from_slice(bytes).map_err(|e| LoadstoneError::MalformedUnit {
                name: expected_name.to_string(),
                reason: e.to_string(),
            })?;

        if descriptor.name != expected_name {
            return Err(LoadstoneError::MalformedUnit {
                name: expected_name.to_string(),
                reason: format!("descriptor declares name '{}'", descriptor.name),
            });
        }

        Ok(descriptor)
    }

    /// Serialize back into unit bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| LoadstoneError::MalformedUnit {
            name: self.name.clone(),
            reason: e.to_string(),
        })
    }

    /// Direct supertype followed by interfaces, in declaration order
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        self.supertype
            .iter()
            .chain(self.interfaces.iter())
            .map(String::as_str)
    }

    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        self.markers.iter().any(|m| m.kind == kind)
    }

    /// First marker of the given kind
    pub fn marker(&self, kind: MarkerKind) -> Option<&Marker> {
        self.markers.iter().find(|m| m.kind == kind)
    }

    /// Simple name (last dotted segment)
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}
