//! Built-in capability-widening rules
//!
//! Each rule parses the unit descriptor, widens a specific set of access
//! levels, and re-serializes the unit only when something changed:
//!
//! | Rule                   | Target                                   | Change                     |
//! |------------------------|------------------------------------------|----------------------------|
//! | `PublicTypeRule`       | types listed at construction             | type → public              |
//! | `DataObjectAccessRule` | types marked `data_object`               | constructors, fields → public |
//! | `ListenerAccessRule`   | methods marked `event_listener`          | method → public            |
//! | `LateBindingRule`      | `private static final` fields, no constant | → `public static`, non-final |
//!
//! `LateBindingRule` output is what the isolated loader turns into write-once
//! injection slots.

use std::collections::HashSet;

use crate::error::Result;
use crate::transform::TransformRule;
use crate::unit::{MarkerKind, UnitDescriptor, Visibility};

/// Parse, edit and re-serialize a unit; `None` if `edit` reports no change
fn rewrite(
    unit: &str,
    bytes: &[u8],
    edit: impl FnOnce(&mut UnitDescriptor) -> bool,
) -> Result<Option<Vec<u8>>> {
    let mut descriptor = UnitDescriptor::from_bytes(unit, bytes)?;
    if edit(&mut descriptor) {
        descriptor.to_bytes().map(Some)
    } else {
        Ok(None)
    }
}

/// Raise `visibility` to public, reporting whether it changed
fn widen(visibility: &mut Visibility) -> bool {
    if *visibility == Visibility::Public {
        false
    } else {
        *visibility = Visibility::Public;
        true
    }
}

/// Makes listed types public
pub struct PublicTypeRule {
    types: HashSet<String>,
}

impl PublicTypeRule {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }
}

impl TransformRule for PublicTypeRule {
    fn name(&self) -> &str {
        "public-type"
    }

    fn priority(&self) -> i32 {
        300
    }

    fn apply(&self, unit: &str, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        if !self.types.contains(unit) {
            return Ok(None);
        }
        rewrite(unit, bytes, |d| widen(&mut d.visibility))
    }
}

/// Opens constructors and fields of data objects to generated glue
pub struct DataObjectAccessRule;

impl TransformRule for DataObjectAccessRule {
    fn name(&self) -> &str {
        "data-object-access"
    }

    fn priority(&self) -> i32 {
        200
    }

    fn apply(&self, unit: &str, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        rewrite(unit, bytes, |d| {
            if !d.has_marker(MarkerKind::DataObject) {
                return false;
            }
            let mut changed = false;
            for constructor in &mut d.constructors {
                changed |= widen(&mut constructor.visibility);
            }
            for field in &mut d.fields {
                changed |= widen(&mut field.visibility);
            }
            changed
        })
    }
}

/// Opens event listener methods to the dispatch glue
pub struct ListenerAccessRule;

impl TransformRule for ListenerAccessRule {
    fn name(&self) -> &str {
        "listener-access"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn apply(&self, unit: &str, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        rewrite(unit, bytes, |d| {
            let mut changed = false;
            for method in &mut d.methods {
                if method.has_marker(MarkerKind::EventListener) {
                    changed |= widen(&mut method.visibility);
                }
            }
            changed
        })
    }
}

/// Turns uninitialized `private static final` handles into injection slots
pub struct LateBindingRule;

impl TransformRule for LateBindingRule {
    fn name(&self) -> &str {
        "late-binding"
    }

    fn apply(&self, unit: &str, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        rewrite(unit, bytes, |d| {
            let mut changed = false;
            for field in &mut d.fields {
                let late_bound = field.visibility == Visibility::Private
                    && field.is_static
                    && field.is_final
                    && field.constant.is_none();
                if late_bound {
                    field.visibility = Visibility::Public;
                    field.is_final = false;
                    changed = true;
                }
            }
            changed
        })
    }
}

/// The rule set every pipeline starts with
pub fn default_rules(public_types: &[String]) -> Vec<Box<dyn TransformRule>> {
    vec![
        Box::new(PublicTypeRule::new(public_types.iter().cloned())),
        Box::new(DataObjectAccessRule),
        Box::new(ListenerAccessRule),
        Box::new(LateBindingRule),
    ]
}
