//! In-flight unit rewriting
//!
//! This module handles:
//! - The `TransformRule` trait implemented by every rewrite rule
//! - The `TransformerChain`, which runs rules in descending priority
//! - Per-rule failure isolation (errors and panics)
//! - Dumping rewritten units for offline inspection
//!
//! ## Ordering
//!
//! Rules run from highest to lowest priority. Rules with equal priority keep
//! the order in which they were registered:
//!
//! ```text
//! register(a: 5), register(b: 10), register(c: 5), register(d: 1)
//!
//! chain:  b(10) → a(5) → c(5) → d(1)
//! ```

use std::path::Path;

use crate::config::DebugFlags;
use crate::error::{Result, contain_panic};

pub mod rules;

pub use rules::{
    DataObjectAccessRule, LateBindingRule, ListenerAccessRule, PublicTypeRule, default_rules,
};

/// A rewrite rule applied to unit bytes before the unit is defined
pub trait TransformRule {
    /// Rule name used in logs
    fn name(&self) -> &str;

    /// Higher priorities run first
    fn priority(&self) -> i32 {
        0
    }

    /// Rewrite `bytes` of unit `unit`
    ///
    /// Returns `Ok(None)` when the rule does not apply, leaving the bytes
    /// untouched for the next rule.
    fn apply(&self, unit: &str, bytes: &[u8]) -> Result<Option<Vec<u8>>>;
}

/// Ordered list of independent rewrite rules
pub struct TransformerChain {
    rules: Vec<Box<dyn TransformRule>>,
    flags: DebugFlags,
}

impl TransformerChain {
    /// Create an empty chain
    pub fn new(flags: DebugFlags) -> Self {
        Self {
            rules: Vec::new(),
            flags,
        }
    }

    /// Create a chain holding the given rules
    pub fn with_rules(flags: DebugFlags, rules: Vec<Box<dyn TransformRule>>) -> Self {
        let mut chain = Self::new(flags);
        for rule in rules {
            chain.register(rule);
        }
        chain
    }

    /// Insert a rule after every rule of greater or equal priority
    pub fn register(&mut self, rule: Box<dyn TransformRule>) {
        let priority = rule.priority();
        let position = self
            .rules
            .iter()
            .position(|existing| existing.priority() < priority)
            .unwrap_or(self.rules.len());
        self.rules.insert(position, rule);
    }

    /// Rule names in execution order
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule over `bytes`
    ///
    /// A rule that fails (error or panic) is skipped: the next rule receives
    /// the bytes as they were before the failing rule ran.
    pub fn transform(&self, unit: &str, bytes: &[u8]) -> Vec<u8> {
        let mut current = bytes.to_vec();
        let mut modified = false;

        for rule in &self.rules {
            let outcome = contain_panic(self.flags.transform_errors, || rule.apply(unit, &current));

            match outcome {
                Ok(Ok(Some(rewritten))) if rewritten != current => {
                    if self.flags.transforms {
                        tracing::info!(unit, rule = rule.name(), "transform applied");
                    }
                    current = rewritten;
                    modified = true;
                }
                Ok(Ok(_)) => {}
                Ok(Err(err)) => self.report_failure(rule.name(), unit, &err.to_string()),
                Err(reason) => self.report_failure(rule.name(), unit, &reason),
            }
        }

        if modified {
            if let Some(dir) = &self.flags.dump_dir {
                dump_unit(dir, unit, &current);
            }
        }

        current
    }

    fn report_failure(&self, rule: &str, unit: &str, reason: &str) {
        if self.flags.transform_errors {
            tracing::warn!(unit, rule, reason, "transform rule failed; unit left as before");
        } else {
            tracing::warn!(unit, rule, "transform rule failed; unit left as before");
        }
    }
}

/// Write rewritten unit bytes to `<dir>/<name with '.' → '/'>.unit`
///
/// Failures are logged and otherwise ignored.
fn dump_unit(dir: &Path, unit: &str, bytes: &[u8]) {
    let path = dir.join(format!(
        "{}{}",
        unit.replace('.', "/"),
        crate::collector::UNIT_SUFFIX
    ));

    let written = path
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|()| std::fs::write(&path, bytes));

    match written {
        Ok(()) => tracing::debug!(unit, path = %path.display(), "dumped transformed unit"),
        Err(e) => tracing::debug!(unit, error = %e, "could not dump transformed unit"),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::LoadstoneError;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Appends its tag to the bytes and records what it saw
    struct Tagging {
        tag: &'static str,
        priority: i32,
        seen: Rc<RefCell<Vec<(&'static str, Vec<u8>)>>>,
    }

    impl TransformRule for Tagging {
        fn name(&self) -> &str {
            self.tag
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn apply(&self, _unit: &str, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
            self.seen.borrow_mut().push((self.tag, bytes.to_vec()));
            let mut out = bytes.to_vec();
            out.extend_from_slice(self.tag.as_bytes());
            Ok(Some(out))
        }
    }

    struct Failing {
        priority: i32,
        panics: bool,
    }

    impl TransformRule for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn apply(&self, unit: &str, _bytes: &[u8]) -> Result<Option<Vec<u8>>> {
            if self.panics {
                panic!("rule exploded");
            }
            Err(LoadstoneError::TransformFailed {
                rule: "failing".to_string(),
                unit: unit.to_string(),
                reason: "unsupported layout".to_string(),
            })
        }
    }

    struct NotApplicable;

    /// Claims to rewrite but hands the bytes back unchanged
    struct Identity;

    impl TransformRule for Identity {
        fn name(&self) -> &str {
            "identity"
        }

        fn apply(&self, _unit: &str, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
            Ok(Some(bytes.to_vec()))
        }
    }

    impl TransformRule for NotApplicable {
        fn name(&self) -> &str {
            "not-applicable"
        }

        fn apply(&self, _unit: &str, _bytes: &[u8]) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    fn tagging(
        tag: &'static str,
        priority: i32,
        seen: &Rc<RefCell<Vec<(&'static str, Vec<u8>)>>>,
    ) -> Box<dyn TransformRule> {
        Box::new(Tagging {
            tag,
            priority,
            seen: Rc::clone(seen),
        })
    }

    #[test]
    fn test_rules_run_in_descending_priority_with_stable_ties() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut chain = TransformerChain::new(DebugFlags::default());
        chain.register(tagging("a", 5, &seen));
        chain.register(tagging("b", 10, &seen));
        chain.register(tagging("c", 5, &seen));
        chain.register(tagging("d", 1, &seen));

        assert_eq!(chain.rule_names(), vec!["b", "a", "c", "d"]);

        let out = chain.transform("app.Unit", b"");
        assert_eq!(out, b"bacd");
    }

    #[test]
    fn test_failing_rule_does_not_stop_the_chain() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let chain = TransformerChain::with_rules(
            DebugFlags::default(),
            vec![
                tagging("first", 10, &seen),
                Box::new(Failing {
                    priority: 5,
                    panics: false,
                }),
                tagging("third", 5, &seen),
                tagging("last", 1, &seen),
            ],
        );

        let out = chain.transform("app.Unit", b">");

        assert_eq!(out, b">firstthirdlast");
        let seen = seen.borrow();
        assert_eq!(seen[1], ("third", b">first".to_vec()));
    }

    #[test]
    fn test_panicking_rule_is_isolated() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let chain = TransformerChain::with_rules(
            DebugFlags::developer(),
            vec![
                tagging("first", 10, &seen),
                Box::new(Failing {
                    priority: 5,
                    panics: true,
                }),
                tagging("third", 5, &seen),
            ],
        );

        let out = chain.transform("app.Unit", b"");
        assert_eq!(out, b"firstthird");
    }

    #[test]
    fn test_not_applicable_leaves_bytes_untouched() {
        let chain = TransformerChain::with_rules(DebugFlags::default(), vec![Box::new(NotApplicable)]);
        assert_eq!(chain.transform("app.Unit", b"raw"), b"raw");
    }

    #[test]
    fn test_modified_units_are_dumped() {
        let temp = TempDir::new().expect("create temp dir");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let flags = DebugFlags {
            dump_dir: Some(temp.path().to_path_buf()),
            ..DebugFlags::default()
        };
        let chain = TransformerChain::with_rules(flags, vec![tagging("x", 0, &seen)]);

        chain.transform("app.world.Tile", b"tile");

        let dumped = std::fs::read(temp.path().join("app/world/Tile.unit")).expect("read dump");
        assert_eq!(dumped, b"tilex");
    }

    #[test]
    fn test_unmodified_units_are_not_dumped() {
        let temp = TempDir::new().expect("create temp dir");
        let flags = DebugFlags {
            dump_dir: Some(temp.path().to_path_buf()),
            ..DebugFlags::default()
        };
        let chain = TransformerChain::with_rules(flags, vec![Box::new(NotApplicable)]);

        chain.transform("app.Tile", b"tile");

        assert!(!temp.path().join("app/Tile.unit").exists());
    }

    #[test]
    fn test_identical_rewrite_is_not_dumped() {
        let temp = TempDir::new().expect("create temp dir");
        let flags = DebugFlags {
            dump_dir: Some(temp.path().to_path_buf()),
            ..DebugFlags::default()
        };
        let chain = TransformerChain::with_rules(flags, vec![Box::new(Identity)]);

        assert_eq!(chain.transform("app.Tile", b"tile"), b"tile");
        assert!(!temp.path().join("app/Tile.unit").exists());
    }

    #[test]
    fn test_dump_failure_is_swallowed() {
        let temp = TempDir::new().expect("create temp dir");
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "file in the way").expect("write blocker");

        let seen = Rc::new(RefCell::new(Vec::new()));
        let flags = DebugFlags {
            dump_dir: Some(blocker),
            ..DebugFlags::default()
        };
        let chain = TransformerChain::with_rules(flags, vec![tagging("x", 0, &seen)]);

        assert_eq!(chain.transform("app.Tile", b"tile"), b"tilex");
    }
}
