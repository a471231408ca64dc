//! Cycle detection for `(target, property)` resolution chains.
//!
//! Every property lookup pushes a [`DagChecker`] that borrows its parent, so
//! the chain lives on the call stack and disappears when the lookup returns.
//! The root of a chain additionally remembers which transitive properties
//! were already folded in during this evaluation.
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use log::trace;
use strum::EnumIs;

use crate::context::EvaluationContext;
use crate::error::EvalError;
use crate::model::{Backtrace, MessageKind};
use crate::transitive::TransitiveProperty;

/// Classification of a new `(target, property)` pair against its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum DagCheckResult {
    /// Not on the current path.
    Dag,
    /// The immediate parent resolves the same pair.
    SelfReference,
    /// A further ancestor resolves the same pair.
    CyclicReference,
    /// Already folded in elsewhere in this evaluation.
    AlreadySeen,
}

pub struct DagChecker<'p> {
    parent: Option<&'p DagChecker<'p>>,
    target: String,
    property: String,
    content: Option<String>,
    backtrace: Backtrace,
    transitive_properties_only: bool,
    seen: RefCell<BTreeMap<String, BTreeSet<String>>>,
    result: DagCheckResult,
}

impl<'p> DagChecker<'p> {
    /// Push a new link for `target`/`property` below `parent`.
    ///
    /// `content` is the expression text that triggered the lookup; it is
    /// quoted in dependency-loop diagnostics.
    pub fn new(
        target: impl Into<String>,
        property: impl Into<String>,
        content: Option<&str>,
        backtrace: Backtrace,
        parent: Option<&'p DagChecker<'p>>,
    ) -> Self {
        let mut checker = Self {
            parent,
            target: target.into(),
            property: property.into(),
            content: content.map(str::to_string),
            backtrace,
            transitive_properties_only: parent.is_some_and(|p| p.transitive_properties_only),
            seen: RefCell::new(BTreeMap::new()),
            result: DagCheckResult::Dag,
        };
        checker.result = checker.classify();
        trace!(
            "dag check {}::{} -> {:?}",
            checker.target, checker.property, checker.result
        );
        checker
    }

    /// Root checker without a triggering expression.
    pub fn root(target: impl Into<String>, property: impl Into<String>) -> Self {
        Self::new(target, property, None, Backtrace::default(), None)
    }

    /// Restrict the chain to transitive usage requirements, as done while
    /// computing the link interface. `$<LINK_ONLY:...>` content is dropped
    /// in this mode.
    pub fn with_transitive_properties_only(mut self) -> Self {
        self.transitive_properties_only = true;
        self
    }

    fn classify(&self) -> DagCheckResult {
        let mut ancestor = self.parent;
        while let Some(link) = ancestor {
            if link.target == self.target && link.property == self.property {
                let immediate = self.parent.is_some_and(|p| std::ptr::eq(p, link));
                return if immediate {
                    DagCheckResult::SelfReference
                } else {
                    DagCheckResult::CyclicReference
                };
            }
            ancestor = link.parent;
        }

        let top = self.top();
        if top.evaluating_transitive_property() {
            let mut seen = top.seen.borrow_mut();
            if !seen
                .entry(self.target.clone())
                .or_default()
                .insert(self.property.clone())
            {
                return DagCheckResult::AlreadySeen;
            }
        }
        DagCheckResult::Dag
    }

    fn top(&self) -> &DagChecker<'p> {
        let mut top: &DagChecker<'p> = self;
        while let Some(parent) = top.parent {
            top = parent;
        }
        top
    }

    pub fn check(&self) -> DagCheckResult {
        self.result
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    /// Target the whole chain started from.
    pub fn top_target(&self) -> &str {
        &self.top().target
    }

    pub fn transitive_properties_only(&self) -> bool {
        self.transitive_properties_only
    }

    /// Report a self reference or a dependency loop.
    ///
    /// Marks the evaluation as failed. Nothing is reported for
    /// [`DagCheckResult::AlreadySeen`].
    pub fn report_error(&self, context: &mut EvaluationContext<'_>, expression: &str) {
        if self.result.is_already_seen() {
            return;
        }
        context.had_error = true;
        if context.quiet {
            return;
        }
        let messenger = context.makefile.messenger();

        if let Some(parent) = self.parent.filter(|p| p.parent.is_none()) {
            let head = context
                .head_target
                .map(|t| t.name().to_string())
                .unwrap_or_else(|| parent.target.clone());
            let error = EvalError::SelfReference { target: head };
            let text = format!("Error evaluating generator expression:\n  {expression}\n{error}\n");
            messenger.issue_message(MessageKind::FatalError, &text, &parent.backtrace);
            return;
        }

        let text = format!(
            "Error evaluating generator expression:\n  {expression}\n{}",
            EvalError::DependencyLoop
        );
        messenger.issue_message(MessageKind::FatalError, &text, &context.backtrace);

        let mut ancestor = self.parent;
        let mut step = 1;
        while let Some(link) = ancestor {
            let quoted = link.content.as_deref().unwrap_or(expression);
            let text = format!("Loop step {step}\n  {quoted}\n");
            messenger.issue_message(MessageKind::FatalError, &text, &link.backtrace);
            ancestor = link.parent;
            step += 1;
        }
    }

    /// Whether this link resolves `property` in its plain or `INTERFACE_` form.
    pub fn evaluating(&self, property: TransitiveProperty) -> bool {
        TransitiveProperty::from_property(&self.property) == Some(property)
    }

    pub fn evaluating_transitive_property(&self) -> bool {
        TransitiveProperty::from_property(&self.property).is_some()
    }

    pub fn evaluating_sources(&self) -> bool {
        self.evaluating(TransitiveProperty::Sources)
    }

    /// Whether the chain was started to compute link libraries, optionally
    /// of the given target only.
    pub fn evaluating_link_libraries(&self, target: Option<&str>) -> bool {
        let top = self.top();
        let property = top.property.as_str();
        match target {
            Some(target) => top.target == target && property == "LINK_LIBRARIES",
            None => {
                matches!(
                    property,
                    "LINK_LIBRARIES"
                        | "LINK_INTERFACE_LIBRARIES"
                        | "IMPORTED_LINK_INTERFACE_LIBRARIES"
                        | "INTERFACE_LINK_LIBRARIES"
                ) || property.starts_with("LINK_INTERFACE_LIBRARIES_")
                    || property.starts_with("IMPORTED_LINK_INTERFACE_LIBRARIES_")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested<'p>(target: &str, property: &str, parent: &'p DagChecker<'p>) -> DagChecker<'p> {
        DagChecker::new(target, property, None, Backtrace::default(), Some(parent))
    }

    #[test]
    fn immediate_repeat_is_self_reference() {
        let root = DagChecker::root("a", "INCLUDE_DIRECTORIES");
        let child = nested("a", "INCLUDE_DIRECTORIES", &root);
        assert_eq!(child.check(), DagCheckResult::SelfReference);
    }

    #[test]
    fn distant_repeat_is_cyclic() {
        let root = DagChecker::root("a", "INTERFACE_COMPILE_OPTIONS");
        let b = nested("b", "INTERFACE_COMPILE_OPTIONS", &root);
        let a = nested("a", "INTERFACE_COMPILE_OPTIONS", &b);
        assert_eq!(b.check(), DagCheckResult::Dag);
        assert_eq!(a.check(), DagCheckResult::CyclicReference);
        assert_eq!(a.top_target(), "a");
    }

    #[test]
    fn transitive_pairs_are_seen_once_per_chain() {
        let root = DagChecker::root("app", "INCLUDE_DIRECTORIES");
        let first = nested("lib", "INTERFACE_INCLUDE_DIRECTORIES", &root);
        let second = nested("lib", "INTERFACE_INCLUDE_DIRECTORIES", &root);
        assert!(first.check().is_dag());
        assert!(second.check().is_already_seen());
    }

    #[test]
    fn non_transitive_roots_do_not_track_seen_pairs() {
        let root = DagChecker::root("app", "OUTPUT_NAME");
        let first = nested("lib", "INTERFACE_INCLUDE_DIRECTORIES", &root);
        let second = nested("lib", "INTERFACE_INCLUDE_DIRECTORIES", &root);
        assert!(first.check().is_dag());
        assert!(second.check().is_dag());
    }

    #[test]
    fn link_library_queries_look_at_the_root() {
        let root = DagChecker::root("app", "LINK_LIBRARIES");
        let child = nested("lib", "INTERFACE_COMPILE_OPTIONS", &root);
        assert!(child.evaluating_link_libraries(None));
        assert!(child.evaluating_link_libraries(Some("app")));
        assert!(!child.evaluating_link_libraries(Some("lib")));

        let config = DagChecker::root("app", "LINK_INTERFACE_LIBRARIES_DEBUG");
        assert!(config.evaluating_link_libraries(None));
    }

    #[test]
    fn transitive_only_mode_is_inherited() {
        let root =
            DagChecker::root("app", "INTERFACE_LINK_LIBRARIES").with_transitive_properties_only();
        let child = nested("lib", "INTERFACE_COMPILE_OPTIONS", &root);
        assert!(child.transitive_properties_only());
    }
}
