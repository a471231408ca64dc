//! The node catalog.
//!
//! Every identifier usable as `$<ID:...>` maps to one stateless singleton
//! implementing [`GeneratorNode`]. The table is a compile-time `phf` map, so
//! lookups never allocate and the catalog can be shared between threads.
use log::debug;
use phf::phf_map;

use crate::context::EvaluationContext;
use crate::dag::DagChecker;
use crate::expression::ExpressionContent;

pub mod artifact;
pub mod compiler;
pub mod config;
pub mod logic;
pub mod string;
pub mod target;

/// Number of parameters a node accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// The node validates the count itself.
    Dynamic,
    OneOrMore,
    OneOrZero,
    Exactly(usize),
}

/// Contract shared by every catalog entry.
pub trait GeneratorNode: Sync {
    /// Markers such as `$<0:...>` validate their parameters but always
    /// evaluate to nothing.
    fn generates_content(&self) -> bool {
        true
    }

    /// Only literal text may form the parameter.
    fn requires_literal_input(&self) -> bool {
        false
    }

    /// The last parameter keeps its commas.
    fn accepts_arbitrary_content(&self) -> bool {
        false
    }

    fn arity(&self) -> Arity {
        Arity::Exactly(1)
    }

    /// Compute the node's value. Failures go through
    /// [`EvaluationContext::report_error`] and yield an empty string.
    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        dag: Option<&DagChecker<'_>>,
    ) -> String;
}

pub type NodeRef = &'static dyn GeneratorNode;

static NODES: phf::Map<&'static str, NodeRef> = phf_map! {
    "0" => &logic::ZERO as NodeRef,
    "1" => &logic::ONE as NodeRef,
    "AND" => &logic::AND as NodeRef,
    "OR" => &logic::OR as NodeRef,
    "NOT" => &logic::NOT as NodeRef,
    "BOOL" => &logic::BOOL as NodeRef,
    "STREQUAL" => &logic::STREQUAL as NodeRef,
    "EQUAL" => &logic::EQUAL as NodeRef,
    "BUILD_INTERFACE" => &logic::ONE as NodeRef,
    "INSTALL_INTERFACE" => &logic::ZERO as NodeRef,
    "LOWER_CASE" => &string::LOWER_CASE as NodeRef,
    "UPPER_CASE" => &string::UPPER_CASE as NodeRef,
    "MAKE_C_IDENTIFIER" => &string::MAKE_C_IDENTIFIER as NodeRef,
    "VERSION_GREATER" => &string::VERSION_GREATER as NodeRef,
    "VERSION_LESS" => &string::VERSION_LESS as NodeRef,
    "VERSION_EQUAL" => &string::VERSION_EQUAL as NodeRef,
    "ANGLE-R" => &string::ANGLE_R as NodeRef,
    "COMMA" => &string::COMMA as NodeRef,
    "SEMICOLON" => &string::SEMICOLON as NodeRef,
    "JOIN" => &string::JOIN as NodeRef,
    "C_COMPILER_ID" => &compiler::C_COMPILER_ID as NodeRef,
    "CXX_COMPILER_ID" => &compiler::CXX_COMPILER_ID as NodeRef,
    "C_COMPILER_VERSION" => &compiler::C_COMPILER_VERSION as NodeRef,
    "CXX_COMPILER_VERSION" => &compiler::CXX_COMPILER_VERSION as NodeRef,
    "COMPILE_FEATURES" => &compiler::COMPILE_FEATURES as NodeRef,
    "PLATFORM_ID" => &config::PLATFORM_ID as NodeRef,
    "CONFIGURATION" => &config::CONFIGURATION as NodeRef,
    "CONFIG" => &config::CONFIG as NodeRef,
    "TARGET_FILE" => &artifact::TARGET_FILE as NodeRef,
    "TARGET_LINKER_FILE" => &artifact::TARGET_LINKER_FILE as NodeRef,
    "TARGET_SONAME_FILE" => &artifact::TARGET_SONAME_FILE as NodeRef,
    "TARGET_FILE_NAME" => &artifact::TARGET_FILE_NAME as NodeRef,
    "TARGET_LINKER_FILE_NAME" => &artifact::TARGET_LINKER_FILE_NAME as NodeRef,
    "TARGET_SONAME_FILE_NAME" => &artifact::TARGET_SONAME_FILE_NAME as NodeRef,
    "TARGET_FILE_DIR" => &artifact::TARGET_FILE_DIR as NodeRef,
    "TARGET_LINKER_FILE_DIR" => &artifact::TARGET_LINKER_FILE_DIR as NodeRef,
    "TARGET_SONAME_FILE_DIR" => &artifact::TARGET_SONAME_FILE_DIR as NodeRef,
    "TARGET_PROPERTY" => &target::TARGET_PROPERTY as NodeRef,
    "TARGET_NAME" => &target::TARGET_NAME as NodeRef,
    "TARGET_OBJECTS" => &target::TARGET_OBJECTS as NodeRef,
    "TARGET_POLICY" => &target::TARGET_POLICY as NodeRef,
    "INSTALL_PREFIX" => &target::INSTALL_PREFIX as NodeRef,
    "LINK_ONLY" => &target::LINK_ONLY as NodeRef,
};

/// Look up the node registered for `identifier`.
pub fn node(identifier: &str) -> Option<NodeRef> {
    let node = NODES.get(identifier).copied();
    if node.is_none() {
        debug!("unknown generator expression identifier '{identifier}'");
    }
    node
}

/// Every registered identifier, in no particular order.
pub fn identifiers() -> impl Iterator<Item = &'static str> {
    NODES.keys().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_complete() {
        let mut ids: Vec<_> = identifiers().collect();
        ids.sort_unstable();
        assert_eq!(ids.len(), 43);
        assert!(ids.contains(&"TARGET_SONAME_FILE_DIR"));
        assert!(node("target_file").is_none(), "lookups are case sensitive");
    }

    #[test]
    fn contracts() {
        let zero = node("0").unwrap();
        assert!(!zero.generates_content());
        assert!(zero.accepts_arbitrary_content());

        let name = node("TARGET_NAME").unwrap();
        assert!(name.requires_literal_input());
        assert_eq!(name.arity(), Arity::Exactly(1));

        assert_eq!(node("AND").unwrap().arity(), Arity::OneOrMore);
        assert_eq!(node("CONFIG").unwrap().arity(), Arity::OneOrZero);
        assert_eq!(node("TARGET_PROPERTY").unwrap().arity(), Arity::OneOrMore);
        assert_eq!(node("JOIN").unwrap().arity(), Arity::Exactly(2));
        assert_eq!(node("COMMA").unwrap().arity(), Arity::Exactly(0));
    }
}
