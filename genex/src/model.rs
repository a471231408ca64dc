//! Interfaces of the collaborators the evaluator consumes.
//!
//! The evaluator never owns build state. It reads it through two traits:
//!
//! - [`Makefile`]: the directory scope a build file is evaluated in
//!   (variable definitions, target lookup, policy states, compile-feature
//!   tables and the diagnostic sink).
//! - [`Target`]: one build target (type, properties, per-configuration
//!   artifact paths, link dependencies).
//!
//! [`crate::memory`] provides an in-memory implementation of both.
use std::cell::RefCell;

use log::{error, warn};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs, EnumString};

use crate::policy::{PolicyId, PolicyStatus};

/// Kind of a build target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    Executable,
    StaticLibrary,
    SharedLibrary,
    ModuleLibrary,
    ObjectLibrary,
    Utility,
    GlobalTarget,
    InterfaceLibrary,
    UnknownLibrary,
}

impl TargetType {
    /// Whether filesystem artifacts (`$<TARGET_FILE:...>` and friends) exist
    /// for targets of this type.
    pub fn has_artifact(self) -> bool {
        matches!(
            self,
            TargetType::Executable
                | TargetType::StaticLibrary
                | TargetType::SharedLibrary
                | TargetType::ModuleLibrary
                | TargetType::UnknownLibrary
        )
    }
}

/// Aggregation rule of a link-interface-dependent property, i.e. a property
/// whose value on a consumer is computed from the interface of everything it
/// links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependentPropertyKind {
    Bool,
    String,
    NumberMin,
    NumberMax,
}

impl DependentPropertyKind {
    pub const ALL: [DependentPropertyKind; 4] = [
        DependentPropertyKind::Bool,
        DependentPropertyKind::String,
        DependentPropertyKind::NumberMin,
        DependentPropertyKind::NumberMax,
    ];
}

/// Ordered list of frames describing where an expression came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backtrace {
    pub frames: Vec<String>,
}

impl Backtrace {
    pub fn new(frame: impl Into<String>) -> Self {
        Self {
            frames: vec![frame.into()],
        }
    }
}

impl std::fmt::Display for Backtrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for frame in &self.frames {
            writeln!(f, "  {frame}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum MessageKind {
    FatalError,
    AuthorWarning,
}

/// One emitted diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: MessageKind,
    pub text: String,
    pub backtrace: Backtrace,
}

/// Sink for user-facing diagnostics.
pub trait Messenger {
    fn issue_message(&self, kind: MessageKind, text: &str, backtrace: &Backtrace);
}

/// A [`Messenger`] that keeps every diagnostic and mirrors it to the `log` facade.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    messages: RefCell<Vec<Diagnostic>>,
}

impl RecordingMessenger {
    pub fn messages(&self) -> Vec<Diagnostic> {
        self.messages.borrow().clone()
    }

    pub fn errors(&self) -> impl Iterator<Item = Diagnostic> {
        self.messages().into_iter().filter(|m| m.kind.is_fatal_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = Diagnostic> {
        self.messages().into_iter().filter(|m| m.kind.is_author_warning())
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
    }
}

impl Messenger for RecordingMessenger {
    fn issue_message(&self, kind: MessageKind, text: &str, backtrace: &Backtrace) {
        match kind {
            MessageKind::FatalError => error!("{text}"),
            MessageKind::AuthorWarning => warn!("{text}"),
        }
        self.messages.borrow_mut().push(Diagnostic {
            kind,
            text: text.to_string(),
            backtrace: backtrace.clone(),
        });
    }
}

/// The scope an expression is evaluated in.
pub trait Makefile {
    /// Value of a variable definition such as `CMAKE_CXX_COMPILER_ID`.
    fn definition(&self, name: &str) -> Option<&str>;

    /// Resolve a target (or an alias of one) by name.
    fn find_target(&self, name: &str) -> Option<&dyn Target>;

    /// Whether `name` is an alias of another target.
    fn is_alias(&self, name: &str) -> bool;

    fn policy_status(&self, policy: PolicyId) -> PolicyStatus;

    /// Author-warning text for a policy left in the warn state.
    fn policy_warning(&self, policy: PolicyId) -> String {
        policy.warning()
    }

    /// Language the compile feature belongs to, or a diagnostic if the
    /// feature is unknown.
    fn compile_feature_known(&self, target: &dyn Target, feature: &str) -> Result<String, String>;

    /// `;`-separated list of every feature the toolchain knows for `lang`,
    /// or a diagnostic if the language has no feature table.
    fn compile_features_available(&self, lang: &str) -> Result<String, String>;

    fn have_feature_available(&self, target: &dyn Target, lang: &str, feature: &str) -> bool;

    fn messenger(&self) -> &dyn Messenger;
}

/// One build target.
///
/// Link queries return item names; items that do not resolve to a target
/// through [`Makefile::find_target`] are ignored by the evaluator.
pub trait Target {
    fn name(&self) -> &str;

    fn target_type(&self) -> TargetType;

    fn is_imported(&self) -> bool;

    /// Directly set value of a property, without any transitive folding.
    fn property(&self, name: &str) -> Option<&str>;

    fn policy_status(&self, policy: PolicyId) -> PolicyStatus;

    /// Whether the target platform uses import libraries instead of sonames.
    fn is_dll_platform(&self) -> bool;

    /// Libraries and executables with exported symbols.
    fn is_linkable(&self) -> bool;

    fn has_import_library(&self) -> bool;

    /// Output directory for `config`.
    fn directory(&self, config: &str) -> String;

    /// Full path of the main artifact, or of the import library when
    /// `implib` is set and the target has one.
    fn full_path(&self, config: &str, implib: bool) -> String;

    /// File name of the versioned shared object (e.g. `libfoo.so.1`).
    fn so_name(&self, config: &str) -> String;

    fn linker_language(&self, config: &str) -> String;

    /// Static libraries propagate their link language to their consumers.
    fn link_language_propagates_to_dependents(&self) -> bool {
        self.target_type() == TargetType::StaticLibrary
    }

    /// Targets whose `INTERFACE_*` properties are folded into this target's
    /// `INTERFACE_*` properties (its link interface).
    fn transitive_property_targets(&self, config: &str, head: &dyn Target) -> Vec<String>;

    /// Libraries this target links to when building itself, or `None` when
    /// it has no link implementation (e.g. interface libraries).
    fn link_implementation_libraries(&self, config: &str) -> Option<Vec<String>>;

    /// Aggregated value of a link-interface-dependent property, or `None`
    /// when `property` is not of the requested `kind` for this target.
    fn link_interface_dependent_property(
        &self,
        kind: DependentPropertyKind,
        property: &str,
        config: &str,
    ) -> Option<String>;

    /// Whether an imported target has a location for `config`, possibly
    /// through a configuration mapping.
    fn mapped_config(&self, config: &str) -> bool;

    /// Object files produced by an object library.
    fn object_files(&self, config: &str) -> Vec<String>;
}
