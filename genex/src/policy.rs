//! Backward-compatibility policies consulted by the evaluator.
//!
//! The policy subsystem itself lives in the host; the evaluator only reads
//! the [`PolicyStatus`] of a handful of named policies.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs, EnumIter, EnumMessage, EnumString, IntoEnumIterator, IntoStaticStr};

/// State of one policy for a given scope.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, EnumIs, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyStatus {
    /// Legacy behavior, silently.
    Old,
    /// Legacy behavior, but an author warning is issued where the modern
    /// behavior would differ.
    #[default]
    Warn,
    /// Modern behavior.
    New,
}

/// Policies known to the evaluator.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumMessage,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyId {
    #[strum(message = "Libraries linked via full path no longer produce linker search paths.")]
    Cmp0003,
    #[strum(message = "Libraries linked may not have leading or trailing whitespace.")]
    Cmp0004,
    #[strum(message = "Libraries linked by full-path must have a valid library file name.")]
    Cmp0008,
    #[strum(message = "Automatically link Qt executables to qtmain target on Windows.")]
    Cmp0020,
    #[strum(message = "Fatal error on relative paths in INCLUDE_DIRECTORIES target property.")]
    Cmp0021,
    #[strum(message = "INTERFACE_LINK_LIBRARIES defines the link interface.")]
    Cmp0022,
    #[strum(message = "Conditionally linked imported targets with missing include directories.")]
    Cmp0027,
    #[strum(message = "Targets may not link directly to themselves.")]
    Cmp0038,
    #[strum(message = "Error on relative include with generator expression.")]
    Cmp0041,
    #[strum(message = "MACOSX_RPATH is enabled by default.")]
    Cmp0042,
    #[strum(message = "Ignore COMPILE_DEFINITIONS_<Config> properties.")]
    Cmp0043,
    #[strum(message = "Case sensitive <LANG>_COMPILER_ID generator expressions.")]
    Cmp0044,
    #[strum(message = "Error on non-existent dependency in add_dependencies.")]
    Cmp0046,
    #[strum(message = "Reject source and build dirs in installed INTERFACE_INCLUDE_DIRECTORIES.")]
    Cmp0052,
}

impl PolicyId {
    /// Policies whose per-target state may be queried with `$<TARGET_POLICY:...>`.
    pub const TARGET_POLICIES: &'static [PolicyId] = &[
        PolicyId::Cmp0003,
        PolicyId::Cmp0004,
        PolicyId::Cmp0008,
        PolicyId::Cmp0020,
        PolicyId::Cmp0021,
        PolicyId::Cmp0022,
        PolicyId::Cmp0027,
        PolicyId::Cmp0038,
        PolicyId::Cmp0041,
        PolicyId::Cmp0042,
        PolicyId::Cmp0046,
        PolicyId::Cmp0052,
    ];

    pub fn is_target_policy(self) -> bool {
        Self::TARGET_POLICIES.contains(&self)
    }

    /// Default author-warning text for a policy left in the [`PolicyStatus::Warn`] state.
    pub fn warning(self) -> String {
        format!(
            "Policy {} is not set: {}  Use the policy command to set the policy and suppress \
             this warning.",
            self,
            self.get_message().unwrap_or_default()
        )
    }

    /// Bullet list of the target policies, one ` * CMPxxxx` line each.
    pub fn target_policy_list() -> String {
        PolicyId::iter()
            .filter(|id| id.is_target_policy())
            .map(|id| format!(" * {id}\n"))
            .collect()
    }
}
