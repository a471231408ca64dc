//! Per-evaluation ambient state.
use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::error::EvalError;
use crate::model::{Backtrace, Makefile, MessageKind, Target};
use crate::options::EvaluatorOptions;
use crate::policy::{PolicyId, PolicyStatus};

/// Mutable state shared by every node of one top-level evaluation.
///
/// Flags are sticky and sets only grow: nested evaluations never clear
/// what an earlier step recorded.
pub struct EvaluationContext<'a> {
    pub makefile: &'a dyn Makefile,
    pub config: String,
    /// Target whose build properties anchor unqualified lookups.
    pub head_target: Option<&'a dyn Target>,
    /// Target owning the expression text.
    pub current_target: Option<&'a dyn Target>,
    pub quiet: bool,
    pub had_error: bool,
    pub had_context_sensitive_condition: bool,
    pub evaluate_for_buildsystem: bool,
    pub backtrace: Backtrace,
    pub all_targets: BTreeSet<String>,
    pub depend_targets: BTreeSet<String>,
    pub seen_target_properties: BTreeSet<String>,
    /// target -> language -> required standard level.
    pub max_language_standard: BTreeMap<String, BTreeMap<String, String>>,
    pub depth: usize,
    pub max_depth: usize,
    warned_policies: BTreeSet<PolicyId>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(makefile: &'a dyn Makefile, config: impl Into<String>) -> Self {
        Self {
            makefile,
            config: config.into(),
            head_target: None,
            current_target: None,
            quiet: false,
            had_error: false,
            had_context_sensitive_condition: false,
            evaluate_for_buildsystem: false,
            backtrace: Backtrace::default(),
            all_targets: BTreeSet::new(),
            depend_targets: BTreeSet::new(),
            seen_target_properties: BTreeSet::new(),
            max_language_standard: BTreeMap::new(),
            depth: 0,
            max_depth: EvaluatorOptions::DEFAULT_MAX_DEPTH,
            warned_policies: BTreeSet::new(),
        }
    }

    pub fn with_options(mut self, options: &EvaluatorOptions) -> Self {
        self.quiet = options.quiet;
        self.evaluate_for_buildsystem = options.evaluate_for_buildsystem;
        self.max_depth = options.max_depth;
        self
    }

    pub fn with_targets(
        mut self,
        head: Option<&'a dyn Target>,
        current: Option<&'a dyn Target>,
    ) -> Self {
        self.head_target = head;
        self.current_target = current;
        self
    }

    pub fn with_backtrace(mut self, backtrace: Backtrace) -> Self {
        self.backtrace = backtrace;
        self
    }

    /// Run `f` with a different head/current target pair, restoring the
    /// previous pair afterwards. Everything else (flags, side tables) is
    /// shared with the enclosing evaluation.
    pub fn scoped<R>(
        &mut self,
        head: Option<&'a dyn Target>,
        current: Option<&'a dyn Target>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved_head = std::mem::replace(&mut self.head_target, head);
        let saved_current = std::mem::replace(&mut self.current_target, current);
        let result = f(self);
        self.head_target = saved_head;
        self.current_target = saved_current;
        result
    }

    /// The single reporting routine for evaluation failures.
    ///
    /// Always marks the context as failed; emits a fatal diagnostic unless
    /// the evaluation is quiet.
    pub fn report_error(&mut self, expression: &str, error: EvalError) {
        debug!("evaluation of '{expression}' failed: {error}");
        self.had_error = true;
        if self.quiet {
            return;
        }
        let text = format!("Error evaluating generator expression:\n  {expression}\n{error}");
        self.issue(MessageKind::FatalError, &text);
    }

    pub(crate) fn issue(&self, kind: MessageKind, text: &str) {
        self.makefile
            .messenger()
            .issue_message(kind, text, &self.backtrace);
    }

    /// Emit the author warning of `policy` once per evaluation.
    pub(crate) fn warn_policy(&mut self, policy: PolicyId, status: PolicyStatus) {
        if status.is_warn() && self.warned_policies.insert(policy) && !self.quiet {
            let text = self.makefile.policy_warning(policy);
            self.issue(MessageKind::AuthorWarning, &text);
        }
    }

    pub fn into_outcome(self, output: String) -> EvaluationOutcome {
        EvaluationOutcome {
            output: if self.had_error { String::new() } else { output },
            had_error: self.had_error,
            had_context_sensitive_condition: self.had_context_sensitive_condition,
            all_targets: self.all_targets,
            depend_targets: self.depend_targets,
            seen_target_properties: self.seen_target_properties,
            max_language_standard: self.max_language_standard,
        }
    }
}

/// Everything a top-level evaluation produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationOutcome {
    /// Resulting text; empty whenever `had_error` is set.
    pub output: String,
    pub had_error: bool,
    /// The output depends on the configuration and must not be reused for
    /// another one.
    pub had_context_sensitive_condition: bool,
    pub all_targets: BTreeSet<String>,
    pub depend_targets: BTreeSet<String>,
    pub seen_target_properties: BTreeSet<String>,
    pub max_language_standard: BTreeMap<String, BTreeMap<String, String>>,
}
