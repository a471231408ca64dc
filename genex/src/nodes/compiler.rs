//! Compiler identity, version and feature queries.
use std::collections::{BTreeMap, HashMap};

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::context::EvaluationContext;
use crate::dag::DagChecker;
use crate::error::EvalError;
use crate::expression::ExpressionContent;
use crate::model::Makefile;
use crate::nodes::{Arity, GeneratorNode};
use crate::policy::{PolicyId, PolicyStatus};
use crate::utils::{compare_versions, expand_list, is_identifier_or_empty, is_version_or_empty};

/// `$<LANG_COMPILER_ID[:id]>`.
pub struct CompilerId {
    language: &'static str,
    expression: &'static str,
}

/// `$<LANG_COMPILER_VERSION[:version]>`.
pub struct CompilerVersion {
    language: &'static str,
    expression: &'static str,
}

/// `$<COMPILE_FEATURES:feature,...>`.
pub struct CompileFeatures;

pub static C_COMPILER_ID: CompilerId = CompilerId {
    language: "C",
    expression: "C_COMPILER_ID",
};
pub static CXX_COMPILER_ID: CompilerId = CompilerId {
    language: "CXX",
    expression: "CXX_COMPILER_ID",
};
pub static C_COMPILER_VERSION: CompilerVersion = CompilerVersion {
    language: "C",
    expression: "C_COMPILER_VERSION",
};
pub static CXX_COMPILER_VERSION: CompilerVersion = CompilerVersion {
    language: "CXX",
    expression: "CXX_COMPILER_VERSION",
};
pub static COMPILE_FEATURES: CompileFeatures = CompileFeatures;

/// Features known per (language, compiler id), filled on first use.
///
/// The cache is process-wide: two makefiles reporting the same compiler id
/// for a language share one entry, whichever asked first. Call
/// [`clear_feature_cache`] between makefiles that disagree.
static AVAILABLE_FEATURES: Lazy<RwLock<HashMap<(String, String), Vec<String>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Forget every cached compile-feature list.
pub fn clear_feature_cache() {
    AVAILABLE_FEATURES.write().clear();
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

impl GeneratorNode for CompilerId {
    fn arity(&self) -> Arity {
        Arity::OneOrZero
    }

    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        if context.head_target.is_none() {
            context.report_error(
                content.original_expression(),
                EvalError::BinaryTargetRequired {
                    expression: self.expression,
                },
            );
            return String::new();
        }

        let makefile = context.makefile;
        let compiler_id = makefile.definition(&format!("CMAKE_{}_COMPILER_ID", self.language));
        let Some(tested) = parameters.first() else {
            return compiler_id.unwrap_or_default().to_string();
        };
        if !is_identifier_or_empty(tested) {
            context.report_error(content.original_expression(), EvalError::SyntaxNotRecognized);
            return String::new();
        }
        let Some(compiler_id) = compiler_id else {
            return flag(tested.is_empty());
        };
        if tested == compiler_id {
            return flag(true);
        }
        if tested.eq_ignore_ascii_case(compiler_id) {
            let status = makefile.policy_status(PolicyId::Cmp0044);
            match status {
                PolicyStatus::Warn => {
                    context.warn_policy(PolicyId::Cmp0044, status);
                    return flag(true);
                }
                PolicyStatus::Old => return flag(true),
                PolicyStatus::New => {}
            }
        }
        flag(false)
    }
}

impl GeneratorNode for CompilerVersion {
    fn arity(&self) -> Arity {
        Arity::OneOrZero
    }

    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        _dag: Option<&DagChecker<'_>>,
    ) -> String {
        if context.head_target.is_none() {
            context.report_error(
                content.original_expression(),
                EvalError::BinaryTargetRequired {
                    expression: self.expression,
                },
            );
            return String::new();
        }

        let makefile = context.makefile;
        let version = makefile.definition(&format!("CMAKE_{}_COMPILER_VERSION", self.language));
        let Some(tested) = parameters.first() else {
            return version.unwrap_or_default().to_string();
        };
        if !is_version_or_empty(tested) {
            context.report_error(content.original_expression(), EvalError::SyntaxNotRecognized);
            return String::new();
        }
        match version {
            None => flag(tested.is_empty()),
            Some(version) => flag(compare_versions(tested, version).is_eq()),
        }
    }
}

impl CompileFeatures {
    /// Make sure the toolchain reports a feature list for `lang`, memoized
    /// process-wide.
    fn ensure_available(makefile: &dyn Makefile, lang: &str) -> Result<(), String> {
        let compiler_id = makefile
            .definition(&format!("CMAKE_{lang}_COMPILER_ID"))
            .unwrap_or_default();
        let key = (lang.to_string(), compiler_id.to_string());
        if AVAILABLE_FEATURES.read().contains_key(&key) {
            return Ok(());
        }

        let known = expand_list(&makefile.compile_features_available(lang)?);
        debug!("caching {} compile features for {lang} ({compiler_id})", known.len());
        AVAILABLE_FEATURES.write().insert(key, known);
        Ok(())
    }
}

impl GeneratorNode for CompileFeatures {
    fn arity(&self) -> Arity {
        Arity::OneOrMore
    }

    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        dag: Option<&DagChecker<'_>>,
    ) -> String {
        let Some(target) = context.head_target else {
            context.report_error(
                content.original_expression(),
                EvalError::BinaryTargetRequired {
                    expression: "COMPILE_FEATURE",
                },
            );
            return String::new();
        };
        let makefile = context.makefile;

        let mut tested: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for feature in parameters {
            let lang = match makefile.compile_feature_known(target, feature) {
                Ok(lang) => lang,
                Err(message) => {
                    context.report_error(
                        content.original_expression(),
                        EvalError::CompileFeature(message),
                    );
                    return String::new();
                }
            };
            if !tested.contains_key(&lang)
                && let Err(message) = Self::ensure_available(makefile, &lang)
            {
                context.report_error(
                    content.original_expression(),
                    EvalError::CompileFeature(message),
                );
                return String::new();
            }
            tested.entry(lang).or_default().push(feature);
        }

        let evaluating_link_libraries = dag.is_some_and(|d| d.evaluating_link_libraries(None));
        for (lang, features) in &tested {
            for feature in features {
                if makefile.have_feature_available(target, lang, feature) {
                    continue;
                }
                if !evaluating_link_libraries {
                    return flag(false);
                }
                let standard = target.property(&format!("{lang}_STANDARD")).or_else(|| {
                    makefile.definition(&format!("CMAKE_{lang}_STANDARD_DEFAULT"))
                });
                if let Some(standard) = standard {
                    context
                        .max_language_standard
                        .entry(target.name().to_string())
                        .or_default()
                        .insert(lang.clone(), standard.to_string());
                }
            }
        }
        flag(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Project;

    #[test]
    fn feature_lists_are_cached_per_compiler() {
        let project = Project::new()
            .define("CMAKE_CXX_COMPILER_ID", "CacheCC")
            .with_compile_features("CXX", &["cxx_auto_type"]);
        assert!(CompileFeatures::ensure_available(&project, "CXX").is_ok());

        let other = Project::new().define("CMAKE_CXX_COMPILER_ID", "CacheCC");
        assert!(
            CompileFeatures::ensure_available(&other, "CXX").is_ok(),
            "same compiler id reads the cached list"
        );
        clear_feature_cache();
        assert!(CompileFeatures::ensure_available(&other, "CXX").is_err());
    }
}
