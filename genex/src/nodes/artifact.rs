//! `$<TARGET_{,LINKER_,SONAME_}FILE{,_NAME,_DIR}:tgt>`.
//!
//! The nine nodes are one generic [`TargetFilesystemArtifact`] composed of an
//! [`ArtifactCreator`] choosing which file is meant and an
//! [`ArtifactQualifier`] choosing which part of its path is returned.
use std::marker::PhantomData;

use log::debug;

use crate::context::EvaluationContext;
use crate::dag::DagChecker;
use crate::error::EvalError;
use crate::expression::ExpressionContent;
use crate::model::{Target, TargetType};
use crate::nodes::GeneratorNode;
use crate::utils::is_valid_target_name;

/// Computes the full path of one artifact of a target, or reports why the
/// target has no such artifact.
pub trait ArtifactCreator: Sync {
    fn create(
        target: &dyn Target,
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
    ) -> String;
}

/// Projects a full path onto the part the node returns.
pub trait ArtifactQualifier: Sync {
    fn qualify(path: &str) -> String;
}

/// The main output file (`.so`, `.dll`, executable...).
pub struct MainArtifact;

/// The file consumers link against (import library when there is one).
pub struct LinkerArtifact;

/// The versioned shared object name (`libfoo.so.1`).
pub struct SonameArtifact;

pub struct FullPath;
pub struct DirectoryPart;
pub struct FileNamePart;

impl ArtifactCreator for MainArtifact {
    fn create(
        target: &dyn Target,
        context: &mut EvaluationContext<'_>,
        _content: &ExpressionContent,
    ) -> String {
        target.full_path(&context.config, false)
    }
}

impl ArtifactCreator for LinkerArtifact {
    fn create(
        target: &dyn Target,
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
    ) -> String {
        if !target.is_linkable() {
            context.report_error(
                content.original_expression(),
                EvalError::LinkerFileRequiresLinkable,
            );
            return String::new();
        }
        target.full_path(&context.config, target.has_import_library())
    }
}

impl ArtifactCreator for SonameArtifact {
    fn create(
        target: &dyn Target,
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
    ) -> String {
        if target.is_dll_platform() {
            context
                .report_error(content.original_expression(), EvalError::SonameOnDllPlatform);
            return String::new();
        }
        if target.target_type() != TargetType::SharedLibrary {
            context.report_error(
                content.original_expression(),
                EvalError::SonameRequiresSharedLibrary,
            );
            return String::new();
        }
        format!(
            "{}/{}",
            target.directory(&context.config),
            target.so_name(&context.config)
        )
    }
}

impl ArtifactQualifier for FullPath {
    fn qualify(path: &str) -> String {
        path.to_string()
    }
}

impl ArtifactQualifier for DirectoryPart {
    fn qualify(path: &str) -> String {
        match path.rfind('/') {
            Some(0) => "/".to_string(),
            Some(slash) => path[..slash].to_string(),
            None => String::new(),
        }
    }
}

impl ArtifactQualifier for FileNamePart {
    fn qualify(path: &str) -> String {
        match path.rfind('/') {
            Some(slash) => path[slash + 1..].to_string(),
            None => path.to_string(),
        }
    }
}

pub struct TargetFilesystemArtifact<C, Q> {
    _strategies: PhantomData<(C, Q)>,
}

impl<C, Q> TargetFilesystemArtifact<C, Q> {
    pub const fn new() -> Self {
        Self {
            _strategies: PhantomData,
        }
    }
}

pub static TARGET_FILE: TargetFilesystemArtifact<MainArtifact, FullPath> =
    TargetFilesystemArtifact::new();
pub static TARGET_LINKER_FILE: TargetFilesystemArtifact<LinkerArtifact, FullPath> =
    TargetFilesystemArtifact::new();
pub static TARGET_SONAME_FILE: TargetFilesystemArtifact<SonameArtifact, FullPath> =
    TargetFilesystemArtifact::new();
pub static TARGET_FILE_NAME: TargetFilesystemArtifact<MainArtifact, FileNamePart> =
    TargetFilesystemArtifact::new();
pub static TARGET_LINKER_FILE_NAME: TargetFilesystemArtifact<LinkerArtifact, FileNamePart> =
    TargetFilesystemArtifact::new();
pub static TARGET_SONAME_FILE_NAME: TargetFilesystemArtifact<SonameArtifact, FileNamePart> =
    TargetFilesystemArtifact::new();
pub static TARGET_FILE_DIR: TargetFilesystemArtifact<MainArtifact, DirectoryPart> =
    TargetFilesystemArtifact::new();
pub static TARGET_LINKER_FILE_DIR: TargetFilesystemArtifact<LinkerArtifact, DirectoryPart> =
    TargetFilesystemArtifact::new();
pub static TARGET_SONAME_FILE_DIR: TargetFilesystemArtifact<SonameArtifact, DirectoryPart> =
    TargetFilesystemArtifact::new();

impl<C: ArtifactCreator, Q: ArtifactQualifier> GeneratorNode for TargetFilesystemArtifact<C, Q> {
    fn evaluate(
        &self,
        parameters: &[String],
        context: &mut EvaluationContext<'_>,
        content: &ExpressionContent,
        dag: Option<&DagChecker<'_>>,
    ) -> String {
        let name = parameters[0].as_str();
        if !is_valid_target_name(name) {
            context.report_error(content.original_expression(), EvalError::SyntaxNotRecognized);
            return String::new();
        }
        let makefile = context.makefile;
        let Some(target) = makefile.find_target(name) else {
            context.report_error(
                content.original_expression(),
                EvalError::NoSuchTarget {
                    name: name.to_string(),
                },
            );
            return String::new();
        };
        if !target.target_type().has_artifact() {
            context.report_error(
                content.original_expression(),
                EvalError::NotExecutableOrLibrary {
                    name: name.to_string(),
                },
            );
            return String::new();
        }
        if let Some(dag) = dag
            && (dag.evaluating_link_libraries(Some(name))
                || (dag.evaluating_sources() && name == dag.top_target()))
        {
            context.report_error(content.original_expression(), EvalError::LinkerLanguageRequired);
            return String::new();
        }

        context.depend_targets.insert(target.name().to_string());
        context.all_targets.insert(target.name().to_string());

        let path = C::create(target, context, content);
        if context.had_error {
            return String::new();
        }
        debug!("artifact of '{name}' for '{}': {path}", context.config);
        Q::qualify(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifiers_split_paths() {
        assert_eq!(DirectoryPart::qualify("/build/lib/libfoo.so"), "/build/lib");
        assert_eq!(FileNamePart::qualify("/build/lib/libfoo.so"), "libfoo.so");
        assert_eq!(FullPath::qualify("/build/lib/libfoo.so"), "/build/lib/libfoo.so");
        assert_eq!(DirectoryPart::qualify("/libfoo.so"), "/");
        assert_eq!(DirectoryPart::qualify("libfoo.so"), "");
        assert_eq!(FileNamePart::qualify("libfoo.so"), "libfoo.so");
    }
}
