//! In-memory build scope.
//!
//! [`Project`] and [`TargetDef`] implement [`Makefile`] and [`Target`] from
//! plain data, either assembled with the builder methods or deserialized
//! from TOML:
//!
//! ```toml
//! [definitions]
//! CMAKE_CXX_COMPILER_ID = "GNU"
//!
//! [policies]
//! CMP0044 = "NEW"
//!
//! [[target]]
//! name = "app"
//! type = "EXECUTABLE"
//! link_libraries = ["core"]
//!
//! [[target]]
//! name = "core"
//! type = "STATIC_LIBRARY"
//! properties = { INTERFACE_COMPILE_DEFINITIONS = "USE_CORE" }
//! ```
use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    DependentPropertyKind, Makefile, Messenger, RecordingMessenger, Target, TargetType,
};
use crate::policy::{PolicyId, PolicyStatus};

/// Value of a link-interface-dependent property as aggregated over the
/// link interface of a target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DependentProperty {
    pub kind: DependentPropertyKind,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetDef {
    pub name: String,
    #[serde(rename = "type")]
    pub target_type: TargetType,
    pub imported: bool,
    pub properties: BTreeMap<String, String>,
    pub policies: BTreeMap<PolicyId, PolicyStatus>,
    pub dll_platform: bool,
    pub enable_exports: bool,
    pub output_directory: String,
    pub output_name: Option<String>,
    /// `SOVERSION` of shared libraries.
    pub soversion: Option<String>,
    pub linker_language: String,
    pub link_libraries: Vec<String>,
    /// Defaults to `link_libraries` when unset.
    pub interface_link_libraries: Option<Vec<String>>,
    /// Configurations an imported target has a location for. Empty means all.
    pub mapped_configs: Vec<String>,
    pub object_files: Vec<String>,
    pub dependent_properties: BTreeMap<String, DependentProperty>,
}

impl Default for TargetDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            target_type: TargetType::Executable,
            imported: false,
            properties: BTreeMap::new(),
            policies: BTreeMap::new(),
            dll_platform: false,
            enable_exports: false,
            output_directory: "/build".to_string(),
            output_name: None,
            soversion: None,
            linker_language: "CXX".to_string(),
            link_libraries: Vec::new(),
            interface_link_libraries: None,
            mapped_configs: Vec::new(),
            object_files: Vec::new(),
            dependent_properties: BTreeMap::new(),
        }
    }
}

impl TargetDef {
    pub fn new(name: impl Into<String>, target_type: TargetType) -> Self {
        Self {
            name: name.into(),
            target_type,
            ..Self::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_policy(mut self, policy: PolicyId, status: PolicyStatus) -> Self {
        self.policies.insert(policy, status);
        self
    }

    pub fn with_link_libraries(mut self, libraries: &[&str]) -> Self {
        self.link_libraries = libraries.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_interface_link_libraries(mut self, libraries: &[&str]) -> Self {
        self.interface_link_libraries = Some(libraries.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn with_output_directory(mut self, directory: impl Into<String>) -> Self {
        self.output_directory = directory.into();
        self
    }

    pub fn with_soversion(mut self, version: impl Into<String>) -> Self {
        self.soversion = Some(version.into());
        self
    }

    pub fn with_object_files(mut self, files: &[&str]) -> Self {
        self.object_files = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_dependent_property(
        mut self,
        name: impl Into<String>,
        kind: DependentPropertyKind,
        value: impl Into<String>,
    ) -> Self {
        self.dependent_properties.insert(
            name.into(),
            DependentProperty {
                kind,
                value: value.into(),
            },
        );
        self
    }

    pub fn with_mapped_configs(mut self, configs: &[&str]) -> Self {
        self.mapped_configs = configs.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn imported(mut self) -> Self {
        self.imported = true;
        self
    }

    pub fn dll_platform(mut self) -> Self {
        self.dll_platform = true;
        self
    }

    pub fn enable_exports(mut self) -> Self {
        self.enable_exports = true;
        self
    }

    fn base_name(&self) -> &str {
        self.output_name.as_deref().unwrap_or(&self.name)
    }

    fn is_executable_with_exports(&self) -> bool {
        self.target_type == TargetType::Executable && self.enable_exports
    }

    /// Per-configuration imported property, falling back to the generic one.
    fn imported_property(&self, name: &str, config: &str) -> Option<&str> {
        let specific = format!("{name}_{}", config.to_ascii_uppercase());
        self.property(&specific)
            .filter(|_| !config.is_empty())
            .or_else(|| self.property(name))
    }

    fn file_name(&self, implib: bool) -> String {
        let base = self.base_name();
        match (self.target_type, self.dll_platform) {
            (_, true) if implib => format!("{base}.lib"),
            (TargetType::Executable, true) => format!("{base}.exe"),
            (TargetType::Executable, false) => base.to_string(),
            (TargetType::StaticLibrary, true) => format!("{base}.lib"),
            (TargetType::StaticLibrary, false) => format!("lib{base}.a"),
            (_, true) => format!("{base}.dll"),
            (_, false) => format!("lib{base}.so"),
        }
    }
}

impl Target for TargetDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn target_type(&self) -> TargetType {
        self.target_type
    }

    fn is_imported(&self) -> bool {
        self.imported
    }

    fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    fn policy_status(&self, policy: PolicyId) -> PolicyStatus {
        self.policies.get(&policy).copied().unwrap_or_default()
    }

    fn is_dll_platform(&self) -> bool {
        self.dll_platform
    }

    fn is_linkable(&self) -> bool {
        matches!(
            self.target_type,
            TargetType::StaticLibrary
                | TargetType::SharedLibrary
                | TargetType::ModuleLibrary
                | TargetType::UnknownLibrary
        ) || self.is_executable_with_exports()
    }

    fn has_import_library(&self) -> bool {
        self.dll_platform
            && (self.target_type == TargetType::SharedLibrary || self.is_executable_with_exports())
    }

    fn directory(&self, _config: &str) -> String {
        self.output_directory.clone()
    }

    fn full_path(&self, config: &str, implib: bool) -> String {
        if self.imported {
            let property = if implib { "IMPORTED_IMPLIB" } else { "IMPORTED_LOCATION" };
            return self
                .imported_property(property, config)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}-NOTFOUND", self.name));
        }
        format!("{}/{}", self.directory(config), self.file_name(implib))
    }

    fn so_name(&self, config: &str) -> String {
        if self.imported
            && let Some(soname) = self.imported_property("IMPORTED_SONAME", config)
        {
            return soname.to_string();
        }
        match &self.soversion {
            Some(version) => format!("{}.{version}", self.file_name(false)),
            None => self.file_name(false),
        }
    }

    fn linker_language(&self, _config: &str) -> String {
        self.property("LINKER_LANGUAGE")
            .unwrap_or(&self.linker_language)
            .to_string()
    }

    fn transitive_property_targets(&self, _config: &str, _head: &dyn Target) -> Vec<String> {
        self.interface_link_libraries
            .clone()
            .unwrap_or_else(|| self.link_libraries.clone())
    }

    fn link_implementation_libraries(&self, _config: &str) -> Option<Vec<String>> {
        (self.target_type != TargetType::InterfaceLibrary).then(|| self.link_libraries.clone())
    }

    fn link_interface_dependent_property(
        &self,
        kind: DependentPropertyKind,
        property: &str,
        _config: &str,
    ) -> Option<String> {
        self.dependent_properties
            .get(property)
            .filter(|dependent| dependent.kind == kind)
            .map(|dependent| dependent.value.clone())
    }

    fn mapped_config(&self, config: &str) -> bool {
        self.imported
            && (self.mapped_configs.is_empty()
                || self.mapped_configs.iter().any(|c| c.eq_ignore_ascii_case(config)))
    }

    fn object_files(&self, _config: &str) -> Vec<String> {
        self.object_files.clone()
    }
}

/// A directory scope holding definitions, policies and targets.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Project {
    pub definitions: BTreeMap<String, String>,
    pub policies: BTreeMap<PolicyId, PolicyStatus>,
    /// alias -> target name.
    pub aliases: BTreeMap<String, String>,
    /// language -> every compile feature the toolchain knows.
    pub compile_features: BTreeMap<String, Vec<String>>,
    /// feature -> minimal language standard providing it.
    pub feature_standards: BTreeMap<String, String>,
    #[serde(rename = "target")]
    pub targets: Vec<TargetDef>,
    #[serde(skip)]
    diagnostics: RecordingMessenger,
}

/// Standard levels as comparable years (`98` -> 1998, `11` -> 2011).
fn standard_year(level: &str) -> Option<u32> {
    let level: u32 = level.parse().ok()?;
    Some(match level {
        0..=69 => 2000 + level,
        70..=99 => 1900 + level,
        _ => level,
    })
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(text: &str, file: &str) -> ConfigResult<Self> {
        let mut project: Project = toml::from_str(text).map_err(|source| ConfigError::Toml {
            source,
            file: file.to_string(),
        })?;
        project.inherit_policies();
        Ok(project)
    }

    pub fn load_from_toml(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            source,
            file: path.display().to_string(),
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Targets take the scope's policy settings unless they set their own.
    fn inherit_policies(&mut self) {
        for target in &mut self.targets {
            for (policy, status) in &self.policies {
                target.policies.entry(*policy).or_insert(*status);
            }
        }
    }

    pub fn define(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.definitions.insert(name.into(), value.into());
        self
    }

    pub fn policy(mut self, policy: PolicyId, status: PolicyStatus) -> Self {
        self.policies.insert(policy, status);
        self.inherit_policies();
        self
    }

    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    pub fn with_compile_features(mut self, lang: impl Into<String>, features: &[&str]) -> Self {
        self.compile_features
            .insert(lang.into(), features.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn feature_standard(
        mut self,
        feature: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        self.feature_standards.insert(feature.into(), level.into());
        self
    }

    pub fn target(mut self, target: TargetDef) -> Self {
        self.targets.push(target);
        self.inherit_policies();
        self
    }

    /// Concrete lookup, aliases included.
    pub fn get(&self, name: &str) -> Option<&TargetDef> {
        let name = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.targets.iter().find(|t| t.name == name)
    }

    /// Every diagnostic issued against this scope so far.
    pub fn diagnostics(&self) -> &RecordingMessenger {
        &self.diagnostics
    }
}

impl Makefile for Project {
    fn definition(&self, name: &str) -> Option<&str> {
        self.definitions.get(name).map(String::as_str)
    }

    fn find_target(&self, name: &str) -> Option<&dyn Target> {
        self.get(name).map(|t| t as &dyn Target)
    }

    fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    fn policy_status(&self, policy: PolicyId) -> PolicyStatus {
        self.policies.get(&policy).copied().unwrap_or_default()
    }

    fn compile_feature_known(&self, target: &dyn Target, feature: &str) -> Result<String, String> {
        self.compile_features
            .iter()
            .find(|(_, features)| features.iter().any(|f| f == feature))
            .map(|(lang, _)| lang.clone())
            .ok_or_else(|| {
                format!(
                    "Specified unknown feature \"{feature}\" for target \"{}\".",
                    target.name()
                )
            })
    }

    fn compile_features_available(&self, lang: &str) -> Result<String, String> {
        match self.compile_features.get(lang) {
            Some(features) => Ok(features.join(";")),
            None => Err(format!(
                "No known features for {lang} compiler\n\"{}\"\nversion {}.",
                self.definition(&format!("CMAKE_{lang}_COMPILER_ID")).unwrap_or_default(),
                self.definition(&format!("CMAKE_{lang}_COMPILER_VERSION")).unwrap_or_default(),
            )),
        }
    }

    fn have_feature_available(&self, target: &dyn Target, lang: &str, feature: &str) -> bool {
        let known = self
            .compile_features
            .get(lang)
            .is_some_and(|features| features.iter().any(|f| f == feature));
        if !known {
            return false;
        }
        let standard_default = self.definition(&format!("CMAKE_{lang}_STANDARD_DEFAULT"));
        // Compilers without standard levels provide every known feature.
        if standard_default == Some("") {
            return true;
        }
        let Some(required) = self.feature_standards.get(feature) else {
            return true;
        };
        let standard = target
            .property(&format!("{lang}_STANDARD"))
            .or(standard_default);
        match (standard.and_then(standard_year), standard_year(required)) {
            (Some(have), Some(need)) => have >= need,
            _ => false,
        }
    }

    fn messenger(&self) -> &dyn Messenger {
        &self.diagnostics
    }
}
