use genex::{
    CompiledExpression, DagChecker, EvaluationOutcome,
    memory::{Project, TargetDef},
    model::{Target, TargetType},
    policy::{PolicyId, PolicyStatus},
};

fn target<'a>(project: &'a Project, name: &str) -> Option<&'a dyn Target> {
    Some(project.get(name).expect("target exists") as &dyn Target)
}

fn evaluate_for(project: &Project, head: &str, input: &str) -> EvaluationOutcome {
    let head = target(project, head);
    CompiledExpression::parse(input)
        .expect("expression should parse")
        .evaluate(project, "Debug", false, head, head, None)
}

fn error_text(project: &Project) -> String {
    project
        .diagnostics()
        .errors()
        .map(|d| d.text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn gnu_project(cmp0044: Option<PolicyStatus>) -> Project {
    let project = Project::new()
        .define("CMAKE_CXX_COMPILER_ID", "GNU")
        .define("CMAKE_CXX_COMPILER_VERSION", "4.8.1");
    let project = match cmp0044 {
        Some(status) => project.policy(PolicyId::Cmp0044, status),
        None => project,
    };
    project.target(TargetDef::new("app", TargetType::Executable))
}

#[test]
fn compiler_id_matches_exactly() {
    let project = gnu_project(None);
    assert_eq!(evaluate_for(&project, "app", "$<CXX_COMPILER_ID>").output, "GNU");
    assert_eq!(evaluate_for(&project, "app", "$<CXX_COMPILER_ID:GNU>").output, "1");
    assert_eq!(evaluate_for(&project, "app", "$<CXX_COMPILER_ID:Clang>").output, "0");
    assert_eq!(
        evaluate_for(&project, "app", "$<C_COMPILER_ID:>").output,
        "1",
        "no C compiler configured"
    );
    assert_eq!(evaluate_for(&project, "app", "$<C_COMPILER_ID:GNU>").output, "0");
    assert!(project.diagnostics().messages().is_empty());

    assert!(evaluate_for(&project, "app", "$<CXX_COMPILER_ID:G-NU>").had_error);
    assert!(error_text(&project).contains("Expression syntax not recognized."));
}

#[test]
fn compiler_id_case_folding_follows_cmp0044() {
    let project = gnu_project(None);
    assert_eq!(evaluate_for(&project, "app", "$<CXX_COMPILER_ID:gnu>").output, "1");
    let warnings: Vec<_> = project.diagnostics().warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].text.starts_with("Policy CMP0044 is not set"), "{}", warnings[0].text);

    let project = gnu_project(Some(PolicyStatus::Old));
    assert_eq!(evaluate_for(&project, "app", "$<CXX_COMPILER_ID:gnu>").output, "1");
    assert!(project.diagnostics().messages().is_empty());

    let project = gnu_project(Some(PolicyStatus::New));
    assert_eq!(evaluate_for(&project, "app", "$<CXX_COMPILER_ID:gnu>").output, "0");
    assert!(project.diagnostics().messages().is_empty());
}

#[test]
fn compiler_queries_need_a_head_target() {
    let project = gnu_project(None);
    let outcome = CompiledExpression::parse("$<CXX_COMPILER_ID:GNU>")
        .unwrap()
        .evaluate(&project, "Debug", false, None, None, None);
    assert!(outcome.had_error);
    assert!(
        error_text(&project).contains("$<CXX_COMPILER_ID> may only be used with binary targets.")
    );
}

#[test]
fn compiler_version_comparison() {
    let project = gnu_project(None);
    assert_eq!(evaluate_for(&project, "app", "$<CXX_COMPILER_VERSION>").output, "4.8.1");
    assert_eq!(evaluate_for(&project, "app", "$<CXX_COMPILER_VERSION:4.8.1>").output, "1");
    assert_eq!(evaluate_for(&project, "app", "$<CXX_COMPILER_VERSION:4.8>").output, "0");
    assert_eq!(evaluate_for(&project, "app", "$<C_COMPILER_VERSION:>").output, "1");
    assert!(evaluate_for(&project, "app", "$<CXX_COMPILER_VERSION:4.x>").had_error);
}

fn feature_project(compiler_id: &str, standard_default: &str) -> Project {
    Project::new()
        .define("CMAKE_CXX_COMPILER_ID", compiler_id)
        .define("CMAKE_CXX_STANDARD_DEFAULT", standard_default)
        .with_compile_features("CXX", &["cxx_auto_type", "cxx_constexpr"])
        .feature_standard("cxx_constexpr", "11")
        .target(TargetDef::new("legacy", TargetType::Executable))
        .target(
            TargetDef::new("modern", TargetType::Executable)
                .with_property("CXX_STANDARD", "11"),
        )
}

#[test]
fn compile_features_check_the_standard_level() {
    let project = feature_project("FeatureTestCC", "98");
    assert_eq!(evaluate_for(&project, "modern", "$<COMPILE_FEATURES:cxx_constexpr>").output, "1");
    assert_eq!(evaluate_for(&project, "legacy", "$<COMPILE_FEATURES:cxx_constexpr>").output, "0");
    assert_eq!(evaluate_for(&project, "legacy", "$<COMPILE_FEATURES:cxx_auto_type>").output, "1");
    assert_eq!(
        evaluate_for(&project, "legacy", "$<COMPILE_FEATURES:cxx_auto_type,cxx_constexpr>").output,
        "0"
    );
    assert!(project.diagnostics().messages().is_empty());
}

#[test]
fn compile_features_without_standard_levels() {
    let project = feature_project("NoStandardCC", "");
    assert_eq!(evaluate_for(&project, "legacy", "$<COMPILE_FEATURES:cxx_constexpr>").output, "1");
}

#[test]
fn unknown_compile_features_are_errors() {
    let project = feature_project("FeatureTestCC", "98");
    let outcome = evaluate_for(&project, "legacy", "$<COMPILE_FEATURES:cxx_bogus>");
    assert!(outcome.had_error);
    assert!(
        error_text(&project)
            .contains("Specified unknown feature \"cxx_bogus\" for target \"legacy\".")
    );
}

#[test]
fn compile_features_in_link_libraries_record_the_standard() {
    let project = feature_project("FeatureTestCC", "98");
    let root = DagChecker::root("legacy", "LINK_LIBRARIES");
    let outcome = CompiledExpression::parse("$<COMPILE_FEATURES:cxx_constexpr>").unwrap().evaluate(
        &project,
        "Debug",
        false,
        target(&project, "legacy"),
        target(&project, "legacy"),
        Some(&root),
    );
    assert_eq!(outcome.output, "1");
    assert_eq!(
        outcome.max_language_standard["legacy"].get("CXX").map(String::as_str),
        Some("98")
    );
}

#[test]
fn imported_configurations_may_be_mapped() {
    let project = Project::new()
        .target(TargetDef::new("app", TargetType::Executable))
        .target(
            TargetDef::new("ext", TargetType::UnknownLibrary)
                .imported()
                .with_property("MAP_IMPORTED_CONFIG_DEBUG", "Release;RelWithDebInfo"),
        )
        .target(
            TargetDef::new("partial", TargetType::UnknownLibrary)
                .imported()
                .with_mapped_configs(&["Release"])
                .with_property("MAP_IMPORTED_CONFIG_DEBUG", "Release"),
        );
    let config_of = |current: &str, input: &str| {
        CompiledExpression::parse(input)
            .unwrap()
            .evaluate(
                &project,
                "Debug",
                false,
                target(&project, "app"),
                target(&project, current),
                None,
            )
            .output
    };
    assert_eq!(config_of("ext", "$<CONFIG:Debug>"), "1");
    assert_eq!(config_of("ext", "$<CONFIG:Release>"), "1");
    assert_eq!(config_of("ext", "$<CONFIG:relwithdebinfo>"), "1");
    assert_eq!(config_of("ext", "$<CONFIG:MinSizeRel>"), "0");
    assert_eq!(
        config_of("app", "$<CONFIG:Release>"),
        "0",
        "only imported targets map configurations"
    );
    assert_eq!(config_of("partial", "$<CONFIG:Release>"), "0", "Debug has no mapped location");
}

fn artifact_project() -> Project {
    Project::new()
        .target(TargetDef::new("foo", TargetType::SharedLibrary).with_soversion("1"))
        .target(TargetDef::new("st", TargetType::StaticLibrary).with_output_directory("/build/lib"))
        .target(TargetDef::new("app", TargetType::Executable))
        .target(
            TargetDef::new("plugin_host", TargetType::Executable)
                .enable_exports()
                .dll_platform(),
        )
        .target(TargetDef::new("winlib", TargetType::SharedLibrary).dll_platform())
        .target(TargetDef::new("util", TargetType::Utility))
        .target(
            TargetDef::new("ext", TargetType::UnknownLibrary)
                .imported()
                .with_property("IMPORTED_LOCATION", "/opt/ext/libext.so"),
        )
}

#[test]
fn artifact_paths() {
    let project = artifact_project();
    let cases = [
        ("$<TARGET_FILE:foo>", "/build/libfoo.so"),
        ("$<TARGET_FILE_NAME:foo>", "libfoo.so"),
        ("$<TARGET_FILE_DIR:foo>", "/build"),
        ("$<TARGET_LINKER_FILE:foo>", "/build/libfoo.so"),
        ("$<TARGET_SONAME_FILE:foo>", "/build/libfoo.so.1"),
        ("$<TARGET_SONAME_FILE_NAME:foo>", "libfoo.so.1"),
        ("$<TARGET_SONAME_FILE_DIR:foo>", "/build"),
        ("$<TARGET_LINKER_FILE_DIR:st>", "/build/lib"),
        ("$<TARGET_LINKER_FILE_NAME:st>", "libst.a"),
        ("$<TARGET_FILE:app>", "/build/app"),
        ("$<TARGET_FILE:winlib>", "/build/winlib.dll"),
        ("$<TARGET_LINKER_FILE:winlib>", "/build/winlib.lib"),
        ("$<TARGET_LINKER_FILE_NAME:plugin_host>", "plugin_host.lib"),
        ("$<TARGET_FILE:ext>", "/opt/ext/libext.so"),
    ];
    for (input, expected) in cases {
        let outcome = evaluate_for(&project, "app", input);
        assert!(!outcome.had_error, "{input}: {}", error_text(&project));
        assert_eq!(outcome.output, expected, "{input}");
    }

    let outcome = evaluate_for(&project, "app", "$<TARGET_FILE:foo>");
    assert!(outcome.depend_targets.contains("foo"));
    assert!(outcome.all_targets.contains("foo"));
}

#[test]
fn artifact_errors() {
    let project = artifact_project();
    let cases = [
        ("$<TARGET_FILE:nope>", "No target \"nope\""),
        ("$<TARGET_FILE:bad name>", "Expression syntax not recognized."),
        ("$<TARGET_FILE:util>", "Target \"util\" is not an executable or library."),
        (
            "$<TARGET_LINKER_FILE:app>",
            "TARGET_LINKER_FILE is allowed only for libraries and executables with ENABLE_EXPORTS.",
        ),
        ("$<TARGET_SONAME_FILE:st>", "TARGET_SONAME_FILE is allowed only for SHARED libraries."),
        (
            "$<TARGET_SONAME_FILE_NAME:winlib>",
            "TARGET_SONAME_FILE is not allowed for DLL target platforms.",
        ),
    ];
    for (input, message) in cases {
        project.diagnostics().clear();
        let outcome = evaluate_for(&project, "app", input);
        assert!(outcome.had_error, "{input} should fail");
        assert_eq!(outcome.output, "");
        assert!(error_text(&project).contains(message), "{input}: {}", error_text(&project));
    }
}

#[test]
fn artifacts_are_unavailable_while_computing_link_libraries() {
    let project = artifact_project();
    let evaluate_under = |root: &DagChecker<'_>, input: &str| {
        CompiledExpression::parse(input).unwrap().evaluate(
            &project,
            "Debug",
            false,
            target(&project, "foo"),
            target(&project, "foo"),
            Some(root),
        )
    };

    let root = DagChecker::root("foo", "LINK_LIBRARIES");
    assert!(evaluate_under(&root, "$<TARGET_FILE:foo>").had_error);
    assert!(error_text(&project).contains("may not be used while evaluating link libraries"));
    assert!(!evaluate_under(&root, "$<TARGET_FILE:st>").had_error, "other targets are fine");

    let sources = DagChecker::root("foo", "SOURCES");
    assert!(evaluate_under(&sources, "$<TARGET_FILE_DIR:foo>").had_error);
}
