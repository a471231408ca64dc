use genex::{
    CompiledExpression, EvaluationContext, EvaluationOutcome, EvaluatorOptions,
    memory::Project,
};

fn evaluate(project: &Project, input: &str) -> EvaluationOutcome {
    CompiledExpression::parse(input)
        .expect("expression should parse")
        .evaluate(project, "Debug", false, None, None, None)
}

fn output(input: &str) -> String {
    let project = Project::new();
    let outcome = evaluate(&project, input);
    assert!(
        !outcome.had_error,
        "unexpected error for {input}: {:?}",
        project.diagnostics().messages()
    );
    outcome.output
}

fn first_error(input: &str) -> String {
    let project = Project::new();
    let outcome = evaluate(&project, input);
    assert!(outcome.had_error, "{input} should fail");
    assert!(outcome.output.is_empty(), "failed evaluations produce no output");
    project
        .diagnostics()
        .errors()
        .next()
        .map(|d| d.text)
        .expect("an error diagnostic is issued")
}

#[test]
fn plain_text_is_returned_verbatim() {
    assert_eq!(output("-Wall -O2"), "-Wall -O2");
    assert_eq!(output("a$b > c"), "a$b > c");
    assert_eq!(output(""), "");
}

#[test]
fn boolean_markers() {
    assert_eq!(output("$<0:dropped>"), "");
    assert_eq!(output("$<1:kept>"), "kept");
    assert_eq!(output("$<1:a,b,c>"), "a,b,c", "commas survive in arbitrary content");
    assert_eq!(output("[$<0:x,y>]"), "[]");
    assert_eq!(output("$<BUILD_INTERFACE:/src/include>"), "/src/include");
    assert_eq!(output("$<INSTALL_INTERFACE:include>"), "");
}

#[test]
fn boolean_algebra() {
    assert_eq!(output("$<AND:1,1,1>"), "1");
    assert_eq!(output("$<AND:1,0>"), "0");
    assert_eq!(output("$<AND:0,garbage>"), "0", "AND stops at the first 0");
    assert_eq!(output("$<OR:0,0>"), "0");
    assert_eq!(output("$<OR:0,1>"), "1");
    assert_eq!(output("$<OR:1,garbage>"), "1", "OR stops at the first 1");
    assert_eq!(output("$<NOT:0>"), "1");
    assert_eq!(output("$<NOT:$<AND:1,1>>"), "0");
    assert_eq!(output("$<$<OR:0,1>:-DENABLED>"), "-DENABLED");
}

#[test]
fn boolean_operands_must_be_flags() {
    assert!(
        first_error("$<AND:1,yes>")
            .contains("Parameters to $<AND> must resolve to either '0' or '1'.")
    );
    assert!(
        first_error("$<OR:2>").contains("Parameters to $<OR> must resolve to either '0' or '1'.")
    );
    assert!(
        first_error("$<NOT:true>")
            .contains("$<NOT> parameter must resolve to exactly one '0' or '1' value.")
    );
}

#[test]
fn bool_recognises_false_constants() {
    for value in ["", "0", "OFF", "no", "False", "N", "IGNORE", "NOTFOUND", "zlib-NOTFOUND"] {
        assert_eq!(output(&format!("$<BOOL:{value}>")), "0", "{value} is false");
    }
    for value in ["1", "ON", "yes", "TRUE", "42", "anything"] {
        assert_eq!(output(&format!("$<BOOL:{value}>")), "1", "{value} is true");
    }
}

#[test]
fn string_and_integer_equality() {
    assert_eq!(output("$<STREQUAL:abc,abc>"), "1");
    assert_eq!(output("$<STREQUAL:abc,ABC>"), "0");
    assert_eq!(output("$<STREQUAL:,>"), "1");
    assert_eq!(output("$<EQUAL:10,10>"), "1");
    assert_eq!(output("$<EQUAL:0x10,16>"), "1");
    assert_eq!(output("$<EQUAL:010,8>"), "1");
    assert_eq!(output("$<EQUAL:0b1010,10>"), "1");
    assert_eq!(output("$<EQUAL:0b101,5>"), "1");
    assert_eq!(output("$<EQUAL:-0b101,-5>"), "1");
    assert_eq!(output("$<EQUAL:+0b11,3>"), "1");
    assert_eq!(output("$<EQUAL:1,2>"), "0");
}

#[test]
fn equal_rejects_non_integers() {
    let text = first_error("$<EQUAL:abc,1>");
    assert!(text.contains("$<EQUAL:abc,1>"), "diagnostic quotes the expression: {text}");
    assert!(text.contains("$<EQUAL> parameter abc is not a valid integer."), "{text}");
    assert!(first_error("$<EQUAL:12abc,12>").contains("parameter 12abc is not a valid integer"));
}

#[test]
fn parameter_counts_are_enforced() {
    assert!(
        first_error("$<STREQUAL:a,b,c>")
            .contains("$<STREQUAL> expression requires 2 comma separated parameters, but got 3 instead.")
    );
    assert!(first_error("$<NOT>").contains("$<NOT> expression requires exactly one parameter."));
    assert!(first_error("$<AND>").contains("$<AND> expression requires at least one parameter."));
    assert!(
        first_error("$<CONFIG:a,b>")
            .contains("$<CONFIG> expression requires one or zero parameters.")
    );
    assert!(first_error("$<COMMA:x>").contains("$<COMMA> expression requires no parameters."));
    assert!(first_error("$<0>").contains("$<0> expression requires a parameter."));
}

#[test]
fn unknown_identifiers_are_errors() {
    let text = first_error("$<NO_SUCH_THING:x>");
    assert!(text.contains("Expression did not evaluate to a known generator expression"), "{text}");
    assert!(first_error("$<lower_case:X>").contains("known generator expression"));
}

#[test]
fn identifiers_may_be_computed() {
    assert_eq!(output("$<$<1:UPPER>_CASE:abc>"), "ABC");
}

#[test]
fn string_transforms() {
    assert_eq!(output("$<LOWER_CASE:MiXeD>"), "mixed");
    assert_eq!(output("$<UPPER_CASE:MiXeD>"), "MIXED");
    assert_eq!(output("$<MAKE_C_IDENTIFIER:1foo-bar.h>"), "_1foo_bar_h");
    assert_eq!(output("$<ANGLE-R>$<COMMA>$<SEMICOLON>"), ">,;");
    assert_eq!(output("$<JOIN:a;b;c, -I>"), "a -Ib -Ic");
    assert_eq!(output("$<JOIN:a;;b,$<COMMA>>"), "a,b");
    assert_eq!(output("$<JOIN:x;y,a,b>"), "xa,by", "the separator keeps its commas");
}

#[test]
fn version_comparisons() {
    assert_eq!(output("$<VERSION_GREATER:1.10,1.9>"), "1");
    assert_eq!(output("$<VERSION_LESS:1.9,1.10>"), "1");
    assert_eq!(output("$<VERSION_EQUAL:1.2,1.2.0>"), "1");
    assert_eq!(output("$<VERSION_GREATER:1.2,1.2>"), "0");
}

#[test]
fn configuration_queries() {
    assert_eq!(output("$<CONFIGURATION>"), "Debug");
    assert_eq!(output("$<CONFIG>"), "Debug");
    assert_eq!(output("$<CONFIG:debug>"), "1");
    assert_eq!(output("$<CONFIG:Release>"), "0");
    assert!(first_error("$<CONFIG:Rel-With>").contains("Expression syntax not recognized."));

    let project = Project::new();
    let outcome = CompiledExpression::parse("$<CONFIG:Debug>")
        .unwrap()
        .evaluate(&project, "Debug", false, None, None, None);
    assert!(outcome.had_context_sensitive_condition);

    let outcome = CompiledExpression::parse("$<CONFIG:>")
        .unwrap()
        .evaluate(&project, "", false, None, None, None);
    assert_eq!(outcome.output, "1", "no configuration matches the empty name");
}

#[test]
fn platform_id_reads_the_system_name() {
    let project = Project::new().define("CMAKE_SYSTEM_NAME", "Linux");
    assert_eq!(evaluate(&project, "$<PLATFORM_ID>").output, "Linux");
    assert_eq!(evaluate(&project, "$<PLATFORM_ID:Linux>").output, "1");
    assert_eq!(evaluate(&project, "$<PLATFORM_ID:Windows>").output, "0");
}

#[test]
fn quiet_evaluations_only_set_the_flag() {
    let project = Project::new();
    let outcome = CompiledExpression::parse("$<NOT:2>")
        .unwrap()
        .evaluate(&project, "Debug", true, None, None, None);
    assert!(outcome.had_error);
    assert!(outcome.output.is_empty());
    assert!(project.diagnostics().messages().is_empty());
}

#[test]
fn the_first_error_aborts_the_evaluation() {
    let project = Project::new();
    let outcome = evaluate(&project, "$<NOT:2>$<AND:x>");
    assert!(outcome.had_error);
    assert_eq!(
        project.diagnostics().errors().count(),
        1,
        "evaluation stops after the first failure"
    );
}

#[test]
fn nesting_depth_is_bounded() {
    let project = Project::new();
    let options = EvaluatorOptions {
        max_depth: 3,
        ..EvaluatorOptions::default()
    };
    let compiled = CompiledExpression::parse("$<1:$<1:$<1:x>>>").unwrap();
    let outcome = compiled.evaluate_with(
        EvaluationContext::new(&project, "Debug").with_options(&options),
        None,
    );
    assert_eq!(outcome.output, "x");

    let compiled = CompiledExpression::parse("$<1:$<1:$<1:$<1:x>>>>").unwrap();
    let outcome = compiled.evaluate_with(
        EvaluationContext::new(&project, "Debug").with_options(&options),
        None,
    );
    assert!(outcome.had_error);
    assert!(
        project
            .diagnostics()
            .errors()
            .any(|d| d.text.contains("Maximum generator expression recursion depth of 3 exceeded."))
    );
}

#[test]
fn evaluation_is_repeatable() {
    let project = Project::new();
    let compiled =
        CompiledExpression::parse("$<$<CONFIG:Debug>:-g>$<$<CONFIG:Release>:-O3>").unwrap();
    let first = compiled.evaluate(&project, "Debug", false, None, None, None);
    let second = compiled.evaluate(&project, "Debug", false, None, None, None);
    assert_eq!(first, second);
    assert_eq!(first.output, "-g");
    assert_eq!(compiled.evaluate(&project, "Release", false, None, None, None).output, "-O3");
}
