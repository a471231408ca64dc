use criterion::{Criterion, black_box, criterion_group, criterion_main};

use genex::{
    CompiledExpression,
    memory::{Project, TargetDef},
    model::{Target, TargetType},
};

const FLAGS: &str = "$<$<CONFIG:Debug>:-g;-O0>$<$<CONFIG:Release>:-O3>;$<$<AND:$<BOOL:ON>,$<NOT:0>>:-Wall>;\
$<JOIN:a;b;c;d,$<COMMA>>;$<UPPER_CASE:$<MAKE_C_IDENTIFIER:my-lib.h>>";

/// A chain of `depth` static libraries, each publishing include directories
/// to the next, below one executable.
fn chain_project(depth: usize) -> Project {
    let mut project = Project::new().target(
        TargetDef::new("app", TargetType::Executable).with_link_libraries(&["lib0"]),
    );
    for index in 0..depth {
        let name = format!("lib{index}");
        let next = format!("lib{}", index + 1);
        let mut library = TargetDef::new(name.clone(), TargetType::StaticLibrary)
            .with_property("INTERFACE_INCLUDE_DIRECTORIES", format!("/src/{name}/include"));
        if index + 1 < depth {
            library = library.with_link_libraries(&[next.as_str()]);
        }
        project = project.target(library);
    }
    project
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_flags", |b| {
        b.iter(|| CompiledExpression::parse(black_box(FLAGS)))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let project = Project::new();
    let compiled = CompiledExpression::parse(FLAGS).expect("benchmark input parses");
    c.bench_function("evaluate_flags", |b| {
        b.iter(|| compiled.evaluate(&project, black_box("Debug"), false, None, None, None))
    });
}

fn bench_transitive(c: &mut Criterion) {
    let project = chain_project(32);
    let head = project.get("app").map(|t| t as &dyn Target);
    let compiled = CompiledExpression::parse("$<TARGET_PROPERTY:INCLUDE_DIRECTORIES>")
        .expect("benchmark input parses");
    c.bench_function("evaluate_transitive_chain_32", |b| {
        b.iter(|| compiled.evaluate(&project, "Debug", true, head, head, None))
    });
}

criterion_group!(benches, bench_parse, bench_evaluate, bench_transitive);
criterion_main!(benches);
