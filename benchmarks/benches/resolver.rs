//! Project resolution benchmarks using Criterion

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use filebridge_benchmarks::{deepest_project_dir, nested_solution};
use filebridge_core::{
    best_guess_project, default_buildable_kinds, enumerate_projects, find_project_by_directory, owning_project,
    parse_solution, SessionSignals,
};
use tempfile::TempDir;

fn sln_text(projects: usize) -> String {
    let mut out = String::from("Microsoft Visual Studio Solution File, Format Version 12.00\n");
    for i in 0..projects {
        out.push_str(&format!(
            "Project(\"{{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}}\") = \"P{i}\", \"src\\P{i}\\P{i}.csproj\", \"{{00000000-0000-0000-0000-{i:012}}}\"\nEndProject\n"
        ));
    }
    out
}

fn resolver_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolver");
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    let solution = nested_solution(root, 8, 10);
    let target = deepest_project_dir(root, 8, 10);

    group.bench_function("find_by_directory_depth_8", |b| {
        b.iter(|| black_box(find_project_by_directory(&solution.nodes, &target)))
    });

    let document = target.join("Features").join("Login.feature");
    group.bench_function("owning_project_depth_8", |b| {
        b.iter(|| black_box(owning_project(&solution.nodes, &document)))
    });

    let session = SessionSignals {
        startup_project: Some("missing".to_string()),
        ..Default::default()
    };
    let kinds = default_buildable_kinds();
    group.bench_function("best_guess_fallthrough", |b| {
        b.iter(|| black_box(best_guess_project(&solution, &session, &kinds).map(|g| g.source)))
    });

    group.bench_function("enumerate_90_projects", |b| {
        b.iter(|| black_box(enumerate_projects(&solution.nodes)))
    });

    let text = sln_text(200);
    group.bench_function("parse_sln_200_projects", |b| {
        b.iter(|| black_box(parse_solution(&text, root).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, resolver_benchmarks);
criterion_main!(benches);
