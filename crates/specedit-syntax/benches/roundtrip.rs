use criterion::{Criterion, criterion_group, criterion_main};
use specedit_syntax::{parse, render_to_string, tokenize};

/// A spec with `packages` subpackages, each with its own description,
/// scriptlet and file list, plus a long changelog.
fn generate_spec(packages: usize) -> String {
    let mut spec = String::from(
        "%global commit 0123456789abcdef\n\nName: bench\nVersion: 1.0\nRelease: 1%{?dist}\nSummary: Benchmark\nLicense: MIT\n\n",
    );
    for i in 0..packages {
        spec.push_str(&format!("BuildRequires: pkgconfig(lib{i}) >= 1.{i}\n"));
    }
    spec.push_str("\n%description\nBenchmark package.\n\n");
    for i in 0..packages {
        spec.push_str(&format!(
            "%package sub{i}\nSummary: Sub package {i}\nRequires: %{{name}} = %{{version}}\n\n%description sub{i}\nSub package number {i}.\n\n"
        ));
    }
    spec.push_str("%prep\n%autosetup\n\n%build\n%make_build\n\n%install\n%make_install\n\n");
    for i in 0..packages {
        spec.push_str(&format!("%post sub{i}\n/sbin/ldconfig # sub{i}\n\n"));
    }
    spec.push_str("%files\n%{_bindir}/bench\n\n");
    for i in 0..packages {
        spec.push_str(&format!("%files sub{i}\n%{{_libdir}}/libsub{i}.so.*\n\n"));
    }
    spec.push_str("%changelog\n");
    for _ in 0..packages {
        spec.push_str("* Mon Jan 01 2024 Bench Mark <bench@example.com> - 1.0-1\n- Entry with Requires: inline\n\n");
    }
    spec
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");
    group.sample_size(10);

    let content = generate_spec(100);

    group.bench_function("tokenize", |b| {
        b.iter(|| {
            let stream = tokenize(std::hint::black_box(&content));
            std::hint::black_box(stream);
        });
    });

    group.bench_function("parse", |b| {
        b.iter(|| {
            let model = parse(std::hint::black_box(&content)).expect("generated spec parses");
            std::hint::black_box(model);
        });
    });

    let model = parse(&content).expect("generated spec parses");
    group.bench_function("render", |b| {
        b.iter(|| {
            let text = render_to_string(std::hint::black_box(&model)).expect("model renders");
            std::hint::black_box(text);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
