//! Performance benchmarks for the asm.js compile pipeline.
//!
//! This benchmark suite measures parse + validate + emit time across:
//! - Size-based: generated modules from 1 to 1000 functions
//! - Feature-specific: heap access, control flow, tables, SIMD
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect detailed phase timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```
//!
//! After running, check the printed summary for the parse, declarations and
//! functions phases.
//!
//! ## Quick Phase Timing Test
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- "functions_1000" --test
//! ```

#![allow(clippy::collapsible_if)]

use asmjs::{CompilerOptions, compile, compile_with_options};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::fmt::Write;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
use std::collections::HashMap;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

/// Initialize puffin profiler.
#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    // Create the global frame view which registers itself as a sink
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// Recursively collect all scopes (including nested ones)
#[cfg(feature = "profile-with-puffin")]
fn collect_scopes_recursive(
    stream: &puffin::Stream,
    scope: &puffin::Scope,
    scope_collection: &puffin::ScopeCollection,
    scope_timings: &mut HashMap<String, i64>,
) {
    use puffin::Reader;

    // Record this scope's timing
    if let Some(details) = scope_collection.fetch_by_id(&scope.id) {
        let name = details.name().to_string();
        *scope_timings.entry(name).or_insert(0) += scope.record.duration_ns;
    }

    // Read children if any
    if scope.child_begin_position < scope.child_end_position {
        if let Ok(reader) = Reader::with_offset(stream, scope.child_begin_position) {
            if let Ok(children) = reader.read_top_scopes() {
                for child in children {
                    collect_scopes_recursive(stream, &child, scope_collection, scope_timings);
                }
            }
        }
    }
}

/// Print accumulated profiling statistics for all scopes.
#[cfg(feature = "profile-with-puffin")]
fn print_profiling_stats() {
    use puffin::Reader;

    let Some(frame_view) = FRAME_VIEW.get() else {
        println!("Profiler not initialized");
        return;
    };

    let view = frame_view.lock();
    let scope_collection = view.scope_collection();

    // Accumulate timings across all frames
    let mut scope_timings: HashMap<String, i64> = HashMap::new();
    let mut frame_count = 0i64;

    for frame in view.recent_frames() {
        frame_count += 1;
        let unpacked = match frame.unpacked() {
            Ok(u) => u,
            Err(_) => continue,
        };
        for (_thread_info, stream_info) in unpacked.thread_streams.iter() {
            let reader = Reader::from_start(&stream_info.stream);
            if let Ok(scopes) = reader.read_top_scopes() {
                for scope in scopes {
                    collect_scopes_recursive(
                        &stream_info.stream,
                        &scope,
                        scope_collection,
                        &mut scope_timings,
                    );
                }
            }
        }
    }

    println!("\n=== Profiling Summary ({} frames) ===", frame_count);

    if scope_timings.is_empty() {
        println!("  No scopes recorded.");
        println!("  Make sure profiling::scope! calls exist in the compile pipeline");
    } else {
        // Sort by total time descending
        let mut entries: Vec<_> = scope_timings.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1));

        let total_ns: i64 = entries.iter().map(|(_, ns)| **ns).sum();

        for (name, ns) in &entries {
            let ns = **ns;
            let avg_ns = if frame_count > 0 {
                ns / frame_count
            } else {
                ns
            };
            let pct = if total_ns > 0 {
                ns as f64 / total_ns as f64 * 100.0
            } else {
                0.0
            };
            println!(
                "  {:30} {:>10.2?} avg ({:>5.1}%)",
                name,
                std::time::Duration::from_nanos(avg_ns as u64),
                pct
            );
        }

        if frame_count > 0 {
            let avg_total = total_ns / frame_count;
            println!(
                "  {:30} {:>10.2?}",
                "TOTAL",
                std::time::Duration::from_nanos(avg_total as u64)
            );
        }
    }
    println!("=====================================\n");
}

#[cfg(not(feature = "profile-with-puffin"))]
fn print_profiling_stats() {}

/// A module with `count` small functions that call each other and share a
/// heap view.
fn generated_module(count: usize) -> String {
    let mut source = String::from(
        "function Generated(stdlib, foreign, heap) {\n    \"use asm\";\n\n    \
         var HEAP32 = new stdlib.Int32Array(heap);\n    var imul = stdlib.Math.imul;\n\n",
    );
    for index in 0..count {
        let callee = if index == 0 {
            String::from("(x + 1)|0")
        } else {
            format!("f{}(x)|0", index - 1)
        };
        let _ = write!(
            source,
            "    function f{index}(x) {{\n        x = x|0;\n        var y = 0;\n        \
             y = imul(x, {index})|0;\n        HEAP32[(y & 1023) << 2 >> 2] = y;\n        \
             if ((x|0) > 0) return {callee};\n        return (y + (HEAP32[{slot}]|0))|0;\n    }}\n\n",
            slot = index % 256,
        );
    }
    let _ = write!(source, "    return f{};\n}}\n", count.saturating_sub(1));
    source
}

/// Benchmark compile time across module sizes.
fn size_based_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("module/sizes");

    let hello = include_str!("../test_scripts/hello.js");
    group.throughput(Throughput::Bytes(hello.len() as u64));
    group.bench_function("hello", |b| {
        b.iter(|| black_box(compile(black_box(hello)).unwrap()));
    });

    for count in [10, 100, 1000] {
        let source = generated_module(count);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("functions", count),
            &source,
            |b, source| {
                b.iter(|| {
                    let module = compile(black_box(source)).unwrap();
                    end_profiling_frame();
                    black_box(module.functions.len())
                });
            },
        );
    }

    group.finish();

    print_profiling_stats();
}

/// Benchmark compile time for specific module features.
fn feature_specific_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("module/features");

    let scripts = [
        ("math", include_str!("../test_scripts/math.js")),
        ("heap", include_str!("../test_scripts/heap.js")),
        ("control_flow", include_str!("../test_scripts/control_flow.js")),
        ("tables", include_str!("../test_scripts/tables.js")),
        ("simd", include_str!("../test_scripts/simd.js")),
    ];
    for (name, source) in scripts {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| black_box(compile(black_box(source)).unwrap()));
        });
    }

    group.finish();
}

/// Validation without SIMD, the configuration most hosts ship.
fn options_benchmarks(c: &mut Criterion) {
    let options = CompilerOptions::default().with_simd(false);
    let source = generated_module(100);

    c.bench_function("module/no_simd_100", |b| {
        b.iter(|| black_box(compile_with_options(black_box(&source), &options).unwrap()));
    });
}

criterion_group!(
    benches,
    size_based_benchmarks,
    feature_specific_benchmarks,
    options_benchmarks
);
criterion_main!(benches);
