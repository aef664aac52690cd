//! Benchmark: wide and single-byte marshaling hot paths.
//!
//! Run with: `cargo bench -p ncbind-marshal --bench marshal_bench`
//!
//! Measures per-line encode/decode cost for an 80-column row, the unit of
//! work for a full-screen redraw, plus the erased factory's boxing overhead.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ncbind_abi::{Chtype32Wchar16, Chtype32Wchar32, LayoutKind};
use ncbind_core::{Attrs, Config, TextEncoding};
use ncbind_marshal::{Marshal, Terminator, erased};

fn ascii_row() -> String {
    "The quick brown fox jumps over the lazy dog. ".repeat(2)[..80].to_owned()
}

fn mixed_row() -> String {
    "héllo ☺ wörld 😀 ".chars().cycle().take(80).collect()
}

// ===========================================================================
// Wide cells
// ===========================================================================

fn bench_wide(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_row");
    let wide = Marshal::<Chtype32Wchar32>::new(TextEncoding::Utf8);
    let narrow = Marshal::<Chtype32Wchar16>::new(TextEncoding::Utf8);

    for (label, row) in [("ascii", ascii_row()), ("mixed", mixed_row())] {
        group.bench_function(format!("encode/wchar32/{label}"), |b| {
            b.iter(|| {
                black_box(wide.encode_string(black_box(&row), Attrs::BOLD, 3, Terminator::Append))
            });
        });
        group.bench_function(format!("encode/wchar16/{label}"), |b| {
            b.iter(|| {
                black_box(narrow.encode_string(black_box(&row), Attrs::BOLD, 3, Terminator::Append))
            });
        });

        let Ok(cells) = wide.encode_string(&row, Attrs::BOLD, 3, Terminator::Append) else {
            continue;
        };
        group.bench_function(format!("decode/wchar32/{label}"), |b| {
            b.iter(|| black_box(wide.decode_string(black_box(&cells), cells.len())));
        });
    }

    group.finish();
}

// ===========================================================================
// Single-byte cells
// ===========================================================================

fn bench_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("small_row");
    let m = Marshal::<Chtype32Wchar32>::new(TextEncoding::Utf8);
    let row = ascii_row();

    group.bench_function("encode", |b| {
        b.iter(|| black_box(m.encode_small_string(black_box(&row), Attrs::NORMAL, 0, Terminator::Append)));
    });

    let Ok(cells) = m.encode_small_string(&row, Attrs::NORMAL, 0, Terminator::Append) else {
        return;
    };
    group.bench_function("decode", |b| {
        b.iter(|| black_box(m.decode_small_string(black_box(&cells), cells.len())));
    });

    group.finish();
}

// ===========================================================================
// Erased factory
// ===========================================================================

fn bench_erased(c: &mut Criterion) {
    let mut group = c.benchmark_group("erased_factory");
    let factory = erased(LayoutKind::Chtype32Wchar32, &Config::default());
    let row = mixed_row();

    group.bench_function("get_char", |b| {
        b.iter(|| black_box(factory.get_char(black_box('☺'), Attrs::BOLD, 1)));
    });
    group.bench_function("get_string", |b| {
        b.iter(|| black_box(factory.get_string(black_box(&row), Attrs::BOLD, 1)));
    });

    group.finish();
}

criterion_group!(benches, bench_wide, bench_small, bench_erased);
criterion_main!(benches);
