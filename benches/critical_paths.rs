//! Criterion benchmarks for Pixel Studio critical paths
//!
//! Benchmarks the operations that run per gesture or per import:
//! - Color: CSS color parsing (hex and functional)
//! - Fill: flood fill on open and maze-like canvases
//! - Slicer: cutting sheets into frames
//! - Runtime: ticking and composing the playback view

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};
use pixelstudio::color::parse_color;
use pixelstudio::fill::flood_fill;
use pixelstudio::frames::FrameSet;
use pixelstudio::group::{AnimationGroup, GroupId, SliceConfig};
use pixelstudio::runtime::{PlaybackSettings, Runtime};
use pixelstudio::slicer::slice;
use std::time::Duration;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Canvas with a one-pixel wall on every other column, opened alternately at
/// the top and bottom, so a fill has to snake through every column.
fn make_maze(size: u32) -> RgbaImage {
    let wall = Rgba([0, 0, 0, 255]);
    let mut image = RgbaImage::new(size, size);
    for x in (1..size).step_by(2) {
        let gap = if (x / 2) % 2 == 0 { size - 1 } else { 0 };
        for y in 0..size {
            if y != gap {
                image.put_pixel(x, y, wall);
            }
        }
    }
    image
}

fn make_sheet(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, (x ^ y) as u8, 255]))
}

fn make_group(name: &str, frames: u32, size: u32) -> AnimationGroup {
    let sheet = make_sheet(size * frames, size);
    let frames = slice(&sheet, SliceConfig::new(1, frames)).expect("bench sheet slices");
    AnimationGroup::new(GroupId::generate(name), name, frames, None)
}

// =============================================================================
// Color Parsing Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");

    group.bench_function("parse_hex_6", |b| b.iter(|| parse_color(black_box("#3b82f6"))));

    // CSS functional formats (uses lightningcss)
    group.bench_function("parse_rgb", |b| b.iter(|| parse_color(black_box("rgb(59, 130, 246)"))));

    group.bench_function("parse_named", |b| b.iter(|| parse_color(black_box("red"))));

    group.finish();
}

// =============================================================================
// Flood Fill Benchmarks
// =============================================================================

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");
    let blue = Rgba([0x3b, 0x82, 0xf6, 255]);

    for size in [16u32, 32, 64, 128].iter() {
        group.throughput(Throughput::Elements((*size * *size) as u64));
        group.bench_with_input(BenchmarkId::new("blank", size), size, |b, &size| {
            let blank = RgbaImage::new(size, size);
            b.iter(|| {
                let mut canvas = blank.clone();
                flood_fill(&mut canvas, black_box(size / 2), black_box(size / 2), blue)
            })
        });

        group.bench_with_input(BenchmarkId::new("maze", size), size, |b, &size| {
            let maze = make_maze(size);
            b.iter(|| {
                let mut canvas = maze.clone();
                flood_fill(&mut canvas, black_box(0), black_box(0), blue)
            })
        });
    }

    group.finish();
}

// =============================================================================
// Slicer Benchmarks
// =============================================================================

fn bench_slicer(c: &mut Criterion) {
    let mut group = c.benchmark_group("slicer");

    for (rows, cols, cell) in [(1u32, 6u32, 32u32), (4, 8, 32), (8, 8, 64)].iter() {
        let sheet = make_sheet(cols * cell, rows * cell);
        let name = format!("slice_{}x{}_{}px", rows, cols, cell);
        group.throughput(Throughput::Elements((rows * cols) as u64));
        group.bench_function(&name, |b| b.iter(|| slice(black_box(&sheet), SliceConfig::new(*rows, *cols))));
    }

    // Frame encoding alone, which dominates slicing for large cells
    let frames: Vec<RgbaImage> = (0..8).map(|_| make_sheet(64, 64)).collect();
    group.bench_function("encode_8_frames_64px", |b| {
        b.iter(|| FrameSet::from_images(black_box(frames.clone())))
    });

    group.finish();
}

// =============================================================================
// Runtime Benchmarks
// =============================================================================

fn bench_runtime(c: &mut Criterion) {
    let mut group = c.benchmark_group("runtime");

    for sprites in [1usize, 8, 32].iter() {
        let groups: Vec<AnimationGroup> = (0..*sprites).map(|i| make_group(&format!("g{}", i), 6, 32)).collect();
        let mut runtime = Runtime::new(PlaybackSettings::default());
        for g in &groups {
            runtime.activate(g);
        }

        group.bench_with_input(BenchmarkId::new("tick", sprites), sprites, |b, _| {
            b.iter(|| runtime.tick(black_box(Duration::from_millis(16))))
        });

        let runtime = runtime.clone();
        group.bench_with_input(BenchmarkId::new("render", sprites), sprites, |b, _| {
            b.iter(|| runtime.render(black_box(&groups)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_color, bench_fill, bench_slicer, bench_runtime);

criterion_main!(benches);
