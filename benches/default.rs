use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use map_atlas::decoder::{self, Center, DecodedMap, Scale};
use map_atlas::dimension::Dimension;
use map_atlas::{compositor, png_store, tile};

fn synthetic_decoded_map(id: u32, x: i32, z: i32) -> DecodedMap {
    let base_rgba: Vec<u8> = (0..decoder::PIXEL_COUNT)
        .flat_map(|i| {
            let v = (i % 200 + 10) as u8;
            [v, v, v, 255]
        })
        .collect();

    DecodedMap {
        id,
        epoch_hint: 0,
        scale: Scale::new(0).unwrap(),
        center: Center { x, z },
        dimension: Dimension::Overworld,
        pixels: decoder::expand_pixels(Scale::new(0).unwrap(), &base_rgba),
        hash: format!("synthetic-{id}"),
        banners: Vec::new(),
        frames: Vec::new(),
    }
}

pub fn bench_composite_and_slice(c: &mut Criterion) {
    let maps_dir = tempfile::tempdir().unwrap();
    let tiles_dir = tempfile::tempdir().unwrap();

    let stored: Vec<_> = (0..16)
        .map(|i| {
            let x = (i % 4) * 128;
            let z = (i / 4) * 128;
            let map = synthetic_decoded_map(i as u32, x, z);
            png_store::write(maps_dir.path(), &map, 1, None).unwrap()
        })
        .collect();

    let mut group = c.benchmark_group("map-atlas");
    group.sample_size(20);
    group.bench_function("composite_bucket", |b| {
        b.iter_batched(
            || stored.iter().collect::<Vec<_>>(),
            |maps| compositor::composite_bucket(black_box((0, 0)), black_box(&maps), false).unwrap(),
            BatchSize::SmallInput,
        )
    });

    let canvas = compositor::composite_bucket((0, 0), &stored.iter().collect::<Vec<_>>(), false).unwrap();
    group.bench_function("slice_bucket", |b| {
        b.iter(|| {
            tile::slice_bucket(
                black_box(tiles_dir.path()),
                black_box(Dimension::Overworld),
                0,
                0,
                black_box(&canvas),
            )
            .unwrap()
        })
    });
    group.finish();
}

pub fn bench_pyramid_reduce(c: &mut Criterion) {
    let maps_dir = tempfile::tempdir().unwrap();
    let tiles_dir = tempfile::tempdir().unwrap();

    let stored: Vec<_> = (0..16)
        .map(|i| {
            let x = (i % 4) * 128;
            let z = (i / 4) * 128;
            let map = synthetic_decoded_map(i as u32, x, z);
            png_store::write(maps_dir.path(), &map, 1, None).unwrap()
        })
        .collect();
    let canvas = compositor::composite_bucket((0, 0), &stored.iter().collect::<Vec<_>>(), false).unwrap();
    tile::slice_bucket(tiles_dir.path(), Dimension::Overworld, 0, 0, &canvas).unwrap();

    let mut group = c.benchmark_group("map-atlas");
    group.sample_size(20);
    group.bench_function("reduce_level", |b| {
        b.iter(|| {
            map_atlas::pyramid::reduce_level(
                black_box(tiles_dir.path()),
                black_box(Dimension::Overworld),
                16,
            )
            .unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_composite_and_slice, bench_pyramid_reduce);
criterion_main!(benches);
