use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use bevy_metaballs::{MetaballField, SurfaceExtractor, types::Point};

fn refresh_and_extract(field: &mut MetaballField, extractor: &mut SurfaceExtractor, t: f32) -> usize {
    let balls = [
        Point::new(t.cos(), 0., t.sin()),
        Point::new(-t.cos(), t.sin() * 0.5, 0.),
        Point::new(0., t.cos(), -t.sin()),
    ];
    field.refresh(&balls).unwrap();
    extractor.extract_surface(field).unwrap().triangle_count()
}

fn metaball_benchmark(c: &mut Criterion) {
    let mut field = MetaballField::new(1.);
    let mut extractor = SurfaceExtractor::default();
    let mut t = 0.0_f32;
    c.bench_function("metaballs tick", |b| {
        b.iter(|| {
            t += 0.016;
            black_box(refresh_and_extract(&mut field, &mut extractor, t))
        })
    });

    let mut fine = SurfaceExtractor::new(60);
    c.bench_function("metaballs tick at resolution 60", |b| {
        b.iter(|| black_box(refresh_and_extract(&mut field, &mut fine, 1.)))
    });
}

criterion_group!(benches, metaball_benchmark);
criterion_main!(benches);
