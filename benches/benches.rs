use blurry::{blur, BlurConfig, Color, PixelBuffer, StackBlur};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

fn make_buffer(width: u32, height: u32) -> PixelBuffer {
    let mut rng = rand::thread_rng();
    let pixels = (0..width * height)
        .map(|_| [rng.gen(), rng.gen(), rng.gen(), 255])
        .collect();
    PixelBuffer::from_pixels(width, height, pixels).unwrap()
}

fn bench_stack_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("stack_blur");
    let input = make_buffer(640, 480);
    for radius in [2, 10, 25, 100] {
        let engine = StackBlur::new(radius).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(radius), &engine, |b, engine| {
            b.iter(|| {
                let mut buf = input.clone();
                engine.blur(black_box(&mut buf));
                buf
            })
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let input = make_buffer(1080, 1920);
    for sampling in [1, 4, 8] {
        let config = BlurConfig::new(1080, 1920)
            .with_radius(25)
            .with_sampling(sampling)
            .with_tint(Color::rgba(0, 0, 0, 64));
        group.bench_with_input(BenchmarkId::from_parameter(sampling), &config, |b, config| {
            b.iter(|| blur(black_box(&input), black_box(config)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_stack_blur, bench_pipeline);
criterion_main!(benches);
