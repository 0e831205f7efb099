use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sp_core::Image;
use sp_profile::{ProfileConfig, extract_profile};

fn build_wavy_mask(width: usize, height: usize) -> Image<u8> {
    let mut data = vec![0u8; width * height];
    for x in 0..width {
        let phase = x as f64 * 0.02;
        let bottom = (height as f64 * 0.6 + 40.0 * phase.sin()) as usize;
        for y in 0..=bottom.min(height - 1) {
            data[y * width + x] = 255;
        }
    }
    Image::from_vec(width, height, data).expect("valid mask")
}

fn bench_extract(c: &mut Criterion) {
    let mask = build_wavy_mask(1920, 1080);
    let view = mask.as_view();
    let cfg = ProfileConfig::default();

    c.bench_function("extract_profile_1920x1080", |b| {
        b.iter(|| {
            let profile = extract_profile(black_box(&view), black_box(&cfg))
                .expect("synthetic mask yields a profile");
            black_box(profile.len());
        });
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
