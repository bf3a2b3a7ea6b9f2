use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use meshraster::colors::{BLACK, RED};
use meshraster::math::vec3::Vec3;
use meshraster::render::{
    rasterize_line, FrameBuffer, Pixel, ProjectedVertex, Rasterizer, RenderTarget,
    ScanlineRasterizer, ZBuffer,
};
use meshraster::{BufferConfig, Engine, Face, Mesh, RenderConfig, Viewport};

const BUFFER_WIDTH: u32 = 800;
const BUFFER_HEIGHT: u32 = 600;

fn vertex(x: i32, y: i32, depth: f32) -> ProjectedVertex {
    ProjectedVertex::new(Pixel::new(x, y), depth, RED)
}

fn small_triangle() -> [ProjectedVertex; 3] {
    [vertex(100, 100, 1.0), vertex(120, 100, 2.0), vertex(110, 120, 3.0)]
}

fn medium_triangle() -> [ProjectedVertex; 3] {
    [vertex(100, 100, 1.0), vertex(300, 100, 2.0), vertex(200, 300, 3.0)]
}

fn large_triangle() -> [ProjectedVertex; 3] {
    [vertex(50, 50, 1.0), vertex(750, 100, 2.0), vertex(400, 550, 3.0)]
}

/// A wavy sheet of `n * n` quads facing a Z-up camera.
fn terrain(n: u32) -> Mesh {
    let mut positions = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
    for j in 0..=n {
        for i in 0..=n {
            let (u, v) = (i as f32 / n as f32, j as f32 / n as f32);
            let bump = 0.1 * (u * 12.0).sin() * (v * 9.0).cos();
            positions.push(Vec3::new(u, bump, v));
        }
    }
    let mut faces = Vec::with_capacity((2 * n * n) as usize);
    for j in 0..n {
        for i in 0..n {
            let a = j * (n + 1) + i;
            let b = a + 1;
            let c = a + n + 1;
            let d = c + 1;
            faces.push(Face::new(a, b, d));
            faces.push(Face::new(a, d, c));
        }
    }
    Mesh::from_parts(&positions, None, faces)
}

fn benchmark_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("line");
    for (name, end) in [
        ("shallow", Pixel::new(700, 210)),
        ("steep", Pixel::new(130, 580)),
        ("reversed", Pixel::new(-600, -300)),
    ] {
        group.bench_with_input(BenchmarkId::new("bresenham", name), &end, |b, &end| {
            b.iter(|| rasterize_line(black_box(Pixel::new(10, 10)), black_box(end)));
        });
    }
    group.finish();
}

fn benchmark_single_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_triangle");
    let config = BufferConfig::new(BUFFER_WIDTH, BUFFER_HEIGHT, BLACK);
    let scanline = ScanlineRasterizer::new();

    for (name, triangle) in [
        ("small", small_triangle()),
        ("medium", medium_triangle()),
        ("large", large_triangle()),
    ] {
        group.bench_with_input(BenchmarkId::new("scanline", name), &triangle, |b, tri| {
            let mut frame = FrameBuffer::new(&config);
            let mut zbuffer = ZBuffer::new(&config);
            b.iter(|| {
                zbuffer.clear();
                let mut target = RenderTarget::new(&mut frame, &mut zbuffer);
                scanline.fill_triangle(black_box(tri), &mut target)
            });
        });
    }

    group.finish();
}

fn benchmark_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh");
    group.sample_size(20);
    let mesh = terrain(64);

    for threads in [1, 4] {
        let config = RenderConfig::default()
            .with_viewport(Viewport::new(BUFFER_WIDTH, BUFFER_HEIGHT))
            .with_threads(threads);
        let engine = Engine::new(config);
        group.bench_with_input(BenchmarkId::new("terrain_8k", threads), &mesh, |b, mesh| {
            b.iter(|| engine.render(black_box(mesh)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_line, benchmark_single_triangle, benchmark_mesh);
criterion_main!(benches);
