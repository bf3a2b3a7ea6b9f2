//! Render-pass driver.
//!
//! The [`Engine`] owns a [`RenderConfig`] and runs the whole pipeline for a
//! mesh: calibrate, project every vertex once, assemble screen triangles, then
//! scan-convert and composite them into fresh buffers.
//!
//! With `threads > 1` the buffers are cut into horizontal bands, one scoped
//! thread per band. Every band walks all triangles in submission order and
//! only touches its own rows, so each pixel sees the same depth tests in the
//! same order as a sequential pass and the result is bit-identical.

use std::ops::Range;
use std::thread;

use indicatif::{ProgressBar, ProgressStyle};

use crate::camera::{Camera, CameraCalibrator};
use crate::colors::Color;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::mesh::Mesh;
use crate::projection::{ProjectedPoint, Projector};
use crate::render::{
    FillStats, FrameBuffer, Rasterizer, RenderTarget, ScanlineRasterizer, Triangle, ZBuffer,
};

/// Snapped coordinates may reach this many viewport sizes away from the
/// origin before a triangle is rejected.
const GUARD_BAND_FACTOR: i64 = 16;

/// Counters for one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Faces in the mesh.
    pub submitted: usize,
    /// Triangles handed to the rasterizer.
    pub drawn: usize,
    /// Triangles dropped during assembly.
    pub skipped: usize,
    pub fragments_tested: u64,
    pub fragments_written: u64,
}

/// Everything a render pass produces.
#[derive(Debug)]
pub struct RenderOutput {
    pub camera: Camera,
    pub frame: FrameBuffer,
    pub depth: ZBuffer,
    pub stats: RenderStats,
}

pub struct Engine<R: Rasterizer = ScanlineRasterizer> {
    config: RenderConfig,
    rasterizer: R,
}

impl Engine {
    pub fn new(config: RenderConfig) -> Self {
        Self::with_rasterizer(config, ScanlineRasterizer::new())
    }
}

impl<R: Rasterizer + Sync> Engine<R> {
    pub fn with_rasterizer(config: RenderConfig, rasterizer: R) -> Self {
        Self { config, rasterizer }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn calibrator(&self) -> CameraCalibrator {
        CameraCalibrator::new(self.config.preset, self.config.standoff)
    }

    /// Calibrate a camera for `mesh` and render it.
    pub fn render(&self, mesh: &Mesh) -> Result<RenderOutput, RenderError> {
        let camera = self
            .calibrator()
            .calibrate(&mesh.positions(), &self.config.viewport)?;
        self.render_with_camera(mesh, &camera)
    }

    /// Render `mesh` through an already built camera.
    ///
    /// Every face is checked before anything is drawn, so an out-of-range
    /// vertex index fails the pass with untouched buffers.
    pub fn render_with_camera(
        &self,
        mesh: &Mesh,
        camera: &Camera,
    ) -> Result<RenderOutput, RenderError> {
        let projector = Projector::new(camera);
        let points = projector.project_all(&mesh.positions());

        let undefined = points.iter().filter(|p| p.pixel.is_none()).count();
        if undefined > 0 {
            log::warn!(
                "{} vertices have zero camera depth; their triangles will be skipped.",
                undefined
            );
        }

        let (triangles, skipped) = self.assemble(mesh, &points)?;

        let buffers = self.config.buffer_config();
        let mut frame = FrameBuffer::new(&buffers);
        let mut depth = ZBuffer::new(&buffers);
        let fill = self.draw_triangles(&triangles, &mut frame, &mut depth);

        let stats = RenderStats {
            submitted: mesh.face_count(),
            drawn: triangles.len(),
            skipped,
            fragments_tested: fill.tested,
            fragments_written: fill.written,
        };
        log::info!(
            "Rendered {} of {} triangles ({} skipped), {} of {} fragments written.",
            stats.drawn,
            stats.submitted,
            stats.skipped,
            stats.fragments_written,
            stats.fragments_tested
        );

        Ok(RenderOutput {
            camera: *camera,
            frame,
            depth,
            stats,
        })
    }

    /// Scan-convert `triangles` in order into the given buffers.
    pub fn draw_triangles(
        &self,
        triangles: &[Triangle],
        frame: &mut FrameBuffer,
        zbuffer: &mut ZBuffer,
    ) -> FillStats {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        if width == 0 || height == 0 {
            return FillStats::default();
        }

        let band_rows = height.div_ceil(self.config.threads.clamp(1, height));
        let bands = height.div_ceil(band_rows);
        let progress = self.progress_bar((triangles.len() * bands) as u64);

        let stats = if bands == 1 {
            let mut target = RenderTarget::new(frame, zbuffer);
            self.fill_band(triangles, &mut target, &progress)
        } else {
            let chunk = band_rows * width;
            let progress = &progress;

            thread::scope(|scope| {
                let handles: Vec<_> = frame
                    .pixels_mut()
                    .chunks_mut(chunk)
                    .zip(zbuffer.depths_mut().chunks_mut(chunk))
                    .enumerate()
                    .map(|(i, (color, depth))| {
                        let first_row = (i * band_rows) as u32;
                        scope.spawn(move || {
                            let mut target =
                                RenderTarget::band(color, depth, width as u32, first_row);
                            self.fill_band(triangles, &mut target, progress)
                        })
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                    .fold(FillStats::default(), |acc, s| acc + s)
            })
        };

        progress.finish_and_clear();
        stats
    }

    fn fill_band(
        &self,
        triangles: &[Triangle],
        target: &mut RenderTarget,
        progress: &ProgressBar,
    ) -> FillStats {
        let band = target.rows();
        let mut stats = FillStats::default();
        for triangle in triangles {
            if overlaps(&triangle.rows(), &band) {
                stats += self.rasterizer.fill_triangle(&triangle.vertices, target);
            }
            progress.inc(1);
        }
        stats
    }

    /// Resolve every face to a screen triangle. Degenerate triangles are
    /// counted and dropped; a bad index aborts.
    fn assemble(
        &self,
        mesh: &Mesh,
        points: &[ProjectedPoint],
    ) -> Result<(Vec<Triangle>, usize), RenderError> {
        let vertices = mesh.vertices();
        let guard = self.guard_band();
        let mut triangles = Vec::with_capacity(mesh.face_count());
        let mut skipped = 0;

        for (face_index, face) in mesh.faces().iter().enumerate() {
            let resolve = |index: u32| -> Result<(ProjectedPoint, Color), RenderError> {
                let i = index as usize;
                let vertex = vertices.get(i).ok_or(RenderError::Index {
                    face: face_index,
                    index,
                    vertex_count: vertices.len(),
                })?;
                Ok((points[i], vertex.color.unwrap_or(self.config.default_color)))
            };
            let [a, b, c] = face.indices();
            let (pa, ca) = resolve(a)?;
            let (pb, cb) = resolve(b)?;
            let (pc, cc) = resolve(c)?;

            match Triangle::assemble([pa, pb, pc], [ca, cb, cc], guard) {
                Ok(triangle) => triangles.push(triangle),
                Err(reason) => {
                    log::debug!("Skipping triangle {}: {}.", face_index, reason);
                    skipped += 1;
                }
            }
        }

        Ok((triangles, skipped))
    }

    fn guard_band(&self) -> i32 {
        let viewport = &self.config.viewport;
        let size = viewport.width.max(viewport.height).max(1) as i64;
        (size * GUARD_BAND_FACTOR).min(i32::MAX as i64 / 4) as i32
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} triangles")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress
    }
}

fn overlaps(a: &Range<i32>, b: &Range<i32>) -> bool {
    a.start < b.end && b.start < a.end
}
