//! Pixel storage and triangle rasterization.

pub mod framebuffer;
pub mod rasterizer;
pub mod target;
pub mod zbuffer;

pub use framebuffer::FrameBuffer;
pub use rasterizer::{
    composite, rasterize_line, FillStats, Fragment, Pixel, ProjectedVertex, Rasterizer,
    ScanlineRasterizer, SkipReason, SpanTable, SpanTableBuilder, Triangle,
};
pub use target::RenderTarget;
pub use zbuffer::ZBuffer;
