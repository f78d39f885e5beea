//! Slidecast Render Engine
//!
//! Turns a segment registry into rendered clips and a run report.
//!
//! # Pipeline Architecture
//!
//! ```text
//! SegmentRegistry ──► run_all ──┬── render(segment 1) ──► Compositor (ffmpeg) ──► 01_intro.mp4
//!                               ├── render(segment 2) ──► ...
//!                               └── ...
//!                                        │
//!                                        ▼
//!                                   RunSummary ──► report.json / console
//!                                        │
//!                                        ├── captions.vtt
//!                                        └── finalize ──► final.mp4
//! ```
//!
//! Renders run one at a time unless a bounded [`ExecutionStrategy`] is
//! chosen. A failing segment never aborts the run.

pub mod captions;
pub mod compat;
pub mod compositor;
pub mod ffmpeg;
pub mod finalize;
pub mod renderer;
pub mod report;
pub mod runner;

pub use compositor::*;
pub use renderer::*;
pub use report::*;
pub use runner::*;
