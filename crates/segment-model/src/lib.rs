//! Slidecast Segment Model
//!
//! Defines the data contracts of the segment-assembly pipeline:
//! - **Segment:** one slide image plus one narration track, and the
//!   result of rendering it into a clip
//! - **Registry:** the ordered list of segments a run processes
//!
//! Output clips are named `{ordinal:02}_{sanitized_title}.mp4`; see
//! [`segment::output_file_name`].

pub mod registry;
pub mod segment;

pub use registry::*;
pub use segment::*;
