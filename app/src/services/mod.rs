//! Application services: the transform pipeline and result delivery.

pub mod output;
pub mod transform;

pub use output::{Delivery, OutputMode, OutputSink, Report, Status};
pub use transform::{Rendered, TransformError, Transformer};
