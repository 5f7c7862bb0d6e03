//! Converters built from other converters.

mod fallback;
mod for_each;
mod parallel;
mod pipeline;

pub use fallback::Try;
pub use for_each::ForEach;
pub use parallel::Parallel;
pub use pipeline::Pipeline;
