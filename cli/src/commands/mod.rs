pub mod annotate;
pub mod flatten;
pub mod model;
