pub mod loader;
pub mod model;

pub use loader::{flatten_keywords, load_keywords, parse_keywords, KeywordFormat};
pub use model::{Taxonomy, TaxonomyEntry, MISCELLANEOUS};
