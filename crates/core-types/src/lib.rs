pub mod bar;
pub mod error;
pub mod series;
pub mod symbol;

// Re-export the core types to provide a clean public API.
pub use bar::Bar;
pub use error::CoreError;
pub use series::Series;
pub use symbol::{Symbol, split_list};
