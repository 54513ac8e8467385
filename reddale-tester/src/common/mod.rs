pub mod util;

pub use util::{FileCatalog, split_csv};
