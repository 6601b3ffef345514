mod error;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use traits::{EntryStore, UserStore};
pub use types::ListFilter;
