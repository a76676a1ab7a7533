pub mod context;
pub mod error;

pub use context::AppContext;
pub use error::{
    CatalogError, ErrorKind, FerryError, FetchError, ImportError, Result, ScrapeError,
};
