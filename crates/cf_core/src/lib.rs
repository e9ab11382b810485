pub mod error;
pub mod source;
pub mod storage;
pub mod types;

pub use error::Error;
pub use source::{NewsSource, SearchQuery};
pub use storage::ArticleStorage;
pub use types::{has_image, Article, RawArticle, NO_VALUE_PLACEHOLDER};

pub type Result<T> = std::result::Result<T, Error>;
