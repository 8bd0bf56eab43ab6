pub mod catalog;
pub mod index;
pub mod source;

mod error;

pub use error::Error;
pub use index::{ContentIndex, ScoredResult, SkipReason, SkippedItem, UpsertReport};
pub use source::{ContentSource, InMemoryContentSource};

use std::{future::Future, pin::Pin};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
