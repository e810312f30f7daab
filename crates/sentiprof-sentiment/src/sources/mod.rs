//! Clients for the ticker and news search services.

pub mod news;
pub mod ticker;

pub use news::NewsFetcher;
pub use ticker::TickerResolver;
