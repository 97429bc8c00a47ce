pub mod fetcher;
pub mod traits;

pub use fetcher::HttpFeedSource;
pub use traits::FeedSource;
