pub mod feed;
pub mod oracle;
pub mod polymarket;
pub mod pyth;

pub use feed::{FeedAdapter, StaticFeed};
pub use oracle::PriceOracle;
pub use polymarket::PolymarketFeed;
pub use pyth::PythOracle;
