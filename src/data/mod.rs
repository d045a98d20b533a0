//! Data module for loading and aligning prices with sentiment.

mod frame;
mod loader;

pub use frame::{AlignedFrame, PriceTable, SentimentSeries};
pub use loader::{
    load_headlines, load_price_table, load_sentiment_series, parse_timestamp, write_scored_news,
};
