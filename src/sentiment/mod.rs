//! Sentiment scoring for news headlines.

mod scorer;

pub use scorer::{
    parse_score_reply, score_headlines, Headline, KeywordScorer, ScoredHeadline, SentimentScorer,
};
