//! Headline sentiment scoring.
//!
//! The production scorer is an external text-analysis service; this module
//! defines the boundary it plugs into plus an offline keyword scorer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// A dated news headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

/// A headline with its sentiment score, nominally in [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredHeadline {
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub sentiment: f64,
}

/// Anything that turns text into one sentiment scalar in [-1, 1].
pub trait SentimentScorer {
    /// Scorer name for logs
    fn name(&self) -> &str;

    /// Score a piece of text
    fn score(&self, text: &str) -> Result<f64>;
}

/// Extract a score from a free-text reply of a text-scoring service.
///
/// Keeps only `-`, `.` and digits and parses what is left. The value is not
/// range-checked. Anything unparseable is neutral (0.0).
pub fn parse_score_reply(reply: &str) -> f64 {
    let numeric: String = reply
        .chars()
        .filter(|c| matches!(c, '-' | '.' | '0'..='9'))
        .collect();

    match numeric.trim().parse::<f64>() {
        Ok(score) if score.is_finite() => score,
        _ => 0.0,
    }
}

/// Score every headline. A scorer failure degrades to a neutral score.
pub fn score_headlines<S: SentimentScorer + ?Sized>(
    scorer: &S,
    headlines: &[Headline],
) -> Vec<ScoredHeadline> {
    headlines
        .iter()
        .map(|headline| {
            let sentiment = scorer.score(&headline.text).unwrap_or_else(|e| {
                warn!(
                    scorer = scorer.name(),
                    error = %e,
                    headline = %headline.text,
                    "scoring failed, using neutral sentiment"
                );
                0.0
            });
            ScoredHeadline {
                timestamp: headline.timestamp,
                text: headline.text.clone(),
                sentiment,
            }
        })
        .collect()
}

/// Dictionary scorer for financial headlines.
///
/// Averages the weights of matched keywords; a negation word flips the next match.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    weights: HashMap<String, f64>,
    negations: Vec<String>,
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordScorer {
    pub fn new() -> Self {
        let mut weights = HashMap::new();

        for (word, weight) in [
            ("boost", 0.6),
            ("boosting", 0.6),
            ("rally", 0.7),
            ("rallies", 0.7),
            ("surge", 0.7),
            ("surges", 0.7),
            ("gain", 0.5),
            ("gains", 0.5),
            ("record", 0.5),
            ("beats", 0.6),
            ("growth", 0.5),
            ("passes", 0.4),
            ("recovery", 0.6),
            ("optimism", 0.6),
            ("pause", 0.3),
            ("easing", 0.4),
            ("strong", 0.5),
            ("upgrade", 0.5),
        ] {
            weights.insert(word.to_string(), weight);
        }

        for (word, weight) in [
            ("tumble", -0.7),
            ("tumbles", -0.7),
            ("panic", -0.9),
            ("pandemic", -0.8),
            ("crisis", -0.9),
            ("collapse", -0.9),
            ("collapses", -0.9),
            ("drop", -0.6),
            ("fears", -0.6),
            ("fear", -0.6),
            ("tensions", -0.5),
            ("escalate", -0.5),
            ("inflation", -0.4),
            ("hikes", -0.4),
            ("raises", -0.3),
            ("worst", -0.8),
            ("volatility", -0.4),
            ("downgrade", -0.5),
            ("recession", -0.8),
            ("plunge", -0.8),
            ("plunges", -0.8),
        ] {
            weights.insert(word.to_string(), weight);
        }

        let negations = ["not", "no", "never", "without"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        Self { weights, negations }
    }

    /// Score text synchronously.
    pub fn analyze(&self, text: &str) -> f64 {
        let mut total = 0.0;
        let mut hits = 0usize;
        let mut negate = false;

        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            if self.negations.iter().any(|n| n == word) {
                negate = true;
                continue;
            }
            if let Some(&weight) = self.weights.get(word) {
                total += if negate { -weight } else { weight };
                hits += 1;
                negate = false;
            }
        }

        if hits == 0 {
            0.0
        } else {
            (total / hits as f64).clamp(-1.0, 1.0)
        }
    }
}

impl SentimentScorer for KeywordScorer {
    fn name(&self) -> &str {
        "keyword"
    }

    fn score(&self, text: &str) -> Result<f64> {
        Ok(self.analyze(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::TimeZone;

    #[test]
    fn test_parse_score_reply() {
        assert_eq!(parse_score_reply("-0.75"), -0.75);
        assert_eq!(parse_score_reply("Sentiment Score: 0.4\n"), 0.4);
        assert_eq!(parse_score_reply("no number here"), 0.0);
        // Out-of-range replies pass through unchanged.
        assert_eq!(parse_score_reply("3.5"), 3.5);
        assert_eq!(parse_score_reply("Score: -1.25"), -1.25);
        // Stray punctuation leaves an unparseable remainder.
        assert_eq!(parse_score_reply("score - 0.5."), 0.0);
    }

    #[test]
    fn test_keyword_scorer_polarity() {
        let scorer = KeywordScorer::new();
        let crash = "WHO declares COVID-19 a pandemic, causing global market panic.";
        let rally = "Infrastructure bill passes in the US, boosting industrial sectors.";
        assert!(scorer.analyze(crash) < -0.5);
        assert!(scorer.analyze(rally) > 0.0);
        assert_eq!(scorer.analyze("Quarterly report released"), 0.0);
    }

    #[test]
    fn test_keyword_scorer_negation() {
        let scorer = KeywordScorer::new();
        assert!(scorer.analyze("no recession expected") > 0.0);
    }

    struct FailingScorer;

    impl SentimentScorer for FailingScorer {
        fn name(&self) -> &str {
            "failing"
        }

        fn score(&self, _text: &str) -> Result<f64> {
            Err(Error::Parse("service unavailable".to_string()))
        }
    }

    #[test]
    fn test_score_headlines_falls_back_to_neutral() {
        let headlines = vec![Headline {
            timestamp: Utc.with_ymd_and_hms(2022, 5, 4, 0, 0, 0).unwrap(),
            text: "Fed raises interest rates".to_string(),
        }];
        let scored = score_headlines(&FailingScorer, &headlines);
        assert_eq!(scored[0].sentiment, 0.0);
        assert_eq!(scored[0].timestamp, headlines[0].timestamp);
    }
}
