//! Weighted rating (Bayesian average of a title's vote).
//!
//! `WR = v/(v+m) * R + m/(v+m) * C`
//!
//! - `R`: the title's `vote_average`
//! - `v`: the title's `vote_count`
//! - `C`: mean `vote_average` over the corpus
//! - `m`: minimum-votes threshold, fixed or a vote-count percentile
//!
//! Titles with few votes are pulled toward `C`; when `v + m == 0` the rating
//! is `C` outright.

use crate::config::MinVotes;
use catalog::TitleRecord;

/// Corpus-wide priors of the weighted rating
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusStats {
    /// `C`
    pub mean_vote: f64,
    /// `m`
    pub min_votes: f64,
}

impl CorpusStats {
    /// Compute `C` and `m` over a corpus. An empty corpus yields zeros.
    pub fn compute(records: &[TitleRecord], min_votes: MinVotes) -> Self {
        if records.is_empty() {
            return Self {
                mean_vote: 0.0,
                min_votes: 0.0,
            };
        }

        let mean_vote =
            records.iter().map(|r| r.vote_average as f64).sum::<f64>() / records.len() as f64;

        let min_votes = match min_votes {
            MinVotes::Fixed(count) => count as f64,
            MinVotes::Percentile(p) => {
                let mut counts: Vec<f64> = records.iter().map(|r| r.vote_count as f64).collect();
                counts.sort_by(f64::total_cmp);
                percentile(&counts, p)
            }
        };

        Self {
            mean_vote,
            min_votes,
        }
    }

    /// Weighted rating of one record under these priors
    pub fn weighted_rating(&self, record: &TitleRecord) -> f64 {
        weighted_rating(
            record.vote_average as f64,
            record.vote_count as f64,
            self.mean_vote,
            self.min_votes,
        )
    }
}

/// `WR` for rating `r` with `v` votes, corpus mean `c` and threshold `m`
pub fn weighted_rating(r: f64, v: f64, c: f64, m: f64) -> f64 {
    let total = v + m;
    if total <= 0.0 {
        return c;
    }
    (v / total) * r + (m / total) * c
}

/// Linearly interpolated quantile of ascending `sorted` values, `p` in [0, 1]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let fraction = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}
