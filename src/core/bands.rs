//! Banding tables
//!
//! Every threshold ladder of the analyzers is an ordered list of
//! (predicate, score) rows evaluated top-down, first match wins.
//! Tables are plain statics so each one can be tested on its own.

/// Joint (rank, age) input used by most maturity tables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankAge {
    pub rank: u32,
    pub age_years: f64,
}

/// One row: if `when` holds, the row yields `score`
pub struct Band<I> {
    pub when: fn(&I) -> bool,
    pub score: f64,
}

/// Ordered band table with a fallback score
pub struct BandTable<I: 'static> {
    pub name: &'static str,
    pub bands: &'static [Band<I>],
    /// Score when no row matches
    pub otherwise: f64,
}

impl<I: 'static> BandTable<I> {
    /// Score of the first matching row, if any
    pub fn first_match(&self, input: &I) -> Option<f64> {
        self.bands
            .iter()
            .find(|band| (band.when)(input))
            .map(|band| band.score)
    }

    /// Score of the first matching row, else `otherwise`
    pub fn score(&self, input: &I) -> f64 {
        self.first_match(input).unwrap_or(self.otherwise)
    }

    /// Raise `current` to this table's score; never lowers it
    pub fn floor(&self, current: f64, input: &I) -> f64 {
        match self.first_match(input) {
            Some(floor) => current.max(floor),
            None => current,
        }
    }

    /// Every score the table can produce
    pub fn scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.bands
            .iter()
            .map(|b| b.score)
            .chain(std::iter::once(self.otherwise))
    }
}

/// Age in years inferred from rank when no genesis date is usable.
/// Shared by every analyzer through `NormalizedFacts::age_years`.
pub static AGE_FROM_RANK: BandTable<u32> = BandTable {
    name: "age_from_rank",
    bands: &[
        Band { when: |r| *r <= 10, score: 8.0 },
        Band { when: |r| *r <= 20, score: 6.0 },
        Band { when: |r| *r <= 50, score: 4.0 },
        Band { when: |r| *r <= 100, score: 3.0 },
        Band { when: |r| *r <= 200, score: 2.0 },
    ],
    otherwise: 1.0,
};

#[cfg(test)]
mod tests {
    use super::*;

    static SAMPLE: BandTable<f64> = BandTable {
        name: "sample",
        bands: &[
            Band { when: |v| *v > 10.0, score: 9.0 },
            Band { when: |v| *v > 5.0, score: 7.0 },
        ],
        otherwise: 3.0,
    };

    #[test]
    fn test_first_match_wins() {
        assert_eq!(SAMPLE.score(&20.0), 9.0);
        assert_eq!(SAMPLE.score(&6.0), 7.0);
        assert_eq!(SAMPLE.score(&5.0), 3.0);
        assert_eq!(SAMPLE.first_match(&1.0), None);
    }

    #[test]
    fn test_floor_never_lowers() {
        assert_eq!(SAMPLE.floor(9.5, &6.0), 9.5);
        assert_eq!(SAMPLE.floor(4.0, &6.0), 7.0);
        assert_eq!(SAMPLE.floor(4.0, &1.0), 4.0);
    }

    #[test]
    fn test_age_from_rank() {
        assert_eq!(AGE_FROM_RANK.score(&1), 8.0);
        assert_eq!(AGE_FROM_RANK.score(&15), 6.0);
        assert_eq!(AGE_FROM_RANK.score(&50), 4.0);
        assert_eq!(AGE_FROM_RANK.score(&100), 3.0);
        assert_eq!(AGE_FROM_RANK.score(&200), 2.0);
        assert_eq!(AGE_FROM_RANK.score(&201), 1.0);
    }

    #[test]
    fn test_scores_lists_fallback() {
        let all: Vec<f64> = SAMPLE.scores().collect();
        assert_eq!(all, vec![9.0, 7.0, 3.0]);
    }
}
