//! aggregate.rs: pure statistics over one run's fetched snapshots.
//!
//! Everything here is a single pass plus stable sorts, so equal counts or equal
//! star totals always come out in the order the repositories were fetched.

use std::collections::HashMap;

use crate::fetch::types::RepositorySnapshot;

/// Label → occurrence count, remembering first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut t = Self::default();
        for l in labels {
            t.add(l);
        }
        t
    }

    fn add(&mut self, label: &str) {
        match self.index.get(label) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push((label.to_string(), 1));
            }
        }
    }

    pub fn get(&self, label: &str) -> usize {
        self.index.get(label).map(|&i| self.entries[i].1).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// Entries in first-seen order.
    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    /// Count-descending; ties keep first-seen order.
    pub fn sorted(&self) -> Vec<(String, usize)> {
        let mut v = self.entries.clone();
        v.sort_by(|a, b| b.1.cmp(&a.1));
        v
    }

    pub fn top(&self, k: usize) -> Vec<(String, usize)> {
        let mut v = self.sorted();
        v.truncate(k);
        v
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width buckets over the observed star range.
#[derive(Debug, Clone, PartialEq)]
pub struct StarsHistogram {
    pub bins: Vec<HistogramBin>,
}

impl StarsHistogram {
    /// `None` for empty input or zero buckets.
    pub fn build(values: &[u64], bucket_count: usize) -> Option<Self> {
        let min = *values.iter().min()?;
        let max = *values.iter().max()?;
        if bucket_count == 0 {
            return None;
        }

        let (lo, hi) = if min == max {
            (min as f64 - 0.5, max as f64 + 0.5)
        } else {
            (min as f64, max as f64)
        };
        let width = (hi - lo) / bucket_count as f64;

        let mut bins: Vec<HistogramBin> = (0..bucket_count)
            .map(|i| HistogramBin {
                lower: lo + width * i as f64,
                upper: if i + 1 == bucket_count {
                    hi
                } else {
                    lo + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();

        for &v in values {
            let idx = (((v as f64 - lo) / width).floor() as usize).min(bucket_count - 1);
            bins[idx].count += 1;
        }

        Some(Self { bins })
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    pub total_count: usize,
    pub total_stars: u64,
    pub average_stars: u64,
    pub stars_histogram: Option<StarsHistogram>,
    pub language_counts: FrequencyTable,
    pub owner_counts: FrequencyTable,
    /// Every snapshot, stars descending, ties in fetch order.
    ranked: Vec<RepositorySnapshot>,
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// The first `min(k, total_count)` repositories by stars.
    pub fn top_by_stars(&self, k: usize) -> &[RepositorySnapshot] {
        &self.ranked[..k.min(self.ranked.len())]
    }
}

/// Compute every aggregate in one go. Empty input gives zeroed aggregates.
pub fn aggregate(snapshots: &[RepositorySnapshot], histogram_bins: usize) -> AggregateResult {
    let total_count = snapshots.len();
    let total_stars: u64 = snapshots.iter().map(|s| s.star_count).sum();
    let average_stars = if total_count == 0 {
        0
    } else {
        total_stars / total_count as u64
    };

    let stars: Vec<u64> = snapshots.iter().map(|s| s.star_count).collect();

    let mut ranked = snapshots.to_vec();
    ranked.sort_by(|a, b| b.star_count.cmp(&a.star_count));

    AggregateResult {
        total_count,
        total_stars,
        average_stars,
        stars_histogram: StarsHistogram::build(&stars, histogram_bins),
        language_counts: FrequencyTable::from_labels(snapshots.iter().map(|s| s.language.as_str())),
        owner_counts: FrequencyTable::from_labels(snapshots.iter().map(|s| s.owner.as_str())),
        ranked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(name: &str, owner: &str, stars: u64, lang: &str) -> RepositorySnapshot {
        RepositorySnapshot {
            name: name.into(),
            full_name: format!("{owner}/{name}"),
            owner: owner.into(),
            star_count: stars,
            language: lang.into(),
            created_at: "2020-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn empty_input_is_zeroed() {
        let agg = aggregate(&[], 20);
        assert_eq!(agg.total_count, 0);
        assert_eq!(agg.total_stars, 0);
        assert_eq!(agg.average_stars, 0);
        assert!(agg.stars_histogram.is_none());
        assert!(agg.language_counts.is_empty());
        assert!(agg.owner_counts.is_empty());
        assert!(agg.top_by_stars(5).is_empty());
        assert!(agg.is_empty());
    }

    #[test]
    fn average_uses_floor_division() {
        let agg = aggregate(
            &[snap("a", "o", 10, "Rust"), snap("b", "o", 11, "Go"), snap("c", "o", 0, "Go")],
            20,
        );
        assert_eq!(agg.total_stars, 21);
        assert_eq!(agg.average_stars, 7);

        let agg = aggregate(&[snap("a", "o", 5, "Rust"), snap("b", "o", 2, "Go")], 20);
        assert_eq!(agg.average_stars, 3);
    }

    #[test]
    fn top_by_stars_example() {
        let agg = aggregate(
            &[snap("a", "o", 100, "Rust"), snap("b", "o", 50, "Go"), snap("c", "o", 200, "C")],
            20,
        );
        let stars: Vec<u64> = agg.top_by_stars(2).iter().map(|s| s.star_count).collect();
        assert_eq!(stars, vec![200, 100]);
        assert_eq!(agg.top_by_stars(10).len(), 3);
    }

    #[test]
    fn ties_keep_fetch_order() {
        let agg = aggregate(
            &[
                snap("first", "o", 7, "Rust"),
                snap("big", "o", 9, "Rust"),
                snap("second", "o", 7, "Rust"),
                snap("third", "o", 7, "Rust"),
            ],
            20,
        );
        let names: Vec<&str> = agg.top_by_stars(4).iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["big", "first", "second", "third"]);
    }

    #[test]
    fn frequency_tables_sum_and_order() {
        let agg = aggregate(
            &[
                snap("a", "meta", 1, "JavaScript"),
                snap("b", "google", 1, "Python"),
                snap("c", "meta", 1, "TypeScript"),
                snap("d", "google", 1, "Python"),
                snap("e", "apple", 1, "JavaScript"),
            ],
            20,
        );
        assert_eq!(agg.language_counts.total(), agg.total_count);
        assert_eq!(agg.language_counts.get("Python"), 2);
        assert_eq!(agg.language_counts.get("Haskell"), 0);

        // JavaScript and Python tie at 2; JavaScript was seen first.
        let top = agg.language_counts.top(2);
        assert_eq!(
            top,
            vec![("JavaScript".to_string(), 2), ("Python".to_string(), 2)]
        );

        let owners: Vec<String> = agg.owner_counts.sorted().into_iter().map(|(o, _)| o).collect();
        assert_eq!(owners, vec!["meta", "google", "apple"]);
    }

    #[test]
    fn histogram_spans_min_to_max() {
        let h = StarsHistogram::build(&[0, 10, 20, 100], 10).unwrap();
        assert_eq!(h.bins.len(), 10);
        assert_eq!(h.bins[0].lower, 0.0);
        assert_eq!(h.bins[9].upper, 100.0);
        assert_eq!(h.bins[0].count, 1);
        assert_eq!(h.bins[1].count, 1);
        assert_eq!(h.bins[2].count, 1);
        // max value lands in the last, right-closed bucket
        assert_eq!(h.bins[9].count, 1);
        assert_eq!(h.total(), 4);
    }

    #[test]
    fn histogram_with_single_value_widens_range() {
        let h = StarsHistogram::build(&[42, 42], 20).unwrap();
        assert_eq!(h.total(), 2);
        assert_eq!(h.bins[0].lower, 41.5);
        assert_eq!(h.bins[19].upper, 42.5);
        assert_eq!(h.bins[10].count, 2);
        assert_eq!(h.max_count(), 2);
    }

    #[test]
    fn histogram_of_nothing_is_none() {
        assert!(StarsHistogram::build(&[], 20).is_none());
        assert!(StarsHistogram::build(&[1, 2], 0).is_none());
    }
}
