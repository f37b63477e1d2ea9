//! Row reconstruction from positioned OCR units.
//!
//! Units are sorted top-to-bottom, left-to-right and then swept once: a unit
//! joins the open row while its top stays within `tolerance` of the row's
//! reference top. Closed rows are re-sorted by `left` and joined with single
//! spaces.

use tillroll_core::{LogicalLine, RawWord};
use tracing::debug;

use crate::config::RowAnchor;

/// Anything with a page position and text that can be merged into rows.
pub trait Positioned {
    fn top(&self) -> f64;
    fn left(&self) -> f64;
    fn text(&self) -> &str;
}

impl Positioned for RawWord {
    fn top(&self) -> f64 {
        self.top
    }

    fn left(&self) -> f64 {
        self.left
    }

    fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowGrouper {
    tolerance: f64,
    anchor: RowAnchor,
}

impl RowGrouper {
    pub fn new(tolerance: f64, anchor: RowAnchor) -> Self {
        Self { tolerance, anchor }
    }

    /// Split units into rows in reading order. Each row is sorted by `left`.
    pub fn rows<'a, T: Positioned>(&self, units: &'a [T]) -> Vec<Vec<&'a T>> {
        let mut sorted: Vec<&T> = units.iter().collect();
        sorted.sort_by(|a, b| {
            a.top()
                .total_cmp(&b.top())
                .then_with(|| a.left().total_cmp(&b.left()))
        });

        let mut rows: Vec<Vec<&T>> = Vec::new();
        let mut current: Vec<&T> = Vec::new();
        let mut reference = 0.0;

        for unit in sorted {
            if current.is_empty() || (unit.top() - reference).abs() <= self.tolerance {
                if current.is_empty() || self.anchor == RowAnchor::LastAdded {
                    reference = unit.top();
                }
                current.push(unit);
            } else {
                rows.push(close_row(std::mem::take(&mut current)));
                reference = unit.top();
                current.push(unit);
            }
        }
        if !current.is_empty() {
            rows.push(close_row(current));
        }

        rows
    }

    /// Merge units into logical lines positioned at each row's first top.
    pub fn lines<T: Positioned>(&self, units: &[T]) -> Vec<LogicalLine> {
        let lines: Vec<LogicalLine> = self
            .rows(units)
            .into_iter()
            .filter_map(|row| {
                let anchor_top = row.iter().map(|u| u.top()).fold(f64::INFINITY, f64::min);
                let text = row
                    .iter()
                    .map(|u| u.text().trim())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                (!text.is_empty()).then(|| LogicalLine::new(text, anchor_top))
            })
            .collect();

        debug!(units = units.len(), lines = lines.len(), tolerance = self.tolerance, "grouped rows");
        lines
    }
}

fn close_row<T: Positioned>(mut row: Vec<&T>) -> Vec<&T> {
    row.sort_by(|a, b| a.left().total_cmp(&b.left()));
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouper() -> RowGrouper {
        RowGrouper::new(10.0, RowAnchor::GroupFirst)
    }

    fn texts(lines: &[LogicalLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn words_within_tolerance_merge_left_to_right() {
        let words = vec![
            RawWord::new("Total $9.99", 102.0, 50.0),
            RawWord::new("Order", 100.0, 0.0),
            RawWord::new("Thanks", 200.0, 0.0),
        ];
        let lines = grouper().lines(&words);
        assert_eq!(texts(&lines), vec!["Order Total $9.99", "Thanks"]);
        assert_eq!(lines[0].vertical_position, 100.0);
        assert_eq!(lines[1].vertical_position, 200.0);
    }

    #[test]
    fn lower_word_further_left_still_sorts_by_left() {
        let words = vec![RawWord::new("$2.25", 100.0, 90.0), RawWord::new("Bagel", 104.0, 5.0)];
        assert_eq!(texts(&grouper().lines(&words)), vec!["Bagel $2.25"]);
    }

    #[test]
    fn empty_input_yields_no_lines() {
        let words: Vec<RawWord> = vec![];
        assert!(grouper().lines(&words).is_empty());
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let words = vec![RawWord::new("a", 0.0, 0.0), RawWord::new("b", 10.0, 1.0)];
        assert_eq!(texts(&grouper().lines(&words)), vec!["a b"]);
        let words = vec![RawWord::new("a", 0.0, 0.0), RawWord::new("b", 10.5, 1.0)];
        assert_eq!(texts(&grouper().lines(&words)), vec!["a", "b"]);
    }

    #[test]
    fn group_first_anchor_stops_drift() {
        // Each word is 6 below the previous one.
        let words = vec![
            RawWord::new("a", 0.0, 0.0),
            RawWord::new("b", 6.0, 1.0),
            RawWord::new("c", 12.0, 2.0),
            RawWord::new("d", 18.0, 3.0),
        ];
        let lines = grouper().lines(&words);
        assert_eq!(texts(&lines), vec!["a b", "c d"]);
    }

    #[test]
    fn last_added_anchor_chains_drifting_words() {
        let words = vec![
            RawWord::new("a", 0.0, 0.0),
            RawWord::new("b", 6.0, 1.0),
            RawWord::new("c", 12.0, 2.0),
            RawWord::new("d", 18.0, 3.0),
        ];
        let lines = RowGrouper::new(10.0, RowAnchor::LastAdded).lines(&words);
        assert_eq!(texts(&lines), vec!["a b c d"]);
    }

    #[test]
    fn final_group_is_flushed() {
        let words = vec![RawWord::new("x", 0.0, 0.0), RawWord::new("y", 50.0, 0.0)];
        let rows = grouper().rows(&words);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0].text, "y");
    }

    #[test]
    fn blank_words_are_skipped_when_joining() {
        let words = vec![
            RawWord::new("Milk", 0.0, 0.0),
            RawWord::new("  ", 0.0, 10.0),
            RawWord::new("$2.00", 0.0, 20.0),
            RawWord::new("", 40.0, 0.0),
        ];
        assert_eq!(texts(&grouper().lines(&words)), vec!["Milk $2.00"]);
    }

    #[test]
    fn zero_tolerance_only_merges_equal_tops() {
        let words = vec![
            RawWord::new("a", 5.0, 10.0),
            RawWord::new("b", 5.0, 0.0),
            RawWord::new("c", 5.5, 0.0),
        ];
        let lines = RowGrouper::new(0.0, RowAnchor::GroupFirst).lines(&words);
        assert_eq!(texts(&lines), vec!["b a", "c"]);
    }
}
