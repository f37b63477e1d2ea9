use tillroll_core::{LogicalLine, RawWord};

use crate::config::OverlayUnit;
use crate::extract::ExtractError;
use crate::grouper::RowGrouper;
use crate::overlay::{OverlayLine, OverlayWord};

/// One logical line per non-blank input line, positioned by input order.
pub fn plain_lines(text: &str) -> Vec<LogicalLine> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.trim();
            (!line.is_empty()).then(|| LogicalLine::new(line, idx as f64))
        })
        .collect()
}

/// Convert overlay lines to positioned units and merge them into rows.
/// Fails on the first unit that can't be positioned.
pub fn overlay_lines(
    lines: &[OverlayLine],
    unit: OverlayUnit,
    grouper: &RowGrouper,
) -> Result<Vec<LogicalLine>, ExtractError> {
    let units: Vec<RawWord> = match unit {
        OverlayUnit::Word => lines
            .iter()
            .flat_map(|line| line.words.iter())
            .map(OverlayWord::to_raw)
            .collect::<Result<_, _>>()?,
        OverlayUnit::Line => lines
            .iter()
            .filter(|line| !line.text.trim().is_empty())
            .map(OverlayLine::to_raw)
            .collect::<Result<_, _>>()?,
    };
    Ok(grouper.lines(&units))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RowAnchor;

    fn grouper() -> RowGrouper {
        RowGrouper::new(10.0, RowAnchor::GroupFirst)
    }

    #[test]
    fn plain_lines_trim_and_drop_blanks() {
        let lines = plain_lines("  Coffee $3.50 \n\n\tBagel $2.25\r\n   \n");
        assert_eq!(
            lines,
            vec![LogicalLine::new("Coffee $3.50", 0.0), LogicalLine::new("Bagel $2.25", 2.0)]
        );
    }

    #[test]
    fn plain_lines_of_empty_text() {
        assert!(plain_lines("").is_empty());
    }

    #[test]
    fn overlay_words_are_regrouped_across_ocr_lines() {
        // The backend split one printed row into two OCR lines.
        let lines = vec![
            OverlayLine::new("Order", vec![OverlayWord::new("Order", 100.0, 0.0)]),
            OverlayLine::new("Total $9.99", vec![
                OverlayWord::new("Total", 102.0, 50.0),
                OverlayWord::new("$9.99", 101.0, 120.0),
            ]),
            OverlayLine::new("Thanks", vec![OverlayWord::new("Thanks", 200.0, 0.0)]),
        ];
        let out = overlay_lines(&lines, OverlayUnit::Word, &grouper()).unwrap();
        assert_eq!(
            out,
            vec![LogicalLine::new("Order Total $9.99", 100.0), LogicalLine::new("Thanks", 200.0)]
        );
    }

    #[test]
    fn overlay_line_unit_keeps_line_text() {
        let lines = vec![
            OverlayLine::new("$4.00", vec![OverlayWord::new("$4.00", 51.0, 150.0)]),
            OverlayLine::new("Bread", vec![OverlayWord::new("Bread", 50.0, 0.0)]),
            OverlayLine::new("", vec![OverlayWord::new("", 80.0, 0.0)]),
        ];
        let out = overlay_lines(&lines, OverlayUnit::Line, &grouper()).unwrap();
        assert_eq!(out, vec![LogicalLine::new("Bread $4.00", 50.0)]);
    }

    #[test]
    fn overlay_word_without_left_is_an_error() {
        let lines = vec![OverlayLine::new(
            "Milk",
            vec![OverlayWord { text: "Milk".into(), top: Some(4.0), left: None }],
        )];
        let err = overlay_lines(&lines, OverlayUnit::Word, &grouper()).unwrap_err();
        assert_eq!(err, ExtractError::MissingCoordinate { word: "Milk".into(), field: "left" });
    }
}
