use tillroll_core::{LogicalLine, ReceiptRecord, ReceiptSummary};

/// Date/total header followed by a two-column item table.
pub fn summary_text(summary: &ReceiptSummary) -> String {
    let mut out = format!(
        "Date/Time: {}\n",
        summary.date_time.as_deref().unwrap_or("Unknown")
    );
    if let Some(date) = summary.date() {
        out.push_str(&format!("Date: {}\n", date.format("%Y-%m-%d")));
    }
    if let Some(total) = &summary.total {
        out.push_str(&format!("Total: {total}\n"));
    }

    if summary.items.is_empty() {
        return out;
    }

    let prices: Vec<String> = summary.items.iter().map(|r| r.price.to_string()).collect();
    let item_width = summary
        .items
        .iter()
        .map(|r| r.item.chars().count())
        .chain(std::iter::once("Item".len()))
        .max()
        .unwrap_or(0);
    let price_width = prices
        .iter()
        .map(|p| p.chars().count())
        .chain(std::iter::once("Price".len()))
        .max()
        .unwrap_or(0);

    out.push('\n');
    out.push_str(&format!("{:<item_width$}  {:>price_width$}\n", "Item", "Price"));
    out.push_str(&format!("{}  {}\n", "-".repeat(item_width), "-".repeat(price_width)));
    for (record, price) in summary.items.iter().zip(&prices) {
        out.push_str(&format!("{:<item_width$}  {:>price_width$}\n", record.item, price));
    }
    out
}

pub fn lines_text(lines: &[LogicalLine]) -> String {
    let mut out = String::from("Reconstructed lines:\n");
    for line in lines {
        out.push_str(&format!("{:>8.1}  {}\n", line.vertical_position, line.text));
    }
    out
}

/// Records whose printed amount isn't a number (`1.2.3`, `..5`), usually an
/// OCR misread worth a second look.
pub fn unreadable_amounts(summary: &ReceiptSummary) -> Vec<&ReceiptRecord> {
    summary
        .items
        .iter()
        .filter(|r| r.price.to_cents().is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillroll_core::Price;

    #[test]
    fn empty_summary_shows_unknown_date_and_no_table() {
        assert_eq!(summary_text(&ReceiptSummary::default()), "Date/Time: Unknown\n");
    }

    #[test]
    fn table_columns_align() {
        let summary = ReceiptSummary {
            date_time: Some("1/2/2024 9:00".into()),
            items: vec![
                ReceiptRecord::new("Coffee", Price::new(false, "3.50")),
                ReceiptRecord::new("Order Total", Price::new(false, "13.50")),
            ],
            total: Some(Price::new(false, "13.50")),
            terminated_early: true,
        };
        let expected = "\
Date/Time: 1/2/2024 9:00
Date: 2024-01-02
Total: $13.50

Item          Price
-----------  ------
Coffee        $3.50
Order Total  $13.50
";
        assert_eq!(summary_text(&summary), expected);
    }

    #[test]
    fn time_only_stamp_has_no_date_line() {
        let summary = ReceiptSummary { date_time: Some("10:42 AM".into()), ..Default::default() };
        assert_eq!(summary_text(&summary), "Date/Time: 10:42 AM\n");
    }

    #[test]
    fn lines_listing_includes_positions() {
        let text = lines_text(&[LogicalLine::new("Order Total $9.99", 100.0)]);
        assert_eq!(text, "Reconstructed lines:\n   100.0  Order Total $9.99\n");
    }

    #[test]
    fn garbled_amounts_are_flagged() {
        let summary = ReceiptSummary {
            items: vec![
                ReceiptRecord::new("Milk", Price::new(false, "2.00")),
                ReceiptRecord::new("Eggs", Price::new(false, "3.4.9")),
            ],
            ..Default::default()
        };
        let flagged = unreadable_amounts(&summary);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].item, "Eggs");
    }
}
