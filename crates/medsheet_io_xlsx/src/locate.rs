//! Header row detection by keyword sniffing.

use crate::spec::{SpecHeaderKeywords, SpecRawSheet};
use crate::util::derive_cell_text;

/// Return the zero-based index of the first row holding a header keyword.
///
/// Each cell is converted to its canonical text and uppercased; the first
/// row with any cell containing any keyword wins. Falls back to `0` when no
/// row matches, including for an empty sheet.
pub fn locate_header_row(sheet: &SpecRawSheet, keywords: &SpecHeaderKeywords) -> usize {
    sheet
        .rows
        .iter()
        .position(|row| {
            row.iter()
                .any(|cell| keywords.is_matching(&derive_cell_text(cell).to_uppercase()))
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::EnumCellValue;

    fn derive_sheet(rows: Vec<Vec<EnumCellValue>>) -> SpecRawSheet {
        SpecRawSheet::new("Sheet1", rows)
    }

    #[test]
    fn test_locate_header_row_first_match_wins() {
        let sheet = derive_sheet(vec![
            vec!["note".into()],
            vec!["S.No".into(), "Date".into(), "REF. DOCTOR".into()],
            vec![1i64.into(), "2024-01-01".into(), "Dr. A".into()],
            vec!["S.No".into(), "Date".into()],
        ]);
        let keywords = SpecHeaderKeywords::default();

        assert_eq!(locate_header_row(&sheet, &keywords), 1);
        assert_eq!(
            locate_header_row(&sheet, &keywords),
            locate_header_row(&sheet, &keywords)
        );
    }

    #[test]
    fn test_locate_header_row_matches_substring_case_insensitive() {
        let sheet = derive_sheet(vec![
            vec![EnumCellValue::None, "title".into()],
            vec![EnumCellValue::None, "  sample date: ".into()],
        ]);
        assert_eq!(locate_header_row(&sheet, &SpecHeaderKeywords::default()), 1);
    }

    #[test]
    fn test_locate_header_row_falls_back_to_zero() {
        let sheet = derive_sheet(vec![
            vec!["name".into(), EnumCellValue::None],
            vec![1i64.into(), 2.5f64.into()],
        ]);
        assert_eq!(locate_header_row(&sheet, &SpecHeaderKeywords::default()), 0);
        assert_eq!(
            locate_header_row(&derive_sheet(vec![]), &SpecHeaderKeywords::default()),
            0
        );
    }

    #[test]
    fn test_locate_header_row_uses_configured_keywords() {
        let sheet = derive_sheet(vec![
            vec!["Date printed".into()],
            vec!["Sl No".into(), "Patient".into()],
        ]);
        let keywords = SpecHeaderKeywords::new(["sl no"]);
        assert_eq!(keywords.keywords(), ["SL NO".to_string()]);
        assert_eq!(locate_header_row(&sheet, &keywords), 1);
    }
}
