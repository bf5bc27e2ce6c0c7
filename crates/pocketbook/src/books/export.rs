use std::io::Write;

use serde::Serialize;

/// Write rows as CSV with a header derived from the row's field names.
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::VocabularyEntry;
    use chrono::{TimeZone, Utc};

    #[test]
    fn vocabulary_rows_export_with_headers() {
        let rows = vec![VocabularyEntry {
            id: 3,
            german: "Haus, das".to_string(),
            japanese: "家".to_string(),
            memo: String::new(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        }];
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &rows).expect("csv written");
        let text = String::from_utf8(buffer).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("id,german,japanese,memo,created_at"));
        assert_eq!(
            lines.next(),
            Some("3,\"Haus, das\",家,,2025-01-02T03:04:05Z")
        );
    }
}
