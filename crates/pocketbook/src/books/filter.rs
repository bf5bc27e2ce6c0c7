/// Rows that expose text columns to the local search box.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// Keep rows where any searchable column contains `query`, ignoring case.
/// A blank query keeps everything. Runs over rows already read; storage is
/// never re-queried.
pub fn filter_rows<T: Searchable>(rows: Vec<T>, query: Option<&str>) -> Vec<T> {
    let needle = match query.map(str::trim) {
        Some(needle) if !needle.is_empty() => needle.to_lowercase(),
        _ => return rows,
    };

    rows.into_iter()
        .filter(|row| {
            row.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Word {
        german: &'static str,
        japanese: &'static str,
    }

    impl Searchable for Word {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.german, self.japanese]
        }
    }

    fn words() -> Vec<Word> {
        vec![
            Word {
                german: "Haus",
                japanese: "家",
            },
            Word {
                german: "Auto",
                japanese: "車",
            },
        ]
    }

    #[test]
    fn matches_substrings_case_insensitively() {
        let filtered = filter_rows(words(), Some("hau"));
        assert_eq!(
            filtered,
            vec![Word {
                german: "Haus",
                japanese: "家"
            }]
        );
    }

    #[test]
    fn searches_every_exposed_column() {
        let filtered = filter_rows(words(), Some("車"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].german, "Auto");
    }

    #[test]
    fn blank_queries_keep_all_rows() {
        assert_eq!(filter_rows(words(), None).len(), 2);
        assert_eq!(filter_rows(words(), Some("   ")).len(), 2);
    }
}
