use smartnotes_persist::Note;

/// Notes whose title or content contains `query`, ignoring case.
/// The query is matched as typed, so only the empty query matches everything.
/// Input order is preserved.
pub fn filter_notes(notes: &[Note], query: &str) -> Vec<Note> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return notes.to_vec();
    }

    notes
        .iter()
        .filter(|note| note.matches_lowercase(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use smartnotes_persist::NoteId;

    fn note(id: &str, title: &str, content: &str) -> Note {
        Note {
            id: NoteId::new(id),
            title: title.to_string(),
            content: content.to_string(),
            user_id: "u1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ids(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_matches_title_or_content_ignoring_case() {
        let notes = vec![
            note("a", "Groceries", "milk"),
            note("b", "Meeting", "agenda"),
        ];
        assert_eq!(ids(&filter_notes(&notes, "MILK")), vec!["a"]);
        assert_eq!(ids(&filter_notes(&notes, "meet")), vec!["b"]);
        assert!(filter_notes(&notes, "zebra").is_empty());
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let notes = vec![note("b", "B", ""), note("a", "A", "")];
        assert_eq!(ids(&filter_notes(&notes, "")), vec!["b", "a"]);
    }

    #[test]
    fn test_whitespace_is_part_of_the_query() {
        let notes = vec![
            note("a", "Groceries", "milk and eggs"),
            note("b", "Meeting", "agenda"),
        ];
        assert_eq!(ids(&filter_notes(&notes, " ")), vec!["a"]);
        assert!(filter_notes(&notes, "  groc ").is_empty());
    }
}
