//! Split a feedback block into display items

use threadsift_domain::FeedbackItem;

const BULLET_MARKERS: [char; 3] = ['-', '*', '•'];

/// Split `text` into one item per non-empty line
///
/// Leading bullet markers and surrounding whitespace are stripped. Order is
/// preserved and duplicates are kept. Absent text yields no items.
pub fn segment_feedback(text: Option<&str>) -> Vec<FeedbackItem> {
    let Some(text) = text else {
        return Vec::new();
    };

    text.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| BULLET_MARKERS.contains(&c) || c.is_whitespace())
                .trim()
        })
        .filter(|line| !line.is_empty())
        .map(FeedbackItem::new)
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: items are never empty and never start with a marker
        #[test]
        fn test_items_are_clean(text in "[-*• a-z\n]{0,80}") {
            for item in segment_feedback(Some(&text)) {
                let t = item.text();
                prop_assert!(!t.is_empty());
                prop_assert!(!t.starts_with(|c: char| BULLET_MARKERS.contains(&c) || c.is_whitespace()));
                prop_assert!(!t.ends_with(char::is_whitespace));
            }
        }

        /// Property: never more items than lines
        #[test]
        fn test_item_count_bounded(text in "\\PC{0,80}") {
            let items = segment_feedback(Some(&text));
            prop_assert!(items.len() <= text.lines().count());
        }
    }
}
