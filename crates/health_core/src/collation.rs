//! Linguistic ordering for metric labels.
//!
//! Ordering uses the Unicode root collation, so ligatures and letters such
//! as `Æ` or `Ø` sort with their base letters and punctuation follows the
//! collation tables instead of code points. Folding for search strips
//! accents and case through NFD.

use std::cmp::Ordering;

use icu_collator::options::CollatorOptions;
use icu_collator::CollatorBorrowed;
use icu_normalizer::DecomposingNormalizerBorrowed;
use tracing::warn;

fn is_combining_mark(ch: char) -> bool {
    matches!(
        ch,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

/// Accent- and case-insensitive form of `text`, used for searching.
pub fn fold(text: &str) -> String {
    DecomposingNormalizerBorrowed::new_nfd()
        .normalize(text)
        .chars()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Label comparator built once and reused for a whole sort.
pub struct LabelCollator {
    collator: Option<CollatorBorrowed<'static>>,
}

impl LabelCollator {
    pub fn new() -> Self {
        let options = CollatorOptions::default();
        let collator = match CollatorBorrowed::try_new(Default::default(), options) {
            Ok(collator) => Some(collator),
            Err(e) => {
                warn!("Root collation unavailable, ordering labels by folded text: {}", e);
                None
            }
        };
        Self { collator }
    }

    /// Compare two labels the way a reader expects them to be listed.
    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(left, right),
            None => fold(left).cmp(&fold(right)),
        }
        .then_with(|| left.cmp(right))
    }

    pub fn sort_by_label<T>(&self, items: &mut [T], key: impl Fn(&T) -> &str) {
        items.sort_by(|left, right| self.compare(key(left), key(right)));
    }
}

impl Default for LabelCollator {
    fn default() -> Self {
        Self::new()
    }
}
