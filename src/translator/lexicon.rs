//! Month name lexicons
//!
//! Russian inflects month names by construction: "28 ноября" uses the
//! genitive, "в ноябре" the locative. Each form gets its own table and its
//! own regex alternation; the two must never be merged.

use std::collections::HashMap;
use std::sync::LazyLock;

const GENITIVE: [(&str, u32); 12] = [
    ("января", 1),
    ("февраля", 2),
    ("марта", 3),
    ("апреля", 4),
    ("мая", 5),
    ("июня", 6),
    ("июля", 7),
    ("августа", 8),
    ("сентября", 9),
    ("октября", 10),
    ("ноября", 11),
    ("декабря", 12),
];

const LOCATIVE: [(&str, u32); 12] = [
    ("январе", 1),
    ("феврале", 2),
    ("марте", 3),
    ("апреле", 4),
    ("мае", 5),
    ("июне", 6),
    ("июле", 7),
    ("августе", 8),
    ("сентябре", 9),
    ("октябре", 10),
    ("ноябре", 11),
    ("декабре", 12),
];

static GENITIVE_MONTHS: LazyLock<HashMap<&'static str, u32>> =
    LazyLock::new(|| GENITIVE.into_iter().collect());

static LOCATIVE_MONTHS: LazyLock<HashMap<&'static str, u32>> =
    LazyLock::new(|| LOCATIVE.into_iter().collect());

/// Month number for a genitive form ("ноября" → 11)
pub fn genitive_month(word: &str) -> Option<u32> {
    GENITIVE_MONTHS.get(word).copied()
}

/// Month number for a locative form ("ноябре" → 11)
pub fn locative_month(word: &str) -> Option<u32> {
    LOCATIVE_MONTHS.get(word).copied()
}

/// `января|февраля|...` for embedding in a pattern
pub(crate) fn genitive_alternation() -> String {
    alternation(&GENITIVE)
}

/// `январе|феврале|...` for embedding in a pattern
pub(crate) fn locative_alternation() -> String {
    alternation(&LOCATIVE)
}

fn alternation(table: &[(&str, u32); 12]) -> String {
    table
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join("|")
}
