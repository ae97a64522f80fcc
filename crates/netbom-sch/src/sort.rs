//! Multi-level sorting of BOM entries.

use std::cmp::Ordering;

use crate::settings::{SortData, SortOrder, SortSpec};
use crate::template;

/// Run of decimal digits compared by numeric value, without overflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digits(String);

impl Digits {
    fn significant(&self) -> &str {
        let trimmed = self.0.trim_start_matches('0');
        if trimmed.is_empty() { "0" } else { trimmed }
    }
}

impl Ord for Digits {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.significant(), other.significant());
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    }
}

impl PartialOrd for Digits {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Piece of a value in "text+number" mode. Numbers sort before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Token {
    Number(Digits),
    Text(String),
}

/// Split a value into alternating text and digit tokens, dropping empty pieces.
pub fn tokenize(value: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_digits = false;

    for ch in value.chars() {
        let is_digit = ch.is_ascii_digit();
        if is_digit != in_digits && !current.is_empty() {
            tokens.push(make_token(std::mem::take(&mut current), in_digits));
        }
        in_digits = is_digit;
        current.push(ch);
    }
    if !current.is_empty() {
        tokens.push(make_token(current, in_digits));
    }
    tokens
}

fn make_token(text: String, digits: bool) -> Token {
    if digits {
        Token::Number(Digits(text))
    } else {
        Token::Text(text)
    }
}

/// Comparable form of a field value for one sorting level.
#[derive(Debug, Clone)]
pub enum SortKey {
    Text(String),
    /// Unparsable numbers are `+inf` and sort last.
    Number(f64),
    Tokens(Vec<Token>),
}

impl SortKey {
    pub fn new(value: &str, data: SortData) -> Self {
        match data {
            SortData::Text => SortKey::Text(value.to_string()),
            SortData::Number => {
                SortKey::Number(value.trim().parse().unwrap_or(f64::INFINITY))
            }
            SortData::TextNumber => SortKey::Tokens(tokenize(value)),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Text(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Tokens(_) => 2,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Tokens(a), SortKey::Tokens(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// Sort `items` by up to three levels, most significant first in `specs`.
///
/// Levels are applied from the last to the first with a stable sort, so earlier
/// levels take precedence and ties keep their previous order. `text_of` receives an
/// item, the level's field and whether that field is a template; a level with an
/// empty field is skipped.
pub fn sort_by_levels<T, F>(items: &mut [T], specs: &[SortSpec], mut text_of: F)
where
    F: FnMut(&T, &str, bool) -> String,
{
    for spec in specs.iter().rev() {
        if spec.field.is_empty() {
            continue;
        }
        let is_pattern = template::is_pattern(&spec.field);

        let mut keyed: Vec<(SortKey, usize)> = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let text = text_of(item, &spec.field, is_pattern);
                (SortKey::new(&text, spec.data), index)
            })
            .collect();
        match spec.order {
            SortOrder::Ascending => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
            SortOrder::Descending => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
        }

        let order: Vec<usize> = keyed.into_iter().map(|(_, index)| index).collect();
        apply_permutation(items, order);
    }
}

/// Reorder `items` so that position `i` holds the element previously at `order[i]`.
fn apply_permutation<T>(items: &mut [T], mut order: Vec<usize>) {
    for start in 0..order.len() {
        let mut current = start;
        while order[current] != start {
            let next = order[current];
            items.swap(current, next);
            order[current] = current;
            current = next;
        }
        order[current] = current;
    }
}
