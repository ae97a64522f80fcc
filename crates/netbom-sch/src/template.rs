//! Field templates such as `МЛТ-0,5-${Значение}${-|Класс точности|}-В`.
//!
//! A substitution is `${field}` or `${prefix|field|suffix}`. When the field has no
//! value the whole substitution disappears, prefix and suffix included, so the
//! example above renders `МЛТ-0,5-4,7кОм-В` for a resistor without a tolerance.
//!
//! Inside an open substitution a backslash makes the next character ordinary,
//! which is how `{`, `|` and `}` are written literally:
//! `${\{|Обозначение|\}}` renders `{R1}`. Outside of `${...}` nothing needs
//! escaping. Malformed substitutions are copied to the output verbatim.

use std::ops::ControlFlow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::type_names::TypeNames;

/// `singular {plural}`
static SINGULAR_PLURAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+)\s\{(.+)\}$").unwrap());

/// One parsed `${...}` construct, escapes already resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    pub prefix: String,
    pub field: String,
    pub suffix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    Dollar,
    Prefix,
    Field,
    Suffix,
}

/// Walk `pattern`, appending literal text to `out` and handing every well-formed
/// substitution to `on_field`. Stops early when `on_field` breaks.
fn scan<F>(pattern: &str, out: &mut String, mut on_field: F) -> ControlFlow<()>
where
    F: FnMut(Substitution, &mut String) -> ControlFlow<()>,
{
    let mut state = State::Text;
    // Raw text of the substitution being read, emitted as is if it turns out malformed.
    let mut raw = String::new();
    let mut current = Substitution::default();
    let mut escaped = false;

    for ch in pattern.chars() {
        if state == State::Text {
            if ch == '$' {
                state = State::Dollar;
                raw.push(ch);
            } else {
                out.push(ch);
            }
            escaped = false;
            continue;
        }

        if ch == '\\' && !escaped {
            escaped = true;
            raw.push(ch);
            continue;
        }

        raw.push(ch);
        let special = !escaped;
        escaped = false;

        let malformed = match (state, ch) {
            (State::Dollar, '{') if special => {
                state = State::Prefix;
                false
            }
            (State::Dollar, _) => true,
            (_, '{') if special => true,
            (State::Prefix, '|') if special => {
                state = State::Field;
                false
            }
            (State::Field, '|') if special => {
                state = State::Suffix;
                false
            }
            (State::Suffix, '|') if special => true,
            // Exactly one '|': neither the short nor the full form.
            (State::Field, '}') if special => true,
            (_, '}') if special => {
                if state == State::Prefix {
                    current.field = std::mem::take(&mut current.prefix);
                }
                on_field(std::mem::take(&mut current), out)?;
                raw.clear();
                state = State::Text;
                false
            }
            (State::Prefix, ch) => {
                current.prefix.push(ch);
                false
            }
            (State::Field, ch) => {
                current.field.push(ch);
                false
            }
            (State::Suffix, ch) => {
                current.suffix.push(ch);
                false
            }
            (State::Text, _) => false,
        };

        if malformed {
            out.push_str(&raw);
            raw.clear();
            current = Substitution::default();
            state = State::Text;
        }
    }

    if state != State::Text {
        // Unterminated substitution
        out.push_str(&raw);
    }
    ControlFlow::Continue(())
}

/// Whether `pattern` contains at least one well-formed substitution.
///
/// No field is looked up, so the answer does not depend on any component.
pub fn is_pattern(pattern: &str) -> bool {
    let mut sink = String::new();
    scan(pattern, &mut sink, |_, _| ControlFlow::Break(())).is_break()
}

/// Expand every substitution of `pattern` through `resolve`.
///
/// `resolve` maps a field name to its value; `None` or an empty value removes the
/// substitution together with its prefix and suffix.
pub fn expand<F>(pattern: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(pattern.len());
    let _ = scan(pattern, &mut out, |sub, out| {
        if let Some(value) = resolve(&sub.field).filter(|v| !v.is_empty()) {
            out.push_str(&sub.prefix);
            out.push_str(&value);
            out.push_str(&sub.suffix);
        }
        ControlFlow::Continue(())
    });
    out
}

/// Grammatical number requested for a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Number {
    #[default]
    AsIs,
    Singular,
    Plural,
}

/// Bring `value` to the requested grammatical number.
///
/// A value written as `Резистор {Резисторы}` carries both forms itself. Otherwise
/// the legacy synonym table is consulted; a value matching neither is returned as is.
pub fn convert_number(value: &str, number: Number, type_names: Option<&TypeNames>) -> String {
    if value.is_empty() || number == Number::AsIs {
        return value.to_string();
    }

    if let Some(caps) = SINGULAR_PLURAL.captures(value) {
        let group = if number == Number::Singular { 1 } else { 2 };
        return caps
            .get(group)
            .map_or(value, |m| m.as_str())
            .to_string();
    }

    let mut value = value.to_string();
    if let Some(names) = type_names {
        for (singular, plural) in names.pairs() {
            if value == singular || value == plural {
                value = match number {
                    Number::Singular => singular.to_string(),
                    _ => plural.to_string(),
                };
            }
        }
    }
    value
}
