//! Parsing of free-form component values.
//!
//! Schematic authors write the same capacitance as `2u7`, `2.7u`, `2,7 мк` or
//! `2.7uF`. This module maps such strings onto a canonical display form that uses
//! Cyrillic multipliers and units (`2,7мкФ`) and onto a magnitude in base SI units
//! used for numeric sorting.
//!
//! Both operations are total: an unrecognized value is displayed as written and
//! has an infinite magnitude, so it sorts after every parsed one.

use once_cell::sync::Lazy;
use regex::Regex;

/// Alternation of every accepted multiplier. `мк` must precede `м`.
const MULTIPLIERS: &str = "G|Г|M|М|k|к|мк|m|м|μ|µ|u|U|n|н|p|п";

/// `2u7`, `2н7`, `4m7`, `5k1`
static SHORTHAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^([0-9]+)({MULTIPLIERS})([0-9]+)$")).unwrap());

/// `2.7 u`, `2700p`, `4,7 m`, `510`
static TRAILING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^([0-9]+(?:[.,][0-9]+)?)\s*({MULTIPLIERS})?$")).unwrap()
});

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+[.,][0-9]+$").unwrap());
static PLAIN_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(?:[.,][0-9]+)?$").unwrap());
static R_LEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^R[0-9]+").unwrap());
static R_INFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+R[0-9]+").unwrap());

/// Component family, derived from the letter part of a designator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Capacitor,
    Inductor,
    Resistor,
    Other,
}

impl Family {
    /// Classify by the first letter of a designator prefix (`C`, `L`, `R`).
    ///
    /// A missing prefix (the designator did not parse) is [`Family::Other`].
    pub fn from_ref_type(ref_type: Option<&str>) -> Self {
        match ref_type.and_then(|t| t.chars().next()) {
            Some('C') => Family::Capacitor,
            Some('L') => Family::Inductor,
            Some('R') => Family::Resistor,
            _ => Family::Other,
        }
    }

    fn units(self) -> &'static str {
        match self {
            Family::Capacitor => "Ф",
            Family::Inductor => "Гн",
            Family::Resistor => "Ом",
            Family::Other => "",
        }
    }
}

/// Cyrillic display letter for a multiplier. Cyrillic input is returned as is.
pub fn display_multiplier(multiplier: &str) -> &str {
    match multiplier {
        "G" => "Г",
        "M" => "М",
        "k" => "к",
        "m" => "м",
        "μ" | "µ" | "u" | "U" => "мк",
        "n" => "н",
        "p" => "п",
        other => other,
    }
}

/// Decimal factor of a multiplier; unknown text counts as no multiplier.
pub fn multiplier_factor(multiplier: &str) -> f64 {
    match multiplier {
        "G" | "Г" => 1e9,
        "M" | "М" => 1e6,
        "k" | "к" => 1e3,
        "m" | "м" => 1e-3,
        "μ" | "µ" | "u" | "U" | "мк" => 1e-6,
        "n" | "н" => 1e-9,
        "p" | "п" => 1e-12,
        _ => 1.0,
    }
}

fn shorthand(value: &str) -> Option<(String, &str)> {
    let caps = SHORTHAND.captures(value)?;
    let (int, mult, frac) = (caps.get(1)?, caps.get(2)?, caps.get(3)?);
    Some((format!("{},{}", int.as_str(), frac.as_str()), mult.as_str()))
}

fn trailing(value: &str) -> Option<(String, Option<&str>)> {
    let caps = TRAILING.captures(value)?;
    let number = caps.get(1)?.as_str().to_string();
    Some((number, caps.get(2).map(|m| m.as_str())))
}

/// Split a value into its numeric text and multiplier for display.
fn display_parts(family: Family, value: &str) -> Option<(String, String)> {
    match family {
        Family::Capacitor => {
            if value.ends_with('Ф') {
                return None;
            }
            if INTEGER.is_match(value) {
                return Some((value.to_string(), "п".to_string()));
            }
            if DECIMAL.is_match(value) {
                return Some((value.to_string(), "мк".to_string()));
            }
            let value = value.trim_end_matches('F').trim();
            if let Some((number, mult)) = shorthand(value) {
                return Some((number, mult.to_string()));
            }
            let (number, mult) = trailing(value)?;
            Some((number, mult.unwrap_or_default().to_string()))
        }
        Family::Inductor => {
            if value.ends_with("Гн") {
                return None;
            }
            let value = value.trim_end_matches('H').trim();
            if let Some((number, mult)) = shorthand(value) {
                return Some((number, mult.to_string()));
            }
            let (number, mult) = trailing(value)?;
            Some((number, mult.unwrap_or("мк").to_string()))
        }
        Family::Resistor => {
            if value.ends_with("Ом") {
                return None;
            }
            let value = value.trim_end_matches('Ω');
            let value = value
                .strip_suffix("Ohm")
                .or_else(|| value.strip_suffix("ohm"))
                .unwrap_or(value)
                .trim();
            if R_LEADING.is_match(value) {
                return Some((value.replace('R', "0,"), String::new()));
            }
            if R_INFIX.is_match(value) {
                return Some((value.replace('R', ","), String::new()));
            }
            if let Some((number, mult)) = shorthand(value) {
                return Some((number, mult.to_string()));
            }
            let (number, mult) = trailing(value)?;
            Some((number, mult.unwrap_or_default().to_string()))
        }
        Family::Other => None,
    }
}

/// Canonical display form of a component value, e.g. `2u7` → `2,7мкФ`.
///
/// With `space` a single space separates the number from multiplier and unit
/// (`2,7 мкФ`). Values of [`Family::Other`], values that already carry the family
/// unit and values that do not parse are returned unchanged.
pub fn format_with_units(family: Family, value: &str, space: bool) -> String {
    match display_parts(family, value) {
        Some((number, mult)) if !number.is_empty() => {
            let separator = if space { " " } else { "" };
            format!(
                "{}{separator}{}{}",
                number.replace('.', ","),
                display_multiplier(&mult),
                family.units()
            )
        }
        _ => value.to_string(),
    }
}

fn parse_float(number: &str) -> Option<f64> {
    number.trim().replace(',', ".").parse().ok()
}

fn shorthand_magnitude(value: &str) -> Option<f64> {
    let (number, mult) = shorthand(value)?;
    Some(parse_float(&number)? * multiplier_factor(mult))
}

fn trailing_magnitude(value: &str) -> Option<f64> {
    let (number, mult) = trailing(value)?;
    Some(parse_float(&number)? * mult.map_or(1.0, multiplier_factor))
}

fn magnitude(family: Family, value: &str) -> Option<f64> {
    match family {
        Family::Capacitor => {
            let value = value.trim_end_matches('F').trim_end_matches('Ф').trim();
            if INTEGER.is_match(value) {
                Some(parse_float(value)? * 1e-12)
            } else if DECIMAL.is_match(value) {
                Some(parse_float(value)? * 1e-6)
            } else {
                shorthand_magnitude(value).or_else(|| trailing_magnitude(value))
            }
        }
        Family::Inductor => {
            let value = value.trim_end_matches('H').replace("Гн", "");
            let value = value.trim();
            if PLAIN_NUMBER.is_match(value) {
                Some(parse_float(value)? * 1e-6)
            } else {
                shorthand_magnitude(value).or_else(|| trailing_magnitude(value))
            }
        }
        Family::Resistor => {
            let value = value
                .trim_end_matches('Ω')
                .replace("Ом", "")
                .replace("ohm", "")
                .replace("Ohm", "");
            let value = value.trim();
            if R_LEADING.is_match(value) {
                parse_float(&value.replace('R', "0."))
            } else if R_INFIX.is_match(value) {
                parse_float(&value.replace('R', "."))
            } else {
                shorthand_magnitude(value).or_else(|| trailing_magnitude(value))
            }
        }
        Family::Other => parse_float(value),
    }
}

/// Magnitude of a component value in base units (farads, henries, ohms).
///
/// Returns `f64::INFINITY` when the value cannot be read as a number.
pub fn expanded_value(family: Family, value: &str) -> f64 {
    magnitude(family, value).unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= b.abs() * 1e-9
    }

    #[test]
    fn capacitor_display() {
        let c = Family::Capacitor;
        assert_eq!(format_with_units(c, "100", false), "100пФ");
        assert_eq!(format_with_units(c, "0.1", false), "0,1мкФ");
        assert_eq!(format_with_units(c, "2u7", false), "2,7мкФ");
        assert_eq!(format_with_units(c, "4.7 uF", false), "4,7мкФ");
        assert_eq!(format_with_units(c, "2н7", false), "2,7нФ");
        assert_eq!(format_with_units(c, "10n", true), "10 нФ");
        assert_eq!(format_with_units(c, "22 мкФ", false), "22 мкФ");
        assert_eq!(format_with_units(c, "NC", false), "NC");
    }

    #[test]
    fn inductor_display() {
        let l = Family::Inductor;
        assert_eq!(format_with_units(l, "10", false), "10мкГн");
        assert_eq!(format_with_units(l, "4m7", false), "4,7мГн");
        assert_eq!(format_with_units(l, "100nH", false), "100нГн");
        assert_eq!(format_with_units(l, "1,5мкГн", false), "1,5мкГн");
    }

    #[test]
    fn resistor_display() {
        let r = Family::Resistor;
        assert_eq!(format_with_units(r, "4k7", false), "4,7кОм");
        assert_eq!(format_with_units(r, "R47", false), "0,47Ом");
        assert_eq!(format_with_units(r, "4R7", false), "4,7Ом");
        assert_eq!(format_with_units(r, "510", false), "510Ом");
        assert_eq!(format_with_units(r, "1.5 M", true), "1,5 МОм");
        assert_eq!(format_with_units(r, "10kΩ", false), "10кОм");
        assert_eq!(format_with_units(r, "100 Ohm", false), "100Ом");
        assert_eq!(format_with_units(r, "4,7кОм", false), "4,7кОм");
    }

    #[test]
    fn other_family_is_untouched() {
        assert_eq!(format_with_units(Family::Other, "BAT54", false), "BAT54");
        assert_eq!(format_with_units(Family::Other, "100", true), "100");
    }

    #[test]
    fn canonical_values_are_fixed_points() {
        for (family, raw) in [
            (Family::Capacitor, "2u7"),
            (Family::Capacitor, "100"),
            (Family::Inductor, "4m7"),
            (Family::Resistor, "R33"),
            (Family::Resistor, "5k1"),
        ] {
            let once = format_with_units(family, raw, false);
            assert_eq!(format_with_units(family, &once, false), once);
        }
    }

    #[test]
    fn magnitudes() {
        assert!(close(expanded_value(Family::Capacitor, "100"), 100e-12));
        assert!(close(expanded_value(Family::Capacitor, "0,1"), 0.1e-6));
        assert!(close(expanded_value(Family::Capacitor, "2u7"), 2.7e-6));
        assert!(close(expanded_value(Family::Capacitor, "4,7 мкФ"), 4.7e-6));
        assert!(close(expanded_value(Family::Inductor, "10"), 10e-6));
        assert!(close(expanded_value(Family::Inductor, "4m7"), 4.7e-3));
        assert!(close(expanded_value(Family::Resistor, "1к5"), 1500.0));
        assert!(close(expanded_value(Family::Resistor, "R47"), 0.47));
        assert!(close(expanded_value(Family::Resistor, "4R7"), 4.7));
        assert!(close(expanded_value(Family::Resistor, "120"), 120.0));
        assert!(close(expanded_value(Family::Resistor, "10 кОм"), 10e3));
        assert!(close(expanded_value(Family::Other, "3,3"), 3.3));
    }

    #[test]
    fn unparsable_magnitude_is_infinite() {
        assert_eq!(expanded_value(Family::Resistor, "DNP"), f64::INFINITY);
        assert_eq!(expanded_value(Family::Resistor, "R47k"), f64::INFINITY);
        assert_eq!(expanded_value(Family::Other, ""), f64::INFINITY);
        assert_eq!(expanded_value(Family::Capacitor, "abc"), f64::INFINITY);
    }

    #[test]
    fn family_from_prefix() {
        assert_eq!(Family::from_ref_type(Some("C")), Family::Capacitor);
        assert_eq!(Family::from_ref_type(Some("CR")), Family::Capacitor);
        assert_eq!(Family::from_ref_type(Some("VD")), Family::Other);
        assert_eq!(Family::from_ref_type(None), Family::Other);
    }
}
