//! Singular/plural component type names inherited from kicadbom2spec.
//!
//! kicadbom2spec stores them in its INI settings file as two parallel sections:
//!
//! ```ini
//! [group names singular]
//! 0 = Резистор
//! 1 = Конденсатор
//!
//! [group names plural]
//! 0 = Резисторы
//! 1 = Конденсаторы
//! ```
//!
//! Entries are paired by key; a singular name without a plural counterpart is
//! ignored.

use std::path::{Path, PathBuf};

use thiserror::Error;

const SINGULAR_SECTION: &str = "group names singular";
const PLURAL_SECTION: &str = "group names plural";

#[derive(Debug, Error)]
pub enum TypeNamesError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Line {line}: expected `[section]` or `key = value`, found `{text}`")]
    Syntax { line: usize, text: String },
}

/// Ordered table of `(singular, plural)` type names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeNames {
    pairs: Vec<(String, String)>,
}

impl TypeNames {
    pub fn from_pairs<I, S, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(s, p)| (s.into(), p.into()))
                .collect(),
        }
    }

    /// Read the table from a kicadbom2spec settings file.
    pub fn load(path: &Path) -> Result<Self, TypeNamesError> {
        let text = std::fs::read_to_string(path).map_err(|source| TypeNamesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let names = Self::from_kicadbom2spec(&text)?;
        log::debug!(
            "Loaded {} type name pairs from {}",
            names.len(),
            path.display()
        );
        Ok(names)
    }

    /// Parse the contents of a kicadbom2spec settings file.
    pub fn from_kicadbom2spec(text: &str) -> Result<Self, TypeNamesError> {
        let sections = parse_ini(text)?;
        let entries = |name: &str| {
            sections
                .iter()
                .find(|(section, _)| section == name)
                .map(|(_, entries)| entries.as_slice())
                .unwrap_or_default()
        };

        let plural = entries(PLURAL_SECTION);
        let pairs = entries(SINGULAR_SECTION)
            .iter()
            .filter_map(|(key, singular)| {
                let (_, plural) = plural.iter().find(|(k, _)| k == key)?;
                Some((singular.clone(), plural.clone()))
            })
            .collect();
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(s, p)| (s.as_str(), p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

type Section = (String, Vec<(String, String)>);

/// Minimal INI reader matching Python's `configparser` defaults: `=` or `:`
/// delimiters, `#`/`;` comment lines, case-insensitive keys, indented
/// continuation lines. Repeated sections are merged.
fn parse_ini(text: &str) -> Result<Vec<Section>, TypeNamesError> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<usize> = None;

    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if line.starts_with(char::is_whitespace) {
            if let Some(value) = current
                .and_then(|i| sections[i].1.last_mut())
                .map(|(_, value)| value)
            {
                value.push('\n');
                value.push_str(trimmed);
                continue;
            }
        }

        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let position = sections.iter().position(|(n, _)| n == name);
            current = Some(position.unwrap_or_else(|| {
                sections.push((name.to_string(), Vec::new()));
                sections.len() - 1
            }));
            continue;
        }

        let delimiter = trimmed.find(['=', ':']);
        let (Some(section), Some(at)) = (current, delimiter) else {
            return Err(TypeNamesError::Syntax {
                line: index + 1,
                text: trimmed.to_string(),
            });
        };
        let key = trimmed[..at].trim().to_lowercase();
        let value = trimmed[at + 1..].trim().to_string();
        let entries = &mut sections[section].1;
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KB2S: &str = "\
[window]
width = 800

[group names singular]
0 = Резистор
1 = Конденсатор
2 = Дроссель

; trailing comment
[group names plural]
1 = Конденсаторы
0 = Резисторы
";

    #[test]
    fn pairs_by_key() {
        let names = TypeNames::from_kicadbom2spec(KB2S).unwrap();
        let pairs: Vec<_> = names.pairs().collect();
        assert_eq!(
            pairs,
            vec![("Резистор", "Резисторы"), ("Конденсатор", "Конденсаторы")]
        );
    }

    #[test]
    fn missing_sections_give_empty_table() {
        let names = TypeNames::from_kicadbom2spec("[window]\nwidth = 1\n").unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn key_outside_section_is_an_error() {
        let err = TypeNames::from_kicadbom2spec("0 = Резистор\n").unwrap_err();
        assert!(matches!(err, TypeNamesError::Syntax { line: 1, .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ini");
        std::fs::write(&path, KB2S).unwrap();
        assert_eq!(TypeNames::load(&path).unwrap().len(), 2);

        let missing = TypeNames::load(&dir.path().join("missing.ini"));
        assert!(matches!(missing, Err(TypeNamesError::Io { .. })));
    }
}
