//! BOM settings, stored as TOML.
//!
//! ```toml
//! [fields]
//! type = "Тип"
//! name = "${Наименование} ${Значение}"
//!
//! [doc]
//! add-units = true
//! space-before-units = true
//!
//! [[sort.components]]
//! field = "Значение!"
//! data = "number"
//! ```
//!
//! Every key is optional; missing ones take the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::type_names::{TypeNames, TypeNamesError};

/// Sorting is limited to this many levels per list.
pub const MAX_SORT_LEVELS: usize = 3;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("{list} sorting has {count} levels, at most {} are supported", MAX_SORT_LEVELS)]
    TooManySortLevels { list: &'static str, count: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub fields: FieldSettings,
    pub doc: DocSettings,
    pub settings: CompatibilitySettings,
    pub sort: SortSettings,
}

/// Which component field (or template) feeds each BOM column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FieldSettings {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub code: String,
    pub doc: String,
    pub dealer: String,
    pub for_what: String,
    pub comment: String,
    /// Components carrying a field with this name are left out of the BOM.
    pub excluded: String,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            kind: "Тип".to_string(),
            name: "Наименование".to_string(),
            code: "Код".to_string(),
            doc: "Документ".to_string(),
            dealer: "Поставщик".to_string(),
            for_what: "Куда входит".to_string(),
            comment: "Примечание".to_string(),
            excluded: String::new(),
        }
    }
}

/// A value printed in one of the BOM columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BomField {
    Type,
    Name,
    Code,
    Doc,
    Dealer,
    ForWhat,
    Comment,
}

impl FieldSettings {
    /// Field name or template configured for `field`.
    pub fn get(&self, field: BomField) -> &str {
        match field {
            BomField::Type => &self.kind,
            BomField::Name => &self.name,
            BomField::Code => &self.code,
            BomField::Doc => &self.doc,
            BomField::Dealer => &self.dealer,
            BomField::ForWhat => &self.for_what,
            BomField::Comment => &self.comment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DocSettings {
    /// Show values in canonical form with units (`4,7кОм`).
    pub add_units: bool,
    pub space_before_units: bool,
    /// Drop the library part of footprints (`Resistor_SMD:R_0603` → `R_0603`).
    pub footprint_only: bool,
    /// Turn a literal `\n` in BOM values into a line break.
    pub split_row_by_newline: bool,
    pub separate_group_for_each_doc: bool,
}

impl Default for DocSettings {
    fn default() -> Self {
        Self {
            add_units: true,
            space_before_units: false,
            footprint_only: false,
            split_row_by_newline: false,
            separate_group_for_each_doc: false,
        }
    }
}

/// kicadbom2spec compatibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompatibilitySettings {
    /// Use the type names of a kicadbom2spec settings file for singular/plural forms.
    pub compatibility_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility_source: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortSettings {
    /// Order of entries inside each group.
    pub components: Vec<SortSpec>,
    /// Order of the groups, keyed by their first entry.
    pub groups: Vec<SortSpec>,
}

impl Default for SortSettings {
    fn default() -> Self {
        Self {
            components: vec![SortSpec::new("Значение!", SortOrder::Ascending, SortData::Number)],
            groups: vec![
                SortSpec::new("Обозначение", SortOrder::Ascending, SortData::TextNumber),
                SortSpec::new("${Тип}", SortOrder::Ascending, SortData::Text),
            ],
        }
    }
}

/// One sorting level: a field name or template, a direction and how to compare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub data: SortData,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, order: SortOrder, data: SortData) -> Self {
        Self {
            field: field.into(),
            order,
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ascending", alias = "По возрастанию")]
    Ascending,
    #[serde(rename = "descending", alias = "По убыванию")]
    Descending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortData {
    #[default]
    #[serde(rename = "text", alias = "Текст")]
    Text,
    #[serde(rename = "number", alias = "Число")]
    Number,
    /// Digit runs compare as numbers, so `R2` sorts before `R10`.
    #[serde(rename = "text+number", alias = "Текст+Число")]
    TextNumber,
}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::from_toml(&text)?;

        // A relative kicadbom2spec path is relative to the settings file.
        if let (Some(source), Some(dir)) = (
            settings.settings.compatibility_source.as_mut(),
            path.parent(),
        ) {
            if source.is_relative() {
                *source = dir.join(&*source);
            }
        }
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for (list, specs) in [
            ("Component", &self.sort.components),
            ("Group", &self.sort.groups),
        ] {
            if specs.len() > MAX_SORT_LEVELS {
                return Err(SettingsError::TooManySortLevels {
                    list,
                    count: specs.len(),
                });
            }
        }
        Ok(())
    }

    /// Type names for singular/plural conversion, when compatibility mode asks for them.
    pub fn load_type_names(&self) -> Result<Option<TypeNames>, TypeNamesError> {
        if !self.settings.compatibility_mode {
            return Ok(None);
        }
        match &self.settings.compatibility_source {
            Some(path) => TypeNames::load(path).map(Some),
            None => {
                log::warn!("Compatibility mode is on but no compatibility-source is set");
                Ok(None)
            }
        }
    }
}
