use serde::{Deserialize, Serialize};

use crate::component::{BomContext, Component};
use crate::group::{CompGroup, grouped_components};
use crate::settings::Settings;
use crate::type_names::TypeNames;

/// Title block of the root sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleBlock {
    pub title: String,
    /// Document number (comment 1).
    pub number: String,
    pub company: String,
    /// Comment 2.
    pub developer: String,
    /// Comment 3.
    pub verifier: String,
    /// Comment 6.
    pub inspector: String,
    /// Comment 4.
    pub approver: String,
}

/// Components of a design together with its title block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schematic {
    pub title_block: TitleBlock,
    pub components: Vec<Component>,
    /// Singular/plural type names, used only in compatibility mode.
    pub type_names: Option<TypeNames>,
}

impl Schematic {
    pub fn new(title_block: TitleBlock, components: Vec<Component>) -> Self {
        Self {
            title_block,
            components,
            type_names: None,
        }
    }

    pub fn with_type_names(mut self, type_names: Option<TypeNames>) -> Self {
        self.type_names = type_names;
        self
    }

    /// Resolution context for `settings`. The type names table is only consulted
    /// when compatibility mode is on.
    pub fn context<'a>(&'a self, settings: &'a Settings) -> BomContext<'a> {
        let type_names = self
            .type_names
            .as_ref()
            .filter(|_| settings.settings.compatibility_mode);
        BomContext::new(settings).with_type_names(type_names)
    }

    /// Components grouped and sorted for the BOM.
    pub fn grouped_components(&self, settings: &Settings) -> Vec<CompGroup> {
        grouped_components(&self.components, &self.context(settings))
    }
}
