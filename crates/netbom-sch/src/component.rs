use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::refdes;
use crate::settings::{BomField, Settings};
use crate::template::{self, Number, convert_number};
use crate::type_names::TypeNames;
use crate::value::{self, Family};

/// Field values that themselves contain templates are expanded this many levels deep.
const MAX_NESTING: usize = 8;

/// Upper bound on nested field expansions performed for one value.
const MAX_EXPANSIONS: usize = 256;

/// Settings snapshot used while resolving component values.
#[derive(Debug, Clone, Copy)]
pub struct BomContext<'a> {
    pub settings: &'a Settings,
    /// Synonym table for singular/plural type names (kicadbom2spec compatibility).
    pub type_names: Option<&'a TypeNames>,
}

impl<'a> BomContext<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            type_names: None,
        }
    }

    pub fn with_type_names(mut self, type_names: Option<&'a TypeNames>) -> Self {
        self.type_names = type_names;
        self
    }
}

/// Field names every component answers to. Templates may use either spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Reference,
    Value,
    ExpandedValue,
    Footprint,
    FootprintName,
    Datasheet,
    Description,
}

impl Builtin {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Обозначение" | "Reference" => Builtin::Reference,
            "Значение" | "Value" => Builtin::Value,
            "Значение!" | "Value!" => Builtin::ExpandedValue,
            "Посад.место" | "Footprint" => Builtin::Footprint,
            "Посад.место!" | "Footprint!" => Builtin::FootprintName,
            "Документация" | "Datasheet" => Builtin::Datasheet,
            "Описание" | "Description" => Builtin::Description,
            _ => return None,
        })
    }
}

/// Name of the value field used when a component has no BOM name.
pub const VALUE_FIELD: &str = "Значение";

/// Fields currently being expanded, plus what is left of the expansion budget.
///
/// A field is never expanded inside its own expansion; such references and anything
/// past the depth or budget limits are substituted as written.
#[derive(Debug)]
struct Expansion {
    active: Vec<String>,
    remaining: usize,
}

impl Default for Expansion {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            remaining: MAX_EXPANSIONS,
        }
    }
}

impl Expansion {
    /// Start expanding `name`, or return `false` when it must stay literal.
    fn enter(&mut self, name: &str) -> bool {
        if self.remaining == 0
            || self.active.len() >= MAX_NESTING
            || self.active.iter().any(|active| active == name)
        {
            return false;
        }
        self.remaining -= 1;
        self.active.push(name.to_string());
        true
    }

    fn leave(&mut self) {
        self.active.pop();
    }
}

/// A placed component as read from the netlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub reference: String,
    pub value: String,
    pub footprint: String,
    pub datasheet: String,
    pub description: String,
    /// User fields by name.
    pub fields: BTreeMap<String, String>,
}

impl Component {
    pub fn new(reference: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Builder-style helper to add a user field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Letter part of the designator, `None` when it does not parse.
    pub fn ref_type(&self) -> Option<&str> {
        refdes::ref_type(&self.reference)
    }

    pub fn family(&self) -> Family {
        Family::from_ref_type(self.ref_type())
    }

    /// Value in canonical form with units, e.g. `4k7` → `4,7кОм`.
    pub fn value_with_units(&self, space: bool) -> String {
        value::format_with_units(self.family(), &self.value, space)
    }

    /// Value in base units, `f64::INFINITY` when it is not numeric.
    pub fn expanded_value(&self) -> f64 {
        value::expanded_value(self.family(), &self.value)
    }

    fn footprint_name(&self) -> &str {
        match self.footprint.split_once(':') {
            Some((_, name)) => name,
            None => &self.footprint,
        }
    }

    fn builtin_value(&self, builtin: Builtin, settings: &Settings) -> String {
        match builtin {
            Builtin::Reference => self.reference.clone(),
            Builtin::Value if settings.doc.add_units => {
                self.value_with_units(settings.doc.space_before_units)
            }
            Builtin::Value => self.value.clone(),
            Builtin::ExpandedValue => self.expanded_value().to_string(),
            Builtin::Footprint if settings.doc.footprint_only => self.footprint_name().to_string(),
            Builtin::Footprint => self.footprint.clone(),
            Builtin::FootprintName => self.footprint_name().to_string(),
            Builtin::Datasheet => self.datasheet.clone(),
            Builtin::Description => self.description.clone(),
        }
    }

    /// Value of a built-in or user field, with templates inside it expanded.
    ///
    /// Returns `None` for a field the component does not have.
    pub fn field_value(&self, name: &str, ctx: &BomContext) -> Option<String> {
        self.field_value_in(name, ctx, &mut Expansion::default())
    }

    fn field_value_in(
        &self,
        name: &str,
        ctx: &BomContext,
        expansion: &mut Expansion,
    ) -> Option<String> {
        let value = match Builtin::from_name(name) {
            Some(builtin) => self.builtin_value(builtin, ctx.settings),
            None => self.fields.get(name)?.clone(),
        };
        if value.is_empty() || !expansion.enter(name) {
            return Some(value);
        }
        let expanded = self.expand_in(&value, Number::AsIs, ctx, expansion);
        expansion.leave();
        Some(expanded)
    }

    /// Expand `pattern` against this component's fields.
    pub fn format_pattern(&self, pattern: &str, number: Number, ctx: &BomContext) -> String {
        self.expand_in(pattern, number, ctx, &mut Expansion::default())
    }

    fn expand_in(
        &self,
        pattern: &str,
        number: Number,
        ctx: &BomContext,
        expansion: &mut Expansion,
    ) -> String {
        template::expand(pattern, |name| {
            let value = self.field_value_in(name, ctx, expansion)?;
            Some(convert_number(&value, number, ctx.type_names))
        })
    }

    /// Final text of a BOM column for this component.
    ///
    /// The configured setting is either a template or a plain field name. An empty
    /// name falls back to the component value.
    pub fn bom_value(&self, field: BomField, number: Number, ctx: &BomContext) -> String {
        let source = ctx.settings.fields.get(field);
        let mut value = if template::is_pattern(source) {
            Some(self.format_pattern(source, number, ctx))
        } else {
            self.field_value(source, ctx)
                .map(|v| convert_number(&v, number, ctx.type_names))
        };

        if field == BomField::Name && value.as_deref().is_none_or(str::is_empty) {
            value = self.field_value(VALUE_FIELD, ctx);
        }

        let value = value.unwrap_or_default();
        if ctx.settings.doc.split_row_by_newline {
            value.replace("\\n", "\n")
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resistor() -> Component {
        Component {
            reference: "R1".to_string(),
            value: "4k7".to_string(),
            footprint: "Resistor_SMD:R_0603".to_string(),
            datasheet: "~".to_string(),
            description: "Resistor".to_string(),
            fields: BTreeMap::new(),
        }
        .with_field("Тип", "Резистор {Резисторы}")
        .with_field("Наименование", "Р1-12-0,062-${Значение}${±|Допуск|}")
        .with_field("Допуск", "5%")
    }

    #[test]
    fn builtin_fields() {
        let settings = Settings::default();
        let ctx = BomContext::new(&settings);
        let r = resistor();
        assert_eq!(r.field_value("Обозначение", &ctx).as_deref(), Some("R1"));
        assert_eq!(r.field_value("Reference", &ctx).as_deref(), Some("R1"));
        assert_eq!(r.field_value("Значение", &ctx).as_deref(), Some("4,7кОм"));
        assert_eq!(r.field_value("Значение!", &ctx).as_deref(), Some("4700"));
        assert_eq!(
            r.field_value("Посад.место", &ctx).as_deref(),
            Some("Resistor_SMD:R_0603")
        );
        assert_eq!(r.field_value("Посад.место!", &ctx).as_deref(), Some("R_0603"));
        assert_eq!(r.field_value("Описание", &ctx).as_deref(), Some("Resistor"));
        assert_eq!(r.field_value("Нет такого", &ctx), None);
    }

    #[test]
    fn value_without_units() {
        let mut settings = Settings::default();
        settings.doc.add_units = false;
        settings.doc.footprint_only = true;
        let ctx = BomContext::new(&settings);
        let r = resistor();
        assert_eq!(r.field_value("Value", &ctx).as_deref(), Some("4k7"));
        assert_eq!(r.field_value("Footprint", &ctx).as_deref(), Some("R_0603"));
    }

    #[test]
    fn user_field_templates_expand() {
        let settings = Settings::default();
        let ctx = BomContext::new(&settings);
        assert_eq!(
            resistor().field_value("Наименование", &ctx).as_deref(),
            Some("Р1-12-0,062-4,7кОм±5%")
        );
    }

    #[test]
    fn self_reference_terminates() {
        let settings = Settings::default();
        let ctx = BomContext::new(&settings);
        let c = Component::new("X1", "").with_field("Петля", "a${Петля}");
        assert_eq!(c.field_value("Петля", &ctx).as_deref(), Some("aa${Петля}"));
    }

    #[test]
    fn repeated_self_reference_stays_small() {
        let settings = Settings::default();
        let ctx = BomContext::new(&settings);
        let raw = "${L}".repeat(20);
        let c = Component::new("X1", "").with_field("L", raw.as_str());
        let value = c.field_value("L", &ctx).unwrap();
        assert_eq!(value, raw.repeat(20));
    }

    #[test]
    fn wide_chain_of_fields_is_bounded() {
        let settings = Settings::default();
        let ctx = BomContext::new(&settings);
        let names = ["A", "B", "C", "D", "E", "F", "G", "H", "I"];
        let mut c = Component::new("X1", "");
        for pair in names.windows(2) {
            c = c.with_field(pair[0], format!("${{{}}}", pair[1]).repeat(20));
        }
        c = c.with_field("I", "x");
        let value = c.field_value("A", &ctx).unwrap();
        // Every expanded field contributes at most 20 unexpanded copies of a raw field.
        assert!(value.len() <= MAX_EXPANSIONS * 20 * 20 * "${I}".len());
        assert!(value.contains('x'));
    }

    #[test]
    fn nesting_is_limited_in_depth() {
        let settings = Settings::default();
        let ctx = BomContext::new(&settings);
        let mut c = Component::new("X1", "");
        for level in 0..10 {
            c = c.with_field(format!("F{level}"), format!("${{F{}}}", level + 1));
        }
        c = c.with_field("F10", "end");
        assert_eq!(c.field_value("F0", &ctx).as_deref(), Some("${F9}"));
        assert_eq!(c.field_value("F3", &ctx).as_deref(), Some("end"));
    }

    #[test]
    fn bom_values() {
        let settings = Settings::default();
        let ctx = BomContext::new(&settings);
        let r = resistor();
        assert_eq!(r.bom_value(BomField::Type, Number::Singular, &ctx), "Резистор");
        assert_eq!(r.bom_value(BomField::Type, Number::Plural, &ctx), "Резисторы");
        assert_eq!(
            r.bom_value(BomField::Type, Number::AsIs, &ctx),
            "Резистор {Резисторы}"
        );
        assert_eq!(
            r.bom_value(BomField::Name, Number::AsIs, &ctx),
            "Р1-12-0,062-4,7кОм±5%"
        );
        assert_eq!(r.bom_value(BomField::Code, Number::AsIs, &ctx), "");
    }

    #[test]
    fn name_falls_back_to_value() {
        let settings = Settings::default();
        let ctx = BomContext::new(&settings);
        let c = Component::new("C3", "100n");
        assert_eq!(c.bom_value(BomField::Name, Number::AsIs, &ctx), "100нФ");
    }

    #[test]
    fn configured_template() {
        let mut settings = Settings::default();
        settings.fields.name = "${Наименование} ${Значение}".to_string();
        settings.fields.comment = r"${Допуск}\n${Обозначение}".to_string();
        settings.doc.split_row_by_newline = true;
        let ctx = BomContext::new(&settings);
        let c = Component::new("L2", "10").with_field("Наименование", "ДМ-0,1");
        assert_eq!(c.bom_value(BomField::Name, Number::AsIs, &ctx), "ДМ-0,1 10мкГн");
        assert_eq!(c.bom_value(BomField::Comment, Number::AsIs, &ctx), "\nL2");
    }

    #[test]
    fn synonyms_apply_to_plain_fields() {
        let settings = Settings::default();
        let names = TypeNames::from_pairs([("Конденсатор", "Конденсаторы")]);
        let ctx = BomContext::new(&settings).with_type_names(Some(&names));
        let c = Component::new("C1", "1u").with_field("Тип", "Конденсатор");
        assert_eq!(c.bom_value(BomField::Type, Number::Plural, &ctx), "Конденсаторы");
    }

    #[test]
    fn unparsable_designator_is_generic() {
        let c = Component::new("?", "10k");
        assert_eq!(c.ref_type(), None);
        assert_eq!(c.family(), Family::Other);
        assert_eq!(c.expanded_value(), f64::INFINITY);
    }
}
