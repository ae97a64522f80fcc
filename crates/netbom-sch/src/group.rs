//! Grouping of components into BOM entries.
//!
//! Components that differ only by designator form a [`CompRange`], one BOM line.
//! Consecutive ranges of the same type form a [`CompGroup`], printed under a common
//! heading. Grouping is a greedy walk over the components sorted by
//! `(designator letters of untyped parts, type, name)`.

use serde::Serialize;

use crate::component::{BomContext, Component};
use crate::refdes;
use crate::settings::{BomField, SortSpec};
use crate::sort::sort_by_levels;
use crate::template::Number;

/// Components with equal type, name, doc and comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompRange {
    /// First member; stands in for the whole range when resolving fields.
    component: Component,
    designators: Vec<String>,
}

impl CompRange {
    pub fn new(first: Component) -> Self {
        Self {
            designators: vec![first.reference.clone()],
            component: first,
        }
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    /// Member designators in the order they were added.
    pub fn designators(&self) -> &[String] {
        &self.designators
    }

    pub fn len(&self) -> usize {
        self.designators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designators.is_empty()
    }

    pub fn bom_value(&self, field: BomField, number: Number, ctx: &BomContext) -> String {
        self.component.bom_value(field, number, ctx)
    }

    /// Whether `candidate` belongs to this range.
    pub fn accepts(&self, candidate: &Component, ctx: &BomContext) -> bool {
        [BomField::Type, BomField::Name, BomField::Doc, BomField::Comment]
            .into_iter()
            .all(|field| {
                self.bom_value(field, Number::AsIs, ctx)
                    == candidate.bom_value(field, Number::AsIs, ctx)
            })
    }

    /// Add `candidate` if it belongs to this range. Returns whether it was added.
    pub fn append(&mut self, candidate: &Component, ctx: &BomContext) -> bool {
        if !self.accepts(candidate, ctx) {
            return false;
        }
        self.designators.push(candidate.reference.clone());
        true
    }

    /// Compressed designator list, e.g. `R7, R9-R14`.
    pub fn designator_range(&self) -> String {
        if self.designators.len() == 1 {
            return self.component.reference.clone();
        }
        refdes::compress_designators(&self.designators)
    }
}

/// Ranges printed under a common heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompGroup {
    ranges: Vec<CompRange>,
}

impl CompGroup {
    pub fn new(first: CompRange) -> Self {
        Self {
            ranges: vec![first],
        }
    }

    pub fn ranges(&self) -> &[CompRange] {
        &self.ranges
    }

    pub fn first(&self) -> &CompRange {
        // A group is never constructed empty.
        &self.ranges[0]
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompRange> {
        self.ranges.iter()
    }

    /// Whether `candidate` may follow the last range of this group.
    ///
    /// Types must match. Untyped ranges additionally need the same designator
    /// letters, so that e.g. untyped `VD` and `VT` parts do not share a heading.
    /// With one group per document the documents must match as well, and an
    /// untyped, undocumented range again falls back to designator letters.
    pub fn accepts(&self, candidate: &CompRange, ctx: &BomContext) -> bool {
        let Some(last) = self.ranges.last() else {
            return true;
        };

        let kind = candidate.bom_value(BomField::Type, Number::AsIs, ctx);
        if last.bom_value(BomField::Type, Number::AsIs, ctx) != kind {
            return false;
        }
        let same_letters = last.component().ref_type() == candidate.component().ref_type();

        if ctx.settings.doc.separate_group_for_each_doc {
            let doc = candidate.bom_value(BomField::Doc, Number::AsIs, ctx);
            last.bom_value(BomField::Doc, Number::AsIs, ctx) == doc
                && (!kind.is_empty() || !doc.is_empty() || same_letters)
        } else {
            !kind.is_empty() || same_letters
        }
    }

    /// Add `candidate` if it fits this group, otherwise hand it back.
    pub fn append(&mut self, candidate: CompRange, ctx: &BomContext) -> Result<(), CompRange> {
        if !self.accepts(&candidate, ctx) {
            return Err(candidate);
        }
        self.ranges.push(candidate);
        Ok(())
    }

    /// Reorder the ranges of this group by `specs`.
    pub fn sort(&mut self, specs: &[SortSpec], ctx: &BomContext) {
        sort_by_levels(&mut self.ranges, specs, |range, field, is_pattern| {
            sort_text(range, field, is_pattern, ctx)
        });
    }
}

impl<'a> IntoIterator for &'a CompGroup {
    type Item = &'a CompRange;
    type IntoIter = std::slice::Iter<'a, CompRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

/// Text of a sort field for a range: a template is expanded, a field name looked up.
fn sort_text(range: &CompRange, field: &str, is_pattern: bool, ctx: &BomContext) -> String {
    let component = range.component();
    if is_pattern {
        component.format_pattern(field, Number::AsIs, ctx)
    } else {
        component.field_value(field, ctx).unwrap_or_default()
    }
}

/// Close a finished range: extend the current group or start a new one.
fn push_range(
    groups: &mut Vec<CompGroup>,
    current: &mut Option<CompGroup>,
    range: CompRange,
    ctx: &BomContext,
) {
    let rejected = match current.as_mut() {
        Some(group) => match group.append(range, ctx) {
            Ok(()) => return,
            Err(range) => range,
        },
        None => range,
    };
    if let Some(finished) = current.replace(CompGroup::new(rejected)) {
        groups.push(finished);
    }
}

/// Group and sort `components` for the BOM.
///
/// This is a pure function of its inputs: calling it again yields an equal result.
pub fn grouped_components(components: &[Component], ctx: &BomContext) -> Vec<CompGroup> {
    let settings = ctx.settings;
    let excluded = settings.fields.excluded.as_str();

    let mut keyed: Vec<((String, String, String), &Component)> = components
        .iter()
        .filter(|comp| excluded.is_empty() || !comp.fields.contains_key(excluded))
        .map(|comp| {
            let kind = comp.bom_value(BomField::Type, Number::AsIs, ctx);
            let name = comp.bom_value(BomField::Name, Number::AsIs, ctx);
            // Untyped parts are ordered by their designator letters.
            let letters = if kind.is_empty() {
                comp.ref_type().unwrap_or_default().to_string()
            } else {
                String::new()
            };
            ((letters, kind, name), comp)
        })
        .collect();
    let skipped = components.len() - keyed.len();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut groups = Vec::new();
    let mut group: Option<CompGroup> = None;
    let mut range: Option<CompRange> = None;
    for (_, comp) in keyed {
        if let Some(current) = range.as_mut() {
            if current.append(comp, ctx) {
                continue;
            }
        }
        if let Some(finished) = range.replace(CompRange::new(comp.clone())) {
            push_range(&mut groups, &mut group, finished, ctx);
        }
    }
    if let Some(finished) = range {
        push_range(&mut groups, &mut group, finished, ctx);
    }
    groups.extend(group);

    for group in &mut groups {
        group.sort(&settings.sort.components, ctx);
    }
    sort_by_levels(&mut groups, &settings.sort.groups, |group, field, is_pattern| {
        sort_text(group.first(), field, is_pattern, ctx)
    });

    log::debug!(
        "Grouped {} components into {} groups ({} excluded)",
        components.len() - skipped,
        groups.len(),
        skipped
    );
    groups
}
