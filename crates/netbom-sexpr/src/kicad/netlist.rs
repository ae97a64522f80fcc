//! KiCad netlist export helpers.

use crate::Sexpr;

use super::props::{atom_prop, child_list, int_prop};

/// Find the root sheet `(sheet (name "/") ...)` inside the `(design ...)` block.
///
/// Falls back to the first sheet when none is named `/`.
pub fn root_sheet(design: &[Sexpr]) -> Option<&[Sexpr]> {
    let sheets = crate::find_all_child_lists(design, "sheet");
    sheets
        .iter()
        .find(|sheet| atom_prop(sheet, "name").as_deref() == Some("/"))
        .or_else(|| sheets.first())
        .copied()
}

/// Collect `(comment (number N) (value "..."))` entries of a `(title_block ...)`.
pub fn title_block_comments(title_block: &[Sexpr]) -> Vec<(i64, String)> {
    crate::find_all_child_lists(title_block, "comment")
        .into_iter()
        .filter_map(|comment| {
            let number = int_prop(comment, "number")?;
            let value = atom_prop(comment, "value").unwrap_or_default();
            Some((number, value))
        })
        .collect()
}

/// Collect the user fields `(fields (field (name "X") "text") ...)` of a `(comp ...)`.
///
/// KiCad 6+ writes the name as a child list, KiCad 5 writes `(field (name X) text)`
/// with bare atoms; both read the same. A field without text yields an empty string.
pub fn comp_fields(comp: &[Sexpr]) -> Vec<(String, String)> {
    let Some(fields) = child_list(comp, "fields") else {
        return Vec::new();
    };

    crate::find_all_child_lists(fields, "field")
        .into_iter()
        .filter_map(|field| {
            let name = atom_prop(field, "name")?;
            let text = field
                .iter()
                .skip(1)
                .find_map(Sexpr::as_atom)
                .unwrap_or_default()
                .to_string();
            Some((name, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn fields_of_a_component() {
        let comp = parse(
            r#"(comp (ref "R1")
                 (fields
                   (field (name "Тип") "Резистор")
                   (field (name Примечание))
                   (field (name "Код") "А.01")))"#,
        )
        .unwrap();
        let fields = comp_fields(comp.as_list().unwrap());
        assert_eq!(
            fields,
            vec![
                ("Тип".to_string(), "Резистор".to_string()),
                ("Примечание".to_string(), String::new()),
                ("Код".to_string(), "А.01".to_string()),
            ]
        );
    }

    #[test]
    fn root_sheet_and_comments() {
        let design = parse(
            r#"(design
                 (sheet (number 2) (name "/sub/"))
                 (sheet (number 1) (name "/")
                   (title_block (title "Блок")
                     (comment (number 1) (value "АБВГ.123"))
                     (comment (number "2") (value "Иванов")))))"#,
        )
        .unwrap();
        let sheet = root_sheet(design.as_list().unwrap()).unwrap();
        assert_eq!(int_prop(sheet, "number"), Some(1));
        let block = child_list(sheet, "title_block").unwrap();
        assert_eq!(
            title_block_comments(block),
            vec![(1, "АБВГ.123".to_string()), (2, "Иванов".to_string())]
        );
    }
}
