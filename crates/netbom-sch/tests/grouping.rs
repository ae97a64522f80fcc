use netbom_sch::refdes::compress_designators;
use netbom_sch::template::{expand, is_pattern};
use netbom_sch::value::{Family, expanded_value, format_with_units};
use netbom_sch::{Bom, Settings, SortData, SortOrder, SortSpec, parse_netlist};

const NETLIST: &str = r#"(export (version "E")
  (design
    (sheet (number "1") (name "/") (tstamps "/")
      (title_block
        (title "Усилитель")
        (comment (number "1") (value "АБВГ.468731.002")))))
  (components
    (comp (ref "R10") (value "10k")
      (fields (field (name "Тип") "Резистор {Резисторы}") (field (name "Класс точности") "±5%")))
    (comp (ref "R9") (value "10k")
      (fields (field (name "Тип") "Резистор {Резисторы}") (field (name "Класс точности") "±5%")))
    (comp (ref "R11") (value "10k")
      (fields (field (name "Тип") "Резистор {Резисторы}") (field (name "Класс точности") "±5%")))
    (comp (ref "R2") (value "R47")
      (fields (field (name "Тип") "Резистор {Резисторы}")))
    (comp (ref "C2") (value "2u2")
      (fields (field (name "Тип") "Конденсатор {Конденсаторы}")))
    (comp (ref "C1") (value "100")
      (fields (field (name "Тип") "Конденсатор {Конденсаторы}")))
    (comp (ref "VD2") (value "1N4148"))
    (comp (ref "VD1") (value "1N4148"))
    (comp (ref "TP1") (value "~")
      (fields (field (name "Исключить") "")))))"#;

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.fields.name = "${Значение}${ |Класс точности|}".to_string();
    settings.fields.excluded = "Исключить".to_string();
    settings
}

fn rows(settings: &Settings) -> Vec<String> {
    let schematic = parse_netlist(NETLIST).unwrap();
    Bom::new(&schematic, settings)
        .rows
        .iter()
        .map(|row| match row.quantity {
            Some(q) => format!("{} | {} | {q}", row.designators, row.name),
            None => format!("# {}", row.name),
        })
        .collect()
}

#[test]
fn bom_from_netlist() {
    insta::assert_debug_snapshot!(rows(&settings()), @r##"
    [
        "# Конденсаторы",
        "C1 | 100пФ | 1",
        "C2 | 2,2мкФ | 1",
        "# Резисторы",
        "R2 | 0,47Ом | 1",
        "R9-R11 | 10кОм ±5% | 3",
        "VD1, VD2 | 1N4148 | 2",
    ]
    "##);
}

#[test]
fn descending_component_sort() {
    let mut settings = settings();
    settings.sort.components = vec![SortSpec::new(
        "Значение!",
        SortOrder::Descending,
        SortData::Number,
    )];
    let rows = rows(&settings);
    assert_eq!(rows[1], "C2 | 2,2мкФ | 1");
    assert_eq!(rows[2], "C1 | 100пФ | 1");
}

#[test]
fn grouping_is_repeatable() {
    let schematic = parse_netlist(NETLIST).unwrap();
    let settings = settings();
    assert_eq!(
        schematic.grouped_components(&settings),
        schematic.grouped_components(&settings)
    );
}

#[test]
fn excluded_component_never_appears() {
    let schematic = parse_netlist(NETLIST).unwrap();
    let groups = schematic.grouped_components(&settings());
    assert!(
        groups
            .iter()
            .flat_map(|g| g.iter())
            .flat_map(|r| r.designators())
            .all(|d| d != "TP1")
    );
}

#[test]
fn range_compression() {
    assert_eq!(
        compress_designators(&["R9", "R10", "R11", "R13", "R14"]),
        "R9-R11, R13, R14"
    );
    assert_eq!(compress_designators(&["R5"]), "R5");
    assert_eq!(compress_designators(&["VD1", "VD2"]), "VD1, VD2");
}

#[test]
fn template_prefix_disappears_with_value() {
    let absent = expand("${-|Класс точности|}", |_| None);
    let empty = expand("${-|Класс точности|}", |_| Some(String::new()));
    let set = expand("${-|Класс точности|}", |_| Some("±5%".to_string()));
    assert_eq!((absent.as_str(), empty.as_str(), set.as_str()), ("", "", "-±5%"));
}

#[test]
fn template_check_mode() {
    assert!(is_pattern("${Значение}"));
    assert!(!is_pattern("R10"));
    assert!(!is_pattern("${prefix|name"));
    assert_eq!(expand("${prefix|name", |_| Some("x".to_string())), "${prefix|name");
}

#[test]
fn capacitor_magnitudes_order() {
    // Plain integers are picofarads, decimals microfarads.
    assert!(expanded_value(Family::Capacitor, "1,0") > expanded_value(Family::Capacitor, "100"));
    assert!(expanded_value(Family::Capacitor, "1") < expanded_value(Family::Capacitor, "100"));
}

#[test]
fn normalizing_twice_is_a_no_op() {
    for (family, value) in [
        (Family::Capacitor, "4,7мкФ"),
        (Family::Inductor, "10 мкГн"),
        (Family::Resistor, "0,47Ом"),
    ] {
        assert_eq!(format_with_units(family, value, true), value);
    }
}
