use chrono::NaiveDate;

use csvload::clean::{CleanReport, Cleaner, CleanerSettings, InferredType};
use csvload::model::{CellValue, Table};
use csvload::parser::CsvParser;

fn cleaner() -> Cleaner {
    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    Cleaner::new(CleanerSettings::default().with_today(today))
}

fn load(text: &str) -> Table {
    CsvParser::comma().parse_reader(text.as_bytes()).unwrap()
}

#[test]
fn median_fill_of_numeric_column() {
    let mut table = load("id,amount\n1,10\n2,\n3,20\n4,30\n");
    let mut report = CleanReport::default();

    cleaner().fill_missing(&mut table, &mut report).unwrap();

    assert_eq!(
        table.column_cells(1),
        vec![
            CellValue::Float(10.0),
            CellValue::Float(20.0),
            CellValue::Float(20.0),
            CellValue::Float(30.0),
        ]
    );
    assert_eq!(report.fills[0].value, "20.0");
}

#[test]
fn nan_fields_are_filled_like_blanks() {
    let mut table = load("id,price\n1,1\n2,\n3,NAN\n4,3\n");
    let mut report = CleanReport::default();

    cleaner().fill_missing(&mut table, &mut report).unwrap();

    assert_eq!(
        table.column_cells(1),
        vec![
            CellValue::Float(1.0),
            CellValue::Float(2.0),
            CellValue::Float(2.0),
            CellValue::Float(3.0),
        ]
    );
    assert_eq!(report.fills[0].count, 2);
}

#[test]
fn duplicates_leave_an_ordered_subsequence() {
    let mut table = load("n,s\n1,a\n2,b\n1,a\n3,c\n2,b\n1,a\n");
    let original = table.rows.clone();
    let mut report = CleanReport::default();

    cleaner().remove_duplicates(&mut table, &mut report);

    assert_eq!(report.duplicates_removed, 3);
    let lines: Vec<usize> = table.rows.iter().map(|r| r.source_line).collect();
    assert_eq!(lines, vec![2, 3, 5]);

    let mut cursor = original.iter();
    for row in &table.rows {
        assert!(cursor.any(|o| o == row));
    }
    for (i, a) in table.rows.iter().enumerate() {
        for b in &table.rows[i + 1..] {
            assert_ne!(a.cells, b.cells);
        }
    }
}

#[test]
fn boolean_column_from_yes_no_tokens() {
    let mut table = load("active\nYes\nno\nY\nmaybe\n");
    let mut report = CleanReport::default();

    cleaner().infer_and_convert_types(&mut table, &mut report);

    assert_eq!(report.inferred_type("active"), Some(InferredType::Boolean));
    assert_eq!(
        table.column_cells(0),
        vec![
            CellValue::Bool(true),
            CellValue::Bool(false),
            CellValue::Bool(true),
            CellValue::Null,
        ]
    );
}

#[test]
fn full_run_is_deterministic() {
    let text = "\
id,joined_date,score,flag,label
1,2023-01-05,1.5,yes,a
2,bad,x,no,b
3,2023/02/01,2.5,,a
4,03/04/2023,3.5,y,
";
    let mut first = load(text);
    let mut second = load(text);

    let report_a = cleaner().run(&mut first).unwrap();
    let report_b = cleaner().run(&mut second).unwrap();

    assert_eq!(report_a, report_b);
    assert_eq!(first.rows, second.rows);

    for (index, column) in first.columns.iter().enumerate() {
        assert_eq!(first.null_count(index), 0, "{} kept nulls", column.name);
    }
    assert_eq!(report_a.inferred_type("joined_date"), Some(InferredType::Date));
    assert_eq!(report_a.inferred_type("score"), Some(InferredType::Float));
    assert_eq!(report_a.inferred_type("flag"), Some(InferredType::Boolean));
    assert_eq!(report_a.inferred_type("label"), Some(InferredType::String));
}
