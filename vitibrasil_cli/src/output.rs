use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use vitibrasil_lib::{DataRecord, Section, Subsection, YearRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
pub struct YearsRow {
    #[tabled(rename = "Section")]
    #[serde(rename = "section")]
    pub section: String,
    #[tabled(rename = "Subsection")]
    #[serde(rename = "subsection")]
    pub subsection: String,
    #[tabled(rename = "First Year")]
    #[serde(rename = "min_year")]
    pub min_year: String,
    #[tabled(rename = "Last Year")]
    #[serde(rename = "max_year")]
    pub max_year: String,
}

#[derive(Tabled, Serialize)]
struct SubsectionRow {
    #[tabled(rename = "Code")]
    #[serde(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Tabled, Serialize)]
pub struct StatusRow {
    #[tabled(rename = "Section")]
    #[serde(rename = "Section")]
    pub section: String,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Years")]
    #[serde(rename = "Years")]
    pub years: String,
    #[tabled(rename = "Latency (ms)")]
    #[serde(rename = "Latency (ms)")]
    pub latency_ms: u64,
}

// -- Row builders --

pub fn build_years_row(section: Section, subsection: Option<&str>, range: &YearRange) -> YearsRow {
    let bound = |year: Option<i32>| year.map(|y| y.to_string()).unwrap_or_default();
    YearsRow {
        section: section.to_string(),
        subsection: subsection.unwrap_or_default().to_string(),
        min_year: bound(range.min_year),
        max_year: bound(range.max_year),
    }
}

fn build_subsection_rows(subsections: &[Subsection]) -> Vec<SubsectionRow> {
    subsections
        .iter()
        .map(|s| SubsectionRow {
            code: s.code.clone(),
            name: s.name.clone(),
        })
        .collect()
}

/// Metric columns across all records, in first-seen order. Pages from
/// different years may label their columns differently.
fn metric_columns(records: &[DataRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.metrics.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.to_string());
            }
        }
    }
    columns
}

fn record_header(columns: &[String]) -> Vec<String> {
    let mut header: Vec<String> = ["Year", "Item", "Category", "Subsection"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    header.extend(columns.iter().cloned());
    header
}

fn record_cells(record: &DataRecord, columns: &[String]) -> Vec<String> {
    let mut cells = vec![
        record.year.to_string(),
        record.item_name.clone(),
        record.parent_category.clone().unwrap_or_default(),
        record.subsection_name.clone().unwrap_or_default(),
    ];
    cells.extend(
        columns
            .iter()
            .map(|c| record.metrics.get(c).unwrap_or_default().to_string()),
    );
    cells
}

fn records_table(records: &[DataRecord]) -> Table {
    let columns = metric_columns(records);
    let mut builder = Builder::default();
    builder.push_record(record_header(&columns));
    for record in records {
        builder.push_record(record_cells(record, &columns));
    }
    builder.build()
}

// -- Table output --

pub fn print_records_table(records: &[DataRecord]) {
    println!("{}", records_table(records));
}

pub fn print_subsections_table(subsections: &[Subsection]) {
    println!("{}", Table::new(build_subsection_rows(subsections)));
}

pub fn print_rows_table<T: Tabled>(rows: &[T]) {
    println!("{}", Table::new(rows));
}

// -- Markdown output --

pub fn print_records_markdown(records: &[DataRecord]) {
    let mut table = records_table(records);
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_subsections_markdown(subsections: &[Subsection]) {
    let mut table = Table::new(build_subsection_rows(subsections));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_rows_markdown<T: Tabled>(rows: &[T]) {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

pub fn write_records_csv<W: Write>(writer: W, records: &[DataRecord]) -> Result<()> {
    let columns = metric_columns(records);
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(record_header(&columns))?;
    for record in records {
        wtr.write_record(record_cells(record, &columns))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_records_csv(records: &[DataRecord]) -> Result<()> {
    write_records_csv(std::io::stdout(), records)
}

pub fn print_subsections_csv(subsections: &[Subsection]) -> Result<()> {
    print_rows_csv(&build_subsection_rows(subsections))
}

pub fn print_rows_csv<T: Serialize>(rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitibrasil_lib::Metrics;

    fn record(year: i32, item: &str, parent: Option<&str>, metrics: &[(&str, &str)]) -> DataRecord {
        DataRecord {
            item_name: item.to_string(),
            year,
            subsection_name: None,
            parent_category: parent.map(str::to_string),
            metrics: metrics.iter().copied().collect::<Metrics>(),
        }
    }

    fn sample() -> Vec<DataRecord> {
        vec![
            record(2022, "VINHO DE MESA", None, &[("Quantidade (L.)", "169.762.429")]),
            record(
                2022,
                "Tinto",
                Some("VINHO DE MESA"),
                &[("Quantidade (L.)", "139.320.884")],
            ),
        ]
    }

    #[test]
    fn test_metric_columns_union_in_first_seen_order() {
        let records = vec![
            record(2020, "A", None, &[("Kg", "1"), ("US$", "2")]),
            record(2021, "B", None, &[("Kg", "3"), ("Valor", "4")]),
        ];
        assert_eq!(metric_columns(&records), vec!["Kg", "US$", "Valor"]);
    }

    #[test]
    fn test_record_cells_fill_missing_metric_with_blank() {
        let columns = vec!["Kg".to_string(), "Valor".to_string()];
        let cells = record_cells(&record(2020, "A", Some("Cat"), &[("Kg", "1")]), &columns);
        assert_eq!(cells, vec!["2020", "A", "Cat", "", "1", ""]);
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let mut buf = Vec::new();
        write_records_csv(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Year,Item,Category,Subsection,Quantidade (L.)");
        assert_eq!(lines[1], "2022,VINHO DE MESA,,,169.762.429");
        assert_eq!(lines[2], "2022,Tinto,VINHO DE MESA,,139.320.884");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_of_no_records_is_header_only() {
        let mut buf = Vec::new();
        write_records_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Year,Item,Category,Subsection\n");
    }

    #[test]
    fn test_records_table_contains_values() {
        let rendered = records_table(&sample()).to_string();
        assert!(rendered.contains("Quantidade (L.)"));
        assert!(rendered.contains("139.320.884"));
        assert!(rendered.contains("VINHO DE MESA"));
    }

    #[test]
    fn test_markdown_style_uses_pipes() {
        let mut table = records_table(&sample());
        table.with(Style::markdown());
        let rendered = table.to_string();
        assert!(rendered.lines().all(|l| l.starts_with('|')));
    }

    #[test]
    fn test_years_row_blank_for_unknown_bounds() {
        let row = build_years_row(Section::Import, Some("subopt_01"), &YearRange::unknown());
        assert_eq!(row.section, "import");
        assert_eq!(row.subsection, "subopt_01");
        assert_eq!(row.min_year, "");
        assert_eq!(row.max_year, "");
    }

    #[test]
    fn test_subsection_rows_mapping() {
        let rows = build_subsection_rows(&[Subsection {
            name: "Espumantes".to_string(),
            code: "subopt_02".to_string(),
        }]);
        assert_eq!(rows[0].code, "subopt_02");
        assert_eq!(rows[0].name, "Espumantes");
    }
}
