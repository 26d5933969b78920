//! Turning a located table into normalized records.
//!
//! Tables encode a two-level hierarchy: category rows (a single cell spanning
//! the table, or a `tb_item` first cell) followed by `tb_subitem` rows that
//! belong to them. The current category is carried as local state while the
//! rows of one table are walked.

use scraper::{ElementRef, Html};

use crate::locate::TableLocator;
use crate::record::{DataRecord, Metrics};
use crate::text::{collapse_whitespace, element_text, has_class, is_total};

/// Stored for blank and `-` cells; the site prints those for zero.
const ZERO_VALUE: &str = "0";
const PLACEHOLDER_VALUE: &str = "-";
/// Name given to a metric column whose header is blank.
const UNNAMED_METRIC: &str = "Valor";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CellRole {
    Item,
    SubItem,
    Plain,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub text: String,
    pub role: CellRole,
    pub colspan: usize,
}

/// Header texts plus body rows, between location and normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// A row together with whether it sits in the table's `thead`.
struct SectionRow<'a> {
    row: ElementRef<'a>,
    in_head: bool,
}

pub(crate) fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

fn section_rows(table: ElementRef<'_>) -> Vec<SectionRow<'_>> {
    let mut rows = Vec::new();
    for child in child_elements(table) {
        match child.value().name() {
            "tr" => rows.push(SectionRow {
                row: child,
                in_head: false,
            }),
            section @ ("thead" | "tbody" | "tfoot") => {
                let in_head = section == "thead";
                rows.extend(
                    child_elements(child)
                        .filter(|el| el.value().name() == "tr")
                        .map(|row| SectionRow { row, in_head }),
                );
            }
            _ => {}
        }
    }
    rows
}

/// Rows that belong to this table itself, not to tables nested in its cells.
pub(crate) fn direct_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    section_rows(table).into_iter().map(|r| r.row).collect()
}

fn parse_cell(cell: ElementRef<'_>) -> Cell {
    let role = if has_class(cell, "tb_subitem") {
        CellRole::SubItem
    } else if has_class(cell, "tb_item") {
        CellRole::Item
    } else {
        CellRole::Plain
    };
    let colspan = cell
        .value()
        .attr("colspan")
        .and_then(|span| span.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);
    Cell {
        text: element_text(cell),
        role,
        colspan,
    }
}

fn parse_row(row: ElementRef<'_>) -> Vec<Cell> {
    child_elements(row)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(parse_cell)
        .collect()
}

impl ParsedTable {
    /// Reads headers and body rows from a table element.
    ///
    /// The header row is the first row of `thead`; without a `thead`, the first
    /// row of the table. Other `thead` rows are neither headers nor data.
    pub(crate) fn from_element(table: ElementRef<'_>) -> Self {
        let rows = section_rows(table);
        let has_head = rows.iter().any(|r| r.in_head);

        let mut headers = None;
        let mut body = Vec::new();
        for SectionRow { row, in_head } in rows {
            if headers.is_none() && (in_head || !has_head) {
                headers = Some(
                    parse_row(row)
                        .into_iter()
                        .map(|cell| cell.text)
                        .collect::<Vec<_>>(),
                );
            } else if !in_head {
                body.push(parse_row(row));
            }
        }

        Self {
            headers: headers.unwrap_or_default(),
            rows: body,
        }
    }
}

/// Names of the metric columns (every column after the first).
fn metric_names(headers: &[String]) -> Vec<String> {
    let metric_headers = headers.get(1..).unwrap_or_default();
    let unnamed = metric_headers.iter().filter(|h| h.is_empty()).count();
    let mut seen_unnamed = 0;
    metric_headers
        .iter()
        .map(|header| {
            if !header.is_empty() {
                return header.clone();
            }
            seen_unnamed += 1;
            if unnamed == 1 {
                UNNAMED_METRIC.to_string()
            } else {
                format!("{} {}", UNNAMED_METRIC, seen_unnamed)
            }
        })
        .collect()
}

fn normalize_value(raw: &str) -> String {
    let value = collapse_whitespace(raw);
    if value.is_empty() || value == PLACEHOLDER_VALUE {
        ZERO_VALUE.to_string()
    } else {
        value
    }
}

/// Emits one record per data row.
///
/// Rows whose cell count differs from the header count, rows named "Total",
/// and rows with no item name are skipped. Category header rows only update
/// the category context. In tables with metric columns, rows whose metric
/// cells are all blank are dropped; a one-column table keeps every valid row.
pub(crate) fn normalize(
    table: &ParsedTable,
    year: i32,
    subsection_name: Option<&str>,
) -> Vec<DataRecord> {
    let width = table.headers.len();
    if width == 0 {
        return Vec::new();
    }
    let names = metric_names(&table.headers);
    let has_metrics = width > 1;

    let mut category: Option<String> = None;
    let mut records = Vec::new();

    for row in &table.rows {
        if let [only] = row.as_slice() {
            if has_metrics && only.colspan >= width {
                if !only.text.is_empty() && !is_total(&only.text) {
                    category = Some(only.text.clone());
                }
                continue;
            }
        }

        if row.len() != width {
            tracing::trace!("Skipping row with {} cells, expected {}", row.len(), width);
            continue;
        }

        let item = &row[0];
        if item.text.is_empty() || is_total(&item.text) {
            continue;
        }
        if item.role == CellRole::Item {
            category = Some(item.text.clone());
        }

        let values = &row[1..];
        if has_metrics && values.iter().all(|cell| cell.text.is_empty()) {
            continue;
        }

        let parent_category = match (&category, item.role) {
            (Some(current), CellRole::SubItem) if *current != item.text => Some(current.clone()),
            _ => None,
        };

        let metrics: Metrics = names
            .iter()
            .zip(values)
            .map(|(name, cell)| (name.clone(), normalize_value(&cell.text)))
            .collect();

        records.push(DataRecord {
            item_name: item.text.clone(),
            year,
            subsection_name: subsection_name.map(str::to_string),
            parent_category,
            metrics,
        });
    }

    records
}

/// Normalizes a located table element.
pub fn normalize_table(
    table: ElementRef<'_>,
    year: i32,
    subsection_name: Option<&str>,
) -> Vec<DataRecord> {
    normalize(&ParsedTable::from_element(table), year, subsection_name)
}

/// Locates the data table with the default chain and normalizes it. A page
/// without a table yields no records.
pub fn extract_records(doc: &Html, year: i32, subsection_name: Option<&str>) -> Vec<DataRecord> {
    extract_with(&TableLocator::default(), doc, year, subsection_name)
}

pub(crate) fn extract_with(
    locator: &TableLocator,
    doc: &Html,
    year: i32,
    subsection_name: Option<&str>,
) -> Vec<DataRecord> {
    match locator.locate(doc) {
        Some(table) => normalize_table(table, year, subsection_name),
        None => Vec::new(),
    }
}
