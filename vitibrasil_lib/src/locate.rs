//! Locating the data table inside a page.
//!
//! Markup differs across sections and years, so the locator runs an ordered
//! chain of [`TableStrategy`] implementations and takes the first hit. New
//! layouts get a new strategy rather than another branch in an existing one.

use std::fmt;

use scraper::{ElementRef, Html};

use crate::table::{child_elements, direct_rows};
use crate::text::has_class;

/// One way of finding the data table in a document.
pub trait TableStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the table this strategy recognizes, if any.
    fn attempt<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>>;
}

/// A table carrying the `tb_dados` class.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataTableMarker;

impl TableStrategy for DataTableMarker {
    fn name(&self) -> &'static str {
        "data-table-marker"
    }

    fn attempt<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        doc.select(selector!("table.tb_dados")).next()
    }
}

/// A `tb_dados` table wrapped one level deep inside a `tb_base` table.
/// A base table with nothing nested is not a match.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedInBaseTable;

impl TableStrategy for NestedInBaseTable {
    fn name(&self) -> &'static str {
        "nested-in-base-table"
    }

    fn attempt<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        doc.select(selector!("table.tb_base"))
            .find_map(|base| base.select(selector!("table.tb_dados")).next())
    }
}

/// The first table whose own rows hold a cell marked as an item or sub-item.
/// Cells of nested tables do not count, so a layout wrapper never wins over
/// the table it wraps.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemCellScan;

impl TableStrategy for ItemCellScan {
    fn name(&self) -> &'static str {
        "item-cell-scan"
    }

    fn attempt<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        doc.select(selector!("table")).find(|&table| {
            direct_rows(table).into_iter().any(|row| {
                child_elements(row).any(|cell| {
                    matches!(cell.value().name(), "td" | "th")
                        && (has_class(cell, "tb_item") || has_class(cell, "tb_subitem"))
                })
            })
        })
    }
}

/// The table with the most direct (non-nested) rows; the earliest wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestTable;

impl TableStrategy for LargestTable {
    fn name(&self) -> &'static str {
        "largest-table"
    }

    fn attempt<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        let mut best: Option<(usize, ElementRef<'a>)> = None;
        for table in doc.select(selector!("table")) {
            let rows = direct_rows(table).len();
            if best.map_or(true, |(most, _)| rows > most) {
                best = Some((rows, table));
            }
        }
        best.map(|(_, table)| table)
    }
}

/// Ordered strategy chain.
pub struct TableLocator {
    strategies: Vec<Box<dyn TableStrategy>>,
}

impl Default for TableLocator {
    /// Marker, nested marker, item-cell scan, then largest table.
    fn default() -> Self {
        Self::new(vec![
            Box::new(DataTableMarker),
            Box::new(NestedInBaseTable),
            Box::new(ItemCellScan),
            Box::new(LargestTable),
        ])
    }
}

impl fmt::Debug for TableLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.name()))
            .finish()
    }
}

impl TableLocator {
    pub fn new(strategies: Vec<Box<dyn TableStrategy>>) -> Self {
        Self { strategies }
    }

    /// Appends a strategy that runs after the existing ones.
    pub fn with_strategy(mut self, strategy: impl TableStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Runs the chain. `None` means the page has no table at all (or none the
    /// configured strategies accept); callers treat that as an empty result.
    pub fn locate<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        for strategy in &self.strategies {
            if let Some(table) = strategy.attempt(doc) {
                tracing::debug!("Data table located by {}", strategy.name());
                return Some(table);
            }
        }
        tracing::debug!("No data table found");
        None
    }
}

/// Locates the data table with the default strategy chain.
pub fn locate_table(doc: &Html) -> Option<ElementRef<'_>> {
    TableLocator::default().locate(doc)
}
