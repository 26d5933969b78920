use scraper::ElementRef;

/// Collapses runs of whitespace to a single space and trims the ends.
pub(crate) fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All descendant text of an element, whitespace-collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Aggregate footer rows read "Total" in any casing.
pub(crate) fn is_total(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("total")
}

pub(crate) fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}
