//! Subsection discovery from a section's landing page.

use scraper::{ElementRef, Html};
use vitibrasil_api::types::Subsection;

use crate::text::{collapse_whitespace, element_text, has_class};

const SUBSECTION_CLASS: &str = "btn_sopt";
const SUBSECTION_VALUE_PREFIX: &str = "subopt_";

/// Lists the subsection buttons on a landing page, in document order.
///
/// A button qualifies when it carries the `btn_sopt` class or its value starts
/// with `subopt_`. An empty list is a valid answer.
pub fn resolve_subsections(doc: &Html) -> Vec<Subsection> {
    doc.select(selector!(r#"button[name="subopcao"]"#))
        .filter_map(subsection_from_button)
        .collect()
}

fn subsection_from_button(button: ElementRef<'_>) -> Option<Subsection> {
    let code = button.value().attr("value")?.trim();
    if code.is_empty() {
        return None;
    }
    if !has_class(button, SUBSECTION_CLASS) && !code.starts_with(SUBSECTION_VALUE_PREFIX) {
        return None;
    }
    let mut name = element_text(button);
    if name.is_empty() {
        name = collapse_whitespace(code);
    }
    Some(Subsection {
        name,
        code: code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMPORT_LANDING: &str = r#"
        <html><body><form>
          <p>
            <button type="submit" class="btn_sopt" name="subopcao" value="subopt_01">Vinhos
                de mesa</button>
            <button type="submit" class="btn_sopt" name="subopcao" value="subopt_02">Espumantes</button>
            <button type="submit" name="subopcao" value="subopt_03">  Uvas   frescas </button>
            <button type="submit" class="btn_sopt" name="subopcao" value="extra_9">Passas</button>
            <button type="submit" name="subopcao" value="other">Ignored</button>
            <button type="submit" name="opcao" value="opt_05">Importação</button>
          </p>
        </form></body></html>
    "#;

    #[test]
    fn lists_marked_buttons_in_order() {
        let doc = Html::parse_document(IMPORT_LANDING);
        let subs = resolve_subsections(&doc);
        let codes: Vec<&str> = subs.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["subopt_01", "subopt_02", "subopt_03", "extra_9"]);
    }

    #[test]
    fn names_are_whitespace_collapsed() {
        let doc = Html::parse_document(IMPORT_LANDING);
        let subs = resolve_subsections(&doc);
        assert_eq!(subs[0].name, "Vinhos de mesa");
        assert_eq!(subs[2].name, "Uvas frescas");
    }

    #[test]
    fn blank_button_text_falls_back_to_code() {
        let doc = Html::parse_document(
            r#"<button class="btn_sopt" name="subopcao" value="subopt_07"> </button>"#,
        );
        let subs = resolve_subsections(&doc);
        assert_eq!(
            subs,
            vec![Subsection {
                name: "subopt_07".to_string(),
                code: "subopt_07".to_string()
            }]
        );
    }

    #[test]
    fn page_without_buttons_is_empty() {
        let doc = Html::parse_document("<html><body><table></table></body></html>");
        assert!(resolve_subsections(&doc).is_empty());
    }
}
