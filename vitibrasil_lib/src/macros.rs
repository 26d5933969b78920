/// Compiles a constant CSS selector once and hands out a `&'static Selector`.
/// ```ignore
/// let tables = doc.select(selector!("table.tb_dados"));
/// ```
macro_rules! selector {
    ($css:literal) => {{
        static SELECTOR: ::std::sync::OnceLock<::scraper::Selector> =
            ::std::sync::OnceLock::new();
        SELECTOR.get_or_init(|| {
            ::scraper::Selector::parse($css).expect(concat!("invalid selector: ", $css))
        })
    }};
}
