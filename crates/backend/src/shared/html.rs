/// Sanitize announcement HTML before it is stored.
///
/// Rules:
/// - `<script>`/`<style>` tags are removed together with their content
/// - `on*` attributes and `javascript:` URIs are dropped
/// - basic formatting tags, lists, tables and links are kept
pub fn sanitize_html(html: &str) -> String {
    ammonia::Builder::new()
        .tags(maplit::hashset![
            "p", "br", "hr", "div", "span", "h1", "h2", "h3", "h4",
            "ul", "ol", "li", "strong", "em", "b", "i", "u", "small",
            "blockquote", "a", "table", "thead", "tbody", "tr", "td", "th",
        ])
        .generic_attributes(maplit::hashset!["class", "title"])
        .clean(html)
        .to_string()
}
