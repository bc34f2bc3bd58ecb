use scraper::{ElementRef, Html};

/// Autoindex pages link back to the parent directory; never a file entry.
const PARENT_LINK: &str = "../";

/// Extract the `href` targets of all anchors inside the page's first
/// `<pre>` block, in document order, excluding the parent-directory link.
///
/// Returns `None` when the page has no `<pre>` element at all, so the
/// caller can tell "not an autoindex page" apart from "empty directory".
/// Entries are treated as opaque filenames; no decoding or validation.
pub fn extract_entries(html: &str) -> Option<Vec<String>> {
    let document = Html::parse_document(html);
    let pre = find_first_pre(document.root_element())?;

    let mut entries = Vec::new();
    for node in pre.descendants() {
        if let Some(element) = ElementRef::wrap(node) {
            if !element.value().name().eq_ignore_ascii_case("a") {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                if href != PARENT_LINK {
                    entries.push(href.to_string());
                }
            }
        }
    }
    Some(entries)
}

fn find_first_pre(root: ElementRef) -> Option<ElementRef> {
    for node in root.descendants() {
        if let Some(element) = ElementRef::wrap(node) {
            if element.value().name().eq_ignore_ascii_case("pre") {
                return Some(element);
            }
        }
    }
    None
}
