//! Flattens fetched news into the plain-text corpus fed to the model.

use sentiprof_core::NewsDocument;

/// Join every usable article into one corpus, separated by blank lines.
///
/// Articles with blank text are skipped; highlights alone do not make an
/// article. Returns an empty string when nothing is usable. Output depends
/// only on the input, so repeated calls are byte-identical.
#[must_use]
pub fn aggregate(documents: &[NewsDocument]) -> String {
    documents
        .iter()
        .filter_map(format_article)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_article(document: &NewsDocument) -> Option<String> {
    if document.text.trim().is_empty() {
        return None;
    }
    if document.highlights.is_empty() {
        Some(format!("Article: {}\n", document.text))
    } else {
        Some(format!(
            "Article: {}\nHighlights: {}\n",
            document.text,
            document.highlights.join(" ")
        ))
    }
}
