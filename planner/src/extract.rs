//! Extraction of the fenced document from raw model output.

/// Marker that opens and closes a fenced block.
pub const FENCE: &str = "```";

/// Pulls the document out of a language-tagged fenced block.
///
/// Output without an opening fence is returned unchanged. An opening fence
/// without a closing one yields everything after the opening fence; the
/// validator decides whether that is usable.
#[derive(Debug, Clone)]
pub struct ResponseExtractor {
    marker: String,
}

impl ResponseExtractor {
    /// Creates an extractor for fences tagged with `tag` (e.g. `xml`).
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            marker: format!("{FENCE}{tag}"),
        }
    }

    /// Returns the document contained in `raw`.
    ///
    /// ```
    /// use mission_planner::ResponseExtractor;
    ///
    /// let extractor = ResponseExtractor::new("xml");
    /// assert_eq!(extractor.extract("Sure:\n```xml\n<plan/>\n```\nDone."), "<plan/>\n");
    /// assert_eq!(extractor.extract("<plan/>"), "<plan/>");
    /// ```
    #[must_use]
    pub fn extract<'a>(&self, raw: &'a str) -> &'a str {
        let Some(start) = self.body_start(raw) else {
            return raw;
        };
        let body = &raw[start..];
        body.find(FENCE).map_or(body, |end| &body[..end])
    }

    /// Byte offset just past the first opening fence and its line break.
    fn body_start(&self, raw: &str) -> Option<usize> {
        let mut from = 0;
        while let Some(pos) = raw[from..].find(&self.marker) {
            let after = from + pos + self.marker.len();
            let rest = &raw[after..];
            if rest.starts_with('\n') {
                return Some(after + 1);
            }
            if rest.starts_with("\r\n") {
                return Some(after + 2);
            }
            from = after;
        }
        None
    }
}
