//! Marker-based splitting of free text into named sections.
//!
//! A section starts right after the first case-insensitive match of its
//! header (plus any trailing colons and whitespace) and ends right before
//! the first match of the *next* header in canonical order that occurs after
//! that start. Each header is searched independently, so a header that shows
//! up out of order never makes a section swallow text that precedes its own
//! header.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};

/// Compiled header matchers for an ordered list of sections.
///
/// Build once and reuse; [`SectionExtractor::extract`] takes `&self` and
/// holds no mutable state, so one extractor can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct SectionExtractor<K> {
    sections: Vec<(K, Regex)>,
}

impl<K: Copy + Ord> SectionExtractor<K> {
    /// Compile one matcher per `(key, header)` pair, keeping the given order.
    ///
    /// Headers are matched literally; regex metacharacters in them carry no
    /// special meaning.
    pub fn new(sections: &[(K, &str)]) -> Result<Self, regex::Error> {
        let sections = sections
            .iter()
            .map(|&(key, header)| Ok((key, header_matcher(header)?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { sections })
    }

    /// Split `text` into trimmed section bodies.
    ///
    /// Every key is present in the result. A section whose header cannot be
    /// found maps to the empty string.
    pub fn extract(&self, text: &str) -> BTreeMap<K, String> {
        self.sections
            .iter()
            .enumerate()
            .map(|(index, (key, header))| {
                let next = self.sections.get(index + 1).map(|(_, next)| next);
                (*key, section_body(text, header, next).to_owned())
            })
            .collect()
    }
}

/// One-shot convenience over [`SectionExtractor`].
pub fn extract_sections<K: Copy + Ord>(
    text: &str,
    sections: &[(K, &str)],
) -> Result<BTreeMap<K, String>, regex::Error> {
    Ok(SectionExtractor::new(sections)?.extract(text))
}

fn header_matcher(header: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"{}[:\s]*", regex::escape(header)))
        .case_insensitive(true)
        .build()
}

fn section_body<'t>(text: &'t str, header: &Regex, next: Option<&Regex>) -> &'t str {
    let Some(found) = header.find(text) else {
        return "";
    };
    let start = found.end();
    let end = next
        .and_then(|next| next.find_at(text, start))
        .map_or(text.len(), |m| m.start());
    text[start..end].trim()
}
