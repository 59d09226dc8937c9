use crate::models::{ExtractedDocxContent, ExtractedXmlRecord};

/// Maximum characters of the content document placed at `{{CONTEUDO}}`.
pub const CONTENT_CHAR_LIMIT: usize = 500;

pub const CLIENT_TOKEN: &str = "{{CLIENTE}}";
pub const DATE_TOKEN: &str = "{{DATA}}";
pub const CONTENT_TOKEN: &str = "{{CONTEUDO}}";

/// Ordered token -> replacement pairs.
///
/// Order matters twice: tokens are applied in insertion order, and a token
/// inserted again keeps its slot but takes the new replacement. The fixed
/// tokens go in first, so an XML `valor` whose `tipo` upper-cases to
/// `CLIENTE`, `DATA` or `CONTEUDO` overrides them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn build(xml: &ExtractedXmlRecord, docx: &ExtractedDocxContent) -> Self {
        let mut map = PlaceholderMap::default();

        map.insert(CLIENT_TOKEN, xml.client.as_str());
        map.insert(DATE_TOKEN, xml.date.as_str());
        map.insert(CONTENT_TOKEN, truncate_chars(&docx.full_text, CONTENT_CHAR_LIMIT));

        for (key, value) in xml.values.iter() {
            map.insert(token_for(key), value);
        }

        map
    }

    pub fn insert(&mut self, token: impl Into<String>, replacement: impl Into<String>) {
        let token = token.into();
        let replacement = replacement.into();
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = replacement,
            None => self.entries.push((token, replacement)),
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, r)| r.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, r)| (t.as_str(), r.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies every pair in order, replacing all occurrences of each token.
    ///
    /// Returns `None` when the text contains no token, so callers can leave
    /// untouched content alone.
    pub fn apply(&self, text: &str) -> Option<String> {
        let mut current: Option<String> = None;

        for (token, replacement) in &self.entries {
            let source = current.as_deref().unwrap_or(text);
            if source.contains(token.as_str()) {
                current = Some(source.replace(token.as_str(), replacement));
            }
        }

        current
    }
}

/// `{{` + upper-cased key + `}}`
pub fn token_for(key: &str) -> String {
    format!("{{{{{}}}}}", key.to_uppercase())
}

/// Raw prefix of at most `limit` characters, no marker.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}
