//! Field tag parsing
//!
//! A tag string is a space separated sequence of `key:"value"` pairs, e.g.
//! `json:"name" orm:"name"`. Values are double-quoted and may contain `\"`
//! and `\\` escapes. A key that appears twice keeps its first value.

use std::fmt;

use rustc_hash::FxHashMap;

/// Parsed tag mapping of a single field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    entries: FxHashMap<String, String>,
}

/// Diagnostic for a malformed tag string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSyntaxError {
    /// Byte offset where parsing stopped
    pub offset: usize,
    /// What the parser expected
    pub expected: &'static str,
}

impl fmt::Display for TagSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {} at byte {}", self.expected, self.offset)
    }
}

impl std::error::Error for TagSyntaxError {}

impl Tags {
    /// Empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw tag string
    pub fn parse(raw: &str) -> Result<Self, TagSyntaxError> {
        let mut entries = FxHashMap::default();
        for pair in TagPairs::new(raw) {
            let (key, value) = pair?;
            entries.entry(key.to_string()).or_insert(value);
        }
        Ok(Self { entries })
    }

    /// Value for `key`; `None` when the field carries no such tag
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether `key` is present (possibly with an empty value)
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the field carries no tags
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Look up a single key in a raw tag string without building a mapping
pub fn lookup(raw: &str, key: &str) -> Result<Option<String>, TagSyntaxError> {
    for pair in TagPairs::new(raw) {
        let (found, value) = pair?;
        if found == key {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

struct TagPairs<'a> {
    raw: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> TagPairs<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            pos: 0,
            failed: false,
        }
    }

    fn error(&mut self, expected: &'static str) -> Option<Result<(&'a str, String), TagSyntaxError>> {
        self.failed = true;
        Some(Err(TagSyntaxError {
            offset: self.pos,
            expected,
        }))
    }
}

impl<'a> Iterator for TagPairs<'a> {
    type Item = Result<(&'a str, String), TagSyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let raw = self.raw;
        let bytes = raw.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos] == b' ' {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return None;
        }

        let key_start = self.pos;
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b <= b' ' || b == b':' || b == b'"' || b == 0x7f {
                break;
            }
            self.pos += 1;
        }
        if self.pos == key_start {
            return self.error("tag key");
        }
        let key = &raw[key_start..self.pos];

        if bytes.get(self.pos) != Some(&b':') {
            return self.error("':' after key");
        }
        self.pos += 1;
        if bytes.get(self.pos) != Some(&b'"') {
            return self.error("opening '\"'");
        }
        self.pos += 1;

        let mut value = String::new();
        let mut chars = raw[self.pos..].char_indices();
        loop {
            let Some((offset, c)) = chars.next() else {
                self.pos = raw.len();
                return self.error("closing '\"'");
            };
            match c {
                '"' => {
                    self.pos += offset + 1;
                    return Some(Ok((key, value)));
                }
                '\\' => match chars.next() {
                    Some((_, escaped @ ('"' | '\\'))) => value.push(escaped),
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    _ => {
                        self.pos += offset;
                        return self.error("valid escape sequence");
                    }
                },
                other => value.push(other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_pair() {
        let tags = Tags::parse(r#"json:"name""#).unwrap();
        assert_eq!(tags.get("json"), Some("name"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_parse_multiple_pairs() {
        let tags = Tags::parse(r#"json:"name"  orm:"name" db:"""#).unwrap();
        assert_eq!(tags.get("json"), Some("name"));
        assert_eq!(tags.get("orm"), Some("name"));
        assert_eq!(tags.get("db"), Some(""));
        assert!(tags.contains("db"));
    }

    #[test]
    fn test_absent_key_is_none_not_empty() {
        let tags = Tags::parse(r#"json:"age""#).unwrap();
        assert_eq!(tags.get("orm"), None);
        assert!(!tags.contains("orm"));

        let empty = Tags::parse("").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.get("json"), None);
    }

    #[test]
    fn test_duplicate_key_keeps_first() {
        let tags = Tags::parse(r#"json:"first" json:"second""#).unwrap();
        assert_eq!(tags.get("json"), Some("first"));
    }

    #[test]
    fn test_escapes_and_unicode() {
        let tags = Tags::parse(r#"label:"say \"hi\"" cn:"三年一班""#).unwrap();
        assert_eq!(tags.get("label"), Some("say \"hi\""));
        assert_eq!(tags.get("cn"), Some("三年一班"));
    }

    #[test]
    fn test_malformed_tags() {
        assert!(Tags::parse("json").is_err());
        assert!(Tags::parse("json:name").is_err());
        assert!(Tags::parse(r#"json:"unterminated"#).is_err());
        assert!(Tags::parse(r#":"value""#).is_err());
        assert!(Tags::parse(r#"json:"bad \q""#).is_err());

        let err = Tags::parse("json:name").unwrap_err();
        assert_eq!(err.offset, 5);
        assert_eq!(err.to_string(), "expected opening '\"' at byte 5");
    }

    #[test]
    fn test_lookup_without_mapping() {
        let raw = r#"json:"name" orm:"id""#;
        assert_eq!(lookup(raw, "orm").unwrap(), Some("id".to_string()));
        assert_eq!(lookup(raw, "xml").unwrap(), None);
    }
}
