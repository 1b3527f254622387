use std::collections::BTreeMap;

use crate::pattern::Capture;
use crate::target::Target;

/// Captured text of a successful rule match.
///
/// For each memo in the message pattern there are two entries, `matchN` (the
/// normalized text) and `raw_matchN` (the raw words it came from). Memos in
/// the previous-reply pattern show up as `reply_matchN` and
/// `reply_raw_matchN`. A memo inside an optional branch that didn't take part
/// maps to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    entries: BTreeMap<String, String>,
}

impl Match {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record `captures` made against `target.normalized`, with every key prefixed by `prefix`.
    pub(crate) fn add_captures(&mut self, prefix: &str, captures: &[Capture], target: &Target) {
        for capture in captures {
            let (text, raw) = match capture.span {
                Some((start, end)) => (target.normalized[start..end].to_string(), target.raw_span(start, end)),
                None => (String::new(), String::new()),
            };
            self.entries.insert(format!("{prefix}{}", capture.name), text);
            self.entries.insert(format!("{prefix}raw_{}", capture.name), raw);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for Match {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Match { entries: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_and_reply_keys() {
        let target = Target::plain("My Name Is Fred Flintstone!");
        let start = target.normalized.find("fred").unwrap();
        let caps = vec![
            Capture { name: "match0".into(), span: Some((start, target.normalized.len())) },
            Capture { name: "match1".into(), span: None },
        ];

        let mut m = Match::new();
        m.add_captures("", &caps, &target);
        m.add_captures("reply_", &caps[..1], &target);

        assert_eq!(m.get("match0"), Some("fred flintstone"));
        assert_eq!(m.get("raw_match0"), Some("Fred Flintstone!"));
        assert_eq!(m.get("match1"), Some(""));
        assert_eq!(m.get("raw_match1"), Some(""));
        assert_eq!(m.get("reply_raw_match0"), Some("Fred Flintstone!"));
        assert_eq!(m.len(), 6);
    }
}
