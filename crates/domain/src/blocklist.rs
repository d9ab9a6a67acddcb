/// Set of domain suffixes requiring the filtered resolution path.
///
/// Matching is a plain byte-for-byte suffix test: a domain is listed when it
/// equals an entry or ends with one. No case folding, no label anchoring, no
/// trailing-dot handling; the list is expected to hold names in the same
/// shape queries arrive in.
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    suffixes: Vec<String>,
}

impl BlockList {
    pub fn new(suffixes: Vec<String>) -> Self {
        Self { suffixes }
    }

    pub fn is_listed(&self, domain: &str) -> bool {
        self.suffixes.iter().any(|s| domain.ends_with(s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[&str]) -> BlockList {
        BlockList::new(entries.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn exact_match_is_listed() {
        let bl = list(&["twitter.com", "facebook.com"]);
        assert!(bl.is_listed("twitter.com"));
        assert!(bl.is_listed("facebook.com"));
    }

    #[test]
    fn proper_suffix_is_listed() {
        let bl = list(&["twitter.com"]);
        assert!(bl.is_listed("api.twitter.com"));
        assert!(bl.is_listed("a.b.twitter.com"));
    }

    #[test]
    fn shorter_than_suffix_is_not_listed() {
        let bl = list(&["twitter.com"]);
        assert!(!bl.is_listed("com"));
        assert!(!bl.is_listed(""));
    }

    #[test]
    fn unrelated_domain_is_not_listed() {
        let bl = list(&["twitter.com"]);
        assert!(!bl.is_listed("example.com"));
        assert!(!bl.is_listed("twitter.com.cdn.net"));
    }

    #[test]
    fn no_label_anchoring() {
        // Deliberately raw suffix semantics, matching the suffix test only.
        let bl = list(&["twitter.com"]);
        assert!(bl.is_listed("nottwitter.com"));
    }

    #[test]
    fn empty_list_matches_nothing() {
        let bl = list(&[]);
        assert!(!bl.is_listed("twitter.com"));
        assert!(bl.is_empty());
    }

    #[test]
    fn first_of_many_suffixes() {
        let bl = list(&["twitter.com", "facebook.com", "t.co"]);
        assert!(bl.is_listed("t.co"));
        assert!(bl.is_listed("cdn.t.co"));
        assert_eq!(bl.len(), 3);
    }
}
