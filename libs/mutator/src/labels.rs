/// Case-insensitive exact match of a metadata label against the configured target label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatcher {
    key: String,
    value: String,
}

impl LabelMatcher {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_lowercase(),
            value: value.to_lowercase(),
        }
    }

    #[inline]
    pub fn matches(&self, key: &str, value: &str) -> bool {
        key.to_lowercase() == self.key && value.to_lowercase() == self.value
    }

    /// True when any of the given labels matches.
    pub fn matches_any<'a>(
        &self,
        mut labels: impl Iterator<Item = (&'a String, &'a String)>,
    ) -> bool {
        labels.any(|(k, v)| self.matches(k, v))
    }
}
