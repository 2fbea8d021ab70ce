//! Query input capture
//!
//! Holds the raw trade description. Editing never validates; validity is
//! only consulted at submission time.

/// True iff `query` has non-whitespace content
pub fn is_submittable(query: &str) -> bool {
    !query.trim().is_empty()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryInput {
    query: String,
}

impl QueryInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the query unconditionally
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_submittable(&self) -> bool {
        is_submittable(&self.query)
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
    }

    pub fn clear(&mut self) {
        self.query.clear();
    }
}
