//! Exact raw-key handlers consulted before binding resolution.

/// Line mutation requested by an override handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideResult {
    pub new_line: String,
    pub new_pos: usize,
    pub hint: Option<String>,
    pub clear_helpers: bool,
    /// Keep dispatching the same keys after applying the mutation.
    pub forward_key: bool,
    /// Return the line from `read_line` at once.
    pub close: bool,
}

impl OverrideResult {
    /// Keep `line` and `pos` unchanged.
    pub fn unchanged(line: &str, pos: usize) -> Self {
        Self {
            new_line: line.to_string(),
            new_pos: pos,
            ..Self::default()
        }
    }
}

/// Called with the raw key string, the current line and cursor.
pub type OverrideHandler = Box<dyn FnMut(&str, &str, usize) -> OverrideResult>;
