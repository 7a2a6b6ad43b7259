use crate::catalog::{CommandEntry, ServiceEntry};

/// An entry a [`ListView`] can display and filter
pub trait ListEntry {
    /// Stable identity used to preserve selection across rebuilds
    fn key(&self) -> &str;
    /// Text the filter matches against
    fn filter_text(&self) -> &str;
}

impl ListEntry for ServiceEntry {
    fn key(&self) -> &str {
        &self.name
    }

    fn filter_text(&self) -> &str {
        &self.name
    }
}

impl ListEntry for CommandEntry {
    fn key(&self) -> &str {
        &self.name
    }

    fn filter_text(&self) -> &str {
        &self.name
    }
}

/// Scrollable, filterable list state
///
/// Selection is an index into the filtered view and is kept in bounds by
/// every mutation. Rebuilding the entries or changing the filter preserves
/// the selected entry by key when it is still visible, otherwise the
/// selection resets to the top.
#[derive(Clone, Debug)]
pub struct ListView<T> {
    entries: Vec<T>,
    selected: usize,
    filter: String,
    filter_open: bool,
}

impl<T: ListEntry> ListView<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self {
            entries,
            selected: 0,
            filter: String::new(),
            filter_open: false,
        }
    }

    /// Entries that pass the current filter, in catalog order
    pub fn visible(&self) -> Vec<&T> {
        if self.filter.is_empty() {
            return self.entries.iter().collect();
        }
        let needle = self.filter.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.filter_text().to_lowercase().contains(&needle))
            .collect()
    }

    pub fn visible_len(&self) -> usize {
        self.visible().len()
    }

    /// Currently selected entry, if the filtered view is non-empty
    pub fn selected(&self) -> Option<&T> {
        self.visible().into_iter().nth(self.selected)
    }

    /// Selection index relative to the filtered view
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Replace all entries wholesale
    ///
    /// The selection follows the previously selected key when it survives
    /// the rebuild and resets to the top when it does not.
    pub fn set_entries(&mut self, entries: Vec<T>) {
        let prev = self.selected_key();
        self.entries = entries;
        self.reselect(prev);
    }

    /// Move the selection by `delta`, clamped to the filtered view
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible_len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, len as isize - 1) as usize;
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible_len().saturating_sub(1);
    }

    /// Replace the filter text, keeping the selection on the same entry
    /// when it still matches
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        let prev = self.selected_key();
        self.filter = filter.into();
        self.reselect(prev);
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Whether the filter input prompt is open
    pub fn is_filtering(&self) -> bool {
        self.filter_open
    }

    pub fn begin_filter(&mut self) {
        self.filter_open = true;
    }

    pub fn push_filter_char(&mut self, c: char) {
        let mut filter = self.filter.clone();
        filter.push(c);
        self.set_filter(filter);
    }

    pub fn pop_filter_char(&mut self) {
        let mut filter = self.filter.clone();
        filter.pop();
        self.set_filter(filter);
    }

    /// Close the prompt, keeping the filter text applied
    pub fn accept_filter(&mut self) {
        self.filter_open = false;
    }

    /// Close the prompt and drop the filter text
    pub fn cancel_filter(&mut self) {
        self.filter_open = false;
        self.set_filter("");
    }

    fn selected_key(&self) -> Option<String> {
        self.selected().map(|e| e.key().to_string())
    }

    fn reselect(&mut self, prev: Option<String>) {
        let visible = self.visible();
        self.selected = prev
            .and_then(|key| visible.iter().position(|e| e.key() == key))
            .unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ActionId, CommandEntry};

    fn command(name: &str) -> CommandEntry {
        CommandEntry {
            name: name.into(),
            description: String::new(),
            category: "General".into(),
            action: ActionId::RunTests,
        }
    }

    fn sample() -> ListView<CommandEntry> {
        ListView::new(vec![
            command("Start All Services"),
            command("Build Docker Images"),
            command("geography-dispatcher status"),
        ])
    }

    #[test]
    fn test_move_selection_clamps_at_both_ends() {
        let mut list = sample();
        list.move_selection(-5);
        assert_eq!(list.selected_index(), 0);
        list.move_selection(100);
        assert_eq!(list.selected_index(), 2);
        list.move_selection(-1);
        assert_eq!(list.selected_index(), 1);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let mut list = sample();
        list.set_filter("GEO");
        let names: Vec<&str> = list.visible().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["geography-dispatcher status"]);
    }

    #[test]
    fn test_filter_preserves_selection_while_visible() {
        let mut list = sample();
        list.move_selection(2); // geography-dispatcher status
        list.set_filter("s");
        assert_eq!(
            list.selected().map(|c| c.name.as_str()),
            Some("geography-dispatcher status")
        );
        // Narrow further so the selected entry drops out
        list.set_filter("start");
        assert_eq!(list.selected_index(), 0);
        assert_eq!(
            list.selected().map(|c| c.name.as_str()),
            Some("Start All Services")
        );
    }

    #[test]
    fn test_set_entries_preserves_selection_by_key() {
        let mut list = sample();
        list.move_selection(1); // Build Docker Images

        // Same key survives a rebuild in a different position
        list.set_entries(vec![command("Build Docker Images"), command("Run Tests")]);
        assert_eq!(list.selected_index(), 0);
        assert_eq!(
            list.selected().map(|c| c.name.as_str()),
            Some("Build Docker Images")
        );

        // Key gone: reset to top
        list.set_entries(vec![command("Start Tilt"), command("Clean All")]);
        assert_eq!(list.selected_index(), 0);
        assert_eq!(list.selected().map(|c| c.name.as_str()), Some("Start Tilt"));
    }

    #[test]
    fn test_set_entries_empty_clears_selection() {
        let mut list = sample();
        list.move_selection(2);
        list.set_entries(vec![]);
        assert_eq!(list.selected_index(), 0);
        assert!(list.selected().is_none());
    }

    #[test]
    fn test_filter_prompt_lifecycle() {
        let mut list = sample();
        assert!(!list.is_filtering());
        list.begin_filter();
        list.push_filter_char('g');
        list.push_filter_char('e');
        assert!(list.is_filtering());
        assert_eq!(list.filter(), "ge");

        list.pop_filter_char();
        assert_eq!(list.filter(), "g");

        list.accept_filter();
        assert!(!list.is_filtering());
        assert_eq!(list.filter(), "g");

        list.begin_filter();
        list.cancel_filter();
        assert!(!list.is_filtering());
        assert_eq!(list.filter(), "");
        assert_eq!(list.visible_len(), 3);
    }
}
