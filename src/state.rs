//! Load/error/success containers for fetched data, in the shape the UI
//! consumes: items, an in-flight flag, and an error string. A failed fetch
//! never propagates; it lands in `fetch_error` and leaves the container
//! renderable.

use crate::api::ApiResult;
use std::future::Future;

#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub is_fetching: bool,
    pub fetch_error: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_fetching: false,
            fetch_error: None,
        }
    }
}

impl<T> ListState<T> {
    pub fn start_fetching(&mut self) {
        self.is_fetching = true;
        self.fetch_error = None;
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.fetch_error = None;
        self.is_fetching = false;
    }

    pub fn set_error(&mut self, error: String) {
        self.fetch_error = Some(error);
        self.items = Vec::new();
        self.is_fetching = false;
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.fetch_error = None;
        self.is_fetching = false;
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Optimistically drop items matching the predicate, e.g. right after a
    /// successful delete, without refetching. Returns how many were removed.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.items.len();
        self.items.retain(|item| !predicate(item));
        before - self.items.len()
    }

    /// Run a list fetch to completion, recording the outcome. Re-running is
    /// the refetch path.
    pub async fn load<F>(&mut self, fetch: F)
    where
        F: Future<Output = ApiResult<Vec<T>>>,
    {
        self.start_fetching();
        match fetch.await {
            Ok(items) => self.set_items(items),
            Err(e) => self.set_error(e.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordState<T> {
    pub record: Option<T>,
    pub is_fetching: bool,
    pub fetch_error: Option<String>,
}

impl<T> Default for RecordState<T> {
    fn default() -> Self {
        Self {
            record: None,
            is_fetching: false,
            fetch_error: None,
        }
    }
}

impl<T> RecordState<T> {
    pub fn start_fetching(&mut self) {
        self.is_fetching = true;
        self.fetch_error = None;
    }

    pub fn set_record(&mut self, record: Option<T>) {
        self.record = record;
        self.fetch_error = None;
        self.is_fetching = false;
    }

    pub fn set_error(&mut self, error: String) {
        self.fetch_error = Some(error);
        self.record = None;
        self.is_fetching = false;
    }

    pub async fn load<F>(&mut self, fetch: F)
    where
        F: Future<Output = ApiResult<Option<T>>>,
    {
        self.start_fetching();
        match fetch.await {
            Ok(record) => self.set_record(record),
            Err(e) => self.set_error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: i64,
    }

    #[tokio::test]
    async fn load_success_populates_items() {
        let mut state = ListState::default();
        state.load(async { Ok(vec![Item { id: 1 }, Item { id: 2 }]) }).await;
        assert_eq!(state.items.len(), 2);
        assert!(!state.is_fetching);
        assert_eq!(state.fetch_error, None);
    }

    #[tokio::test]
    async fn load_failure_records_error_without_panicking() {
        let mut state: ListState<Item> = ListState::default();
        state
            .load(async { Err(ApiError::Network("connection refused".to_string())) })
            .await;
        assert!(state.items.is_empty());
        assert!(!state.is_fetching);
        assert!(state.fetch_error.as_deref().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn reload_clears_previous_error() {
        let mut state: ListState<Item> = ListState::default();
        state
            .load(async { Err(ApiError::Server("boom".to_string())) })
            .await;
        assert!(state.fetch_error.is_some());

        state.load(async { Ok(vec![Item { id: 1 }]) }).await;
        assert_eq!(state.fetch_error, None);
        assert_eq!(state.items, vec![Item { id: 1 }]);
    }

    #[test]
    fn optimistic_remove_drops_matching_items_only() {
        let mut state = ListState {
            items: vec![Item { id: 1 }, Item { id: 2 }],
            is_fetching: false,
            fetch_error: None,
        };
        let removed = state.remove_where(|item| item.id == 1);
        assert_eq!(removed, 1);
        assert_eq!(state.items, vec![Item { id: 2 }]);

        let removed = state.remove_where(|item| item.id == 99);
        assert_eq!(removed, 0);
        assert_eq!(state.items, vec![Item { id: 2 }]);
    }

    #[test]
    fn push_appends_and_clear_resets() {
        let mut state = ListState::default();
        state.push(Item { id: 1 });
        state.push(Item { id: 2 });
        assert_eq!(state.items.len(), 2);

        state.clear();
        assert!(state.items.is_empty());
        assert_eq!(state.fetch_error, None);
        assert!(!state.is_fetching);
    }

    #[test]
    fn start_fetching_keeps_stale_items_visible() {
        let mut state = ListState {
            items: vec![Item { id: 1 }],
            is_fetching: false,
            fetch_error: Some("old error".to_string()),
        };
        state.start_fetching();
        assert!(state.is_fetching);
        assert_eq!(state.fetch_error, None);
        assert_eq!(state.items, vec![Item { id: 1 }]);
    }

    #[tokio::test]
    async fn record_state_loads_and_degrades() {
        let mut state = RecordState::default();
        state.load(async { Ok(Some(Item { id: 7 })) }).await;
        assert_eq!(state.record, Some(Item { id: 7 }));

        state
            .load(async { Err(ApiError::NotFound("gone".to_string())) })
            .await;
        assert_eq!(state.record, None);
        assert!(state.fetch_error.is_some());
    }
}
