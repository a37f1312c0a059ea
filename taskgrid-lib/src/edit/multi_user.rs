//! Multi-user picker with debounced directory search

use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::CellEditor;
use super::EditInput;
use super::EditOutcome;
use super::EditSession;
use super::InvalidSession;
use crate::debounce::DEFAULT_DEBOUNCE;
use crate::debounce::Debouncer;
use crate::directory::UserDirectory;
use crate::model::Cell;
use crate::model::CellContent;
use crate::model::CellValue;
use crate::model::Column;
use crate::model::User;
use crate::render::CellView;
use crate::render::UserPickerView;

/// Inline message shown when a lookup fails.
pub const LOOKUP_FAILED: &str = "Failed to load users";

/// Editor for multi-user cells.
///
/// Sessions search the [`UserDirectory`] as the user types, debounced by
/// [`DEFAULT_DEBOUNCE`] unless configured otherwise. Sessions spawn Tokio
/// tasks, so `edit` must be called inside a runtime.
#[derive(Clone)]
pub struct MultiUserEditor {
    directory: Arc<dyn UserDirectory>,
    debounce: Duration,
}

impl MultiUserEditor {
    /// Creates an editor backed by a directory.
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            directory,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Sets the search debounce delay.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

impl std::fmt::Debug for MultiUserEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiUserEditor")
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

impl CellEditor for MultiUserEditor {
    fn edit(&self, cell: &Cell, _column: &Column) -> Box<dyn EditSession> {
        match &cell.content {
            CellContent::MultiUser { value } => Box::new(MultiUserSession::open(
                value.clone(),
                self.directory.clone(),
                self.debounce,
            )),
            _ => Box::new(InvalidSession),
        }
    }
}

#[derive(Debug, Default)]
struct LookupState {
    options: Vec<User>,
    loading: bool,
    error: Option<String>,
    /// Query of the most recently issued lookup.
    issued: Option<String>,
}

/// An open multi-user picker.
///
/// Lookup responses are applied while the session is alive. Liveness is tied
/// to the session, not to the request: a slow response for an older query
/// that lands after a newer one still replaces the options.
pub struct MultiUserSession {
    draft: Vec<User>,
    query: String,
    lookup: Arc<RwLock<LookupState>>,
    alive: Arc<AtomicBool>,
    directory: Arc<dyn UserDirectory>,
    debouncer: Debouncer,
}

impl MultiUserSession {
    /// Opens a session and immediately loads the default user list.
    pub fn open(draft: Vec<User>, directory: Arc<dyn UserDirectory>, debounce: Duration) -> Self {
        let session = Self {
            draft,
            query: String::new(),
            lookup: Arc::new(RwLock::new(LookupState::default())),
            alive: Arc::new(AtomicBool::new(true)),
            directory,
            debouncer: Debouncer::new(debounce),
        };
        tokio::spawn(session.lookup_task(String::new()));
        session
    }

    /// Users currently in the draft.
    pub fn draft(&self) -> &[User] {
        &self.draft
    }

    /// Current search input.
    pub fn query(&self) -> &str {
        &self.query
    }

    fn lookup_task(&self, query: String) -> impl Future<Output = ()> + Send + 'static {
        let directory = self.directory.clone();
        let lookup = self.lookup.clone();
        let alive = self.alive.clone();

        async move {
            if let Ok(mut guard) = lookup.write() {
                if guard.issued.as_deref() == Some(query.as_str()) {
                    return;
                }
                guard.issued = Some(query.clone());
                guard.loading = true;
            }

            log::debug!("searching users for {:?}", query);
            let result = directory.search_users(&query).await;

            if !alive.load(Ordering::SeqCst) {
                return;
            }
            if let Ok(mut guard) = lookup.write() {
                match result {
                    Ok(users) => {
                        guard.options = users;
                        guard.error = None;
                    }
                    Err(e) => {
                        log::warn!("user lookup for {:?} failed: {}", query, e);
                        guard.options.clear();
                        guard.error = Some(LOOKUP_FAILED.to_string());
                    }
                }
                guard.loading = false;
            }
        }
    }

    fn schedule_lookup(&mut self) {
        let task = self.lookup_task(self.query.clone());
        self.debouncer.call(task);
    }

    fn select(&mut self, user: User) {
        if !self.draft.iter().any(|u| u.id == user.id) {
            self.draft.push(user);
        }
    }
}

impl EditSession for MultiUserSession {
    fn handle(&mut self, input: EditInput) -> EditOutcome {
        match input {
            EditInput::Char(c) => {
                self.query.push(c);
                self.schedule_lookup();
            }
            EditInput::Backspace => {
                self.query.pop();
                self.schedule_lookup();
            }
            EditInput::SetText(text) => {
                self.query = text;
                self.schedule_lookup();
            }
            EditInput::Select(user) => self.select(user),
            EditInput::Remove(id) => self.draft.retain(|u| u.id != id),
            EditInput::Toggle(user) => {
                if self.draft.iter().any(|u| u.id == user.id) {
                    self.draft.retain(|u| u.id != user.id);
                } else {
                    self.draft.push(user);
                }
            }
            EditInput::Enter => {
                let first = self
                    .lookup
                    .read()
                    .ok()
                    .and_then(|g| g.options.first().cloned());
                if let Some(user) = first {
                    self.select(user);
                }
            }
            EditInput::Escape => return EditOutcome::Cancel,
            EditInput::Blur => return EditOutcome::Save(CellValue::Users(self.draft.clone())),
        }
        EditOutcome::Continue
    }

    fn view(&self) -> CellView {
        let (options, loading, error) = self
            .lookup
            .read()
            .map(|g| (g.options.clone(), g.loading, g.error.clone()))
            .unwrap_or_default();
        CellView::UserPicker(UserPickerView {
            selected: self.draft.clone(),
            query: self.query.clone(),
            options,
            loading,
            error,
        })
    }
}

impl Drop for MultiUserSession {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::LookupError;
    use crate::model::CellType;

    struct MockDirectory {
        users: Vec<User>,
        delays: HashMap<String, Duration>,
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MockDirectory {
        fn new() -> Self {
            Self {
                users: vec![
                    User::new("u1", "Alice"),
                    User::new("u2", "Albert"),
                    User::new("u3", "Bob"),
                ],
                delays: HashMap::new(),
                calls: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn delay(mut self, query: &str, delay: Duration) -> Self {
            self.delays.insert(query.to_string(), delay);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserDirectory for MockDirectory {
        async fn search_users(&self, query: &str) -> Result<Vec<User>, LookupError> {
            self.calls.lock().unwrap().push(query.to_string());
            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }
            if self.fail {
                return Err(LookupError::Unavailable("down".into()));
            }
            let needle = query.to_lowercase();
            Ok(self
                .users
                .iter()
                .filter(|u| u.name.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        }
    }

    fn column() -> Column {
        Column::new("assignees", "Assignees", CellType::MultiUser).editable(true)
    }

    fn picker(session: &dyn EditSession) -> UserPickerView {
        match session.view() {
            CellView::UserPicker(view) => view,
            other => panic!("expected picker, got {:?}", other),
        }
    }

    async fn settle(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_loads_default_list() {
        let directory = Arc::new(MockDirectory::new());
        let editor = MultiUserEditor::new(directory.clone());
        let cell = Cell::multi_user(vec![User::new("u1", "Alice")]);

        let session = editor.edit(&cell, &column());
        settle(1).await;

        assert_eq!(directory.calls(), vec![String::new()]);
        let view = picker(session.as_ref());
        assert_eq!(view.selected.len(), 1);
        assert_eq!(view.options.len(), 3);
        assert!(!view.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_fires_one_search_with_final_query() {
        let directory = Arc::new(MockDirectory::new());
        let editor = MultiUserEditor::new(directory.clone());
        let cell = Cell::multi_user(vec![User::new("u1", "Alice")]);

        let mut session = editor.edit(&cell, &column());
        settle(1).await;

        for c in "alb".chars() {
            assert_eq!(session.handle(EditInput::Char(c)), EditOutcome::Continue);
            settle(50).await;
        }
        settle(100).await;
        assert_eq!(directory.calls().len(), 1);

        settle(200).await;
        assert_eq!(directory.calls(), vec![String::new(), "alb".to_string()]);

        let view = picker(session.as_ref());
        assert_eq!(view.query, "alb");
        assert_eq!(view.options, vec![User::new("u2", "Albert")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_query_is_not_reissued() {
        let directory = Arc::new(MockDirectory::new());
        let editor = MultiUserEditor::new(directory.clone());
        let mut session = editor.edit(&Cell::multi_user(vec![]), &column());
        settle(1).await;

        session.handle(EditInput::Char('b'));
        session.handle(EditInput::Backspace);
        settle(400).await;

        assert_eq!(directory.calls(), vec![String::new()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_draft_edits_and_save_on_blur() {
        let directory = Arc::new(MockDirectory::new());
        let editor = MultiUserEditor::new(directory);
        let alice = User::new("u1", "Alice");
        let bob = User::new("u3", "Bob");
        let mut session = editor.edit(&Cell::multi_user(vec![alice.clone()]), &column());
        settle(1).await;

        session.handle(EditInput::Select(bob.clone()));
        session.handle(EditInput::Select(bob.clone()));
        session.handle(EditInput::Toggle(alice.clone()));
        session.handle(EditInput::Enter);

        assert_eq!(
            session.handle(EditInput::Blur),
            EditOutcome::Save(CellValue::Users(vec![bob, alice]))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_cancels() {
        let editor = MultiUserEditor::new(Arc::new(MockDirectory::new()));
        let mut session = editor.edit(&Cell::multi_user(vec![]), &column());
        session.handle(EditInput::Remove("u1".into()));
        assert_eq!(session.handle(EditInput::Escape), EditOutcome::Cancel);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lookup_shows_inline_error() {
        let mut directory = MockDirectory::new();
        directory.fail = true;
        let editor = MultiUserEditor::new(Arc::new(directory));
        let mut session = editor.edit(&Cell::multi_user(vec![]), &column());
        settle(1).await;

        let view = picker(session.as_ref());
        assert!(view.options.is_empty());
        assert_eq!(view.error.as_deref(), Some(LOOKUP_FAILED));

        assert_eq!(session.handle(EditInput::Char('x')), EditOutcome::Continue);
        assert_eq!(picker(session.as_ref()).query, "x");
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_variant_opens_invalid_session() {
        let editor = MultiUserEditor::new(Arc::new(MockDirectory::new()));
        let session = editor.edit(&Cell::text("nope"), &column());
        assert_eq!(session.view(), CellView::Invalid);
    }

    /// Known race: responses are guarded by session liveness only, so a slow
    /// response for an older query overwrites the options of a newer one.
    #[tokio::test(start_paused = true)]
    async fn test_known_race_stale_response_overwrites_newer() {
        let directory = Arc::new(
            MockDirectory::new()
                .delay("al", Duration::from_millis(1000))
                .delay("bo", Duration::from_millis(10)),
        );
        let editor = MultiUserEditor::new(directory.clone());
        let mut session = editor.edit(&Cell::multi_user(vec![]), &column());
        settle(1).await;

        session.handle(EditInput::SetText("al".into()));
        settle(400).await;
        session.handle(EditInput::SetText("bo".into()));
        settle(400).await;

        let fresh = picker(session.as_ref());
        assert_eq!(fresh.options, vec![User::new("u3", "Bob")]);

        settle(1000).await;
        let stale = picker(session.as_ref());
        assert_eq!(stale.query, "bo");
        assert_eq!(
            stale.options,
            vec![User::new("u1", "Alice"), User::new("u2", "Albert")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_after_close_is_dropped() {
        let directory = Arc::new(MockDirectory::new().delay("", Duration::from_millis(100)));
        let editor = MultiUserEditor::new(directory.clone());
        let session = editor.edit(&Cell::multi_user(vec![]), &column());
        settle(1).await;
        let lookup = match session.view() {
            CellView::UserPicker(view) => view,
            _ => unreachable!(),
        };
        assert!(lookup.loading);

        drop(session);
        settle(200).await;
        assert_eq!(directory.calls(), vec![String::new()]);
    }
}
