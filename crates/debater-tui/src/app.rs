use std::path::PathBuf;

use debater_core::documents::{self, Document, DocumentLibrary};
use debater_core::{
    DebateClient, GenerationOrchestrator, InputController, InputIntent, NotebookShelf,
    RequestOutcome, StatusKind, Ticket, TimelineEntry, UploadReceipt,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Ticks a finished toast stays up (4 s at the 250 ms tick rate).
pub const TOAST_TICKS: u16 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Notebooks,
    Documents,
    Chat,
}

impl FocusPane {
    pub fn next(self) -> Self {
        match self {
            FocusPane::Notebooks => FocusPane::Documents,
            FocusPane::Documents => FocusPane::Chat,
            FocusPane::Chat => FocusPane::Notebooks,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusPane::Notebooks => FocusPane::Chat,
            FocusPane::Documents => FocusPane::Notebooks,
            FocusPane::Chat => FocusPane::Documents,
        }
    }
}

/// Single-line popup asking for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    NewNotebook,
    UploadPaths,
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self {
            Prompt::NewNotebook => " Enter a name for your new notebook ",
            Prompt::UploadPaths => " PDF paths to upload (space separated) ",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: StatusKind,
    ticks_left: u16,
}

type UploadTask = JoinHandle<anyhow::Result<Option<RequestOutcome<UploadReceipt>>>>;

pub struct App {
    pub should_quit: bool,
    pub focus: FocusPane,

    pub orchestrator: GenerationOrchestrator,
    pub input: InputController,

    pub prompt: Option<Prompt>,
    pub prompt_input: InputController,

    pub library: DocumentLibrary,
    pub document_cursor: usize,
    pub shelf: NotebookShelf,

    pub toast: Option<Toast>,

    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the chat area, set by the renderer
    pub chat_width: u16,
    pub animation_frame: u8,

    generation: Option<(Ticket, JoinHandle<RequestOutcome<String>>)>,
    refresh_task: Option<JoinHandle<RequestOutcome<Vec<Document>>>>,
    upload_task: Option<UploadTask>,
    database_task: Option<JoinHandle<RequestOutcome<String>>>,
    status_rx: mpsc::UnboundedReceiver<(String, StatusKind)>,
}

impl App {
    pub fn new(client: DebateClient) -> Self {
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let mut orchestrator = GenerationOrchestrator::new(client);
        orchestrator.on_status(move |message, kind| {
            let _ = status_tx.send((message.to_string(), kind));
        });

        Self {
            should_quit: false,
            focus: FocusPane::Chat,

            orchestrator,
            input: InputController::new(),

            prompt: None,
            prompt_input: InputController::new(),

            library: DocumentLibrary::new(),
            document_cursor: 0,
            shelf: NotebookShelf::new(),

            toast: None,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,

            generation: None,
            refresh_task: None,
            upload_task: None,
            database_task: None,
            status_rx,
        }
    }

    pub fn client(&self) -> DebateClient {
        self.orchestrator.client().clone()
    }

    pub fn is_generating(&self) -> bool {
        !self.orchestrator.is_idle()
    }

    pub fn is_uploading(&self) -> bool {
        self.upload_task.is_some()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_task.is_some()
    }

    pub fn is_building_database(&self) -> bool {
        self.database_task.is_some()
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        self.orchestrator.timeline().entries()
    }

    fn notify(&mut self, message: impl Into<String>, kind: StatusKind) {
        self.toast = Some(Toast {
            message: message.into(),
            kind,
            ticks_left: TOAST_TICKS,
        });
    }

    /// Pending toasts stay until replaced; others count down and expire.
    fn expire_toast(&mut self) {
        if let Some(toast) = &mut self.toast {
            if toast.kind == StatusKind::Pending {
                return;
            }
            toast.ticks_left = toast.ticks_left.saturating_sub(1);
            if toast.ticks_left == 0 {
                self.toast = None;
            }
        }
    }

    // Chat

    pub fn apply_intent(&mut self, intent: InputIntent) {
        if let Some(submission) = self.input.apply(intent, &mut self.orchestrator) {
            let request = self.orchestrator.request(&submission);
            self.generation = Some((submission.ticket, tokio::spawn(request)));
            self.scroll_chat_to_bottom();
        }
    }

    /// Keep the newest entries visible. Wrapped line count is estimated from
    /// the last rendered width.
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            60
        };

        let mut total_lines: usize = 0;
        for entry in self.timeline() {
            total_lines += 1; // label or icon line
            for line in entry.text().lines() {
                total_lines += line.chars().count().max(1).div_ceil(wrap_width);
            }
            total_lines += 1; // spacer
        }

        let visible = if self.chat_height > 0 {
            self.chat_height as usize
        } else {
            20
        };
        self.chat_scroll = total_lines.saturating_sub(visible).min(u16::MAX as usize) as u16;
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    // Documents

    pub fn start_refresh(&mut self) {
        if self.refresh_task.is_some() {
            return;
        }
        let client = self.client();
        self.refresh_task = Some(tokio::spawn(async move { client.documents().await }));
    }

    pub fn start_upload(&mut self, raw_paths: &str) {
        if self.upload_task.is_some() {
            return;
        }
        let paths: Vec<PathBuf> = raw_paths.split_whitespace().map(PathBuf::from).collect();
        if paths.is_empty() {
            return;
        }
        info!(count = paths.len(), "starting upload");
        let client = self.client();
        self.upload_task = Some(tokio::spawn(async move {
            let files = documents::load_upload_files(&paths).await?;
            Ok(documents::upload(&client, files).await)
        }));
    }

    pub fn start_create_database(&mut self) {
        if self.database_task.is_some() {
            return;
        }
        self.notify("Creating database...", StatusKind::Pending);
        let client = self.client();
        self.database_task = Some(tokio::spawn(async move { client.create_database().await }));
    }

    pub fn document_down(&mut self) {
        let len = self.library.documents().len();
        if len > 0 {
            self.document_cursor = (self.document_cursor + 1).min(len - 1);
        }
    }

    pub fn document_up(&mut self) {
        self.document_cursor = self.document_cursor.saturating_sub(1);
    }

    pub fn select_document(&mut self) {
        let Some(name) = self
            .library
            .documents()
            .get(self.document_cursor)
            .map(|d| d.name.clone())
        else {
            return;
        };
        if self.library.select(&name) {
            self.notify(format!("Selected document: {name}"), StatusKind::Success);
        }
    }

    // Notebooks

    pub fn notebook_down(&mut self) {
        let notebooks = self.shelf.notebooks();
        let next = self
            .shelf
            .selected_index()
            .map(|i| (i + 1).min(notebooks.len().saturating_sub(1)))
            .unwrap_or(0);
        if let Some(id) = notebooks.get(next).map(|n| n.id.clone()) {
            self.shelf.select(&id);
        }
    }

    pub fn notebook_up(&mut self) {
        let prev = self
            .shelf
            .selected_index()
            .map(|i| i.saturating_sub(1))
            .unwrap_or(0);
        if let Some(id) = self.shelf.notebooks().get(prev).map(|n| n.id.clone()) {
            self.shelf.select(&id);
        }
    }

    pub fn create_notebook(&mut self, name: &str) {
        match self.shelf.create(name) {
            Ok(notebook) => {
                let message = format!("New notebook \"{}\" created successfully!", notebook.name);
                self.notify(message, StatusKind::Success);
            }
            Err(err) => self.notify(err.to_string(), StatusKind::Failure),
        }
    }

    // Prompt

    pub fn open_prompt(&mut self, prompt: Prompt) {
        self.prompt_input.clear();
        self.prompt = Some(prompt);
    }

    pub fn close_prompt(&mut self) {
        self.prompt = None;
        self.prompt_input.clear();
    }

    pub fn commit_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let text = self.prompt_input.draft().to_string();
        self.prompt_input.clear();
        match prompt {
            Prompt::NewNotebook => self.create_notebook(&text),
            Prompt::UploadPaths => self.start_upload(&text),
        }
    }

    // Background work

    pub async fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
        self.expire_toast();
        self.poll_generation().await;
        self.poll_refresh().await;
        self.poll_upload().await;
        self.poll_database().await;
        while let Ok((message, kind)) = self.status_rx.try_recv() {
            self.notify(message, kind);
        }
    }

    async fn poll_generation(&mut self) {
        if !self.generation.as_ref().is_some_and(|(_, h)| h.is_finished()) {
            return;
        }
        let Some((ticket, handle)) = self.generation.take() else {
            return;
        };
        match handle.await {
            Ok(outcome) => {
                if self.orchestrator.resolve(ticket, outcome).is_some() {
                    self.scroll_chat_to_bottom();
                }
            }
            // Not a request failure; the task itself died.
            Err(err) => {
                error!(error = %err, "generation task did not complete");
                if self.orchestrator.abandon(ticket) {
                    self.notify(
                        "Generation stopped unexpectedly. Please try again.",
                        StatusKind::Failure,
                    );
                }
            }
        }
    }

    async fn poll_refresh(&mut self) {
        if !self.refresh_task.as_ref().is_some_and(|h| h.is_finished()) {
            return;
        }
        let Some(handle) = self.refresh_task.take() else {
            return;
        };
        match handle.await {
            Ok(listing) => match self.library.apply_listing(listing) {
                Ok(len) => {
                    self.document_cursor = self.document_cursor.min(len.saturating_sub(1));
                }
                Err(failure) => self.notify(failure.message, StatusKind::Failure),
            },
            Err(err) => warn!(error = %err, "document refresh task did not complete"),
        }
    }

    async fn poll_upload(&mut self) {
        if !self.upload_task.as_ref().is_some_and(|h| h.is_finished()) {
            return;
        }
        let Some(handle) = self.upload_task.take() else {
            return;
        };
        match handle.await {
            Ok(Ok(Some(Ok(receipt)))) => {
                self.notify(receipt.message, StatusKind::Success);
                self.start_refresh();
            }
            Ok(Ok(Some(Err(failure)))) => self.notify(failure.message, StatusKind::Failure),
            Ok(Ok(None)) => {}
            Ok(Err(err)) => self.notify(format!("Upload error: {err}"), StatusKind::Failure),
            Err(err) => warn!(error = %err, "upload task did not complete"),
        }
    }

    async fn poll_database(&mut self) {
        if !self.database_task.as_ref().is_some_and(|h| h.is_finished()) {
            return;
        }
        let Some(handle) = self.database_task.take() else {
            return;
        };
        match handle.await {
            Ok(Ok(message)) => self.notify(message, StatusKind::Success),
            Ok(Err(failure)) => self.notify(failure.message, StatusKind::Failure),
            Err(err) => {
                warn!(error = %err, "database task did not complete");
                self.toast = None;
            }
        }
    }

    /// Abort outstanding work so nothing resolves after the UI is gone.
    pub fn shutdown(&mut self) {
        if let Some((_, handle)) = self.generation.take() {
            handle.abort();
        }
        if let Some(handle) = self.refresh_task.take() {
            handle.abort();
        }
        if let Some(handle) = self.upload_task.take() {
            handle.abort();
        }
        if let Some(handle) = self.database_task.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debater_core::RequestPolicy;

    fn app() -> App {
        // never dialed in these tests
        App::new(DebateClient::http("http://127.0.0.1:9", RequestPolicy::default()))
    }

    #[tokio::test]
    async fn test_toast_expires_after_ticks() {
        let mut app = app();
        app.create_notebook("Ethics");
        assert!(app.toast.is_some());

        for _ in 0..TOAST_TICKS - 1 {
            app.tick().await;
        }
        assert!(app.toast.is_some());
        app.tick().await;
        assert!(app.toast.is_none());
    }

    #[tokio::test]
    async fn test_pending_toast_stays() {
        let mut app = app();
        app.notify("Creating database...", StatusKind::Pending);
        for _ in 0..TOAST_TICKS * 2 {
            app.tick().await;
        }
        assert!(app.toast.is_some());
    }

    #[tokio::test]
    async fn test_new_toast_restarts_countdown() {
        let mut app = app();
        app.create_notebook("");
        for _ in 0..TOAST_TICKS - 1 {
            app.tick().await;
        }
        app.create_notebook("Ethics");
        app.tick().await;
        assert_eq!(
            app.toast.as_ref().map(|t| t.message.as_str()),
            Some("New notebook \"Ethics\" created successfully!")
        );
    }
}
