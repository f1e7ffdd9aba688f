pub mod api;
pub mod classify;
pub mod config;
pub mod documents;
pub mod error;
pub mod input;
pub mod notebook;
pub mod orchestrator;
pub mod request;
pub mod state;
pub mod timeline;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use api::{DebateClient, HttpTransport, RequestPolicy, Transport, UploadReceipt};
pub use classify::Classifier;
pub use config::{resolve_base_url, Config};
pub use documents::{Document, DocumentLibrary};
pub use error::{ErrorKind, Rejected, RequestFailure, RequestOutcome};
pub use input::{InputController, InputIntent};
pub use notebook::{Notebook, NotebookError, NotebookShelf};
pub use orchestrator::{
    GenerationOrchestrator, GenerationState, Resolution, Submission, Ticket,
    TimelineEvent,
};
pub use state::{ConversationEntry, EntryId, Role, StatusEntry, StatusKind, TimelineEntry};
pub use timeline::Timeline;
