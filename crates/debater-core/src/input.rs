//! Draft text and submission gating. No network behavior lives here.

use crate::orchestrator::{GenerationOrchestrator, Submission};

/// What a "commit" keystroke means to the controller. Hosts decide which key
/// produces which intent; Enter commits, Enter with a modifier breaks the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputIntent {
    Commit,
    InsertNewline,
}

impl InputIntent {
    pub fn for_enter(modifier_held: bool) -> Self {
        if modifier_held {
            InputIntent::InsertNewline
        } else {
            InputIntent::Commit
        }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone, Default)]
pub struct InputController {
    draft: String,
    cursor: usize, // in chars
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn has_draft(&self) -> bool {
        !self.draft.is_empty()
    }

    /// Replace the draft and move the cursor to its end.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        self.cursor = self.draft.chars().count();
    }

    pub fn clear(&mut self) {
        self.draft.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.draft, self.cursor);
        self.draft.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.draft.chars().count() {
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.draft.chars().count();
    }

    /// Hand the trimmed draft to the orchestrator. The draft is cleared only
    /// when the orchestrator accepts it; otherwise it is left for the user.
    pub fn submit(&mut self, orchestrator: &mut GenerationOrchestrator) -> Option<Submission> {
        if self.draft.trim().is_empty() || !orchestrator.is_idle() {
            return None;
        }
        let submission = orchestrator.submit(&self.draft).ok()?;
        self.clear();
        Some(submission)
    }

    /// Apply an Enter-style intent. Returns the submission when it commits.
    pub fn apply(
        &mut self,
        intent: InputIntent,
        orchestrator: &mut GenerationOrchestrator,
    ) -> Option<Submission> {
        match intent {
            InputIntent::Commit => self.submit(orchestrator),
            InputIntent::InsertNewline => {
                self.insert('\n');
                None
            }
        }
    }
}
