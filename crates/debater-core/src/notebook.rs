//! In-memory notebook shelf shown in the sidebar.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notebook {
    pub id: String,
    pub name: String,
    pub count: usize,
    pub icon: String,
}

impl Notebook {
    fn new(id: &str, name: &str, count: usize, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            count,
            icon: icon.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotebookError {
    #[error("Notebook name cannot be empty")]
    EmptyName,
    #[error("A notebook named \"{0}\" already exists")]
    Duplicate(String),
}

/// Lowercased name with whitespace runs collapsed to `-`.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone)]
pub struct NotebookShelf {
    notebooks: Vec<Notebook>,
    selected: String,
}

impl Default for NotebookShelf {
    fn default() -> Self {
        Self {
            notebooks: vec![
                Notebook::new("main", "Main Debate Notebook", 3, "📚"),
                Notebook::new("research", "Research Papers", 7, "🔬"),
                Notebook::new("studies", "Course Materials", 12, "📖"),
            ],
            selected: "main".to_string(),
        }
    }
}

impl NotebookShelf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notebooks(&self) -> &[Notebook] {
        &self.notebooks
    }

    pub fn selected(&self) -> Option<&Notebook> {
        self.notebooks.iter().find(|n| n.id == self.selected)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.notebooks.iter().position(|n| n.id == self.selected)
    }

    pub fn select(&mut self, id: &str) -> bool {
        if self.notebooks.iter().any(|n| n.id == id) {
            self.selected = id.to_string();
            true
        } else {
            false
        }
    }

    /// Create a notebook and select it.
    pub fn create(&mut self, name: &str) -> Result<&Notebook, NotebookError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NotebookError::EmptyName);
        }
        let id = slugify(name);
        if self.notebooks.iter().any(|n| n.id == id) {
            return Err(NotebookError::Duplicate(name.to_string()));
        }

        self.notebooks.push(Notebook::new(&id, name, 0, "📝"));
        self.selected = id;
        Ok(&self.notebooks[self.notebooks.len() - 1])
    }
}
