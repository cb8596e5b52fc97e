//! Top-level section splitting for checkpoint bodies.

/// A `# TITLE` section and its trimmed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub content: String,
}

/// Sections in document order, unique by title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    entries: Vec<Section>,
}

impl Sections {
    /// Split a markdown body at `# ` headers that sit outside fenced code.
    ///
    /// Lines before the first header are dropped. A repeated header keeps
    /// its first position and the last body wins.
    pub fn parse(body: &str) -> Self {
        let mut sections = Self::default();
        let mut current: Option<String> = None;
        let mut lines: Vec<&str> = Vec::new();
        let mut in_fence = false;

        for line in body.lines() {
            let stripped = line.trim_start();
            if stripped.starts_with("```") {
                in_fence = !in_fence;
                lines.push(line);
                continue;
            }
            if !in_fence {
                if let Some(title) = stripped.strip_prefix("# ") {
                    if let Some(name) = current.take() {
                        sections.set(name, lines.join("\n").trim());
                    }
                    lines.clear();
                    current = Some(title.trim().to_string());
                    continue;
                }
            }
            lines.push(line);
        }

        if let Some(name) = current {
            sections.set(name, lines.join("\n").trim());
        }

        sections
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|s| s.title == title)
            .map(|s| s.content.as_str())
    }

    /// Body of `title`, or an empty string when the section is absent.
    pub fn text(&self, title: &str) -> &str {
        self.get(title).unwrap_or("")
    }

    pub fn contains(&self, title: &str) -> bool {
        self.entries.iter().any(|s| s.title == title)
    }

    /// Replace a body in place, or append a new section at the end.
    pub fn set(&mut self, title: impl Into<String>, content: impl Into<String>) {
        let title = title.into();
        let content = content.into();
        match self.entries.iter_mut().find(|s| s.title == title) {
            Some(section) => section.content = content,
            None => self.entries.push(Section { title, content }),
        }
    }

    pub fn titles(&self) -> Vec<&str> {
        self.entries.iter().map(|s| s.title.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
