//! In-memory canonical templates.
//!
//! A `Template` is an ordered list of text lines. Every transform produces a
//! new `Template`; loaded lines are never mutated in place.

use std::path::Path;

use crate::error::{GenError, Result};

/// Phrase identifying machine-generated content on the first line.
pub const MARKER_PHRASE: &str = "This file is generated";

/// Marker comment line naming the canonical source.
pub fn marker_line(origin: &str) -> String {
    format!("// {}, please edit source in {}", MARKER_PHRASE, origin)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source_id: String,
    lines: Vec<String>,
    has_marker: bool,
}

impl Template {
    /// Split text into lines. Line terminators (`\n` or `\r\n`) are not kept.
    pub fn parse(source_id: impl Into<String>, text: &str) -> Result<Self> {
        let source_id = source_id.into();
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        Self::from_lines(source_id, lines)
    }

    pub fn from_lines(source_id: impl Into<String>, lines: Vec<String>) -> Result<Self> {
        let source_id = source_id.into();
        if lines.is_empty() {
            return Err(GenError::EmptyTemplate { source_id });
        }
        let has_marker = lines[0].contains(MARKER_PHRASE);
        Ok(Self {
            source_id,
            lines,
            has_marker,
        })
    }

    /// Read a template from disk. A missing file is reported as `MissingTemplate`
    /// for `construct`.
    pub fn load(path: &Path, source_id: impl Into<String>, construct: &str) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GenError::MissingTemplate {
                    construct: construct.to_string(),
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(GenError::TemplateRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::parse(source_id, &text)
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn has_marker(&self) -> bool {
        self.has_marker
    }

    /// Same source, new body. Marker detection is redone on the new lines.
    pub fn with_lines(&self, lines: Vec<String>) -> Result<Self> {
        Self::from_lines(self.source_id.clone(), lines)
    }

    /// Prepend the generated marker unless one is already present.
    pub fn with_marker(&self, origin: &str) -> Self {
        if self.has_marker {
            return self.clone();
        }
        let mut lines = Vec::with_capacity(self.lines.len() + 1);
        lines.push(marker_line(origin));
        lines.extend(self.lines.iter().cloned());
        Self {
            source_id: self.source_id.clone(),
            lines,
            has_marker: true,
        }
    }

    /// Insert a directive line right below the marker (or at the top when
    /// there is no marker). Empty directives and directives already present in
    /// the header are ignored.
    pub fn with_directive(&self, directive: &str) -> Self {
        if directive.is_empty() || self.header().any(|line| line == directive) {
            return self.clone();
        }
        let at = usize::from(self.has_marker);
        let mut lines = self.lines.clone();
        lines.insert(at, directive.to_string());
        Self {
            source_id: self.source_id.clone(),
            lines,
            has_marker: self.has_marker,
        }
    }

    /// Marker line plus the directive block directly below it.
    fn header(&self) -> impl Iterator<Item = &str> {
        let skip = usize::from(self.has_marker);
        self.lines
            .iter()
            .take(skip)
            .chain(
                self.lines
                    .iter()
                    .skip(skip)
                    .take_while(|line| line.starts_with('#')),
            )
            .map(String::as_str)
    }

    /// Full text with every line terminated by `\n`.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}
