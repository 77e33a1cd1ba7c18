//! Splits a generated markdown document into titled course modules.
//!
//! Every level-2 heading (`## `) opens a module. Text before the first
//! heading becomes an implicit introduction module, and a document without
//! any level-2 heading becomes a single fallback module.

use crate::types::{generate_id, CourseModule};

/// Reserved ID of the implicit module preceding the first heading.
pub const INTRO_MODULE_ID: &str = "intro";

/// Reserved ID of the single module used when a document has no headings.
pub const FALLBACK_MODULE_ID: &str = "main";

/// Title of the implicit introduction module.
pub const INTRO_MODULE_TITLE: &str = "Course Overview & Objectives";

/// Title of the fallback module.
pub const FALLBACK_MODULE_TITLE: &str = "Course Guide";

const H2_MARKER: &str = "## ";

/// Heading text of a level-2 heading line, trimmed.
fn heading_title(line: &str) -> Option<&str> {
    line.strip_prefix(H2_MARKER).map(str::trim)
}

/// A module whose lines are still being collected.
struct OpenModule {
    id: String,
    title: String,
    lines: Vec<String>,
}

impl OpenModule {
    fn finish(self) -> CourseModule {
        CourseModule {
            id: self.id,
            title: self.title,
            content: self.lines.join("\n"),
        }
    }
}

/// Split `document` into its modules, in order of appearance.
pub fn segment(document: &str) -> Vec<CourseModule> {
    if document.trim().is_empty() {
        return Vec::new();
    }

    if !document.split('\n').any(|line| heading_title(line).is_some()) {
        return vec![CourseModule {
            id: FALLBACK_MODULE_ID.to_string(),
            title: FALLBACK_MODULE_TITLE.to_string(),
            content: document.to_string(),
        }];
    }

    let mut modules = Vec::new();
    let mut current: Option<OpenModule> = None;

    for line in document.split('\n') {
        if let Some(title) = heading_title(line) {
            if let Some(open) = current.take() {
                modules.push(open.finish());
            }
            current = Some(OpenModule {
                id: generate_id("mod"),
                title: title.to_string(),
                lines: vec![line.to_string()],
            });
            continue;
        }

        match current.as_mut() {
            Some(open) => open.lines.push(line.to_string()),
            // Leading blank lines are dropped until the introduction starts
            None if line.trim().is_empty() => {}
            None => {
                current = Some(OpenModule {
                    id: INTRO_MODULE_ID.to_string(),
                    title: INTRO_MODULE_TITLE.to_string(),
                    lines: vec![line.to_string()],
                });
            }
        }
    }

    if let Some(open) = current.take() {
        modules.push(open.finish());
    }

    modules
}
