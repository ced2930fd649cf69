//! Two-level pack/theme tree shown in the side panel.

use std::path::{Path, PathBuf};

use crate::catalog::Catalog;

/// Event raised when the user picks a theme leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    ThemeSelected(PathBuf),
}

/// Position of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Pack(usize),
    Theme { pack: usize, theme: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeNode {
    pub label: String,
    /// Theme directory; leaves without a path cannot be selected.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackNode {
    /// Pack directory name, used as a stable widget id.
    pub key: String,
    pub label: String,
    pub themes: Vec<ThemeNode>,
    /// Whether the pack starts expanded.
    pub expanded: bool,
}

/// Presentation model of the scanned catalog.
#[derive(Debug, Clone, Default)]
pub struct ThemeTree {
    packs: Vec<PackNode>,
    selected: Option<PathBuf>,
}

impl ThemeTree {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let packs = catalog
            .packs
            .iter()
            .map(|pack| PackNode {
                key: pack.name.clone(),
                label: format!("📁 {} ({})", display_name(&pack.name), pack.themes.len()),
                themes: pack
                    .themes
                    .iter()
                    .map(|theme| ThemeNode {
                        label: format!("🎨 {}", display_name(&theme.name)),
                        path: Some(theme.path.clone()),
                    })
                    .collect(),
                expanded: true,
            })
            .collect();
        Self {
            packs,
            selected: None,
        }
    }

    pub fn packs(&self) -> &[PackNode] {
        &self.packs
    }

    /// Handle a click on `node`. Only theme leaves with a path raise an event.
    pub fn select(&mut self, node: NodeRef) -> Option<SelectionEvent> {
        let NodeRef::Theme { pack, theme } = node else {
            return None;
        };
        let path = self.packs.get(pack)?.themes.get(theme)?.path.clone()?;
        self.selected = Some(path.clone());
        Some(SelectionEvent::ThemeSelected(path))
    }

    pub fn is_selected(&self, path: Option<&Path>) -> bool {
        match (path, self.selected.as_deref()) {
            (Some(path), Some(selected)) => path == selected,
            _ => false,
        }
    }
}

/// Human readable name: underscores become spaces, words are title cased.
pub fn display_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_alpha = false;
    for c in raw.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
