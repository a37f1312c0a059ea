//! Per-grid mapping from cell type to strategies

use std::collections::HashMap;
use std::sync::Arc;

use crate::directory::UserDirectory;
use crate::edit::CellEditor;
use crate::edit::MultiUserEditor;
use crate::edit::TextEditor;
use crate::model::CellType;
use crate::render::CellRenderer;
use crate::render::LinkRenderer;
use crate::render::MultiUserRenderer;
use crate::render::TagRenderer;
use crate::render::TextRenderer;

/// Renderers and editors keyed by [`CellType`].
///
/// Each grid owns its registry, so two grids never see each other's
/// registrations. Registering a type twice replaces the earlier strategy.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    renderers: HashMap<CellType, Arc<dyn CellRenderer>>,
    editors: HashMap<CellType, Arc<dyn CellEditor>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in strategies.
    ///
    /// Renderers: text, tag, link, multi_user. Editors: text, multi_user.
    pub fn with_defaults(directory: Arc<dyn UserDirectory>) -> Self {
        let mut registry = Self::new();
        registry.register_renderer(CellType::Text, TextRenderer);
        registry.register_renderer(CellType::Tag, TagRenderer);
        registry.register_renderer(CellType::Link, LinkRenderer);
        registry.register_renderer(CellType::MultiUser, MultiUserRenderer);
        registry.register_editor(CellType::Text, TextEditor);
        registry.register_editor(CellType::MultiUser, MultiUserEditor::new(directory));
        registry
    }

    pub fn register_renderer<R>(&mut self, cell_type: CellType, renderer: R)
    where
        R: CellRenderer + 'static,
    {
        if self
            .renderers
            .insert(cell_type, Arc::new(renderer))
            .is_some()
        {
            log::debug!("replaced renderer for {}", cell_type);
        }
    }

    pub fn register_editor<E>(&mut self, cell_type: CellType, editor: E)
    where
        E: CellEditor + 'static,
    {
        if self.editors.insert(cell_type, Arc::new(editor)).is_some() {
            log::debug!("replaced editor for {}", cell_type);
        }
    }

    pub fn renderer(&self, cell_type: CellType) -> Option<Arc<dyn CellRenderer>> {
        self.renderers.get(&cell_type).cloned()
    }

    pub fn editor(&self, cell_type: CellType) -> Option<Arc<dyn CellEditor>> {
        self.editors.get(&cell_type).cloned()
    }

    /// Types with a registered renderer.
    pub fn renderer_types(&self) -> Vec<CellType> {
        CellType::ALL
            .iter()
            .copied()
            .filter(|t| self.renderers.contains_key(t))
            .collect()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("renderers", &self.renderer_types())
            .field(
                "editors",
                &CellType::ALL
                    .iter()
                    .filter(|t| self.editors.contains_key(t))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
