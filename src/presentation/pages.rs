//! Page containers
//!
//! One container per page definition, each with a visibility flag. The
//! proximity service flips the flags through [`PageHost`]; the UI draws
//! whichever container is visible.

use crate::domain::models::PageDefinition;
use crate::domain::router::PageHost;
use crate::presentation::components::Components;
use eframe::egui;
use std::sync::{Arc, Mutex};
use tracing::warn;

pub type SharedPages = Arc<Mutex<PageContainers>>;

#[derive(Debug, Clone)]
pub struct PageContainer {
    pub definition: PageDefinition,
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub struct PageContainers {
    containers: Vec<PageContainer>,
}

impl PageContainers {
    /// Build containers with only `initial_page` visible.
    ///
    /// Ids are unique: a repeated id keeps its first definition.
    pub fn new(definitions: Vec<PageDefinition>, initial_page: &str) -> Self {
        let mut containers: Vec<PageContainer> = Vec::with_capacity(definitions.len());
        for definition in definitions {
            if containers.iter().any(|c| c.definition.id == definition.id) {
                warn!("Dropping duplicate page container '{}'", definition.id);
                continue;
            }
            containers.push(PageContainer {
                visible: definition.id == initial_page,
                definition,
            });
        }
        Self { containers }
    }

    pub fn shared(self) -> SharedPages {
        Arc::new(Mutex::new(self))
    }

    pub fn ids(&self) -> Vec<String> {
        self.containers
            .iter()
            .map(|c| c.definition.id.clone())
            .collect()
    }

    pub fn visible_pages(&self) -> Vec<&PageContainer> {
        self.containers.iter().filter(|c| c.visible).collect()
    }

    fn set_visible(&mut self, page_id: &str, visible: bool) {
        match self
            .containers
            .iter_mut()
            .find(|c| c.definition.id == page_id)
        {
            Some(container) => container.visible = visible,
            None => warn!("No page container with id '{}'", page_id),
        }
    }

    /// Draw the visible page
    pub fn render(&self, ui: &mut egui::Ui) {
        for container in self.visible_pages() {
            let page = &container.definition;
            Components::heading(ui, &page.title);
            ui.add_space(20.0);
            Components::page_card(ui, |ui| {
                ui.label(egui::RichText::new(&page.body).size(18.0));
            });
        }
    }
}

impl PageHost for SharedPages {
    fn show(&mut self, page_id: &str) {
        match self.lock() {
            Ok(mut pages) => pages.set_visible(page_id, true),
            Err(_) => warn!("Page containers lock poisoned; cannot show '{}'", page_id),
        }
    }

    fn hide(&mut self, page_id: &str) {
        match self.lock() {
            Ok(mut pages) => pages.set_visible(page_id, false),
            Err(_) => warn!("Page containers lock poisoned; cannot hide '{}'", page_id),
        }
    }
}
