//! Page Router
//!
//! Maps beacons to pages and flips page container visibility.

use crate::domain::models::AppState;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Something that owns page containers addressed by id.
pub trait PageHost {
    fn show(&mut self, page_id: &str);
    fn hide(&mut self, page_id: &str);
}

pub struct PageRouter<H: PageHost> {
    host: H,
    beacon_pages: BTreeMap<String, String>,
    known_pages: HashSet<String>,
    default_page: String,
}

impl<H: PageHost> PageRouter<H> {
    /// Create a router over `host`.
    ///
    /// `pages` lists every container the host can show; the default page
    /// and every mapped page are always considered known.
    pub fn new<I>(
        host: H,
        beacon_pages: BTreeMap<String, String>,
        pages: I,
        default_page: &str,
    ) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut known_pages: HashSet<String> = pages.into_iter().collect();
        known_pages.insert(default_page.to_string());
        known_pages.extend(beacon_pages.values().cloned());

        Self {
            host,
            beacon_pages,
            known_pages,
            default_page: default_page.to_string(),
        }
    }

    pub fn default_page(&self) -> &str {
        &self.default_page
    }

    /// Page for a beacon, or the default page if it has none
    pub fn page_for_beacon(&self, beacon: Option<&str>) -> &str {
        beacon
            .and_then(|b| self.beacon_pages.get(b))
            .map(String::as_str)
            .unwrap_or(&self.default_page)
    }

    /// Hide the current page and show `page_id` (or the default page if
    /// `page_id` is not a known container).
    pub fn navigate(&mut self, state: &mut AppState, page_id: &str) {
        let target = if self.known_pages.contains(page_id) {
            page_id.to_string()
        } else {
            debug!("Unknown page '{}', falling back to default", page_id);
            self.default_page.clone()
        };

        self.host.hide(&state.current_page);
        self.host.show(&target);
        info!(from = %state.current_page, to = %target, "Switched page");
        state.current_page = target;
    }

    /// Show the page mapped to `beacon`
    pub fn navigate_to_beacon(&mut self, state: &mut AppState, beacon: Option<&str>) {
        let page = self.page_for_beacon(beacon).to_string();
        self.navigate(state, &page);
    }

    #[cfg(test)]
    pub fn host(&self) -> &H {
        &self.host
    }
}
