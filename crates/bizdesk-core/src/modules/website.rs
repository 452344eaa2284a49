//! Website builder: sites, their pages, and an in-memory page editor.
//!
//! Editing happens on a working copy of one page. Nothing reaches the store
//! until [`SiteBuilder::save_page`] writes the page back into the site's
//! `pages` array.

use chrono::Utc;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::model::{
    ElementType, PageElement, Position, Record, RecordId, SiteStatus, WebsitePage, WebsiteProject,
    WebsiteProjectPatch,
};
use crate::query::SortOrder;
use crate::session::SessionProvider;
use crate::store::RecordStore;
use crate::view_model::EntityViewModel;

/// Where new elements are dropped on the canvas.
pub const DEFAULT_POSITION: Position = Position { x: 50.0, y: 50.0 };

#[derive(Debug, Default)]
struct EditorState {
    site: Option<RecordId>,
    page: Option<WebsitePage>,
    element: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SiteBuilder {
    sites: EntityViewModel<WebsiteProject>,
    editor: Arc<Mutex<EditorState>>,
}

impl SiteBuilder {
    pub fn new(store: Arc<dyn RecordStore>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            sites: EntityViewModel::new(store, session).sorted(SortOrder::UpdatedDesc),
            editor: Arc::new(Mutex::new(EditorState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.editor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn sites(&self) -> &EntityViewModel<WebsiteProject> {
        &self.sites
    }

    pub async fn load(&self) -> bool {
        self.sites.load().await
    }

    /// Create a draft site with a single homepage, then open it.
    pub async fn create_site(&self, name: &str) -> Option<Record<WebsiteProject>> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let identity = self.sites.session().current_identity()?;
        let created = self
            .sites
            .create(WebsiteProject {
                name: name.to_string(),
                description: format!("Website created by {}", identity.email),
                domain: site_domain(name),
                template: "blank".to_string(),
                status: SiteStatus::Draft,
                pages: vec![WebsitePage {
                    id: "home".to_string(),
                    name: "Home".to_string(),
                    slug: "/".to_string(),
                    title: "Welcome to My Website".to_string(),
                    content: Vec::new(),
                    is_homepage: true,
                }],
            })
            .await?;
        self.select_site(created.id());
        Some(created)
    }

    /// Open a site in the editor on its homepage (or first page).
    pub fn select_site(&self, id: &RecordId) -> bool {
        let Some(site) = self.sites.find(id) else {
            debug!(%id, "site not in collection");
            return false;
        };
        let pages = site.fields.pages;
        let page = pages
            .iter()
            .find(|page| page.is_homepage)
            .or_else(|| pages.first())
            .cloned();

        let mut editor = self.lock();
        editor.site = Some(id.clone());
        editor.page = page;
        editor.element = None;
        true
    }

    /// Switch the working page. Unsaved edits to the previous page are
    /// discarded.
    pub fn select_page(&self, page_id: &str) -> bool {
        let Some(site) = self.selected_site() else {
            return false;
        };
        let Some(page) = site.fields.pages.into_iter().find(|page| page.id == page_id) else {
            return false;
        };
        let mut editor = self.lock();
        editor.page = Some(page);
        editor.element = None;
        true
    }

    pub fn close(&self) {
        *self.lock() = EditorState::default();
    }

    #[must_use]
    pub fn selected_site(&self) -> Option<Record<WebsiteProject>> {
        let id = self.lock().site.clone()?;
        self.sites.find(&id)
    }

    /// The working copy of the page being edited.
    #[must_use]
    pub fn working_page(&self) -> Option<WebsitePage> {
        self.lock().page.clone()
    }

    #[must_use]
    pub fn selected_element(&self) -> Option<PageElement> {
        let editor = self.lock();
        let id = editor.element.as_deref()?;
        editor
            .page
            .as_ref()?
            .content
            .iter()
            .find(|element| element.id == id)
            .cloned()
    }

    pub fn select_element(&self, element_id: &str) -> bool {
        let mut editor = self.lock();
        let exists = editor
            .page
            .as_ref()
            .is_some_and(|page| page.content.iter().any(|e| e.id == element_id));
        if exists {
            editor.element = Some(element_id.to_string());
        }
        exists
    }

    /// Append an element with default content and styles to the working
    /// page and select it.
    pub fn add_element(&self, kind: ElementType) -> Option<PageElement> {
        let mut editor = self.lock();
        let page = editor.page.as_mut()?;

        let mut stamp = Utc::now().timestamp_millis();
        let mut id = format!("element-{stamp}");
        while page.content.iter().any(|e| e.id == id) {
            stamp += 1;
            id = format!("element-{stamp}");
        }
        let element = PageElement {
            id,
            kind,
            content: default_content(kind),
            styles: default_styles(kind),
            position: DEFAULT_POSITION,
        };
        page.content.push(element.clone());
        editor.element = Some(element.id.clone());
        Some(element)
    }

    /// Replace an element's content on the working page.
    pub fn update_element_content(&self, element_id: &str, content: Value) -> bool {
        let mut editor = self.lock();
        let Some(element) = editor
            .page
            .as_mut()
            .and_then(|page| page.content.iter_mut().find(|e| e.id == element_id))
        else {
            return false;
        };
        element.content = content;
        true
    }

    /// Remove an element from the working page and clear the element
    /// selection.
    pub fn delete_element(&self, element_id: &str) -> bool {
        let mut editor = self.lock();
        let Some(page) = editor.page.as_mut() else {
            return false;
        };
        let before = page.content.len();
        page.content.retain(|e| e.id != element_id);
        let removed = page.content.len() != before;
        editor.element = None;
        removed
    }

    /// Write the working page back into the selected site.
    pub async fn save_page(&self) -> bool {
        let (site_id, page) = {
            let editor = self.lock();
            match (editor.site.clone(), editor.page.clone()) {
                (Some(site), Some(page)) => (site, page),
                _ => return false,
            }
        };
        let Some(site) = self.sites.find(&site_id) else {
            warn!(id = %site_id, "selected site is no longer loaded");
            return false;
        };

        let mut pages = site.fields.pages;
        match pages.iter_mut().find(|p| p.id == page.id) {
            Some(slot) => *slot = page,
            None => pages.push(page),
        }
        self.sites
            .update(
                &site_id,
                WebsiteProjectPatch {
                    pages: Some(pages),
                    ..WebsiteProjectPatch::default()
                },
            )
            .await
    }

    pub async fn set_status(&self, id: &RecordId, status: SiteStatus) -> bool {
        self.sites
            .update(
                id,
                WebsiteProjectPatch {
                    status: Some(status),
                    ..WebsiteProjectPatch::default()
                },
            )
            .await
    }

    pub async fn delete_site(&self, id: &RecordId) -> bool {
        if !self.sites.delete(id).await {
            return false;
        }
        if self.lock().site.as_ref() == Some(id) {
            self.close();
        }
        true
    }
}

/// `"My Shop"` becomes `"my-shop.mysite.com"`.
#[must_use]
pub fn site_domain(name: &str) -> String {
    let slug = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{slug}.mysite.com")
}

#[must_use]
pub fn default_content(kind: ElementType) -> Value {
    match kind {
        ElementType::Header => json!({"text": "Your Heading Here", "level": 1}),
        ElementType::Text => json!({"text": "Your text content goes here. Click to edit."}),
        ElementType::Image => json!({
            "src": "https://via.placeholder.com/400x300",
            "alt": "Placeholder image",
        }),
        ElementType::Button => json!({"text": "Click Me", "link": "#"}),
        ElementType::Form => json!({
            "fields": [{"type": "email", "label": "Email", "required": true}],
        }),
        ElementType::Gallery => json!({"images": []}),
        ElementType::Video => json!({"src": "", "poster": ""}),
    }
}

#[must_use]
pub fn default_styles(kind: ElementType) -> Value {
    let button = kind == ElementType::Button;
    let header = kind == ElementType::Header;
    json!({
        "width": if button { "auto" } else { "100%" },
        "padding": "16px",
        "margin": "8px 0",
        "backgroundColor": if button { "#6366f1" } else { "transparent" },
        "color": if button { "#ffffff" } else { "#000000" },
        "fontSize": if header { "32px" } else { "16px" },
        "fontWeight": if header { "bold" } else { "normal" },
        "textAlign": "left",
        "borderRadius": if button { "8px" } else { "0px" },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Identity, LocalSession};
    use crate::store::memory::{MemoryStore, StoreOp};

    fn builder() -> (Arc<MemoryStore>, SiteBuilder) {
        let store = Arc::new(MemoryStore::new());
        let session = Arc::new(LocalSession::signed_in(Identity::new("u1", "web@example.com")));
        (store.clone(), SiteBuilder::new(store, session))
    }

    #[test]
    fn domain_collapses_whitespace() {
        assert_eq!(site_domain("My  Cool\tShop"), "my-cool-shop.mysite.com");
    }

    #[test]
    fn button_styles_differ_from_defaults() {
        let button = default_styles(ElementType::Button);
        assert_eq!(button["width"], "auto");
        assert_eq!(button["backgroundColor"], "#6366f1");
        let header = default_styles(ElementType::Header);
        assert_eq!(header["fontSize"], "32px");
        assert_eq!(header["borderRadius"], "0px");
    }

    #[tokio::test]
    async fn create_site_opens_homepage() {
        let (_store, builder) = builder();
        let site = builder.create_site("Acme Store").await.expect("created");
        assert_eq!(site.fields.domain, "acme-store.mysite.com");
        assert_eq!(site.fields.description, "Website created by web@example.com");
        assert_eq!(site.fields.status, SiteStatus::Draft);

        let page = builder.working_page().expect("page");
        assert_eq!(page.id, "home");
        assert!(page.is_homepage);
        assert!(builder.create_site("  ").await.is_none());
    }

    #[tokio::test]
    async fn element_edits_stay_local_until_saved() {
        let (store, builder) = builder();
        let site = builder.create_site("Acme").await.expect("created");
        let updates = store.calls(StoreOp::Update);

        let element = builder.add_element(ElementType::Header).expect("element");
        assert!(element.id.starts_with("element-"));
        assert_eq!(element.position, DEFAULT_POSITION);
        assert_eq!(builder.selected_element().map(|e| e.id), Some(element.id.clone()));
        assert!(builder.update_element_content(&element.id, json!({"text": "Hi", "level": 2})));
        let second = builder.add_element(ElementType::Button).expect("second");
        assert_ne!(second.id, element.id);
        assert!(builder.delete_element(&second.id));
        assert!(builder.selected_element().is_none());
        assert_eq!(store.calls(StoreOp::Update), updates);

        assert!(builder.save_page().await);
        let stored = builder.sites().find(site.id()).expect("site");
        let home = &stored.fields.pages[0];
        assert_eq!(home.content.len(), 1);
        assert_eq!(home.content[0].content["text"], "Hi");
        assert!(stored.meta.updated_at.is_some());
    }

    #[tokio::test]
    async fn editing_without_a_page_is_a_no_op() {
        let (_store, builder) = builder();
        assert!(builder.add_element(ElementType::Text).is_none());
        assert!(!builder.delete_element("element-1"));
        assert!(!builder.save_page().await);
        assert!(!builder.select_page("home"));
    }
}
