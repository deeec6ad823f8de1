use std::{ops::Deref, rc::Rc};

use aiet_client::{api::PostId, Client, ClientConfig, Directory, SupabaseClient};

mod storage;
pub use storage::BrowserStorage;

mod ui;

pub type AietClient = Client<SupabaseClient, BrowserStorage>;

/// Handle on the page-wide client, compared by identity
#[derive(Clone)]
pub struct ClientRef(Rc<AietClient>);

impl PartialEq for ClientRef {
    fn eq(&self, other: &ClientRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for ClientRef {
    type Target = AietClient;

    fn deref(&self) -> &AietClient {
        &self.0
    }
}

fn main() {
    tracing_wasm::set_as_global_default();

    let config = ClientConfig::from_build_env().unwrap_or_else(|err| {
        tracing::error!(?err, "invalid build-time configuration, using defaults");
        ClientConfig::default()
    });
    let backend = Rc::new(SupabaseClient::new(&config));
    let client = ClientRef(Rc::new(Client::new(
        backend,
        BrowserStorage,
        Directory::conference(),
        &config,
    )));

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        tracing::error!("no document to render into");
        return;
    };

    if let Some(root) = document.get_element_by_id("auth-container") {
        let props = ui::AuthWidgetProps {
            client: client.clone(),
        };
        yew::Renderer::<ui::AuthWidget>::with_root_and_props(root, props).render();
    }
    if let Some(root) = document.get_element_by_id("comments-section") {
        match root.get_attribute("data-post-id") {
            None => tracing::warn!("comments section has no data-post-id, not rendering it"),
            Some(post_id) => {
                let props = ui::CommentSectionProps {
                    client: client.clone(),
                    post_id: PostId::new(post_id),
                };
                yew::Renderer::<ui::CommentSection>::with_root_and_props(root, props).render();
            }
        }
    }
    if let Some(root) = document.get_element_by_id("submission-form") {
        let props = ui::SubmissionFormProps {
            client: client.clone(),
        };
        yew::Renderer::<ui::SubmissionForm>::with_root_and_props(root, props).render();
    }
    for (id, view) in [
        ("my-submissions", ui::ListView::Mine),
        ("member-board", ui::ListView::Board),
        ("admin-dashboard", ui::ListView::Admin),
    ] {
        if let Some(root) = document.get_element_by_id(id) {
            let props = ui::SubmissionListProps {
                client: client.clone(),
                view,
            };
            yew::Renderer::<ui::SubmissionList>::with_root_and_props(root, props).render();
        }
    }
}
