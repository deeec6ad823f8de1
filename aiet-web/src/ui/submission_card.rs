use aiet_client::{api::Submission, display::format_date_time};
use yew::prelude::*;

use crate::ui;

#[derive(Clone, PartialEq, Properties)]
pub struct SubmissionCardProps {
    pub submission: Submission,
    pub show_status: bool,
    #[prop_or_default]
    pub actions: Option<Html>,
}

#[function_component(SubmissionCard)]
pub fn submission_card(p: &SubmissionCardProps) -> Html {
    let s = &p.submission;
    let affiliation = s.author_affiliation.as_deref().filter(|a| !a.is_empty());
    html! {
        <div class="submission-card" id={ format!("submission-{}", s.id) }>
            <div class="submission-header">
                <span class={ classes!("submission-type", s.kind.badge_class()) }>
                    { s.kind.display_name() }
                </span>
                if p.show_status {
                    <span class={ classes!("submission-status", s.status.badge_class()) }>
                        { s.status.as_str() }
                    </span>
                }
            </div>
            <h3 class="submission-title">{ &s.title }</h3>
            <div class="submission-meta">
                <span class="submission-author">{ &s.author_name }</span>
                if let Some(a) = affiliation {
                    <span class="submission-affiliation">{ a }</span>
                }
                <span class="submission-date">{ format_date_time(s.created_at) }</span>
            </div>
            <div class="submission-content">{ ui::text_with_breaks(&s.content) }</div>
            if !s.tag_list().is_empty() {
                <div class="submission-tags">
                    { for s.tag_list().into_iter().map(|t| html! { <span class="tag">{ t }</span> }) }
                </div>
            }
            if let (Some(name), Some(url)) = (&s.attachment_name, &s.attachment_url) {
                <a class="submission-attachment" href={ url.clone() } target="_blank" rel="noopener">
                    { name }
                </a>
            }
            if let Some(actions) = &p.actions {
                <div class="submission-actions">{ actions.clone() }</div>
            }
        </div>
    }
}
