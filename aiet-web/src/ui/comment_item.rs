use aiet_client::{
    api::{Author, Comment, CommentId, Time},
    display::{format_timestamp, initials},
};
use chrono::Utc;
use yew::prelude::*;

use crate::ui;

#[derive(Clone, PartialEq, Properties)]
pub struct CommentItemProps {
    pub comment: Comment,
    pub can_delete: bool,
    pub on_reply: Callback<(CommentId, String)>,
    pub on_delete: Callback<CommentId>,
}

#[function_component(CommentItem)]
pub fn comment_item(p: &CommentItemProps) -> Html {
    let reply_edit = use_state(|| None::<String>);
    let c = &p.comment;
    let now = Utc::now();

    let toggle_reply = {
        let reply_edit = reply_edit.clone();
        Callback::from(move |_| match *reply_edit {
            Some(_) => reply_edit.set(None),
            None => reply_edit.set(Some(String::new())),
        })
    };
    let delete_button = p.can_delete.then(|| {
        let id = c.id;
        html! {
            <button
                type="button"
                class="comment-delete-btn"
                title="Delete"
                onclick={ p.on_delete.reform(move |_| id) }
            >
                { "×" }
            </button>
        }
    });

    html! {
        <div class="comment-item" id={ format!("comment-{}", c.id) }>
            { header(&c.author, c.timestamp, now, false, delete_button) }
            <div class="comment-content">{ ui::text_with_breaks(&c.content) }</div>
            <div class="comment-actions">
                <button type="button" class="comment-reply-btn" onclick={ toggle_reply.clone() }>
                    { "Reply" }
                </button>
            </div>
            if let Some(text) = (*reply_edit).clone() {
                { reply_form(c.id, text, reply_edit, &p.on_reply, toggle_reply) }
            }
            if !c.replies.is_empty() {
                <div class="comment-replies">
                    { for c.replies.iter().map(|r| html! {
                        <div class="reply-item">
                            { header(&r.author, r.timestamp, now, true, None) }
                            <div class="comment-content">{ ui::text_with_breaks(&r.content) }</div>
                        </div>
                    }) }
                </div>
            }
        </div>
    }
}

fn header(author: &Author, ts: Time, now: Time, small: bool, delete_button: Option<Html>) -> Html {
    html! {
        <div class="comment-header">
            <span class={ classes!("comment-avatar", small.then(|| "small")) }>
                { initials(&author.name) }
            </span>
            <div class="comment-meta">
                <span class="comment-author">{ &author.name }</span>
                <span class={ classes!("comment-role", author.role.badge_class()) }>
                    { author.role.as_str() }
                </span>
                <span class="comment-time">{ format_timestamp(ts, now) }</span>
            </div>
            { for delete_button }
        </div>
    }
}

fn reply_form(
    id: CommentId,
    text: String,
    edit: UseStateHandle<Option<String>>,
    on_reply: &Callback<(CommentId, String)>,
    on_cancel: Callback<MouseEvent>,
) -> Html {
    let on_input = {
        let edit = edit.clone();
        Callback::from(move |e: InputEvent| {
            let input: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
            edit.set(Some(input.value()))
        })
    };
    let on_submit = {
        let text = text.clone();
        on_reply.reform(move |_| {
            edit.set(None);
            (id, text.clone())
        })
    };
    html! {
        <div class="reply-form">
            <textarea
                placeholder="Write a reply..."
                rows="2"
                value={ text }
                oninput={ on_input }
            />
            <div class="reply-form-actions">
                <button type="button" class="reply-submit-btn" onclick={ on_submit }>{ "Reply" }</button>
                <button type="button" class="reply-cancel-btn" onclick={ on_cancel }>{ "Cancel" }</button>
            </div>
        </div>
    }
}
