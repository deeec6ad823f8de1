use aiet_client::{
    api::{same_email, Comment, CommentId, PostId, SessionUser},
    display::initials,
    Error,
};
use yew::prelude::*;

use crate::{ui, ClientRef};

#[derive(Clone, PartialEq, Properties)]
pub struct CommentSectionProps {
    pub client: ClientRef,
    pub post_id: PostId,
}

pub enum CommentMsg {
    SessionChanged,
    Loaded(Vec<Comment>),
    ContentChanged(String),
    Post,
    Reply(CommentId, String),
    Delete(CommentId),
    /// A mutation completed, with the toast to show and whether to clear the comment form
    Done(String, bool),
    SignIn,
    CloseToast,
}

/// Discussion thread under one post
pub struct CommentSection {
    comments: Option<Vec<Comment>>,
    user: Option<SessionUser>,
    content: String,
    posting: bool,
    toast: Option<String>,
}

impl CommentSection {
    fn reload(&self, ctx: &Context<Self>) {
        let client = ctx.props().client.clone();
        let post = ctx.props().post_id.clone();
        ctx.link().send_future(async move {
            CommentMsg::Loaded(client.comments.list(&post).await)
        });
    }

    fn view_form(&self, ctx: &Context<Self>) -> Html {
        let Some(user) = &self.user else {
            return html! {
                <div class="comment-login-prompt">
                    <p>{ "Sign in to join the discussion" }</p>
                    <button
                        type="button"
                        class="auth-login-btn"
                        onclick={ ctx.link().callback(|_| CommentMsg::SignIn) }
                    >
                        { "Sign In" }
                    </button>
                </div>
            };
        };
        html! {
            <div class="comment-form">
                <div class="comment-form-header">
                    <span class="comment-avatar">{ initials(&user.name) }</span>
                    <span class="comment-form-user">{ &user.name }</span>
                </div>
                <textarea
                    placeholder="Share your thoughts or questions..."
                    rows="2"
                    value={ self.content.clone() }
                    oninput={ ctx.link().callback(|e: InputEvent| {
                        let input: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
                        CommentMsg::ContentChanged(input.value())
                    }) }
                />
                <div class="comment-form-actions">
                    <button
                        type="button"
                        class="comment-submit-btn"
                        disabled={ self.posting }
                        onclick={ ctx.link().callback(|_| CommentMsg::Post) }
                    >
                        { if self.posting { "Posting..." } else { "Post Comment" } }
                    </button>
                </div>
            </div>
        }
    }
}

fn failure_toast(err: Error, sign_in: &str, empty: &str) -> String {
    match err {
        Error::AuthRequired => String::from(sign_in),
        Error::Validation(_) => String::from(empty),
        err => {
            tracing::error!(?err, "failed storing comment");
            String::from("An error occurred. Please try again later.")
        }
    }
}

impl Component for CommentSection {
    type Message = CommentMsg;
    type Properties = CommentSectionProps;

    fn create(ctx: &Context<Self>) -> Self {
        ui::watch_session(ctx, &ctx.props().client, |_| Some(CommentMsg::SessionChanged));
        let this = CommentSection {
            comments: None,
            user: ctx.props().client.session.current_user(),
            content: String::new(),
            posting: false,
            toast: None,
        };
        this.reload(ctx);
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let client = ctx.props().client.clone();
        let post = ctx.props().post_id.clone();
        match msg {
            CommentMsg::SessionChanged => {
                self.user = client.session.current_user();
            }
            CommentMsg::Loaded(comments) => self.comments = Some(comments),
            CommentMsg::ContentChanged(c) => self.content = c,
            CommentMsg::Post => {
                self.posting = true;
                let content = self.content.clone();
                ctx.link().send_future(async move {
                    match client.comments.add_comment(&post, &content).await {
                        Ok(_) => CommentMsg::Done(String::from("Comment posted successfully!"), true),
                        Err(err) => CommentMsg::Done(
                            failure_toast(
                                err,
                                "Please sign in to comment.",
                                "Please write something before posting.",
                            ),
                            false,
                        ),
                    }
                });
            }
            CommentMsg::Reply(id, content) => {
                ctx.link().send_future(async move {
                    let toast = match client.comments.add_reply(&post, id, &content).await {
                        Ok(_) => String::from("Reply posted!"),
                        Err(err) => failure_toast(
                            err,
                            "Please sign in to reply.",
                            "Please write something before replying.",
                        ),
                    };
                    CommentMsg::Done(toast, false)
                });
            }
            CommentMsg::Delete(id) => {
                if !ui::confirm("Delete this comment?") {
                    return false;
                }
                ctx.link().send_future(async move {
                    let toast = match client.comments.delete_comment(&post, id).await {
                        true => "Comment deleted.",
                        false => "Could not delete this comment.",
                    };
                    CommentMsg::Done(String::from(toast), false)
                });
            }
            CommentMsg::Done(toast, clear_form) => {
                if clear_form {
                    self.content.clear();
                }
                self.posting = false;
                self.toast = Some(toast);
                self.reload(ctx);
            }
            CommentMsg::SignIn => {
                client.session.request_login();
                return false;
            }
            CommentMsg::CloseToast => self.toast = None,
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let Some(comments) = &self.comments else {
            return html! { <div class="comments-loading">{ "Loading comments..." }</div> };
        };
        let on_reply = ctx
            .link()
            .callback(|(id, text): (CommentId, String)| CommentMsg::Reply(id, text));
        let on_delete = ctx.link().callback(CommentMsg::Delete);
        let is_author = |email: &str| {
            self.user
                .as_ref()
                .map_or(false, |u| same_email(&u.email, email))
        };
        html! {<>
            <div class="comments-header">
                <h3>{ format!("Discussion ({})", comments.len()) }</h3>
            </div>
            <div class="comments-list">
                if comments.is_empty() {
                    <div class="no-comments">
                        <p>{ "No comments yet. Be the first to start the discussion!" }</p>
                    </div>
                } else {
                    { for comments.iter().map(|c| html! {
                        <ui::CommentItem
                            key={ c.id.to_string() }
                            comment={ c.clone() }
                            can_delete={ is_author(&c.author.email) }
                            on_reply={ on_reply.clone() }
                            on_delete={ on_delete.clone() }
                        />
                    }) }
                }
            </div>
            { self.view_form(ctx) }
            <ui::Toast
                message={ self.toast.clone() }
                on_close={ ctx.link().callback(|_| CommentMsg::CloseToast) }
            />
        </>}
    }
}
