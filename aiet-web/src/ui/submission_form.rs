use aiet_client::{
    api::{Attachment, Submission, SubmissionType},
    Error,
};
use anyhow::anyhow;
use wasm_bindgen_futures::JsFuture;
use yew::prelude::*;

use crate::{ui, ClientRef};

#[derive(Clone, PartialEq, Properties)]
pub struct SubmissionFormProps {
    pub client: ClientRef,
}

pub enum FormMsg {
    KindChanged(String),
    TitleChanged(String),
    ContentChanged(String),
    TagsChanged(String),
    FileChanged(Option<web_sys::File>),
    Submit,
    Submitted(Result<Submission, Error>),
    CloseToast,
}

pub struct SubmissionForm {
    kind: String,
    title: String,
    content: String,
    tags: String,
    file: Option<web_sys::File>,
    // bumped to reset the file input, which cannot be set from code
    file_input_key: u32,
    submitting: bool,
    error: Option<String>,
    toast: Option<String>,
}

async fn read_attachment(file: web_sys::File) -> anyhow::Result<Attachment> {
    let buf = JsFuture::from(file.array_buffer())
        .await
        .map_err(|err| anyhow!("failed reading {:?}: {err:?}", file.name()))?;
    let content_type = match file.type_() {
        t if t.is_empty() => String::from("application/octet-stream"),
        t => t,
    };
    Ok(Attachment {
        name: file.name(),
        content_type,
        bytes: js_sys::Uint8Array::new(&buf).to_vec(),
    })
}

impl SubmissionForm {
    fn reset(&mut self) {
        self.kind.clear();
        self.title.clear();
        self.content.clear();
        self.tags.clear();
        self.file = None;
        self.file_input_key += 1;
    }
}

impl Component for SubmissionForm {
    type Message = FormMsg;
    type Properties = SubmissionFormProps;

    fn create(_ctx: &Context<Self>) -> Self {
        SubmissionForm {
            kind: String::new(),
            title: String::new(),
            content: String::new(),
            tags: String::new(),
            file: None,
            file_input_key: 0,
            submitting: false,
            error: None,
            toast: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            FormMsg::KindChanged(k) => self.kind = k,
            FormMsg::TitleChanged(t) => self.title = t,
            FormMsg::ContentChanged(c) => self.content = c,
            FormMsg::TagsChanged(t) => self.tags = t,
            FormMsg::FileChanged(f) => self.file = f,
            FormMsg::Submit => {
                let client = ctx.props().client.clone();
                if !client.session.is_logged_in() {
                    client.session.request_login();
                    self.toast = Some(String::from("Please sign in to submit content."));
                    return true;
                }
                self.submitting = true;
                self.error = None;
                let (kind, title, content, tags) = (
                    self.kind.clone(),
                    self.title.clone(),
                    self.content.clone(),
                    self.tags.clone(),
                );
                let file = self.file.clone();
                ctx.link().send_future(async move {
                    let attachment = match file {
                        None => None,
                        Some(f) => match read_attachment(f).await {
                            Ok(a) => Some(a),
                            Err(err) => {
                                tracing::error!(?err, "submitting without the unreadable attachment");
                                None
                            }
                        },
                    };
                    let res = client
                        .submissions
                        .submit(&kind, &title, &content, &tags, attachment)
                        .await;
                    FormMsg::Submitted(res)
                });
            }
            FormMsg::Submitted(res) => {
                self.submitting = false;
                match res {
                    Ok(_) => {
                        self.reset();
                        self.toast = Some(String::from("Submission received! Pending review."));
                    }
                    Err(Error::Validation(msg)) => self.error = Some(msg),
                    Err(Error::AuthRequired) => {
                        self.toast = Some(String::from("Please sign in to submit content."))
                    }
                    Err(err) => {
                        tracing::error!(?err, "failed submitting");
                        self.error = Some(String::from("An error occurred. Please try again later."));
                    }
                }
            }
            FormMsg::CloseToast => self.toast = None,
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        macro_rules! callback_for {
            ($msg:ident, $elt:ty) => {
                ctx.link().callback(|e: InputEvent| {
                    let input: $elt = e.target_unchecked_into();
                    FormMsg::$msg(input.value())
                })
            };
        }
        let on_file = ctx.link().callback(|e: Event| {
            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
            FormMsg::FileChanged(input.files().and_then(|f| f.get(0)))
        });
        let on_kind = ctx.link().callback(|e: Event| {
            let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
            FormMsg::KindChanged(select.value())
        });
        html! {
            <form class="submission-form" onsubmit={ ctx.link().callback(|e: SubmitEvent| {
                e.prevent_default();
                FormMsg::Submit
            }) }>
                <div class="form-group">
                    <label for="submission-type">{ "Type *" }</label>
                    <select id="submission-type" onchange={ on_kind }>
                        <option value="" selected={ self.kind.is_empty() }>{ "Select a type" }</option>
                        { for SubmissionType::ALL.iter().map(|t| html! {
                            <option value={ t.as_str() } selected={ self.kind == t.as_str() }>
                                { t.display_name() }
                            </option>
                        }) }
                    </select>
                </div>
                <div class="form-group">
                    <label for="submission-title">{ "Title *" }</label>
                    <input
                        type="text"
                        id="submission-title"
                        value={ self.title.clone() }
                        oninput={ callback_for!(TitleChanged, web_sys::HtmlInputElement) }
                    />
                </div>
                <div class="form-group">
                    <label for="submission-content">{ "Content *" }</label>
                    <textarea
                        id="submission-content"
                        rows="8"
                        value={ self.content.clone() }
                        oninput={ callback_for!(ContentChanged, web_sys::HtmlTextAreaElement) }
                    />
                </div>
                <div class="form-group">
                    <label for="submission-tags">{ "Tags" }</label>
                    <input
                        type="text"
                        id="submission-tags"
                        placeholder="Comma-separated, e.g. AI, assessment"
                        value={ self.tags.clone() }
                        oninput={ callback_for!(TagsChanged, web_sys::HtmlInputElement) }
                    />
                </div>
                <div class="form-group">
                    <label for="submission-file">{ "Attachment" }</label>
                    <input
                        key={ self.file_input_key.to_string() }
                        type="file"
                        id="submission-file"
                        onchange={ on_file }
                    />
                </div>
                if let Some(err) = &self.error {
                    <div class="submission-error">{ err }</div>
                }
                <button type="submit" class="submission-submit-btn" disabled={ self.submitting }>
                    { if self.submitting { "Submitting..." } else { "Submit for Review" } }
                </button>
                <ui::Toast
                    message={ self.toast.clone() }
                    on_close={ ctx.link().callback(|_| FormMsg::CloseToast) }
                />
            </form>
        }
    }
}
