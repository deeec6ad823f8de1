use aiet_client::api::{Submission, SubmissionId, SubmissionStatus, SubmissionType};
use yew::prelude::*;

use crate::{ui, ClientRef};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListView {
    /// The logged-in member's own submissions
    Mine,
    /// Approved submissions, for everyone
    Board,
    /// Every submission, for review by the administrator
    Admin,
}

#[derive(Clone, PartialEq, Properties)]
pub struct SubmissionListProps {
    pub client: ClientRef,
    pub view: ListView,
}

pub enum ListMsg {
    Reload,
    Loaded(Vec<Submission>),
    FilterType(Option<SubmissionType>),
    FilterStatus(Option<SubmissionStatus>),
    SetStatus(SubmissionId, SubmissionStatus),
    Delete(SubmissionId),
    Done(&'static str),
    CloseToast,
}

pub struct SubmissionList {
    items: Option<Vec<Submission>>,
    type_filter: Option<SubmissionType>,
    status_filter: Option<SubmissionStatus>,
    toast: Option<String>,
}

impl SubmissionList {
    fn reload(&self, ctx: &Context<Self>) {
        let client = ctx.props().client.clone();
        let view = ctx.props().view;
        let (kind, status) = (self.type_filter, self.status_filter);
        ctx.link().send_future(async move {
            let items = match view {
                ListView::Mine => client.submissions.list_mine().await,
                ListView::Board => client.submissions.list_approved(kind).await,
                ListView::Admin => client.submissions.list_all(status).await,
            };
            ListMsg::Loaded(items)
        });
    }

    fn view_filters(&self, ctx: &Context<Self>) -> Html {
        match ctx.props().view {
            ListView::Mine => html! {},
            ListView::Board => {
                let button = |kind: Option<SubmissionType>| {
                    let label = kind.map_or("All", |k| k.display_name());
                    html! {
                        <button
                            type="button"
                            class={ classes!("filter-btn", (self.type_filter == kind).then(|| "active")) }
                            onclick={ ctx.link().callback(move |_| ListMsg::FilterType(kind)) }
                        >
                            { label }
                        </button>
                    }
                };
                html! {
                    <div class="board-filters">
                        { button(None) }
                        { for SubmissionType::ALL.into_iter().map(|k| button(Some(k))) }
                    </div>
                }
            }
            ListView::Admin => {
                let on_change = ctx.link().callback(|e: Event| {
                    let select: web_sys::HtmlSelectElement = e.target_unchecked_into();
                    ListMsg::FilterStatus(select.value().parse().ok())
                });
                html! {
                    <div class="admin-filters">
                        <label for="status-filter">{ "Status" }</label>
                        <select id="status-filter" onchange={ on_change }>
                            <option value="" selected={ self.status_filter.is_none() }>{ "All" }</option>
                            { for SubmissionStatus::ALL.iter().map(|s| html! {
                                <option value={ s.as_str() } selected={ self.status_filter == Some(*s) }>
                                    { s.as_str() }
                                </option>
                            }) }
                        </select>
                    </div>
                }
            }
        }
    }

    fn view_actions(&self, ctx: &Context<Self>, s: &Submission) -> Option<Html> {
        let id = s.id;
        let delete = html! {
            <button
                type="button"
                class="action-delete"
                onclick={ ctx.link().callback(move |_| ListMsg::Delete(id)) }
            >
                { "Delete" }
            </button>
        };
        match ctx.props().view {
            ListView::Board => None,
            ListView::Mine => Some(delete),
            ListView::Admin => Some(html! {<>
                if s.status != SubmissionStatus::Approved {
                    <button
                        type="button"
                        class="action-approve"
                        onclick={ ctx.link().callback(move |_| ListMsg::SetStatus(id, SubmissionStatus::Approved)) }
                    >
                        { "Approve" }
                    </button>
                }
                if s.status != SubmissionStatus::Rejected {
                    <button
                        type="button"
                        class="action-reject"
                        onclick={ ctx.link().callback(move |_| ListMsg::SetStatus(id, SubmissionStatus::Rejected)) }
                    >
                        { "Reject" }
                    </button>
                }
                { delete }
            </>}),
        }
    }

    fn empty_message(&self, ctx: &Context<Self>) -> &'static str {
        match ctx.props().view {
            ListView::Mine if !ctx.props().client.session.is_logged_in() => {
                "Sign in to see your submissions."
            }
            ListView::Mine => "You have not submitted anything yet.",
            ListView::Board => "No approved submissions yet.",
            ListView::Admin => "No submissions to review.",
        }
    }
}

impl Component for SubmissionList {
    type Message = ListMsg;
    type Properties = SubmissionListProps;

    fn create(ctx: &Context<Self>) -> Self {
        if ctx.props().view != ListView::Board {
            ui::watch_session(ctx, &ctx.props().client, |_| Some(ListMsg::Reload));
        }
        let this = SubmissionList {
            items: None,
            type_filter: None,
            status_filter: None,
            toast: None,
        };
        this.reload(ctx);
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let client = ctx.props().client.clone();
        match msg {
            ListMsg::Reload => self.reload(ctx),
            ListMsg::Loaded(items) => self.items = Some(items),
            ListMsg::FilterType(kind) => {
                self.type_filter = kind;
                self.reload(ctx);
            }
            ListMsg::FilterStatus(status) => {
                self.status_filter = status;
                self.reload(ctx);
            }
            ListMsg::SetStatus(id, status) => {
                ctx.link().send_future(async move {
                    match client.submissions.set_status(id, status).await {
                        true if status == SubmissionStatus::Approved => ListMsg::Done("Submission approved."),
                        true => ListMsg::Done("Submission rejected."),
                        false => ListMsg::Done("Could not update this submission."),
                    }
                });
                return false;
            }
            ListMsg::Delete(id) => {
                if !ui::confirm("Delete this submission?") {
                    return false;
                }
                ctx.link().send_future(async move {
                    match client.submissions.delete(id).await {
                        true => ListMsg::Done("Submission deleted."),
                        false => ListMsg::Done("Could not delete this submission."),
                    }
                });
                return false;
            }
            ListMsg::Done(toast) => {
                self.toast = Some(String::from(toast));
                self.reload(ctx);
            }
            ListMsg::CloseToast => self.toast = None,
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let admin_view = ctx.props().view == ListView::Admin;
        if admin_view && !ctx.props().client.session.is_admin() {
            return html! {
                <div class="admin-denied">{ "Admin access required." }</div>
            };
        }
        let list = match &self.items {
            None => html! { <div class="submissions-loading">{ "Loading..." }</div> },
            Some(items) if items.is_empty() => html! {
                <div class="no-submissions">{ self.empty_message(ctx) }</div>
            },
            Some(items) => items
                .iter()
                .map(|s| html! {
                    <ui::SubmissionCard
                        key={ s.id.to_string() }
                        submission={ s.clone() }
                        show_status={ ctx.props().view != ListView::Board }
                        actions={ self.view_actions(ctx, s) }
                    />
                })
                .collect(),
        };
        html! {<>
            { self.view_filters(ctx) }
            <div class="submissions-list">{ list }</div>
            <ui::Toast
                message={ self.toast.clone() }
                on_close={ ctx.link().callback(|_| ListMsg::CloseToast) }
            />
        </>}
    }
}
