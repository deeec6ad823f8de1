use aiet_client::SessionEvent;
use yew::prelude::*;

mod auth_widget;
pub use auth_widget::{AuthWidget, AuthWidgetProps};

mod comment_item;
pub use comment_item::CommentItem;

mod comment_section;
pub use comment_section::{CommentSection, CommentSectionProps};

mod submission_card;
pub use submission_card::SubmissionCard;

mod submission_form;
pub use submission_form::{SubmissionForm, SubmissionFormProps};

mod submission_list;
pub use submission_list::{ListView, SubmissionList, SubmissionListProps};

mod toast;
pub use toast::Toast;

use crate::AietClient;

/// Forward session events to a component, as messages
///
/// Components live as long as the page, so the listener is never removed.
pub fn watch_session<C: Component>(
    ctx: &Context<C>,
    client: &AietClient,
    msg: impl Fn(&SessionEvent) -> Option<C::Message> + 'static,
) {
    let link = ctx.link().clone();
    client.session.subscribe(move |e| {
        if let Some(m) = msg(e) {
            link.send_message(m);
        }
    });
}

pub fn confirm(question: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(question).ok())
        .unwrap_or(false)
}

/// User-written text, with its line breaks kept
pub fn text_with_breaks(text: &str) -> Html {
    aiet_client::display::lines(text)
        .enumerate()
        .map(|(i, l)| {
            html! {<>
                { for (i > 0).then(|| html! { <br /> }) }
                { l }
            </>}
        })
        .collect()
}
