use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct ToastProps {
    pub message: Option<String>,
    pub on_close: Callback<()>,
}

#[function_component(Toast)]
pub fn toast(p: &ToastProps) -> Html {
    html! {
        <div
            class={ classes!("toast", p.message.is_some().then(|| "show")) }
            role="status"
            aria-hidden={ if p.message.is_some() { "false" } else { "true" } }
            onclick={ p.on_close.reform(|_| ()) }
        >
            { p.message.clone().unwrap_or_default() }
        </div>
    }
}
