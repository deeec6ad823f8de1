use aiet_client::{api::SessionUser, display::initials, AuthError, SessionEvent};
use yew::prelude::*;

use crate::{ui, ClientRef};

#[derive(Clone, PartialEq, Properties)]
pub struct AuthWidgetProps {
    pub client: ClientRef,
}

pub enum AuthMsg {
    SessionChanged,
    OpenLogin,
    CloseLogin,
    ToggleMenu,
    EmailChanged(String),
    PasswordChanged(String),
    Submit,
    Logout,
    CloseToast,
}

/// Sign-in button or member menu, plus the login modal
pub struct AuthWidget {
    user: Option<SessionUser>,
    is_admin: bool,
    modal_open: bool,
    menu_open: bool,
    email: String,
    password: String,
    error: Option<AuthError>,
    toast: Option<String>,
}

impl AuthWidget {
    fn refresh(&mut self, ctx: &Context<Self>) {
        let session = &ctx.props().client.session;
        self.user = session.current_user();
        self.is_admin = session.is_admin();
        if self.user.is_none() {
            self.menu_open = false;
        }
    }

    fn close_login(&mut self) {
        self.modal_open = false;
        self.email.clear();
        self.password.clear();
        self.error = None;
    }

    fn view_user(&self, ctx: &Context<Self>, u: &SessionUser) -> Html {
        html! {
            <div class="auth-user-info">
                <span class="auth-user-name">{ &u.name }</span>
                <div class="auth-dropdown">
                    <button
                        type="button"
                        class="auth-dropdown-btn"
                        onclick={ ctx.link().callback(|_| AuthMsg::ToggleMenu) }
                    >
                        <span class="auth-avatar">{ initials(&u.name) }</span>
                    </button>
                    <div class={ classes!("auth-dropdown-menu", self.menu_open.then(|| "active")) }>
                        <div class="auth-dropdown-header">
                            <strong>{ &u.name }</strong>
                            <span>{ u.role.as_str() }</span>
                        </div>
                        <a href="board.html">{ "Member Board" }</a>
                        <a href="submit.html">{ "Submit Content" }</a>
                        if self.is_admin {
                            <a href="admin.html" class="admin-link">{ "Admin Dashboard" }</a>
                        }
                        <a href="speakers.html">{ "Network" }</a>
                        <a href="blog.html">{ "Blog" }</a>
                        <button type="button" onclick={ ctx.link().callback(|_| AuthMsg::Logout) }>
                            { "Sign Out" }
                        </button>
                    </div>
                </div>
            </div>
        }
    }

    fn view_modal(&self, ctx: &Context<Self>) -> Html {
        macro_rules! callback_for {
            ($msg:ident) => {
                ctx.link().callback(|e: InputEvent| {
                    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                    AuthMsg::$msg(input.value())
                })
            };
        }
        html! {
            <div class={ classes!("auth-modal", self.modal_open.then(|| "active")) }>
                <div class="auth-modal-content">
                    <button
                        type="button"
                        class="auth-modal-close"
                        aria-label="Close"
                        onclick={ ctx.link().callback(|_| AuthMsg::CloseLogin) }
                    >
                        { "×" }
                    </button>
                    <div class="auth-modal-header">
                        <h2>{ "Member Login" }</h2>
                        <p>{ "Sign in with your registered email" }</p>
                    </div>
                    <form onsubmit={ ctx.link().callback(|e: SubmitEvent| {
                        e.prevent_default();
                        AuthMsg::Submit
                    }) }>
                        <div class="auth-form-group">
                            <label for="login-email">{ "Email" }</label>
                            <input
                                type="email"
                                id="login-email"
                                placeholder="your@email.com"
                                required=true
                                value={ self.email.clone() }
                                oninput={ callback_for!(EmailChanged) }
                            />
                        </div>
                        <div class="auth-form-group">
                            <label for="login-password">{ "Password" }</label>
                            <input
                                type="password"
                                id="login-password"
                                placeholder="Password"
                                required=true
                                value={ self.password.clone() }
                                oninput={ callback_for!(PasswordChanged) }
                            />
                        </div>
                        if let Some(err) = &self.error {
                            <div class="auth-error">{ err.to_string() }</div>
                        }
                        <button type="submit" class="auth-submit-btn">{ "Sign In" }</button>
                    </form>
                    <div class="auth-modal-footer">
                        <p>
                            { "Contact " }
                            <a href="mailto:ahn@anarchy.io">{ "ahn@anarchy.io" }</a>
                            { " for access" }
                        </p>
                    </div>
                </div>
            </div>
        }
    }
}

impl Component for AuthWidget {
    type Message = AuthMsg;
    type Properties = AuthWidgetProps;

    fn create(ctx: &Context<Self>) -> Self {
        ui::watch_session(ctx, &ctx.props().client, |e| {
            Some(match e {
                SessionEvent::LoginRequested => AuthMsg::OpenLogin,
                _ => AuthMsg::SessionChanged,
            })
        });
        let mut this = AuthWidget {
            user: None,
            is_admin: false,
            modal_open: false,
            menu_open: false,
            email: String::new(),
            password: String::new(),
            error: None,
            toast: None,
        };
        this.refresh(ctx);
        this
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AuthMsg::SessionChanged => self.refresh(ctx),
            AuthMsg::OpenLogin => self.modal_open = true,
            AuthMsg::CloseLogin => self.close_login(),
            AuthMsg::ToggleMenu => self.menu_open = !self.menu_open,
            AuthMsg::EmailChanged(e) => self.email = e,
            AuthMsg::PasswordChanged(p) => self.password = p,
            AuthMsg::Submit => {
                match ctx.props().client.session.login(&self.email, &self.password) {
                    Ok(user) => {
                        self.close_login();
                        self.toast = Some(format!("Welcome, {}!", user.name));
                    }
                    Err(err) => {
                        self.password.clear();
                        self.error = Some(err);
                    }
                }
            }
            AuthMsg::Logout => {
                ctx.props().client.session.logout();
                self.toast = Some(String::from("You have been logged out."));
            }
            AuthMsg::CloseToast => self.toast = None,
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let main = match &self.user {
            Some(u) => self.view_user(ctx, u),
            None => html! {
                <button
                    type="button"
                    class="auth-login-btn"
                    onclick={ ctx.link().callback(|_| AuthMsg::OpenLogin) }
                >
                    <span>{ "Sign In" }</span>
                </button>
            },
        };
        html! {<>
            { main }
            { self.view_modal(ctx) }
            <ui::Toast
                message={ self.toast.clone() }
                on_close={ ctx.link().callback(|_| AuthMsg::CloseToast) }
            />
        </>}
    }
}
