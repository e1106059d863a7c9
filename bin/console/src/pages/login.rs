//! Login page component.

use crate::auth::use_auth;
use crate::browser;
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_location;
use vpn_console_platform_access::{
    AuthApi, AuthMethods, FederationError, FederationKind, LoginError, LoginForm,
    provider_error_message, resolve_redirect, submit_login,
};

/// Login page: federation provider buttons and the password form.
#[component]
pub fn LoginPage() -> impl IntoView {
    let location = use_location();
    let banner = provider_error_message(&location.search.get_untracked());

    let methods = LocalResource::new(|| async move {
        let api = browser::api_client().map_err(|e| e.to_string())?;
        api.auth_methods().await.map_err(|e| e.to_string())
    });

    view! {
        <div class="login-page">
            <div class="login-box">
                <h1>"VPN Server"</h1>
                {banner.map(|message| view! { <div class="alert alert-error">{message}</div> })}
                {move || match methods.get() {
                    None => ().into_any(),
                    Some(Err(err)) => {
                        format!("A backend error has occurred: {err}").into_any()
                    }
                    Some(Ok(methods)) => view! { <LoginOptions methods=methods/> }.into_any(),
                }}
            </div>
        </div>
    }
}

/// Provider buttons and, unless disabled, the password form.
#[component]
fn LoginOptions(methods: AuthMethods) -> impl IntoView {
    let redirect_error = RwSignal::new(None::<String>);

    let redirect_to = move |id: String| {
        redirect_error.set(None);
        spawn_local(async move {
            let result = match browser::api_client() {
                Ok(api) => resolve_redirect(&api, FederationKind::Oidc.as_str(), &id).await,
                Err(e) => Err(FederationError::Redirect {
                    details: e.to_string(),
                }),
            };
            let result = result.and_then(|uri| {
                browser::navigate_external(&uri).map_err(|e| FederationError::Redirect {
                    details: e.to_string(),
                })
            });
            if let Err(err) = result {
                redirect_error.set(Some(format!("Could not redirect at this time: {err}")));
            }
        });
    };

    let show_divider = methods.has_providers() && methods.offers_local_login();
    let show_form = methods.offers_local_login();
    let buttons = methods
        .oidc_providers
        .into_iter()
        .map(|provider| {
            let id = provider.id;
            view! {
                <button class="provider-button" on:click=move |_| redirect_to(id.clone())>
                    "Login with " {provider.name}
                </button>
            }
        })
        .collect_view();

    view! {
        <div class="providers">
            {move || redirect_error.get().map(|message| view! { <p class="alert">{message}</p> })}
            {buttons}
        </div>
        <Show when=move || show_divider>
            <div class="divider">"Or continue with login"</div>
        </Show>
        <Show when=move || show_form>
            <PasswordForm/>
        </Show>
    }
}

/// Login and password, followed by an MFA code when the backend asks for one.
#[component]
fn PasswordForm() -> impl IntoView {
    let auth = use_auth();
    let form = RwSignal::new(LoginForm::new());
    let error = RwSignal::new(None::<String>);

    let submit = move || {
        error.set(None);
        let request = form.with_untracked(LoginForm::request);
        spawn_local(async move {
            let result = match browser::api_client() {
                Ok(api) => submit_login(&api, &request).await,
                Err(e) => Err(LoginError::Other {
                    details: e.to_string(),
                }),
            };
            match result {
                Ok(outcome) => {
                    if let Some(token) = form.try_update(|f| f.apply(outcome)).flatten() {
                        auth.adopt_token(token);
                    }
                }
                Err(err) => error.set(Some(err.to_string())),
            }
        });
    };

    let fields = move || {
        if form.with(LoginForm::needs_factor) {
            let factors = form.with(|f| f.factors().to_vec());
            view! {
                <label>
                    "Code"
                    <input
                        type="number"
                        on:input=move |ev| form.update(|f| f.set_code(event_target_value(&ev)))
                    />
                </label>
                <select on:change=move |ev| form.update(|f| f.select_factor(event_target_value(&ev)))>
                    {factors
                        .into_iter()
                        .map(|factor| { let value = factor.clone(); view! { <option value=value>{factor}</option> } })
                        .collect_view()}
                </select>
            }
            .into_any()
        } else {
            view! {
                <label>
                    "Login"
                    <input
                        type="text"
                        placeholder="Your username"
                        required
                        on:input=move |ev| form.update(|f| f.set_login(event_target_value(&ev)))
                    />
                </label>
                <label>
                    "Password"
                    <input
                        type="password"
                        placeholder="Your password"
                        required
                        on:input=move |ev| form.update(|f| f.set_password(event_target_value(&ev)))
                    />
                </label>
            }
            .into_any()
        }
    };

    view! {
        <form
            class="login-form"
            on:submit=move |ev: SubmitEvent| {
                ev.prevent_default();
                submit();
            }
        >
            {move || {
                error.get().map(|message| view! {
                    <div class="alert alert-error" role="alert">{message}</div>
                })
            }}
            {fields}
            <button type="submit">"Sign in"</button>
        </form>
    }
}
