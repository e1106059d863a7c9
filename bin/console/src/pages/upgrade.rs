//! Appliance upgrade page.

use crate::auth::use_auth;
use crate::browser;
use leptos::ev::MouseEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::warn;
use vpn_console_platform_access::{
    ApiError, UPGRADE_CHECK_INTERVAL, UpgradeApi, UpgradeState, UpgradeStatus, UpgradeTracker,
};

/// Shows the running version and starts an upgrade when a new one is
/// available. While the appliance restarts the status is re-read on a
/// fixed interval until it answers or the attempts run out.
#[component]
pub fn UpgradePage() -> impl IntoView {
    let identity = use_auth().identity();
    let tracker = RwSignal::new(UpgradeTracker::new());
    let refresh = RwSignal::new(0u32);
    let interval = StoredValue::new(None::<IntervalHandle>);

    let status = LocalResource::new(move || {
        refresh.track();
        let token = identity.with_untracked(|identity| identity.token().clone());
        async move {
            let api = browser::api_client().map_err(|e| ApiError::Request {
                details: e.to_string(),
            })?;
            api.upgrade_status(&token).await
        }
    });

    Effect::new(move |_| {
        if let Some(result) = status.get() {
            tracker.update(|t| t.observe(&result));
        }
    });

    let stop_polling = move || {
        if let Some(Some(handle)) = interval.try_update_value(Option::take) {
            handle.clear();
        }
    };

    Effect::new(move |_| {
        if !tracker.with(UpgradeTracker::is_polling) {
            stop_polling();
            return;
        }
        if interval.with_value(Option::is_some) {
            return;
        }
        let check = move || {
            if tracker.try_update(UpgradeTracker::tick).unwrap_or(false) {
                refresh.update(|n| *n += 1);
            }
        };
        match set_interval_with_handle(check, UPGRADE_CHECK_INTERVAL) {
            Ok(handle) => interval.set_value(Some(handle)),
            Err(_) => warn!("could not schedule upgrade status checks"),
        }
    });
    on_cleanup(stop_polling);

    let start = move |_: MouseEvent| {
        let token = identity.with_untracked(|identity| identity.token().clone());
        spawn_local(async move {
            let result = match browser::api_client() {
                Ok(api) => api.start_upgrade(&token).await,
                Err(e) => Err(ApiError::Request {
                    details: e.to_string(),
                }),
            };
            tracker.update(|t| match &result {
                Ok(()) => t.started(),
                Err(err) => t.start_failed(err),
            });
        });
    };

    let status_view = move || {
        if tracker.with(UpgradeTracker::is_polling) {
            return ().into_any();
        }
        match status.get() {
            None => ().into_any(),
            Some(Err(err)) => format!("Could not load upgrade status: {err}").into_any(),
            Some(Ok(status)) => view! { <VersionInfo status=status on_start=start/> }.into_any(),
        }
    };

    view! {
        <div class="upgrade-page">
            <h1>"Upgrade"</h1>
            {status_view}
            {move || {
                tracker
                    .with(UpgradeTracker::progress_message)
                    .map(|message| view! { <p class="progress">{message}</p> })
            }}
            {move || {
                tracker
                    .with(|t| t.error().map(str::to_string))
                    .map(|message| view! { <p class="alert alert-error">{message}</p> })
            }}
            <Show when=move || tracker.with(|t| t.state() == UpgradeState::Completed)>
                <p class="alert alert-success">"Upgrade completed"</p>
            </Show>
        </div>
    }
}

#[component]
fn VersionInfo<F>(status: UpgradeStatus, on_start: F) -> impl IntoView
where
    F: Fn(MouseEvent) + 'static,
{
    let available = status.new_version_available.then(|| {
        view! {
            <p>"New version available: " {status.new_version}</p>
            <button on:click=on_start>"Upgrade now"</button>
        }
    });

    view! {
        <p>"Current version: " {status.current_version}</p>
        {match available {
            Some(view) => view.into_any(),
            None => view! { <p>"You are running the latest version."</p> }.into_any(),
        }}
    }
}
