use leptos::*;
use leptos_router::{use_location, use_navigate, NavigateOptions};

use crate::{
    api::SteamClient,
    auth::{complete_login, CallbackParams, OpenIdConfig, LOGIN_SUCCESS_PATH},
    config,
    state::{session::sign_in, use_session, use_session_store},
};

/// Landing route for the provider redirect (`/auth/steam/callback`).
#[component]
pub fn CallbackPage() -> impl IntoView {
    let (_, set_session) = use_session();
    let store = use_session_store();
    let client = use_context::<SteamClient>().unwrap_or_default();
    let params = CallbackParams::from_query(&use_location().search.get_untracked());
    let navigate = use_navigate();

    spawn_local(async move {
        let openid = OpenIdConfig::new(config::await_app_origin().await);
        let target = match complete_login(&openid, &params, &client, store.store()).await {
            Ok(session) => {
                sign_in(set_session, session);
                LOGIN_SUCCESS_PATH.to_string()
            }
            Err(failure) => failure.redirect_path(),
        };
        navigate(&target, NavigateOptions::default());
    });

    view! { <p class="text-center py-12">"Completing Steam sign-in..."</p> }
}
