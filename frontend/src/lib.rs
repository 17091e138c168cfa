use leptos::*;
use leptos_router::*;

pub mod achievements;
pub mod api;
pub mod auth;
pub mod config;
pub mod pages;
pub mod state;
pub mod utils;

use pages::{callback::CallbackPage, home::HomePage};
use state::SessionProvider;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <SessionProvider>
            <Router>
                <Routes>
                    <Route path="/" view=HomePage/>
                    <Route path=auth::openid::CALLBACK_PATH view=CallbackPage/>
                </Routes>
            </Router>
        </SessionProvider>
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::error_1(&format!("logger init failed: {}", err).into());
    }
    log::info!("Starting GameVault frontend (wasm)");

    // window.__GAMEVAULT_ENV (env.js) takes precedence over ./config.json.
    spawn_local(async move {
        config::init().await;
    });

    mount_to_body(|| view! { <App/> });
}
