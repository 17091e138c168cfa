use leptos::*;
use leptos_router::use_query_map;

use crate::{
    achievements::AchievementSummary,
    api::{sort_by_playtime, SteamClient},
    auth::{LoginFailure, OpenIdConfig},
    config,
    state::{
        session::{logout, Session},
        use_session, use_session_store, LibraryQueries,
    },
    utils::{game_image_url, ImageSize},
};

const LIBRARY_PREVIEW_LEN: usize = 12;

fn use_library_queries() -> LibraryQueries {
    use_context::<LibraryQueries>().unwrap_or_else(|| LibraryQueries::new(SteamClient::new()))
}

fn start_login() {
    spawn_local(async move {
        let origin = config::await_app_origin().await;
        if let Err(err) = OpenIdConfig::new(origin).begin_login() {
            log::error!("could not start Steam login: {}", err);
        }
    });
}

#[component]
pub fn HomePage() -> impl IntoView {
    let (session, _) = use_session();
    let query = use_query_map();
    let login_error = move || {
        query.with(|q| {
            q.get("error")
                .and_then(|code| LoginFailure::from_code(code))
                .map(LoginFailure::message)
        })
    };

    view! {
        <main class="min-h-screen bg-surface">
            <header class="max-w-7xl mx-auto py-8 px-4">
                <h1 class="text-4xl font-extrabold text-fg">"GameVault"</h1>
            </header>
            <Show when=move || login_error().is_some()>
                <p class="text-red-600">{move || login_error().unwrap_or_default()}</p>
            </Show>
            {move || match session.get().session {
                Some(current) => view! { <Dashboard session=current/> }.into_view(),
                None => view! {
                    <button class="px-8 py-3 rounded-md" on:click=move |_| start_login()>
                        "Sign in through Steam"
                    </button>
                }
                .into_view(),
            }}
        </main>
    }
}

#[component]
fn Dashboard(session: Session) -> impl IntoView {
    let (_, set_session) = use_session();
    let store = use_session_store();
    let queries = use_library_queries();
    let persona = session.profile.personaname.clone();
    let avatar = session.profile.avatarmedium.clone();
    let session = store_value(session);

    let library_queries = queries.clone();
    let library = create_local_resource(
        move || session.get_value(),
        move |current| {
            let queries = library_queries.clone();
            async move {
                let mut titles = queries.owned_games(Some(&current)).await?;
                sort_by_playtime(&mut titles);
                Ok::<_, crate::api::ApiError>(titles)
            }
        },
    );
    let summary = create_local_resource(
        move || session.get_value(),
        move |current| {
            let queries = queries.clone();
            async move {
                queries
                    .all_achievements(Some(&current))
                    .await
                    .map(|merged| AchievementSummary::from_achievements(&merged))
            }
        },
    );

    view! {
        <section class="max-w-7xl mx-auto px-4">
            <div class="flex items-center gap-4">
                <img src=avatar alt="avatar" class="w-12 h-12 rounded-full"/>
                <span class="text-xl font-semibold">{persona}</span>
                <button on:click=move |_| logout(store.store(), set_session)>"Sign out"</button>
            </div>
            {move || summary.get().map(|result| match result {
                Ok(summary) => view! {
                    <p>
                        {format!(
                            "{} / {} achievements unlocked ({}%), {} rare",
                            summary.unlocked, summary.total, summary.completion_percent, summary.rare
                        )}
                    </p>
                }
                .into_view(),
                Err(err) => view! { <p class="text-red-600">{err.user_message()}</p> }.into_view(),
            })}
            {move || library.get().map(|result| match result {
                Ok(titles) => titles
                    .into_iter()
                    .take(LIBRARY_PREVIEW_LEN)
                    .map(|title| {
                        let image = game_image_url(title.appid, None, ImageSize::Header);
                        let hours = format!("{} h", title.playtime_hours());
                        view! {
                            <article class="rounded-md shadow">
                                <img src=image alt=title.name.clone()/>
                                <h2>{title.name}</h2>
                                <span>{hours}</span>
                            </article>
                        }
                    })
                    .collect_view(),
                Err(err) => view! { <p class="text-red-600">{err.user_message()}</p> }.into_view(),
            })}
        </section>
    }
}
