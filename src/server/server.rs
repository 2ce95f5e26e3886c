use anyhow::{Context, Result};
use std::{
    collections::BTreeSet,
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, error, info, warn};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use super::session::{AdminSession, Session, COOKIE_SESSION_TOKEN_KEY};
use super::visitor::{VisitorReadState, VisitorReadStateRejection};
use super::{log_requests, state::*, ServerConfig};
use crate::account::auth::AuthTokenValue;
use crate::account::{AccountManager, AccountStore};
use crate::content::{ContentStore, PostOrder, PostStatus, PostType};
use crate::hooks::Hooks;
use crate::presentation::{
    append_unread_section, render_post_page, render_widget, section_request, WidgetArea,
};
use crate::read_state::{PostId, PostIds, ReadStateBackend, ReadStateStoreFactory};
use crate::settings::{
    load_listing_settings, load_widget_instance, save_listing_settings, save_widget_instance,
    ListingSettings, SettingsStore, WidgetInstance,
};
use crate::unread::{UnreadPosts, UnreadQueryService, UnreadRequest, UnreadResult};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub authenticated: bool,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct LoginBody {
    pub user_handle: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

#[derive(Deserialize, Debug)]
struct PostIdsBody {
    pub post_ids: PostIds,
}

#[derive(Serialize)]
struct ReadStateResponse {
    #[serde(flatten)]
    backend: ReadStateBackend,
    read_post_ids: Vec<PostId>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct UnreadParams {
    /// Comma separated post types.
    post_type: Option<String>,
    count: Option<usize>,
    orderby: Option<String>,
}

impl UnreadParams {
    fn into_request(self) -> Result<UnreadRequest> {
        let mut request = UnreadRequest::default();
        if let Some(post_type) = self.post_type {
            let post_types: Vec<String> = post_type
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            if !post_types.is_empty() {
                request.post_types = post_types;
            }
        }
        if let Some(count) = self.count {
            if count == 0 {
                anyhow::bail!("count must be a positive number");
            }
            request.count = Some(count);
        }
        if let Some(orderby) = self.orderby {
            request.orderby = orderby.parse::<PostOrder>()?;
        }
        Ok(request)
    }
}

fn internal_error(what: &str, err: impl std::fmt::Display) -> Response {
    error!("{}: {}", what, err);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        authenticated: session.is_some(),
    };
    Json(stats)
}

fn read_state_response(visitor: &VisitorReadState) -> Json<ReadStateResponse> {
    Json(ReadStateResponse {
        backend: visitor.backend,
        read_post_ids: visitor.store.read_ids(),
    })
}

async fn get_read_posts(visitor: VisitorReadState) -> impl IntoResponse {
    read_state_response(&visitor)
}

async fn mark_posts_read(
    mut visitor: VisitorReadState,
    jar: CookieJar,
    Json(body): Json<PostIdsBody>,
) -> Response {
    debug!("mark_posts_read() called with {:?}", body);
    if let Err(err) = visitor.store.mark_read(&body.post_ids) {
        return internal_error("Failed to mark posts as read", err);
    }
    let response = read_state_response(&visitor);
    (visitor.flush_cookies(jar), response).into_response()
}

async fn mark_posts_unread(
    mut visitor: VisitorReadState,
    jar: CookieJar,
    Json(body): Json<PostIdsBody>,
) -> Response {
    debug!("mark_posts_unread() called with {:?}", body);
    if let Err(err) = visitor.store.mark_unread(&body.post_ids) {
        return internal_error("Failed to mark posts as unread", err);
    }
    let response = read_state_response(&visitor);
    (visitor.flush_cookies(jar), response).into_response()
}

async fn delete_read_posts(mut visitor: VisitorReadState, jar: CookieJar) -> Response {
    if let Err(err) = visitor.store.delete_all() {
        return internal_error("Failed to delete read state", err);
    }
    let response = read_state_response(&visitor);
    (visitor.flush_cookies(jar), response).into_response()
}

async fn get_unread_posts(
    visitor: VisitorReadState,
    State(unread_service): State<GuardedUnreadQueryService>,
    Query(params): Query<UnreadParams>,
) -> Response {
    let request = match params.into_request() {
        Ok(request) => request,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };
    match unread_service.get_unread(&visitor.store.read_ids(), &request) {
        Ok(UnreadPosts::Found(result)) => Json(result).into_response(),
        Ok(UnreadPosts::Empty) => Json(UnreadResult {
            found: 0,
            items: vec![],
        })
        .into_response(),
        Err(err) => internal_error("Failed to list unread posts", err),
    }
}

fn widget_html(state: &ServerState, read_ids: &[PostId]) -> Result<Option<String>> {
    let instance = load_widget_instance(state.settings_store.as_ref())?;
    let unread = state
        .unread_service
        .get_unread(read_ids, &UnreadRequest::from(&instance))?;
    Ok(render_widget(
        &WidgetArea::default(),
        &instance,
        &unread,
        &state.hooks,
    ))
}

async fn get_widget(visitor: VisitorReadState, State(state): State<ServerState>) -> Response {
    if !state.hooks.show_widget {
        return StatusCode::NOT_FOUND.into_response();
    }
    match widget_html(&state, &visitor.store.read_ids()) {
        Ok(Some(html)) => Html(html).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => internal_error("Failed to render widget", err),
    }
}

async fn get_post_page(
    State(state): State<ServerState>,
    visitor: Result<VisitorReadState, VisitorReadStateRejection>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let Ok(post_id) = id.parse::<PostId>() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let post = match state.content_store.get_post(post_id) {
        Ok(Some(post)) if post.status == PostStatus::Publish => post,
        Ok(_) => return StatusCode::NOT_FOUND.into_response(),
        Err(err) => return internal_error("Failed to load post", err),
    };

    let mut visitor = match visitor {
        Ok(visitor) => Some(visitor),
        Err(_) => {
            warn!("Read state unavailable, view of post {} not tracked", post.id);
            None
        }
    };
    let read_ids = match visitor.as_mut() {
        Some(visitor) => {
            if let Err(err) = visitor.store.mark_read(&PostIds::from(post.id)) {
                warn!("Could not mark post {} as read: {}", post.id, err);
            }
            visitor.store.read_ids()
        }
        None => vec![],
    };

    let settings = load_listing_settings(state.settings_store.as_ref(), &state.hooks)
        .unwrap_or_else(|err| {
            warn!("Could not load listing settings: {}", err);
            ListingSettings::default()
        });
    let unread = match section_request(&settings, &post.post_type) {
        Some(request) => state
            .unread_service
            .get_unread(&read_ids, &request)
            .unwrap_or_else(|err| {
                warn!("Could not list unread posts: {}", err);
                UnreadPosts::Empty
            }),
        None => UnreadPosts::Empty,
    };
    let content = append_unread_section(&post.content, &post, &settings, &unread, &state.hooks);

    let sidebar = if state.hooks.show_widget {
        widget_html(&state, &read_ids).unwrap_or_else(|err| {
            warn!("Could not render widget: {}", err);
            None
        })
    } else {
        None
    };

    let page = render_post_page(&state.config.site_title, &post, &content, sidebar.as_deref());
    let jar = match visitor.as_mut() {
        Some(visitor) => visitor.flush_cookies(jar),
        None => jar,
    };
    (jar, Html(page)).into_response()
}

async fn login(
    State(account_manager): State<GuardedAccountManager>,
    Json(body): Json<LoginBody>,
) -> Response {
    debug!("login() called for {}", body.user_handle);
    match account_manager.login(&body.user_handle, &body.password) {
        Ok(Some(auth_token)) => {
            let cookie = Cookie::build((COOKIE_SESSION_TOKEN_KEY, auth_token.value.0.clone()))
                .path("/")
                .http_only(true)
                .build();
            let body = LoginSuccessResponse {
                token: auth_token.value.0,
            };
            (StatusCode::CREATED, CookieJar::new().add(cookie), Json(body)).into_response()
        }
        Ok(None) => StatusCode::FORBIDDEN.into_response(),
        Err(err) => internal_error("Error with auth token generation", err),
    }
}

async fn logout(State(account_manager): State<GuardedAccountManager>, session: Session) -> Response {
    match account_manager.logout(&AuthTokenValue(session.token)) {
        Ok(_) => {
            let cookie = Cookie::build((COOKIE_SESSION_TOKEN_KEY, ""))
                .path("/")
                .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1))
                .same_site(SameSite::Lax)
                .build();
            (StatusCode::OK, CookieJar::new().add(cookie)).into_response()
        }
        Err(err) => internal_error("Failed to delete auth token", err),
    }
}

fn usable_post_types(state: &ServerState) -> Result<Vec<PostType>> {
    let post_types = state.content_store.get_post_types(true)?;
    Ok(state.hooks.usable_post_types(post_types))
}

/// Names in `requested` that are not among the usable post types.
fn unknown_post_types<'a>(
    requested: impl IntoIterator<Item = &'a String>,
    usable: &[PostType],
) -> Vec<String> {
    requested
        .into_iter()
        .filter(|name| !usable.iter().any(|t| &t.name == *name))
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

fn check_post_types<'a>(
    state: &ServerState,
    requested: impl IntoIterator<Item = &'a String>,
) -> Result<(), Response> {
    let usable = usable_post_types(state)
        .map_err(|err| internal_error("Failed to load post types", err))?;
    let unknown = unknown_post_types(requested, &usable);
    if !unknown.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Unknown post types: {}", unknown.join(", ")),
        )
            .into_response());
    }
    Ok(())
}

async fn get_listing_settings(_admin: AdminSession, State(state): State<ServerState>) -> Response {
    match load_listing_settings(state.settings_store.as_ref(), &state.hooks) {
        Ok(settings) => Json(settings).into_response(),
        Err(err) => internal_error("Failed to load listing settings", err),
    }
}

async fn put_listing_settings(
    AdminSession(session): AdminSession,
    State(state): State<ServerState>,
    Json(settings): Json<ListingSettings>,
) -> Response {
    if let Err(err) = settings.validate() {
        return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
    }
    if let Err(response) = check_post_types(
        &state,
        settings.show_for.iter().chain(settings.post_types.iter()),
    ) {
        return response;
    }
    match save_listing_settings(state.settings_store.as_ref(), &settings) {
        Ok(()) => {
            info!("Listing settings updated by account {}", session.account_id);
            Json(settings).into_response()
        }
        Err(err) => internal_error("Failed to save listing settings", err),
    }
}

async fn get_widget_instance(_admin: AdminSession, State(state): State<ServerState>) -> Response {
    match load_widget_instance(state.settings_store.as_ref()) {
        Ok(instance) => Json(instance).into_response(),
        Err(err) => internal_error("Failed to load widget", err),
    }
}

async fn put_widget_instance(
    AdminSession(session): AdminSession,
    State(state): State<ServerState>,
    Json(instance): Json<WidgetInstance>,
) -> Response {
    if let Err(err) = instance.validate() {
        return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
    }
    if let Err(response) = check_post_types(&state, instance.post_types.iter()) {
        return response;
    }
    match save_widget_instance(state.settings_store.as_ref(), &instance) {
        Ok(()) => {
            info!("Widget updated by account {}", session.account_id);
            Json(instance).into_response()
        }
        Err(err) => internal_error("Failed to save widget", err),
    }
}

async fn get_usable_post_types(_admin: AdminSession, State(state): State<ServerState>) -> Response {
    match usable_post_types(&state) {
        Ok(post_types) => Json(post_types).into_response(),
        Err(err) => internal_error("Failed to load post types", err),
    }
}

impl ServerState {
    fn new<A: AccountStore + 'static>(
        mut config: ServerConfig,
        account_store: Arc<A>,
        content_store: Arc<dyn ContentStore>,
        settings_store: Arc<dyn SettingsStore>,
        hooks: Hooks,
    ) -> ServerState {
        config.read_state_cookie.name = hooks.cookie_name(config.read_state_cookie.name);
        config.read_posts_meta_key = hooks.meta_key(config.read_posts_meta_key);
        info!(
            "Anonymous read state kept in cookie {}, account read state under {}",
            config.read_state_cookie.name, config.read_posts_meta_key
        );

        let hooks = Arc::new(hooks);
        let read_state_factory = ReadStateStoreFactory::new(
            config.read_state_cookie.clone(),
            config.read_posts_meta_key.clone(),
            account_store.clone(),
        );
        ServerState {
            config,
            start_time: Instant::now(),
            hash: env!("GIT_HASH").to_string(),
            account_manager: Arc::new(AccountManager::new(account_store)),
            unread_service: Arc::new(UnreadQueryService::new(
                content_store.clone(),
                hooks.clone(),
            )),
            content_store,
            settings_store,
            read_state_factory: Arc::new(read_state_factory),
            hooks,
        }
    }
}

pub fn make_app<A: AccountStore + 'static>(
    config: ServerConfig,
    account_store: Arc<A>,
    content_store: Arc<dyn ContentStore>,
    settings_store: Arc<dyn SettingsStore>,
    hooks: Hooks,
) -> Result<Router> {
    let state = ServerState::new(config, account_store, content_store, settings_store, hooks);

    let auth_routes: Router = Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout))
        .with_state(state.clone());

    let mut app: Router = Router::new()
        .route("/", get(home))
        .route("/posts/{id}", get(get_post_page))
        .route(
            "/v1/read",
            get(get_read_posts)
                .post(mark_posts_read)
                .delete(mark_posts_unread),
        )
        .route("/v1/read/all", delete(delete_read_posts))
        .route("/v1/unread", get(get_unread_posts))
        .route("/v1/widget", get(get_widget))
        .with_state(state.clone())
        .nest("/v1/auth", auth_routes);

    if state.hooks.show_settings_page {
        let admin_routes: Router = Router::new()
            .route(
                "/settings",
                get(get_listing_settings).put(put_listing_settings),
            )
            .route("/widget", get(get_widget_instance).put(put_widget_instance))
            .route("/post-types", get(get_usable_post_types))
            .with_state(state.clone());
        app = app.nest("/v1/admin", admin_routes);
    } else {
        debug!("Settings page disabled, admin routes not registered");
    }

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server<A: AccountStore + 'static>(
    config: ServerConfig,
    account_store: Arc<A>,
    content_store: Arc<dyn ContentStore>,
    settings_store: Arc<dyn SettingsStore>,
    hooks: Hooks,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, account_store, content_store, settings_store, hooks)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}
