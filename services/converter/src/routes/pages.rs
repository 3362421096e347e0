//! HTML pages: the conversion forms and their results

use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse},
};
use tera::{Context, Tera};
use tracing::{info, warn};

use crate::{
    AppState,
    currency::ConversionRequest,
    error::AppResult,
    middleware::{AdminUser, AuthUser},
};

const INDEX_TEMPLATE: &str = "index.html";
const USER_TEMPLATE: &str = "converter.html";
const ADMIN_TEMPLATE: &str = "converter_for_admin.html";

/// Compile every template matching `glob`
pub fn load_templates(glob: &str) -> Result<Tera, tera::Error> {
    let tera = Tera::new(glob)?;
    info!(
        "Loaded {} templates from {}",
        tera.get_template_names().count(),
        glob
    );
    Ok(tera)
}

fn render(state: &AppState, template: &str, context: &Context) -> AppResult<Html<String>> {
    Ok(Html(state.templates.render(template, context)?))
}

fn context_for(user: Option<&AuthUser>) -> Context {
    let mut context = Context::new();
    if let Some(current) = user {
        context.insert("user", &current.user);
        context.insert("role", &current.role.name);
    }
    context
}

/// Run a conversion and render the outcome into `template`
///
/// Upstream failures end up in the page under `error`, never as an HTTP
/// error status.
async fn convert_and_render(
    state: &AppState,
    template: &str,
    user: Option<&AuthUser>,
    request: &ConversionRequest,
) -> AppResult<Html<String>> {
    let mut context = context_for(user);

    match state.currency_client.convert(request).await {
        Ok(result) => context.insert("result", &result),
        Err(e) => {
            warn!("Conversion {} -> {} failed: {}", request.from, request.to, e);
            context.insert("error", &e.to_string());
        }
    }

    render(state, template, &context)
}

/// Anonymous conversion form
pub async fn index(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    render(&state, INDEX_TEMPLATE, &Context::new())
}

/// Anonymous conversion
pub async fn convert(
    State(state): State<AppState>,
    Form(request): Form<ConversionRequest>,
) -> AppResult<impl IntoResponse> {
    convert_and_render(&state, INDEX_TEMPLATE, None, &request).await
}

pub async fn protected_user(
    State(state): State<AppState>,
    current: AuthUser,
) -> AppResult<impl IntoResponse> {
    render(&state, USER_TEMPLATE, &context_for(Some(&current)))
}

pub async fn protected_admin(
    State(state): State<AppState>,
    AdminUser(current): AdminUser,
) -> AppResult<impl IntoResponse> {
    render(&state, ADMIN_TEMPLATE, &context_for(Some(&current)))
}

pub async fn convert_for_user(
    State(state): State<AppState>,
    current: AuthUser,
    Form(request): Form<ConversionRequest>,
) -> AppResult<impl IntoResponse> {
    convert_and_render(&state, USER_TEMPLATE, Some(&current), &request).await
}

pub async fn convert_for_admin(
    State(state): State<AppState>,
    AdminUser(current): AdminUser,
    Form(request): Form<ConversionRequest>,
) -> AppResult<impl IntoResponse> {
    convert_and_render(&state, ADMIN_TEMPLATE, Some(&current), &request).await
}
