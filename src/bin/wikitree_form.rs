// getPerson form page served over HTTP.

use axum::{
    Form, Router,
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use wikitree_api::cli;
use wikitree_api::form::{self, FormInput};
use wikitree_api::logging::init_tracing;
use wikitree_api::{Config, Session, WikiTreeClient};

#[derive(Clone)]
struct AppState {
    client: WikiTreeClient,
    session: Option<Session>,
}

/// GET / - Empty form with default values
async fn show_form() -> impl IntoResponse {
    Html(form::render_page(None, None))
}

/// POST / - Run the lookup and re-render with results
async fn submit_form(State(state): State<AppState>, Form(input): Form<FormInput>) -> impl IntoResponse {
    info!(key = %input.key, "form submitted");
    let result = form::lookup(&state.client, &input, state.session.as_ref()).await;
    Html(form::render_page(Some(&input), Some(&result)))
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "configuration");
            return;
        }
    };
    let client = match WikiTreeClient::from_config(&config) {
        Ok(client) => client,
        Err(err) => {
            error!(%err, "building HTTP client");
            return;
        }
    };
    let session = match config.session_store() {
        Ok(store) => cli::load_quietly(&store),
        Err(err) => {
            warn!(%err, "no session store; continuing anonymously");
            None
        }
    };

    let app = Router::new()
        .route("/", get(show_form).post(submit_form))
        .with_state(AppState { client, session });

    let listener = match TcpListener::bind(&config.form_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%err, addr = %config.form_addr, "bind");
            return;
        }
    };
    info!(addr = %config.form_addr, endpoint = %config.endpoint, "form page listening");
    if let Err(err) = axum::serve(listener, app).await {
        error!(%err, "server stopped");
    }
}
