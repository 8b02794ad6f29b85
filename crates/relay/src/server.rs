use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use protocol::{
    ChatReply, ChatRequest, FlashcardTopic, FlashcardsQuery, FlashcardsResponse, Language,
    StatusMessage,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::canned::{EMPTY_MESSAGE, MALFORMED_REQUEST};
use crate::flashcards::flashcards;
use crate::generation::TextGenerator;
use crate::router::ModeRouter;

const LIVENESS_MESSAGE: &str = "PMAI AI server running...";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) router: Arc<ModeRouter>,
    pub(crate) generator: Arc<dyn TextGenerator>,
}

pub(crate) fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/chat", post(chat))
        .route("/ask", post(chat))
        .route("/api/flashcards", get(flashcards_get).post(flashcards_post))
        .with_state(state)
        .layer(middleware::from_fn(log_http_request))
}

async fn index() -> Json<StatusMessage> {
    Json(StatusMessage {
        message: LIVENESS_MESSAGE.to_string(),
    })
}

async fn health() -> &'static str {
    "ok"
}

async fn log_http_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    let status = response.status();
    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        "http request"
    );
    response
}

/// Always answers 200 with a reply string, whatever the body looked like.
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Json<ChatReply> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(
                event = "chat.bad_request",
                error = %rejection.body_text(),
                "chat body rejected"
            );
            return Json(ChatReply::new(MALFORMED_REQUEST));
        }
    };
    if request.message.trim().is_empty() {
        return Json(ChatReply::new(EMPTY_MESSAGE));
    }

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "chat",
        %request_id,
        mode = %request.mode,
        lang = %request.lang
    );
    let reply = state
        .router
        .route(&request.message, &request.mode, &request.lang)
        .instrument(span)
        .await;
    Json(ChatReply::new(reply))
}

async fn flashcards_get(
    State(state): State<AppState>,
    Query(query): Query<FlashcardsQuery>,
) -> Json<FlashcardsResponse> {
    serve_flashcards(&state, query).await
}

async fn flashcards_post(
    State(state): State<AppState>,
    Query(query): Query<FlashcardsQuery>,
    body: Option<Json<FlashcardsQuery>>,
) -> Json<FlashcardsResponse> {
    // query string wins over the body
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let merged = FlashcardsQuery {
        mode: query.mode.or(body.mode),
        lang: query.lang.or(body.lang),
    };
    serve_flashcards(&state, merged).await
}

async fn serve_flashcards(state: &AppState, query: FlashcardsQuery) -> Json<FlashcardsResponse> {
    let topic = FlashcardTopic::from_label(query.mode.as_deref());
    let language = query
        .lang
        .as_deref()
        .and_then(Language::from_label)
        .unwrap_or_default();
    let cards = flashcards(state.generator.as_ref(), topic, language).await;
    Json(FlashcardsResponse { flashcards: cards })
}
