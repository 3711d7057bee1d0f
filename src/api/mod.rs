use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use validator::Validate;

use crate::chat::ChatEngine;
use crate::config::Settings;
use crate::evaluation::{EvaluationResult, Evaluator, QuestionGenerator};
use crate::index::{split_text, VectorIndex};
use crate::ingestion::extract_text_from_pdfs;
use crate::language::Language;
use crate::providers::{CohereProvider, CompletionProvider, OllamaProvider};
use crate::translate;

#[derive(Clone)]
pub struct AppState {
    settings: Settings,
    provider: Box<dyn CompletionProvider + Send + Sync>,
    generator: Option<Box<dyn CompletionProvider + Send + Sync>>,
    session: Arc<RwLock<Option<ChatEngine>>>,
    uploaded_text: Arc<RwLock<Option<String>>>,
}

#[derive(Deserialize, Validate)]
pub struct ProcessRequest {
    #[validate(length(min = 1))]
    paths: Vec<String>,
}

#[derive(Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 2000))]
    message: String,
    #[serde(default)]
    language: Option<Language>,
}

#[derive(Deserialize)]
pub struct EvaluateRequest {
    num_questions: Option<usize>,
}

#[derive(Serialize)]
pub struct ProcessResponse {
    chunks: usize,
    files_processed: usize,
    files_skipped: usize,
}

#[derive(Serialize)]
pub struct ChatResponse {
    answer: String,
    language: Language,
}

#[derive(Serialize)]
pub struct EvaluateResponse {
    results: Vec<EvaluationResult>,
}

#[derive(Serialize)]
struct ApiResponse {
    status: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiResponse>)>;

fn bad_request(message: impl ToString) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse {
            status: message.to_string(),
        }),
    )
}

fn internal_error(message: impl ToString) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse {
            status: message.to_string(),
        }),
    )
}

/// Create and configure the API router
pub fn create_api(settings: Settings) -> Result<Router, String> {
    let provider = OllamaProvider::new(
        &settings.ollama_url,
        &settings.chat_model,
        &settings.embed_model,
        settings.request_timeout,
    )
    .map_err(|e| format!("Failed to initialize model server client: {}", e))?;

    let generator = match &settings.cohere_api_key {
        Some(key) => Some(Box::new(
            CohereProvider::new(
                key,
                &settings.cohere_url,
                &settings.cohere_model,
                settings.request_timeout,
            )
            .map_err(|e| format!("Failed to initialize question generator: {}", e))?,
        ) as Box<dyn CompletionProvider + Send + Sync>),
        None => None,
    };

    let state = AppState {
        settings,
        provider: Box::new(provider),
        generator,
        session: Arc::new(RwLock::new(None)),
        uploaded_text: Arc::new(RwLock::new(None)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The pipeline is a single interactive session, so requests are
    // processed one at a time
    Ok(Router::new()
        .route("/health", get(health_check))
        .route("/process", post(process_handler))
        .route("/chat", post(chat_handler))
        .route("/evaluate", post(evaluate_handler))
        .layer(cors)
        .layer(ConcurrencyLimitLayer::new(1))
        .with_state(state))
}

async fn health_check(State(state): State<AppState>) -> Json<ApiResponse> {
    let status = match state.provider.get_model_info().await {
        Ok(info) => format!("ok ({})", info),
        Err(e) => format!("degraded: {}", e),
    };
    Json(ApiResponse { status })
}

async fn process_handler(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> ApiResult<ProcessResponse> {
    request.validate().map_err(bad_request)?;

    let report = extract_text_from_pdfs(&request.paths).map_err(bad_request)?;
    let chunks = split_text(
        &report.text,
        state.settings.chunk_size,
        state.settings.chunk_overlap,
    );

    let embeddings = futures::future::try_join_all(
        chunks.iter().map(|chunk| state.provider.generate_embedding(chunk)),
    )
    .await
    .map_err(internal_error)?;

    let index = VectorIndex::build(chunks, embeddings).map_err(internal_error)?;
    let chunk_count = index.len();
    let engine = ChatEngine::new(
        index,
        state.provider.clone(),
        state.settings.top_k,
        state.settings.history_window,
    );

    *state.session.write().await = Some(engine);
    *state.uploaded_text.write().await = Some(report.text);

    Ok(Json(ProcessResponse {
        chunks: chunk_count,
        files_processed: report.processed.len(),
        files_skipped: report.skipped.len(),
    }))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    request.validate().map_err(bad_request)?;

    let mut session = state.session.write().await;
    let engine = session
        .as_mut()
        .ok_or_else(|| bad_request("No documents processed yet"))?;

    let answer = engine
        .ask(&request.message)
        .await
        .map_err(internal_error)?;

    let language = request.language.unwrap_or_default();
    let answer = if language == Language::English {
        answer
    } else {
        translate::translate_text(&answer, language, state.settings.request_timeout)
            .await
            .map_err(internal_error)?
    };

    Ok(Json(ChatResponse { answer, language }))
}

async fn evaluate_handler(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> ApiResult<EvaluateResponse> {
    let generator = state
        .generator
        .as_ref()
        .ok_or_else(|| bad_request("Evaluation needs a hosted model, set COHERE_API_KEY"))?;

    let text = state
        .uploaded_text
        .read()
        .await
        .clone()
        .ok_or_else(|| bad_request("No documents processed yet"))?;

    let mut fork = state
        .session
        .read()
        .await
        .as_ref()
        .ok_or_else(|| bad_request("No documents processed yet"))?
        .fork();

    let count = request.num_questions.unwrap_or(state.settings.eval_questions);
    let question_generator = QuestionGenerator::new(
        generator.clone(),
        state.settings.eval_text_budget,
        state.settings.eval_max_attempts,
    );
    let questions = question_generator
        .generate(&text, count)
        .await
        .map_err(internal_error)?;

    let evaluator = Evaluator::new(state.provider.as_ref(), Some(generator.as_ref()));
    let results = evaluator
        .evaluate(&questions, &mut fork)
        .await
        .map_err(internal_error)?;

    Ok(Json(EvaluateResponse { results }))
}
