use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::constants::OCULAR_STATUS_HEADER;
use crate::embedding::{LabelScorer, decode_image};
use crate::gateway::error::{ErrorResponse, GatewayError};
use crate::gateway::state::HandlerState;
use crate::labels::LabelSet;
use crate::scoring::Verdict;
use crate::taskstore::TaskStore;

/// Wire shape of a `/classify` evaluation.
///
/// Lowercase `verified` is the documented contract. The game backend
/// deserializes field names case-insensitively, so older `Verified` consumers
/// keep working.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub verified: bool,
}

struct ClassifyRequest {
    keyword: Option<String>,
    image: Option<axum::body::Bytes>,
    user_id: Option<i64>,
}

/// Verifies an uploaded image against a keyword.
///
/// Multipart fields: `keyword` (text), `file` (image bytes), optional
/// `user_id` to credit points on a verified result. Returns 200 with the
/// verdict for any completed evaluation; verification failure is not an HTTP
/// error.
#[instrument(skip(state, multipart), fields(keyword = tracing::field::Empty))]
pub async fn classify_handler<S, T>(
    State(state): State<HandlerState<S, T>>,
    multipart: Multipart,
) -> Result<Response, GatewayError>
where
    S: LabelScorer,
    T: TaskStore,
{
    let request = read_classify_fields(multipart).await?;

    let keyword = request
        .keyword
        .or_else(|| state.default_keyword.clone())
        .ok_or_else(|| {
            GatewayError::InvalidRequest(
                "missing 'keyword' field and no default keyword is configured".to_string(),
            )
        })?;

    let label_set = LabelSet::for_keyword(&keyword, &state.distractors)
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
    tracing::Span::current().record("keyword", tracing::field::display(label_set.target()));

    let image_bytes = request
        .image
        .ok_or_else(|| GatewayError::InvalidRequest("missing 'file' field".to_string()))?;

    // Decode before any inference work so malformed uploads never touch the
    // model.
    let image = decode_image(&image_bytes)?;

    let scorer = state.scorer.clone();
    let labels = label_set.labels().to_vec();
    let distribution = tokio::time::timeout(
        state.inference_timeout,
        tokio::task::spawn_blocking(move || scorer.score(&image, &labels)),
    )
    .await
    .map_err(|_| GatewayError::InferenceTimeout(state.inference_timeout))?
    .map_err(|e| GatewayError::InternalError(format!("inference task failed: {e}")))??;

    for (label, probability) in label_set.labels().iter().zip(&distribution) {
        debug!(label = %label, probability = *probability, "Label score");
    }

    let verdict = state.policy.decide(&distribution, LabelSet::TARGET_INDEX);

    info!(
        keyword = %label_set.target(),
        score = verdict.score(),
        threshold = state.policy.threshold(),
        verdict = %verdict,
        "Verification decided"
    );

    if verdict.is_verified()
        && let Some(user_id) = request.user_id
    {
        award_points(&state, user_id).await?;
    }

    make_response(&verdict)
}

async fn read_classify_fields(mut multipart: Multipart) -> Result<ClassifyRequest, GatewayError> {
    let mut request = ClassifyRequest {
        keyword: None,
        image: None,
        user_id: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(ToOwned::to_owned);
        match name.as_deref() {
            Some("keyword") => {
                let text = field.text().await.map_err(|e| {
                    GatewayError::InvalidRequest(format!("unreadable 'keyword' field: {e}"))
                })?;
                request.keyword = Some(text);
            }
            Some("file") => {
                let bytes = field.bytes().await.map_err(|e| {
                    GatewayError::InvalidRequest(format!("unreadable 'file' field: {e}"))
                })?;
                request.image = Some(bytes);
            }
            Some("user_id") => {
                let text = field.text().await.map_err(|e| {
                    GatewayError::InvalidRequest(format!("unreadable 'user_id' field: {e}"))
                })?;
                let user_id = text.trim().parse().map_err(|_| {
                    GatewayError::InvalidRequest(format!("'user_id' is not an integer: {text}"))
                })?;
                request.user_id = Some(user_id);
            }
            other => {
                debug!(field = ?other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(request)
}

async fn award_points<S, T>(state: &HandlerState<S, T>, user_id: i64) -> Result<(), GatewayError>
where
    S: LabelScorer,
    T: TaskStore,
{
    let store = state
        .task_store
        .as_ref()
        .ok_or(GatewayError::StoreUnconfigured)?;

    store.add_points(user_id, state.reward_points).await?;

    info!(user_id, points = state.reward_points, "Points credited");
    Ok(())
}

fn make_response(verdict: &Verdict) -> Result<Response, GatewayError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        OCULAR_STATUS_HEADER,
        HeaderValue::from_str(verdict.status_label())
            .unwrap_or(HeaderValue::from_static("error")),
    );

    let body = Json(ClassifyResponse {
        verified: verdict.is_verified(),
    });

    Ok((StatusCode::OK, headers, body).into_response())
}

/// Hands out a random open task from the game backend.
#[instrument(skip(state))]
pub async fn random_task_handler<S, T>(
    State(state): State<HandlerState<S, T>>,
) -> Result<Response, GatewayError>
where
    S: LabelScorer,
    T: TaskStore,
{
    let store = state
        .task_store
        .as_ref()
        .ok_or(GatewayError::StoreUnconfigured)?;

    match store.get_random_task().await? {
        Some(task) => {
            debug!(keyword = %task.keyword, "Random task fetched");
            Ok((StatusCode::OK, Json(task)).into_response())
        }
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no tasks available".to_string(),
                code: StatusCode::NOT_FOUND.as_u16(),
            }),
        )
            .into_response()),
    }
}
