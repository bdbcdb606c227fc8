//! The prediction web app: an HTML form plus a JSON classify route.
//!
//! The fitted pipeline is loaded once at startup and shared read-only;
//! prediction never mutates state.

use crate::pipeline::{Prediction, SpamPipeline};
use axum::{
    Router,
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ClassifyRequest {
    pub text: String,
}

#[derive(Serialize, Debug)]
pub struct ClassifyResponse {
    pub label: String,
    pub confidence: f64,
    pub spam_probability: f64,
}

/// Rejects empty and whitespace-only input before any prediction runs.
fn validate(text: &str) -> Result<&str, ApiError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        warn!("Rejected empty classification input.");
        return Err(ApiError::BadRequest("Please enter some text.".to_string()));
    }
    Ok(trimmed)
}

const FORM_PAGE: &str = "\
<!doctype html>
<html>
<head><title>Spam Classifier</title></head>
<body>
<h1>Spam or Not Spam</h1>
<form method=\"post\" action=\"/predict\">
<textarea name=\"text\" rows=\"6\" cols=\"60\" placeholder=\"Paste your message here...\"></textarea>
<br>
<button type=\"submit\">Check for Spam</button>
</form>
</body>
</html>";

fn result_page(prediction: &Prediction) -> String {
    let confidence_pct = (prediction.confidence * 100.0).round() as i64;
    format!(
        "<!doctype html>\n<html>\n<head><title>Spam Classifier</title></head>\n<body>\n\
         <h1>{}</h1>\n<p>{}% confidence</p>\n<p><a href=\"/\">Check another message</a></p>\n\
         </body>\n</html>",
        prediction.label, confidence_pct
    )
}

async fn index() -> Html<&'static str> {
    Html(FORM_PAGE)
}

async fn predict_form(
    State(pipeline): State<Arc<SpamPipeline>>,
    Form(request): Form<ClassifyRequest>,
) -> Result<Html<String>, ApiError> {
    let text = validate(&request.text)?;
    let prediction = pipeline.predict(text);
    Ok(Html(result_page(&prediction)))
}

async fn classify(
    State(pipeline): State<Arc<SpamPipeline>>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let text = validate(&request.text)?;
    let prediction = pipeline.predict(text);
    Ok(Json(ClassifyResponse {
        label: prediction.label.to_string(),
        confidence: prediction.confidence,
        spam_probability: prediction.spam_probability,
    }))
}

/// Creates the Axum router for the prediction app.
pub fn create_router(pipeline: Arc<SpamPipeline>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/classify", post(classify))
        .with_state(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FitOptions;

    fn fitted_pipeline() -> Arc<SpamPipeline> {
        let messages: Vec<String> = [
            "win a free prize click here",
            "free cash prize win now",
            "claim your free prize click",
            "dinner at home tonight",
            "see you at the meeting",
            "call me after lunch",
        ]
        .iter()
        .map(|m| m.to_string())
        .collect();
        let labels = vec![1, 1, 1, 0, 0, 0];
        Arc::new(SpamPipeline::fit(&messages, &labels, &FitOptions::default()))
    }

    #[tokio::test]
    async fn test_classify_returns_label_and_confidence() {
        let pipeline = fitted_pipeline();
        let response = classify(
            State(pipeline),
            Json(ClassifyRequest {
                text: "WIN a free prize now!!! Click here".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.label, "Spam");
        assert!(response.confidence > 0.5);
    }

    #[tokio::test]
    async fn test_classify_rejects_empty_input() {
        let pipeline = fitted_pipeline();
        let result = classify(
            State(pipeline),
            Json(ClassifyRequest {
                text: "   ".to_string(),
            }),
        )
        .await;

        match result {
            Err(ApiError::BadRequest(message)) => {
                assert_eq!(message, "Please enter some text.");
            }
            Ok(_) => panic!("Expected BadRequest for whitespace-only input"),
        }
    }

    #[tokio::test]
    async fn test_form_route_renders_the_verdict() {
        let pipeline = fitted_pipeline();
        let Html(page) = predict_form(
            State(pipeline),
            Form(ClassifyRequest {
                text: "free prize click".to_string(),
            }),
        )
        .await
        .unwrap();

        assert!(page.contains("Spam"));
        assert!(page.contains("% confidence"));
    }

    #[test]
    fn test_bad_request_maps_to_http_400() {
        let response = ApiError::BadRequest("Please enter some text.".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
