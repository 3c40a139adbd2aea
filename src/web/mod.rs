//! Web layer: router, handlers and server setup.

use std::io::Cursor;
use std::num::NonZeroU16;

use axum::Router;
use axum::extract::{Form, Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Redirect, Response};
use base64::Engine;
use base64::engine::general_purpose;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};
use tracing::{debug, error, info, warn};

use crate::constants::{
    CSV_DOWNLOAD_FILENAME, DESCRIPTION_MAX_TOKENS, DESCRIPTION_TEMPERATURE, GENERATION_MAX_TOKENS,
    GENERATION_TEMPERATURE,
};
use crate::error::PicstoryError;
use crate::gemini::GeminiClient;
use crate::history::{self, RunRecord};
use crate::prompts::{self, ContentType, Length, Tone};

mod csrf;
mod flash;
mod views;

use csrf::{csrf_token, validate_csrf};
use views::{IndexTemplate, ResultTemplate};

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    gemini: GeminiClient,
}

impl AppState {
    fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }
}

async fn index_handler(
    session: Session,
) -> Result<IndexTemplate, PicstoryError> {
    let records = history::records(&session).await?;
    let csrf_token = csrf_token(&session).await?;
    let flash = flash::take_flash_message(&session).await?;
    let (has_flash, flash_message, flash_class) = match flash {
        Some(message) => (true, message.text.to_string(), message.class.to_string()),
        None => (false, String::new(), String::new()),
    };

    Ok(IndexTemplate {
        csrf_token,
        has_flash,
        flash_message,
        flash_class,
        has_history: !records.is_empty(),
        records,
    })
}

async fn generate_handler(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Response, PicstoryError> {
    let mut filename: Option<String> = None;
    let mut image_bytes: Option<Vec<u8>> = None;
    let mut prompt: Option<String> = None;
    let mut tone_value: Option<String> = None;
    let mut length_value: Option<String> = None;
    let mut content_type_value: Option<String> = None;
    let mut csrf_token_value: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| PicstoryError::BadRequest)?
    {
        let field_name = field.name().unwrap_or_default();
        match field_name {
            "image" => {
                filename = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| PicstoryError::BadRequest)?;
                image_bytes = Some(bytes.to_vec());
            }
            "prompt" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| PicstoryError::BadRequest)?;
                prompt = Some(value);
            }
            "tone" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| PicstoryError::BadRequest)?;
                tone_value = Some(value);
            }
            "length" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| PicstoryError::BadRequest)?;
                length_value = Some(value);
            }
            "content_type" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| PicstoryError::BadRequest)?;
                content_type_value = Some(value);
            }
            "csrf_token" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| PicstoryError::BadRequest)?;
                csrf_token_value = Some(value);
            }
            _ => {}
        }
    }

    let csrf_token_value = csrf_token_value.ok_or(PicstoryError::Unauthorized)?;
    validate_csrf(&session, &csrf_token_value).await?;

    // Validation failures flash a message and never touch the gateway.
    let Some(image_bytes) = image_bytes.filter(|bytes| !bytes.is_empty()) else {
        flash::set_flash(&session, flash::FLASH_MISSING_IMAGE).await?;
        return Ok(Redirect::to("/").into_response());
    };
    let prompt = prompt.unwrap_or_default();
    let prompt = prompt.trim();
    if prompt.is_empty() {
        flash::set_flash(&session, flash::FLASH_MISSING_PROMPT).await?;
        return Ok(Redirect::to("/").into_response());
    }
    let Some(jpeg) = normalize_image_to_jpeg(&image_bytes) else {
        flash::set_flash(&session, flash::FLASH_UNREADABLE_IMAGE).await?;
        return Ok(Redirect::to("/").into_response());
    };

    let tone = Tone::from_form(tone_value.as_deref().unwrap_or_default());
    let length = Length::from_form(length_value.as_deref().unwrap_or_default());
    let content_type = ContentType::from_form(content_type_value.as_deref().unwrap_or_default());
    let filename = filename
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "upload".to_string());

    info!(
        "Generating for {} (tone={}, length={}, type={})",
        filename, tone, length, content_type
    );

    // Two strictly sequential calls: describe the image, then generate
    // the styled text from the composed prompt.
    let description_outcome = state
        .gemini
        .generate(
            prompts::description_prompt(),
            &jpeg,
            DESCRIPTION_TEMPERATURE,
            DESCRIPTION_MAX_TOKENS,
        )
        .await;
    if !description_outcome.is_complete() {
        warn!("Description call did not complete normally");
    }
    let description = description_outcome.into_text();

    let styled_prompt = prompts::compose_prompt(tone, length, content_type, prompt);
    let generation_outcome = state
        .gemini
        .generate(
            &styled_prompt,
            &jpeg,
            GENERATION_TEMPERATURE,
            GENERATION_MAX_TOKENS,
        )
        .await;
    if !generation_outcome.is_complete() {
        warn!("Styled generation call did not complete normally");
    }
    let generated_text = generation_outcome.into_text();

    let record = RunRecord {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        filename: filename.clone(),
        tone: tone.to_string(),
        length: length.to_string(),
        content_type: content_type.to_string(),
        prompt: prompt.to_string(),
        image_description: description.clone(),
        generated_text: generated_text.clone(),
    };
    history::append_record(&session, record).await?;

    let image_data_uri = format!(
        "data:image/jpeg;base64,{}",
        general_purpose::STANDARD.encode(&jpeg)
    );

    Ok(ResultTemplate {
        filename,
        image_data_uri,
        content_type_label: content_type.to_string().to_lowercase(),
        description,
        generated_text,
    }
    .into_response())
}

#[derive(Deserialize)]
struct ClearForm {
    csrf_token: String,
}

async fn clear_history_handler(
    session: Session,
    Form(form): Form<ClearForm>,
) -> Result<Redirect, PicstoryError> {
    validate_csrf(&session, &form.csrf_token).await?;
    history::clear(&session).await?;
    flash::set_flash(&session, flash::FLASH_HISTORY_CLEARED).await?;
    Ok(Redirect::to("/"))
}

async fn csv_handler(session: Session) -> Result<Response, PicstoryError> {
    let records = history::records(&session).await?;
    let csv = history::to_csv(&records);
    Response::builder()
        .header(CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", CSV_DOWNLOAD_FILENAME),
        )
        .body(axum::body::Body::from(csv))
        .map_err(PicstoryError::from)
}

async fn styles_handler() -> impl IntoResponse {
    const STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/styles.css"));
    ([(CONTENT_TYPE, "text/css")], STYLES)
}

/// Ensures image bytes are a valid JPEG, converting jpeg/png uploads and
/// rejecting anything undecodable.
fn normalize_image_to_jpeg(bytes: &[u8]) -> Option<Vec<u8>> {
    if bytes.len() < 4 {
        debug!("Image is too short");
        return None;
    }

    let reader = match image::ImageReader::new(Cursor::new(bytes)).with_guessed_format() {
        Ok(reader) => reader,
        Err(err) => {
            debug!("Failed to guess image format: {}", err);
            return None;
        }
    };
    let format = reader.format();
    let image = match reader.decode() {
        Ok(image) => image,
        Err(err) => {
            debug!("Failed to decode image: {}", err);
            return None;
        }
    };

    if format == Some(image::ImageFormat::Jpeg) {
        return Some(bytes.to_vec());
    }

    let mut output = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new(&mut output);
    match encoder.encode_image(&image) {
        Ok(()) => Some(output),
        Err(err) => {
            debug!("Failed to re-encode image as JPEG: {}", err);
            None
        }
    }
}

fn create_router() -> Router<AppState> {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store).with_secure(false);

    Router::new()
        .route("/", axum::routing::get(index_handler))
        .route("/static/styles.css", axum::routing::get(styles_handler))
        .route("/generate", axum::routing::post(generate_handler))
        .route("/clear", axum::routing::post(clear_history_handler))
        .route("/history.csv", axum::routing::get(csv_handler))
        .layer(session_layer)
}

/// Binds the listener and serves the application until it exits.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    gemini: GeminiClient,
) -> Result<(), anyhow::Error> {
    let app = create_router().with_state(AppState::new(gemini));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
    }
    Ok(())
}
