//! Thin client for the generation collaborator: document analysis,
//! incremental lesson generation, raw-text analysis, tutor chat, and
//! credential verification. Prompting and schema wiring live behind the
//! backend; this side only moves typed bodies and maps failures into the
//! user-facing taxonomy. There is no retry policy; a failed call waits
//! for the user to click again.

use lesson_utils::generate::{
    AnalyzeDocumentRequest, AnalyzeTextRequest, ChatRequest, ChatResponse,
    GenerateLessonsRequest, GenerateLessonsResponse, SourceDocument, VerifyCredentialRequest,
    VerifyCredentialResponse,
};
use lesson_utils::{DisplayLanguage, LearningData, Lesson, LessonIndexItem};

use crate::utils::hit_ai_server;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("transport error: {0:?}")]
    Transport(#[source] fetch_happen::Error),

    #[error("server returned {0}")]
    Status(String),

    #[error("response failed shape validation")]
    Shape,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("document analysis failed")]
    AnalysisFailed(#[source] RequestError),

    #[error("loading additional lessons failed")]
    LoadMoreFailed(#[source] RequestError),

    #[error("text analysis failed")]
    TextAnalysisFailed(#[source] RequestError),

    #[error("tutor reply failed")]
    ChatFailed(#[source] RequestError),
}

async fn post_json<Req, Resp>(
    path: &str,
    request: &Req,
    credential: Option<&String>,
) -> Result<Resp, RequestError>
where
    Req: serde::Serialize,
    Resp: serde::de::DeserializeOwned,
{
    let response = hit_ai_server(path, request, credential)
        .await
        .map_err(RequestError::Transport)?;
    if !response.ok() {
        return Err(RequestError::Status(response.status().to_string()));
    }
    response.json().await.map_err(RequestError::Transport)
}

/// Analyze a whole source document: the first lessons in depth plus the
/// complete lesson index.
pub async fn analyze_document(
    document: &SourceDocument,
    language: DisplayLanguage,
    credential: Option<&String>,
) -> Result<LearningData, GenerateError> {
    let request = AnalyzeDocumentRequest {
        document: document.clone(),
        language,
    };
    let data: LearningData = post_json("/analyze-document", &request, credential)
        .await
        .map_err(GenerateError::AnalysisFailed)?;
    if !data.is_consistent() {
        return Err(GenerateError::AnalysisFailed(RequestError::Shape));
    }
    Ok(data)
}

/// Generate specific lessons from the index. The backend may return
/// fewer than requested when some cannot be resolved.
pub async fn generate_lessons(
    document: &SourceDocument,
    requested: &[LessonIndexItem],
    language: DisplayLanguage,
    credential: Option<&String>,
) -> Result<Vec<Lesson>, GenerateError> {
    let request = GenerateLessonsRequest {
        document: document.clone(),
        requested: requested.to_vec(),
        language,
    };
    let response: GenerateLessonsResponse = post_json("/generate-lessons", &request, credential)
        .await
        .map_err(GenerateError::LoadMoreFailed)?;
    Ok(response.lessons)
}

/// Turn raw pasted text into one standalone lesson.
pub async fn analyze_text(
    text: &str,
    language: DisplayLanguage,
    credential: Option<&String>,
) -> Result<Lesson, GenerateError> {
    let request = AnalyzeTextRequest {
        text: text.to_string(),
        language,
    };
    let lesson: Lesson = post_json("/analyze-text", &request, credential)
        .await
        .map_err(GenerateError::TextAnalysisFailed)?;
    if !lesson.quiz_is_well_formed() {
        return Err(GenerateError::TextAnalysisFailed(RequestError::Shape));
    }
    Ok(lesson)
}

/// One tutor turn. The reply may be the navigation sentinel; callers
/// check before displaying.
pub async fn chat_reply(
    request: &ChatRequest,
    credential: Option<&String>,
) -> Result<String, GenerateError> {
    let response: ChatResponse = post_json("/chat", request, credential)
        .await
        .map_err(GenerateError::ChatFailed)?;
    Ok(response.reply.trim().to_string())
}

/// Check a credential against the backend. Any failure, transport or
/// rejection alike, reads as invalid; the stored credential is never
/// touched here.
pub async fn verify_credential(credential: &str) -> bool {
    let credential = credential.trim().to_string();
    if credential.is_empty() {
        return false;
    }
    let request = VerifyCredentialRequest {
        credential: credential.clone(),
    };
    match post_json::<_, VerifyCredentialResponse>("/verify-credential", &request, Some(&credential))
        .await
    {
        Ok(response) => response.valid,
        Err(e) => {
            log::warn!("credential verification failed: {e}");
            false
        }
    }
}
