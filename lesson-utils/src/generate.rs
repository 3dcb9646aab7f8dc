//! Request/response bodies for the generation backend. The backend builds
//! its structured-output schema from these types, so both sides of the
//! wire stay in lockstep.

use crate::{ChatMessage, DisplayLanguage, Lesson, LessonIndexItem, Topic};

/// A tutor reply consisting of exactly this string is a navigation
/// command ("advance to the next lesson"), never display text.
pub const NEXT_LESSON_SENTINEL: &str = "[NEXT_LESSON]";

/// An uploaded source document, already encoded by the file-ingestion
/// layer: base64 payload plus its MIME type.
#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, tsify::Tsify, schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    pub data: String,
    pub mime_type: String,
}

/// Full-document analysis: the first lessons in depth plus a complete
/// table of contents. The response body is a `LearningData`.
#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, tsify::Tsify, schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeDocumentRequest {
    pub document: SourceDocument,
    pub language: DisplayLanguage,
}

#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, tsify::Tsify, schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLessonsRequest {
    pub document: SourceDocument,
    /// Index entries to generate in depth. The backend may return fewer
    /// lessons than requested when some cannot be resolved.
    pub requested: Vec<LessonIndexItem>,
    pub language: DisplayLanguage,
}

#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, tsify::Tsify, schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLessonsResponse {
    pub lessons: Vec<Lesson>,
}

/// Raw-text analysis (e.g. a pasted transcript). The response body is a
/// single standalone `Lesson`, always number 1.
#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, tsify::Tsify, schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTextRequest {
    pub text: String,
    pub language: DisplayLanguage,
}

#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, tsify::Tsify, schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub lesson: Lesson,
    pub transcript: Vec<ChatMessage>,
    pub message: String,
    pub topic: Topic,
    pub language: DisplayLanguage,
}

#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, tsify::Tsify, schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, tsify::Tsify, schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCredentialRequest {
    pub credential: String,
}

#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, tsify::Tsify, schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCredentialResponse {
    pub valid: bool,
}
