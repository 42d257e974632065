//! Interfaces to external collaborators: credit accounting, publishing, and
//! per-user style preferences.
//!
//! Only the call shapes live here; the services themselves run elsewhere.

use reelcut_clip_model::{CaptionStyle, NormalizedPoint, ReelExportResult};
use reelcut_common::error::{ReelError, ReelResult};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Answer from the credit service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditDecision {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl CreditDecision {
    pub fn allow() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(reason.into()),
        }
    }
}

/// Checks whether a user may export a clip of a given length.
#[async_trait::async_trait]
pub trait CreditGate: Send + Sync {
    async fn check(&self, user_id: &str, duration_secs: f64) -> ReelResult<CreditDecision>;
}

/// Gate with a fixed balance of export seconds, for local runs and tests.
#[derive(Debug, Clone)]
pub struct FixedCreditGate {
    pub remaining_secs: f64,
}

#[async_trait::async_trait]
impl CreditGate for FixedCreditGate {
    async fn check(&self, _user_id: &str, duration_secs: f64) -> ReelResult<CreditDecision> {
        if duration_secs <= self.remaining_secs {
            Ok(CreditDecision::allow())
        } else {
            Ok(CreditDecision::deny(format!(
                "{duration_secs:.1}s requested, {:.1}s remaining",
                self.remaining_secs
            )))
        }
    }
}

/// Publishing destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    YouTube,
    TikTok,
    Instagram,
}

/// Metadata sent along with an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishMetadata {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Where a published reel ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReceipt {
    pub video_id: String,
    pub url: String,
}

/// Uploads finished media to one platform.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    fn platform(&self) -> Platform;

    async fn upload(&self, bytes: &[u8], metadata: &PublishMetadata) -> ReelResult<PublishReceipt>;
}

/// Publish an exported reel.
///
/// An empty title falls back to the clip id.
pub async fn publish_reel(
    publisher: &dyn Publisher,
    export: &ReelExportResult,
    metadata: PublishMetadata,
) -> ReelResult<PublishReceipt> {
    if export.media.bytes.is_empty() {
        return Err(ReelError::validation(format!(
            "export {} has no media bytes to publish",
            export.clip_id
        )));
    }
    let metadata = if metadata.title.trim().is_empty() {
        PublishMetadata {
            title: export.clip_id.clone(),
            ..metadata
        }
    } else {
        metadata
    };

    tracing::info!(
        platform = ?publisher.platform(),
        clip_id = %export.clip_id,
        bytes = export.media.bytes.len(),
        "Publishing reel"
    );
    let receipt = publisher.upload(&export.media.bytes, &metadata).await?;
    tracing::info!(video_id = %receipt.video_id, url = %receipt.url, "Reel published");
    Ok(receipt)
}

/// A user's caption defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylePreferences {
    pub style: CaptionStyle,
    pub position: NormalizedPoint,
}

/// Partial update to [`StylePreferences`]; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePatch {
    #[serde(default)]
    pub style: Option<CaptionStyle>,
    #[serde(default)]
    pub position: Option<NormalizedPoint>,
}

impl StylePreferences {
    pub fn apply(&mut self, patch: StylePatch) {
        if let Some(style) = patch.style {
            self.style = style.without_words();
        }
        if let Some(position) = patch.position {
            self.position = NormalizedPoint::new(position.x, position.y);
        }
    }
}

/// Persists caption preferences.
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn load(&self) -> ReelResult<StylePreferences>;

    /// Merge a partial update and return the stored result.
    async fn merge(&self, patch: StylePatch) -> ReelResult<StylePreferences>;
}

/// In-process preference store.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    prefs: Mutex<StylePreferences>,
}

impl MemoryPreferenceStore {
    pub fn new(prefs: StylePreferences) -> Self {
        Self {
            prefs: Mutex::new(prefs),
        }
    }
}

#[async_trait::async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn load(&self) -> ReelResult<StylePreferences> {
        Ok(self.prefs.lock().await.clone())
    }

    async fn merge(&self, patch: StylePatch) -> ReelResult<StylePreferences> {
        let mut prefs = self.prefs.lock().await;
        prefs.apply(patch);
        Ok(prefs.clone())
    }
}

/// Preferences to open a session with. Store failures fall back to defaults.
pub async fn resolve_default_style(store: Option<&dyn PreferenceStore>) -> StylePreferences {
    let Some(store) = store else {
        return StylePreferences::default();
    };
    match store.load().await {
        Ok(prefs) => prefs,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load style preferences, using defaults");
            StylePreferences::default()
        }
    }
}
