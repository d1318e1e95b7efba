//! Validation pipeline driver
//!
//! Sequences one submitted image through the four signal providers (run
//! concurrently, since they are independent, read-only consumers of the
//! same bytes), the local source classifier, and the decision engine, then
//! persists the resulting record.
//!
//! # Error Handling
//! Provider failures are isolated per signal: a failed provider is logged
//! and its evidence slot left absent, so the decision engine falls back to
//! its permissive defaults. Only persistence failures abort a validation.

use crate::config::IvConfig;
use crate::decision::{DecisionEngine, DecisionRecord};
use crate::forensics::SourceForensics;
use crate::providers::{
    AiImageDetector, ContentClassifier, DisabledAiDetector, DisabledContentClassifier,
    DisabledDuplicateIndex, DisabledExifResolver, DuplicateIndex, ExifLocationResolver,
    LocalExifResolver, ProviderError,
};
use crate::types::{DuplicateEvidence, DuplicateMatch, EvidenceBundle};
use nivaran_common::{Coordinates, IssueCategory, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One citizen-submitted image plus its declared report context
#[derive(Debug, Clone)]
pub struct ImageSubmission {
    pub bytes: Vec<u8>,
    /// Original filename; used only for naming-convention forensics
    pub filename: String,
    pub declared_category: IssueCategory,
    /// Where the citizen placed the issue; `None` skips distance checks
    pub declared_location: Option<Coordinates>,
}

/// The provider set a pipeline runs with
#[derive(Clone)]
pub struct Providers {
    pub ai: Arc<dyn AiImageDetector>,
    pub exif: Arc<dyn ExifLocationResolver>,
    pub duplicates: Arc<dyn DuplicateIndex>,
    pub content: Arc<dyn ContentClassifier>,
}

impl Providers {
    /// Every provider disabled; only local forensics remain
    pub fn disabled() -> Self {
        Self {
            ai: Arc::new(DisabledAiDetector),
            exif: Arc::new(DisabledExifResolver),
            duplicates: Arc::new(DisabledDuplicateIndex),
            content: Arc::new(DisabledContentClassifier),
        }
    }

    /// Network-free set: local EXIF resolution, everything else disabled
    pub fn local(allowed_radius_km: f32) -> Self {
        Self {
            exif: Arc::new(LocalExifResolver::new(allowed_radius_km)),
            ..Self::disabled()
        }
    }
}

/// Persistence for decision records
#[async_trait::async_trait]
pub trait ValidationStore: Send + Sync {
    async fn save(&self, record: &DecisionRecord) -> Result<()>;
    async fn find(&self, id: Uuid) -> Result<Option<DecisionRecord>>;
}

/// In-memory store for tests and single-process deployments
#[derive(Default)]
pub struct MemoryValidationStore {
    records: RwLock<Vec<DecisionRecord>>,
}

impl MemoryValidationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ValidationStore for MemoryValidationStore {
    async fn save(&self, record: &DecisionRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<DecisionRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }
}

/// Drives provider fan-out, forensics, decision, and persistence
#[derive(Clone)]
pub struct ValidationPipeline {
    providers: Providers,
    forensics: SourceForensics,
    engine: DecisionEngine,
    store: Arc<dyn ValidationStore>,
    duplicate_similarity_threshold: f32,
}

impl ValidationPipeline {
    /// Pipeline with every provider disabled
    pub fn new(config: IvConfig) -> Self {
        let providers = Providers::disabled();
        Self::with_providers(config, providers)
    }

    pub fn with_providers(config: IvConfig, providers: Providers) -> Self {
        Self {
            providers,
            forensics: SourceForensics::with_thresholds(config.forensics),
            duplicate_similarity_threshold: config.policy.duplicate_similarity_threshold,
            engine: DecisionEngine::new(config.policy),
            store: Arc::new(MemoryValidationStore::new()),
        }
    }

    /// Swap the persistence backend
    pub fn with_store(mut self, store: Arc<dyn ValidationStore>) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> Arc<dyn ValidationStore> {
        Arc::clone(&self.store)
    }

    /// Validate one submission end to end
    pub async fn validate(&self, submission: &ImageSubmission) -> Result<DecisionRecord> {
        info!(
            filename = %submission.filename,
            bytes = submission.bytes.len(),
            category = %submission.declared_category,
            "validating image"
        );

        let (ai, exif, duplicates, content) = tokio::join!(
            self.providers.ai.assess(&submission.bytes),
            self.providers
                .exif
                .resolve(&submission.bytes, submission.declared_location.as_ref()),
            self.providers.duplicates.lookup(&submission.bytes),
            self.providers
                .content
                .classify(&submission.bytes, submission.declared_category),
        );

        let bundle = EvidenceBundle {
            ai: absent_on_failure(self.providers.ai.name(), ai),
            exif: absent_on_failure(self.providers.exif.name(), exif),
            duplicate: absent_on_failure(self.providers.duplicates.name(), duplicates)
                .map(|hits| self.distill_duplicate(hits)),
            content: absent_on_failure(self.providers.content.name(), content),
            forensics: self
                .forensics
                .classify(&submission.bytes, &submission.filename),
        };

        let record = self.engine.evaluate(bundle);
        self.store.save(&record).await?;
        debug!(id = %record.id, status = record.status.as_str(), "decision record persisted");
        Ok(record)
    }

    /// Reduce ranked index hits to a single resubmission verdict
    fn distill_duplicate(&self, hits: Vec<DuplicateMatch>) -> DuplicateEvidence {
        match hits.into_iter().next() {
            Some(best) => DuplicateEvidence {
                is_duplicate: best.similarity >= self.duplicate_similarity_threshold,
                similarity: best.similarity,
                matched_report: Some(best.report_id),
            },
            None => DuplicateEvidence::no_match(),
        }
    }
}

fn absent_on_failure<T>(
    provider: &'static str,
    result: std::result::Result<T, ProviderError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(provider, error = %e, "signal provider failed; continuing with absent evidence");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{DecisionStatus, ReasonCode};

    fn submission(bytes: &[u8], filename: &str) -> ImageSubmission {
        ImageSubmission {
            bytes: bytes.to_vec(),
            filename: filename.to_string(),
            declared_category: IssueCategory::Garbage,
            declared_location: Some(Coordinates {
                lat: 17.3850,
                lng: 78.4867,
            }),
        }
    }

    #[tokio::test]
    async fn disabled_pipeline_accepts_with_location_warning() {
        let pipeline = ValidationPipeline::new(IvConfig::default());
        let record = pipeline
            .validate(&submission(b"notimagebytes", "note.txt"))
            .await
            .unwrap();
        assert_eq!(record.status, DecisionStatus::Accepted);
        assert_eq!(record.reason_codes, vec![ReasonCode::LocationNotAvailable]);
    }

    #[tokio::test]
    async fn records_are_persisted_and_findable() {
        let store = Arc::new(MemoryValidationStore::new());
        let pipeline =
            ValidationPipeline::new(IvConfig::default()).with_store(Arc::clone(&store) as _);
        let record = pipeline
            .validate(&submission(b"somebytes", "a.bin"))
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);
        let found = store.find(record.id).await.unwrap().unwrap();
        assert_eq!(found, record);
    }

    #[test]
    fn duplicate_distillation_applies_the_threshold() {
        let pipeline = ValidationPipeline::new(IvConfig::default());

        let evidence = pipeline.distill_duplicate(vec![DuplicateMatch {
            report_id: "NV-2024-00007".into(),
            similarity: 0.95,
        }]);
        assert!(evidence.is_duplicate);
        assert_eq!(evidence.matched_report, Some("NV-2024-00007".into()));

        let evidence = pipeline.distill_duplicate(vec![DuplicateMatch {
            report_id: "NV-2024-00007".into(),
            similarity: 0.72,
        }]);
        assert!(!evidence.is_duplicate);
        assert_eq!(evidence.similarity, 0.72);

        let evidence = pipeline.distill_duplicate(Vec::new());
        assert_eq!(evidence, DuplicateEvidence::no_match());
    }
}
