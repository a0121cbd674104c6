//! Result aggregation and timestamp localization over the analysis artifacts.

use serde::{Deserialize, Serialize};
use softad_classifier::{parse_response, AdType, Classification, ConfidenceBucket};
use softad_common::{MediaFile, PublishIndex};
use softad_localizer::localize;
use softad_storage::StageStore;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Date format used in the summary and the analysis artifacts
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One summary row per analyzed video; the `ads_summary.csv` layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub filename: String,
    #[serde(default)]
    pub publish_date: String,
    pub is_ad: bool,
    pub ad_type: AdType,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub ad_text: String,
    pub confidence: f64,
    /// `"; "`-joined `MM:SS` list
    #[serde(default)]
    pub ads_time: String,
    #[serde(default)]
    pub raw_response: String,
    #[serde(skip)]
    pub identity: String,
}

impl AggregateRecord {
    #[must_use]
    pub fn from_classification(file: &MediaFile, classification: Classification) -> Self {
        Self {
            filename: file.file_name(),
            publish_date: String::new(),
            is_ad: classification.is_ad,
            ad_type: classification.ad_type,
            product_name: classification.product_name,
            ad_text: classification.ad_text,
            confidence: classification.confidence,
            ads_time: String::new(),
            raw_response: classification.raw_response,
            identity: file.identity.clone(),
        }
    }

    /// The classification fields of this row
    #[must_use]
    pub fn classification(&self) -> Classification {
        Classification {
            is_ad: self.is_ad,
            ad_type: self.ad_type,
            product_name: self.product_name.clone(),
            ad_text: self.ad_text.clone(),
            confidence: self.confidence,
            timestamp: String::new(),
            raw_response: self.raw_response.clone(),
        }
    }

    /// Individual `MM:SS` entries of `ads_time`
    pub fn timestamps(&self) -> impl Iterator<Item = &str> {
        self.ads_time
            .split(';')
            .map(str::trim)
            .filter(|timestamp| !timestamp.is_empty())
    }
}

/// Run-wide counts reported after aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationSummary {
    pub total: usize,
    pub ads: usize,
    /// Advertising rows with at least one localized timestamp
    pub localized: usize,
    /// Rows naming a real product rather than a placeholder
    pub identified_products: usize,
    /// Confidence distribution over advertising rows
    pub buckets: BTreeMap<ConfidenceBucket, usize>,
}

impl AggregationSummary {
    #[must_use]
    pub fn from_records(records: &[AggregateRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            let classification = record.classification();
            if classification.has_identified_product() {
                summary.identified_products += 1;
            }
            if !record.is_ad {
                continue;
            }
            summary.ads += 1;
            if !record.ads_time.is_empty() {
                summary.localized += 1;
            }
            *summary
                .buckets
                .entry(classification.confidence_bucket())
                .or_default() += 1;
        }

        summary
    }

    #[must_use]
    pub fn bucket(&self, bucket: ConfidenceBucket) -> usize {
        self.buckets.get(&bucket).copied().unwrap_or(0)
    }

    pub fn log(&self) {
        info!("Processed {} files, {} flagged as advertising", self.total, self.ads);
        info!(
            "Localized {} of {} ads, {} with an identified product",
            self.localized, self.ads, self.identified_products
        );
        info!(
            "Confidence: {} high, {} medium, {} low",
            self.bucket(ConfidenceBucket::High),
            self.bucket(ConfidenceBucket::Medium),
            self.bucket(ConfidenceBucket::Low)
        );
    }
}

/// Joins classifications with publish dates and localizes advertising rows
pub struct ResultAggregator<'a> {
    store: &'a StageStore,
}

impl<'a> ResultAggregator<'a> {
    #[must_use]
    pub fn new(store: &'a StageStore) -> Self {
        Self { store }
    }

    /// One row per file whose analysis artifact exists and is readable.
    ///
    /// Artifacts without a usable result still produce a row with the default
    /// classification. Matched publish dates are written back to the artifact.
    #[must_use]
    pub fn aggregate(&self, files: &[MediaFile], index: &PublishIndex) -> Vec<AggregateRecord> {
        let mut records = Vec::with_capacity(files.len());

        for file in files {
            if !self.store.analysis_path(file).exists() {
                debug!("{}: no analysis artifact", file.identity);
                continue;
            }

            let artifact = match self.store.load_analysis(file) {
                Ok(artifact) => artifact,
                Err(e) => {
                    warn!("{}: unreadable analysis artifact: {}", file.identity, e);
                    continue;
                }
            };

            let classification = parse_response(artifact.raw_response());
            let mut record = AggregateRecord::from_classification(file, classification);

            if let Some(date) = index.date_for_filename(&record.filename) {
                record.publish_date = date.format(DATE_FORMAT).to_string();
                match self.store.patch_publish_date(file, &record.publish_date) {
                    Ok(true) => info!("{}: publish date set to {}", file.identity, record.publish_date),
                    Ok(false) => {}
                    Err(e) => warn!("{}: failed to record publish date: {}", file.identity, e),
                }
            }

            records.push(record);
        }

        records
    }

    /// Fill `ads_time` for advertising rows; returns how many got timestamps
    pub fn localize(&self, records: &mut [AggregateRecord]) -> usize {
        let mut localized = 0;
        for record in records.iter_mut() {
            if !record.is_ad {
                record.ads_time.clear();
                continue;
            }

            let transcript = match self.store.load_transcript_for(&record.identity) {
                Ok(transcript) => transcript,
                Err(e) => {
                    warn!("{}: transcript unavailable for localization: {}", record.filename, e);
                    record.ads_time.clear();
                    continue;
                }
            };

            let localization = localize(&record.classification(), &transcript, &record.filename);
            record.ads_time = localization.joined();
            if !localization.is_empty() {
                info!("{}: advertised at {}", record.filename, record.ads_time);
                localized += 1;
            }
        }
        localized
    }
}
