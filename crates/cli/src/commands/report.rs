//! Advertising listing with platform links

use super::DirArgs;
use anyhow::{Context as _, Result};
use clap::Args;
use softad_classifier::ConfidenceBucket;
use softad_common::PipelineConfig;
use softad_metadata::{extract_video_id, video_url, video_url_at};
use softad_orchestrator::{AggregateRecord, AggregationSummary, Pipeline};

#[derive(Args)]
pub struct ReportCommand {
    #[command(flatten)]
    dirs: DirArgs,

    /// Only list rows at or above this confidence
    #[arg(long, default_value = "0.0")]
    min_confidence: f64,
}

impl ReportCommand {
    pub fn execute(self, mut config: PipelineConfig) -> Result<()> {
        self.dirs.apply(&mut config);
        let pipeline = Pipeline::new(config);
        let path = pipeline.store().summary_csv_path();
        let records = pipeline
            .load_summary()
            .with_context(|| format!("Failed to read {}; run `softad run` first", path.display()))?;

        let summary = AggregationSummary::from_records(&records);
        println!("Videos: {}", summary.total);
        println!("Advertising: {}", summary.ads);
        println!("Identified products: {}", summary.identified_products);
        println!(
            "Confidence: {} high / {} medium / {} low",
            summary.bucket(ConfidenceBucket::High),
            summary.bucket(ConfidenceBucket::Medium),
            summary.bucket(ConfidenceBucket::Low)
        );

        for record in records
            .iter()
            .filter(|record| record.is_ad && record.confidence >= self.min_confidence)
        {
            print_record(record);
        }

        Ok(())
    }
}

fn print_record(record: &AggregateRecord) {
    let product = if record.product_name.is_empty() {
        "未识别"
    } else {
        record.product_name.as_str()
    };

    println!();
    println!("{}", record.filename);
    println!(
        "  {} | {} | confidence {:.2} | published {}",
        record.ad_type,
        product,
        record.confidence,
        if record.publish_date.is_empty() { "-" } else { record.publish_date.as_str() }
    );

    let video_id = extract_video_id(&record.filename);
    if let Some(video_id) = &video_id {
        println!("  {}", video_url(video_id));
    }
    for timestamp in record.timestamps() {
        match &video_id {
            Some(video_id) => println!("  {timestamp}  {}", video_url_at(video_id, timestamp)),
            None => println!("  {timestamp}"),
        }
    }
}
