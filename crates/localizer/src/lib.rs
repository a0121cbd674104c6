//! Timestamp localization
//!
//! Maps a classification back onto its transcript: each candidate phrase is
//! looked up in the segments and the start of its first matching segment is
//! recorded as `MM:SS`.
//!
//! Matching is a case-insensitive substring test with a first-match policy.
//! Short or common phrases can therefore match unrelated speech.

use softad_classifier::Classification;
use softad_transcription::{Transcript, TranscriptSegment};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Separates products inside `product_name`
pub const PRODUCT_DELIMITER: char = '、';

/// Separates sentences inside `ad_text`
pub const SENTENCE_DELIMITER: char = '。';

/// Joins timestamps in the rendered list
pub const TIMESTAMP_SEPARATOR: &str = "; ";

/// Where the candidate phrases came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseSource {
    ProductName,
    AdText,
}

/// Phrases to search for, in priority order: product names, else ad-text sentences
#[must_use]
pub fn candidate_phrases(classification: &Classification) -> Option<(PhraseSource, Vec<String>)> {
    let products = split_phrases(&classification.product_name, PRODUCT_DELIMITER);
    if !products.is_empty() {
        return Some((PhraseSource::ProductName, products));
    }

    let sentences = split_phrases(&classification.ad_text, SENTENCE_DELIMITER);
    if !sentences.is_empty() {
        return Some((PhraseSource::AdText, sentences));
    }

    None
}

fn split_phrases(text: &str, delimiter: char) -> Vec<String> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .map(str::to_string)
        .collect()
}

/// Format seconds as zero-padded `MM:SS`, flooring both parts
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Start of the first segment containing `phrase`, case-insensitively
#[must_use]
pub fn first_match<'a>(segments: &'a [TranscriptSegment], phrase: &str) -> Option<&'a TranscriptSegment> {
    let needle = phrase.to_lowercase();
    segments
        .iter()
        .find(|segment| segment.text.to_lowercase().contains(&needle))
}

/// Localized timestamps for one classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Localization {
    timestamps: BTreeSet<String>,
}

impl Localization {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Timestamps in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.timestamps.iter().map(String::as_str)
    }

    /// The `"; "`-joined list, as stored in the summary
    #[must_use]
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(TIMESTAMP_SEPARATOR)
    }
}

/// Find where the advertised content is spoken.
///
/// `label` names the file in log messages. An empty result is not an error.
#[must_use]
pub fn localize(classification: &Classification, transcript: &Transcript, label: &str) -> Localization {
    let Some((source, phrases)) = candidate_phrases(classification) else {
        warn!("{}: no product name or ad text to search for", label);
        return Localization::default();
    };

    let mut localization = Localization::default();
    for phrase in &phrases {
        if let Some(segment) = first_match(&transcript.segments, phrase) {
            let timestamp = format_timestamp(segment.start);
            debug!("{}: {:?} ({:?}) at {}", label, phrase, source, timestamp);
            localization.timestamps.insert(timestamp);
        }
    }

    if localization.is_empty() {
        warn!("{}: no matching timestamp for {} phrase(s)", label, phrases.len());
    }
    localization
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start,
            end: start + 3.0,
            text: text.to_string(),
        }
    }

    fn transcript(segments: Vec<TranscriptSegment>) -> Transcript {
        Transcript {
            text: segments.iter().map(|s| s.text.as_str()).collect(),
            segments,
            language: None,
        }
    }

    fn classification(product_name: &str, ad_text: &str) -> Classification {
        let mut classification = Classification::default_for("");
        classification.is_ad = true;
        classification.product_name = product_name.to_string();
        classification.ad_text = ad_text.to_string();
        classification
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(125.4), "02:05");
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(59.99), "00:59");
        assert_eq!(format_timestamp(3600.0), "60:00");
        assert_eq!(format_timestamp(-1.0), "00:00");
        assert_eq!(format_timestamp(f64::NAN), "00:00");
    }

    #[test]
    fn test_single_product_match() {
        let transcript = transcript(vec![
            segment(3.0, "大家好"),
            segment(125.4, "我最近换了 iPhone 15 真的很好用"),
        ]);
        let result = localize(&classification("iPhone 15", ""), &transcript, "a.mp4");
        assert_eq!(result.joined(), "02:05");
    }

    #[test]
    fn test_multiple_products_sorted_and_joined() {
        let transcript = transcript(vec![
            segment(10.0, "这个水杯很好看"),
            segment(70.0, "再戴上耳机听歌"),
        ]);
        let result = localize(&classification("耳机、水杯", ""), &transcript, "a.mp4");
        assert_eq!(result.joined(), "00:10; 01:10");
    }

    #[test]
    fn test_first_match_only_and_case_insensitive() {
        let transcript = transcript(vec![
            segment(5.0, "my new IPHONE arrived"),
            segment(95.0, "iphone again"),
        ]);
        let result = localize(&classification("iPhone", ""), &transcript, "a.mp4");
        assert_eq!(result.joined(), "00:05");
    }

    #[test]
    fn test_same_bucket_collapses() {
        let transcript = transcript(vec![segment(12.1, "水杯"), segment(12.5, "耳机")]);
        let result = localize(&classification("水杯、耳机", ""), &transcript, "a.mp4");
        assert_eq!(result.len(), 1);
        assert_eq!(result.joined(), "00:12");
    }

    #[test]
    fn test_product_name_takes_priority_over_ad_text() {
        let transcript = transcript(vec![segment(1.0, "推荐这款面霜"), segment(30.0, "保温杯")]);
        let result = localize(&classification("保温杯", "推荐这款面霜"), &transcript, "a.mp4");
        assert_eq!(result.joined(), "00:30");
    }

    #[test]
    fn test_ad_text_split_into_sentences() {
        let transcript = transcript(vec![segment(8.0, "推荐这款面霜"), segment(61.0, "链接在简介里")]);
        let result = localize(
            &classification("  ", "推荐这款面霜。链接在简介里。"),
            &transcript,
            "a.mp4",
        );
        assert_eq!(result.joined(), "00:08; 01:01");
    }

    #[test]
    fn test_nothing_to_search_is_empty() {
        let transcript = transcript(vec![segment(8.0, "推荐这款面霜")]);
        assert!(localize(&classification("", ""), &transcript, "a.mp4").is_empty());
        assert!(candidate_phrases(&classification("、 、", "。")).is_none());
    }

    #[test]
    fn test_no_match_is_empty() {
        let transcript = transcript(vec![segment(8.0, "今天天气不错")]);
        let result = localize(&classification("耳机", ""), &transcript, "a.mp4");
        assert!(result.is_empty());
        assert_eq!(result.joined(), "");
    }

    #[test]
    fn test_deterministic_across_runs() {
        let transcript = transcript(vec![
            segment(70.0, "耳机"),
            segment(10.0, "水杯"),
            segment(200.0, "充电宝"),
        ]);
        let classification = classification("充电宝、水杯、耳机", "");
        let first = localize(&classification, &transcript, "a.mp4");
        let second = localize(&classification, &transcript, "a.mp4");
        assert_eq!(first, second);
        assert_eq!(first.joined(), "00:10; 01:10; 03:20");
    }
}
