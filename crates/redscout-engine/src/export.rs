//! CSV serialization of the two result tables.
//!
//! Column sets are fixed: they mirror the dashboard tables exactly so an
//! export opens in a spreadsheet the way it looked on screen.

use crate::types::{CommunityRecord, SignalRecord};

/// Serializes discovered communities as CSV.
///
/// Columns: `Community, Relevance Score, Found Via, Members, Community Link,
/// Top Posts (Month)`; the community is rendered `r/{name}`.
///
/// # Errors
///
/// Returns [`csv::Error`] if a record fails to serialize.
pub fn communities_csv(records: &[CommunityRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Community",
        "Relevance Score",
        "Found Via",
        "Members",
        "Community Link",
        "Top Posts (Month)",
    ])?;

    for record in records {
        writer.write_record([
            format!("r/{}", record.name),
            record.relevance_score().to_string(),
            record.found_via_label(),
            record.members.to_string(),
            record.link(),
            record.top_posts_link(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))
}

/// Serializes buying signals as CSV.
///
/// Columns: `Subreddit, Match, Type, Text, Author, Link`.
///
/// # Errors
///
/// Returns [`csv::Error`] if a record fails to serialize.
pub fn signals_csv(records: &[SignalRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Subreddit", "Match", "Type", "Text", "Author", "Link"])?;

    for record in records {
        writer.write_record([
            record.subreddit.as_str(),
            record.matched.as_str(),
            record.kind.label(),
            record.text.as_str(),
            record.author.as_str(),
            record.permalink.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Provenance, SignalKind};
    use std::collections::BTreeSet;

    #[test]
    fn communities_csv_renders_the_worked_example_row() {
        let records = vec![CommunityRecord {
            name: "startups".to_string(),
            members: 500_000,
            found_via: BTreeSet::from([Provenance::DirectSearch]),
        }];

        let bytes = communities_csv(&records).expect("serialize");
        let csv = String::from_utf8(bytes).expect("utf8");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Community,Relevance Score,Found Via,Members,Community Link,Top Posts (Month)"
        );
        assert_eq!(
            lines.next().unwrap(),
            "r/startups,1,Direct Search,500000,https://www.reddit.com/r/startups,https://www.reddit.com/r/startups/top/?t=month"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn communities_csv_quotes_multi_provenance_labels() {
        let records = vec![CommunityRecord {
            name: "startups".to_string(),
            members: 10,
            found_via: BTreeSet::from([Provenance::DirectSearch, Provenance::RelevantPost]),
        }];

        let bytes = communities_csv(&records).expect("serialize");
        let csv = String::from_utf8(bytes).expect("utf8");
        assert!(
            csv.contains("\"Direct Search, Relevant Post\""),
            "comma-joined label must be quoted: {csv}"
        );
    }

    #[test]
    fn signals_csv_emits_both_record_kinds() {
        let records = vec![
            SignalRecord {
                subreddit: "solopreneur".to_string(),
                kind: SignalKind::Post,
                matched: "market research".to_string(),
                author: "founder".to_string(),
                text: "How do you do market research?".to_string(),
                permalink: "https://reddit.com/r/solopreneur/comments/abc/".to_string(),
            },
            SignalRecord {
                subreddit: "solopreneur".to_string(),
                kind: SignalKind::Comment,
                matched: "market research".to_string(),
                author: "replier".to_string(),
                text: "market research is my weak spot too".to_string(),
                permalink: "https://reddit.com/r/solopreneur/comments/abc/_/c1".to_string(),
            },
        ];

        let bytes = signals_csv(&records).expect("serialize");
        let csv = String::from_utf8(bytes).expect("utf8");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Subreddit,Match,Type,Text,Author,Link");
        assert!(lines[1].contains(",Post,"));
        assert!(lines[2].contains(",Comment,"));
    }

    #[test]
    fn empty_result_sets_export_headers_only() {
        let bytes = communities_csv(&[]).expect("serialize");
        let csv = String::from_utf8(bytes).expect("utf8");
        assert_eq!(csv.lines().count(), 1);
    }
}
