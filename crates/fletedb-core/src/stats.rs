//! Per-user aggregate statistics over stored messages and analyses.

use serde::Serialize;

/// The parts of a stored message the statistics need.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSummary {
    pub username: Option<String>,
    pub timestamp: String,
}

/// The parts of a stored analysis the statistics need.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub sentiment: String,
    pub category: String,
    pub emotions: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub user_id: i64,
    pub username: Option<String>,
    pub total_messages: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub top_categories: Vec<RankedCount>,
    pub top_emotions: Vec<RankedCount>,
    pub avg_confidence: f64,
    pub first_message: String,
    pub last_message: String,
}

const TOP_N: usize = 5;

/// Compute statistics for one user.
///
/// `messages` must be ordered newest first, as the store returns them.
/// Returns `None` when the user has no messages.
#[must_use]
pub fn compute_user_stats(
    user_id: i64,
    messages: &[MessageSummary],
    analyses: &[AnalysisSummary],
) -> Option<UserStats> {
    let newest = messages.first()?;
    let oldest = messages.last()?;

    let mut sentiment_distribution = SentimentDistribution::default();
    for analysis in analyses {
        match analysis.sentiment.as_str() {
            "positive" => sentiment_distribution.positive += 1,
            "negative" => sentiment_distribution.negative += 1,
            "neutral" => sentiment_distribution.neutral += 1,
            _ => {}
        }
    }

    let top_categories = rank(analyses.iter().map(|a| a.category.as_str()));
    let top_emotions = rank(
        analyses
            .iter()
            .flat_map(|a| a.emotions.iter().map(String::as_str)),
    );

    #[allow(clippy::cast_precision_loss)]
    let avg_confidence = if analyses.is_empty() {
        0.0
    } else {
        analyses.iter().map(|a| a.confidence).sum::<f64>() / analyses.len() as f64
    };

    Some(UserStats {
        user_id,
        username: newest.username.clone(),
        total_messages: messages.len(),
        sentiment_distribution,
        top_categories,
        top_emotions,
        avg_confidence,
        first_message: oldest.timestamp.clone(),
        last_message: newest.timestamp.clone(),
    })
}

/// Count occurrences and keep the top entries. Ties keep first-seen order.
fn rank<'a>(names: impl Iterator<Item = &'a str>) -> Vec<RankedCount> {
    let mut counts: Vec<RankedCount> = Vec::new();
    for name in names {
        match counts.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.count += 1,
            None => counts.push(RankedCount {
                name: name.to_string(),
                count: 1,
            }),
        }
    }
    // Stable sort preserves first-seen order among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_N);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(username: Option<&str>, ts: &str) -> MessageSummary {
        MessageSummary {
            username: username.map(str::to_string),
            timestamp: ts.to_string(),
        }
    }

    fn analysis(sentiment: &str, category: &str, emotions: &[&str], confidence: f64) -> AnalysisSummary {
        AnalysisSummary {
            sentiment: sentiment.to_string(),
            category: category.to_string(),
            emotions: emotions.iter().map(ToString::to_string).collect(),
            confidence,
        }
    }

    #[test]
    fn no_messages_yields_no_stats() {
        assert!(compute_user_stats(1, &[], &[analysis("positive", "x", &[], 50.0)]).is_none());
    }

    #[test]
    fn stats_use_newest_message_for_username_and_last_timestamp() {
        let messages = [
            message(Some("ana_new"), "2024-08-03T10:00:00Z"),
            message(Some("ana_old"), "2024-08-02T10:00:00Z"),
            message(None, "2024-08-01T10:00:00Z"),
        ];
        let stats = compute_user_stats(7, &messages, &[]).unwrap();

        assert_eq!(stats.user_id, 7);
        assert_eq!(stats.username.as_deref(), Some("ana_new"));
        assert_eq!(stats.total_messages, 3);
        assert_eq!(stats.first_message, "2024-08-01T10:00:00Z");
        assert_eq!(stats.last_message, "2024-08-03T10:00:00Z");
        assert!(stats.avg_confidence.abs() < f64::EPSILON);
        assert!(stats.top_categories.is_empty());
    }

    #[test]
    fn sentiment_categories_and_emotions_are_counted() {
        let messages = [message(None, "2024-08-01T10:00:00Z")];
        let analyses = [
            analysis("positive", "carga_transporte", &["satisfacción"], 90.0),
            analysis("negative", "consulta", &["confusión"], 30.0),
            analysis("positive", "carga_transporte", &["satisfacción", "urgencia"], 60.0),
            analysis("mixed", "otro", &[], 0.0),
        ];
        let stats = compute_user_stats(1, &messages, &analyses).unwrap();

        assert_eq!(
            stats.sentiment_distribution,
            SentimentDistribution {
                positive: 2,
                negative: 1,
                neutral: 0
            }
        );
        assert_eq!(stats.top_categories[0].name, "carga_transporte");
        assert_eq!(stats.top_categories[0].count, 2);
        assert_eq!(
            stats
                .top_emotions
                .iter()
                .map(|r| (r.name.as_str(), r.count))
                .collect::<Vec<_>>(),
            vec![("satisfacción", 2), ("confusión", 1), ("urgencia", 1)]
        );
        assert!((stats.avg_confidence - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rankings_keep_only_top_five() {
        let names = ["a", "b", "c", "d", "e", "f", "f"];
        let ranked = rank(names.into_iter());
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].name, "f");
        assert_eq!(ranked[1].name, "a");
        assert_eq!(ranked[4].name, "d");
    }
}
