//! Intent rules
//!
//! A fixed, ordered table of rules. Each rule pairs an id with a matcher; the
//! matcher is the rule's guard and, when the guard holds, also yields the
//! tagged `Intent` carrying the signal values the emitter needs.
//!
//! Guards overlap on purpose. Only the table order decides which rule wins,
//! so the order below is behavior, not layout.

use chrono::NaiveDate;
use serde::Serialize;

use super::extract::{DateRange, ExtractedSignals, Threshold, TimeRange};
use super::metric::Metric;

const SNAPSHOT_NOUNS: &[&str] = &["замер", "снапшот", "сним", "почас", "статистик"];
const DECLINE_WORDS: &[&str] = &["отриц", "меньше", "уменьш"];
const TOTAL_WORDS: &[&str] = &["всего", "в системе"];
const PUBLISHED_WORDS: &[&str] = &["вышло", "опублик"];
const GREATER_WORDS: &[&str] = &["больше", "более"];
const MONTHLY_WORDS: &[&str] = &["видео", "опублик"];
const GROWTH_WORDS: &[&str] = &["вырос", "увелич", "прирост", "измен"];
const CREATOR_NOUNS: &[&str] = &["автор", "креатор"];

/// Number of rules active without the legacy ranking extension
pub const CORE_RULE_COUNT: usize = 12;

/// Number of rules including the legacy ranking extension
pub const RULE_COUNT: usize = 15;

/// Rule identifiers, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    NegativeDeltaSnapshots,
    TotalVideos,
    CreatorVideos,
    CreatorVideosPublishedBetween,
    MetricPositive,
    MetricThreshold,
    MonthlyMetricSum,
    GlobalMetricSum,
    CreatorMetricSum,
    DeltaSumWithinHours,
    DeltaSumForDate,
    DistinctVideosWithNewMetric,
    TopCreatorsByVideoCount,
    TopVideosByMetric,
    TopCreatorsByMetric,
}

impl RuleId {
    pub const ALL: [RuleId; RULE_COUNT] = [
        RuleId::NegativeDeltaSnapshots,
        RuleId::TotalVideos,
        RuleId::CreatorVideos,
        RuleId::CreatorVideosPublishedBetween,
        RuleId::MetricPositive,
        RuleId::MetricThreshold,
        RuleId::MonthlyMetricSum,
        RuleId::GlobalMetricSum,
        RuleId::CreatorMetricSum,
        RuleId::DeltaSumWithinHours,
        RuleId::DeltaSumForDate,
        RuleId::DistinctVideosWithNewMetric,
        RuleId::TopCreatorsByVideoCount,
        RuleId::TopVideosByMetric,
        RuleId::TopCreatorsByMetric,
    ];

    /// 1-based priority, 1 is tried first
    pub fn priority(&self) -> usize {
        self.index() + 1
    }

    /// Position in `ALL`
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Rules that only run with the ranking extension enabled
    pub fn is_legacy(&self) -> bool {
        self.index() >= CORE_RULE_COUNT
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::NegativeDeltaSnapshots => "negative_delta_snapshots",
            RuleId::TotalVideos => "total_videos",
            RuleId::CreatorVideos => "creator_videos",
            RuleId::CreatorVideosPublishedBetween => "creator_videos_published_between",
            RuleId::MetricPositive => "metric_positive",
            RuleId::MetricThreshold => "metric_threshold",
            RuleId::MonthlyMetricSum => "monthly_metric_sum",
            RuleId::GlobalMetricSum => "global_metric_sum",
            RuleId::CreatorMetricSum => "creator_metric_sum",
            RuleId::DeltaSumWithinHours => "delta_sum_within_hours",
            RuleId::DeltaSumForDate => "delta_sum_for_date",
            RuleId::DistinctVideosWithNewMetric => "distinct_videos_with_new_metric",
            RuleId::TopCreatorsByVideoCount => "top_creators_by_video_count",
            RuleId::TopVideosByMetric => "top_videos_by_metric",
            RuleId::TopCreatorsByMetric => "top_creators_by_metric",
        }
    }
}

/// What the question asks for, with every value the statement needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    NegativeDeltaSnapshots {
        metric: Metric,
    },
    TotalVideos,
    CreatorVideos {
        creator_id: String,
    },
    CreatorVideosPublishedBetween {
        creator_id: String,
        range: DateRange,
    },
    MetricPositive {
        metric: Metric,
        creator_id: Option<String>,
    },
    MetricThreshold {
        metric: Metric,
        threshold: Threshold,
        creator_id: Option<String>,
    },
    MonthlyMetricSum {
        metric: Metric,
        /// First day of the month
        start: NaiveDate,
        /// First day of the following month
        end: NaiveDate,
    },
    GlobalMetricSum {
        metric: Metric,
    },
    CreatorMetricSum {
        metric: Metric,
        creator_id: String,
    },
    DeltaSumWithinHours {
        metric: Metric,
        date: NaiveDate,
        hours: TimeRange,
        creator_id: Option<String>,
    },
    DeltaSumForDate {
        metric: Metric,
        date: NaiveDate,
        creator_id: Option<String>,
    },
    DistinctVideosWithNewMetric {
        metric: Metric,
        date: NaiveDate,
        creator_id: Option<String>,
    },
    TopCreatorsByVideoCount {
        limit: i64,
    },
    TopVideosByMetric {
        metric: Metric,
        limit: i64,
    },
    TopCreatorsByMetric {
        metric: Metric,
        limit: i64,
    },
}

impl Intent {
    /// The rule that produces this intent
    pub fn rule(&self) -> RuleId {
        match self {
            Intent::NegativeDeltaSnapshots { .. } => RuleId::NegativeDeltaSnapshots,
            Intent::TotalVideos => RuleId::TotalVideos,
            Intent::CreatorVideos { .. } => RuleId::CreatorVideos,
            Intent::CreatorVideosPublishedBetween { .. } => RuleId::CreatorVideosPublishedBetween,
            Intent::MetricPositive { .. } => RuleId::MetricPositive,
            Intent::MetricThreshold { .. } => RuleId::MetricThreshold,
            Intent::MonthlyMetricSum { .. } => RuleId::MonthlyMetricSum,
            Intent::GlobalMetricSum { .. } => RuleId::GlobalMetricSum,
            Intent::CreatorMetricSum { .. } => RuleId::CreatorMetricSum,
            Intent::DeltaSumWithinHours { .. } => RuleId::DeltaSumWithinHours,
            Intent::DeltaSumForDate { .. } => RuleId::DeltaSumForDate,
            Intent::DistinctVideosWithNewMetric { .. } => RuleId::DistinctVideosWithNewMetric,
            Intent::TopCreatorsByVideoCount { .. } => RuleId::TopCreatorsByVideoCount,
            Intent::TopVideosByMetric { .. } => RuleId::TopVideosByMetric,
            Intent::TopCreatorsByMetric { .. } => RuleId::TopCreatorsByMetric,
        }
    }
}

/// Normalized text plus its extracted signals
#[derive(Debug, Clone, Copy)]
pub struct Question<'a> {
    text: &'a str,
    signals: &'a ExtractedSignals,
}

impl<'a> Question<'a> {
    pub fn new(text: &'a str, signals: &'a ExtractedSignals) -> Self {
        Self { text, signals }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn signals(&self) -> &'a ExtractedSignals {
        self.signals
    }

    fn has(&self, stem: &str) -> bool {
        self.text.contains(stem)
    }

    fn has_any(&self, stems: &[&str]) -> bool {
        stems.iter().any(|stem| self.text.contains(stem))
    }

    /// "сколько ... видео"
    fn counts_videos(&self) -> bool {
        self.has("сколько") && self.has("видео")
    }
}

type Matcher = fn(&Question<'_>) -> Option<Intent>;

/// One entry of the rule table
pub struct IntentRule {
    pub id: RuleId,
    matcher: Matcher,
}

impl IntentRule {
    /// Evaluates the guard, yielding the intent when it holds
    pub fn matches(&self, question: &Question<'_>) -> Option<Intent> {
        (self.matcher)(question)
    }
}

/// The rule table. Core rules first, legacy ranking rules last.
pub static RULES: [IntentRule; RULE_COUNT] = [
    IntentRule { id: RuleId::NegativeDeltaSnapshots, matcher: negative_delta_snapshots },
    IntentRule { id: RuleId::TotalVideos, matcher: total_videos },
    IntentRule { id: RuleId::CreatorVideos, matcher: creator_videos },
    IntentRule { id: RuleId::CreatorVideosPublishedBetween, matcher: creator_videos_published_between },
    IntentRule { id: RuleId::MetricPositive, matcher: metric_positive },
    IntentRule { id: RuleId::MetricThreshold, matcher: metric_threshold },
    IntentRule { id: RuleId::MonthlyMetricSum, matcher: monthly_metric_sum },
    IntentRule { id: RuleId::GlobalMetricSum, matcher: global_metric_sum },
    IntentRule { id: RuleId::CreatorMetricSum, matcher: creator_metric_sum },
    IntentRule { id: RuleId::DeltaSumWithinHours, matcher: delta_sum_within_hours },
    IntentRule { id: RuleId::DeltaSumForDate, matcher: delta_sum_for_date },
    IntentRule { id: RuleId::DistinctVideosWithNewMetric, matcher: distinct_videos_with_new_metric },
    IntentRule { id: RuleId::TopCreatorsByVideoCount, matcher: top_creators_by_video_count },
    IntentRule { id: RuleId::TopVideosByMetric, matcher: top_videos_by_metric },
    IntentRule { id: RuleId::TopCreatorsByMetric, matcher: top_creators_by_metric },
];

/// Active rules for a configuration
pub fn active_rules(legacy_ranking: bool) -> &'static [IntentRule] {
    if legacy_ranking {
        &RULES
    } else {
        &RULES[..CORE_RULE_COUNT]
    }
}

/// First rule whose guard holds
pub fn match_intent(question: &Question<'_>, legacy_ranking: bool) -> Option<Intent> {
    active_rules(legacy_ranking)
        .iter()
        .find_map(|rule| rule.matches(question))
}

/// Every rule whose guard holds, in priority order
pub fn candidate_rules(question: &Question<'_>, legacy_ranking: bool) -> Vec<RuleId> {
    active_rules(legacy_ranking)
        .iter()
        .filter(|rule| rule.matches(question).is_some())
        .map(|rule| rule.id)
        .collect()
}

fn negative_delta_snapshots(q: &Question<'_>) -> Option<Intent> {
    let metric = q.signals.metric?;
    let guard = q.has("сколько") && q.has_any(SNAPSHOT_NOUNS) && q.has_any(DECLINE_WORDS);
    guard.then_some(Intent::NegativeDeltaSnapshots { metric })
}

fn total_videos(q: &Question<'_>) -> Option<Intent> {
    let guard = q.counts_videos() && q.has_any(TOTAL_WORDS) && q.signals.metric.is_none();
    guard.then_some(Intent::TotalVideos)
}

fn creator_videos(q: &Question<'_>) -> Option<Intent> {
    let s = q.signals;
    let creator_id = s.creator_id.as_ref()?;
    let guard = q.counts_videos()
        && s.metric.is_none()
        && s.threshold.is_none()
        && s.date_range.is_none();
    guard.then(|| Intent::CreatorVideos { creator_id: creator_id.clone() })
}

fn creator_videos_published_between(q: &Question<'_>) -> Option<Intent> {
    let s = q.signals;
    let creator_id = s.creator_id.as_ref()?;
    let range = s.date_range?;
    let guard = q.counts_videos() && q.has_any(PUBLISHED_WORDS);
    guard.then(|| Intent::CreatorVideosPublishedBetween {
        creator_id: creator_id.clone(),
        range,
    })
}

/// "больше" without a number reads as "more than zero"
fn metric_positive(q: &Question<'_>) -> Option<Intent> {
    let s = q.signals;
    let metric = s.metric?;
    let guard = q.counts_videos() && q.has_any(GREATER_WORDS) && s.threshold.is_none();
    guard.then(|| Intent::MetricPositive {
        metric,
        creator_id: s.creator_id.clone(),
    })
}

fn metric_threshold(q: &Question<'_>) -> Option<Intent> {
    let s = q.signals;
    let metric = s.metric?;
    let threshold = s.threshold?;
    q.counts_videos().then(|| Intent::MetricThreshold {
        metric,
        threshold,
        creator_id: s.creator_id.clone(),
    })
}

fn monthly_metric_sum(q: &Question<'_>) -> Option<Intent> {
    let s = q.signals;
    let metric = s.metric?;
    let (start, end) = s.month_year?.window()?;
    q.has_any(MONTHLY_WORDS)
        .then_some(Intent::MonthlyMetricSum { metric, start, end })
}

fn global_metric_sum(q: &Question<'_>) -> Option<Intent> {
    let s = q.signals;
    let metric = s.metric?;
    let guard = q.has("сколько")
        && q.has_any(TOTAL_WORDS)
        && s.creator_id.is_none()
        && !s.has_calendar_scope();
    guard.then_some(Intent::GlobalMetricSum { metric })
}

fn creator_metric_sum(q: &Question<'_>) -> Option<Intent> {
    let s = q.signals;
    let metric = s.metric?;
    let creator_id = s.creator_id.as_ref()?;
    let guard = q.has("сколько") && s.threshold.is_none();
    guard.then(|| Intent::CreatorMetricSum {
        metric,
        creator_id: creator_id.clone(),
    })
}

fn delta_sum_within_hours(q: &Question<'_>) -> Option<Intent> {
    let s = q.signals;
    let metric = s.metric?;
    let date = s.date?;
    let hours = s.time_range?;
    q.has_any(GROWTH_WORDS).then(|| Intent::DeltaSumWithinHours {
        metric,
        date,
        hours,
        creator_id: s.creator_id.clone(),
    })
}

fn delta_sum_for_date(q: &Question<'_>) -> Option<Intent> {
    let s = q.signals;
    let metric = s.metric?;
    let date = s.date?;
    q.has_any(GROWTH_WORDS).then(|| Intent::DeltaSumForDate {
        metric,
        date,
        creator_id: s.creator_id.clone(),
    })
}

fn distinct_videos_with_new_metric(q: &Question<'_>) -> Option<Intent> {
    let s = q.signals;
    let metric = s.metric?;
    let date = s.date?;
    let guard = q.counts_videos() && q.has("разных") && q.has("получал") && q.has("нов");
    guard.then(|| Intent::DistinctVideosWithNewMetric {
        metric,
        date,
        creator_id: s.creator_id.clone(),
    })
}

fn top_creators_by_video_count(q: &Question<'_>) -> Option<Intent> {
    let limit = q.signals.top_limit?;
    let guard = q.has_any(CREATOR_NOUNS) && q.signals.metric.is_none();
    guard.then_some(Intent::TopCreatorsByVideoCount { limit })
}

fn top_videos_by_metric(q: &Question<'_>) -> Option<Intent> {
    let limit = q.signals.top_limit?;
    let metric = q.signals.metric?;
    q.has("видео")
        .then_some(Intent::TopVideosByMetric { metric, limit })
}

fn top_creators_by_metric(q: &Question<'_>) -> Option<Intent> {
    let limit = q.signals.top_limit?;
    let metric = q.signals.metric?;
    q.has_any(CREATOR_NOUNS)
        .then_some(Intent::TopCreatorsByMetric { metric, limit })
}
