//! Performance dashboard view state and chart mapping.

use tracing::{debug, warn};

use crate::error::{ApiError, ErrorClass};
use crate::gate::Navigation;
use crate::model::{AnalyticsQuery, AnalyticsSummary, GroupBy, GroupPerformance};
use crate::request::RequestSeq;
use crate::session::Session;
use crate::traits::TutorApi;

/// Shown when the summary request fails without a server explanation.
pub const ANALYTICS_FALLBACK_MESSAGE: &str = "Could not fetch analytics data.";

/// One chart-ready bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub label: String,
    pub correct: u32,
    pub incorrect: u32,
    /// Percentage rounded to one decimal place.
    pub accuracy_pct: f64,
}

impl ChartBar {
    /// Accuracy formatted for display, e.g. `"75.0%"`.
    pub fn accuracy_label(&self) -> String {
        format!("{:.1}%", self.accuracy_pct)
    }

    pub fn total(&self) -> u32 {
        self.correct + self.incorrect
    }
}

#[must_use]
pub fn map_chart_bar(record: &GroupPerformance) -> ChartBar {
    let ratio = if record.total_answered > 0 {
        f64::from(record.correct_count) / f64::from(record.total_answered)
    } else {
        record.accuracy.unwrap_or(0.0)
    };

    ChartBar {
        label: record.label.clone(),
        correct: record.correct_count,
        incorrect: record.total_answered.saturating_sub(record.correct_count),
        accuracy_pct: round_one_decimal(ratio.clamp(0.0, 1.0) * 100.0),
    }
}

#[must_use]
pub fn chart_bars(summary: &AnalyticsSummary) -> Vec<ChartBar> {
    summary.performance.iter().map(map_chart_bar).collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsPhase {
    Idle,
    Loading,
    Ready,
    /// Loaded, but the user has not answered anything yet.
    Empty,
    Error,
}

/// Handle for an in-flight summary load.
#[derive(Debug)]
pub struct LoadTicket {
    seq: u64,
    query: AnalyticsQuery,
}

impl LoadTicket {
    pub fn query(&self) -> &AnalyticsQuery {
        &self.query
    }
}

/// View state for the dashboard.
#[derive(Debug)]
pub struct AnalyticsView {
    session: Session,
    query: AnalyticsQuery,
    phase: AnalyticsPhase,
    bars: Vec<ChartBar>,
    error: Option<String>,
    seq: RequestSeq,
}

impl AnalyticsView {
    pub fn new(session: Session, query: AnalyticsQuery) -> Self {
        Self {
            session,
            query,
            phase: AnalyticsPhase::Idle,
            bars: Vec::new(),
            error: None,
            seq: RequestSeq::new(),
        }
    }

    pub fn query(&self) -> AnalyticsQuery {
        self.query
    }

    pub fn phase(&self) -> AnalyticsPhase {
        self.phase
    }

    pub fn bars(&self) -> &[ChartBar] {
        &self.bars
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Change the grouping. Returns the query to fetch only when it changed.
    pub fn set_group_by(&mut self, group_by: GroupBy) -> Option<AnalyticsQuery> {
        if self.query.group_by == group_by {
            return None;
        }
        self.query.group_by = group_by;
        Some(self.query)
    }

    /// Toggle demo data. Returns the query to fetch only when it changed.
    pub fn set_use_test_data(&mut self, use_test_data: bool) -> Option<AnalyticsQuery> {
        if self.query.use_test_data == use_test_data {
            return None;
        }
        self.query.use_test_data = use_test_data;
        Some(self.query)
    }

    /// Start loading the summary for the current query.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.phase = AnalyticsPhase::Loading;
        LoadTicket {
            seq: self.seq.issue(),
            query: self.query,
        }
    }

    /// Apply a summary response. Returns a redirect if the session expired.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<AnalyticsSummary, ApiError>,
    ) -> Option<Navigation> {
        if !self.seq.is_current(ticket.seq) || ticket.query != self.query {
            warn!(seq = ticket.seq, "dropping stale analytics response");
            return None;
        }

        match result {
            Ok(summary) => {
                self.bars = chart_bars(&summary);
                self.error = None;
                self.phase = if self.bars.is_empty() {
                    AnalyticsPhase::Empty
                } else {
                    AnalyticsPhase::Ready
                };
                debug!(groups = self.bars.len(), group_by = %self.query.group_by, "analytics loaded");
                None
            }
            Err(e) => {
                self.bars.clear();
                self.error = Some(e.user_message(ANALYTICS_FALLBACK_MESSAGE));
                self.phase = AnalyticsPhase::Error;
                if e.class() == ErrorClass::Unauthorized {
                    warn!("session rejected by server");
                    Some(self.session.expire())
                } else {
                    warn!("analytics request failed: {e}");
                    None
                }
            }
        }
    }

    /// Load the summary for the current query through `api`.
    pub async fn load(&mut self, api: &dyn TutorApi) -> Option<Navigation> {
        let ticket = self.begin_load();
        let result = api.analytics_summary(ticket.query()).await;
        self.complete_load(ticket, result)
    }

    /// Switch grouping and refetch. Does nothing if the grouping is unchanged.
    pub async fn change_group_by(
        &mut self,
        api: &dyn TutorApi,
        group_by: GroupBy,
    ) -> Option<Navigation> {
        self.set_group_by(group_by)?;
        self.load(api).await
    }

    /// Toggle demo data and refetch. Does nothing if the flag is unchanged.
    pub async fn change_use_test_data(
        &mut self,
        api: &dyn TutorApi,
        use_test_data: bool,
    ) -> Option<Navigation> {
        self.set_use_test_data(use_test_data)?;
        self.load(api).await
    }
}
