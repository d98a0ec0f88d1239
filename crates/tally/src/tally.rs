//! Main Tally struct and public API.

use std::path::Path;

use tracing::info;

use crate::chart::{ChartBuilder, ChartRequest, ChartSpec};
use crate::config::TallyConfig;
use crate::error::Result;
use crate::formula::{AliasMap, FormulaEngine, FormulaResult};
use crate::inference::ColumnClassifier;
use crate::input::{DataTable, Parser, SourceMetadata};
use crate::kpi::{GroupedKpiResult, GrowthOutcome, GrowthRate, KpiAggregator, KpiReport, KpiResult};
use crate::schema::{ColumnClassification, DatasetSummary};
use crate::telemetry::{UsageEvent, UsageTracker};

/// Loads datasets into analysis sessions.
pub struct Tally {
    config: TallyConfig,
    parser: Parser,
    engine: FormulaEngine,
    tracker: UsageTracker,
}

impl Tally {
    /// Create a new Tally instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(TallyConfig::default())
    }

    /// Create a Tally instance with custom configuration.
    pub fn with_config(config: TallyConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        let engine = FormulaEngine::with_config(config.formula.clone());
        let tracker = UsageTracker::new(config.telemetry.clone());

        Self {
            config,
            parser,
            engine,
            tracker,
        }
    }

    pub fn config(&self) -> &TallyConfig {
        &self.config
    }

    /// Load a delimited file and classify its columns.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Session> {
        let (table, source) = self.parser.parse_file(path)?;
        info!(
            file = %source.file,
            rows = source.row_count,
            columns = source.column_count,
            "Loaded dataset"
        );

        self.tracker.track(
            UsageEvent::new("File Uploaded", "Data Upload").with_notes(source.file.clone()),
        );

        let mut session = self.session(table);
        session.source = Some(source);
        Ok(session)
    }

    /// Wait for queued usage events, including those of this instance's
    /// sessions, to be sent. Call before a short-lived process exits.
    pub fn flush_usage(&self) {
        self.tracker.flush();
    }

    /// Start a session over a table already in memory.
    pub fn session(&self, table: DataTable) -> Session {
        let mut session = Session::from_table(table);
        session.engine = self.engine.clone();
        session.tracker = self.tracker.clone();
        session
    }
}

impl Default for Tally {
    fn default() -> Self {
        Self::new()
    }
}

/// One dataset and everything derived from it.
///
/// Date columns are normalized to ISO-8601 when the session is created; the
/// caller's table is left untouched.
pub struct Session {
    source: Option<SourceMetadata>,
    table: DataTable,
    classification: ColumnClassification,
    engine: FormulaEngine,
    tracker: UsageTracker,
}

impl Session {
    /// Classify a table with default formula limits and no tracking.
    pub fn from_table(table: DataTable) -> Self {
        let (table, classification) = ColumnClassifier::classify_and_normalize(&table);
        Self {
            source: None,
            table,
            classification,
            engine: FormulaEngine::new(),
            tracker: UsageTracker::disabled(),
        }
    }

    pub fn source(&self) -> Option<&SourceMetadata> {
        self.source.as_ref()
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn classification(&self) -> &ColumnClassification {
        &self.classification
    }

    /// First date column, the default time axis for growth.
    pub fn default_date_column(&self) -> Option<&str> {
        self.classification.date.first().map(String::as_str)
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::from_table(&self.table, &self.classification)
    }

    pub fn basic_kpis<S: AsRef<str>>(&self, columns: &[S]) -> Result<KpiResult> {
        KpiAggregator::aggregate(&self.table, columns)
    }

    pub fn grouped_kpis<S: AsRef<str>>(
        &self,
        columns: &[S],
        group_column: &str,
    ) -> Result<GroupedKpiResult> {
        KpiAggregator::aggregate_grouped(&self.table, columns, group_column)
    }

    pub fn growth_rate(&self, value_column: &str, date_column: &str) -> f64 {
        GrowthRate::compute(&self.table, value_column, date_column)
    }

    pub fn growth_outcome(&self, value_column: &str, date_column: &str) -> GrowthOutcome {
        GrowthRate::evaluate(&self.table, value_column, date_column)
    }

    pub fn evaluate_formula(&self, formula: &str, aliases: &AliasMap) -> FormulaResult {
        let result = self.engine.evaluate(formula, aliases, &self.table);
        self.tracker.track(
            UsageEvent::new("Custom Formula", "KPI Dashboard").with_notes(formula.to_string()),
        );
        result
    }

    pub fn chart(&self, request: &ChartRequest) -> Result<ChartSpec> {
        ChartBuilder::build(&self.table, &self.classification, request)
    }

    /// Collect basic KPIs, and optionally grouped KPIs and a growth rate
    /// given as `(value_column, date_column)`, into one exportable report.
    pub fn report<S: AsRef<str>>(
        &self,
        columns: &[S],
        group_column: Option<&str>,
        growth: Option<(&str, &str)>,
    ) -> Result<KpiReport> {
        let mut report = KpiReport::new(self.basic_kpis(columns)?);
        if let Some(source) = &self.source {
            report = report.with_source(source.clone());
        }
        if let Some(group_column) = group_column {
            report = report.with_grouped(self.grouped_kpis(columns, group_column)?);
        }
        if let Some((value_column, date_column)) = growth {
            report = report.with_growth(self.growth_outcome(value_column, date_column));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;
    use crate::kpi::{GroupKey, GrowthStatus};

    fn sales_session() -> Session {
        Session::from_table(DataTable::from_columns(vec![
            ("date", vec!["03/01/2024", "01/01/2024", "02/01/2024"]),
            ("region", vec!["West", "East", "East"]),
            ("sales", vec!["30", "10", "20"]),
        ]))
    }

    #[test]
    fn test_session_classifies_and_normalizes() {
        let session = sales_session();
        assert_eq!(session.classification().date, vec!["date"]);
        assert_eq!(session.classification().text, vec!["region"]);
        assert_eq!(session.classification().numeric, vec!["sales"]);
        assert_eq!(session.table().get(0, 0), Some("2024-03-01"));
        assert_eq!(session.default_date_column(), Some("date"));
    }

    #[test]
    fn test_session_operations() {
        let session = sales_session();

        let kpis = session.basic_kpis(&["sales"]).unwrap();
        assert_eq!(kpis["sales"].sum, 60.0);

        let grouped = session.grouped_kpis(&["sales"], "region").unwrap();
        let west = grouped.row(&GroupKey::Value("West".into())).unwrap();
        assert_eq!(west.get("sales_sum"), Some(30.0));

        // 10 on Jan 1 to 30 on Mar 1
        assert_eq!(session.growth_rate("sales", "date"), 200.0);
        assert_eq!(
            session.growth_outcome("sales", "nope").status,
            GrowthStatus::MissingColumn
        );

        let mut aliases = AliasMap::new();
        aliases.insert("s".into(), "sales".into());
        assert_eq!(
            session.evaluate_formula("max(s) - min(s)", &aliases),
            FormulaResult::Scalar { value: 20.0 }
        );

        let spec = session
            .chart(&ChartRequest::new(ChartKind::Line).x("date").y("sales"))
            .unwrap();
        assert_eq!(spec.title, "Line Chart: sales over date");
    }

    #[test]
    fn test_report_bundles_results() {
        let session = sales_session();
        let report = session
            .report(&["sales"], Some("region"), Some(("sales", "date")))
            .unwrap();
        assert!(report.source.is_none());
        assert_eq!(report.grouped.as_ref().map(|g| g.rows.len()), Some(2));
        assert_eq!(report.growth.map(|g| g.rate), Some(200.0));

        assert!(session.report(&["region"], None, None).is_err());
    }

    #[test]
    fn test_load_and_formula_events_are_delivered() {
        use crate::telemetry::test_support::Collector;
        use std::io::Write;

        let collector = Collector::start(2);
        let mut config = TallyConfig::default();
        config.telemetry.endpoint = Some(collector.endpoint.clone());
        let tally = Tally::with_config(config);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b\n1,5\n2,6\n").unwrap();
        let session = tally.load(file.path()).unwrap();

        let mut aliases = AliasMap::new();
        aliases.insert("x".into(), "a".into());
        assert_eq!(
            session.evaluate_formula("sum(x)", &aliases),
            FormulaResult::Scalar { value: 3.0 }
        );

        tally.flush_usage();

        let mut events: Vec<_> = collector
            .received()
            .into_iter()
            .map(|e| (e.event, e.page))
            .collect();
        events.sort();
        assert_eq!(
            events,
            vec![
                ("Custom Formula".to_string(), "KPI Dashboard".to_string()),
                ("File Uploaded".to_string(), "Data Upload".to_string()),
            ]
        );
    }

    #[test]
    fn test_tally_applies_formula_config() {
        let mut config = TallyConfig::default();
        config.formula.max_length = 4;
        let tally = Tally::with_config(config);
        let session = tally.session(DataTable::from_columns(vec![("a", vec!["1"])]));
        assert!(session.evaluate_formula("1 + 2 + 3", &AliasMap::new()).is_error());
    }
}
