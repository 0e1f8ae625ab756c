//! The image content gap bot: one corpus query, scanned and reported.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::client::{Credentials, PopularityProvider, ViewWindow, WikiClient};
use crate::corpus::{open_source, CorpusQuery};
use crate::core::RunSnapshot;
use crate::errors::{GapError, GapResult};
use crate::evaluation::{ConstantEvaluator, Evaluator, PageViewEvaluator};
use crate::filters::{ItemFilter, MissingImageFilter};
use crate::observability::{LoggingRunObserver, RunObserver};
use crate::pipeline::{Checkpoint, Clock, PipelineEngine};
use crate::report::{ReportCheckpoint, ReportSink, WikiReportSink};

/// Bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Page (or file stem) the report is written to.
    pub report_page: String,
    /// Seconds between two inline report saves.
    #[serde(default = "default_frequency")]
    pub frequency_seconds: u64,
    /// Page-view window used for ranking: 30, 60 or 90 days.
    #[serde(default = "default_window")]
    pub view_window_days: u32,
    /// TOML file holding a `[login]` table.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

fn default_frequency() -> u64 {
    600
}

fn default_window() -> u32 {
    90
}

impl BotConfig {
    /// Creates a configuration reporting to `report_page`.
    #[must_use]
    pub fn new(report_page: impl Into<String>) -> Self {
        Self {
            report_page: report_page.into(),
            frequency_seconds: default_frequency(),
            view_window_days: default_window(),
            credentials_path: None,
        }
    }

    /// Sets the save frequency.
    #[must_use]
    pub fn with_frequency(mut self, seconds: u64) -> Self {
        self.frequency_seconds = seconds;
        self
    }

    /// Sets the page-view window.
    #[must_use]
    pub fn with_view_window(mut self, days: u32) -> Self {
        self.view_window_days = days;
        self
    }

    /// Sets the credentials file.
    #[must_use]
    pub fn with_credentials(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Checks the report page and the view window.
    pub fn validate(&self) -> GapResult<ViewWindow> {
        if self.report_page.trim().is_empty() {
            return Err(GapError::invalid_configuration("report page must not be empty"));
        }
        ViewWindow::try_from(self.view_window_days)
    }
}

/// Scans a corpus for articles without images and keeps a report of the
/// most viewed ones up to date.
pub struct GapBot<W> {
    config: BotConfig,
    window: ViewWindow,
    wiki: Arc<W>,
    popularity: Arc<dyn PopularityProvider>,
    sink: Arc<dyn ReportSink>,
    observer: Arc<dyn RunObserver>,
    engine: PipelineEngine,
    logged_in: bool,
}

impl<W> GapBot<W>
where
    W: WikiClient + 'static,
{
    /// Creates a bot saving its reports to the wiki itself.
    pub fn new(
        config: BotConfig,
        wiki: Arc<W>,
        popularity: Arc<dyn PopularityProvider>,
    ) -> GapResult<Self> {
        let window = config.validate()?;
        let sink: Arc<dyn ReportSink> = Arc::new(WikiReportSink::new(wiki.clone()));
        let observer: Arc<dyn RunObserver> = Arc::new(LoggingRunObserver);
        Ok(Self {
            config,
            window,
            wiki,
            popularity,
            sink,
            engine: PipelineEngine::new(Arc::clone(&observer)),
            observer,
            logged_in: false,
        })
    }

    /// Saves reports through `sink` instead.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Reports progress to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.engine = PipelineEngine::new(Arc::clone(&observer));
        self.observer = observer;
        self
    }

    /// Times checkpoints with `clock`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.engine = self.engine.with_clock(clock);
        self
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Whether a login succeeded.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Logs in with the configured credentials file.
    pub async fn login(&mut self) -> GapResult<()> {
        let path = self
            .config
            .credentials_path
            .as_ref()
            .ok_or_else(|| GapError::invalid_configuration("Trying to login without config_file"))?;
        let credentials = Credentials::from_file(path)?;
        self.wiki.login(&credentials).await?;
        self.logged_in = true;
        tracing::info!(user = %credentials.user, "Logged in");
        Ok(())
    }

    /// Scans `query` and returns the final snapshot.
    ///
    /// Logs in first when a credentials file is configured and no login
    /// happened yet. Recent-change scans rank every article 0; the others
    /// rank by page views over the configured window.
    pub async fn run(&mut self, query: &CorpusQuery) -> GapResult<RunSnapshot> {
        if !self.logged_in && self.config.credentials_path.is_some() {
            self.login().await?;
        }
        tracing::info!(%query, report = %self.config.report_page, "Starting scan");

        let filters: Vec<Arc<dyn ItemFilter>> =
            vec![Arc::new(MissingImageFilter::new(self.wiki.clone()))];
        let evaluator: Box<dyn Evaluator> = match query {
            CorpusQuery::RecentChanges { .. } => Box::new(ConstantEvaluator(0)),
            _ => Box::new(PageViewEvaluator::new(
                Arc::clone(&self.popularity),
                self.window,
            )),
        };
        let checkpoint = Checkpoint::every_secs(
            self.config.frequency_seconds,
            Arc::new(ReportCheckpoint::new(
                Arc::clone(&self.sink),
                self.config.report_page.clone(),
            )),
        );

        let items = open_source(query, self.wiki.clone(), Arc::clone(&self.observer));
        self.engine
            .run(items, &filters, evaluator.as_ref(), &checkpoint)
            .await
    }
}

impl<W> std::fmt::Debug for GapBot<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GapBot")
            .field("config", &self.config)
            .field("logged_in", &self.logged_in)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Item;
    use crate::observability::NoOpRunObserver;
    use crate::testing::{assert_titles, FixedPopularity, InMemoryWiki, WikiCall};
    use std::io::Write;

    fn wiki() -> InMemoryWiki {
        InMemoryWiki::new()
            .with_category("Sculpteur", vec![Item::article("Rodin"), Item::article("Claudel")])
            .with_content("Rodin", "[[Fichier:Penseur.jpg]]")
            .with_change(crate::utils::now_utc(), "Claudel")
            .with_change(crate::utils::now_utc(), "Rodin")
    }

    fn credentials_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[login]\nuser = \"GapBot\"\npassword = \"secret\"").unwrap();
        file
    }

    fn bot(config: BotConfig, wiki: InMemoryWiki) -> GapBot<InMemoryWiki> {
        let popularity = FixedPopularity::new().with_views("Claudel", 77);
        GapBot::new(config, Arc::new(wiki), Arc::new(popularity))
            .unwrap()
            .with_observer(Arc::new(NoOpRunObserver))
    }

    #[test]
    fn test_config_defaults_from_toml() {
        let config: BotConfig = toml::from_str("report_page = \"Rapport\"").unwrap();
        assert_eq!(config.frequency_seconds, 600);
        assert_eq!(config.view_window_days, 90);
        assert!(config.credentials_path.is_none());
    }

    #[test]
    fn test_invalid_window_is_rejected() {
        let config = BotConfig::new("Rapport").with_view_window(45);
        let popularity: Arc<dyn PopularityProvider> = Arc::new(FixedPopularity::new());
        let err = GapBot::new(config, Arc::new(InMemoryWiki::new()), popularity).unwrap_err();
        assert!(matches!(err, GapError::InvalidConfiguration(_)));
    }

    #[tokio::test]
    async fn test_login_without_credentials_fails() {
        let mut bot = bot(BotConfig::new("Rapport"), wiki());
        let err = bot.login().await.unwrap_err();
        assert!(matches!(err, GapError::InvalidConfiguration(_)));
        assert!(!bot.is_logged_in());
    }

    #[tokio::test]
    async fn test_run_logs_in_once_then_reports() {
        let file = credentials_file();
        let wiki = wiki();
        let calls = wiki.calls();
        let pages = wiki.pages();
        let mut bot = bot(BotConfig::new("Rapport").with_credentials(file.path()), wiki);

        let query = CorpusQuery::Category {
            name: "Sculpteur".to_string(),
            depth: 0,
        };
        let snapshot = bot.run(&query).await.unwrap();
        bot.run(&query).await.unwrap();

        assert!(bot.is_logged_in());
        assert_titles(&snapshot.ranked, &["Claudel"]);
        assert_eq!(snapshot.ranked[0].score, 77);
        let logins = calls
            .lock()
            .iter()
            .filter(|c| matches!(c, WikiCall::Login(user) if user == "GapBot"))
            .count();
        assert_eq!(logins, 1);
        assert!(pages.lock().get("Rapport").unwrap().contains("[[Claudel]]"));
    }

    #[tokio::test]
    async fn test_rejected_login_aborts_run() {
        let file = credentials_file();
        let mut bot = bot(
            BotConfig::new("Rapport").with_credentials(file.path()),
            wiki().rejecting_login(),
        );
        let err = bot
            .run(&CorpusQuery::Random { count: 1 })
            .await
            .unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_recent_changes_rank_zero() {
        let mut bot = bot(BotConfig::new("Rapport"), wiki());
        let snapshot = bot
            .run(&CorpusQuery::RecentChanges { hours: 1 })
            .await
            .unwrap();
        assert_titles(&snapshot.ranked, &["Claudel"]);
        assert_eq!(snapshot.ranked[0].score, 0);
        assert_eq!(snapshot.total_seen, 2);
    }
}
