//! End-to-end runs: corpus source, image filter, page-view ranking, report.

#[cfg(test)]
mod tests {
    use crate::client::{ListingPage, ViewWindow};
    use crate::core::Item;
    use crate::corpus::{open_source, CorpusQuery};
    use crate::errors::GapError;
    use crate::evaluation::PageViewEvaluator;
    use crate::filters::{ItemFilter, MissingImageFilter};
    use crate::observability::{CollectingRunObserver, NoOpRunObserver, ObservedEvent};
    use crate::pipeline::{Checkpoint, PipelineEngine};
    use crate::report::{render, FileReportSink, ReportCheckpoint, WikiReportSink};
    use crate::testing::{
        assert_ranked_desc, assert_snapshot_counts, assert_titles, FixedPopularity,
        InMemoryWiki, ManualClock, WikiCall,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;

    const REPORT: &str = "Projet:Illustration/Rapport";

    /// Three levels of categories; only image-less articles survive.
    fn painters() -> InMemoryWiki {
        InMemoryWiki::new()
            .with_category(
                "Peintre",
                vec![
                    Item::article("Monet"),
                    Item::category("Peintre français"),
                    Item::article("Turner"),
                ],
            )
            .with_category(
                "Peintre français",
                vec![Item::article("Manet"), Item::category("Peintre lyonnais")],
            )
            .with_category("Peintre lyonnais", vec![Item::article("Puvis")])
            .with_content("Monet", "[[Fichier:Nymphéas.jpg]]")
            .with_content("Turner", "Peintre anglais.")
            .with_content("Manet", "Peintre français.")
            .with_content("Puvis", "Peintre lyonnais.")
    }

    fn views() -> FixedPopularity {
        FixedPopularity::new()
            .with_views("Monet", 900)
            .with_views("Turner", 300)
            .with_views("Manet", 700)
            .with_views("Puvis", 50)
    }

    fn image_filter(wiki: &Arc<InMemoryWiki>) -> Vec<Arc<dyn ItemFilter>> {
        vec![Arc::new(MissingImageFilter::new(wiki.clone()))]
    }

    #[tokio::test]
    async fn test_category_run_writes_ranked_report() {
        let wiki = Arc::new(painters());
        let pages = wiki.pages();
        let query = CorpusQuery::Category {
            name: "Peintre".to_string(),
            depth: 1,
        };
        let evaluator = PageViewEvaluator::new(Arc::new(views()), ViewWindow::Days90);
        let checkpoint = Checkpoint::every_secs(
            600,
            Arc::new(ReportCheckpoint::new(
                Arc::new(WikiReportSink::new(wiki.clone())),
                REPORT,
            )),
        );

        let items = open_source(&query, wiki.clone(), Arc::new(NoOpRunObserver));
        let snapshot = PipelineEngine::default()
            .run(items, &image_filter(&wiki), &evaluator, &checkpoint)
            .await
            .unwrap();

        // Depth 1 stops before "Peintre lyonnais".
        assert_titles(&snapshot.ranked, &["Manet", "Turner"]);
        assert_snapshot_counts(&snapshot, 3, 2);
        assert_eq!(
            pages.lock().get(REPORT).cloned().unwrap(),
            render(&snapshot.ranked, Some(3), Some(2))
        );
    }

    #[tokio::test]
    async fn test_template_run_checkpoints_during_scan() {
        let wiki = Arc::new(
            InMemoryWiki::new()
                .with_template_pages(
                    "Template:À illustrer",
                    vec![
                        ListingPage::new(vec!["A".into(), "B".into()], Some("c1".into())),
                        ListingPage::new(vec!["C".into()], Some("c2".into())),
                        ListingPage::new(vec!["D".into(), "E".into()], None),
                    ],
                )
                .with_content("B", "<gallery>\n</gallery>"),
        );
        let pages = wiki.pages();
        let calls = wiki.calls();
        let stats = FixedPopularity::new()
            .with_views("A", 10)
            .with_views("C", 30)
            .with_views("D", 20)
            .with_views("E", 40);
        let evaluator = PageViewEvaluator::new(Arc::new(stats), ViewWindow::Days30);
        let checkpoint = Checkpoint::every_secs(
            2,
            Arc::new(ReportCheckpoint::new(
                Arc::new(WikiReportSink::new(wiki.clone())),
                REPORT,
            )),
        );
        // One simulated second per clock reading.
        let clock = Arc::new(ManualClock::with_step(Duration::from_secs(1)));
        let observer = Arc::new(CollectingRunObserver::new());

        let items = open_source(
            &CorpusQuery::Template {
                name: "À illustrer".to_string(),
            },
            wiki.clone(),
            observer.clone(),
        );
        let snapshot = PipelineEngine::new(observer.clone())
            .with_clock(clock)
            .run(items, &image_filter(&wiki), &evaluator, &checkpoint)
            .await
            .unwrap();

        assert_titles(&snapshot.ranked, &["E", "C", "D", "A"]);
        assert_snapshot_counts(&snapshot, 5, 4);
        assert!(pages.lock().get(REPORT).unwrap().contains("* Total articles: 5"));

        let checkpoints: Vec<bool> = observer
            .events()
            .iter()
            .filter_map(|e| match e {
                ObservedEvent::Checkpoint(_, is_final) => Some(*is_final),
                _ => None,
            })
            .collect();
        assert!(checkpoints.len() >= 2);
        assert_eq!(checkpoints.last(), Some(&true));

        let writes = calls
            .lock()
            .iter()
            .filter(|c| matches!(c, WikiCall::Write(_)))
            .count();
        assert_eq!(writes, checkpoints.len());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_earlier_report() {
        let wiki = Arc::new(painters().failing_writes_after(1));
        let pages = wiki.pages();
        let query = CorpusQuery::Category {
            name: "Peintre".to_string(),
            depth: 5,
        };
        let evaluator = PageViewEvaluator::new(Arc::new(views()), ViewWindow::Days60);
        let checkpoint = Checkpoint::new(
            Duration::ZERO,
            Arc::new(ReportCheckpoint::new(
                Arc::new(WikiReportSink::new(wiki.clone())),
                REPORT,
            )),
        );
        let clock = Arc::new(ManualClock::with_step(Duration::from_secs(1)));

        let items = open_source(&query, wiki.clone(), Arc::new(NoOpRunObserver));
        let err = PipelineEngine::default()
            .with_clock(clock)
            .run(items, &image_filter(&wiki), &evaluator, &checkpoint)
            .await
            .unwrap_err();

        assert!(matches!(err, GapError::CheckpointAction { .. }));
        let saved = pages.lock().get(REPORT).cloned().unwrap();
        assert!(saved.contains("[[Turner]]"));
        assert!(!saved.contains("[[Manet]]"));
    }

    #[tokio::test]
    async fn test_missing_view_series_aborts_run() {
        let wiki = Arc::new(painters());
        let stats = views().without_data("Manet");
        let evaluator = PageViewEvaluator::new(Arc::new(stats), ViewWindow::Days90);
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(FileReportSink::new(dir.path()));
        let checkpoint = Checkpoint::every_secs(600, Arc::new(ReportCheckpoint::new(sink.clone(), REPORT)));

        let items = open_source(
            &CorpusQuery::Category {
                name: "Peintre".to_string(),
                depth: 2,
            },
            wiki.clone(),
            Arc::new(NoOpRunObserver),
        );
        let err = PipelineEngine::default()
            .run(items, &image_filter(&wiki), &evaluator, &checkpoint)
            .await
            .unwrap_err();

        assert!(matches!(err, GapError::MissingData { .. }));
        assert!(!sink.path_for(REPORT).exists());
    }

    #[tokio::test]
    async fn test_content_failure_aborts_run_without_report() {
        let wiki = Arc::new(painters().failing_content("Manet"));
        let pages = wiki.pages();
        let calls = wiki.calls();
        let stats = Arc::new(views());
        let evaluator = PageViewEvaluator::new(stats.clone(), ViewWindow::Days90);
        let checkpoint = Checkpoint::every_secs(
            600,
            Arc::new(ReportCheckpoint::new(
                Arc::new(WikiReportSink::new(wiki.clone())),
                REPORT,
            )),
        );

        let items = open_source(
            &CorpusQuery::Category {
                name: "Peintre".to_string(),
                depth: 1,
            },
            wiki.clone(),
            Arc::new(NoOpRunObserver),
        );
        let err = PipelineEngine::default()
            .run(items, &image_filter(&wiki), &evaluator, &checkpoint)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GapError::UpstreamFetch { ref operation, .. } if operation == "fetch_content"
        ));
        assert!(pages.lock().is_empty());
        assert!(!calls.lock().iter().any(|c| matches!(c, WikiCall::Write(_))));
        assert!(!stats.requests().iter().any(|(title, _)| title == "Manet"));
    }

    #[tokio::test]
    async fn test_file_report_matches_final_snapshot() {
        let wiki = Arc::new(painters());
        let evaluator = PageViewEvaluator::new(Arc::new(views()), ViewWindow::Days90);
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(FileReportSink::new(dir.path()));
        let checkpoint = Checkpoint::every_secs(600, Arc::new(ReportCheckpoint::new(sink.clone(), REPORT)));

        let items = open_source(
            &CorpusQuery::Category {
                name: "Peintre".to_string(),
                depth: 2,
            },
            wiki.clone(),
            Arc::new(NoOpRunObserver),
        );
        let snapshot = PipelineEngine::default()
            .run(items, &image_filter(&wiki), &evaluator, &checkpoint)
            .await
            .unwrap();

        assert_ranked_desc(&snapshot.ranked);
        assert_titles(&snapshot.ranked, &["Manet", "Turner", "Puvis"]);
        let text = std::fs::read_to_string(sink.path_for(REPORT)).unwrap();
        assert_eq!(text, render(&snapshot.ranked, Some(4), Some(3)));
    }
}
