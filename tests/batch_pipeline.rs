use chrono::{Duration, NaiveDate, NaiveDateTime};
use view_forecast::batch::filters::quantile;
use view_forecast::batch::{
    read_rows_jsonl, write_rows_jsonl, ChannelGaps, ChannelMedianFill, DatasetCleaner,
    Deduplicate, DurationRange, MinEngagement, PositiveViews, QualityFilter, Recency,
    SubscriberCap, TargetIqr, TrainingMatrix, TrainingRow,
};
use view_forecast::config::BatchConfig;
use view_forecast::evaluation::{compute_metrics, evaluate};
use view_forecast::features::channel::PostPublishStats;
use view_forecast::model::{LinearArtifact, ModelMetadata, RobustScaler};
use view_forecast::{assemble_vector, engineer_features_at, synthetic, ForecastError, VideoRecord};

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn row(id: &str, minutes: f64, target: f64) -> TrainingRow {
    let mut record = VideoRecord {
        title: format!("Video {}", id),
        published_at: Some("2024-05-01T18:00:00".to_string()),
        ..VideoRecord::default()
    };
    record.set_duration_minutes(minutes);
    TrainingRow::new(
        id,
        record,
        Some(PostPublishStats {
            view_count: 10_000,
            like_count: 400,
            comment_count: 20,
        }),
        target,
    )
}

fn with_subscribers(id: &str, subscribers: u64) -> TrainingRow {
    let mut row = row(id, 10.0, 1.0);
    row.record.channel_subscribers = subscribers;
    row
}

fn ids(rows: &[TrainingRow]) -> Vec<&str> {
    rows.iter().map(|row| row.video_id.as_str()).collect()
}

#[test]
fn deduplicate_keeps_the_first_row() {
    let rows = vec![row("a", 10.0, 1.0), row("b", 10.0, 2.0), row("a", 10.0, 3.0)];
    let kept = Deduplicate.apply(rows);
    assert_eq!(ids(&kept), vec!["a", "b"]);
    assert_eq!(kept[0].target_first_week_views, 1.0);
}

#[test]
fn duration_range_is_inclusive() {
    let filter = DurationRange {
        min_minutes: 0.5,
        max_minutes: 480.0,
    };
    let rows = vec![
        row("too_short", 0.25, 1.0),
        row("edge_low", 0.5, 1.0),
        row("edge_high", 480.0, 1.0),
        row("too_long", 481.0, 1.0),
    ];
    assert_eq!(ids(&filter.apply(rows)), vec!["edge_low", "edge_high"]);
}

#[test]
fn zero_views_and_bot_like_engagement_are_dropped() {
    let mut zero_views = row("zero", 10.0, 100.0);
    zero_views.stats = Some(PostPublishStats::default());
    let mut no_target = row("no_target", 10.0, 0.0);
    no_target.stats = None;
    let mut no_stats = row("no_stats", 10.0, 100.0);
    no_stats.stats = None;
    let mut bots = row("bots", 10.0, 100.0);
    bots.stats = Some(PostPublishStats {
        view_count: 1_000_000,
        like_count: 10,
        comment_count: 0,
    });

    let rows = vec![row("ok", 10.0, 100.0), zero_views, no_target, no_stats, bots];
    let rows = PositiveViews.apply(rows);
    assert_eq!(ids(&rows), vec!["ok", "no_stats", "bots"]);

    let rows = MinEngagement { min_like_ratio: 0.001 }.apply(rows);
    assert_eq!(ids(&rows), vec!["ok", "no_stats"]);
}

#[test]
fn quantile_interpolates_linearly() {
    let sorted = [100.0, 110.0, 120.0, 130.0, 140.0, 100_000.0];
    assert!((quantile(&sorted, 0.25) - 112.5).abs() < 1e-9);
    assert!((quantile(&sorted, 0.75) - 137.5).abs() < 1e-9);
    assert_eq!(quantile(&sorted, 0.0), 100.0);
    assert_eq!(quantile(&[], 0.5), 0.0);
}

#[test]
fn target_outliers_are_removed() {
    let rows: Vec<TrainingRow> = [100.0, 110.0, 120.0, 130.0, 140.0, 100_000.0]
        .iter()
        .enumerate()
        .map(|(idx, target)| row(&format!("v{}", idx), 10.0, *target))
        .collect();

    let kept = TargetIqr { multiplier: 3.0 }.apply(rows);
    assert_eq!(kept.len(), 5);
    assert!(kept.iter().all(|row| row.target_first_week_views < 1_000.0));

    let few = vec![row("a", 10.0, 1.0), row("b", 10.0, 1e9)];
    assert_eq!(TargetIqr { multiplier: 3.0 }.apply(few).len(), 2);
}

#[test]
fn recency_drops_old_and_undated_rows() {
    let mut old = row("old", 10.0, 1.0);
    old.record.published_at = Some("2019-01-01T00:00:00".to_string());
    let mut undated = row("undated", 10.0, 1.0);
    undated.record.published_at = None;

    let filter = Recency {
        now: fixed_now(),
        max_age: Duration::days(365),
    };
    let kept = filter.apply(vec![row("recent", 10.0, 1.0), old, undated]);
    assert_eq!(ids(&kept), vec!["recent"]);
}

#[test]
fn standard_cleaner_order() {
    let cleaner = DatasetCleaner::standard(&BatchConfig::default());
    assert_eq!(
        cleaner.filter_names(),
        vec![
            "deduplicate",
            "duration_range",
            "positive_views",
            "min_engagement",
            "target_iqr",
            "channel_median_fill",
            "subscriber_cap"
        ]
    );

    let cleaner = cleaner.with_filter(Box::new(Recency {
        now: fixed_now(),
        max_age: Duration::days(30),
    }));
    assert_eq!(cleaner.filter_names().last(), Some(&"recency"));
}

#[test]
fn matrix_leaves_out_engagement_rates_and_round_trips_through_disk() {
    let rows = vec![row("a", 10.0, 1_000.0), row("b", 20.0, 2_000.0)];
    let matrix = TrainingMatrix::build(&rows, fixed_now());

    assert_eq!(matrix.len(), 2);
    assert_eq!(matrix.targets, vec![1_000.0, 2_000.0]);
    assert!(rows[0].engineer(fixed_now()).get("likes_per_1k_views").is_some());
    assert!(matrix.schema.position("likes_per_1k_views").is_none());
    assert!(matrix.schema.position("comments_per_1k_views").is_none());
    assert!(matrix.schema.position("channel_size").is_none());
    assert!(matrix.rows.iter().all(|vector| vector.len() == matrix.schema.len()));

    let dir = tempfile::tempdir().unwrap();
    matrix.write(dir.path()).unwrap();
    let loaded = TrainingMatrix::load(dir.path()).unwrap();

    assert_eq!(loaded.schema, matrix.schema);
    assert_eq!(loaded.video_ids, vec!["a", "b"]);
    for (loaded_row, built_row) in loaded.rows.iter().zip(&matrix.rows) {
        for (a, b) in loaded_row.values().iter().zip(built_row.values()) {
            assert!((a - b).abs() <= 1e-9 * b.abs().max(1.0));
        }
    }
}

#[test]
fn batch_and_serving_vectors_are_identical() {
    let mut with_tags = row("tagged", 12.5, 3_000.0);
    with_tags.record.tags = vec!["rust".to_string(), "tutorial".to_string()];
    with_tags.record.description = "Step by step guide".to_string();
    let mut no_stats = row("no_stats", 4.0, 900.0);
    no_stats.stats = None;
    let mut undated = row("undated", 30.0, 1_500.0);
    undated.record.published_at = None;

    let rows = vec![row("plain", 10.0, 1_000.0), with_tags, no_stats, undated];
    let matrix = TrainingMatrix::build(&rows, fixed_now());

    for (batch_row, source) in matrix.rows.iter().zip(&rows) {
        let serving = assemble_vector(&engineer_features_at(&source.record, fixed_now()), &matrix.schema);
        assert_eq!(serving.len(), batch_row.len());
        for (name, (batch, served)) in matrix
            .schema
            .names()
            .iter()
            .zip(batch_row.values().iter().zip(serving.values()))
        {
            assert_eq!(batch.to_bits(), served.to_bits(), "{} differs for {}", name, source.video_id);
        }
    }
}

#[test]
fn missing_channel_counts_take_the_median() {
    let mut rows = vec![
        with_subscribers("a", 1_000),
        with_subscribers("b", 3_000),
        with_subscribers("c", 50_000),
        with_subscribers("gap", 0),
    ];
    rows[3].channel_gaps = ChannelGaps {
        subscribers: true,
        video_count: false,
        view_count: false,
    };

    let filled = ChannelMedianFill.apply(rows);
    assert_eq!(filled[3].record.channel_subscribers, 3_000);
    assert_eq!(filled[0].record.channel_subscribers, 1_000);
    assert!(filled.iter().all(|row| !row.channel_gaps.any()));
}

#[test]
fn subscriber_cap_clamps_the_extreme_tail() {
    let mut rows: Vec<TrainingRow> = (0..9)
        .map(|idx| with_subscribers(&format!("v{}", idx), 10_000))
        .collect();
    rows.push(with_subscribers("giant", 1_000_000_000));

    // p50 is 10k, so the cap sits at 20k
    let capped = SubscriberCap {
        quantile: 0.5,
        multiplier: 2.0,
    }
    .apply(rows);
    assert_eq!(capped[9].record.channel_subscribers, 20_000);
    assert!(capped[..9].iter().all(|row| row.record.channel_subscribers == 10_000));
    assert!(SubscriberCap {
        quantile: 0.99,
        multiplier: 2.0
    }
    .apply(Vec::new())
    .is_empty());
}

#[test]
fn absent_and_null_channel_counts_are_gaps() {
    let parsed = TrainingRow::from_json(
        r#"{"video_id":"x","target_first_week_views":10,"channel_video_count":null,"channel_view_count":500}"#,
    )
    .unwrap();
    assert_eq!(
        parsed.channel_gaps,
        ChannelGaps {
            subscribers: true,
            video_count: true,
            view_count: false,
        }
    );
    assert_eq!(parsed.record.channel_view_count, 500);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("videos.jsonl");
    let mut present = row("present", 10.0, 1.0);
    present.record.channel_subscribers = 42;
    write_rows_jsonl(&path, &[present]).unwrap();
    let loaded = read_rows_jsonl(&path).unwrap();
    assert!(!loaded[0].channel_gaps.any());
    assert_eq!(loaded[0].record.channel_subscribers, 42);
}

#[test]
fn rows_read_back_from_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw").join("videos.jsonl");
    write_rows_jsonl(&path, &[row("a", 10.0, 1.0)]).unwrap();

    let rows = read_rows_jsonl(&path).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].record.title, "Video a");
    assert_eq!(rows[0].stats.map(|stats| stats.like_count), Some(400));

    std::fs::write(&path, "{\"video_id\": \"x\"}\n").unwrap();
    assert!(matches!(read_rows_jsonl(&path), Err(ForecastError::Parse { .. })));
}

#[test]
fn metrics_for_known_predictions() {
    let perfect = compute_metrics(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
    assert!((perfect.r2 - 1.0).abs() < 1e-9);
    assert_eq!(perfect.mae, 0.0);
    assert!((perfect.correlation - 1.0).abs() < 1e-9);
    assert_eq!(perfect.pairwise_ranking_accuracy, 1.0);

    let offset = compute_metrics(&[2.0, 3.0, 4.0], &[1.0, 2.0, 3.0]);
    assert!((offset.mae - 1.0).abs() < 1e-9);
    assert!((offset.rmse - 1.0).abs() < 1e-9);
    assert!(offset.residual_std.abs() < 1e-9);
    assert_eq!(offset.sample_count, 3);
}

#[test]
fn evaluation_fills_the_metadata() {
    let rows = synthetic::generate_rows(40, 7, fixed_now());
    let matrix = TrainingMatrix::build(&rows, fixed_now());
    let count = matrix.schema.len();
    let model = LinearArtifact {
        model_name: "Mean".to_string(),
        feature_names: matrix.schema.names().to_vec(),
        scaler: RobustScaler {
            center: vec![0.0; count],
            scale: vec![1.0; count],
        },
        coefficients: vec![0.0; count],
        intercept: 1_000.0,
        log_target: false,
    };

    let metrics = evaluate(&model, &matrix).unwrap();
    assert_eq!(metrics.sample_count, 40);
    assert_eq!(metrics.feature_count, count);
    assert!(metrics.residual_std > 0.0);

    let mut metadata = ModelMetadata {
        model_name: "Mean".to_string(),
        ..ModelMetadata::default()
    };
    metrics.apply_to(&mut metadata);
    assert_eq!(metadata.prediction_interval_std, Some(metrics.residual_std));
    assert_eq!(metadata.feature_count, count);
    assert_eq!(metadata.cv_scores["Mean"].mean, metrics.r2);

    let mismatched = LinearArtifact {
        feature_names: vec!["other".to_string(); 1],
        scaler: RobustScaler {
            center: vec![0.0],
            scale: vec![1.0],
        },
        coefficients: vec![0.0],
        ..model
    };
    assert!(matches!(
        evaluate(&mismatched, &matrix),
        Err(ForecastError::SchemaMismatch(_))
    ));
}

#[test]
fn synthetic_rows_are_seeded_and_survive_cleaning() {
    let first = synthetic::generate_rows(50, 42, fixed_now());
    let second = synthetic::generate_rows(50, 42, fixed_now());
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_ne!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&synthetic::generate_rows(50, 43, fixed_now())).unwrap()
    );

    for row in &first {
        assert!(!row.record.title.is_empty());
        assert!(row.record.publish_hour.is_some_and(|hour| hour < 24));
        assert!(row.target_first_week_views >= 30.0);
        assert!(row.record.channel_subscribers >= 10_000);
    }

    let cleaned = DatasetCleaner::standard(&BatchConfig::default()).clean(first);
    assert!(!cleaned.is_empty());
}
