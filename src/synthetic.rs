use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::batch::TrainingRow;
use crate::features::channel::PostPublishStats;
use crate::VideoRecord;

const TITLE_TEMPLATES: &[&str] = &[
    "Python {topic} Tutorial - {n}",
    "Learn {topic} in {n} Minutes",
    "{topic} for Beginners - Complete Guide",
    "{topic} Explained - {n} Tips",
    "How to {topic} in {n} Steps",
    "{topic} Masterclass - {n}",
    "{topic} Crash Course - {n}",
    "{topic} Best Practices - {n}",
    "{topic} vs {other} - Comparison",
    "{topic} Advanced Techniques - {n}",
];

const TOPICS: &[&str] = &[
    "JavaScript",
    "Python",
    "React",
    "Node.js",
    "Django",
    "Flask",
    "Machine Learning",
    "Web Development",
    "Data Science",
    "AI",
];

const EMOJIS: &[&str] = &["🔥", "💡", "🚀", "⚡", "⭐", "🎯"];

const DURATION_BUCKETS: &[(f64, f64)] = &[
    (3.0, 8.0),
    (8.0, 15.0),
    (15.0, 30.0),
    (30.0, 60.0),
    (60.0, 120.0),
];

const MIN_VIEWS: u64 = 100;

pub fn generate_rows(count: usize, seed: u64, now: NaiveDateTime) -> Vec<TrainingRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|idx| sample_row(&mut rng, idx, now)).collect()
}

fn sample_row(rng: &mut StdRng, idx: usize, now: NaiveDateTime) -> TrainingRow {
    let channel_subscribers: u64 = rng.gen_range(10_000..=5_000_000);
    let channel_video_count: u64 = rng.gen_range(50..=1000);
    let channel_view_count = channel_subscribers * rng.gen_range(10..=100);

    let topic = pick(rng, TOPICS);
    let title = sample_title(rng, topic);

    let (low, high) = *DURATION_BUCKETS
        .choose(rng)
        .unwrap_or(&DURATION_BUCKETS[1]);
    let duration_minutes = rng.gen_range(low..high);

    let days_ago: i64 = rng.gen_range(1..=730);
    let publish_hour: u8 = rng.gen_range(0..24);
    let minute: u32 = rng.gen_range(0..60);
    let published = (now - Duration::days(days_ago))
        .date()
        .and_time(NaiveTime::from_hms_opt(publish_hour as u32, minute, 0).unwrap_or_default());

    let tag_count = rng.gen_range(3..=15usize);
    let tags: Vec<String> = TOPICS
        .choose_multiple(rng, tag_count.min(TOPICS.len()))
        .map(|tag| tag.to_string())
        .collect();

    let description_length = rng.gen_range(100..=1000usize);
    let description = format!("This is a tutorial about {}. ", topic).repeat(description_length / 30);

    let mut base_views = channel_subscribers as f64 * rng.gen_range(0.01..0.5);
    if (18..=21).contains(&publish_hour) {
        base_views *= 1.25;
    }
    let title_len = title.chars().count();
    if (50..=60).contains(&title_len) {
        base_views *= 1.18;
    } else if title_len > 70 {
        base_views *= 0.9;
    }
    if (10.0..=15.0).contains(&duration_minutes) {
        base_views *= 1.15;
    } else if duration_minutes > 30.0 {
        base_views *= 0.85;
    }
    if published.weekday().number_from_monday() >= 6 {
        base_views *= 0.95;
    }

    let view_count = ((base_views * rng.gen_range(0.5..1.5)) as u64).max(MIN_VIEWS);
    let first_week_ratio = rng.gen_range(0.3..0.5);
    let first_week_views = if days_ago < 7 {
        view_count
    } else {
        (view_count as f64 * first_week_ratio) as u64
    };

    let like_count = (view_count as f64 * rng.gen_range(0.02..0.05)) as u64;
    let comment_count = (view_count as f64 * rng.gen_range(0.001..0.005)) as u64;

    TrainingRow::new(
        format!("video_{:04}", idx),
        VideoRecord {
            title,
            description,
            published_at: Some(published.format("%Y-%m-%dT%H:%M:%S").to_string()),
            publish_hour: Some(publish_hour),
            duration_seconds: (duration_minutes * 60.0).trunc(),
            tag_count: Some(tags.len() as u32),
            tags,
            channel_subscribers,
            channel_video_count,
            channel_view_count,
        },
        Some(PostPublishStats {
            view_count,
            like_count,
            comment_count,
        }),
        first_week_views as f64,
    )
}

fn sample_title(rng: &mut StdRng, topic: &str) -> String {
    let template = pick(rng, TITLE_TEMPLATES);
    let other = pick(rng, TOPICS);
    let number = rng.gen_range(5..=30).to_string();
    let title = template
        .replace("{topic}", topic)
        .replace("{other}", other)
        .replace("{n}", &number);

    if rng.gen::<f64>() < 0.3 {
        format!("{} {}", pick(rng, EMOJIS), title)
    } else {
        title
    }
}

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}
