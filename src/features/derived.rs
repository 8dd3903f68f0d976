use crate::features::{flag, EncodedRecord, FeatureBag};

/// Months per video in the channel-age estimate. Uncalibrated heuristic
/// kept for parity with trained artifacts.
const VIDEOS_PER_MONTH: f64 = 4.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompositeScores {
    pub content_completeness: f64,
    pub seo: f64,
    pub engagement_potential: f64,
}

impl CompositeScores {
    pub fn compute(encoded: &EncodedRecord) -> Self {
        let title = &encoded.title;
        let content = &encoded.content;
        let temporal = &encoded.temporal;
        let minutes = encoded.duration.minutes;
        let description_length = content.description_length;
        let tag_count = content.tag_count;

        let content_completeness = 0.3 * flag(description_length > 100)
            + 0.3 * flag(tag_count >= 5)
            + 0.2 * flag(title.length >= 40)
            + 0.2 * flag(title.is_tutorial);

        let seo = 0.3 * flag((50..=60).contains(&title.length))
            + 0.2 * flag((8..=12).contains(&tag_count))
            + 0.2 * flag(description_length > 200)
            + 0.15 * flag(title.has_number)
            + 0.15 * flag(title.is_question);

        let engagement_potential = 0.3 * flag(temporal.is_prime_time)
            + 0.3 * flag((10.0..=15.0).contains(&minutes))
            + 0.2 * flag(title.is_tutorial)
            + 0.1 * flag(title.has_emoji)
            + 0.1 * flag(!temporal.is_weekend);

        Self {
            content_completeness,
            seo,
            engagement_potential,
        }
    }
}

pub fn write_derived(encoded: &EncodedRecord, bag: &mut FeatureBag) {
    write_interactions(encoded, bag);
    write_polynomials(encoded, bag);
    write_ratios(encoded, bag);
    write_title_lexicon(encoded, bag);
    write_channel_estimates(encoded, bag);

    let scores = CompositeScores::compute(encoded);
    bag.set("content_completeness_score", scores.content_completeness);
    bag.set("seo_score", scores.seo);
    bag.set("engagement_potential_score", scores.engagement_potential);
}

fn write_interactions(encoded: &EncodedRecord, bag: &mut FeatureBag) {
    let title = &encoded.title;
    let subscribers_log = encoded.channel.subscribers_log();
    let title_length = title.length as f64;
    let minutes = encoded.duration.minutes;
    let prime_time = flag(encoded.temporal.is_prime_time);
    let tag_count = encoded.content.tag_count as f64;
    let title_quality = flag(title.is_tutorial) + flag(title.has_number) + flag(title.is_question);

    bag.set("title_length_x_subscribers", title_length * subscribers_log);
    bag.set("duration_x_prime_time", minutes * prime_time);
    bag.set("title_quality_x_channel_size", title_quality * subscribers_log);
    bag.set(
        "weekend_x_prime_time",
        flag(encoded.temporal.is_weekend) * prime_time,
    );
    bag.set("duration_x_channel_size", minutes * subscribers_log);
    bag.set("tag_count_x_title_length", tag_count * title_length);
    bag.set(
        "description_length_x_tags",
        encoded.content.description_length as f64 * tag_count,
    );
}

fn write_polynomials(encoded: &EncodedRecord, bag: &mut FeatureBag) {
    let title_length = encoded.title.length as f64;
    let minutes = encoded.duration.minutes;
    let subscribers = encoded.channel.subscribers as f64;

    bag.set("title_length_squared", title_length * title_length);
    bag.set("duration_minutes_squared", minutes * minutes);
    bag.set("channel_subscribers_log", subscribers.ln_1p());
    bag.set("channel_subscribers_sqrt", subscribers.sqrt());
    bag.set("channel_subscribers_cbrt", subscribers.cbrt());
}

fn write_ratios(encoded: &EncodedRecord, bag: &mut FeatureBag) {
    let title_length = encoded.title.length as f64;
    let title_denominator = title_length + 1.0;

    bag.set(
        "title_length_to_words",
        title_length / (encoded.title.word_count as f64 + 1.0),
    );
    bag.set(
        "description_to_title_ratio",
        encoded.content.description_length as f64 / title_denominator,
    );
    bag.set(
        "tags_to_title_ratio",
        encoded.content.tag_count as f64 / title_denominator,
    );
    bag.set(
        "video_frequency",
        encoded.channel.video_count as f64 / (encoded.channel.subscribers_log() + 1.0),
    );
}

fn write_title_lexicon(encoded: &EncodedRecord, bag: &mut FeatureBag) {
    let lexicon = &encoded.lexicon;
    bag.set("title_positive_words", lexicon.positive_words as f64);
    bag.set("title_negative_words", lexicon.negative_words as f64);
    bag.set("title_power_words", lexicon.power_words as f64);
    bag.set_flag("title_has_digit", lexicon.has_digit);
    bag.set("title_number_count", lexicon.number_count as f64);
    bag.set_flag("title_starts_with_capital", lexicon.starts_with_capital);
    bag.set_flag("title_has_colon", lexicon.has_colon);
    bag.set_flag("title_has_dash", lexicon.has_dash);
}

fn write_channel_estimates(encoded: &EncodedRecord, bag: &mut FeatureBag) {
    let channel = &encoded.channel;
    let subscribers = channel.subscribers as f64;

    bag.set(
        "estimated_channel_age_months",
        channel.video_count as f64 / VIDEOS_PER_MONTH,
    );
    // Same formula as subscribers_per_video; trained schemas carry both.
    bag.set(
        "subscriber_growth_rate",
        subscribers / (channel.video_count as f64 + 1.0),
    );
    bag.set(
        "estimated_engagement_rate",
        channel.view_count as f64 / (subscribers + 1.0),
    );
}
