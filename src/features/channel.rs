use serde::{Deserialize, Serialize};

use crate::features::FeatureBag;

/// Right-inclusive subscriber buckets `[0, 10k, 100k, 1M, inf)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChannelSize {
    Small,
    Medium,
    Large,
    Mega,
}

impl ChannelSize {
    pub fn from_subscribers(subscribers: u64) -> Self {
        if subscribers <= 10_000 {
            ChannelSize::Small
        } else if subscribers <= 100_000 {
            ChannelSize::Medium
        } else if subscribers <= 1_000_000 {
            ChannelSize::Large
        } else {
            ChannelSize::Mega
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChannelSize::Small => "small",
            ChannelSize::Medium => "medium",
            ChannelSize::Large => "large",
            ChannelSize::Mega => "mega",
        }
    }

    pub fn numeric(self) -> f64 {
        match self {
            ChannelSize::Small => 1.0,
            ChannelSize::Medium => 2.0,
            ChannelSize::Large => 3.0,
            ChannelSize::Mega => 4.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelFeatures {
    pub subscribers: u64,
    pub video_count: u64,
    pub view_count: u64,
    pub size: ChannelSize,
    pub subscribers_per_video: f64,
}

impl ChannelFeatures {
    pub fn new(subscribers: u64, video_count: u64, view_count: u64) -> Self {
        Self {
            subscribers,
            video_count,
            view_count,
            size: ChannelSize::from_subscribers(subscribers),
            subscribers_per_video: subscribers as f64 / (video_count as f64 + 1.0),
        }
    }

    pub fn subscribers_log(&self) -> f64 {
        (self.subscribers as f64).ln_1p()
    }

    pub fn write_into(&self, bag: &mut FeatureBag) {
        bag.set("channel_subscribers", self.subscribers as f64);
        bag.set("channel_video_count", self.video_count as f64);
        bag.set("channel_view_count", self.view_count as f64);
        bag.set("subscribers_per_video", self.subscribers_per_video);
        bag.set("channel_size_numeric", self.size.numeric());
        bag.set_category("channel_size", self.size.label());
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PostPublishStats {
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

/// Keys written only from post-publish counts. Serving never sees them, so
/// they never become schema columns.
pub const POST_PUBLISH_FEATURES: [&str; 2] = ["likes_per_1k_views", "comments_per_1k_views"];

#[derive(Debug, Clone, Copy)]
pub struct EngagementRates {
    pub likes_per_1k_views: f64,
    pub comments_per_1k_views: f64,
}

impl EngagementRates {
    pub fn from_stats(stats: &PostPublishStats) -> Self {
        let views = stats.view_count as f64 + 1.0;
        Self {
            likes_per_1k_views: stats.like_count as f64 / views * 1000.0,
            comments_per_1k_views: stats.comment_count as f64 / views * 1000.0,
        }
    }

    pub fn write_into(&self, bag: &mut FeatureBag) {
        let [likes, comments] = POST_PUBLISH_FEATURES;
        bag.set(likes, self.likes_per_1k_views);
        bag.set(comments, self.comments_per_1k_views);
    }
}
