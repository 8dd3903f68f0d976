use crate::features::FeatureBag;

#[derive(Debug, Clone, Default)]
pub struct ContentFeatures {
    pub description_length: usize,
    pub description_word_count: usize,
    pub description_has_url: bool,
    pub tag_count: u32,
}

impl ContentFeatures {
    pub fn new(description: &str, tag_count: u32) -> Self {
        Self {
            description_length: description.chars().count(),
            description_word_count: description.split_whitespace().count(),
            description_has_url: description.to_lowercase().contains("http"),
            tag_count,
        }
    }

    pub fn write_into(&self, bag: &mut FeatureBag) {
        bag.set("description_length", self.description_length as f64);
        bag.set("description_word_count", self.description_word_count as f64);
        bag.set_flag("description_has_url", self.description_has_url);
        bag.set("tag_count", self.tag_count as f64);
    }
}

pub fn parse_tag_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|tag| tag.trim().to_string()).collect()
}
