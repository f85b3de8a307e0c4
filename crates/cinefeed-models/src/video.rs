use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideosResponse {
    pub id: i64,
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Video {
    pub id: String,
    pub name: String,
    /// Site-specific key, e.g. the YouTube video id
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub official: bool,
    pub published_at: Option<String>,
    pub size: u32,
}

impl Video {
    pub fn is_trailer(&self) -> bool {
        self.kind.eq_ignore_ascii_case("trailer")
    }

    fn is_youtube(&self) -> bool {
        self.site.eq_ignore_ascii_case("youtube")
    }

    /// Playable URL; only YouTube-hosted videos have one
    pub fn youtube_url(&self) -> Option<String> {
        self.is_youtube()
            .then(|| format!("https://www.youtube.com/watch?v={}", self.key))
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        self.is_youtube()
            .then(|| format!("https://img.youtube.com/vi/{}/hqdefault.jpg", self.key))
    }
}
