use std::fmt;

/// TMDB image CDN root. Relative paths from the API are appended after a size token.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Size tokens understood by the image CDN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// w500, used for posters
    Poster,
    /// w1280, used for backdrops
    Backdrop,
    /// w185, used for cast/crew portraits
    Profile,
    /// w92, used for list thumbnails
    Thumbnail,
}

impl ImageSize {
    pub fn token(self) -> &'static str {
        match self {
            ImageSize::Poster => "w500",
            ImageSize::Backdrop => "w1280",
            ImageSize::Profile => "w185",
            ImageSize::Thumbnail => "w92",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Build an absolute image URL, or `None` when the record carries no image path.
pub fn image_url(path: Option<&str>, size: ImageSize) -> Option<String> {
    path.map(|p| format!("{}/{}{}", IMAGE_BASE_URL, size.token(), p))
}
