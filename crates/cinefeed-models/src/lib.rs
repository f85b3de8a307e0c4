pub mod credits;
pub mod details;
pub mod images;
pub mod movie;
pub mod video;

pub use credits::{CastMember, CreditsResponse, CrewMember};
pub use details::{Genre, MovieDetails, ProductionCompany, ProductionCountry, SpokenLanguage};
pub use images::{image_url, ImageSize, IMAGE_BASE_URL};
pub use movie::{Movie, MovieResponse};
pub use video::{Video, VideosResponse};
