pub mod actor;
pub mod detail;
pub mod error;
pub mod home;
pub mod load;
pub mod search;
pub mod store;
pub mod watchlist;

pub use actor::{Reducer, StateActor};
pub use detail::{order_trailers, DetailCall, DetailEvent, DetailPayload, DetailState, MovieDetailLoader, CAST_LIMIT};
pub use error::AppError;
pub use home::{select_featured, FeaturedSource, HomeEvent, HomeFeed, HomeSection, HomeState};
pub use load::{LoadCall, LoadEvent, LoadPhase, LoadStatus};
pub use search::{SearchEvent, SearchSession, SearchState};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use watchlist::{Watchlist, WATCHLIST_KEY};
