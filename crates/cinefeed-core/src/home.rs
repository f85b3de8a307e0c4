use cinefeed_client::TmdbClient;
use cinefeed_config::LoadingPolicy;
use cinefeed_models::{Movie, MovieResponse};
use futures::FutureExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument};
use crate::actor::{Reducer, StateActor};
use crate::load::{dispatch, CallFuture, LoadCall, LoadEvent, LoadStatus};

/// The seven lists that make up the home feed, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeSection {
    Trending,
    NowPlaying,
    Popular,
    TopRated,
    Upcoming,
    Bollywood,
    SouthIndian,
}

impl HomeSection {
    pub const ALL: [HomeSection; 7] = [
        HomeSection::Trending,
        HomeSection::NowPlaying,
        HomeSection::Popular,
        HomeSection::TopRated,
        HomeSection::Upcoming,
        HomeSection::Bollywood,
        HomeSection::SouthIndian,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            HomeSection::Trending => "Trending",
            HomeSection::NowPlaying => "Now Playing",
            HomeSection::Popular => "Popular",
            HomeSection::TopRated => "Top Rated",
            HomeSection::Upcoming => "Upcoming",
            HomeSection::Bollywood => "Bollywood",
            HomeSection::SouthIndian => "South Indian",
        }
    }

    fn fetch(self, client: Arc<TmdbClient>) -> CallFuture<MovieResponse> {
        async move {
            match self {
                HomeSection::Trending => client.trending(1).await,
                HomeSection::NowPlaying => client.now_playing(1).await,
                HomeSection::Popular => client.popular(1).await,
                HomeSection::TopRated => client.top_rated(1).await,
                HomeSection::Upcoming => client.upcoming(1).await,
                HomeSection::Bollywood => client.bollywood(1).await,
                HomeSection::SouthIndian => client.south_indian(1).await,
            }
        }
        .boxed()
    }
}

impl LoadCall for HomeSection {
    fn label(&self) -> &'static str {
        self.title()
    }

    fn is_primary(&self) -> bool {
        matches!(self, HomeSection::Upcoming)
    }
}

/// Where the featured movie came from. Later variants outrank earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FeaturedSource {
    Trending,
    SouthIndian,
    Bollywood,
}

/// Highest `vote_average`; the earliest entry wins ties
pub fn select_featured(movies: &[Movie]) -> Option<&Movie> {
    let mut best: Option<&Movie> = None;
    for movie in movies {
        match best {
            Some(current) if movie.vote_average <= current.vote_average => {}
            _ => best = Some(movie),
        }
    }
    best
}

pub type HomeEvent = LoadEvent<HomeSection, MovieResponse>;

#[derive(Debug, Clone, Default)]
pub struct HomeState {
    pub trending: Vec<Movie>,
    pub now_playing: Vec<Movie>,
    pub popular: Vec<Movie>,
    pub top_rated: Vec<Movie>,
    pub upcoming: Vec<Movie>,
    pub bollywood: Vec<Movie>,
    pub south_indian: Vec<Movie>,
    pub featured: Option<Movie>,
    pub featured_source: Option<FeaturedSource>,
    pub status: LoadStatus,
    upcoming_arrived: bool,
}

impl HomeState {
    pub fn new(policy: LoadingPolicy) -> Self {
        Self {
            status: LoadStatus::new(policy),
            ..Self::default()
        }
    }

    pub fn section(&self, section: HomeSection) -> &[Movie] {
        match section {
            HomeSection::Trending => &self.trending,
            HomeSection::NowPlaying => &self.now_playing,
            HomeSection::Popular => &self.popular,
            HomeSection::TopRated => &self.top_rated,
            HomeSection::Upcoming => &self.upcoming,
            HomeSection::Bollywood => &self.bollywood,
            HomeSection::SouthIndian => &self.south_indian,
        }
    }

    fn accept(&mut self, section: HomeSection, movies: Vec<Movie>) {
        match section {
            HomeSection::Trending => {
                self.trending = movies;
                if self.upcoming_arrived {
                    self.offer_trending_fallback();
                }
            }
            HomeSection::NowPlaying => self.now_playing = movies,
            HomeSection::Popular => self.popular = movies,
            HomeSection::TopRated => self.top_rated = movies,
            HomeSection::Upcoming => {
                self.upcoming = movies;
                self.upcoming_arrived = true;
                self.offer_trending_fallback();
            }
            HomeSection::Bollywood => {
                self.bollywood = movies;
                let candidate = select_featured(&self.bollywood).cloned();
                self.offer_featured(FeaturedSource::Bollywood, candidate);
            }
            HomeSection::SouthIndian => {
                self.south_indian = movies;
                let candidate = select_featured(&self.south_indian).cloned();
                self.offer_featured(FeaturedSource::SouthIndian, candidate);
            }
        }
    }

    fn offer_trending_fallback(&mut self) {
        let candidate = self.trending.first().cloned();
        self.offer_featured(FeaturedSource::Trending, candidate);
    }

    // A lower-ranked source never displaces a higher-ranked featured movie
    fn offer_featured(&mut self, source: FeaturedSource, candidate: Option<Movie>) {
        let Some(movie) = candidate else {
            return;
        };
        if matches!(self.featured_source, Some(current) if current > source) {
            return;
        }
        debug!(?source, movie_id = movie.id, "Featured movie selected: {}", movie.title);
        self.featured = Some(movie);
        self.featured_source = Some(source);
    }
}

impl Reducer for HomeState {
    type Event = HomeEvent;

    fn apply(&mut self, event: HomeEvent) {
        if matches!(event, LoadEvent::Begin(_)) {
            self.upcoming_arrived = false;
        }
        if let Some((section, page)) = event.record(&mut self.status) {
            self.accept(section, page.results);
        }
    }
}

/// Loads every home section concurrently into a shared published state.
pub struct HomeFeed {
    client: Arc<TmdbClient>,
    actor: StateActor<HomeState>,
    batches: AtomicU64,
}

impl HomeFeed {
    pub fn new(client: Arc<TmdbClient>, policy: LoadingPolicy) -> Self {
        Self {
            client,
            actor: StateActor::spawn(HomeState::new(policy)),
            batches: AtomicU64::new(0),
        }
    }

    /// Fire one request per section. Existing lists stay visible until replaced;
    /// calling again while a load is running starts an overlapping batch.
    #[instrument(skip(self))]
    pub fn load(&self) {
        info!("Loading home feed ({} sections)", HomeSection::ALL.len());
        let calls: Vec<_> = HomeSection::ALL
            .into_iter()
            .map(|section| (section, section.fetch(self.client.clone())))
            .collect();
        self.batches.fetch_add(1, Ordering::SeqCst);
        dispatch(&self.actor.sender(), calls, |event| event);
    }

    pub fn refresh(&self) {
        self.load();
    }

    pub fn snapshot(&self) -> HomeState {
        self.actor.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.actor.subscribe()
    }

    /// Wait until every batch started so far has settled
    pub async fn settled(&self) -> Option<HomeState> {
        let batches = self.batches.load(Ordering::SeqCst);
        let state = self.actor.wait_for(|s| s.status.settled_after(batches)).await?;
        info!(
            featured = state.featured.as_ref().map(|m| m.id),
            error = state.status.last_error.is_some(),
            "Home feed settled"
        );
        Some(state)
    }
}
