use cinefeed_client::TmdbClient;
use cinefeed_config::LoadingPolicy;
use cinefeed_models::{CastMember, CreditsResponse, CrewMember, Movie, MovieDetails, MovieResponse, Video, VideosResponse};
use futures::FutureExt;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info, instrument};
use crate::actor::{Reducer, StateActor};
use crate::load::{dispatch, CallFuture, LoadCall, LoadEvent, LoadStatus};

/// Cast members kept for the detail view
pub const CAST_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailCall {
    Details,
    Credits,
    Videos,
    Recommendations,
    Similar,
}

impl DetailCall {
    pub const ALL: [DetailCall; 5] = [
        DetailCall::Details,
        DetailCall::Credits,
        DetailCall::Videos,
        DetailCall::Recommendations,
        DetailCall::Similar,
    ];

    fn fetch(self, client: Arc<TmdbClient>, id: i64) -> CallFuture<DetailPayload> {
        async move {
            Ok(match self {
                DetailCall::Details => DetailPayload::Details(client.movie_details(id).await?),
                DetailCall::Credits => DetailPayload::Credits(client.movie_credits(id).await?),
                DetailCall::Videos => DetailPayload::Videos(client.movie_videos(id).await?),
                DetailCall::Recommendations => {
                    DetailPayload::Recommendations(client.recommendations(id, 1).await?)
                }
                DetailCall::Similar => DetailPayload::Similar(client.similar(id, 1).await?),
            })
        }
        .boxed()
    }
}

impl LoadCall for DetailCall {
    fn label(&self) -> &'static str {
        match self {
            DetailCall::Details => "details",
            DetailCall::Credits => "credits",
            DetailCall::Videos => "videos",
            DetailCall::Recommendations => "recommendations",
            DetailCall::Similar => "similar",
        }
    }

    fn is_primary(&self) -> bool {
        matches!(self, DetailCall::Similar)
    }
}

#[derive(Debug, Clone)]
pub enum DetailPayload {
    Details(MovieDetails),
    Credits(CreditsResponse),
    Videos(VideosResponse),
    Recommendations(MovieResponse),
    Similar(MovieResponse),
}

/// Every `Open` of a different movie starts a new session; results carry the
/// session they were dispatched for.
#[derive(Debug, Clone)]
pub enum DetailEvent {
    /// Switch to a movie; slots are cleared when the session changes
    Open { movie_id: i64, session: u64 },
    Load {
        session: u64,
        event: LoadEvent<DetailCall, DetailPayload>,
    },
}

/// Trailers only, official ones first, source order otherwise
pub fn order_trailers(videos: Vec<Video>) -> Vec<Video> {
    let (official, unofficial): (Vec<Video>, Vec<Video>) = videos
        .into_iter()
        .filter(Video::is_trailer)
        .partition(|v| v.official);
    official.into_iter().chain(unofficial).collect()
}

#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub movie_id: Option<i64>,
    session: u64,
    pub details: Option<MovieDetails>,
    /// Credits with the cast already cut to `CAST_LIMIT`
    pub credits: Option<CreditsResponse>,
    pub videos: Vec<Video>,
    pub recommendations: Vec<Movie>,
    pub similar: Vec<Movie>,
    pub status: LoadStatus,
}

impl DetailState {
    pub fn new(policy: LoadingPolicy) -> Self {
        Self {
            status: LoadStatus::new(policy),
            ..Self::default()
        }
    }

    pub fn cast(&self) -> &[CastMember] {
        self.credits.as_ref().map(|c| c.cast.as_slice()).unwrap_or_default()
    }

    pub fn directors(&self) -> Vec<&CrewMember> {
        self.credits
            .as_ref()
            .map(|c| c.directors().collect())
            .unwrap_or_default()
    }

    fn accept(&mut self, payload: DetailPayload) {
        match payload {
            DetailPayload::Details(details) => self.details = Some(details),
            DetailPayload::Credits(mut credits) => {
                credits.cast.truncate(CAST_LIMIT);
                self.credits = Some(credits);
            }
            DetailPayload::Videos(videos) => self.videos = order_trailers(videos.results),
            DetailPayload::Recommendations(page) => self.recommendations = page.results,
            DetailPayload::Similar(page) => self.similar = page.results,
        }
    }
}

impl Reducer for DetailState {
    type Event = DetailEvent;

    fn apply(&mut self, event: DetailEvent) {
        match event {
            DetailEvent::Open { movie_id, session } => {
                if self.session != session {
                    *self = DetailState::new(self.status.policy());
                    self.movie_id = Some(movie_id);
                    self.session = session;
                }
            }
            DetailEvent::Load { session, event } => {
                if self.session != session {
                    debug!(session, current = self.session, "Dropping result from an earlier session");
                    return;
                }
                if let Some((_, payload)) = event.record(&mut self.status) {
                    self.accept(payload);
                }
            }
        }
    }
}

/// Loads everything the detail view shows for one movie.
pub struct MovieDetailLoader {
    client: Arc<TmdbClient>,
    actor: StateActor<DetailState>,
    requested: Mutex<Requested>,
}

/// Loader-side view of the open session
#[derive(Debug, Default, Clone, Copy)]
struct Requested {
    movie_id: Option<i64>,
    session: u64,
    batches: u64,
}

impl MovieDetailLoader {
    pub fn new(client: Arc<TmdbClient>, policy: LoadingPolicy) -> Self {
        Self {
            client,
            actor: StateActor::spawn(DetailState::new(policy)),
            requested: Mutex::new(Requested::default()),
        }
    }

    #[instrument(skip(self))]
    pub fn load(&self, movie_id: i64) {
        info!("Loading movie {}", movie_id);
        let events = self.actor.sender();

        let session = {
            let mut requested = self.requested.lock().unwrap_or_else(|e| e.into_inner());
            if requested.movie_id == Some(movie_id) {
                requested.batches += 1;
            } else {
                *requested = Requested {
                    movie_id: Some(movie_id),
                    session: requested.session + 1,
                    batches: 1,
                };
            }
            // Sent under the lock so sessions reach the actor in order
            let _ = events.send(DetailEvent::Open { movie_id, session: requested.session });
            requested.session
        };

        let calls: Vec<_> = DetailCall::ALL
            .into_iter()
            .map(|call| (call, call.fetch(self.client.clone(), movie_id)))
            .collect();
        dispatch(&events, calls, move |event| DetailEvent::Load { session, event });
    }

    pub fn snapshot(&self) -> DetailState {
        self.actor.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.actor.subscribe()
    }

    /// Wait until every batch for the open movie has settled.
    /// `None` when nothing was loaded yet.
    pub async fn settled(&self) -> Option<DetailState> {
        let requested = *self.requested.lock().unwrap_or_else(|e| e.into_inner());
        requested.movie_id?;
        self.actor
            .wait_for(|s| s.session == requested.session && s.status.settled_after(requested.batches))
            .await
    }
}
