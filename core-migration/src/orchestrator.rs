//! # Migration Orchestrator
//!
//! Drives matching across a whole catalog snapshot and writes the results to
//! the destination.
//!
//! ## Workflow
//!
//! ### Playlists
//! 1. Match every track in playlist order, throttling after each lookup
//! 2. Compute found/total for the playlist
//! 3. Unless this is a dry run, create the destination playlist
//! 4. Add found tracks in batches of at most [`MAX_ITEMS_PER_ADD`],
//!    throttling after each batch
//! 5. Record the outcome whether or not steps 3-4 succeeded
//!
//! ### Artists
//! 1. Look each artist up by name, throttling after each lookup
//! 2. Record the outcome with the destination link, if the host provides one
//!
//! ## Failure Policy
//!
//! - A failed lookup is a `NotFound` match; siblings are unaffected
//! - A failed creation is recorded on that playlist; the next one proceeds
//! - A failed batch stops population of that playlist; earlier batches stay
//! - A rejected destination session aborts the run with
//!   [`MigrationError::Authentication`]
//!
//! Cancellation is checked between playlists, between track lookups and
//! between artist lookups. It is never observed in the middle of a call.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_migration::MigrationOrchestrator;
//! use tokio_util::sync::CancellationToken;
//!
//! let orchestrator = MigrationOrchestrator::from_config(&config)?;
//! let token = CancellationToken::new();
//!
//! let report = orchestrator.run(&snapshot, false, &token).await?;
//! println!("{:.1}% matched", report.summary.match_rate() * 100.0);
//! ```

use crate::aggregator::{ArtistSummary, MigrationSummary, ResultAggregator};
use crate::error::{MigrationError, Result};
use crate::outcome::{
    ArtistCheckOutcome, DestinationPlaylist, PlaylistMigrationOutcome, SourcePlaylistRef,
    TrackMatch,
};
use crate::state::{MigrationRunId, PlaylistCompletion, PlaylistMigration};
use bridge_traits::catalog::{DestinationCatalog, MAX_ITEMS_PER_ADD};
use bridge_traits::time::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use core_library::{Artist, CatalogSnapshot, Playlist};
use core_matching::{ArtistMatcher, ThrottleSet, TrackMatcher};
use core_runtime::config::{CoreConfig, DEFAULT_PROGRESS_INTERVAL};
use core_runtime::events::{ArtistCheckEvent, CoreEvent, EventBus, MigrationEvent};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Everything one run produced
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub run_id: MigrationRunId,
    pub dry_run: bool,
    pub playlists: Vec<PlaylistMigrationOutcome>,
    pub artists: Vec<ArtistCheckOutcome>,
    pub summary: MigrationSummary,
    pub artist_summary: ArtistSummary,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of one playlist pass
enum PlaylistStep {
    Finished(PlaylistMigrationOutcome),
    Cancelled,
}

pub struct MigrationOrchestrator {
    catalog: Arc<dyn DestinationCatalog>,
    track_matcher: TrackMatcher,
    artist_matcher: ArtistMatcher,
    throttles: ThrottleSet,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    progress_interval: usize,
}

impl MigrationOrchestrator {
    pub fn new(catalog: Arc<dyn DestinationCatalog>, throttles: ThrottleSet) -> Self {
        Self {
            track_matcher: TrackMatcher::new(Arc::clone(&catalog)),
            artist_matcher: ArtistMatcher::new(Arc::clone(&catalog)),
            catalog,
            throttles,
            clock: Arc::new(SystemClock::default()),
            event_bus: EventBus::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// # Errors
    ///
    /// Returns [`MigrationError::Config`] if the configuration does not validate.
    pub fn from_config(config: &CoreConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self::new(
            Arc::clone(&config.destination_catalog),
            ThrottleSet::from_config(&config.throttle),
        )
        .with_clock(Arc::clone(&config.clock))
        .with_event_bus(EventBus::new(config.event_buffer_size))
        .with_progress_interval(config.progress_interval))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = event_bus;
        self
    }

    /// Progress events every `tracks` lookups (minimum 1)
    pub fn with_progress_interval(mut self, tracks: usize) -> Self {
        self.progress_interval = tracks.max(1);
        self
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Migrate every playlist of the snapshot, in snapshot order.
    ///
    /// # Errors
    ///
    /// Only [`MigrationError::Authentication`] ends the run early; every
    /// other failure is recorded on the affected outcome.
    pub async fn migrate(
        &self,
        snapshot: &CatalogSnapshot,
        dry_run: bool,
    ) -> Result<Vec<PlaylistMigrationOutcome>> {
        self.migrate_with_cancellation(snapshot, dry_run, &CancellationToken::new())
            .await
    }

    /// As [`migrate`](Self::migrate), stopping at the next safe boundary once
    /// `cancellation_token` fires.
    pub async fn migrate_with_cancellation(
        &self,
        snapshot: &CatalogSnapshot,
        dry_run: bool,
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<PlaylistMigrationOutcome>> {
        let run_id = MigrationRunId::new();
        let started_at = self.clock.now();

        let outcomes = self
            .migrate_playlists(run_id, snapshot, dry_run, cancellation_token)
            .await?;

        self.run_completed(run_id, started_at, &ResultAggregator::aggregate(&outcomes));
        Ok(outcomes)
    }

    /// Look every artist up in the destination.
    pub async fn check_artists(&self, artists: &[Artist]) -> Result<Vec<ArtistCheckOutcome>> {
        self.check_artists_with_cancellation(artists, &CancellationToken::new())
            .await
    }

    pub async fn check_artists_with_cancellation(
        &self,
        artists: &[Artist],
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<ArtistCheckOutcome>> {
        self.check_artist_list(MigrationRunId::new(), artists, 0, cancellation_token)
            .await
    }

    /// Playlist pass followed by the artist pass, with summaries.
    #[instrument(skip(self, snapshot, cancellation_token), fields(playlists = snapshot.playlists.len(), artists = snapshot.artists.len()))]
    pub async fn run(
        &self,
        snapshot: &CatalogSnapshot,
        dry_run: bool,
        cancellation_token: &CancellationToken,
    ) -> Result<MigrationReport> {
        let run_id = MigrationRunId::new();
        let started_at = self.clock.now();

        let playlists = self
            .migrate_playlists(run_id, snapshot, dry_run, cancellation_token)
            .await?;

        let artists = match self
            .check_artist_list(run_id, &snapshot.artists, playlists.len(), cancellation_token)
            .await
        {
            Ok(artists) => artists,
            Err(MigrationError::Cancelled { artists, .. }) => {
                return Err(MigrationError::Cancelled {
                    outcomes: playlists,
                    artists,
                })
            }
            Err(e) => return Err(e),
        };

        let summary = ResultAggregator::aggregate(&playlists);
        let artist_summary = ResultAggregator::aggregate_artists(&artists);

        info!(
            "Run {} complete: {}/{} tracks found, {}/{} artists found",
            run_id, summary.tracks_found, summary.tracks_total, artist_summary.found, artist_summary.total
        );
        self.run_completed(run_id, started_at, &summary);

        Ok(MigrationReport {
            run_id,
            dry_run,
            playlists,
            artists,
            summary,
            artist_summary,
            started_at,
            completed_at: self.clock.now(),
        })
    }

    // ========================================================================
    // Playlist pass
    // ========================================================================

    #[instrument(skip(self, run_id, snapshot, cancellation_token), fields(run_id = %run_id))]
    async fn migrate_playlists(
        &self,
        run_id: MigrationRunId,
        snapshot: &CatalogSnapshot,
        dry_run: bool,
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<PlaylistMigrationOutcome>> {
        let playlist_count = snapshot.playlists.len();

        info!(
            "Phase 1: Migrating {} playlists ({} tracks, dry_run: {})",
            playlist_count,
            snapshot.total_tracks(),
            dry_run
        );
        self.emit(MigrationEvent::RunStarted {
            run_id: run_id.to_string(),
            playlist_count,
            track_count: snapshot.total_tracks(),
            dry_run,
        });

        let mut outcomes = Vec::with_capacity(playlist_count);

        for (index, playlist) in snapshot.playlists.iter().enumerate() {
            if cancellation_token.is_cancelled() {
                return Err(self.cancelled(run_id, outcomes));
            }

            let step = self
                .migrate_playlist(run_id, index + 1, playlist_count, playlist, dry_run, cancellation_token)
                .await;

            match step {
                Ok(PlaylistStep::Finished(outcome)) => outcomes.push(outcome),
                Ok(PlaylistStep::Cancelled) => return Err(self.cancelled(run_id, outcomes)),
                Err(e) => {
                    error!("Migration aborted at playlist {}: {}", playlist.source_id, e);
                    self.run_failed(run_id, &e);
                    return Err(e);
                }
            }
        }

        let summary = ResultAggregator::aggregate(&outcomes);
        info!(
            "Phase 2: Playlists complete: {}/{} tracks found ({:.1}%), {} created, {} creation failures",
            summary.tracks_found,
            summary.tracks_total,
            summary.match_rate() * 100.0,
            summary.playlists_created,
            summary.creation_failures
        );

        Ok(outcomes)
    }

    async fn migrate_playlist(
        &self,
        run_id: MigrationRunId,
        position: usize,
        playlist_count: usize,
        playlist: &Playlist,
        dry_run: bool,
        cancellation_token: &CancellationToken,
    ) -> Result<PlaylistStep> {
        let total = playlist.track_count();
        let mut state = PlaylistMigration::new(playlist.source_id.clone());

        info!("[{}/{}] Processing: {} ({} tracks)", position, playlist_count, playlist.name, total);
        state.begin_search(total)?;
        self.emit(MigrationEvent::PlaylistStarted {
            run_id: run_id.to_string(),
            playlist_id: playlist.source_id.clone(),
            name: playlist.name.clone(),
            position,
            playlist_count,
            track_count: total,
        });

        let mut matches = Vec::with_capacity(total);
        let mut found = 0;

        for (index, track) in playlist.tracks.iter().enumerate() {
            if cancellation_token.is_cancelled() {
                return Ok(PlaylistStep::Cancelled);
            }

            let result = self.track_matcher.match_track(track).await?;
            self.throttles.track_search.throttle().await;

            if result.is_found() {
                found += 1;
            }
            matches.push(TrackMatch::new(track.clone(), result));

            let processed = index + 1;
            state.update_progress(processed, found)?;

            if processed % self.progress_interval == 0 || processed == total {
                debug!("Progress: {}/{} ({} found)", processed, total, found);
                self.emit(MigrationEvent::Progress {
                    run_id: run_id.to_string(),
                    playlist_id: playlist.source_id.clone(),
                    tracks_processed: processed,
                    tracks_total: total,
                    tracks_found: found,
                    percent: state.progress.percent,
                });
            }
        }

        let mut outcome = PlaylistMigrationOutcome::new(
            SourcePlaylistRef::from(playlist),
            matches,
            PlaylistCompletion::DryRun,
        );

        if total > 0 {
            info!(
                "Found {}/{} tracks ({:.1}%)",
                found,
                total,
                outcome.match_rate() * 100.0
            );
        } else {
            info!("Playlist is empty");
        }

        if dry_run {
            state.finish(PlaylistCompletion::DryRun)?;
            self.playlist_completed(run_id, &outcome);
            return Ok(PlaylistStep::Finished(outcome));
        }

        state.begin_creation()?;
        let destination_id = match self
            .catalog
            .create_playlist(&playlist.name, &playlist.description)
            .await
        {
            Ok(id) => id,
            Err(e) if e.is_authentication() => {
                return Err(MigrationError::Authentication(e.to_string()));
            }
            Err(e) => {
                warn!("Failed to create playlist {}: {}", playlist.name, e);
                state.finish(PlaylistCompletion::CreationFailed)?;

                outcome.completion = PlaylistCompletion::CreationFailed;
                outcome.failure = Some(e.to_string());

                self.emit(MigrationEvent::PlaylistCreationFailed {
                    run_id: run_id.to_string(),
                    playlist_id: playlist.source_id.clone(),
                    message: e.to_string(),
                });
                self.playlist_completed(run_id, &outcome);
                return Ok(PlaylistStep::Finished(outcome));
            }
        };

        outcome.destination = Some(DestinationPlaylist {
            url: self.catalog.playlist_url(&destination_id),
            id: destination_id.clone(),
        });

        state.begin_population()?;
        let track_ids = outcome.found_destination_ids();
        let (added, failure) = self.populate(&destination_id, &track_ids).await?;

        outcome.tracks_added = added;
        outcome.completion = if failure.is_some() {
            PlaylistCompletion::PartiallyPopulated
        } else {
            PlaylistCompletion::Populated
        };
        outcome.failure = failure;
        state.finish(outcome.completion)?;

        info!(
            "Created playlist {} with {}/{} tracks",
            destination_id, added, track_ids.len()
        );
        self.playlist_completed(run_id, &outcome);

        Ok(PlaylistStep::Finished(outcome))
    }

    /// Submit ids in order, in batches of at most [`MAX_ITEMS_PER_ADD`].
    ///
    /// Returns the number of ids accepted and, if a batch failed, its error
    /// text. Batches after a failure are not submitted.
    async fn populate(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(usize, Option<String>)> {
        let mut added = 0;

        for (index, batch) in track_ids.chunks(MAX_ITEMS_PER_ADD).enumerate() {
            let submitted = self.catalog.add_items(playlist_id, batch).await;

            if let Err(e) = &submitted {
                if e.is_authentication() {
                    return Err(MigrationError::Authentication(e.to_string()));
                }
            }
            self.throttles.batch_add.throttle().await;

            match submitted {
                Ok(()) => {
                    added += batch.len();
                    debug!("Added batch {} ({} tracks)", index + 1, batch.len());
                }
                Err(e) => {
                    warn!(
                        "Batch {} of playlist {} failed after {} tracks: {}",
                        index + 1,
                        playlist_id,
                        added,
                        e
                    );
                    return Ok((added, Some(format!("Batch {} failed: {}", index + 1, e))));
                }
            }
        }

        Ok((added, None))
    }

    // ========================================================================
    // Artist pass
    // ========================================================================

    /// `playlists_completed` is reported if the artist pass is cancelled.
    #[instrument(skip(self, run_id, artists, cancellation_token), fields(run_id = %run_id, artist_count = artists.len()))]
    async fn check_artist_list(
        &self,
        run_id: MigrationRunId,
        artists: &[Artist],
        playlists_completed: usize,
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<ArtistCheckOutcome>> {
        let total = artists.len();
        info!("Phase 3: Checking {} artists", total);
        self.event_bus
            .emit(CoreEvent::ArtistCheck(ArtistCheckEvent::Started {
                run_id: run_id.to_string(),
                artist_count: total,
            }))
            .ok();

        let mut outcomes = Vec::with_capacity(total);
        let mut found = 0;

        for (index, artist) in artists.iter().enumerate() {
            if cancellation_token.is_cancelled() {
                warn!("Artist check cancelled after {}/{} artists", index, total);
                self.emit(MigrationEvent::RunCancelled {
                    run_id: run_id.to_string(),
                    playlists_completed,
                });
                return Err(MigrationError::Cancelled {
                    outcomes: Vec::new(),
                    artists: outcomes,
                });
            }

            let result = match self.artist_matcher.match_artist(&artist.name).await {
                Ok(result) => result,
                Err(e) => {
                    error!("Artist check aborted at {}: {}", artist.name, e);
                    let error = MigrationError::from(e);
                    self.run_failed(run_id, &error);
                    return Err(error);
                }
            };
            self.throttles.artist_search.throttle().await;

            if result.is_found() {
                found += 1;
            }
            let destination_url = result
                .destination_id()
                .and_then(|id| self.catalog.artist_url(id));
            outcomes.push(ArtistCheckOutcome {
                artist: artist.clone(),
                result,
                destination_url,
            });

            let processed = index + 1;
            if processed % self.progress_interval == 0 || processed == total {
                debug!("Artist progress: {}/{} ({} found)", processed, total, found);
                self.event_bus
                    .emit(CoreEvent::ArtistCheck(ArtistCheckEvent::Progress {
                        run_id: run_id.to_string(),
                        artists_processed: processed,
                        artists_total: total,
                        artists_found: found,
                        percent: ((processed as f64 / total as f64) * 100.0) as u8,
                    }))
                    .ok();
            }
        }

        info!("Found {}/{} artists", found, total);
        self.event_bus
            .emit(CoreEvent::ArtistCheck(ArtistCheckEvent::Completed {
                run_id: run_id.to_string(),
                artists_total: total,
                artists_found: found,
            }))
            .ok();

        Ok(outcomes)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn emit(&self, event: MigrationEvent) {
        self.event_bus.emit(CoreEvent::Migration(event)).ok();
    }

    fn run_completed(
        &self,
        run_id: MigrationRunId,
        started_at: DateTime<Utc>,
        summary: &MigrationSummary,
    ) {
        let duration_secs = (self.clock.now() - started_at).num_seconds().max(0) as u64;
        self.emit(MigrationEvent::RunCompleted {
            run_id: run_id.to_string(),
            playlists: summary.playlists,
            tracks_total: summary.tracks_total,
            tracks_found: summary.tracks_found,
            match_rate: summary.match_rate(),
            duration_secs,
        });
    }

    fn run_failed(&self, run_id: MigrationRunId, error: &MigrationError) {
        self.emit(MigrationEvent::RunFailed {
            run_id: run_id.to_string(),
            message: error.to_string(),
        });
    }

    fn playlist_completed(&self, run_id: MigrationRunId, outcome: &PlaylistMigrationOutcome) {
        self.emit(MigrationEvent::PlaylistCompleted {
            run_id: run_id.to_string(),
            playlist_id: outcome.playlist.source_id.clone(),
            destination_playlist_id: outcome.destination.as_ref().map(|d| d.id.clone()),
            tracks_found: outcome.tracks_found(),
            tracks_total: outcome.tracks_total(),
            tracks_added: outcome.tracks_added,
            match_rate: outcome.match_rate(),
            failure: outcome.failure.clone(),
        });
    }

    fn cancelled(
        &self,
        run_id: MigrationRunId,
        outcomes: Vec<PlaylistMigrationOutcome>,
    ) -> MigrationError {
        warn!("Migration cancelled after {} playlists", outcomes.len());
        self.emit(MigrationEvent::RunCancelled {
            run_id: run_id.to_string(),
            playlists_completed: outcomes.len(),
        });
        MigrationError::Cancelled {
            outcomes,
            artists: Vec::new(),
        }
    }
}
