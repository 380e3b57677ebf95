//! Line-oriented console driving the search orchestrator.

use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::commands::{ConsoleCommand, HELP};
use super::render;
use crate::application::search::{OperationFailure, SearchOrchestrator, SearchSnapshot, SearchState};
use crate::application::services::{Debouncer, GenreDirectory};
use crate::domain::entities::{Movie, PosterImage};
use crate::domain::ports::MovieCatalogPort;
use crate::infrastructure::image::ImageLoader;

/// Result of a background poster load.
#[derive(Debug)]
struct PosterLoaded {
    number: usize,
    title: String,
    image: Option<PosterImage>,
}

/// Interactive front end over any async writer.
pub struct Console<W> {
    orchestrator: SearchOrchestrator,
    snapshots: mpsc::UnboundedReceiver<SearchSnapshot>,
    catalog: Arc<dyn MovieCatalogPort>,
    loader: ImageLoader,
    genres: GenreDirectory,
    debouncer: Debouncer<String>,
    poster_tx: mpsc::UnboundedSender<PosterLoaded>,
    poster_rx: mpsc::UnboundedReceiver<PosterLoaded>,
    /// Movies already printed for the current results.
    listed: Arc<Vec<Movie>>,
    reported_failure: Option<OperationFailure>,
    out: W,
}

impl<W: AsyncWrite + Unpin> Console<W> {
    /// Creates a console writing to `out`. Nothing runs until [`Console::run`] or [`Console::run_query`].
    pub fn new(
        mut orchestrator: SearchOrchestrator,
        catalog: Arc<dyn MovieCatalogPort>,
        loader: ImageLoader,
        debouncer: Debouncer<String>,
        out: W,
    ) -> Self {
        let snapshots = orchestrator.subscribe();
        let (poster_tx, poster_rx) = mpsc::unbounded_channel();
        Self {
            orchestrator,
            snapshots,
            catalog,
            loader,
            genres: GenreDirectory::new(BTreeSet::new()),
            debouncer,
            poster_tx,
            poster_rx,
            listed: Arc::default(),
            reported_failure: None,
            out,
        }
    }

    /// Consumes the console, returning its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Runs the interactive loop until `:quit` or end of input.
    ///
    /// # Errors
    /// Returns error if reading input or writing output fails.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> io::Result<()> {
        self.orchestrator.start();
        self.load_genres().await;
        self.drain_snapshots().await?;
        self.write_line(HELP).await?;

        let mut lines = input.lines();
        loop {
            // Typed searches wait until configuration has loaded or been acknowledged.
            let accepts_search = !matches!(
                self.orchestrator.state(),
                SearchState::LoadingConfig | SearchState::ConfigFailure(_)
            );
            tokio::select! {
                biased;

                () = self.orchestrator.process_next() => {
                    self.drain_snapshots().await?;
                }

                Some(loaded) = self.poster_rx.recv() => {
                    self.show_poster(loaded).await?;
                }

                term = self.debouncer.ready(), if accepts_search => {
                    self.orchestrator.start_search(&term);
                    self.drain_snapshots().await?;
                }

                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Input closed");
                        break;
                    };
                    if !self.handle_command(ConsoleCommand::parse(&line)).await? {
                        return Ok(());
                    }
                }
            }
        }

        self.orchestrator.settle().await;
        if let Some(term) = self.debouncer.flush() {
            self.orchestrator.start_search(&term);
            self.orchestrator.settle().await;
        }
        self.drain_snapshots().await
    }

    /// Prints up to `pages` pages of results for `term`, then returns.
    ///
    /// # Errors
    /// Returns error if writing output fails.
    pub async fn run_query(&mut self, term: &str, pages: u32) -> io::Result<()> {
        self.orchestrator.start();
        self.load_genres().await;
        self.orchestrator.settle().await;
        self.drain_snapshots().await?;
        if self.orchestrator.state().is_config_failure() {
            self.orchestrator.reset_config_error();
            self.drain_snapshots().await?;
        }

        self.orchestrator.start_search(term);
        self.orchestrator.settle().await;
        self.drain_snapshots().await?;

        for _ in 1..pages {
            if !self.orchestrator.aggregate().has_more_pages() {
                break;
            }
            self.orchestrator.fetch_next_page();
            self.orchestrator.settle().await;
            self.drain_snapshots().await?;
        }
        Ok(())
    }

    async fn load_genres(&mut self) {
        match self.catalog.get_genres().await {
            Ok(genres) => {
                info!(count = genres.len(), "Loaded genres");
                self.genres = GenreDirectory::new(genres);
            }
            Err(e) => warn!(error = %e, "Failed to load genres, results are shown without them"),
        }
    }

    /// Returns false when the console should exit.
    async fn handle_command(&mut self, command: ConsoleCommand) -> io::Result<bool> {
        match command {
            ConsoleCommand::Search(term) => self.debouncer.push(term),
            ConsoleCommand::NextPage => {
                if self.orchestrator.aggregate().has_more_pages() {
                    self.orchestrator.fetch_next_page();
                    self.drain_snapshots().await?;
                } else {
                    self.write_line("No more pages").await?;
                }
            }
            ConsoleCommand::Poster(number) => self.request_poster(number).await?,
            ConsoleCommand::Ack => {
                self.orchestrator.reset_config_error();
                self.drain_snapshots().await?;
            }
            ConsoleCommand::Stats => {
                let stats = self.loader.cache_stats().to_string();
                self.write_line(&stats).await?;
            }
            ConsoleCommand::Trim(retain) => {
                let evicted = self.loader.handle_memory_pressure(retain);
                info!(retain, evicted, "Trimmed poster cache");
                self.write_line(&format!("Evicted {evicted} poster(s)")).await?;
            }
            ConsoleCommand::Clear => {
                self.loader.clear_cache();
                self.write_line("Poster cache cleared").await?;
            }
            ConsoleCommand::Help => self.write_line(HELP).await?,
            ConsoleCommand::Quit => return Ok(false),
            ConsoleCommand::Invalid(message) => self.write_line(&message).await?,
        }
        Ok(true)
    }

    async fn request_poster(&mut self, number: usize) -> io::Result<()> {
        let Some(movie) = number.checked_sub(1).and_then(|index| self.listed.get(index)) else {
            return self.write_line(&format!("No movie {number}")).await;
        };
        let title = movie.title().to_string();
        let Some(url) = self.orchestrator.poster_url(movie) else {
            return self.write_line(&format!("No poster available for {title}")).await;
        };

        let loader = self.loader.clone();
        let poster_tx = self.poster_tx.clone();
        tokio::spawn(async move {
            let image = loader.load_image(&url).await;
            let _ = poster_tx.send(PosterLoaded {
                number,
                title,
                image,
            });
        });
        Ok(())
    }

    async fn show_poster(&mut self, loaded: PosterLoaded) -> io::Result<()> {
        let line = match loaded.image {
            Some(image) => format!(
                "Poster {} ({}): {}x{}",
                loaded.number,
                loaded.title,
                image.width(),
                image.height()
            ),
            None => format!("Poster {} ({}) could not be loaded", loaded.number, loaded.title),
        };
        self.write_line(&line).await
    }

    async fn drain_snapshots(&mut self) -> io::Result<()> {
        while let Ok(snapshot) = self.snapshots.try_recv() {
            self.show_snapshot(&snapshot).await?;
        }
        Ok(())
    }

    async fn show_snapshot(&mut self, snapshot: &SearchSnapshot) -> io::Result<()> {
        match &snapshot.state {
            SearchState::Idle(Some(_)) => {
                let movies = snapshot.aggregate.movies.clone();
                let start = if continues(&self.listed, &movies) {
                    self.listed.len()
                } else {
                    0
                };
                for (index, movie) in movies.iter().enumerate().skip(start) {
                    let line = render::movie_line(index + 1, movie, &self.genres);
                    self.write_line(&line).await?;
                }
                self.listed = movies;
                self.write_line(&render::footer(snapshot)).await?;
            }
            SearchState::Idle(None) => {
                if snapshot.aggregate.movies.is_empty() {
                    self.listed = Arc::default();
                }
                self.report_failure().await?;
            }
            SearchState::ConfigFailure(error) => {
                let line = format!("Posters are unavailable ({error}); type :ack to continue");
                self.write_line(&line).await?;
            }
            busy => self.write_line(&format!("{busy}...")).await?,
        }
        Ok(())
    }

    async fn report_failure(&mut self) -> io::Result<()> {
        let failure = self.orchestrator.last_failure().cloned();
        if failure.is_some() && failure != self.reported_failure {
            if let Some(failure) = &failure {
                self.write_line(&render::failure_line(failure)).await?;
            }
            self.reported_failure = failure;
        }
        Ok(())
    }

    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.out.write_all(line.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await
    }
}

/// Returns true if `movies` extends the already listed movies.
fn continues(listed: &[Movie], movies: &[Movie]) -> bool {
    !listed.is_empty()
        && movies.len() > listed.len()
        && listed
            .iter()
            .zip(movies)
            .all(|(shown, movie)| shown.id() == movie.id())
}
