use crate::window::content::{Content, ContentSource, FetchError};
use crate::window::repository::SharedRepository;
use lectern_core::WindowId;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct LoaderConfig {
    /// Give up on a load when the view has not attached within this time.
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Fetches pane content off the interactive thread and hands it to the pane's view.
#[derive(Clone)]
pub struct TextLoader {
    repo: SharedRepository,
    source: Arc<dyn ContentSource>,
    config: LoaderConfig,
}

impl TextLoader {
    pub fn new(repo: SharedRepository, source: Arc<dyn ContentSource>, config: LoaderConfig) -> Self {
        Self {
            repo,
            source,
            config,
        }
    }

    /// Reload the pane if its view is behind its cursor or older than the last forced resync.
    pub fn update_text_if_needed(
        &self,
        id: WindowId,
        last_force_sync_all: Option<Instant>,
    ) -> Option<smol::Task<()>> {
        let needs_reload = self
            .repo
            .lock()
            .window(id)
            .is_some_and(|w| w.needs_reload(last_force_sync_all));
        if needs_reload {
            self.load_text(id, false)
        } else {
            None
        }
    }

    /// Load the pane's current document and location into its view.
    ///
    /// Does nothing for invisible panes. The returned task finishes once the
    /// content was shown, discarded as superseded, or abandoned because the
    /// view never attached.
    pub fn load_text(&self, id: WindowId, notify_location_change: bool) -> Option<smol::Task<()>> {
        let (seq, snapshot, views) = {
            let mut repo = self.repo.lock();
            if !repo.is_window_visible(id) {
                log::debug!("Window {} not visible, skipping load", id);
                return None;
            }
            let views = repo.views().clone();
            let window = repo.window_mut(id)?;
            let Some(snapshot) = window.page_manager.snapshot() else {
                log::debug!("{} has no document to show", window);
                return None;
            };
            let seq = window.begin_load(snapshot.clone());
            (seq, snapshot, views)
        };

        let repo = self.repo.clone();
        let source = self.source.clone();
        let config = self.config.clone();
        Some(smol::spawn(async move {
            let document = snapshot.document.clone();
            let location = snapshot.location.clone();
            let fetched = smol::unblock(move || source.fetch(&document, &location)).await;
            let content = match fetched {
                Ok(content) => content,
                Err(e) => {
                    match &e {
                        FetchError::OutOfMemory { .. } => {
                            log::error!("Window {}: {}", id, e)
                        }
                        FetchError::Unavailable { .. } => log::warn!("Window {}: {}", id, e),
                    }
                    Content::error_placeholder(
                        snapshot.document.clone(),
                        snapshot.location.clone(),
                        &e,
                    )
                }
            };

            let started = Instant::now();
            while !views.is_attached(id) {
                if started.elapsed() >= config.wait_timeout {
                    log::warn!(
                        "View of window {} did not attach within {:?}, abandoning load",
                        id,
                        config.wait_timeout
                    );
                    if let Some(window) = repo.lock().window_mut(id) {
                        window.abandon_load(seq);
                    }
                    return;
                }
                smol::Timer::after(config.poll_interval).await;
            }

            let accepted = repo
                .lock()
                .window_mut(id)
                .is_some_and(|w| w.finish_load(seq, &snapshot));
            if !accepted {
                log::debug!("Discarding superseded content for window {}", id);
                return;
            }
            views.show(id, content, notify_location_change);
        }))
    }
}
