use crate::foundation::error::PagesmithResult;
use crate::theme::engine::ThemeEngine;
use crate::theme::store::ThemeStore;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

/// Options for periodic theme refresh.
#[derive(Clone, Debug)]
pub struct RefreshOpts {
    /// Tick interval.
    pub interval: Duration,
    /// Pages re-resolved on every tick in addition to the theme list.
    pub pages: Vec<String>,
}

impl Default for RefreshOpts {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            pages: Vec::new(),
        }
    }
}

/// Counters returned when a refresh loop stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub ticks: u64,
    /// Ticks whose refresh failed; the loop keeps going after a failure.
    pub failures: u64,
}

/// Something a [`ThemeRefresher`] can drive once per tick.
#[allow(async_fn_in_trait)]
pub trait Refresh {
    /// One refresh pass. `pages` are re-resolved on top of whatever the implementor tracks.
    async fn refresh_tick(&mut self, pages: &[String]) -> PagesmithResult<()>;
}

impl<S: ThemeStore> Refresh for ThemeEngine<S> {
    async fn refresh_tick(&mut self, pages: &[String]) -> PagesmithResult<()> {
        self.refresh_all().await?;
        for page in pages {
            self.get_page_theme(page).await?;
        }
        Ok(())
    }
}

/// Periodically calls [`Refresh::refresh_tick`] until told to stop.
pub struct ThemeRefresher {
    opts: RefreshOpts,
}

impl ThemeRefresher {
    pub fn new(opts: RefreshOpts) -> Self {
        Self { opts }
    }

    /// Drive the refresh loop on the current task.
    ///
    /// The first refresh happens one full interval after the call. The loop ends when `shutdown`
    /// fires or its sender is dropped.
    pub async fn run<R: Refresh>(
        &self,
        target: &mut R,
        mut shutdown: oneshot::Receiver<()>,
    ) -> RefreshStats {
        let mut ticker = tokio::time::interval(self.opts.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // `interval` yields immediately on the first tick.
        ticker.tick().await;

        let mut stats = RefreshStats::default();
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    stats.ticks += 1;
                    if let Err(e) = target.refresh_tick(&self.opts.pages).await {
                        stats.failures += 1;
                        tracing::warn!(error = %e, "theme auto-refresh failed");
                    }
                }
            }
        }
        tracing::debug!(ticks = stats.ticks, "theme auto-refresh stopped");
        stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/refresh.rs"]
mod tests;
