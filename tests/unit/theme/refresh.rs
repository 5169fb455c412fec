use super::*;
use crate::theme::cache::ThemeCache;
use crate::theme::engine::ThemeEngineOpts;
use crate::theme::memory::MemoryThemeStore;

#[tokio::test(start_paused = true)]
async fn ticks_every_interval_until_shutdown() {
    let mut engine = ThemeEngine::new(
        MemoryThemeStore::new(),
        ThemeCache::new(),
        ThemeEngineOpts::default(),
    );
    let refresher = ThemeRefresher::new(RefreshOpts::default());
    let (tx, rx) = oneshot::channel();

    let stop = async {
        tokio::time::sleep(Duration::from_secs(95)).await;
        tx.send(()).unwrap();
    };
    let (stats, ()) = tokio::join!(refresher.run(&mut engine, rx), stop);
    assert_eq!(stats.ticks, 3);
    assert_eq!(stats.failures, 0);
}

#[tokio::test(start_paused = true)]
async fn failures_do_not_stop_the_loop() {
    let mut engine = ThemeEngine::new(
        MemoryThemeStore::new(),
        ThemeCache::new(),
        ThemeEngineOpts::default(),
    );
    engine.store().set_offline(true);
    let refresher = ThemeRefresher::new(RefreshOpts {
        interval: Duration::from_secs(10),
        pages: vec!["dashboard".to_string()],
    });
    let (tx, rx) = oneshot::channel::<()>();

    let stop = async {
        tokio::time::sleep(Duration::from_secs(25)).await;
        drop(tx);
    };
    let (stats, ()) = tokio::join!(refresher.run(&mut engine, rx), stop);
    assert_eq!(stats, RefreshStats { ticks: 2, failures: 2 });
}
