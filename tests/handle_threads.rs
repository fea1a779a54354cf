use log_router::logging::{service, MemorySink, RouterLayer};
use log_router::{LogRouter, RouterConfig, RouterHandle, Severity};
use tracing_subscriber::layer::SubscriberExt;

#[tokio::test]
async fn producers_on_many_threads_are_marshalled_onto_the_router() {
    let (handle, rx) = RouterHandle::channel();
    let mut router = LogRouter::new(RouterConfig::default(), MemorySink::new());

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let handle = handle.clone();
            std::thread::spawn(move || {
                let source = handle.register_source(&format!("worker-{}", worker), Severity::Info);
                for step in 0..25 {
                    source.info(&format!("step {}", step));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    drop(handle);

    service::drive(&mut router, rx).await;

    assert_eq!(router.registry().len(), 4);
    assert_eq!(router.history().len(), 100);
    assert_eq!(router.sink().lines().len(), 100);

    for worker in 0..4 {
        let name = format!("worker-{}", worker);
        let steps: Vec<&str> = router
            .history()
            .iter()
            .filter(|r| r.source_name == name)
            .map(|r| r.rendered_text.as_str())
            .collect();
        assert_eq!(steps.len(), 25);
        assert!(steps[0].contains(&format!("{}: step 0<", name)));
        assert!(steps[24].contains(&format!("{}: step 24<", name)));
    }
}

#[tokio::test]
async fn tracing_events_and_control_calls_share_one_queue() {
    let (handle, mut rx) = RouterHandle::channel();
    let subscriber = tracing_subscriber::registry().with(RouterLayer::new(handle.clone()));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(target: "gui", "window opened");
        tracing::error!(target: "design", "overlapping pads");
    });
    handle.toggle_source_visibility("gui", false);
    handle.rerender();

    let mut router = LogRouter::new(RouterConfig::default(), MemorySink::new());
    router.drain(&mut rx);

    assert_eq!(router.history().len(), 2);
    let shown: Vec<_> = router
        .sink()
        .lines()
        .iter()
        .filter_map(|l| l.source.as_deref())
        .collect();
    assert_eq!(shown, vec!["design"]);
}
