//! Accept-loop behavior: backoff cadence, fatal errors, dispatch.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use rtmp_edge::{
    Handler, HandlerFactory, LocationConfig, Server, ServerConfig, ServerError,
};

use common::{
    fatal_error, loopback_conn, transient_error, BlockingHandler, CountingHandler,
    ScriptedListener,
};

fn gaps_ms(times: &[tokio::time::Instant]) -> Vec<u64> {
    times
        .windows(2)
        .map(|w| (w[1] - w[0]).as_millis() as u64)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn backoff_doubles_per_consecutive_transient_error() {
    let listener = ScriptedListener::new(vec![
        transient_error(),
        transient_error(),
        transient_error(),
        transient_error(),
        transient_error(),
        // script exhaustion yields a fatal "listener closed" error
    ]);
    let times = listener.accept_times();

    let server = Server::new(ServerConfig::default());
    let result = server.serve(listener).await;

    assert!(matches!(result, Err(ServerError::Accept(_))));
    let times = times.lock().unwrap();
    assert_eq!(times.len(), 6);
    assert_eq!(gaps_ms(&times), [5, 10, 20, 40, 80]);
}

#[tokio::test(start_paused = true)]
async fn backoff_is_clamped_at_one_second() {
    // Enough consecutive failures to pass the cap: 5ms * 2^8 > 1s.
    let listener = ScriptedListener::new((0..10).map(|_| transient_error()).collect());
    let times = listener.accept_times();

    let server = Server::new(ServerConfig::default());
    let result = server.serve(listener).await;

    assert!(matches!(result, Err(ServerError::Accept(_))));
    let gaps = gaps_ms(&times.lock().unwrap());
    assert_eq!(gaps, [5, 10, 20, 40, 80, 160, 320, 640, 1000, 1000]);
}

#[tokio::test(start_paused = true)]
async fn backoff_resets_after_successful_accept() {
    let (conn, _client) = loopback_conn(Duration::from_secs(60)).await;

    let listener = ScriptedListener::new(vec![
        transient_error(),
        transient_error(),
        Ok(conn),
        transient_error(),
        transient_error(),
    ]);
    let times = listener.accept_times();

    let server = Server::new(ServerConfig::default());
    let result = server.serve(listener).await;

    assert!(matches!(result, Err(ServerError::Accept(_))));
    // 5ms, 10ms, then a success (no sleep), then the progression restarts.
    assert_eq!(gaps_ms(&times.lock().unwrap()), [5, 10, 0, 5, 10]);
}

#[tokio::test(start_paused = true)]
async fn fatal_error_stops_loop_without_retry_and_closes_listener_once() {
    let listener = ScriptedListener::new(vec![fatal_error()]);
    let times = listener.accept_times();
    let closed = listener.close_count();

    let start = tokio::time::Instant::now();
    let server = Server::new(ServerConfig::default());
    let result = server.serve(listener).await;

    let err = match result {
        Err(ServerError::Accept(e)) => e,
        other => panic!("expected accept error, got {other:?}"),
    };
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);

    // Exactly one accept call, no backoff sleep, one close.
    assert_eq!(times.lock().unwrap().len(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn blocked_connection_tasks_do_not_delay_accepts() {
    let (handler, mut started) = BlockingHandler::channel();

    let mut factory = HandlerFactory::new();
    factory.register("blocking", move |_| {
        let shared: Arc<dyn Handler> = handler.clone();
        shared
    });

    let config = ServerConfig {
        locations: vec![LocationConfig {
            pattern: "/".to_string(),
            handler: "blocking".to_string(),
        }],
        ..ServerConfig::default()
    };

    let mut server = Server::new(config);
    server.register_locations(&factory);

    let (c1, _k1) = loopback_conn(Duration::from_secs(60)).await;
    let (c2, _k2) = loopback_conn(Duration::from_secs(60)).await;
    let (c3, _k3) = loopback_conn(Duration::from_secs(60)).await;
    let listener = ScriptedListener::new(vec![Ok(c1), Ok(c2), Ok(c3)]);

    // Every handler blocks forever; the loop must still drain the script
    // and reach the terminal error.
    let result = tokio::time::timeout(Duration::from_secs(5), server.serve(listener))
        .await
        .expect("accept loop stalled behind a connection task");
    assert!(matches!(result, Err(ServerError::Accept(_))));

    for _ in 0..3 {
        tokio::time::timeout(Duration::from_secs(5), started.recv())
            .await
            .expect("dispatched task did not start")
            .expect("channel closed");
    }
}

#[test]
fn unresolvable_handler_skips_location_but_not_the_rest() {
    let (handler, _events) = CountingHandler::channel();

    let mut factory = HandlerFactory::new();
    factory.register("counting", move |_| {
        let shared: Arc<dyn Handler> = handler.clone();
        shared
    });

    let config = ServerConfig {
        locations: vec![
            LocationConfig {
                pattern: "/a".to_string(),
                handler: "counting".to_string(),
            },
            LocationConfig {
                pattern: "/b".to_string(),
                handler: "rtmp-bogus".to_string(),
            },
            LocationConfig {
                pattern: "/c".to_string(),
                handler: "counting".to_string(),
            },
        ],
        ..ServerConfig::default()
    };

    let mut server = Server::new(config);
    server.register_locations(&factory);

    assert_eq!(server.mux().len(), 2);
    assert!(server.mux().lookup("/a").is_some());
    assert!(server.mux().lookup("/b").is_none());
    assert!(server.mux().lookup("/c").is_some());
}

#[test]
fn empty_location_fields_register_builtin_at_root() {
    let factory = HandlerFactory::with_builtins();

    let config = ServerConfig {
        locations: vec![LocationConfig::default()],
        ..ServerConfig::default()
    };

    let mut server = Server::new(config);
    server.register_locations(&factory);

    assert_eq!(server.mux().len(), 1);
    assert!(server.mux().lookup("/").is_some());
}
