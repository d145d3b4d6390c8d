//! Tests for the threaded renderer process: submit/swap handshake,
//! backpressure, pooled message recycling, and call-for-call equivalence
//! with the inline process.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use ember_gfx::prelude::*;
use ember_render::prelude::*;

fn graph() -> StaticAssetGraph {
    let mut graph = StaticAssetGraph::new();
    graph.insert_package(
        "world",
        vec![
            ("hero".to_owned(), PathBuf::from("art/hero.png")),
            ("tiles".to_owned(), PathBuf::from("art/tiles.png")),
        ],
    );
    graph
}

fn eye() -> Eye {
    Eye::centered(Vec2::ZERO, Vec2::new(800.0, 600.0))
}

const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

fn sprite_msg(elevation: f32, asset: &str, x: f32) -> RenderMessage {
    RenderMessage::Layered(LayeredMessage::new(
        elevation,
        0.0,
        AssetTag::new("world", asset),
        RenderDescriptor::Sprite(SpriteData {
            position: Vec2::new(x, 0.0),
            ..SpriteData::default()
        }),
    ))
}

/// Spin until `cond` holds, failing the test after a generous deadline.
fn wait_for(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        std::thread::yield_now();
    }
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

#[test]
fn redundant_swap_is_rejected_while_a_request_is_pending() {
    let mut process =
        ThreadedProcess::new(RecordingBackend::new(), graph(), ProcessConfig::default());
    process.start().expect("start");

    // No submission exists, so the worker never clears the request flag.
    process.swap().expect("first swap");
    assert!(matches!(process.swap(), Err(ProcessError::RedundantSwap)));

    process.terminate().expect("terminate");
}

#[test]
fn second_submit_while_slot_is_full_reports_frame_in_flight() {
    let mut process =
        ThreadedProcess::new(RecordingBackend::new(), graph(), ProcessConfig::default());
    process.start().expect("start");

    process
        .enqueue_message(sprite_msg(0.0, "hero", 0.0))
        .expect("enqueue");
    process.submit_messages(eye(), VIEWPORT).expect("first submit");

    // Once the worker drains the slot it parks waiting for a swap request,
    // so the next submission sits in the slot undrained.
    wait_for("the worker to drain the first submission", || {
        !process.submission_pending()
    });
    process.submit_messages(eye(), VIEWPORT).expect("second submit");

    assert!(
        matches!(
            process.submit_messages(eye(), VIEWPORT),
            Err(ProcessError::FrameInFlight)
        ),
        "the undrained slot must refuse a third submission"
    );

    process.terminate().expect("terminate");
}

#[test]
fn backend_is_reachable_only_while_stopped() {
    let mut process =
        ThreadedProcess::new(RecordingBackend::new(), graph(), ProcessConfig::default());
    assert!(process.backend().is_some());

    process.start().expect("start");
    assert!(process.backend().is_none(), "the worker owns the backend");

    process.terminate().expect("terminate");
    assert!(process.backend().is_some(), "terminate hands the backend back");
}

// ---------------------------------------------------------------------------
// Frames and shutdown
// ---------------------------------------------------------------------------

#[test]
fn terminate_frees_every_asset_loaded_by_the_worker() {
    let backend = RecordingBackend::new();
    let log = backend.log_handle();
    let mut process = ThreadedProcess::new(backend, graph(), ProcessConfig::default());

    process.start().expect("start");
    process
        .enqueue_message(sprite_msg(0.0, "hero", 0.0))
        .expect("enqueue");
    process.submit_messages(eye(), VIEWPORT).expect("submit");
    wait_for("the frame to render", || {
        log.lock()
            .expect("log")
            .iter()
            .any(|c| matches!(c, BackendCall::EndFrame))
    });
    process.terminate().expect("terminate");

    let calls = log.lock().expect("log").clone();
    let creates = calls
        .iter()
        .filter(|c| matches!(c, BackendCall::CreateTexture { .. }))
        .count();
    let destroys = calls
        .iter()
        .filter(|c| matches!(c, BackendCall::DestroyTexture(_)))
        .count();
    assert!(creates > 0, "the frame loads the package");
    assert_eq!(creates, destroys, "worker shutdown frees every handle");
}

#[test]
fn pooled_messages_return_to_the_pool_after_the_frame() {
    let mut process =
        ThreadedProcess::new(RecordingBackend::new(), graph(), ProcessConfig { pool_preallocation: 4 });
    let pool = process.pool();
    process.start().expect("start");

    let mut msg = pool.acquire();
    msg.elevation = 0.0;
    msg.horizon = 0.0;
    msg.tag = AssetTag::new("world", "hero");
    msg.descriptor = RenderDescriptor::CachedSprite(SpriteData::default());
    assert_eq!(pool.available(), 3);

    process
        .enqueue_message(RenderMessage::Layered(msg))
        .expect("enqueue");
    process.submit_messages(eye(), VIEWPORT).expect("submit");

    wait_for("the worker to recycle the frame", || pool.available() == 4);
    assert_eq!(pool.total_allocated(), 4, "no fresh allocation was needed");

    process.terminate().expect("terminate");
}

// ---------------------------------------------------------------------------
// Equivalence with the inline process
// ---------------------------------------------------------------------------

/// The same message stream must hit the backend identically whichever
/// process runs it.
#[test]
fn threaded_and_inline_produce_the_same_call_sequence() {
    let messages = || {
        vec![
            RenderMessage::HintPackageUse("world".to_owned()),
            sprite_msg(2.0, "tiles", 2.0),
            sprite_msg(1.0, "hero", 1.0),
        ]
    };

    // Inline run.
    let mut inline = InlineProcess::new(RecordingBackend::new(), graph());
    inline.start().expect("start");
    for msg in messages() {
        inline.enqueue_message(msg).expect("enqueue");
    }
    inline.submit_messages(eye(), VIEWPORT).expect("submit");
    inline.swap().expect("swap");
    let inline_log = inline.backend().log_handle();
    inline.terminate().expect("terminate");

    // Threaded run, paced so every frame step completes before the next.
    let backend = RecordingBackend::new();
    let threaded_log = backend.log_handle();
    let mut threaded = ThreadedProcess::new(backend, graph(), ProcessConfig::default());
    threaded.start().expect("start");
    for msg in messages() {
        threaded.enqueue_message(msg).expect("enqueue");
    }
    threaded.submit_messages(eye(), VIEWPORT).expect("submit");
    wait_for("the frame to render", || !threaded.submission_pending());
    threaded.swap().expect("swap");
    wait_for("the present", || {
        threaded_log
            .lock()
            .expect("log")
            .iter()
            .any(|c| matches!(c, BackendCall::Present))
    });
    threaded.terminate().expect("terminate");

    let inline_calls = inline_log.lock().expect("log").clone();
    let threaded_calls = threaded_log.lock().expect("log").clone();
    assert_eq!(inline_calls, threaded_calls);
}
