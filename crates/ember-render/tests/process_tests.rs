//! Tests for the renderer process protocol on the inline implementation:
//! lifecycle violations, queue handling, and end-to-end frame scenarios.

use std::path::PathBuf;

use ember_gfx::prelude::*;
use ember_render::prelude::*;

fn graph() -> StaticAssetGraph {
    let mut graph = StaticAssetGraph::new();
    graph.insert_package(
        "world",
        vec![("hero".to_owned(), PathBuf::from("art/hero.png"))],
    );
    graph
}

fn process() -> InlineProcess<RecordingBackend> {
    InlineProcess::new(RecordingBackend::new(), graph())
}

fn eye() -> Eye {
    Eye::centered(Vec2::ZERO, Vec2::new(800.0, 600.0))
}

const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

fn sprite_msg(color: Color, glow: Color) -> RenderMessage {
    RenderMessage::Layered(LayeredMessage::new(
        0.0,
        0.0,
        AssetTag::new("world", "hero"),
        RenderDescriptor::Sprite(SpriteData {
            color,
            glow,
            ..SpriteData::default()
        }),
    ))
}

// ---------------------------------------------------------------------------
// Protocol violations
// ---------------------------------------------------------------------------

#[test]
fn enqueue_before_start_is_rejected() {
    let mut process = process();
    let result = process.enqueue_message(sprite_msg(Color::WHITE, Color::TRANSPARENT));
    assert!(matches!(result, Err(ProcessError::NotStarted)));
}

#[test]
fn double_start_is_rejected() {
    let mut process = process();
    process.start().expect("first start");
    assert!(matches!(process.start(), Err(ProcessError::AlreadyStarted)));
}

#[test]
fn terminate_before_start_is_rejected() {
    let mut process = process();
    assert!(matches!(process.terminate(), Err(ProcessError::NotStarted)));
}

#[test]
fn double_terminate_is_rejected() {
    let mut process = process();
    process.start().expect("start");
    process.terminate().expect("first terminate");
    assert!(matches!(process.terminate(), Err(ProcessError::NotStarted)));
}

#[test]
fn enqueue_after_terminate_is_rejected() {
    let mut process = process();
    process.start().expect("start");
    process.terminate().expect("terminate");
    let result = process.enqueue_message(sprite_msg(Color::WHITE, Color::TRANSPARENT));
    assert!(matches!(result, Err(ProcessError::NotStarted)));
}

#[test]
fn a_terminated_process_can_be_restarted() {
    let mut process = process();
    process.start().expect("start");
    process.terminate().expect("terminate");
    process.start().expect("restart");
    process
        .enqueue_message(sprite_msg(Color::WHITE, Color::TRANSPARENT))
        .expect("enqueue after restart");
    process.terminate().expect("final terminate");
}

// ---------------------------------------------------------------------------
// Queue handling
// ---------------------------------------------------------------------------

#[test]
fn clear_messages_discards_the_pending_queue() {
    let mut process = process();
    process.start().expect("start");
    process
        .enqueue_message(sprite_msg(Color::WHITE, Color::TRANSPARENT))
        .expect("enqueue");
    process.clear_messages().expect("clear");
    process.submit_messages(eye(), VIEWPORT).expect("submit");

    assert_eq!(process.backend().quad_count(), 0, "cleared messages never render");
}

#[test]
fn submit_resets_the_queue() {
    let mut process = process();
    process.start().expect("start");
    process
        .enqueue_message(sprite_msg(Color::WHITE, Color::TRANSPARENT))
        .expect("enqueue");
    process.submit_messages(eye(), VIEWPORT).expect("first submit");
    process.submit_messages(eye(), VIEWPORT).expect("second submit");

    assert_eq!(
        process.backend().quad_count(),
        1,
        "the second submit renders an empty frame"
    );
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn opaque_red_sprite_with_no_glow_draws_one_transparent_quad() {
    let mut process = process();
    process.start().expect("start");
    process
        .enqueue_message(sprite_msg(Color::rgb(1.0, 0.0, 0.0), Color::TRANSPARENT))
        .expect("enqueue");
    process.submit_messages(eye(), VIEWPORT).expect("submit");

    let quads: Vec<QuadSubmission> = process
        .backend()
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            BackendCall::SubmitQuad(q) => Some(q),
            _ => None,
        })
        .collect();
    assert_eq!(quads.len(), 1, "exactly one quad for the sprite");
    assert_eq!(quads[0].blend, BlendMode::Transparent.triple());
    assert!(
        !quads.iter().any(|q| q.blend == BlendMode::Additive.triple()),
        "glow alpha 0 must not fire the additive pass"
    );
}

#[test]
fn swap_presents_and_terminate_frees_everything() {
    let mut process = process();
    process.start().expect("start");
    process
        .enqueue_message(sprite_msg(Color::WHITE, Color::TRANSPARENT))
        .expect("enqueue");
    process.submit_messages(eye(), VIEWPORT).expect("submit");
    process.swap().expect("swap");

    let log = process.backend().log_handle();
    process.terminate().expect("terminate");

    let calls = log.lock().expect("log").clone();
    assert!(
        calls.iter().any(|c| matches!(c, BackendCall::Present)),
        "swap presents"
    );
    let creates = calls
        .iter()
        .filter(|c| matches!(c, BackendCall::CreateTexture { .. }))
        .count();
    let destroys = calls
        .iter()
        .filter(|c| matches!(c, BackendCall::DestroyTexture(_)))
        .count();
    assert_eq!(creates, destroys, "terminate frees every loaded asset");
}

#[test]
fn asset_resolvable_consults_the_asset_graph() {
    let process = process();
    assert!(process.asset_resolvable(&AssetTag::new("world", "hero")));
    assert!(!process.asset_resolvable(&AssetTag::new("world", "villain")));
    assert!(!process.asset_resolvable(&AssetTag::new("void", "hero")));
}
