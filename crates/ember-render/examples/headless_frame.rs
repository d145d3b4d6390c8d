//! Headless frame demo -- drives the inline renderer process against the
//! recording backend and prints the backend call summary for one frame.
//!
//! Run with:
//!   cargo run --example headless_frame -p ember-render
//!
//! Set `RUST_LOG=debug` to watch the cache load packages on demand.

use std::path::PathBuf;

use ember_gfx::prelude::*;
use ember_render::prelude::*;
use rand::Rng;

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // A small asset graph: a sprite sheet, a tileset atlas, and a font.
    let mut graph = StaticAssetGraph::new();
    graph.insert_package(
        "demo",
        vec![
            ("hero".to_owned(), PathBuf::from("art/hero.png")),
            ("spark".to_owned(), PathBuf::from("art/spark.png")),
            ("terrain".to_owned(), PathBuf::from("art/terrain.png")),
            ("label".to_owned(), PathBuf::from("fonts/label_16.ttf")),
        ],
    );

    let mut process = InlineProcess::new(RecordingBackend::new(), graph);
    process.start()?;

    let eye = Eye::centered(Vec2::ZERO, Vec2::new(800.0, 600.0));
    let viewport = Vec2::new(800.0, 600.0);

    // Warm the package before the frame needs it.
    process.enqueue_message(RenderMessage::HintPackageUse("demo".to_owned()))?;

    // A ground layer of 4x3 tiles behind everything else.
    process.enqueue_message(RenderMessage::Layered(LayeredMessage::new(
        0.0,
        0.0,
        AssetTag::new("demo", "terrain"),
        RenderDescriptor::TileLayer(TileLayerData {
            origin: Vec2::new(100.0, 100.0),
            columns: 4,
            rows: 3,
            tile_size: Vec2::splat(64.0),
            gids: vec![1, 2, 1, 2, 2, 1, 2, 1, 1, 2, 1, 2],
            tilesets: vec![TilesetRef {
                asset: "terrain".to_owned(),
                first_gid: 1,
                tile_count: None,
                columns: 8,
            }],
        }),
    )))?;

    // The hero sprite, glowing.
    process.enqueue_message(RenderMessage::Layered(LayeredMessage::new(
        1.0,
        300.0,
        AssetTag::new("demo", "hero"),
        RenderDescriptor::Sprite(SpriteData {
            position: Vec2::new(400.0, 300.0),
            glow: Color::rgb(0.9, 0.5, 0.1),
            ..SpriteData::default()
        }),
    )))?;

    // A burst of sparks scattered around the hero.
    let mut rng = rand::thread_rng();
    let particles = (0..32)
        .map(|_| ParticleData {
            position: Vec2::new(
                400.0 + rng.gen_range(-40.0..40.0),
                300.0 + rng.gen_range(-40.0..40.0),
            ),
            size: Vec2::splat(rng.gen_range(2.0..6.0)),
            rotation: rng.gen_range(0.0..std::f32::consts::TAU),
            inset: None,
            color: Color::rgb(1.0, rng.gen_range(0.3..0.9), 0.1),
            glow: Color::rgb(1.0, 0.6, 0.2),
            flip: Flip::NONE,
        })
        .collect();
    process.enqueue_message(RenderMessage::Layered(LayeredMessage::new(
        1.0,
        299.0,
        AssetTag::new("demo", "spark"),
        RenderDescriptor::Particles(particles),
    )))?;

    // A centered caption on top.
    process.enqueue_message(RenderMessage::Layered(LayeredMessage::new(
        2.0,
        0.0,
        AssetTag::new("demo", "label"),
        RenderDescriptor::Text(TextData {
            text: "ember demo".to_owned(),
            position: Vec2::new(300.0, 40.0),
            box_size: Vec2::new(200.0, 30.0),
            justify: Justification::Justified {
                horizontal: HorizontalAlign::Center,
                vertical: VerticalAlign::Middle,
            },
            color: Color::WHITE,
        }),
    )))?;

    process.submit_messages(eye, viewport)?;
    process.swap()?;

    let calls = process.backend().calls();
    println!("frame recorded {} backend calls:", calls.len());
    for call in &calls {
        println!("  {call:?}");
    }
    println!("quads submitted: {}", process.backend().quad_count());

    process.terminate()?;
    Ok(())
}
