//! Property tests for paint ordering.
//!
//! These tests use `proptest` to generate message batches with colliding
//! sort keys and verify that the paint-order comparator, run through a
//! stable sort, produces the documented total order and preserves enqueue
//! order for full ties.

use ember_render::prelude::*;
use proptest::prelude::*;
use std::cmp::Ordering;

/// Small key pools so batches collide on every component of the sort key.
fn elevation_strategy() -> impl Strategy<Value = f32> {
    prop_oneof![Just(0.0f32), Just(1.0), Just(2.0)]
}

fn horizon_strategy() -> impl Strategy<Value = f32> {
    prop_oneof![Just(-4.5f32), Just(0.0), Just(3.25)]
}

fn name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("alpha".to_owned()),
        Just("beta".to_owned()),
        Just("gamma".to_owned()),
    ]
}

/// A message whose enqueue index is stashed in its sprite's x position.
fn tagged_message(
    index: usize,
    elevation: f32,
    horizon: f32,
    package: String,
    asset: String,
) -> LayeredMessage {
    LayeredMessage::new(
        elevation,
        horizon,
        AssetTag::new(package, asset),
        RenderDescriptor::Sprite(SpriteData {
            position: ember_gfx::math::Vec2::new(index as f32, 0.0),
            ..SpriteData::default()
        }),
    )
}

fn enqueue_index(message: &LayeredMessage) -> usize {
    match &message.descriptor {
        RenderDescriptor::Sprite(sprite) => sprite.position.x as usize,
        _ => unreachable!("only sprites are generated here"),
    }
}

fn batch_strategy() -> impl Strategy<Value = Vec<LayeredMessage>> {
    prop::collection::vec(
        (
            elevation_strategy(),
            horizon_strategy(),
            name_strategy(),
            name_strategy(),
        ),
        0..64,
    )
    .prop_map(|keys| {
        keys.into_iter()
            .enumerate()
            .map(|(i, (elevation, horizon, package, asset))| {
                tagged_message(i, elevation, horizon, package, asset)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn stable_sort_yields_the_documented_paint_order(mut batch in batch_strategy()) {
        batch.sort_by(LayeredMessage::paint_cmp);

        for pair in batch.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);

            // Elevation ascending.
            prop_assert!(a.elevation <= b.elevation);
            if a.elevation < b.elevation {
                continue;
            }
            // Horizon descending within an elevation.
            prop_assert!(a.horizon >= b.horizon);
            if a.horizon > b.horizon {
                continue;
            }
            // Asset then package names ascending within a depth.
            let names = (&a.tag.asset, &a.tag.package).cmp(&(&b.tag.asset, &b.tag.package));
            prop_assert_ne!(names, Ordering::Greater);
            if names == Ordering::Less {
                continue;
            }
            // Full tie: enqueue order survives the stable sort.
            prop_assert!(enqueue_index(a) < enqueue_index(b));
        }
    }

    #[test]
    fn comparator_is_a_total_order_on_generated_keys(batch in batch_strategy()) {
        for a in &batch {
            prop_assert_eq!(a.paint_cmp(a), Ordering::Equal);
            for b in &batch {
                prop_assert_eq!(a.paint_cmp(b), b.paint_cmp(a).reverse());
            }
        }
    }
}
