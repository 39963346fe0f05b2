//! Property tests for the pure pieces: side resolution, filtering and palette navigation.

use gpui_manos_blocks_core::{
    AnchorPosition, BlocksConfig, CommandPalette, DropSide, PaletteEvent, Rect, default_catalog,
    filter_commands, resolve_side,
};
use proptest::prelude::*;

fn rect() -> impl Strategy<Value = Rect> {
    (-500f32..500., -500f32..500., 1f32..400., 1f32..400.)
        .prop_map(|(left, top, width, height)| Rect::new(left, top, width, height))
}

proptest! {
    #[test]
    fn side_follows_midpoint(bounds in rect(), pointer_y in -1000f32..1000.) {
        let expected = if pointer_y < bounds.top + bounds.height / 2.0 {
            DropSide::Before
        } else {
            DropSide::After
        };
        prop_assert_eq!(resolve_side(pointer_y, bounds), expected);
    }

    #[test]
    fn exact_midpoint_is_after(bounds in rect()) {
        prop_assert_eq!(resolve_side(bounds.mid_y(), bounds), DropSide::After);
    }

    #[test]
    fn filter_is_an_ordered_subsequence(query in "[a-zа-я ]{0,6}") {
        let catalog = default_catalog(&BlocksConfig::default().with_defaults());
        let commands = catalog.commands();
        let result = filter_commands(commands, &query);

        // Deterministic.
        let again = filter_commands(commands, &query);
        prop_assert_eq!(
            result.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            again.iter().map(|c| c.id.as_str()).collect::<Vec<_>>()
        );

        // Exactly the matching entries, in catalog order.
        let needle = query.to_lowercase();
        let expected: Vec<&str> = commands
            .iter()
            .filter(|c| {
                c.title.to_lowercase().contains(&needle)
                    || c.keywords.iter().any(|k| k.to_lowercase().contains(&needle))
            })
            .map(|c| c.id.as_str())
            .collect();
        prop_assert_eq!(
            result.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            expected
        );
    }

    #[test]
    fn selection_stays_in_bounds(
        query in "[a-z]{0,2}",
        moves in proptest::collection::vec(any::<bool>(), 0..32),
    ) {
        let mut palette =
            CommandPalette::new(default_catalog(&BlocksConfig::default().with_defaults()));
        palette.handle(PaletteEvent::Open { anchor: AnchorPosition::default() });
        palette.handle(PaletteEvent::SetQuery(query));
        let len = palette.filtered().len();

        for down in moves {
            palette.handle(if down { PaletteEvent::SelectNext } else { PaletteEvent::SelectPrev });
            match palette.selected_index() {
                Some(ix) => prop_assert!(ix < len),
                None => prop_assert_eq!(len, 0),
            }
        }
    }
}
