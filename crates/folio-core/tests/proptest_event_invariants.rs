//! Property-based invariant tests for the page event schema.
//!
//! Verifies:
//! 1. JSON roundtrip: any PageEvent survives to_json_string → from_json_str
//! 2. KeyCode roundtrip: to_code_string → from_code_string for known codes
//! 3. Modifier bits never exceed the 4-bit mask
//! 4. normalize_dom_key_code: Shift+Tab always produces BackTab
//! 5. normalize_dom_key_code: single-character keys map to Char
//! 6. HostEventQueue preserves push order

use std::collections::BTreeMap;

use folio_core::{
    EventSource, HostEventQueue, KeyCode, KeyInput, KeyPhase, Modifiers, PageEvent, Target,
    normalize_dom_key_code,
};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_modifiers() -> impl Strategy<Value = Modifiers> {
    (0u8..=15).prop_map(Modifiers::from_bits_truncate_u8)
}

fn arb_known_key_code() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        any::<char>()
            .prop_filter("printable", |c| !c.is_control())
            .prop_map(KeyCode::Char),
        Just(KeyCode::Enter),
        Just(KeyCode::Escape),
        Just(KeyCode::Tab),
        Just(KeyCode::BackTab),
        Just(KeyCode::Home),
        Just(KeyCode::End),
        Just(KeyCode::Up),
        Just(KeyCode::Down),
        Just(KeyCode::Left),
        Just(KeyCode::Right),
    ]
}

fn arb_target() -> impl Strategy<Value = Target> {
    prop_oneof![
        (0usize..64).prop_map(|index| Target::MediaEntry { index }),
        Just(Target::SurfaceBackdrop),
        Just(Target::SurfaceClose),
        Just(Target::SurfacePrev),
        Just(Target::SurfaceNext),
        Just(Target::NavToggle),
        Just(Target::NavLink),
        Just(Target::Other),
    ]
}

fn arb_event() -> impl Strategy<Value = PageEvent> {
    prop_oneof![
        (
            prop_oneof![Just(KeyPhase::Down), Just(KeyPhase::Up)],
            arb_known_key_code(),
            arb_modifiers(),
            any::<bool>(),
            proptest::option::of(arb_target()),
        )
            .prop_map(|(phase, code, mods, repeat, target)| PageEvent::Key {
                key: KeyInput {
                    phase,
                    code,
                    mods,
                    repeat,
                },
                target,
            }),
        arb_target().prop_map(|target| PageEvent::Activate { target }),
        proptest::collection::btree_map("[a-z]{1,8}", ".{0,24}", 0..5)
            .prop_map(|fields: BTreeMap<String, String>| PageEvent::Submit { fields }),
        (0usize..32, any::<u32>())
            .prop_map(|(image, distance_px)| PageEvent::Proximity { image, distance_px }),
    ]
}

proptest! {
    #[test]
    fn json_roundtrip_preserves_event(event in arb_event()) {
        let json = event.to_json_string().expect("serialize");
        let back = PageEvent::from_json_str(&json).expect("deserialize");
        prop_assert_eq!(back, event);
    }

    #[test]
    fn key_code_string_roundtrip(code in arb_known_key_code()) {
        let s = code.to_code_string();
        prop_assert_eq!(KeyCode::from_code_string(&s, None, None), code);
    }

    #[test]
    fn modifier_bits_stay_in_mask(bits in any::<u8>()) {
        let mods = Modifiers::from_bits_truncate_u8(bits);
        prop_assert!(mods.bits() <= 0b1111);
    }

    #[test]
    fn shift_tab_is_always_backtab(mods in arb_modifiers()) {
        let mods = mods | Modifiers::SHIFT;
        prop_assert_eq!(normalize_dom_key_code("Tab", "Tab", mods), KeyCode::BackTab);
    }

    #[test]
    fn single_char_keys_are_chars(c in any::<char>().prop_filter("not tab", |c| *c != '\t')) {
        let key = c.to_string();
        prop_assert_eq!(
            normalize_dom_key_code(&key, "KeyA", Modifiers::empty()),
            KeyCode::Char(c)
        );
    }

    #[test]
    fn queue_preserves_push_order(events in proptest::collection::vec(arb_event(), 0..32)) {
        let mut queue = HostEventQueue::new();
        for ev in &events {
            queue.push_event(ev.clone());
        }
        let mut out = Vec::new();
        while let Some(ev) = queue.next_event() {
            out.push(ev);
        }
        prop_assert_eq!(out, events);
    }
}
