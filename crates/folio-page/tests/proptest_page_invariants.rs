//! Property-based invariant tests for the page controller.
//!
//! Verifies:
//! 1. Email validation accepts every generated `local@domain.tld`
//! 2. Email validation rejects anything without exactly one '@'
//! 3. Rejected submissions never open mail or touch the clipboard
//! 4. Accepted submissions produce a mailto link with no raw reserved chars
//! 5. Lazy images are unobserved at most once, whatever the report order
//! 6. Any recorded session replays with identical checksums
//! 7. Recorded traces survive a JSONL roundtrip

use std::collections::BTreeMap;

use folio_core::{HostCommand, KeyCode, PageEvent, RecordingHost, Target};
use folio_page::{
    LazyImageAttrs, LazyImages, PageConfig, PageSnapshot, SessionRecorder, SessionTrace,
    SubmitOutcome, form, is_valid_email, replay,
};
use folio_viewer::MediaEntryAttrs;
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_email() -> impl Strategy<Value = String> {
    ("[a-z0-9._+-]{1,12}", "[a-z0-9-]{1,12}", "[a-z]{2,6}")
        .prop_map(|(local, host, tld)| format!("{local}@{host}.{tld}"))
}

fn arb_fields() -> impl Strategy<Value = BTreeMap<String, String>> {
    (
        prop_oneof![Just(String::new()), Just("  ".to_string()), ".{1,20}"],
        prop_oneof![arb_email(), ".{0,20}"],
        ".{0,10}",
        prop_oneof![Just(String::new()), ".{1,40}"],
    )
        .prop_map(|(name, email, budget, details)| {
            [
                ("name", name),
                ("email", email),
                ("budget", budget),
                ("details", details),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
        })
}

fn snapshot() -> PageSnapshot {
    PageSnapshot {
        media: vec![
            MediaEntryAttrs::new("video", "/reel.mp4", "Reel"),
            MediaEntryAttrs::new("youtube", "https://youtu.be/abc", "Talk"),
            MediaEntryAttrs::new("vimeo", "", "Missing"),
        ],
        lazy_images: vec![LazyImageAttrs::new("/a.jpg"), LazyImageAttrs::new("/b.jpg")],
        has_year: true,
    }
}

fn arb_event() -> impl Strategy<Value = PageEvent> {
    prop_oneof![
        (0usize..4).prop_map(|index| PageEvent::activate(Target::MediaEntry { index })),
        Just(PageEvent::activate(Target::SurfaceBackdrop)),
        Just(PageEvent::activate(Target::SurfaceNext)),
        Just(PageEvent::activate(Target::NavToggle)),
        Just(PageEvent::activate(Target::NavLink)),
        Just(PageEvent::key(KeyCode::Escape)),
        Just(PageEvent::key(KeyCode::Left)),
        Just(PageEvent::key(KeyCode::Right)),
        Just(PageEvent::key(KeyCode::Tab)),
        arb_fields().prop_map(|fields| PageEvent::Submit { fields }),
        (0usize..3, 0u32..400).prop_map(|(image, distance_px)| PageEvent::Proximity {
            image,
            distance_px
        }),
    ]
}

// ── Properties ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn well_formed_emails_pass(email in arb_email()) {
        prop_assert!(is_valid_email(&email));
    }

    #[test]
    fn at_count_other_than_one_fails(s in "[a-z.]{0,20}", extra in "@[a-z.]{0,5}@[a-z.]{1,5}") {
        prop_assert!(!is_valid_email(&s));
        let joined = format!("{}{}", s, extra);
        prop_assert!(!is_valid_email(&joined));
    }

    #[test]
    fn submissions_are_all_or_nothing(fields in arb_fields()) {
        let mut host = RecordingHost::new();
        match form::submit(&fields, &PageConfig::default(), &mut host) {
            SubmitOutcome::Rejected(_) => {
                prop_assert_eq!(host.mail_href(), None);
                prop_assert_eq!(host.clipboard(), None);
            }
            SubmitOutcome::Sent(draft) => {
                let href = host.mail_href().unwrap_or_default();
                let draft_href = draft.href();
                prop_assert_eq!(href, draft_href.as_str());
                let query = href.split_once('?').map(|(_, q)| q).unwrap_or_default();
                for part in query.split('&') {
                    let value = part.split_once('=').map(|(_, v)| v).unwrap_or_default();
                    prop_assert!(!value.contains(' '));
                    prop_assert!(!value.contains('\n'));
                    prop_assert!(!value.contains('&'));
                    prop_assert!(!value.contains('='));
                }
            }
        }
    }

    #[test]
    fn lazy_images_unobserve_once(reports in prop::collection::vec((0usize..3, 0u32..400), 0..40)) {
        let attrs = vec![
            LazyImageAttrs::new("/a.jpg"),
            LazyImageAttrs::new("/b.jpg"),
            LazyImageAttrs::default(),
        ];
        let mut lazy = LazyImages::new(&attrs, 200);
        let mut host = RecordingHost::new();
        for (index, distance) in reports {
            lazy.report(index, distance, &mut host);
        }
        let mut seen = host.unobserved_images().to_vec();
        let total = seen.len();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), total);
        prop_assert_eq!(lazy.pending(), 3 - total);
    }

    #[test]
    fn sessions_replay_identically(events in prop::collection::vec(arb_event(), 0..24)) {
        let mut rec = SessionRecorder::new(PageConfig::default(), snapshot(), 2026);
        for event in events {
            rec.push_event(event);
        }
        let scroll_locked = rec.host().scroll_locked();
        prop_assert_eq!(scroll_locked, rec.page().viewer().is_open());

        let trace = rec.finish();
        prop_assert!(trace.validate().is_ok());
        let result = replay(&trace).unwrap();
        prop_assert!(result.ok());
        prop_assert_eq!(Some(result.final_checksum_chain), trace.final_checksum_chain());
        prop_assert_eq!(result.commands.first(), Some(&HostCommand::SetYear { year: 2026 }));
    }

    #[test]
    fn traces_survive_jsonl(events in prop::collection::vec(arb_event(), 0..12)) {
        let mut rec = SessionRecorder::new(PageConfig::default(), snapshot(), 2026);
        for event in events {
            rec.push_event(event);
        }
        let trace = rec.finish();
        let text = trace.to_jsonl().unwrap();
        let parsed = SessionTrace::from_jsonl_validated(&text).unwrap();
        prop_assert_eq!(parsed, trace);
    }
}
