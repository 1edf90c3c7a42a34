//! Record, verify, and report through the harness library.

use folio_core::{HostCommand, KeyCode, PageEvent, Target};
use folio_harness::{HarnessError, PageFile, commands_to_jsonl, parse_events, record, verify};
use folio_page::{SessionTrace, TraceRecord};
use pretty_assertions::assert_eq;

const PAGE: &str = r#"{
  "config": { "contact_email": "studio@example.org" },
  "snapshot": {
    "media": [
      { "type": "youtube", "src": "https://youtu.be/abc123", "title": "Reel" },
      { "type": "video", "src": "", "title": "Missing" }
    ],
    "lazy_images": [ { "data_src": "/img/a.jpg" } ],
    "has_year": true
  }
}"#;

const EVENTS: &str = r#"
# open the reel, step forward onto the missing clip, then leave
{"kind":"activate","target":{"element":"media_entry","index":0}}
{"kind":"key","phase":"down","code":"Right"}
{"kind":"key","phase":"down","code":"Escape"}
{"kind":"proximity","image":0,"distance_px":0}
"#;

fn session() -> SessionTrace {
    let page = PageFile::from_json_str(PAGE).unwrap();
    let events = parse_events(EVENTS).unwrap();
    record(page, events, 2031)
}

#[test]
fn recorded_session_verifies() {
    let trace = session();
    assert_eq!(trace.step_count(), 5);

    let result = verify(&trace).unwrap();
    assert!(result.ok());
    assert_eq!(Some(result.final_checksum_chain), trace.final_checksum_chain());
    assert_eq!(result.commands.first(), Some(&HostCommand::SetYear { year: 2031 }));
    assert!(result.commands.contains(&HostCommand::LockScroll));
    assert!(result.commands.contains(&HostCommand::UnlockScroll));
    assert!(result.commands.iter().any(|c| matches!(
        c,
        HostCommand::MountSurface { html } if html.contains("Media not found.")
    )));
}

#[test]
fn trace_survives_jsonl() {
    let trace = session();
    let jsonl = trace.to_jsonl().unwrap();
    let loaded = SessionTrace::from_jsonl_validated(&jsonl).unwrap();
    assert_eq!(loaded, trace);
    assert_eq!(
        loaded.events().collect::<Vec<_>>(),
        parse_events(EVENTS).unwrap()
    );
}

#[test]
fn edited_input_is_caught() {
    let mut trace = session();
    let first_input = trace
        .records
        .iter_mut()
        .find(|r| matches!(r, TraceRecord::Input { .. }))
        .unwrap();
    *first_input = TraceRecord::Input {
        data: (&PageEvent::activate(Target::NavToggle)).into(),
    };

    let err = verify(&trace).unwrap_err();
    assert!(matches!(err, HarnessError::Diverged { step: 1, .. }), "{err}");
}

#[test]
fn commands_print_one_per_line() {
    let out = commands_to_jsonl(&[
        HostCommand::LockScroll,
        HostCommand::Focus {
            target: Target::SurfaceClose,
        },
    ])
    .unwrap();
    assert_eq!(
        out,
        "{\"op\":\"lock_scroll\"}\n{\"op\":\"focus\",\"target\":{\"element\":\"surface_close\"}}\n"
    );
}

#[test]
fn invalid_config_is_rejected() {
    let err = PageFile::from_json_str(r#"{"config":{"contact_email":""}}"#).unwrap_err();
    assert!(matches!(err, HarnessError::Config(_)), "{err}");
}

#[test]
fn unhandled_keys_still_checkpoint() {
    let page = PageFile::from_json_str(PAGE).unwrap();
    let trace = record(page, [PageEvent::key(KeyCode::Char('q'))], 2031);
    let result = verify(&trace).unwrap();
    assert_eq!(result.total_steps, 2);
    assert_eq!(result.commands, vec![HostCommand::SetYear { year: 2031 }]);
}
