//! Session history inspection and editing: `thog sessions`.

use std::fmt::Write;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use thog_core::editor::CommitOutcome;
use thog_core::{EntryRef, Person, SessionEditor, format_time, parse_datetime};
use thog_store::Store;

use super::util::resolve_person;

fn local_stamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Renders a person's session list, including the running entry.
fn render_list(person: &Person, editor: &SessionEditor) -> String {
    let mut output = String::new();
    let count = editor.drafts().len() + usize::from(editor.current().is_some());
    writeln!(
        output,
        "{} - {} session{}, total {}",
        person.name,
        count,
        if count == 1 { "" } else { "s" },
        format_time(editor.preview_total_secs())
    )
    .unwrap();

    if count == 0 {
        writeln!(output, "no recorded sessions").unwrap();
        return output;
    }

    for draft in editor.drafts() {
        writeln!(
            output,
            "{}  {} -> {}  {}",
            draft.id,
            local_stamp(draft.start_time),
            local_stamp(draft.end_time),
            format_time(draft.duration_secs())
        )
        .unwrap();
    }
    if let Some(current) = editor.current() {
        writeln!(
            output,
            "{:<36}  {} -> now                  {}  RUNNING",
            "current",
            local_stamp(current.started_at),
            format_time(current.elapsed_secs())
        )
        .unwrap();
    }
    output
}

/// Installs a commit outcome on the person, surfacing the filtering pass.
fn apply_outcome(person: &mut Person, outcome: CommitOutcome) {
    if outcome.dropped_invalid > 0 {
        println!(
            "{} invalid session{} removed",
            outcome.dropped_invalid,
            if outcome.dropped_invalid == 1 { "" } else { "s" }
        );
    }
    person.replace_sessions(outcome.sessions);
}

/// Lists a person's sessions.
pub fn list(store: &Store, query: &str) -> Result<()> {
    let now = Utc::now();
    let persons = store.load()?;
    let index = resolve_person(&persons, query)?;
    let editor = SessionEditor::for_person(&persons[index], now);
    print!("{}", render_list(&persons[index], &editor));
    Ok(())
}

/// Adds a closed session from two timestamps.
pub fn add(store: &Store, query: &str, start: &str, end: &str) -> Result<()> {
    let now = Utc::now();
    let start = parse_datetime(start)?;
    let end = parse_datetime(end)?;

    let mut persons = store.load()?;
    let index = resolve_person(&persons, query)?;

    let mut editor = SessionEditor::for_person(&persons[index], now);
    let id = editor.add(start, end)?;
    apply_outcome(&mut persons[index], editor.commit());
    store.save(&persons)?;

    println!("session {id} added for {}", persons[index].name);
    Ok(())
}

/// Edits a session's start and/or end; duration is recomputed at commit.
pub fn edit(
    store: &Store,
    query: &str,
    session: EntryRef,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<()> {
    let now = Utc::now();
    let mut persons = store.load()?;
    let index = resolve_person(&persons, query)?;

    let mut editor = SessionEditor::for_person(&persons[index], now);
    if let Some(start) = start {
        editor.set_start(session, parse_datetime(start)?)?;
    }
    if let Some(end) = end {
        editor.set_end(session, parse_datetime(end)?)?;
    }
    apply_outcome(&mut persons[index], editor.commit());
    store.save(&persons)?;

    println!("sessions updated for {}", persons[index].name);
    Ok(())
}

/// Deletes a historical session. The running entry is refused.
pub fn delete(store: &Store, query: &str, session: EntryRef) -> Result<()> {
    let now = Utc::now();
    let mut persons = store.load()?;
    let index = resolve_person(&persons, query)?;

    let mut editor = SessionEditor::for_person(&persons[index], now);
    editor.delete(session)?;
    apply_outcome(&mut persons[index], editor.commit());
    store.save(&persons)?;

    println!("session deleted for {}", persons[index].name);
    Ok(())
}
