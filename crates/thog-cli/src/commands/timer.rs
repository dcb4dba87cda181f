//! Timer control: `thog start`, `thog stop` and `thog reset`.

use anyhow::{Result, bail};
use chrono::Utc;
use thog_store::Store;

use super::util::resolve_person;

/// Starts a person's timer. Silently a no-op when already running.
pub fn start(store: &Store, query: &str) -> Result<()> {
    let now = Utc::now();
    let mut persons = store.load()?;
    let index = resolve_person(&persons, query)?;

    match persons[index].start_timer(now) {
        Some(event) => {
            store.save(&persons)?;
            println!("{event}");
        }
        None => println!("timer already running for {}", persons[index].name),
    }
    Ok(())
}

/// Stops a person's timer, recording a session. Silently a no-op when not
/// running.
pub fn stop(store: &Store, query: &str) -> Result<()> {
    let now = Utc::now();
    let mut persons = store.load()?;
    let index = resolve_person(&persons, query)?;

    match persons[index].stop_timer(now) {
        Some(event) => {
            store.save(&persons)?;
            println!("{event}");
        }
        None => println!("no running timer for {}", persons[index].name),
    }
    Ok(())
}

/// Stops every running timer.
pub fn stop_all(store: &Store) -> Result<()> {
    let now = Utc::now();
    let mut persons = store.load()?;

    let mut stopped = 0;
    for person in &mut persons {
        if let Some(event) = person.stop_timer(now) {
            println!("{event}");
            stopped += 1;
        }
    }
    if stopped == 0 {
        println!("no timers running");
        return Ok(());
    }
    store.save(&persons)?;
    println!("{stopped} timer{} stopped", if stopped == 1 { "" } else { "s" });
    Ok(())
}

/// Clears one person's sessions and running state.
pub fn reset(store: &Store, query: &str, force: bool) -> Result<()> {
    if !force {
        bail!("reset discards all recorded sessions and cannot be undone; pass --force to confirm");
    }
    let mut persons = store.load()?;
    let index = resolve_person(&persons, query)?;

    let event = persons[index].reset_sessions();
    store.save(&persons)?;
    println!("{event}");
    Ok(())
}

/// Clears every person's sessions and running state.
pub fn reset_all(store: &Store, force: bool) -> Result<()> {
    if !force {
        bail!("reset discards all recorded sessions and cannot be undone; pass --force to confirm");
    }
    let mut persons = store.load()?;
    for person in &mut persons {
        person.reset_sessions();
    }
    store.save(&persons)?;
    println!("all timers have been reset");
    Ok(())
}
