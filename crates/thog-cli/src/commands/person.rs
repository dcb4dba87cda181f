//! Person directory management: `thog add` and `thog remove`.

use anyhow::{Result, bail};
use thog_core::{Person, PersonName};
use thog_store::Store;

use super::util::resolve_person;

/// Adds a new person with a fresh id.
pub fn add(
    store: &Store,
    name: &str,
    avatar: Option<String>,
    color: Option<String>,
) -> Result<()> {
    let name = PersonName::new(name)?;
    let mut persons = store.load()?;
    if persons
        .iter()
        .any(|p| p.name.as_str().eq_ignore_ascii_case(name.as_str()))
    {
        bail!("a person named '{name}' already exists");
    }

    let mut person = Person::new(name);
    person.avatar = avatar;
    person.avatar_color = color;
    let id = person.id();
    let display_name = person.name.clone();
    persons.push(person);
    store.save(&persons)?;

    println!("{display_name} added to directory ({id})");
    Ok(())
}

/// Removes a person and their entire session history.
pub fn remove(store: &Store, query: &str) -> Result<()> {
    let mut persons = store.load()?;
    let index = resolve_person(&persons, query)?;
    let person = persons.remove(index);
    store.save(&persons)?;

    println!("{} removed from directory", person.name);
    Ok(())
}
