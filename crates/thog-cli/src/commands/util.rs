//! Shared helpers for subcommands.

use anyhow::{Result, bail};
use thog_core::Person;

/// Resolves a person by name (case-insensitive, exact) or by id prefix.
///
/// Name matches win over id-prefix matches; either kind of match must be
/// unique to resolve.
pub fn resolve_person(persons: &[Person], query: &str) -> Result<usize> {
    let by_name: Vec<usize> = persons
        .iter()
        .enumerate()
        .filter(|(_, p)| p.name.as_str().eq_ignore_ascii_case(query))
        .map(|(index, _)| index)
        .collect();
    match by_name.as_slice() {
        [index] => return Ok(*index),
        [] => {}
        _ => bail!("person name '{query}' is ambiguous; use an id prefix instead"),
    }

    let prefix = query.to_ascii_lowercase();
    let by_id: Vec<usize> = persons
        .iter()
        .enumerate()
        .filter(|(_, p)| p.id().to_string().starts_with(&prefix))
        .map(|(index, _)| index)
        .collect();
    match by_id.as_slice() {
        [index] => Ok(*index),
        [] => bail!("no person matching '{query}'"),
        _ => bail!("id prefix '{query}' is ambiguous"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thog_core::PersonName;

    fn persons() -> Vec<Person> {
        vec![
            Person::new(PersonName::new("Alice Martin").unwrap()),
            Person::new(PersonName::new("Bob Smith").unwrap()),
        ]
    }

    #[test]
    fn resolves_by_name_case_insensitively() {
        let persons = persons();
        assert_eq!(resolve_person(&persons, "alice martin").unwrap(), 0);
        assert_eq!(resolve_person(&persons, "Bob Smith").unwrap(), 1);
    }

    #[test]
    fn resolves_by_id_prefix() {
        let persons = persons();
        let id = persons[1].id().to_string();
        assert_eq!(resolve_person(&persons, &id[..8]).unwrap(), 1);
    }

    #[test]
    fn unknown_person_is_an_error() {
        let persons = persons();
        assert!(resolve_person(&persons, "Claire").is_err());
    }

    #[test]
    fn empty_directory_is_an_error() {
        assert!(resolve_person(&[], "anyone").is_err());
    }
}
