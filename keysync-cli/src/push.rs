use std::collections::BTreeMap;

use keysync::{Keyset, Specification, TankerClient, Transport};

use crate::extract::extract_keysets;

/// What a push did to one keyset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedKeyset {
    pub name: String,
    pub keys: usize,
    /// The keyset did not exist remotely and was created first.
    pub created: bool,
}

/// Creates every keyset missing remotely, then replaces each keyset's
/// `language` values with the local ones.
pub fn push_keysets<T: Transport>(
    client: &TankerClient<T>,
    keysets: &BTreeMap<String, Keyset>,
    language: &str,
) -> Result<Vec<PushedKeyset>, String> {
    let remote = client
        .list_keysets()
        .map_err(|e| format!("Failed to list keysets: {}", e))?;

    let mut pushed = Vec::with_capacity(keysets.len());
    for keyset in keysets.values() {
        let created = !remote.contains(&keyset.name);
        if created {
            client
                .create_keyset(&keyset.name)
                .map_err(|e| format!("Failed to create keyset {}: {}", keyset.name, e))?;
        }
        client
            .replace_keyset(keyset, Some(language))
            .map_err(|e| format!("Failed to upload keyset {}: {}", keyset.name, e))?;
        pushed.push(PushedKeyset {
            name: keyset.name.clone(),
            keys: keyset.len(),
            created,
        });
    }
    Ok(pushed)
}

pub fn run_push_command<T: Transport>(
    spec: &Specification,
    client: &TankerClient<T>,
    files: &[String],
) -> Result<(), String> {
    let language = spec.development_language.as_str();
    let keysets = extract_keysets(spec, files, language)?;
    if keysets.is_empty() {
        eprintln!("No strings found, nothing to push");
        return Ok(());
    }

    for keyset in push_keysets(client, &keysets, language)? {
        let note = if keyset.created { " (new)" } else { "" };
        println!("✅ Pushed {}{}: {} key(s)", keyset.name, note, keyset.keys);
    }
    Ok(())
}
