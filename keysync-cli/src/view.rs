use std::collections::BTreeMap;

use keysync::{Keyset, traits::Parser};

const PREVIEW_CHARS: usize = 50;

fn preview(value: &str, full: bool) -> String {
    if full || value.chars().count() <= PREVIEW_CHARS {
        value.to_string()
    } else {
        let truncated: String = value.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", truncated)
    }
}

/// Human readable summary of one keyset.
pub fn render_keyset(keyset: &Keyset, full: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Keyset: {} ===\n", keyset.name));
    out.push_str(&format!("Keys: {}\n", keyset.len()));
    let languages: Vec<&str> = keyset.languages().into_iter().collect();
    out.push_str(&format!("Languages: {}\n", languages.join(", ")));

    for key in keyset.keys.values() {
        out.push_str(&format!("\n  Key: {}\n", key.id));
        if let Some(context) = key.context.as_deref().filter(|c| !c.is_empty()) {
            out.push_str(&format!("    Context: {}\n", context));
        }
        for value in key.values.values() {
            match &value.status {
                Some(status) => out.push_str(&format!(
                    "    {} [{}]: {}\n",
                    value.language,
                    status,
                    preview(&value.text, full)
                )),
                None => out.push_str(&format!(
                    "    {}: {}\n",
                    value.language,
                    preview(&value.text, full)
                )),
            }
        }
    }
    out
}

/// JSON array of the keysets, in name order.
pub fn render_json<'a, I>(keysets: I) -> Result<String, String>
where
    I: IntoIterator<Item = &'a Keyset>,
{
    let keysets: Vec<Keyset> = keysets.into_iter().cloned().collect();
    let bytes = keysets
        .to_bytes()
        .map_err(|e| format!("Failed to serialize keysets: {}", e))?;
    String::from_utf8(bytes).map_err(|e| format!("Serialized keysets are not UTF-8: {}", e))
}

/// Print a view of extracted keysets; `full` disables value truncation.
pub fn print_keysets(
    keysets: &BTreeMap<String, Keyset>,
    json: bool,
    full: bool,
) -> Result<(), String> {
    if json {
        println!("{}", render_json(keysets.values())?);
        return Ok(());
    }

    if keysets.is_empty() {
        eprintln!("No strings found");
        return Ok(());
    }

    println!("✅ Found {} keyset(s)", keysets.len());
    for keyset in keysets.values() {
        println!();
        print!("{}", render_keyset(keyset, full));
    }
    Ok(())
}
