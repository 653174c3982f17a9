use keysync::{TankerClient, Transport};

use crate::validation::validate_keyset_name;

pub fn run_list_command<T: Transport>(client: &TankerClient<T>) -> Result<(), String> {
    let ids = client
        .list_keysets()
        .map_err(|e| format!("Failed to list keysets: {}", e))?;
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

pub fn run_create_command<T: Transport>(
    client: &TankerClient<T>,
    name: &str,
) -> Result<(), String> {
    validate_keyset_name(name)?;
    client
        .create_keyset(name)
        .map_err(|e| format!("Failed to create keyset {}: {}", name, e))?;
    println!("✅ Created keyset {}", name);
    Ok(())
}

pub fn run_drop_command<T: Transport>(
    client: &TankerClient<T>,
    name: &str,
) -> Result<(), String> {
    validate_keyset_name(name)?;
    client
        .drop_keyset(name)
        .map_err(|e| format!("Failed to drop keyset {}: {}", name, e))?;
    println!("✅ Dropped keyset {}", name);
    Ok(())
}
