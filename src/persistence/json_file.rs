use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::Path;
use serde_json::{from_reader, to_string_pretty};

use super::store::Snapshot;

pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Snapshot, String> {
    let file = File::open(path).map_err(|e| format!("Failed to open file: {}", e))?;
    let reader = BufReader::new(file);

    from_reader(reader).map_err(|e| format!("Failed to parse snapshot: {}", e))
}

pub fn save_snapshot<P: AsRef<Path>>(path: P, snapshot: &Snapshot) -> Result<(), String> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| format!("Failed to open file for writing: {}", e))?;

    let json = to_string_pretty(snapshot).map_err(|e| format!("Failed to serialize snapshot: {}", e))?;

    file.write_all(json.as_bytes())
        .map_err(|e| format!("Failed to write to file: {}", e))?;

    Ok(())
}
