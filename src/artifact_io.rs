use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

pub fn read_text_file(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}

/// Appends one line, creating the file and its parent directory as needed.
pub fn append_line(path: &Path, line: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut record = String::with_capacity(line.len() + 1);
    record.push_str(line);
    record.push('\n');
    file.write_all(record.as_bytes())?;
    file.flush()
}

pub fn parse_toml_table(text: &str) -> Result<toml::Value, toml::de::Error> {
    if text.trim().is_empty() {
        return Ok(toml::Value::Table(toml::map::Map::new()));
    }
    toml::from_str(text)
}

/// Deep-merges `override_value` into `base`; tables merge key by key, any
/// other value replaces the base value.
pub fn merge_toml_tables(base: &mut toml::Value, override_value: toml::Value) {
    match (base, override_value) {
        (toml::Value::Table(base_map), toml::Value::Table(override_map)) => {
            for (key, override_item) in override_map {
                if let Some(base_item) = base_map.get_mut(&key) {
                    merge_toml_tables(base_item, override_item);
                } else {
                    base_map.insert(key, override_item);
                }
            }
        }
        (base_slot, override_item) => {
            *base_slot = override_item;
        }
    }
}
