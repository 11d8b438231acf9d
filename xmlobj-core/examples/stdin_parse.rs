//! Convert XML on stdin to pretty-printed JSON.
//!
//! Options can be passed as a JSON object in the first argument:
//!
//! ```text
//! cargo run --example stdin_parse -- '{"ignoreAttributes": false}' < doc.xml
//! ```

use std::io::Read;

use xmlobj_core::{parse_bytes, Options};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = match std::env::args().nth(1) {
        Some(json) => Options::from_json(&json)?,
        None => Options::default(),
    };

    let mut input = Vec::new();
    std::io::stdin().read_to_end(&mut input)?;

    let tree = parse_bytes(&input, &options)?;
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}
