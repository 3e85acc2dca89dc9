use std::fs;

const DEFAULTS: &str = "src/default_config.toml";
const SECTIONS: [&str; 4] = ["classes", "image", "highlight", "text"];

fn main() {
    println!("cargo:rerun-if-changed={}", DEFAULTS);

    let source = fs::read_to_string(DEFAULTS)
        .unwrap_or_else(|e| panic!("cannot read bundled rendering defaults {}: {}", DEFAULTS, e));
    let table = source
        .parse::<toml::Table>()
        .unwrap_or_else(|e| panic!("bundled rendering defaults are not valid TOML: {}", e));

    // Config::compiled_default() embeds this file, so every section must be present
    for section in SECTIONS {
        if !table.get(section).is_some_and(toml::Value::is_table) {
            panic!("bundled rendering defaults lack a [{}] table", section);
        }
    }
}
