use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Create config template if it doesn't exist
    let out_dir = env::var("OUT_DIR").unwrap_or_else(|_| "./".to_string());
    let template_path = Path::new(&out_dir).join("../../../tsmux_config.template.toml");

    let template = r#"# tsmux configuration template
# Copy this file to 'tsmux_config.toml' and adjust the values

# Pad streams to a continuity counter of zero on write_trailer
pad_continuity = false
"#;

    let _ = fs::write(template_path, template);
    println!("cargo:rerun-if-changed=build.rs");
}
