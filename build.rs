// build.rs

//! Compiles `locales/*.toml` into the `t!` macro used for every user-facing message.
//!
//! English is always loaded. `GOSCRIPT_LANG=<code>` at build time overlays
//! `locales/<code>.toml` on top of it, so a partial translation falls back per key.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

const LOCALES_DIR: &str = "locales";
const FALLBACK_LANG: &str = "en";

type Messages = BTreeMap<String, String>;

fn main() {
    println!("cargo:rerun-if-env-changed=GOSCRIPT_LANG");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}/", LOCALES_DIR);

    let mut messages = load(FALLBACK_LANG)
        .unwrap_or_else(|| panic!("{}/{}.toml is required", LOCALES_DIR, FALLBACK_LANG));

    if let Ok(lang) = env::var("GOSCRIPT_LANG") {
        if lang != FALLBACK_LANG {
            match load(&lang) {
                Some(overrides) => messages.extend(overrides),
                None => println!(
                    "cargo:warning=No '{}/{}.toml', messages stay in English.",
                    LOCALES_DIR, lang
                ),
            }
        }
    }

    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let dest = Path::new(&out_dir).join("translations.rs");
    fs::write(&dest, render_macro(&messages))
        .unwrap_or_else(|e| panic!("cannot write {}: {}", dest.display(), e));
}

/// Reads one locale file. `None` when it does not exist; a malformed file fails the build.
fn load(lang: &str) -> Option<Messages> {
    let path = format!("{}/{}.toml", LOCALES_DIR, lang);
    let content = fs::read_to_string(&path).ok()?;
    let messages =
        toml::from_str(&content).unwrap_or_else(|e| panic!("cannot parse {}: {}", path, e));
    Some(messages)
}

/// One literal arm per key. Any other key is a compile error, never an empty message.
fn render_macro(messages: &Messages) -> String {
    let mut code = String::from("#[macro_export]\nmacro_rules! t {\n");
    for (key, value) in messages {
        code.push_str(&format!("    ({:?}) => {{ {:?} }};\n", key, value));
    }
    code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n",
    );
    code.push_str("}\n");
    code
}
