//! Generate `todo_store.h` into `OUT_DIR`.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let Ok(out_dir) = env::var("OUT_DIR") else {
        return;
    };

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("TODO_STORE_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(PathBuf::from(out_dir).join("todo_store.h"));
        }
        Err(err) => println!("cargo:warning=header generation skipped: {err}"),
    }
}
