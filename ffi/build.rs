fn main() {
    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("HYBRID_BRIDGE_H")
        // Not reachable from any function signature.
        .include_item("FfiCommandStatus")
        .include_item("FfiHttpMethod")
        .include_item("FfiContentType")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(format!("{crate_dir}/include/hybrid_bridge.h"));
        }
        Err(e) => println!("cargo:warning=header not generated: {e}"),
    }

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
}
