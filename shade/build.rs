fn main() {
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("macos") {
        return;
    }

    // Link to private frameworks directory for SkyLight APIs
    println!("cargo:rustc-link-search=framework=/System/Library/PrivateFrameworks");

    // SkyLight framework backs the CGS* Space query functions
    println!("cargo:rustc-link-lib=framework=SkyLight");
}
