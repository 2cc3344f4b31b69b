use std::fs::File;
use std::io::Write;

use shadow_rs::SdResult;
use shadow_rs::ShadowBuilder;

fn main() {
    ShadowBuilder::builder()
        .hook(version_hook)
        .build()
        .expect("could not generate build metadata");
}

const LONG_VERSION_CONST: &str = r##"pub const LONG_VERSION:&str = shadow_rs::formatcp!(r#"{}
branch:{}
commit_hash:{}
build_env:{},{}"#,PKG_VERSION, BRANCH, COMMIT_HASH, RUST_VERSION, RUST_CHANNEL
);
"##;

fn version_hook(mut file: &File) -> SdResult<()> {
    writeln!(file, "{LONG_VERSION_CONST}")?;
    Ok(())
}
