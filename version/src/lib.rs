use shadow_rs::shadow;

shadow!(build);

pub use build::LONG_VERSION;
