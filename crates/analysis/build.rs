fn main() {
    println!("cargo:rustc-env=BUILD_FEATURES=analysis");

    println!("cargo:rerun-if-changed=build.rs");
}
