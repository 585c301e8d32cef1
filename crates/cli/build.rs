extern crate chrono;

// Build script for the Aspector CLI crate
//
// This script records target information and build metadata for the
// aspector binary.

fn main() {
    // Target information
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let target_arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();

    println!("cargo:rustc-env=CLI_TARGET_OS={}", target_os);
    println!("cargo:rustc-env=CLI_TARGET_ARCH={}", target_arch);

    // Build timestamp
    println!(
        "cargo:rustc-env=CLI_BUILD_TIMESTAMP={}",
        chrono::Utc::now().to_rfc3339()
    );

    // Git info for CLI version
    if let Ok(output) = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        if output.status.success() {
            let commit_hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
            println!("cargo:rustc-env=CLI_GIT_COMMIT={}", commit_hash);
        }
    }

    // CLI binary name
    let binary_name = if target_os == "windows" {
        "aspector.exe"
    } else {
        "aspector"
    };
    println!("cargo:rustc-env=CLI_BINARY_NAME={}", binary_name);

    // Re-run triggers
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
