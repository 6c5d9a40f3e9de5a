use std::process::Command;

fn main() {
  // Short commit hash for the debug startup log; absent outside a checkout.
  if let Ok(output) = Command::new("git").args(["rev-parse", "--short", "HEAD"]).output()
    && output.status.success()
  {
    let git_hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    println!("cargo:rustc-env=GIT_HASH={git_hash}");
  }

  println!("cargo:rerun-if-changed=build.rs");
  println!("cargo:rerun-if-changed=.git/HEAD");
}
