use std::process::Command;

fn git_stdout(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let commit = git_stdout(&["rev-parse", "--short", "HEAD"]).unwrap_or_default();
    let tagged = git_stdout(&["tag", "--points-at", "HEAD"]).is_some_and(|tags| !tags.is_empty());

    println!("cargo:rustc-env=TOURISTDB_COMMIT={commit}");
    println!("cargo:rustc-env=TOURISTDB_RELEASE={tagged}");
}
