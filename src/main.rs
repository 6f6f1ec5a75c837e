//! Host-side helper: `cargo run` builds the hero scene's WASM bundle into
//! `static/pkg` and serves the portfolio page from `static/` for preview.

use std::process::{Command, Stdio};
use std::{env, thread, time::Duration};

const PORT: &str = "8000";

fn main() {
    // Only meaningful on non-wasm targets.
    if env::var("TARGET").unwrap_or_default() == "wasm32-unknown-unknown" {
        return;
    }

    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args([
            "build",
            "--release",
            "--target",
            "web",
            "--out-dir",
            "static/pkg",
        ])
        .status()
    {
        Ok(st) if st.success() => {},
        Ok(_) => {
            eprintln!("wasm-pack finished with errors. Ensure wasm-pack is installed (https://rustwasm.github.io/wasm-pack/).");
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH. Skipping wasm build; the page will load without the hero scene.");
        }
    }

    println!("Serving portfolio at http://127.0.0.1:{PORT} …");
    let mut server = match Command::new("python3")
        .args(["-m", "http.server", PORT, "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            eprintln!("failed to start http server: {err}");
            std::process::exit(1);
        }
    };

    // Keep process alive while the server runs
    loop {
        if let Ok(Some(status)) = server.try_wait() {
            eprintln!("http server exited: {status}");
            std::process::exit(1);
        }
        thread::sleep(Duration::from_secs(5));
    }
}
