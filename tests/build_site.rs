//! End-to-end tests of the `simple-press` binary against an in-process
//! WordPress API.

mod common;

use common::{Response, TestServer, closed_port_url, fixtures_dir};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn simple_press(work: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_simple-press"));
    cmd.env_remove("WORDPRESS_API_URL")
        .env_remove("SIMPLE_PRESS_LOG")
        .arg("--source")
        .arg(fixtures_dir().join("site"))
        .arg("--output")
        .arg(work.join("dist"))
        .arg("--temp-dir")
        .arg(work.join("temp"));
    cmd
}

fn run(cmd: &mut Command) -> Output {
    let output = cmd.output().unwrap();
    if !output.status.success() {
        eprintln!("stdout:\n{}", String::from_utf8_lossy(&output.stdout));
        eprintln!("stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    }
    output
}

fn read(dir: &Path, rel: &str) -> String {
    std::fs::read_to_string(dir.join(rel)).unwrap_or_else(|e| panic!("{rel}: {e}"))
}

// ===========================================================================
// build
// ===========================================================================

#[test]
fn build_writes_full_site() {
    let server = TestServer::wordpress();
    let work = TempDir::new().unwrap();
    let output = run(simple_press(work.path())
        .args(["build", "--api-url"])
        .arg(server.api_url()));
    assert!(output.status.success());

    let dist = work.path().join("dist");
    for rel in [
        "index.html",
        "posts/index.html",
        "posts/open-campus-2024/index.html",
        "posts/plain-update/index.html",
        "about/index.html",
        "history/index.html",
        "access/index.html",
        "404.html",
        "robots.txt",
    ] {
        assert!(dist.join(rel).is_file(), "missing {rel}");
    }
    assert!(work.path().join("temp/manifest.json").is_file());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Generated 5 post pages, 3 pages"), "{stdout}");
}

#[test]
fn home_grid_uses_resolved_images() {
    let server = TestServer::wordpress();
    let work = TempDir::new().unwrap();
    let output = run(simple_press(work.path())
        .args(["build", "--api-url"])
        .arg(server.api_url()));
    assert!(output.status.success());

    let dist = work.path().join("dist");
    let home = read(&dist, "index.html");
    // home_per_page = 3 in fixtures/site/config.toml
    assert_eq!(home.matches(r#"class="post-card""#).count(), 3);
    assert!(home.contains(&format!(
        r#"src="{}/wp-content/uploads/2024/06/campus.jpg""#,
        server.url()
    )));
    assert!(home.contains(r#"src="https://cdn.example.org/grant.png""#));
    assert!(home.contains("<title>Hillside University</title>"));

    let archive = read(&dist, "posts/index.html");
    assert_eq!(archive.matches(r#"class="post-card""#).count(), 5);
    assert_eq!(archive.matches(r#"class="post-image""#).count(), 4);
}

#[test]
fn post_and_page_detail() {
    let server = TestServer::wordpress();
    let work = TempDir::new().unwrap();
    assert!(run(simple_press(work.path())
        .args(["build", "--api-url"])
        .arg(server.api_url()))
    .status
    .success());

    let dist = work.path().join("dist");
    let post = read(&dist, "posts/open-campus-2024/index.html");
    assert!(post.contains("<p>Join us on campus this summer.</p>"));
    assert!(post.contains("By Hanako Yamada"));
    assert!(post.contains("June 1, 2024"));

    let plain = read(&dist, "posts/plain-update/index.html");
    assert!(!plain.contains(r#"class="featured-image""#));
    assert!(!plain.contains("By "));

    let about = read(&dist, "about/index.html");
    assert!(about.contains("We are a small university in the hills."));
    // Nav lists top-level pages only, in menu order
    let about_pos = about.find(r#"href="/about/""#).unwrap();
    let access_pos = about.find(r#"href="/access/""#).unwrap();
    assert!(about_pos < access_pos);
    assert!(!about.contains(r#"href="/history/""#));
}

#[test]
fn build_with_api_down_renders_error_state() {
    let server = TestServer::start(|_| Response::error(500));
    let work = TempDir::new().unwrap();
    let output = run(simple_press(work.path())
        .args(["build", "--api-url"])
        .arg(server.api_url()));
    assert!(output.status.success());

    let dist = work.path().join("dist");
    let home = read(&dist, "index.html");
    assert!(home.contains("Failed to load posts."));
    assert!(home.contains("WordPress API error: 500"));
    assert!(home.contains("WORDPRESS_API_URL"));
    assert!(!home.contains(r#"class="post-grid""#));
    assert!(!dist.join("posts/open-campus-2024").exists());
}

#[test]
fn fetch_then_generate_separately() {
    let server = TestServer::wordpress();
    let work = TempDir::new().unwrap();
    assert!(run(simple_press(work.path())
        .args(["fetch", "--api-url"])
        .arg(server.api_url()))
    .status
    .success());
    assert!(!work.path().join("dist").exists());

    // Generate never touches the network
    drop(server);
    assert!(run(simple_press(work.path()).arg("generate")).status.success());
    assert!(work.path().join("dist/posts/library-hours/index.html").is_file());
}

// ===========================================================================
// post
// ===========================================================================

#[test]
fn post_command_prints_page() {
    let server = TestServer::wordpress();
    let work = TempDir::new().unwrap();
    let output = run(simple_press(work.path())
        .args(["post", "research-grant", "--api-url"])
        .arg(server.api_url()));
    assert!(output.status.success());

    let html = String::from_utf8_lossy(&output.stdout);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("The robotics lab received a national grant."));
}

#[test]
fn post_command_writes_file() {
    let server = TestServer::wordpress();
    let work = TempDir::new().unwrap();
    let out = work.path().join("single/post.html");
    let output = run(simple_press(work.path())
        .args(["post", "library-hours", "--api-url"])
        .arg(server.api_url())
        .arg("--out")
        .arg(&out));
    assert!(output.status.success());
    assert!(read(work.path(), "single/post.html").contains("Updated opening hours"));
}

#[test]
fn post_command_not_found_exits_2() {
    let server = TestServer::wordpress();
    let work = TempDir::new().unwrap();
    let output = simple_press(work.path())
        .args(["post", "no-such-post", "--api-url"])
        .arg(server.api_url())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Post not found: no-such-post"));
}

#[test]
fn post_command_server_error_exits_1() {
    let server = TestServer::start(|_| Response::error(500));
    let work = TempDir::new().unwrap();
    let output = simple_press(work.path())
        .args(["post", "open-campus-2024", "--api-url"])
        .arg(server.api_url())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load post."), "{stderr}");
    assert!(stderr.contains("WordPress API error: 500"), "{stderr}");
    assert!(stderr.contains("WORDPRESS_API_URL"), "{stderr}");
    assert!(!stderr.contains("Status {"), "{stderr}");
}

// ===========================================================================
// API URL precedence, check, categories, gen-config
// ===========================================================================

#[test]
fn env_var_sets_api_url() {
    let server = TestServer::wordpress();
    let work = TempDir::new().unwrap();
    let output = run(simple_press(work.path())
        .arg("check")
        .env("WORDPRESS_API_URL", server.api_url()));
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("API: 3 categories"));
}

#[test]
fn flag_beats_env_var() {
    let server = TestServer::wordpress();
    let work = TempDir::new().unwrap();
    let output = simple_press(work.path())
        .args(["check", "--api-url"])
        .arg(closed_port_url())
        .env("WORDPRESS_API_URL", server.api_url())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(server.requests().is_empty());
}

#[test]
fn check_reports_unreachable_api() {
    let work = TempDir::new().unwrap();
    let output = simple_press(work.path())
        .args(["check", "--api-url"])
        .arg(closed_port_url())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("API: failed"), "{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load categories."), "{stderr}");
    assert!(stderr.contains("WORDPRESS_API_URL"), "{stderr}");
    assert!(!stderr.contains("Error: \""), "{stderr}");
}

#[test]
fn categories_command() {
    let server = TestServer::wordpress();
    let work = TempDir::new().unwrap();
    let output = run(simple_press(work.path())
        .args(["categories", "--api-url"])
        .arg(server.api_url()));
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("002 News (3 posts) news"));
    assert!(stdout.contains("003 Research & Teaching (2 posts) research"));
}

#[test]
fn invalid_api_url_is_rejected() {
    let work = TempDir::new().unwrap();
    let output = simple_press(work.path())
        .args(["check", "--api-url", "ftp://example.org/wp-json/wp/v2"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("api_url must use http or https"));
}

#[test]
fn gen_config_prints_stock_config() {
    let work = TempDir::new().unwrap();
    let output = run(simple_press(work.path()).arg("gen-config"));
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: toml::Value = toml::from_str(&stdout).unwrap();
    assert!(parsed.get("api_url").is_some());
    assert!(stdout.contains("[listing]"));
}
