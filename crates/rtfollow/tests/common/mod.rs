//! Shared harness: the root gate and disposable network namespaces.

use std::process::Command;
use std::sync::atomic::{AtomicU32, Ordering};

use rtfollow::Connection;

/// Skip the calling test unless it runs as root.
macro_rules! require_root {
    () => {
        if !crate::common::is_root() {
            eprintln!("skipping: requires root");
            return;
        }
    };
}

pub fn is_root() -> bool {
    // SAFETY: geteuid cannot fail.
    unsafe { libc::geteuid() == 0 }
}

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// A network namespace deleted again on drop.
pub struct TestNamespace {
    name: String,
}

impl TestNamespace {
    pub fn new(prefix: &str) -> Self {
        let name = format!(
            "rtf-{}-{}-{}",
            prefix,
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        run(&["ip", "netns", "add", &name]);
        let ns = Self { name };
        ns.exec(&["ip", "link", "set", "lo", "up"]);
        ns
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run a command inside the namespace, panicking when it fails.
    pub fn exec(&self, cmd: &[&str]) {
        let status = Command::new("ip")
            .args(["netns", "exec", &self.name])
            .args(cmd)
            .status()
            .expect("spawn command");
        assert!(status.success(), "command failed in {}: {cmd:?}", self.name);
    }

    /// Connection operating inside this namespace.
    pub fn connection(&self) -> Connection {
        Connection::in_namespace(format!("/var/run/netns/{}", self.name))
            .expect("namespace connection")
    }

    /// Create a dummy interface, bring it up, and return its index.
    pub async fn add_dummy(&self, conn: &Connection, name: &str) -> u32 {
        self.exec(&["ip", "link", "add", name, "type", "dummy"]);
        let ifindex = conn
            .link_index_by_name(name)
            .await
            .expect("dummy interface index");
        conn.set_link_state(ifindex, true).await.expect("dummy up");
        ifindex
    }
}

impl Drop for TestNamespace {
    fn drop(&mut self) {
        let _ = Command::new("ip").args(["netns", "del", &self.name]).status();
    }
}

fn run(cmd: &[&str]) {
    let status = Command::new(cmd[0])
        .args(&cmd[1..])
        .status()
        .expect("spawn command");
    assert!(status.success(), "command failed: {cmd:?}");
}
