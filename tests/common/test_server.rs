use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::LazyLock;

use tempfile::TempDir;

pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub admin_username: String,
    pub admin_password: String,
    server_process: Option<Child>,
}

static BUILD_RELEASE: LazyLock<()> = LazyLock::new(|| {
    let build_status = Command::new("cargo")
        .args(["build", "--release"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("build release binary");
    assert!(build_status.success(), "Failed to build release binary");
});

impl TestServer {
    pub async fn start() -> Self {
        LazyLock::force(&BUILD_RELEASE);

        let temp_dir = TempDir::new().expect("create temp dir");
        let data_dir = temp_dir.path();
        let binary = Path::new(env!("CARGO_MANIFEST_DIR")).join("target/release/mailshare");

        let init_output = Command::new(&binary)
            .args(["admin", "init", "--data-dir"])
            .arg(data_dir)
            .arg("--non-interactive")
            .output()
            .expect("run init");
        assert!(
            init_output.status.success(),
            "Failed to initialize database"
        );

        let admin_password = extract_generated_password(&init_output.stdout)
            .expect("generated password in init output");

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let base_url = format!("http://127.0.0.1:{}", port);

        let server_process = Command::new(&binary)
            .args(["serve", "--data-dir"])
            .arg(data_dir)
            .args(["--host", "127.0.0.1", "--port"])
            .arg(port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("start server");

        Self::wait_for_ready(&base_url).await;

        Self {
            temp_dir,
            base_url,
            admin_username: "admin".to_string(),
            admin_password,
            server_process: Some(server_process),
        }
    }

    async fn wait_for_ready(base_url: &str) {
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/health", base_url))
                .send()
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready");
    }

    /// Returns a cookie-holding client logged in with the given credentials.
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Client {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("build client");

        let resp = client
            .post(format!("{}/api/v1/auth/login", self.base_url))
            .json(&serde_json::json!({"username": username, "password": password}))
            .send()
            .await
            .expect("login request");
        assert!(
            resp.status().is_success(),
            "login failed for {username}: {}",
            resp.status()
        );

        client
    }

    pub async fn login_superadmin(&self) -> reqwest::Client {
        self.login(&self.admin_username, &self.admin_password).await
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }
}

fn extract_generated_password(stdout: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stdout);
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        if line.starts_with("Generated password") {
            for candidate in lines.by_ref() {
                let trimmed = candidate.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(mut process) = self.server_process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}
