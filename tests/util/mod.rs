use alfred_keywords::connectors::ScanContext;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[allow(dead_code)]
pub struct EnvGuard {
    key: String,
    prev: Option<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn set(key: &str, val: impl AsRef<str>) -> Self {
        let prev = std::env::var(key).ok();
        unsafe { std::env::set_var(key, val.as_ref()) };
        Self {
            key: key.to_string(),
            prev,
        }
    }

    pub fn remove(key: &str) -> Self {
        let prev = std::env::var(key).ok();
        unsafe { std::env::remove_var(key) };
        Self {
            key: key.to_string(),
            prev,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => unsafe { std::env::set_var(&self.key, v) },
            None => unsafe { std::env::remove_var(&self.key) },
        }
    }
}

/// Convert a JSON fixture into a property list value.
#[allow(dead_code)]
pub fn json_to_plist(value: &Value) -> plist::Value {
    match value {
        Value::Null => plist::Value::String(String::new()),
        Value::Bool(b) => plist::Value::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => plist::Value::Integer(plist::Integer::from(i)),
            None => plist::Value::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => plist::Value::String(s.clone()),
        Value::Array(items) => plist::Value::Array(items.iter().map(json_to_plist).collect()),
        Value::Object(map) => {
            let mut dict = plist::Dictionary::new();
            for (k, v) in map {
                dict.insert(k.clone(), json_to_plist(v));
            }
            plist::Value::Dictionary(dict)
        }
    }
}

/// Write `value` as an XML plist, creating parent directories.
#[allow(dead_code)]
pub fn write_plist(path: &Path, value: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    json_to_plist(value).to_file_xml(path).unwrap();
}

/// Temporary Alfred preferences bundle, home directory and project directory.
#[allow(dead_code)]
pub struct AlfredFixture {
    pub dir: TempDir,
    pub ctx: ScanContext,
}

#[allow(dead_code)]
impl AlfredFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let ctx = ScanContext::under(dir.path());
        fs::create_dir_all(&ctx.home).unwrap();
        fs::create_dir_all(&ctx.project_dir).unwrap();
        Self { dir, ctx }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn write_builtin(&self, name: &str, prefs: &Value) -> PathBuf {
        let path = self.ctx.websearch_dir().join(name).join("prefs.plist");
        write_plist(&path, prefs);
        path
    }

    pub fn write_custom_sites(&self, sites: &Value) -> PathBuf {
        let path = self.ctx.websearch_dir().join("prefs.plist");
        write_plist(&path, &serde_json::json!({ "customSites": sites }));
        path
    }

    pub fn write_workflow(&self, bundle: &str, info: &Value) -> PathBuf {
        let path = self.ctx.workflows_dir().join(bundle).join("info.plist");
        write_plist(&path, info);
        path
    }

    pub fn write_raw(&self, path: &Path, content: &str) -> PathBuf {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        path.to_path_buf()
    }

    pub fn write_home_file(&self, name: &str, content: &str) -> PathBuf {
        self.write_raw(&self.ctx.home.join(name), content)
    }

    pub fn write_project_file(&self, name: &str, content: &str) -> PathBuf {
        self.write_raw(&self.ctx.project_dir.join(name), content)
    }
}
