use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Encoding directories generated for every document
pub const ENCODINGS: [&str; 6] = [
    "utf-8",
    "utf-8_bom",
    "utf-16be",
    "utf-16be_bom",
    "utf-16le",
    "utf-16le_bom",
];

pub const SCHEMA_JSON: &str = r#"{"required": ["foo"]}"#;
pub const SCHEMA_YML: &str = "required:\n  - foo\n";

/// Document bodies in UTF-8: (file name, content)
pub const DOCUMENTS: [(&str, &str); 6] = [
    ("data-pass.json", "{\"foo\": 1}\n"),
    ("data-fail.json", "{}\n"),
    ("data-error.json", "{\"foo\": tru"),
    ("data-pass.yml", "foo: bar\n"),
    ("data-fail.yml", "bar: baz\n"),
    ("data-error.yml", "foo: \"bar\n"),
];

/// Generated test data tree.
///
/// ```text
/// schema.json  schema.yml
/// data-{pass,fail,error}.{json,yml}
/// <encoding>/data-{pass,fail,error}.{json,yml}
/// ```
pub struct Testdata {
    dir: TempDir,
}

impl Testdata {
    pub fn generate() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let root = dir.path();

        std::fs::write(root.join("schema.json"), SCHEMA_JSON).unwrap();
        std::fs::write(root.join("schema.yml"), SCHEMA_YML).unwrap();

        for (name, content) in DOCUMENTS {
            std::fs::write(root.join(name), content).unwrap();
        }

        for encoding in ENCODINGS {
            let enc_dir = root.join(encoding);
            std::fs::create_dir_all(&enc_dir).unwrap();
            for (name, content) in DOCUMENTS {
                std::fs::write(enc_dir.join(name), encode(encoding, content)).unwrap();
            }
        }

        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Absolute path as a command line argument
    pub fn arg(&self, rel: impl AsRef<Path>) -> String {
        self.join(rel).to_string_lossy().into_owned()
    }

    pub fn write(&self, rel: impl AsRef<Path>, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }
}

/// Encode UTF-8 text the way the named encoding directory stores it
pub fn encode(encoding: &str, text: &str) -> Vec<u8> {
    let (bom, body): (&[u8], Vec<u8>) = match encoding {
        "utf-8" => (b"", text.as_bytes().to_vec()),
        "utf-8_bom" => (b"\xEF\xBB\xBF", text.as_bytes().to_vec()),
        "utf-16be" => (b"", utf16be(text)),
        "utf-16be_bom" => (b"\xFE\xFF", utf16be(text)),
        "utf-16le" => (b"", utf16le(text)),
        "utf-16le_bom" => (b"\xFF\xFE", utf16le(text)),
        other => panic!("unknown encoding {other}"),
    };
    let mut buf = bom.to_vec();
    buf.extend(body);
    buf
}

pub fn utf16be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

pub fn utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Output lines sorted, since documents complete in any order
pub fn sorted_lines(output: &str) -> Vec<String> {
    let mut lines: Vec<String> = output.lines().map(str::to_string).collect();
    lines.sort();
    lines
}
