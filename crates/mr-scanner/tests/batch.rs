//! Batch pass over a scratch directory.

use camino::{Utf8Path, Utf8PathBuf};
use mr_core::ProtocolConfig;
use mr_scanner::{BatchDriver, FileRewriter, RewriteError};

const HEADER: &str = "// META_PROGRAM: react.godot script. Do not remove this comment.\n";
const MARKER: &str = "    // Don't edit! Generated by meta programming.\n";

fn component(declarations: &str) -> String {
    format!(
        "{HEADER}public partial class Panel : Control, IReactable\n{{\n{declarations}\n{MARKER}    // Don't delete this line. \n\n    public void SetProps(\n    {MARKER}        // Don't delete this line. \n    )\n    {{\n    {MARKER}        // Don't delete this line. \n    }}\n}}\n"
    )
}

struct Scratch {
    _dir: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        Self { _dir: dir, root }
    }

    fn write(&self, name: &str, text: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, text).unwrap();
        path
    }

    fn read(path: &Utf8Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }
}

#[test]
fn test_batch_pass_processes_each_top_level_file() {
    let scratch = Scratch::new();
    let stale = scratch.write(
        "Counter.cs",
        &component("    [ReactState]\n    private State<int> clicks;\n"),
    );
    let fresh = scratch.write("Empty.cs", &component(""));
    let broken_text = component("    [ReactProp]\n    public int size;\n");
    let broken = scratch.write("Broken.cs", &broken_text);
    scratch.write("Plain.cs", "using Godot;\n");
    scratch.write("README.md", "# scenes\n");
    let nested_text = component("    [ReactProp]\n    private int depth;\n");
    let nested = scratch.write("nested/Deep.cs", &nested_text);

    let driver = BatchDriver::new(&scratch.root, FileRewriter::new(ProtocolConfig::default()))
        .unwrap();
    let report = driver.run();

    assert_eq!(report.stats.total, 5);
    assert_eq!(report.stats.rewritten, 1);
    assert_eq!(report.stats.unchanged, 1);
    assert_eq!(report.stats.skipped, 2);
    assert_eq!(report.stats.failed, 1);
    assert!(!report.is_clean());

    assert_eq!(report.errors.len(), 1);
    assert!(matches!(&report.errors[0], RewriteError::Codegen { path, .. } if *path == broken));

    assert!(Scratch::read(&stale).contains("public int P_clicks { get => clicks.Get(police);"));
    assert_eq!(Scratch::read(&fresh), component(""));
    assert_eq!(Scratch::read(&broken), broken_text);
    assert_eq!(Scratch::read(&nested), nested_text);
}

#[test]
fn test_second_batch_pass_rewrites_nothing() {
    let scratch = Scratch::new();
    scratch.write(
        "Counter.cs",
        &component(concat!(
            "    [ReactProp]\n    private int start;\n",
            "    [ReactState]\n    private State<int> clicks;\n",
        )),
    );

    let rewriter = FileRewriter::new(ProtocolConfig::default());
    BatchDriver::new(&scratch.root, rewriter).unwrap().run();

    let rewriter = FileRewriter::new(ProtocolConfig::default());
    let report = BatchDriver::new(&scratch.root, rewriter).unwrap().run();
    assert_eq!(report.stats.rewritten, 0);
    assert_eq!(report.stats.unchanged, 1);
    assert!(report.is_clean());
}

#[test]
fn test_dry_run_reports_stale_files() {
    let scratch = Scratch::new();
    let text = component("    [ReactProp]\n    private string title;\n");
    let path = scratch.write("Title.cs", &text);

    let rewriter = FileRewriter::new(ProtocolConfig::default()).with_dry_run(true);
    let report = BatchDriver::new(&scratch.root, rewriter).unwrap().run();

    assert_eq!(report.stale, vec![path.clone()]);
    assert_eq!(report.stats.stale, 1);
    assert_eq!(Scratch::read(&path), text);
}

#[test]
fn test_missing_root_is_rejected() {
    let scratch = Scratch::new();
    let result = BatchDriver::new(
        &scratch.root.join("missing"),
        FileRewriter::new(ProtocolConfig::default()),
    );
    assert!(result.is_err());
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_entry_does_not_stop_the_pass() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let scratch = Scratch::new();
    let stale = scratch.write(
        "Counter.cs",
        &component("    [ReactState]\n    private State<int> clicks;\n"),
    );
    std::fs::write(
        scratch.root.as_std_path().join(OsStr::from_bytes(b"bad\xff.txt")),
        "",
    )
    .unwrap();

    let driver = BatchDriver::new(&scratch.root, FileRewriter::new(ProtocolConfig::default()))
        .unwrap();
    let report = driver.run();

    assert!(report.is_clean());
    assert_eq!(report.stats.total, 1);
    assert_eq!(report.stats.rewritten, 1);
    assert!(Scratch::read(&stale).contains("public int P_clicks { get => clicks.Get(police);"));
}
