// SPDX-License-Identifier: AGPL-3.0-or-later
use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn docx(lines: &[&str]) -> Vec<u8> {
    let body: String = lines
        .iter()
        .map(|line| format!(r#"<w:p><w:r><w:t xml:space="preserve">{line}</w:t></w:r></w:p>"#))
        .collect();
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    write!(
        zip,
        r#"<w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
    )
    .unwrap();
    zip.finish().unwrap().into_inner()
}

fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn tagger() -> Command {
    Command::cargo_bin("ebook-tagger").unwrap()
}

#[test]
fn convert_writes_stem_txt_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "Capitulo.docx", &docx(&["UNIDADE 1", "Texto."]));

    tagger()
        .arg("convert")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Capitulo.txt"));

    let written = std::fs::read_to_string(dir.path().join("Capitulo.txt")).unwrap();
    assert_eq!(
        written,
        "<h2 class=\"title-vg\">UNIDADE 1</h2>\n<p style=\"text-align: justify;\">Texto.</p>"
    );
}

#[test]
fn convert_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "livro.DOCX",
        &docx(&["#Dica#", "Beba água.", "#Dica#"]),
    );

    tagger()
        .args(["convert", "--stdout"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            r#"<div class="B-DICA" data-interaction="true"><div>{"conteudo":""#,
        ));
    assert!(!dir.path().join("livro.txt").exists());
}

#[test]
fn convert_into_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "a.docx", &docx(&["1 Título"]));

    tagger()
        .arg("convert")
        .arg(&input)
        .arg("-o")
        .arg(out.path())
        .assert()
        .success();

    assert_eq!(
        std::fs::read_to_string(out.path().join("a.txt")).unwrap(),
        r#"<h4 class="subtitlei-vg">Título</h4>"#
    );
}

#[test]
fn convert_json_writes_content_html_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "Livro.docx", &docx(&["UNIDADE 1", "Texto."]));

    tagger()
        .args(["convert", "--format", "json"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Livro-contentHTML.json"));

    let written = std::fs::read_to_string(dir.path().join("Livro-contentHTML.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "html": "<h2 class=\"title-vg\">UNIDADE 1</h2>\n<p style=\"text-align: justify;\">Texto.</p>"
        })
    );
    assert!(!dir.path().join("Livro.txt").exists());
}

#[test]
fn unknown_format_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "a.docx", &docx(&["x"]));

    tagger()
        .args(["convert", "--format", "pdf"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'pdf'"));
}

#[test]
fn wrong_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "notas.pdf", b"%PDF");

    tagger()
        .arg("convert")
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("is not a .docx file"));
}

#[test]
fn empty_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "vazio.docx", b"");

    tagger()
        .arg("convert")
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("file is empty"));
}

#[test]
fn size_limit_comes_from_settings() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "a.docx", &docx(&["x"]));
    let config = write_fixture(dir.path(), "settings.toml", b"[upload]\nmax_megabytes = 0\n");

    tagger()
        .arg("convert")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("too large"));
}

#[test]
fn unreadable_package_is_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "quebrado.docx", b"not a zip");

    tagger()
        .arg("convert")
        .arg(&input)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("could not read document"));
}

#[test]
fn tag_structure_error_is_a_conversion_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "a.docx", &docx(&["Texto", "Figura 1: Sem fonte"]));

    tagger()
        .arg("convert")
        .arg(&input)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to process paragraph 1"));
}

#[test]
fn inspect_prints_paragraph_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "a.docx", &docx(&["Olá"]));

    let output = tagger().arg("inspect").arg(&input).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["meta"]["paragraphs"], 1);
    assert_eq!(json["meta"]["format"], "docx");
    assert_eq!(json["document"]["paragraphs"][0]["text"], "Olá");
    assert_eq!(json["document"]["paragraphs"][0]["style"], "Normal");
}
