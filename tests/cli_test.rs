use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::{Path,PathBuf};
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const SAMPLE: &str = "I am Sam. Sam I am. I do not like this Sam I am.\n";

// Write the sample text repeated `count` times with CRLF newlines into the temporary directory.
fn make_sample(temp_dir: &tempfile::TempDir,name: &str,count: usize) -> Result<PathBuf,Box<dyn std::error::Error>> {
    let txt = SAMPLE.replace("\n","\r\n").repeat(count);
    let path = temp_dir.path().join(name);
    std::fs::write(&path,txt)?;
    Ok(path)
}

fn compress_cmd(method: &str,in_path: &Path,out_path: &Path) -> Result<Command,Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("hscompress")?;
    cmd.arg("compress")
        .arg("-m").arg(method)
        .arg("-i").arg(in_path)
        .arg("-o").arg(out_path);
    Ok(cmd)
}

fn round_trip_test(method: &str,detect: bool) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_sample(&temp_dir,"sample.txt",40)?;
    let cmp_path = temp_dir.path().join("sample.cmp");
    let out_path = temp_dir.path().join("sample.out");
    compress_cmd(method,&in_path,&cmp_path)?
        .assert()
        .success()
        .stderr(predicate::str::starts_with("compressed 2040 into"));
    let mut cmd = Command::cargo_bin("hscompress")?;
    cmd.arg("expand");
    if !detect {
        cmd.arg("-m").arg(method);
    }
    cmd.arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success()
        .stderr(predicate::str::ends_with("into 2040\n"));
    match (std::fs::read(&in_path),std::fs::read(&cmp_path),std::fs::read(&out_path)) {
        (Ok(v1),Ok(c),Ok(v2)) => {
            assert_eq!(v1,v2);
            if method != "huffman" {
                assert!(c.len() < v1.len() / 4);
            }
        },
        _ => panic!("unable to compare output with reference")
    }
    Ok(())
}

#[test]
fn lzss_round_trip() -> STDRESULT {
    round_trip_test("lzss",false)?;
    round_trip_test("lzss",true)
}

#[test]
fn huffman_round_trip() -> STDRESULT {
    round_trip_test("huffman",false)?;
    round_trip_test("huffman",true)
}

#[test]
fn hs_round_trip() -> STDRESULT {
    round_trip_test("hs",false)?;
    round_trip_test("hs",true)
}

#[test]
fn window_options() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_sample(&temp_dir,"sample.txt",40)?;
    let cmp_path = temp_dir.path().join("sample.cmp");
    compress_cmd("lzss",&in_path,&cmp_path)?
        .arg("-d").arg("4")
        .arg("-l").arg("2")
        .assert()
        .success();
    let compressed = std::fs::read(&cmp_path)?;
    assert_eq!(compressed[5..13].to_vec(),vec![0x00,0x10,0x00,0x00,0x00,0x08,0x00,0x00]);
    let bad_path = temp_dir.path().join("bad.cmp");
    compress_cmd("hs",&in_path,&bad_path)?
        .arg("-d").arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidConfiguration"));
    Ok(())
}

#[test]
fn wrong_method_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_sample(&temp_dir,"sample.txt",3)?;
    let cmp_path = temp_dir.path().join("sample.cmp");
    let out_path = temp_dir.path().join("sample.out");
    compress_cmd("huffman",&in_path,&cmp_path)?
        .assert()
        .success();
    let mut cmd = Command::cargo_bin("hscompress")?;
    cmd.arg("expand")
        .arg("-m").arg("lzss")
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CorruptStream"));
    Ok(())
}

#[test]
fn unknown_format_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = make_sample(&temp_dir,"sample.txt",1)?;
    let out_path = temp_dir.path().join("sample.out");
    let mut cmd = Command::cargo_bin("hscompress")?;
    cmd.arg("expand")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure();
    Ok(())
}
