use color_eyre::Result;
use std::{
    io::Write,
    process::{Command, Output, Stdio},
};

/// Runs the binary with `source` on standard input.
fn pilang(args: &[&str], source: &str) -> Result<Output> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_pilang"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(source.as_bytes())?;
    }
    Ok(child.wait_with_output()?)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn run_prints_and_succeeds() -> Result<()> {
    let output = pilang(&["run"], "print 2 + 3 * 4\nprint [1, 2]")?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "14\n[1, 2]\n");
    assert!(output.stderr.is_empty());
    Ok(())
}

#[test]
fn evaluate_prints_the_final_value() -> Result<()> {
    let output = pilang(&["evaluate"], "fn sq(x) { x * x }\nsq(7)")?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "49\n");
    Ok(())
}

#[test]
fn syntax_errors_exit_with_65() -> Result<()> {
    let output = pilang(&["run"], "let = 1")?;
    assert_eq!(output.status.code(), Some(65));
    assert!(String::from_utf8_lossy(&output.stderr).contains("PR001"));

    let output = pilang(&["tokenize"], "1 $ 2")?;
    assert_eq!(output.status.code(), Some(65));
    assert!(String::from_utf8_lossy(&output.stderr).contains("LX001"));

    let output = pilang(&["parse"], "fn f(a, a) { a }")?;
    assert_eq!(output.status.code(), Some(65));
    Ok(())
}

#[test]
fn runtime_errors_exit_with_70() -> Result<()> {
    let output = pilang(&["run"], "print 1\nprint 1 / 0\nprint 2")?;
    assert_eq!(output.status.code(), Some(70));
    assert_eq!(stdout(&output), "1\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("RT009"));
    Ok(())
}

#[test]
fn max_call_depth_is_configurable() -> Result<()> {
    let source = "fn down(n) { if n == 0 { 0 } else { down(n - 1) } }\ndown(50)";
    let output = pilang(&["evaluate", "--max-call-depth", "10"], source)?;
    assert_eq!(output.status.code(), Some(70));
    assert!(String::from_utf8_lossy(&output.stderr).contains("RT010"));

    let output = pilang(&["evaluate", "--max-call-depth", "51"], source)?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "0\n");
    Ok(())
}

#[test]
fn globals_are_dumped_even_after_a_failure() -> Result<()> {
    let output = pilang(&["run", "--globals"], "let a = 1\nfn f() { a }\nlet b = a / 0")?;
    assert_eq!(output.status.code(), Some(70));
    assert_eq!(
        stdout(&output),
        "=-=-=-=-=-=-=-=-=-=\na : 1\nf : <fn f>\n=-=-=-=-=-=-=-=-=-=\n"
    );
    Ok(())
}
