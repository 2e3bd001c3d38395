use super::*;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

fn output(code: i32, stdout: &str, stderr: &str) -> Output {
    Output {
        // from_raw takes a wait status, so the exit code lives in the second byte.
        status: ExitStatus::from_raw(code << 8),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

mod title {
    use super::*;
    use Step::*;

    #[test]
    fn run() {
        assert_eq!("run: uptime", title(&Run("uptime".into())));
    }

    #[test]
    fn sudo() {
        assert_eq!("sudo: id -u", title(&Sudo("id -u".into())));
    }

    #[test]
    fn put() {
        assert_eq!(
            "put: motd -> /etc/motd",
            title(&Put {
                from: "motd".into(),
                to: "/etc/motd".into(),
            }),
        );
    }

    #[test]
    fn get() {
        assert_eq!(
            "get: /etc/hostname -> out/alpha",
            title(&Get {
                from: "/etc/hostname".into(),
                to: "out/alpha".into(),
            }),
        );
    }

    #[test]
    fn call() {
        assert_eq!("call: cleanup", title(&Call("cleanup".into())));
    }
}

#[test]
fn starting() {
    let mut stdout = vec![];
    _starting(&mut stdout, "alpha", "deploy").unwrap();
    assert_eq!("[alpha] Running deploy\n", String::from_utf8_lossy(&stdout));
}

mod report {
    use super::*;

    #[test]
    fn success_without_output() {
        let (mut stdout, mut stderr) = (vec![], vec![]);
        _report(
            &mut stdout,
            &mut stderr,
            "alpha",
            &Step::Run("true".into()),
            &output(0, "", ""),
        )
        .unwrap();

        assert_eq!(
            "[alpha] Completed run: true\n",
            String::from_utf8_lossy(&stdout),
        );
        assert!(stderr.is_empty());
    }

    #[test]
    fn success_with_output() {
        let (mut stdout, mut stderr) = (vec![], vec![]);
        _report(
            &mut stdout,
            &mut stderr,
            "alpha",
            &Step::Run("ls".into()),
            &output(0, "a\nb\n", "warning\n"),
        )
        .unwrap();

        assert_eq!(
            "[alpha] Completed run: ls\n    Captured stdout:\n        a\n        b\n",
            String::from_utf8_lossy(&stdout),
        );
        assert_eq!(
            "    Captured stderr:\n        warning\n",
            String::from_utf8_lossy(&stderr),
        );
    }

    #[test]
    fn failure() {
        let (mut stdout, mut stderr) = (vec![], vec![]);
        _report(
            &mut stdout,
            &mut stderr,
            "beta",
            &Step::Sudo("false".into()),
            &output(1, "", "nope\n"),
        )
        .unwrap();

        assert!(stdout.is_empty());
        assert_eq!(
            "[beta] Failed    sudo: false\n    Captured stderr:\n        nope\n    Exited with exit code 1\n",
            String::from_utf8_lossy(&stderr),
        );
    }
}
