//! Runtime tests driving the full argument-to-exit-code path.

use std::process::ExitCode;

use rstest::rstest;

use super::support::{MockManager, StaticConfigLoader, argv, manager_failure, untouched_manager};
use crate::{IoStreams, Operation, RequestCell, StaticPrivileges, run_with_collaborators};

struct Captured {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn run(
    args: &[&str],
    loader: &StaticConfigLoader,
    cell: &RequestCell,
    manager: MockManager,
    privileges: &StaticPrivileges,
    stdout_is_terminal: bool,
) -> Captured {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr, stdout_is_terminal);
        run_with_collaborators(argv(args), &mut io, loader, cell, manager, privileges)
    };
    Captured {
        exit,
        stdout: String::from_utf8(stdout).expect("utf8 stdout"),
        stderr: String::from_utf8(stderr).expect("utf8 stderr"),
    }
}

fn run_as_root(args: &[&str], manager: MockManager) -> Captured {
    run(
        args,
        &StaticConfigLoader::default(),
        &RequestCell::new(),
        manager,
        &StaticPrivileges::root(),
        false,
    )
}

fn starting_manager() -> MockManager {
    let mut manager = MockManager::new();
    manager
        .expect_start()
        .once()
        .returning(|_| Ok(String::from("running")));
    manager
}

#[test]
fn start_runs_to_success() {
    let captured = run_as_root(&["/etc/init.d/web", "start"], starting_manager());
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert_eq!(captured.stdout, "Starting web... running\n");
    assert_eq!(captured.stderr, "");
}

#[test]
fn populates_the_request_cell() {
    let cell = RequestCell::new();
    let captured = run(
        &["/etc/init.d/web", "start"],
        &StaticConfigLoader::default(),
        &cell,
        starting_manager(),
        &StaticPrivileges::root(),
        false,
    );
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    let request = cell.get().expect("request cached");
    assert_eq!(request.name(), "web");
    assert_eq!(request.command(), Some("start"));
}

#[test]
fn configuration_flags_reach_the_loader() {
    let loader = StaticConfigLoader::default();
    let captured = run(
        &[
            "/etc/init.d/web",
            "--log-filter",
            "debug",
            "--manager-program=/opt/mgr",
            "start",
        ],
        &loader,
        &RequestCell::new(),
        starting_manager(),
        &StaticPrivileges::root(),
        false,
    );
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert_eq!(
        loader.seen(),
        vec![argv(&[
            "/etc/init.d/web",
            "--log-filter",
            "debug",
            "--manager-program=/opt/mgr",
        ])]
    );
}

#[test]
fn foreign_invocation_paths_are_fatal() {
    let captured = run_as_root(&["/usr/local/bin/web", "start"], untouched_manager());
    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert_eq!(captured.stdout, "");
    assert!(captured.stderr.contains("does not match"));
}

#[test]
fn manager_failures_are_fatal() {
    let mut manager = MockManager::new();
    manager
        .expect_start()
        .once()
        .returning(|_| Err(manager_failure(Operation::Start)));

    let captured = run_as_root(&["/etc/init.d/web", "start"], manager);
    assert_eq!(captured.exit, ExitCode::FAILURE);
    assert_eq!(captured.stdout, "Starting web... ");
    assert!(captured.stderr.contains("failed to start web"));
}

#[rstest]
#[case(&["/etc/init.d/web", "bounce"], "Unknown command 'bounce'\n")]
#[case(&["/etc/init.d/web", "start", "now"], "Unknown command 'start'\n")]
#[case(&["/etc/init.d/web", "--", "status"], "Unknown command '--'\n")]
fn usage_errors_exit_with_invalid_argument(#[case] args: &[&str], #[case] expected: &str) {
    let captured = run_as_root(args, untouched_manager());
    assert_eq!(captured.exit, ExitCode::from(2));
    assert_eq!(captured.stderr, expected);
}

#[test]
fn missing_command_exits_with_invalid_argument() {
    let captured = run_as_root(&["/etc/init.d/web"], untouched_manager());
    assert_eq!(captured.exit, ExitCode::from(2));
    assert!(captured.stderr.starts_with("Usage: web {start|"));
}

#[test]
fn unprivileged_start_exits_with_insufficient_privilege() {
    let captured = run(
        &["/etc/init.d/web", "start"],
        &StaticConfigLoader::default(),
        &RequestCell::new(),
        untouched_manager(),
        &StaticPrivileges::unprivileged(),
        false,
    );
    assert_eq!(captured.exit, ExitCode::from(4));
    assert_eq!(captured.stderr, "Permission denied\n");
}

#[test]
fn terminal_output_is_coloured() {
    let mut manager = MockManager::new();
    manager.expect_is_enabled().once().returning(|_| Ok(true));
    manager
        .expect_status()
        .once()
        .returning(|_| Ok(String::from("running")));

    let captured = run(
        &["/etc/init.d/web", "status"],
        &StaticConfigLoader::default(),
        &RequestCell::new(),
        manager,
        &StaticPrivileges::root(),
        true,
    );
    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert_eq!(captured.stdout, "\x1b[32mweb\trunning\n\x1b[0m");
}
