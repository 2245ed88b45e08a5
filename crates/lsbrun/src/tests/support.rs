//! Mock collaborators and fixtures shared by the runtime tests.

use std::cell::RefCell;
use std::ffi::OsString;

use lsbrun_config::Config;
use mockall::mock;

use crate::config::ConfigLoader;
use crate::{AppError, ManagerError, Operation, Request, ServiceManager};

mock! {
    pub Manager {}
    impl ServiceManager for Manager {
        fn is_enabled(&self, name: &str) -> Result<bool, ManagerError>;
        fn status(&self, name: &str) -> Result<String, ManagerError>;
        fn cached_status(&self, name: &str) -> Result<String, ManagerError>;
        fn start(&self, name: &str) -> Result<String, ManagerError>;
        fn stop(&self, name: &str) -> Result<String, ManagerError>;
        fn restart(&self, name: &str) -> Result<String, ManagerError>;
        fn try_restart(&self, name: &str) -> Result<String, ManagerError>;
        fn reload(&self, name: &str) -> Result<String, ManagerError>;
        fn force_reload(&self, name: &str) -> Result<String, ManagerError>;
    }
}

/// A manager that fails the test on any call.
pub(super) fn untouched_manager() -> MockManager {
    MockManager::new()
}

/// A manager reporting `web` as enabled with the given live and cached state.
pub(super) fn enabled_manager(state: &'static str) -> MockManager {
    let mut manager = MockManager::new();
    manager.expect_is_enabled().returning(|_| Ok(true));
    manager
        .expect_status()
        .returning(move |_| Ok(String::from(state)));
    manager
        .expect_cached_status()
        .returning(move |_| Ok(String::from(state)));
    manager
}

pub(super) fn manager_failure(operation: Operation) -> ManagerError {
    ManagerError::Failed {
        operation,
        service: String::from("web"),
        message: String::from("manager exited with status 1: boom"),
    }
}

pub(super) fn request(command: Option<&str>, args: &[&str]) -> Request {
    let mut builder = Request::builder("web").args(args.iter().copied());
    if let Some(command) = command {
        builder = builder.command(command);
    }
    builder.build().expect("valid request")
}

pub(super) fn argv(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

/// Returns a fixed configuration and records the arguments it was given.
#[derive(Default)]
pub(super) struct StaticConfigLoader {
    config: Config,
    seen: RefCell<Vec<Vec<OsString>>>,
}

impl StaticConfigLoader {
    pub(super) fn seen(&self) -> Vec<Vec<OsString>> {
        self.seen.borrow().clone()
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        self.seen.borrow_mut().push(args.to_vec());
        Ok(self.config.clone())
    }
}
