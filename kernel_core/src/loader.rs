//! Program loader
//!
//! Programs share the kernel's address space, so "loading" resolves a path
//! to an entry function rather than relocating an image. The registry maps
//! absolute paths to entry points; the path must also exist in the VFS so
//! directory listings, the shell's `/bin` resolution and the loader agree
//! on what is installed.
//!
//! Entry contract: the program receives the API facade and its argv and
//! its future resolves to the exit code.

use crate::api::Api;
use futures::future::LocalBoxFuture;
use std::collections::HashMap;
use std::rc::Rc;

/// A program entry point: `main(api, argv) -> exit code`.
///
/// argv\[0\] is the program path by convention, mirroring the C contract.
pub type ProgramEntry = Rc<dyn Fn(Api, Vec<String>) -> LocalBoxFuture<'static, i32>>;

/// Path → entry point table.
#[derive(Default)]
pub struct ProgramRegistry {
    programs: HashMap<String, ProgramEntry>,
}

impl ProgramRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: &str, entry: ProgramEntry) {
        self.programs.insert(path.to_string(), entry);
    }

    pub fn resolve(&self, path: &str) -> Option<ProgramEntry> {
        self.programs.get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.programs.contains_key(path)
    }
}

/// Wraps an `async fn(Api, Vec<String>) -> i32` into a [`ProgramEntry`].
pub fn program<F, Fut>(f: F) -> ProgramEntry
where
    F: Fn(Api, Vec<String>) -> Fut + 'static,
    Fut: std::future::Future<Output = i32> + 'static,
{
    Rc::new(move |api, argv| Box::pin(f(api, argv)))
}
