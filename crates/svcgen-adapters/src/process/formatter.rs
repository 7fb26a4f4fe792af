use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use svcgen_core::{
    application::{
        ApplicationError,
        ports::{CommandRunner, Formatter},
    },
    error::ScaffoldResult,
};

/// Default formatter command; paths are appended to it.
pub const DEFAULT_FORMAT_COMMAND: &str = "gofmt -w";

/// [`Formatter`] that runs an external formatter over written files.
///
/// Only files with one of the configured extensions are passed on.
/// Directories are always passed, since formatters such as `gofmt` recurse
/// into them.
pub struct CommandFormatter {
    runner: Box<dyn CommandRunner>,
    workspace_root: PathBuf,
    command: String,
    extensions: Vec<String>,
}

impl CommandFormatter {
    pub fn new(runner: Box<dyn CommandRunner>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workspace_root: workspace_root.into(),
            command: DEFAULT_FORMAT_COMMAND.to_string(),
            extensions: vec!["go".to_string()],
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn selects(&self, path: &Path) -> bool {
        if self.workspace_root.join(path).is_dir() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|x| x == ext))
    }
}

impl Formatter for CommandFormatter {
    #[instrument(skip_all, fields(command = %self.command))]
    fn format(&self, paths: &[PathBuf]) -> ScaffoldResult<()> {
        let selected: Vec<String> = paths
            .iter()
            .filter(|p| self.selects(p))
            .map(|p| p.to_string_lossy().into_owned())
            .collect();

        if selected.is_empty() {
            debug!("nothing to format");
            return Ok(());
        }

        let command_line = format!("{} {}", self.command, shell_words::join(&selected));
        debug!(files = selected.len(), "formatting");

        match self.runner.run(&command_line, &self.workspace_root)? {
            0 => Ok(()),
            code => Err(ApplicationError::CommandFailed {
                command: self.command.clone(),
                reason: format!("exited with status {code}"),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use svcgen_core::error::ScaffoldError;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
        exit: i32,
    }

    impl CommandRunner for Recorder {
        fn run(&self, command_line: &str, _cwd: &Path) -> ScaffoldResult<i32> {
            self.calls.lock().unwrap().push(command_line.to_string());
            Ok(self.exit)
        }
    }

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn formats_only_matching_extensions() {
        let recorder = Recorder::default();
        let formatter = CommandFormatter::new(Box::new(recorder.clone()), "/ws");
        formatter
            .format(&paths(&[
                "apps/services/x/cmd/server/main.go",
                "apps/services/x/Dockerfile",
                "apps/services/x/my file.go",
            ]))
            .unwrap();

        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec!["gofmt -w apps/services/x/cmd/server/main.go 'apps/services/x/my file.go'"]
        );
    }

    #[test]
    fn no_matching_files_runs_nothing() {
        let recorder = Recorder::default();
        CommandFormatter::new(Box::new(recorder.clone()), "/ws")
            .format(&paths(&["README.md"]))
            .unwrap();
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn directories_pass_through() {
        let ws = TempDir::new().unwrap();
        std::fs::create_dir_all(ws.path().join("libs/shared")).unwrap();
        let recorder = Recorder::default();
        CommandFormatter::new(Box::new(recorder.clone()), ws.path())
            .format(&paths(&["libs/shared"]))
            .unwrap();
        assert_eq!(*recorder.calls.lock().unwrap(), vec!["gofmt -w libs/shared"]);
    }

    #[test]
    fn custom_command_and_extensions() {
        let recorder = Recorder::default();
        CommandFormatter::new(Box::new(recorder.clone()), "/ws")
            .with_command("prettier --write")
            .with_extensions([".ts", "json"])
            .format(&paths(&["a.ts", "b.json", "c.go"]))
            .unwrap();
        assert_eq!(*recorder.calls.lock().unwrap(), vec!["prettier --write a.ts b.json"]);
    }

    #[test]
    fn non_zero_exit_is_command_failed() {
        let recorder = Recorder {
            exit: 2,
            ..Default::default()
        };
        let err = CommandFormatter::new(Box::new(recorder), "/ws")
            .format(&paths(&["main.go"]))
            .unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::Application(ApplicationError::CommandFailed { .. })
        ));
    }
}
