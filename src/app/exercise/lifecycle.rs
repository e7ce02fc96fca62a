//! Exercise lifecycle manager
//!
//! Orchestrates every workspace operation: downloading and extracting
//! bundles, merging updates, packaging and uploading assignments, and warning
//! about version drift. All paths are resolved against the manager's working
//! directory, never the process one.
//!
//! Hazards (existing folders, nested exercises, outdated versions) are raised
//! through the [`Interaction`] seam. A declined confirmation ends the
//! operation with `Ok(None)` and no side effects.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::app::archive::{
    extract_bundle, format_size, pack_directory, posix_path, BundleOutput, ExtractTarget,
    PackReport,
};
use crate::app::client::PypasClient;
use crate::app::exercise::config::ExerciseSettings;
use crate::app::exercise::merge::{apply_update, FileChange, MergeReport};
use crate::app::exercise::state::{find_nested_config, is_inside_exercise, LocalExerciseState};
use crate::app::exercise::version::{DriftCheck, Exercise};
use crate::app::interaction::{Interaction, MessageKind};
use crate::constants::{exercise as exercise_constants, service};
use crate::errors::{AuthError, ExerciseError, ExerciseResult, Result};

/// Drives exercise operations for one working directory
pub struct ExerciseManager<I: Interaction> {
    settings: ExerciseSettings,
    client: PypasClient,
    interaction: I,
    workdir: PathBuf,
}

impl<I: Interaction> ExerciseManager<I> {
    pub fn new(
        settings: ExerciseSettings,
        client: PypasClient,
        interaction: I,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            settings,
            client,
            interaction,
            workdir: workdir.into(),
        }
    }

    pub fn settings(&self) -> &ExerciseSettings {
        &self.settings
    }

    pub fn client(&self) -> &PypasClient {
        &self.client
    }

    pub fn interaction(&self) -> &I {
        &self.interaction
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// State of the exercise in the working directory
    pub fn local_state(&self) -> ExerciseResult<LocalExerciseState> {
        LocalExerciseState::load(&self.workdir, &self.settings)
    }

    /// Download an exercise into `./<slug>`
    pub async fn get(&self, slug: &str, token: &str) -> Result<Option<PathBuf>> {
        validate_slug(slug)?;
        let exercise = Exercise::new(slug);
        let folder = self.workdir.join(exercise.folder());

        if folder.exists() && !self.confirm_overwrite(slug) {
            return Ok(None);
        }
        if is_inside_exercise(&self.workdir, &self.settings)
            && !self.confirm_hazard(
                "Current folder seems to be a pypas exercise.",
                "If continue, files coming from server will MESS your existing files",
            )
        {
            return Ok(None);
        }

        let bundle = self.client.download_exercise(exercise.slug(), token).await?;
        self.notify(MessageKind::Info, "Inflating exercise bundle");
        let folder = extract_bundle(&bundle, ExtractTarget::Folder(folder))?;

        info!("Exercise {} extracted into {}", exercise, folder.display());
        self.notify(
            MessageKind::Success,
            &format!("Exercise is available at ./{} ✔", slug),
        );
        Ok(Some(folder))
    }

    /// Merge the latest bundle of the current exercise into the workspace
    ///
    /// With `force`, modified files are overwritten without backups.
    pub async fn update(&self, token: &str, force: bool) -> Result<MergeReport> {
        let state = self.local_state()?;
        let backup_filter = state.backup_filter()?;
        let exercise = Exercise::new(&state.slug);

        let bundle = self.client.download_exercise(exercise.slug(), token).await?;
        self.notify(MessageKind::Info, "Inflating exercise bundle");
        let staging = extract_bundle(
            &bundle,
            ExtractTarget::TempDir(self.settings.temp_dir.clone()),
        )?;
        let report = apply_update(&staging, &self.workdir, &backup_filter, !force)?;

        for file in &report.files {
            let marker = match file.change {
                FileChange::Added => "[A]",
                _ => "[U]",
            };
            self.notify(
                MessageKind::Highlight,
                &format!("{} {}", marker, posix_path(&file.path)),
            );
            if let Some(backup) = &file.backup {
                self.notify(
                    MessageKind::Debug,
                    &format!(
                        " (Backup {} → {})",
                        posix_path(&file.path),
                        posix_path(backup)
                    ),
                );
            }
        }
        if report.is_empty() {
            self.notify(MessageKind::Info, "All files are already up to date");
        }

        let new_version = match self.local_state() {
            Ok(updated) => updated.version,
            Err(e) => {
                warn!("Could not re-read exercise config after update: {}", e);
                state.version.clone()
            }
        };
        info!(
            "Updated {}: {} added, {} updated, {} unchanged",
            exercise,
            report.added().count(),
            report.updated().count(),
            report.unchanged
        );
        self.notify(
            MessageKind::Success,
            &format!(
                "Updated {} from {} to {}",
                exercise, state.version, new_version
            ),
        );
        Ok(report)
    }

    /// Package the workspace and upload it as an assignment
    ///
    /// Returns the server message, or `None` when the user declined a
    /// confirmation. The temporary bundle is removed whatever the outcome.
    pub async fn put(&self, token: Option<&str>) -> Result<Option<String>> {
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let state = self.local_state()?;
        let exclude = state.exclude_filter()?;

        if let Some(nested) = find_nested_config(&self.workdir, &self.settings) {
            let warning = format!(
                "Another exercise seems to be nested inside current folder: ./{}",
                posix_path(&nested)
            );
            if !self.confirm_hazard(&warning, "If continue, upload will BREAK testing") {
                return Ok(None);
            }
        }

        let exercise = Exercise::new(&state.slug);
        self.notify(MessageKind::Info, "Compressing exercise contents");
        let report = pack_directory(
            &self.workdir,
            &exclude,
            BundleOutput::Temp(self.settings.temp_dir.clone()),
            &exercise.bundle_name(),
        )?;

        let result = self.upload_bundle(&exercise, &state, token, &report.bundle).await;
        if let Err(e) = fs::remove_file(&report.bundle) {
            debug!(
                "Temporary file couldn't be removed: '{}': {}",
                report.bundle.display(),
                e
            );
        }
        result
    }

    async fn upload_bundle(
        &self,
        exercise: &Exercise,
        state: &LocalExerciseState,
        token: &str,
        bundle: &Path,
    ) -> Result<Option<String>> {
        self.check_bundle_size(bundle)?;
        if !self
            .handle_exercise_version(exercise, state, Some("uploading"))
            .await
        {
            return Ok(None);
        }

        let message = self
            .client
            .upload_assignment(exercise.slug(), token, bundle)
            .await?;
        info!("Uploaded assignment for {}", exercise);
        self.notify(MessageKind::Success, "Exercise was successfully uploaded");
        self.notify(MessageKind::Debug, &message);
        Ok(Some(message))
    }

    /// Download an assignment (or every assignment of a frame) into `./<item>`
    pub async fn pull(&self, item_slug: &str, token: &str) -> Result<Option<PathBuf>> {
        validate_slug(item_slug)?;
        let folder = self.workdir.join(item_slug);
        if folder.exists() && !self.confirm_overwrite(item_slug) {
            return Ok(None);
        }

        let bundle = self.client.pull(item_slug, token).await?;
        let folder = extract_bundle(&bundle, ExtractTarget::Folder(folder))?;
        self.notify(
            MessageKind::Success,
            &format!("Assignment(s) are available at ./{} ✔", item_slug),
        );
        Ok(Some(folder))
    }

    /// Package the workspace into `./<slug>.zip`
    pub async fn zip(&self, verbose: bool) -> Result<PackReport> {
        let state = self.local_state()?;
        let exclude = state.exclude_filter()?;
        let exercise = Exercise::new(&state.slug);
        self.handle_exercise_version(&exercise, &state, None).await;

        self.notify(MessageKind::Info, "Compressing exercise contents");
        let output = self.workdir.join(exercise.bundle_name());
        let report = pack_directory(
            &self.workdir,
            &exclude,
            BundleOutput::Named(output),
            &exercise.bundle_name(),
        )?;
        if verbose {
            for path in &report.excluded {
                self.notify(
                    MessageKind::Warning,
                    &format!("Ignoring {}", posix_path(path)),
                );
            }
            for path in &report.included {
                self.notify(MessageKind::Debug, &posix_path(path));
            }
        }

        let size = fs::metadata(&report.bundle)?.len();
        self.notify(
            MessageKind::Info,
            &format!(
                "Compressed exercise is available at: ./{} ({})",
                exercise.bundle_name(),
                format_size(size)
            ),
        );
        Ok(report)
    }

    /// Warn when the published version differs from the local one
    ///
    /// With a `confirm_suffix`, an outdated exercise also asks
    /// "Continue <suffix>?" and returns the answer. Otherwise, and whenever
    /// no drift is detected, returns `true`.
    pub async fn handle_exercise_version(
        &self,
        exercise: &Exercise,
        state: &LocalExerciseState,
        confirm_suffix: Option<&str>,
    ) -> bool {
        let check = exercise
            .check_drift(
                &self.client,
                &state.version,
                self.settings.skip_version_check,
            )
            .await;
        let DriftCheck::Outdated { local, remote } = check else {
            return true;
        };

        self.notify(
            MessageKind::Warning,
            &format!(
                "A new version of {} is available: {} (you have {})",
                exercise, remote, local
            ),
        );
        self.notify(
            MessageKind::Warning,
            "You'll probably get errors if you continue using an old version.",
        );
        self.notify(
            MessageKind::Info,
            &format!(
                "Run pypas update to update to the latest version ({})",
                service::UPDATE_DOCS_URL
            ),
        );
        self.notify(
            MessageKind::Debug,
            &format!(
                "If you want to disable this warning, set an environment variable: {}=1",
                self.settings.skip_version_check_var
            ),
        );

        match confirm_suffix {
            Some(suffix) => self.interaction.confirm(&format!("Continue {}?", suffix)),
            None => true,
        }
    }

    /// Refuse bundles larger than the configured limit (the limit itself passes)
    pub fn check_bundle_size(&self, bundle: &Path) -> Result<u64> {
        self.notify(MessageKind::Info, "Checking file size");
        let size = fs::metadata(bundle)?.len();
        let limit = self.settings.large_file_size;
        if size > limit {
            return Err(ExerciseError::BundleTooLarge {
                size,
                limit,
                size_display: format_size(size),
            }
            .into());
        }
        debug!("Bundle size {} within limit {}", size, limit);
        Ok(size)
    }

    /// Run the exercise tests with extra `args`
    ///
    /// Uses the exercise's `test_cmd` through the shell, or `pytest` when the
    /// exercise does not declare one.
    pub async fn test(&self, args: &[String]) -> Result<ExitStatus> {
        let state = self.local_state()?;
        let exercise = Exercise::new(&state.slug);
        self.handle_exercise_version(&exercise, &state, None).await;

        let status = match &state.test_cmd {
            Some(test_cmd) => {
                let command_line = if args.is_empty() {
                    test_cmd.clone()
                } else {
                    format!("{} {}", test_cmd, args.join(" "))
                };
                self.notify(
                    MessageKind::Info,
                    &format!("Running tests with: {}", command_line),
                );
                self.execute(shell_command(&command_line), &command_line)
                    .await?
            }
            None => {
                let mut command = Command::new(exercise_constants::DEFAULT_TEST_CMD);
                command.args(args);
                self.execute(command, exercise_constants::DEFAULT_TEST_CMD)
                    .await?
            }
        };
        Ok(status)
    }

    /// Run the exercise entry point with the configured Python interpreter
    pub async fn run(&self) -> Result<ExitStatus> {
        let state = self.local_state()?;
        let exercise = Exercise::new(&state.slug);
        self.handle_exercise_version(&exercise, &state, None).await;

        let mut command = Command::new(&self.settings.python);
        command.arg(exercise_constants::MAIN_FILE);
        let command_line = format!("{} {}", self.settings.python, exercise_constants::MAIN_FILE);
        Ok(self.execute(command, &command_line).await?)
    }

    /// Open the exercise documentation with the platform opener
    pub async fn open_docs(&self) -> Result<ExitStatus> {
        let state = self.local_state()?;
        let exercise = Exercise::new(&state.slug);
        self.handle_exercise_version(&exercise, &state, None).await;

        let command = opener_command(exercise_constants::DOCS_FILE);
        Ok(self
            .execute(command, exercise_constants::DOCS_FILE)
            .await?)
    }

    async fn execute(
        &self,
        mut command: Command,
        command_line: &str,
    ) -> ExerciseResult<ExitStatus> {
        debug!("Running '{}' in {}", command_line, self.workdir.display());
        command
            .current_dir(&self.workdir)
            .status()
            .await
            .map_err(|e| ExerciseError::CommandFailed {
                command: command_line.to_string(),
                reason: e.to_string(),
            })
    }

    fn confirm_overwrite(&self, folder: &str) -> bool {
        self.confirm_hazard(
            &format!("Folder ./{} already exists!", folder),
            "If continue, files coming from server will OVERWRITE your existing files",
        )
    }

    fn confirm_hazard(&self, warning: &str, consequence: &str) -> bool {
        self.notify(MessageKind::Warning, warning);
        self.notify(MessageKind::Info, consequence);
        self.interaction.confirm("Continue?")
    }

    fn notify(&self, kind: MessageKind, message: &str) {
        self.interaction.notify(kind, message);
    }
}

/// Slugs become folder names, so they must be a single plain path component
fn validate_slug(slug: &str) -> ExerciseResult<()> {
    let valid = !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(|c| c == '/' || c == '\\')
        && !Path::new(slug).is_absolute();
    if valid {
        Ok(())
    } else {
        Err(ExerciseError::InvalidSlug {
            slug: slug.to_string(),
        })
    }
}

fn shell_command(command_line: &str) -> Command {
    if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(command_line);
        command
    } else {
        let mut command = Command::new("sh");
        command.arg("-c").arg(command_line);
        command
    }
}

fn opener_command(path: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(path);
        command
    } else if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]).arg(path);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(path);
        command
    }
}
