use crate::ConfigLoadError;
use std::path::{Path, PathBuf};
use tracing::debug;

const FILE_DOT_ENV: &str = ".env";
const FILE_DOT_ENV_TEMPLATE: &str = ".env.template";
const ENVIRONMENT_SUFFIX: &str = "ENVIRONMENT";

/// An ordered collection of `.env` files that populate the process environment
/// ahead of loading the configuration.
///
/// Loading never overrides a variable that is already set, so for any given
/// variable the first file to define it wins. Collections are concatenated
/// with [`and`](EnvFiles::and).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFiles {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    /// A concrete file path.
    File { path: PathBuf, required: bool },

    /// The `.env.<ENVIRONMENT>` file, resolved when loading.
    PerEnvironment { variable: String },
}

impl EnvFiles {
    /// Creates a collection of files that must all exist: a missing file fails
    /// the load.
    pub fn required<P>(paths: impl IntoIterator<Item = P>) -> Self
    where
        P: Into<PathBuf>,
    {
        Self::from_paths(paths, true)
    }

    /// Creates a collection of files that are loaded if they exist and
    /// silently skipped otherwise.
    pub fn optional<P>(paths: impl IntoIterator<Item = P>) -> Self
    where
        P: Into<PathBuf>,
    {
        Self::from_paths(paths, false)
    }

    /// Creates the default collection for the given variable prefix, all files
    /// optional:
    ///
    /// 1. `.env`
    /// 2. `.env.<ENVIRONMENT>`, where `ENVIRONMENT` is the value of the
    ///    `<PREFIX>_ENVIRONMENT` variable at load time (after `.env` has been
    ///    applied); skipped if the variable is unset or empty
    /// 3. `.env.template`
    pub fn defaults(prefix: impl AsRef<str>) -> Self {
        let prefix = prefix.as_ref();
        let variable = if prefix.is_empty() {
            ENVIRONMENT_SUFFIX.to_string()
        } else {
            format!("{prefix}_{ENVIRONMENT_SUFFIX}")
        };

        Self::optional([FILE_DOT_ENV])
            .and(Self {
                entries: vec![Entry::PerEnvironment { variable }],
            })
            .and(Self::optional([FILE_DOT_ENV_TEMPLATE]))
    }

    /// Appends the given collection to this one. Files of `self` keep their
    /// precedence over the appended files.
    pub fn and(mut self, other: EnvFiles) -> Self {
        self.entries.extend(other.entries);

        self
    }

    /// Reports whether this collection has no files.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies the files of this collection to the process environment, in
    /// order.
    ///
    /// Each file is parsed and applied in full before the next one is
    /// considered. On error, files applied before the failing one remain
    /// applied.
    pub fn load(&self) -> Result<(), ConfigLoadError> {
        for entry in &self.entries {
            match entry {
                Entry::File { path, required } => apply(path, *required)?,
                Entry::PerEnvironment { variable } => {
                    let environment = std::env::var(variable).unwrap_or_default();

                    if environment.is_empty() {
                        continue;
                    }

                    apply(&per_environment_path(&environment), false)?;
                }
            }
        }

        Ok(())
    }

    fn from_paths<P>(paths: impl IntoIterator<Item = P>, required: bool) -> Self
    where
        P: Into<PathBuf>,
    {
        let entries = paths
            .into_iter()
            .map(|path| Entry::File {
                path: path.into(),
                required,
            })
            .collect();

        Self { entries }
    }
}

fn per_environment_path(environment: &str) -> PathBuf {
    PathBuf::from(format!("{FILE_DOT_ENV}.{environment}"))
}

/// Applies a single file. Optional files that are absent (or are not regular
/// files) are skipped.
fn apply(path: &Path, required: bool) -> Result<(), ConfigLoadError> {
    if !required && !path.is_file() {
        return Ok(());
    }

    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Applied env file");

            Ok(())
        }
        Err(source) => Err(ConfigLoadError::EnvFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}
