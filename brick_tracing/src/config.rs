use crate::{FormatFlavor, Verbosity};
use serde::Deserialize;
use std::collections::BTreeMap;

pub mod flavor;
pub mod verbosity;

/// Represents the application-level configuration section that covers everything
/// related to pre-configuring the [formatted layer](tracing_subscriber::fmt::Layer)
/// provided by the `tracing` crate. In essence, this is the application
/// **logging** configuration.
///
/// Every key is optional: missing keys take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    #[serde(alias = "level")]
    verbosity: Verbosity,
    #[serde(alias = "flavour", alias = "format")]
    flavor: FormatFlavor,
    #[serde(alias = "colour", alias = "with_color", alias = "show_color")]
    color: bool,
    #[serde(alias = "with_timestamp")]
    show_timestamp: bool,
    #[serde(alias = "with_target")]
    show_target: bool,
    #[serde(alias = "with_file")]
    show_file: bool,
    #[serde(alias = "show_line", alias = "with_line_number")]
    show_line_number: bool,
    #[serde(alias = "with_level")]
    show_level: bool,
    #[serde(alias = "with_thread_id")]
    show_thread_id: bool,
    #[serde(alias = "with_thread_name")]
    show_thread_name: bool,
    #[cfg(feature = "json")]
    #[serde(alias = "flat_json")]
    flatten_json: bool,
    #[serde(alias = "target_verbosity")]
    targets: BTreeMap<String, Verbosity>,
}

impl TracingConfig {
    /// Replaces the root [`Verbosity`] level of this config.
    pub fn with_verbosity(self, verbosity: impl Into<Verbosity>) -> Self {
        Self {
            verbosity: verbosity.into(),
            ..self
        }
    }

    /// Replaces the [`FormatFlavor`] of this config.
    pub fn with_flavor(self, flavor: FormatFlavor) -> Self {
        Self { flavor, ..self }
    }

    /// Merges an extra per-target [`Verbosity`] level into this config.
    pub fn with_target(
        mut self,
        target: impl Into<String>,
        verbosity: impl Into<Verbosity>,
    ) -> Self {
        self.targets.insert(target.into(), verbosity.into());

        self
    }
}

impl TracingConfig {
    /// Reports the root [verbosity level](Verbosity) for this logging
    /// configuration.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Reports the [formatting flavor](FormatFlavor) for this logging
    /// configuration.
    pub fn flavor(&self) -> FormatFlavor {
        self.flavor
    }

    /// Reports whether this logging configuration enables
    /// [colored](tracing_subscriber::fmt::Layer::with_ansi) output.
    pub fn color(&self) -> bool {
        self.color
    }

    /// Reports whether the output includes the timestamp.
    pub fn show_timestamp(&self) -> bool {
        self.show_timestamp
    }

    /// Reports whether the output includes the target.
    pub fn show_target(&self) -> bool {
        self.show_target
    }

    /// Reports whether the output includes the source file.
    pub fn show_file(&self) -> bool {
        self.show_file
    }

    /// Reports whether the output includes the source line number.
    pub fn show_line_number(&self) -> bool {
        self.show_line_number
    }

    /// Reports whether the output includes the level.
    pub fn show_level(&self) -> bool {
        self.show_level
    }

    /// Reports whether the output includes the thread ID.
    pub fn show_thread_id(&self) -> bool {
        self.show_thread_id
    }

    /// Reports whether the output includes the thread name.
    pub fn show_thread_name(&self) -> bool {
        self.show_thread_name
    }

    /// Reports whether this logging configuration flattens the JSON output.
    #[cfg(feature = "json")]
    pub fn flatten_json(&self) -> bool {
        self.flatten_json
    }

    /// Reports the customized per-target verbosity for this logging
    /// configuration.
    pub fn targets(&self) -> &BTreeMap<String, Verbosity> {
        &self.targets
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            flavor: FormatFlavor::default(),
            color: true,
            show_timestamp: true,
            show_target: true,
            show_file: false,
            show_line_number: false,
            show_level: true,
            show_thread_id: true,
            show_thread_name: false,
            #[cfg(feature = "json")]
            flatten_json: true,
            targets: BTreeMap::new(),
        }
    }
}

impl AsRef<TracingConfig> for TracingConfig {
    fn as_ref(&self) -> &TracingConfig {
        self
    }
}
