use crate::{FormatFlavor, TracingConfig};
use tracing_core::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::Layer as FmtLayer;
use tracing_subscriber::fmt::format::Format;
use tracing_subscriber::fmt::{FormatFields, layer as make_fmt_layer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Creates a [formatted `Layer`](FmtLayer) based on the given
/// [config](TracingConfig), filtered by the configured root and per-target
/// verbosity.
pub fn make_layer<S>(config: impl AsRef<TracingConfig>) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let config = config.as_ref();
    let targets = make_targets(config);

    match config.flavor() {
        FormatFlavor::Full => finish(preconfigure(make_fmt_layer::<S>(), config), config, targets),
        FormatFlavor::Compact => finish(
            preconfigure(make_fmt_layer::<S>().compact(), config),
            config,
            targets,
        ),
        FormatFlavor::Pretty => finish(
            preconfigure(make_fmt_layer::<S>().pretty(), config),
            config,
            targets,
        ),
        #[cfg(feature = "json")]
        FormatFlavor::Json => finish(
            preconfigure(
                make_fmt_layer::<S>()
                    .json()
                    .flatten_event(config.flatten_json()),
                config,
            ),
            config,
            targets,
        ),
    }
}

/// Installs a [formatted layer](make_layer) built from the given config as the
/// global default subscriber.
///
/// Returns `false` if a global subscriber has already been installed, in which
/// case the existing one is left untouched. This makes repeated calls (e.g.,
/// from several tests within one binary) harmless.
pub fn init(config: impl AsRef<TracingConfig>) -> bool {
    Registry::default()
        .with(make_layer::<Registry>(config))
        .try_init()
        .is_ok()
}

/// Drops the timestamp if so configured, then attaches the target filter.
fn finish<S, N, L, T>(
    layer: FmtLayer<S, N, Format<L, T>>,
    config: &TracingConfig,
    targets: Targets,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> FormatFields<'writer> + Send + Sync + 'static,
    FmtLayer<S, N, Format<L, T>>: Layer<S> + Send + Sync + 'static,
    FmtLayer<S, N, Format<L, ()>>: Layer<S> + Send + Sync + 'static,
{
    if config.show_timestamp() {
        Box::new(layer.with_filter(targets))
    } else {
        Box::new(layer.without_time().with_filter(targets))
    }
}

/// Applies the display toggles of the given config to a freshly made layer.
fn preconfigure<S, N, L, T, W>(
    layer: FmtLayer<S, N, Format<L, T>, W>,
    config: &TracingConfig,
) -> FmtLayer<S, N, Format<L, T>, W>
where
    N: for<'writer> FormatFields<'writer> + 'static,
{
    #[cfg(feature = "json")]
    let ansi = config.color() && config.flavor() != FormatFlavor::Json;
    #[cfg(not(feature = "json"))]
    let ansi = config.color();

    layer
        .with_ansi(ansi)
        .with_target(config.show_target())
        .with_file(config.show_file())
        .with_line_number(config.show_line_number())
        .with_level(config.show_level())
        .with_thread_ids(config.show_thread_id())
        .with_thread_names(config.show_thread_name())
}

/// Builds the [per-target filter](Targets) from the root and per-target
/// verbosity of the given config.
fn make_targets(config: &TracingConfig) -> Targets {
    Targets::new()
        .with_default(config.verbosity())
        .with_targets(config.targets())
}
