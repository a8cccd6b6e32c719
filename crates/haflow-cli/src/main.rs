mod config;

use config::{CliConfig, LOG_VAR};
use haflow::render::{OutputFormat, RenderOptions};
use haflow::{HeadlessError, NameBinding, SourceKind};
use serde_json::Value;
use std::io::Read;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const NOTHING_TO_RENDER: &str = "No automations found or cannot connect to Home Assistant";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Read { path: String, err: std::io::Error },
    Haflow(HeadlessError),
    NothingToRender,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Read { path, err } => write!(f, "cannot read {path}: {err}"),
            CliError::Haflow(err) => write!(f, "{err}"),
            CliError::NothingToRender => write!(f, "{NOTHING_TO_RENDER}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Haflow(value)
    }
}

impl From<haflow::Error> for CliError {
    fn from(value: haflow::Error) -> Self {
        Self::Haflow(value.into())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum SourceArg {
    #[default]
    Config,
    States,
}

#[derive(Debug, Default)]
struct Args {
    source: SourceArg,
    input: Option<String>,
    config_path: Option<String>,
    states_path: Option<String>,
    format: Option<OutputFormat>,
    pretty: bool,
    no_style: bool,
    out: Option<String>,
    verbose: bool,
}

fn usage() -> &'static str {
    "haflow-cli\n\
\n\
USAGE:\n\
  haflow-cli [render] [--source config|states] [--config <path>] [--states <path>] [--format html|mermaid|json] [--pretty] [--no-style] [--out <path>] [--verbose] [<path>|-]\n\
\n\
NOTES:\n\
  - --source config (default) reads automations.yaml: <path>, else --config, else $AUTOMATIONS_YAML_PATH.\n\
  - --states (or $HA_STATES_PATH) points at a /api/states dump used for friendly names.\n\
  - When the YAML is missing, fails to parse or yields nothing and a states dump is available, its enabled automations are shown instead.\n\
  - --source states renders the automations listed in the states dump (<path>, --states, or stdin).\n\
  - '-' reads stdin. Output goes to stdout unless --out is given.\n\
  - Logging goes to stderr; filter with $HAFLOW_LOG or $RUST_LOG.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => {}
            "--pretty" => args.pretty = true,
            "--no-style" => args.no_style = true,
            "--verbose" | "-v" => args.verbose = true,
            "--source" => {
                let Some(source) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.source = match source.as_str() {
                    "config" | "yaml" => SourceArg::Config,
                    "states" | "api" => SourceArg::States,
                    _ => return Err(CliError::Usage(usage())),
                };
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config_path = Some(path.clone());
            }
            "--states" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.states_path = Some(path.clone());
            }
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.format = Some(
                    fmt.parse::<OutputFormat>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("haflow=debug")
    } else {
        std::env::var(LOG_VAR)
            .ok()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .or_else(|| EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| EnvFilter::new("haflow=info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path).map_err(|err| CliError::Read {
            path: path.to_string(),
            err,
        }),
    }
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::info!(path, bytes = text.len(), "wrote diagram");
            Ok(())
        }
    }
}

/// Raw records plus everything needed to normalize them.
struct Loaded {
    raws: Vec<Value>,
    source: SourceKind,
    names: NameBinding,
}

/// Reads the optional states dump. Failures only cost friendly names, so they are logged and
/// swallowed.
fn read_optional_states(path: Option<&str>) -> Option<Vec<Value>> {
    let path = path?;
    let text = match read_input(Some(path)) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("continuing without friendly names: {err}");
            return None;
        }
    };
    match haflow::parse_states_json(&text) {
        Ok(states) => Some(states),
        Err(err) => {
            tracing::warn!(path, "continuing without friendly names: {err}");
            None
        }
    }
}

fn load_config_source(
    args: &Args,
    config: &CliConfig,
    states_path: Option<&str>,
) -> Result<Loaded, CliError> {
    let yaml_path = args
        .input
        .as_deref()
        .or(args.config_path.as_deref())
        .unwrap_or(config.automations_yaml_path.as_str());

    let states = read_optional_states(states_path);
    let names = states
        .as_deref()
        .map(NameBinding::from_states)
        .unwrap_or_default();

    let raws = match read_input(Some(yaml_path)) {
        Ok(text) => match haflow::parse_config_yaml(&text) {
            Ok(raws) => raws,
            Err(err) if states.is_some() => {
                tracing::warn!(path = yaml_path, "automations YAML not usable: {err}");
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        },
        Err(err) if yaml_path != "-" => {
            tracing::warn!("automations YAML not available: {err}");
            Vec::new()
        }
        Err(err) => return Err(err),
    };
    if !raws.is_empty() {
        tracing::info!(path = yaml_path, records = raws.len(), "reading automations from YAML");
        return Ok(Loaded {
            raws,
            source: SourceKind::ConfigFile,
            names,
        });
    }

    let Some(states) = states else {
        return Ok(Loaded {
            raws,
            source: SourceKind::ConfigFile,
            names,
        });
    };
    let raws = haflow::enabled_automation_states(&states);
    tracing::warn!(
        automations = raws.len(),
        "no automations in YAML; falling back to the states dump (limited detail)"
    );
    Ok(Loaded {
        raws,
        source: SourceKind::StateSnapshot,
        names,
    })
}

fn load_states_source(path: Option<&str>) -> Result<Loaded, CliError> {
    let text = read_input(path)?;
    let states = haflow::parse_states_json(&text)?;
    let names = NameBinding::from_states(&states);
    let raws = haflow::enabled_automation_states(&states);
    tracing::info!(automations = raws.len(), "reading automations from states dump");
    Ok(Loaded {
        raws,
        source: SourceKind::StateSnapshot,
        names,
    })
}

fn run(args: Args, config: CliConfig) -> Result<(), CliError> {
    let format = args.format.unwrap_or(config.format);
    let mut options = RenderOptions::default();
    if args.no_style {
        options = options.without_style();
    }
    let states_path = args
        .states_path
        .as_deref()
        .or(config.states_path.as_deref());

    let loaded = match args.source {
        SourceArg::Config => load_config_source(&args, &config, states_path)?,
        SourceArg::States => load_states_source(args.input.as_deref().or(states_path))?,
    };

    let Some(text) = haflow::produce(
        &loaded.raws,
        loaded.source,
        &loaded.names,
        format,
        &options,
        args.pretty,
    )?
    else {
        return Err(CliError::NothingToRender);
    };
    write_text(&text, args.out.as_deref())
}

fn main() {
    dotenvy::dotenv().ok();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing(args.verbose);
    let config = CliConfig::from_env();

    match run(args, config) {
        Ok(()) => {}
        Err(CliError::NothingToRender) => {
            eprintln!("{}", CliError::NothingToRender);
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("haflow-cli")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parses_full_command_line() {
        let args = parse_args(&argv(&[
            "render",
            "--source",
            "states",
            "--states",
            "s.json",
            "--format",
            "json",
            "--pretty",
            "--no-style",
            "--out",
            "o.json",
            "-",
        ]))
        .expect("valid args");
        assert_eq!(args.source, SourceArg::States);
        assert_eq!(args.states_path.as_deref(), Some("s.json"));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert!(args.pretty && args.no_style);
        assert_eq!(args.out.as_deref(), Some("o.json"));
        assert_eq!(args.input.as_deref(), Some("-"));
    }

    #[test]
    fn rejects_bad_usage() {
        for bad in [
            vec!["--format", "svg"],
            vec!["--source"],
            vec!["--bogus"],
            vec!["a.yaml", "b.yaml"],
        ] {
            assert!(matches!(parse_args(&argv(&bad)), Err(CliError::Usage(_))));
        }
    }
}
