//! FTL command line.
//!
//! Renders templates against JSON data models, checks their syntax, and
//! prints their canonical form.

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;

use ftlc::diagnostics::{parse_error_report, template_error_report};
use ftlc::{json, Configuration, RenderError, Settings, SimpleHash, Template, Value};

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return ExitCode::FAILURE;
    };
    let options = match Options::parse(&args[1..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };
    let result = match command.as_str() {
        "render" => render(&options),
        "check" => check(&options),
        "canonical" => canonical(&options),
        "formats" => {
            for name in Configuration::default().output_formats().names() {
                println!("{name}");
            }
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(format!("unknown command: {other}")),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Enabled by `RUST_LOG`, e.g. `RUST_LOG=ftl_eval=debug`.
fn init_tracing() {
    use tracing_subscriber::{prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_writer(io::stderr),
            )
            .init();
    }
}

fn print_usage() {
    eprintln!("Usage: ftl <command> <template> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  render <template>     Render a template to standard output");
    eprintln!("  check <template>      Parse a template and report syntax errors");
    eprintln!("  canonical <template>  Print the canonical form of a template");
    eprintln!("  formats               List the output formats");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --data <file.json>      Data model (a JSON object)");
    eprintln!("  --settings <file.json>  Parser options and render settings");
    eprintln!("  --set <name>=<value>    A render setting, like #setting");
    eprintln!("  --output <file>         Write output to a file");
}

#[derive(Default)]
struct Options {
    template: Option<String>,
    data: Option<String>,
    settings: Option<String>,
    set: Vec<(String, String)>,
    output: Option<String>,
}

impl Options {
    fn parse(args: &[String]) -> Result<Options, String> {
        let mut options = Options::default();
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .cloned()
                    .ok_or_else(|| format!("{flag} needs a value"))
            };
            match arg.as_str() {
                "--data" | "-d" => options.data = Some(value("--data")?),
                "--settings" | "-s" => options.settings = Some(value("--settings")?),
                "--output" | "-o" => options.output = Some(value("--output")?),
                "--set" => {
                    let setting = value("--set")?;
                    let Some((name, value)) = setting.split_once('=') else {
                        return Err(format!("--set expects name=value, got {setting:?}"));
                    };
                    options.set.push((name.to_owned(), value.to_owned()));
                }
                flag if flag.starts_with('-') => return Err(format!("unknown option: {flag}")),
                path if options.template.is_none() => options.template = Some(path.to_owned()),
                extra => return Err(format!("unexpected argument: {extra}")),
            }
        }
        Ok(options)
    }

    fn template_path(&self) -> Result<&str, String> {
        self.template
            .as_deref()
            .ok_or_else(|| "missing template path".to_owned())
    }
}

fn read(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("error: can't read {path}: {e}"))
}

fn configuration(options: &Options, template_path: &str) -> Result<Configuration, String> {
    let mut builder = Configuration::builder();
    let extension = Path::new(template_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    if let Some(format) = Configuration::default()
        .output_formats()
        .by_file_extension(extension)
    {
        builder = builder.output_format(format);
    }
    if let Some(path) = &options.settings {
        let settings =
            Settings::from_json(&read(path)?).map_err(|e| format!("error: {path}: {e}"))?;
        builder = settings.apply(builder).map_err(|e| format!("error: {path}: {e}"))?;
    }
    for (name, value) in &options.set {
        builder = builder
            .setting(name, value)
            .map_err(|e| format!("error: --set {name}: {e}"))?;
    }
    Ok(builder.build())
}

fn load(options: &Options) -> Result<Template, String> {
    let path = options.template_path()?;
    let source = read(path)?;
    let config = configuration(options, path)?;
    let color = io::stderr().is_terminal();
    config
        .parse(path, &source)
        .map_err(|e| parse_error_report(path, &source, &e, color))
}

fn render(options: &Options) -> Result<(), String> {
    let template = load(options)?;
    let model = match &options.data {
        Some(path) => {
            json::data_model_from_str(&read(path)?).map_err(|e| format!("error: {path}: {e}"))?
        }
        None => Value::hash(SimpleHash::new()),
    };
    let result = match &options.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .map_err(|e| format!("error: can't create {path}: {e}"))?;
            let mut out = io::BufWriter::new(file);
            template
                .render(model, &mut out)
                .and_then(|()| out.flush().map_err(RenderError::Io))
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            template
                .render(model, &mut out)
                .and_then(|()| out.flush().map_err(RenderError::Io))
        }
    };
    match result {
        Ok(()) => Ok(()),
        Err(RenderError::Template(error)) => Err(template_error_report(
            template.name(),
            template.source(),
            &error,
            io::stderr().is_terminal(),
        )),
        Err(other) => Err(format!("error: {other}")),
    }
}

fn check(options: &Options) -> Result<(), String> {
    let template = load(options)?;
    println!("{}: ok ({} output)", template.name(), template.output_format());
    Ok(())
}

fn canonical(options: &Options) -> Result<(), String> {
    let template = load(options)?;
    print!("{}", template.canonical());
    Ok(())
}
