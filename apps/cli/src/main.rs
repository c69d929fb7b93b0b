use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use marlin_core::{transform, Options};
use marlin_renderer_html::render_html;
use marlin_rules::{check_all, RuleConfig};
use pico_args::Arguments;
use serde::Deserialize;
use walkdir::WalkDir;

const CONFIG_FILE: &str = "marlin.toml";

#[derive(Debug, Default)]
struct CliArgs {
    input: Option<String>,
    format: Option<String>,
    pretty: bool,
    config: Option<String>,
    max_depth: Option<usize>,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut pargs = Arguments::from_env();

    let input: Option<String> = pargs
        .opt_value_from_str(["-i", "--input"])
        .map_err(|e| e.to_string())?;
    let format: Option<String> = pargs
        .opt_value_from_str(["-f", "--format"])
        .map_err(|e| e.to_string())?;
    let pretty: bool = pargs.contains("--pretty");
    let config: Option<String> = pargs
        .opt_value_from_str("--config")
        .map_err(|e| e.to_string())?;
    let max_depth: Option<usize> = pargs
        .opt_value_from_str("--max-depth")
        .map_err(|e| e.to_string())?;

    // Ensure no unexpected free arguments
    let rest = pargs.finish();
    if !rest.is_empty() {
        return Err(format!("Unexpected arguments: {:?}", rest));
    }

    Ok(CliArgs {
        input,
        format,
        pretty,
        config,
        max_depth,
    })
}

#[derive(Debug, Deserialize, Default)]
struct MarlinConfig {
    #[serde(default)]
    rules: RuleConfig,
}

fn load_config(args: &CliArgs) -> Result<RuleConfig, String> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None if Path::new(CONFIG_FILE).exists() => Some(CONFIG_FILE.to_string()),
        None => None,
    };
    let Some(path) = path else {
        return Ok(RuleConfig::default());
    };
    let text = fs::read_to_string(&path).map_err(|e| format!("cannot read '{}': {}", path, e))?;
    let config: MarlinConfig =
        toml::from_str(&text).map_err(|e| format!("invalid {}: {}", path, e))?;
    Ok(config.rules)
}

fn collect_files(root: &str) -> Result<Vec<PathBuf>, String> {
    let path = Path::new(root);
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(format!("no such file or directory: '{}'", root));
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("md") | Some("markdown")
            )
        })
        .collect();
    files.sort();
    Ok(files)
}

fn read_inputs(args: &CliArgs) -> Result<Vec<(String, String)>, String> {
    if let Some(root) = &args.input {
        let mut inputs = Vec::new();
        for path in collect_files(root)? {
            let text = fs::read_to_string(&path)
                .map_err(|e| format!("cannot read file '{}': {}", path.display(), e))?;
            inputs.push((path.display().to_string(), text));
        }
        Ok(inputs)
    } else {
        let mut buf = String::new();
        // Read all of stdin; callers should pipe data when not using --input
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            return Err(format!("failed to read stdin: {}", e));
        }
        Ok(vec![("(stdin)".to_string(), buf)])
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return ExitCode::from(2);
        }
    };

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return ExitCode::from(2);
        }
    };

    let inputs = match read_inputs(&args) {
        Ok(inputs) => inputs,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return ExitCode::from(2);
        }
    };

    let mut options = Options::default();
    if let Some(depth) = args.max_depth {
        options.max_container_depth = depth;
    }

    // Default format is scan; tokens and html are the render surfaces.
    let format = args.format.as_deref().unwrap_or("scan");
    let mut violation_count = 0usize;

    for (label, text) in &inputs {
        let tokens = match transform(text, &options) {
            Ok(tokens) => tokens,
            Err(fault) => {
                // a fault is a tokenizer defect, reported as one
                // diagnostic line instead of crashing the process
                eprintln!("{}: BadTokenizationError: {}", label, fault);
                return ExitCode::from(2);
            }
        };
        match format {
            "scan" => {
                for violation in check_all(&tokens, &config) {
                    println!("{}:{}", label, violation);
                    violation_count += 1;
                }
            }
            "tokens" => {
                let rendered = if args.pretty {
                    serde_json::to_string_pretty(&tokens)
                } else {
                    serde_json::to_string(&tokens)
                };
                match rendered {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: failed to serialize tokens: {}", e);
                        return ExitCode::from(2);
                    }
                }
            }
            "html" => {
                print!("{}", render_html(&tokens));
            }
            other => {
                eprintln!("Error: unsupported format '{}'. Try --format scan|tokens|html", other);
                return ExitCode::from(2);
            }
        }
    }

    if format == "scan" && violation_count > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
