use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use serde::Deserialize;

use highmark_core::{
    export_with_options, normalize, normalize_as, tokenize, Color, Diagnostic, ExportError,
    Highlight, HighlightId, MarkupOptions, E_ENCODING,
};

fn main() {
    let mut input: Option<String> = None;
    let mut highlights_path: Option<String> = None;
    let mut format: Option<String> = None;
    let mut continuity = true;
    let mut diagnostics_mode = DiagnosticsMode::Pretty;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--no-continuity" => continuity = false,
            "--highlights" => {
                highlights_path = match args.next() {
                    Some(path) => Some(path),
                    None => {
                        eprintln!("--highlights expects a JSON file path");
                        print_usage();
                        process::exit(2);
                    }
                };
            }
            "--format" => {
                format = match args.next().as_deref() {
                    Some("auto") => None,
                    Some(name @ ("plain" | "markdown")) => Some(name.to_string()),
                    _ => {
                        eprintln!("--format expects: auto | plain | markdown");
                        print_usage();
                        process::exit(2);
                    }
                };
            }
            "--diagnostics" => {
                diagnostics_mode = match args.next().as_deref() {
                    Some("json") => DiagnosticsMode::Json,
                    Some("pretty") => DiagnosticsMode::Pretty,
                    _ => {
                        eprintln!("--diagnostics expects: json | pretty");
                        print_usage();
                        process::exit(2);
                    }
                };
            }
            _ => {
                if input.is_none() {
                    input = Some(arg);
                } else {
                    eprintln!("unexpected argument: {}", arg);
                    print_usage();
                    process::exit(2);
                }
            }
        }
    }

    let bytes = match input {
        Some(path) => fs::read(&path).unwrap_or_else(|err| {
            eprintln!("failed to read {}: {}", path, err);
            process::exit(1);
        }),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer).unwrap_or_else(|err| {
                eprintln!("failed to read stdin: {}", err);
                process::exit(1);
            });
            buffer
        }
    };

    // Encoding failures carry the byte offset of the first bad sequence.
    if let Err(err) = tokenize(&bytes) {
        eprintln!("error {}: {}", E_ENCODING, err);
        process::exit(1);
    }
    let source = String::from_utf8(bytes).unwrap_or_else(|err| {
        eprintln!("error {}: {}", E_ENCODING, err);
        process::exit(1);
    });

    let highlights = match highlights_path {
        Some(path) => load_highlights(&path),
        None => Vec::new(),
    };

    let document = match format.as_deref() {
        Some(name) => normalize_as(&source, name).unwrap_or_else(|| {
            eprintln!("unknown format: {}", name);
            process::exit(2);
        }),
        None => normalize(&source),
    };

    let options = MarkupOptions {
        continuity_extent: continuity,
    };

    match export_with_options(&document, &highlights, &options) {
        Ok(markup) => print!("{}", markup),
        Err(error) => {
            report_error(&error, diagnostics_mode);
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "Usage: highmark-cli [--format auto|plain|markdown] [--highlights file.json] [--no-continuity] [--diagnostics json|pretty] [input]"
    );
}

#[derive(Clone, Copy)]
enum DiagnosticsMode {
    Json,
    Pretty,
}

/// Wire shape of one highlight in the `--highlights` file.
#[derive(Debug, Deserialize)]
struct HighlightSpec {
    id: u64,
    start: usize,
    end: usize,
    tag: String,
    color: String,
    priority: u32,
}

fn load_highlights(path: &str) -> Vec<Highlight> {
    let raw = fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("failed to read {}: {}", path, err);
        process::exit(1);
    });
    let specs: Vec<HighlightSpec> = serde_json::from_str(&raw).unwrap_or_else(|err| {
        eprintln!("failed to parse {}: {}", path, err);
        process::exit(1);
    });

    let mut highlights = Vec::with_capacity(specs.len());
    for spec in specs {
        let color = Color::parse(&spec.color).unwrap_or_else(|err| {
            eprintln!("highlight {}: {}", spec.id, err);
            process::exit(1);
        });
        highlights.push(Highlight {
            id: HighlightId(spec.id),
            start: spec.start,
            end: spec.end,
            tag: spec.tag,
            color,
            priority: spec.priority,
        });
    }
    highlights
}

fn report_error(error: &ExportError, mode: DiagnosticsMode) {
    match error {
        ExportError::InvalidRanges(diagnostics) => match mode {
            DiagnosticsMode::Json => eprintln!("{}", diagnostics_to_json(diagnostics)),
            DiagnosticsMode::Pretty => {
                for diagnostic in diagnostics {
                    match diagnostic.highlight {
                        Some(id) => eprintln!(
                            "error {} (highlight {}): {}",
                            diagnostic.code, id.0, diagnostic.message
                        ),
                        None => eprintln!("error {}: {}", diagnostic.code, diagnostic.message),
                    }
                }
            }
        },
        other => eprintln!("error: {}", other),
    }
}

fn diagnostics_to_json(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return "[]".to_string();
    }

    let mut out = String::new();
    out.push_str("[\n");
    for (idx, diagnostic) in diagnostics.iter().enumerate() {
        out.push_str("  {\n");
        out.push_str(&format!("    \"code\": \"{}\",\n", diagnostic.code));
        if let Some(id) = diagnostic.highlight {
            out.push_str(&format!("    \"highlight\": {},\n", id.0));
        }
        out.push_str(&format!(
            "    \"message\": \"{}\"\n",
            escape_json(&diagnostic.message)
        ));
        out.push_str("  }");
        if idx + 1 < diagnostics.len() {
            out.push_str(",\n");
        } else {
            out.push('\n');
        }
    }
    out.push(']');
    out
}

fn escape_json(value: &str) -> String {
    let mut out = String::new();
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}
