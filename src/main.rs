// raybind: struct layouts and Python bindings for a wasm graphics library

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::Serialize;

use raybind::api::ApiDescription;
use raybind::ctype::parse_type;
use raybind::generator::{python, Generator, GeneratorOptions, Resolution};
use raybind::layout::{size_of, StructLayout, StructRegistry};
use raybind::ui::App;

#[derive(Parser, Debug)]
#[command(name = "raybind")]
#[command(about = "Struct layout resolver and binding generator for a wasm graphics API", long_about = None)]
#[command(version)]
struct Cli {
    /// only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse C type strings and print the result
    Parse {
        /// type strings, e.g. "const unsigned char *"
        #[arg(value_name = "TYPE", required = true)]
        types: Vec<String>,
    },

    /// Print the resolved layout of every struct
    Layout {
        /// API description files, processed in order
        #[arg(value_name = "API_JSON", required = true)]
        inputs: Vec<PathBuf>,

        /// print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// resolve in description order
        #[arg(long)]
        keep_order: bool,

        /// exit successfully even if some structs failed
        #[arg(long)]
        keep_going: bool,
    },

    /// Generate the Python module
    Generate {
        /// API description files, processed in order
        #[arg(value_name = "API_JSON", required = true)]
        inputs: Vec<PathBuf>,

        /// output file path (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// resolve in description order
        #[arg(long)]
        keep_order: bool,

        /// exit successfully even if some structs failed
        #[arg(long)]
        keep_going: bool,
    },

    /// Browse resolved layouts in the terminal
    Inspect {
        /// API description files, processed in order
        #[arg(value_name = "API_JSON", required = true)]
        inputs: Vec<PathBuf>,

        /// resolve in description order
        #[arg(long)]
        keep_order: bool,
    },
}

/// Layout plus the struct it aliases, for `--json`
#[derive(Serialize)]
struct LayoutReport<'a> {
    #[serde(flatten)]
    layout: &'a StructLayout,
    #[serde(skip_serializing_if = "Option::is_none")]
    alias_of: Option<&'a str>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Parse { types } => {
            if !parse_types(&types) {
                std::process::exit(1);
            }
        }
        Commands::Layout {
            inputs,
            json,
            keep_order,
            keep_going,
        } => {
            let resolution = resolve(&inputs, keep_order, quiet);
            let mut stdout = io::stdout().lock();
            if json {
                let reports: Vec<LayoutReport> = resolution
                    .registry
                    .iter()
                    .map(|layout| LayoutReport {
                        layout,
                        alias_of: resolution.alias_target(&layout.name),
                    })
                    .collect();
                serde_json::to_writer_pretty(&mut stdout, &reports)?;
                writeln!(stdout)?;
            } else {
                print_table(&mut stdout, &resolution)?;
            }
            if !report_failures(&resolution, keep_going) {
                std::process::exit(1);
            }
        }
        Commands::Generate {
            inputs,
            output,
            keep_order,
            keep_going,
        } => {
            let resolution = resolve(&inputs, keep_order, quiet);
            let module = python::render_module(&resolution)?;
            match output {
                Some(path) => {
                    fs::write(&path, &module)?;
                    if !quiet {
                        eprintln!("Wrote {} bytes to {}", module.len(), path.display());
                    }
                }
                None => io::stdout().lock().write_all(module.as_bytes())?,
            }
            if !report_failures(&resolution, keep_going) {
                std::process::exit(1);
            }
        }
        Commands::Inspect { inputs, keep_order } => {
            let resolution = resolve(&inputs, keep_order, quiet);

            // Set up terminal
            enable_raw_mode()?;
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            let backend = CrosstermBackend::new(stdout);
            let mut terminal = Terminal::new(backend)?;

            let mut app = App::new(resolution);
            let res = app.run(&mut terminal);

            let restored = restore_terminal(&mut terminal);
            if let Err(err) = res.and(restored) {
                eprintln!("Error: {}", err);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Print each type's parse result. Returns false if any failed.
fn parse_types(types: &[String]) -> bool {
    let registry = StructRegistry::new();
    let mut ok = true;

    for text in types {
        match parse_type(text) {
            Ok(ctype) => {
                let size = match size_of(&ctype, &registry) {
                    Ok(size) => size.to_string(),
                    Err(_) => "?".to_string(),
                };
                let json = serde_json::to_string(&ctype).unwrap_or_default();
                println!("{:?} → {} (size {}) {}", text, ctype, size, json);
            }
            Err(e) => {
                eprintln!("{:?}: {}", text, e);
                ok = false;
            }
        }
    }

    ok
}

/// Load every description and resolve it. Unreadable files are fatal.
fn resolve(inputs: &[PathBuf], keep_order: bool, quiet: bool) -> Resolution {
    let options = GeneratorOptions {
        sort_dependencies: !keep_order,
    };
    let mut generator = Generator::new(options);

    for path in inputs {
        if !quiet {
            eprintln!("Loading {}...", path.display());
        }
        let api = match ApiDescription::from_path(path) {
            Ok(api) => api,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
        let added = generator.add_api(&api);
        if !quiet {
            eprintln!(
                "Resolved {} of {} structs ({} aliases described)",
                added,
                api.structs.len(),
                api.aliases.len()
            );
        }
    }

    generator.finish()
}

fn print_table<W: Write>(out: &mut W, resolution: &Resolution) -> io::Result<()> {
    for layout in resolution.registry.iter() {
        if let Some(target) = resolution.alias_target(&layout.name) {
            writeln!(out, "{} = {} ({} bytes)", layout.name, target, layout.size)?;
            writeln!(out)?;
            continue;
        }

        writeln!(out, "{} ({} bytes)", layout.name, layout.size)?;
        let type_width = layout
            .fields
            .iter()
            .map(|field| field.ctype.to_string().len())
            .max()
            .unwrap_or(0)
            .max(4);
        for field in &layout.fields {
            writeln!(
                out,
                "  {:>6} {:>5}  {:<type_width$}  {}",
                field.offset,
                field.size,
                field.ctype.to_string(),
                field.name
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Print every failure. Returns false if the run should fail.
fn report_failures(resolution: &Resolution, keep_going: bool) -> bool {
    for failure in &resolution.failures {
        eprintln!("Error: {}", failure);
    }
    if !resolution.failures.is_empty() {
        eprintln!(
            "{} struct(s) failed to resolve",
            resolution.failures.len()
        );
    }
    keep_going || resolution.failures.is_empty()
}
