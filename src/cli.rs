use crate::ast::SchemaAst;
use crate::collide::{all_measured, resolve_collisions};
use crate::compile::compile;
use crate::config::load_config;
use crate::graph::Size;
use crate::layout::position_nodes;
use crate::normalize::normalize;
use anyhow::Result;
use clap::Parser;
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "sgc",
    version,
    about = "Compiles a JSON Schema AST into a positioned graph (JSON in, JSON out)"
)]
pub struct Args {
    /// Compiled AST JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file (layout/collision/palette overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Measured node sizes JSON ({"<id>": {"width": w, "height": h}}).
    /// When present and complete, collision resolution runs.
    #[arg(short = 'm', long = "measured")]
    pub measured: Option<PathBuf>,

    /// Pretty-print the output JSON
    #[arg(long = "pretty")]
    pub pretty: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let ast = SchemaAst::from_str(&input)?;

    let mut graph = compile(&normalize(&ast), &config.palette);
    position_nodes(&mut graph, &config.layout);

    if let Some(path) = args.measured.as_deref() {
        let sizes: HashMap<String, Size> =
            serde_json::from_str(&std::fs::read_to_string(path)?)?;
        for node in &mut graph.nodes {
            if let Some(size) = sizes.get(&node.id) {
                node.measured = *size;
            }
        }
        if all_measured(&graph.nodes) {
            resolve_collisions(&mut graph.nodes, &config.collision);
        } else {
            log::warn!("not every node has a measured size; collision resolution skipped");
        }
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&graph)?
    } else {
        serde_json::to_string(&graph)?
    };
    write_output(&json, args.output.as_deref())?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(json: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, json)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
