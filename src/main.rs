use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result, bail};

use cminus::emit::{self, Emit};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mut target = Emit::default();
    let mut input_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--emit" | "-e" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("Missing emit target after {arg}"))?;
                target = value.parse()?;
            }
            _ => {
                input_path = Some(arg);
                if args.next().is_some() {
                    bail!("Only one input file is supported");
                }
                break;
            }
        }
    }

    let source = if let Some(path) = input_path {
        fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    log::debug!("emitting {target:?} for {} bytes of source", source.len());
    print!("{}", emit::render(&source, target)?);
    Ok(())
}
