use std::io::Read;

use anyhow::Context;
use attolisp::{Config, EvaluationContext};

fn usage() -> ! {
    eprintln!("usage: attolisp [--config <config.json>] [program.lisp]");
    std::process::exit(2)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = Config::default();
    let mut path = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let config_path = args.next().unwrap_or_else(|| usage());
            let source = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path))?;
            config = Config::from_json(&source)
                .with_context(|| format!("parsing {}", config_path))?;
        } else if arg == "-h" || arg == "--help" || path.is_some() {
            usage()
        } else {
            path = Some(arg);
        }
    }

    let source = match &path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?,
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            source
        }
    };

    // Each non-empty line is its own program, all sharing one environment
    let mut context = EvaluationContext::with_config(config);
    for (lineno, line) in source.lines().enumerate().filter(|(_, line)| !line.trim().is_empty()) {
        match context.evaluate_str(line) {
            Ok(value) => println!("{}: {}", lineno + 1, value),
            Err(err) => println!("{}: {}", lineno + 1, err),
        }
    }

    Ok(())
}
