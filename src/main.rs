use std::env;
use std::error::Error;
use std::path::Path;
use std::process;

use meshraster::colors::Color;
use meshraster::{Engine, Mesh, RenderConfig, RotationPreset, Viewport};

const USAGE: &str = "Usage: meshraster <input.obj|input.ply> <output.png> [--width N] [--height N] [--flip] \
[--depth <depth.png>] [--threads N] [--preset identity|z-up|z-up-45] [--background r,g,b]";

struct Args {
    input: String,
    output: String,
    depth: Option<String>,
    config: RenderConfig,
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{} expects a value", flag))?;
    value
        .parse::<T>()
        .map_err(|_| format!("invalid value for {}: {}", flag, value))
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    if args.len() < 3 {
        return Err(USAGE.to_string());
    }

    let mut config = RenderConfig::default().with_progress(true);
    let mut viewport = Viewport::default();
    let mut depth = None;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                i += 1;
                viewport.width = parse_value("--width", args.get(i))?;
            }
            "--height" => {
                i += 1;
                viewport.height = parse_value("--height", args.get(i))?;
            }
            "--flip" => viewport.flip_upside_down = true,
            "--depth" => {
                i += 1;
                depth = Some(args.get(i).ok_or("--depth expects a path")?.clone());
            }
            "--threads" => {
                i += 1;
                config = config.with_threads(parse_value("--threads", args.get(i))?);
            }
            "--preset" => {
                i += 1;
                let name = args.get(i).ok_or("--preset expects a name")?;
                let preset = RotationPreset::from_name(name)
                    .ok_or_else(|| format!("unknown preset: {}", name))?;
                config = config.with_preset(preset);
            }
            "--background" => {
                i += 1;
                config = config.with_background(parse_value::<Color>("--background", args.get(i))?);
            }
            other => return Err(format!("unknown argument: {}\n{}", other, USAGE)),
        }
        i += 1;
    }

    Ok(Args {
        input: args[1].clone(),
        output: args[2].clone(),
        depth,
        config: config.with_viewport(viewport),
    })
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let is_ply = Path::new(&args.input)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ply"));
    let mesh = if is_ply {
        Mesh::from_ply(&args.input)?
    } else {
        Mesh::from_obj(&args.input)?
    };
    let output = Engine::new(args.config).render(&mesh)?;

    output.frame.to_rgb_image().save(&args.output)?;
    log::info!("Wrote {}.", args.output);

    if let Some(path) = args.depth {
        output.depth.to_luma_image().save(&path)?;
        log::info!("Wrote depth map {}.", path);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(1);
        }
    };
    run(args)
}
