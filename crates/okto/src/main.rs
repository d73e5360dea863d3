use anyhow::{bail, Context, Result};
use okto::RunConfig;
use std::path::PathBuf;

const USAGE: &str = "usage: okto <image> [--origin HEX] [--cpm]";

fn main() -> Result<()> {
    env_logger::init();

    let mut image: Option<PathBuf> = None;
    let mut origin = okto::cpm::COM_ORIGIN;
    let mut cpm = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--origin" => {
                let value = args.next().context("--origin needs a value")?;
                origin = u16::from_str_radix(value.trim_start_matches("0x"), 16)
                    .with_context(|| format!("bad origin {value:?}"))?;
            }
            "--cpm" => cpm = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            other => {
                if image.is_some() {
                    bail!("unexpected argument {other:?}\n{USAGE}");
                }
                image = Some(PathBuf::from(other));
            }
        }
    }

    let Some(image) = image else {
        bail!("no image given\n{USAGE}");
    };

    okto::run(&RunConfig { image, origin, cpm })
}
