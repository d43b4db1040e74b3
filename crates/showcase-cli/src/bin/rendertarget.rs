use showcase_cli::{init_logging, parse_or_exit, rendertarget};

fn main() -> anyhow::Result<()> {
    let args: rendertarget::Args = parse_or_exit();
    init_logging();
    rendertarget::run(&args)
}
