use showcase_cli::{hellotest, init_logging, parse_or_exit};

fn main() -> anyhow::Result<()> {
    let args: hellotest::Args = parse_or_exit();
    init_logging();
    hellotest::run(&args)
}
