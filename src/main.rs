use align_deps::cli::AlignCli;
use anyhow::Result;

fn main() {
    match real_main() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("align-deps error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn real_main() -> Result<bool> {
    let cli = AlignCli::parse();
    cli.run()
}
