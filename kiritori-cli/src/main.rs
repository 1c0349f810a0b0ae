use clap::Parser;
use kiritori_cli::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = cli.command.execute() {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}
