use clicksift::cli::Cli;
use clicksift::{App, logging};
use tracing::error;

fn main() {
    let cli = Cli::from_args();
    logging::init(cli.verbosity());

    let code = match App::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!(category = %e.category(), "{e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}
