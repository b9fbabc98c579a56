use anyhow::{Context, Result};
use clap::Parser;
use curvelang_core::{Config, Host, Interpreter};
use curvelang_io::SystemHost;

mod args;
mod table;

use args::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    let env = env_logger::Env::new().filter_or("CURVELANG_LOG", "warn");
    let mut builder = env_logger::Builder::from_env(env);
    if args.verbose > 0 {
        builder.filter_level(args.log_filter().parse().expect("fixed verbosity ladder"));
    }
    builder.init();

    if args.files.is_empty() {
        table::print_opcode_table();
        return Ok(());
    }

    let config = Config {
        flush: args.flush,
        all_errors_fatal: args.err_all,
    };
    let mut host = SystemHost::new(args.flush);

    for path in &args.files {
        run_file(path, &args, config, &mut host)
            .with_context(|| format!("failed to run {:?}", path))?;
    }

    Ok(())
}

fn run_file(
    path: &std::path::Path,
    args: &Args,
    config: Config,
    host: &mut SystemHost,
) -> Result<()> {
    let encoding = args.encoding();
    let grid = if args.linear {
        curvelang_io::load_linear(path, encoding)
    } else {
        curvelang_io::load_hilbert(path, encoding)
    }
    .with_context(|| format!("failed to load {:?}", path))?;

    let now = host.now_seconds();
    let mut vm = Interpreter::new(grid, config, now);

    log::info!("running {:?} (order {})", path, vm.order());
    vm.run(host).map_err(anyhow::Error::from)
}
