use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use multiworld_core::{
    BindingRegistry, BridgeError, BridgeSettings, CheckId, CheckOutcome, CompletedChecks,
    EventStore, Result, SaveFileId, SeedId, UnlockPoller,
};

#[derive(Debug, Parser)]
#[command(
    name = "multiworld",
    version,
    about = "Inspect and repair the multiworld file exchange"
)]
struct Args {
    /// Base communication directory. Defaults to the per-user local data
    /// directory the coordinator client uses.
    #[arg(long, global = true)]
    comm_dir: Option<PathBuf>,

    /// File name prefix of inbound unlock files.
    #[arg(long, global = true)]
    unlock_prefix: Option<String>,

    #[arg(long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the resolved communication paths.
    Paths,
    /// List the save file bindings in allocation order.
    Bindings,
    /// Bind a save file, reusing its existing seed if it has one.
    Bind {
        #[arg(value_parser = parse_save_file)]
        save_file: SaveFileId,
    },
    /// Release a save file's seed so it can be claimed again.
    Unbind {
        #[arg(value_parser = parse_save_file)]
        save_file: SaveFileId,
    },
    /// List check events written for a seed.
    Checks { seed: String },
    /// List unlock files waiting to be granted for a seed.
    Unlocks { seed: String },
    /// Report a check by hand.
    SendCheck {
        seed: String,
        id: String,
        name: String,
    },
}

// Digits must reach the registry as the numeric form the game writes.
fn parse_save_file(s: &str) -> std::result::Result<SaveFileId, Infallible> {
    s.parse()
}

fn main() {
    let args = Args::parse();

    let filter = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut settings = match &args.comm_dir {
        Some(dir) => BridgeSettings::with_comm_dir(dir),
        None => BridgeSettings::from_env(),
    };
    if let Some(prefix) = &args.unlock_prefix {
        settings.unlock_prefix = prefix.clone();
    }

    if let Err(err) = run(&settings, args.command) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(settings: &BridgeSettings, command: Command) -> Result<()> {
    match command {
        Command::Paths => {
            println!("comm dir: {}", settings.comm_dir.display());
            println!("bindings: {}", settings.bindings_path().display());
        }
        Command::Bindings => {
            let registry = BindingRegistry::load(settings.bindings_path())?;
            for (slot, binding) in registry.bindings().iter().enumerate() {
                let seed = binding.seed.as_ref().map_or("-", SeedId::as_str);
                match &binding.save_file {
                    Some(save_file) => println!("{slot:>3}  {seed}  bound to {save_file}"),
                    None if binding.is_available() => println!("{slot:>3}  {seed}  available"),
                    None => println!("{slot:>3}  {seed}  (no seed)"),
                }
            }
        }
        Command::Bind { save_file } => {
            let mut registry = BindingRegistry::load(settings.bindings_path())?;
            let seed = registry.bind(&save_file)?;
            println!("{save_file} -> {seed}");
        }
        Command::Unbind { save_file } => {
            let mut registry = BindingRegistry::load(settings.bindings_path())?;
            match registry.release(&save_file)? {
                Some(seed) => println!("released {seed} from {save_file}"),
                None => println!("{save_file} is not bound"),
            }
        }
        Command::Checks { seed } => {
            let store = EventStore::new(&settings.comm_dir);
            for event in store.sent_checks(&SeedId::new(seed))? {
                println!("{:>14.3}  {}  {}", event.timestamp, event.id, event.name);
            }
        }
        Command::Unlocks { seed } => {
            let seed_dir = settings.seed_dir(&SeedId::new(seed));
            if !seed_dir.is_dir() {
                return Err(BridgeError::StorageUnavailable { path: seed_dir });
            }
            let poller = UnlockPoller::new(settings.unlock_prefix.clone());
            for unlock in poller.poll(&seed_dir) {
                println!(
                    "{}  {} ({:?}) from {}",
                    unlock.path.display(),
                    unlock.item.name,
                    unlock.item.kind,
                    unlock.player
                );
            }
        }
        Command::SendCheck { seed, id, name } => {
            let store = EventStore::new(&settings.comm_dir);
            let id = CheckId::new(id);
            let mut completed = CompletedChecks::new();
            match store.send_check(&SeedId::new(seed), &mut completed, &id, &name)? {
                CheckOutcome::Written => println!("sent {id}"),
                CheckOutcome::AlreadySent => println!("{id} was already sent"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_save_file_argument_parses_as_numeric_id() {
        let args = Args::try_parse_from(["multiworld", "bind", "1234"]).unwrap();
        match args.command {
            Command::Bind { save_file } => assert_eq!(save_file, SaveFileId::Numeric(1234)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unbind_keeps_numeric_and_named_forms_apart() {
        let numeric = Args::try_parse_from(["multiworld", "unbind", "7"]).unwrap();
        assert!(matches!(
            numeric.command,
            Command::Unbind { save_file: SaveFileId::Numeric(7) }
        ));

        let named = Args::try_parse_from(["multiworld", "unbind", "slot-a"]).unwrap();
        match named.command {
            Command::Unbind { save_file } => {
                assert_eq!(save_file, SaveFileId::Named("slot-a".into()))
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let args =
            Args::try_parse_from(["multiworld", "unlocks", "S1", "--comm-dir", "/tmp/x"]).unwrap();
        assert_eq!(args.comm_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(args.command, Command::Unlocks { ref seed } if seed == "S1"));
    }
}
